//! # Item Classification
//!
//! Pure functions over material identifiers: class membership, built-in
//! maximum durability, and evaluation of the `item-types` filters used by the
//! top-level processing filter, templates, pools and chance overrides.

use crate::host::ItemStack;

const TOOL_SUFFIXES: [&str; 4] = ["_PICKAXE", "_AXE", "_SHOVEL", "_HOE"];
const ARMOR_SUFFIXES: [&str; 4] = ["_HELMET", "_CHESTPLATE", "_LEGGINGS", "_BOOTS"];

/// Broad item class usable as a filter tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemClass {
    Tool,
    Armor,
    Weapon,
}

impl ItemClass {
    /// Filter tag for this class.
    pub fn tag(&self) -> &'static str {
        match self {
            ItemClass::Tool => "TOOL",
            ItemClass::Armor => "ARMOR",
            ItemClass::Weapon => "WEAPON",
        }
    }

    /// Parses a filter tag, ignoring case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "TOOL" => Some(ItemClass::Tool),
            "ARMOR" => Some(ItemClass::Armor),
            "WEAPON" => Some(ItemClass::Weapon),
            _ => None,
        }
    }

    /// Whether `material` belongs to this class.
    pub fn contains(&self, material: &str) -> bool {
        match self {
            ItemClass::Tool => is_tool(material),
            ItemClass::Armor => is_armor(material),
            ItemClass::Weapon => is_weapon(material),
        }
    }
}

pub fn is_tool(material: &str) -> bool {
    TOOL_SUFFIXES.iter().any(|suffix| material.ends_with(suffix))
        || matches!(material, "SHEARS" | "FLINT_AND_STEEL")
}

pub fn is_armor(material: &str) -> bool {
    ARMOR_SUFFIXES.iter().any(|suffix| material.ends_with(suffix))
        || matches!(material, "SHIELD" | "ELYTRA")
}

pub fn is_weapon(material: &str) -> bool {
    material.ends_with("_SWORD") || matches!(material, "BOW" | "CROSSBOW" | "TRIDENT")
}

/// Built-in maximum durability of a material; zero when it cannot be damaged.
///
/// # Examples
///
/// ```
/// use itemlore::lore::classify::default_max_durability;
///
/// assert_eq!(default_max_durability("DIAMOND_SWORD"), 1561);
/// assert_eq!(default_max_durability("IRON_CHESTPLATE"), 240);
/// assert_eq!(default_max_durability("DIRT"), 0);
/// ```
pub fn default_max_durability(material: &str) -> u16 {
    match material {
        "TURTLE_HELMET" => return 275,
        "BOW" => return 384,
        "CROSSBOW" => return 465,
        "TRIDENT" => return 250,
        "SHIELD" => return 336,
        "ELYTRA" => return 432,
        "FISHING_ROD" => return 64,
        "SHEARS" => return 238,
        "FLINT_AND_STEEL" => return 64,
        "CARROT_ON_A_STICK" => return 25,
        "WARPED_FUNGUS_ON_A_STICK" => return 100,
        "BRUSH" => return 64,
        "MACE" => return 500,
        _ => {}
    }

    if let Some((tier, piece)) = material.split_once('_') {
        if let Some(durability) = tool_durability(tier, piece) {
            return durability;
        }
        if let Some(durability) = armor_durability(tier, piece) {
            return durability;
        }
    }

    0
}

fn tool_durability(tier: &str, piece: &str) -> Option<u16> {
    if !matches!(piece, "SWORD" | "PICKAXE" | "AXE" | "SHOVEL" | "HOE") {
        return None;
    }
    match tier {
        "WOODEN" => Some(59),
        "STONE" => Some(131),
        "IRON" => Some(250),
        "GOLDEN" => Some(32),
        "DIAMOND" => Some(1561),
        "NETHERITE" => Some(2031),
        _ => None,
    }
}

fn armor_durability(tier: &str, piece: &str) -> Option<u16> {
    let base = match piece {
        "HELMET" => 11,
        "CHESTPLATE" => 16,
        "LEGGINGS" => 15,
        "BOOTS" => 13,
        _ => return None,
    };
    let multiplier = match tier {
        "LEATHER" => 5,
        "CHAINMAIL" | "IRON" => 15,
        "GOLDEN" => 7,
        "DIAMOND" => 33,
        "NETHERITE" => 37,
        _ => return None,
    };
    Some(base * multiplier)
}

/// Whether a single filter key matches a material.
///
/// Class tags (`TOOL`, `ARMOR`, `WEAPON`) match by class; any other key
/// matches when it is a substring of the material name.
pub fn matches_type_key(material: &str, key: &str) -> bool {
    let key = key.trim().to_ascii_uppercase();
    if key.is_empty() {
        return false;
    }
    match ItemClass::from_tag(&key) {
        Some(class) => class.contains(material),
        None => material.contains(&key),
    }
}

/// Evaluates an `item-types` filter against an item.
///
/// Besides [`matches_type_key`], the filter understands `ALL` and
/// `DAMAGEABLE`. Air is never processed.
///
/// # Examples
///
/// ```
/// use itemlore::ItemStack;
/// use itemlore::lore::classify::should_process;
///
/// let filter = vec!["DAMAGEABLE".to_string()];
/// assert!(should_process(&ItemStack::new("BOW"), &filter));
/// assert!(!should_process(&ItemStack::new("BREAD"), &filter));
/// ```
pub fn should_process(item: &ItemStack, item_types: &[String]) -> bool {
    if item.is_air() {
        return false;
    }

    let material = item.material.name();
    item_types.iter().any(|key| {
        match key.trim().to_ascii_uppercase().as_str() {
            "ALL" => true,
            "DAMAGEABLE" => item.max_durability() > 0,
            other => matches_type_key(material, other),
        }
    })
}
