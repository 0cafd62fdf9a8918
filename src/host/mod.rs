//! # Host Module
//!
//! The game server's side of the world, as seen by the lore engine.
//!
//! Items, players, worlds and mobs are owned by the host. The engine only
//! reads them and writes the lore lines of an item's metadata. Optional host
//! capabilities (other plugins, placeholder expansion, economy, mob naming)
//! are reached through the traits in [`plugins`].

pub mod memory;
pub mod plugins;
pub mod server;

pub use memory::*;
pub use plugins::*;
pub use server::*;

use crate::lore::classify;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Material identifier of an item, e.g. `DIAMOND_SWORD`.
///
/// Names are normalised to upper case so substring matching against
/// configuration keys is case-insensitive on the configuration side.
///
/// # Examples
///
/// ```
/// use itemlore::Material;
///
/// let material = Material::new("diamond_sword");
/// assert_eq!(material.name(), "DIAMOND_SWORD");
/// assert!(material.is_weapon());
/// assert!(!Material::new("DIRT").is_damageable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Material(String);

impl Material {
    /// Creates a material from any casing of its identifier.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_uppercase())
    }

    /// The empty-hand material.
    pub fn air() -> Self {
        Self::new("AIR")
    }

    /// Upper-case identifier.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether this material represents "nothing" (an empty slot).
    pub fn is_air(&self) -> bool {
        matches!(self.0.as_str(), "AIR" | "CAVE_AIR" | "VOID_AIR")
    }

    pub fn is_tool(&self) -> bool {
        classify::is_tool(&self.0)
    }

    pub fn is_armor(&self) -> bool {
        classify::is_armor(&self.0)
    }

    pub fn is_weapon(&self) -> bool {
        classify::is_weapon(&self.0)
    }

    /// Whether items of this material wear down with use.
    pub fn is_damageable(&self) -> bool {
        classify::default_max_durability(&self.0) > 0
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Material {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Material {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Material> for String {
    fn from(material: Material) -> Self {
        material.0
    }
}

/// Mutable metadata container of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMeta {
    /// Custom display name, if the item was renamed
    pub display_name: Option<String>,
    /// Lore lines shown under the item name
    pub lore: Vec<String>,
    /// Damage taken so far; `None` when the item cannot be damaged
    pub damage: Option<u16>,
}

/// Current and maximum durability of a damageable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durability {
    pub current: u32,
    pub max: u32,
}

impl Durability {
    /// Remaining durability as a whole percentage (100 when `max` is zero).
    ///
    /// # Examples
    ///
    /// ```
    /// use itemlore::Durability;
    ///
    /// assert_eq!(Durability { current: 781, max: 1561 }.percentage(), 50);
    /// assert_eq!(Durability { current: 0, max: 0 }.percentage(), 100);
    /// ```
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            100
        } else {
            (u64::from(self.current) * 100 / u64::from(self.max)) as u32
        }
    }
}

/// A stack of items as held in an inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: Material,
    #[serde(default = "default_amount")]
    pub amount: u32,
    /// Overrides the material's built-in maximum durability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_durability: Option<u16>,
    /// `None` for items without a metadata container (e.g. air)
    #[serde(default)]
    pub meta: Option<ItemMeta>,
}

fn default_amount() -> u32 {
    1
}

impl ItemStack {
    /// Creates a single fresh item of the given material.
    ///
    /// Damageable materials start with zero damage; air has no metadata.
    pub fn new(material: impl Into<Material>) -> Self {
        let material = material.into();
        let meta = if material.is_air() {
            None
        } else {
            Some(ItemMeta {
                damage: material.is_damageable().then_some(0),
                ..ItemMeta::default()
            })
        };

        Self {
            material,
            amount: 1,
            max_durability: None,
            meta,
        }
    }

    /// An empty slot.
    pub fn air() -> Self {
        Self::new(Material::air())
    }

    /// Sets the damage taken, making the item damageable if it was not.
    pub fn with_damage(mut self, damage: u16) -> Self {
        if let Some(meta) = self.meta.as_mut() {
            meta.damage = Some(damage);
        }
        self
    }

    pub fn with_max_durability(mut self, max: u16) -> Self {
        self.max_durability = Some(max);
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        if let Some(meta) = self.meta.as_mut() {
            meta.display_name = Some(name.into());
        }
        self
    }

    pub fn with_lore<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(meta) = self.meta.as_mut() {
            meta.lore = lines.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn is_air(&self) -> bool {
        self.material.is_air()
    }

    /// Lore lines, empty when the item has no metadata.
    pub fn lore(&self) -> &[String] {
        self.meta.as_ref().map(|meta| meta.lore.as_slice()).unwrap_or(&[])
    }

    /// Custom display name, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|meta| meta.display_name.as_deref())
    }

    /// Maximum durability, from the explicit override or the material table.
    pub fn max_durability(&self) -> u16 {
        self.max_durability
            .unwrap_or_else(|| classify::default_max_durability(self.material.name()))
    }

    /// Durability of the item, or `None` when it cannot be damaged.
    ///
    /// # Examples
    ///
    /// ```
    /// use itemlore::ItemStack;
    ///
    /// let pick = ItemStack::new("IRON_PICKAXE").with_damage(50);
    /// let durability = pick.durability().unwrap();
    /// assert_eq!(durability.current, 200);
    /// assert_eq!(durability.max, 250);
    ///
    /// assert!(ItemStack::new("BREAD").durability().is_none());
    /// ```
    pub fn durability(&self) -> Option<Durability> {
        let damage = self.meta.as_ref()?.damage?;
        let max = u32::from(self.max_durability());
        Some(Durability {
            current: max.saturating_sub(u32::from(damage)),
            max,
        })
    }
}

/// Dimension type of a world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    #[default]
    Normal,
    Nether,
    TheEnd,
    Custom,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Normal => "NORMAL",
            Environment::Nether => "NETHER",
            Environment::TheEnd => "THE_END",
            Environment::Custom => "CUSTOM",
        };
        f.write_str(name)
    }
}

/// A world a player can stand in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    pub name: String,
    #[serde(default)]
    pub environment: Environment,
}

impl World {
    pub fn new(name: impl Into<String>, environment: Environment) -> Self {
        Self {
            name: name.into(),
            environment,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new("world", Environment::Normal)
    }
}

/// A connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub world: World,
}

impl Player {
    /// Creates a player standing in the default overworld.
    ///
    /// # Examples
    ///
    /// ```
    /// use itemlore::Player;
    ///
    /// let player = Player::new("Alex");
    /// assert_eq!(player.display_name, "Alex");
    /// assert_eq!(player.world.name, "world");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            display_name: name.clone(),
            name,
            world: World::default(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_world(mut self, world: World) -> Self {
        self.world = world;
        self
    }
}

/// A mob, as relevant for naming the source of its drops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobEntity {
    pub id: Uuid,
    /// Entity type identifier, e.g. `CAVE_SPIDER`
    pub kind: String,
    /// Name tag given to this particular mob
    #[serde(default)]
    pub custom_name: Option<String>,
}

impl MobEntity {
    pub fn new(kind: impl AsRef<str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.as_ref().to_ascii_uppercase(),
            custom_name: None,
        }
    }

    pub fn with_custom_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }
}
