//! # Settings
//!
//! Typed view of the plugin configuration file.
//!
//! The file is YAML (or JSON when the path ends in `.json`). Every key is
//! optional; missing keys take the defaults below, which mirror the bundled
//! `resources/config.yml`. Values that parse but make no sense (negative
//! amounts, out-of-range chances, unknown modes) are corrected where they are
//! used rather than rejected here. Amounts, the global chance and the
//! item-type lists also tolerate values of the wrong shape: they fall back to
//! their defaults so one bad key never costs the rest of the file.

use crate::config::*;
use crate::{LoreError, LoreResult};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// The bundled default configuration.
pub const BUNDLED_CONFIG: &str = include_str!("../resources/config.yml");

/// Root of the configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Extra diagnostic logging
    pub debug: bool,
    /// Fixed seed for lore randomness (random when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Item filter: `ALL`, material substrings, or `DAMAGEABLE`/`TOOL`/`ARMOR`/`WEAPON`
    #[serde(deserialize_with = "lenient_item_filter")]
    pub item_types: Vec<String>,
    /// Whether consuming an item (eating, drinking) also decorates it
    pub add_lore_to_consumed_items: bool,
    pub lore: LoreSettings,
    pub existing_lore: ExistingLoreSettings,
    pub sources: SourceSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            seed: None,
            item_types: vec!["ALL".to_string()],
            add_lore_to_consumed_items: false,
            lore: LoreSettings::default(),
            existing_lore: ExistingLoreSettings::default(),
            sources: SourceSettings::default(),
        }
    }
}

/// `lore.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoreSettings {
    pub show_durability: bool,
    pub show_time: bool,
    pub show_player: bool,
    pub show_source: bool,
    pub durability_format: String,
    /// strftime pattern; Java-style patterns such as `yyyy-MM-dd` are accepted too
    pub time_format: String,
    pub time_prefix: String,
    pub player_prefix: String,
    pub source_prefix: String,
    pub basic_settings: BasicSettings,
    pub random_lore: RandomLoreSettings,
    /// Templates in declaration order
    pub templates: IndexMap<String, TemplateSettings>,
    pub custom_lore: CustomLoreSettings,
}

impl Default for LoreSettings {
    fn default() -> Self {
        Self {
            show_durability: true,
            show_time: true,
            show_player: true,
            show_source: true,
            durability_format: DEFAULT_DURABILITY_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            time_prefix: DEFAULT_TIME_PREFIX.to_string(),
            player_prefix: DEFAULT_PLAYER_PREFIX.to_string(),
            source_prefix: DEFAULT_SOURCE_PREFIX.to_string(),
            basic_settings: BasicSettings::default(),
            random_lore: RandomLoreSettings::default(),
            templates: IndexMap::new(),
            custom_lore: CustomLoreSettings::default(),
        }
    }
}

/// `lore.basic-settings.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BasicSettings {
    pub top_separator: String,
    pub bottom_separator: String,
    pub info_separator: String,
    /// Insert a blank line before custom lore
    pub show_empty_lines: bool,
}

impl Default for BasicSettings {
    fn default() -> Self {
        Self {
            top_separator: DEFAULT_TOP_SEPARATOR.to_string(),
            bottom_separator: DEFAULT_BOTTOM_SEPARATOR.to_string(),
            info_separator: DEFAULT_INFO_SEPARATOR.to_string(),
            show_empty_lines: true,
        }
    }
}

/// `lore.random-lore.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RandomLoreSettings {
    pub enabled: bool,
    pub amount: AmountSettings,
    pub chances: ChanceSettings,
    /// Raw pool entries keyed by tag; each entry is a string or
    /// `[text, weight, unique, fixed]`
    pub pools: IndexMap<String, Vec<serde_json::Value>>,
    pub fixed_count_as_random: bool,
    pub unique_count_as_random: bool,
}

impl Default for RandomLoreSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: AmountSettings::default(),
            chances: ChanceSettings::default(),
            pools: IndexMap::new(),
            fixed_count_as_random: false,
            unique_count_as_random: true,
        }
    }
}

/// `lore.random-lore.amount.*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountSettings {
    #[serde(deserialize_with = "lenient_min_amount")]
    pub min: i64,
    #[serde(deserialize_with = "lenient_max_amount")]
    pub max: i64,
}

impl Default for AmountSettings {
    fn default() -> Self {
        Self { min: 1, max: 3 }
    }
}

/// `lore.random-lore.chances.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChanceSettings {
    /// Probability in `[0, 1]` that a non-fixed entry enters the draw
    #[serde(deserialize_with = "lenient_global_chance")]
    pub global: f64,
    /// Overrides keyed by material name, material substring or class tag;
    /// values above 1 are percentages
    pub types: IndexMap<String, f64>,
}

impl Default for ChanceSettings {
    fn default() -> Self {
        Self {
            global: 1.0,
            types: IndexMap::new(),
        }
    }
}

/// `lore.templates.<name>.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TemplateSettings {
    pub enabled: bool,
    /// Empty matches every item
    #[serde(deserialize_with = "lenient_string_list")]
    pub item_types: Vec<String>,
    pub content: Vec<String>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            item_types: Vec::new(),
            content: Vec::new(),
        }
    }
}

/// `lore.custom-lore.*`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomLoreSettings {
    pub enabled: bool,
    pub lines: Vec<String>,
}

/// `existing-lore.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExistingLoreSettings {
    /// `APPEND`, `OVERWRITE` or `IGNORE`
    pub mode: String,
    pub add_separator: bool,
    pub separator_style: String,
    /// Markers of lore written by this plugin; empty uses the built-in list
    #[serde(deserialize_with = "lenient_string_list")]
    pub detection_keywords: Vec<String>,
}

impl Default for ExistingLoreSettings {
    fn default() -> Self {
        Self {
            mode: "APPEND".to_string(),
            add_separator: true,
            separator_style: DEFAULT_INFO_SEPARATOR.to_string(),
            detection_keywords: Vec::new(),
        }
    }
}

/// `sources.*`: the text recorded as an item's origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SourceSettings {
    pub pickup: String,
    pub craft: String,
    pub enchant: String,
    pub mend: String,
    pub fishing: String,
    pub furnace: String,
    pub smithing: String,
    pub anvil: String,
    pub consume: String,
    pub command: String,
    pub template: String,
    pub give: String,
    /// Used for mob drops; `%ilore_mob%` is replaced with the mob's name
    pub mob_kill: String,
    /// Display names by entity type, e.g. `CAVE_SPIDER: Cave Spider`
    pub mob_names: IndexMap<String, String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            pickup: "Picked up".to_string(),
            craft: "Crafted".to_string(),
            enchant: "Enchanted".to_string(),
            mend: "Mended".to_string(),
            fishing: "Fished".to_string(),
            furnace: "Smelted".to_string(),
            smithing: "Smithed".to_string(),
            anvil: "Anvil".to_string(),
            consume: "Consumed".to_string(),
            command: "Command".to_string(),
            template: "Template".to_string(),
            give: "Gifted".to_string(),
            mob_kill: "Slain %ilore_mob%".to_string(),
            mob_names: IndexMap::new(),
        }
    }
}

impl Settings {
    /// Parses the bundled default configuration.
    pub fn bundled() -> LoreResult<Self> {
        Self::from_yaml_str(BUNDLED_CONFIG)
    }

    pub fn from_yaml_str(source: &str) -> LoreResult<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> LoreResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a configuration file, choosing the format by extension.
    pub fn load(path: &Path) -> LoreResult<Self> {
        let source = fs::read_to_string(path)?;
        if source.trim().is_empty() {
            return Err(LoreError::InvalidConfig(format!(
                "{} is empty",
                path.display()
            )));
        }

        if is_json(path) {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Writes the configuration back in the format its extension implies.
    pub fn save(&self, path: &Path) -> LoreResult<()> {
        let rendered = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Detection keywords, falling back to the built-in markers.
    pub fn detection_keywords(&self) -> Vec<String> {
        if self.existing_lore.detection_keywords.is_empty() {
            DEFAULT_DETECTION_KEYWORDS
                .iter()
                .map(|keyword| keyword.to_string())
                .collect()
        } else {
            self.existing_lore.detection_keywords.clone()
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

// A malformed scalar falls back to its default instead of failing the whole
// file. Numeric strings are accepted, and a bare string stands for a
// one-element list.

fn number_or(value: Value, default: f64) -> f64 {
    let parsed = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite()).unwrap_or_else(|| {
        debug!("Unreadable number {}, using {}", value, default);
        default
    })
}

fn string_list_or(value: Value, default: impl FnOnce() -> Vec<String>) -> Vec<String> {
    match value {
        Value::String(text) => vec![text],
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(text) => Some(text),
                Value::Number(number) => Some(number.to_string()),
                other => {
                    debug!("Skipping list entry {}", other);
                    None
                }
            })
            .collect(),
        other => {
            debug!("Expected a list, found {}; using the default", other);
            default()
        }
    }
}

fn lenient_min_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let default = AmountSettings::default().min;
    Ok(number_or(Value::deserialize(deserializer)?, default as f64) as i64)
}

fn lenient_max_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let default = AmountSettings::default().max;
    Ok(number_or(Value::deserialize(deserializer)?, default as f64) as i64)
}

fn lenient_global_chance<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let default = ChanceSettings::default().global;
    Ok(number_or(Value::deserialize(deserializer)?, default))
}

fn lenient_string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(string_list_or(Value::deserialize(deserializer)?, Vec::new))
}

fn lenient_item_filter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(string_list_or(Value::deserialize(deserializer)?, || {
        Settings::default().item_types
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bundled_config_parses() {
        let settings = Settings::bundled().unwrap();
        assert!(settings.lore.random_lore.enabled);
        assert!(settings.lore.templates.contains_key("default"));
        assert!(settings.lore.random_lore.pools.contains_key("ALL"));
        assert_eq!(settings.existing_lore.mode, "APPEND");
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings = Settings::from_yaml_str("debug: true\n").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.item_types, vec!["ALL".to_string()]);
        assert!(settings.lore.show_time);
        assert_eq!(settings.lore.random_lore.amount, AmountSettings { min: 1, max: 3 });
        assert!(settings.lore.random_lore.unique_count_as_random);
        assert!(settings.lore.templates.is_empty());
    }

    #[test]
    fn test_malformed_scalars_fall_back() {
        let yaml = r#"
item-types: SWORD
lore:
  show-time: false
  random-lore:
    enabled: true
    amount:
      min: two
      max: "4"
    chances:
      global: "0.5"
  templates:
    weapon:
      item-types: BOW
      content: ["a"]
existing-lore:
  detection-keywords: 42
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert!(!settings.lore.show_time);
        assert!(settings.lore.random_lore.enabled);
        assert_eq!(settings.lore.random_lore.amount, AmountSettings { min: 1, max: 4 });
        assert_eq!(settings.lore.random_lore.chances.global, 0.5);
        assert_eq!(settings.item_types, vec!["SWORD".to_string()]);
        assert_eq!(settings.lore.templates["weapon"].item_types, vec!["BOW".to_string()]);
        assert!(settings.existing_lore.detection_keywords.is_empty());
    }

    #[test]
    fn test_unreadable_item_filter_keeps_all() {
        let settings = Settings::from_yaml_str("item-types: {sword: true}\nseed: 7\n").unwrap();
        assert_eq!(settings.item_types, vec!["ALL".to_string()]);
        assert_eq!(settings.seed, Some(7));
    }

    #[test]
    fn test_templates_keep_declaration_order() {
        let yaml = r#"
lore:
  templates:
    zeta:
      item-types: [SWORD]
      content: ["a"]
    alpha:
      enabled: false
      content: ["b"]
    default:
      content: ["c"]
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();
        let names: Vec<&str> = settings.lore.templates.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "default"]);
        assert!(!settings.lore.templates["alpha"].enabled);
        assert!(settings.lore.templates["zeta"].enabled);
    }

    #[test]
    fn test_pool_entries_accept_mixed_shapes() {
        let yaml = r#"
lore:
  random-lore:
    pools:
      ALL:
        - "&7Plain line"
        - ["&6Rarity: Rare", 0.4, true]
        - ["&aAlways", 1, false, true]
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();
        let pool = &settings.lore.random_lore.pools["ALL"];
        assert_eq!(pool.len(), 3);
        assert!(pool[0].is_string());
        assert!(pool[1].is_array());
    }

    #[test]
    fn test_detection_keywords_fallback() {
        let mut settings = Settings::default();
        assert_eq!(settings.detection_keywords().len(), DEFAULT_DETECTION_KEYWORDS.len());

        settings.existing_lore.detection_keywords = vec!["&dMine".to_string()];
        assert_eq!(settings.detection_keywords(), vec!["&dMine".to_string()]);
    }

    #[test]
    fn test_save_and_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let mut settings = Settings::default();
        settings.existing_lore.mode = "OVERWRITE".to_string();
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut settings = Settings::default();
        settings.lore.show_player = false;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert!(!loaded.lore.show_player);
    }

    #[test]
    fn test_load_rejects_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "   \n").unwrap();

        assert!(matches!(Settings::load(&path), Err(LoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = Settings::load(&dir.path().join("absent.yml"));
        assert!(matches!(result, Err(LoreError::Io(_))));
    }
}
