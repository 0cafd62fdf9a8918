//! # Itemlore
//!
//! Configurable acquisition lore for game-server items.
//!
//! ## Architecture Overview
//!
//! Whenever a player acquires an item (pickup, crafting, enchanting, fishing,
//! smithing, ...) the plugin decorates the item with descriptive lines. The
//! crate is organised around a few concepts:
//!
//! - **Host Model**: plain data types for items, players and mobs, plus narrow
//!   traits through which the game server exposes optional capabilities
//! - **Settings**: the typed configuration tree, loaded from YAML or JSON
//! - **Lore Engine**: variable resolution, weighted random lore selection,
//!   template rendering and the application orchestrator
//! - **Events & Commands**: the host-facing surface that feeds the engine
//! - **Plugin Context**: the bootstrap-owned object tying everything together
//!
//! ## Example
//!
//! ```
//! use itemlore::{ItemLorePlugin, ItemStack, Player, Settings, StaticHost};
//!
//! let mut plugin = ItemLorePlugin::new(Settings::default(), Box::new(StaticHost::new()))
//!     .with_seed(7);
//! let player = Player::new("Alex");
//! let mut sword = ItemStack::new("DIAMOND_SWORD");
//!
//! assert!(plugin.apply(&mut sword, &player, "Crafted"));
//! assert!(!sword.lore().is_empty());
//! // A second pass is refused because the item already carries plugin lore
//! assert!(!plugin.apply(&mut sword, &player, "Crafted"));
//! ```

pub mod commands;
pub mod events;
pub mod host;
pub mod lore;
pub mod plugin;
pub mod settings;

pub use commands::*;
pub use events::*;
pub use host::*;
pub use lore::*;
pub use plugin::*;
pub use settings::*;

// Explicit re-exports for the types most callers touch
pub use host::{
    Durability, Environment, ItemMeta, ItemStack, Material, MobEntity, OnlinePlayer,
    OnlinePlayers, Player, PluginHost, StaticHost, World,
};

pub use lore::{
    AmountRange, ExistingLoreMode, IntegrationRegistry, LoreApplicator, LoreCandidate,
    LoreContext, LorePool, RandomLoreEngine, Template, TemplateRenderer, TemplateSelector,
    VariableResolver,
};

/// Core error type for the lore engine.
#[derive(thiserror::Error, Debug)]
pub enum LoreError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be read or written
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration or item data could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration is structurally invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A soft integration with another host plugin failed
    #[error("Integration error: {0}")]
    Integration(String),

    /// A command could not be parsed
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Result type used throughout the itemlore codebase.
pub type LoreResult<T> = Result<T, LoreError>;

/// Version information for the plugin.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values.
pub mod config {
    /// Separator drawn above generated lore
    pub const DEFAULT_TOP_SEPARATOR: &str = "&8&m⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤";

    /// Separator drawn below generated lore
    pub const DEFAULT_BOTTOM_SEPARATOR: &str = "&8&m⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤⏤";

    /// Separator between the descriptive and informational blocks
    pub const DEFAULT_INFO_SEPARATOR: &str = "&8&m· · · · · · · · · · · · · · · · · · · ·";

    /// Durability line with low/medium/high value slots
    pub const DEFAULT_DURABILITY_FORMAT: &str =
        "&8❖ &7Durability: &c%ilore_current_low%&e%ilore_current_medium%&a%ilore_current_high%&8/&f%ilore_max%";

    /// strftime pattern for the acquisition timestamp
    pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Acquisition time line
    pub const DEFAULT_TIME_PREFIX: &str = "&7Obtained: &f%ilore_time%";

    /// Acquirer line
    pub const DEFAULT_PLAYER_PREFIX: &str = "&7Owner: &f%ilore_player%";

    /// Source line
    pub const DEFAULT_SOURCE_PREFIX: &str = "&7Source: &f%ilore_source%";

    /// Keywords identifying lore this plugin already wrote
    pub const DEFAULT_DETECTION_KEYWORDS: [&str; 4] =
        ["&8❖ &7Durability", "&7Obtained", "&7Owner", "&7Source"];

    /// Weight given to pool entries whose weight cannot be parsed
    pub const DEFAULT_CANDIDATE_WEIGHT: f64 = 0.5;

    /// Lowest weight a pool entry can carry
    pub const MIN_CANDIDATE_WEIGHT: f64 = 0.1;

    /// Highest weight a pool entry can carry
    pub const MAX_CANDIDATE_WEIGHT: f64 = 1.0;
}
