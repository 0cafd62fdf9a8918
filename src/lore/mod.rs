//! # Lore Engine
//!
//! Everything that turns configuration plus an acquired item into lore lines.
//!
//! ## Pipeline
//!
//! 1. [`apply::LoreApplicator`] checks the idempotence guard and the
//!    existing-lore policy.
//! 2. [`random::RandomLoreEngine`] draws the random lines once.
//! 3. [`template::TemplateSelector`] picks the layout and
//!    [`template::TemplateRenderer`] expands it, resolving variables through
//!    [`variables::VariableResolver`] and colors through [`format`].
//! 4. The applicator merges the result with any existing lore and writes it
//!    back into the item's metadata.
//!
//! Components never reach for global state. Each one is constructed from a
//! [`LoreContext`], a cheap borrow of the plugin's settings snapshot, host and
//! integration registry.

pub mod apply;
pub mod classify;
pub mod format;
pub mod random;
pub mod source;
pub mod template;
pub mod variables;

pub use apply::*;
pub use random::*;
pub use source::*;
pub use template::*;
pub use variables::*;

use crate::host::PluginHost;
use crate::settings::Settings;

/// Shared, read-only view handed to every lore component.
#[derive(Clone, Copy)]
pub struct LoreContext<'a> {
    pub settings: &'a Settings,
    pub host: &'a dyn PluginHost,
    pub integrations: &'a IntegrationRegistry,
}

impl<'a> LoreContext<'a> {
    pub fn new(
        settings: &'a Settings,
        host: &'a dyn PluginHost,
        integrations: &'a IntegrationRegistry,
    ) -> Self {
        Self {
            settings,
            host,
            integrations,
        }
    }
}
