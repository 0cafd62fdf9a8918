//! # Host Capabilities
//!
//! Narrow traits through which the game server exposes optional features.
//!
//! None of these capabilities are required. A host that offers nothing still
//! gets fully rendered lore; only the variables that depend on a missing
//! capability stay unresolved.

use crate::host::{ItemStack, MobEntity, Player, World};
use crate::LoreResult;

/// Argument passed to a dynamically invoked plugin method.
#[derive(Debug, Clone, Copy)]
pub enum CallArg<'a> {
    Text(&'a str),
    Player(&'a Player),
    Item(&'a ItemStack),
    World(&'a World),
}

/// Another plugin loaded into the host.
///
/// `call` is the host's reflection facility: it invokes `method` with the
/// given argument shape. `Ok(None)` means the plugin has no method with that
/// name and signature; an `Err` means the method exists but failed.
pub trait HostPlugin {
    /// Registered plugin name, e.g. `Multiverse-Core`.
    fn name(&self) -> &str;

    /// Whether the plugin finished enabling.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Invokes a method by name.
    fn call(&self, method: &str, args: &[CallArg<'_>]) -> LoreResult<Option<String>>;
}

/// Community placeholder-expansion service.
pub trait PlaceholderService {
    /// Expands every placeholder the service knows in `text`.
    fn set_placeholders(&self, player: &Player, text: &str) -> LoreResult<String>;
}

impl<F> PlaceholderService for F
where
    F: Fn(&Player, &str) -> LoreResult<String>,
{
    fn set_placeholders(&self, player: &Player, text: &str) -> LoreResult<String> {
        self(player, text)
    }
}

/// Economy service registered by an economy bridge plugin.
pub trait Economy {
    fn balance(&self, player: &Player) -> LoreResult<f64>;
}

/// The game server, as far as the lore engine needs it.
pub trait PluginHost {
    /// Looks up a loaded plugin by name (case-insensitive).
    fn plugin(&self, name: &str) -> Option<&dyn HostPlugin>;

    /// Whether a plugin with that name is loaded and enabled.
    fn is_plugin_enabled(&self, name: &str) -> bool {
        self.plugin(name).map_or(false, |plugin| plugin.is_enabled())
    }

    /// Placeholder expansion, when such a service is installed.
    fn placeholder_service(&self) -> Option<&dyn PlaceholderService> {
        None
    }

    /// Economy provider, when one is registered.
    fn economy(&self) -> Option<&dyn Economy> {
        None
    }

    /// Display name assigned to a mob by a mob-naming plugin.
    fn mob_display_name(&self, mob: &MobEntity) -> LoreResult<Option<String>> {
        let _ = mob;
        Ok(None)
    }
}
