//! # In-Memory Host
//!
//! A self-contained [`PluginHost`] used by the command-line harness and tests.

use crate::host::plugins::{CallArg, Economy, HostPlugin, PlaceholderService, PluginHost};
use crate::host::{MobEntity, Player};
use crate::{LoreError, LoreResult};
use std::collections::HashMap;
use uuid::Uuid;

type CallHandler = dyn Fn(&str, &[CallArg<'_>]) -> LoreResult<Option<String>>;

/// A plugin whose methods are answered by a closure.
pub struct FnPlugin {
    name: String,
    enabled: bool,
    handler: Box<CallHandler>,
}

impl FnPlugin {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str, &[CallArg<'_>]) -> LoreResult<Option<String>> + 'static,
    {
        Self {
            name: name.into(),
            enabled: true,
            handler: Box::new(handler),
        }
    }

    /// A loaded plugin that exposes no callable methods.
    pub fn inert(name: impl Into<String>) -> Self {
        Self::new(name, |_, _| Ok(None))
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl HostPlugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn call(&self, method: &str, args: &[CallArg<'_>]) -> LoreResult<Option<String>> {
        (self.handler)(method, args)
    }
}

/// Economy backed by a fixed balance table.
#[derive(Debug, Clone, Default)]
pub struct FixedEconomy {
    balances: HashMap<Uuid, f64>,
}

impl FixedEconomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, player: &Player, balance: f64) -> Self {
        self.balances.insert(player.id, balance);
        self
    }
}

impl Economy for FixedEconomy {
    fn balance(&self, player: &Player) -> LoreResult<f64> {
        self.balances
            .get(&player.id)
            .copied()
            .ok_or_else(|| LoreError::Integration(format!("no account for {}", player.name)))
    }
}

/// Host with a fixed set of plugins and services.
///
/// # Examples
///
/// ```
/// use itemlore::{FnPlugin, PluginHost, StaticHost};
///
/// let host = StaticHost::new().with_plugin(FnPlugin::inert("Vault"));
/// assert!(host.is_plugin_enabled("vault"));
/// assert!(!host.is_plugin_enabled("MultiWorld"));
/// ```
#[derive(Default)]
pub struct StaticHost {
    plugins: Vec<Box<dyn HostPlugin>>,
    placeholders: Option<Box<dyn PlaceholderService>>,
    economy: Option<Box<dyn Economy>>,
    mob_names: HashMap<Uuid, String>,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plugin(mut self, plugin: impl HostPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn with_placeholder_service(mut self, service: impl PlaceholderService + 'static) -> Self {
        self.placeholders = Some(Box::new(service));
        self
    }

    pub fn with_economy(mut self, economy: impl Economy + 'static) -> Self {
        self.economy = Some(Box::new(economy));
        self
    }

    /// Registers a name that a mob-naming plugin reports for `mob`.
    pub fn with_mob_name(mut self, mob: &MobEntity, name: impl Into<String>) -> Self {
        self.mob_names.insert(mob.id, name.into());
        self
    }

    /// Names of all loaded plugins.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }
}

impl PluginHost for StaticHost {
    fn plugin(&self, name: &str) -> Option<&dyn HostPlugin> {
        self.plugins
            .iter()
            .find(|plugin| plugin.name().eq_ignore_ascii_case(name))
            .map(|plugin| &**plugin)
    }

    fn placeholder_service(&self) -> Option<&dyn PlaceholderService> {
        self.placeholders.as_deref()
    }

    fn economy(&self) -> Option<&dyn Economy> {
        self.economy.as_deref()
    }

    fn mob_display_name(&self, mob: &MobEntity) -> LoreResult<Option<String>> {
        Ok(self.mob_names.get(&mob.id).cloned())
    }
}
