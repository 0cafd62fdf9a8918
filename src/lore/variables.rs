//! # Variable Resolution
//!
//! Replaces `%category_name%` tokens in lore text.
//!
//! Resolution runs in three passes:
//!
//! 1. Built-in item, player and world variables.
//! 2. The host's placeholder service, when one is installed.
//! 3. A scan for `%namespace_variable%` tokens, each dispatched through the
//!    [`IntegrationRegistry`]. Known namespaces go to their adapter; anything
//!    else is offered to the plugin of that name by [`DynamicPluginIntegration`].
//!
//! Resolution never fails. A token nobody can resolve, or whose adapter
//! errors, stays in the text exactly as written.

use crate::host::{CallArg, ItemStack, Player, PluginHost};
use crate::lore::format::humanize_identifier;
use crate::lore::LoreContext;
use crate::{LoreError, LoreResult};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// `%namespace_variable%`; the namespace itself never contains `_`.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%([A-Za-z0-9]+)_([A-Za-z0-9_]+)%").expect("token pattern is a valid regex")
});

/// A soft integration with another host plugin.
pub trait Integration {
    /// Name of the host plugin this adapter talks to.
    fn plugin_name(&self) -> &str;

    /// Token namespaces served by this adapter, lower case.
    fn namespaces(&self) -> &[&'static str];

    /// Whether the backing plugin is present and enabled.
    fn is_available(&self, host: &dyn PluginHost) -> bool {
        host.is_plugin_enabled(self.plugin_name())
    }

    /// Resolves one variable. `Ok(None)` leaves the token untouched.
    fn resolve_variable(
        &self,
        variable: &str,
        player: &Player,
        item: &ItemStack,
        host: &dyn PluginHost,
    ) -> LoreResult<Option<String>>;
}

/// Economy values through Vault: `%vault_balance%`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultIntegration;

impl Integration for VaultIntegration {
    fn plugin_name(&self) -> &str {
        "Vault"
    }

    fn namespaces(&self) -> &[&'static str] {
        &["vault"]
    }

    fn resolve_variable(
        &self,
        variable: &str,
        player: &Player,
        _item: &ItemStack,
        host: &dyn PluginHost,
    ) -> LoreResult<Option<String>> {
        if !variable.eq_ignore_ascii_case("balance") {
            return Ok(None);
        }

        let balance = match host.economy() {
            Some(economy) => economy.balance(player).unwrap_or_else(|err| {
                warn!("Could not read balance of {}: {}", player.name, err);
                0.0
            }),
            None => {
                warn!("Vault is enabled but no economy provider is registered");
                0.0
            }
        };

        Ok(Some(format!("{:.2}", balance)))
    }
}

/// World variables served by a multi-world manager plugin.
#[derive(Debug, Clone, Copy)]
pub struct WorldIntegration {
    plugin_name: &'static str,
    namespaces: &'static [&'static str],
}

impl WorldIntegration {
    /// `%mv_world%`, `%multiverse_world_alias%`, ... via Multiverse-Core.
    pub fn multiverse() -> Self {
        Self {
            plugin_name: "Multiverse-Core",
            namespaces: &["mv", "multiverse"],
        }
    }

    /// `%mw_world%`, `%multiworld_world_env%`, ... via MultiWorld.
    pub fn multiworld() -> Self {
        Self {
            plugin_name: "MultiWorld",
            namespaces: &["mw", "multiworld"],
        }
    }

    fn world_alias(&self, player: &Player, host: &dyn PluginHost) -> String {
        let alias = host.plugin(self.plugin_name).map(|plugin| {
            plugin.call("getWorldAlias", &[CallArg::World(&player.world)])
        });

        match alias {
            Some(Ok(Some(alias))) if !alias.is_empty() => alias,
            Some(Err(err)) => {
                warn!("{} failed to provide a world alias: {}", self.plugin_name, err);
                player.world.name.clone()
            }
            _ => player.world.name.clone(),
        }
    }
}

impl Integration for WorldIntegration {
    fn plugin_name(&self) -> &str {
        self.plugin_name
    }

    fn namespaces(&self) -> &[&'static str] {
        self.namespaces
    }

    fn resolve_variable(
        &self,
        variable: &str,
        player: &Player,
        _item: &ItemStack,
        host: &dyn PluginHost,
    ) -> LoreResult<Option<String>> {
        let value = match variable.to_ascii_lowercase().as_str() {
            "world" | "worldname" => player.world.name.clone(),
            "world_alias" | "worldalias" => self.world_alias(player, host),
            "world_env" | "worldenv" => player.world.environment.to_string(),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

/// Best-effort lookup against an arbitrary plugin named after the namespace.
///
/// Tries each conventional accessor with each argument shape until one
/// answers. This is the only place that probes plugins by method name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicPluginIntegration;

impl DynamicPluginIntegration {
    pub const METHODS: [&'static str; 5] = [
        "getVariable",
        "getPlaceholder",
        "getPlaceholderValue",
        "processVariable",
        "processPlaceholder",
    ];

    pub fn resolve(
        &self,
        namespace: &str,
        variable: &str,
        player: &Player,
        host: &dyn PluginHost,
    ) -> LoreResult<Option<String>> {
        let plugin = match host.plugin(namespace) {
            Some(plugin) if plugin.is_enabled() => plugin,
            _ => return Ok(None),
        };

        let shapes: [&[CallArg<'_>]; 3] = [
            &[CallArg::Text(variable), CallArg::Player(player)],
            &[CallArg::Player(player), CallArg::Text(variable)],
            &[CallArg::Text(variable)],
        ];

        for method in Self::METHODS {
            for args in shapes {
                let answer = plugin.call(method, args).map_err(|err| {
                    LoreError::Integration(format!("{}.{}: {}", plugin.name(), method, err))
                })?;
                if let Some(value) = answer {
                    return Ok(Some(value));
                }
            }
        }

        debug!("{} exposes no variable accessor for {}", plugin.name(), variable);
        Ok(None)
    }
}

/// Integration adapters keyed by token namespace.
pub struct IntegrationRegistry {
    integrations: Vec<Box<dyn Integration>>,
    namespaces: HashMap<String, usize>,
    fallback: DynamicPluginIntegration,
}

impl Default for IntegrationRegistry {
    fn default() -> Self {
        Self {
            integrations: Vec::new(),
            namespaces: HashMap::new(),
            fallback: DynamicPluginIntegration,
        }
    }
}

impl IntegrationRegistry {
    /// A registry with no adapters; every namespace goes to the fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Vault, Multiverse-Core and MultiWorld.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(VaultIntegration);
        registry.register(WorldIntegration::multiverse());
        registry.register(WorldIntegration::multiworld());
        registry
    }

    /// Adds an adapter; later registrations win a namespace clash.
    pub fn register(&mut self, integration: impl Integration + 'static) {
        let index = self.integrations.len();
        for namespace in integration.namespaces() {
            self.namespaces.insert(namespace.to_ascii_lowercase(), index);
        }
        self.integrations.push(Box::new(integration));
    }

    /// Plugin names of the adapters whose plugin is currently available.
    pub fn available(&self, host: &dyn PluginHost) -> Vec<&str> {
        self.integrations
            .iter()
            .filter(|integration| integration.is_available(host))
            .map(|integration| integration.plugin_name())
            .collect()
    }

    /// Resolves `%namespace_variable%`.
    pub fn resolve(
        &self,
        namespace: &str,
        variable: &str,
        player: &Player,
        item: &ItemStack,
        host: &dyn PluginHost,
    ) -> LoreResult<Option<String>> {
        match self.namespaces.get(&namespace.to_ascii_lowercase()) {
            Some(&index) => {
                let integration = &self.integrations[index];
                if !integration.is_available(host) {
                    return Ok(None);
                }
                integration.resolve_variable(variable, player, item, host)
            }
            None => self.fallback.resolve(namespace, variable, player, host),
        }
    }
}

/// Expands variables in lore text.
pub struct VariableResolver<'a> {
    ctx: LoreContext<'a>,
}

impl<'a> VariableResolver<'a> {
    pub fn new(ctx: LoreContext<'a>) -> Self {
        Self { ctx }
    }

    /// Resolves every variable it can and leaves the rest untouched.
    pub fn resolve(&self, text: &str, player: &Player, item: &ItemStack) -> String {
        if !text.contains('%') {
            return text.to_string();
        }

        let mut resolved = replace_builtins(text, player, item);

        if let Some(service) = self.ctx.host.placeholder_service() {
            match service.set_placeholders(player, &resolved) {
                Ok(expanded) => resolved = expanded,
                Err(err) => warn!("Placeholder expansion failed: {}", err),
            }
        }

        if !resolved.contains('%') {
            return resolved;
        }

        TOKEN_PATTERN
            .replace_all(&resolved, |caps: &Captures<'_>| {
                let namespace = &caps[1];
                let variable = &caps[2];
                match self.ctx.integrations.resolve(
                    namespace,
                    variable,
                    player,
                    item,
                    self.ctx.host,
                ) {
                    Ok(Some(value)) => value,
                    Ok(None) => caps[0].to_string(),
                    Err(err) => {
                        warn!("Could not resolve {}: {}", &caps[0], err);
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

fn replace_builtins(text: &str, player: &Player, item: &ItemStack) -> String {
    let material_name = humanize_identifier(item.material.name());
    let item_name = item
        .display_name()
        .map(str::to_string)
        .unwrap_or_else(|| material_name.clone());

    let replacements = [
        ("%ilore_material_name%", material_name.as_str()),
        ("%material_name%", material_name.as_str()),
        ("%ilore_item_name%", item_name.as_str()),
        ("%item_name%", item_name.as_str()),
        ("%ilore_player_displayname%", player.display_name.as_str()),
        ("%ilore_player_name%", player.name.as_str()),
        ("%ilore_player%", player.name.as_str()),
        ("%ilore_world_name%", player.world.name.as_str()),
        ("%ilore_world%", player.world.name.as_str()),
    ];

    replacements
        .iter()
        .fold(text.to_string(), |acc, (token, value)| {
            if acc.contains(token) {
                acc.replace(token, value)
            } else {
                acc
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Environment, FixedEconomy, FnPlugin, StaticHost, World};
    use crate::settings::Settings;

    fn resolve_with(host: &StaticHost, text: &str, player: &Player) -> String {
        let settings = Settings::default();
        let registry = IntegrationRegistry::with_defaults();
        let ctx = LoreContext::new(&settings, host, &registry);
        VariableResolver::new(ctx).resolve(text, player, &ItemStack::new("DIAMOND_SWORD"))
    }

    #[test]
    fn test_builtin_variables() {
        let player = Player::new("Alex").with_display_name("Lady Alex");
        let text = "%ilore_item_name% of %ilore_player% (%ilore_player_displayname%) in %ilore_world%";
        assert_eq!(
            resolve_with(&StaticHost::new(), text, &player),
            "Diamond Sword of Alex (Lady Alex) in world"
        );
    }

    #[test]
    fn test_display_name_wins_for_item_name() {
        let settings = Settings::default();
        let host = StaticHost::new();
        let registry = IntegrationRegistry::with_defaults();
        let resolver = VariableResolver::new(LoreContext::new(&settings, &host, &registry));
        let item = ItemStack::new("BOW").with_display_name("Stormcaller");

        let out = resolver.resolve("%item_name% / %material_name%", &Player::new("Alex"), &item);
        assert_eq!(out, "Stormcaller / Bow");
    }

    #[test]
    fn test_unknown_namespace_is_preserved() {
        let out = resolve_with(&StaticHost::new(), "value: %foo_bar%", &Player::new("Alex"));
        assert_eq!(out, "value: %foo_bar%");
    }

    #[test]
    fn test_plain_percent_signs_survive() {
        let out = resolve_with(&StaticHost::new(), "100% sharp", &Player::new("Alex"));
        assert_eq!(out, "100% sharp");
    }

    #[test]
    fn test_vault_balance() {
        let player = Player::new("Alex");
        let host = StaticHost::new()
            .with_plugin(FnPlugin::inert("Vault"))
            .with_economy(FixedEconomy::new().with_balance(&player, 1234.5));
        assert_eq!(resolve_with(&host, "%vault_balance%", &player), "1234.50");
    }

    #[test]
    fn test_vault_lookup_error_yields_zero() {
        let player = Player::new("Alex");
        let host = StaticHost::new()
            .with_plugin(FnPlugin::inert("Vault"))
            .with_economy(FixedEconomy::new());
        assert_eq!(resolve_with(&host, "%vault_balance%", &player), "0.00");
    }

    #[test]
    fn test_vault_absent_keeps_token() {
        let player = Player::new("Alex");
        assert_eq!(
            resolve_with(&StaticHost::new(), "%vault_balance%", &player),
            "%vault_balance%"
        );
    }

    #[test]
    fn test_world_integration() {
        let player = Player::new("Alex").with_world(World::new("caves", Environment::Nether));
        let host = StaticHost::new().with_plugin(FnPlugin::new("Multiverse-Core", |method, args| {
            match (method, args) {
                ("getWorldAlias", [CallArg::World(world)]) => Ok(Some(format!("The {}", world.name))),
                _ => Ok(None),
            }
        }));

        assert_eq!(resolve_with(&host, "%mv_world%", &player), "caves");
        assert_eq!(resolve_with(&host, "%multiverse_world_alias%", &player), "The caves");
        assert_eq!(resolve_with(&host, "%mv_worldenv%", &player), "NETHER");
        assert_eq!(resolve_with(&host, "%mw_world%", &player), "%mw_world%");
    }

    #[test]
    fn test_world_alias_falls_back_to_name() {
        let player = Player::new("Alex");
        let host = StaticHost::new().with_plugin(FnPlugin::inert("MultiWorld"));
        assert_eq!(resolve_with(&host, "%mw_worldalias%", &player), "world");
    }

    #[test]
    fn test_dynamic_plugin_probing() {
        let host = StaticHost::new().with_plugin(FnPlugin::new("Levels", |method, args| {
            match (method, args) {
                ("getPlaceholder", [CallArg::Player(player), CallArg::Text(name)]) => {
                    Ok(Some(format!("{}:{}", player.name, name)))
                }
                _ => Ok(None),
            }
        }));

        let out = resolve_with(&host, "[%levels_current_level%]", &Player::new("Alex"));
        assert_eq!(out, "[Alex:current_level]");
    }

    #[test]
    fn test_dynamic_plugin_failure_keeps_token() {
        let host = StaticHost::new().with_plugin(FnPlugin::new("Broken", |_, _| {
            Err(LoreError::Integration("boom".to_string()))
        }));
        let out = resolve_with(&host, "%broken_value%", &Player::new("Alex"));
        assert_eq!(out, "%broken_value%");
    }

    #[test]
    fn test_placeholder_service_runs_before_integrations() {
        let host = StaticHost::new().with_placeholder_service(|player: &Player, text: &str| -> LoreResult<String> {
            Ok(text.replace("%server_owner%", &player.name))
        });
        let out = resolve_with(&host, "%server_owner% / %foo_bar%", &Player::new("Alex"));
        assert_eq!(out, "Alex / %foo_bar%");
    }

    #[test]
    fn test_placeholder_service_error_keeps_text() {
        let host = StaticHost::new().with_placeholder_service(|_: &Player, _: &str| -> LoreResult<String> {
            Err(LoreError::Integration("offline".to_string()))
        });
        let out = resolve_with(&host, "%ilore_player% %x_y%", &Player::new("Alex"));
        assert_eq!(out, "Alex %x_y%");
    }

    #[test]
    fn test_registry_reports_available_adapters() {
        let host = StaticHost::new()
            .with_plugin(FnPlugin::inert("Vault"))
            .with_plugin(FnPlugin::inert("MultiWorld").disabled());
        let registry = IntegrationRegistry::with_defaults();
        assert_eq!(registry.available(&host), vec!["Vault"]);
    }
}
