//! # Plugin Context
//!
//! [`ItemLorePlugin`] is the object the bootstrap creates once and owns for
//! the plugin's lifetime. It holds the active settings snapshot, the host,
//! the integration registry and the random number generator, and hands
//! short-lived [`LoreContext`] borrows to the lore components.
//!
//! Settings are an immutable [`Arc`] snapshot. Reloading builds a complete
//! new snapshot first and swaps it in with a single assignment, so a failed
//! reload leaves the previous configuration active.

use crate::host::{ItemStack, Player, PluginHost};
use crate::lore::{
    IntegrationRegistry, LoreApplicator, LoreContext, RandomLoreEngine, SourceLabels, Template,
};
use crate::settings::{Settings, BUNDLED_CONFIG};
use crate::{LoreError, LoreResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The running plugin.
pub struct ItemLorePlugin {
    settings: Arc<Settings>,
    config_path: Option<PathBuf>,
    host: Box<dyn PluginHost>,
    integrations: IntegrationRegistry,
    rng: StdRng,
}

impl ItemLorePlugin {
    /// Creates the plugin from in-memory settings.
    ///
    /// The generator is seeded from `settings.seed` when present.
    pub fn new(settings: Settings, host: Box<dyn PluginHost>) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let plugin = Self {
            settings: Arc::new(settings),
            config_path: None,
            host,
            integrations: IntegrationRegistry::with_defaults(),
            rng,
        };
        plugin.detect_integrations();
        plugin
    }

    /// Loads the configuration file at `path`, writing the bundled default
    /// configuration there first if it does not exist.
    pub fn from_config_file(path: impl AsRef<Path>, host: Box<dyn PluginHost>) -> LoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, BUNDLED_CONFIG)?;
            info!("Wrote default configuration to {}", path.display());
        }

        let settings = Settings::load(path)?;
        let mut plugin = Self::new(settings, host);
        plugin.config_path = Some(path.to_path_buf());
        Ok(plugin)
    }

    /// Replaces the random generator with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared handle on the current settings snapshot.
    pub fn snapshot(&self) -> Arc<Settings> {
        Arc::clone(&self.settings)
    }

    pub fn host(&self) -> &dyn PluginHost {
        &*self.host
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Registry of soft integrations, for registering extra adapters.
    pub fn integrations_mut(&mut self) -> &mut IntegrationRegistry {
        &mut self.integrations
    }

    /// Re-reads the configuration file.
    pub fn reload(&mut self) -> LoreResult<()> {
        let path = self
            .config_path
            .as_ref()
            .ok_or_else(|| LoreError::InvalidConfig("no configuration file to reload".to_string()))?;

        let fresh = Settings::load(path)?;
        self.settings = Arc::new(fresh);
        info!("Configuration reloaded from {}", path.display());
        Ok(())
    }

    /// Writes the current settings back to the configuration file.
    pub fn save_config(&self) -> LoreResult<()> {
        match &self.config_path {
            Some(path) => {
                self.settings.save(path)?;
                debug!("Configuration saved to {}", path.display());
                Ok(())
            }
            None => {
                debug!("No configuration file; settings kept in memory only");
                Ok(())
            }
        }
    }

    /// Publishes a modified copy of the settings as the new snapshot.
    pub fn update_settings(&mut self, update: impl FnOnce(&mut Settings)) {
        let mut settings = Settings::clone(&self.settings);
        update(&mut settings);
        self.settings = Arc::new(settings);
    }

    /// Borrow of everything a lore component reads.
    pub fn context(&self) -> LoreContext<'_> {
        LoreContext::new(&self.settings, &*self.host, &self.integrations)
    }

    fn split(&mut self) -> (LoreContext<'_>, &mut StdRng) {
        (
            LoreContext::new(&self.settings, &*self.host, &self.integrations),
            &mut self.rng,
        )
    }

    /// Applies lore to `item`; see [`LoreApplicator::apply`].
    pub fn apply(&mut self, item: &mut ItemStack, player: &Player, source: &str) -> bool {
        let (ctx, rng) = self.split();
        LoreApplicator::new(ctx).apply(item, player, source, rng)
    }

    /// Applies lore with an explicitly chosen template.
    pub fn apply_template(
        &mut self,
        item: &mut ItemStack,
        player: &Player,
        source: &str,
        template: &Template,
    ) -> bool {
        let (ctx, rng) = self.split();
        LoreApplicator::new(ctx).apply_with_template(item, player, source, Some(template), rng)
    }

    /// Whether the top-level `item-types` filter accepts `item`.
    pub fn should_process_item(&self, item: &ItemStack) -> bool {
        LoreApplicator::new(self.context()).should_process_item(item)
    }

    /// Random lore lines for `item` without touching it.
    pub fn generate_random_lore(&mut self, item: &ItemStack, player: &Player) -> Vec<String> {
        let (ctx, rng) = self.split();
        RandomLoreEngine::new(ctx).generate(item, player, rng)
    }

    pub fn source_labels(&self) -> SourceLabels<'_> {
        SourceLabels::new(self.context())
    }

    /// Logs and returns the soft integrations whose plugins are present.
    pub fn detect_integrations(&self) -> Vec<String> {
        let mut detected: Vec<String> = self
            .integrations
            .available(&*self.host)
            .into_iter()
            .map(str::to_string)
            .collect();
        if self.host.placeholder_service().is_some() {
            detected.push("PlaceholderAPI".to_string());
        }

        for name in &detected {
            info!("Hooked into {}", name);
        }
        if detected.is_empty() {
            debug!("No soft integrations detected");
        }
        detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FnPlugin, StaticHost};
    use crate::lore::{Integration, VariableResolver};
    use tempfile::tempdir;

    #[test]
    fn test_seeded_plugins_agree() {
        let mut settings = Settings::bundled().unwrap();
        settings.seed = Some(99);
        let player = Player::new("Alex");
        let item = ItemStack::new("DIAMOND_SWORD");

        let mut first = ItemLorePlugin::new(settings.clone(), Box::new(StaticHost::new()));
        let mut second = ItemLorePlugin::new(settings, Box::new(StaticHost::new()));
        assert_eq!(
            first.generate_random_lore(&item, &player),
            second.generate_random_lore(&item, &player)
        );
    }

    #[test]
    fn test_from_config_file_writes_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plugins").join("itemlore").join("config.yml");

        let plugin = ItemLorePlugin::from_config_file(&path, Box::new(StaticHost::new())).unwrap();
        assert!(path.exists());
        assert!(plugin.settings().lore.random_lore.enabled);
        assert_eq!(plugin.config_path(), Some(path.as_path()));
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let mut plugin = ItemLorePlugin::from_config_file(&path, Box::new(StaticHost::new())).unwrap();
        let before = plugin.snapshot();

        fs::write(&path, "lore: [not, a, mapping]").unwrap();
        assert!(plugin.reload().is_err());
        assert!(Arc::ptr_eq(&before, &plugin.snapshot()));
    }

    #[test]
    fn test_reload_without_file_is_error() {
        let mut plugin = ItemLorePlugin::new(Settings::default(), Box::new(StaticHost::new()));
        assert!(matches!(plugin.reload(), Err(LoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_update_settings_swaps_snapshot() {
        let mut plugin = ItemLorePlugin::new(Settings::default(), Box::new(StaticHost::new()));
        let before = plugin.snapshot();
        plugin.update_settings(|settings| settings.existing_lore.mode = "IGNORE".to_string());

        assert_eq!(before.existing_lore.mode, "APPEND");
        assert_eq!(plugin.settings().existing_lore.mode, "IGNORE");
    }

    #[test]
    fn test_detect_integrations() {
        let host = StaticHost::new()
            .with_plugin(FnPlugin::inert("Vault"))
            .with_placeholder_service(|_: &Player, text: &str| -> LoreResult<String> { Ok(text.to_string()) });
        let plugin = ItemLorePlugin::new(Settings::default(), Box::new(host));
        assert_eq!(plugin.detect_integrations(), vec!["Vault", "PlaceholderAPI"]);
    }

    struct GuildIntegration;

    impl Integration for GuildIntegration {
        fn plugin_name(&self) -> &str {
            "Guilds"
        }

        fn namespaces(&self) -> &[&'static str] {
            &["guild"]
        }

        fn resolve_variable(
            &self,
            variable: &str,
            player: &Player,
            _item: &ItemStack,
            _host: &dyn PluginHost,
        ) -> LoreResult<Option<String>> {
            Ok((variable == "name").then(|| format!("{}'s Guild", player.name)))
        }
    }

    #[test]
    fn test_registered_integration_resolves() {
        let host = StaticHost::new().with_plugin(FnPlugin::inert("Guilds"));
        let mut plugin = ItemLorePlugin::new(Settings::default(), Box::new(host));
        plugin.integrations_mut().register(GuildIntegration);

        assert!(plugin.detect_integrations().contains(&"Guilds".to_string()));

        let resolver = VariableResolver::new(plugin.context());
        let text = resolver.resolve(
            "Member of %guild_name% (%guild_rank%)",
            &Player::new("Alex"),
            &ItemStack::new("IRON_SWORD"),
        );
        assert_eq!(text, "Member of Alex's Guild (%guild_rank%)");
    }
}
