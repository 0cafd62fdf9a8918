//! # Itemlore Command-Line Harness
//!
//! Loads a configuration and drives the lore engine against an in-memory
//! host: apply lore to an item given as JSON, run a plugin command, or check
//! the configuration.

use clap::{Parser, Subcommand, ValueEnum};
use itemlore::commands::permissions;
use itemlore::{
    CommandSender, ItemEvent, ItemEventKind, ItemLorePlugin, ItemMeta, ItemStack, LoreError,
    LoreResult, MobEntity, OnlinePlayer, OnlinePlayers, Player, Settings, SourceKind, StaticHost,
};
use log::{info, LevelFilter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Command line arguments for the itemlore harness.
#[derive(Parser, Debug)]
#[command(name = "itemlore")]
#[command(about = "Applies configurable acquisition lore to game items")]
#[command(version)]
struct Args {
    /// Configuration file (YAML or JSON); created with defaults if missing
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for lore generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Apply lore to an item and print the result
    Apply {
        /// Item as JSON, e.g. '{"material": "DIAMOND_SWORD"}'
        #[arg(long)]
        item: String,

        /// Name of the acquiring player
        #[arg(long, default_value = "Steve")]
        player: String,

        /// Source text; defaults to the configured command label
        #[arg(long)]
        source: Option<String>,

        /// Deliver the item through an acquisition event instead
        #[arg(long, value_enum)]
        event: Option<EventArg>,

        /// Mob type that dropped the item (pickup events)
        #[arg(long)]
        mob: Option<String>,
    },
    /// Run an /itemslore command
    Exec {
        /// Run as this online player instead of the console
        #[arg(long = "as")]
        as_player: Option<String>,

        /// Item held by the player, as JSON
        #[arg(long)]
        item: Option<String>,

        /// Command arguments, e.g. `template list`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Validate the configuration and print a summary
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EventArg {
    Pickup,
    Craft,
    PrepareCraft,
    Enchant,
    Mend,
    Fish,
    Furnace,
    Smithing,
    Anvil,
    Consume,
}

impl EventArg {
    fn into_kind(self, mob: Option<&str>) -> ItemEventKind {
        match self {
            EventArg::Pickup => ItemEventKind::Pickup {
                dropper: mob.map(|kind| MobEntity::new(kind)),
            },
            EventArg::Craft => ItemEventKind::Craft,
            EventArg::PrepareCraft => ItemEventKind::PrepareCraft,
            EventArg::Enchant => ItemEventKind::Enchant,
            EventArg::Mend => ItemEventKind::Mend,
            EventArg::Fish => ItemEventKind::FishCatch,
            EventArg::Furnace => ItemEventKind::FurnaceExtract,
            EventArg::Smithing => ItemEventKind::Smithing,
            EventArg::Anvil => ItemEventKind::Anvil,
            EventArg::Consume => ItemEventKind::Consume,
        }
    }
}

fn main() -> LoreResult<()> {
    let args = Args::parse();

    let debug = args
        .config
        .as_deref()
        .filter(|path| path.exists())
        .and_then(|path| Settings::load(path).ok())
        .map_or(false, |settings| settings.debug);
    initialize_logging(&args.log_level, debug)?;

    info!("Starting itemlore v{}", itemlore::VERSION);

    let mut plugin = create_plugin(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        plugin = plugin.with_seed(seed);
    }

    match args.action {
        Action::Apply {
            item,
            player,
            source,
            event,
            mob,
        } => run_apply(&mut plugin, &item, &player, source, event, mob.as_deref()),
        Action::Exec {
            as_player,
            item,
            args,
        } => run_exec(&mut plugin, as_player, item.as_deref(), &args),
        Action::Check => run_check(&plugin),
    }
}

/// Initializes env_logger, raising verbosity when the configuration asks for debug output.
fn initialize_logging(log_level: &str, debug: bool) -> LoreResult<()> {
    let mut level = LevelFilter::from_str(log_level)
        .map_err(|_| LoreError::InvalidConfig(format!("unknown log level {:?}", log_level)))?;
    if debug && level < LevelFilter::Debug {
        level = LevelFilter::Debug;
    }

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();
    Ok(())
}

fn create_plugin(config: Option<&Path>) -> LoreResult<ItemLorePlugin> {
    let host = Box::new(StaticHost::new());
    match config {
        Some(path) => ItemLorePlugin::from_config_file(path, host),
        None => Ok(ItemLorePlugin::new(Settings::bundled()?, host)),
    }
}

/// Parses an item, giving it a metadata container when the JSON left it out.
fn parse_item(json: &str) -> LoreResult<ItemStack> {
    let mut item: ItemStack = serde_json::from_str(json)?;
    if item.meta.is_none() && !item.is_air() {
        let damage = item.material.is_damageable().then_some(0);
        item.meta = Some(ItemMeta {
            damage,
            ..ItemMeta::default()
        });
    }
    Ok(item)
}

fn run_apply(
    plugin: &mut ItemLorePlugin,
    item_json: &str,
    player_name: &str,
    source: Option<String>,
    event: Option<EventArg>,
    mob: Option<&str>,
) -> LoreResult<()> {
    let mut item = parse_item(item_json)?;
    let player = Player::new(player_name);

    let applied = match event {
        Some(event) => {
            let kind = event.into_kind(mob);
            plugin.handle_event(ItemEvent::new(kind, &player, &mut item))
        }
        None => {
            let source =
                source.unwrap_or_else(|| plugin.source_labels().label(SourceKind::Command));
            plugin.apply(&mut item, &player, &source)
        }
    };

    if !applied {
        println!("Item left unchanged");
    }
    for line in item.lore() {
        println!("{}", line);
    }
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}

fn run_exec(
    plugin: &mut ItemLorePlugin,
    as_player: Option<String>,
    item_json: Option<&str>,
    args: &[String],
) -> LoreResult<()> {
    let mut players = OnlinePlayers::new();
    let sender = match as_player {
        Some(name) => {
            let mut online = [
                permissions::RELOAD,
                permissions::CLEAR,
                permissions::RANDOM,
                permissions::MODE,
                permissions::GIVE,
            ]
            .into_iter()
            .fold(OnlinePlayer::new(Player::new(name.as_str())), |online, permission| {
                online.with_permission(permission)
            });
            if let Some(json) = item_json {
                online = online.holding(parse_item(json)?);
            }
            players.join(online);
            CommandSender::Player(name)
        }
        None => CommandSender::Console,
    };

    for line in plugin.execute_command(&sender, args, &mut players) {
        println!("{}", line);
    }

    if let CommandSender::Player(name) = &sender {
        if let Some(online) = players.find(name) {
            if !online.main_hand.is_air() {
                println!("{}", serde_json::to_string_pretty(&online.main_hand)?);
            }
        }
    }
    Ok(())
}

fn run_check(plugin: &ItemLorePlugin) -> LoreResult<()> {
    let settings = plugin.settings();
    match plugin.config_path() {
        Some(path) => println!("Configuration: {}", path.display()),
        None => println!("Configuration: bundled defaults"),
    }
    println!("Item types: {}", settings.item_types.join(", "));
    println!("Existing lore mode: {}", settings.existing_lore.mode);
    println!(
        "Random lore: {} ({} pools)",
        if settings.lore.random_lore.enabled { "enabled" } else { "disabled" },
        settings.lore.random_lore.pools.len()
    );
    for (name, template) in &settings.lore.templates {
        println!(
            "Template {}: {}, {} lines",
            name,
            if template.enabled { "enabled" } else { "disabled" },
            template.content.len()
        );
    }

    let integrations = plugin.detect_integrations();
    if integrations.is_empty() {
        println!("Integrations: none");
    } else {
        println!("Integrations: {}", integrations.join(", "));
    }
    Ok(())
}
