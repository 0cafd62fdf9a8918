//! # Commands
//!
//! The `/itemslore` command: parsing, permission checks and execution.
//!
//! Responses are chat lines returned to the sender, already colorized.
//! Messages for other players (the `give` target) go to their inbox.

pub mod completion;

pub use completion::*;

use crate::host::{ItemStack, OnlinePlayer, OnlinePlayers};
use crate::lore::format::colorize;
use crate::lore::{ExistingLoreMode, LoreApplicator, SourceKind, TemplateSelector};
use crate::plugin::ItemLorePlugin;
use crate::{LoreError, LoreResult};
use log::{info, warn};

/// Permission nodes checked by the command.
pub mod permissions {
    pub const RELOAD: &str = "itemslore.reload";
    pub const CLEAR: &str = "itemslore.clear";
    pub const RANDOM: &str = "itemslore.random";
    pub const MODE: &str = "itemslore.mode";
    pub const GIVE: &str = "itemslore.give";
}

const NO_PERMISSION: &str = "&cYou don't have permission to use this command!";
const PLAYER_ONLY: &str = "&cThis command can only be run by a player!";
const NOT_HOLDING: &str = "&cYou are not holding an item!";

/// Who issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSender {
    /// The server console; holds every permission
    Console,
    /// An online player, by name
    Player(String),
}

impl CommandSender {
    pub fn player(name: impl Into<String>) -> Self {
        CommandSender::Player(name.into())
    }

    pub fn has_permission(&self, players: &OnlinePlayers, permission: &str) -> bool {
        match self {
            CommandSender::Console => true,
            CommandSender::Player(name) => players
                .find(name)
                .map_or(false, |online| online.has_permission(permission)),
        }
    }
}

/// A parsed `/itemslore` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reload,
    /// Remove all lore from the held item
    Clear,
    /// Decorate the held item on demand
    Random,
    TemplateList,
    TemplateInfo(String),
    TemplateApply(String),
    /// Show or change the existing-lore mode
    Mode(Option<String>),
    Give { player: String, source: Option<String> },
    Help,
}

impl Command {
    /// Parses command arguments (without the command label).
    ///
    /// Unknown sub-commands parse as [`Command::Help`]; missing arguments
    /// are reported with a usage line.
    ///
    /// # Examples
    ///
    /// ```
    /// use itemlore::Command;
    ///
    /// assert_eq!(Command::parse(&["give", "Steve", "Loot", "chest"]).unwrap(),
    ///     Command::Give { player: "Steve".into(), source: Some("Loot chest".into()) });
    /// assert_eq!(Command::parse(&["dance"]).unwrap(), Command::Help);
    /// assert!(Command::parse(&["template"]).is_err());
    /// ```
    pub fn parse<S: AsRef<str>>(args: &[S]) -> LoreResult<Self> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let Some(first) = args.first() else {
            return Ok(Command::Help);
        };

        let command = match first.to_ascii_lowercase().as_str() {
            "reload" => Command::Reload,
            "clear" => Command::Clear,
            "random" => Command::Random,
            "template" => Self::parse_template(&args[1..])?,
            "mode" => Command::Mode(args.get(1).map(|mode| mode.to_string())),
            "give" => {
                let player = args
                    .get(1)
                    .ok_or_else(|| usage("/itemslore give <player> [source]"))?;
                let source = (args.len() > 2).then(|| args[2..].join(" "));
                Command::Give {
                    player: player.to_string(),
                    source,
                }
            }
            _ => Command::Help,
        };
        Ok(command)
    }

    fn parse_template(args: &[&str]) -> LoreResult<Self> {
        let sub = args
            .first()
            .ok_or_else(|| usage("/itemslore template <list|info|apply> [name]"))?;

        match sub.to_ascii_lowercase().as_str() {
            "list" => Ok(Command::TemplateList),
            "info" => args
                .get(1)
                .map(|name| Command::TemplateInfo(name.to_string()))
                .ok_or_else(|| usage("/itemslore template info <name>")),
            "apply" => args
                .get(1)
                .map(|name| Command::TemplateApply(name.to_string()))
                .ok_or_else(|| usage("/itemslore template apply <name>")),
            other => Err(LoreError::InvalidCommand(format!(
                "Unknown template sub-command: {}. Available: list, info, apply",
                other
            ))),
        }
    }

    /// Permission required to run this command, if any.
    pub fn permission(&self) -> Option<&'static str> {
        match self {
            Command::Reload => Some(permissions::RELOAD),
            Command::Clear => Some(permissions::CLEAR),
            Command::Random => Some(permissions::RANDOM),
            Command::Mode(_) => Some(permissions::MODE),
            Command::Give { .. } => Some(permissions::GIVE),
            Command::TemplateList
            | Command::TemplateInfo(_)
            | Command::TemplateApply(_)
            | Command::Help => None,
        }
    }

    /// Whether the command acts on the sender's own held item.
    pub fn is_player_only(&self) -> bool {
        matches!(self, Command::Clear | Command::Random | Command::TemplateApply(_))
    }
}

fn usage(text: &str) -> LoreError {
    LoreError::InvalidCommand(format!("Usage: {}", text))
}

/// Chat lines produced by one command.
#[derive(Debug, Default)]
struct Reply {
    lines: Vec<String>,
}

impl Reply {
    fn send(&mut self, line: impl AsRef<str>) {
        self.lines.push(colorize(line.as_ref()));
    }
}

impl ItemLorePlugin {
    /// Runs `/itemslore <args>` for `sender` and returns the chat lines sent back.
    pub fn execute_command<S: AsRef<str>>(
        &mut self,
        sender: &CommandSender,
        args: &[S],
        players: &mut OnlinePlayers,
    ) -> Vec<String> {
        let mut reply = Reply::default();

        let command = match Command::parse(args) {
            Ok(command) => command,
            Err(LoreError::InvalidCommand(message)) => {
                reply.send(format!("&c{}", message));
                return reply.lines;
            }
            Err(err) => {
                reply.send(format!("&c{}", err));
                return reply.lines;
            }
        };

        if command.is_player_only() && *sender == CommandSender::Console {
            reply.send(PLAYER_ONLY);
            return reply.lines;
        }
        if let Some(permission) = command.permission() {
            if !sender.has_permission(players, permission) {
                reply.send(NO_PERMISSION);
                return reply.lines;
            }
        }

        match command {
            Command::Reload => self.reload_command(&mut reply),
            Command::Clear => self.with_sender(sender, players, &mut reply, Self::clear_command),
            Command::Random => self.with_sender(sender, players, &mut reply, Self::random_command),
            Command::TemplateList => self.template_list(&mut reply),
            Command::TemplateInfo(name) => self.template_info(&name, &mut reply),
            Command::TemplateApply(name) => {
                self.with_sender(sender, players, &mut reply, |plugin, online, reply| {
                    plugin.template_apply(&name, online, reply)
                })
            }
            Command::Mode(value) => self.mode_command(value.as_deref(), &mut reply),
            Command::Give { player, source } => {
                self.give_command(&player, source, players, &mut reply)
            }
            Command::Help => help(&mut reply),
        }

        reply.lines
    }

    fn with_sender(
        &mut self,
        sender: &CommandSender,
        players: &mut OnlinePlayers,
        reply: &mut Reply,
        run: impl FnOnce(&mut Self, &mut OnlinePlayer, &mut Reply),
    ) {
        let online = match sender {
            CommandSender::Player(name) => players.find_mut(name),
            CommandSender::Console => None,
        };
        match online {
            Some(online) => run(self, online, reply),
            None => reply.send(PLAYER_ONLY),
        }
    }

    fn reload_command(&mut self, reply: &mut Reply) {
        match self.reload() {
            Ok(()) => reply.send("&aItemsLore configuration reloaded!"),
            Err(err) => {
                warn!("Reload failed, keeping previous configuration: {}", err);
                reply.send(format!("&cReload failed, previous configuration kept: {}", err));
            }
        }
    }

    fn clear_command(&mut self, online: &mut OnlinePlayer, reply: &mut Reply) {
        match online.main_hand.meta.as_mut() {
            Some(meta) => {
                meta.lore.clear();
                reply.send("&aCleared all lore from the held item!");
            }
            None => reply.send("&cYou are not holding an item, or it has no metadata!"),
        }
    }

    fn random_command(&mut self, online: &mut OnlinePlayer, reply: &mut Reply) {
        if online.main_hand.is_air() {
            reply.send(NOT_HOLDING);
            return;
        }
        if !self.settings().lore.random_lore.enabled {
            reply.send("&cRandom lore is disabled! Enable it in the configuration.");
            return;
        }

        let source = self.source_labels().label(SourceKind::Command);
        let OnlinePlayer {
            player, main_hand, ..
        } = online;
        if self.apply(main_hand, player, &source) {
            reply.send("&aAdded random lore to the held item!");
        } else {
            reply.send(self.refusal_reason(main_hand, "lore"));
        }
    }

    fn template_list(&self, reply: &mut Reply) {
        let templates = &self.settings().lore.templates;
        if templates.is_empty() {
            reply.send("&cNo templates are configured!");
            return;
        }

        reply.send("&6=== Available lore templates ===");
        for (name, template) in templates.iter().filter(|(_, template)| template.enabled) {
            reply.send(format!("&e - {}&7 (applies to: {})", name, describe_types(&template.item_types)));
        }
        reply.send("&eUse /itemslore template info <name> to see a template");
        reply.send("&eUse /itemslore template apply <name> to apply it to the held item");
    }

    fn template_info(&self, name: &str, reply: &mut Reply) {
        let Some(template) = TemplateSelector::new(self.context()).find(name) else {
            reply.send(format!("&cNo template named '{}'!", name));
            return;
        };

        reply.send(format!("&6=== Template: {} ===", template.name));
        reply.send(if template.enabled {
            "&eStatus: &aenabled"
        } else {
            "&eStatus: &cdisabled"
        });
        reply.send(format!("&eApplies to: &f{}", describe_types(&template.item_types)));
        reply.send("&eContent:");
        for (index, line) in template.content.iter().enumerate() {
            reply.send(format!("&7 {}. {}", index + 1, line));
        }
    }

    fn template_apply(&mut self, name: &str, online: &mut OnlinePlayer, reply: &mut Reply) {
        let Some(template) = TemplateSelector::new(self.context()).find(name) else {
            reply.send(format!("&cNo template named '{}'!", name));
            return;
        };
        if !template.enabled {
            reply.send("&cThat template is disabled!");
            return;
        }
        if online.main_hand.is_air() {
            reply.send(NOT_HOLDING);
            return;
        }
        if !template.matches(online.main_hand.material.name()) {
            reply.send("&cThat template does not apply to the item you are holding!");
            return;
        }

        let applicator_mode = LoreApplicator::new(self.context()).existing_lore_mode();
        if applicator_mode == ExistingLoreMode::Overwrite {
            if let Some(meta) = online.main_hand.meta.as_mut() {
                meta.lore.clear();
            }
        }

        let source = self.source_labels().label(SourceKind::Template);
        let OnlinePlayer {
            player, main_hand, ..
        } = online;
        if self.apply_template(main_hand, player, &source, &template) {
            reply.send(format!("&aApplied template '{}' to the held item!", template.name));
        } else {
            reply.send(self.refusal_reason(main_hand, "the template"));
        }
    }

    fn mode_command(&mut self, value: Option<&str>, reply: &mut Reply) {
        let Some(value) = value else {
            reply.send("&6=== Existing lore mode ===");
            reply.send(format!("&eMode: &f{}", self.settings().existing_lore.mode));
            for mode in ExistingLoreMode::ALL {
                reply.send(format!("&e- {}: &f{}", mode, describe_mode(mode)));
            }
            reply.send("&eUse /itemslore mode <APPEND|OVERWRITE|IGNORE> to change it");
            return;
        };

        let mode: ExistingLoreMode = match value.parse() {
            Ok(mode) => mode,
            Err(_) => {
                reply.send("&cInvalid mode! Valid values: APPEND, OVERWRITE, IGNORE");
                return;
            }
        };

        self.update_settings(|settings| settings.existing_lore.mode = mode.to_string());
        if let Err(err) = self.save_config() {
            warn!("Could not save configuration: {}", err);
            reply.send(format!("&cMode changed but the configuration could not be saved: {}", err));
        }
        info!("Existing-lore mode set to {}", mode);

        reply.send(format!("&aExisting lore mode set to: {}", mode));
        reply.send(format!("&e{}", describe_mode(mode)));
    }

    fn give_command(
        &mut self,
        target: &str,
        source: Option<String>,
        players: &mut OnlinePlayers,
        reply: &mut Reply,
    ) {
        let Some(online) = players.find_mut(target) else {
            reply.send(format!("&cNo online player named {}", target));
            return;
        };
        if online.main_hand.is_air() {
            reply.send(format!("&cPlayer {} is not holding an item!", target));
            return;
        }
        if !self.should_process_item(&online.main_hand) {
            reply.send("&cThat item is not eligible! Check the item-types setting.");
            return;
        }

        let source = source.unwrap_or_else(|| self.source_labels().label(SourceKind::Give));
        let applied = {
            let OnlinePlayer {
                player, main_hand, ..
            } = &mut *online;
            self.apply(main_hand, player, &source)
        };

        if applied {
            reply.send(format!("&aAdded lore to the held item of {}!", target));
            online.send_message(colorize("&aYour held item has been granted mysterious properties!"));
        } else {
            reply.send(self.refusal_reason(&online.main_hand, "lore"));
        }
    }

    /// Explains why an apply call left `item` untouched.
    fn refusal_reason(&self, item: &ItemStack, what: &str) -> String {
        let mode = LoreApplicator::new(self.context()).existing_lore_mode();
        if mode == ExistingLoreMode::Ignore && !item.lore().is_empty() {
            format!("&eThe item already has lore and the mode is IGNORE; {} was not applied.", what)
        } else {
            format!("&eThe item probably already carries generated lore; {} was not applied.", what)
        }
    }
}

fn describe_types(item_types: &[String]) -> String {
    if item_types.is_empty() {
        "all items".to_string()
    } else {
        item_types.join(", ")
    }
}

fn describe_mode(mode: ExistingLoreMode) -> &'static str {
    match mode {
        ExistingLoreMode::Append => "add new lore after the existing lore",
        ExistingLoreMode::Overwrite => "replace the existing lore",
        ExistingLoreMode::Ignore => "skip items that already have lore",
    }
}

fn help(reply: &mut Reply) {
    reply.send("&6=== ItemsLore commands ===");
    for (usage, description) in [
        ("/itemslore reload", "reload the configuration"),
        ("/itemslore clear", "remove all lore from the held item"),
        ("/itemslore random", "add random lore to the held item"),
        ("/itemslore template list", "list available templates"),
        ("/itemslore template info <name>", "show a template"),
        ("/itemslore template apply <name>", "apply a template to the held item"),
        ("/itemslore mode", "show the existing lore mode"),
        ("/itemslore mode <APPEND|OVERWRITE|IGNORE>", "change the existing lore mode"),
        ("/itemslore give <player> [source]", "add lore to a player's held item"),
        ("/itemslore help", "show this help"),
    ] {
        reply.send(format!("&e{} &f- {}", usage, description));
    }
}
