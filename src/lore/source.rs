//! # Acquisition Sources
//!
//! Turns the way an item was acquired into the text recorded in its lore.

use crate::host::MobEntity;
use crate::lore::format::humanize_identifier;
use crate::lore::LoreContext;
use crate::settings::SourceSettings;
use log::warn;

/// Placeholder for the mob's name in the mob-kill label.
pub const MOB: &str = "%ilore_mob%";

/// Ways an item can be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Pickup,
    Craft,
    Enchant,
    Mend,
    Fishing,
    Furnace,
    Smithing,
    Anvil,
    Consume,
    Command,
    Template,
    Give,
}

impl SourceKind {
    /// The configured label for this kind.
    pub fn label<'s>(&self, sources: &'s SourceSettings) -> &'s str {
        match self {
            SourceKind::Pickup => &sources.pickup,
            SourceKind::Craft => &sources.craft,
            SourceKind::Enchant => &sources.enchant,
            SourceKind::Mend => &sources.mend,
            SourceKind::Fishing => &sources.fishing,
            SourceKind::Furnace => &sources.furnace,
            SourceKind::Smithing => &sources.smithing,
            SourceKind::Anvil => &sources.anvil,
            SourceKind::Consume => &sources.consume,
            SourceKind::Command => &sources.command,
            SourceKind::Template => &sources.template,
            SourceKind::Give => &sources.give,
        }
    }
}

/// Builds source labels from the active settings.
pub struct SourceLabels<'a> {
    ctx: LoreContext<'a>,
}

impl<'a> SourceLabels<'a> {
    pub fn new(ctx: LoreContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn label(&self, kind: SourceKind) -> String {
        kind.label(&self.ctx.settings.sources).to_string()
    }

    /// Label for a pickup, naming the mob when the item was its drop.
    pub fn pickup(&self, dropper: Option<&MobEntity>) -> String {
        match dropper {
            Some(mob) => self.mob_kill(mob),
            None => self.label(SourceKind::Pickup),
        }
    }

    /// `sources.mob-kill` with the mob's name filled in.
    pub fn mob_kill(&self, mob: &MobEntity) -> String {
        self.ctx.settings.sources.mob_kill.replace(MOB, &self.mob_name(mob))
    }

    /// Display name of a mob.
    ///
    /// A mob-naming plugin's name wins, then the mob's own name tag, then the
    /// configured name for its type, then the humanized type.
    pub fn mob_name(&self, mob: &MobEntity) -> String {
        match self.ctx.host.mob_display_name(mob) {
            Ok(Some(name)) if !name.is_empty() => return name,
            Ok(_) => {}
            Err(err) => warn!("Mob naming lookup failed for {}: {}", mob.kind, err),
        }

        if let Some(name) = mob.custom_name.as_deref().filter(|name| !name.is_empty()) {
            return name.to_string();
        }

        self.ctx
            .settings
            .sources
            .mob_names
            .iter()
            .find(|(kind, _)| kind.eq_ignore_ascii_case(&mob.kind))
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| humanize_identifier(&mob.kind))
    }
}
