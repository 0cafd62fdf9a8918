//! # Item Events
//!
//! Host events through which players acquire items, and their translation
//! into lore applications.
//!
//! Every event first passes the top-level `item-types` filter. The source
//! text recorded in the lore comes from the `sources` section of the
//! configuration.

use crate::host::{ItemStack, MobEntity, Player};
use crate::lore::SourceKind;
use crate::plugin::ItemLorePlugin;
use log::debug;

/// The ways the host reports an item entering a player's hands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEventKind {
    /// Picked up from the ground; `dropper` is set for mob-kill drops
    Pickup { dropper: Option<MobEntity> },
    /// Taken out of a crafting result slot
    Craft,
    /// Crafting result shown before it is taken
    PrepareCraft,
    Enchant,
    /// Repaired through mending
    Mend,
    FishCatch,
    FurnaceExtract,
    Smithing,
    Anvil,
    /// Food or potion being consumed
    Consume,
}

impl ItemEventKind {
    /// Source kind for events with a fixed label.
    fn source_kind(&self) -> Option<SourceKind> {
        match self {
            ItemEventKind::Pickup { .. } => None,
            ItemEventKind::Craft | ItemEventKind::PrepareCraft => Some(SourceKind::Craft),
            ItemEventKind::Enchant => Some(SourceKind::Enchant),
            ItemEventKind::Mend => Some(SourceKind::Mend),
            ItemEventKind::FishCatch => Some(SourceKind::Fishing),
            ItemEventKind::FurnaceExtract => Some(SourceKind::Furnace),
            ItemEventKind::Smithing => Some(SourceKind::Smithing),
            ItemEventKind::Anvil => Some(SourceKind::Anvil),
            ItemEventKind::Consume => Some(SourceKind::Consume),
        }
    }
}

/// One item event as delivered by the host.
#[derive(Debug)]
pub struct ItemEvent<'e> {
    pub kind: ItemEventKind,
    pub player: &'e Player,
    pub item: &'e mut ItemStack,
}

impl<'e> ItemEvent<'e> {
    pub fn new(kind: ItemEventKind, player: &'e Player, item: &'e mut ItemStack) -> Self {
        Self { kind, player, item }
    }
}

impl ItemLorePlugin {
    /// Handles an item event, returning whether lore was written.
    pub fn handle_event(&mut self, event: ItemEvent<'_>) -> bool {
        let ItemEvent { kind, player, item } = event;

        if !self.should_process_item(item) {
            debug!("{} filtered out by item-types", item.material);
            return false;
        }

        if kind == ItemEventKind::Consume && !self.settings().add_lore_to_consumed_items {
            return false;
        }

        let source = match &kind {
            ItemEventKind::Pickup { dropper } => self.source_labels().pickup(dropper.as_ref()),
            other => match other.source_kind() {
                Some(source_kind) => self.source_labels().label(source_kind),
                None => return false,
            },
        };

        if kind == ItemEventKind::PrepareCraft {
            // The preview result is only replaced when decoration succeeded
            let mut result = item.clone();
            let applied = self.apply(&mut result, player, &source);
            if applied {
                *item = result;
            }
            return applied;
        }

        self.apply(item, player, &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticHost;
    use crate::settings::Settings;

    fn plugin(settings: Settings) -> ItemLorePlugin {
        ItemLorePlugin::new(settings, Box::new(StaticHost::new())).with_seed(5)
    }

    fn source_only() -> Settings {
        let mut settings = Settings::default();
        settings.lore.templates.insert(
            "default".to_string(),
            crate::settings::TemplateSettings {
                enabled: true,
                item_types: Vec::new(),
                content: vec!["%ilore_source%".to_string()],
            },
        );
        settings
    }

    #[test]
    fn test_event_sources() {
        let mut plugin = plugin(source_only());
        let player = Player::new("Alex");

        let cases = [
            (ItemEventKind::Craft, "§7Source: §fCrafted"),
            (ItemEventKind::Enchant, "§7Source: §fEnchanted"),
            (ItemEventKind::FishCatch, "§7Source: §fFished"),
            (ItemEventKind::FurnaceExtract, "§7Source: §fSmelted"),
            (ItemEventKind::Smithing, "§7Source: §fSmithed"),
            (ItemEventKind::Anvil, "§7Source: §fAnvil"),
            (ItemEventKind::Mend, "§7Source: §fMended"),
        ];
        for (kind, expected) in cases {
            let mut item = ItemStack::new("IRON_SWORD");
            assert!(plugin.handle_event(ItemEvent::new(kind, &player, &mut item)));
            assert_eq!(item.lore(), &[expected.to_string()]);
        }
    }

    #[test]
    fn test_mob_drop_pickup() {
        let mut plugin = plugin(source_only());
        let player = Player::new("Alex");
        let mut item = ItemStack::new("BONE");
        let kind = ItemEventKind::Pickup {
            dropper: Some(MobEntity::new("WITHER_SKELETON")),
        };

        assert!(plugin.handle_event(ItemEvent::new(kind, &player, &mut item)));
        assert_eq!(item.lore(), &["§7Source: §fSlain Wither Skeleton".to_string()]);
    }

    #[test]
    fn test_consume_gated_by_config() {
        let player = Player::new("Alex");

        let mut plugin_off = plugin(source_only());
        let mut bread = ItemStack::new("BREAD");
        assert!(!plugin_off.handle_event(ItemEvent::new(ItemEventKind::Consume, &player, &mut bread)));
        assert!(bread.lore().is_empty());

        let mut settings = source_only();
        settings.add_lore_to_consumed_items = true;
        let mut plugin_on = plugin(settings);
        assert!(plugin_on.handle_event(ItemEvent::new(ItemEventKind::Consume, &player, &mut bread)));
        assert_eq!(bread.lore(), &["§7Source: §fConsumed".to_string()]);
    }

    #[test]
    fn test_item_types_filter() {
        let mut settings = source_only();
        settings.item_types = vec!["SWORD".to_string()];
        let mut plugin = plugin(settings);
        let player = Player::new("Alex");

        let mut dirt = ItemStack::new("DIRT");
        assert!(!plugin.handle_event(ItemEvent::new(ItemEventKind::Craft, &player, &mut dirt)));
        let mut sword = ItemStack::new("WOODEN_SWORD");
        assert!(plugin.handle_event(ItemEvent::new(ItemEventKind::Craft, &player, &mut sword)));
    }

    #[test]
    fn test_prepare_craft_untouched_on_failure() {
        let mut settings = source_only();
        settings.existing_lore.mode = "IGNORE".to_string();
        let mut plugin = plugin(settings);
        let player = Player::new("Alex");

        let mut result = ItemStack::new("BREAD").with_lore(["Baked"]);
        let before = result.clone();
        assert!(!plugin.handle_event(ItemEvent::new(ItemEventKind::PrepareCraft, &player, &mut result)));
        assert_eq!(result, before);

        let mut fresh = ItemStack::new("BREAD");
        assert!(plugin.handle_event(ItemEvent::new(ItemEventKind::PrepareCraft, &player, &mut fresh)));
        assert_eq!(fresh.lore(), &["§7Source: §fCrafted".to_string()]);
    }
}
