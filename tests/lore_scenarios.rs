//! End-to-end lore generation through the public API.

use chrono::NaiveDate;
use itemlore::lore::format::{colorize, strip_formatting};
use itemlore::{
    AmountRange, FnPlugin, IntegrationRegistry, ItemStack, LoreApplicator, LoreCandidate,
    LoreContext, LorePool, LoreResult, Player, RandomLoreEngine, SelectionRules, Settings,
    StaticHost, TemplateRenderer, TemplateSettings, VariableResolver,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn apply_at(settings: &Settings, host: &StaticHost, item: &mut ItemStack, seed: u64) -> LoreResult<bool> {
    let registry = IntegrationRegistry::with_defaults();
    let at = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .ok_or_else(|| itemlore::LoreError::InvalidConfig("bad test date".to_string()))?;
    let applicator = LoreApplicator::new(LoreContext::new(settings, host, &registry)).at(at);
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(applicator.apply(item, &Player::new("Alex"), "Crafted", &mut rng))
}

#[test]
fn test_single_line_pool_yields_that_line() -> LoreResult<()> {
    let settings = Settings::default();
    let host = StaticHost::new();
    let registry = IntegrationRegistry::new();
    let engine = RandomLoreEngine::new(LoreContext::new(&settings, &host, &registry));
    let pools = vec![LorePool {
        tag: "ALL".to_string(),
        candidates: vec![LoreCandidate::new("&aLine1", 1.0, false, false)],
    }];

    let mut rng = StdRng::seed_from_u64(1);
    let lines = engine.select_lores(
        &pools,
        AmountRange { min: 1, max: 1 },
        SelectionRules::default(),
        &Player::new("Alex"),
        &ItemStack::new("STONE"),
        &mut rng,
    );

    assert_eq!(lines, vec![colorize("&aLine1")]);
    Ok(())
}

#[test]
fn test_half_durability_fills_medium_slot() -> LoreResult<()> {
    let mut settings = Settings::default();
    settings.lore.durability_format = "[%ilore_current_low%|%ilore_current_medium%|%ilore_current_high%]/%ilore_max%".to_string();
    let host = StaticHost::new();
    let registry = IntegrationRegistry::new();
    let renderer = TemplateRenderer::new(LoreContext::new(&settings, &host, &registry));

    let sword = ItemStack::new("DIAMOND_SWORD").with_damage(781);
    assert_eq!(renderer.durability_text(&sword).as_deref(), Some("[|780|]/1561"));
    Ok(())
}

#[test]
fn test_marked_item_is_not_decorated_twice() -> LoreResult<()> {
    let settings = Settings::bundled()?;
    let host = StaticHost::new();
    let marker = colorize("&7Owner: &fSomeone");
    let mut item = ItemStack::new("IRON_SWORD").with_lore(["Heirloom".to_string(), marker.clone()]);

    assert!(!apply_at(&settings, &host, &mut item, 3)?);
    assert_eq!(item.lore(), &["Heirloom".to_string(), marker]);
    Ok(())
}

#[test]
fn test_legacy_layout_order() -> LoreResult<()> {
    let settings = Settings::default();
    assert!(settings.lore.templates.is_empty());
    let host = StaticHost::new();
    let mut item = ItemStack::new("IRON_SWORD");

    assert!(apply_at(&settings, &host, &mut item, 3)?);
    let plain: Vec<String> = item.lore().iter().map(|line| strip_formatting(line)).collect();
    let basic = &settings.lore.basic_settings;
    assert_eq!(
        plain,
        vec![
            strip_formatting(&colorize(&basic.top_separator)),
            String::new(),
            "❖ Durability: 250/250".to_string(),
            String::new(),
            String::new(),
            strip_formatting(&colorize(&basic.info_separator)),
            String::new(),
            "Obtained: 2024-03-01 12:00:00".to_string(),
            "Owner: Alex".to_string(),
            "Source: Crafted".to_string(),
            String::new(),
            strip_formatting(&colorize(&basic.bottom_separator)),
        ]
    );
    Ok(())
}

#[test]
fn test_legacy_layout_respects_toggles() -> LoreResult<()> {
    let mut settings = Settings::default();
    settings.lore.show_time = false;
    settings.lore.show_durability = false;
    let host = StaticHost::new();
    let mut item = ItemStack::new("IRON_SWORD");

    assert!(apply_at(&settings, &host, &mut item, 3)?);
    let plain: Vec<String> = item.lore().iter().map(|line| strip_formatting(line)).collect();
    assert!(!plain.iter().any(|line| line.starts_with("Obtained")));
    assert!(!plain.iter().any(|line| line.contains("Durability")));
    assert!(plain.contains(&"Owner: Alex".to_string()));
    Ok(())
}

#[test]
fn test_unknown_variable_is_kept() -> LoreResult<()> {
    let settings = Settings::default();
    let host = StaticHost::new().with_plugin(FnPlugin::inert("Other"));
    let registry = IntegrationRegistry::with_defaults();
    let resolver = VariableResolver::new(LoreContext::new(&settings, &host, &registry));

    let text = resolver.resolve("Value: %foo_bar% by %ilore_player%", &Player::new("Alex"), &ItemStack::new("STICK"));
    assert_eq!(text, "Value: %foo_bar% by Alex");
    Ok(())
}

#[test]
fn test_template_with_custom_lore() -> LoreResult<()> {
    let mut settings = Settings::default();
    settings.lore.templates.insert(
        "picks".to_string(),
        TemplateSettings {
            enabled: true,
            item_types: vec!["PICKAXE".to_string()],
            content: vec!["&7%ilore_item_name%".to_string(), "%ilore_player%".to_string()],
        },
    );
    settings.lore.custom_lore.enabled = true;
    settings.lore.custom_lore.lines = vec!["&dFor %ilore_player_displayname%".to_string()];
    let host = StaticHost::new();
    let mut pick = ItemStack::new("GOLDEN_PICKAXE").with_display_name("Digger");

    assert!(apply_at(&settings, &host, &mut pick, 9)?);
    assert_eq!(
        pick.lore(),
        &[
            colorize("&7Digger"),
            colorize("&7Owner: &fAlex"),
            String::new(),
            colorize("&dFor Alex"),
        ]
    );
    Ok(())
}

#[test]
fn test_bundled_config_decorates_weapons() -> LoreResult<()> {
    let settings = Settings::bundled()?;
    assert!(settings.lore.random_lore.enabled);
    assert_eq!(settings.existing_lore.mode, "APPEND");

    let host = StaticHost::new();
    let mut sword = ItemStack::new("NETHERITE_SWORD");
    assert!(apply_at(&settings, &host, &mut sword, 21)?);

    let plain: Vec<String> = sword.lore().iter().map(|line| strip_formatting(line)).collect();
    assert_eq!(plain[1], "Netherite Sword");
    assert!(plain.contains(&"Ancient debris remembers".to_string()));
    assert!(plain.contains(&"Source: Crafted".to_string()));

    // A second pass is recognised by the detection keywords
    let before = sword.lore().to_vec();
    assert!(!apply_at(&settings, &host, &mut sword, 22)?);
    assert_eq!(sword.lore(), before.as_slice());
    Ok(())
}
