//! # Templates
//!
//! Template selection and rendering.
//!
//! A template is an ordered list of line patterns. Structural placeholders
//! expand into configured sub-templates; a line whose placeholder depends on
//! a disabled feature, or on a property the item lacks, is dropped entirely.
//! Everything else on a line goes through variable resolution and color
//! formatting.
//!
//! ## Selection
//!
//! Templates are scanned in declaration order and the first enabled one whose
//! `item-types` match wins. The template named `default` is skipped by the
//! scan and used only as the fallback. Without a `default` the fixed legacy
//! layout is rendered instead.

use crate::config::DEFAULT_TIME_FORMAT;
use crate::host::{ItemStack, Player};
use crate::lore::classify::matches_type_key;
use crate::lore::format::colorize;
use crate::lore::{LoreContext, VariableResolver};
use crate::settings::TemplateSettings;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use log::debug;
use std::mem;

pub const TOP_SEPARATOR: &str = "%ilore_top_separator%";
pub const BOTTOM_SEPARATOR: &str = "%ilore_bottom_separator%";
pub const INFO_SEPARATOR: &str = "%ilore_info_separator%";
pub const DURABILITY: &str = "%ilore_durability%";
pub const TIME: &str = "%ilore_time%";
pub const PLAYER: &str = "%ilore_player%";
pub const SOURCE: &str = "%ilore_source%";
pub const RANDOM_LORE: &str = "%ilore_random_lore%";

const CURRENT_LOW: &str = "%ilore_current_low%";
const CURRENT_MEDIUM: &str = "%ilore_current_medium%";
const CURRENT_HIGH: &str = "%ilore_current_high%";
const MAX: &str = "%ilore_max%";

/// Name of the fallback template.
pub const DEFAULT_TEMPLATE: &str = "default";

/// A named lore layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub enabled: bool,
    /// Material substrings or class tags; empty matches everything
    pub item_types: Vec<String>,
    pub content: Vec<String>,
}

impl Template {
    pub fn from_settings(name: &str, settings: &TemplateSettings) -> Self {
        Self {
            name: name.to_string(),
            enabled: settings.enabled,
            item_types: settings.item_types.clone(),
            content: settings.content.clone(),
        }
    }

    /// Whether this template's item types cover `material`.
    pub fn matches(&self, material: &str) -> bool {
        self.item_types.is_empty()
            || self
                .item_types
                .iter()
                .any(|key| matches_type_key(material, key))
    }
}

/// Outcome of template selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateChoice {
    /// A template matched the item
    Named(Template),
    /// Nothing matched; the `default` template applies
    Default(Template),
    /// Nothing matched and there is no `default`
    Legacy,
}

/// Picks the template for an item.
pub struct TemplateSelector<'a> {
    ctx: LoreContext<'a>,
}

impl<'a> TemplateSelector<'a> {
    pub fn new(ctx: LoreContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn select(&self, item: &ItemStack) -> TemplateChoice {
        let material = item.material.name();
        let templates = &self.ctx.settings.lore.templates;

        let matched = templates
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_TEMPLATE)
            .map(|(name, settings)| Template::from_settings(name, settings))
            .find(|template| template.enabled && template.matches(material));
        if let Some(template) = matched {
            debug!("Template {} selected for {}", template.name, material);
            return TemplateChoice::Named(template);
        }

        match self.find(DEFAULT_TEMPLATE) {
            Some(template) if template.enabled => TemplateChoice::Default(template),
            _ => TemplateChoice::Legacy,
        }
    }

    /// Looks up a template by exact name.
    pub fn find(&self, name: &str) -> Option<Template> {
        self.ctx
            .settings
            .lore
            .templates
            .get(name)
            .map(|settings| Template::from_settings(name, settings))
    }

    /// All template names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.ctx.settings.lore.templates.keys().cloned().collect()
    }
}

/// Inputs of one render.
#[derive(Debug, Clone)]
pub struct RenderRequest<'r> {
    pub item: &'r ItemStack,
    pub player: &'r Player,
    /// Human-readable acquisition source, e.g. `Crafted`
    pub source: &'r str,
    /// Already rendered random lore lines
    pub random_lines: Vec<String>,
    pub acquired_at: NaiveDateTime,
}

/// Expands templates into final lore lines.
pub struct TemplateRenderer<'a> {
    ctx: LoreContext<'a>,
    resolver: VariableResolver<'a>,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(ctx: LoreContext<'a>) -> Self {
        Self {
            ctx,
            resolver: VariableResolver::new(ctx),
        }
    }

    /// Renders with whichever template the selector picks for the item.
    pub fn render_for_item(&self, request: RenderRequest<'_>) -> Vec<String> {
        match TemplateSelector::new(self.ctx).select(request.item) {
            TemplateChoice::Named(template) | TemplateChoice::Default(template) => {
                self.render(&template, request)
            }
            TemplateChoice::Legacy => self.render_legacy(request),
        }
    }

    /// Renders `template`, followed by the custom lore block when enabled.
    pub fn render(&self, template: &Template, request: RenderRequest<'_>) -> Vec<String> {
        let lore = &self.ctx.settings.lore;
        let basic = &lore.basic_settings;
        let RenderRequest {
            item,
            player,
            source,
            mut random_lines,
            acquired_at,
        } = request;

        let mut lines = Vec::with_capacity(template.content.len() + random_lines.len());

        for pattern in &template.content {
            let mut line = pattern
                .replace(TOP_SEPARATOR, &basic.top_separator)
                .replace(BOTTOM_SEPARATOR, &basic.bottom_separator)
                .replace(INFO_SEPARATOR, &basic.info_separator);

            if line.contains(DURABILITY) {
                match self.durability_text(item) {
                    Some(text) if lore.show_durability => line = line.replace(DURABILITY, &text),
                    _ => continue,
                }
            }

            if line.contains(TIME) {
                if !lore.show_time {
                    continue;
                }
                line = line.replace(TIME, &self.time_text(&acquired_at));
            }

            if line.contains(PLAYER) {
                if !lore.show_player {
                    continue;
                }
                line = line.replace(PLAYER, &lore.player_prefix.replace(PLAYER, &player.name));
            }

            if line.contains(SOURCE) {
                if !lore.show_source {
                    continue;
                }
                line = line.replace(SOURCE, &lore.source_prefix.replace(SOURCE, source));
            }

            if line.contains(RANDOM_LORE) {
                if !lore.random_lore.enabled || random_lines.is_empty() {
                    continue;
                }
                let mut remaining = mem::take(&mut random_lines).into_iter();
                let first = remaining.next().unwrap_or_default();
                lines.push(self.finish(&line.replace(RANDOM_LORE, &first), player, item));
                lines.extend(remaining.map(|random| colorize(&random)));
                continue;
            }

            lines.push(self.finish(&line, player, item));
        }

        let custom = &lore.custom_lore;
        if custom.enabled && !custom.lines.is_empty() {
            if basic.show_empty_lines {
                lines.push(String::new());
            }
            lines.extend(custom.lines.iter().map(|line| self.finish(line, player, item)));
        }

        lines
    }

    /// The fixed layout used when no template applies.
    pub fn render_legacy(&self, request: RenderRequest<'_>) -> Vec<String> {
        let lore = &self.ctx.settings.lore;
        let basic = &lore.basic_settings;
        let RenderRequest {
            item,
            player,
            source,
            random_lines,
            acquired_at,
        } = request;

        let mut lines = vec![colorize(&basic.top_separator), String::new()];

        if lore.show_durability {
            if let Some(text) = self.durability_text(item) {
                lines.push(self.finish(&text, player, item));
                lines.push(String::new());
            }
        }

        if !random_lines.is_empty() {
            lines.push(String::new());
            lines.extend(random_lines.iter().map(|random| colorize(random)));
        }

        lines.push(String::new());
        lines.push(colorize(&basic.info_separator));
        lines.push(String::new());

        if lore.show_time {
            lines.push(self.finish(&self.time_text(&acquired_at), player, item));
        }
        if lore.show_player {
            let text = lore.player_prefix.replace(PLAYER, &player.name);
            lines.push(self.finish(&text, player, item));
        }
        if lore.show_source {
            let text = lore.source_prefix.replace(SOURCE, source);
            lines.push(self.finish(&text, player, item));
        }

        lines.push(String::new());
        lines.push(colorize(&basic.bottom_separator));
        lines
    }

    /// The durability sub-template for `item`, or `None` when it has no
    /// durability.
    pub fn durability_text(&self, item: &ItemStack) -> Option<String> {
        let durability = item.durability()?;
        let current = durability.current.to_string();
        let percentage = durability.percentage();

        let (low, medium, high) = if percentage <= 20 {
            (current.as_str(), "", "")
        } else if percentage <= 50 {
            ("", current.as_str(), "")
        } else {
            ("", "", current.as_str())
        };

        Some(
            self.ctx
                .settings
                .lore
                .durability_format
                .replace(CURRENT_LOW, low)
                .replace(CURRENT_MEDIUM, medium)
                .replace(CURRENT_HIGH, high)
                .replace(MAX, &durability.max.to_string()),
        )
    }

    fn time_text(&self, acquired_at: &NaiveDateTime) -> String {
        let lore = &self.ctx.settings.lore;
        lore.time_prefix
            .replace(TIME, &format_timestamp(&lore.time_format, acquired_at))
    }

    fn finish(&self, text: &str, player: &Player, item: &ItemStack) -> String {
        colorize(&self.resolver.resolve(text, player, item))
    }
}

/// Formats the acquisition time with a strftime pattern.
///
/// Patterns without `%` are read as date patterns of the `yyyy-MM-dd HH:mm`
/// family. An invalid pattern falls back to `%Y-%m-%d %H:%M:%S`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use itemlore::lore::template::format_timestamp;
///
/// let at = NaiveDate::from_ymd_opt(2024, 5, 17)
///     .unwrap()
///     .and_hms_opt(9, 30, 5)
///     .unwrap();
/// assert_eq!(format_timestamp("%d/%m/%Y", &at), "17/05/2024");
/// assert_eq!(format_timestamp("yyyy-MM-dd HH:mm", &at), "2024-05-17 09:30");
/// ```
pub fn format_timestamp(pattern: &str, at: &NaiveDateTime) -> String {
    let pattern = if pattern.contains('%') {
        pattern.to_string()
    } else {
        date_pattern_to_strftime(pattern)
    };

    let valid = !StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error));
    if valid {
        at.format(&pattern).to_string()
    } else {
        debug!("Invalid time format {:?}, using {}", pattern, DEFAULT_TIME_FORMAT);
        at.format(DEFAULT_TIME_FORMAT).to_string()
    }
}

/// Rewrites `yyyy-MM-dd HH:mm:ss` style patterns as strftime.
fn date_pattern_to_strftime(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut output = String::with_capacity(pattern.len() * 2);
    let mut index = 0;

    while index < chars.len() {
        let letter = chars[index];

        if letter == '\'' {
            let end = chars[index + 1..]
                .iter()
                .position(|&ch| ch == '\'')
                .map_or(chars.len(), |offset| index + 1 + offset);
            output.extend(&chars[index + 1..end]);
            index = end + 1;
            continue;
        }

        let run = chars[index..]
            .iter()
            .take_while(|&&ch| ch == letter)
            .count();

        let directive = match (letter, run) {
            ('y', 2) => Some("%y"),
            ('y', _) => Some("%Y"),
            ('M', 1) | ('M', 2) => Some("%m"),
            ('M', 3) => Some("%b"),
            ('M', _) => Some("%B"),
            ('d', _) => Some("%d"),
            ('H', _) => Some("%H"),
            ('h', _) => Some("%I"),
            ('m', _) => Some("%M"),
            ('s', _) => Some("%S"),
            ('S', _) => Some("%3f"),
            ('a', _) => Some("%p"),
            ('E', 1..=3) => Some("%a"),
            ('E', _) => Some("%A"),
            _ => None,
        };

        match directive {
            Some(directive) => output.push_str(directive),
            None => output.extend(&chars[index..index + run]),
        }
        index += run;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticHost;
    use crate::lore::IntegrationRegistry;
    use crate::settings::{Settings, TemplateSettings};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn template_settings(item_types: &[&str], content: &[&str]) -> TemplateSettings {
        TemplateSettings {
            enabled: true,
            item_types: item_types.iter().map(|s| s.to_string()).collect(),
            content: content.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn render(settings: &Settings, item: &ItemStack, random_lines: Vec<String>) -> Vec<String> {
        let host = StaticHost::new();
        let registry = IntegrationRegistry::new();
        let renderer = TemplateRenderer::new(LoreContext::new(settings, &host, &registry));
        let player = Player::new("Alex");
        renderer.render_for_item(RenderRequest {
            item,
            player: &player,
            source: "Crafted",
            random_lines,
            acquired_at: at(),
        })
    }

    #[test]
    fn test_selection_order_and_default() {
        let mut settings = Settings::default();
        let templates = &mut settings.lore.templates;
        templates.insert("default".to_string(), template_settings(&[], &["default"]));
        templates.insert("swords".to_string(), template_settings(&["SWORD"], &["sword"]));
        templates.insert("weapons".to_string(), template_settings(&["WEAPON"], &["weapon"]));

        let host = StaticHost::new();
        let registry = IntegrationRegistry::new();
        let selector = TemplateSelector::new(LoreContext::new(&settings, &host, &registry));

        match selector.select(&ItemStack::new("IRON_SWORD")) {
            TemplateChoice::Named(template) => assert_eq!(template.name, "swords"),
            other => panic!("unexpected {:?}", other),
        }
        match selector.select(&ItemStack::new("BOW")) {
            TemplateChoice::Named(template) => assert_eq!(template.name, "weapons"),
            other => panic!("unexpected {:?}", other),
        }
        match selector.select(&ItemStack::new("BREAD")) {
            TemplateChoice::Default(template) => assert_eq!(template.name, "default"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(selector.names(), vec!["default", "swords", "weapons"]);
    }

    #[test]
    fn test_disabled_template_is_skipped() {
        let mut settings = Settings::default();
        let mut disabled = template_settings(&[], &["x"]);
        disabled.enabled = false;
        settings.lore.templates.insert("off".to_string(), disabled);

        let host = StaticHost::new();
        let registry = IntegrationRegistry::new();
        let selector = TemplateSelector::new(LoreContext::new(&settings, &host, &registry));
        assert_eq!(selector.select(&ItemStack::new("BOW")), TemplateChoice::Legacy);
    }

    #[test]
    fn test_durability_brackets() {
        let mut settings = Settings::default();
        settings.lore.durability_format =
            "L%ilore_current_low%M%ilore_current_medium%H%ilore_current_high%/%ilore_max%".to_string();
        let host = StaticHost::new();
        let registry = IntegrationRegistry::new();
        let renderer = TemplateRenderer::new(LoreContext::new(&settings, &host, &registry));

        let half = ItemStack::new("IRON_PICKAXE").with_damage(125);
        assert_eq!(renderer.durability_text(&half).unwrap(), "LM125H/250");

        let low = ItemStack::new("IRON_PICKAXE").with_damage(200);
        assert_eq!(renderer.durability_text(&low).unwrap(), "L50MH/250");

        let fresh = ItemStack::new("IRON_PICKAXE");
        assert_eq!(renderer.durability_text(&fresh).unwrap(), "LMH250/250");

        assert!(renderer.durability_text(&ItemStack::new("BREAD")).is_none());
    }

    #[test]
    fn test_template_lines_dropped_for_missing_features() {
        let mut settings = Settings::default();
        settings.lore.show_player = false;
        settings.lore.templates.insert(
            "default".to_string(),
            template_settings(
                &[],
                &["%ilore_durability%", "%ilore_player%", "%ilore_source%", "%ilore_random_lore%", "&7End"],
            ),
        );

        let lines = render(&settings, &ItemStack::new("BREAD"), vec!["ignored".to_string()]);
        assert_eq!(lines, vec!["§7Source: §fCrafted".to_string(), "§7End".to_string()]);
    }

    #[test]
    fn test_random_lore_expansion() {
        let mut settings = Settings::default();
        settings.lore.random_lore.enabled = true;
        settings.lore.templates.insert(
            "default".to_string(),
            template_settings(&[], &["&8» %ilore_random_lore%", "%ilore_random_lore%", "tail"]),
        );

        let random = vec!["§aone".to_string(), "§btwo".to_string(), "§cthree".to_string()];
        let lines = render(&settings, &ItemStack::new("BREAD"), random);
        assert_eq!(lines, vec!["§8» §aone", "§btwo", "§cthree", "tail"]);
    }

    #[test]
    fn test_custom_lore_appended() {
        let mut settings = Settings::default();
        settings.lore.custom_lore.enabled = true;
        settings.lore.custom_lore.lines = vec!["&dMade for %ilore_player%".to_string()];
        settings
            .lore
            .templates
            .insert("default".to_string(), template_settings(&[], &["head"]));

        let lines = render(&settings, &ItemStack::new("BREAD"), Vec::new());
        assert_eq!(lines, vec!["head", "", "§dMade for Alex"]);
    }

    #[test]
    fn test_legacy_layout_order() {
        let settings = Settings::default();
        let item = ItemStack::new("DIAMOND_SWORD");
        let lines = render(&settings, &item, Vec::new());

        let top = colorize(&settings.lore.basic_settings.top_separator);
        let info = colorize(&settings.lore.basic_settings.info_separator);
        assert_eq!(lines[0], top);
        assert_eq!(lines[1], "");
        assert!(lines[2].contains("1561"));
        assert_eq!(lines[5], info);
        assert_eq!(lines[7], "§7Obtained: §f2024-05-17 09:30:00");
        assert_eq!(lines[8], "§7Owner: §fAlex");
        assert_eq!(lines[9], "§7Source: §fCrafted");
        assert_eq!(lines[10], "");
        assert_eq!(lines.last(), Some(&colorize(&settings.lore.basic_settings.bottom_separator)));
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn test_legacy_without_durability_or_toggles() {
        let mut settings = Settings::default();
        settings.lore.show_time = false;
        settings.lore.show_source = false;

        let lines = render(&settings, &ItemStack::new("BREAD"), vec!["§erandom".to_string()]);
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "§erandom");
        assert!(lines.iter().all(|line| !line.contains("Obtained")));
        assert!(lines.iter().any(|line| line.contains("Owner")));
    }

    #[test]
    fn test_format_timestamp_fallback() {
        assert_eq!(format_timestamp("%Q", &at()), "2024-05-17 09:30:00");
        assert_eq!(format_timestamp("dd.MM.yy 'at' HH", &at()), "17.05.24 at 09");
    }
}
