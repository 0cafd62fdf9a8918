//! # Lore Application
//!
//! The orchestrator that decides whether an item gets lore and writes it.
//!
//! Application is best-effort and reports a plain `bool`: `false` means the
//! item was left untouched, either because it cannot hold lore, already
//! carries this plugin's lore, or the existing-lore policy says to leave it.

use crate::host::{ItemStack, Player};
use crate::lore::classify;
use crate::lore::format::colorize;
use crate::lore::{LoreContext, RandomLoreEngine, RenderRequest, Template, TemplateRenderer};
use crate::LoreError;
use chrono::{Local, NaiveDateTime};
use log::{debug, warn};
use rand::rngs::StdRng;
use std::fmt;
use std::str::FromStr;

/// How generated lore combines with lore an item already has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExistingLoreMode {
    /// Keep existing lines and add the new ones below
    #[default]
    Append,
    /// Replace existing lines
    Overwrite,
    /// Leave items with existing lore alone
    Ignore,
}

impl ExistingLoreMode {
    pub const ALL: [ExistingLoreMode; 3] = [
        ExistingLoreMode::Append,
        ExistingLoreMode::Overwrite,
        ExistingLoreMode::Ignore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExistingLoreMode::Append => "APPEND",
            ExistingLoreMode::Overwrite => "OVERWRITE",
            ExistingLoreMode::Ignore => "IGNORE",
        }
    }
}

impl fmt::Display for ExistingLoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExistingLoreMode {
    type Err = LoreError;

    /// Parses a mode name, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use itemlore::ExistingLoreMode;
    ///
    /// assert_eq!("overwrite".parse::<ExistingLoreMode>().unwrap(), ExistingLoreMode::Overwrite);
    /// assert!("replace".parse::<ExistingLoreMode>().is_err());
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ExistingLoreMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| LoreError::InvalidConfig(format!("unknown existing-lore mode {:?}", value)))
    }
}

/// Applies generated lore to items.
pub struct LoreApplicator<'a> {
    ctx: LoreContext<'a>,
    acquired_at: Option<NaiveDateTime>,
}

impl<'a> LoreApplicator<'a> {
    pub fn new(ctx: LoreContext<'a>) -> Self {
        Self {
            ctx,
            acquired_at: None,
        }
    }

    /// Pins the acquisition time instead of reading the local clock.
    pub fn at(mut self, acquired_at: NaiveDateTime) -> Self {
        self.acquired_at = Some(acquired_at);
        self
    }

    /// Applies lore using the template selected for the item.
    pub fn apply(&self, item: &mut ItemStack, player: &Player, source: &str, rng: &mut StdRng) -> bool {
        self.apply_with_template(item, player, source, None, rng)
    }

    /// Applies lore, rendering `template` when given instead of selecting one.
    pub fn apply_with_template(
        &self,
        item: &mut ItemStack,
        player: &Player,
        source: &str,
        template: Option<&Template>,
        rng: &mut StdRng,
    ) -> bool {
        let existing = match item.meta.as_ref() {
            Some(meta) => meta.lore.clone(),
            None => {
                debug!("{} has no metadata, skipping", item.material);
                return false;
            }
        };

        if self.has_plugin_lore(&existing) {
            debug!("{} already carries generated lore", item.material);
            return false;
        }

        let mode = self.existing_lore_mode();
        if !existing.is_empty() && mode == ExistingLoreMode::Ignore {
            debug!("{} has existing lore and mode is {}", item.material, mode);
            return false;
        }

        let random_lines = RandomLoreEngine::new(self.ctx).generate(&*item, player, rng);
        let request = RenderRequest {
            item: &*item,
            player,
            source,
            random_lines,
            acquired_at: self
                .acquired_at
                .unwrap_or_else(|| Local::now().naive_local()),
        };

        let renderer = TemplateRenderer::new(self.ctx);
        let generated = match template {
            Some(template) => renderer.render(template, request),
            None => renderer.render_for_item(request),
        };

        let merged = self.merge(existing, generated, mode);
        match item.meta.as_mut() {
            Some(meta) => {
                meta.lore = merged;
                true
            }
            None => false,
        }
    }

    /// Whether any line contains one of the (color-formatted) detection keywords.
    pub fn has_plugin_lore(&self, lore: &[String]) -> bool {
        if lore.is_empty() {
            return false;
        }

        let keywords: Vec<String> = self
            .ctx
            .settings
            .detection_keywords()
            .iter()
            .filter(|keyword| !keyword.is_empty())
            .map(|keyword| colorize(keyword))
            .collect();

        lore.iter()
            .any(|line| keywords.iter().any(|keyword| line.contains(keyword.as_str())))
    }

    /// The configured mode; unknown values fall back to `Append`.
    pub fn existing_lore_mode(&self) -> ExistingLoreMode {
        let raw = &self.ctx.settings.existing_lore.mode;
        raw.parse().unwrap_or_else(|_| {
            warn!("Invalid existing-lore mode {:?}, using APPEND", raw);
            ExistingLoreMode::Append
        })
    }

    /// Evaluates the top-level `item-types` filter.
    pub fn should_process_item(&self, item: &ItemStack) -> bool {
        classify::should_process(item, &self.ctx.settings.item_types)
    }

    fn merge(&self, existing: Vec<String>, generated: Vec<String>, mode: ExistingLoreMode) -> Vec<String> {
        if existing.is_empty() || mode == ExistingLoreMode::Overwrite {
            return generated;
        }

        let settings = &self.ctx.settings.existing_lore;
        let mut merged = existing;
        if settings.add_separator {
            merged.push(String::new());
            merged.push(colorize(&settings.separator_style));
        }
        merged.push(String::new());
        merged.extend(generated);
        merged
    }
}
