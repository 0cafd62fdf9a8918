//! # Weighted Random Lore
//!
//! Draws random lore lines from configured pools.
//!
//! ## Algorithm
//!
//! 1. Pools that apply to the item are flattened into one candidate list.
//!    Fixed candidates are rendered straight away; every other candidate gets
//!    one chance roll deciding whether it enters the draw at all.
//! 2. A target count is sampled from the amount range, reduced by the fixed
//!    lines when those count as random, and capped at the pool size.
//! 3. Candidates are drawn without replacement, proportionally to weight.
//!    Unique candidates claim a category; a later candidate of a claimed
//!    category is discarded.
//! 4. If the result is still short of the configured minimum, the first
//!    remaining candidates are appended until it is met.
//!
//! Randomness always comes from the caller's [`StdRng`], so a seeded
//! generator reproduces the same lines.

use crate::config::{DEFAULT_CANDIDATE_WEIGHT, MAX_CANDIDATE_WEIGHT, MIN_CANDIDATE_WEIGHT};
use crate::host::{ItemStack, Player};
use crate::lore::classify::matches_type_key;
use crate::lore::format::{colorize, strip_formatting};
use crate::lore::{LoreContext, VariableResolver};
use indexmap::IndexMap;
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

const UNIQUE_MARKER: &str = "UNIQUE:";
const FIXED_MARKER: &str = "FIXED:";

/// One configured pool entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LoreCandidate {
    /// Unrendered line, markers removed
    pub text: String,
    /// Relative draw weight in `[0.1, 1.0]`
    pub weight: f64,
    /// At most one line per uniqueness category is selected
    pub unique: bool,
    /// Always included, without a draw
    pub fixed: bool,
}

impl LoreCandidate {
    /// Creates a candidate, honouring `UNIQUE:`/`FIXED:` markers in the text.
    ///
    /// # Examples
    ///
    /// ```
    /// use itemlore::LoreCandidate;
    ///
    /// let candidate = LoreCandidate::new("UNIQUE:&6Rarity: Rare", 40.0, false, false);
    /// assert_eq!(candidate.text, "&6Rarity: Rare");
    /// assert!(candidate.unique);
    /// assert_eq!(candidate.weight, 0.4);
    /// ```
    pub fn new(text: impl Into<String>, weight: f64, unique: bool, fixed: bool) -> Self {
        let mut text = text.into();
        let mut unique = unique;
        let mut fixed = fixed;

        if text.contains(UNIQUE_MARKER) {
            unique = true;
            text = text.replace(UNIQUE_MARKER, "");
        }
        if text.contains(FIXED_MARKER) {
            fixed = true;
            text = text.replace(FIXED_MARKER, "");
        }

        Self {
            text,
            weight: normalize_weight(weight),
            unique,
            fixed,
        }
    }

    /// Parses a raw pool entry: a plain string, or `[text, weight, unique, fixed]`
    /// with everything after the text optional.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::new(text.as_str(), DEFAULT_CANDIDATE_WEIGHT, false, false)),
            Value::Array(parts) => {
                let text = match parts.first()? {
                    Value::String(text) => text.clone(),
                    Value::Null => return None,
                    other => other.to_string(),
                };
                let weight = parts.get(1).map_or(DEFAULT_CANDIDATE_WEIGHT, parse_weight);
                let unique = parse_flag(parts.get(2));
                let fixed = parse_flag(parts.get(3));
                Some(Self::new(text, weight, unique, fixed))
            }
            Value::Number(number) => Some(Self::new(
                number.to_string(),
                DEFAULT_CANDIDATE_WEIGHT,
                false,
                false,
            )),
            other => {
                debug!("Skipping malformed pool entry: {}", other);
                None
            }
        }
    }
}

/// Brings a weight from any accepted scale into `[0.1, 1.0]`.
///
/// Values above 10 are on the legacy 1–100 scale, values in `(1, 10]` on a
/// 1–10 scale, and anything else is already a fraction.
///
/// # Examples
///
/// ```
/// use itemlore::lore::random::normalize_weight;
///
/// assert_eq!(normalize_weight(75.0), 0.75);
/// assert_eq!(normalize_weight(5.0), 0.5);
/// assert_eq!(normalize_weight(0.3), 0.3);
/// assert_eq!(normalize_weight(0.0), 0.1);
/// assert_eq!(normalize_weight(500.0), 1.0);
/// ```
pub fn normalize_weight(raw: f64) -> f64 {
    if raw.is_nan() {
        return DEFAULT_CANDIDATE_WEIGHT;
    }
    let scaled = if raw > 10.0 {
        raw / 100.0
    } else if raw > 1.0 {
        raw / 10.0
    } else {
        raw
    };
    scaled.clamp(MIN_CANDIDATE_WEIGHT, MAX_CANDIDATE_WEIGHT)
}

/// Reads a weight from a configuration value; unreadable weights become 0.5.
pub fn parse_weight(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(raw) => normalize_weight(raw),
        None => {
            debug!("Unreadable lore weight {}, using {}", value, DEFAULT_CANDIDATE_WEIGHT);
            DEFAULT_CANDIDATE_WEIGHT
        }
    }
}

fn parse_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Candidates configured under one tag.
#[derive(Debug, Clone, PartialEq)]
pub struct LorePool {
    pub tag: String,
    pub candidates: Vec<LoreCandidate>,
}

impl LorePool {
    pub fn from_entries(tag: impl Into<String>, entries: &[Value]) -> Self {
        Self {
            tag: tag.into(),
            candidates: entries.iter().filter_map(LoreCandidate::from_value).collect(),
        }
    }
}

/// Pools that apply to `material`: `ALL` first, then every matching tag in
/// declaration order.
pub fn applicable_pools(pools: &IndexMap<String, Vec<Value>>, material: &str) -> Vec<LorePool> {
    let mut applicable = Vec::new();

    if let Some((tag, entries)) = pools.iter().find(|(tag, _)| tag.eq_ignore_ascii_case("ALL")) {
        applicable.push(LorePool::from_entries(tag.as_str(), entries));
    }

    for (tag, entries) in pools {
        if tag.eq_ignore_ascii_case("ALL") {
            continue;
        }
        if matches_type_key(material, tag) {
            applicable.push(LorePool::from_entries(tag.as_str(), entries));
        }
    }

    applicable
}

/// Inclusive range for the number of random lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    /// Builds a range from raw configuration bounds.
    ///
    /// Negative bounds become zero and a minimum above the maximum is
    /// lowered to the maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// use itemlore::AmountRange;
    ///
    /// assert_eq!(AmountRange::from_bounds(5, 2), AmountRange { min: 2, max: 2 });
    /// assert_eq!(AmountRange::from_bounds(-1, 3), AmountRange { min: 0, max: 3 });
    /// ```
    pub fn from_bounds(min: i64, max: i64) -> Self {
        let clamp = |value: i64| value.clamp(0, i64::from(u32::MAX)) as u32;
        let max = clamp(max);
        let min = clamp(min).min(max);
        Self { min, max }
    }

    /// Uniform sample from `[min, max]`.
    pub fn sample(&self, rng: &mut StdRng) -> u32 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// Category shared by unique lines of the same kind.
///
/// The last word before the first `:`, otherwise the first word that is not
/// a formatting code, otherwise a tag derived from the text's hash.
///
/// # Examples
///
/// ```
/// use itemlore::lore::random::unique_category;
///
/// assert_eq!(unique_category("Item Rarity: Rare"), "Rarity");
/// assert_eq!(unique_category("&6 Blessed blade"), "Blessed");
/// ```
pub fn unique_category(text: &str) -> String {
    if let Some((before, _)) = text.split_once(':') {
        let before = before.trim();
        let last_word = match before.rfind(' ') {
            Some(index) => &before[index + 1..],
            None => before,
        };
        return last_word.to_string();
    }

    let first_word = text
        .split(' ')
        .map(str::trim)
        .find(|word| !word.is_empty() && !word.starts_with('&') && !word.starts_with('§'));
    if let Some(word) = first_word {
        return word.to_string();
    }

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("UNIQUE_{}", hasher.finish() % 1000)
}

/// Knobs for one selection run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRules {
    /// Probability that a non-fixed candidate enters the draw
    pub chance: f64,
    /// Fixed lines use up part of the amount range
    pub fixed_count_as_random: bool,
    /// Unique lines use up part of the amount range
    pub unique_count_as_random: bool,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            chance: 1.0,
            fixed_count_as_random: false,
            unique_count_as_random: true,
        }
    }
}

/// Produces the random lore lines for an item.
pub struct RandomLoreEngine<'a> {
    ctx: LoreContext<'a>,
    resolver: VariableResolver<'a>,
}

impl<'a> RandomLoreEngine<'a> {
    pub fn new(ctx: LoreContext<'a>) -> Self {
        Self {
            ctx,
            resolver: VariableResolver::new(ctx),
        }
    }

    /// Generates rendered random lore for `item` from the configured pools.
    ///
    /// Returns an empty list when random lore is disabled.
    pub fn generate(&self, item: &ItemStack, player: &Player, rng: &mut StdRng) -> Vec<String> {
        let config = &self.ctx.settings.lore.random_lore;
        if !config.enabled {
            return Vec::new();
        }

        let material = item.material.name();
        let pools = applicable_pools(&config.pools, material);
        let range = AmountRange::from_bounds(config.amount.min, config.amount.max);
        let rules = SelectionRules {
            chance: self.generation_chance(material),
            fixed_count_as_random: config.fixed_count_as_random,
            unique_count_as_random: config.unique_count_as_random,
        };

        self.select_lores(&pools, range, rules, player, item, rng)
    }

    /// Entry probability for candidates of `material`.
    ///
    /// An exact material key wins over the first substring or class-tag key.
    /// Override values above 1 are percentages.
    pub fn generation_chance(&self, material: &str) -> f64 {
        let chances = &self.ctx.settings.lore.random_lore.chances;

        let exact = chances
            .types
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(material));
        let matched = exact.or_else(|| {
            chances
                .types
                .iter()
                .find(|(key, _)| matches_type_key(material, key))
        });

        let chance = match matched {
            Some((_, &value)) if value > 1.0 => value / 100.0,
            Some((_, &value)) => value,
            None => chances.global,
        };
        clamp_probability(chance)
    }

    /// Selects and renders lines from `pools`.
    pub fn select_lores(
        &self,
        pools: &[LorePool],
        range: AmountRange,
        rules: SelectionRules,
        player: &Player,
        item: &ItemStack,
        rng: &mut StdRng,
    ) -> Vec<String> {
        let chance = clamp_probability(rules.chance);
        let mut uncounted_fixed = Vec::new();
        let mut counted_fixed = Vec::new();
        let mut pool: Vec<LoreCandidate> = Vec::new();

        for candidate in pools.iter().flat_map(|pool| pool.candidates.iter()) {
            if candidate.fixed {
                let line = self.render(&candidate.text, player, item);
                if rules.fixed_count_as_random {
                    counted_fixed.push(line);
                } else {
                    uncounted_fixed.push(line);
                }
            } else if chance >= 1.0 || (chance > 0.0 && rng.gen_bool(chance)) {
                pool.push(candidate.clone());
            }
        }

        let counted = counted_fixed.len() as u32;
        let effective = if rules.fixed_count_as_random {
            let max = range.max.saturating_sub(counted);
            AmountRange {
                min: range.min.saturating_sub(counted).min(max),
                max,
            }
        } else {
            range
        };
        let mut target = (effective.sample(rng) as usize).min(pool.len());

        let max_attempts = pool.len() * 2;
        let mut attempts = 0;
        let mut categories = HashSet::new();
        let mut drawn = Vec::new();

        while drawn.len() < target && attempts < max_attempts && !pool.is_empty() {
            attempts += 1;

            let candidate = pool.remove(weighted_index(&pool, rng));
            let line = self.render(&candidate.text, player, item);

            if candidate.unique {
                let category = unique_category(&strip_formatting(&line));
                if !categories.insert(category) {
                    continue;
                }
                if !rules.unique_count_as_random {
                    target += 1;
                }
            }

            drawn.push(line);
        }

        let minimum = range.min as usize;
        let mut backfill = Vec::new();
        while counted_fixed.len() + drawn.len() + backfill.len() < minimum && !pool.is_empty() {
            let candidate = pool.remove(0);
            let line = self.render(&candidate.text, player, item);
            if candidate.unique && !categories.insert(unique_category(&strip_formatting(&line))) {
                continue;
            }
            backfill.push(line);
        }

        debug!(
            "Random lore for {}: {} fixed, {} counted fixed, {} drawn, {} backfilled (target {})",
            item.material,
            uncounted_fixed.len(),
            counted_fixed.len(),
            drawn.len(),
            backfill.len(),
            target
        );

        let mut lines = uncounted_fixed;
        lines.extend(counted_fixed);
        lines.extend(drawn);
        lines.extend(backfill);
        lines
    }

    fn render(&self, text: &str, player: &Player, item: &ItemStack) -> String {
        colorize(&self.resolver.resolve(text, player, item))
    }
}

fn clamp_probability(chance: f64) -> f64 {
    if chance.is_nan() {
        1.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

/// Index of a candidate drawn proportionally to weight.
fn weighted_index(pool: &[LoreCandidate], rng: &mut StdRng) -> usize {
    let total: f64 = pool.iter().map(|candidate| candidate.weight).sum();
    if pool.len() <= 1 || total <= 0.0 {
        return 0;
    }

    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (index, candidate) in pool.iter().enumerate() {
        cumulative += candidate.weight;
        if roll < cumulative {
            return index;
        }
    }
    pool.len() - 1
}
