//! Scenario configuration - One fight described in TOML

use super::{ConfigError, KitConfig, SearchConstants};
use crate::combat::ComboRequest;
use crate::damage::DamageModifier;
use crate::defense::Target;
use crate::kit::{AbilityRanks, Kit};
use crate::search::{Method, SearchOptions, SearchRequest};
use crate::source::{ItemEffect, Keystone, MinorRune, MAX_ITEMS};
use crate::stat_block::{StatBlock, StatDelta};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Attacker setup, target and optimizer window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub ranks: AbilityRanks,
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,
    #[serde(default)]
    pub ult_active: bool,
    /// Extra bonus attack speed applied to the optimizer call only
    #[serde(default)]
    pub bonus_attack_speed: f64,
    /// Attacker bonus stats from items and buffs
    #[serde(default)]
    pub bonus: StatDelta,
    #[serde(default)]
    pub keystone: Option<Keystone>,
    /// Item names (see [`ItemEffect`]'s parser)
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub minor_runes: Vec<MinorRune>,
    /// Attacker current health over max health, for health-dependent runes
    #[serde(default = "default_own_health")]
    pub own_health_fraction: f64,
    /// Extra static amplifiers
    #[serde(default)]
    pub modifiers: Vec<DamageModifier>,
    pub target: TargetConfig,
    #[serde(default)]
    pub method: Option<Method>,
    #[serde(default = "default_true")]
    pub allow_wait: bool,
    #[serde(default)]
    pub search: SearchConstants,
    /// Steps replayed by the combo entry point
    #[serde(default)]
    pub combo: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub max_hp: f64,
    /// Defaults to `max_hp`
    #[serde(default)]
    pub current_hp: Option<f64>,
    pub armor: f64,
    pub magic_resist: f64,
    #[serde(default)]
    pub bonus_armor: f64,
    #[serde(default)]
    pub bonus_magic_resist: f64,
}

impl TargetConfig {
    pub fn build(&self) -> Result<Target, ConfigError> {
        let target = Target {
            max_hp: self.max_hp,
            current_hp: self.current_hp.unwrap_or(self.max_hp),
            armor: self.armor,
            magic_resist: self.magic_resist,
            bonus_armor: self.bonus_armor,
            bonus_magic_resist: self.bonus_magic_resist,
        };
        target.validate()?;
        Ok(target)
    }
}

/// Owned inputs resolved from a [`Scenario`]
#[derive(Debug, Clone)]
pub struct ScenarioParts {
    pub kit: Kit,
    pub stats: StatBlock,
    pub target: Target,
    pub keystone: Option<Keystone>,
    pub items: Vec<ItemEffect>,
    pub static_modifiers: Vec<DamageModifier>,
}

impl Scenario {
    /// Resolve the scenario against a kit
    pub fn build(&self, kit_config: KitConfig) -> Result<ScenarioParts, ConfigError> {
        // Step 1: Kit and rank legality
        let kit = Kit::new(kit_config, self.ranks)?;
        kit.validate_level(self.level)?;

        // Step 2: Attacker stats
        let mut stats = kit.stats_at(self.level);
        stats.apply(&self.bonus);

        // Step 3: Target
        let target = self.target.build()?;

        // Step 4: Items
        if self.items.len() > MAX_ITEMS {
            return Err(ConfigError::ValidationError(format!(
                "at most {} items are supported, got {}",
                MAX_ITEMS,
                self.items.len()
            )));
        }
        let items = self
            .items
            .iter()
            .map(|name| name.parse::<ItemEffect>().map_err(ConfigError::ValidationError))
            .collect::<Result<Vec<_>, _>>()?;

        // Step 5: Static modifiers
        if !(0.0..=1.0).contains(&self.own_health_fraction) {
            return Err(ConfigError::ValidationError(format!(
                "own_health_fraction must lie in [0, 1], got {}",
                self.own_health_fraction
            )));
        }
        let mut static_modifiers = self.modifiers.clone();
        static_modifiers.extend(
            self.minor_runes
                .iter()
                .map(|rune| rune.modifier(&stats, self.own_health_fraction, &target)),
        );

        Ok(ScenarioParts {
            kit,
            stats,
            target,
            keystone: self.keystone,
            items,
            static_modifiers,
        })
    }

    /// Resolve the scenario against the built-in duelist kit
    pub fn build_default(&self) -> Result<ScenarioParts, ConfigError> {
        self.build(super::default_kit()?)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            method: self.method,
            allow_wait: self.allow_wait,
            constants: self.search,
        }
    }
}

impl ScenarioParts {
    pub fn search_request<'a>(&'a self, scenario: &Scenario) -> SearchRequest<'a> {
        SearchRequest::new(&self.kit, &self.stats, &self.target, scenario.time_limit)
            .with_keystone(self.keystone)
            .with_items(&self.items)
            .with_modifiers(&self.static_modifiers)
            .with_ult_active(scenario.ult_active)
            .with_bonus_attack_speed(scenario.bonus_attack_speed)
            .with_options(scenario.search_options())
    }

    pub fn combo_request(&self) -> ComboRequest<'_> {
        ComboRequest::new(&self.kit, &self.stats, &self.target)
            .with_keystone(self.keystone)
            .with_items(&self.items)
            .with_modifiers(&self.static_modifiers)
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: &Path) -> Result<Scenario, ConfigError> {
    super::load_toml(path)
}

/// Parse a scenario from a TOML string
pub fn parse_scenario(content: &str) -> Result<Scenario, ConfigError> {
    super::parse_toml(content)
}

fn default_level() -> u32 {
    9
}
fn default_time_limit() -> f64 {
    6.0
}
fn default_own_health() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}
