//! Kit configuration loading

use super::ConfigError;
use crate::stat_block::{AttackSpeed, Stat, DEFAULT_CRIT_DAMAGE};
use crate::types::DamageType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full numeric description of a combatant kit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_melee: bool,
    pub stats: BaseStatsConfig,
    pub attack_speed: AttackSpeed,
    #[serde(default)]
    pub basic_attack: BasicAttackConfig,
    pub q: AbilityConfig,
    pub w: AbilityConfig,
    pub e: AbilityConfig,
    pub r: AbilityConfig,
    #[serde(default)]
    pub empower: EmpowerConfig,
    #[serde(default)]
    pub vital: VitalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStatsConfig {
    pub attack_damage: Stat,
    #[serde(default)]
    pub ability_power: Stat,
    pub health: Stat,
    pub armor: Stat,
    pub magic_resist: Stat,
    /// Health per second
    #[serde(default)]
    pub health_regen: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicAttackConfig {
    #[serde(default = "default_crit_damage")]
    pub crit_damage: f64,
    #[serde(default = "default_attack_priority")]
    pub priority: u8,
}

impl Default for BasicAttackConfig {
    fn default() -> Self {
        BasicAttackConfig {
            crit_damage: default_crit_damage(),
            priority: default_attack_priority(),
        }
    }
}

/// One ability slot; per-rank vectors are indexed by `rank - 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityConfig {
    pub name: String,
    #[serde(default = "default_max_rank")]
    pub max_rank: u8,
    pub cooldowns: Vec<f64>,
    #[serde(default)]
    pub base_damage: Vec<f64>,
    #[serde(default)]
    pub bonus_ad_ratio: Vec<f64>,
    #[serde(default)]
    pub total_ad_ratio: Vec<f64>,
    #[serde(default)]
    pub ap_ratio: Vec<f64>,
    #[serde(default = "default_damage_type")]
    pub damage_type: DamageType,
    /// Seconds the caster is locked
    #[serde(default)]
    pub cast_time: f64,
    /// Seconds from cast start to the hit landing
    #[serde(default)]
    pub hit_delay: f64,
    #[serde(default)]
    pub bonus_attack_speed: Vec<f64>,
    /// Minimum level for each rank (empty = one rank per level)
    #[serde(default)]
    pub unlock_levels: Vec<u32>,
    #[serde(default)]
    pub priority: u8,
}

impl AbilityConfig {
    /// Value of a per-rank vector at `rank` (zero when unlearned or absent)
    pub fn at_rank(values: &[f64], rank: u8) -> f64 {
        if rank == 0 {
            return 0.0;
        }
        values.get(rank as usize - 1).copied().unwrap_or(0.0)
    }

    pub fn cooldown(&self, rank: u8) -> Option<f64> {
        if rank == 0 {
            return None;
        }
        self.cooldowns.get(rank as usize - 1).copied()
    }

    fn validate(&self, slot: &str) -> Result<(), ConfigError> {
        let ranks = self.max_rank as usize;
        if self.cooldowns.len() != ranks {
            return Err(ConfigError::ValidationError(format!(
                "{}: expected {} cooldowns, got {}",
                slot,
                ranks,
                self.cooldowns.len()
            )));
        }
        if self.cooldowns.iter().any(|cd| !cd.is_finite() || *cd <= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "{}: cooldowns must be positive",
                slot
            )));
        }
        for (field, values) in [
            ("base_damage", &self.base_damage),
            ("bonus_ad_ratio", &self.bonus_ad_ratio),
            ("total_ad_ratio", &self.total_ad_ratio),
            ("ap_ratio", &self.ap_ratio),
            ("bonus_attack_speed", &self.bonus_attack_speed),
        ] {
            if !values.is_empty() && values.len() != ranks {
                return Err(ConfigError::ValidationError(format!(
                    "{}: {} has {} entries, expected {}",
                    slot,
                    field,
                    values.len(),
                    ranks
                )));
            }
        }
        if !self.unlock_levels.is_empty() && self.unlock_levels.len() != ranks {
            return Err(ConfigError::ValidationError(format!(
                "{}: unlock_levels has {} entries, expected {}",
                slot,
                self.unlock_levels.len(),
                ranks
            )));
        }
        if self.cast_time < 0.0 || self.hit_delay < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{}: cast_time and hit_delay must be non-negative",
                slot
            )));
        }
        Ok(())
    }
}

/// Empowered attack window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpowerConfig {
    #[serde(default = "default_empower_duration")]
    pub duration: f64,
    #[serde(default = "default_empower_charges")]
    pub charges: u8,
}

impl Default for EmpowerConfig {
    fn default() -> Self {
        EmpowerConfig {
            duration: default_empower_duration(),
            charges: default_empower_charges(),
        }
    }
}

/// Periodic weak-point proc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fraction of target max HP
    #[serde(default = "default_vital_max_hp_ratio")]
    pub max_hp_ratio: f64,
    /// Extra max HP fraction per 100 bonus AD
    #[serde(default = "default_vital_bonus_ad_ratio")]
    pub bonus_ad_ratio: f64,
    #[serde(default = "default_vital_heal_min")]
    pub heal_min: f64,
    #[serde(default = "default_vital_heal_max")]
    pub heal_max: f64,
    #[serde(default = "default_vital_heal_max_level")]
    pub heal_max_level: u32,
    /// Seconds after a proc before the next vital can be hit
    #[serde(default = "default_vital_respawn")]
    pub respawn_delay: f64,
    #[serde(default = "default_vital_ult_delay")]
    pub ult_reveal_delay: f64,
    #[serde(default = "default_vital_ult_count")]
    pub ult_count: u8,
}

impl Default for VitalConfig {
    fn default() -> Self {
        VitalConfig {
            enabled: true,
            max_hp_ratio: default_vital_max_hp_ratio(),
            bonus_ad_ratio: default_vital_bonus_ad_ratio(),
            heal_min: default_vital_heal_min(),
            heal_max: default_vital_heal_max(),
            heal_max_level: default_vital_heal_max_level(),
            respawn_delay: default_vital_respawn(),
            ult_reveal_delay: default_vital_ult_delay(),
            ult_count: default_vital_ult_count(),
        }
    }
}

impl KitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.q.validate("q")?;
        self.w.validate("w")?;
        self.e.validate("e")?;
        self.r.validate("r")?;

        let speed = &self.attack_speed;
        if speed.base <= 0.0 || speed.cap <= 0.0 || !speed.base.is_finite() || !speed.cap.is_finite() {
            return Err(ConfigError::ValidationError(
                "attack_speed base and cap must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&speed.windup_fraction) {
            return Err(ConfigError::ValidationError(format!(
                "attack_speed windup_fraction must lie in [0, 1], got {}",
                speed.windup_fraction
            )));
        }
        if self.empower.charges == 0 || self.empower.duration <= 0.0 {
            return Err(ConfigError::ValidationError(
                "empower needs at least one charge and a positive duration".to_string(),
            ));
        }
        if self.vital.respawn_delay <= 0.0 || self.vital.heal_max_level < 2 {
            return Err(ConfigError::ValidationError(
                "vital respawn_delay must be positive and heal_max_level at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and validate a kit from a TOML file
pub fn load_kit_config(path: &Path) -> Result<KitConfig, ConfigError> {
    let config: KitConfig = super::load_toml(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a kit from a TOML string
pub fn parse_kit_config(content: &str) -> Result<KitConfig, ConfigError> {
    let config: KitConfig = super::parse_toml(content)?;
    config.validate()?;
    Ok(config)
}

/// The built-in duelist kit
pub fn default_kit() -> Result<KitConfig, ConfigError> {
    parse_kit_config(include_str!("../../config/duelist.toml"))
}

fn default_true() -> bool {
    true
}
fn default_crit_damage() -> f64 {
    DEFAULT_CRIT_DAMAGE
}
fn default_attack_priority() -> u8 {
    6
}
fn default_max_rank() -> u8 {
    5
}
fn default_damage_type() -> DamageType {
    DamageType::Physical
}
fn default_empower_duration() -> f64 {
    4.0
}
fn default_empower_charges() -> u8 {
    2
}
fn default_vital_max_hp_ratio() -> f64 {
    0.03
}
fn default_vital_bonus_ad_ratio() -> f64 {
    0.04
}
fn default_vital_heal_min() -> f64 {
    35.0
}
fn default_vital_heal_max() -> f64 {
    107.65
}
fn default_vital_heal_max_level() -> u32 {
    20
}
fn default_vital_respawn() -> f64 {
    2.25
}
fn default_vital_ult_delay() -> f64 {
    0.5
}
fn default_vital_ult_count() -> u8 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kit_loads() {
        let kit = default_kit().unwrap();
        assert_eq!(kit.name, "Duelist");
        assert_eq!(kit.q.cooldowns.len(), 5);
        assert_eq!(kit.r.max_rank, 3);
        assert_eq!(kit.r.unlock_levels, vec![6, 11, 16]);
        assert!((kit.attack_speed.growth - 0.032).abs() < f64::EPSILON);
        assert!(kit.vital.enabled);
    }

    #[test]
    fn test_rank_lookup() {
        let kit = default_kit().unwrap();
        assert!((AbilityConfig::at_rank(&kit.q.base_damage, 3) - 90.0).abs() < f64::EPSILON);
        assert!(AbilityConfig::at_rank(&kit.q.base_damage, 0).abs() < f64::EPSILON);
        assert_eq!(kit.e.cooldown(0), None);
        assert_eq!(kit.e.cooldown(5), Some(7.0));
    }

    #[test]
    fn test_rejects_mismatched_rank_vectors() {
        let mut kit = default_kit().unwrap();
        kit.q.base_damage.pop();
        assert!(matches!(kit.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_parse_error_surfaces() {
        let result = parse_kit_config("name = 3");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
