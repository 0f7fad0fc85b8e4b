//! Target - The defender being optimized against

use crate::config::ConfigError;
use crate::stat_block::StatBlock;
use crate::types::DamageType;
use serde::{Deserialize, Serialize};

/// Defender stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub max_hp: f64,
    pub current_hp: f64,
    /// Total armor
    pub armor: f64,
    /// Total magic resist
    pub magic_resist: f64,
    #[serde(default)]
    pub bonus_armor: f64,
    #[serde(default)]
    pub bonus_magic_resist: f64,
}

impl Target {
    /// Create a validated target at full health
    pub fn new(max_hp: f64, armor: f64, magic_resist: f64) -> Result<Self, ConfigError> {
        let target = Target {
            max_hp,
            current_hp: max_hp,
            armor,
            magic_resist,
            bonus_armor: 0.0,
            bonus_magic_resist: 0.0,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn with_current_hp(mut self, current_hp: f64) -> Result<Self, ConfigError> {
        self.current_hp = current_hp;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_hp.is_finite() || self.max_hp <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "target max_hp must be positive and finite, got {}",
                self.max_hp
            )));
        }
        if !self.current_hp.is_finite() || self.current_hp < 0.0 || self.current_hp > self.max_hp {
            return Err(ConfigError::ValidationError(format!(
                "target current_hp must lie in [0, {}], got {}",
                self.max_hp, self.current_hp
            )));
        }
        for (name, value) in [
            ("armor", self.armor),
            ("magic_resist", self.magic_resist),
            ("bonus_armor", self.bonus_armor),
            ("bonus_magic_resist", self.bonus_magic_resist),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "target {} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Base resistance against a damage type (adaptive must be resolved first)
    pub fn resistance(&self, damage_type: DamageType) -> f64 {
        match damage_type {
            DamageType::Physical | DamageType::Adaptive => self.armor,
            DamageType::Magic => self.magic_resist,
            DamageType::True => 0.0,
        }
    }

    /// Effective resistance against `attacker` for a resolved damage type
    pub fn effective_resistance(&self, damage_type: DamageType, attacker: &StatBlock) -> f64 {
        match damage_type {
            DamageType::Physical | DamageType::Adaptive => {
                attacker.penetration.armor.effective(self.armor)
            }
            DamageType::Magic => attacker.penetration.magic.effective(self.magic_resist),
            DamageType::True => 0.0,
        }
    }

    pub fn health_fraction(&self) -> f64 {
        self.current_hp / self.max_hp
    }
}
