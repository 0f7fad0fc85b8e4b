//! Minor runes - Conditional damage amplifiers evaluated once per call

use crate::damage::DamageModifier;
use crate::defense::Target;
use crate::stat_block::StatBlock;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinorRune {
    /// 5% to 11% while own health is between 60% and 30%
    LastStand,
    /// 8% against targets below 40% health
    CoupDeGrace,
    /// 5% to 15% against targets with 10% to 100% more max health
    CutDown,
}

impl MinorRune {
    pub fn name(&self) -> &'static str {
        match self {
            MinorRune::LastStand => "Last Stand",
            MinorRune::CoupDeGrace => "Coup de Grace",
            MinorRune::CutDown => "Cut Down",
        }
    }

    /// Amplifier for the given situation
    ///
    /// `own_health_fraction` is the attacker's current health over max health.
    pub fn amp(&self, attacker: &StatBlock, own_health_fraction: f64, target: &Target) -> f64 {
        match self {
            MinorRune::LastStand => {
                let current = own_health_fraction.clamp(0.0, 1.0);
                if current >= 0.6 {
                    0.0
                } else if current <= 0.3 {
                    0.11
                } else {
                    0.05 + (0.6 - current) / 0.3 * 0.06
                }
            }
            MinorRune::CoupDeGrace => {
                if target.health_fraction() < 0.4 {
                    0.08
                } else {
                    0.0
                }
            }
            MinorRune::CutDown => {
                let own = attacker.max_health();
                if own <= 0.0 {
                    return 0.0;
                }
                let diff = (target.max_hp - own) / own;
                if diff < 0.1 {
                    0.0
                } else if diff >= 1.0 {
                    0.15
                } else {
                    0.05 + (diff - 0.1) / 0.9 * 0.10
                }
            }
        }
    }

    pub fn modifier(
        &self,
        attacker: &StatBlock,
        own_health_fraction: f64,
        target: &Target,
    ) -> DamageModifier {
        DamageModifier::new(self.name(), self.amp(attacker, own_health_fraction, target))
    }
}

impl FromStr for MinorRune {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "laststand" => Ok(MinorRune::LastStand),
            "coupdegrace" => Ok(MinorRune::CoupDeGrace),
            "cutdown" => Ok(MinorRune::CutDown),
            _ => Err(format!("unknown rune '{}'", s)),
        }
    }
}
