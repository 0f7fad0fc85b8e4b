//! Attack speed - Attacks per second and the derived attack timings

use super::stat_value::growth_factor;
use serde::{Deserialize, Serialize};

/// Default hard cap on attacks per second
pub const DEFAULT_ATTACK_SPEED_CAP: f64 = 3.003;

fn default_cap() -> f64 {
    DEFAULT_ATTACK_SPEED_CAP
}

/// Attack speed attributes
///
/// `total = base + ratio × (growth_bonus(level) + bonus + extra)`, clamped to `cap`.
/// Bonus values are fractions (0.5 = +50%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackSpeed {
    /// Attacks per second at level 1
    pub base: f64,
    /// Scaling applied to every bonus
    pub ratio: f64,
    /// Bonus fraction gained per level along the growth curve
    #[serde(default)]
    pub growth: f64,
    /// Bonus fraction from external sources
    #[serde(default)]
    pub bonus: f64,
    #[serde(default = "default_cap")]
    pub cap: f64,
    /// Fraction of the attack interval spent winding up
    pub windup_fraction: f64,
}

impl AttackSpeed {
    /// Attacks per second with `extra` temporary bonus
    pub fn total(&self, level: u32, extra: f64) -> f64 {
        self.uncapped(level, extra).min(self.cap)
    }

    /// Attacks per second ignoring the cap
    pub fn uncapped(&self, level: u32, extra: f64) -> f64 {
        let growth_bonus = self.growth * growth_factor(level);
        self.base + self.ratio * (growth_bonus + self.bonus + extra)
    }

    /// Seconds between attack starts
    pub fn interval(&self, level: u32, extra: f64) -> f64 {
        1.0 / self.total(level, extra)
    }

    /// Seconds from attack start to the hit landing
    pub fn windup(&self, level: u32, extra: f64) -> f64 {
        self.interval(level, extra) * self.windup_fraction
    }

    /// Shortest possible interval (attack speed at cap)
    pub fn min_interval(&self) -> f64 {
        1.0 / self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> AttackSpeed {
        AttackSpeed {
            base: 1.0,
            ratio: 1.0,
            growth: 0.0,
            bonus: 0.0,
            cap: 2.5,
            windup_fraction: 0.1,
        }
    }

    #[test]
    fn test_interval_and_windup() {
        let speed = unit();
        assert!((speed.interval(1, 0.0) - 1.0).abs() < 1e-9);
        assert!((speed.windup(1, 0.0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_extra_bonus_scales_with_ratio() {
        let mut speed = unit();
        speed.ratio = 0.5;
        assert!((speed.total(1, 1.0) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_uncapped_exceeds_cap() {
        let speed = unit();
        assert!((speed.uncapped(1, 10.0) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_cap_applies() {
        let speed = unit();
        assert!((speed.total(1, 10.0) - 2.5).abs() < 1e-9);
        assert!((speed.interval(1, 10.0) - speed.min_interval()).abs() < 1e-9);
    }
}
