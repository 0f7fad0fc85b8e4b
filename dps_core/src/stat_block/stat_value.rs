//! Stat - A level-scaled attribute with an additive bonus
//!
//! Base value grows along the standard growth curve:
//! `base_at(level) = base + growth × Σ_{l=2..level}(0.65 + 0.035·l)`

use serde::{Deserialize, Serialize};

/// Growth multiplier gained when reaching `level`
pub fn growth_step(level: u32) -> f64 {
    0.65 + 0.035 * level as f64
}

/// Cumulative growth multiplier from level 1 to `level`
pub fn growth_factor(level: u32) -> f64 {
    (2..=level).map(growth_step).sum()
}

/// A single attribute: base, per-level growth and bonus from external sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    /// Value at level 1
    pub base: f64,
    /// Growth per level along the growth curve
    #[serde(default)]
    pub growth: f64,
    /// Sum of all bonus additions (items, runes, buffs)
    #[serde(default)]
    pub bonus: f64,
}

impl Stat {
    pub fn new(base: f64, growth: f64) -> Self {
        Stat {
            base,
            growth,
            bonus: 0.0,
        }
    }

    /// Create a stat with no growth
    pub fn flat(base: f64) -> Self {
        Stat::new(base, 0.0)
    }

    pub fn base_at(&self, level: u32) -> f64 {
        self.base + self.growth * growth_factor(level)
    }

    pub fn total_at(&self, level: u32) -> f64 {
        self.base_at(level) + self.bonus
    }

    pub fn add_bonus(&mut self, value: f64) {
        self.bonus += value;
    }
}
