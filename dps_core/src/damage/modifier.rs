//! DamageModifier - Named multiplicative amplifiers
//!
//! A list of modifiers multiplies damage by `Π(1 + amp_i)`, so the order
//! modifiers are listed in never matters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageModifier {
    pub name: String,
    /// Fraction (0.08 = +8%)
    pub amp: f64,
}

impl DamageModifier {
    pub fn new(name: impl Into<String>, amp: f64) -> Self {
        DamageModifier {
            name: name.into(),
            amp,
        }
    }

    pub fn multiplier(&self) -> f64 {
        1.0 + self.amp
    }
}

/// Combined multiplier of a modifier list
pub fn total_multiplier(modifiers: &[DamageModifier]) -> f64 {
    modifiers.iter().map(DamageModifier::multiplier).product()
}

pub fn apply_modifiers(value: f64, modifiers: &[DamageModifier]) -> f64 {
    value * total_multiplier(modifiers)
}
