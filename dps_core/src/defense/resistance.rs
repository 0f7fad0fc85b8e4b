//! Resistance - Ordered reduction and penetration of armor / magic resist
//!
//! Order of application:
//! 1. Flat reduction (may push the value negative)
//! 2. Percentage reduction
//! 3. Percentage penetration, only while the value is positive
//! 4. Flat penetration, only while the value is positive, clamped at zero
//!
//! A value that is already negative after step 2 is returned unchanged.

use serde::{Deserialize, Serialize};

/// Reduction and penetration applied against one resistance
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Penetration {
    /// Flat reduction (applies to everyone hitting the target)
    pub flat_reduction: f64,
    /// Fraction in [0, 1]
    pub pct_reduction: f64,
    /// Fraction in [0, 1]
    pub pct_penetration: f64,
    /// Flat penetration (lethality for armor)
    pub flat_penetration: f64,
}

impl Penetration {
    pub fn effective(&self, base: f64) -> f64 {
        effective_resistance(
            base,
            self.flat_reduction,
            self.pct_reduction,
            self.pct_penetration,
            self.flat_penetration,
        )
    }
}

/// Attacker penetration against both resistances
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenetrationProfile {
    pub armor: Penetration,
    pub magic: Penetration,
}

/// Calculate effective resistance after reduction and penetration
pub fn effective_resistance(
    base: f64,
    flat_reduction: f64,
    pct_reduction: f64,
    pct_penetration: f64,
    flat_penetration: f64,
) -> f64 {
    // Step 1: Flat reduction
    let mut value = base - flat_reduction;

    // Step 2: Percentage reduction
    value *= 1.0 - pct_reduction;

    // Step 3: Percentage penetration
    if value > 0.0 {
        value *= 1.0 - pct_penetration;
    }

    // Step 4: Flat penetration never takes the value below zero
    if value > 0.0 {
        value = (value - flat_penetration).max(0.0);
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_penetration() {
        assert!((effective_resistance(80.0, 0.0, 0.0, 0.0, 0.0) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_of_operations() {
        // (100 - 10) × 0.8 = 72 → × 0.7 = 50.4 → - 20 = 30.4
        let eff = effective_resistance(100.0, 10.0, 0.2, 0.3, 20.0);
        assert!((eff - 30.4).abs() < 1e-9);
    }

    #[test]
    fn test_lethality_clamps_at_zero() {
        assert!(effective_resistance(15.0, 0.0, 0.0, 0.0, 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_value_is_left_alone() {
        // 10 - 30 = -20; penetration does not move a negative value
        let eff = effective_resistance(10.0, 30.0, 0.0, 0.5, 18.0);
        assert!((eff + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_value_ignores_lethality() {
        assert!(effective_resistance(20.0, 20.0, 0.0, 0.0, 10.0).abs() < 1e-9);
    }
}
