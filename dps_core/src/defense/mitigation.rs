//! Mitigation - Post-resistance damage
//!
//! `damage = raw × 100 / (100 + effective_resistance)`. Negative resistance
//! amplifies damage; at or below -100 the formula is undefined.

use crate::damage::DamageError;
use crate::types::DamageType;

/// Lowest effective resistance the formula accepts (exclusive)
pub const MIN_EFFECTIVE_RESISTANCE: f64 = -100.0;

/// Damage multiplier for an effective resistance
pub fn resistance_multiplier(effective_resistance: f64) -> Result<f64, DamageError> {
    if !effective_resistance.is_finite() || effective_resistance <= MIN_EFFECTIVE_RESISTANCE {
        return Err(DamageError::ResistanceOutOfRange {
            value: effective_resistance,
        });
    }
    Ok(100.0 / (100.0 + effective_resistance))
}

/// Mitigate raw damage of the given type
pub fn mitigate(
    raw: f64,
    damage_type: DamageType,
    effective_resistance: f64,
) -> Result<f64, DamageError> {
    if damage_type.bypasses_resistance() {
        return Ok(raw);
    }
    Ok(raw * resistance_multiplier(effective_resistance)?)
}
