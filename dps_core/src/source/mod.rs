//! Proc sources - Keystones, minor runes and items
//!
//! Each source is a closed enum. Static sources produce [`DamageModifier`]s
//! once per call; dynamic sources keep small per-branch state that the
//! optimizer copies with every search state.
//!
//! [`DamageModifier`]: crate::damage::DamageModifier

mod item;
mod keystone;
mod minor_rune;

pub use item::{ItemEffect, ItemState, MAX_ITEMS};
pub use keystone::{
    conqueror_bonus_ad, hail_of_blades_attack_speed, Keystone, KeystoneState, KeystoneTrigger,
    CONQUEROR_MAX_STACKS, PTA_EXPOSURE_AMP,
};
pub use minor_rune::MinorRune;

/// Level at which level-scaled rune values peak
pub const RUNE_MAX_LEVEL: u32 = 18;

/// Linear interpolation between the level 1 and level 18 values
pub fn level_scale(min: f64, max: f64, level: u32) -> f64 {
    let clamped = level.clamp(1, RUNE_MAX_LEVEL);
    min + (max - min) * (clamped - 1) as f64 / (RUNE_MAX_LEVEL - 1) as f64
}
