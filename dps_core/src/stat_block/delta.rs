//! StatDelta - Additive stat adjustments and the scoped guard that undoes them

use super::StatBlock;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Additive adjustment to every bonus field of a [`StatBlock`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatDelta {
    pub bonus_ad: f64,
    pub bonus_ap: f64,
    pub bonus_health: f64,
    pub bonus_armor: f64,
    pub bonus_magic_resist: f64,

    /// Flat armor penetration
    pub lethality: f64,
    pub armor_pen_pct: f64,
    pub magic_pen_flat: f64,
    pub magic_pen_pct: f64,

    /// Fraction (0.35 = +35%)
    pub bonus_attack_speed: f64,
    pub crit_chance: f64,
    pub life_steal: f64,
    pub omnivamp: f64,
    pub health_regen: f64,
}

impl StatDelta {
    pub fn bonus_ad(value: f64) -> Self {
        StatDelta {
            bonus_ad: value,
            ..Default::default()
        }
    }

    pub fn attack_speed(value: f64) -> Self {
        StatDelta {
            bonus_attack_speed: value,
            ..Default::default()
        }
    }

    /// The delta that undoes this one
    pub fn negate(&self) -> Self {
        StatDelta {
            bonus_ad: -self.bonus_ad,
            bonus_ap: -self.bonus_ap,
            bonus_health: -self.bonus_health,
            bonus_armor: -self.bonus_armor,
            bonus_magic_resist: -self.bonus_magic_resist,
            lethality: -self.lethality,
            armor_pen_pct: -self.armor_pen_pct,
            magic_pen_flat: -self.magic_pen_flat,
            magic_pen_pct: -self.magic_pen_pct,
            bonus_attack_speed: -self.bonus_attack_speed,
            crit_chance: -self.crit_chance,
            life_steal: -self.life_steal,
            omnivamp: -self.omnivamp,
            health_regen: -self.health_regen,
        }
    }

    /// Field-wise sum
    pub fn combine(&self, other: &StatDelta) -> Self {
        StatDelta {
            bonus_ad: self.bonus_ad + other.bonus_ad,
            bonus_ap: self.bonus_ap + other.bonus_ap,
            bonus_health: self.bonus_health + other.bonus_health,
            bonus_armor: self.bonus_armor + other.bonus_armor,
            bonus_magic_resist: self.bonus_magic_resist + other.bonus_magic_resist,
            lethality: self.lethality + other.lethality,
            armor_pen_pct: self.armor_pen_pct + other.armor_pen_pct,
            magic_pen_flat: self.magic_pen_flat + other.magic_pen_flat,
            magic_pen_pct: self.magic_pen_pct + other.magic_pen_pct,
            bonus_attack_speed: self.bonus_attack_speed + other.bonus_attack_speed,
            crit_chance: self.crit_chance + other.crit_chance,
            life_steal: self.life_steal + other.life_steal,
            omnivamp: self.omnivamp + other.omnivamp,
            health_regen: self.health_regen + other.health_regen,
        }
    }
}

/// Keeps a [`StatDelta`] applied to a [`StatBlock`] for its lifetime
///
/// Dropping the guard applies the negated delta, so the stats are restored on
/// every exit path, including early returns and unwinding.
pub struct DeltaGuard<'a> {
    stats: &'a mut StatBlock,
    delta: StatDelta,
}

impl<'a> DeltaGuard<'a> {
    pub(super) fn new(stats: &'a mut StatBlock, delta: StatDelta) -> Self {
        stats.apply(&delta);
        DeltaGuard { stats, delta }
    }

    pub fn delta(&self) -> &StatDelta {
        &self.delta
    }
}

impl Deref for DeltaGuard<'_> {
    type Target = StatBlock;

    fn deref(&self) -> &StatBlock {
        self.stats
    }
}

impl DerefMut for DeltaGuard<'_> {
    fn deref_mut(&mut self) -> &mut StatBlock {
        self.stats
    }
}

impl Drop for DeltaGuard<'_> {
    fn drop(&mut self) {
        self.stats.apply(&self.delta.negate());
    }
}
