//! StatBlock - Attacker stats at a given level

mod attack_speed;
mod delta;
mod stat_value;

pub use attack_speed::{AttackSpeed, DEFAULT_ATTACK_SPEED_CAP};
pub use delta::{DeltaGuard, StatDelta};
pub use stat_value::{growth_factor, growth_step, Stat};

use crate::defense::PenetrationProfile;
use serde::{Deserialize, Serialize};

/// Default critical strike damage multiplier
pub const DEFAULT_CRIT_DAMAGE: f64 = 1.75;

/// Complete stat state of the attacker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    // === Identity ===
    pub level: u32,
    pub is_melee: bool,

    // === Attributes ===
    pub attack_damage: Stat,
    pub ability_power: Stat,
    pub health: Stat,
    pub armor: Stat,
    pub magic_resist: Stat,

    // === Offense ===
    pub penetration: PenetrationProfile,
    pub attack_speed: AttackSpeed,
    /// Chance in [0, 1]; basic attacks use the expected crit value
    pub crit_chance: f64,
    pub crit_damage: f64,

    // === Sustain ===
    pub life_steal: f64,
    pub omnivamp: f64,
    /// Health regenerated per second
    pub health_regen: f64,
}

impl StatBlock {
    pub fn base_ad(&self) -> f64 {
        self.attack_damage.base_at(self.level)
    }

    pub fn bonus_ad(&self) -> f64 {
        self.attack_damage.bonus
    }

    pub fn total_ad(&self) -> f64 {
        self.attack_damage.total_at(self.level)
    }

    pub fn bonus_ap(&self) -> f64 {
        self.ability_power.bonus
    }

    pub fn total_ap(&self) -> f64 {
        self.ability_power.total_at(self.level)
    }

    pub fn max_health(&self) -> f64 {
        self.health.total_at(self.level)
    }

    pub fn total_armor(&self) -> f64 {
        self.armor.total_at(self.level)
    }

    pub fn total_magic_resist(&self) -> f64 {
        self.magic_resist.total_at(self.level)
    }

    /// Attacks per second with a temporary `extra` bonus
    pub fn attacks_per_second(&self, extra: f64) -> f64 {
        self.attack_speed.total(self.level, extra)
    }

    pub fn attack_interval(&self, extra: f64) -> f64 {
        self.attack_speed.interval(self.level, extra)
    }

    pub fn attack_windup(&self, extra: f64) -> f64 {
        self.attack_speed.windup(self.level, extra)
    }

    /// Attack interval and windup; `ignore_cap` lets the bonus exceed the cap
    pub fn attack_timing(&self, extra: f64, ignore_cap: bool) -> (f64, f64) {
        let speed = if ignore_cap {
            self.attack_speed.uncapped(self.level, extra)
        } else {
            self.attacks_per_second(extra)
        };
        let interval = 1.0 / speed;
        (interval, interval * self.attack_speed.windup_fraction)
    }

    /// Expected crit multiplier of a basic attack
    pub fn expected_crit_multiplier(&self) -> f64 {
        let chance = self.crit_chance.clamp(0.0, 1.0);
        1.0 + chance * (self.crit_damage - 1.0)
    }

    /// Add every field of `delta` to the matching bonus
    pub fn apply(&mut self, delta: &StatDelta) {
        self.attack_damage.add_bonus(delta.bonus_ad);
        self.ability_power.add_bonus(delta.bonus_ap);
        self.health.add_bonus(delta.bonus_health);
        self.armor.add_bonus(delta.bonus_armor);
        self.magic_resist.add_bonus(delta.bonus_magic_resist);

        self.penetration.armor.flat_penetration += delta.lethality;
        self.penetration.armor.pct_penetration += delta.armor_pen_pct;
        self.penetration.magic.flat_penetration += delta.magic_pen_flat;
        self.penetration.magic.pct_penetration += delta.magic_pen_pct;

        self.attack_speed.bonus += delta.bonus_attack_speed;
        self.crit_chance += delta.crit_chance;
        self.life_steal += delta.life_steal;
        self.omnivamp += delta.omnivamp;
        self.health_regen += delta.health_regen;
    }

    /// Apply `delta` until the returned guard is dropped
    pub fn scoped(&mut self, delta: StatDelta) -> DeltaGuard<'_> {
        DeltaGuard::new(self, delta)
    }

    /// Run `f` with `delta` applied, restoring the stats afterwards
    pub fn with_delta<T>(&mut self, delta: StatDelta, f: impl FnOnce(&StatBlock) -> T) -> T {
        let guard = self.scoped(delta);
        f(&guard)
    }
}
