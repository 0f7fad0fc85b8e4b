//! Upper bound - Optimistic estimate of the damage a branch can still deal
//!
//! Every count is taken at its most favorable: capped (or uncapped, under
//! Hail of Blades) attack speed, every cooldown used the instant it is ready,
//! every amplifier at its maximum. The estimate never undercuts the best
//! completion of a branch.

use super::machine::Machine;
use super::state::SearchState;
use crate::kit::Slot;
use crate::source::{hail_of_blades_attack_speed, ItemEffect, Keystone};
use crate::table::DamageSource;
use crate::types::ActionId;

pub struct UpperBound<'m> {
    machine: &'m Machine<'m>,
    attack: f64,
    e_crit: f64,
    q: f64,
    w: f64,
    vital: f64,
    keystone_proc: f64,
    min_interval: f64,
    min_windup: f64,
}

impl<'m> UpperBound<'m> {
    pub fn new(machine: &'m Machine<'m>) -> Self {
        let table = machine.table();
        let items = machine.items();
        let stats = machine.stats();
        let kit = machine.kit();

        let max_amp = |applies: &dyn Fn(&ItemEffect) -> bool| -> f64 {
            items
                .iter()
                .filter(|item| applies(*item))
                .map(|item| 1.0 + item.max_amp())
                .product()
        };
        let action_max = |action: ActionId, source: DamageSource| {
            table.max_damage(source) * max_amp(&|item| item.applies_to(action))
        };

        let attack = action_max(ActionId::AutoAttack, DamageSource::AutoAttack)
            .max(action_max(ActionId::EFirst, DamageSource::AutoAttack));

        // Fastest attack speed reachable in any branch
        let mut extra = 0.0;
        if kit.is_learned(ActionId::EActivate) {
            extra += kit.empowered_attack_speed();
        }
        let hail_of_blades = machine.keystone() == Some(Keystone::HailOfBlades);
        if hail_of_blades {
            extra += hail_of_blades_attack_speed(stats.is_melee);
        }
        let attack_speed = &stats.attack_speed;
        let uncapped = attack_speed.uncapped(stats.level, extra);
        let fastest = if hail_of_blades {
            uncapped.max(attack_speed.cap)
        } else {
            uncapped.min(attack_speed.cap)
        };
        let min_interval = 1.0 / fastest;

        UpperBound {
            machine,
            attack,
            e_crit: action_max(ActionId::ECrit, DamageSource::ECrit),
            q: action_max(ActionId::Q, DamageSource::Q),
            w: action_max(ActionId::W, DamageSource::W),
            vital: table.max_damage(DamageSource::Vital) * max_amp(&ItemEffect::amplifies_proc),
            keystone_proc: table.max_damage(DamageSource::KeystoneProc),
            min_interval,
            min_windup: min_interval * attack_speed.windup_fraction,
        }
    }

    /// Remaining damage `state` can add at most
    pub fn estimate(&self, state: &SearchState) -> f64 {
        let machine = self.machine;
        let kit = machine.kit();
        let eps = machine.epsilon();
        let limit = machine.time_limit();
        let now = state.elapsed;
        if now + eps >= limit {
            return 0.0;
        }

        // Step 1: Casts per slot
        let n_q = self.casts(state, Slot::Q);
        let n_w = self.casts(state, Slot::W);
        let n_e = self.casts(state, Slot::E);
        let n_r = if kit.vital_enabled() {
            self.casts(state, Slot::R)
        } else {
            0.0
        };

        // Step 2: Attack slots, one extra per reset
        let resets = n_q + n_e;
        let start = if resets > 0.0 {
            now
        } else {
            now.max(state.next_attack_at)
        };
        let span = limit - self.min_windup - start;
        let n_attacks = if span < -eps {
            resets
        } else {
            1.0 + (span.max(0.0) / self.min_interval + eps).floor() + resets
        };
        let crit_slots = n_e + if state.empowered_remaining > 0 { 1.0 } else { 0.0 };

        let mut bound = n_attacks * self.attack
            + n_attacks.min(crit_slots) * (self.e_crit - self.attack).max(0.0)
            + n_q * self.q
            + n_w * self.w;

        // Step 3: Periodic procs
        let n_damaging = n_attacks + n_q + n_w;
        if kit.vital_enabled() {
            let periodic = 1.0 + ((limit - now) / kit.vital_respawn_delay()).floor();
            let ult = f64::from(state.ult_procs_remaining) + n_r * f64::from(kit.ult_vital_count());
            bound += n_damaging.min(periodic + ult) * self.vital;
        }

        // Step 4: Keystone proc
        if let Some(keystone) = machine.keystone() {
            if keystone.proc_pending(&state.keystone) {
                bound += self.keystone_proc;
            }
        }

        // Step 5: Item on-hit procs
        let n_on_hit = n_attacks + n_q;
        let table = machine.table();
        for item in machine.items().iter().filter(|item| item.has_on_hit()) {
            let Some(damage_type) = item.proc_damage_type() else {
                continue;
            };
            let count = match item.spellblade_cooldown() {
                Some(cooldown) if cooldown > eps => {
                    n_on_hit.min(1.0 + ((limit - now) / cooldown).floor())
                }
                _ => n_on_hit,
            };
            let per_proc = item.max_proc_raw(machine.stats(), state.target_hp)
                * table.max_unit(damage_type);
            bound += count * per_proc;
        }

        bound
    }

    /// Most casts of `slot` that can still start (and land) before the horizon
    ///
    /// Counted in `f64` so very long windows cannot overflow.
    fn casts(&self, state: &SearchState, slot: Slot) -> f64 {
        let machine = self.machine;
        let kit = machine.kit();
        let Some(cooldown) = kit.cooldown(slot) else {
            return 0.0;
        };
        let eps = machine.epsilon();
        let limit = machine.time_limit();
        let descriptor = kit.descriptor(slot.cast_action());
        let delay = descriptor.hit_delay(0.0);
        let start = state.elapsed.max(state.ready_at(slot));
        if start + eps >= limit || start + delay > limit + eps {
            return 0.0;
        }
        // Cooldowns are validated positive
        let step = cooldown.max(descriptor.lock(0.0));
        1.0 + ((limit - delay - start) / step + eps).floor()
    }
}
