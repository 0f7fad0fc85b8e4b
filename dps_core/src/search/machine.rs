//! Machine - Legality and transitions of the timed state machine
//!
//! After every transition the state is advanced to the next decision point:
//! the earliest time at which some non-wait action is legal. Idle time only
//! enters the search through an explicit `WAIT`.

use super::result::{EventNotes, TimelineEvent};
use super::state::SearchState;
use crate::defense::Target;
use crate::kit::{Kit, Slot};
use crate::source::{ItemEffect, ItemState, Keystone, MAX_ITEMS};
use crate::stat_block::StatBlock;
use crate::table::{Condition, DamageSource, DamageTable};
use crate::types::{ActionId, ActionSet};
use thiserror::Error;

/// A transition was requested that the state does not allow
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("{action} is not legal at t={time:.3}")]
    Illegal { action: ActionId, time: f64 },
}

/// Result of applying one action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: SearchState,
    pub damage: f64,
    pub heal: f64,
    pub event: TimelineEvent,
}

/// Read-only context shared by every branch of one optimizer call
pub struct Machine<'a> {
    kit: &'a Kit,
    stats: &'a StatBlock,
    table: &'a DamageTable,
    keystone: Option<Keystone>,
    items: &'a [ItemEffect],
    time_limit: f64,
    allow_wait: bool,
    epsilon: f64,
}

impl<'a> Machine<'a> {
    pub fn new(
        kit: &'a Kit,
        stats: &'a StatBlock,
        table: &'a DamageTable,
        keystone: Option<Keystone>,
        items: &'a [ItemEffect],
        time_limit: f64,
    ) -> Self {
        Machine {
            kit,
            stats,
            table,
            keystone,
            items: &items[..items.len().min(MAX_ITEMS)],
            time_limit,
            allow_wait: true,
            epsilon: 1e-9,
        }
    }

    pub fn with_wait(mut self, allow_wait: bool) -> Self {
        self.allow_wait = allow_wait;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    // === Accessors ===

    pub fn kit(&self) -> &Kit {
        self.kit
    }

    pub fn stats(&self) -> &StatBlock {
        self.stats
    }

    pub fn table(&self) -> &DamageTable {
        self.table
    }

    pub fn keystone(&self) -> Option<Keystone> {
        self.keystone
    }

    pub fn items(&self) -> &[ItemEffect] {
        self.items
    }

    pub fn time_limit(&self) -> f64 {
        self.time_limit
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Starting state, already advanced to the first decision point
    pub fn root(&self, target: &Target, ult_active: bool) -> SearchState {
        let mut items = [ItemState::default(); MAX_ITEMS];
        for (slot, item) in items.iter_mut().zip(self.items) {
            *slot = item.initial_state();
        }
        let vitals = self.kit.vital_enabled();
        let mut state = SearchState {
            elapsed: 0.0,
            lock_until: 0.0,
            next_attack_at: 0.0,
            ready_at: [0.0; 4],
            empowered_remaining: 0,
            empowered_until: 0.0,
            next_proc_at: if vitals { 0.0 } else { f64::INFINITY },
            ult_procs_remaining: if vitals && ult_active {
                self.kit.ult_vital_count()
            } else {
                0
            },
            keystone: Default::default(),
            items,
            target_hp: target.current_hp,
            damage: 0.0,
            healing: 0.0,
            last_hit_at: 0.0,
        };
        // An ultimate already running was cast before the window
        if ult_active {
            state.ready_at[Slot::R.index()] = f64::INFINITY;
        }
        self.advance_to_decision(&mut state);
        state
    }

    // === Timing ===

    /// Keystone condition of the state
    pub fn condition(&self, state: &SearchState) -> Condition {
        self.keystone
            .map_or(Condition::Base, |k| k.condition(&state.keystone))
    }

    /// Attack interval and windup at `time`
    pub fn attack_timing(&self, state: &SearchState, time: f64) -> (f64, f64) {
        let mut extra = 0.0;
        if state.empowered_active(time) {
            extra += self.kit.empowered_attack_speed();
        }
        let mut ignore_cap = false;
        if let Some(keystone) = self.keystone {
            extra += keystone.extra_attack_speed(&state.keystone, time, self.stats.is_melee);
            ignore_cap = keystone.ignores_attack_speed_cap(&state.keystone, time);
        }
        self.stats.attack_timing(extra, ignore_cap)
    }

    /// Product of dynamic item amplifiers selected by `applies`
    pub fn dynamic_multiplier(
        &self,
        state: &SearchState,
        applies: impl Fn(&ItemEffect) -> bool,
    ) -> f64 {
        self.items
            .iter()
            .zip(state.items.iter())
            .filter(|(item, _)| applies(*item))
            .map(|(item, item_state)| 1.0 + item.current_amp(item_state))
            .product()
    }

    // === Legality ===

    pub fn is_legal(&self, state: &SearchState, action: ActionId) -> bool {
        self.is_legal_at(state, action, state.elapsed)
    }

    fn is_legal_at(&self, state: &SearchState, action: ActionId, time: f64) -> bool {
        let eps = self.epsilon;
        if time + eps >= self.time_limit || state.lock_until > time + eps {
            return false;
        }
        let descriptor = self.kit.descriptor(action);
        if !descriptor.is_learned() {
            return false;
        }
        let slot_ready = |slot: Slot| state.ready_at(slot) <= time + eps;
        let lands_in_time = |delay: f64| time + delay <= self.time_limit + eps;

        match action {
            ActionId::Wait => {
                self.allow_wait
                    && self.kit.vital_enabled()
                    && state.next_proc_at > time + eps
                    && state.next_proc_at + eps < self.time_limit
            }
            ActionId::AutoAttack | ActionId::EFirst | ActionId::ECrit => {
                let (_, windup) = self.attack_timing(state, time);
                state.attack_variant(time) == action
                    && state.next_attack_at <= time + eps
                    && lands_in_time(windup)
            }
            ActionId::Q | ActionId::W => {
                let slot = if action == ActionId::Q { Slot::Q } else { Slot::W };
                slot_ready(slot) && lands_in_time(descriptor.hit_delay(0.0))
            }
            ActionId::EActivate => slot_ready(Slot::E) && !state.empowered_active(time),
            ActionId::RActivate => {
                self.kit.vital_enabled() && slot_ready(Slot::R) && state.ult_procs_remaining == 0
            }
        }
    }

    pub fn legal_actions(&self, state: &SearchState) -> ActionSet {
        let mut legal = ActionSet::EMPTY;
        for action in ActionId::ALL {
            if self.is_legal(state, action) {
                legal.insert(action);
            }
        }
        legal
    }

    fn any_progress_at(&self, state: &SearchState, time: f64) -> bool {
        ActionId::ALL
            .into_iter()
            .filter(|a| *a != ActionId::Wait)
            .any(|a| self.is_legal_at(state, a, time))
    }

    pub fn is_terminal(&self, state: &SearchState) -> bool {
        state.elapsed + self.epsilon >= self.time_limit
            || self.legal_actions(state) == ActionSet::EMPTY
    }

    // === Transitions ===

    pub fn apply(&self, state: &SearchState, action: ActionId) -> Result<Transition, ActionError> {
        let time = state.elapsed;
        if !self.is_legal_at(state, action, time) {
            return Err(ActionError::Illegal { action, time });
        }

        let mut next = *state;
        let mut notes = EventNotes::default();

        if action == ActionId::Wait {
            next.elapsed = self.next_event_after(state, time);
            self.advance_to_decision(&mut next);
            return Ok(Transition {
                state: next,
                damage: 0.0,
                heal: 0.0,
                event: TimelineEvent {
                    time,
                    action,
                    damage: 0.0,
                    damage_type: None,
                    heal: 0.0,
                    cumulative_damage: next.damage,
                    notes,
                },
            });
        }

        // Step 1: Timing, cooldowns and resets
        let descriptor = self.kit.descriptor(action);
        let (interval, windup) = self.attack_timing(state, time);
        let hit_time = time + descriptor.hit_delay(windup);
        next.lock_until = next.lock_until.max(time + descriptor.lock(windup));

        if action.is_ability_cast() {
            if let Some(slot) = Slot::of(action) {
                if let Some(cooldown) = self.kit.cooldown(slot) {
                    next.ready_at[slot.index()] = time + cooldown;
                }
            }
        }

        match action {
            ActionId::AutoAttack => next.next_attack_at = time + interval,
            ActionId::EFirst | ActionId::ECrit => {
                next.next_attack_at = time + interval;
                next.empowered_remaining = next.empowered_remaining.saturating_sub(1);
            }
            ActionId::Q => {
                next.next_attack_at = time + descriptor.lock(windup);
                notes.insert(EventNotes::ATTACK_RESET);
            }
            ActionId::EActivate => {
                next.next_attack_at = time;
                next.empowered_remaining = self.kit.empower_charges();
                next.empowered_until = time + self.kit.empower_duration();
                notes.insert(EventNotes::ATTACK_RESET);
            }
            ActionId::RActivate => {
                next.ult_procs_remaining = self.kit.ult_vital_count();
                next.next_proc_at = time + self.kit.ult_reveal_delay();
                notes.insert(EventNotes::ULT_REVEAL);
            }
            ActionId::W | ActionId::Wait => {}
        }

        // Step 2: Table damage with dynamic amplifiers
        let condition = self.condition(state);
        let entry = self.table.action_entry(action, condition);
        let damage_type = entry.map(|e| e.damage_type);
        let action_damage = entry.map_or(0.0, |e| e.damage)
            * self.dynamic_multiplier(state, |item| item.applies_to(action));
        let mut total = action_damage;
        let mut heal = 0.0;

        if action.deals_damage() {
            // Step 3: Periodic proc
            if next.next_proc_at <= hit_time + self.epsilon {
                if let Some(vital) = self.table.get(DamageSource::Vital, condition) {
                    total += vital.damage * self.dynamic_multiplier(state, ItemEffect::amplifies_proc);
                    heal += vital.heal;
                    notes.insert(EventNotes::VITAL);

                    if next.ult_procs_remaining > 0 {
                        next.ult_procs_remaining -= 1;
                        if next.ult_procs_remaining == 0 {
                            next.next_proc_at = hit_time + self.kit.vital_respawn_delay();
                        }
                    } else {
                        next.next_proc_at = hit_time + self.kit.vital_respawn_delay();
                    }
                }
            }

            // Step 4: Item on-hit procs
            for (item, item_state) in self.items.iter().zip(state.items.iter()) {
                if let Some(payload) =
                    item.proc_payload(action, item_state, hit_time, self.stats, state.target_hp)
                {
                    total += self.table.mitigate_dynamic(&payload, condition);
                    notes.insert(EventNotes::ITEM_PROC);
                }
            }
        }

        // Step 5: Keystone
        if let Some(keystone) = self.keystone {
            let trigger = keystone.on_action(&mut next.keystone, action, time, self.stats.is_melee);
            if trigger.proc {
                if let Some(proc) = self.table.get(DamageSource::KeystoneProc, condition) {
                    total += proc.damage;
                    heal += proc.heal;
                    notes.insert(EventNotes::KEYSTONE_PROC);
                }
            }
            heal += total * trigger.heal_fraction;
        }

        // Step 6: Stack grants and spellblade charges after damage
        for (item, item_state) in self.items.iter().zip(next.items.iter_mut()) {
            if item.on_action(action, item_state, hit_time) {
                notes.insert(EventNotes::STACK_GRANTED);
            }
        }

        // Step 7: Sustain
        if action.is_on_hit() {
            heal += action_damage * self.stats.life_steal;
        }
        heal += total * self.stats.omnivamp;

        next.target_hp = (next.target_hp - total).max(0.0);
        next.damage += total;
        next.healing += heal;
        if total > 0.0 {
            next.last_hit_at = next.last_hit_at.max(hit_time);
        }

        next.elapsed = next.lock_until.max(time);
        self.advance_to_decision(&mut next);

        Ok(Transition {
            state: next,
            damage: total,
            heal,
            event: TimelineEvent {
                time,
                action,
                damage: total,
                damage_type,
                heal,
                cumulative_damage: next.damage,
                notes,
            },
        })
    }

    /// Earliest future event strictly after `time`
    fn next_event_after(&self, state: &SearchState, time: f64) -> f64 {
        let mut events = vec![
            state.lock_until,
            state.next_attack_at,
            state.next_proc_at,
            self.time_limit,
        ];
        if state.empowered_remaining > 0 {
            events.push(state.empowered_until);
        }
        for slot in Slot::ALL {
            if self.kit.cooldown(slot).is_some() {
                events.push(state.ready_at(slot));
            }
        }
        events
            .into_iter()
            .filter(|t| *t > time + self.epsilon)
            .fold(self.time_limit, f64::min)
    }

    /// Move the clock to the earliest time some non-wait action is legal
    fn advance_to_decision(&self, state: &mut SearchState) {
        if state.elapsed + self.epsilon >= self.time_limit {
            state.elapsed = state.elapsed.max(self.time_limit);
            return;
        }
        let mut candidates = [
            state.elapsed,
            state.lock_until,
            state.next_attack_at,
            state.ready_at[0],
            state.ready_at[1],
            state.ready_at[2],
            state.ready_at[3],
            state.empowered_until,
        ];
        candidates.sort_by(|a, b| a.total_cmp(b));

        for candidate in candidates {
            if candidate < state.elapsed || candidate >= self.time_limit {
                continue;
            }
            if self.any_progress_at(state, candidate) {
                state.elapsed = candidate;
                return;
            }
        }
        state.elapsed = self.time_limit;
    }
}
