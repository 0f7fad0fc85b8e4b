//! Combo replay - Price an ordered list of steps without timing legality
//!
//! Steps run on a nominal clock that advances by each step's lock, so
//! time-windowed sources (spellblade charges, attack speed bursts) behave
//! plausibly. Cooldowns are not enforced.

use super::result::{ComboTrace, StepResult};
use crate::damage::{calculate_damage, DamageError, DamageModifier, Payload};
use crate::defense::Target;
use crate::kit::Kit;
use crate::source::{ItemEffect, ItemState, Keystone, KeystoneState};
use crate::stat_block::StatBlock;
use crate::table::Condition;
use crate::types::ActionId;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComboError {
    #[error("invalid combo step '{0}'")]
    InvalidStep(String),
    #[error(transparent)]
    Damage(#[from] DamageError),
}

/// One parsed combo step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboStep {
    Action(ActionId),
    /// The periodic proc on its own
    Vital,
}

impl FromStr for ComboStep {
    type Err = ComboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let step = match upper.as_str() {
            "E" => ComboStep::Action(ActionId::ECrit),
            "R" => ComboStep::Action(ActionId::RActivate),
            "PASSIVE" | "VITAL" => ComboStep::Vital,
            "WAIT" => return Err(ComboError::InvalidStep(s.to_string())),
            _ => ComboStep::Action(
                ActionId::from_str(&upper).map_err(|_| ComboError::InvalidStep(s.to_string()))?,
            ),
        };
        Ok(step)
    }
}

/// Inputs of a combo replay
#[derive(Debug, Clone)]
pub struct ComboRequest<'a> {
    pub kit: &'a Kit,
    pub stats: &'a StatBlock,
    pub target: &'a Target,
    pub keystone: Option<Keystone>,
    pub static_modifiers: &'a [DamageModifier],
    pub items: &'a [ItemEffect],
}

impl<'a> ComboRequest<'a> {
    pub fn new(kit: &'a Kit, stats: &'a StatBlock, target: &'a Target) -> Self {
        ComboRequest {
            kit,
            stats,
            target,
            keystone: None,
            static_modifiers: &[],
            items: &[],
        }
    }

    pub fn with_keystone(mut self, keystone: Option<Keystone>) -> Self {
        self.keystone = keystone;
        self
    }

    pub fn with_modifiers(mut self, modifiers: &'a [DamageModifier]) -> Self {
        self.static_modifiers = modifiers;
        self
    }

    pub fn with_items(mut self, items: &'a [ItemEffect]) -> Self {
        self.items = items;
        self
    }
}

/// Replay `steps` in order and report per-step damage
pub fn calculate_combo(request: &ComboRequest<'_>, steps: &[&str]) -> Result<ComboTrace, ComboError> {
    let parsed = steps
        .iter()
        .map(|s| s.parse::<ComboStep>())
        .collect::<Result<Vec<_>, _>>()?;

    let kit = request.kit;
    let mut stats = request.stats.clone();
    let mut target = *request.target;
    let mut keystone_state = KeystoneState::default();
    let mut item_states: Vec<ItemState> = request.items.iter().map(ItemEffect::initial_state).collect();
    let mut trace = ComboTrace {
        target_hp_remaining: target.current_hp,
        ..ComboTrace::default()
    };
    let mut time = 0.0;

    for (raw, step) in steps.iter().zip(parsed) {
        let condition = request
            .keystone
            .map_or(Condition::Base, |k| k.condition(&keystone_state));
        let delta = match request.keystone {
            Some(keystone) => keystone.condition_delta(condition, stats.level),
            None => Default::default(),
        };
        let guard = stats.scoped(delta);

        // Step 1: Modifiers in effect for this step
        let mut modifiers = request.static_modifiers.to_vec();
        if let Some(keystone) = request.keystone {
            let amp = keystone.condition_amp(condition);
            if amp > 0.0 {
                modifiers.push(DamageModifier::new(keystone.name(), amp));
            }
        }
        let proc_modifiers = modifiers.clone();
        for (item, state) in request.items.iter().zip(&item_states) {
            let applies = match step {
                ComboStep::Action(action) => item.applies_to(action),
                ComboStep::Vital => item.amplifies_proc(),
            };
            if applies {
                modifiers.push(DamageModifier::new(item.name(), item.current_amp(state)));
            }
        }

        // Step 2: The step's own hit
        let (action, payload) = match step {
            ComboStep::Action(action) => (Some(action), kit.payload(action, &guard)),
            ComboStep::Vital => (None, kit.vital_payload(&guard, &target)),
        };
        if let Payload::Unavailable { reason } = payload {
            trace
                .steps
                .push(StepResult::unavailable(raw, reason, condition, trace.total_damage));
            continue;
        }
        let result = calculate_damage(&payload, &target, &guard, &modifiers)?;
        let mut heal = result.heal;
        let mut proc_damage = 0.0;

        // Step 3: Item procs riding on the hit
        if let Some(action) = action {
            for (item, state) in request.items.iter().zip(&item_states) {
                if let Some(payload) = item.proc_payload(action, state, time, &guard, target.current_hp) {
                    proc_damage +=
                        calculate_damage(&Payload::Damage(payload), &target, &guard, &proc_modifiers)?
                            .damage;
                }
            }
        }

        // Step 4: Keystone
        if let (Some(keystone), Some(action)) = (request.keystone, action) {
            let trigger = keystone.on_action(&mut keystone_state, action, time, guard.is_melee);
            if trigger.proc {
                if let Some(payload) = keystone.proc_payload(&guard) {
                    let proc =
                        calculate_damage(&Payload::Damage(payload), &target, &guard, &proc_modifiers)?;
                    proc_damage += proc.damage;
                    heal += proc.heal;
                }
            }
            heal += (result.damage + proc_damage) * trigger.heal_fraction;
        }

        // Step 5: Stack grants after the damage
        if let Some(action) = action {
            for (item, state) in request.items.iter().zip(item_states.iter_mut()) {
                item.on_action(action, state, time);
            }
        }

        // Step 6: Sustain and bookkeeping
        let total = result.damage + proc_damage;
        if action.is_some_and(ActionId::is_on_hit) {
            heal += result.damage * guard.life_steal;
        }
        heal += total * guard.omnivamp;

        let (_, windup) = guard.attack_timing(0.0, false);
        if let Some(action) = action {
            time += kit.descriptor(action).lock(windup);
        }
        drop(guard);

        target.current_hp = (target.current_hp - total).max(0.0);
        trace.total_damage += total;
        trace.total_healing += heal;
        trace.steps.push(StepResult {
            step: raw.to_string(),
            available: true,
            reason: None,
            condition,
            damage: result.damage,
            damage_type: Some(result.damage_type),
            proc_damage,
            heal,
            cumulative_damage: trace.total_damage,
            breakdown: Some(result),
        });
    }

    trace.target_hp_remaining = target.current_hp;
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::AbilityRanks;

    fn setup(ranks: AbilityRanks) -> (Kit, StatBlock, Target) {
        let kit = Kit::duelist(ranks).unwrap();
        let stats = kit.stats_at(6);
        let target = Target::new(2500.0, 60.0, 40.0).unwrap();
        (kit, stats, target)
    }

    #[test]
    fn test_step_parsing() {
        assert_eq!("aa".parse::<ComboStep>().unwrap(), ComboStep::Action(ActionId::AutoAttack));
        assert_eq!("e".parse::<ComboStep>().unwrap(), ComboStep::Action(ActionId::ECrit));
        assert_eq!("E_first".parse::<ComboStep>().unwrap(), ComboStep::Action(ActionId::EFirst));
        assert_eq!("R".parse::<ComboStep>().unwrap(), ComboStep::Action(ActionId::RActivate));
        assert_eq!("Passive".parse::<ComboStep>().unwrap(), ComboStep::Vital);
        assert!(matches!("X".parse::<ComboStep>(), Err(ComboError::InvalidStep(_))));
        assert!(matches!("WAIT".parse::<ComboStep>(), Err(ComboError::InvalidStep(_))));
    }

    #[test]
    fn test_invalid_step_rejects_combo() {
        let (kit, stats, target) = setup(AbilityRanks::new(1, 1, 1, 1));
        let request = ComboRequest::new(&kit, &stats, &target);
        assert!(matches!(
            calculate_combo(&request, &["AA", "Q", "bogus"]),
            Err(ComboError::InvalidStep(step)) if step == "bogus"
        ));
    }

    #[test]
    fn test_unlearned_step_continues() {
        let (kit, stats, target) = setup(AbilityRanks::new(1, 0, 0, 0));
        let request = ComboRequest::new(&kit, &stats, &target);
        let trace = calculate_combo(&request, &["Q", "W", "AA"]).unwrap();

        assert_eq!(trace.steps.len(), 3);
        assert!(!trace.steps[1].available);
        assert!(trace.steps[2].available);
        assert_eq!(trace.unavailable_steps().count(), 1);
        let sum: f64 = trace.steps.iter().map(StepResult::total).sum();
        assert!((sum - trace.total_damage).abs() < 1e-9);
    }

    #[test]
    fn test_stack_cap_and_grant_order() {
        let (kit, stats, target) = setup(AbilityRanks::new(1, 0, 0, 0));
        let items = [ItemEffect::spear_of_shojin()];
        let request = ComboRequest::new(&kit, &stats, &target).with_items(&items);
        let trace = calculate_combo(&request, &["Q"; 6]).unwrap();

        let first = trace.steps[0].damage;
        // The 4th Q sees the 3 stacks granted before it, not its own
        assert!((trace.steps[3].damage - first * 1.09).abs() < 1e-9);
        // Stacks cap at 4
        assert!((trace.steps[4].damage - first * 1.12).abs() < 1e-9);
        assert!((trace.steps[5].damage - first * 1.12).abs() < 1e-9);
    }

    #[test]
    fn test_press_the_attack_exposes() {
        let (kit, stats, target) = setup(AbilityRanks::default());
        let request =
            ComboRequest::new(&kit, &stats, &target).with_keystone(Some(Keystone::PressTheAttack));
        let trace = calculate_combo(&request, &["AA", "AA", "AA", "AA"]).unwrap();

        assert!(trace.steps[2].proc_damage > 0.0);
        assert_eq!(trace.steps[3].condition, Condition::Exposed);
        assert!((trace.steps[3].damage - trace.steps[0].damage * 1.08).abs() < 1e-9);
    }

    #[test]
    fn test_conqueror_full_stacks() {
        let (kit, stats, target) = setup(AbilityRanks::new(1, 0, 0, 0));
        let request =
            ComboRequest::new(&kit, &stats, &target).with_keystone(Some(Keystone::Conqueror));
        let trace = calculate_combo(&request, &["Q"; 8]).unwrap();

        assert_eq!(trace.steps[7].condition, Condition::FullyStacked);
        assert!(trace.steps[7].damage > trace.steps[0].damage);
        assert!(trace.steps[7].heal > 0.0);
    }
}
