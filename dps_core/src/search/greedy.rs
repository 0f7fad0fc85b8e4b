//! Greedy search - Damage-per-time heuristic for long windows

use super::exact::Outcome;
use super::machine::{Machine, Transition};
use super::state::SearchState;
use crate::table::DamageSource;
use crate::types::ActionId;
use tracing::debug;

/// Damage per second an action is worth at `state`
///
/// Enablers are scored by the damage they unlock over the time that damage
/// takes to arrive.
fn score(machine: &Machine<'_>, state: &SearchState, action: ActionId, transition: &Transition) -> f64 {
    let kit = machine.kit();
    let table = machine.table();
    let condition = machine.condition(state);
    let time = state.elapsed;
    let (interval, _) = machine.attack_timing(state, time);
    let floor = machine.epsilon().max(1e-3);

    match action {
        ActionId::AutoAttack | ActionId::EFirst | ActionId::ECrit => {
            transition.damage / interval.max(floor)
        }
        ActionId::Q | ActionId::W => {
            let lock = kit.descriptor(action).lock(0.0);
            transition.damage / lock.max(floor)
        }
        ActionId::EActivate => {
            let (empowered_interval, _) = machine.attack_timing(&transition.state, time);
            let unlocked = table.damage(DamageSource::AutoAttack, condition)
                + table.damage(DamageSource::ECrit, condition);
            unlocked / (2.0 * empowered_interval).max(floor)
        }
        ActionId::RActivate => {
            let count = kit.ult_vital_count() as f64;
            let unlocked = count * table.damage(DamageSource::Vital, condition);
            unlocked / (kit.ult_reveal_delay() + count * interval).max(floor)
        }
        ActionId::Wait => {
            let wait = (transition.state.elapsed - time).max(floor);
            let heal = table
                .get(DamageSource::Vital, condition)
                .map_or(0.0, |entry| entry.heal);
            let proc = table.damage(DamageSource::Vital, condition)
                * machine.dynamic_multiplier(state, |item| item.amplifies_proc())
                + heal;
            let idle_cost = wait * table.damage(DamageSource::AutoAttack, condition) / interval;
            (proc - idle_cost) / wait
        }
    }
}

pub fn search(machine: &Machine<'_>, root: SearchState, max_steps: usize) -> Outcome {
    let mut state = root;
    let mut timeline = Vec::new();
    let mut nodes = 0usize;
    let mut complete = true;

    while !machine.is_terminal(&state) {
        if nodes >= max_steps {
            complete = false;
            break;
        }

        let mut best: Option<(f64, u8, Transition)> = None;
        let mut wait: Option<(f64, Transition)> = None;

        for action in machine.legal_actions(&state).iter() {
            let Ok(transition) = machine.apply(&state, action) else {
                continue;
            };
            nodes += 1;
            let value = score(machine, &state, action, &transition);
            if action == ActionId::Wait {
                wait = Some((value, transition));
                continue;
            }
            let priority = machine.kit().descriptor(action).priority;
            let better = match &best {
                None => true,
                Some((best_value, best_priority, _)) => {
                    value > *best_value + machine.epsilon()
                        || ((value - best_value).abs() <= machine.epsilon() && priority < *best_priority)
                }
            };
            if better {
                best = Some((value, priority, transition));
            }
        }

        // WAIT only when strictly better than every alternative
        let chosen = match (best, wait) {
            (Some((value, _, transition)), Some((wait_value, wait_transition))) => {
                if wait_value > value + machine.epsilon() {
                    wait_transition
                } else {
                    transition
                }
            }
            (Some((_, _, transition)), None) => transition,
            (None, Some((_, wait_transition))) => wait_transition,
            (None, None) => break,
        };

        timeline.push(chosen.event);
        state = chosen.state;
    }

    debug!(
        steps = timeline.len(),
        nodes,
        damage = state.damage,
        "greedy search finished"
    );

    Outcome {
        state,
        timeline,
        nodes,
        complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_kit;
    use crate::defense::Target;
    use crate::kit::{AbilityRanks, Kit};
    use crate::table::DamageTable;

    /// Attacks every 1.0s, landing 0.1s after the start
    fn metronome_kit() -> Kit {
        let mut config = default_kit().unwrap();
        config.attack_speed.base = 1.0;
        config.attack_speed.ratio = 1.0;
        config.attack_speed.growth = 0.0;
        config.attack_speed.cap = 2.5;
        config.attack_speed.windup_fraction = 0.1;
        Kit::new(config, AbilityRanks::default()).unwrap()
    }

    fn second_action(max_hp: f64) -> ActionId {
        let kit = metronome_kit();
        let mut stats = kit.stats_at(1);
        let target = Target::new(max_hp, 50.0, 50.0).unwrap();
        let table = DamageTable::build(&kit, &mut stats, &target, None, &[]).unwrap();
        let machine = Machine::new(&kit, &stats, &table, None, &[], 3.0);

        let outcome = search(&machine, machine.root(&target, false), 1_000);
        outcome.timeline[1].action
    }

    #[test]
    fn test_greedy_wait_counts_proc_heal() {
        // At t=1.0 waiting 1.35s for the proc beats one attack only when
        // proc damage plus its 35 heal exceeds 2.7 attacks (~118.8)
        assert_eq!(second_action(3300.0), ActionId::Wait);
        assert_eq!(second_action(2000.0), ActionId::AutoAttack);
    }

    #[test]
    fn test_greedy_uses_empower() {
        let kit = Kit::duelist(AbilityRanks::new(1, 1, 1, 0)).unwrap();
        let mut stats = kit.stats_at(5);
        let target = Target::new(2500.0, 60.0, 40.0).unwrap();
        let table = DamageTable::build(&kit, &mut stats, &target, None, &[]).unwrap();
        let machine = Machine::new(&kit, &stats, &table, None, &[], 20.0);

        let outcome = search(&machine, machine.root(&target, false), 10_000);
        assert!(outcome.complete);
        assert!(outcome.timeline.iter().any(|e| e.action == ActionId::EActivate));
        assert!(outcome.timeline.iter().any(|e| e.action == ActionId::ECrit));
        // Events are in time order
        assert!(outcome
            .timeline
            .windows(2)
            .all(|pair| pair[0].time <= pair[1].time + 1e-9));
    }

    #[test]
    fn test_greedy_respects_step_cap() {
        let kit = Kit::duelist(AbilityRanks::default()).unwrap();
        let mut stats = kit.stats_at(1);
        let target = Target::new(2500.0, 60.0, 40.0).unwrap();
        let table = DamageTable::build(&kit, &mut stats, &target, None, &[]).unwrap();
        let machine = Machine::new(&kit, &stats, &table, None, &[], 60.0);

        let outcome = search(&machine, machine.root(&target, false), 3);
        assert!(!outcome.complete);
    }
}
