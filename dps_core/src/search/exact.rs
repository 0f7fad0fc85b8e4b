//! Exact search - Depth-first branch-and-bound over the state machine
//!
//! Branch states live on an explicit stack; timelines are rebuilt from an
//! arena of parent links so no branch ever copies its history.

use super::bound::UpperBound;
use super::machine::{Machine, Transition};
use super::result::TimelineEvent;
use super::state::SearchState;
use tracing::{debug, warn};

/// Best branch found plus search statistics
#[derive(Debug, Clone)]
pub struct Outcome {
    pub state: SearchState,
    pub timeline: Vec<TimelineEvent>,
    pub nodes: usize,
    pub complete: bool,
}

struct ArenaNode {
    parent: Option<usize>,
    event: TimelineEvent,
}

struct Frame {
    state: SearchState,
    node: Option<usize>,
}

/// More damage wins; equal damage prefers the earlier final hit
fn is_better(candidate: &SearchState, best: &SearchState, epsilon: f64) -> bool {
    if candidate.damage > best.damage + epsilon {
        return true;
    }
    (candidate.damage - best.damage).abs() <= epsilon && candidate.last_hit_at + epsilon < best.last_hit_at
}

pub fn search(machine: &Machine<'_>, root: SearchState, max_nodes: usize) -> Outcome {
    let epsilon = machine.epsilon();
    let bound = UpperBound::new(machine);

    let mut arena: Vec<ArenaNode> = Vec::new();
    let mut stack = vec![Frame {
        state: root,
        node: None,
    }];
    let mut best = root;
    let mut best_node: Option<usize> = None;
    let mut nodes = 0usize;
    let mut pruned = 0usize;
    let mut complete = true;

    while let Some(frame) = stack.pop() {
        if nodes >= max_nodes {
            complete = false;
            warn!(
                max_nodes,
                best_damage = best.damage,
                "exact search node budget exhausted; result may be suboptimal"
            );
            break;
        }
        nodes += 1;

        if is_better(&frame.state, &best, epsilon) {
            best = frame.state;
            best_node = frame.node;
        }
        if machine.is_terminal(&frame.state) {
            continue;
        }
        // Keep subtrees that could still tie the best and finish earlier
        let ceiling = frame.state.damage + bound.estimate(&frame.state);
        let cannot_win = ceiling + epsilon < best.damage;
        let cannot_tie_earlier = ceiling <= best.damage + epsilon
            && frame.state.elapsed + epsilon >= best.last_hit_at;
        if cannot_win || cannot_tie_earlier {
            pruned += 1;
            continue;
        }

        // Most valuable first, then by priority
        let mut children: Vec<(Transition, u8)> = machine
            .legal_actions(&frame.state)
            .iter()
            .filter_map(|action| {
                let priority = machine.kit().descriptor(action).priority;
                machine
                    .apply(&frame.state, action)
                    .ok()
                    .map(|transition| (transition, priority))
            })
            .collect();
        children.sort_by(|(a, pa), (b, pb)| b.damage.total_cmp(&a.damage).then(pa.cmp(pb)));

        for (transition, _) in children.into_iter().rev() {
            arena.push(ArenaNode {
                parent: frame.node,
                event: transition.event,
            });
            stack.push(Frame {
                state: transition.state,
                node: Some(arena.len() - 1),
            });
        }
    }

    let mut timeline = Vec::new();
    let mut cursor = best_node;
    while let Some(index) = cursor {
        timeline.push(arena[index].event);
        cursor = arena[index].parent;
    }
    timeline.reverse();

    debug!(
        nodes,
        pruned,
        arena = arena.len(),
        complete,
        damage = best.damage,
        "exact search finished"
    );

    Outcome {
        state: best,
        timeline,
        nodes,
        complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defense::Target;
    use crate::kit::{AbilityRanks, Kit};
    use crate::table::DamageTable;
    use crate::types::ActionId;

    #[test]
    fn test_exact_prefers_q_reset() {
        let kit = Kit::duelist(AbilityRanks::new(1, 0, 0, 0)).unwrap();
        let mut stats = kit.stats_at(3);
        let target = Target::new(2000.0, 60.0, 40.0).unwrap();
        let table = DamageTable::build(&kit, &mut stats, &target, None, &[]).unwrap();
        let machine = Machine::new(&kit, &stats, &table, None, &[], 2.0);

        let outcome = search(&machine, machine.root(&target, false), 100_000);
        assert!(outcome.complete);
        assert!(outcome.timeline.iter().any(|e| e.action == ActionId::Q));
        let total: f64 = outcome.timeline.iter().map(|e| e.damage).sum();
        assert!((total - outcome.state.damage).abs() < 1e-6);
    }

    #[test]
    fn test_budget_exhaustion_flags_incomplete() {
        let kit = Kit::duelist(AbilityRanks::new(1, 1, 1, 0)).unwrap();
        let mut stats = kit.stats_at(3);
        let target = Target::new(2000.0, 60.0, 40.0).unwrap();
        let table = DamageTable::build(&kit, &mut stats, &target, None, &[]).unwrap();
        let machine = Machine::new(&kit, &stats, &table, None, &[], 8.0);

        let outcome = search(&machine, machine.root(&target, false), 5);
        assert!(!outcome.complete);
        assert_eq!(outcome.nodes, 5);
    }

    /// Best (damage, last hit) over every reachable state, no pruning
    fn exhaustive(machine: &Machine<'_>, state: &SearchState, best: &mut (f64, f64)) {
        let eps = machine.epsilon();
        if state.damage > best.0 + eps
            || ((state.damage - best.0).abs() <= eps && state.last_hit_at < best.1)
        {
            *best = (state.damage, state.last_hit_at);
        }
        if machine.is_terminal(state) {
            return;
        }
        for action in machine.legal_actions(state).iter() {
            if let Ok(transition) = machine.apply(state, action) {
                exhaustive(machine, &transition.state, best);
            }
        }
    }

    #[test]
    fn test_matches_exhaustive_damage_and_finish() {
        let kit = Kit::duelist(AbilityRanks::new(1, 0, 1, 0)).unwrap();
        let mut stats = kit.stats_at(3);
        let target = Target::new(2000.0, 60.0, 40.0).unwrap();
        let table = DamageTable::build(&kit, &mut stats, &target, None, &[]).unwrap();

        for limit in [1.5, 2.5] {
            let machine = Machine::new(&kit, &stats, &table, None, &[], limit);
            let root = machine.root(&target, false);
            let mut expected = (root.damage, root.last_hit_at);
            exhaustive(&machine, &root, &mut expected);

            let outcome = search(&machine, root, 1_000_000);
            assert!(outcome.complete);
            assert!((outcome.state.damage - expected.0).abs() < 1e-6);
            assert!(outcome.state.last_hit_at <= expected.1 + 1e-6);
        }
    }

    #[test]
    fn test_equal_damage_prefers_earlier_finish() {
        let mut early = SearchState {
            elapsed: 1.0,
            lock_until: 0.0,
            next_attack_at: 0.0,
            ready_at: [0.0; 4],
            empowered_remaining: 0,
            empowered_until: 0.0,
            next_proc_at: f64::INFINITY,
            ult_procs_remaining: 0,
            keystone: Default::default(),
            items: Default::default(),
            target_hp: 100.0,
            damage: 50.0,
            healing: 0.0,
            last_hit_at: 0.5,
        };
        let mut late = early;
        late.last_hit_at = 0.9;
        assert!(is_better(&early, &late, 1e-9));
        assert!(!is_better(&late, &early, 1e-9));
        early.damage = 40.0;
        assert!(is_better(&late, &early, 1e-9));
    }
}
