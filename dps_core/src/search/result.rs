//! Search results - Timeline events and the final report

use crate::types::{ActionId, DamageType};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Optimizer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Branch-and-bound over every legal sequence
    Exact,
    /// Damage-per-time heuristic
    Greedy,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Exact => write!(f, "exact"),
            Method::Greedy => write!(f, "greedy"),
        }
    }
}

/// Side effects recorded on a timeline event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventNotes(u8);

impl EventNotes {
    pub const VITAL: EventNotes = EventNotes(1);
    pub const KEYSTONE_PROC: EventNotes = EventNotes(1 << 1);
    pub const ITEM_PROC: EventNotes = EventNotes(1 << 2);
    pub const STACK_GRANTED: EventNotes = EventNotes(1 << 3);
    pub const ATTACK_RESET: EventNotes = EventNotes(1 << 4);
    pub const ULT_REVEAL: EventNotes = EventNotes(1 << 5);

    const LABELS: [(EventNotes, &'static str); 6] = [
        (EventNotes::VITAL, "vital"),
        (EventNotes::KEYSTONE_PROC, "keystone-proc"),
        (EventNotes::ITEM_PROC, "item-proc"),
        (EventNotes::STACK_GRANTED, "stack"),
        (EventNotes::ATTACK_RESET, "aa-reset"),
        (EventNotes::ULT_REVEAL, "vitals-revealed"),
    ];

    pub fn insert(&mut self, note: EventNotes) {
        self.0 |= note.0;
    }

    pub fn contains(&self, note: EventNotes) -> bool {
        self.0 & note.0 == note.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        EventNotes::LABELS
            .into_iter()
            .filter(move |(note, _)| self.contains(*note))
            .map(|(_, label)| label)
    }
}

impl Serialize for EventNotes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.labels())
    }
}

/// One chosen action
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineEvent {
    /// Action start time
    pub time: f64,
    pub action: ActionId,
    pub damage: f64,
    pub damage_type: Option<DamageType>,
    pub heal: f64,
    pub cumulative_damage: f64,
    pub notes: EventNotes,
}

/// Best sequence found by the optimizer
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub method: Method,
    /// False when the exact search ran out of node budget
    pub complete: bool,
    pub time_limit: f64,
    pub actions: Vec<ActionId>,
    pub timeline: Vec<TimelineEvent>,
    pub total_damage: f64,
    pub total_healing: f64,
    pub dps: f64,
    pub nodes_explored: usize,
    pub sequence: String,
}

impl SearchResult {
    pub(crate) fn new(
        method: Method,
        complete: bool,
        time_limit: f64,
        timeline: Vec<TimelineEvent>,
        total_damage: f64,
        total_healing: f64,
        nodes_explored: usize,
    ) -> Self {
        let actions: Vec<ActionId> = timeline.iter().map(|e| e.action).collect();
        let sequence = actions
            .iter()
            .map(|a| a.label())
            .collect::<Vec<_>>()
            .join(" > ");
        SearchResult {
            method,
            complete,
            time_limit,
            actions,
            timeline,
            total_damage,
            total_healing,
            dps: total_damage / time_limit,
            nodes_explored,
            sequence,
        }
    }

    /// Times `action` appears in the sequence
    pub fn count(&self, action: ActionId) -> usize {
        self.actions.iter().filter(|a| **a == action).count()
    }

    /// Periodic procs landed
    pub fn vital_procs(&self) -> usize {
        self.timeline
            .iter()
            .filter(|e| e.notes.contains(EventNotes::VITAL))
            .count()
    }
}
