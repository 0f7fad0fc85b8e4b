//! ActionDescriptor - Timing and flags of one schedulable action

use crate::types::ActionId;
use serde::{Deserialize, Serialize};

/// When an action locks the caster and when its hit lands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Timing {
    /// Basic attack slot: lands and unlocks after the windup, next attack after the interval
    Attack,
    /// Fixed cast: locked for `lock` seconds, lands `hit_delay` after the cast starts
    Fixed { lock: f64, hit_delay: f64 },
    /// Takes no time
    Instant,
}

/// Immutable description of an action at the kit's current ranks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub id: ActionId,
    pub timing: Timing,
    /// `None` when the action's ability is unlearned; `Some(0.0)` when it has no cooldown of its own
    pub cooldown: Option<f64>,
    /// Lower values are explored first among equally valuable actions
    pub priority: u8,
    pub resets_attack: bool,
}

impl ActionDescriptor {
    pub fn is_learned(&self) -> bool {
        self.cooldown.is_some()
    }

    pub fn on_hit(&self) -> bool {
        self.id.is_on_hit()
    }

    pub fn ability_cast(&self) -> bool {
        self.id.is_ability_cast()
    }

    pub fn ability_damage(&self) -> bool {
        self.id.is_ability_damage()
    }

    /// Seconds the caster is locked, given the current windup
    pub fn lock(&self, windup: f64) -> f64 {
        match self.timing {
            Timing::Attack => windup,
            Timing::Fixed { lock, .. } => lock,
            Timing::Instant => 0.0,
        }
    }

    /// Seconds from start to hit, given the current windup
    pub fn hit_delay(&self, windup: f64) -> f64 {
        match self.timing {
            Timing::Attack => windup,
            Timing::Fixed { hit_delay, .. } => hit_delay,
            Timing::Instant => 0.0,
        }
    }
}
