//! SearchState - One branch of the timed state machine

use crate::kit::Slot;
use crate::source::{ItemState, KeystoneState, MAX_ITEMS};
use crate::types::ActionId;

/// Complete per-branch state; every expansion produces an owned copy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    // === Clock ===
    pub elapsed: f64,
    pub lock_until: f64,
    pub next_attack_at: f64,
    /// Cooldown ready time per ability slot
    pub ready_at: [f64; 4],

    // === Empowered attacks ===
    pub empowered_remaining: u8,
    pub empowered_until: f64,

    // === Periodic proc ===
    /// Earliest hit time that procs (infinite when disabled)
    pub next_proc_at: f64,
    pub ult_procs_remaining: u8,

    // === Sources ===
    pub keystone: KeystoneState,
    pub items: [ItemState; MAX_ITEMS],

    // === Totals ===
    pub target_hp: f64,
    pub damage: f64,
    pub healing: f64,
    /// Time the latest damage landed
    pub last_hit_at: f64,
}

impl SearchState {
    pub fn ready_at(&self, slot: Slot) -> f64 {
        self.ready_at[slot.index()]
    }

    pub fn empowered_active(&self, time: f64) -> bool {
        self.empowered_remaining > 0 && self.empowered_until > time
    }

    /// Which action occupies the attack slot at `time`
    pub fn attack_variant(&self, time: f64) -> ActionId {
        if !self.empowered_active(time) {
            ActionId::AutoAttack
        } else if self.empowered_remaining > 1 {
            ActionId::EFirst
        } else {
            ActionId::ECrit
        }
    }
}
