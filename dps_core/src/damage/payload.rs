//! DamagePayload - Raw damage before mitigation

use crate::types::DamageType;
use serde::{Deserialize, Serialize};

/// Raw damage of one hit, plus any healing the hit grants its owner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamagePayload {
    pub raw_damage: f64,
    pub damage_type: DamageType,
    /// Flat healing granted on hit (not modified by damage amplifiers)
    #[serde(default)]
    pub heal: f64,
}

impl DamagePayload {
    pub fn new(raw_damage: f64, damage_type: DamageType) -> Self {
        DamagePayload {
            raw_damage,
            damage_type,
            heal: 0.0,
        }
    }

    pub fn with_heal(mut self, heal: f64) -> Self {
        self.heal = heal;
        self
    }

    /// Payload of an action that deals no damage
    pub fn none() -> Self {
        DamagePayload::new(0.0, DamageType::True)
    }
}

/// What an action produces at the current ranks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    Damage(DamagePayload),
    /// The action cannot be used (rank zero)
    Unavailable { reason: &'static str },
}

impl Payload {
    pub fn damage(&self) -> Option<&DamagePayload> {
        match self {
            Payload::Damage(payload) => Some(payload),
            Payload::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Payload::Damage(_))
    }
}
