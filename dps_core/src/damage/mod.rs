//! Damage system - Payloads, modifiers and the mitigation pipeline

mod calculation;
mod modifier;
mod payload;

pub use calculation::{calculate_damage, mitigate_payload, DamageResult};
pub use modifier::{apply_modifiers, total_multiplier, DamageModifier};
pub use payload::{DamagePayload, Payload};

use thiserror::Error;

/// Errors produced while computing a single hit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DamageError {
    #[error("unavailable: {reason}")]
    Unavailable { reason: &'static str },

    #[error("effective resistance {value} is at or below -100")]
    ResistanceOutOfRange { value: f64 },
}
