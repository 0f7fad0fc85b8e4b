//! ComboTrace - Per-step breakdown of a replayed combo

use crate::damage::DamageResult;
use crate::table::Condition;
use crate::types::DamageType;
use serde::Serialize;

/// Outcome of one combo step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// Step id as written by the caller
    pub step: String,
    pub available: bool,
    /// Why an unavailable step dealt nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub condition: Condition,
    /// Damage of the step itself
    pub damage: f64,
    pub damage_type: Option<DamageType>,
    /// Item and keystone procs riding on the step
    pub proc_damage: f64,
    pub heal: f64,
    pub cumulative_damage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<DamageResult>,
}

impl StepResult {
    pub(crate) fn unavailable(step: &str, reason: &'static str, condition: Condition, cumulative: f64) -> Self {
        StepResult {
            step: step.to_string(),
            available: false,
            reason: Some(reason),
            condition,
            damage: 0.0,
            damage_type: None,
            proc_damage: 0.0,
            heal: 0.0,
            cumulative_damage: cumulative,
            breakdown: None,
        }
    }

    pub fn total(&self) -> f64 {
        self.damage + self.proc_damage
    }
}

/// Totals of a replayed combo
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComboTrace {
    pub steps: Vec<StepResult>,
    pub total_damage: f64,
    pub total_healing: f64,
    pub target_hp_remaining: f64,
}

impl ComboTrace {
    /// Steps that could not be performed
    pub fn unavailable_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| !s.available)
    }
}
