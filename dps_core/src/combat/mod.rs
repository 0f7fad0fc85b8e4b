//! Combat - Replaying fixed combos and pricing single actions

mod combo;
mod result;
mod single;

pub use combo::{calculate_combo, ComboError, ComboRequest, ComboStep};
pub use result::{ComboTrace, StepResult};
pub use single::{calculate_action, calculate_vital};
