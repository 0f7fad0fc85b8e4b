//! Defense - Target resistances, penetration and mitigation

mod mitigation;
mod resistance;
mod target;

pub use mitigation::{mitigate, resistance_multiplier, MIN_EFFECTIVE_RESISTANCE};
pub use resistance::{effective_resistance, Penetration, PenetrationProfile};
pub use target::Target;
