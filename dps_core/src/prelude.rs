//! Prelude module for convenient imports
//!
//! ```rust
//! use dps_core::prelude::*;
//! ```

// Core types
pub use crate::stat_block::{AttackSpeed, Stat, StatBlock, StatDelta};
pub use crate::types::{ActionId, ActionSet, DamageType};

// Damage system
pub use crate::damage::{calculate_damage, DamageModifier, DamagePayload, DamageResult, Payload};
pub use crate::defense::{PenetrationProfile, Target};

// Kit and procs
pub use crate::kit::{AbilityRanks, Kit};
pub use crate::source::{ItemEffect, Keystone, MinorRune};

// Entry points
pub use crate::combat::{calculate_action, calculate_combo, ComboRequest};
pub use crate::search::{optimize, Method, SearchOptions, SearchRequest, SearchResult};

// Config
pub use crate::config::{Scenario, SearchConstants};
