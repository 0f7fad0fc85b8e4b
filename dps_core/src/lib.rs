//! dps_core - Damage mitigation engine and burst/DPS sequence optimizer
//!
//! This library provides:
//! - StatBlock: Level-scaled attacker stats with scoped additive deltas
//! - Mitigation: Ordered resistance penetration and modifier composition
//! - Kit: The timed action catalog of a configured combatant
//! - DamageTable: Per-condition memoized mitigated damage
//! - Search: Branch-and-bound and greedy optimizers over a timed state machine
//! - Combat: Combo replay and single-action damage entry points

pub mod combat;
pub mod config;
pub mod damage;
pub mod defense;
pub mod kit;
pub mod prelude;
pub mod search;
pub mod source;
pub mod stat_block;
pub mod table;
pub mod types;

// Re-export core types for convenience
pub use combat::{calculate_action, calculate_combo, calculate_vital, ComboError, ComboRequest, ComboTrace};
pub use config::{ConfigError, Scenario, SearchConstants};
pub use damage::{calculate_damage, DamageError, DamageModifier, DamagePayload, DamageResult, Payload};
pub use defense::{effective_resistance, mitigate, Penetration, PenetrationProfile, Target};
pub use kit::{AbilityRanks, ActionDescriptor, Kit};
pub use search::{optimize, Method, SearchError, SearchOptions, SearchRequest, SearchResult, TimelineEvent};
pub use source::{ItemEffect, Keystone, MinorRune};
pub use stat_block::{AttackSpeed, DeltaGuard, Stat, StatBlock, StatDelta};
pub use table::{Condition, DamageSource, DamageTable};
pub use types::{ActionId, ActionSet, DamageType};
