//! Search - Best action sequence within a time window
//!
//! Windows up to the exact threshold are solved by branch-and-bound; longer
//! windows fall back to the greedy heuristic. Both walk the same
//! [`Machine`] so their timelines are directly comparable.

mod bound;
mod exact;
mod greedy;
mod machine;
mod result;
mod state;

pub use bound::UpperBound;
pub use machine::{ActionError, Machine, Transition};
pub use result::{EventNotes, Method, SearchResult, TimelineEvent};
pub use state::SearchState;

use crate::config::{ConfigError, SearchConstants};
use crate::damage::{DamageError, DamageModifier};
use crate::defense::Target;
use crate::kit::Kit;
use crate::source::{ItemEffect, Keystone, MAX_ITEMS};
use crate::stat_block::{StatBlock, StatDelta};
use crate::table::DamageTable;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("time limit must be positive and finite, got {0}")]
    InvalidTimeLimit(f64),
    #[error("attack speed must be positive and finite, got {0}")]
    InvalidAttackSpeed(f64),
    #[error("at most {max} items are supported, got {count}")]
    TooManyItems { count: usize, max: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Damage(#[from] DamageError),
}

/// Knobs of one optimizer call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Force a method instead of choosing by window length
    pub method: Option<Method>,
    pub allow_wait: bool,
    pub constants: SearchConstants,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            method: None,
            allow_wait: true,
            constants: SearchConstants::default(),
        }
    }
}

/// Everything one optimizer call needs
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub kit: &'a Kit,
    pub stats: &'a StatBlock,
    pub target: &'a Target,
    pub time_limit: f64,
    /// The ultimate is already active at the start
    pub ult_active: bool,
    /// Extra bonus attack speed for this call only
    pub bonus_attack_speed: f64,
    pub keystone: Option<Keystone>,
    pub items: &'a [ItemEffect],
    pub static_modifiers: &'a [DamageModifier],
    pub options: SearchOptions,
}

impl<'a> SearchRequest<'a> {
    pub fn new(kit: &'a Kit, stats: &'a StatBlock, target: &'a Target, time_limit: f64) -> Self {
        SearchRequest {
            kit,
            stats,
            target,
            time_limit,
            ult_active: false,
            bonus_attack_speed: 0.0,
            keystone: None,
            items: &[],
            static_modifiers: &[],
            options: SearchOptions::default(),
        }
    }

    pub fn with_keystone(mut self, keystone: Option<Keystone>) -> Self {
        self.keystone = keystone;
        self
    }

    pub fn with_items(mut self, items: &'a [ItemEffect]) -> Self {
        self.items = items;
        self
    }

    pub fn with_modifiers(mut self, modifiers: &'a [DamageModifier]) -> Self {
        self.static_modifiers = modifiers;
        self
    }

    pub fn with_ult_active(mut self, ult_active: bool) -> Self {
        self.ult_active = ult_active;
        self
    }

    pub fn with_bonus_attack_speed(mut self, bonus: f64) -> Self {
        self.bonus_attack_speed = bonus;
        self
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.options.method = Some(method);
        self
    }

    pub fn with_wait(mut self, allow_wait: bool) -> Self {
        self.options.allow_wait = allow_wait;
        self
    }
}

/// Find the highest-damage action sequence for `request`
pub fn optimize(request: &SearchRequest<'_>) -> Result<SearchResult, SearchError> {
    let time_limit = request.time_limit;
    let constants = request.options.constants;

    // Step 1: Validate inputs
    if !time_limit.is_finite() || time_limit <= 0.0 {
        return Err(SearchError::InvalidTimeLimit(time_limit));
    }
    if !request.bonus_attack_speed.is_finite() {
        return Err(SearchError::InvalidAttackSpeed(request.bonus_attack_speed));
    }
    if request.items.len() > MAX_ITEMS {
        return Err(SearchError::TooManyItems {
            count: request.items.len(),
            max: MAX_ITEMS,
        });
    }
    request.target.validate()?;
    request.kit.validate_level(request.stats.level)?;

    // Step 2: Per-call stats
    let mut stats = request.stats.clone();
    stats.apply(&StatDelta::attack_speed(request.bonus_attack_speed));
    let attacks_per_second = stats.attacks_per_second(0.0);
    if !attacks_per_second.is_finite() || attacks_per_second <= 0.0 {
        return Err(SearchError::InvalidAttackSpeed(attacks_per_second));
    }

    // Step 3: Damage table
    let table = DamageTable::build(
        request.kit,
        &mut stats,
        request.target,
        request.keystone,
        request.static_modifiers,
    )?;

    // Step 4: Method
    let method = request.options.method.unwrap_or(if time_limit <= constants.exact_threshold {
        Method::Exact
    } else {
        Method::Greedy
    });
    info!(%method, time_limit, keystone = ?request.keystone, items = request.items.len(), "optimizing sequence");

    // Step 5: Search
    let machine = Machine::new(
        request.kit,
        &stats,
        &table,
        request.keystone,
        request.items,
        time_limit,
    )
    .with_wait(request.options.allow_wait)
    .with_epsilon(constants.epsilon);
    let root = machine.root(request.target, request.ult_active);

    let outcome = match method {
        Method::Exact => exact::search(&machine, root, constants.max_nodes),
        Method::Greedy => greedy::search(&machine, root, constants.max_nodes),
    };

    // Step 6: Passive regeneration over the whole window
    let healing = outcome.state.healing + stats.health_regen * time_limit;

    Ok(SearchResult::new(
        method,
        outcome.complete,
        time_limit,
        outcome.timeline,
        outcome.state.damage,
        healing,
        outcome.nodes,
    ))
}
