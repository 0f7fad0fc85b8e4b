//! Search constants configuration

use serde::{Deserialize, Serialize};

/// Tunable optimizer constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConstants {
    /// Windows up to this many seconds use the exact search
    #[serde(default = "default_exact_threshold")]
    pub exact_threshold: f64,
    /// Node budget of the exact search
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// Tolerance for damage and time comparisons
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl Default for SearchConstants {
    fn default() -> Self {
        SearchConstants {
            exact_threshold: default_exact_threshold(),
            max_nodes: default_max_nodes(),
            epsilon: default_epsilon(),
        }
    }
}

fn default_exact_threshold() -> f64 {
    10.0
}
fn default_max_nodes() -> usize {
    500_000
}
fn default_epsilon() -> f64 {
    1e-9
}
