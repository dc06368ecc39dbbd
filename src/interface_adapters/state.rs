use crate::domain::tuning::{Difficulty, Tuning};
use crate::use_cases::{Clock, ControlScheme};
use std::{sync::Arc, time::Duration};

/// Settings a new session starts from unless its query string overrides them.
#[derive(Debug, Clone, Copy)]
pub struct SessionDefaults {
    pub difficulty: Difficulty,
    pub controls: ControlScheme,
    // Fixed seed for reproducible matches; random per session when unset.
    pub seed: Option<u64>,
    pub tick_interval: Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub defaults: SessionDefaults,
    // Balance table shared by every session; each match clones it into its own rules.
    pub tuning: Arc<Tuning>,
    // Wall clock handed to every session loop.
    pub clock: Arc<dyn Clock>,
}
