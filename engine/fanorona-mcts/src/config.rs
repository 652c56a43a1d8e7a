//! Search configuration for both agents.

use std::time::Duration;

use thiserror::Error;

/// Bounds accepted for the UCT exploration constant.
pub const EXPLORATION_MIN: f64 = 0.1;
pub const EXPLORATION_MAX: f64 = 2.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("exploration constant {0} outside [{EXPLORATION_MIN}, {EXPLORATION_MAX}]")]
    ExplorationOutOfRange(f64),

    #[error("simulation budget must be at least 1")]
    ZeroSimulations,
}

/// Configuration for the time-budgeted UCT agent.
#[derive(Debug, Clone)]
pub struct UctConfig {
    /// Exploration constant `c` in the UCT formula.
    pub exploration_constant: f64,

    /// Wall-clock budget per decision.
    pub decision_budget: Duration,

    /// Safety cap on rollout length; a rollout that reaches it without a
    /// winner counts as a draw.
    pub max_rollout_plies: u32,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            exploration_constant: 1.41,
            decision_budget: Duration::from_millis(1000),
            max_rollout_plies: 300,
        }
    }
}

impl UctConfig {
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    pub fn with_decision_budget(mut self, budget: Duration) -> Self {
        self.decision_budget = budget;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(EXPLORATION_MIN..=EXPLORATION_MAX).contains(&self.exploration_constant) {
            return Err(ConfigError::ExplorationOutOfRange(self.exploration_constant));
        }
        Ok(())
    }
}

/// Configuration for the iteration-budgeted PUCT agent.
#[derive(Debug, Clone)]
pub struct PuctConfig {
    /// Number of search iterations per decision.
    pub num_simulations: u32,

    /// Exploration constant scaling the prior term.
    pub c_puct: f32,

    /// Dirichlet noise mixed into root priors during self-play.
    /// `alpha <= 0` disables the noise entirely.
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior replaced by noise when enabled.
    pub dirichlet_epsilon: f32,
}

impl Default for PuctConfig {
    fn default() -> Self {
        Self {
            num_simulations: 400,
            c_puct: 1.25,
            dirichlet_alpha: 0.0,
            dirichlet_epsilon: 0.25,
        }
    }
}

impl PuctConfig {
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    pub fn with_dirichlet(mut self, alpha: f32, epsilon: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_simulations == 0 {
            return Err(ConfigError::ZeroSimulations);
        }
        Ok(())
    }
}
