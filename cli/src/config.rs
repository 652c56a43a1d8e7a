//! Configuration for the console frontend.
//!
//! Settings are resolved with the usual priority: command-line flags beat
//! `FANORONA_<SECTION>_<KEY>` environment variables, which beat an optional
//! `fanorona.toml`, which beats the built-in defaults.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

/// Locations searched for the config file, in order.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["fanorona.toml", "../fanorona.toml"];

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub uct: UctSection,
    pub puct: PuctSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board width: 9 for fanorona-9, 5 for fanorona-5.
    pub board_width: usize,
    /// Safety cap on moves before the game is adjudicated a draw.
    pub move_cap: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 9,
            move_cap: 70,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UctSection {
    pub exploration_constant: f64,
    pub decision_time_ms: u64,
}

impl Default for UctSection {
    fn default() -> Self {
        Self {
            exploration_constant: 1.41,
            decision_time_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PuctSection {
    pub num_simulations: u32,
    pub c_puct: f32,
}

impl Default for PuctSection {
    fn default() -> Self {
        Self {
            num_simulations: 400,
            c_puct: 1.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load the config file (if any) and apply environment overrides.
pub fn load_config() -> Config {
    let mut config = if let Ok(path) = std::env::var("FANORONA_CONFIG") {
        load_from_path(&PathBuf::from(path))
    } else {
        CONFIG_SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .map(|p| load_from_path(&p))
            .unwrap_or_default()
    };
    apply_env_overrides(&mut config);
    config
}

fn load_from_path(path: &PathBuf) -> Config {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to parse {}: {}, using defaults", path.display(), e);
                Config::default()
            }
        },
        Err(e) => {
            warn!("failed to read {}: {}, using defaults", path.display(), e);
            Config::default()
        }
    }
}

macro_rules! env_override {
    ($target:expr, $key:expr) => {
        if let Ok(v) = std::env::var($key).map(|s| s.parse()) {
            if let Ok(v) = v {
                $target = v;
            }
        }
    };
}

fn apply_env_overrides(config: &mut Config) {
    env_override!(config.game.board_width, "FANORONA_GAME_BOARD_WIDTH");
    env_override!(config.game.move_cap, "FANORONA_GAME_MOVE_CAP");
    env_override!(
        config.uct.exploration_constant,
        "FANORONA_UCT_EXPLORATION_CONSTANT"
    );
    env_override!(config.uct.decision_time_ms, "FANORONA_UCT_DECISION_TIME_MS");
    env_override!(config.puct.num_simulations, "FANORONA_PUCT_NUM_SIMULATIONS");
    env_override!(config.puct.c_puct, "FANORONA_PUCT_C_PUCT");
    env_override!(config.logging.level, "FANORONA_LOGGING_LEVEL");
}
