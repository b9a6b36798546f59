//! Game configuration loaded from TOML.

use cube_tictactoe::Difficulty;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Tunables for pacing, defaults and the checkout hand-off.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Pause before the AI plays, in milliseconds.
    #[serde(default = "default_ai_move_delay_ms")]
    ai_move_delay_ms: u64,

    /// How long a win is shown before the game-over screen, in milliseconds.
    #[serde(default = "default_win_display_ms")]
    win_display_ms: u64,

    /// How long a draw is shown before the game-over screen, in milliseconds.
    #[serde(default = "default_draw_display_ms")]
    draw_display_ms: u64,

    /// AI strength used when none is given on the command line.
    #[serde(default)]
    default_difficulty: Difficulty,

    /// Names used for local two-player games.
    #[serde(default = "default_local_names")]
    local_names: [String; 2],

    /// Names used against the AI (human first).
    #[serde(default = "default_ai_names")]
    ai_names: [String; 2],

    /// Base URL that checkout redirects are built on.
    #[serde(default = "default_checkout_base_url")]
    checkout_base_url: String,

    /// Whether online play needs a live subscription.
    #[serde(default)]
    require_subscription: bool,
}

#[instrument]
fn default_ai_move_delay_ms() -> u64 {
    500
}

#[instrument]
fn default_win_display_ms() -> u64 {
    5000
}

#[instrument]
fn default_draw_display_ms() -> u64 {
    3000
}

#[instrument]
fn default_local_names() -> [String; 2] {
    ["Player 1".to_string(), "Player 2".to_string()]
}

#[instrument]
fn default_ai_names() -> [String; 2] {
    ["You".to_string(), "AI".to_string()]
}

#[instrument]
fn default_checkout_base_url() -> String {
    "/api/stripe/create-checkout".to_string()
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            ai_move_delay_ms = config.ai_move_delay_ms,
            difficulty = %config.default_difficulty,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Configuration with every delay set to zero.
    pub fn instant() -> Self {
        Self {
            ai_move_delay_ms: 0,
            win_display_ms: 0,
            draw_display_ms: 0,
            ..Self::default()
        }
    }

    /// Pause before the AI plays.
    pub fn ai_move_delay(&self) -> Duration {
        Duration::from_millis(self.ai_move_delay_ms)
    }

    /// Hold time for a win.
    pub fn win_display(&self) -> Duration {
        Duration::from_millis(self.win_display_ms)
    }

    /// Hold time for a draw.
    pub fn draw_display(&self) -> Duration {
        Duration::from_millis(self.draw_display_ms)
    }

    /// Replaces the default AI difficulty.
    pub fn with_default_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.default_difficulty = difficulty;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ai_move_delay_ms: default_ai_move_delay_ms(),
            win_display_ms: default_win_display_ms(),
            draw_display_ms: default_draw_display_ms(),
            default_difficulty: Difficulty::default(),
            local_names: default_local_names(),
            ai_names: default_ai_names(),
            checkout_base_url: default_checkout_base_url(),
            require_subscription: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
