//! Environment-backed configuration, loaded once at startup.
//!
//! Every key in spec §6's environment table maps to a field here. Parsing
//! failures and cross-field validation failures are both reported as
//! [`ConfigError`] and cause the process to refuse to start (§7,
//! `ConfigurationError`).

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({source})")]
    Parse {
        key: &'static str,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("MAX_PLAYERS ({max_players}) must be <= NUM_COLORS ({num_colors})")]
    TooManyPlayers { max_players: usize, num_colors: u8 },
    #[error("FIELD_SIZE_X ({field_size_x}) is too small to paint the game-over banner ({banner_len} chars)")]
    FieldTooNarrowForBanner { field_size_x: i32, banner_len: usize },
    #[error(
        "FIELD_SIZE_X/Y too small for INIT_LENGTH={init_length} and INIT_MIN_DISTANCE_BORDER={border}"
    )]
    FieldTooSmallForSnake {
        init_length: usize,
        border: i32,
    },
}

/// Fully resolved, validated game settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub debug: bool,

    pub game_speed: f64,
    pub game_speed_increase: Option<u64>,
    pub game_speed_increase_rate: f64,
    pub game_speed_max: Option<f64>,
    pub game_frames_max: Option<u64>,
    pub game_shutdown_on_frames_max: bool,

    pub max_players: usize,
    pub num_colors: u8,
    pub max_top_scores: usize,

    pub field_size_x: i32,
    pub field_size_y: i32,

    pub init_length: usize,
    pub init_min_distance_border: i32,
    pub init_retries: u32,

    pub digit_min: u8,
    pub digit_max: u8,

    pub kill_points: i64,

    pub stones_enabled: bool,
    pub digit_spawn_rate: u8,
    pub stone_spawn_rate: u8,

    pub top_scores_file: String,
}

fn env_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::Parse {
            key,
            value: raw,
            source: Box::new(e),
        }),
        Err(_) => Ok(default),
    }
}

fn env_var_opt<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if raw.is_empty() => Ok(None),
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                key,
                value: raw,
                source: Box::new(e),
            }),
        Err(_) => Ok(None),
    }
}

impl Settings {
    /// Load settings from the process environment, falling back to the
    /// defaults in [`crate::constants`], then validate them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Settings {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env_var("PORT", DEFAULT_PORT)?,
            debug: env_var("DEBUG", false)?,

            game_speed: env_var("GAME_SPEED", DEFAULT_GAME_SPEED)?,
            game_speed_increase: env_var_opt("GAME_SPEED_INCREASE")?,
            game_speed_increase_rate: env_var(
                "GAME_SPEED_INCREASE_RATE",
                DEFAULT_GAME_SPEED_INCREASE_RATE,
            )?,
            game_speed_max: env_var_opt("GAME_SPEED_MAX")?,
            game_frames_max: env_var_opt("GAME_FRAMES_MAX")?,
            game_shutdown_on_frames_max: env_var("GAME_SHUTDOWN_ON_FRAMES_MAX", false)?,

            max_players: env_var("MAX_PLAYERS", DEFAULT_MAX_PLAYERS)?,
            num_colors: env_var("NUM_COLORS", DEFAULT_NUM_COLORS)?,
            max_top_scores: env_var("MAX_TOP_SCORES", DEFAULT_MAX_TOP_SCORES)?,

            field_size_x: env_var("FIELD_SIZE_X", DEFAULT_FIELD_SIZE_X)?,
            field_size_y: env_var("FIELD_SIZE_Y", DEFAULT_FIELD_SIZE_Y)?,

            init_length: env_var("INIT_LENGTH", DEFAULT_INIT_LENGTH)?,
            init_min_distance_border: env_var(
                "INIT_MIN_DISTANCE_BORDER",
                DEFAULT_INIT_MIN_DISTANCE_BORDER,
            )?,
            init_retries: env_var("INIT_RETRIES", DEFAULT_INIT_RETRIES)?,

            digit_min: env_var("DIGIT_MIN", DEFAULT_DIGIT_MIN)?,
            digit_max: env_var("DIGIT_MAX", DEFAULT_DIGIT_MAX)?,

            kill_points: env_var("KILL_POINTS", DEFAULT_KILL_POINTS)?,

            stones_enabled: env_var("STONES_ENABLED", DEFAULT_STONES_ENABLED)?,
            digit_spawn_rate: env_var("DIGIT_SPAWN_RATE", DEFAULT_DIGIT_SPAWN_RATE)?,
            stone_spawn_rate: env_var("STONE_SPAWN_RATE", DEFAULT_STONE_SPAWN_RATE)?,

            top_scores_file: env::var("TOP_SCORES_FILE")
                .unwrap_or_else(|_| DEFAULT_TOP_SCORES_FILE.to_string()),
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_players > self.num_colors as usize {
            return Err(ConfigError::TooManyPlayers {
                max_players: self.max_players,
                num_colors: self.num_colors,
            });
        }

        if self.field_size_x < GAME_OVER_TEXT.len() as i32 {
            return Err(ConfigError::FieldTooNarrowForBanner {
                field_size_x: self.field_size_x,
                banner_len: GAME_OVER_TEXT.len(),
            });
        }

        let distance = self.init_length as i32 + self.init_min_distance_border;
        if self.field_size_x / 2 < distance || self.field_size_y / 2 < distance {
            return Err(ConfigError::FieldTooSmallForSnake {
                init_length: self.init_length,
                border: self.init_min_distance_border,
            });
        }

        Ok(())
    }

    /// The subset of settings clients need at handshake time: world
    /// dimensions and the rules needed to render/predict without exposing
    /// server-internal knobs like the top-scores file path.
    pub fn client_view(&self) -> serde_json::Value {
        serde_json::json!({
            "fieldSizeX": self.field_size_x,
            "fieldSizeY": self.field_size_y,
            "maxPlayers": self.max_players,
            "numColors": self.num_colors,
            "gameSpeed": self.game_speed,
            "digitMin": self.digit_min,
            "digitMax": self.digit_max,
            "killPoints": self.kill_points,
            "stonesEnabled": self.stones_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            game_speed: DEFAULT_GAME_SPEED,
            game_speed_increase: None,
            game_speed_increase_rate: DEFAULT_GAME_SPEED_INCREASE_RATE,
            game_speed_max: None,
            game_frames_max: None,
            game_shutdown_on_frames_max: false,
            max_players: DEFAULT_MAX_PLAYERS,
            num_colors: DEFAULT_NUM_COLORS,
            max_top_scores: DEFAULT_MAX_TOP_SCORES,
            field_size_x: DEFAULT_FIELD_SIZE_X,
            field_size_y: DEFAULT_FIELD_SIZE_Y,
            init_length: DEFAULT_INIT_LENGTH,
            init_min_distance_border: DEFAULT_INIT_MIN_DISTANCE_BORDER,
            init_retries: DEFAULT_INIT_RETRIES,
            digit_min: DEFAULT_DIGIT_MIN,
            digit_max: DEFAULT_DIGIT_MAX,
            kill_points: DEFAULT_KILL_POINTS,
            stones_enabled: DEFAULT_STONES_ENABLED,
            digit_spawn_rate: DEFAULT_DIGIT_SPAWN_RATE,
            stone_spawn_rate: DEFAULT_STONE_SPAWN_RATE,
            top_scores_file: DEFAULT_TOP_SCORES_FILE.to_string(),
        }
    }

    #[test]
    fn default_settings_validate() {
        assert!(base_settings().validate().is_ok());
    }

    #[test]
    fn rejects_too_many_players() {
        let mut settings = base_settings();
        settings.max_players = settings.num_colors as usize + 1;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::TooManyPlayers { .. })
        ));
    }

    #[test]
    fn rejects_field_too_small_for_snake() {
        let mut settings = base_settings();
        settings.field_size_x = 6;
        settings.field_size_y = 6;
        settings.init_length = 5;
        settings.init_min_distance_border = 2;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::FieldTooSmallForSnake { .. })
        ));
    }

    #[test]
    fn rejects_field_too_narrow_for_banner() {
        let mut settings = base_settings();
        settings.field_size_x = 5;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::FieldTooNarrowForBanner { .. })
        ));
    }
}
