use crate::domain::tuning::{Difficulty, Tuning};
use crate::use_cases::ControlScheme;
use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

// Runtime/server settings (not gameplay tuning).

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_TICK_MS: u64 = 16;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    TuningRead {
        path: PathBuf,
        source: io::Error,
    },
    TuningParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key}='{value}': {reason}")
            }
            ConfigError::TuningRead { path, source } => {
                write!(f, "cannot read tuning file {}: {source}", path.display())
            }
            ConfigError::TuningParse { path, source } => {
                write!(f, "invalid tuning file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidValue { .. } => None,
            ConfigError::TuningRead { source, .. } => Some(source),
            ConfigError::TuningParse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub tick_interval: Duration,
    pub tuning_path: Option<PathBuf>,
    /// Defaults for sessions that do not pick their own.
    pub difficulty: Difficulty,
    pub controls: ControlScheme,
    /// Fixed RNG seed for every session; random per session when unset.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            tuning_path: None,
            difficulty: Difficulty::Medium,
            controls: ControlScheme::Wasd,
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("ARENA_PORT") {
            config.port = parse("ARENA_PORT", &value)?;
        }
        if let Some(value) = get("ARENA_TICK_MS") {
            let millis: u64 = parse("ARENA_TICK_MS", &value)?;
            if millis == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "ARENA_TICK_MS",
                    value,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.tick_interval = Duration::from_millis(millis);
        }
        config.tuning_path = get("ARENA_TUNING_PATH").map(PathBuf::from);
        if let Some(value) = get("ARENA_DIFFICULTY") {
            config.difficulty = parse("ARENA_DIFFICULTY", &value)?;
        }
        if let Some(value) = get("ARENA_CONTROLS") {
            config.controls = parse("ARENA_CONTROLS", &value)?;
        }
        if let Some(value) = get("ARENA_SEED") {
            config.seed = Some(parse("ARENA_SEED", &value)?);
        }
        Ok(config)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: err.to_string(),
        })
}

/// Shipped balance, overridden by the TOML file at `path` when one is given.
pub fn load_tuning(path: Option<&Path>) -> Result<Tuning, ConfigError> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let text = fs::read_to_string(path).map_err(|source| ConfigError::TuningRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::TuningParse {
        path: path.to_path_buf(),
        source,
    })
}
