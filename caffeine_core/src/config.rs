//! Configuration file support for the caffeine monitor.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/caffeine/config.toml`.
//! Store files are kept per environment under the data directory.

use crate::{Beverage, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the running environment
pub const ENV_VAR: &str = "CAFF_ENV";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Command-line defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub beverage: Beverage,
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local/share"));
    base.join("caffeine")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
        base.join("caffeine").join("config.toml")
    }

    /// Store file locations for `env`
    pub fn store_paths(&self, env: Environment) -> StorePaths {
        StorePaths::in_dir(self.data.data_dir.join(env.as_str()))
    }
}

// ============================================================================
// Environments
// ============================================================================

/// Separate store sets so development runs never touch real data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Prod,
    Devel,
    Testing,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Devel => "devel",
            Environment::Testing => "testing",
        }
    }

    /// Read the running environment from `CAFF_ENV`; unset means prod
    pub fn from_env() -> Result<Self> {
        match std::env::var(ENV_VAR) {
            Ok(value) => value.parse(),
            Err(std::env::VarError::NotPresent) => Ok(Environment::Prod),
            Err(e) => Err(Error::Config(format!("{} is not valid: {}", ENV_VAR, e))),
        }
    }

    /// Check the environment requested on the command line against the
    /// running one
    pub fn check_requested(running: Environment, requested: Environment) -> Result<Environment> {
        if running == requested {
            return Ok(running);
        }
        Err(Error::Config(format!(
            "{} environment requested but {} is {}; switch with 'export {}={}'",
            requested, ENV_VAR, running, ENV_VAR, requested
        )))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prod" => Ok(Environment::Prod),
            "devel" => Ok(Environment::Devel),
            "testing" => Ok(Environment::Testing),
            other => Err(Error::Config(format!(
                "Unknown environment {:?}; export {} as prod, devel, or testing",
                other, ENV_VAR
            ))),
        }
    }
}

/// Locations of the three stores for one environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorePaths {
    /// Current level record
    pub state: PathBuf,
    /// Pending sub-doses
    pub future: PathBuf,
    /// Append-only activity log
    pub log: PathBuf,
}

impl StorePaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            state: dir.join("caffeine.json"),
            future: dir.join("caffeine_future.json"),
            log: dir.join("caffeine.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.beverage, Beverage::Coffee);
        assert!(config.data.data_dir.ends_with("caffeine"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.defaults.beverage = Beverage::Soda;
        config.data.data_dir = temp_dir.path().join("data");
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.defaults.beverage, Beverage::Soda);
        assert_eq!(loaded.data.data_dir, temp_dir.path().join("data"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[defaults]
beverage = "chocolate"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.defaults.beverage, Beverage::Chocolate);
        assert_eq!(config.data.data_dir, default_data_dir());
    }

    #[test]
    fn test_unknown_beverage_rejected() {
        let toml_str = r#"
[defaults]
beverage = "tea"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_store_paths_per_environment() {
        let mut config = Config::default();
        config.data.data_dir = PathBuf::from("/data/caffeine");

        let paths = config.store_paths(Environment::Devel);
        assert_eq!(paths.state, PathBuf::from("/data/caffeine/devel/caffeine.json"));
        assert_eq!(paths.future, PathBuf::from("/data/caffeine/devel/caffeine_future.json"));
        assert_eq!(paths.log, PathBuf::from("/data/caffeine/devel/caffeine.log"));
    }

    #[test]
    fn test_parse_environment() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!("devel".parse::<Environment>().unwrap(), Environment::Devel);
        assert_eq!("testing".parse::<Environment>().unwrap(), Environment::Testing);
        assert!(matches!("bongo".parse::<Environment>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_requested_environment_must_match() {
        assert_eq!(
            Environment::check_requested(Environment::Devel, Environment::Devel).unwrap(),
            Environment::Devel
        );

        let err = Environment::check_requested(Environment::Prod, Environment::Testing).unwrap_err();
        assert!(err.to_string().contains("export CAFF_ENV=testing"));
    }
}
