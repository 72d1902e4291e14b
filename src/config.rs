use crate::client::{Client, URL_BASE};
use crate::summary::DEFAULT_FSTRING;
use crate::{cli::Cli, logging::LoggingOptions};
use anyhow::{anyhow, Result};
use etcetera::{choose_app_strategy, AppStrategy, AppStrategyArgs};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_with::DurationSeconds;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Lower bound for `poll_interval` so `watch` can't hammer the API.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,
    pub main: MainConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: Self::default_path(),
            main: MainConfig::default(),
        }
    }
}

#[serde_with::serde_as]
#[derive(Debug, Deserialize, Serialize)]
pub struct MainConfig {
    pub api_key: String,
    pub base_url: String,
    /// Overall request timeout. The HTTP agent's defaults apply when unset.
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub poll_interval: Duration,
    pub summary_fstring: String,
    pub logging: LoggingOptions,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: URL_BASE.to_string(),
            timeout: None,
            poll_interval: Duration::from_secs(60),
            summary_fstring: DEFAULT_FSTRING.to_string(),
            logging: LoggingOptions::default(),
        }
    }
}

impl MainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval < MIN_POLL_INTERVAL {
            return Err(anyhow!(
                "poll_interval must be at least {} seconds, got {}",
                MIN_POLL_INTERVAL.as_secs(),
                self.poll_interval.as_secs()
            ));
        }
        Ok(())
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let mut path = PathBuf::from(&Self::default_dirs().config);
        path.push("config.yml");
        path
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(MainConfig::default()))
            .merge(Yaml::file(config_path))
            .merge(Env::prefixed("EEW_"))
    }

    pub fn from_path(config_path: &Path) -> Result<Self> {
        let main: MainConfig = Self::figment(config_path).extract()?;
        main.validate()?;
        Ok(Self {
            config_path: config_path.to_owned(),
            main,
        })
    }

    pub fn from_default_path() -> Result<Self> {
        Self::from_path(&Self::default_path())
    }

    pub fn from_cli(args: &Cli) -> Result<Self> {
        let config_path = if let Some(path) = &args.config_path {
            path.to_owned()
        } else {
            Self::default_path()
        };

        let main: MainConfig = Self::figment(&config_path)
            .merge(Serialized::defaults(args))
            .extract()?;
        main.validate()?;

        Ok(Config { config_path, main })
    }

    pub fn default_dirs() -> &'static DefaultDirs {
        DEFAULT_DIRS.get_or_init(|| {
            match choose_app_strategy(AppStrategyArgs {
                top_level_domain: "org".to_string(),
                author: "sublipri".to_string(),
                app_name: "EEW Buddy".to_string(),
            }) {
                Ok(strategy) => DefaultDirs {
                    config: strategy.config_dir(),
                    state: strategy.state_dir().unwrap_or(strategy.data_dir()),
                },
                // No home directory. Fall back to the working directory.
                Err(_) => DefaultDirs {
                    config: PathBuf::from("."),
                    state: PathBuf::from("."),
                },
            }
        })
    }

    pub fn write_config_file(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(&self.main)?;
        fs::write(&self.config_path, yaml)?;
        info!("Wrote {}", self.config_path.display());
        Ok(())
    }

    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("API key must not be empty"));
        }
        self.main.api_key = key.to_string();
        self.write_config_file()
    }

    pub fn get_client(&self) -> Client {
        Client::new(&self.main.base_url, &self.main.api_key, self.main.timeout)
    }
}

static DEFAULT_DIRS: OnceCell<DefaultDirs> = OnceCell::new();

#[derive(Debug, Deserialize, Serialize)]
pub struct DefaultDirs {
    pub config: PathBuf,
    pub state: PathBuf,
}
