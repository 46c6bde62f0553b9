//! Layered configuration for `arrange`.
//!
//! Layers are merged in order, later ones winning:
//! 1. Built-in defaults.
//! 2. `config.toml`, `config.yaml` and `config.json` in the platform
//!    configuration directory (e.g. `~/.config/arrange/` on Linux).
//! 3. A file given explicitly, usually with `--config`.
//! 4. Environment variables prefixed with `ARRANGE_`, nested keys separated
//!    by `__` (`ARRANGE_ANALYSIS__CONCURRENCY=8`).
//!
//! `ARRANGE_LOG` itself is reserved for the log filter and never read as
//! configuration.

mod error;

pub use crate::error::{Error, ErrorKind, Result};

use arrange_engine::{AnalyzeOptions, ExecuteOptions, LinkKind, Mode, NormalizerOptions, PlanBuilder};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const ENV_PREFIX: &str = "ARRANGE_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub planning: Planning,
    pub analysis: Analysis,
    pub execute: ExecuteOptions,
    pub collect: Collect,
    pub log: Log,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planning {
    pub mode: Mode,
    /// Treat destinations differing only in case as the same path.
    pub case_insensitive: bool,
    pub link: LinkKind,
    pub normalizer: NormalizerOptions,
}
impl Default for Planning {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            case_insensitive: true,
            link: LinkKind::default(),
            normalizer: NormalizerOptions::default(),
        }
    }
}
impl Planning {
    pub fn builder(&self) -> PlanBuilder {
        PlanBuilder::new().link(self.link).case_insensitive(self.case_insensitive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub concurrency: usize,
    pub timeout_secs: u64,
}
impl Default for Analysis {
    fn default() -> Self {
        let defaults = AnalyzeOptions::default();
        Self {
            concurrency: defaults.concurrency,
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}
impl Analysis {
    pub fn options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collect {
    pub include_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Default `tracing` filter directive when `ARRANGE_LOG` is unset.
    pub level: String,
    /// File that every executed plan is appended to.
    pub audit_file: Option<PathBuf>,
}
impl Default for Log {
    fn default() -> Self {
        Self { level: "info".to_string(), audit_file: None }
    }
}

impl Config {
    /// Loads every layer, with `explicit` as the highest priority file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "arrange");
        Self::load_from(dirs.as_ref().map(ProjectDirs::config_dir), explicit)
    }

    pub fn load_from(config_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let config: Self = figment(config_dir, explicit)?
            .extract()
            .map_err(|err| ErrorKind::Extract(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall or truncate every run.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.analysis.concurrency, "analysis.concurrency"),
            (self.analysis.timeout_secs as usize, "analysis.timeout_secs"),
            (self.planning.normalizer.max_folder_len, "planning.normalizer.max_folder_len"),
            (self.planning.normalizer.max_filename_words, "planning.normalizer.max_filename_words"),
            (self.planning.normalizer.max_filename_len, "planning.normalizer.max_filename_len"),
        ];
        if let Some((_, key)) = checks.iter().find(|(value, _)| *value == 0) {
            exn::bail!(ErrorKind::Invalid(format!("{key} must be greater than zero")));
        }
        Ok(())
    }
}

fn figment(config_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(dir) = config_dir {
        debug!(dir = %dir.display(), "reading platform configuration");
        figment = figment
            .merge(Toml::file(dir.join("config.toml")))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Json::file(dir.join("config.json")));
    }
    if let Some(path) = explicit {
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        };
    }
    Ok(figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["log"]).split("__")))
}
