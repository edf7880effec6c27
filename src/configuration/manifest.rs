use crate::configuration::constants::common::{DEFAULT_TIMEOUT, ENV_PREFIX};
use config::{Config, ConfigError, Environment, File};
use regex::Regex;
use reqwest::Method;
use serde_derive::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Inclusive range of acceptable HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRange {
    min: u16,
    max: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMatch {
    Equals(String),
    Contains(String),
}

/// One assertion on an HTTP exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Status(#[serde(with = "crate::configuration::deserialize::status_range")] StatusRange),
    Contains(String),
    NotContains(String),
    AnyOf(Vec<String>),
    Matches(#[serde(with = "serde_regex")] Regex),
    Title(TextMatch),
    Header {
        name: String,
        #[serde(default)]
        value: Option<String>,
    },
    NoHeader(String),
    MaxDuration(#[serde(with = "crate::configuration::deserialize::duration")] Duration),
    /// The request must fail at the transport level, e.g. a port that is meant to be closed.
    Unreachable,
}

/// One assertion on a rendered DOM.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorEntry {
    pub css: String,
    #[serde(default = "default_min")]
    pub min: usize,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadEntry {
    #[serde(default = "default_field")]
    pub field: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckEntry {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default, with = "crate::configuration::deserialize::http_method")]
    pub method: Method,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub upload: Option<UploadEntry>,
    #[serde(default)]
    pub expect: Vec<Expectation>,
    #[serde(default)]
    pub select: Vec<SelectorEntry>,
    #[serde(default = "default_repeats")]
    pub repeats: u64,
    #[serde(default, with = "crate::configuration::deserialize::duration")]
    pub delay: Duration,
    #[serde(default)]
    pub browser: bool,
    #[serde(default)]
    pub per_user_agent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(
        default = "default_timeout",
        with = "crate::configuration::deserialize::duration"
    )]
    pub timeout: Duration,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_continue")]
    pub continue_on_failure: bool,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub user_agents: Vec<String>,
    #[serde(default)]
    pub webdriver: Option<String>,
    #[serde(default)]
    pub checks: Vec<CheckEntry>,
}

fn default_name() -> String {
    "smoke".to_owned()
}

fn default_path() -> String {
    "/".to_owned()
}

fn default_field() -> String {
    "file".to_owned()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_continue() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

fn default_repeats() -> u64 {
    1
}

fn default_min() -> usize {
    1
}

impl Manifest {
    /// Loads a manifest file (YAML, TOML, JSON...) and layers `SMOKESHOT_*`
    /// environment variables on top of it.
    pub fn from(file: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(file))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

impl StatusRange {
    pub fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, status: u16) -> bool {
        (self.min..=self.max).contains(&status)
    }
}

impl Default for StatusRange {
    /// Anything that is neither a client nor a server error.
    fn default() -> Self {
        Self::new(200, 399)
    }
}

impl FromStr for StatusRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let code = |text: &str| {
            text.trim()
                .parse::<u16>()
                .ok()
                .filter(|code| (100..=599).contains(code))
                .ok_or_else(|| format!("invalid status code '{}'", text.trim()))
        };
        if let Some(class) = s.strip_suffix("xx") {
            let hundreds = code(&format!("{}00", class))?;
            return Ok(Self::new(hundreds, hundreds + 99));
        }
        let range = match s.split_once('-') {
            Some((min, max)) => Self::new(code(min)?, code(max)?),
            None => {
                let single = code(s)?;
                Self::new(single, single)
            }
        };
        if range.min > range.max {
            return Err(format!("empty status range '{}'", s));
        }
        Ok(range)
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}
