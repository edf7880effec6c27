use crate::configuration::constants::cargo_env::CARGO_PKG_NAME;
use crate::configuration::manifest::Manifest;
use crate::reporter::Format;
use clap::arg_enum;
use log::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

arg_enum! {
    #[derive(Debug, Clone, Copy)]
    pub enum LogLevel {
        Off, Error, Warn, Info, Debug, Trace,
    }
}

arg_enum! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum ReportFormat {
        Text, Json,
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = CARGO_PKG_NAME)]
pub struct Opt {
    /// Manifest declaring the checks to run. Supported: YAML, JSON, TOML, INI, RON, JSON5
    #[structopt(parse(from_os_str))]
    pub file: PathBuf,

    /// Sets a logging level
    #[structopt(case_insensitive = true, long, short = "L", possible_values = &LogLevel::variants(), env = "LOG_LEVEL")]
    pub logging: Option<LogLevel>,

    /// File to which application will write logs
    #[structopt(long, short = "O", env = "LOG_OUTPUT_FILE")]
    pub log_output_file: Option<PathBuf>,

    /// Overrides the base url of the application under test
    #[structopt(long, short = "u")]
    pub base_url: Option<String>,

    /// Amount of checks executed in parallel
    #[structopt(long, short = "t")]
    pub concurrency: Option<usize>,

    /// Stop at the first check that does not pass
    #[structopt(long)]
    pub fail_fast: bool,

    /// Run only the listed checks, any other will be ignored
    #[structopt(long, short = "k")]
    pub only: Vec<String>,

    /// Report format
    #[structopt(case_insensitive = true, long, short = "f", possible_values = &ReportFormat::variants(), default_value = "text")]
    pub format: ReportFormat,

    /// Write the report into a file instead of stdout
    #[structopt(long, short = "o", parse(from_os_str))]
    pub output: Option<PathBuf>,
}

impl Opt {
    /// Command-line values win over the manifest and the environment.
    pub fn apply(&self, manifest: &mut Manifest) {
        if let Some(base_url) = &self.base_url {
            manifest.base_url = base_url.clone();
        }
        if let Some(concurrency) = self.concurrency {
            manifest.concurrency = concurrency;
        }
        if self.fail_fast {
            manifest.continue_on_failure = false;
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl From<ReportFormat> for Format {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => Format::Text,
            ReportFormat::Json => Format::Json,
        }
    }
}
