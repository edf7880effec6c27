use crate::configuration::constants::common::{DEFAULT_TIMEOUT, MAX_CONCURRENCY};
use crate::configuration::manifest::Manifest;
use crate::harness::error::Error;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a run is carried out, independent of what it checks.
#[derive(Debug, Clone, Builder)]
#[builder(default, setter(into))]
pub struct RunOptions {
    /// Upper bound for every request a check makes.
    pub timeout: Duration,
    pub continue_on_failure: bool,
    /// Sent with every request, below the headers a check sets itself.
    pub headers: BTreeMap<String, String>,
    /// Checks executed at once; 1 keeps the run strictly sequential.
    pub concurrency: usize,
    /// Raised from outside (SIGINT) to stop picking up new checks.
    pub abort: Arc<AtomicBool>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            continue_on_failure: true,
            headers: BTreeMap::new(),
            concurrency: 1,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RunOptions {
    pub fn builder() -> RunOptionsBuilder {
        RunOptionsBuilder::default()
    }

    pub fn from_manifest(manifest: &Manifest, abort: Arc<AtomicBool>) -> Self {
        Self {
            timeout: manifest.timeout,
            continue_on_failure: manifest.continue_on_failure,
            headers: manifest.headers.clone(),
            concurrency: manifest.concurrency,
            abort,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.timeout == Duration::default() {
            return Err(Error::Configuration("timeout must be positive".to_owned()));
        }
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(Error::Configuration(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }
}
