pub mod assert;
pub mod browser;
pub mod check;
pub mod context;
pub mod error;
pub mod executor;
pub mod job;
pub mod options;
pub mod report;
#[cfg(test)]
pub(crate) mod testing;

pub use self::check::{Action, Check, Outcome};
pub use self::context::Target;
pub use self::error::Error;
pub use self::executor::Harness;
pub use self::options::RunOptions;
pub use self::report::{Entry, Report};

use crate::configuration::constants::cargo_env::{CARGO_PKG_NAME, CARGO_PKG_VERSION};
use crate::configuration::manifest::{CheckEntry, Manifest};
use crate::connection::webdriver::WebDriver;
use crate::connection::{Payload, RenderDom, SendMessage};
use crate::harness::browser::BrowserJob;
use crate::harness::job::HttpJob;
use bytes::Bytes;
use http::{Request as HttpRequest, Response as HttpResponse};
use reqwest::blocking::Client;
use std::collections::HashSet;
use std::sync::Arc;

impl Harness {
    /// Plans a run from a manifest using a real HTTP client and, when the
    /// manifest names one, a WebDriver endpoint.
    pub fn from_manifest(manifest: &Manifest, only: &[String]) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", CARGO_PKG_NAME, CARGO_PKG_VERSION))
            .build()
            .map_err(|e| Error::Configuration(format!("cannot build http client: {}", e)))?;
        let browser = match &manifest.webdriver {
            Some(endpoint) => {
                Some(Arc::new(WebDriver::new(endpoint, client.clone())?) as Arc<dyn RenderDom>)
            }
            None => None,
        };
        Self::plan(manifest, only, Arc::new(client), browser)
    }

    /// Turns manifest entries into registered checks. `only` restricts the plan
    /// to the named checks; every name in it must exist.
    pub fn plan<T>(
        manifest: &Manifest,
        only: &[String],
        client: Arc<T>,
        browser: Option<Arc<dyn RenderDom>>,
    ) -> Result<Self, Error>
    where
        T: SendMessage<HttpRequest<Payload>, Result<HttpResponse<Bytes>, Error>>
            + Send
            + Sync
            + 'static,
    {
        let known: HashSet<&str> = manifest.checks.iter().map(|c| c.id.as_str()).collect();
        if let Some(unknown) = only.iter().find(|id| !known.contains(id.as_str())) {
            return Err(Error::Configuration(format!(
                "unknown check '{}' selected",
                unknown
            )));
        }

        let mut harness = Harness::new(manifest.name.clone());
        for entry in &manifest.checks {
            if !only.is_empty() && !only.contains(&entry.id) {
                debug!("Skipping check '{}'", entry.id);
                continue;
            }
            for variant in fan_out(entry, &manifest.user_agents) {
                let check = build_check(variant, &client, &browser)?;
                harness.register(check)?;
            }
        }
        info!("Registered {} checks", harness.amount());
        Ok(harness)
    }
}

/// One entry per user agent for `per_user_agent` checks, the entry itself otherwise.
fn fan_out(entry: &CheckEntry, user_agents: &[String]) -> Vec<CheckEntry> {
    if !entry.per_user_agent {
        return vec![entry.clone()];
    }
    if user_agents.is_empty() {
        warn!(
            "Check '{}' runs per user agent but none are configured",
            entry.id
        );
        return vec![entry.clone()];
    }
    user_agents
        .iter()
        .enumerate()
        .map(|(index, agent)| {
            let mut variant = entry.clone();
            variant.id = format!("{}[{}]", entry.id, index);
            variant.description = if entry.description.is_empty() {
                format!("as {}", agent)
            } else {
                format!("{} (as {})", entry.description, agent)
            };
            variant.headers.insert("user-agent".to_owned(), agent.clone());
            variant
        })
        .collect()
}

fn build_check<T>(
    entry: CheckEntry,
    client: &Arc<T>,
    browser: &Option<Arc<dyn RenderDom>>,
) -> Result<Check, Error>
where
    T: SendMessage<HttpRequest<Payload>, Result<HttpResponse<Bytes>, Error>>
        + Send
        + Sync
        + 'static,
{
    if entry.browser {
        let browser = browser.clone().ok_or_else(|| {
            Error::Configuration(format!(
                "check '{}' needs a browser but no webdriver endpoint is configured",
                entry.id
            ))
        })?;
        if entry.select.is_empty() || !entry.expect.is_empty() {
            return Err(Error::Configuration(format!(
                "browser check '{}' takes 'select' expectations only",
                entry.id
            )));
        }
        let job = BrowserJob::new(entry.path, entry.select, browser);
        return Ok(Check::new(entry.id, entry.description, job));
    }
    if !entry.select.is_empty() {
        return Err(Error::Configuration(format!(
            "check '{}' uses 'select' which requires 'browser: true'",
            entry.id
        )));
    }
    let payload = match (entry.body, entry.upload) {
        (Some(_), Some(_)) => {
            return Err(Error::Configuration(format!(
                "check '{}' has both a body and an upload",
                entry.id
            )))
        }
        (Some(body), None) => Payload::Raw(Bytes::from(body)),
        (None, Some(upload)) => Payload::Upload {
            field: upload.field,
            path: upload.path,
        },
        (None, None) => Payload::Empty,
    };
    let job = HttpJob::new(
        entry.path,
        entry.method,
        &entry.headers,
        payload,
        entry.expect,
        client.clone(),
    )?
    .repeated(entry.repeats, entry.delay);
    Ok(Check::new(entry.id, entry.description, job))
}
