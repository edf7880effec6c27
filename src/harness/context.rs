use crate::harness::error::Error;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// The application under test, as seen by every check of one run.
#[derive(Debug, Clone)]
pub struct Target {
    base_url: Url,
    headers: HeaderMap,
    timeout: Duration,
}

impl Target {
    pub fn parse(
        base_url: &str,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(Error::Configuration("base url is empty".to_owned()));
        }
        // `host:port` alone means plain http.
        let spelled = if trimmed.contains("://") {
            trimmed.to_owned()
        } else {
            format!("http://{}", trimmed)
        };
        let mut base_url = Url::parse(&spelled)
            .map_err(|e| Error::Configuration(format!("invalid base url '{}': {}", trimmed, e)))?;
        if !is_web(&base_url) {
            return Err(Error::Configuration(format!(
                "base url '{}' must use http or https",
                trimmed
            )));
        }
        // Joining relative paths keeps the whole base path only with a trailing slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            headers: header_map(headers)?,
            timeout,
        })
    }

    #[inline]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves a check path against the base url. Leading slashes are
    /// relative to the base path, so `/api` under `http://host/app/` is
    /// `http://host/app/api`. Only `http://` and `https://` urls are taken
    /// as they are; anything else without `://` is a path, colons included.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        if path.contains("://") {
            let absolute = Url::parse(path)
                .map_err(|e| Error::Configuration(format!("invalid url '{}': {}", path, e)))?;
            if !is_web(&absolute) {
                return Err(Error::Configuration(format!(
                    "url '{}' must use http or https",
                    path
                )));
            }
            return Ok(absolute);
        }
        // The `./` keeps `api:v1` from being read as a scheme.
        let relative = format!("./{}", path.trim_start_matches('/'));
        self.base_url
            .join(&relative)
            .map_err(|e| Error::Configuration(format!("invalid path '{}': {}", path, e)))
    }
}

fn is_web(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

pub fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_str(name)
            .map_err(|_| Error::Configuration(format!("invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            Error::Configuration(format!("invalid value for header '{}'", name))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}
