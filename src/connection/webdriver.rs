//! Minimal W3C WebDriver client: just enough to open a session, load a page
//! and read the text of elements matched by CSS selectors.

use crate::connection::RenderDom;
use crate::harness::error::Error;
use reqwest::blocking::Client;
use reqwest::{Method, Url};
use serde_derive::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Key under which W3C drivers return element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Deserialize)]
struct Envelope {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct DriverFailure {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

#[derive(Debug)]
pub struct WebDriver {
    endpoint: Url,
    client: Client,
}

/// A live browser session. Deleted when dropped, whatever happened while it was open.
struct Session<'a> {
    driver: &'a WebDriver,
    id: String,
    timeout: Duration,
}

impl WebDriver {
    pub fn new(endpoint: &str, client: Client) -> Result<Self, Error> {
        let mut endpoint = Url::parse(endpoint).map_err(|e| {
            Error::Configuration(format!("invalid webdriver endpoint '{}': {}", endpoint, e))
        })?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Ok(Self { endpoint, client })
    }

    fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| Error::Configuration(format!("invalid webdriver path '{}': {}", path, e)))?;
        trace!("WebDriver {} {}", method, url);
        let mut request = self.client.request(method, url).timeout(timeout);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send()?;
        let status = response.status();
        let envelope: Envelope = response.json()?;
        if status.is_success() {
            return Ok(envelope.value);
        }
        match serde_json::from_value::<DriverFailure>(envelope.value) {
            Ok(failure) => Err(Error::Transport(format!(
                "webdriver {}: {}",
                failure.error, failure.message
            ))),
            Err(_) => Err(Error::Transport(format!("webdriver answered {}", status))),
        }
    }

    fn open(&self, timeout: Duration) -> Result<Session<'_>, Error> {
        let capabilities = json!({
            "capabilities": { "alwaysMatch": { "acceptInsecureCerts": true } }
        });
        let value = self.command(Method::POST, "session", Some(capabilities), timeout)?;
        let created: NewSession = serde_json::from_value(value)
            .map_err(|e| Error::Transport(format!("unexpected new session reply: {}", e)))?;
        debug!("Opened browser session {}", created.session_id);
        Ok(Session {
            driver: self,
            id: created.session_id,
            timeout,
        })
    }
}

impl<'a> Session<'a> {
    fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, Error> {
        let path = format!("session/{}/{}", self.id, path);
        self.driver.command(method, &path, body, self.timeout)
    }

    fn navigate(&self, url: &Url) -> Result<(), Error> {
        let millis = self.timeout.as_millis() as u64;
        self.call(
            Method::POST,
            "timeouts",
            Some(json!({ "pageLoad": millis, "script": millis, "implicit": 0 })),
        )?;
        self.call(Method::POST, "url", Some(json!({ "url": url.as_str() })))?;
        Ok(())
    }

    fn texts(&self, selector: &str) -> Result<Vec<String>, Error> {
        let found = self.call(
            Method::POST,
            "elements",
            Some(json!({ "using": "css selector", "value": selector })),
        )?;
        let elements = match found {
            Value::Array(elements) => elements,
            other => {
                return Err(Error::Transport(format!(
                    "unexpected elements reply: {}",
                    other
                )))
            }
        };
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            let id = element
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Transport("element reference without id".to_owned()))?;
            match self.call(Method::GET, &format!("element/{}/text", id), None)? {
                Value::String(text) => texts.push(text),
                other => {
                    return Err(Error::Transport(format!(
                        "unexpected element text reply: {}",
                        other
                    )))
                }
            }
        }
        Ok(texts)
    }
}

impl<'a> Drop for Session<'a> {
    fn drop(&mut self) {
        let path = format!("session/{}", self.id);
        match self.driver.command(Method::DELETE, &path, None, self.timeout) {
            Ok(_) => debug!("Closed browser session {}", self.id),
            Err(e) => warn!("Failed to close browser session {}: {}", self.id, e),
        }
    }
}

impl RenderDom for WebDriver {
    fn render(
        &self,
        url: &Url,
        selectors: &[String],
        timeout: Duration,
    ) -> Result<Vec<Vec<String>>, Error> {
        let session = self.open(timeout)?;
        session.navigate(url)?;
        selectors
            .iter()
            .map(|selector| session.texts(selector))
            .collect()
    }
}
