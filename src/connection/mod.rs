//! Capability-shaped access to the system under test.
//!
//! The harness only ever talks to the target through these traits, which keeps
//! checks testable without a live server.

pub mod http;
pub mod webdriver;

use crate::harness::error::Error;
use reqwest::Url;
use std::time::Duration;

pub use self::http::Payload;

pub trait SendMessage<T, R> {
    fn send(&self, data: T, timeout: Duration) -> R;
}

/// Loads a page in a controlled browser and reads its rendered DOM.
pub trait RenderDom: Send + Sync {
    /// Returns, for every selector in order, the text of each matching node.
    fn render(
        &self,
        url: &Url,
        selectors: &[String],
        timeout: Duration,
    ) -> Result<Vec<Vec<String>>, Error>;
}
