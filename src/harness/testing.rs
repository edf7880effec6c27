//! In-memory transport for harness tests.

use crate::connection::{Payload, SendMessage};
use crate::harness::error::Error;
use bytes::Bytes;
use http::header::HeaderMap;
use http::{Method, Request as HttpRequest, Response as HttpResponse};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

type HttpResult = Result<HttpResponse<Bytes>, Error>;
type Responder = Box<dyn Fn(&HttpRequest<Payload>) -> HttpResult + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub payload: Payload,
    pub timeout: Duration,
}

pub struct ScriptedClient {
    respond: Responder,
    seen: Mutex<Vec<RecordedRequest>>,
}

pub fn page(status: u16, body: &str) -> HttpResponse<Bytes> {
    HttpResponse::builder()
        .status(status)
        .header("content-type", "text/html; charset=utf-8")
        .body(Bytes::from(body.to_owned()))
        .unwrap()
}

impl ScriptedClient {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&HttpRequest<Payload>) -> HttpResult + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Behaves like a port nothing listens on.
    pub fn refusing() -> Self {
        Self::new(|_| Err(Error::Transport("connection refused".to_owned())))
    }

    /// Answers with the given results in order, then refuses.
    pub fn sequence(results: Vec<HttpResult>) -> Self {
        let queue = Mutex::new(results.into_iter().collect::<VecDeque<_>>());
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("script exhausted".to_owned())))
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl SendMessage<HttpRequest<Payload>, HttpResult> for ScriptedClient {
    fn send(&self, data: HttpRequest<Payload>, timeout: Duration) -> HttpResult {
        let result = (self.respond)(&data);
        self.seen.lock().unwrap().push(RecordedRequest {
            method: data.method().clone(),
            uri: data.uri().to_string(),
            headers: data.headers().clone(),
            payload: data.body().clone(),
            timeout,
        });
        result
    }
}
