use crate::configuration::manifest::{Expectation, StatusRange};
use crate::connection::{Payload, SendMessage};
use crate::harness::assert::{Assertable, Exchange};
use crate::harness::check::Action;
use crate::harness::context::{header_map, Target};
use crate::harness::error::Error;
use bytes::Bytes;
use http::header::HeaderMap;
use http::{Method, Request as HttpRequest, Response as HttpResponse, Uri};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

type HttpResult = Result<HttpResponse<Bytes>, Error>;

/// A check made of one HTTP request (possibly repeated) and the expectations
/// its responses have to satisfy.
pub struct HttpJob<T>
where
    T: SendMessage<HttpRequest<Payload>, HttpResult>,
{
    path: String,
    method: Method,
    headers: HeaderMap,
    payload: Payload,
    expectations: Vec<Expectation>,
    repeats: u64,
    delay: Duration,
    client: Arc<T>,
}

impl<T> HttpJob<T>
where
    T: SendMessage<HttpRequest<Payload>, HttpResult>,
{
    /// Without any status or reachability expectation a response must not be
    /// a client or server error.
    pub fn new(
        path: String,
        method: Method,
        headers: &BTreeMap<String, String>,
        payload: Payload,
        mut expectations: Vec<Expectation>,
        client: Arc<T>,
    ) -> Result<Self, Error> {
        let decides_status = expectations
            .iter()
            .any(|e| matches!(e, Expectation::Status(_) | Expectation::Unreachable));
        if !decides_status {
            expectations.insert(0, Expectation::Status(StatusRange::default()));
        }
        Ok(Self {
            path,
            method,
            headers: header_map(headers)?,
            payload,
            expectations,
            repeats: 1,
            delay: Duration::default(),
            client,
        })
    }

    /// Sends the request `repeats` times in a row, `delay` apart.
    pub fn repeated(mut self, repeats: u64, delay: Duration) -> Self {
        self.repeats = repeats.max(1);
        self.delay = delay;
        self
    }

    fn expects_unreachable(&self) -> bool {
        self.expectations
            .iter()
            .any(|e| matches!(e, Expectation::Unreachable))
    }

    fn prepare(&self, target: &Target) -> Result<HttpRequest<Payload>, Error> {
        if let Payload::Upload { path, .. } = &self.payload {
            if !path.is_file() {
                return Err(Error::Resource(format!(
                    "upload file '{}' not found",
                    path.display()
                )));
            }
        }
        let url = target.url(&self.path)?;
        let uri = Uri::from_str(url.as_str())
            .map_err(|e| Error::Configuration(format!("invalid url '{}': {}", url, e)))?;

        let mut headers = target.headers().clone();
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        let mut request = HttpRequest::new(self.payload.clone());
        *request.method_mut() = self.method.clone();
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }

    fn attempt(&self, target: &Target) -> Result<(), Error> {
        let request = self.prepare(target)?;
        debug!("{} {}", request.method(), request.uri());
        let now = Instant::now();
        match self.client.send(request, target.timeout()) {
            Ok(response) => {
                let exchange = Exchange::new(response, now.elapsed());
                debug!(
                    "Received {} ({} bytes) in {} ms",
                    exchange.status(),
                    exchange.text().len(),
                    exchange.elapsed().as_millis()
                );
                self.expectations
                    .iter()
                    .try_for_each(|expectation| expectation.assert(&exchange))
            }
            Err(Error::Transport(cause)) if self.expects_unreachable() => {
                debug!("Request failed as expected: {}", cause);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl<T> Action for HttpJob<T>
where
    T: SendMessage<HttpRequest<Payload>, HttpResult> + Send + Sync,
{
    fn path(&self) -> Option<&str> {
        Some(&self.path)
    }

    fn perform(&self, target: &Target) -> Result<(), Error> {
        for iteration in 0..self.repeats {
            if iteration > 0 {
                sleep(self.delay);
            }
            if self.repeats > 1 {
                debug!("Iteration {}/{}", iteration + 1, self.repeats);
            }
            self.attempt(target).map_err(|e| match e {
                Error::AssertionMismatch(reason) if self.repeats > 1 => Error::AssertionMismatch(
                    format!("iteration {}/{}: {}", iteration + 1, self.repeats, reason),
                ),
                other => other,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::testing::{page, ScriptedClient};
    use std::io::Write;
    use std::path::PathBuf;

    fn target() -> Target {
        let mut headers = BTreeMap::new();
        headers.insert("user-agent".to_owned(), "smokeshot-test".to_owned());
        headers.insert("accept".to_owned(), "text/html".to_owned());
        Target::parse("http://localhost:5174", &headers, Duration::from_secs(1)).unwrap()
    }

    fn job(
        client: &Arc<ScriptedClient>,
        headers: &[(&str, &str)],
        payload: Payload,
        expectations: Vec<Expectation>,
    ) -> HttpJob<ScriptedClient> {
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HttpJob::new(
            "/upload".to_owned(),
            Method::GET,
            &headers,
            payload,
            expectations,
            client.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_request_carries_merged_headers() {
        let client = Arc::new(ScriptedClient::new(|_| Ok(page(200, "ok"))));
        let job = job(&client, &[("accept", "application/json")], Payload::Empty, vec![]);

        assert!(job.perform(&target()).is_ok());
        let seen = client.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].uri, "http://localhost:5174/upload");
        assert_eq!(seen[0].headers["accept"], "application/json");
        assert_eq!(seen[0].headers["user-agent"], "smokeshot-test");
    }

    #[test]
    fn test_default_status_expectation() {
        let client = Arc::new(ScriptedClient::new(|_| Ok(page(500, "boom"))));
        let job = job(&client, &[], Payload::Empty, vec![]);

        assert_eq!(
            job.perform(&target()),
            Err(Error::AssertionMismatch(
                "expected status 200-399, got 500".to_owned()
            ))
        );
    }

    #[test]
    fn test_explicit_status_replaces_default() {
        let client = Arc::new(ScriptedClient::new(|_| Ok(page(404, "Not Found"))));
        let job = job(
            &client,
            &[],
            Payload::Empty,
            vec![Expectation::Status(StatusRange::new(404, 404))],
        );

        assert!(job.perform(&target()).is_ok());
    }

    #[test]
    fn test_transport_error_is_passed_through() {
        let client = Arc::new(ScriptedClient::refusing());
        let job = job(&client, &[], Payload::Empty, vec![]);

        assert!(matches!(job.perform(&target()), Err(Error::Transport(_))));
    }

    #[test]
    fn test_unreachable_expectation() {
        let refusing = Arc::new(ScriptedClient::refusing());
        let answering = Arc::new(ScriptedClient::new(|_| Ok(page(200, "up"))));

        assert!(job(&refusing, &[], Payload::Empty, vec![Expectation::Unreachable])
            .perform(&target())
            .is_ok());
        assert!(matches!(
            job(&answering, &[], Payload::Empty, vec![Expectation::Unreachable])
                .perform(&target()),
            Err(Error::AssertionMismatch(_))
        ));
    }

    #[test]
    fn test_missing_upload_is_resource_error() {
        let client = Arc::new(ScriptedClient::new(|_| Ok(page(200, "ok"))));
        let payload = Payload::Upload {
            field: "file".to_owned(),
            path: PathBuf::from("/no/such/story.docx"),
        };
        let job = job(&client, &[], payload, vec![]);

        assert!(matches!(job.perform(&target()), Err(Error::Resource(_))));
        assert!(client.requests().is_empty());
    }

    #[test]
    fn test_upload_is_sent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "As a user I want to upload a story").unwrap();
        let client = Arc::new(ScriptedClient::new(|_| Ok(page(200, "{\"ok\":true}"))));
        let payload = Payload::Upload {
            field: "file".to_owned(),
            path: file.path().to_path_buf(),
        };
        let job = job(&client, &[], payload.clone(), vec![]);

        assert!(job.perform(&target()).is_ok());
        assert_eq!(client.requests()[0].payload, payload);
    }

    #[test]
    fn test_repeats_stop_at_first_failure() {
        let client = Arc::new(ScriptedClient::sequence(vec![
            Ok(page(200, "ok")),
            Ok(page(503, "busy")),
            Ok(page(200, "ok")),
        ]));
        let job = job(&client, &[], Payload::Empty, vec![]).repeated(3, Duration::from_millis(1));

        assert_eq!(
            job.perform(&target()),
            Err(Error::AssertionMismatch(
                "iteration 2/3: expected status 200-399, got 503".to_owned()
            ))
        );
        assert_eq!(client.requests().len(), 2);
    }
}
