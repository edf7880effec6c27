use crate::connection::SendMessage;
use crate::harness::error::Error;
use bytes::Bytes;
use http::Request as HttpRequest;
use http::Response as HttpResponse;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Raw(Bytes),
    /// A multipart form with a single file field. The file is opened only when
    /// the request is sent and closed when the request is dropped.
    Upload { field: String, path: PathBuf },
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Empty
    }
}

impl SendMessage<HttpRequest<Payload>, Result<HttpResponse<Bytes>, Error>> for Client {
    fn send(
        &self,
        data: HttpRequest<Payload>,
        timeout: Duration,
    ) -> Result<HttpResponse<Bytes>, Error> {
        let (parts, payload) = data.into_parts();
        let url = Url::parse(&parts.uri.to_string())
            .map_err(|e| Error::Configuration(format!("invalid url '{}': {}", parts.uri, e)))?;
        let mut request = self
            .request(parts.method, url)
            .headers(parts.headers)
            .timeout(timeout);
        request = match payload {
            Payload::Empty => request,
            Payload::Raw(body) => request.body(body.to_vec()),
            Payload::Upload { field, path } => {
                let form = Form::new().file(field, &path).map_err(|e| {
                    Error::Resource(format!("cannot open '{}': {}", path.display(), e))
                })?;
                request.multipart(form)
            }
        };
        let response = request.send()?;
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes()?;
        trace!("Received {} with {} bytes", status, body.len());

        let mut result = HttpResponse::new(body);
        *result.status_mut() = status;
        *result.version_mut() = version;
        *result.headers_mut() = headers;
        Ok(result)
    }
}
