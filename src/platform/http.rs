// RegSift - platform/http.rs
//
// Blocking HTTP GET for dataset payloads and dataset listings.
// One agent per client; every request carries the configured timeout.

use crate::util::constants;
use crate::util::error::ReadError;
use std::io::{self, Read};
use std::time::Duration;

/// Thin wrapper over a `ureq` agent that maps failures into `ReadError`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Self {
        let timeout_secs = timeout_secs.clamp(
            constants::MIN_HTTP_TIMEOUT_SECS,
            constants::MAX_HTTP_TIMEOUT_SECS,
        );
        let timeout = Duration::from_secs(timeout_secs);
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(&format!(
                "{}/{}",
                constants::APP_NAME,
                constants::APP_VERSION
            ))
            .build();
        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and return the body as text.
    ///
    /// A non-2xx status is a `ReadError::Status`; transport failures
    /// (DNS, connect, TLS, timeout) are `ReadError::Http`.
    pub fn get_text(&self, url: &str) -> Result<String, ReadError> {
        tracing::debug!(url, timeout_secs = self.timeout.as_secs(), "HTTP GET");

        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                tracing::warn!(url, status, "HTTP request returned an error status");
                return Err(ReadError::Status {
                    url: url.to_string(),
                    status,
                    status_text: response.status_text().to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "HTTP request failed");
                return Err(ReadError::Http {
                    url: url.to_string(),
                    source: Box::new(e),
                });
            }
        };

        // into_string() caps bodies at 10 MB; datasets can be larger.
        let body = read_body_lossy(response.into_reader()).map_err(|e| ReadError::Body {
            url: url.to_string(),
            source: e,
        })?;

        tracing::debug!(url, bytes = body.len(), "HTTP body received");
        Ok(body)
    }
}

/// Read a whole body, replacing invalid UTF-8 the same way local dataset
/// files are read.
fn read_body_lossy<R: Read>(mut reader: R) -> io::Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(constants::DEFAULT_HTTP_TIMEOUT_SECS)
    }
}
