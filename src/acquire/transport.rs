//! The HTTP seam of the fetch pipeline.

use crate::error::AcquireError;
use std::io::Read;
use std::time::Duration;

/// A started response: optional length and a body to stream from.
pub struct Response {
    pub content_length: Option<u64>,
    pub body: Box<dyn Read + Send>,
}

pub trait Transport {
    /// Issue a GET for `url`. Non-success statuses are errors.
    fn get(&self, url: &str) -> Result<Response, AcquireError>;
}

/// Blocking HTTP client backed by ureq.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .user_agent(concat!("gig/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(super::DEFAULT_TIMEOUT_SECS))
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<Response, AcquireError> {
        let response = self.agent.get(url).call().map_err(|e| AcquireError::Network {
            url: url.to_string(),
            message: match e {
                ureq::Error::Status(code, _) => format!("HTTP status {}", code),
                ureq::Error::Transport(t) => t.to_string(),
            },
        })?;

        let content_length = response
            .header("content-length")
            .and_then(|s| s.trim().parse().ok());
        Ok(Response {
            content_length,
            body: Box::new(response.into_reader()),
        })
    }
}
