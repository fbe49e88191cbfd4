//! Outbound HTTP client for backend calls.

use std::time::Duration;

use crate::forward::error::{TransportError, TransportErrorKind};
use crate::forward::types::{prefix_segments, ForwardRequest, ForwardResult};

/// Issues forwarded requests to the backend.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    api_prefix: Vec<String>,
    timeout: Option<Duration>,
}

impl Forwarder {
    /// Create a forwarder that places `api_prefix` before every forwarded path.
    ///
    /// `timeout` bounds the whole outbound exchange; `None` leaves the
    /// client default in place.
    pub fn new(api_prefix: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        // Redirects are relayed to the caller, not followed.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(client, api_prefix, timeout))
    }

    pub fn with_client(client: reqwest::Client, api_prefix: &str, timeout: Option<Duration>) -> Self {
        Self {
            client,
            api_prefix: prefix_segments(api_prefix),
            timeout,
        }
    }

    /// Send one request and buffer the backend's answer.
    ///
    /// Non-2xx statuses are results, not errors. Only failures to reach the
    /// backend or read its answer become [`TransportError`].
    pub async fn forward(&self, request: ForwardRequest) -> Result<ForwardResult, TransportError> {
        let url = request.target_url(&self.api_prefix)?;

        let mut builder = self
            .client
            .request(request.method.as_method(), url)
            .headers(request.headers);
        if request.method.carries_body() {
            builder = builder.body(request.body.unwrap_or_default());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let outbound = tokio::spawn(async move {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(ForwardResult {
                status,
                headers,
                body,
            })
        });

        match outbound.await {
            Ok(result) => result.map_err(TransportError::from),
            Err(e) => Err(TransportError::new(TransportErrorKind::Aborted, e.to_string()).with_cause(e)),
        }
    }
}
