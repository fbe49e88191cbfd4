//! Route dispatch: inbound request shape → forwarded backend call.
//!
//! # Responsibilities
//! - Turn catch-all paths into backend path segments
//! - Resolve named endpoints and enforce the trusted credential
//! - Validate upload bodies before anything leaves the gateway
//! - Report backend outcomes to the event sink

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::header::{self, HeaderMap, HeaderValue};
use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, ServerError};
use crate::forward::{ForwardMethod, ForwardRequest, ForwardResult, Forwarder};
use crate::observability::{EventSink, GatewayEvent, Route};
use crate::routing::endpoint::{NamedEndpoint, DEFAULT_READ_ENDPOINT, DEFAULT_WRITE_ENDPOINT};
use crate::security::HeaderPolicy;

/// Content types the named upload accepts and forwards untouched.
const FORM_CONTENT_TYPES: [&str; 2] = ["multipart/form-data", "application/x-www-form-urlencoded"];

/// Maps inbound calls onto backend targets and forwards them.
pub struct Dispatcher {
    forwarder: Forwarder,
    backend_base: Url,
    named_base: Url,
    passthrough: HeaderPolicy,
    trusted: HeaderPolicy,
    sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    /// Build a dispatcher from validated configuration.
    pub fn from_config(config: &GatewayConfig, sink: Arc<dyn EventSink>) -> Result<Self, ServerError> {
        let timeout = config.timeouts.upstream_secs.map(Duration::from_secs);
        let forwarder = Forwarder::new(&config.backend.api_prefix, timeout)?;

        let backend_base = parse_base("backend.base_url", &config.backend.base_url)?;
        let named_base = parse_base("named_proxy.base_url", config.named_base_url())?;
        let trusted = HeaderPolicy::trusted(&config.named_proxy.bearer_token).map_err(|e| {
            ServerError::Invalid {
                field: "named_proxy.bearer_token",
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            forwarder,
            backend_base,
            named_base,
            passthrough: HeaderPolicy::passthrough(),
            trusted,
            sink,
        })
    }

    /// Forward a catch-all request: the path after the gateway prefix maps
    /// onto the backend's API path one segment at a time.
    ///
    /// `path` is still percent-encoded; each segment is decoded on its own.
    pub async fn catch_all(
        &self,
        method: ForwardMethod,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: Option<Bytes>,
    ) -> Result<ForwardResult, GatewayError> {
        let request = ForwardRequest::new(method, self.backend_base.clone(), split_path(path)?)
            .query(query.map(str::to_string))
            .headers(self.passthrough.filter(headers))
            .body(body);

        self.dispatch(Route::CatchAll, request).await
    }

    /// Forward a named read with the trusted credential.
    ///
    /// None of the caller's headers are sent, only `content-type` and
    /// `authorization`.
    pub async fn named_read(&self, endpoint: Option<&str>) -> Result<ForwardResult, GatewayError> {
        let endpoint = NamedEndpoint::resolve(endpoint, DEFAULT_READ_ENDPOINT)?;

        let request = ForwardRequest::new(ForwardMethod::Get, self.named_base.clone(), endpoint.into_segments())
            .headers(self.trusted_headers(HeaderValue::from_static("application/json")));

        self.dispatch(Route::NamedRead, request).await
    }

    /// Forward a form upload byte-for-byte with the trusted credential.
    ///
    /// The caller's `content-type` (and with it the multipart boundary)
    /// travels with the body; the form is never re-encoded. Other caller
    /// headers stay behind.
    pub async fn named_upload(
        &self,
        endpoint: Option<&str>,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<ForwardResult, GatewayError> {
        let endpoint = NamedEndpoint::resolve(endpoint, DEFAULT_WRITE_ENDPOINT)?;
        let content_type = check_form_content_type(headers)?;

        let request = ForwardRequest::new(ForwardMethod::Post, self.named_base.clone(), endpoint.into_segments())
            .headers(self.trusted_headers(content_type))
            .body(Some(body));

        self.dispatch(Route::NamedUpload, request).await
    }

    fn trusted_headers(&self, content_type: HeaderValue) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type);
        self.trusted.filter(&headers)
    }

    async fn dispatch(&self, route: Route, request: ForwardRequest) -> Result<ForwardResult, GatewayError> {
        let method = request.method.as_method();
        let target = request.path_suffix.join("/");
        let start = Instant::now();

        match self.forwarder.forward(request).await {
            Ok(result) => {
                self.sink.emit(&GatewayEvent::Forwarded {
                    route,
                    method: method.as_str(),
                    status: result.status.as_u16(),
                    elapsed: start.elapsed(),
                });
                Ok(result)
            }
            Err(error) => {
                self.sink.emit(&GatewayEvent::UpstreamFailed {
                    route,
                    method: method.as_str(),
                    target: &target,
                    error: &error,
                });
                Err(GatewayError::Transport(error))
            }
        }
    }
}

fn parse_base(field: &'static str, raw: &str) -> Result<Url, ServerError> {
    Url::parse(raw).map_err(|e| ServerError::Invalid {
        field,
        message: e.to_string(),
    })
}

/// Split a raw catch-all path into decoded segments, order preserved.
///
/// Splitting happens before decoding, so `a%2Fb` stays one segment.
fn split_path(path: &str) -> Result<Vec<String>, GatewayError> {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| {
            percent_decode_str(segment)
                .decode_utf8()
                .map(Cow::into_owned)
                .map_err(|_| GatewayError::validation(format!("path segment '{segment}' is not valid UTF-8")))
        })
        .collect()
}

/// Returns the validated `content-type` to forward.
fn check_form_content_type(headers: &HeaderMap) -> Result<HeaderValue, GatewayError> {
    let value = headers
        .get(header::CONTENT_TYPE)
        .ok_or_else(|| GatewayError::validation("upload requires a form content type"))?;
    let content_type = value
        .to_str()
        .map_err(|_| GatewayError::validation("upload requires a form content type"))?;

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !FORM_CONTENT_TYPES.contains(&mime.as_str()) {
        return Err(GatewayError::validation(format!(
            "unsupported upload content type '{mime}'"
        )));
    }
    if mime == "multipart/form-data" && !content_type.to_ascii_lowercase().contains("boundary=") {
        return Err(GatewayError::validation("multipart upload is missing its boundary"));
    }
    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MemorySink;

    fn dispatcher(base_url: &str, sink: Arc<MemorySink>) -> Dispatcher {
        let mut config = GatewayConfig::default();
        config.backend.base_url = base_url.to_string();
        config.timeouts.upstream_secs = Some(2);
        Dispatcher::from_config(&config, sink).unwrap()
    }

    fn content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("jobs/42").unwrap(), ["jobs", "42"]);
        assert_eq!(split_path("/jobs/42/").unwrap(), ["jobs", "42", ""]);
        assert_eq!(split_path("single").unwrap(), ["single"]);
    }

    #[test]
    fn test_split_path_decodes_each_segment() {
        assert_eq!(split_path("/files/a%2Fb").unwrap(), ["files", "a/b"]);
        assert_eq!(split_path("/files/a%20b/c").unwrap(), ["files", "a b", "c"]);
        assert!(matches!(split_path("/files/%FF"), Err(GatewayError::Validation(_))));
    }

    #[test]
    fn test_trusted_headers_carry_nothing_from_caller() {
        let dispatcher = dispatcher("http://127.0.0.1:9", Arc::new(MemorySink::new()));
        let headers = dispatcher.trusted_headers(HeaderValue::from_static("application/json"));

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(headers.contains_key(header::AUTHORIZATION));
    }

    #[test]
    fn test_form_content_types() {
        assert!(check_form_content_type(&content_type("multipart/form-data; boundary=----x")).is_ok());
        assert!(check_form_content_type(&content_type("Multipart/Form-Data; Boundary=abc")).is_ok());
        assert!(check_form_content_type(&content_type("application/x-www-form-urlencoded")).is_ok());

        assert!(check_form_content_type(&content_type("multipart/form-data")).is_err());
        assert!(check_form_content_type(&content_type("application/json")).is_err());
        assert!(check_form_content_type(&HeaderMap::new()).is_err());
    }

    #[tokio::test]
    async fn test_invalid_upload_makes_no_call() {
        let sink = Arc::new(MemorySink::new());
        // Nothing listens here; a network call would surface as upstream_failed.
        let dispatcher = dispatcher("http://127.0.0.1:9", sink.clone());

        let err = dispatcher
            .named_upload(None, &content_type("application/json"), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(sink.names().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = Arc::new(MemorySink::new());
        let dispatcher = dispatcher(&format!("http://{addr}"), sink.clone());

        let err = dispatcher
            .catch_all(ForwardMethod::Get, "jobs/42", None, &HeaderMap::new(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Transport(_)));
        assert_eq!(sink.names(), vec!["upstream_failed"]);
    }
}
