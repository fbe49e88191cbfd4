//! Forwarding request and result types.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::forward::error::{TransportError, TransportErrorKind};

/// Methods the gateway forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForwardMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl ForwardMethod {
    /// Whether the inbound body is read and sent along.
    pub fn carries_body(self) -> bool {
        matches!(self, ForwardMethod::Post | ForwardMethod::Put | ForwardMethod::Patch)
    }

    pub fn as_method(self) -> Method {
        match self {
            ForwardMethod::Get => Method::GET,
            ForwardMethod::Post => Method::POST,
            ForwardMethod::Put => Method::PUT,
            ForwardMethod::Patch => Method::PATCH,
            ForwardMethod::Delete => Method::DELETE,
            ForwardMethod::Options => Method::OPTIONS,
        }
    }
}

impl TryFrom<&Method> for ForwardMethod {
    type Error = Method;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET => Ok(ForwardMethod::Get),
            Method::POST => Ok(ForwardMethod::Post),
            Method::PUT => Ok(ForwardMethod::Put),
            Method::PATCH => Ok(ForwardMethod::Patch),
            Method::DELETE => Ok(ForwardMethod::Delete),
            Method::OPTIONS => Ok(ForwardMethod::Options),
            _ => Err(method.clone()),
        }
    }
}

/// One outbound call, created per inbound request.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: ForwardMethod,
    pub target_base: Url,
    /// Unescaped path segments; each is escaped on its own when joined.
    pub path_suffix: Vec<String>,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
    /// Already filtered.
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ForwardRequest {
    pub fn new(method: ForwardMethod, target_base: Url, path_suffix: Vec<String>) -> Self {
        Self {
            method,
            target_base,
            path_suffix,
            query: None,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: Option<Bytes>) -> Self {
        self.body = body;
        self
    }

    /// Compose `base + prefix + suffix`, then the query verbatim.
    ///
    /// A trailing slash on the base is dropped before joining so the
    /// result never carries `//`.
    pub fn target_url(&self, api_prefix: &[String]) -> Result<Url, TransportError> {
        let mut url = self.target_base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TransportError::new(
                    TransportErrorKind::InvalidTarget,
                    format!("'{}' cannot be a base URL", self.target_base),
                )
            })?;
            segments.pop_if_empty();
            segments.extend(api_prefix);
            segments.extend(&self.path_suffix);
        }
        url.set_query(self.query.as_deref());
        Ok(url)
    }
}

/// Split a configured prefix such as `/api/v1` into segments.
pub fn prefix_segments(prefix: &str) -> Vec<String> {
    prefix
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// What the backend answered.
#[derive(Debug, Clone)]
pub struct ForwardResult {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Vec<String> {
        prefix_segments("/api/v1")
    }

    fn request(base: &str, segments: &[&str]) -> ForwardRequest {
        ForwardRequest::new(
            ForwardMethod::Post,
            Url::parse(base).unwrap(),
            segments.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_url_composition() {
        let url = request("http://localhost:8000", &["jobs", "42"]).target_url(&api()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/jobs/42");
    }

    #[test]
    fn test_trailing_slash_not_duplicated() {
        let url = request("http://localhost:8000/", &["jobs"]).target_url(&api()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/jobs");

        let url = request("http://backend/base/", &["jobs"]).target_url(&api()).unwrap();
        assert_eq!(url.as_str(), "http://backend/base/api/v1/jobs");
    }

    #[test]
    fn test_segments_escaped_individually() {
        let url = request("http://localhost:8000", &["files", "a b", "c/d", "e?f"])
            .target_url(&api())
            .unwrap();
        assert_eq!(url.path(), "/api/v1/files/a%20b/c%2Fd/e%3Ff");
    }

    #[test]
    fn test_query_appended_verbatim() {
        let url = request("http://localhost:8000", &["products"])
            .query(Some("page=2&sort=-created&q=a%20b".into()))
            .target_url(&api())
            .unwrap();
        assert_eq!(url.query(), Some("page=2&sort=-created&q=a%20b"));
    }

    #[test]
    fn test_query_apostrophe_is_escaped() {
        // `Url` escapes `'` in special-scheme queries; other bytes pass through.
        let url = request("http://localhost:8000", &["people"])
            .query(Some("name=o'brien&tag={x}".into()))
            .target_url(&api())
            .unwrap();
        assert_eq!(url.query(), Some("name=o%27brien&tag={x}"));
    }

    #[test]
    fn test_empty_query_dropped() {
        let url = request("http://localhost:8000", &["health"])
            .query(Some(String::new()))
            .target_url(&api())
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/health");
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(ForwardMethod::try_from(&Method::PATCH), Ok(ForwardMethod::Patch));
        assert_eq!(ForwardMethod::try_from(&Method::HEAD), Err(Method::HEAD));
        assert!(ForwardMethod::Put.carries_body());
        assert!(!ForwardMethod::Delete.carries_body());
        assert_eq!(ForwardMethod::Options.as_method(), Method::OPTIONS);
    }
}
