//! Response relay: backend result → client response.
//!
//! Two shapes, one per caller:
//! - [`passthrough`] for the catch-all route: status, headers and body as
//!   the backend sent them, minus hop-by-hop headers
//! - [`envelope`] for the named proxy: HTTP 200 with a JSON
//!   `{status, data, headers}` document describing the backend answer

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::forward::ForwardResult;
use crate::security::strip_hop_by_hop;

/// JSON document returned by the named proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEnvelope {
    /// Backend status code.
    pub status: u16,
    /// Backend body as text.
    pub data: String,
    /// Backend headers, repeated values joined with `", "`.
    pub headers: BTreeMap<String, String>,
}

impl From<ForwardResult> for ProxyEnvelope {
    fn from(result: ForwardResult) -> Self {
        Self {
            status: result.status.as_u16(),
            data: String::from_utf8_lossy(&result.body).into_owned(),
            headers: header_object(&result.headers),
        }
    }
}

/// Relay the backend answer unchanged.
pub fn passthrough(result: ForwardResult) -> Response {
    let ForwardResult {
        status,
        mut headers,
        body,
    } = result;
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Wrap the backend answer in a [`ProxyEnvelope`].
pub fn envelope(result: ForwardResult) -> Response {
    Json(ProxyEnvelope::from(result)).into_response()
}

fn header_object(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut object = BTreeMap::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        object.insert(name.as_str().to_string(), joined);
    }
    object
}
