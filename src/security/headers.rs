//! Header filtering between the client and the backend.
//!
//! # Responsibilities
//! - Strip `host` so the backend sees its own authority
//! - Strip hop-by-hop headers, including any named by `Connection`
//! - Optionally replace the caller's credential with a trusted one
//!
//! Filtering is idempotent: running a filtered map through the same policy
//! again yields the same map.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

/// Connection-scoped headers that must not cross the gateway.
const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    KEEP_ALIVE,
    PROXY_CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers and `content-length` in place.
///
/// Bodies are buffered on both legs, so the length is always recomputed by
/// whoever writes the next message.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove(header::CONTENT_LENGTH);
}

/// Policy applied to inbound headers before they are forwarded.
#[derive(Debug, Clone, Default)]
pub struct HeaderPolicy {
    authorization: Option<HeaderValue>,
}

impl HeaderPolicy {
    /// Forward the caller's headers, credential included.
    pub fn passthrough() -> Self {
        Self::default()
    }

    /// Present `Bearer <token>` to the backend regardless of what the caller sent.
    pub fn trusted(token: &str) -> Result<Self, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        Ok(Self {
            authorization: Some(value),
        })
    }

    /// True when this policy rewrites `authorization`.
    pub fn overrides_authorization(&self) -> bool {
        self.authorization.is_some()
    }

    /// Produce the header set to forward.
    pub fn filter(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = inbound.clone();
        headers.remove(header::HOST);
        strip_hop_by_hop(&mut headers);

        if let Some(value) = &self.authorization {
            headers.insert(header::AUTHORIZATION, value.clone());
        }
        headers
    }
}
