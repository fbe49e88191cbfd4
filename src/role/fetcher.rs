//! Role endpoint client.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use url::Url;

use crate::role::{Requester, RoleError, UserRole};

/// Path of the role endpoint on the gateway.
pub const ROLE_ENDPOINT_PATH: [&str; 4] = ["api", "v1", "user", "role"];

/// Fetches the role for one requester.
///
/// The returned future owns everything it needs so the cache can run it on
/// its own task.
pub trait RoleFetcher: Send + Sync {
    fn fetch(&self, requester: &Requester) -> BoxFuture<'static, Result<UserRole, RoleError>>;
}

/// `GET {gateway}/api/v1/user/role` with the requester's bearer token.
#[derive(Debug, Clone)]
pub struct HttpRoleFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpRoleFetcher {
    pub fn new(gateway_base: &str) -> Result<Self, RoleError> {
        Self::with_client(reqwest::Client::new(), gateway_base)
    }

    pub fn with_client(client: reqwest::Client, gateway_base: &str) -> Result<Self, RoleError> {
        let mut url = Url::parse(gateway_base).map_err(|e| RoleError::InvalidEndpoint(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RoleError::InvalidEndpoint(format!("'{gateway_base}' cannot be a base URL")))?
            .pop_if_empty()
            .extend(ROLE_ENDPOINT_PATH);
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RoleFetcher for HttpRoleFetcher {
    fn fetch(&self, requester: &Requester) -> BoxFuture<'static, Result<UserRole, RoleError>> {
        let request = self
            .client
            .get(self.url.clone())
            .bearer_auth(&requester.token)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        async move {
            let response = request
                .send()
                .await
                .map_err(|e| RoleError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(RoleError::Status(status.as_u16()));
            }

            response
                .json::<UserRole>()
                .await
                .map_err(|e| RoleError::Decode(e.to_string()))
        }
        .boxed()
    }
}
