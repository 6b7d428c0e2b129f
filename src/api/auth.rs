use crate::api::types::{AuthRequest, AuthResponse};
use crate::utils::config::ServiceConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The service answered with a non-success status. No token is returned.
    #[error("auth failed: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("auth request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Thin client for the `/auth` token endpoint.
pub struct AuthClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }

    /// Exchange credentials for a bearer token. Either the full token comes
    /// back or an error does; a partial token is never returned.
    pub async fn login(&self, payload: &AuthRequest) -> Result<String, AuthError> {
        let res = self
            .http
            .post(self.config.url("/auth"))
            .json(payload)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            let body: AuthResponse = res.json().await?;
            return Ok(body.token);
        }
        let body = res
            .text()
            .await
            .unwrap_or_else(|_| "<no-body>".to_string());
        Err(AuthError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
