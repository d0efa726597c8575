//! Remote onboarding-status check.
//!
//! The backend answers `GET /api/onboarding/status` with
//! `{"completed": bool, "isFirstTime": bool}`. The visibility policy treats
//! the answer as advisory; everything here just reports what happened.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::StatusClientConfig;
use crate::error::StatusError;

/// Path of the status endpoint relative to the backend base URL.
pub const STATUS_PATH: &str = "/api/onboarding/status";

/// What the backend knows about the user's onboarding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingStatus {
    pub completed: bool,
    pub is_first_time: bool,
}

/// Anything that can answer the status question.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<OnboardingStatus, StatusError>;
}

/// reqwest-backed status client.
pub struct HttpStatusClient {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<SecretString>,
}

impl HttpStatusClient {
    pub fn new(config: StatusClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: StatusClientConfig) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), STATUS_PATH),
            auth_token: config.auth_token,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatusSource for HttpStatusClient {
    async fn fetch_status(&self) -> Result<OnboardingStatus, StatusError> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::HttpStatus {
                status: status.as_u16(),
            });
        }

        response
            .json::<OnboardingStatus>()
            .await
            .map_err(|e| StatusError::InvalidResponse(e.to_string()))
    }
}
