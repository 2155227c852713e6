// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Form relay collaborator.
//!
//! Accepted submissions are forwarded to a Web3Forms-style endpoint as
//! multipart form fields. The trait seam lets handlers and tests run
//! against a stub instead of the live service.
//!
//! Error variants carry the user-facing wording; handlers map them to
//! response codes without inventing new messages.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

/// Upstream request timeout. The original site aborts at ten seconds.
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid submission data. Please check your information and try again.")]
    Rejected,

    #[error("Server authentication failed. Please contact support.")]
    AuthFailed,

    #[error("Files are too large. Please reduce file sizes and try again.")]
    PayloadTooLarge,

    #[error("Too many submissions. Please wait a moment and try again.")]
    Throttled,

    #[error("The submission service is temporarily unavailable. Please try again in a few moments.")]
    Unavailable,

    #[error("Invalid response from submission service.")]
    BadResponse,

    /// Upstream accepted the request but refused the submission.
    #[error("{0}")]
    Refused(String),
}

impl RelayError {
    /// HTTP status the handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rejected | Self::Refused(_) => 400,
            Self::PayloadTooLarge => 413,
            Self::Throttled => 429,
            Self::BadResponse => 500,
            Self::AuthFailed | Self::Unavailable => 503,
        }
    }
}

/// One submission's worth of relay fields.
#[derive(Debug, Clone)]
pub struct RelaySubmission {
    pub form_name: &'static str,
    pub fields: Vec<(&'static str, String)>,
}

impl RelaySubmission {
    pub fn new(form_name: &'static str) -> Self {
        Self {
            form_name,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }
}

#[async_trait]
pub trait FormRelay: Send + Sync {
    async fn submit(&self, submission: RelaySubmission) -> Result<(), RelayError>;
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Live relay posting to the configured Web3Forms-style endpoint.
pub struct Web3FormsRelay {
    client: reqwest::Client,
    endpoint: Url,
    access_key: String,
}

impl Web3FormsRelay {
    pub fn new(endpoint: Url, access_key: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(RELAY_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            access_key,
        })
    }
}

#[async_trait]
impl FormRelay for Web3FormsRelay {
    async fn submit(&self, submission: RelaySubmission) -> Result<(), RelayError> {
        let mut form = reqwest::multipart::Form::new()
            .text("access_key", self.access_key.clone())
            .text("form_name", submission.form_name);
        for (name, value) in submission.fields {
            form = form.text(name, value);
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.endpoint, "relay request failed");
                RelayError::Unavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "relay returned error status");
            return Err(match status.as_u16() {
                400 => RelayError::Rejected,
                401 | 403 => RelayError::AuthFailed,
                413 => RelayError::PayloadTooLarge,
                429 => RelayError::Throttled,
                _ => RelayError::Unavailable,
            });
        }

        let body: RelayResponse = response.json().await.map_err(|e| {
            error!(error = %e, "relay response was not valid JSON");
            RelayError::BadResponse
        })?;

        if !body.success {
            error!(message = ?body.message, "relay refused submission");
            return Err(RelayError::Refused(body.message.unwrap_or_else(|| {
                "Submission failed. Please try again.".to_string()
            })));
        }

        info!(form_name = submission.form_name, "relay accepted submission");
        Ok(())
    }
}
