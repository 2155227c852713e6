// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Email collaborator.
//!
//! OTP codes and case confirmations go out through a Resend-style HTTP
//! API. Like the relay, the trait seam keeps handlers testable without a
//! live mail account.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email service is not configured")]
    NotConfigured,

    #[error("email dispatch failed: {0}")]
    Dispatch(String),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send the verification code for a case.
    async fn send_otp(&self, to: &str, code: &str, case_id: &str) -> Result<(), EmailError>;

    /// Confirm that a fraud report was received.
    async fn send_confirmation(&self, to: &str, case_id: &str) -> Result<(), EmailError>;
}

/// Resend-style mailer. An empty API key leaves the mailer in place but
/// every dispatch fails with [`EmailError::NotConfigured`].
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Result<Self, reqwest::Error> {
        if api_key.trim().is_empty() {
            warn!("RESEND_API_KEY is not configured; email dispatch will fail");
        }
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            api_key,
            from,
        })
    }

    async fn send(&self, to: &str, subject: &str, html: String, text: String) -> Result<(), EmailError> {
        if self.api_key.trim().is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "email request failed");
                EmailError::Dispatch(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "email API returned error status");
            return Err(EmailError::Dispatch(format!(
                "email API returned status {status}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send_otp(&self, to: &str, code: &str, case_id: &str) -> Result<(), EmailError> {
        let subject = "Verify Your Email - Fortivault";
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h1>Email Verification Required</h1>\
             <p>Thank you for submitting your fraud report. To proceed with your case, \
             please verify your email address.</p>\
             <p>Your Verification Code:</p>\
             <h2 style=\"letter-spacing: 8px; font-family: monospace;\">{code}</h2>\
             <p><strong>Case ID:</strong> {case_id}<br><strong>Valid for:</strong> 10 minutes</p>\
             <p><strong>Security Notice:</strong> Never share this code with anyone. Our team \
             will never ask for this code via phone or email.</p>\
             <p>Fortivault | Built to protect. Trusted to Secure</p></div>"
        );
        let text = format!(
            "Your Fortivault verification code is {code}. Case ID: {case_id}. \
             Valid for 10 minutes. Never share this code with anyone."
        );
        self.send(to, subject, html, text).await
    }

    async fn send_confirmation(&self, to: &str, case_id: &str) -> Result<(), EmailError> {
        let subject = "Fraud Report Received - Fortivault";
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h1>Fraud Report Confirmation</h1>\
             <p>Thank you for submitting your fraud report to Fortivault. We have successfully \
             received your case and it is now in our system for processing.</p>\
             <p><strong>Case Reference Number:</strong></p>\
             <p style=\"font-family: monospace; font-weight: bold;\">{case_id}</p>\
             <p>Please save this number for your records. Our recovery specialists will review \
             your case within 24 hours and you'll receive updates via email as it progresses.</p>\
             <p>Questions? Contact our support team at support@fortivault.com.</p>\
             <p>Fortivault | Built to protect. Trusted to Secure</p></div>"
        );
        let text = format!(
            "Your fraud report was received. Case reference: {case_id}. \
             Our recovery specialists will review your case within 24 hours."
        );
        self.send(to, subject, html, text).await
    }
}
