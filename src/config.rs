// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the intake service.
//!
//! Loaded from environment variables at startup. A missing signing secret
//! is fatal in production; outside production a fixed development-only
//! value is substituted so local setups work without ceremony.

use crate::limiter::Quota;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Known constant used when no signing secret is configured outside
/// production. Never reaches a production process; `from_env` refuses to
/// start instead.
pub const DEV_SIGNING_SECRET: &str = "development-secret";

/// Deployment environment, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Deployment environment (default: development)
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// HMAC signing secret for OTP session tokens. Required in production.
    #[serde(default)]
    pub signing_secret: Option<String>,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// OTP issuance configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Form relay configuration
    #[serde(default)]
    pub relay: RelayConfig,

    /// Email configuration
    #[serde(default)]
    pub email: EmailConfig,
}

/// Per-endpoint request budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Fraud-report submissions per hour per IP (default: 5)
    #[serde(default = "default_fraud_report_per_hour")]
    pub fraud_report_per_hour: u32,

    /// Contact submissions per hour per IP (default: 10)
    #[serde(default = "default_contact_per_hour")]
    pub contact_per_hour: u32,

    /// OTP requests per window per `ip:email` (default: 5)
    #[serde(default = "default_otp_max_requests")]
    pub otp_max_requests: u32,

    /// OTP request window in seconds (default: 600)
    #[serde(default = "default_otp_window_secs")]
    pub otp_window_secs: u64,
}

/// OTP issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// Session token lifetime in seconds (default: 600)
    #[serde(default = "default_otp_ttl_secs")]
    pub ttl_secs: u64,

    /// Number of code digits (default: 6)
    #[serde(default = "default_otp_code_length")]
    pub code_length: usize,
}

/// Form relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Web3Forms-style access key; submissions 503 without one
    #[serde(default)]
    pub access_key: Option<String>,

    /// Relay endpoint (default: https://api.web3forms.com/submit)
    #[serde(default = "default_relay_endpoint")]
    pub endpoint: String,
}

/// Email dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Resend-style API key; OTP issuance 500s without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender address (default: noreply@fortivault.com)
    #[serde(default = "default_email_from")]
    pub from: String,
}

/// Diagnostics view backing `/api/env-health`. Reports which collaborators
/// are configured; never echoes secret values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStatus {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub configured_services: Vec<&'static str>,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_fraud_report_per_hour() -> u32 {
    5
}

fn default_contact_per_hour() -> u32 {
    10
}

fn default_otp_max_requests() -> u32 {
    5
}

fn default_otp_window_secs() -> u64 {
    600
}

fn default_otp_ttl_secs() -> u64 {
    crate::otp::OTP_TTL_SECONDS
}

fn default_otp_code_length() -> usize {
    6
}

fn default_relay_endpoint() -> String {
    "https://api.web3forms.com/submit".to_string()
}

fn default_email_from() -> String {
    "noreply@fortivault.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            environment: default_environment(),
            signing_secret: None,
            rate_limit: RateLimitConfig::default(),
            otp: OtpConfig::default(),
            relay: RelayConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            fraud_report_per_hour: default_fraud_report_per_hour(),
            contact_per_hour: default_contact_per_hour(),
            otp_max_requests: default_otp_max_requests(),
            otp_window_secs: default_otp_window_secs(),
        }
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl_secs(),
            code_length: default_otp_code_length(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            endpoint: default_relay_endpoint(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from: default_email_from(),
        }
    }
}

impl RateLimitConfig {
    pub fn fraud_report_quota(&self) -> Quota {
        Quota::per_hour(self.fraud_report_per_hour)
    }

    pub fn contact_quota(&self) -> Quota {
        Quota::per_hour(self.contact_per_hour)
    }

    pub fn otp_quota(&self) -> Quota {
        Quota::new(Duration::from_secs(self.otp_window_secs), self.otp_max_requests)
    }

    /// Longest configured window; the cleanup task's retention bound.
    pub fn longest_window(&self) -> Duration {
        Duration::from_secs(self.otp_window_secs.max(3600))
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails when `APP_ENV=production` and `OTP_SIGNING_SECRET` is unset
    /// or blank, or when the relay endpoint override is not a valid URL.
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = match env_var("APP_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let signing_secret = env_var("OTP_SIGNING_SECRET");
        if environment.is_production() && signing_secret.is_none() {
            bail!("OTP_SIGNING_SECRET must be set in production");
        }

        let config = Self {
            bind_addr: env_var("BIND_ADDR").unwrap_or_else(default_bind_addr),
            environment,
            signing_secret,
            rate_limit: RateLimitConfig {
                fraud_report_per_hour: env_parse("FRAUD_REPORT_PER_HOUR")
                    .unwrap_or_else(default_fraud_report_per_hour),
                contact_per_hour: env_parse("CONTACT_PER_HOUR")
                    .unwrap_or_else(default_contact_per_hour),
                otp_max_requests: env_parse("OTP_MAX_REQUESTS")
                    .unwrap_or_else(default_otp_max_requests),
                otp_window_secs: env_parse("OTP_WINDOW_SECS")
                    .unwrap_or_else(default_otp_window_secs),
            },
            otp: OtpConfig {
                ttl_secs: env_parse("OTP_TTL_SECS").unwrap_or_else(default_otp_ttl_secs),
                code_length: default_otp_code_length(),
            },
            relay: RelayConfig {
                access_key: env_var("WEB3FORMS_API_KEY"),
                endpoint: env_var("WEB3FORMS_ENDPOINT").unwrap_or_else(default_relay_endpoint),
            },
            email: EmailConfig {
                api_key: env_var("RESEND_API_KEY"),
                from: env_var("RESEND_FROM_EMAIL").unwrap_or_else(default_email_from),
            },
        };

        config.relay.endpoint_url()?;
        Ok(config)
    }

    /// The token signing secret, with the fixed development fallback
    /// applied outside production. `from_env` guarantees the fallback is
    /// unreachable in a production process.
    pub fn signing_secret(&self) -> &str {
        self.signing_secret.as_deref().unwrap_or(DEV_SIGNING_SECRET)
    }

    /// Collaborator diagnostics for `/api/env-health`.
    pub fn status(&self) -> ConfigStatus {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut configured_services = Vec::new();

        if is_blank(self.relay.access_key.as_deref()) {
            errors.push("WEB3FORMS_API_KEY is missing - required for form submissions".to_string());
        } else {
            configured_services.push("forms");
        }

        if self.environment.is_production() && is_blank(self.signing_secret.as_deref()) {
            errors.push("OTP_SIGNING_SECRET is missing - required in production".to_string());
        } else if self.signing_secret.is_some() {
            configured_services.push("security");
        }

        if is_blank(self.email.api_key.as_deref()) {
            warnings.push(
                "No email service configured - set RESEND_API_KEY for email functionality"
                    .to_string(),
            );
        } else {
            configured_services.push("email");
        }

        ConfigStatus {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            configured_services,
        }
    }
}

impl RelayConfig {
    pub fn endpoint_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.endpoint)
            .with_context(|| format!("invalid relay endpoint: {}", self.endpoint))
    }

    /// True when an access key is present and non-blank.
    pub fn is_configured(&self) -> bool {
        !is_blank(self.access_key.as_deref())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Read an environment variable, treating blank values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.rate_limit.fraud_report_per_hour, 5);
        assert_eq!(config.rate_limit.contact_per_hour, 10);
        assert_eq!(config.rate_limit.otp_max_requests, 5);
        assert_eq!(config.rate_limit.otp_window_secs, 600);
        assert_eq!(config.otp.ttl_secs, 600);
        assert_eq!(config.otp.code_length, 6);
    }

    #[test]
    fn test_dev_secret_fallback() {
        let config = Config::default();
        assert!(!config.environment.is_production());
        assert_eq!(config.signing_secret(), DEV_SIGNING_SECRET);

        let config = Config {
            signing_secret: Some("real-secret".to_string()),
            ..Config::default()
        };
        assert_eq!(config.signing_secret(), "real-secret");
    }

    #[test]
    fn test_status_reports_missing_relay_key() {
        let status = Config::default().status();
        assert!(!status.is_valid);
        assert!(status.errors.iter().any(|e| e.contains("WEB3FORMS_API_KEY")));
        assert!(!status.warnings.is_empty());
    }

    #[test]
    fn test_status_valid_when_configured() {
        let config = Config {
            relay: RelayConfig {
                access_key: Some("key".to_string()),
                ..RelayConfig::default()
            },
            email: EmailConfig {
                api_key: Some("key".to_string()),
                ..EmailConfig::default()
            },
            signing_secret: Some("secret".to_string()),
            ..Config::default()
        };
        let status = config.status();
        assert!(status.is_valid);
        assert_eq!(status.configured_services, vec!["forms", "security", "email"]);
    }

    #[test]
    fn test_production_status_flags_missing_secret() {
        let config = Config {
            environment: Environment::Production,
            relay: RelayConfig {
                access_key: Some("key".to_string()),
                ..RelayConfig::default()
            },
            ..Config::default()
        };
        let status = config.status();
        assert!(!status.is_valid);
        assert!(status.errors.iter().any(|e| e.contains("OTP_SIGNING_SECRET")));
    }

    #[test]
    fn test_quota_helpers() {
        let limits = RateLimitConfig::default();
        assert_eq!(limits.fraud_report_quota().max_requests, 5);
        assert_eq!(limits.fraud_report_quota().window, Duration::from_secs(3600));
        assert_eq!(limits.otp_quota().window, Duration::from_secs(600));
        assert_eq!(limits.longest_window(), Duration::from_secs(3600));
    }
}
