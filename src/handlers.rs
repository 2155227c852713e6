// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! HTTP handlers for the intake service.
//!
//! Every submission endpoint runs the same gauntlet: rate limit, parse,
//! validate, relay. OTP endpoints additionally carry the `fv_otp` session
//! cookie. Failure responses never distinguish which verification check
//! failed and never leak internal error detail.

use crate::case_id::{generate_case_id, CASE_ID_PREFIX};
use crate::config::ConfigStatus;
use crate::email::EmailSender;
use crate::limiter::{RateLimitDecision, RateLimiter};
use crate::otp::{OtpSessionManager, OTP_COOKIE_NAME};
use crate::relay::{FormRelay, RelayError, RelaySubmission};
use crate::validator::{ContactForm, FormValidator, FraudReportForm};
use crate::Config;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, header::InvalidHeaderValue, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Uniform wording for every OTP verification failure.
const INVALID_OTP_MESSAGE: &str = "Code invalid or expired. Please request a new code.";

const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub otp: OtpSessionManager,
    pub validator: FormValidator,
    pub relay: Arc<dyn FormRelay>,
    pub mailer: Arc<dyn EmailSender>,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Error body for the OTP endpoints.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

/// Error body for the submission endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitError {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Success body for the submission endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSuccess {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendOtpRequest {
    pub email: String,
    pub case_id: String,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    /// Plaintext code, echoed outside production only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub case_id: String,
    pub message: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "fortivault-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Configuration diagnostics endpoint.
pub async fn env_health(State(state): State<Arc<AppState>>) -> Json<ConfigStatus> {
    Json(state.config.status())
}

/// Issue a verification code for a case.
pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Option<Json<SendOtpRequest>>,
) -> Response {
    let Some(Json(req)) = payload else {
        return missing_fields("Email and case ID are required");
    };
    if req.email.trim().is_empty() || req.case_id.trim().is_empty() {
        return missing_fields("Email and case ID are required");
    }

    // OTP issuance is bounded per ip:email so one address cannot drain the
    // budget of a whole NAT, and one IP cannot spam arbitrary addresses.
    let ip = client_ip(&headers, addr);
    let identifier = format!("{ip}:{}", req.email);
    let quota = state.config.rate_limit.otp_quota();
    if let RateLimitDecision::Limited { retry_after } = state.limiter.check(&identifier, quota).await
    {
        info!(%identifier, "otp request rate limited");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", retry_after.as_secs().to_string())],
            Json(ApiError {
                error: "Too many requests. Try again later.".to_string(),
            }),
        )
            .into_response();
    }

    let code = state.otp.generate_code(state.config.otp.code_length);

    if let Err(err) = state.mailer.send_otp(&req.email, &code, &req.case_id).await {
        error!(error = %err, case_id = %req.case_id, "failed to send OTP email");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: "Failed to send OTP email".to_string(),
            }),
        )
            .into_response();
    }

    let ttl = state.config.otp.ttl_secs;
    let token = match state.otp.create_token(&req.email, &req.case_id, &code, ttl) {
        Ok(token) => token,
        Err(err) => {
            error!(error = %err, "failed to create OTP session token");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError {
                    error: "Internal server error".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    match otp_cookie_header(&token, ttl, state.config.environment.is_production()) {
        Ok(cookie) => {
            response_headers.insert(header::SET_COOKIE, cookie);
        }
        Err(err) => warn!(error = %err, "failed to build OTP cookie header"),
    }

    info!(case_id = %req.case_id, "otp issued");
    let echo = (!state.config.environment.is_production()).then_some(code);
    (
        StatusCode::OK,
        response_headers,
        Json(SendOtpResponse {
            success: true,
            message: "OTP sent successfully".to_string(),
            otp: echo,
        }),
    )
        .into_response()
}

/// Verify a code against the `fv_otp` session cookie.
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Option<Json<VerifyOtpRequest>>,
) -> Response {
    let Some(Json(req)) = payload else {
        return missing_fields("Email and code are required");
    };
    if req.email.trim().is_empty() || req.code.trim().is_empty() {
        return missing_fields("Email and code are required");
    }

    // All failures below collapse to one answer; a caller probing the
    // endpoint cannot tell a bad cookie from a wrong code.
    let Some(token) = otp_cookie(&headers) else {
        debug!("otp verification without session cookie");
        return verification_denied();
    };
    let Some(session) = state.otp.verify_token(&token) else {
        return verification_denied();
    };
    if !session.email.eq_ignore_ascii_case(&req.email) {
        debug!("otp verification against mismatched email");
        return verification_denied();
    }
    if !state.otp.verify_code(&req.code, &session.hash) {
        return verification_denied();
    }

    info!(case_id = %session.case_id, "email verified");

    // Confirmation is best-effort; verification already succeeded.
    let mailer = state.mailer.clone();
    let email = session.email.clone();
    let case_id = session.case_id.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send_confirmation(&email, &case_id).await {
            warn!(error = %err, %case_id, "failed to send confirmation email");
        }
    });

    (
        StatusCode::OK,
        Json(VerifyOtpResponse {
            success: true,
            case_id: session.case_id,
            message: "Email verified successfully".to_string(),
        }),
    )
        .into_response()
}

/// Accept a fraud-report submission and forward it to the relay.
pub async fn submit_fraud_report(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let client_ip = client_ip(&headers, addr);

    if !state.config.relay.is_configured() {
        error!("fraud report rejected: relay access key is not configured");
        return config_error_response();
    }

    if let RateLimitDecision::Limited { retry_after } = state
        .limiter
        .check(&client_ip, state.config.rate_limit.fraud_report_quota())
        .await
    {
        info!(ip = %client_ip, "fraud report rate limited");
        return rate_limited_response(retry_after);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.contains("application/json") {
        return (
            StatusCode::BAD_REQUEST,
            Json(SubmitError {
                success: false,
                message: "Invalid content type. Expected application/json.".to_string(),
                code: None,
                errors: None,
            }),
        )
            .into_response();
    }

    let form: FraudReportForm = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(err) => {
            error!(error = %err, "failed to parse fraud report body");
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmitError {
                    success: false,
                    message: "Invalid request format. Please ensure you are sending valid JSON."
                        .to_string(),
                    code: Some("INVALID_JSON"),
                    errors: None,
                }),
            )
                .into_response();
        }
    };

    let violations = state.validator.validate_fraud_report(&form);
    if !violations.is_empty() {
        let errors: Vec<String> = violations.iter().map(ToString::to_string).collect();
        info!(?errors, "fraud report validation failed");
        return validation_error_response(errors);
    }

    let user_agent = header_str(&headers, header::USER_AGENT);
    let submission = RelaySubmission::new("fraud-report")
        .field("fullName", form.full_name.clone())
        .field("contactEmail", form.contact_email.clone())
        .field("contactPhone", form.contact_phone.clone())
        .field("scamType", form.scam_type.clone())
        .field("amount", form.amount.clone())
        .field("currency", form.currency.clone())
        .field("timeline", form.timeline.clone())
        .field("description", form.description.clone())
        .field(
            "transactionHashes",
            serde_json::to_string(&form.transaction_hashes).unwrap_or_default(),
        )
        .field(
            "bankReferences",
            serde_json::to_string(&form.bank_references).unwrap_or_default(),
        )
        .field("filesCount", form.files_count.to_string())
        .field("clientIp", client_ip.clone())
        .field("userAgent", user_agent)
        .field("submittedAt", Utc::now().to_rfc3339());

    if let Err(err) = state.relay.submit(submission).await {
        return relay_error_response(err);
    }

    let case_id = generate_case_id(CASE_ID_PREFIX);
    info!(%case_id, email = %form.contact_email, "fraud report accepted");

    (
        StatusCode::CREATED,
        Json(SubmitSuccess {
            success: true,
            case_id: Some(case_id),
            message: "Fraud report received successfully. We will review your case shortly."
                .to_string(),
            files_processed: Some(form.files_count),
        }),
    )
        .into_response()
}

/// Accept a contact-form submission and forward it to the relay.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.config.relay.is_configured() {
        error!("contact submission rejected: relay access key is not configured");
        return config_error_response();
    }

    let client_ip = client_ip(&headers, addr);
    if let RateLimitDecision::Limited { retry_after } = state
        .limiter
        .check(&client_ip, state.config.rate_limit.contact_quota())
        .await
    {
        info!(ip = %client_ip, "contact submission rate limited");
        return rate_limited_response(retry_after);
    }

    let form: ContactForm = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(err) => {
            error!(error = %err, "failed to parse contact body");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitError {
                    success: false,
                    message: "Internal server error. Please try again later.".to_string(),
                    code: None,
                    errors: None,
                }),
            )
                .into_response();
        }
    };

    let violations = state.validator.validate_contact(&form);
    if !violations.is_empty() {
        let errors: Vec<String> = violations.iter().map(ToString::to_string).collect();
        info!(?errors, "contact validation failed");
        return validation_error_response(errors);
    }

    let user_agent = header_str(&headers, header::USER_AGENT);
    let mut submission = RelaySubmission::new("contact")
        .field("name", form.name.trim().to_string())
        .field("email", form.email.trim().to_string())
        .field("subject", form.subject.trim().to_string())
        .field("message", form.message.trim().to_string());
    if !form.phone.trim().is_empty() {
        submission = submission.field("phone", form.phone.trim().to_string());
    }
    submission = submission
        .field("clientIp", client_ip.clone())
        .field("userAgent", user_agent)
        .field("submittedAt", Utc::now().to_rfc3339());

    if let Err(err) = state.relay.submit(submission).await {
        return relay_error_response(err);
    }

    info!(email = %form.email, "contact message accepted");
    (
        StatusCode::CREATED,
        Json(SubmitSuccess {
            success: true,
            case_id: None,
            message: "Your message has been received. We'll get back to you shortly.".to_string(),
            files_processed: None,
        }),
    )
        .into_response()
}

/// Client IP: first hop of `x-forwarded-for`, then `x-real-ip`, then the
/// socket peer.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

/// Pull the `fv_otp` cookie out of the Cookie header, if present.
fn otp_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .map(str::trim)
        .find_map(|c| {
            c.strip_prefix(OTP_COOKIE_NAME)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .map(str::to_string)
}

/// Build the `Set-Cookie` value for an OTP session token.
fn otp_cookie_header(
    token: &str,
    ttl_secs: u64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{OTP_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

fn missing_fields(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn verification_denied() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiError {
            error: INVALID_OTP_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

fn config_error_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(SubmitError {
            success: false,
            message: "WEB3FORMS_API_KEY is not configured. Contact support if this persists."
                .to_string(),
            code: Some("CONFIG_ERROR"),
            errors: None,
        }),
    )
        .into_response()
}

fn rate_limited_response(retry_after: Duration) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [("Retry-After", retry_after.as_secs().to_string())],
        Json(SubmitError {
            success: false,
            message: RATE_LIMITED_MESSAGE.to_string(),
            code: None,
            errors: None,
        }),
    )
        .into_response()
}

fn validation_error_response(errors: Vec<String>) -> Response {
    let message = errors
        .first()
        .cloned()
        .unwrap_or_else(|| "Validation failed".to_string());
    (
        StatusCode::BAD_REQUEST,
        Json(SubmitError {
            success: false,
            message,
            code: Some("VALIDATION_ERROR"),
            errors: Some(errors),
        }),
    )
        .into_response()
}

fn relay_error_response(err: RelayError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    (
        status,
        Json(SubmitError {
            success: false,
            message: err.to_string(),
            code: Some("SUBMISSION_SERVICE_ERROR"),
            errors: None,
        }),
    )
        .into_response()
}
