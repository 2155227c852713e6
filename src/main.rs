// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Fortivault Intake Service
//!
//! Lead-intake backend for the Fortivault site: fraud-report and
//! contact-form submission endpoints with per-endpoint rate limiting, plus
//! the OTP email-verification flow.
//!
//! ## Configuration
//!
//! Loaded from environment variables:
//!
//! - `BIND_ADDR`: server bind address (default: 0.0.0.0:8080)
//! - `APP_ENV`: `production` enables the strict secret requirement
//! - `OTP_SIGNING_SECRET`: token signing secret (required in production)
//! - `WEB3FORMS_API_KEY`: relay access key for form submissions
//! - `RESEND_API_KEY` / `RESEND_FROM_EMAIL`: email dispatch
//! - `FRAUD_REPORT_PER_HOUR`, `CONTACT_PER_HOUR`, `OTP_MAX_REQUESTS`,
//!   `OTP_WINDOW_SECS`, `OTP_TTL_SECS`: budget overrides

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fortivault_intake::{
    config::Config,
    email::ResendMailer,
    handlers::{
        env_health, health, send_otp, submit_contact, submit_fraud_report, verify_otp, AppState,
    },
    limiter::RateLimiter,
    otp::OtpSessionManager,
    relay::Web3FormsRelay,
    validator::FormValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration; refuses to start without a production secret
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        environment = ?config.environment,
        fraud_report_per_hour = config.rate_limit.fraud_report_per_hour,
        contact_per_hour = config.rate_limit.contact_per_hour,
        otp_max_requests = config.rate_limit.otp_max_requests,
        "Starting Fortivault intake service"
    );
    let status = config.status();
    for error in &status.errors {
        tracing::error!(%error, "configuration problem");
    }
    for warning in &status.warnings {
        tracing::warn!(%warning, "configuration warning");
    }

    // Create application state
    let endpoint = config.relay.endpoint_url()?;
    let relay = Web3FormsRelay::new(
        endpoint,
        config.relay.access_key.clone().unwrap_or_default(),
    )
    .context("failed to build relay client")?;
    let mailer = ResendMailer::new(
        config.email.api_key.clone().unwrap_or_default(),
        config.email.from.clone(),
    )
    .context("failed to build mail client")?;

    let state = Arc::new(AppState {
        limiter: RateLimiter::new(),
        otp: OtpSessionManager::new(config.signing_secret().as_bytes().to_vec()),
        validator: FormValidator::new(),
        relay: Arc::new(relay),
        mailer: Arc::new(mailer),
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state
                .limiter
                .cleanup(cleanup_state.config.rate_limit.longest_window())
                .await;
        }
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/env-health", get(env_health))
        .route("/api/send-otp", post(send_otp))
        .route("/api/verify-otp", post(verify_otp))
        .route("/api/submit/fraud-report", post(submit_fraud_report))
        .route("/api/submit/contact", post(submit_contact))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
