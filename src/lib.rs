// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Fortivault Intake Service
//!
//! This crate provides the lead-intake backend for the Fortivault site:
//! fraud-report and contact-form submission endpoints, plus an email
//! verification flow built on short-lived one-time passcodes.
//!
//! - Per-endpoint fixed-window rate limiting (5/hour fraud reports,
//!   10/hour contact messages, 5/10 min OTP requests per `ip:email`)
//! - OTP session tokens: Argon2id-hashed codes packaged into an
//!   HMAC-SHA256-signed, self-contained cookie token (no session store)
//! - Server-side form validation mirroring the submission wizard
//! - Relay of accepted submissions to the Web3Forms-style upstream
//! - OTP and confirmation email dispatch through a Resend-style API

pub mod case_id;
pub mod config;
pub mod email;
pub mod handlers;
pub mod limiter;
pub mod otp;
pub mod relay;
pub mod validator;

pub use config::Config;
pub use limiter::{Quota, RateLimitDecision, RateLimiter};
pub use otp::{OtpSessionManager, OtpSessionPayload, OTP_COOKIE_NAME, OTP_TTL_SECONDS};
pub use validator::{FormValidator, ValidationError};
