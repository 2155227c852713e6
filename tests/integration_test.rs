// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the intake service components.

use fortivault_intake::limiter::Clock;
use fortivault_intake::otp::EpochClock;
use fortivault_intake::validator::FraudReportForm;
use fortivault_intake::{FormValidator, OtpSessionManager, Quota, RateLimiter};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn manual_clock(start: Instant) -> (Clock, Arc<Mutex<Instant>>) {
    let now = Arc::new(Mutex::new(start));
    let handle = now.clone();
    let clock: Clock = Arc::new(move || *now.lock().unwrap());
    (clock, handle)
}

fn manual_epoch_clock(start: i64) -> (EpochClock, Arc<Mutex<i64>>) {
    let now = Arc::new(Mutex::new(start));
    let handle = now.clone();
    let clock: EpochClock = Arc::new(move || *now.lock().unwrap());
    (clock, handle)
}

fn valid_report() -> FraudReportForm {
    FraudReportForm {
        full_name: "Ada Lovelace".into(),
        contact_email: "ada@example.com".into(),
        contact_phone: String::new(),
        scam_type: "investment".into(),
        amount: "2500".into(),
        currency: "EUR".into(),
        timeline: "last-month".into(),
        description: "Transferred funds to a fake broker.".into(),
        transaction_hashes: vec![],
        bank_references: vec!["REF-2291".into()],
        files_count: 2,
    }
}

#[tokio::test]
async fn test_full_submission_flow() {
    let limiter = RateLimiter::new();
    let validator = FormValidator::new();

    let violations = validator.validate_fraud_report(&valid_report());
    assert!(violations.is_empty());

    let quota = Quota::per_hour(5);
    assert!(limiter.is_allowed("192.168.1.100", quota).await);
}

#[tokio::test]
async fn test_rate_limit_exhaustion() {
    let limiter = RateLimiter::new();
    let quota = Quota::per_hour(3);

    for i in 0..3 {
        assert!(
            limiter.is_allowed("10.0.0.1", quota).await,
            "request {} should be allowed",
            i + 1
        );
    }

    assert!(!limiter.is_allowed("10.0.0.1", quota).await);
}

#[tokio::test]
async fn test_five_per_minute_budget() {
    // 5 requests in a 60s window all pass; the 6th in the same second fails
    let limiter = RateLimiter::new();
    let quota = Quota::new(Duration::from_secs(60), 5);

    for _ in 0..5 {
        assert!(limiter.is_allowed("1.2.3.4", quota).await);
    }
    assert!(!limiter.is_allowed("1.2.3.4", quota).await);
}

#[tokio::test]
async fn test_window_reset_restores_budget() {
    let start = Instant::now();
    let (clock, now) = manual_clock(start);
    let limiter = RateLimiter::with_clock(clock);
    let quota = Quota::new(Duration::from_secs(60), 2);

    assert!(limiter.is_allowed("key", quota).await);
    assert!(limiter.is_allowed("key", quota).await);
    for _ in 0..10 {
        assert!(!limiter.is_allowed("key", quota).await);
    }

    // A full window past the first call: budget restored no matter how
    // many calls were rejected meanwhile
    *now.lock().unwrap() = start + Duration::from_secs(61);
    assert!(limiter.is_allowed("key", quota).await);
}

#[tokio::test]
async fn test_identifiers_do_not_interact() {
    let limiter = RateLimiter::new();
    let quota = Quota::per_hour(2);

    assert!(limiter.is_allowed("1.1.1.1", quota).await);
    assert!(limiter.is_allowed("1.1.1.1", quota).await);
    assert!(!limiter.is_allowed("1.1.1.1", quota).await);

    assert!(limiter.is_allowed("2.2.2.2", quota).await);
}

#[tokio::test]
async fn test_composite_identifier_bounds_per_email() {
    // The OTP endpoint keys on ip:email; one address exhausting its budget
    // must not throttle another address behind the same IP
    let limiter = RateLimiter::new();
    let quota = Quota::new(Duration::from_secs(600), 2);

    assert!(limiter.is_allowed("9.9.9.9:a@example.com", quota).await);
    assert!(limiter.is_allowed("9.9.9.9:a@example.com", quota).await);
    assert!(!limiter.is_allowed("9.9.9.9:a@example.com", quota).await);

    assert!(limiter.is_allowed("9.9.9.9:b@example.com", quota).await);
}

#[test]
fn test_otp_issue_and_verify() {
    let manager = OtpSessionManager::new("test-secret");

    let token = manager
        .create_token("victim@example.com", "CSRU-42", "438219", 600)
        .expect("token creation should succeed");

    let payload = manager.verify_token(&token).expect("token should verify");
    assert_eq!(payload.email, "victim@example.com");
    assert_eq!(payload.case_id, "CSRU-42");
    assert!(manager.verify_code("438219", &payload.hash));
    assert!(!manager.verify_code("000000", &payload.hash));
}

#[test]
fn test_otp_expires_after_ttl() {
    let issued_at = 1_700_000_000;
    let (clock, now) = manual_epoch_clock(issued_at);
    let manager = OtpSessionManager::with_clock("test-secret", clock);

    let token = manager
        .create_token("victim@example.com", "CSRU-42", "438219", 600)
        .unwrap();

    // Just inside the lifetime
    *now.lock().unwrap() = issued_at + 600;
    assert!(manager.verify_token(&token).is_some());

    // One second past it
    *now.lock().unwrap() = issued_at + 601;
    assert!(manager.verify_token(&token).is_none());
}

#[test]
fn test_fresh_nonces_yield_distinct_valid_tokens() {
    let manager = OtpSessionManager::new("test-secret");

    let first = manager
        .create_token("victim@example.com", "CSRU-42", "438219", 600)
        .unwrap();
    let second = manager
        .create_token("victim@example.com", "CSRU-42", "438219", 600)
        .unwrap();

    assert_ne!(first, second);
    assert!(manager.verify_token(&first).is_some());
    assert!(manager.verify_token(&second).is_some());
}

#[test]
fn test_generated_codes_have_requested_length() {
    let manager = OtpSessionManager::new("test-secret");
    for length in [4usize, 6, 8] {
        let code = manager.generate_code(length);
        assert_eq!(code.len(), length);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}

#[tokio::test]
async fn test_validation_rejects_incomplete_report() {
    let validator = FormValidator::new();
    let mut form = valid_report();
    form.contact_email = "not-an-email".into();
    form.amount = "-10".into();

    let violations = validator.validate_fraud_report(&form);
    assert_eq!(violations.len(), 2);
}
