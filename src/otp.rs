// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! One-time passcode session manager.
//!
//! Issues short numeric codes bound to an email/case pair and packages the
//! Argon2id hash of the code, an expiry, and a random nonce into a
//! tamper-evident, self-contained token:
//!
//! ```text
//! base64url(JSON(payload)) "." base64url(HMAC-SHA256(secret, body))
//! ```
//!
//! No server-side session store: everything needed to verify travels with
//! the token, and the server holds only the symmetric secret. The payload
//! is base64, not encrypted; the code itself is protected by the one-way
//! hash, not by confidentiality of the blob.
//!
//! Tokens are not consumed on successful verification; a code stays
//! replayable until `exp`. The issuance endpoint's rate limit bounds abuse.

use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHash};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Default token lifetime in seconds (10 minutes).
pub const OTP_TTL_SECONDS: u64 = 600;

/// Cookie carrying the session token.
pub const OTP_COOKIE_NAME: &str = "fv_otp";

/// Epoch-seconds time source. Injectable so tests can cross expiries.
pub type EpochClock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("failed to hash verification code")]
    Hash,
    #[error("failed to sign session payload")]
    Sign,
}

/// Claims embedded in the `fv_otp` token.
///
/// Field names and order are part of the wire format shared with
/// previously-issued tokens; `caseId` stays camel-cased on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpSessionPayload {
    pub email: String,
    #[serde(rename = "caseId")]
    pub case_id: String,
    /// Salted Argon2id hash of the plaintext code.
    pub hash: String,
    /// Expiry as absolute epoch seconds.
    pub exp: i64,
    /// 16 random bytes, base64url; keeps equal payloads from colliding.
    pub nonce: String,
}

/// Issues and verifies OTP session tokens against a shared secret.
pub struct OtpSessionManager {
    secret: Vec<u8>,
    clock: EpochClock,
}

impl OtpSessionManager {
    /// Create a manager on the system clock.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self::with_clock(secret, Arc::new(|| Utc::now().timestamp()))
    }

    /// Create a manager with an explicit epoch-seconds source.
    pub fn with_clock(secret: impl Into<Vec<u8>>, clock: EpochClock) -> Self {
        Self {
            secret: secret.into(),
            clock,
        }
    }

    /// Generate `length` decimal digits from the OS entropy source.
    pub fn generate_code(&self, length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Hash a code with Argon2id and a fresh salt.
    ///
    /// Adaptive hashing, not a fast digest: a leaked token payload does not
    /// trivially reveal the plaintext code.
    pub fn hash_code(&self, code: &str) -> Result<String, OtpError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(code.as_bytes(), &salt)
            .map_err(|_| OtpError::Hash)?;
        Ok(hash.to_string())
    }

    /// Verify a code against a stored hash via the algorithm's own verify
    /// primitive. Malformed hashes verify as `false`, never as an error.
    pub fn verify_code(&self, code: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(code.as_bytes(), &parsed)
            .is_ok()
    }

    /// Issue a signed session token binding `code` to `email` and `case_id`
    /// for `ttl_seconds`.
    pub fn create_token(
        &self,
        email: &str,
        case_id: &str,
        code: &str,
        ttl_seconds: u64,
    ) -> Result<String, OtpError> {
        let hash = self.hash_code(code)?;
        let mut nonce = [0u8; 16];
        OsRng.fill_bytes(&mut nonce);
        let payload = OtpSessionPayload {
            email: email.to_string(),
            case_id: case_id.to_string(),
            hash,
            exp: (self.clock)() + ttl_seconds as i64,
            nonce: Base64UrlUnpadded::encode_string(&nonce),
        };
        self.sign(&payload)
    }

    /// Sign a payload into the two-part dot-separated token.
    pub fn sign(&self, payload: &OtpSessionPayload) -> Result<String, OtpError> {
        let json = serde_json::to_vec(payload).map_err(|_| OtpError::Sign)?;
        let body = Base64UrlUnpadded::encode_string(&json);
        let mac = self.mac(body.as_bytes()).ok_or(OtpError::Sign)?;
        let sig = Base64UrlUnpadded::encode_string(&mac);
        Ok(format!("{body}.{sig}"))
    }

    /// Verify a token and recover its payload.
    ///
    /// Every failure path (missing part, signature mismatch, malformed
    /// body, expiry) collapses to `None`; callers cannot learn which check
    /// failed and must treat `None` as "no valid OTP session".
    pub fn verify_token(&self, token: &str) -> Option<OtpSessionPayload> {
        let (body, sig) = token.rsplit_once('.')?;
        if body.is_empty() || sig.is_empty() {
            return None;
        }

        let expected = Base64UrlUnpadded::encode_string(&self.mac(body.as_bytes())?);
        if sig.len() != expected.len() || !constant_time_eq(sig.as_bytes(), expected.as_bytes()) {
            debug!("otp token signature mismatch");
            return None;
        }

        let json = Base64UrlUnpadded::decode_vec(body).ok()?;
        let payload: OtpSessionPayload = serde_json::from_slice(&json).ok()?;

        if (self.clock)() > payload.exp {
            debug!("otp token expired");
            return None;
        }

        Some(payload)
    }

    fn mac(&self, body: &[u8]) -> Option<Vec<u8>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret).ok()?;
        mac.update(body);
        Some(mac.finalize().into_bytes().to_vec())
    }
}
