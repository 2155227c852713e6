// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Abuse simulation patterns for security testing.

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique client IPs to simulate
    pub unique_ips: usize,
    /// Number of unique email addresses (0 = key on IP alone)
    pub unique_emails: usize,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            unique_emails: 0,
        }
    }
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// Single IP flood - one client hammering a submission endpoint.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            unique_ips: 1,
            ..Default::default()
        }
    }

    /// Distributed submission - many IPs, a handful of requests each.
    pub fn distributed_submission() -> Self {
        Self {
            total_requests: 300,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// OTP harvest - one IP cycling email addresses to farm codes.
    pub fn otp_harvest() -> Self {
        Self {
            total_requests: 200,
            unique_ips: 1,
            unique_emails: 20,
        }
    }
}
