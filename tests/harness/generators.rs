// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Input generators for abuse simulation.

/// Generate `count` distinct client IPs.
pub fn generate_ips(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("10.{}.{}.{}", (i >> 16) & 0xff, (i >> 8) & 0xff, i & 0xff))
        .collect()
}

/// Generate `count` distinct email addresses.
pub fn generate_emails(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("victim{i}@example.com"))
        .collect()
}

/// Replace the character at `index` with a different base64url character,
/// simulating a flipped bit surviving transport.
pub fn flip_char(token: &str, index: usize) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}

/// Tokens that must never verify: structurally broken, truncated, or
/// outright garbage.
pub fn malformed_tokens() -> Vec<String> {
    vec![
        String::new(),
        ".".to_string(),
        "no-separator".to_string(),
        "body-only.".to_string(),
        ".sig-only".to_string(),
        "a.b.c".to_string(),
        "!!!.###".to_string(),
        "aGVsbG8.".to_string(),
    ]
}
