// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Server-side validation for the submission forms.
//!
//! Mirrors the checks the wizard applies client-side; nothing here trusts
//! the browser. Validation reports the complete list of violations so the
//! caller can return them in one response.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single validation failure. Messages are user-facing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Valid email address is required")]
    InvalidEmail,

    #[error("Valid amount is required")]
    InvalidAmount,

    #[error("Valid phone number is required")]
    InvalidPhone,

    #[error("At least one transaction hash or bank reference is required")]
    MissingTransactionReference,
}

/// Fraud-report submission body. Wire names are camel-cased.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FraudReportForm {
    pub full_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub scam_type: String,
    pub amount: String,
    pub currency: String,
    pub timeline: String,
    pub description: String,
    pub transaction_hashes: Vec<String>,
    pub bank_references: Vec<String>,
    pub files_count: u32,
}

/// Contact-form submission body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: String,
}

/// Form field validator.
pub struct FormValidator {
    email_re: Regex,
    phone_re: Regex,
}

impl FormValidator {
    pub fn new() -> Self {
        Self {
            // Structural check only; deliverability is the mailer's problem
            email_re: Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("hardcoded pattern"),
            phone_re: Regex::new(r"^[\d+\-\s()]+$").expect("hardcoded pattern"),
        }
    }

    pub fn validate_email(&self, email: &str) -> bool {
        self.email_re.is_match(email)
    }

    /// Positive, parseable amount.
    pub fn validate_amount(&self, amount: &str) -> bool {
        amount
            .trim()
            .parse::<f64>()
            .map(|n| n.is_finite() && n > 0.0)
            .unwrap_or(false)
    }

    /// Phone numbers are optional; when present they must carry at least
    /// ten digits and nothing beyond digits and common punctuation.
    pub fn validate_phone(&self, phone: &str) -> bool {
        if phone.trim().is_empty() {
            return true;
        }
        self.phone_re.is_match(phone)
            && phone.chars().filter(|c| c.is_ascii_digit()).count() >= 10
    }

    /// Validate a fraud report. An empty result means the report is
    /// acceptable.
    pub fn validate_fraud_report(&self, form: &FraudReportForm) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if form.full_name.trim().is_empty() {
            errors.push(ValidationError::Missing("Full name"));
        }
        if form.contact_email.is_empty() || !self.validate_email(&form.contact_email) {
            errors.push(ValidationError::InvalidEmail);
        }
        if form.scam_type.trim().is_empty() {
            errors.push(ValidationError::Missing("Scam type"));
        }
        if form.amount.is_empty() || !self.validate_amount(&form.amount) {
            errors.push(ValidationError::InvalidAmount);
        }
        if form.currency.trim().is_empty() {
            errors.push(ValidationError::Missing("Currency"));
        }
        if form.timeline.trim().is_empty() {
            errors.push(ValidationError::Missing("Timeline"));
        }
        if form.description.trim().is_empty() {
            errors.push(ValidationError::Missing("Description"));
        }
        if !self.validate_phone(&form.contact_phone) {
            errors.push(ValidationError::InvalidPhone);
        }

        let has_reference = !form.transaction_hashes.is_empty() || !form.bank_references.is_empty();
        if !has_reference {
            errors.push(ValidationError::MissingTransactionReference);
        }

        errors
    }

    /// Validate a contact-form message.
    pub fn validate_contact(&self, form: &ContactForm) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if form.name.trim().is_empty() {
            errors.push(ValidationError::Missing("Name"));
        }
        if form.email.is_empty() || !self.validate_email(&form.email) {
            errors.push(ValidationError::InvalidEmail);
        }
        if form.subject.trim().is_empty() {
            errors.push(ValidationError::Missing("Subject"));
        }
        if form.message.trim().is_empty() {
            errors.push(ValidationError::Missing("Message"));
        }

        errors
    }
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_report() -> FraudReportForm {
        FraudReportForm {
            full_name: "Ada Lovelace".into(),
            contact_email: "ada@example.com".into(),
            contact_phone: "+44 20 7946 0958".into(),
            scam_type: "crypto".into(),
            amount: "1200.50".into(),
            currency: "USD".into(),
            timeline: "last-week".into(),
            description: "Wallet drained after a phishing link.".into(),
            transaction_hashes: vec!["0xabc".into()],
            bank_references: vec![],
            files_count: 0,
        }
    }

    #[test]
    fn test_valid_report_passes() {
        let validator = FormValidator::new();
        assert!(validator.validate_fraud_report(&valid_report()).is_empty());
    }

    #[test]
    fn test_email_shapes() {
        let validator = FormValidator::new();
        assert!(validator.validate_email("user@example.com"));
        assert!(!validator.validate_email("user@example"));
        assert!(!validator.validate_email("user example.com"));
        assert!(!validator.validate_email(""));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let validator = FormValidator::new();
        assert!(validator.validate_amount("0.01"));
        assert!(!validator.validate_amount("0"));
        assert!(!validator.validate_amount("-5"));
        assert!(!validator.validate_amount("lots"));
    }

    #[test]
    fn test_phone_optional_but_checked() {
        let validator = FormValidator::new();
        assert!(validator.validate_phone(""));
        assert!(validator.validate_phone("(555) 123-4567"));
        assert!(!validator.validate_phone("555-1234"));
        assert!(!validator.validate_phone("call me maybe"));
    }

    #[test]
    fn test_missing_reference_reported() {
        let validator = FormValidator::new();
        let mut form = valid_report();
        form.transaction_hashes.clear();
        form.bank_references.clear();

        let errors = validator.validate_fraud_report(&form);
        assert!(errors.contains(&ValidationError::MissingTransactionReference));
    }

    #[test]
    fn test_all_violations_collected() {
        let validator = FormValidator::new();
        let errors = validator.validate_fraud_report(&FraudReportForm::default());
        // Everything except phone (optional) is missing or invalid
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn test_contact_form() {
        let validator = FormValidator::new();
        let form = ContactForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Question".into(),
            message: "Hello".into(),
            phone: String::new(),
        };
        assert!(validator.validate_contact(&form).is_empty());

        let errors = validator.validate_contact(&ContactForm::default());
        assert_eq!(errors.len(), 4);
    }
}
