//! Input validation for outgoing requests
//!
//! Mirrors the checks the platform applies to sign-in and delivery requests
//! so obviously bad input fails locally instead of burning a round trip.

use thiserror::Error;

/// Validation failures; these never reach the wire
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid phone number '{0}': expected '+', a 1-3 digit country code and a 10-digit subscriber number")]
    InvalidPhoneNumber(String),

    #[error("invalid reporting webhook URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("a reporting secret requires a reporting webhook URL")]
    SecretWithoutWebhook,
}

/// Validate a phone number in `+<country code><subscriber number>` form
///
/// The platform accepts 10-digit subscriber numbers with a 1-3 digit country
/// code, digits only.
pub fn validate_phone_number(number: &str) -> Result<(), ValidationError> {
    if let Some(digits) = number.strip_prefix('+') {
        let all_digits = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
        if all_digits && (11..=13).contains(&digits.len()) {
            return Ok(());
        }
    }
    Err(ValidationError::InvalidPhoneNumber(number.to_string()))
}

/// Validate a reporting webhook URL
pub fn validate_reporting_webhook(webhook: &str) -> Result<(), ValidationError> {
    url::Url::parse(webhook.trim())
        .map_err(|e| ValidationError::InvalidWebhookUrl(e.to_string()))?;
    Ok(())
}

/// Validate a webhook/secret combination
///
/// A secret is only meaningful when a webhook is configured to sign for.
pub fn validate_reporting_config(
    webhook: Option<&str>,
    secret: Option<&str>,
) -> Result<(), ValidationError> {
    match (webhook, secret) {
        (None, Some(_)) => Err(ValidationError::SecretWithoutWebhook),
        (Some(url), _) => validate_reporting_webhook(url),
        (None, None) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_phone_numbers() {
        assert!(validate_phone_number("+911234567890").is_ok());
        assert!(validate_phone_number("+12025550123").is_ok());
        assert!(validate_phone_number("+4417005550123").is_ok());
    }

    #[test]
    fn rejects_malformed_phone_numbers() {
        for number in [
            "",
            "+",
            "911234567890",    // no plus
            "+91123456789",    // 9-digit subscriber number
            "+9112345678901234", // too long
            "+91 1234567890",  // whitespace
            "+91-123456789a",  // non-digit
        ] {
            assert!(
                validate_phone_number(number).is_err(),
                "expected rejection of {number:?}"
            );
        }
    }

    #[test]
    fn webhook_must_be_a_url() {
        assert!(validate_reporting_webhook("https://example.com/hooks/report").is_ok());
        assert!(validate_reporting_webhook("not a url").is_err());
    }

    #[test]
    fn secret_requires_webhook() {
        assert_eq!(
            validate_reporting_config(None, Some("s3cret")),
            Err(ValidationError::SecretWithoutWebhook)
        );
        assert!(validate_reporting_config(Some("https://example.com/h"), Some("s3cret")).is_ok());
        assert!(validate_reporting_config(None, None).is_ok());
    }
}
