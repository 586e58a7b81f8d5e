//! Mocked persistence services
//!
//! Local, file-backed stands-ins for auth, feedback capture, and SMS
//! notification. Records are real and durable; the services themselves are
//! simulations: nothing is ever sent anywhere, and the auth store holds
//! local fixture credentials, not real ones.

pub mod auth;
pub mod feedback;
pub mod sms;

mod record_file;

pub use auth::{AuthStore, FileAuthStore, UserRecord};
pub use feedback::{FeedbackRecord, FeedbackStore, FileFeedbackStore};
pub use sms::{FileSmsService, SmsMessage, SmsResult, SmsService, SmsStatus, SmsType};

use thiserror::Error;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already registered: {0}")]
    UserExists(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid rating: {0} (expected 1-5)")]
    InvalidRating(u8),
}

impl From<StoreError> for krishi_core::Error {
    fn from(err: StoreError) -> Self {
        krishi_core::Error::Store(err.to_string())
    }
}

/// Minimal phone sanity check shared by the services: at least ten digits.
pub(crate) fn check_phone(phone: &str) -> Result<(), StoreError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 10 {
        return Err(StoreError::InvalidPhone(phone.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_check_requires_ten_digits() {
        assert!(check_phone("+919999999999").is_ok());
        assert!(check_phone("9876543210").is_ok());
        assert!(check_phone("12345").is_err());
        assert!(check_phone("not a phone").is_err());
    }
}
