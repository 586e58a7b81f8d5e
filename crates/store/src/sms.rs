//! Simulated SMS service
//!
//! Messages are NOT actually sent. Each send is recorded with status
//! `simulated_sent` so the notification flow has a complete, auditable
//! contract without any carrier integration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::record_file::RecordFile;
use crate::{check_phone, StoreError};

/// SMS message types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsType {
    /// The crop advisory finished generating
    AdvisoryReady,
    WeatherAlert,
    Welcome,
}

/// SMS delivery status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmsStatus {
    Queued,
    SimulatedSent,
    Failed,
}

/// SMS message record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsMessage {
    pub message_id: Uuid,
    pub phone_number: String,
    pub message_text: String,
    pub message_type: SmsType,
    pub status: SmsStatus,
    pub created_at: DateTime<Utc>,
}

/// Result of a (simulated) send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsResult {
    pub message_id: Uuid,
    pub status: SmsStatus,
    pub sent_at: DateTime<Utc>,
    /// Always true for this service
    pub simulated: bool,
}

/// SMS service contract
#[async_trait]
pub trait SmsService: Send + Sync {
    async fn send_sms(
        &self,
        phone_number: &str,
        message: &str,
        message_type: SmsType,
    ) -> Result<SmsResult, StoreError>;

    /// Messages recorded for a phone number
    async fn history(&self, phone_number: &str) -> Result<Vec<SmsMessage>, StoreError>;
}

/// File-backed simulated SMS service
pub struct FileSmsService {
    file: RecordFile<SmsMessage>,
}

impl FileSmsService {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self { file: RecordFile::open(path)? })
    }
}

#[async_trait]
impl SmsService for FileSmsService {
    async fn send_sms(
        &self,
        phone_number: &str,
        message: &str,
        message_type: SmsType,
    ) -> Result<SmsResult, StoreError> {
        check_phone(phone_number)?;
        let record = SmsMessage {
            message_id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            message_text: message.to_string(),
            message_type,
            status: SmsStatus::SimulatedSent,
            created_at: Utc::now(),
        };
        self.file.append(record.clone())?;
        tracing::info!(
            phone = phone_number,
            kind = ?message_type,
            "Simulated SMS recorded (not sent)"
        );
        Ok(SmsResult {
            message_id: record.message_id,
            status: record.status,
            sent_at: record.created_at,
            simulated: true,
        })
    }

    async fn history(&self, phone_number: &str) -> Result<Vec<SmsMessage>, StoreError> {
        Ok(self
            .file
            .all()
            .into_iter()
            .filter(|m| m.phone_number == phone_number)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str) -> FileSmsService {
        let path = std::env::temp_dir()
            .join(format!("krishi-sms-test-{name}-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        FileSmsService::open(path).unwrap()
    }

    #[tokio::test]
    async fn send_is_simulated_and_recorded() {
        let service = service("send");
        let result = service
            .send_sms("+919999999999", "Your advisory is ready", SmsType::AdvisoryReady)
            .await
            .unwrap();
        assert!(result.simulated);
        assert_eq!(result.status, SmsStatus::SimulatedSent);

        let history = service.history("+919999999999").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message_text, "Your advisory is ready");
    }

    #[tokio::test]
    async fn history_is_per_number() {
        let service = service("per-number");
        service.send_sms("+911111111111", "a", SmsType::Welcome).await.unwrap();
        service.send_sms("+912222222222", "b", SmsType::Welcome).await.unwrap();
        assert_eq!(service.history("+911111111111").await.unwrap().len(), 1);
        assert_eq!(service.history("+913333333333").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn invalid_phone_is_rejected() {
        let service = service("invalid");
        let err = service.send_sms("12", "x", SmsType::Welcome).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPhone(_)));
    }
}
