//! Feedback capture

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::record_file::RecordFile;
use crate::StoreError;

/// One feedback submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub feedback_id: Uuid,
    /// Rating from 1 (poor) to 5 (excellent)
    pub rating: u8,
    pub comment: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feedback service contract
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn submit(
        &self,
        rating: u8,
        comment: &str,
        phone_number: Option<&str>,
    ) -> Result<FeedbackRecord, StoreError>;

    /// Most recent submissions, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError>;
}

/// File-backed feedback store
pub struct FileFeedbackStore {
    file: RecordFile<FeedbackRecord>,
}

impl FileFeedbackStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self { file: RecordFile::open(path)? })
    }
}

#[async_trait]
impl FeedbackStore for FileFeedbackStore {
    async fn submit(
        &self,
        rating: u8,
        comment: &str,
        phone_number: Option<&str>,
    ) -> Result<FeedbackRecord, StoreError> {
        if !(1..=5).contains(&rating) {
            return Err(StoreError::InvalidRating(rating));
        }
        let record = FeedbackRecord {
            feedback_id: Uuid::new_v4(),
            rating,
            comment: comment.to_string(),
            phone_number: phone_number.map(str::to_string),
            created_at: Utc::now(),
        };
        self.file.append(record.clone())?;
        Ok(record)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError> {
        let mut all = self.file.all();
        all.reverse();
        all.truncate(limit);
        Ok(all)
    }
}
