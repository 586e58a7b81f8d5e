//! Simulated authentication
//!
//! A local user registry standing in for a real identity provider. The
//! stored password is a local fixture value; this service exists so the
//! login flow has a working CRUD contract, not to protect anything.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::record_file::RecordFile;
use crate::{check_phone, StoreError};

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub name: String,
    pub phone_number: String,
    /// Fixture credential for the simulated login flow
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Auth service contract
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn register(
        &self,
        name: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<UserRecord, StoreError>;

    async fn login(&self, phone_number: &str, password: &str) -> Result<UserRecord, StoreError>;
}

/// File-backed simulated auth store
pub struct FileAuthStore {
    file: RecordFile<UserRecord>,
}

impl FileAuthStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self { file: RecordFile::open(path)? })
    }
}

#[async_trait]
impl AuthStore for FileAuthStore {
    async fn register(
        &self,
        name: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<UserRecord, StoreError> {
        check_phone(phone_number)?;
        if self.file.find(|u| u.phone_number == phone_number).is_some() {
            return Err(StoreError::UserExists(phone_number.to_string()));
        }
        let user = UserRecord {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            password: password.to_string(),
            created_at: Utc::now(),
        };
        self.file.append(user.clone())?;
        tracing::info!(phone = phone_number, "Registered user");
        Ok(user)
    }

    async fn login(&self, phone_number: &str, password: &str) -> Result<UserRecord, StoreError> {
        self.file
            .find(|u| u.phone_number == phone_number && u.password == password)
            .ok_or(StoreError::InvalidCredentials)
    }
}
