mod memory;
mod repository;
mod service;

pub use memory::*;
pub use repository::*;
pub use service::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;

/// Identifier assigned by the store on creation.
pub type RecordId = i64;

/// Record as saved on database.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Mutable part of a [`Record`], written all at once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecordFields {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Email is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

impl RecordFields {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Attach an identifier to build a full [`Record`].
    pub fn into_record(self, id: RecordId) -> Record {
        Record {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
        }
    }
}

/// Backing store of [`Record`]s.
///
/// `update` and `delete` return whether a record matched `id`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, fields: &RecordFields) -> Result<RecordId>;

    async fn list(&self) -> Result<Vec<Record>>;

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>>;

    async fn update(&self, id: RecordId, fields: &RecordFields) -> Result<bool>;

    async fn delete(&self, id: RecordId) -> Result<bool>;

    /// Release underlying connections.
    async fn close(&self) {}
}
