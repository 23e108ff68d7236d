//! HTTP routes.
pub mod status;
pub mod users;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::ServerError;

/// JSON body extractor running [`Validate`] before reaching the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Path extractor answering bad segments with a [`ServerError`] body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct Path<T>(pub T);

/// Build a state backed by memory. MUST NEVER be used in production.
#[cfg(test)]
pub(crate) fn state() -> crate::AppState {
    use std::sync::Arc;

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        records: crate::record::RecordService::new(Arc::new(
            crate::record::MemoryRecordStore::new(),
        )),
        metrics: None,
    }
}

/// Build a state whose store always fails. MUST NEVER be used in production.
#[cfg(test)]
pub(crate) fn failing_state() -> crate::AppState {
    use std::sync::Arc;

    use crate::error::Result;
    use crate::record::{Record, RecordFields, RecordId, RecordStore};

    struct UnreachableStore;

    #[async_trait::async_trait]
    impl RecordStore for UnreachableStore {
        async fn insert(&self, _: &RecordFields) -> Result<RecordId> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn list(&self) -> Result<Vec<Record>> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn find_by_id(&self, _: RecordId) -> Result<Option<Record>> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn update(&self, _: RecordId, _: &RecordFields) -> Result<bool> {
            Err(sqlx::Error::PoolTimedOut.into())
        }

        async fn delete(&self, _: RecordId) -> Result<bool> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }

    crate::AppState {
        records: crate::record::RecordService::new(Arc::new(UnreachableStore)),
        ..state()
    }
}
