//! Create a record.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{RecordFields, RecordId};
use crate::router::Valid;
use crate::AppState;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: RecordId,
}

/// Handler to create record.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<RecordFields>,
) -> Result<(StatusCode, Json<Response>)> {
    let id = state.records.create(&body).await?;

    Ok((StatusCode::CREATED, Json(Response { id })))
}
