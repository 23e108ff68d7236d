//! Delete a record, no retention.

use axum::extract::State;

use crate::error::Result;
use crate::record::RecordId;
use crate::router::Path;
use crate::AppState;

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<()> {
    state.records.delete(id).await
}
