//! Overwrite a record.

use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::record::{Record, RecordFields, RecordId};
use crate::router::{Path, Valid};
use crate::AppState;

/// Handler replacing name, email and password together.
pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Valid(body): Valid<RecordFields>,
) -> Result<Json<Record>> {
    state.records.update(id, &body).await?;

    Ok(Json(body.into_record(id)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;
    use crate::*;

    #[tokio::test]
    async fn test_update_handler() {
        let state = router::state();
        let alice = state
            .records
            .create(&RecordFields::new("Alice", "a@x.com", "pw1"))
            .await
            .unwrap();
        let bob = state
            .records
            .create(&RecordFields::new("Bob", "b@x.com", "pw2"))
            .await
            .unwrap();
        let app = app(state.clone());

        let req_body = RecordFields::new("Alice2", "a2@x.com", "pw1b");
        let response = make_request(
            app,
            Method::PUT,
            &format!("/users/{alice}"),
            json!(req_body).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(
            state.records.get(alice).await.unwrap(),
            req_body.into_record(alice)
        );
        assert_eq!(state.records.get(bob).await.unwrap().name, "Bob");
    }

    #[tokio::test]
    async fn test_update_unknown_record() {
        let app = app(router::state());

        let response = make_request(
            app,
            Method::PUT,
            "/users/12",
            json!(RecordFields::new("Ghost", "g@x.com", "pw")).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_with_overflowing_id() {
        let app = app(router::state());

        let response = make_request(
            app,
            Method::PUT,
            "/users/99999999999999999999",
            json!(RecordFields::new("Ghost", "g@x.com", "pw")).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: error::ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, 400);
        assert_eq!(body.title, "Invalid path parameter.");
    }
}
