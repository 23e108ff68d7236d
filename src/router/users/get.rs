//! Get a single record.

use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::record::{Record, RecordId};
use crate::router::Path;
use crate::AppState;

pub async fn handler(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<Record>> {
    Ok(Json(state.records.get(id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;

    use super::*;
    use crate::record::RecordFields;
    use crate::*;

    #[tokio::test]
    async fn test_get_handler() {
        let state = router::state();
        let id = state
            .records
            .create(&RecordFields::new("Bob", "b@x.com", "pw2"))
            .await
            .unwrap();
        let app = app(state);

        let path = format!("/users/{id}");
        let response =
            make_request(app.clone(), Method::GET, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Record = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.name, "Bob");

        let response =
            make_request(app, Method::GET, "/users/404", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_with_invalid_id() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/users/alice", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: error::ResponseError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, 400);
        assert_eq!(body.title, "Invalid path parameter.");
        assert!(body.detail.contains("alice"));
    }
}
