//! List every record.

use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::record::Record;
use crate::AppState;

/// Handler to list records, unfiltered.
pub async fn handler(State(state): State<AppState>) -> Result<Json<Vec<Record>>> {
    Ok(Json(state.records.list().await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;

    use super::*;
    use crate::record::RecordFields;
    use crate::*;

    #[tokio::test]
    async fn test_list_on_both_paths() {
        let state = router::state();
        state
            .records
            .create(&RecordFields::new("Alice", "a@x.com", "pw1"))
            .await
            .unwrap();
        let app = app(state);

        for path in ["/", "/users"] {
            let response =
                make_request(app.clone(), Method::GET, path, String::default())
                    .await;
            assert_eq!(response.status(), StatusCode::OK);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let body: Vec<Record> = serde_json::from_slice(&body).unwrap();
            assert_eq!(
                body,
                vec![RecordFields::new("Alice", "a@x.com", "pw1").into_record(1)]
            );
        }
    }

    #[tokio::test]
    async fn test_list_empty() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/users", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"[]");
    }
}
