//! Users-related HTTP API.
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use axum::Router;
use axum::routing::get;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /users` goes to `list`, `POST /users` goes to `create`.
        .route("/", get(list::handler).post(create::handler))
        // `GET`, `PUT` and `DELETE /users/{id}`.
        .route(
            "/{id}",
            get(get::handler).put(update::handler).delete(delete::handler),
        )
}
