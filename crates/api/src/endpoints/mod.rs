//! API endpoints.

mod follow;
mod images;
mod polls;
mod posts;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/follow", follow::router())
        .nest("/posts", posts::router())
        .nest("/images", images::router())
        .nest("/polls", polls::router())
}
