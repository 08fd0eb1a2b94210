//! HTTP API layer for bramble.
//!
//! This crate provides the JSON API:
//!
//! - **Endpoints**: follows, posts, images, polls
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: auth resolution, logging, CORS
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
