//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use bramble_core::{CommentService, FollowService, ImageService, MailerService, PollService, PostService};
use bramble_db::repositories::UserRepository;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub follow_service: FollowService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub image_service: ImageService,
    pub poll_service: PollService,
    pub mailer_service: MailerService,
    pub user_repo: UserRepository,
    /// Public base URL, used to build absolute links in share mails.
    pub base_url: String,
}

/// Authentication middleware.
///
/// Resolves a bearer token to a user and stashes the model in request
/// extensions. Missing or unknown tokens just leave the request anonymous;
/// handlers that need a caller reject through `AuthUser`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(Some(user)) = state.user_repo.find_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
