//! Post endpoints: authoring, listings, comments, search, and sharing.

use axum::{extract::State, routing::post, Json, Router};
use bramble_common::{AppError, AppResult, PageToken};
use bramble_core::{CreateCommentInput, CreatePostInput, SharePostInput, UpdatePostInput};
use bramble_db::entities::{comment, post};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Request addressing a post by ID.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdRequest {
    pub post_id: String,
}

/// Request to update a post.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub post_id: String,
    #[serde(flatten)]
    pub input: UpdatePostInput,
}

/// Request to list published posts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub tag: Option<String>,
    /// Raw page token; anything non-numeric resolves to page 1.
    pub page: Option<String>,
}

/// Request addressing a post by publish date and slug.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSlugRequest {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub slug: String,
}

/// Free-text search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
}

/// Request to comment on a post.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub post_id: String,
    #[serde(flatten)]
    pub input: CreateCommentInput,
}

/// Request to share a post by email.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub post_id: String,
    #[serde(flatten)]
    pub input: SharePostInput,
}

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub status: String,
    pub tags: Vec<String>,
    pub published_at: String,
    pub created_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        let tags = p.tag_list();
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            slug: p.slug,
            body: p.body,
            status: match p.status {
                post::PostStatus::Draft => "draft".to_string(),
                post::PostStatus::Published => "published".to_string(),
            },
            tags,
            published_at: p.published_at.to_rfc3339(),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub name: String,
    pub body: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            name: c.author_name,
            body: c.body,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Paginated post listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPageResponse {
    pub items: Vec<PostResponse>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

/// Share result response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub sent: bool,
}

/// Create a draft post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Update a post.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state
        .post_service
        .update(&user.id, &req.post_id, req.input)
        .await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Publish a draft.
async fn publish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.publish(&user.id, &req.post_id).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(&user.id, &req.post_id).await?;
    Ok(ApiResponse::ok(()))
}

/// List published posts, optionally filtered by tag.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<PostPageResponse>> {
    let token = PageToken::parse(req.page.as_deref());
    let page = state
        .post_service
        .list_published(req.tag.as_deref(), &token)
        .await?;

    Ok(ApiResponse::ok(PostPageResponse {
        items: page.items.into_iter().map(Into::into).collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
    }))
}

/// Show a published post.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get_published(&req.post_id).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Resolve a published post by date and slug.
async fn show_by_date(
    State(state): State<AppState>,
    Json(req): Json<DateSlugRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let date = NaiveDate::from_ymd_opt(req.year, req.month, req.day)
        .ok_or_else(|| AppError::Validation("Invalid date".to_string()))?;
    let post = state.post_service.get_by_date_slug(date, &req.slug).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Posts similar to a post by shared tags.
async fn similar(
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.post_service.similar_posts(&req.post_id).await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Free-text search over published posts.
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.post_service.search(&req.query).await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// The caller's own posts, drafts included.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state.post_service.list_by_author(&user.id, 100, 0).await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Comment on a published post.
async fn comment_create(
    State(state): State<AppState>,
    Json(req): Json<CommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .add_comment(&req.post_id, req.input)
        .await?;
    Ok(ApiResponse::ok(comment.into()))
}

/// Active comments on a published post.
async fn comment_list(
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.list_for_post(&req.post_id).await?;
    Ok(ApiResponse::ok(
        comments.into_iter().map(Into::into).collect(),
    ))
}

/// Recommend a published post to someone by email.
async fn share(
    State(state): State<AppState>,
    Json(req): Json<ShareRequest>,
) -> AppResult<ApiResponse<ShareResponse>> {
    let post = state.post_service.get_published(&req.post_id).await?;
    let post_url = post_permalink(&state.base_url, &post);
    let sent = state
        .mailer_service
        .share_post(&post, &post_url, &req.input)
        .await?;
    Ok(ApiResponse::ok(ShareResponse { sent }))
}

/// Canonical absolute URL for a published post.
fn post_permalink(base_url: &str, post: &post::Model) -> String {
    format!(
        "{}/posts/{}/{}",
        base_url.trim_end_matches('/'),
        post.published_at.format("%Y/%m/%d"),
        post.slug
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/publish", post(publish))
        .route("/delete", post(delete))
        .route("/list", post(list))
        .route("/show", post(show))
        .route("/show-by-date", post(show_by_date))
        .route("/similar", post(similar))
        .route("/search", post(search))
        .route("/mine", post(mine))
        .route("/comments/create", post(comment_create))
        .route("/comments/list", post(comment_list))
        .route("/share", post(share))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_post_permalink_layout() {
        let published = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let post = post::Model {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            title: "Learning Rust".to_string(),
            slug: "learning-rust".to_string(),
            body: "body".to_string(),
            status: post::PostStatus::Published,
            tags: json!([]),
            published_at: published.into(),
            created_at: published.into(),
            updated_at: None,
        };

        assert_eq!(
            post_permalink("https://example.com/", &post),
            "https://example.com/posts/2026/03/14/learning-rust"
        );
    }
}
