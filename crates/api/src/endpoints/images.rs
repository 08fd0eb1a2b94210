//! Image endpoints.
//!
//! Like and unlike respond with the bare `{"status": "ok"}` shape; failures
//! collapse to `{"status": "error"}` rather than the error envelope.

use axum::{extract::State, routing::post, Json, Router};
use bramble_common::{AppResult, PageToken};
use bramble_core::CreateImageInput;
use bramble_db::entities::image;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    endpoints::follow::UserResponse,
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Request addressing an image by ID.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageIdRequest {
    pub image_id: String,
}

/// Request to show an image by ID and slug.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    pub image_id: String,
    pub slug: String,
}

/// Request to list images.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    /// Raw page token; anything non-numeric resolves to page 1.
    pub page: Option<String>,
}

/// Request to list likers of an image.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikersRequest {
    pub image_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Image response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub slug: String,
    pub source_url: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<image::Model> for ImageResponse {
    fn from(i: image::Model) -> Self {
        Self {
            id: i.id,
            user_id: i.user_id,
            title: i.title,
            slug: i.slug,
            source_url: i.source_url,
            description: i.description,
            created_at: i.created_at.to_rfc3339(),
        }
    }
}

/// Paginated image listing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePageResponse {
    pub items: Vec<ImageResponse>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

/// Image detail response with like info.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetailResponse {
    #[serde(flatten)]
    pub image: ImageResponse,
    pub likes_count: u64,
    /// Whether the caller has liked this image; absent for anonymous viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_by_me: Option<bool>,
}

/// Save an image from a remote URL.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateImageInput>,
) -> AppResult<ApiResponse<ImageResponse>> {
    let image = state.image_service.create_from_url(&user.id, input).await?;
    Ok(ApiResponse::ok(image.into()))
}

/// List the image catalog, newest first.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<ImagePageResponse>> {
    let token = PageToken::parse(req.page.as_deref());
    let page = state.image_service.list(&token).await?;

    Ok(ApiResponse::ok(ImagePageResponse {
        items: page.items.into_iter().map(Into::into).collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
    }))
}

/// Show an image with its like count. Works for anonymous viewers; an
/// authenticated caller additionally sees their own like state.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowRequest>,
) -> AppResult<ApiResponse<ImageDetailResponse>> {
    let image = state.image_service.get(&req.image_id, &req.slug).await?;
    let likes_count = state.image_service.count_likes(&image.id).await?;
    let liked_by_me = match viewer {
        Some(user) => Some(state.image_service.has_liked(&user.id, &image.id).await?),
        None => None,
    };

    Ok(ApiResponse::ok(ImageDetailResponse {
        image: image.into(),
        likes_count,
        liked_by_me,
    }))
}

/// Delete an image.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ImageIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state.image_service.delete(&user.id, &req.image_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Like an image.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ImageIdRequest>,
) -> Json<Value> {
    match state.image_service.like(&user.id, &req.image_id).await {
        Ok(()) => Json(json!({"status": "ok"})),
        Err(e) => {
            tracing::debug!(error = %e, image_id = %req.image_id, "Like failed");
            Json(json!({"status": "error"}))
        }
    }
}

/// Remove a like from an image.
async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ImageIdRequest>,
) -> Json<Value> {
    match state.image_service.unlike(&user.id, &req.image_id).await {
        Ok(()) => Json(json!({"status": "ok"})),
        Err(e) => {
            tracing::debug!(error = %e, image_id = %req.image_id, "Unlike failed");
            Json(json!({"status": "error"}))
        }
    }
}

/// Users who liked an image.
async fn likers(
    State(state): State<AppState>,
    Json(req): Json<LikersRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let limit = req.limit.min(100);
    let users = state.image_service.likers(&req.image_id, limit).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/list", post(list))
        .route("/show", post(show))
        .route("/delete", post(delete))
        .route("/like", post(like))
        .route("/unlike", post(unlike))
        .route("/likers", post(likers))
}
