//! Image service.
//!
//! Images enter the catalog by URL: the service downloads the file, checks it
//! decodes as an image, stores the bytes, and records the row.

use std::sync::Arc;

use bramble_common::{
    generate_storage_key,
    pagination::{resolve_page, Page, PageToken},
    slugify, AppError, AppResult, IdGenerator, StorageBackend,
};
use bramble_db::{
    entities::{image, image_like, user},
    repositories::{ImageRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use url::Url;
use validator::Validate;

/// Images shown per listing page.
const IMAGES_PER_PAGE: u64 = 8;

/// Extensions accepted for remote images.
const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Input for saving an image from a remote URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateImageInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(url)]
    pub url: String,
    pub description: Option<String>,
}

/// Image service for business logic.
#[derive(Clone)]
pub struct ImageService {
    image_repo: ImageRepository,
    user_repo: UserRepository,
    storage: Arc<dyn StorageBackend>,
    http_client: reqwest::Client,
    id_gen: IdGenerator,
}

impl ImageService {
    /// Create a new image service.
    #[must_use]
    pub fn new(
        image_repo: ImageRepository,
        user_repo: UserRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            image_repo,
            user_repo,
            storage,
            http_client: reqwest::Client::new(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Fetch an image from a URL, validate it, store it, and record it.
    pub async fn create_from_url(
        &self,
        user_id: &str,
        input: CreateImageInput,
    ) -> AppResult<image::Model> {
        input.validate()?;

        let url = Url::parse(&input.url)
            .map_err(|e| AppError::Validation(format!("Invalid URL: {e}")))?;
        let ext = image_extension(&url).ok_or_else(|| {
            AppError::Validation(
                "The given URL does not match valid image extensions.".to_string(),
            )
        })?;

        let slug = slugify(&input.title);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Title does not produce a usable slug".to_string(),
            ));
        }

        let data = self.download(&url).await?;

        // The extension alone proves nothing; the bytes must decode.
        ::image::load_from_memory(&data)
            .map_err(|e| AppError::Validation(format!("URL does not point to an image: {e}")))?;

        let file_name = format!("{slug}.{ext}");
        let storage_key = generate_storage_key(user_id, &file_name);
        let content_type = if ext == "png" { "image/png" } else { "image/jpeg" };
        self.storage
            .upload(&storage_key, &data, content_type)
            .await?;

        let model = image::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(input.title),
            slug: Set(slug),
            source_url: Set(url.to_string()),
            file_key: Set(storage_key),
            description: Set(input.description),
            ..Default::default()
        };

        self.image_repo.create(model).await
    }

    /// Get an image by ID and slug.
    pub async fn get(&self, image_id: &str, slug: &str) -> AppResult<image::Model> {
        let image = self.image_repo.get_by_id(image_id).await?;
        if image.slug != slug {
            return Err(AppError::NotFound(format!("Image not found: {image_id}")));
        }
        Ok(image)
    }

    /// Delete an image. Only the owner may delete; the stored file goes too.
    pub async fn delete(&self, user_id: &str, image_id: &str) -> AppResult<()> {
        let image = self.image_repo.get_by_id(image_id).await?;
        if image.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can delete this image".to_string(),
            ));
        }

        self.image_repo.delete(image_id).await?;
        if let Err(e) = self.storage.delete(&image.file_key).await {
            tracing::warn!(error = %e, key = %image.file_key, "Failed to delete stored file");
        }
        Ok(())
    }

    /// Paginated image catalog, newest first. Out-of-range page tokens clamp.
    pub async fn list(&self, token: &PageToken) -> AppResult<Page<image::Model>> {
        let total = self.image_repo.count_all().await?;
        let (page, offset) = resolve_page(token, total, IMAGES_PER_PAGE);
        let items = self.image_repo.find_all(IMAGES_PER_PAGE, offset).await?;
        Ok(Page::new(items, page, total, IMAGES_PER_PAGE))
    }

    /// Images uploaded by a user, newest first.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<image::Model>> {
        self.image_repo.find_by_user(user_id, limit, offset).await
    }

    /// Like an image. Liking twice leaves a single like.
    pub async fn like(&self, user_id: &str, image_id: &str) -> AppResult<()> {
        self.image_repo.get_by_id(image_id).await?;

        if self.image_repo.has_liked(image_id, user_id).await? {
            return Ok(());
        }

        let model = image_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            image_id: Set(image_id.to_string()),
            user_id: Set(user_id.to_string()),
            ..Default::default()
        };
        self.image_repo.create_like(model).await?;
        Ok(())
    }

    /// Remove a like. Succeeds without change if no like exists.
    pub async fn unlike(&self, user_id: &str, image_id: &str) -> AppResult<()> {
        self.image_repo.delete_like(image_id, user_id).await
    }

    /// Whether a user has liked an image.
    pub async fn has_liked(&self, user_id: &str, image_id: &str) -> AppResult<bool> {
        self.image_repo.has_liked(image_id, user_id).await
    }

    /// Users who liked an image, newest like first.
    pub async fn likers(&self, image_id: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let likes = self.image_repo.find_likes(image_id, limit).await?;
        let ids: Vec<String> = likes.into_iter().map(|l| l.user_id).collect();
        let users = self.user_repo.find_by_ids(&ids).await?;
        let mut by_id: std::collections::HashMap<String, user::Model> =
            users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Number of likes on an image.
    pub async fn count_likes(&self, image_id: &str) -> AppResult<u64> {
        self.image_repo.count_likes(image_id).await
    }

    async fn download(&self, url: &Url) -> AppResult<Vec<u8>> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to download image: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::BadRequest(format!(
                "Failed to download image: HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read image bytes: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Extract the allowed image extension from a URL path, if any.
#[must_use]
pub fn image_extension(url: &Url) -> Option<&'static str> {
    let path = url.path();
    let ext = path.rsplit('.').next()?.to_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .find(|allowed| **allowed == ext)
        .copied()
}
