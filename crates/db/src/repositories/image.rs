//! Image repository, including the like relation.

use std::sync::Arc;

use crate::entities::{image, image_like, Image, ImageLike};
use bramble_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Image repository for database operations.
#[derive(Clone)]
pub struct ImageRepository {
    db: Arc<DatabaseConnection>,
}

impl ImageRepository {
    /// Create a new image repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an image by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<image::Model>> {
        Image::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an image by ID, returning an error if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<image::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image not found: {id}")))
    }

    /// Create a new image.
    pub async fn create(&self, model: image::ActiveModel) -> AppResult<image::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an image.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Image::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All images, newest first.
    pub async fn find_all(&self, limit: u64, offset: u64) -> AppResult<Vec<image::Model>> {
        Image::find()
            .order_by_desc(image::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all images.
    pub async fn count_all(&self) -> AppResult<u64> {
        Image::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Images owned by a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<image::Model>> {
        Image::find()
            .filter(image::Column::UserId.eq(user_id))
            .order_by_desc(image::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // === Likes ===

    /// Find a like by image and user.
    pub async fn find_like(
        &self,
        image_id: &str,
        user_id: &str,
    ) -> AppResult<Option<image_like::Model>> {
        ImageLike::find()
            .filter(image_like::Column::ImageId.eq(image_id))
            .filter(image_like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked an image.
    pub async fn has_liked(&self, image_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self.find_like(image_id, user_id).await?.is_some())
    }

    /// Record a like.
    pub async fn create_like(&self, model: image_like::ActiveModel) -> AppResult<image_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a like by pair. No-op if absent.
    pub async fn delete_like(&self, image_id: &str, user_id: &str) -> AppResult<()> {
        let like = self.find_like(image_id, user_id).await?;
        if let Some(l) = like {
            l.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Likes on an image, newest first.
    pub async fn find_likes(&self, image_id: &str, limit: u64) -> AppResult<Vec<image_like::Model>> {
        ImageLike::find()
            .filter(image_like::Column::ImageId.eq(image_id))
            .order_by_desc(image_like::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes on an image.
    pub async fn count_likes(&self, image_id: &str) -> AppResult<u64> {
        ImageLike::find()
            .filter(image_like::Column::ImageId.eq(image_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_image(id: &str, user_id: &str) -> image::Model {
        image::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Sunset".to_string(),
            slug: "sunset".to_string(),
            source_url: "https://example.com/sunset.jpg".to_string(),
            file_key: "images/2026/08/24/u1/sunset.jpg".to_string(),
            description: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_like(id: &str, image_id: &str, user_id: &str) -> image_like::Model {
        image_like::Model {
            id: id.to_string(),
            image_id: image_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<image::Model>::new()])
                .into_connection(),
        );

        let repo = ImageRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_has_liked_true() {
        let like = create_test_like("l1", "i1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like.clone()]])
                .into_connection(),
        );

        let repo = ImageRepository::new(db);
        assert!(repo.has_liked("i1", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_like_absent_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<image_like::Model>::new()])
                .into_connection(),
        );

        let repo = ImageRepository::new(db);
        repo.delete_like("i1", "u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_like_present() {
        let like = create_test_like("l1", "i1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ImageRepository::new(db);
        repo.delete_like("i1", "u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_find_all() {
        let i1 = create_test_image("i1", "u1");
        let i2 = create_test_image("i2", "u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[i1, i2]])
                .into_connection(),
        );

        let repo = ImageRepository::new(db);
        let result = repo.find_all(8, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
