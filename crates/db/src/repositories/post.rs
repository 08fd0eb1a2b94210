//! Post repository.

use std::sync::Arc;

use crate::entities::{post, Post};
use bramble_common::{AppError, AppResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{
    sea_query::{Expr, SimpleExpr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, returning an error if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post not found: {id}")))
    }

    /// Get a published post by ID; drafts read as not found.
    pub async fn get_published_by_id(&self, id: &str) -> AppResult<post::Model> {
        Post::find_by_id(id)
            .filter(post::Column::Status.eq(post::PostStatus::Published))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Post not found: {id}")))
    }

    /// Find a published post by its publish date and slug.
    pub async fn find_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> AppResult<Option<post::Model>> {
        let day_start: DateTime<Utc> = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| AppError::Internal("Invalid date".to_string()))?;
        let day_end = day_start + Duration::days(1);

        Post::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Status.eq(post::PostStatus::Published))
            .filter(post::Column::PublishedAt.gte(day_start))
            .filter(post::Column::PublishedAt.lt(day_end))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published posts, newest first, optionally restricted to a tag.
    pub async fn find_published(
        &self,
        tag: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(Self::published_condition(tag))
            .order_by_desc(post::Column::PublishedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count published posts, optionally restricted to a tag.
    pub async fn count_published(&self, tag: Option<&str>) -> AppResult<u64> {
        Post::find()
            .filter(Self::published_condition(tag))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published posts carrying at least one of the given tags, excluding one
    /// post. Candidates for tag-overlap ranking; the caller scores them.
    pub async fn find_sharing_tags(
        &self,
        tags: &[String],
        exclude_id: &str,
    ) -> AppResult<Vec<post::Model>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut any_tag = Condition::any();
        for tag in tags {
            any_tag = any_tag.add(tag_contains(tag));
        }

        Post::find()
            .filter(post::Column::Status.eq(post::PostStatus::Published))
            .filter(post::Column::Id.ne(exclude_id))
            .filter(any_tag)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// LIKE-based free-text search over title and body of published posts.
    pub async fn search_like(&self, query: &str, limit: u64) -> AppResult<Vec<post::Model>> {
        let search_pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));

        let matches = Condition::any()
            .add(post::Column::Title.like(&search_pattern))
            .add(post::Column::Body.like(&search_pattern));

        Post::find()
            .filter(post::Column::Status.eq(post::PostStatus::Published))
            .filter(matches)
            .order_by_desc(post::Column::PublishedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts authored by a user, newest first, drafts included.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::PublishedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    fn published_condition(tag: Option<&str>) -> Condition {
        let mut condition =
            Condition::all().add(post::Column::Status.eq(post::PostStatus::Published));
        if let Some(tag) = tag {
            condition = condition.add(tag_contains(tag));
        }
        condition
    }
}

/// jsonb containment test for a single tag: `tags @> '["tag"]'::jsonb`.
///
/// The tags column is jsonb, so this must go through containment; a string
/// LIKE has no jsonb operator and cannot match one element of a multi-tag
/// array anyway.
fn tag_contains(tag: &str) -> SimpleExpr {
    let tag_json = serde_json::json!([tag.to_lowercase()]).to_string();
    Expr::cust_with_values("\"tags\" @> ?::jsonb", [tag_json])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_post(id: &str, status: post::PostStatus, tags: &[&str]) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            body: "body".to_string(),
            status,
            tags: json!(tags),
            published_at: Utc::now().into(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_published_hides_drafts() {
        // The status filter is part of the SQL, so a draft row is simply
        // never returned by the backend.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_published_by_id("draft1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_published() {
        let p1 = create_test_post("p1", post::PostStatus::Published, &["rust"]);
        let p2 = create_test_post("p2", post::PostStatus::Published, &["web"]);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1, p2]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_published(None, 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_tag_filters_use_jsonb_containment() {
        // Both tag paths must emit `tags @> ...::jsonb`; a LIKE against the
        // jsonb column is a Postgres type error at runtime.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(Arc::clone(&db));
        repo.find_published(Some("Rust"), 10, 0).await.unwrap();
        repo.find_sharing_tags(&["rust".to_string(), "web".to_string()], "p1")
            .await
            .unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("@>"), "expected jsonb containment in: {sql}");
        assert!(!sql.contains("LIKE"), "unexpected LIKE in: {sql}");
    }

    #[tokio::test]
    async fn test_find_sharing_tags_empty_tag_set() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PostRepository::new(db);
        let result = repo.find_sharing_tags(&[], "p1").await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_search_like() {
        let p1 = create_test_post("p1", post::PostStatus::Published, &[]);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.search_like("Post", 10).await.unwrap();

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_date_slug_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let result = repo.find_by_date_slug(date, "nope").await.unwrap();

        assert!(result.is_none());
    }
}
