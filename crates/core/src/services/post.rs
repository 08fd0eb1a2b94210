//! Post service.

use std::collections::HashSet;

use bramble_common::{
    pagination::{resolve_page, Page, PageToken},
    slugify, AppError, AppResult, IdGenerator,
};
use bramble_db::{
    entities::post::{self, PostStatus},
    repositories::PostRepository,
};
use chrono::{NaiveDate, Utc};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Published posts shown per listing page.
const POSTS_PER_PAGE: u64 = 3;

/// How many similar posts to surface on a detail page.
const SIMILAR_POSTS: usize = 4;

/// Cap on free-text search results.
const SEARCH_LIMIT: u64 = 50;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 250))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    /// Optional explicit slug; derived from the title when absent.
    #[validate(length(max = 250))]
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for updating a post. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 250))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub body: Option<String>,
    #[validate(length(min = 1, max = 250))]
    pub slug: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(post_repo: PostRepository) -> Self {
        Self {
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a draft post.
    pub async fn create(&self, user_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let slug = match input.slug {
            Some(ref s) if !s.trim().is_empty() => slugify(s),
            _ => slugify(&input.title),
        };
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Title does not produce a usable slug".to_string(),
            ));
        }

        let tags = normalize_tags(&input.tags);

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(input.title),
            slug: Set(slug),
            body: Set(input.body),
            status: Set(PostStatus::Draft),
            tags: Set(json!(tags)),
            published_at: Set(Utc::now().into()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        self.post_repo.create(model).await
    }

    /// Update a post. Only the author may edit.
    pub async fn update(
        &self,
        user_id: &str,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let existing = self.post_repo.get_by_id(post_id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can edit this post".to_string(),
            ));
        }

        let mut model: post::ActiveModel = existing.into();
        if let Some(title) = input.title {
            model.title = Set(title);
        }
        if let Some(body) = input.body {
            model.body = Set(body);
        }
        if let Some(slug) = input.slug {
            let slug = slugify(&slug);
            if slug.is_empty() {
                return Err(AppError::Validation("Slug cannot be empty".to_string()));
            }
            model.slug = Set(slug);
        }
        if let Some(ref tags) = input.tags {
            model.tags = Set(json!(normalize_tags(tags)));
        }
        model.updated_at = Set(Some(Utc::now().into()));

        self.post_repo.update(model).await
    }

    /// Publish a draft. Publishing an already published post is a no-op;
    /// there is no transition back to draft.
    pub async fn publish(&self, user_id: &str, post_id: &str) -> AppResult<post::Model> {
        let existing = self.post_repo.get_by_id(post_id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can publish this post".to_string(),
            ));
        }
        if existing.status == PostStatus::Published {
            return Ok(existing);
        }

        let mut model: post::ActiveModel = existing.into();
        model.status = Set(PostStatus::Published);
        model.published_at = Set(Utc::now().into());
        model.updated_at = Set(Some(Utc::now().into()));

        self.post_repo.update(model).await
    }

    /// Delete a post. Only the author may delete.
    pub async fn delete(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        let existing = self.post_repo.get_by_id(post_id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can delete this post".to_string(),
            ));
        }
        self.post_repo.delete(post_id).await
    }

    /// Get a published post by ID. Drafts read as not found.
    pub async fn get_published(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_published_by_id(post_id).await
    }

    /// Get a post by ID for its author, draft or published.
    pub async fn get_for_author(&self, user_id: &str, post_id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can view this post".to_string(),
            ));
        }
        Ok(post)
    }

    /// Resolve a published post by its publish date and slug.
    pub async fn get_by_date_slug(&self, date: NaiveDate, slug: &str) -> AppResult<post::Model> {
        self.post_repo
            .find_by_date_slug(date, slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post not found: {slug}")))
    }

    /// Paginated published posts, newest first, optionally restricted to a
    /// tag. Out-of-range page tokens clamp rather than error.
    pub async fn list_published(
        &self,
        tag: Option<&str>,
        token: &PageToken,
    ) -> AppResult<Page<post::Model>> {
        let total = self.post_repo.count_published(tag).await?;
        let (page, offset) = resolve_page(token, total, POSTS_PER_PAGE);
        let items = self
            .post_repo
            .find_published(tag, POSTS_PER_PAGE, offset)
            .await?;
        Ok(Page::new(items, page, total, POSTS_PER_PAGE))
    }

    /// Posts authored by a user, drafts included, newest first.
    pub async fn list_by_author(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_user(user_id, limit, offset).await
    }

    /// Published posts sharing tags with the given post, most shared tags
    /// first, ties broken by recency. An untagged post has no similars.
    pub async fn similar_posts(&self, post_id: &str) -> AppResult<Vec<post::Model>> {
        let post = self.post_repo.get_published_by_id(post_id).await?;
        let tags = post.tag_list();
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.post_repo.find_sharing_tags(&tags, post_id).await?;
        Ok(rank_similar(candidates, &tags, SIMILAR_POSTS))
    }

    /// Free-text search over published posts. An empty query matches nothing.
    pub async fn search(&self, query: &str) -> AppResult<Vec<post::Model>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.post_repo.search_like(query, SEARCH_LIMIT).await
    }
}

/// Normalize tags: lowercase, trimmed, empties dropped, first occurrence wins.
#[must_use]
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Rank candidate posts by how many tags they share with `tags`, most first,
/// ties broken by `published_at` descending. Keeps the top `limit`.
#[must_use]
pub fn rank_similar(
    candidates: Vec<post::Model>,
    tags: &[String],
    limit: usize,
) -> Vec<post::Model> {
    let tag_set: HashSet<&str> = tags.iter().map(String::as_str).collect();

    let mut scored: Vec<(usize, post::Model)> = candidates
        .into_iter()
        .map(|p| {
            let shared = p
                .tag_list()
                .iter()
                .filter(|t| tag_set.contains(t.as_str()))
                .count();
            (shared, p)
        })
        .filter(|(shared, _)| *shared > 0)
        .collect();

    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.published_at.cmp(&a.1.published_at))
    });

    scored.into_iter().take(limit).map(|(_, p)| p).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, user_id: &str, tags: &[&str], age_days: i64) -> post::Model {
        let published_at = Utc::now() - Duration::days(age_days);
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            body: "body".to_string(),
            status: PostStatus::Published,
            tags: json!(tags),
            published_at: published_at.into(),
            created_at: published_at.into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> PostService {
        PostService::new(PostRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            "Rust".to_string(),
            " rust ".to_string(),
            "Web".to_string(),
            String::new(),
            "  ".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["rust", "web"]);
    }

    #[test]
    fn test_rank_similar_by_shared_count() {
        let one_shared = create_test_post("p1", "u1", &["rust"], 0);
        let two_shared = create_test_post("p2", "u1", &["rust", "web"], 5);

        let tags = vec!["rust".to_string(), "web".to_string()];
        let ranked = rank_similar(vec![one_shared, two_shared], &tags, 4);

        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[test]
    fn test_rank_similar_ties_break_by_recency() {
        let older = create_test_post("p1", "u1", &["rust"], 10);
        let newer = create_test_post("p2", "u1", &["rust"], 1);

        let tags = vec!["rust".to_string()];
        let ranked = rank_similar(vec![older, newer], &tags, 4);

        let ids: Vec<&str> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[test]
    fn test_rank_similar_drops_unrelated_and_truncates() {
        let unrelated = create_test_post("p0", "u1", &["cooking"], 0);
        let mut candidates = vec![unrelated];
        for i in 1..=6 {
            candidates.push(create_test_post(&format!("p{i}"), "u1", &["rust"], i));
        }

        let tags = vec!["rust".to_string()];
        let ranked = rank_similar(candidates, &tags, 4);

        assert_eq!(ranked.len(), 4);
        assert!(ranked.iter().all(|p| p.id != "p0"));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let existing = create_test_post("p1", "u1", &[], 0);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let input = UpdatePostInput {
            title: Some("New title".to_string()),
            body: None,
            slug: None,
            tags: None,
        };
        let result = svc.update("u2", "p1", input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_publish_published_post_is_noop() {
        // Already published: no UPDATE should be issued.
        let existing = create_test_post("p1", "u1", &[], 0);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]]),
        );

        let post = svc.publish("u1", "p1").await.unwrap();
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.published_at, existing.published_at);
    }

    #[tokio::test]
    async fn test_create_rejects_unsluggable_title() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let input = CreatePostInput {
            title: "!!!".to_string(),
            body: "body".to_string(),
            slug: None,
            tags: vec![],
        };
        let result = svc.create("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_empty_query_matches_nothing() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let results = svc.search("   ").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_list_published_clamps_past_the_end() {
        // 4 published posts, page size 3: page 99 serves page 2.
        let page_two = vec![create_test_post("p4", "u1", &[], 4)];
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(4))
                }]])
                .append_query_results([page_two]),
        );

        let page = svc
            .list_published(None, &PageToken::Number(99))
            .await
            .unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
    }
}
