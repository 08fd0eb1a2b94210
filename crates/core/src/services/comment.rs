//! Comment service.

use bramble_common::{AppResult, IdGenerator};
use bramble_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for adding a comment to a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub body: String,
}

/// Comment service for business logic.
///
/// Comments attach to published posts only; comments on drafts read as the
/// post not existing. New comments are active and readers see active ones.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a published post.
    pub async fn add_comment(
        &self,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let post = self.post_repo.get_published_by_id(post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            author_name: Set(input.name),
            author_email: Set(input.email),
            body: Set(input.body),
            active: Set(true),
            ..Default::default()
        };

        self.comment_repo.create(model).await
    }

    /// Active comments on a published post, oldest first.
    pub async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        self.post_repo.get_published_by_id(post_id).await?;
        self.comment_repo.find_active_by_post(post_id).await
    }

    /// Number of active comments on a published post.
    pub async fn count_for_post(&self, post_id: &str) -> AppResult<u64> {
        self.post_repo.get_published_by_id(post_id).await?;
        self.comment_repo.count_active_by_post(post_id).await
    }

    /// Toggle a comment's visibility. Deactivated comments stay stored but
    /// drop out of listings.
    pub async fn set_active(&self, comment_id: &str, active: bool) -> AppResult<comment::Model> {
        self.comment_repo.set_active(comment_id, active).await
    }
}
