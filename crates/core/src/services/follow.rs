//! Follow service.

use bramble_common::{AppError, AppResult, IdGenerator};
use bramble_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Follow service for business logic.
///
/// Follow and unfollow are idempotent: repeating either leaves the edge set
/// unchanged and succeeds.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user. Succeeds without change if the edge already exists.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if follower_id == followee_id {
            return Err(AppError::Validation(
                "Cannot follow yourself".to_string(),
            ));
        }

        if self
            .follow_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Ok(());
        }

        // Both sides must exist
        let follower = self.user_repo.get_by_id(follower_id).await?;
        let followee = self.user_repo.get_by_id(followee_id).await?;

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower.id),
            followee_id: Set(followee.id),
            ..Default::default()
        };
        self.follow_repo.create(model).await?;

        tracing::debug!(follower = %follower_id, followee = %followee_id, "Follow created");
        Ok(())
    }

    /// Unfollow a user. Succeeds without change if no edge exists.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        self.follow_repo
            .delete_by_pair(follower_id, followee_id)
            .await
    }

    /// Check if one user follows another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, followee_id).await
    }

    /// Users following `user_id`, newest edge first.
    pub async fn followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        let edges = self.follow_repo.find_followers(user_id, limit, offset).await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.follower_id).collect();
        self.resolve_in_order(&ids).await
    }

    /// Users that `user_id` follows, newest edge first.
    pub async fn following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        let edges = self.follow_repo.find_following(user_id, limit, offset).await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.followee_id).collect();
        self.resolve_in_order(&ids).await
    }

    /// Number of followers.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        self.follow_repo.count_followers(user_id).await
    }

    /// Number of users followed.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        self.follow_repo.count_following(user_id).await
    }

    /// Load users for a list of IDs, preserving the edge ordering.
    async fn resolve_in_order(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        let users = self.user_repo.find_by_ids(ids).await?;
        let mut by_id: std::collections::HashMap<String, user::Model> =
            users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
