//! Poll repositories (questions and choices).

use std::sync::Arc;

use crate::entities::{choice, question, Choice, Question};
use bramble_common::{AppError, AppResult};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a question by ID, returning an error if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<question::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question not found: {id}")))
    }

    /// Latest questions by publish time.
    pub async fn find_latest(&self, limit: u64) -> AppResult<Vec<question::Model>> {
        Question::find()
            .order_by_desc(question::Column::PublishedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new question.
    pub async fn create(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Choice repository for database operations.
#[derive(Clone)]
pub struct ChoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl ChoiceRepository {
    /// Create a new choice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Choices for a question, in insertion order.
    pub async fn find_by_question(&self, question_id: &str) -> AppResult<Vec<choice::Model>> {
        Choice::find()
            .filter(choice::Column::QuestionId.eq(question_id))
            .order_by_asc(choice::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new choice.
    pub async fn create(&self, model: choice::ActiveModel) -> AppResult<choice::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the vote counter atomically (single UPDATE, no fetch).
    ///
    /// The WHERE clause pins the choice to its question, so a choice ID
    /// belonging to a different question affects zero rows. Returns the
    /// number of rows updated; 0 means the choice does not exist for the
    /// question.
    pub async fn increment_votes(&self, question_id: &str, choice_id: &str) -> AppResult<u64> {
        let result = Choice::update_many()
            .col_expr(
                choice::Column::Votes,
                Expr::col(choice::Column::Votes).add(1),
            )
            .filter(choice::Column::Id.eq(choice_id))
            .filter(choice::Column::QuestionId.eq(question_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_question(id: &str, text: &str) -> question::Model {
        question::Model {
            id: id.to_string(),
            text: text.to_string(),
            published_at: Utc::now().into(),
        }
    }

    fn create_test_choice(id: &str, question_id: &str, votes: i64) -> choice::Model {
        choice::Model {
            id: id.to_string(),
            question_id: question_id.to_string(),
            text: format!("Choice {id}"),
            votes,
        }
    }

    #[tokio::test]
    async fn test_find_latest() {
        let q1 = create_test_question("q1", "What's new?");
        let q2 = create_test_question("q2", "What's up?");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[q1, q2]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let result = repo.find_latest(5).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_question() {
        let c1 = create_test_choice("c1", "q1", 0);
        let c2 = create_test_choice("c2", "q1", 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = ChoiceRepository::new(db);
        let result = repo.find_by_question("q1").await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_increment_votes_hits_one_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ChoiceRepository::new(db);
        let rows = repo.increment_votes("q1", "c1").await.unwrap();

        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_increment_votes_foreign_choice_hits_nothing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ChoiceRepository::new(db);
        let rows = repo.increment_votes("q1", "other-question-choice").await.unwrap();

        assert_eq!(rows, 0);
    }
}
