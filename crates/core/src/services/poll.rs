//! Poll service.

use bramble_common::{AppError, AppResult, IdGenerator};
use bramble_db::{
    entities::{choice, question},
    repositories::{ChoiceRepository, QuestionRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// How many questions the index shows.
const LATEST_QUESTIONS: u64 = 5;

/// A question together with its choices.
#[derive(Debug, Serialize)]
pub struct QuestionWithChoices {
    pub question: question::Model,
    pub choices: Vec<choice::Model>,
}

/// Vote tallies for a question.
#[derive(Debug, Serialize)]
pub struct PollResults {
    pub question: question::Model,
    pub choices: Vec<choice::Model>,
    pub total_votes: i64,
}

/// Poll service for business logic.
///
/// Votes increment the tally in a single conditional UPDATE, so concurrent
/// votes never lose counts.
#[derive(Clone)]
pub struct PollService {
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
    id_gen: IdGenerator,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(question_repo: QuestionRepository, choice_repo: ChoiceRepository) -> Self {
        Self {
            question_repo,
            choice_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a question with its choices.
    pub async fn create_question(
        &self,
        text: &str,
        choices: &[String],
    ) -> AppResult<QuestionWithChoices> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Question text is required".to_string()));
        }
        if choices.len() < 2 {
            return Err(AppError::Validation(
                "A question needs at least 2 choices".to_string(),
            ));
        }
        if choices.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::Validation("Choices cannot be empty".to_string()));
        }

        let question = self
            .question_repo
            .create(question::ActiveModel {
                id: Set(self.id_gen.generate()),
                text: Set(text.to_string()),
                ..Default::default()
            })
            .await?;

        let mut created = Vec::with_capacity(choices.len());
        for choice_text in choices {
            let model = choice::ActiveModel {
                id: Set(self.id_gen.generate()),
                question_id: Set(question.id.clone()),
                text: Set(choice_text.trim().to_string()),
                votes: Set(0),
            };
            created.push(self.choice_repo.create(model).await?);
        }

        Ok(QuestionWithChoices {
            question,
            choices: created,
        })
    }

    /// The most recent questions, newest first.
    pub async fn latest(&self) -> AppResult<Vec<question::Model>> {
        self.question_repo.find_latest(LATEST_QUESTIONS).await
    }

    /// Get a question with its choices.
    pub async fn get(&self, question_id: &str) -> AppResult<QuestionWithChoices> {
        let question = self.question_repo.get_by_id(question_id).await?;
        let choices = self.choice_repo.find_by_question(question_id).await?;
        Ok(QuestionWithChoices { question, choices })
    }

    /// Record a vote for a choice.
    ///
    /// The tally moves atomically in the database. A choice ID that does not
    /// belong to the question reads as no selection.
    pub async fn vote(&self, question_id: &str, choice_id: &str) -> AppResult<PollResults> {
        self.question_repo.get_by_id(question_id).await?;

        let updated = self
            .choice_repo
            .increment_votes(question_id, choice_id)
            .await?;
        if updated == 0 {
            return Err(AppError::Validation(
                "You didn't select a choice.".to_string(),
            ));
        }

        self.results(question_id).await
    }

    /// Vote tallies for a question.
    pub async fn results(&self, question_id: &str) -> AppResult<PollResults> {
        let question = self.question_repo.get_by_id(question_id).await?;
        let choices = self.choice_repo.find_by_question(question_id).await?;
        let total_votes = choices.iter().map(|c| c.votes).sum();
        Ok(PollResults {
            question,
            choices,
            total_votes,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

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

    fn service(question_db: MockDatabase, choice_db: MockDatabase) -> PollService {
        PollService::new(
            QuestionRepository::new(Arc::new(question_db.into_connection())),
            ChoiceRepository::new(Arc::new(choice_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_create_question_requires_two_choices() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = svc
            .create_question("Best language?", &["Rust".to_string()])
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_vote_increments_and_returns_results() {
        let q = create_test_question("q1", "Best language?");
        let question_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[q.clone()]])
            .append_query_results([[q]]);
        let choice_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[
                create_test_choice("c1", "q1", 3),
                create_test_choice("c2", "q1", 1),
            ]]);

        let svc = service(question_db, choice_db);
        let results = svc.vote("q1", "c1").await.unwrap();

        assert_eq!(results.total_votes, 4);
        assert_eq!(results.choices.len(), 2);
    }

    #[tokio::test]
    async fn test_vote_for_foreign_choice_is_rejected() {
        // The conditional UPDATE touches no rows for a choice from another
        // question.
        let q = create_test_question("q1", "Best language?");
        let question_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[q]]);
        let choice_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]);

        let svc = service(question_db, choice_db);
        let result = svc.vote("q1", "other-question-choice").await;

        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "You didn't select a choice.");
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_results_sums_votes() {
        let q = create_test_question("q1", "Best language?");
        let question_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[q]]);
        let choice_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            create_test_choice("c1", "q1", 10),
            create_test_choice("c2", "q1", 5),
        ]]);

        let svc = service(question_db, choice_db);
        let results = svc.results("q1").await.unwrap();

        assert_eq!(results.total_votes, 15);
    }
}
