//! Poll endpoints.

use axum::{extract::State, routing::post, Json, Router};
use bramble_common::AppResult;
use bramble_db::entities::{choice, question};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Request addressing a question by ID.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionIdRequest {
    pub question_id: String,
}

/// Vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub question_id: String,
    pub choice_id: String,
}

/// Request to create a question.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub text: String,
    pub choices: Vec<String>,
}

/// Question response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub text: String,
    pub published_at: String,
}

impl From<question::Model> for QuestionResponse {
    fn from(q: question::Model) -> Self {
        Self {
            id: q.id,
            text: q.text,
            published_at: q.published_at.to_rfc3339(),
        }
    }
}

/// Choice response with its tally.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceResponse {
    pub id: String,
    pub text: String,
    pub votes: i64,
}

impl From<choice::Model> for ChoiceResponse {
    fn from(c: choice::Model) -> Self {
        Self {
            id: c.id,
            text: c.text,
            votes: c.votes,
        }
    }
}

/// Question with choices response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetailResponse {
    pub question: QuestionResponse,
    pub choices: Vec<ChoiceResponse>,
}

/// Results response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub question: QuestionResponse,
    pub choices: Vec<ChoiceResponse>,
    pub total_votes: i64,
}

/// Latest questions.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<QuestionResponse>>> {
    let questions = state.poll_service.latest().await?;
    Ok(ApiResponse::ok(
        questions.into_iter().map(Into::into).collect(),
    ))
}

/// Show a question with its choices.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<QuestionIdRequest>,
) -> AppResult<ApiResponse<QuestionDetailResponse>> {
    let detail = state.poll_service.get(&req.question_id).await?;
    Ok(ApiResponse::ok(QuestionDetailResponse {
        question: detail.question.into(),
        choices: detail.choices.into_iter().map(Into::into).collect(),
    }))
}

/// Vote for a choice.
async fn vote(
    State(state): State<AppState>,
    Json(req): Json<VoteRequest>,
) -> AppResult<ApiResponse<ResultsResponse>> {
    let results = state
        .poll_service
        .vote(&req.question_id, &req.choice_id)
        .await?;
    Ok(ApiResponse::ok(ResultsResponse {
        question: results.question.into(),
        choices: results.choices.into_iter().map(Into::into).collect(),
        total_votes: results.total_votes,
    }))
}

/// Vote tallies for a question.
async fn results(
    State(state): State<AppState>,
    Json(req): Json<QuestionIdRequest>,
) -> AppResult<ApiResponse<ResultsResponse>> {
    let results = state.poll_service.results(&req.question_id).await?;
    Ok(ApiResponse::ok(ResultsResponse {
        question: results.question.into(),
        choices: results.choices.into_iter().map(Into::into).collect(),
        total_votes: results.total_votes,
    }))
}

/// Create a question with choices.
async fn create(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> AppResult<ApiResponse<QuestionDetailResponse>> {
    let created = state
        .poll_service
        .create_question(&req.text, &req.choices)
        .await?;
    Ok(ApiResponse::ok(QuestionDetailResponse {
        question: created.question.into(),
        choices: created.choices.into_iter().map(Into::into).collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/show", post(show))
        .route("/vote", post(vote))
        .route("/results", post(results))
        .route("/create", post(create))
}
