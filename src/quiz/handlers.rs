use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    auth::models::AuthUser,
    background::{self, models::Background},
    category,
    common::{codes, forms::FormData, uploads::IMAGE_MIMES},
    config::config::CONFIG,
    question::{
        self,
        models::{QuestionWithChildren, SyncQuestionsRequest},
        sync,
    },
    quiz::{
        db,
        models::{Quiz, QuizListQuery, QuizStatus},
    },
    server::{app_state::AppState, error::ServerError},
};

const JOIN_CODE_ATTEMPTS: u8 = 5;

pub fn quiz_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route(
            "/{quiz_id}",
            get(get_quiz).put(update_quiz).delete(delete_quiz),
        )
        .route(
            "/{quiz_id}/questions",
            get(get_quiz_questions).post(store_questions),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct QuizWithQuestions {
    #[serde(flatten)]
    quiz: Quiz,
    questions: Vec<QuestionWithChildren>,
}

async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<QuizListQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let page = db::list_quizzes(state.get_pool(), &user.id, &query).await?;
    Ok((StatusCode::OK, Json(page)))
}

async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let quiz = db::get_owned_quiz(state.get_pool(), &quiz_id, &user.id).await?;
    Ok((StatusCode::OK, Json(quiz)))
}

async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let form = FormData::read(multipart).await?;

    let title = form.require("title")?.to_string();
    let description = form.text("description").map(|s| s.to_string());

    let category_id = form
        .uuid("quiz_category_id")?
        .ok_or(ServerError::Validation(
            "The quiz_category_id field is required".into(),
        ))?;
    let selected_background = form.uuid("quiz_background_id")?;

    ensure_quiz_references(
        state.get_pool(),
        Some(&category_id),
        selected_background.as_ref(),
    )
    .await?;

    let background_id =
        resolve_background(&state, &user, &form, selected_background, &title).await?;

    let join_code = unique_join_code(&state).await?;
    let quiz = Quiz::from_create(
        user.id,
        &title,
        description,
        Some(category_id),
        background_id,
        join_code,
    );
    db::create_quiz(state.get_pool(), &quiz).await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

async fn update_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(quiz_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let mut quiz = db::get_owned_quiz(state.get_pool(), &quiz_id, &user.id).await?;
    let form = FormData::read(multipart).await?;

    quiz.title = form.require("title")?.to_string();
    quiz.description = form.text("description").map(|s| s.to_string());
    quiz.quiz_category_id = form.uuid("quiz_category_id")?;

    let status_raw = form.require("status")?;
    quiz.status = QuizStatus::parse(status_raw).ok_or_else(|| {
        ServerError::Validation(format!("Status {} is not a valid quiz status", status_raw))
    })?;

    // The form carries the full representation: a blank or absent field
    // clears the stored value.
    quiz.is_public = form.flag("is_public");
    quiz.starts_at = optional_timestamp(&form, "starts_at")?;
    quiz.ends_at = optional_timestamp(&form, "ends_at")?;
    quiz.settings = optional_settings(&form)?;

    let selected_background = form.uuid("quiz_background_id")?;

    ensure_quiz_references(
        state.get_pool(),
        quiz.quiz_category_id.as_ref(),
        selected_background.as_ref(),
    )
    .await?;

    quiz.quiz_background_id =
        resolve_background(&state, &user, &form, selected_background, &quiz.title).await?;

    db::update_quiz(state.get_pool(), &quiz).await?;

    Ok((StatusCode::OK, Json(quiz)))
}

async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let quiz = db::get_owned_quiz(state.get_pool(), &quiz_id, &user.id).await?;
    db::delete_quiz(state.get_pool(), &quiz.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn get_quiz_questions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let quiz = db::get_owned_quiz(state.get_pool(), &quiz_id, &user.id).await?;
    let questions = question::db::get_questions_with_children(state.get_pool(), &quiz.id).await?;

    Ok((StatusCode::OK, Json(QuizWithQuestions { quiz, questions })))
}

async fn store_questions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(quiz_id): Path<Uuid>,
    Json(request): Json<SyncQuestionsRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let quiz = db::get_owned_quiz(state.get_pool(), &quiz_id, &user.id).await?;
    sync::sync_questions(state.get_pool(), &quiz, &request.questions).await?;

    let questions = question::db::get_questions_with_children(state.get_pool(), &quiz.id).await?;
    Ok((StatusCode::OK, Json(questions)))
}

/// Both referenced ids must resolve before any row is written, so a stale
/// picker selection comes back as a validation error rather than a foreign
/// key failure.
pub(crate) async fn ensure_quiz_references(
    pool: &Pool<Postgres>,
    category_id: Option<&Uuid>,
    background_id: Option<&Uuid>,
) -> Result<(), ServerError> {
    if let Some(category_id) = category_id {
        if category::db::get_category_by_id(pool, category_id)
            .await?
            .is_none()
        {
            return Err(ServerError::Validation(
                "The selected category does not exist".into(),
            ));
        }
    }

    if let Some(background_id) = background_id {
        if background::db::get_background_by_id(pool, background_id)
            .await?
            .is_none()
        {
            return Err(ServerError::Validation(
                "The selected background does not exist".into(),
            ));
        }
    }

    Ok(())
}

fn optional_timestamp(form: &FormData, name: &str) -> Result<Option<DateTime<Utc>>, ServerError> {
    match form.text(name) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            ServerError::Validation(format!("The {} field must be an RFC 3339 timestamp", name))
        }),
    }
}

fn optional_settings(form: &FormData) -> Result<Option<serde_json::Value>, ServerError> {
    match form.text("settings") {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw).map(Some).map_err(|_| {
            ServerError::Validation("The settings field must be valid JSON".into())
        }),
    }
}

/// An uploaded background file wins over a selected background id: it is
/// stored on disk and materialized as a private background owned by the
/// requester, exactly like picking it from the library afterwards.
async fn resolve_background(
    state: &Arc<AppState>,
    user: &AuthUser,
    form: &FormData,
    selected: Option<Uuid>,
    title: &str,
) -> Result<Option<Uuid>, ServerError> {
    let Some(file) = form.file("background_file") else {
        return Ok(selected);
    };

    let stored = state
        .get_uploads()
        .store(
            "backgrounds",
            title,
            file,
            IMAGE_MIMES,
            CONFIG.uploads.gallery_max_bytes,
        )
        .await?;

    let background = Background::from_upload(
        user.id,
        format!("Background for {}", title),
        stored.path,
        false,
    );
    background::db::create_background(state.get_pool(), &background).await?;

    Ok(Some(background.id))
}

async fn unique_join_code(state: &Arc<AppState>) -> Result<String, ServerError> {
    let mut join_code = codes::join_code();

    for _ in 0..JOIN_CODE_ATTEMPTS {
        if !db::join_code_exists(state.get_pool(), &join_code).await? {
            return Ok(join_code);
        }
        join_code = codes::join_code();
    }

    // 36^6 codes, five collisions in a row means something is wrong.
    Err(ServerError::Internal(
        "Failed to generate a unique join code".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::forms::FormData;

    #[test]
    fn blank_schedule_fields_clear_the_stored_values() {
        let form = FormData::from_fields(&[("starts_at", ""), ("settings", "")]);
        assert!(optional_timestamp(&form, "starts_at").unwrap().is_none());
        assert!(optional_timestamp(&form, "ends_at").unwrap().is_none());
        assert!(optional_settings(&form).unwrap().is_none());
    }

    #[test]
    fn schedule_fields_parse_rfc3339() {
        let form = FormData::from_fields(&[("starts_at", "2026-09-01T08:00:00Z")]);
        let parsed = optional_timestamp(&form, "starts_at").unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-09-01T08:00:00+00:00");

        let form = FormData::from_fields(&[("ends_at", "next tuesday")]);
        assert!(matches!(
            optional_timestamp(&form, "ends_at"),
            Err(ServerError::Validation(_))
        ));
    }

    #[test]
    fn settings_must_be_valid_json() {
        let form = FormData::from_fields(&[("settings", r#"{"shuffle": true}"#)]);
        let settings = optional_settings(&form).unwrap().unwrap();
        assert_eq!(settings["shuffle"], true);

        let form = FormData::from_fields(&[("settings", "{broken")]);
        assert!(matches!(
            optional_settings(&form),
            Err(ServerError::Validation(_))
        ));
    }
}
