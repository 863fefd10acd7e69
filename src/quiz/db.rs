use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

use crate::{
    common::models::PagedResponse,
    config::config::CONFIG,
    quiz::models::{Quiz, QuizListItem, QuizListQuery},
    server::error::ServerError,
};

pub async fn list_quizzes(
    pool: &Pool<Postgres>,
    user_id: &Uuid,
    query: &QuizListQuery,
) -> Result<PagedResponse<QuizListItem>, ServerError> {
    let page_size = CONFIG.server.page_size as i64;
    let offset = page_size * query.page as i64;

    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        r#"
        SELECT q.id, q.title, q.slug, q.join_code, q.description, q.status, q.is_public,
            q.quiz_category_id, c.name AS category_name, q.created_at, q.updated_at
        FROM "quizzes" q
        LEFT JOIN "quiz_categories" c ON c.id = q.quiz_category_id
        WHERE q.user_id = "#,
    );
    builder.push_bind(user_id);

    if let Some(status) = query.status {
        builder.push(" AND q.status = ").push_bind(status);
    }

    if let Some(category) = query.category {
        builder.push(" AND q.quiz_category_id = ").push_bind(category);
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (q.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR q.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR q.join_code ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    builder
        .push(" ORDER BY q.created_at DESC LIMIT ")
        .push_bind(page_size + 1)
        .push(" OFFSET ")
        .push_bind(offset);

    let items = builder
        .build_query_as::<QuizListItem>()
        .fetch_all(pool)
        .await?;

    Ok(PagedResponse::from_overfetch(items, page_size as usize))
}

/// The single ownership predicate: resolves a quiz and checks it belongs to
/// the requester. Access denied fails closed before any mutation.
pub async fn get_owned_quiz(
    pool: &Pool<Postgres>,
    quiz_id: &Uuid,
    user_id: &Uuid,
) -> Result<Quiz, ServerError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, user_id, quiz_category_id, quiz_background_id, title, slug, join_code,
            description, status, is_public, starts_at, ends_at, settings, created_at, updated_at
        FROM "quizzes"
        WHERE id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ServerError::NotFound(format!(
        "Quiz with id {} does not exist",
        quiz_id
    )))?;

    if quiz.user_id != *user_id {
        warn!("User {} tried to access quiz {} they do not own", user_id, quiz_id);
        return Err(ServerError::AccessDenied);
    }

    Ok(quiz)
}

pub async fn create_quiz(pool: &Pool<Postgres>, quiz: &Quiz) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "quizzes" (id, user_id, quiz_category_id, quiz_background_id, title, slug,
            join_code, description, status, is_public, starts_at, ends_at, settings, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(quiz.id)
    .bind(quiz.user_id)
    .bind(quiz.quiz_category_id)
    .bind(quiz.quiz_background_id)
    .bind(&quiz.title)
    .bind(&quiz.slug)
    .bind(&quiz.join_code)
    .bind(&quiz.description)
    .bind(quiz.status)
    .bind(quiz.is_public)
    .bind(quiz.starts_at)
    .bind(quiz.ends_at)
    .bind(&quiz.settings)
    .bind(quiz.created_at)
    .bind(quiz.updated_at)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to create quiz".into()));
    }

    Ok(())
}

pub async fn update_quiz(pool: &Pool<Postgres>, quiz: &Quiz) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        UPDATE "quizzes"
        SET title = $1, description = $2, quiz_category_id = $3, quiz_background_id = $4,
            status = $5, is_public = $6, starts_at = $7, ends_at = $8, settings = $9,
            updated_at = now()
        WHERE id = $10
        "#,
    )
    .bind(&quiz.title)
    .bind(&quiz.description)
    .bind(quiz.quiz_category_id)
    .bind(quiz.quiz_background_id)
    .bind(quiz.status)
    .bind(quiz.is_public)
    .bind(quiz.starts_at)
    .bind(quiz.ends_at)
    .bind(&quiz.settings)
    .bind(quiz.id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no quiz with id: {}", quiz.id);
        return Err(ServerError::NotFound("Quiz does not exist".into()));
    }

    Ok(())
}

/// Questions and their children go with the quiz via cascading deletes.
pub async fn delete_quiz(pool: &Pool<Postgres>, quiz_id: &Uuid) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "quizzes" WHERE id = $1
        "#,
    )
    .bind(quiz_id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no quiz with id: {}", quiz_id);
        return Err(ServerError::NotFound("Quiz does not exist".into()));
    }

    Ok(())
}

pub async fn join_code_exists(pool: &Pool<Postgres>, join_code: &str) -> Result<bool, sqlx::Error> {
    let existing =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM \"quizzes\" WHERE join_code = $1")
            .bind(join_code)
            .fetch_optional(pool)
            .await?;

    Ok(existing.is_some())
}
