use sqlx::{Pool, Postgres};
use tracing::warn;
use uuid::Uuid;

use crate::{
    background::models::Background,
    common::models::PagedResponse,
    config::config::CONFIG,
    server::error::ServerError,
};

pub async fn list_backgrounds(
    pool: &Pool<Postgres>,
    page: u16,
) -> Result<PagedResponse<Background>, ServerError> {
    let page_size = CONFIG.server.page_size as i64;
    let offset = page_size * page as i64;

    let items = sqlx::query_as::<_, Background>(
        r#"
        SELECT id, user_id, name, image_path, is_public, created_at, updated_at
        FROM "quiz_backgrounds"
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page_size + 1)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(PagedResponse::from_overfetch(items, page_size as usize))
}

pub async fn get_background_by_id(
    pool: &Pool<Postgres>,
    background_id: &Uuid,
) -> Result<Option<Background>, sqlx::Error> {
    sqlx::query_as::<_, Background>(
        r#"
        SELECT id, user_id, name, image_path, is_public, created_at, updated_at
        FROM "quiz_backgrounds"
        WHERE id = $1
        "#,
    )
    .bind(background_id)
    .fetch_optional(pool)
    .await
}

pub async fn create_background(
    pool: &Pool<Postgres>,
    background: &Background,
) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "quiz_backgrounds" (id, user_id, name, image_path, is_public, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(background.id)
    .bind(background.user_id)
    .bind(&background.name)
    .bind(&background.image_path)
    .bind(background.is_public)
    .bind(background.created_at)
    .bind(background.updated_at)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to create background".into()));
    }

    Ok(())
}

pub async fn update_background(
    pool: &Pool<Postgres>,
    background: &Background,
) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        UPDATE "quiz_backgrounds"
        SET name = $1, image_path = $2, is_public = $3, updated_at = now()
        WHERE id = $4
        "#,
    )
    .bind(&background.name)
    .bind(&background.image_path)
    .bind(background.is_public)
    .bind(background.id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no background with id: {}", background.id);
        return Err(ServerError::NotFound("Background does not exist".into()));
    }

    Ok(())
}

pub async fn delete_background(
    pool: &Pool<Postgres>,
    background_id: &Uuid,
) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "quiz_backgrounds" WHERE id = $1
        "#,
    )
    .bind(background_id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no background with id: {}", background_id);
        return Err(ServerError::NotFound("Background does not exist".into()));
    }

    Ok(())
}
