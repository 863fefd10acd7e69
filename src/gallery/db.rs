use sqlx::{Pool, Postgres};
use tracing::warn;
use uuid::Uuid;

use crate::{
    common::models::PagedResponse,
    config::config::CONFIG,
    gallery::models::GalleryItem,
    server::error::ServerError,
};

pub async fn list_galleries(
    pool: &Pool<Postgres>,
    page: u16,
) -> Result<PagedResponse<GalleryItem>, ServerError> {
    let page_size = CONFIG.server.page_size as i64;
    let offset = page_size * page as i64;

    let items = sqlx::query_as::<_, GalleryItem>(
        r#"
        SELECT id, user_id, title, file_path, file_type, mime_type, size, created_at, updated_at
        FROM "galleries"
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

pub async fn get_gallery_by_id(
    pool: &Pool<Postgres>,
    gallery_id: &Uuid,
) -> Result<Option<GalleryItem>, sqlx::Error> {
    sqlx::query_as::<_, GalleryItem>(
        r#"
        SELECT id, user_id, title, file_path, file_type, mime_type, size, created_at, updated_at
        FROM "galleries"
        WHERE id = $1
        "#,
    )
    .bind(gallery_id)
    .fetch_optional(pool)
    .await
}

pub async fn create_gallery(pool: &Pool<Postgres>, item: &GalleryItem) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "galleries" (id, user_id, title, file_path, file_type, mime_type, size, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(item.id)
    .bind(item.user_id)
    .bind(&item.title)
    .bind(&item.file_path)
    .bind(item.file_type)
    .bind(&item.mime_type)
    .bind(item.size)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to create gallery item".into()));
    }

    Ok(())
}

pub async fn update_gallery(pool: &Pool<Postgres>, item: &GalleryItem) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        UPDATE "galleries"
        SET title = $1, file_path = $2, file_type = $3, mime_type = $4, size = $5, updated_at = now()
        WHERE id = $6
        "#,
    )
    .bind(&item.title)
    .bind(&item.file_path)
    .bind(item.file_type)
    .bind(&item.mime_type)
    .bind(item.size)
    .bind(item.id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no gallery item with id: {}", item.id);
        return Err(ServerError::NotFound("Gallery item does not exist".into()));
    }

    Ok(())
}

pub async fn delete_gallery(pool: &Pool<Postgres>, gallery_id: &Uuid) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "galleries" WHERE id = $1
        "#,
    )
    .bind(gallery_id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no gallery item with id: {}", gallery_id);
        return Err(ServerError::NotFound("Gallery item does not exist".into()));
    }

    Ok(())
}
