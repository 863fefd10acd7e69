use sqlx::{Pool, Postgres};
use tracing::warn;
use uuid::Uuid;

use crate::{
    common::models::PagedResponse,
    config::config::CONFIG,
    role::models::Role,
    server::error::ServerError,
};

pub async fn list_roles(pool: &Pool<Postgres>, page: u16) -> Result<PagedResponse<Role>, ServerError> {
    let page_size = CONFIG.server.page_size as i64;
    let offset = page_size * page as i64;

    let items = sqlx::query_as::<_, Role>(
        r#"
        SELECT id, name, slug, description, created_at, updated_at
        FROM "roles"
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

pub async fn get_role_by_id(
    pool: &Pool<Postgres>,
    role_id: &Uuid,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        r#"
        SELECT id, name, slug, description, created_at, updated_at
        FROM "roles"
        WHERE id = $1
        "#,
    )
    .bind(role_id)
    .fetch_optional(pool)
    .await
}

pub async fn role_name_exists(
    pool: &Pool<Postgres>,
    name: &str,
    exclude: Option<&Uuid>,
) -> Result<bool, sqlx::Error> {
    let existing = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id FROM "roles" WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)
        "#,
    )
    .bind(name)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;

    Ok(existing.is_some())
}

/// Distinct names can collapse to the same slug ("Foo Bar" / "Foo-Bar"), so
/// the derived slug is checked separately from the name.
pub async fn role_slug_exists(
    pool: &Pool<Postgres>,
    slug: &str,
    exclude: Option<&Uuid>,
) -> Result<bool, sqlx::Error> {
    let existing = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id FROM "roles" WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
        "#,
    )
    .bind(slug)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;

    Ok(existing.is_some())
}

pub async fn create_role(pool: &Pool<Postgres>, role: &Role) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "roles" (id, name, slug, description, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(role.id)
    .bind(&role.name)
    .bind(&role.slug)
    .bind(&role.description)
    .bind(role.created_at)
    .bind(role.updated_at)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        return Err(ServerError::Internal("Failed to create role".into()));
    }

    Ok(())
}

pub async fn update_role(pool: &Pool<Postgres>, role: &Role) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        UPDATE "roles"
        SET name = $1, slug = $2, description = $3, updated_at = now()
        WHERE id = $4
        "#,
    )
    .bind(&role.name)
    .bind(&role.slug)
    .bind(&role.description)
    .bind(role.id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no role with id: {}", role.id);
        return Err(ServerError::NotFound("Role does not exist".into()));
    }

    Ok(())
}

pub async fn delete_role(pool: &Pool<Postgres>, role_id: &Uuid) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "roles" WHERE id = $1
        "#,
    )
    .bind(role_id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no role with id: {}", role_id);
        return Err(ServerError::NotFound("Role does not exist".into()));
    }

    Ok(())
}
