use chrono::Utc;
use sqlx::{Pool, Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

use crate::{
    common::models::PagedResponse,
    config::config::CONFIG,
    server::error::ServerError,
    user::models::User,
};

const SELECT_USER: &str = r#"
    SELECT u.id, u.name, u.email, u.email_verified, r.id AS role_id, r.name AS role_name,
        u.created_at, u.updated_at
    FROM "users" u
    LEFT JOIN "user_roles" ur ON ur.user_id = u.id
    LEFT JOIN "roles" r ON r.id = ur.role_id
"#;

pub async fn list_users(pool: &Pool<Postgres>, page: u16) -> Result<PagedResponse<User>, ServerError> {
    let page_size = CONFIG.server.page_size as i64;
    let offset = page_size * page as i64;

    let sql = format!("{} ORDER BY u.created_at DESC LIMIT $1 OFFSET $2", SELECT_USER);
    let items = sqlx::query_as::<_, User>(&sql)
        .bind(page_size + 1)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(PagedResponse::from_overfetch(items, page_size as usize))
}

pub async fn get_user_by_id(
    pool: &Pool<Postgres>,
    user_id: &Uuid,
) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("{} WHERE u.id = $1", SELECT_USER);
    sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn email_exists(
    pool: &Pool<Postgres>,
    email: &str,
    exclude: Option<&Uuid>,
) -> Result<bool, sqlx::Error> {
    let existing = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id FROM "users" WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
        "#,
    )
    .bind(email)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;

    Ok(existing.is_some())
}

/// User row and its single role assignment are written together.
pub async fn create_user_with_role(
    pool: &Pool<Postgres>,
    name: &str,
    email: &str,
    password_hash: &str,
    role_id: &Uuid,
) -> Result<Uuid, ServerError> {
    let user_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO "users" (id, name, email, password_hash, email_verified, created_at, updated_at)
        VALUES ($1, $2, $3, $4, FALSE, $5, $5)
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx_sync_role(&mut tx, &user_id, role_id).await?;
    tx.commit().await?;

    Ok(user_id)
}

pub async fn update_user_with_role(
    pool: &Pool<Postgres>,
    user_id: &Uuid,
    name: &str,
    email: &str,
    password_hash: Option<&str>,
    role_id: &Uuid,
) -> Result<(), ServerError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query(
        r#"
        UPDATE "users"
        SET name = $1, email = $2, updated_at = now()
        WHERE id = $3
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no user with id: {}", user_id);
        return Err(ServerError::NotFound("User does not exist".into()));
    }

    if let Some(password_hash) = password_hash {
        sqlx::query(
            r#"
            UPDATE "users" SET password_hash = $1 WHERE id = $2
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    tx_sync_role(&mut tx, user_id, role_id).await?;
    tx.commit().await?;

    Ok(())
}

/// Replaces whatever assignment exists with exactly one role.
async fn tx_sync_role(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
    role_id: &Uuid,
) -> Result<(), ServerError> {
    sqlx::query("DELETE FROM \"user_roles\" WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO "user_roles" (user_id, role_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn delete_user(pool: &Pool<Postgres>, user_id: &Uuid) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        DELETE FROM "users" WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    if row.rows_affected() == 0 {
        warn!("Query failed, no user with id: {}", user_id);
        return Err(ServerError::NotFound("User does not exist".into()));
    }

    Ok(())
}
