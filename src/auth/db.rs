use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::auth::models::AuthUser;

pub async fn get_user_by_session_token(
    pool: &Pool<Postgres>,
    token: &str,
) -> Result<Option<AuthUser>, sqlx::Error> {
    sqlx::query_as::<_, AuthUser>(
        r#"
        SELECT u.id, u.name, u.email, u.email_verified, r.slug AS role_slug
        FROM "sessions" s
        JOIN "users" u ON u.id = s.user_id
        LEFT JOIN "user_roles" ur ON ur.user_id = u.id
        LEFT JOIN "roles" r ON r.id = ur.role_id
        WHERE s.token = $1 AND s.expires_at > $2
        "#,
    )
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
}
