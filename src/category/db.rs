use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::category::models::Category;

pub async fn list_categories(pool: &Pool<Postgres>) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, slug, description, created_at, updated_at
        FROM "quiz_categories"
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category_by_id(
    pool: &Pool<Postgres>,
    category_id: &Uuid,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, slug, description, created_at, updated_at
        FROM "quiz_categories"
        WHERE id = $1
        "#,
    )
    .bind(category_id)
    .fetch_optional(pool)
    .await
}
