use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Background {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub image_path: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Background {
    pub fn from_upload(user_id: Uuid, name: String, image_path: String, is_public: bool) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            image_path,
            is_public,
            created_at: now,
            updated_at: now,
        }
    }
}
