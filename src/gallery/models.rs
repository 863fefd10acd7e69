use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::uploads::{MediaKind, StoredFile};

/// Uploaded media (image or video) available to the question editor.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct GalleryItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub file_path: String,
    pub file_type: MediaKind,
    pub mime_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GalleryItem {
    pub fn from_upload(user_id: Uuid, title: String, stored: StoredFile) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            file_path: stored.path,
            file_type: stored.kind,
            mime_type: stored.mime_type,
            size: stored.size,
            created_at: now,
            updated_at: now,
        }
    }
}
