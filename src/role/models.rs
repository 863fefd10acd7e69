use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::codes;

/// The distinguished role that can never be deleted.
pub const SUPER_ADMIN: &str = "Super Admin";

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn from_request(request: RoleRequest) -> Self {
        let now = Utc::now();
        let slug = codes::slugify(&request.name);

        Self {
            id: Uuid::new_v4(),
            name: request.name,
            slug,
            description: request.description,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
