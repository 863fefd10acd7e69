use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Admin listing row, single assigned role joined in.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub role_id: Option<Uuid>,
    pub role_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    /// Blank or absent leaves the current password untouched.
    #[serde(default)]
    pub password: Option<String>,
    pub role_id: Uuid,
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("teacher@school.example"));
        assert!(validate_email("a.b+c@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!validate_email("no-at-sign"));
        assert!(!validate_email("@missing-local.example"));
        assert!(!validate_email("user@nodot"));
        assert!(!validate_email("user@.leading"));
    }
}
