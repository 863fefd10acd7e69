use serde::Serialize;
use uuid::Uuid;

pub const ADMIN_ROLE_SLUGS: &[&str] = &["super-admin", "admin"];

/// Authenticated subject attached to the request by the auth middleware.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub role_slug: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role_slug
            .as_deref()
            .map(|slug| ADMIN_ROLE_SLUGS.contains(&slug))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role_slug: Option<&str>) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            email_verified: true,
            role_slug: role_slug.map(|s| s.to_string()),
        }
    }

    #[test]
    fn admin_slugs_are_recognized() {
        assert!(user_with_role(Some("super-admin")).is_admin());
        assert!(user_with_role(Some("admin")).is_admin());
        assert!(!user_with_role(Some("teacher")).is_admin());
        assert!(!user_with_role(None).is_admin());
    }
}
