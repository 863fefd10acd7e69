use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::codes;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, sqlx::Type)]
#[sqlx(type_name = "quiz_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Draft,
    Live,
    Finished,
    Archived,
}

impl QuizStatus {
    /// Any status in the enumerated set is accepted at update time. The
    /// lifecycle has no enforced transition graph.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(QuizStatus::Draft),
            "live" => Some(QuizStatus::Live),
            "finished" => Some(QuizStatus::Finished),
            "archived" => Some(QuizStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_category_id: Option<Uuid>,
    pub quiz_background_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub join_code: String,
    pub description: Option<String>,
    pub status: QuizStatus,
    pub is_public: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub settings: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn from_create(
        user_id: Uuid,
        title: &str,
        description: Option<String>,
        quiz_category_id: Option<Uuid>,
        quiz_background_id: Option<Uuid>,
        join_code: String,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            user_id,
            quiz_category_id,
            quiz_background_id,
            title: title.to_string(),
            slug: codes::unique_slug(title),
            join_code,
            description,
            status: QuizStatus::Draft,
            is_public: false,
            starts_at: None,
            ends_at: None,
            settings: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing row for the library view, category name joined in.
#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
pub struct QuizListItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub join_code: String,
    pub description: Option<String>,
    pub status: QuizStatus,
    pub is_public: bool,
    pub quiz_category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct QuizListQuery {
    pub status: Option<QuizStatus>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
    #[serde(default)]
    pub page: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_quiz_starts_as_draft_with_code_and_slug() {
        let owner = Uuid::new_v4();
        let quiz = Quiz::from_create(owner, "Algebra Basics", None, None, None, "ABC123".into());

        assert_eq!(quiz.status, QuizStatus::Draft);
        assert_eq!(quiz.user_id, owner);
        assert_eq!(quiz.join_code, "ABC123");
        assert!(quiz.slug.starts_with("algebra-basics-"));
        assert!(!quiz.is_public);
    }

    #[test]
    fn status_parse_covers_the_enumerated_set_only() {
        assert_eq!(QuizStatus::parse("draft"), Some(QuizStatus::Draft));
        assert_eq!(QuizStatus::parse("live"), Some(QuizStatus::Live));
        assert_eq!(QuizStatus::parse("finished"), Some(QuizStatus::Finished));
        assert_eq!(QuizStatus::parse("archived"), Some(QuizStatus::Archived));
        assert_eq!(QuizStatus::parse("paused"), None);
    }
}
