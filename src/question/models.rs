use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, sqlx::Type)]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    LongAnswer,
    MatchingPairs,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question_type: QuestionType,
    pub question_text: String,
    pub media_path: Option<String>,
    pub time_limit: i32,
    pub points: i32,
    pub position: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct QuestionOption {
    pub id: Uuid,
    pub quiz_question_id: Uuid,
    pub option_text: String,
    pub is_correct: bool,
    pub position: i16,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct MatchingPair {
    pub id: Uuid,
    pub quiz_question_id: Uuid,
    pub left_text: String,
    pub right_text: String,
    pub left_media_path: Option<String>,
    pub right_media_path: Option<String>,
    pub position: i16,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ShortAnswerField {
    pub id: Uuid,
    pub quiz_question_id: Uuid,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub character_limit: Option<i32>,
    pub expected_answer: String,
    pub case_sensitive: bool,
    pub trim_whitespace: bool,
    pub position: i16,
}

/// Editor payload: a question with all three child collections. Only the
/// collection matching the type is ever populated.
#[derive(Debug, Serialize)]
pub struct QuestionWithChildren {
    #[serde(flatten)]
    pub question: Question,
    pub options: Vec<QuestionOption>,
    pub matching_pairs: Vec<MatchingPair>,
    pub short_answer_fields: Vec<ShortAnswerField>,
}

/* Sync input contract */

#[derive(Debug, Deserialize)]
pub struct SyncQuestionsRequest {
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionSpec {
    /// Present means update the existing question, absent means create.
    pub id: Option<Uuid>,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub media_path: Option<String>,
    pub time_limit: i32,
    pub points: i32,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub matching_pairs: Vec<MatchingPairSpec>,
    #[serde(default)]
    pub short_answer_fields: Vec<ShortAnswerFieldSpec>,
}

#[derive(Debug, Deserialize)]
pub struct OptionSpec {
    #[serde(default)]
    pub option_text: Option<String>,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MatchingPairSpec {
    #[serde(default)]
    pub left_text: Option<String>,
    #[serde(default)]
    pub right_text: Option<String>,
    #[serde(default)]
    pub left_media_path: Option<String>,
    #[serde(default)]
    pub right_media_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShortAnswerFieldSpec {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub character_limit: Option<i32>,
    #[serde(default)]
    pub expected_answer: Option<String>,
    #[serde(default)]
    pub case_sensitive: Option<bool>,
    #[serde(default)]
    pub trim_whitespace: Option<bool>,
}

/* Normalized child rows, keyed by the active variant */

#[derive(Debug, PartialEq)]
pub enum ChildWrites {
    Options(Vec<OptionWrite>),
    MatchingPairs(Vec<MatchingPairWrite>),
    AnswerFields(Vec<AnswerFieldWrite>),
}

#[derive(Debug, PartialEq)]
pub struct OptionWrite {
    pub option_text: String,
    pub is_correct: bool,
    pub position: i16,
}

#[derive(Debug, PartialEq)]
pub struct MatchingPairWrite {
    pub left_text: String,
    pub right_text: String,
    pub left_media_path: Option<String>,
    pub right_media_path: Option<String>,
    pub position: i16,
}

#[derive(Debug, PartialEq)]
pub struct AnswerFieldWrite {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub character_limit: Option<i32>,
    pub expected_answer: String,
    pub case_sensitive: bool,
    pub trim_whitespace: bool,
    pub position: i16,
}

impl QuestionSpec {
    /// Selects the child collection matching the question type and normalizes
    /// it for persistence. Entries from the inactive collections are
    /// discarded. Positions keep the submitted array index, so filtering may
    /// leave gaps.
    pub fn child_writes(&self) -> ChildWrites {
        match self.question_type {
            QuestionType::MultipleChoice | QuestionType::TrueFalse => ChildWrites::Options(
                self.options
                    .iter()
                    .enumerate()
                    .filter_map(|(index, option)| {
                        let text = option.option_text.as_deref().unwrap_or("");
                        if text.is_empty() {
                            return None;
                        }
                        Some(OptionWrite {
                            option_text: text.to_string(),
                            is_correct: option.is_correct.unwrap_or(false),
                            position: index as i16,
                        })
                    })
                    .collect(),
            ),
            QuestionType::MatchingPairs => ChildWrites::MatchingPairs(
                self.matching_pairs
                    .iter()
                    .enumerate()
                    .filter_map(|(index, pair)| {
                        let left = pair.left_text.clone().unwrap_or_default();
                        let right = pair.right_text.clone().unwrap_or_default();
                        if left.is_empty() && right.is_empty() {
                            return None;
                        }
                        Some(MatchingPairWrite {
                            left_text: left,
                            right_text: right,
                            left_media_path: pair.left_media_path.clone(),
                            right_media_path: pair.right_media_path.clone(),
                            position: index as i16,
                        })
                    })
                    .collect(),
            ),
            // No emptiness filter here: a blank expected answer is a valid
            // free-text field.
            QuestionType::ShortAnswer | QuestionType::LongAnswer => ChildWrites::AnswerFields(
                self.short_answer_fields
                    .iter()
                    .enumerate()
                    .map(|(index, field)| AnswerFieldWrite {
                        label: field.label.clone(),
                        placeholder: field.placeholder.clone(),
                        character_limit: field.character_limit,
                        expected_answer: field.expected_answer.clone().unwrap_or_default(),
                        case_sensitive: field.case_sensitive.unwrap_or(false),
                        trim_whitespace: field.trim_whitespace.unwrap_or(true),
                        position: index as i16,
                    })
                    .collect(),
            ),
        }
    }
}
