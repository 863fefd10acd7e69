use serde_json::json;
use uuid::Uuid;

use crate::{
    question::{
        models::{
            AnswerFieldWrite, ChildWrites, OptionWrite, QuestionSpec, QuestionType,
            SyncQuestionsRequest,
        },
        sync::validate_specs,
    },
    server::error::ServerError,
};

fn spec_from_json(value: serde_json::Value) -> QuestionSpec {
    serde_json::from_value(value).expect("Failed to deserialize question spec")
}

#[test]
fn editor_payload_deserializes_into_positioned_option_writes() {
    let spec = spec_from_json(json!({
        "question_text": "2+2?",
        "question_type": "multiple_choice",
        "time_limit": 30,
        "points": 100,
        "options": [
            { "option_text": "4", "is_correct": true },
            { "option_text": "3", "is_correct": false }
        ]
    }));

    assert!(spec.id.is_none());
    assert_eq!(spec.question_type, QuestionType::MultipleChoice);

    let ChildWrites::Options(options) = spec.child_writes() else {
        panic!("Expected option writes for a multiple choice question");
    };

    assert_eq!(
        options,
        vec![
            OptionWrite {
                option_text: "4".into(),
                is_correct: true,
                position: 0,
            },
            OptionWrite {
                option_text: "3".into(),
                is_correct: false,
                position: 1,
            },
        ]
    );
}

#[test]
fn empty_options_are_dropped_but_positions_keep_their_index() {
    let spec = spec_from_json(json!({
        "question_text": "Capital of Norway?",
        "question_type": "multiple_choice",
        "time_limit": 20,
        "points": 50,
        "options": [
            { "option_text": "Oslo", "is_correct": true },
            { "option_text": "" },
            { "option_text": "Bergen" },
            { "option_text": "Trondheim" }
        ]
    }));

    let ChildWrites::Options(options) = spec.child_writes() else {
        panic!("Expected option writes");
    };

    assert_eq!(options.len(), 3);
    let positions: Vec<i16> = options.iter().map(|o| o.position).collect();
    assert_eq!(positions, vec![0, 2, 3]);
    assert!(!options[1].is_correct, "is_correct defaults to false");
}

#[test]
fn matching_pairs_keep_half_filled_rows_and_drop_fully_empty_ones() {
    let spec = spec_from_json(json!({
        "question_text": "Match country to capital",
        "question_type": "matching_pairs",
        "time_limit": 60,
        "points": 200,
        "matching_pairs": [
            { "left_text": "Norway", "right_text": "Oslo" },
            { "left_text": "Sweden" },
            { "left_text": "", "right_text": "" },
            { "right_text": "Helsinki" }
        ]
    }));

    let ChildWrites::MatchingPairs(pairs) = spec.child_writes() else {
        panic!("Expected matching pair writes");
    };

    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[0].position, 0);

    assert_eq!(pairs[1].left_text, "Sweden");
    assert_eq!(pairs[1].right_text, "", "Missing side becomes empty text");
    assert_eq!(pairs[1].position, 1);

    assert_eq!(pairs[2].left_text, "");
    assert_eq!(pairs[2].right_text, "Helsinki");
    assert_eq!(pairs[2].position, 3);
}

#[test]
fn short_answer_fields_are_kept_unconditionally_with_defaults() {
    let spec = spec_from_json(json!({
        "question_text": "Name the author",
        "question_type": "short_answer",
        "time_limit": 45,
        "points": 100,
        "short_answer_fields": [
            {},
            {
                "label": "Surname",
                "expected_answer": "Hamsun",
                "case_sensitive": true,
                "trim_whitespace": false,
                "character_limit": 40
            }
        ]
    }));

    let ChildWrites::AnswerFields(fields) = spec.child_writes() else {
        panic!("Expected answer field writes");
    };

    assert_eq!(
        fields[0],
        AnswerFieldWrite {
            label: None,
            placeholder: None,
            character_limit: None,
            expected_answer: "".into(),
            case_sensitive: false,
            trim_whitespace: true,
            position: 0,
        }
    );

    assert_eq!(fields[1].expected_answer, "Hamsun");
    assert!(fields[1].case_sensitive);
    assert!(!fields[1].trim_whitespace);
    assert_eq!(fields[1].position, 1);
}

#[test]
fn inactive_child_collections_are_discarded() {
    let spec = spec_from_json(json!({
        "question_text": "True or false: the sky is green",
        "question_type": "true_false",
        "time_limit": 10,
        "points": 25,
        "options": [
            { "option_text": "True" },
            { "option_text": "False", "is_correct": true }
        ],
        "matching_pairs": [
            { "left_text": "stale", "right_text": "editor state" }
        ],
        "short_answer_fields": [
            { "expected_answer": "leftover" }
        ]
    }));

    let ChildWrites::Options(options) = spec.child_writes() else {
        panic!("A true/false question persists options only");
    };
    assert_eq!(options.len(), 2);
}

#[test]
fn unknown_question_type_is_rejected_at_deserialization() {
    let result: Result<QuestionSpec, _> = serde_json::from_value(json!({
        "question_text": "What?",
        "question_type": "essay",
        "time_limit": 30,
        "points": 100
    }));

    assert!(result.is_err());
}

#[test]
fn missing_required_fields_are_rejected_at_deserialization() {
    let result: Result<QuestionSpec, _> = serde_json::from_value(json!({
        "question_type": "multiple_choice",
        "points": 100
    }));

    assert!(result.is_err());
}

#[test]
fn time_limit_beyond_i32_is_rejected_at_deserialization() {
    let result: Result<QuestionSpec, _> = serde_json::from_value(json!({
        "question_text": "Marathon question",
        "question_type": "short_answer",
        "time_limit": 3_000_000_000u32,
        "points": 100
    }));

    assert!(result.is_err());
}

#[test]
fn negative_time_limit_or_points_fails_validation() {
    let specs = vec![spec_from_json(json!({
        "question_text": "Underflow",
        "question_type": "short_answer",
        "time_limit": -1,
        "points": 100
    }))];
    assert!(matches!(
        validate_specs(&specs),
        Err(ServerError::Validation(_))
    ));

    let specs = vec![spec_from_json(json!({
        "question_text": "Underflow",
        "question_type": "short_answer",
        "time_limit": 30,
        "points": -50
    }))];
    assert!(matches!(
        validate_specs(&specs),
        Err(ServerError::Validation(_))
    ));
}

#[test]
fn request_without_questions_defaults_to_an_empty_set() {
    let request: SyncQuestionsRequest =
        serde_json::from_value(json!({})).expect("Failed to deserialize request");

    assert!(request.questions.is_empty());
    assert!(validate_specs(&request.questions).is_ok());
}

#[test]
fn blank_question_text_fails_validation_before_any_write() {
    let specs = vec![
        spec_from_json(json!({
            "id": Uuid::new_v4(),
            "question_text": "Fine question",
            "question_type": "short_answer",
            "time_limit": 30,
            "points": 100
        })),
        spec_from_json(json!({
            "question_text": "   ",
            "question_type": "multiple_choice",
            "time_limit": 30,
            "points": 100
        })),
    ];

    let result = validate_specs(&specs);
    let Err(ServerError::Validation(message)) = result else {
        panic!("Expected a validation error");
    };
    assert!(message.contains("Question 2"));
}
