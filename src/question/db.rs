use std::collections::HashMap;

use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    question::models::{
        AnswerFieldWrite, MatchingPair, MatchingPairWrite, OptionWrite, Question, QuestionOption,
        QuestionSpec, QuestionWithChildren, ShortAnswerField,
    },
    server::error::ServerError,
};

pub async fn get_questions_with_children(
    pool: &Pool<Postgres>,
    quiz_id: &Uuid,
) -> Result<Vec<QuestionWithChildren>, ServerError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, question_type, question_text, media_path, time_limit, points,
            position, created_at, updated_at
        FROM "quiz_questions"
        WHERE quiz_id = $1
        ORDER BY position
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let question_ids: Vec<Uuid> = questions.iter().map(|question| question.id).collect();

    let options = sqlx::query_as::<_, QuestionOption>(
        r#"
        SELECT id, quiz_question_id, option_text, is_correct, position
        FROM "quiz_question_options"
        WHERE quiz_question_id = ANY($1)
        ORDER BY position
        "#,
    )
    .bind(&question_ids)
    .fetch_all(pool)
    .await?;

    let pairs = sqlx::query_as::<_, MatchingPair>(
        r#"
        SELECT id, quiz_question_id, left_text, right_text, left_media_path, right_media_path, position
        FROM "quiz_matching_pairs"
        WHERE quiz_question_id = ANY($1)
        ORDER BY position
        "#,
    )
    .bind(&question_ids)
    .fetch_all(pool)
    .await?;

    let fields = sqlx::query_as::<_, ShortAnswerField>(
        r#"
        SELECT id, quiz_question_id, label, placeholder, character_limit, expected_answer,
            case_sensitive, trim_whitespace, position
        FROM "quiz_short_answer_fields"
        WHERE quiz_question_id = ANY($1)
        ORDER BY position
        "#,
    )
    .bind(&question_ids)
    .fetch_all(pool)
    .await?;

    let index_by_id: HashMap<Uuid, usize> = question_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();

    let mut result: Vec<QuestionWithChildren> = questions
        .into_iter()
        .map(|question| QuestionWithChildren {
            question,
            options: Vec::new(),
            matching_pairs: Vec::new(),
            short_answer_fields: Vec::new(),
        })
        .collect();

    for option in options {
        if let Some(&index) = index_by_id.get(&option.quiz_question_id) {
            result[index].options.push(option);
        }
    }
    for pair in pairs {
        if let Some(&index) = index_by_id.get(&pair.quiz_question_id) {
            result[index].matching_pairs.push(pair);
        }
    }
    for field in fields {
        if let Some(&index) = index_by_id.get(&field.quiz_question_id) {
            result[index].short_answer_fields.push(field);
        }
    }

    Ok(result)
}

/// Deletes every question of the quiz whose id was not resubmitted. Children
/// go with them via cascading deletes.
pub async fn tx_delete_questions_not_in(
    tx: &mut Transaction<'_, Postgres>,
    quiz_id: &Uuid,
    kept_ids: &[Uuid],
) -> Result<(), ServerError> {
    sqlx::query(
        r#"
        DELETE FROM "quiz_questions"
        WHERE quiz_id = $1 AND id <> ALL($2)
        "#,
    )
    .bind(quiz_id)
    .bind(kept_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Updates by (id, quiz_id) when the spec carries an id, inserts otherwise.
/// An id unknown to this quiz falls back to insert, so a client cannot
/// capture another quiz's question by guessing ids. Position always comes
/// from the submitted array index.
pub async fn tx_upsert_question(
    tx: &mut Transaction<'_, Postgres>,
    quiz_id: &Uuid,
    spec: &QuestionSpec,
    position: i16,
) -> Result<Uuid, ServerError> {
    if let Some(id) = spec.id {
        let row = sqlx::query(
            r#"
            UPDATE "quiz_questions"
            SET question_text = $1, question_type = $2, media_path = $3, time_limit = $4,
                points = $5, position = $6, updated_at = now()
            WHERE id = $7 AND quiz_id = $8
            "#,
        )
        .bind(&spec.question_text)
        .bind(spec.question_type)
        .bind(&spec.media_path)
        .bind(spec.time_limit)
        .bind(spec.points)
        .bind(position)
        .bind(id)
        .bind(quiz_id)
        .execute(&mut **tx)
        .await?;

        if row.rows_affected() > 0 {
            return Ok(id);
        }
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO "quiz_questions" (id, quiz_id, question_type, question_text, media_path,
            time_limit, points, position)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(quiz_id)
    .bind(spec.question_type)
    .bind(&spec.question_text)
    .bind(&spec.media_path)
    .bind(spec.time_limit)
    .bind(spec.points)
    .bind(position)
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

/// Clears all three child tables for the question, regardless of its type.
pub async fn tx_delete_children(
    tx: &mut Transaction<'_, Postgres>,
    question_id: &Uuid,
) -> Result<(), ServerError> {
    sqlx::query("DELETE FROM \"quiz_question_options\" WHERE quiz_question_id = $1")
        .bind(question_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM \"quiz_matching_pairs\" WHERE quiz_question_id = $1")
        .bind(question_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM \"quiz_short_answer_fields\" WHERE quiz_question_id = $1")
        .bind(question_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

pub async fn tx_insert_options(
    tx: &mut Transaction<'_, Postgres>,
    question_id: &Uuid,
    options: &[OptionWrite],
) -> Result<(), ServerError> {
    for option in options {
        sqlx::query(
            r#"
            INSERT INTO "quiz_question_options" (id, quiz_question_id, option_text, is_correct, position)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(question_id)
        .bind(&option.option_text)
        .bind(option.is_correct)
        .bind(option.position)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn tx_insert_matching_pairs(
    tx: &mut Transaction<'_, Postgres>,
    question_id: &Uuid,
    pairs: &[MatchingPairWrite],
) -> Result<(), ServerError> {
    for pair in pairs {
        sqlx::query(
            r#"
            INSERT INTO "quiz_matching_pairs" (id, quiz_question_id, left_text, right_text,
                left_media_path, right_media_path, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(question_id)
        .bind(&pair.left_text)
        .bind(&pair.right_text)
        .bind(&pair.left_media_path)
        .bind(&pair.right_media_path)
        .bind(pair.position)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn tx_insert_answer_fields(
    tx: &mut Transaction<'_, Postgres>,
    question_id: &Uuid,
    fields: &[AnswerFieldWrite],
) -> Result<(), ServerError> {
    for field in fields {
        sqlx::query(
            r#"
            INSERT INTO "quiz_short_answer_fields" (id, quiz_question_id, label, placeholder,
                character_limit, expected_answer, case_sensitive, trim_whitespace, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(question_id)
        .bind(&field.label)
        .bind(&field.placeholder)
        .bind(field.character_limit)
        .bind(&field.expected_answer)
        .bind(field.case_sensitive)
        .bind(field.trim_whitespace)
        .bind(field.position)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
