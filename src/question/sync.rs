use sqlx::{Pool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::{
    question::{
        db,
        models::{ChildWrites, QuestionSpec},
    },
    quiz::models::Quiz,
    server::error::ServerError,
};

/// Seam for the child persistence strategy. The only implementation today
/// wipes and re-creates every child row on each save. A diff-based writer
/// that preserves child ids across edits can slot in here without changing
/// the caller contract.
pub trait ChildWriter {
    async fn replace(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        question_id: &Uuid,
        children: &ChildWrites,
    ) -> Result<(), ServerError>;
}

pub struct DeleteAndRecreate;

impl ChildWriter for DeleteAndRecreate {
    async fn replace(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        question_id: &Uuid,
        children: &ChildWrites,
    ) -> Result<(), ServerError> {
        db::tx_delete_children(tx, question_id).await?;

        match children {
            ChildWrites::Options(options) => db::tx_insert_options(tx, question_id, options).await,
            ChildWrites::MatchingPairs(pairs) => {
                db::tx_insert_matching_pairs(tx, question_id, pairs).await
            }
            ChildWrites::AnswerFields(fields) => {
                db::tx_insert_answer_fields(tx, question_id, fields).await
            }
        }
    }
}

/// Makes the persisted question set of a quiz match `specs` exactly.
///
/// Whole-collection replacement: any persisted question whose id was not
/// resubmitted is deleted, then every spec is upserted in array order with
/// its position derived from the array index. Runs inside one transaction so
/// a failure partway through leaves the previous set intact.
pub async fn sync_questions(
    pool: &Pool<Postgres>,
    quiz: &Quiz,
    specs: &[QuestionSpec],
) -> Result<(), ServerError> {
    validate_specs(specs)?;

    let kept_ids: Vec<Uuid> = specs.iter().filter_map(|spec| spec.id).collect();
    let writer = DeleteAndRecreate;

    let mut tx = pool.begin().await?;

    db::tx_delete_questions_not_in(&mut tx, &quiz.id, &kept_ids).await?;

    for (index, spec) in specs.iter().enumerate() {
        let question_id = db::tx_upsert_question(&mut tx, &quiz.id, spec, index as i16).await?;
        writer.replace(&mut tx, &question_id, &spec.child_writes()).await?;
    }

    tx.commit().await?;

    info!("Synced {} questions for quiz {}", specs.len(), quiz.id);
    Ok(())
}

/// Rejected specs must cause no mutation, so this runs before the
/// transaction is even opened. Unknown types and missing required fields are
/// already rejected at deserialization.
pub fn validate_specs(specs: &[QuestionSpec]) -> Result<(), ServerError> {
    for (index, spec) in specs.iter().enumerate() {
        if spec.question_text.trim().is_empty() {
            return Err(ServerError::Validation(format!(
                "Question {} is missing its text",
                index + 1
            )));
        }

        if spec.time_limit < 0 || spec.points < 0 {
            return Err(ServerError::Validation(format!(
                "Question {} has a negative time limit or points value",
                index + 1
            )));
        }
    }

    Ok(())
}
