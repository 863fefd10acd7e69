use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::codes,
    question::{
        db as question_db,
        models::{QuestionSpec, QuestionWithChildren},
        sync,
    },
    quiz::{db as quiz_db, handlers::ensure_quiz_references, models::Quiz},
    role::{
        db as role_db,
        models::{Role, RoleRequest},
    },
    server::error::ServerError,
};

async fn seed_user(pool: &PgPool, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO "users" (id, name, email, password_hash, email_verified)
        VALUES ($1, 'Seed User', $2, 'seeded', TRUE)
        "#,
    )
    .bind(id)
    .bind(email)
    .execute(pool)
    .await
    .unwrap();

    id
}

async fn seed_quiz(pool: &PgPool, user_id: Uuid) -> Quiz {
    let quiz = Quiz::from_create(user_id, "Seeded Quiz", None, None, None, codes::join_code());
    quiz_db::create_quiz(pool, &quiz).await.unwrap();
    quiz
}

async fn seed_category(pool: &PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO "quiz_categories" (id, name, slug)
        VALUES ($1, 'Geography', 'geography')
        "#,
    )
    .bind(id)
    .execute(pool)
    .await
    .unwrap();

    id
}

fn choice_question(text: &str, options: &[&str]) -> QuestionSpec {
    serde_json::from_value(json!({
        "question_text": text,
        "question_type": "multiple_choice",
        "time_limit": 30,
        "points": 100,
        "options": options
            .iter()
            .map(|option| json!({ "option_text": option }))
            .collect::<Vec<_>>(),
    }))
    .unwrap()
}

/// Rebuilds the editor payload for an already persisted question, the way
/// the client resubmits the whole collection on every save.
fn resubmit(persisted: &QuestionWithChildren) -> QuestionSpec {
    serde_json::from_value(json!({
        "id": persisted.question.id,
        "question_text": persisted.question.question_text,
        "question_type": persisted.question.question_type,
        "time_limit": persisted.question.time_limit,
        "points": persisted.question.points,
        "options": persisted
            .options
            .iter()
            .map(|option| json!({
                "option_text": option.option_text,
                "is_correct": option.is_correct,
            }))
            .collect::<Vec<_>>(),
    }))
    .unwrap()
}

#[sqlx::test]
async fn omitted_questions_are_deleted_on_resync(pool: PgPool) {
    let user = seed_user(&pool, "owner@example.com").await;
    let quiz = seed_quiz(&pool, user).await;

    let specs = vec![
        choice_question("First", &["a", "b"]),
        choice_question("Second", &["c", "d"]),
    ];
    sync::sync_questions(&pool, &quiz, &specs).await.unwrap();

    let persisted = question_db::get_questions_with_children(&pool, &quiz.id)
        .await
        .unwrap();
    assert_eq!(persisted.len(), 2);

    let kept = resubmit(&persisted[0]);
    sync::sync_questions(&pool, &quiz, &[kept]).await.unwrap();

    let after = question_db::get_questions_with_children(&pool, &quiz.id)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].question.id, persisted[0].question.id);
    assert_eq!(after[0].question.position, 0);
}

#[sqlx::test]
async fn resyncing_the_same_payload_leaves_the_set_unchanged(pool: PgPool) {
    let user = seed_user(&pool, "owner@example.com").await;
    let quiz = seed_quiz(&pool, user).await;

    let specs = vec![
        choice_question("First", &["a", "b"]),
        choice_question("Second", &["c"]),
    ];
    sync::sync_questions(&pool, &quiz, &specs).await.unwrap();

    let first = question_db::get_questions_with_children(&pool, &quiz.id)
        .await
        .unwrap();

    let replay: Vec<QuestionSpec> = first.iter().map(resubmit).collect();
    sync::sync_questions(&pool, &quiz, &replay).await.unwrap();

    let second = question_db::get_questions_with_children(&pool, &quiz.id)
        .await
        .unwrap();

    assert_eq!(first.len(), second.len());
    for (before, after) in first.iter().zip(&second) {
        assert_eq!(before.question.id, after.question.id);
        assert_eq!(before.question.position, after.question.position);
        assert_eq!(before.question.question_text, after.question.question_text);

        let texts_before: Vec<&str> = before.options.iter().map(|o| o.option_text.as_str()).collect();
        let texts_after: Vec<&str> = after.options.iter().map(|o| o.option_text.as_str()).collect();
        assert_eq!(texts_before, texts_after);
    }
}

#[sqlx::test]
async fn reordering_the_payload_updates_persisted_positions(pool: PgPool) {
    let user = seed_user(&pool, "owner@example.com").await;
    let quiz = seed_quiz(&pool, user).await;

    let specs = vec![
        choice_question("First", &["a"]),
        choice_question("Second", &["b"]),
    ];
    sync::sync_questions(&pool, &quiz, &specs).await.unwrap();

    let persisted = question_db::get_questions_with_children(&pool, &quiz.id)
        .await
        .unwrap();
    let (first_id, second_id) = (persisted[0].question.id, persisted[1].question.id);

    let swapped = vec![resubmit(&persisted[1]), resubmit(&persisted[0])];
    sync::sync_questions(&pool, &quiz, &swapped).await.unwrap();

    let after = question_db::get_questions_with_children(&pool, &quiz.id)
        .await
        .unwrap();
    assert_eq!(after[0].question.id, second_id);
    assert_eq!(after[0].question.position, 0);
    assert_eq!(after[1].question.id, first_id);
    assert_eq!(after[1].question.position, 1);
}

#[sqlx::test]
async fn deleting_a_quiz_cascades_to_questions_and_children(pool: PgPool) {
    let user = seed_user(&pool, "owner@example.com").await;
    let quiz = seed_quiz(&pool, user).await;

    let specs = vec![choice_question("Doomed", &["a", "b"])];
    sync::sync_questions(&pool, &quiz, &specs).await.unwrap();

    quiz_db::delete_quiz(&pool, &quiz.id).await.unwrap();

    let questions = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM \"quiz_questions\" WHERE quiz_id = $1",
    )
    .bind(quiz.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(questions, 0);

    let options =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM \"quiz_question_options\"")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(options, 0);
}

#[sqlx::test]
async fn non_owner_lookup_is_denied_and_questions_survive(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com").await;
    let other = seed_user(&pool, "other@example.com").await;
    let quiz = seed_quiz(&pool, owner).await;

    let specs = vec![choice_question("Private", &["a"])];
    sync::sync_questions(&pool, &quiz, &specs).await.unwrap();

    let err = quiz_db::get_owned_quiz(&pool, &quiz.id, &other)
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::AccessDenied));

    let after = question_db::get_questions_with_children(&pool, &quiz.id)
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
}

#[sqlx::test]
async fn unknown_reference_ids_fail_validation_before_any_write(pool: PgPool) {
    let category = seed_category(&pool).await;

    assert!(
        ensure_quiz_references(&pool, Some(&category), None)
            .await
            .is_ok()
    );

    let missing = Uuid::new_v4();
    assert!(matches!(
        ensure_quiz_references(&pool, Some(&missing), None).await,
        Err(ServerError::Validation(_))
    ));
    assert!(matches!(
        ensure_quiz_references(&pool, Some(&category), Some(&missing)).await,
        Err(ServerError::Validation(_))
    ));
}

#[sqlx::test]
async fn colliding_role_slugs_are_detected_across_names(pool: PgPool) {
    let role = Role::from_request(RoleRequest {
        name: "Foo Bar".into(),
        description: None,
    });
    role_db::create_role(&pool, &role).await.unwrap();

    // "Foo-Bar" is a different name but the same slug.
    assert!(!role_db::role_name_exists(&pool, "Foo-Bar", None).await.unwrap());
    assert!(
        role_db::role_slug_exists(&pool, &codes::slugify("Foo-Bar"), None)
            .await
            .unwrap()
    );

    // The role itself is excluded when its own update re-checks.
    assert!(
        !role_db::role_slug_exists(&pool, "foo-bar", Some(&role.id))
            .await
            .unwrap()
    );
}
