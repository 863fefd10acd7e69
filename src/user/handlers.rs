use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::error;
use uuid::Uuid;

use crate::{
    auth::{models::AuthUser, passwords},
    common::models::PageQuery,
    role,
    server::{app_state::AppState, error::ServerError},
    user::{
        db,
        models::{CreateUserRequest, MIN_PASSWORD_LENGTH, UpdateUserRequest, validate_email},
    },
};

pub fn user_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let page = db::list_users(state.get_pool(), query.page).await?;
    Ok((StatusCode::OK, Json(page)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let user = db::get_user_by_id(state.get_pool(), &user_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "User with id {} does not exist",
            user_id
        )))?;

    Ok((StatusCode::OK, Json(user)))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ServerError> {
    validate_user_fields(&request.name, &request.email)?;

    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ServerError::Validation(format!(
            "The password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if db::email_exists(state.get_pool(), &request.email, None).await? {
        return Err(ServerError::Validation(
            "A user with this email already exists".into(),
        ));
    }

    if role::db::get_role_by_id(state.get_pool(), &request.role_id)
        .await?
        .is_none()
    {
        return Err(ServerError::Validation("The selected role does not exist".into()));
    }

    let password_hash = passwords::hash_password(&request.password)?;
    let user_id = db::create_user_with_role(
        state.get_pool(),
        &request.name,
        &request.email,
        &password_hash,
        &request.role_id,
    )
    .await?;

    let Some(user) = db::get_user_by_id(state.get_pool(), &user_id).await? else {
        error!("Unexpected: user {} was just created but is missing", user_id);
        return Err(ServerError::Internal("Failed to create user".into()));
    };

    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ServerError> {
    validate_user_fields(&request.name, &request.email)?;

    if db::get_user_by_id(state.get_pool(), &user_id).await?.is_none() {
        return Err(ServerError::NotFound(format!(
            "User with id {} does not exist",
            user_id
        )));
    }

    if db::email_exists(state.get_pool(), &request.email, Some(&user_id)).await? {
        return Err(ServerError::Validation(
            "A user with this email already exists".into(),
        ));
    }

    if role::db::get_role_by_id(state.get_pool(), &request.role_id)
        .await?
        .is_none()
    {
        return Err(ServerError::Validation("The selected role does not exist".into()));
    }

    // Blank password means keep the current one.
    let password_hash = match request.password.as_deref() {
        Some(password) if !password.is_empty() => {
            if password.len() < MIN_PASSWORD_LENGTH {
                return Err(ServerError::Validation(format!(
                    "The password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                )));
            }
            Some(passwords::hash_password(password)?)
        }
        _ => None,
    };

    db::update_user_with_role(
        state.get_pool(),
        &user_id,
        &request.name,
        &request.email,
        password_hash.as_deref(),
        &request.role_id,
    )
    .await?;

    let Some(user) = db::get_user_by_id(state.get_pool(), &user_id).await? else {
        return Err(ServerError::Internal("Failed to update user".into()));
    };

    Ok((StatusCode::OK, Json(user)))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    if user_id == auth_user.id {
        return Err(ServerError::Conflict("Cannot delete your own account".into()));
    }

    db::delete_user(state.get_pool(), &user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn validate_user_fields(name: &str, email: &str) -> Result<(), ServerError> {
    if name.trim().is_empty() {
        return Err(ServerError::Validation("The name field is required".into()));
    }

    if !validate_email(email) {
        return Err(ServerError::Validation(
            "The email field must be a valid email address".into(),
        ));
    }

    Ok(())
}
