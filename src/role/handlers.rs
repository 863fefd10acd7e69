use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    common::{codes, models::PageQuery},
    role::{
        db,
        models::{Role, RoleRequest, SUPER_ADMIN},
    },
    server::{app_state::AppState, error::ServerError},
};

pub fn role_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route(
            "/{role_id}",
            get(get_role).put(update_role).delete(delete_role),
        )
        .with_state(state)
}

async fn list_roles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let page = db::list_roles(state.get_pool(), query.page).await?;
    Ok((StatusCode::OK, Json(page)))
}

async fn get_role(
    State(state): State<Arc<AppState>>,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let role = db::get_role_by_id(state.get_pool(), &role_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Role with id {} does not exist",
            role_id
        )))?;

    Ok((StatusCode::OK, Json(role)))
}

async fn create_role(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RoleRequest>,
) -> Result<impl IntoResponse, ServerError> {
    if request.name.trim().is_empty() {
        return Err(ServerError::Validation("The name field is required".into()));
    }

    if db::role_name_exists(state.get_pool(), &request.name, None).await? {
        return Err(ServerError::Validation(
            "A role with this name already exists".into(),
        ));
    }

    if db::role_slug_exists(state.get_pool(), &codes::slugify(&request.name), None).await? {
        return Err(ServerError::Validation(
            "A role with this slug already exists".into(),
        ));
    }

    let role = Role::from_request(request);
    db::create_role(state.get_pool(), &role).await?;

    Ok((StatusCode::CREATED, Json(role)))
}

async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(role_id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let mut role = db::get_role_by_id(state.get_pool(), &role_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Role with id {} does not exist",
            role_id
        )))?;

    if request.name.trim().is_empty() {
        return Err(ServerError::Validation("The name field is required".into()));
    }

    if db::role_name_exists(state.get_pool(), &request.name, Some(&role_id)).await? {
        return Err(ServerError::Validation(
            "A role with this name already exists".into(),
        ));
    }

    if db::role_slug_exists(state.get_pool(), &codes::slugify(&request.name), Some(&role_id)).await?
    {
        return Err(ServerError::Validation(
            "A role with this slug already exists".into(),
        ));
    }

    role.slug = codes::slugify(&request.name);
    role.name = request.name;
    role.description = request.description;
    db::update_role(state.get_pool(), &role).await?;

    Ok((StatusCode::OK, Json(role)))
}

async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let role = db::get_role_by_id(state.get_pool(), &role_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Role with id {} does not exist",
            role_id
        )))?;

    if role.name == SUPER_ADMIN {
        return Err(ServerError::Conflict(
            "Cannot delete the Super Admin role".into(),
        ));
    }

    db::delete_role(state.get_pool(), &role_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
