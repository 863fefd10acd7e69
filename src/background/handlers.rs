use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    auth::models::AuthUser,
    background::{db, models::Background},
    common::{
        forms::FormData,
        models::PageQuery,
        uploads::IMAGE_MIMES,
    },
    config::config::CONFIG,
    server::{app_state::AppState, error::ServerError},
};

pub fn background_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_backgrounds).post(create_background))
        .route(
            "/{background_id}",
            get(get_background)
                .put(update_background)
                .delete(delete_background),
        )
        .with_state(state)
}

async fn list_backgrounds(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let page = db::list_backgrounds(state.get_pool(), query.page).await?;
    Ok((StatusCode::OK, Json(page)))
}

async fn get_background(
    State(state): State<Arc<AppState>>,
    Path(background_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let background = db::get_background_by_id(state.get_pool(), &background_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Background with id {} does not exist",
            background_id
        )))?;

    Ok((StatusCode::OK, Json(background)))
}

async fn create_background(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let form = FormData::read(multipart).await?;
    let name = form.require("name")?;
    let is_public = form.flag("is_public");

    let Some(file) = form.file("image") else {
        return Err(ServerError::Validation("The image field is required".into()));
    };

    let stored = state
        .get_uploads()
        .store(
            "backgrounds",
            name,
            file,
            IMAGE_MIMES,
            CONFIG.uploads.background_max_bytes,
        )
        .await?;

    let background = Background::from_upload(user.id, name.to_string(), stored.path, is_public);
    db::create_background(state.get_pool(), &background).await?;

    Ok((StatusCode::CREATED, Json(background)))
}

async fn update_background(
    State(state): State<Arc<AppState>>,
    Path(background_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let mut background = db::get_background_by_id(state.get_pool(), &background_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Background with id {} does not exist",
            background_id
        )))?;

    let form = FormData::read(multipart).await?;
    background.name = form.require("name")?.to_string();
    background.is_public = form.flag("is_public");

    let previous_path = background.image_path.clone();
    let mut replaced = false;

    if let Some(file) = form.file("image") {
        let stored = state
            .get_uploads()
            .store(
                "backgrounds",
                &background.name,
                file,
                IMAGE_MIMES,
                CONFIG.uploads.background_max_bytes,
            )
            .await?;
        background.image_path = stored.path;
        replaced = true;
    }

    db::update_background(state.get_pool(), &background).await?;

    // The old file only goes once the row points at the new one.
    if replaced {
        state.get_uploads().remove(&previous_path).await;
    }

    Ok((StatusCode::OK, Json(background)))
}

async fn delete_background(
    State(state): State<Arc<AppState>>,
    Path(background_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let background = db::get_background_by_id(state.get_pool(), &background_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Background with id {} does not exist",
            background_id
        )))?;

    db::delete_background(state.get_pool(), &background_id).await?;
    state.get_uploads().remove(&background.image_path).await;

    Ok(StatusCode::NO_CONTENT)
}
