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
    common::{forms::FormData, models::PageQuery, uploads::MEDIA_MIMES},
    config::config::CONFIG,
    gallery::{db, models::GalleryItem},
    server::{app_state::AppState, error::ServerError},
};

pub fn gallery_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_galleries).post(create_gallery))
        .route(
            "/{gallery_id}",
            get(get_gallery).put(update_gallery).delete(delete_gallery),
        )
        .with_state(state)
}

async fn list_galleries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let page = db::list_galleries(state.get_pool(), query.page).await?;
    Ok((StatusCode::OK, Json(page)))
}

async fn get_gallery(
    State(state): State<Arc<AppState>>,
    Path(gallery_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let item = db::get_gallery_by_id(state.get_pool(), &gallery_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Gallery item with id {} does not exist",
            gallery_id
        )))?;

    Ok((StatusCode::OK, Json(item)))
}

async fn create_gallery(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let form = FormData::read(multipart).await?;

    let Some(file) = form.file("file") else {
        return Err(ServerError::Validation("The file field is required".into()));
    };

    // The title is optional and falls back to the uploaded file's name.
    let title = form
        .text("title")
        .map(|t| t.to_string())
        .unwrap_or_else(|| file.file_name.clone());

    let stored = state
        .get_uploads()
        .store(
            "galleries",
            form.text("title").unwrap_or("gallery"),
            file,
            MEDIA_MIMES,
            CONFIG.uploads.gallery_max_bytes,
        )
        .await?;

    let item = GalleryItem::from_upload(user.id, title, stored);
    db::create_gallery(state.get_pool(), &item).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_gallery(
    State(state): State<Arc<AppState>>,
    Path(gallery_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let mut item = db::get_gallery_by_id(state.get_pool(), &gallery_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Gallery item with id {} does not exist",
            gallery_id
        )))?;

    let form = FormData::read(multipart).await?;
    if let Some(title) = form.text("title") {
        item.title = title.to_string();
    }

    let previous_path = item.file_path.clone();
    let mut replaced = false;

    if let Some(file) = form.file("file") {
        let stored = state
            .get_uploads()
            .store(
                "galleries",
                &item.title,
                file,
                MEDIA_MIMES,
                CONFIG.uploads.gallery_max_bytes,
            )
            .await?;

        item.file_path = stored.path;
        item.file_type = stored.kind;
        item.mime_type = stored.mime_type;
        item.size = stored.size;
        replaced = true;
    }

    db::update_gallery(state.get_pool(), &item).await?;

    if replaced {
        state.get_uploads().remove(&previous_path).await;
    }

    Ok((StatusCode::OK, Json(item)))
}

async fn delete_gallery(
    State(state): State<Arc<AppState>>,
    Path(gallery_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let item = db::get_gallery_by_id(state.get_pool(), &gallery_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Gallery item with id {} does not exist",
            gallery_id
        )))?;

    db::delete_gallery(state.get_pool(), &gallery_id).await?;
    state.get_uploads().remove(&item.file_path).await;

    Ok(StatusCode::NO_CONTENT)
}
