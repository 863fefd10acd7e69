use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    category::db,
    server::{app_state::AppState, error::ServerError},
};

// Categories are reference data maintained by seeding; the admin panel only
// reads them.
pub fn category_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_categories))
        .route("/{category_id}", get(get_category))
        .with_state(state)
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let categories = db::list_categories(state.get_pool()).await?;
    Ok((StatusCode::OK, Json(categories)))
}

async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let category = db::get_category_by_id(state.get_pool(), &category_id)
        .await?
        .ok_or(ServerError::NotFound(format!(
            "Category with id {} does not exist",
            category_id
        )))?;

    Ok((StatusCode::OK, Json(category)))
}
