use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::{FmtSubscriber, filter::LevelFilter};

use crate::{
    config::config::CONFIG,
    mw::{
        auth_mw::{admin_mw, auth_mw},
        request_mw::request_mw,
    },
    server::app_state::AppState,
};

mod auth;
mod background;
mod category;
mod common;
mod config;
mod gallery;
mod health;
mod mw;
mod question;
mod quiz;
mod role;
mod server;
mod user;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set default subscriber");

    let state = AppState::from_connection_string(&CONFIG.database_url)
        .await
        .expect("Failed to create app state");

    let app = build_router(state);

    let address = format!("{}:{}", CONFIG.server.address, CONFIG.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .expect("Failed to bind listener");

    info!("Server running on {}", address);
    axum::serve(listener, app).await.expect("Server crashed");
}

fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .nest("/health", health::handlers::health_routes(state.clone()))
        .nest_service("/uploads", ServeDir::new(&CONFIG.uploads.root));

    let library_routes = Router::new()
        .nest("/library/quizzes", quiz::handlers::quiz_routes(state.clone()))
        .layer(from_fn_with_state(state.clone(), auth_mw));

    let master_routes = Router::new()
        .nest(
            "/master/categories",
            category::handlers::category_routes(state.clone()),
        )
        .nest(
            "/master/backgrounds",
            background::handlers::background_routes(state.clone()),
        )
        .nest(
            "/master/galleries",
            gallery::handlers::gallery_routes(state.clone()),
        )
        .nest("/master/roles", role::handlers::role_routes(state.clone()))
        .nest("/master/users", user::handlers::user_routes(state.clone()))
        .layer(from_fn(admin_mw))
        .layer(from_fn_with_state(state, auth_mw));

    Router::new()
        .merge(public_routes)
        .merge(library_routes)
        .merge(master_routes)
        .layer(from_fn(request_mw))
}
