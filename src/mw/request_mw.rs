use std::time::Instant;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use tracing::info;

pub async fn request_mw(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(req).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status(),
        start.elapsed().as_millis()
    );

    response
}
