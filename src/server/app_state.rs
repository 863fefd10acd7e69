use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::{common::uploads::UploadStore, config::config::CONFIG, server::error::ServerError};

pub struct AppState {
    pool: Pool<Postgres>,
    uploads: UploadStore,
}

impl AppState {
    pub async fn from_connection_string(connection_string: &str) -> Result<Arc<Self>, ServerError> {
        let pool = Pool::<Postgres>::connect(connection_string).await?;
        let uploads = UploadStore::new(&CONFIG.uploads.root);

        Ok(Arc::new(Self { pool, uploads }))
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn get_uploads(&self) -> &UploadStore {
        &self.uploads
    }
}
