use config::{Config, Environment};
use once_cell::sync::Lazy;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub server: ServerConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub page_size: u16,
}

#[derive(Debug, Deserialize)]
pub struct UploadConfig {
    pub root: String,
    pub background_max_bytes: usize,
    pub gallery_max_bytes: usize,
}

pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    Config::builder()
        .set_default("database_url", "postgres://localhost:5432/quizdesk")
        .expect("Failed to set default")
        .set_default("server.address", "0.0.0.0")
        .expect("Failed to set default")
        .set_default("server.port", 8080_i64)
        .expect("Failed to set default")
        .set_default("server.page_size", 12_i64)
        .expect("Failed to set default")
        .set_default("uploads.root", "public/uploads")
        .expect("Failed to set default")
        .set_default("uploads.background_max_bytes", 2_i64 * 1024 * 1024)
        .expect("Failed to set default")
        .set_default("uploads.gallery_max_bytes", 10_i64 * 1024 * 1024)
        .expect("Failed to set default")
        .add_source(Environment::with_prefix("QUIZDESK").separator("__"))
        .build()
        .and_then(|config| config.try_deserialize())
        .expect("Failed to load configuration")
});
