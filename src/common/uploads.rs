use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use crate::{
    common::{codes, forms::UploadedFile},
    server::error::ServerError,
};

pub const IMAGE_MIMES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];
pub const MEDIA_MIMES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/webm",
];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, sqlx::Type)]
#[sqlx(type_name = "media_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Public path recorded in the database, e.g. /uploads/backgrounds/...
    pub path: String,
    pub mime_type: String,
    pub kind: MediaKind,
    pub size: i64,
}

pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }

    /// Validates and writes an uploaded file under `<root>/<dir>`. The write
    /// happens before any row insert, so a storage failure aborts the
    /// enclosing save without leaving a row pointing at a missing file.
    pub async fn store(
        &self,
        dir: &str,
        title: &str,
        file: &UploadedFile,
        allowed_mimes: &[&str],
        max_bytes: usize,
    ) -> Result<StoredFile, ServerError> {
        if !allowed_mimes.contains(&file.content_type.as_str()) {
            return Err(ServerError::Validation(format!(
                "File type {} is not allowed",
                file.content_type
            )));
        }

        if file.bytes.len() > max_bytes {
            return Err(ServerError::Validation(format!(
                "File exceeds the limit of {} bytes",
                max_bytes
            )));
        }

        let file_name = destination_name(title, &file.file_name);
        let destination = self.root.join(dir);
        fs::create_dir_all(&destination).await?;
        fs::write(destination.join(&file_name), &file.bytes).await?;

        Ok(StoredFile {
            path: format!("/uploads/{}/{}", dir, file_name),
            mime_type: file.content_type.clone(),
            kind: MediaKind::from_mime(&file.content_type),
            size: file.bytes.len() as i64,
        })
    }

    /// Removes a previously stored file. A missing file is not an error, the
    /// row referencing it is already gone or being replaced.
    pub async fn remove(&self, public_path: &str) {
        let relative = public_path.trim_start_matches("/uploads/");
        let target = self.root.join(relative);

        if let Err(e) = fs::remove_file(&target).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove stored file {}: {}", target.display(), e);
            }
        }
    }
}

fn destination_name(title: &str, original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");

    format!(
        "{}_{}.{}",
        Utc::now().timestamp(),
        codes::slugify(title),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_follows_mime_prefix() {
        assert_eq!(MediaKind::from_mime("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("video/webm"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("image/png"), MediaKind::Image);
    }

    #[test]
    fn destination_name_keeps_original_extension() {
        let name = destination_name("My Background", "photo.PNG");
        assert!(name.ends_with("_my-background.PNG"));
        assert!(name.split('_').next().unwrap().parse::<i64>().is_ok());
    }

    #[test]
    fn destination_name_falls_back_without_extension() {
        let name = destination_name("clip", "raw-upload");
        assert!(name.ends_with("_clip.bin"));
    }

    #[tokio::test]
    async fn store_rejects_disallowed_mime_before_writing() {
        let store = UploadStore::new("/nonexistent/upload/root");
        let file = UploadedFile {
            file_name: "evil.exe".into(),
            content_type: "application/x-msdownload".into(),
            bytes: vec![0; 16],
        };

        let result = store.store("galleries", "evil", &file, MEDIA_MIMES, 1024).await;
        assert!(matches!(result, Err(ServerError::Validation(_))));
    }

    #[tokio::test]
    async fn store_rejects_oversized_file_before_writing() {
        let store = UploadStore::new("/nonexistent/upload/root");
        let file = UploadedFile {
            file_name: "big.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; 2048],
        };

        let result = store.store("backgrounds", "big", &file, IMAGE_MIMES, 1024).await;
        assert!(matches!(result, Err(ServerError::Validation(_))));
    }
}
