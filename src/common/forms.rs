use std::collections::HashMap;

use axum::extract::Multipart;
use uuid::Uuid;

use crate::server::error::ServerError;

pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Multipart form collected into plain text fields and uploaded files.
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ServerError> {
        let mut fields = HashMap::new();
        let mut files = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(|s| s.to_string());

            match file_name {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?.to_vec();
                    files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let text = field.text().await?;
                    fields.insert(name, text);
                }
            }
        }

        Ok(Self { fields, files })
    }

    /// Returns a text field, treating an empty submission as absent. Matches
    /// the "left blank" semantics of the admin forms.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str, ServerError> {
        self.text(name)
            .ok_or_else(|| ServerError::Validation(format!("The {} field is required", name)))
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.text(name), Some("1") | Some("true") | Some("on"))
    }

    pub fn uuid(&self, name: &str) -> Result<Option<Uuid>, ServerError> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                ServerError::Validation(format!("The {} field must be a valid id", name))
            }),
        }
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    #[cfg(test)]
    pub fn from_fields(entries: &[(&str, &str)]) -> Self {
        Self {
            fields: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_count_as_missing() {
        let form = FormData::from_fields(&[("title", ""), ("name", "Geography")]);
        assert!(form.text("title").is_none());
        assert_eq!(form.text("name"), Some("Geography"));
        assert!(form.require("title").is_err());
    }

    #[test]
    fn uuid_field_rejects_garbage() {
        let form = FormData::from_fields(&[("quiz_category_id", "not-a-uuid")]);
        assert!(form.uuid("quiz_category_id").is_err());
        assert!(form.uuid("missing").unwrap().is_none());
    }

    #[test]
    fn flags_accept_form_truthy_values() {
        let form = FormData::from_fields(&[("is_public", "1"), ("other", "0")]);
        assert!(form.flag("is_public"));
        assert!(!form.flag("other"));
        assert!(!form.flag("missing"));
    }
}
