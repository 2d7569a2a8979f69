//! Wire shapes of the Yandex Disk resources API.

use chrono::DateTime;
use serde::Deserialize;

use synch_core::{FileKind, FileName, FileRecord};
use synch_sync::RemoteError;

/// `GET /resources` response; `_embedded` is absent when the path is a file.
#[derive(Debug, Deserialize)]
pub(crate) struct Resource {
    #[serde(rename = "_embedded")]
    pub embedded: Option<ResourceList>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceList {
    #[serde(default)]
    pub items: Vec<Item>,
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Item {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub modified: String,
    pub path: String,
    pub size: Option<u64>,
}

impl Item {
    pub fn into_record(self) -> Result<FileRecord, RemoteError> {
        let modified_at = DateTime::parse_from_rfc3339(&self.modified).map_err(|err| {
            RemoteError::Decode(format!(
                "bad `modified` {:?} for {}: {err}",
                self.modified, self.name
            ))
        })?;
        Ok(FileRecord {
            name: FileName::from(self.name),
            modified_at,
            location: self.path,
            size: self.size,
            kind: if self.kind == "dir" {
                FileKind::Dir
            } else {
                FileKind::File
            },
        })
    }
}

/// Upload target returned by `GET /resources/upload`.
#[derive(Debug, Deserialize)]
pub(crate) struct Link {
    pub href: String,
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "PUT".to_string()
}

/// Error document the API returns alongside 4xx/5xx statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiError {
    pub message: Option<String>,
    pub description: Option<String>,
    pub error: Option<String>,
}

impl ApiError {
    /// Best human-readable line: `error: message`, falling back as fields go missing.
    pub fn summary(&self) -> Option<String> {
        let text = self.message.as_ref().or(self.description.as_ref());
        match (&self.error, text) {
            (Some(code), Some(text)) => Some(format!("{code}: {text}")),
            (None, Some(text)) => Some(text.clone()),
            (Some(code), None) => Some(code.clone()),
            (None, None) => None,
        }
    }
}
