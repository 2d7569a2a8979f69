//! Blocking Yandex Disk client.
//!
//! | operation  | request                                                     |
//! |------------|-------------------------------------------------------------|
//! | `list`     | `GET  /resources?path=<folder>&limit=N&offset=M` (paged)     |
//! | `upload`   | `GET  /resources/upload?path=<file>&overwrite=false`, then `PUT href` |
//! | `replace`  | as `upload` with `overwrite=true`                           |
//! | `delete`   | `DELETE /resources?path=<file>&permanently=true`            |

use std::fs::File;
use std::path::{Path, PathBuf};

use synch_core::{Config, FileName, FileRecord};
use synch_sync::{RemoteError, RemoteStore};

use crate::api::{ApiError, Link, Resource};
use crate::error::{decode_err, describe_body, from_ureq, status_error};

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Error code of a 409 on folder creation when the folder is already there.
const FOLDER_EXISTS: &str = "DiskPathPointsToExistentDirectoryError";

/// Remote Store Client for one local/remote folder pair.
pub struct YandexDisk {
    agent: ureq::Agent,
    base_url: String,
    token: String,
    local_dir: PathBuf,
    remote_dir: String,
    page_size: usize,
}

impl YandexDisk {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .user_agent(concat!("synch/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.oauth_token.clone(),
            local_dir: config.path_local_folder.clone(),
            remote_dir: config.path_cloud_folder.trim_end_matches('/').to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Number of entries requested per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn remote_dir(&self) -> &str {
        &self.remote_dir
    }

    /// Create the remote folder if it does not exist yet.
    ///
    /// Returns `true` when the folder was created, `false` when it was
    /// already there. Any other conflict (a missing parent, for one) is an
    /// error.
    pub fn ensure_folder(&self) -> Result<bool, RemoteError> {
        let result = self
            .agent
            .put(&self.endpoint("resources"))
            .set("Authorization", &self.auth_header())
            .query("path", &self.remote_dir)
            .call();
        match result {
            Ok(_) => {
                tracing::info!(folder = %self.remote_dir, "created remote folder");
                Ok(true)
            }
            Err(ureq::Error::Status(409, response)) => {
                let body = response.into_string().unwrap_or_default();
                let api: ApiError = serde_json::from_str(&body).unwrap_or_default();
                if api.error.as_deref() == Some(FOLDER_EXISTS) {
                    Ok(false)
                } else {
                    Err(status_error(409, describe_body(409, &body)))
                }
            }
            Err(err) => Err(from_ureq(err)),
        }
    }

    fn endpoint(&self, tail: &str) -> String {
        format!("{}/{tail}", self.base_url)
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token)
    }

    fn remote_path(&self, name: &FileName) -> String {
        format!("{}/{}", self.remote_dir, name)
    }

    fn local_path(&self, name: &FileName) -> PathBuf {
        self.local_dir.join(name.as_str())
    }

    fn fetch_page(&self, offset: usize) -> Result<Resource, RemoteError> {
        self.agent
            .get(&self.endpoint("resources"))
            .set("Authorization", &self.auth_header())
            .query("path", &self.remote_dir)
            .query("limit", &self.page_size.to_string())
            .query("offset", &offset.to_string())
            .call()
            .map_err(from_ureq)?
            .into_json::<Resource>()
            .map_err(decode_err)
    }

    fn upload_link(&self, name: &FileName, overwrite: bool) -> Result<Link, RemoteError> {
        self.agent
            .get(&self.endpoint("resources/upload"))
            .set("Authorization", &self.auth_header())
            .query("path", &self.remote_path(name))
            .query("overwrite", if overwrite { "true" } else { "false" })
            .call()
            .map_err(from_ureq)?
            .into_json::<Link>()
            .map_err(decode_err)
    }

    fn send_file(&self, name: &FileName, overwrite: bool) -> Result<(), RemoteError> {
        let path = self.local_path(name);
        let (file, len) = open_local(&path)?;

        let link = self.upload_link(name, overwrite)?;
        tracing::debug!(file = %name, method = %link.method, "upload link received");

        // Explicit length keeps ureq from switching to chunked encoding.
        self.agent
            .request(&link.method, &link.href)
            .set("Content-Length", &len.to_string())
            .send(file)
            .map_err(from_ureq)?;
        tracing::debug!(file = %name, bytes = len, "file sent");
        Ok(())
    }
}

fn open_local(path: &Path) -> Result<(File, u64), RemoteError> {
    let local_read = |source| RemoteError::LocalRead {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(local_read)?;
    let len = file.metadata().map_err(local_read)?.len();
    Ok((file, len))
}

impl RemoteStore for YandexDisk {
    fn list(&self) -> Result<Vec<FileRecord>, RemoteError> {
        let mut records = Vec::new();
        let mut offset = 0usize;
        loop {
            let page = self.fetch_page(offset)?;
            let Some(list) = page.embedded else {
                return Err(RemoteError::Decode(format!(
                    "{} is not a folder",
                    self.remote_dir
                )));
            };

            let count = list.items.len();
            for item in list.items {
                records.push(item.into_record()?);
            }
            offset += count;

            let total = list.total.map(|t| t as usize).unwrap_or(offset);
            if count < self.page_size || offset >= total {
                break;
            }
        }
        tracing::debug!(folder = %self.remote_dir, entries = records.len(), "remote listing received");
        Ok(records)
    }

    fn upload(&self, name: &FileName) -> Result<(), RemoteError> {
        self.send_file(name, false)
    }

    fn replace(&self, name: &FileName) -> Result<(), RemoteError> {
        self.send_file(name, true)
    }

    fn delete(&self, name: &FileName) -> Result<(), RemoteError> {
        self.agent
            .delete(&self.endpoint("resources"))
            .set("Authorization", &self.auth_header())
            .query("path", &self.remote_path(name))
            .query("permanently", "true")
            .call()
            .map_err(from_ureq)?;
        Ok(())
    }
}
