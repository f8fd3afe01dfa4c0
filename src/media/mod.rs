use base64::Engine;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::config::MediaConfig;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Upload a valid image: expected a base64 data URI")]
    InvalidDataUri,

    #[error("Upload a valid image: unsupported type '{0}'")]
    UnsupportedType(String),

    #[error("Upload a valid image: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Upload a valid image: the submitted file is empty")]
    Empty,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes uploaded images below a root directory served at `url_prefix`
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.root, &config.url_prefix)
    }

    /// Decode `data:image/<type>;base64,<payload>` into `<root>/<dir>/` and
    /// return the public URL of the stored file
    pub async fn save_data_uri(&self, upload: &str, dir: &str) -> Result<String, MediaError> {
        let (extension, bytes) = decode_data_uri(upload)?;

        let file_name = format!("{}.{}", Uuid::new_v4().simple(), extension);
        let target_dir = self.root.join(dir);
        tokio::fs::create_dir_all(&target_dir).await?;
        tokio::fs::write(target_dir.join(&file_name), &bytes).await?;

        tracing::debug!("Stored {} byte image as {}/{}", bytes.len(), dir, file_name);
        Ok(format!("{}/{}/{}", self.url_prefix, dir, file_name))
    }

    /// Remove a file previously returned by `save_data_uri`. Failures are logged.
    pub async fn discard(&self, url: &str) {
        let Some(path) = self.path_for(url) else {
            tracing::warn!("Not discarding {}: outside {}", url, self.url_prefix);
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Discarded unreferenced image {}", path.display()),
            Err(e) => tracing::warn!("Failed to discard image {}: {}", path.display(), e),
        }
    }

    fn path_for(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(&self.url_prefix)?.trim_start_matches('/');
        if relative.is_empty() || relative.split('/').any(|part| part == "..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

fn decode_data_uri(upload: &str) -> Result<(&'static str, Vec<u8>), MediaError> {
    let rest = upload.strip_prefix("data:").ok_or(MediaError::InvalidDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::InvalidDataUri)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(MediaError::InvalidDataUri)?;

    let extension = match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other => return Err(MediaError::UnsupportedType(other.to_string())),
    };

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    if bytes.is_empty() {
        return Err(MediaError::Empty);
    }
    Ok((extension, bytes))
}
