use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::config::MediaConfig;
use crate::core::error::Result;
use crate::shared::constants::{GENERATED_IMAGES_DIR, UPLOADS_DIR};

/// A generated image persisted under the media root
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Bare filename, usable as a `current_image` reference
    pub filename: String,
    /// Absolute or media-root-relative path on disk
    pub path: PathBuf,
    /// Public URL the file is served under
    pub url: String,
}

/// Local-filesystem media store.
///
/// Uploads are staged under `{root}/uploads/` with random names and removed
/// after use; generated images are persisted under
/// `{root}/generated_images/` and never deleted. Random names make
/// concurrent requests collision-free without locking.
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    /// Create the store and ensure both subdirectories exist
    pub async fn new(config: &MediaConfig) -> Result<Self> {
        let store = Self {
            root: config.root.clone(),
            url_prefix: config.url_prefix.clone(),
        };

        tokio::fs::create_dir_all(store.uploads_dir()).await?;
        tokio::fs::create_dir_all(store.generated_dir()).await?;

        Ok(store)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_DIR)
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root.join(GENERATED_IMAGES_DIR)
    }

    /// Write an uploaded file to the scratch directory under a random name.
    /// `extension` includes the leading dot.
    pub async fn stage_upload(
        &self,
        prefix: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let filename = format!("{}_{}{}", prefix, Uuid::new_v4().simple(), extension);
        let path = self.uploads_dir().join(filename);

        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Staged upload at {}", path.display());

        Ok(path)
    }

    /// Remove a scratch file. Failures are logged and swallowed; a leftover
    /// scratch file must never fail the request it belonged to.
    pub async fn discard_staged(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::debug!("Failed to remove scratch file {}: {}", path.display(), e);
        }
    }

    /// Persist generated image bytes under a random PNG filename
    pub async fn persist_image(&self, prefix: &str, bytes: &[u8]) -> Result<StoredImage> {
        let filename = format!("{}_{}.png", prefix, Uuid::new_v4().simple());
        let path = self.generated_dir().join(&filename);

        tokio::fs::write(&path, bytes).await?;

        let url = self.public_url(&filename);
        tracing::debug!("Persisted generated image at {}", path.display());

        Ok(StoredImage {
            filename,
            path,
            url,
        })
    }

    /// Path of a previously generated image, by bare filename
    pub fn generated_path(&self, filename: &str) -> PathBuf {
        self.generated_dir().join(filename)
    }

    /// Public URL for a generated image filename
    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}/{}", self.url_prefix, GENERATED_IMAGES_DIR, filename)
    }

    /// URL path prefix under which the generated directory is served
    pub fn public_route(&self) -> String {
        format!("{}/{}", self.url_prefix, GENERATED_IMAGES_DIR)
    }
}
