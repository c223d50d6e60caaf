#[cfg(test)]
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use crate::core::config::MediaConfig;
#[cfg(test)]
use crate::core::error::{AppError, Result};
#[cfg(test)]
use crate::modules::provider::{EditOptions, GenerateOptions, ImageProvider};
#[cfg(test)]
use crate::modules::storage::MediaStore;

/// A provider call as seen by [`RecordingProvider`]
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Generate {
        prompt: String,
        options: GenerateOptions,
    },
    Edit {
        source: PathBuf,
        prompt: String,
        options: EditOptions,
    },
}

/// In-memory [`ImageProvider`] that records every call and returns either
/// fixed bytes or a fixed error.
#[cfg(test)]
pub struct RecordingProvider {
    calls: Mutex<Vec<RecordedCall>>,
    outcome: std::result::Result<Vec<u8>, String>,
}

#[cfg(test)]
impl RecordingProvider {
    pub fn returning(bytes: Vec<u8>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Ok(bytes),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Err(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<Vec<u8>> {
        self.outcome
            .clone()
            .map_err(AppError::Provider)
    }
}

#[cfg(test)]
#[async_trait]
impl ImageProvider for RecordingProvider {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(RecordedCall::Generate {
            prompt: prompt.to_string(),
            options: options.clone(),
        });
        self.outcome()
    }

    async fn edit(&self, source: &Path, prompt: &str, options: &EditOptions) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(RecordedCall::Edit {
            source: source.to_path_buf(),
            prompt: prompt.to_string(),
            options: options.clone(),
        });
        self.outcome()
    }
}

/// Media store rooted in a per-test temporary directory
#[cfg(test)]
pub async fn test_media_store(dir: &Path) -> MediaStore {
    MediaStore::new(&MediaConfig {
        root: dir.to_path_buf(),
        url_prefix: "/media".to_string(),
    })
    .await
    .expect("media store in temp dir")
}
