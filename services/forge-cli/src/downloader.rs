//! Downloader that serves payloads from JSON files on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use forge_models::{BoxError, DownloadRequest, Downloader, RawPayload};
use tracing::debug;

/// Reads a [`RawPayload`] from one JSON file per model.
///
/// Files live at `{payload_dir}/{provider}/{model}.json`.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    path: PathBuf,
}

impl FileDownloader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_model(payload_dir: &Path, provider: &str, model: &str) -> Self {
        Self::new(payload_dir.join(provider).join(format!("{}.json", model)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Downloader for FileDownloader {
    async fn download(&self, request: &DownloadRequest) -> Result<RawPayload, BoxError> {
        debug!(
            model = %request.model_id,
            path = %self.path.display(),
            parameters = ?request.parameters,
            "Reading payload file"
        );
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| format!("failed to read {}: {}", self.path.display(), e))?;
        let payload: RawPayload = serde_json::from_str(&content)?;
        Ok(payload)
    }
}
