use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file the user selected but has not uploaded yet.
///
/// Identity is the `(name, size)` pair; the path is only read when the upload
/// request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), size, path: path.into() }
    }

    /// Describe a file on disk by its final path component and length.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, meta.len(), path))
    }

    pub fn same_identity(&self, other: &PendingFile) -> bool {
        self.name == other.name && self.size == other.size
    }
}

/// Body of the `/upload` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<Vec<UploadDetail>>,
}

/// Per-file outcome inside an [`UploadResult`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadDetail {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size_mb: Option<f64>,
    #[serde(default)]
    pub success: bool,
}
