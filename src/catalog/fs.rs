//! Directory-backed attachment store.

use super::traits::{sha256_hex, AttachmentContent, AttachmentStore};
use crate::error::{ReconcileError, Result};
use std::path::{Path, PathBuf};

/// Stores each attachment as `<content id>/<filename>` below a root directory.
#[derive(Debug, Clone)]
pub struct FsAttachmentStore {
    root: PathBuf,
}

impl FsAttachmentStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| ReconcileError::io(&root, e))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn content_dir(&self, content_id: &str) -> Result<PathBuf> {
        let valid = !content_id.is_empty() && content_id.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(ReconcileError::storage(format!(
                "invalid attachment id '{content_id}'"
            )));
        }
        Ok(self.root.join(content_id))
    }
}

/// File name without any directory components.
fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .trim();
    if base.is_empty() {
        "attachment".to_string()
    } else {
        base.to_string()
    }
}

impl AttachmentStore for FsAttachmentStore {
    fn store(
        &mut self,
        filename: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<AttachmentContent> {
        let content_id = uuid::Uuid::new_v4().simple().to_string();
        let dir = self.content_dir(&content_id)?;
        std::fs::create_dir_all(&dir).map_err(|e| ReconcileError::io(&dir, e))?;

        let path = dir.join(sanitize_filename(filename));
        std::fs::write(&path, bytes).map_err(|e| ReconcileError::io(&path, e))?;
        tracing::debug!("Stored attachment {} at {}", filename, path.display());

        Ok(AttachmentContent {
            content_id,
            filename: filename.to_string(),
            sha256: sha256_hex(bytes),
        })
    }

    fn read(&self, content_id: &str) -> Result<Vec<u8>> {
        let dir = self.content_dir(content_id)?;
        let entry = std::fs::read_dir(&dir)
            .map_err(|e| ReconcileError::io(&dir, e))?
            .filter_map(std::result::Result::ok)
            .find(|entry| entry.path().is_file())
            .ok_or_else(|| ReconcileError::storage(format!("attachment {content_id} is empty")))?;
        let path = entry.path();
        std::fs::read(&path).map_err(|e| ReconcileError::io(&path, e))
    }
}
