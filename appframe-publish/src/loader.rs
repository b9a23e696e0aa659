use std::path::{Path, PathBuf};

use appframe_publish_core::contract::{BackendError, ContentLoader};
use tracing::{debug, error};

/// Reads publish sources from disk. Relative paths resolve against `base_dir` when set,
/// otherwise against the working directory.
pub struct FsContentLoader {
    base_dir: Option<PathBuf>,
}

impl FsContentLoader {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) if Path::new(source).is_relative() => base.join(source),
            _ => PathBuf::from(source),
        }
    }
}

impl ContentLoader for FsContentLoader {
    fn load(&self, source: &str) -> Result<String, BackendError> {
        let path = self.resolve(source);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), bytes = content.len(), "Read source file");
                Ok(content)
            }
            Err(e) => {
                error!(error = ?e, path = %path.display(), "Failed to read source file");
                Err(Box::new(e))
            }
        }
    }
}
