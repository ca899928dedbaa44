use std::path::{Component, Path, PathBuf};

use dirs::data_dir;
use keepsake_core::{PathResolver, StoreError};
use tracing::debug;

/// Resolves file names inside a fixed root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PathResolver for DirectoryResolver {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        join_checked(&self.root, file_name)
    }
}

/// Resolves file names inside the platform data directory
/// (e.g. `~/.local/share/<app>` on Linux). The directory is looked up on
/// every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirResolver {
    app_name: String,
}

impl DataDirResolver {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl PathResolver for DataDirResolver {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        let base = data_dir().ok_or_else(|| StoreError::storage("no data dir available"))?;
        let path = join_checked(&base.join(&self.app_name), file_name)?;
        debug!(?path, "resolved data path");
        Ok(path)
    }
}

/// Join `file_name` under `root`, refusing anything that would escape it.
fn join_checked(root: &Path, file_name: &str) -> Result<PathBuf, StoreError> {
    let relative = Path::new(file_name);
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if file_name.is_empty() || !plain {
        return Err(StoreError::storage(format!(
            "invalid storage file name: {file_name:?}"
        )));
    }
    Ok(root.join(relative))
}
