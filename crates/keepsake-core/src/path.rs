use std::path::PathBuf;

use crate::error::StoreError;

/// Maps a file name (extension included) to the full path it is stored at.
///
/// Stores call this on every operation and never cache the result.
pub trait PathResolver {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, StoreError>;
}

impl<R: PathResolver + ?Sized> PathResolver for &R {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        (**self).resolve(file_name)
    }
}

impl<R: PathResolver + ?Sized> PathResolver for Box<R> {
    fn resolve(&self, file_name: &str) -> Result<PathBuf, StoreError> {
        (**self).resolve(file_name)
    }
}
