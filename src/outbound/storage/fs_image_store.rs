//! Filesystem cover-image storage adapter.
//!
//! Writes go through a `cap_std::fs::Dir` opened at the media root, so the
//! adapter is incapable of touching anything outside that directory even if
//! a stored path were ever attacker-influenced.

use std::path::Path;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};

use crate::domain::ports::{ImageStore, ImageStoreError};

const COVERS_DIR: &str = "covers";

/// `ImageStore` port adapter keeping blobs under `<media_root>/covers/`.
pub struct FsImageStore {
    root: Dir,
}

impl FsImageStore {
    /// Open the store at the given media root, creating the covers
    /// subdirectory if needed.
    pub fn open(media_root: &Path) -> std::io::Result<Self> {
        Dir::create_ambient_dir_all(media_root, ambient_authority())?;
        let root = Dir::open_ambient_dir(media_root, ambient_authority())?;
        match root.create_dir(COVERS_DIR) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
        Ok(Self { root })
    }

    fn map_io_error(err: std::io::Error) -> ImageStoreError {
        ImageStoreError::storage(err.to_string())
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError> {
        let relative = format!("{COVERS_DIR}/{file_name}");
        self.root
            .write(Path::new(&relative), bytes)
            .map_err(Self::map_io_error)?;
        Ok(relative)
    }

    async fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        match self.root.remove_file(Path::new(path)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::map_io_error(err)),
        }
    }
}
