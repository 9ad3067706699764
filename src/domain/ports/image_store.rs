//! Port for cover image file storage.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The storage backend rejected the write.
        Storage { message: String } =>
            "image store operation failed: {message}",
    }
}

/// Port for opaque image blob storage.
///
/// The store never inspects the bytes; content validation happens before a
/// payload reaches this port. Paths returned by `store` are relative to the
/// media root and are the only handle callers keep.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist image bytes under the given file name, returning the stored
    /// relative path.
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError>;

    /// Remove a previously stored image. Removing a missing file is not an
    /// error; deletion is best effort.
    async fn remove(&self, path: &str) -> Result<(), ImageStoreError>;
}
