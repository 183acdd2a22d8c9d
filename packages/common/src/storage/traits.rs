use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::name::ObjectName;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Bucketed object storage with publicly fetchable download URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `bucket/name` and return the stored size.
    async fn put(
        &self,
        bucket: &str,
        name: &ObjectName,
        data: &[u8],
    ) -> Result<u64, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.put_stream(bucket, name, reader).await
    }

    /// Store data from an async reader and return the stored size.
    ///
    /// An existing object with the same name is replaced.
    async fn put_stream(
        &self,
        bucket: &str,
        name: &ObjectName,
        reader: BoxReader,
    ) -> Result<u64, StorageError>;

    /// Retrieve all bytes of an object.
    async fn get(&self, bucket: &str, name: &ObjectName) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(bucket, name).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve an object as a streaming async reader.
    async fn get_stream(&self, bucket: &str, name: &ObjectName)
    -> Result<BoxReader, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, bucket: &str, name: &ObjectName) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, bucket: &str, name: &ObjectName) -> Result<bool, StorageError>;

    /// Resolve the public URL of a stored object.
    ///
    /// Fails with [`StorageError::NotFound`] when nothing is stored under the name.
    async fn download_url(&self, bucket: &str, name: &ObjectName)
    -> Result<String, StorageError>;
}
