use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::name::{ObjectName, validate_bucket};
use super::traits::{BoxReader, ObjectStore};

/// Filesystem-backed object store.
///
/// Objects live at `{base_path}/{bucket}/{name}` and are published under
/// `{public_base_url}/{bucket}/{name}`.
pub struct FilesystemObjectStore {
    base_path: PathBuf,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemObjectStore {
    /// Create a new filesystem object store.
    pub async fn new(
        base_path: PathBuf,
        public_base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
            max_size,
        })
    }

    fn object_path(&self, bucket: &str, name: &ObjectName) -> Result<PathBuf, StorageError> {
        let bucket = validate_bucket(bucket)?;
        Ok(self.base_path.join(bucket).join(name.as_str()))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put_stream(
        &self,
        bucket: &str,
        name: &ObjectName,
        mut reader: BoxReader,
    ) -> Result<u64, StorageError> {
        let object_path = self.object_path(bucket, name)?;
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024];
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(bucket, object = %name, size = total_bytes, "Stored object");
        Ok(total_bytes)
    }

    async fn get_stream(
        &self,
        bucket: &str,
        name: &ObjectName,
    ) -> Result<BoxReader, StorageError> {
        let object_path = self.object_path(bucket, name)?;
        match fs::File::open(&object_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("{bucket}/{name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, bucket: &str, name: &ObjectName) -> Result<bool, StorageError> {
        let object_path = self.object_path(bucket, name)?;
        Ok(fs::try_exists(&object_path).await?)
    }

    async fn delete(&self, bucket: &str, name: &ObjectName) -> Result<bool, StorageError> {
        let object_path = self.object_path(bucket, name)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn download_url(
        &self,
        bucket: &str,
        name: &ObjectName,
    ) -> Result<String, StorageError> {
        if !self.exists(bucket, name).await? {
            return Err(StorageError::NotFound(format!("{bucket}/{name}")));
        }
        Ok(format!("{}/{bucket}/{name}", self.public_base_url))
    }
}
