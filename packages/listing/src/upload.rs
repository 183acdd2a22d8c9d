use async_trait::async_trait;
use common::storage::{ObjectName, ObjectStore, StorageError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{SubmissionError, UploadError};
use crate::submission::ImageRef;

/// Resolves a stored object name to a publicly fetchable URL.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    async fn resolve_url(&self, name: &ObjectName) -> Result<String, StorageError>;
}

/// Resolves names against one bucket of an [`ObjectStore`].
pub struct BucketResolver<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
}

impl<'a> BucketResolver<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self { store, bucket }
    }
}

#[async_trait]
impl UrlResolver for BucketResolver<'_> {
    async fn resolve_url(&self, name: &ObjectName) -> Result<String, StorageError> {
        self.store.download_url(self.bucket, name).await
    }
}

/// Phase one: the object is stored, but its URL is not known yet.
///
/// Deliberately not convertible into an [`ImageRef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    filename: ObjectName,
    generation: u64,
}

impl Uploaded {
    /// Refer to an object uploaded earlier, outside any coordinator.
    pub fn existing(filename: ObjectName) -> Self {
        Self {
            filename,
            generation: 0,
        }
    }

    pub fn filename(&self) -> &ObjectName {
        &self.filename
    }

    /// Look up the public URL of the uploaded object.
    pub async fn resolve<R: UrlResolver + ?Sized>(
        self,
        resolver: &R,
    ) -> Result<ResolvedImage, UploadError> {
        let url = resolver.resolve_url(&self.filename).await?;
        Ok(ResolvedImage {
            filename: self.filename,
            url,
        })
    }
}

/// Phase two: the object has a public URL and may be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    filename: ObjectName,
    url: String,
}

impl ResolvedImage {
    pub fn filename(&self) -> &ObjectName {
        &self.filename
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Idle,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStatus::Idle => "idle",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Success => "success",
            UploadStatus::Error => "error",
        }
    }
}

/// Snapshot of the coordinator, as rendered next to the file picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadState {
    pub status: UploadStatus,
    /// 0..=100
    pub progress: u8,
    /// Only set once the URL lookup after a successful upload has finished.
    pub resolved_url: Option<String>,
    pub error: Option<String>,
}

/// Owns the lifecycle of one image upload slot.
///
/// `idle -> uploading -> success | error`. A successful upload is followed by
/// a separate URL resolution step; `resolved_url` stays empty until then.
#[derive(Debug)]
pub struct UploadCoordinator {
    status: UploadStatus,
    progress: u8,
    generation: u64,
    pending: Option<ObjectName>,
    resolved: Option<ResolvedImage>,
    error: Option<String>,
}

impl Default for UploadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadCoordinator {
    pub fn new() -> Self {
        Self {
            status: UploadStatus::Idle,
            progress: 0,
            generation: 0,
            pending: None,
            resolved: None,
            error: None,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn resolved_url(&self) -> Option<&str> {
        self.resolved.as_ref().map(ResolvedImage::url)
    }

    pub fn state(&self) -> UploadState {
        UploadState {
            status: self.status,
            progress: self.progress,
            resolved_url: self.resolved_url().map(str::to_owned),
            error: self.error.clone(),
        }
    }

    /// A new upload begins. Also the manual re-attempt after an error.
    pub fn start(&mut self) {
        self.generation += 1;
        self.status = UploadStatus::Uploading;
        self.progress = 0;
        self.pending = None;
        self.resolved = None;
        self.error = None;
        debug!(generation = self.generation, "Upload started");
    }

    /// Progress tick from the uploader. Ignored outside an upload.
    pub fn progress_to(&mut self, percent: u8) {
        if self.status != UploadStatus::Uploading {
            debug!(percent, status = ?self.status, "Ignoring progress outside an upload");
            return;
        }
        self.progress = percent.min(100);
    }

    /// The object was stored under `filename`; its URL is still unknown.
    pub fn succeed(&mut self, filename: ObjectName) -> Result<Uploaded, UploadError> {
        if self.status != UploadStatus::Uploading {
            return Err(UploadError::NotUploading);
        }
        self.status = UploadStatus::Success;
        self.progress = 100;
        self.pending = Some(filename.clone());
        info!(%filename, "Upload finished, resolving URL");
        Ok(Uploaded {
            filename,
            generation: self.generation,
        })
    }

    /// The upload failed. Terminal until the next [`start`](Self::start).
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "Image upload failed");
        self.status = UploadStatus::Error;
        self.pending = None;
        self.resolved = None;
        self.error = Some(message);
    }

    /// Run the URL lookup for `uploaded` and record its result.
    pub async fn resolve<R: UrlResolver + ?Sized>(
        &mut self,
        uploaded: Uploaded,
        resolver: &R,
    ) -> Result<&ResolvedImage, UploadError> {
        let result = resolver.resolve_url(&uploaded.filename).await;
        self.finish_resolution(uploaded, result)
    }

    /// Record the outcome of a URL lookup performed elsewhere.
    ///
    /// Results for an upload that was replaced by a newer one are dropped.
    pub fn finish_resolution(
        &mut self,
        uploaded: Uploaded,
        result: Result<String, StorageError>,
    ) -> Result<&ResolvedImage, UploadError> {
        if uploaded.generation != self.generation
            || self.pending.as_ref() != Some(&uploaded.filename)
        {
            debug!(filename = %uploaded.filename, "Dropping stale URL resolution");
            return Err(UploadError::Superseded);
        }

        match result {
            Ok(url) => {
                self.pending = None;
                info!(filename = %uploaded.filename, %url, "Image URL resolved");
                Ok(self.resolved.insert(ResolvedImage {
                    filename: uploaded.filename,
                    url,
                }))
            }
            Err(e) => {
                let err = UploadError::Resolution(e);
                self.fail(err.to_string());
                Err(err)
            }
        }
    }

    /// The image to persist with a submission.
    ///
    /// Refuses while an upload is in flight or awaiting its URL. No upload,
    /// or a failed one, means the product has no image.
    pub fn image_ref(&self) -> Result<ImageRef, SubmissionError> {
        match self.status {
            UploadStatus::Idle | UploadStatus::Error => Ok(ImageRef::None),
            UploadStatus::Uploading => Err(SubmissionError::ImagePending),
            UploadStatus::Success => self
                .resolved
                .clone()
                .map(ImageRef::Resolved)
                .ok_or(SubmissionError::ImagePending),
        }
    }
}
