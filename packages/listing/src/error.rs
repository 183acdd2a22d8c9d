use common::storage::StorageError;
use thiserror::Error;

/// Failure of the product store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product store unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no upload in progress")]
    NotUploading,

    #[error("upload was superseded by a newer one")]
    Superseded,

    #[error("upload failed: {0}")]
    Failed(String),

    #[error("could not resolve download URL: {0}")]
    Resolution(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    #[error("the image upload has not finished")]
    ImagePending,

    #[error("could not save product: {0}")]
    Persistence(#[from] StoreError),
}

impl SubmissionError {
    /// Message suitable for rendering next to the submit button.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmissionError::AlreadySubmitting => "Your product is already being submitted",
            SubmissionError::ImagePending => "Wait for the image upload to finish",
            SubmissionError::Persistence(_) => "There was an error saving your product",
        }
    }
}
