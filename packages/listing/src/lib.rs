//! The "new product" workflow: draft validation, image upload lifecycle and
//! submission of the finished product to the product collection.
//!
//! Every collaborator (identity, storage, database, router) is passed in
//! explicitly; nothing here reads ambient state.

pub mod error;
pub mod form;
pub mod inflight;
pub mod navigation;
pub mod page;
pub mod session;
pub mod store;
pub mod submission;
pub mod upload;

pub use error::{StoreError, SubmissionError, UploadError};
pub use form::FormController;
pub use inflight::{InFlightGuard, InFlightSubmissions};
pub use navigation::{NavigationLog, Navigator, Route};
pub use page::{NewProductPage, PageOutcome};
pub use session::AuthSession;
pub use store::{MemoryProductStore, ProductStore, StoredProduct};
pub use submission::{ImageRef, SubmissionAction, SubmissionOutcome};
pub use upload::{
    BucketResolver, ResolvedImage, UploadCoordinator, UploadState, UploadStatus, Uploaded,
    UrlResolver,
};
