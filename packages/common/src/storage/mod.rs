mod error;
mod name;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use name::{ObjectName, validate_bucket};
pub use traits::{BoxReader, ObjectStore};
