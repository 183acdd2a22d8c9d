pub mod product;
pub mod storage;
pub mod validation;

pub use product::{Comment, Creator, Field, Identity, PersistedProduct, ProductDraft};
pub use validation::{ValidationErrors, validate_create_product};
