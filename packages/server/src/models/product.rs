use chrono::{DateTime, Utc};
use common::{Comment, Creator, ProductDraft};
use listing::StoredProduct;
use serde::{Deserialize, Serialize};

/// Request body for creating a product.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProductRequest {
    /// Product name.
    #[schema(example = "Showcase")]
    #[serde(default)]
    pub name: String,
    /// Company or team behind the product.
    #[schema(example = "Acme Inc.")]
    #[serde(default)]
    pub company: String,
    /// Public `http(s)` URL of the product.
    #[schema(example = "https://acme.example/showcase")]
    #[serde(default)]
    pub url: String,
    /// What the product does.
    #[schema(example = "A place to show off what you built.")]
    #[serde(default)]
    pub description: String,
    /// Object name returned by the image upload endpoint, if an image was uploaded.
    #[schema(example = "0b6f0c9e-5f7e-4a43-9d59-2c1f0b1c4e2a.png")]
    pub image: Option<String>,
}

impl CreateProductRequest {
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            company: self.company.clone(),
            image_url: String::new(),
            url: self.url.clone(),
            description: self.description.clone(),
        }
    }
}

/// A product as shown on the home page and the detail page.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Showcase")]
    pub name: String,
    #[schema(example = "Acme Inc.")]
    pub company: String,
    #[schema(example = "https://acme.example/showcase")]
    pub url: String,
    /// Public image URL, empty when the product has no image.
    #[schema(example = "http://127.0.0.1:3000/storage/products/0b6f0c9e.png")]
    pub image_url: String,
    pub description: String,
    #[schema(example = 0)]
    pub vote_count: i32,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub creator: Creator,
}

impl From<StoredProduct> for ProductResponse {
    fn from(stored: StoredProduct) -> Self {
        let p = stored.product;
        Self {
            id: stored.id,
            name: p.name,
            company: p.company,
            url: p.url,
            image_url: p.image_url,
            description: p.description,
            vote_count: p.vote_count,
            comments: p.comments,
            created_at: p.created_at,
            creator: p.creator,
        }
    }
}

/// Successful creation: the product and where to navigate next.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateProductResponse {
    pub product: ProductResponse,
    #[schema(example = "/")]
    pub redirect: &'static str,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total: u64,
}

/// Result of an image upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageUploadResponse {
    /// Randomised object name; send it back as `image` when creating the product.
    #[schema(example = "0b6f0c9e-5f7e-4a43-9d59-2c1f0b1c4e2a.png")]
    pub filename: String,
    /// Public URL, available once the upload was resolved.
    #[schema(example = "http://127.0.0.1:3000/storage/products/0b6f0c9e-5f7e-4a43-9d59-2c1f0b1c4e2a.png")]
    pub url: String,
    #[schema(example = "success")]
    pub status: &'static str,
    #[schema(example = 100)]
    pub progress: u8,
    pub size: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageUrlResponse {
    pub url: String,
}
