use async_trait::async_trait;
use common::PersistedProduct;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// A product as stored in the product collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredProduct {
    pub id: i32,
    #[serde(flatten)]
    pub product: PersistedProduct,
}

/// The product collection.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Append a new product and return it with its assigned id.
    async fn append(&self, product: PersistedProduct) -> Result<StoredProduct, StoreError>;

    /// All products, newest first.
    async fn list(&self) -> Result<Vec<StoredProduct>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<StoredProduct>, StoreError>;
}

/// In-process product collection.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: RwLock<Vec<StoredProduct>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn append(&self, product: PersistedProduct) -> Result<StoredProduct, StoreError> {
        let mut products = self.products.write().await;
        let id = i32::try_from(products.len() + 1)
            .map_err(|_| StoreError::Internal("product id space exhausted".into()))?;
        let stored = StoredProduct { id, product };
        products.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredProduct>, StoreError> {
        let products = self.products.read().await;
        let mut all = products.clone();
        all.sort_by(|a, b| {
            b.product
                .created_at
                .cmp(&a.product.created_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(all)
    }

    async fn get(&self, id: i32) -> Result<Option<StoredProduct>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }
}
