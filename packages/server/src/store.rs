use async_trait::async_trait;
use common::{Comment, Creator, PersistedProduct};
use listing::{ProductStore, StoreError, StoredProduct};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};

use crate::entity::product;

/// The product collection, backed by the `product` table.
pub struct SeaOrmProductStore {
    db: DatabaseConnection,
}

impl SeaOrmProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn store_err(err: DbErr) -> StoreError {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => StoreError::Unavailable(err.to_string()),
        other => StoreError::Internal(other.to_string()),
    }
}

fn to_stored(model: product::Model) -> Result<StoredProduct, StoreError> {
    let comments: Vec<Comment> = serde_json::from_value(model.comments)
        .map_err(|e| StoreError::Internal(format!("corrupt comments for product {}: {e}", model.id)))?;

    Ok(StoredProduct {
        id: model.id,
        product: PersistedProduct {
            name: model.name,
            company: model.company,
            url: model.url,
            image_url: model.image_url,
            description: model.description,
            vote_count: model.vote_count,
            comments,
            created_at: model.created_at,
            creator: Creator {
                id: model.creator_id,
                name: model.creator_name,
            },
        },
    })
}

#[async_trait]
impl ProductStore for SeaOrmProductStore {
    async fn append(&self, product: PersistedProduct) -> Result<StoredProduct, StoreError> {
        let comments = serde_json::to_value(&product.comments)
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        let new_product = product::ActiveModel {
            name: Set(product.name),
            company: Set(product.company),
            url: Set(product.url),
            image_url: Set(product.image_url),
            description: Set(product.description),
            vote_count: Set(product.vote_count),
            comments: Set(comments),
            creator_id: Set(product.creator.id),
            creator_name: Set(product.creator.name),
            created_at: Set(product.created_at),
            ..Default::default()
        };

        let model = new_product.insert(&self.db).await.map_err(store_err)?;
        to_stored(model)
    }

    async fn list(&self) -> Result<Vec<StoredProduct>, StoreError> {
        product::Entity::find()
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(to_stored)
            .collect()
    }

    async fn get(&self, id: i32) -> Result<Option<StoredProduct>, StoreError> {
        product::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(to_stored)
            .transpose()
    }
}
