use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub company: String,
    pub url: String,
    /// Empty when the product was submitted without an image.
    pub image_url: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub vote_count: i32,
    /// JSON array of comments.
    #[sea_orm(column_type = "JsonBinary")]
    pub comments: Json,

    pub creator_id: String,
    pub creator_name: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
