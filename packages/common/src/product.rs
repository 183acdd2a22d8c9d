use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user-editable fields of a product draft.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Company,
    Url,
    Description,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Company, Field::Url, Field::Description];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Company => "company",
            Field::Url => "url",
            Field::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

/// User-entered, not yet persisted product data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProductDraft {
    #[schema(example = "Showcase")]
    #[serde(default)]
    pub name: String,
    #[schema(example = "Acme Inc.")]
    #[serde(default)]
    pub company: String,
    /// Derived from the image upload; never typed by the user.
    #[serde(default)]
    pub image_url: String,
    #[schema(example = "https://acme.example/showcase")]
    #[serde(default)]
    pub url: String,
    #[schema(example = "A place to show off what you built.")]
    #[serde(default)]
    pub description: String,
}

impl ProductDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Company => &self.company,
            Field::Url => &self.url,
            Field::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Company => &mut self.company,
            Field::Url => &mut self.url,
            Field::Description => &mut self.description,
        };
        *slot = value.into();
    }
}

/// An authenticated user as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub display_name: String,
}

/// The author of a product, denormalised into the product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Creator {
    #[schema(example = "u1")]
    pub id: String,
    #[schema(example = "Alice")]
    pub name: String,
}

impl From<&Identity> for Creator {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.uid.clone(),
            name: identity.display_name.clone(),
        }
    }
}

/// A comment left on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Comment {
    pub user_id: String,
    pub user_name: String,
    pub message: String,
}

/// The record appended to the product collection on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PersistedProduct {
    pub name: String,
    pub company: String,
    pub url: String,
    /// Public URL of the product image, empty when no image was uploaded.
    pub image_url: String,
    pub description: String,
    pub vote_count: i32,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub creator: Creator,
}
