use std::collections::BTreeMap;

use serde::Serialize;
use url::Url;

use crate::product::{Field, ProductDraft};

/// Field name to human-readable message, for every field that fails its rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Validation rules for the "new product" form.
///
/// Pure: the same draft always yields the same errors.
pub fn validate_create_product(draft: &ProductDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.name.trim().is_empty() {
        errors.insert(Field::Name, "Name is required");
    }

    if draft.company.trim().is_empty() {
        errors.insert(Field::Company, "Company is required");
    }

    let url = draft.url.trim();
    if url.is_empty() {
        errors.insert(Field::Url, "Product URL is required");
    } else if !is_web_url(url) {
        errors.insert(Field::Url, "Product URL is not valid");
    }

    if draft.description.trim().is_empty() {
        errors.insert(Field::Description, "Add a description of your product");
    }

    errors
}

/// Accepts absolute `http` and `https` URLs that name a host.
fn is_web_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https")
            && parsed.host_str().is_some_and(|host| !host.is_empty())
    })
}
