use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const PRODUCTS_ROUTE: &str = "/products";

/// Raw values submitted by a product form. Absent fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
}

impl ProductForm {
    pub fn new(
        title: impl Into<String>,
        price: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            price: price.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    Title,
    Price,
    Description,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Price => "price",
            FormField::Description => "description",
        }
    }
}

/// Field name to message, at most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0
            .entry(field.name().to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(field.name()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// What a form re-renders with after a rejected submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Invalid(FormState),
    Redirect(&'static str),
}
