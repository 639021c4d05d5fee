use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ProductId);

/// A persisted catalog entry. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: i64,
    pub description: String,
}

impl Product {
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            title: self.title.clone(),
            price: self.price,
            description: self.description.clone(),
        }
    }
}

/// The mutable part of a product. Create and update always write all three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub title: String,
    pub price: i64,
    pub description: String,
}

impl ProductFields {
    pub fn new(title: impl Into<String>, price: i64, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price,
            description: description.into(),
        }
    }
}
