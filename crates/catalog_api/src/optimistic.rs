use shared::{
    domain::{Product, ProductId},
    error::ApiError,
};
use tracing::warn;

use crate::{delete_product_action, ApiContext};

/// A product taken out of the visible list while its delete is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRemoval {
    index: usize,
    product: Product,
}

impl PendingRemoval {
    pub fn product(&self) -> &Product {
        &self.product
    }
}

/// Client-side product list that hides deletions before the store confirms
/// them and puts them back when it does not.
#[derive(Debug, Clone, Default)]
pub struct OptimisticProducts {
    products: Vec<Product>,
}

impl OptimisticProducts {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Replaces the local view with a list confirmed by the store.
    pub fn reconcile(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn remove(&mut self, id: ProductId) -> Option<PendingRemoval> {
        let index = self.products.iter().position(|product| product.id == id)?;
        let product = self.products.remove(index);
        Some(PendingRemoval { index, product })
    }

    pub fn restore(&mut self, pending: PendingRemoval) {
        let index = pending.index.min(self.products.len());
        self.products.insert(index, pending.product);
    }

    /// Removes `id` locally, then deletes it in the store. On failure the
    /// product is restored at its old position and the error is returned.
    pub async fn delete(&mut self, ctx: &ApiContext, id: ProductId) -> Result<(), ApiError> {
        let pending = self.remove(id);
        match delete_product_action(ctx, id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Some(pending) = pending {
                    warn!(product_id = %id, error = %err, "delete failed, restoring product");
                    self.restore(pending);
                }
                Err(err)
            }
        }
    }
}
