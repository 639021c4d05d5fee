use std::sync::Arc;

use shared::{
    domain::{Product, ProductId},
    error::ApiError,
    protocol::{ActionOutcome, FormState, ProductForm, PRODUCTS_ROUTE},
};
use storage::{ProductNotFound, ProductStore};
use tracing::{debug, info};

mod optimistic;
pub mod validation;

pub use optimistic::{OptimisticProducts, PendingRemoval};
pub use validation::validate_product_form;

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn ProductStore>,
}

impl ApiContext {
    pub fn new(store: impl ProductStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

pub async fn list_products(ctx: &ApiContext) -> Result<Vec<Product>, ApiError> {
    ctx.store.list_products().await.map_err(persistence)
}

pub async fn get_product(ctx: &ApiContext, id: ProductId) -> Result<Product, ApiError> {
    ctx.store
        .get_product(id)
        .await
        .map_err(persistence)?
        .ok_or_else(|| ApiError::not_found(ProductNotFound(id).to_string()))
}

/// Validates the form and creates a product. A rejected form never reaches
/// the store.
pub async fn create_product_action(
    ctx: &ApiContext,
    form: &ProductForm,
) -> Result<ActionOutcome, ApiError> {
    let fields = match validate_product_form(form) {
        Ok(fields) => fields,
        Err(errors) => {
            debug!(fields = errors.len(), "rejected product create form");
            return Ok(ActionOutcome::Invalid(FormState { errors }));
        }
    };

    let product = ctx
        .store
        .create_product(&fields)
        .await
        .map_err(persistence)?;
    info!(product_id = %product.id, "product created");
    Ok(ActionOutcome::Redirect(PRODUCTS_ROUTE))
}

/// `id` comes from the page the form was rendered on, never from the form.
pub async fn update_product_action(
    ctx: &ApiContext,
    id: ProductId,
    form: &ProductForm,
) -> Result<ActionOutcome, ApiError> {
    let fields = match validate_product_form(form) {
        Ok(fields) => fields,
        Err(errors) => {
            debug!(product_id = %id, fields = errors.len(), "rejected product update form");
            return Ok(ActionOutcome::Invalid(FormState { errors }));
        }
    };

    ctx.store
        .update_product(id, &fields)
        .await
        .map_err(persistence)?;
    info!(product_id = %id, "product updated");
    Ok(ActionOutcome::Redirect(PRODUCTS_ROUTE))
}

pub async fn delete_product_action(ctx: &ApiContext, id: ProductId) -> Result<(), ApiError> {
    ctx.store.delete_product(id).await.map_err(persistence)?;
    info!(product_id = %id, "product deleted");
    Ok(())
}

fn persistence(err: anyhow::Error) -> ApiError {
    match err.downcast_ref::<ProductNotFound>() {
        Some(not_found) => ApiError::not_found(not_found.to_string()),
        None => ApiError::internal(err.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
