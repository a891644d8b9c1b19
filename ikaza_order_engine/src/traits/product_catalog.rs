use thiserror::Error;

use crate::db_types::Product;

#[derive(Debug, Clone, Error)]
#[error("Catalogue lookup failed: {0}")]
pub struct CatalogError(pub String);

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError>;
}
