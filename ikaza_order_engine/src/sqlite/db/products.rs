use sqlx::SqliteConnection;

use crate::{db_types::Product, traits::CatalogError};

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, CatalogError> {
    let product = sqlx::query_as("SELECT id, name, sku, image_url, price FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

pub async fn insert_product(
    name: &str,
    sku: Option<&str>,
    image_url: Option<&str>,
    price: ikaza_common::Money,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogError> {
    let product = sqlx::query_as(
        "INSERT INTO products (name, sku, image_url, price) VALUES ($1, $2, $3, $4) RETURNING id, name, sku, image_url, \
         price",
    )
    .bind(name)
    .bind(sku)
    .bind(image_url)
    .bind(price)
    .fetch_one(conn)
    .await?;
    Ok(product)
}
