//! `SqliteDatabase` is a concrete implementation of an order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use ikaza_common::Money;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::{
    db::{db_url, new_pool, orders, products, user_accounts},
    SqliteDatabaseError,
};
use crate::{
    db_types::{NewOrder, Order, OrderItem, Product, UserAccount},
    traits::{
        AccountApiError,
        AccountManagement,
        CatalogError,
        OrderManagement,
        OrderManagementError,
        OrderWithItemCount,
        ProductCatalog,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `IKZ_DATABASE_URL`, or the default location.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Migrations are embedded in the binary.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Registers a user account for the given e-mail address, or returns the existing one.
    pub async fn fetch_or_create_account(&self, email: &str) -> Result<UserAccount, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let account = user_accounts::fetch_or_create_account(email, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    /// Adds a product to the catalogue. The order backend never manages products; this exists to seed stores.
    pub async fn insert_product(
        &self,
        name: &str,
        sku: Option<&str>,
        image_url: Option<&str>,
        price: Money,
    ) -> Result<Product, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(name, sku, image_url, price, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    pub async fn close(&mut self) {
        self.pool.close().await;
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} for user #{} saved", order.order_number, order.user_id);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderWithItemCount>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn approve_payment(
        &self,
        order_id: i64,
        transaction_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let updated = orders::approve_payment(order_id, transaction_id, paid_at, &mut tx).await?;
        tx.commit().await?;
        match &updated {
            Some(order) => debug!("🗃️ Order {} payment approved with transaction {transaction_id}", order.order_number),
            None => debug!("🗃️ Order #{order_id} has no pending payment. Approval skipped."),
        }
        Ok(updated)
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_account_for_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        user_accounts::user_account_by_email(email, &mut conn).await
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product(product_id, &mut conn).await
    }
}
