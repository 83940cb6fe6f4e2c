use crate::error::WarehouseError;
use core_types::{Customer, Product, Sale};
use sqlx::postgres::PgPool;

/// The `WarehouseRepository` provides a high-level, application-specific
/// interface to the warehouse database. It encapsulates all SQL queries and
/// data access logic; report math never lives here.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: PgPool,
}

/// An immutable snapshot of the three warehouse relations, fetched together.
/// Every report over the same snapshot yields the same rows.
#[derive(Debug, Clone)]
pub struct WarehouseSnapshot {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
}

impl WarehouseRepository {
    /// Creates a new `WarehouseRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the full customer dimension, ordered by surrogate key.
    pub async fn fetch_customers(&self) -> Result<Vec<Customer>, WarehouseError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT customer_key, customer_id, customer_number, first_name, last_name, \
             birthdate, gender, country, create_date \
             FROM customers ORDER BY customer_key ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    /// Fetches the full product dimension, ordered by surrogate key.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, WarehouseError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT product_key, product_id, product_name, category, subcategory, \
             cost, start_date \
             FROM products ORDER BY product_key ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Fetches every sale line, ordered by order date then order number so
    /// that repeated fetches of an unchanged table return identical rows.
    pub async fn fetch_sales(&self) -> Result<Vec<Sale>, WarehouseError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT order_number, product_key, customer_key, order_date, \
             shipping_date, due_date, sales_amount, quantity, price \
             FROM sales ORDER BY order_date ASC, order_number ASC, product_key ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    /// Fetches all three relations concurrently as one snapshot.
    pub async fn fetch_snapshot(&self) -> Result<WarehouseSnapshot, WarehouseError> {
        let (customers, products, sales) = tokio::join!(
            self.fetch_customers(),
            self.fetch_products(),
            self.fetch_sales()
        );

        let snapshot = WarehouseSnapshot {
            customers: customers?,
            products: products?,
            sales: sales?,
        };
        tracing::info!(
            customers = snapshot.customers.len(),
            products = snapshot.products.len(),
            sales = snapshot.sales.len(),
            "fetched warehouse snapshot"
        );
        Ok(snapshot)
    }

    /// Repairs out-of-order sale dates inside a single transaction.
    ///
    /// Shipping can never precede the order and the due date can never
    /// precede shipping; offending rows are clamped forward. Both rewrites
    /// commit together or not at all, so concurrent readers never observe a
    /// half-normalized table. Returns the number of rewritten rows.
    pub async fn normalize_sale_dates(&self) -> Result<u64, WarehouseError> {
        let mut tx = self.pool.begin().await?;

        let shipped_before_order =
            sqlx::query("UPDATE sales SET shipping_date = order_date WHERE shipping_date < order_date")
                .execute(&mut *tx)
                .await?
                .rows_affected();

        // Runs after the first rewrite so a row dirty in both columns ends
        // up fully ordered in one pass.
        let due_before_shipping =
            sqlx::query("UPDATE sales SET due_date = shipping_date WHERE due_date < shipping_date")
                .execute(&mut *tx)
                .await?
                .rows_affected();

        tx.commit().await?;

        tracing::info!(
            shipped_before_order,
            due_before_shipping,
            "normalized sale dates"
        );
        Ok(shipped_before_order + due_before_shipping)
    }
}
