use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the customer dimension.
///
/// `customer_key` is the surrogate key every sale line references;
/// `customer_id` and `customer_number` are the source-system identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub customer_key: i32,
    pub customer_id: i32,
    pub customer_number: String,
    pub first_name: String,
    pub last_name: String,
    /// Missing for customers the source system never captured a birthdate for.
    pub birthdate: Option<NaiveDate>,
    pub gender: String,
    pub country: String,
    pub create_date: NaiveDate,
}

impl Customer {
    /// The display name the reports carry ("first last").
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A row of the product dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_key: i32,
    pub product_id: i32,
    pub product_name: String,
    pub category: String,
    pub subcategory: String,
    pub cost: Decimal,
    pub start_date: NaiveDate,
}

/// A single line item of the sales fact table.
///
/// An order may span multiple lines, all sharing one `order_number`;
/// distinct-order counts must therefore deduplicate on that column, never
/// count lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub order_number: String,
    pub product_key: i32,
    pub customer_key: i32,
    pub order_date: NaiveDate,
    pub shipping_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Revenue for this line.
    pub sales_amount: Decimal,
    pub quantity: i32,
    /// Unit price for this line.
    pub price: Decimal,
}
