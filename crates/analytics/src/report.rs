use chrono::NaiveDate;
use core_types::{AgeGroup, CustomerSegment, ProductSegment};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the customer report: everything the business tracks per
/// customer, recomputed from the sales fact table on every run.
///
/// Dimensional fields are `None` when the sale lines reference a
/// `customer_key` with no matching customer row (left-join semantics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerMetrics {
    pub customer_key: i32,
    pub customer_number: Option<String>,
    pub customer_name: Option<String>,
    /// Years between birthdate and the as-of date; `None` without a birthdate.
    pub age: Option<i32>,
    pub age_group: Option<AgeGroup>,
    pub segment: CustomerSegment,
    pub last_order_date: NaiveDate,
    /// Count of distinct order numbers, not of sale lines.
    pub total_orders: usize,
    pub total_sales: Decimal,
    pub total_quantity: i64,
    /// Count of distinct products the customer ever bought.
    pub total_products: usize,
    /// Months between the first and the last order; 0 for a single order.
    pub lifespan_months: i32,
    /// Months between the last order and the as-of date.
    pub recency_months: i32,
    pub average_order_value: Decimal,
    pub average_monthly_spend: Decimal,
}

/// One row of the product report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetrics {
    pub product_key: i32,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub cost: Option<Decimal>,
    pub product_segment: ProductSegment,
    pub last_order_date: NaiveDate,
    pub total_orders: usize,
    pub total_sales: Decimal,
    pub total_quantity: i64,
    /// Count of distinct customers that ever bought the product.
    pub total_customers: usize,
    pub lifespan_months: i32,
    pub recency_months: i32,
    pub average_order_revenue: Decimal,
    pub average_monthly_revenue: Decimal,
}

/// Part-to-whole revenue share of one product category.
///
/// Sales whose product is unknown group under `category = None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Option<String>,
    pub sales: Decimal,
    pub overall_sales: Decimal,
    pub contribution_percent: Decimal,
}

/// One calendar-month bucket of the running-sales report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    pub year: i32,
    pub month: u32,
    pub total_sales: Decimal,
    /// Cumulative total within the year; resets every January.
    pub running_sales: Decimal,
    /// Cumulative mean of the monthly average unit price, same partition.
    pub moving_avg_price: Decimal,
}

/// One (product, year) row of the year-over-year trend report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProductSales {
    pub year: i32,
    pub product_key: i32,
    pub product_name: Option<String>,
    pub total_sales: Decimal,
    /// Mean of the product's yearly totals across all its years.
    pub average_sales: Decimal,
    pub diff_vs_average: Decimal,
    pub avg_change_label: TrendVsAverage,
    /// Total of the product's closest earlier year; `None` on its first year.
    pub previous_year_sales: Option<Decimal>,
    pub diff_vs_previous: Option<Decimal>,
    pub sale_change_label: Option<TrendVsPrevious>,
}

/// One row of the revenue ranking report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    /// Standard competition rank: ties share a rank, the next rank skips.
    pub rank: usize,
    pub product_key: i32,
    pub product_name: Option<String>,
    pub total_sales: Decimal,
}

/// How a yearly total compares to the product's own multi-year average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendVsAverage {
    #[serde(rename = "Above Average")]
    AboveAverage,
    #[serde(rename = "Below Average")]
    BelowAverage,
    #[serde(rename = "Avg")]
    Average,
}

impl TrendVsAverage {
    pub fn from_diff(diff: Decimal) -> Self {
        if diff > Decimal::ZERO {
            TrendVsAverage::AboveAverage
        } else if diff < Decimal::ZERO {
            TrendVsAverage::BelowAverage
        } else {
            TrendVsAverage::Average
        }
    }
}

impl fmt::Display for TrendVsAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendVsAverage::AboveAverage => "Above Average",
            TrendVsAverage::BelowAverage => "Below Average",
            TrendVsAverage::Average => "Avg",
        };
        f.write_str(label)
    }
}

/// How a yearly total compares to the product's previous year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendVsPrevious {
    #[serde(rename = "Sales Improved")]
    Improved,
    #[serde(rename = "Sales Decreased")]
    Decreased,
    #[serde(rename = "No Change")]
    NoChange,
}

impl TrendVsPrevious {
    pub fn from_diff(diff: Decimal) -> Self {
        if diff > Decimal::ZERO {
            TrendVsPrevious::Improved
        } else if diff < Decimal::ZERO {
            TrendVsPrevious::Decreased
        } else {
            TrendVsPrevious::NoChange
        }
    }
}

impl fmt::Display for TrendVsPrevious {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendVsPrevious::Improved => "Sales Improved",
            TrendVsPrevious::Decreased => "Sales Decreased",
            TrendVsPrevious::NoChange => "No Change",
        };
        f.write_str(label)
    }
}
