use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use core_types::{AgeGroup, Customer, CustomerSegment, Product, ProductSegment, Sale};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::AnalyticsError;
use crate::report::{
    CategoryShare, CustomerMetrics, MonthlySales, ProductMetrics, RankedProduct, TrendVsAverage,
    TrendVsPrevious, YearlyProductSales,
};
use crate::window;

/// A stateless calculator for deriving business metrics from warehouse rows.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the per-customer report.
    ///
    /// # Arguments
    ///
    /// * `customers` - The customer dimension.
    /// * `sales` - All sale lines of the snapshot.
    /// * `as_of` - The reference date for age and recency. The engine never
    ///   reads the system clock; callers inject this so the same snapshot
    ///   always produces the same report.
    ///
    /// # Returns
    ///
    /// One `CustomerMetrics` row per customer_key that appears in `sales`,
    /// ordered by key. Customers with no sale lines produce no row.
    pub fn customer_report(
        &self,
        customers: &[Customer],
        sales: &[Sale],
        as_of: NaiveDate,
    ) -> Result<Vec<CustomerMetrics>, AnalyticsError> {
        let index = index_customers(customers)?;
        let groups = group_sales(sales, |sale| sale.customer_key);

        let mut rows = Vec::with_capacity(groups.len());
        for (customer_key, group) in groups {
            let customer = index.get(&customer_key).copied();
            let lifespan_months = months_between(group.first_order, group.last_order);
            let total_orders = group.orders.len();
            let age = customer
                .and_then(|c| c.birthdate)
                .map(|birthdate| years_between(birthdate, as_of));

            rows.push(CustomerMetrics {
                customer_key,
                customer_number: customer.map(|c| c.customer_number.clone()),
                customer_name: customer.map(|c| c.full_name()),
                age,
                age_group: age.map(AgeGroup::from_age),
                segment: CustomerSegment::classify(lifespan_months, group.total_sales),
                last_order_date: group.last_order,
                total_orders,
                total_sales: group.total_sales,
                total_quantity: group.total_quantity,
                total_products: group.products.len(),
                lifespan_months,
                recency_months: months_between(group.last_order, as_of),
                average_order_value: average_or_zero(group.total_sales, total_orders),
                average_monthly_spend: spread_over_months(group.total_sales, lifespan_months),
            });
        }

        Ok(rows)
    }

    /// Computes the per-product report; same grouping conventions as the
    /// customer report, driven by the sale lines.
    pub fn product_report(
        &self,
        products: &[Product],
        sales: &[Sale],
        as_of: NaiveDate,
    ) -> Result<Vec<ProductMetrics>, AnalyticsError> {
        let index = index_products(products)?;
        let groups = group_sales(sales, |sale| sale.product_key);

        let mut rows = Vec::with_capacity(groups.len());
        for (product_key, group) in groups {
            let product = index.get(&product_key).copied();
            let lifespan_months = months_between(group.first_order, group.last_order);
            let total_orders = group.orders.len();

            rows.push(ProductMetrics {
                product_key,
                product_name: product.map(|p| p.product_name.clone()),
                category: product.map(|p| p.category.clone()),
                subcategory: product.map(|p| p.subcategory.clone()),
                cost: product.map(|p| p.cost),
                product_segment: ProductSegment::classify(group.total_sales),
                last_order_date: group.last_order,
                total_orders,
                total_sales: group.total_sales,
                total_quantity: group.total_quantity,
                total_customers: group.customers.len(),
                lifespan_months,
                recency_months: months_between(group.last_order, as_of),
                average_order_revenue: average_or_zero(group.total_sales, total_orders),
                average_monthly_revenue: spread_over_months(group.total_sales, lifespan_months),
            });
        }

        Ok(rows)
    }

    /// Computes each category's share of overall revenue.
    pub fn category_share(
        &self,
        products: &[Product],
        sales: &[Sale],
    ) -> Result<Vec<CategoryShare>, AnalyticsError> {
        let index = index_products(products)?;

        let mut by_category: BTreeMap<Option<String>, Decimal> = BTreeMap::new();
        for sale in sales {
            let category = index.get(&sale.product_key).map(|p| p.category.clone());
            *by_category.entry(category).or_insert(Decimal::ZERO) += sale.sales_amount;
        }

        let overall_sales: Decimal = by_category.values().sum();
        let rows = by_category
            .into_iter()
            .map(|(category, sales)| CategoryShare {
                category,
                sales,
                overall_sales,
                contribution_percent: percent_of(sales, overall_sales),
            })
            .collect();

        Ok(rows)
    }

    /// Computes the month-by-month sales report with a running yearly total
    /// and a moving average of the unit price.
    pub fn monthly_sales(&self, sales: &[Sale]) -> Result<Vec<MonthlySales>, AnalyticsError> {
        let mut buckets: BTreeMap<(i32, u32), MonthBucket> = BTreeMap::new();
        for sale in sales {
            let key = (sale.order_date.year(), sale.order_date.month());
            buckets.entry(key).or_default().absorb(sale);
        }

        // Regroup the calendar-ordered buckets into one partition per year,
        // then fold the running windows inside each partition.
        let mut partitions: BTreeMap<i32, Vec<(u32, Decimal, Decimal)>> = BTreeMap::new();
        for ((year, month), bucket) in buckets {
            partitions
                .entry(year)
                .or_default()
                .push((month, bucket.total_sales, bucket.average_price()));
        }

        let mut rows = Vec::new();
        for (year, months) in partitions {
            let totals: Vec<Decimal> = months.iter().map(|(_, total, _)| *total).collect();
            let prices: Vec<Decimal> = months.iter().map(|(_, _, price)| *price).collect();
            let running = window::running_sum(&totals);
            let moving = window::cumulative_mean(&prices);

            for (position, (month, total_sales, _)) in months.into_iter().enumerate() {
                rows.push(MonthlySales {
                    year,
                    month,
                    total_sales,
                    running_sales: running[position],
                    moving_avg_price: round2(moving[position]),
                });
            }
        }

        Ok(rows)
    }

    /// Computes the year-over-year product trend: each (product, year) total
    /// compared against the product's multi-year average and its closest
    /// earlier year.
    pub fn yearly_product_trend(
        &self,
        products: &[Product],
        sales: &[Sale],
    ) -> Result<Vec<YearlyProductSales>, AnalyticsError> {
        let index = index_products(products)?;

        let mut totals: BTreeMap<(i32, i32), Decimal> = BTreeMap::new();
        for sale in sales {
            let key = (sale.product_key, sale.order_date.year());
            *totals.entry(key).or_insert(Decimal::ZERO) += sale.sales_amount;
        }

        // One partition per product, already ordered by year.
        let mut partitions: BTreeMap<i32, Vec<(i32, Decimal)>> = BTreeMap::new();
        for ((product_key, year), total) in totals {
            partitions.entry(product_key).or_default().push((year, total));
        }

        let mut rows = Vec::new();
        for (product_key, years) in partitions {
            let totals: Vec<Decimal> = years.iter().map(|(_, total)| *total).collect();
            let average_sales = totals.iter().sum::<Decimal>() / Decimal::from(totals.len());
            let lagged = window::lag1(&totals);
            let product_name = index.get(&product_key).map(|p| p.product_name.clone());

            for (position, (year, total_sales)) in years.into_iter().enumerate() {
                let diff_vs_average = total_sales - average_sales;
                let previous_year_sales = lagged[position];
                let diff_vs_previous = previous_year_sales.map(|previous| total_sales - previous);

                rows.push(YearlyProductSales {
                    year,
                    product_key,
                    product_name: product_name.clone(),
                    total_sales,
                    average_sales,
                    diff_vs_average,
                    avg_change_label: TrendVsAverage::from_diff(diff_vs_average),
                    previous_year_sales,
                    diff_vs_previous,
                    sale_change_label: diff_vs_previous.map(TrendVsPrevious::from_diff),
                });
            }
        }

        Ok(rows)
    }

    /// Ranks products by total revenue, highest first, using standard
    /// competition ranking. `limit` truncates the ranking after rank
    /// assignment; `None` returns every ranked product.
    pub fn product_ranking(
        &self,
        products: &[Product],
        sales: &[Sale],
        limit: Option<usize>,
    ) -> Result<Vec<RankedProduct>, AnalyticsError> {
        let index = index_products(products)?;

        let mut totals: BTreeMap<i32, Decimal> = BTreeMap::new();
        for sale in sales {
            *totals.entry(sale.product_key).or_insert(Decimal::ZERO) += sale.sales_amount;
        }

        let mut ordered: Vec<(i32, Decimal)> = totals.into_iter().collect();
        // Descending by revenue; ascending key breaks ties deterministically.
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let revenues: Vec<Decimal> = ordered.iter().map(|(_, total)| *total).collect();
        let ranks = window::competition_ranks(&revenues);

        let mut rows: Vec<RankedProduct> = ordered
            .into_iter()
            .zip(ranks)
            .map(|((product_key, total_sales), rank)| RankedProduct {
                rank,
                product_key,
                product_name: index.get(&product_key).map(|p| p.product_name.clone()),
                total_sales,
            })
            .collect();

        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }
}

/// Per-group accumulator shared by the customer and product reports.
#[derive(Debug)]
struct SaleGroup<'a> {
    total_sales: Decimal,
    total_quantity: i64,
    orders: BTreeSet<&'a str>,
    products: BTreeSet<i32>,
    customers: BTreeSet<i32>,
    first_order: NaiveDate,
    last_order: NaiveDate,
}

impl<'a> SaleGroup<'a> {
    fn new(sale: &'a Sale) -> Self {
        let mut group = SaleGroup {
            total_sales: Decimal::ZERO,
            total_quantity: 0,
            orders: BTreeSet::new(),
            products: BTreeSet::new(),
            customers: BTreeSet::new(),
            first_order: sale.order_date,
            last_order: sale.order_date,
        };
        group.absorb(sale);
        group
    }

    fn absorb(&mut self, sale: &'a Sale) {
        self.total_sales += sale.sales_amount;
        self.total_quantity += i64::from(sale.quantity);
        self.orders.insert(sale.order_number.as_str());
        self.products.insert(sale.product_key);
        self.customers.insert(sale.customer_key);
        if sale.order_date < self.first_order {
            self.first_order = sale.order_date;
        }
        if sale.order_date > self.last_order {
            self.last_order = sale.order_date;
        }
    }
}

/// Per-month accumulator for the running-sales report.
#[derive(Debug, Default)]
struct MonthBucket {
    total_sales: Decimal,
    price_sum: Decimal,
    line_count: u32,
}

impl MonthBucket {
    fn absorb(&mut self, sale: &Sale) {
        self.total_sales += sale.sales_amount;
        self.price_sum += sale.price;
        self.line_count += 1;
    }

    fn average_price(&self) -> Decimal {
        self.price_sum / Decimal::from(self.line_count)
    }
}

/// Groups sale lines by an arbitrary key. The ordered map keeps output rows
/// in key order, so reruns over the same snapshot are byte-identical.
fn group_sales<'a, K, F>(sales: &'a [Sale], key: F) -> BTreeMap<K, SaleGroup<'a>>
where
    K: Ord,
    F: Fn(&Sale) -> K,
{
    let mut groups: BTreeMap<K, SaleGroup<'a>> = BTreeMap::new();
    for sale in sales {
        match groups.entry(key(sale)) {
            Entry::Vacant(slot) => {
                slot.insert(SaleGroup::new(sale));
            }
            Entry::Occupied(mut slot) => slot.get_mut().absorb(sale),
        }
    }
    groups
}

fn index_customers(customers: &[Customer]) -> Result<BTreeMap<i32, &Customer>, AnalyticsError> {
    let mut index = BTreeMap::new();
    for customer in customers {
        if index.insert(customer.customer_key, customer).is_some() {
            return Err(AnalyticsError::InvalidInput(format!(
                "duplicate customer_key {} in the customers relation",
                customer.customer_key
            )));
        }
    }
    Ok(index)
}

fn index_products(products: &[Product]) -> Result<BTreeMap<i32, &Product>, AnalyticsError> {
    let mut index = BTreeMap::new();
    for product in products {
        if index.insert(product.product_key, product).is_some() {
            return Err(AnalyticsError::InvalidInput(format!(
                "duplicate product_key {} in the products relation",
                product.product_key
            )));
        }
    }
    Ok(index)
}

/// Calendar months crossed between two dates (Jan 15 to Mar 10 is 2),
/// mirroring the month arithmetic of the legacy warehouse reports.
fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Calendar years crossed between two dates; day and month are ignored.
fn years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    to.year() - from.year()
}

/// SQL-style ROUND to 2 decimals: midpoints round away from zero.
fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Ratio guard for per-order averages: a zero total stays zero instead of
/// dividing.
fn average_or_zero(total: Decimal, order_count: usize) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        round2(total / Decimal::from(order_count))
    }
}

/// Ratio guard for per-month averages: a zero-month lifespan yields the
/// unrounded total itself.
fn spread_over_months(total: Decimal, lifespan_months: i32) -> Decimal {
    if lifespan_months == 0 {
        total
    } else {
        round2(total / Decimal::from(lifespan_months))
    }
}

/// Ratio guard for part-to-whole shares: an all-zero snapshot contributes 0.
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        round2(part / whole * Decimal::from(100))
    }
}
