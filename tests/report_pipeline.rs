//! End-to-end checks of the report pipeline over small synthetic warehouse
//! snapshots, exercising the public API the CLI consumes.

use analytics::MetricsEngine;
use chrono::NaiveDate;
use core_types::{Customer, CustomerSegment, Product, Sale};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn customer(key: i32, name: &str, birthdate: Option<NaiveDate>) -> Customer {
    Customer {
        customer_key: key,
        customer_id: key + 10000,
        customer_number: format!("AW{key:05}"),
        first_name: name.to_string(),
        last_name: "Walker".to_string(),
        birthdate,
        gender: "Female".to_string(),
        country: "Germany".to_string(),
        create_date: date(2012, 6, 1),
    }
}

fn product(key: i32, name: &str, category: &str) -> Product {
    Product {
        product_key: key,
        product_id: key + 200,
        product_name: name.to_string(),
        category: category.to_string(),
        subcategory: "General".to_string(),
        cost: dec!(75),
        start_date: date(2011, 7, 1),
    }
}

fn sale(
    order: &str,
    product_key: i32,
    customer_key: i32,
    amount: Decimal,
    quantity: i32,
    price: Decimal,
    order_date: NaiveDate,
) -> Sale {
    Sale {
        order_number: order.to_string(),
        product_key,
        customer_key,
        order_date,
        shipping_date: order_date,
        due_date: order_date,
        sales_amount: amount,
        quantity,
        price,
    }
}

#[test]
fn test_customer_segments_across_a_snapshot() {
    let customers = vec![
        customer(1, "Vera", None),
        customer(2, "Rita", None),
        customer(3, "Nina", None),
    ];
    let sales = vec![
        // Customer 1: 13 months of history, 6000 total -> VIP.
        sale("2001", 10, 1, dec!(3000), 1, dec!(3000), date(2013, 1, 10)),
        sale("2002", 10, 1, dec!(3000), 1, dec!(3000), date(2014, 2, 10)),
        // Customer 2: 12 months of history, 3000 total -> Regular.
        sale("2003", 10, 2, dec!(1500), 1, dec!(1500), date(2013, 1, 5)),
        sale("2004", 10, 2, dec!(1500), 1, dec!(1500), date(2014, 1, 5)),
        // Customer 3: 2 months of history -> New.
        sale("2005", 10, 3, dec!(100), 2, dec!(50), date(2014, 1, 15)),
        sale("2006", 10, 3, dec!(150), 1, dec!(150), date(2014, 3, 10)),
    ];

    let rows = MetricsEngine::new()
        .customer_report(&customers, &sales, date(2014, 6, 15))
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].segment, CustomerSegment::Vip);
    assert_eq!(rows[1].segment, CustomerSegment::Regular);
    assert_eq!(rows[2].segment, CustomerSegment::New);

    // The short-tenure customer gets the full per-metric check.
    let nina = &rows[2];
    assert_eq!(nina.total_sales, dec!(250));
    assert_eq!(nina.total_orders, 2);
    assert_eq!(nina.lifespan_months, 2);
    assert_eq!(nina.recency_months, 3);
    assert_eq!(nina.average_order_value, dec!(125.00));
    assert_eq!(nina.average_monthly_spend, dec!(125.00));
}

#[test]
fn test_age_group_ladder_skips_boundary_ages() {
    let as_of = date(2014, 1, 29);
    let birth_years_and_labels = [
        (1995, "Under 20"),    // age 19
        (1994, "50 and above"), // age 20 falls through the ladder's gap
        (1993, "21-29"),       // age 21
        (1985, "21-29"),       // age 29
        (1984, "50 and above"), // age 30, gap
        (1983, "31-39"),       // age 31
        (1974, "50 and above"), // age 40, gap
        (1964, "50 and above"), // age 50
    ];

    let customers: Vec<Customer> = birth_years_and_labels
        .iter()
        .enumerate()
        .map(|(i, (year, _))| customer(i as i32 + 1, "Ada", Some(date(*year, 6, 15))))
        .collect();
    let sales: Vec<Sale> = (1..=customers.len() as i32)
        .map(|key| {
            sale(
                &format!("3{key:03}"),
                10,
                key,
                dec!(10),
                1,
                dec!(10),
                date(2014, 1, 2),
            )
        })
        .collect();

    let rows = MetricsEngine::new()
        .customer_report(&customers, &sales, as_of)
        .unwrap();

    for (row, (_, label)) in rows.iter().zip(birth_years_and_labels.iter()) {
        let group = row.age_group.unwrap();
        assert_eq!(group.to_string(), *label, "age {:?}", row.age);
    }
}

#[test]
fn test_category_contribution_sums_to_one_hundred() {
    let products = vec![
        product(1, "Mountain-200", "Bikes"),
        product(2, "Road-150", "Bikes"),
        product(3, "Touring Tire", "Accessories"),
    ];
    let sales = vec![
        sale("4001", 1, 1, dec!(1200), 1, dec!(1200), date(2013, 2, 1)),
        sale("4002", 2, 1, dec!(800), 1, dec!(800), date(2013, 3, 1)),
        sale("4003", 3, 2, dec!(1000), 1, dec!(1000), date(2013, 4, 1)),
        // A fact row whose product is missing from the dimension.
        sale("4004", 99, 2, dec!(1000), 1, dec!(1000), date(2013, 5, 1)),
    ];

    let rows = MetricsEngine::new().category_share(&products, &sales).unwrap();

    let total_contribution: Decimal = rows.iter().map(|r| r.contribution_percent).sum();
    assert_eq!(total_contribution, dec!(100.00));
    assert!(rows.iter().all(|r| r.overall_sales == dec!(4000)));

    // The orphaned fact surfaces as its own uncategorized group.
    assert_eq!(rows[0].category, None);
    assert_eq!(rows[0].sales, dec!(1000));
    assert_eq!(rows[0].contribution_percent, dec!(25.00));
}

#[test]
fn test_running_sales_reset_at_year_boundary() {
    let sales = vec![
        sale("5001", 1, 1, dec!(100), 1, dec!(10), date(2013, 11, 5)),
        sale("5002", 1, 1, dec!(50), 1, dec!(20), date(2013, 12, 5)),
        sale("5003", 1, 1, dec!(75), 1, dec!(30), date(2014, 1, 5)),
    ];

    let rows = MetricsEngine::new().monthly_sales(&sales).unwrap();

    let running: Vec<Decimal> = rows.iter().map(|r| r.running_sales).collect();
    assert_eq!(running, vec![dec!(100), dec!(150), dec!(75)]);

    let moving: Vec<Decimal> = rows.iter().map(|r| r.moving_avg_price).collect();
    assert_eq!(moving, vec![dec!(10.00), dec!(15.00), dec!(30.00)]);
}

#[test]
fn test_trend_labels_render_report_wording() {
    let products = vec![product(1, "Mountain-200", "Bikes")];
    let sales = vec![
        sale("6001", 1, 1, dec!(100), 1, dec!(100), date(2012, 4, 1)),
        sale("6002", 1, 1, dec!(300), 1, dec!(300), date(2013, 4, 1)),
    ];

    let rows = MetricsEngine::new().yearly_product_trend(&products, &sales).unwrap();

    assert_eq!(rows[0].avg_change_label.to_string(), "Below Average");
    assert_eq!(rows[0].sale_change_label, None);
    assert_eq!(rows[1].avg_change_label.to_string(), "Above Average");
    assert_eq!(rows[1].sale_change_label.unwrap().to_string(), "Sales Improved");

    // Flat sales produce the neutral labels.
    let flat = vec![
        sale("6003", 1, 1, dec!(100), 1, dec!(100), date(2012, 4, 1)),
        sale("6004", 1, 1, dec!(100), 1, dec!(100), date(2013, 4, 1)),
    ];
    let rows = MetricsEngine::new().yearly_product_trend(&products, &flat).unwrap();
    assert_eq!(rows[0].avg_change_label.to_string(), "Avg");
    assert_eq!(rows[1].sale_change_label.unwrap().to_string(), "No Change");
}

#[test]
fn test_product_ranking_uses_competition_ranks() {
    let products = vec![
        product(1, "Mountain-200", "Bikes"),
        product(2, "Road-150", "Bikes"),
        product(3, "Touring Tire", "Accessories"),
    ];
    let sales = vec![
        sale("7001", 1, 1, dec!(500), 1, dec!(500), date(2013, 1, 1)),
        sale("7002", 2, 1, dec!(500), 1, dec!(500), date(2013, 1, 2)),
        sale("7003", 3, 1, dec!(100), 1, dec!(100), date(2013, 1, 3)),
    ];

    let rows = MetricsEngine::new().product_ranking(&products, &sales, None).unwrap();

    let ranks: Vec<usize> = rows.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 1, 3]);
}

#[test]
fn test_reports_are_idempotent_over_a_fixed_snapshot() {
    let customers = vec![customer(1, "Vera", Some(date(1980, 5, 1)))];
    let products = vec![product(1, "Mountain-200", "Bikes")];
    let sales = vec![
        sale("8001", 1, 1, dec!(120), 1, dec!(120), date(2013, 6, 1)),
        sale("8002", 1, 1, dec!(80), 2, dec!(40), date(2013, 9, 1)),
    ];
    let as_of = date(2014, 1, 29);
    let engine = MetricsEngine::new();

    let first = engine.customer_report(&customers, &sales, as_of).unwrap();
    let second = engine.customer_report(&customers, &sales, as_of).unwrap();
    assert_eq!(first, second);

    let first = engine.monthly_sales(&sales).unwrap();
    let second = engine.monthly_sales(&sales).unwrap();
    assert_eq!(first, second);

    let first = engine.yearly_product_trend(&products, &sales).unwrap();
    let second = engine.yearly_product_trend(&products, &sales).unwrap();
    assert_eq!(first, second);
}
