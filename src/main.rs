use analytics::{
    CategoryShare, CustomerMetrics, MetricsEngine, MonthlySales, ProductMetrics, RankedProduct,
    YearlyProductSales,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use configuration::{Config, load_config};
use core_types::{CustomerSegment, ProductSegment};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use warehouse::{WarehouseRepository, connect, run_migrations};

/// The main entry point for the Meridian warehouse reporting application.
#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command-line arguments before touching the database, so --help
    // works without a running warehouse.
    let cli = Cli::parse();

    // Load environment variables from the .env file, if present.
    dotenvy::dotenv().ok();

    let config = load_config().context("Failed to load config.toml")?;
    let db_pool = connect(&config.warehouse)
        .await
        .context("Failed to connect to the warehouse database")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    // Execute the appropriate command
    match cli.command {
        Commands::CustomerReport(args) => {
            handle_customer_report(args, cli.format, &config, db_pool).await?;
        }
        Commands::ProductReport(args) => {
            handle_product_report(args, cli.format, &config, db_pool).await?;
        }
        Commands::CategoryShare => {
            handle_category_share(cli.format, db_pool).await?;
        }
        Commands::MonthlySales => {
            handle_monthly_sales(cli.format, db_pool).await?;
        }
        Commands::YearlyTrend => {
            handle_yearly_trend(cli.format, db_pool).await?;
        }
        Commands::TopProducts(args) => {
            handle_top_products(args, cli.format, &config, db_pool).await?;
        }
        Commands::NormalizeDates => {
            handle_normalize_dates(db_pool).await?;
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Business metrics and segmentation reports over a retail data warehouse.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format for report rows.
    #[arg(long, value_enum, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-customer metrics with VIP/Regular/New segmentation.
    CustomerReport(CustomerReportArgs),
    /// Per-product metrics with performance segmentation.
    ProductReport(ProductReportArgs),
    /// Each category's share of overall revenue.
    CategoryShare,
    /// Month-by-month sales with a running yearly total and moving average price.
    MonthlySales,
    /// Year-over-year product sales against the product's average and previous year.
    YearlyTrend,
    /// Products ranked by total revenue, highest first.
    TopProducts(TopProductsArgs),
    /// Repair out-of-order sale dates inside a single transaction.
    NormalizeDates,
}

#[derive(Parser)]
struct CustomerReportArgs {
    /// Reference date for age and recency (format: YYYY-MM-DD).
    /// Falls back to report.as_of in config.toml.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Only show customers in this segment (e.g., "vip", "regular", "new").
    #[arg(long)]
    segment: Option<CustomerSegment>,
}

#[derive(Parser)]
struct ProductReportArgs {
    /// Reference date for recency (format: YYYY-MM-DD).
    /// Falls back to report.as_of in config.toml.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Only show products in this segment (e.g., "high", "mid", "low").
    #[arg(long)]
    segment: Option<ProductSegment>,
}

#[derive(Parser)]
struct TopProductsArgs {
    /// Number of ranked rows to show. Falls back to report.top_n in
    /// config.toml; when both are absent the full ranking is printed.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed terminal table.
    Table,
    /// One JSON object per row.
    Json,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn handle_customer_report(
    args: CustomerReportArgs,
    format: OutputFormat,
    config: &Config,
    db_pool: sqlx::PgPool,
) -> Result<()> {
    // 1. Resolve the report clock and fetch the snapshot
    let as_of = config.resolve_as_of(args.as_of)?;
    let repo = WarehouseRepository::new(db_pool);
    let snapshot = repo.fetch_snapshot().await?;

    // 2. Compute the report
    let engine = MetricsEngine::new();
    let mut rows = engine.customer_report(&snapshot.customers, &snapshot.sales, as_of)?;
    if let Some(segment) = args.segment {
        rows.retain(|row| row.segment == segment);
    }

    // 3. Render
    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => print_customer_table(&rows),
    }
    Ok(())
}

async fn handle_product_report(
    args: ProductReportArgs,
    format: OutputFormat,
    config: &Config,
    db_pool: sqlx::PgPool,
) -> Result<()> {
    let as_of = config.resolve_as_of(args.as_of)?;
    let repo = WarehouseRepository::new(db_pool);
    let snapshot = repo.fetch_snapshot().await?;

    let engine = MetricsEngine::new();
    let mut rows = engine.product_report(&snapshot.products, &snapshot.sales, as_of)?;
    if let Some(segment) = args.segment {
        rows.retain(|row| row.product_segment == segment);
    }

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => print_product_table(&rows),
    }
    Ok(())
}

async fn handle_category_share(format: OutputFormat, db_pool: sqlx::PgPool) -> Result<()> {
    let repo = WarehouseRepository::new(db_pool);
    let snapshot = repo.fetch_snapshot().await?;

    let rows = MetricsEngine::new().category_share(&snapshot.products, &snapshot.sales)?;

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => print_category_table(&rows),
    }
    Ok(())
}

async fn handle_monthly_sales(format: OutputFormat, db_pool: sqlx::PgPool) -> Result<()> {
    // This report only reads the fact table.
    let repo = WarehouseRepository::new(db_pool);
    let sales = repo.fetch_sales().await?;

    let rows = MetricsEngine::new().monthly_sales(&sales)?;

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => print_monthly_table(&rows),
    }
    Ok(())
}

async fn handle_yearly_trend(format: OutputFormat, db_pool: sqlx::PgPool) -> Result<()> {
    let repo = WarehouseRepository::new(db_pool);
    let snapshot = repo.fetch_snapshot().await?;

    let rows = MetricsEngine::new().yearly_product_trend(&snapshot.products, &snapshot.sales)?;

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => print_yearly_table(&rows),
    }
    Ok(())
}

async fn handle_top_products(
    args: TopProductsArgs,
    format: OutputFormat,
    config: &Config,
    db_pool: sqlx::PgPool,
) -> Result<()> {
    let limit = args.limit.or(config.report.top_n);
    let repo = WarehouseRepository::new(db_pool);
    let snapshot = repo.fetch_snapshot().await?;

    let rows = MetricsEngine::new().product_ranking(&snapshot.products, &snapshot.sales, limit)?;

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => print_ranking_table(&rows),
    }
    Ok(())
}

async fn handle_normalize_dates(db_pool: sqlx::PgPool) -> Result<()> {
    let repo = WarehouseRepository::new(db_pool);
    let rewritten = repo.normalize_sale_dates().await?;
    println!("Normalized sale dates: {rewritten} rows rewritten.");
    Ok(())
}

// ==============================================================================
// Rendering
// ==============================================================================

/// Prints rows as JSON lines, one object per row.
fn print_json<T: serde::Serialize>(rows: &[T]) -> Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

/// Formats an optional value for a table cell; absent dimensions show "-".
fn cell<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_customer_table(rows: &[CustomerMetrics]) {
    if rows.is_empty() {
        println!("(0 rows)");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Key",
        "Number",
        "Name",
        "Age",
        "Age Group",
        "Segment",
        "Last Order",
        "Orders",
        "Sales",
        "Qty",
        "Products",
        "Lifespan",
        "Recency",
        "Avg Order",
        "Monthly Spend",
    ]);

    for row in rows {
        table.add_row(vec![
            row.customer_key.to_string(),
            cell(row.customer_number.as_deref()),
            cell(row.customer_name.as_deref()),
            cell(row.age),
            cell(row.age_group),
            row.segment.to_string(),
            row.last_order_date.to_string(),
            row.total_orders.to_string(),
            row.total_sales.to_string(),
            row.total_quantity.to_string(),
            row.total_products.to_string(),
            row.lifespan_months.to_string(),
            row.recency_months.to_string(),
            row.average_order_value.to_string(),
            row.average_monthly_spend.to_string(),
        ]);
    }

    println!("{table}");
    println!("({} rows)", rows.len());
}

fn print_product_table(rows: &[ProductMetrics]) {
    if rows.is_empty() {
        println!("(0 rows)");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Key",
        "Product",
        "Category",
        "Subcategory",
        "Cost",
        "Segment",
        "Last Order",
        "Orders",
        "Sales",
        "Qty",
        "Customers",
        "Lifespan",
        "Recency",
        "Avg Order",
        "Monthly Revenue",
    ]);

    for row in rows {
        table.add_row(vec![
            row.product_key.to_string(),
            cell(row.product_name.as_deref()),
            cell(row.category.as_deref()),
            cell(row.subcategory.as_deref()),
            cell(row.cost),
            row.product_segment.to_string(),
            row.last_order_date.to_string(),
            row.total_orders.to_string(),
            row.total_sales.to_string(),
            row.total_quantity.to_string(),
            row.total_customers.to_string(),
            row.lifespan_months.to_string(),
            row.recency_months.to_string(),
            row.average_order_revenue.to_string(),
            row.average_monthly_revenue.to_string(),
        ]);
    }

    println!("{table}");
    println!("({} rows)", rows.len());
}

fn print_category_table(rows: &[CategoryShare]) {
    if rows.is_empty() {
        println!("(0 rows)");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Category", "Sales", "Overall Sales", "Contribution %"]);

    for row in rows {
        table.add_row(vec![
            cell(row.category.as_deref()),
            row.sales.to_string(),
            row.overall_sales.to_string(),
            row.contribution_percent.to_string(),
        ]);
    }

    println!("{table}");
    println!("({} rows)", rows.len());
}

fn print_monthly_table(rows: &[MonthlySales]) {
    if rows.is_empty() {
        println!("(0 rows)");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Year",
        "Month",
        "Sales",
        "Running Sales",
        "Moving Avg Price",
    ]);

    for row in rows {
        table.add_row(vec![
            row.year.to_string(),
            row.month.to_string(),
            row.total_sales.to_string(),
            row.running_sales.to_string(),
            row.moving_avg_price.to_string(),
        ]);
    }

    println!("{table}");
    println!("({} rows)", rows.len());
}

fn print_yearly_table(rows: &[YearlyProductSales]) {
    if rows.is_empty() {
        println!("(0 rows)");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Year",
        "Key",
        "Product",
        "Sales",
        "Avg Sales",
        "Diff vs Avg",
        "vs Average",
        "Prev Year",
        "Diff vs Prev",
        "vs Previous",
    ]);

    for row in rows {
        table.add_row(vec![
            row.year.to_string(),
            row.product_key.to_string(),
            cell(row.product_name.as_deref()),
            row.total_sales.to_string(),
            row.average_sales.to_string(),
            row.diff_vs_average.to_string(),
            row.avg_change_label.to_string(),
            cell(row.previous_year_sales),
            cell(row.diff_vs_previous),
            cell(row.sale_change_label),
        ]);
    }

    println!("{table}");
    println!("({} rows)", rows.len());
}

fn print_ranking_table(rows: &[RankedProduct]) {
    if rows.is_empty() {
        println!("(0 rows)");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Rank", "Key", "Product", "Sales"]);

    for row in rows {
        table.add_row(vec![
            row.rank.to_string(),
            row.product_key.to_string(),
            cell(row.product_name.as_deref()),
            row.total_sales.to_string(),
        ]);
    }

    println!("{table}");
    println!("({} rows)", rows.len());
}
