//! # Meridian Metrics Engine
//!
//! This crate computes the descriptive business metrics, segment labels and
//! window-function reports over the three warehouse relations. It is the
//! single source of truth for every number the reports show.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `MetricsEngine` is a stateless
//!   calculator. It takes immutable slices of warehouse rows plus an
//!   explicit as-of date and produces report rows as output. Nothing is
//!   cached or mutated between calls, so the same snapshot always yields
//!   the same report.
//! - **Explicit windows:** running totals, moving averages, lag and rank are
//!   implemented as stateful folds over pre-sorted partitions in the
//!   `window` module, not delegated to a query engine.
//!
//! ## Public API
//!
//! - `MetricsEngine`: the main struct that contains the calculation logic.
//! - The report row structs (`CustomerMetrics`, `ProductMetrics`, ...).
//! - `AnalyticsError`: the specific error types that can be returned from
//!   this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod window;

// Re-export the key components to create a clean, public-facing API.
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use report::{
    CategoryShare, CustomerMetrics, MonthlySales, ProductMetrics, RankedProduct, TrendVsAverage,
    TrendVsPrevious, YearlyProductSales,
};
