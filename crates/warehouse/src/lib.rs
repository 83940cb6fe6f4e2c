//! # Meridian Warehouse Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL data warehouse. It is the system's only stateful edge.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Adapter:** This crate is an adapter that encapsulates all database-specific
//!   logic. It provides a clean, abstract API to the rest of the application, hiding
//!   the underlying SQL and database implementation details.
//! - **Read-Mostly:** Report operations only ever read the three relations. The one
//!   mutating operation, `normalize_sale_dates`, runs inside a single transaction.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses a
//!   connection pool (`PgPool`) for concurrent database access.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations, ensuring the schema is up-to-date.
//! - `WarehouseRepository`: The main struct that holds the connection pool and provides
//!   the data access methods (e.g., `fetch_snapshot`, `normalize_sale_dates`).
//! - `WarehouseError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::WarehouseError;
pub use repository::{WarehouseRepository, WarehouseSnapshot};
