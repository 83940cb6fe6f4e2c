pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{
    AgeGroup, CustomerSegment, ProductSegment, HIGH_PERFORMER_REVENUE, LOYALTY_MONTHS,
    MID_PERFORMER_REVENUE, VIP_SPEND_THRESHOLD,
};
pub use error::CoreError;
pub use structs::{Customer, Product, Sale};
