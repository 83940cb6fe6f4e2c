use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid input relation: {0}")]
    InvalidInput(String),

    #[error("An unexpected error occurred during report calculation: {0}")]
    InternalError(String),
}
