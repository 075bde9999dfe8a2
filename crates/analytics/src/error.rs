use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A caller broke the contract of an operation (e.g. an inverted date range).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Core type error: {0}")]
    Core(#[from] core_types::CoreError),
}
