use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    UnknownLocation(String),
    #[error("{0} not found")]
    UnknownCommodity(String),
    #[error("amount must be a non-negative number (got {0})")]
    NegativeAmount(f64),
    #[error("invalid location filter: {0}")]
    InvalidFilter(#[from] regex::Error),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("solved tour does not form a single walk from start to end: {0}")]
    MalformedTour(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
