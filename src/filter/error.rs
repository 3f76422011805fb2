use thiserror::Error;

use crate::error::ApiError;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Cannot order by '{0}'")]
    InvalidColumn(String),

    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        let field = match err {
            FilterError::InvalidColumn(_) | FilterError::InvalidDirection(_) => "order",
            FilterError::InvalidLimit(_) => "limit",
            FilterError::InvalidOffset(_) => "offset",
        };
        ApiError::invalid_field(field, err.to_string())
    }
}
