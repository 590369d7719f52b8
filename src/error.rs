use thiserror::Error;

use crate::types::Dims;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("invalid dimensions {0}: every side must be non-zero")]
    InvalidDimensions(Dims),

    #[error("invalid dimensions {0}: volume does not fit in 64 bits")]
    VolumeOverflow(Dims),

    #[error("invalid item '{id}': {reason}")]
    InvalidItem { id: String, reason: String },

    #[error("duplicate item id '{0}'")]
    DuplicateId(String),

    #[error("invalid load plan: {0}")]
    InvalidPlan(String),
}

impl Error {
    pub(crate) fn item(id: &str, reason: impl Into<String>) -> Self {
        Error::InvalidItem {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
