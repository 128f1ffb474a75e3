//! Payout client errors

use adyconfig::ConfigError;
use adysoap::{ParamsError, TemplateError, ValidationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PayoutError>;

/// Errors raised before a payout call reaches the gateway
///
/// Faults reported by the gateway or the transport are not errors: they are
/// captured in the response object.
#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("Invalid request parameters: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid parameter document: {0}")]
    Params(#[from] ParamsError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
