//! Classification of gateway fault messages into attribute-scoped errors

use serde::Serialize;
use std::fmt;

/// Field used when a fault cannot be tied to a specific attribute
pub const BASE_FIELD: &str = "base";

/// Message returned when a failed response carries no fault at all
pub const UNKNOWN_FAILURE: &str = "Request failed for unknown reasons.";

/// A known fault message and the attribute error it maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorRule {
    pub fault: &'static str,
    pub field: &'static str,
    pub message: &'static str,
}

impl ErrorRule {
    pub const fn new(fault: &'static str, field: &'static str, message: &'static str) -> Self {
        Self {
            fault,
            field,
            message,
        }
    }
}

/// A `(field, message)` pair ready to merge into a validation error collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub field: String,
    pub message: String,
}

impl ErrorEntry {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_base(&self) -> bool {
        self.field == BASE_FIELD
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Maps a fault message to an [`ErrorEntry`]
///
/// Known faults (exact match in `table`) yield their attribute and message.
/// Any other fault yields `base` with the raw gateway text, and no fault at
/// all yields `base` with [`UNKNOWN_FAILURE`]. When `prefix` is given, the
/// field becomes `{prefix}_{field}`, `base` included.
pub fn classify(table: &[ErrorRule], fault: Option<&str>, prefix: Option<&str>) -> ErrorEntry {
    let (field, message) = match fault {
        Some(fault) => match table.iter().find(|rule| rule.fault == fault) {
            Some(rule) => (rule.field, rule.message.to_string()),
            None => (BASE_FIELD, fault.to_string()),
        },
        None => (BASE_FIELD, UNKNOWN_FAILURE.to_string()),
    };

    let field = match prefix {
        Some(prefix) => format!("{prefix}_{field}"),
        None => field.to_string(),
    };
    ErrorEntry { field, message }
}
