//! Small validation helpers shared by the newtypes and configuration loader

use super::types::{Error, Result};
use std::fmt;

/// Functional validation utilities
pub struct Validate;

impl Validate {
    /// Validate that a string is not empty (after trimming whitespace)
    pub fn not_empty(value: &str, field_name: &str) -> Result<()> {
        if value.trim().is_empty() {
            Err(Error::invalid_input(field_name, "cannot be empty"))
        } else {
            Ok(())
        }
    }

    /// Validate that a number is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<T>
    where
        T: PartialOrd + fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(Error::invalid_input(
                field_name,
                format!("value {value} is not in range [{min}, {max}]"),
            ))
        } else {
            Ok(value)
        }
    }

    /// Validate using a custom predicate
    pub fn with_predicate<T, F>(
        value: T,
        predicate: F,
        field_name: &str,
        error_message: &str,
    ) -> Result<T>
    where
        F: FnOnce(&T) -> bool,
    {
        if predicate(&value) {
            Ok(value)
        } else {
            Err(Error::invalid_input(field_name, error_message))
        }
    }
}
