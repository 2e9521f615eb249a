//! # Validation Utilities
//!
//! Input validation helpers.

/// True when the value is empty or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if is_blank(value) {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate email format (basic check).
pub fn validate_email(email: &str) -> Result<(), String> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

/// Validate minimum length.
pub fn validate_min_length(value: &str, min: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(format!("{} must be at least {} characters", field_name, min))
    } else {
        Ok(())
    }
}

/// Validate maximum length.
pub fn validate_max_length(value: &str, max: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("{} must be at most {} characters", field_name, max))
    } else {
        Ok(())
    }
}
