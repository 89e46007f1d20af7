use validator::ValidateEmail;

use crate::error::ApiError;

/// Validate email format using the validator crate
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::Validation("Email cannot be empty".to_string()));
    }

    if !email.validate_email() {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    // bcrypt only looks at the first 72 bytes
    if password.len() > 72 {
        return Err(ApiError::Validation(
            "Password must be at most 72 characters long".to_string(),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_number = password.chars().any(|c| c.is_numeric());

    if !has_letter || !has_number {
        return Err(ApiError::Validation(
            "Password must contain at least one letter and one number".to_string(),
        ));
    }

    Ok(())
}

/// Require a non-blank value of at most `max` characters
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }

    if trimmed.chars().count() > max {
        return Err(ApiError::Validation(format!(
            "{field} must be at most {max} characters long"
        )));
    }

    Ok(())
}

/// Search terms shorter than two characters are rejected
pub fn validate_search_query(query: Option<&str>) -> Result<&str, ApiError> {
    match query.map(str::trim) {
        Some(q) if q.chars().count() >= 2 => Ok(q),
        _ => Err(ApiError::Validation(
            "Query must be at least 2 characters".to_string(),
        )),
    }
}

/// Clamp a client-supplied percentage into 0..=100
pub fn clamp_percentage(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}
