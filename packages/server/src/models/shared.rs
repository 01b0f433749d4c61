use crate::error::AppError;

/// Validate WGS84 coordinates. Out-of-range or non-finite values are an
/// input error, same as an undecodable image.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::Input(format!(
            "Latitude out of range: {latitude}"
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::Input(format!(
            "Longitude out of range: {longitude}"
        )));
    }
    Ok(())
}

/// Validate an opaque user id (1-64 characters, URL- and key-safe).
pub fn validate_user_id(user_id: &str) -> Result<(), AppError> {
    if user_id.is_empty() || user_id.len() > 64 {
        return Err(AppError::Validation(
            "User id must be 1-64 characters".into(),
        ));
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(AppError::Validation(
            "User id contains invalid characters (allowed: a-zA-Z0-9, -, _)".into(),
        ));
    }
    Ok(())
}

/// Validate an image reference (non-empty, bounded length).
pub fn validate_image_ref(image_ref: &str) -> Result<(), AppError> {
    let trimmed = image_ref.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Image reference is required".into()));
    }
    if trimmed.len() > 2048 {
        return Err(AppError::Validation(
            "Image reference exceeds maximum length of 2048 characters".into(),
        ));
    }
    Ok(())
}
