use super::ApiError;

/// Record ids are opaque. Only a blank id is rejected here; unknown ids are
/// left to the service so they surface as not-found.
pub fn validate_record_id<'a>(kind: &str, id: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{kind} ID is required")));
    }
    Ok(trimmed)
}

pub fn validate_credentials<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok((username, password))
}
