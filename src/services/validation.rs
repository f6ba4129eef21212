use url::Url;

use crate::services::error::{ServiceError, ServiceResult};

/// Trimmed value of a required field, or a constraint error naming it.
pub fn required(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Constraint(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional link that must be an absolute URL when present.
pub fn link(field: &str, value: Option<String>) -> ServiceResult<Option<String>> {
    match optional(value) {
        Some(link) => {
            Url::parse(&link)
                .map_err(|e| ServiceError::Constraint(format!("{field} is not a valid URL: {e}")))?;
            Ok(Some(link))
        }
        None => Ok(None),
    }
}
