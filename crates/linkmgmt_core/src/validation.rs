use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    Required,
    #[error("invalid URL: {0}")]
    Invalid(String),
}

/// Trims and validates a URL typed by the user, returning the trimmed value.
pub fn validate_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }
    let parsed = Url::parse(trimmed).map_err(|err| ValidationError::Invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::Invalid(format!(
                "unsupported scheme '{other}', expected http or https"
            )))
        }
    }
    if parsed.host_str().is_none() {
        return Err(ValidationError::Invalid("missing host".to_string()));
    }
    Ok(trimmed.to_string())
}
