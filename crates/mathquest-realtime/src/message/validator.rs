//! Frame-level checks and conversion of validation failures.

use validator::{Validate, ValidationErrors};

use mathquest_core::error::{AppError, ErrorKind};
use mathquest_core::result::AppResult;

/// Reject frames that are empty or larger than `max_bytes`.
pub fn validate_frame(raw: &str, max_bytes: usize) -> AppResult<()> {
    if raw.len() > max_bytes {
        return Err(AppError::new(
            ErrorKind::Serialization,
            format!("Frame exceeds maximum size of {max_bytes} bytes"),
        ));
    }

    if raw.trim().is_empty() {
        return Err(AppError::new(ErrorKind::Serialization, "Empty frame"));
    }

    Ok(())
}

/// Run derive-based validation, folding every failure into one message.
pub fn validate_request<T: Validate>(request: &T) -> AppResult<()> {
    request
        .validate()
        .map_err(|errors| AppError::validation(describe(&errors)))
}

/// Reject content longer than `max_chars` characters.
pub fn validate_content_length(content: &str, max_chars: usize) -> AppResult<()> {
    let length = content.chars().count();
    if length > max_chars {
        return Err(AppError::validation(format!(
            "content is {length} characters; the limit is {max_chars}"
        )));
    }
    Ok(())
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
