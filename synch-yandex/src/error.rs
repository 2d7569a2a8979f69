//! Normalisation of `ureq` failures into [`RemoteError`].

use synch_sync::RemoteError;

use crate::api::ApiError;

/// Map a `ureq` error to the provider-independent taxonomy.
pub(crate) fn from_ureq(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            status_error(status, describe_body(status, &body))
        }
        ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
    }
}

/// Classify a non-success status.
pub fn status_error(status: u16, message: String) -> RemoteError {
    match status {
        401 | 403 => RemoteError::Unauthorized(message),
        404 => RemoteError::NotFound(message),
        409 => RemoteError::Conflict(message),
        _ => RemoteError::Status { status, message },
    }
}

pub(crate) fn describe_body(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .ok()
        .and_then(|e| e.summary())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP status {status}")
            } else {
                trimmed.chars().take(200).collect()
            }
        })
}

pub(crate) fn decode_err(err: std::io::Error) -> RemoteError {
    RemoteError::Decode(err.to_string())
}
