//! Error types for the marketplace API client.
//!
//! # Design
//! Every way a round trip can fail collapses into one [`ApiError`] carrying
//! a human-readable message: non-2xx responses keep the backend's own
//! `message` when the body provides one, transport failures keep the
//! underlying I/O text. Domain components never surface these values to
//! callers; they fold them into `{success: false, message}` envelopes.

use thiserror::Error;

/// Errors produced by [`ApiClient`](crate::client::ApiClient) round trips.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside the 2xx range. `message`
    /// is the body's `message` field when it carries a non-empty one,
    /// otherwise a generic text naming the status code.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The round trip itself failed (DNS, connection refused, timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_extracted_message() {
        let err = ApiError::Http {
            status: 404,
            message: "Item not found".to_string(),
        };
        assert_eq!(err.to_string(), "Item not found");
    }

    #[test]
    fn transport_error_names_the_cause() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport failure: connection refused");
    }

    #[test]
    fn serde_errors_keep_direction() {
        let ser = ApiError::Serialization("key must be a string".to_string());
        assert!(ser.to_string().starts_with("serialization failed"));
        let de = ApiError::Deserialization("expected value".to_string());
        assert!(de.to_string().starts_with("deserialization failed"));
    }
}
