//! Client configuration: where the backend lives.

use std::env;

/// Environment variable consulted for the backend base address.
pub const BASE_URL_ENV: &str = "BORROW_API_URL";

/// Base address used when [`BASE_URL_ENV`] is unset or empty.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Configuration for a [`BorrowClient`](crate::BorrowClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Resolve the base address from the environment, falling back to
    /// [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Self {
        let base_url = env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self { base_url }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(ClientConfig::default().base_url, "http://localhost:8000/api");
    }

    // Env vars are process-global; keep all mutations in one test so the
    // parallel runner cannot interleave them.
    #[test]
    fn from_env_prefers_variable_and_ignores_empty() {
        env::remove_var(BASE_URL_ENV);
        assert_eq!(ClientConfig::from_env().base_url, DEFAULT_BASE_URL);

        env::set_var(BASE_URL_ENV, "https://borrow.example.com/api");
        assert_eq!(
            ClientConfig::from_env().base_url,
            "https://borrow.example.com/api"
        );

        env::set_var(BASE_URL_ENV, "");
        assert_eq!(ClientConfig::from_env().base_url, DEFAULT_BASE_URL);

        env::remove_var(BASE_URL_ENV);
    }
}
