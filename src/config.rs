//! Backend and identity-provider configuration.
//!
//! Compiled-in defaults with environment overrides, resolved once at
//! startup. The Google client identifier is fixed configuration, never
//! per-call user input.

/// Environment variable overriding the backend base URL.
const ENV_BASE_URL: &str = "SIGNET_BASE_URL";

/// Environment variable overriding the Google OAuth client identifier.
const ENV_GOOGLE_CLIENT_ID: &str = "SIGNET_GOOGLE_CLIENT_ID";

const DEFAULT_BASE_URL: &str = "https://api.signet.example.com";

const DEFAULT_GOOGLE_CLIENT_ID: &str = "407408718192.apps.googleusercontent.com";

/// Configuration for the backend boundary and the identity provider.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// OAuth client identifier used by the device-flow broker.
    pub google_client_id: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            google_client_id: DEFAULT_GOOGLE_CLIENT_ID.to_string(),
        }
    }
}

impl BackendConfig {
    /// Resolve configuration from the environment, falling back to the
    /// compiled-in defaults. `.env` files are honored when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = normalize_base_url(&url);
        }
        if let Ok(id) = std::env::var(ENV_GOOGLE_CLIENT_ID) {
            config.google_client_id = id;
        }
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let config = BackendConfig::default().with_base_url("http://localhost:8080/");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn default_carries_compiled_in_client_id() {
        let config = BackendConfig::default();
        assert!(config.google_client_id.ends_with(".apps.googleusercontent.com"));
    }
}
