//! Client configuration: API base URL, endpoint paths, user agent, and an
//! optional request timeout. Values load from the environment with
//! programmatic overrides; empty values are ignored. Endpoint paths are
//! configuration rather than constants because deployments disagree on them
//! (`/auth/...` and `/v1/auth/...` are both in the wild).

use std::time::Duration;

use url::Url;

use crate::errors::ApiError;

const DEFAULT_USER_AGENT: &str = concat!("auth-client/", env!("CARGO_PKG_VERSION"));

/// Client configuration derived from the environment or built in code.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub api_base_url: String,
    pub user_agent: String,
    /// `None` leaves timeout behavior to the transport.
    pub request_timeout: Option<Duration>,
    pub endpoints: Endpoints,
}

impl AuthConfig {
    /// Builds a config for the given base URL with default endpoints.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: None,
            endpoints: Endpoints::default(),
        }
    }

    /// Loads config from environment variables. Unset or blank variables
    /// keep their defaults; assign fields afterwards to override in code.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::new(env_value("AUTH_API_BASE_URL").unwrap_or_default());

        if let Some(agent) = env_value("AUTH_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(timeout) = env_value("AUTH_REQUEST_TIMEOUT_MS").and_then(|raw| raw.parse().ok())
        {
            config.request_timeout = Some(Duration::from_millis(timeout));
        }

        config
    }

    /// # Errors
    /// Returns an error if the base URL cannot be parsed, has no host, or
    /// uses a scheme other than `http`/`https`.
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = Url::parse(self.api_base_url.trim())
            .map_err(|err| ApiError::Config(format!("invalid API base URL: {err}")))?;

        if url.host().is_none() {
            return Err(ApiError::Config(
                "invalid API base URL: no host specified".to_string(),
            ));
        }

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ApiError::Config(format!(
                "invalid API base URL: unsupported scheme {scheme}"
            ))),
        }
    }

    /// Builds a full URL from the base URL and the provided path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.api_base_url.trim().trim_end_matches('/');
        let path = path.trim();

        if base.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", base, path.trim_start_matches('/'))
        }
    }
}

/// Endpoint paths consumed by the auth flows.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub login: String,
    pub signup: String,
    pub logout: String,
    pub refresh: String,
    pub verify_email: String,
    pub verify_otp: String,
    pub password_reset_request: String,
    pub resend_verification: String,
    pub me: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_prefix("")
    }
}

impl Endpoints {
    /// Builds the standard path set under a deployment prefix, e.g.
    /// `with_prefix("/v1")` yields `/v1/auth/login`.
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim().trim_end_matches('/');

        Self {
            login: format!("{prefix}/auth/login"),
            signup: format!("{prefix}/auth/signup"),
            logout: format!("{prefix}/auth/logout"),
            refresh: format!("{prefix}/auth/refresh"),
            verify_email: format!("{prefix}/auth/verify-email"),
            verify_otp: format!("{prefix}/auth/verify-otp"),
            password_reset_request: format!("{prefix}/auth/password-reset/request"),
            resend_verification: format!("{prefix}/auth/resend-verification"),
            me: format!("{prefix}/users/me"),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|raw| normalize_value(&raw))
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthConfig, Endpoints, normalize_value};
    use std::time::Duration;

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://api.example.com "),
            Some("https://api.example.com".to_string())
        );
    }

    #[test]
    fn load_reads_environment() {
        temp_env::with_vars(
            [
                ("AUTH_API_BASE_URL", Some("https://api.example.com")),
                ("AUTH_USER_AGENT", Some("example-ui/2.0")),
                ("AUTH_REQUEST_TIMEOUT_MS", Some("10000")),
            ],
            || {
                let config = AuthConfig::load();
                assert_eq!(config.api_base_url, "https://api.example.com");
                assert_eq!(config.user_agent, "example-ui/2.0");
                assert_eq!(config.request_timeout, Some(Duration::from_millis(10_000)));
            },
        );
    }

    #[test]
    fn load_ignores_blank_values() {
        temp_env::with_vars(
            [
                ("AUTH_API_BASE_URL", Some("https://api.example.com")),
                ("AUTH_USER_AGENT", Some("   ")),
                ("AUTH_REQUEST_TIMEOUT_MS", None::<&str>),
            ],
            || {
                let config = AuthConfig::load();
                assert!(config.user_agent.starts_with("auth-client/"));
                assert_eq!(config.request_timeout, None);
            },
        );
    }

    #[test]
    fn validate_accepts_http_and_https() {
        assert!(AuthConfig::new("http://localhost:8000").validate().is_ok());
        assert!(AuthConfig::new("https://api.example.com").validate().is_ok());
    }

    #[test]
    fn validate_rejects_unsupported_scheme() {
        let err = AuthConfig::new("ftp://api.example.com")
            .validate()
            .expect_err("expected error");
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn validate_rejects_empty_base_url() {
        assert!(AuthConfig::new("").validate().is_err());
    }

    #[test]
    fn url_for_joins_without_duplicate_slashes() {
        let config = AuthConfig::new("https://api.example.com/");
        assert_eq!(
            config.url_for("/auth/login"),
            "https://api.example.com/auth/login"
        );
        assert_eq!(
            config.url_for("auth/login"),
            "https://api.example.com/auth/login"
        );
    }

    #[test]
    fn default_endpoints_use_bare_scheme() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.login, "/auth/login");
        assert_eq!(endpoints.password_reset_request, "/auth/password-reset/request");
        assert_eq!(endpoints.me, "/users/me");
    }

    #[test]
    fn prefixed_endpoints_match_versioned_scheme() {
        let endpoints = Endpoints::with_prefix("/v1");
        assert_eq!(endpoints.login, "/v1/auth/login");
        assert_eq!(endpoints.verify_otp, "/v1/auth/verify-otp");
        assert_eq!(endpoints.me, "/v1/users/me");
    }
}
