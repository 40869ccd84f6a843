//! Session client configuration

use std::time::Duration;

/// Default server the client talks to in development
pub const DEFAULT_BASE_URL: &str = "http://localhost:31113/api/auth";

#[derive(Debug, Clone)]
pub struct SessionClientConfig {
    /// Base URL of the auth routes, e.g. `https://host/api/auth`
    pub base_url: String,
    /// How long before access-token expiry the renewal fires
    pub renew_margin: Duration,
    /// Upper bound for every login/refresh/logout/whoami call
    pub request_timeout: Duration,
}

impl Default for SessionClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            renew_margin: Duration::from_secs(60),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl SessionClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_renew_margin(mut self, renew_margin: Duration) -> Self {
        self.renew_margin = renew_margin;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
