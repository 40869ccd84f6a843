//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 key shared by access and refresh tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Access token lifetime (short)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (long)
    pub refresh_token_ttl: Duration,
    /// Issue a new refresh token on every refresh and retire the old one
    pub rotate_refresh_tokens: bool,
    /// Cookie carrying the refresh token
    pub refresh_cookie_name: String,
    /// Path the refresh cookie is scoped to
    pub refresh_cookie_path: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            access_token_ttl: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            rotate_refresh_tokens: false,
            refresh_cookie_name: "refresh_token".to_string(),
            refresh_cookie_path: "/".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie attributes for the refresh token
    pub fn refresh_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.refresh_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: self.refresh_cookie_path.clone(),
            max_age_secs: Some(self.refresh_token_ttl.as_secs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_secret_is_not_zero() {
        assert_ne!(AuthConfig::with_random_secret().token_secret, [0u8; 32]);
        assert!(!AuthConfig::development().cookie_secure);
    }

    #[test]
    fn test_refresh_cookie_matches_ttl() {
        let config = AuthConfig::default();
        let cookie = config.refresh_cookie();
        assert_eq!(cookie.name, "refresh_token");
        assert!(cookie.http_only);
        assert_eq!(cookie.max_age_secs, Some(7 * 24 * 3600));
    }
}
