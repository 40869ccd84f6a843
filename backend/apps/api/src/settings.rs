//! Startup settings read from the environment (and `.env`)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use auth::application::SignUpInput;
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub superadmin: Option<SignUpInput>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            auth: auth_config()?,
            superadmin: superadmin()?,
        })
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let base = match env::var("AUTH_TOKEN_SECRET") {
        Ok(secret_b64) => AuthConfig {
            token_secret: decode_secret(&secret_b64)?,
            ..AuthConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("AUTH_TOKEN_SECRET not set; using a random development secret");
            AuthConfig::development()
        }
        Err(_) => bail!("AUTH_TOKEN_SECRET must be set in production"),
    };

    let mut config = base;
    if let Some(secs) = env_u64("AUTH_ACCESS_TTL_SECS")? {
        config.access_token_ttl = Duration::from_secs(secs);
    }
    if let Some(secs) = env_u64("AUTH_REFRESH_TTL_SECS")? {
        config.refresh_token_ttl = Duration::from_secs(secs);
    }
    if let Ok(rotate) = env::var("AUTH_ROTATE_REFRESH") {
        config.rotate_refresh_tokens = parse_flag(&rotate)
            .with_context(|| format!("AUTH_ROTATE_REFRESH has invalid value {rotate:?}"))?;
    }
    if let Ok(pepper) = env::var("AUTH_PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    Ok(config)
}

fn superadmin() -> anyhow::Result<Option<SignUpInput>> {
    let (Ok(email), Ok(password)) = (
        env::var("SUPERADMIN_EMAIL"),
        env::var("SUPERADMIN_PASSWORD"),
    ) else {
        return Ok(None);
    };
    let name = env::var("SUPERADMIN_NAME").unwrap_or_else(|_| "Superadmin".to_string());

    Ok(Some(SignUpInput {
        email,
        password,
        name,
    }))
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(secret_b64.trim())
        .context("AUTH_TOKEN_SECRET is not valid base64")?;

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        anyhow::anyhow!(
            "AUTH_TOKEN_SECRET must decode to 32 bytes, got {}",
            bytes.len()
        )
    })
}

fn env_u64(key: &str) -> anyhow::Result<Option<u64>> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} must be a whole number of seconds")),
        Err(_) => Ok(None),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
