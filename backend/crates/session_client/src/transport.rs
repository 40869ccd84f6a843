//! Session Transport
//!
//! The four session calls the manager makes. [`HttpTransport`] speaks to the
//! auth routes over HTTP and keeps the refresh cookie in its own cookie jar,
//! so the refresh token never passes through application code.

use reqwest::{Client, Response};

use crate::config::SessionClientConfig;
use crate::error::{SessionClientError, SessionClientResult};
use crate::model::{LoginRequest, ProblemBody, SessionGrant};

#[trait_variant::make(SessionTransport: Send)]
pub trait LocalSessionTransport {
    /// `POST /login`
    async fn login(&self, email: &str, password: &str) -> SessionClientResult<SessionGrant>;

    /// `POST /refresh`, presenting the stored refresh credential
    async fn refresh(&self) -> SessionClientResult<SessionGrant>;

    /// `POST /logout`, removing this device's refresh credential server-side
    async fn logout(&self) -> SessionClientResult<()>;

    /// `GET /whoami`, used to restore a session on start-up
    async fn whoami(&self) -> SessionClientResult<SessionGrant>;
}

/// reqwest-backed transport with a cookie store and a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &SessionClientConfig) -> SessionClientResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The underlying client; requests built from it share the cookie jar
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl SessionTransport for HttpTransport {
    async fn login(&self, email: &str, password: &str) -> SessionClientResult<SessionGrant> {
        let response = self
            .client
            .post(self.url("login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        read_grant(response).await
    }

    async fn refresh(&self) -> SessionClientResult<SessionGrant> {
        let response = self.client.post(self.url("refresh")).send().await?;
        read_grant(response).await
    }

    async fn logout(&self) -> SessionClientResult<()> {
        let response = self.client.post(self.url("logout")).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response).await)
        }
    }

    async fn whoami(&self) -> SessionClientResult<SessionGrant> {
        let response = self.client.get(self.url("whoami")).send().await?;
        read_grant(response).await
    }
}

async fn read_grant(response: Response) -> SessionClientResult<SessionGrant> {
    if !response.status().is_success() {
        return Err(rejection(response).await);
    }
    Ok(response.json::<SessionGrant>().await?)
}

async fn rejection(response: Response) -> SessionClientError {
    let status = response.status();
    let detail = response
        .json::<ProblemBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());

    SessionClientError::Rejected {
        status: status.as_u16(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let config = SessionClientConfig::new("http://localhost:31113/api/auth/");
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(transport.url("login"), "http://localhost:31113/api/auth/login");
        assert_eq!(transport.url("/whoami"), "http://localhost:31113/api/auth/whoami");
    }
}
