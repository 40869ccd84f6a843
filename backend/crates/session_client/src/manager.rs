//! Session Manager
//!
//! In-memory session for one client. At most one renewal timer is alive per
//! manager; it is replaced whenever a new access token is installed and
//! cancelled on sign-out. Every state change bumps a generation counter so
//! timers and in-flight calls that belong to an older session are ignored.
//!
//! The state lock is never held across an `.await`.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::RequestBuilder;
use tokio::task::JoinHandle;

use crate::config::SessionClientConfig;
use crate::error::{SessionClientError, SessionClientResult};
use crate::model::{AccountSummary, SessionGrant};
use crate::transport::SessionTransport;

/// Time left before the renewal should fire, clamped to zero
pub fn renewal_delay(expires_at_ms: i64, now_ms: i64, margin: Duration) -> Duration {
    let margin_ms = i64::try_from(margin.as_millis()).unwrap_or(i64::MAX);
    let remaining = expires_at_ms.saturating_sub(now_ms).saturating_sub(margin_ms);
    Duration::from_millis(remaining.max(0) as u64)
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Default)]
struct SessionState {
    account: Option<AccountSummary>,
    access_token: Option<String>,
    expires_at_ms: i64,
    generation: u64,
    renewal: Option<JoinHandle<()>>,
}

impl SessionState {
    fn cancel_renewal(&mut self) {
        if let Some(handle) = self.renewal.take() {
            handle.abort();
        }
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.cancel_renewal();
        self.account = None;
        self.access_token = None;
        self.expires_at_ms = 0;
    }
}

struct Inner<T> {
    transport: T,
    config: SessionClientConfig,
    state: Mutex<SessionState>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        self.state.get_mut().cancel_renewal();
    }
}

/// Client-side session holder
pub struct SessionManager<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SessionManager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SessionManager<T>
where
    T: SessionTransport + Sync + 'static,
{
    pub fn new(transport: T, config: SessionClientConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Silent restore on start-up.
    ///
    /// Failure leaves the manager signed out and is only logged.
    pub async fn restore(&self) -> bool {
        let generation = self.inner.state.lock().generation;

        match self.inner.transport.whoami().await {
            Ok(grant) => {
                let restored = install_if_current(&self.inner, generation, grant).is_some();
                if restored {
                    tracing::info!("Session restored");
                }
                restored
            }
            Err(err) => {
                tracing::debug!(error = %err, "No session to restore");
                false
            }
        }
    }

    /// Sign in with credentials
    ///
    /// A response that arrives after a logout (or a newer login) started is
    /// dropped, and the server is asked to forget the credential it just set.
    pub async fn login(&self, email: &str, password: &str) -> SessionClientResult<AccountSummary> {
        let generation = self.inner.state.lock().generation;
        let grant = self.inner.transport.login(email, password).await?;

        if let Some(account) = install_if_current(&self.inner, generation, grant) {
            tracing::info!(account_id = %account.id, "Signed in");
            return Ok(account);
        }

        match self.inner.transport.logout().await {
            Ok(()) => tracing::debug!("Superseded sign-in revoked on the server"),
            Err(err) => tracing::warn!(error = %err, "Could not revoke superseded sign-in"),
        }
        Err(SessionClientError::NotAuthenticated)
    }

    /// Renew the access token now; the pending timer is replaced.
    ///
    /// Any failure signs the manager out.
    pub async fn refresh_now(&self) -> SessionClientResult<AccountSummary> {
        renew(&self.inner).await
    }

    /// Sign out locally, then ask the server to drop this device's refresh
    /// credential. Local state is cleared even when the server call fails.
    pub async fn logout(&self) {
        self.inner.state.lock().reset();

        match self.inner.transport.logout().await {
            Ok(()) => tracing::info!("Signed out"),
            Err(err) => {
                tracing::warn!(error = %err, "Server sign-out failed; local session cleared")
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.lock().access_token.is_some()
    }

    pub fn current_account(&self) -> Option<AccountSummary> {
        self.inner.state.lock().account.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.state.lock().access_token.clone()
    }

    /// Unix milliseconds; `None` when signed out
    pub fn access_token_expires_at_ms(&self) -> Option<i64> {
        let state = self.inner.state.lock();
        state.access_token.as_ref().map(|_| state.expires_at_ms)
    }

    pub fn has_pending_renewal(&self) -> bool {
        self.inner
            .state
            .lock()
            .renewal
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Attach the access token to a protected request.
    ///
    /// Fails fast with [`SessionClientError::NotAuthenticated`] when signed out.
    pub fn authorize(&self, request: RequestBuilder) -> SessionClientResult<RequestBuilder> {
        let token = self
            .access_token()
            .ok_or(SessionClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }
}

fn install<T>(inner: &Arc<Inner<T>>, state: &mut SessionState, grant: SessionGrant) -> AccountSummary
where
    T: SessionTransport + Sync + 'static,
{
    state.generation += 1;
    state.cancel_renewal();

    let delay = renewal_delay(
        grant.access_token_expires_at_ms,
        now_ms(),
        inner.config.renew_margin,
    );
    state.account = Some(grant.account.clone());
    state.access_token = Some(grant.access_token);
    state.expires_at_ms = grant.access_token_expires_at_ms;
    state.renewal = Some(schedule_renewal(
        Arc::downgrade(inner),
        state.generation,
        delay,
    ));

    tracing::debug!(delay_ms = delay.as_millis() as u64, "Access token renewal scheduled");
    grant.account
}

/// Install only if nothing else changed the session since `generation`
fn install_if_current<T>(
    inner: &Arc<Inner<T>>,
    generation: u64,
    grant: SessionGrant,
) -> Option<AccountSummary>
where
    T: SessionTransport + Sync + 'static,
{
    let mut state = inner.state.lock();
    if state.generation != generation {
        tracing::debug!("Discarding session response for a superseded session");
        return None;
    }
    Some(install(inner, &mut state, grant))
}

async fn renew<T>(inner: &Arc<Inner<T>>) -> SessionClientResult<AccountSummary>
where
    T: SessionTransport + Sync + 'static,
{
    let generation = inner.state.lock().generation;

    match inner.transport.refresh().await {
        Ok(grant) => install_if_current(inner, generation, grant)
            .ok_or(SessionClientError::NotAuthenticated),
        Err(err) => {
            let mut state = inner.state.lock();
            if state.generation == generation {
                state.reset();
            }
            Err(err)
        }
    }
}

fn schedule_renewal<T>(inner: Weak<Inner<T>>, generation: u64, delay: Duration) -> JoinHandle<()>
where
    T: SessionTransport + Sync + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let Some(inner) = inner.upgrade() else {
            return;
        };

        {
            let mut state = inner.state.lock();
            if state.generation != generation {
                return;
            }
            // This task is the running renewal; detach it so installing the
            // next token does not abort it mid-flight.
            state.renewal = None;
        }

        match renew(&inner).await {
            Ok(account) => tracing::debug!(account_id = %account.id, "Access token renewed"),
            Err(err) => tracing::warn!(error = %err, "Access token renewal failed; signed out"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(120);
    const MARGIN: Duration = Duration::from_secs(60);

    fn grant(token: &str) -> SessionGrant {
        SessionGrant {
            account: AccountSummary {
                id: "acc-1".into(),
                email: "user@x.com".into(),
                name: "User".into(),
                role: "user".into(),
            },
            access_token: token.into(),
            access_token_expires_at_ms: now_ms() + TTL.as_millis() as i64,
        }
    }

    fn rejected() -> SessionClientError {
        SessionClientError::Rejected {
            status: 401,
            detail: "Authentication failed".into(),
        }
    }

    #[derive(Default)]
    struct ScriptedTransport {
        refreshes: Mutex<VecDeque<SessionClientResult<SessionGrant>>>,
        whoami: Mutex<Option<SessionClientResult<SessionGrant>>>,
        logout_fails: bool,
        refresh_delay: Duration,
        login_delay: Duration,
        refresh_calls: AtomicUsize,
        logout_calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn with_refreshes(refreshes: Vec<SessionClientResult<SessionGrant>>) -> Self {
            Self {
                refreshes: Mutex::new(refreshes.into()),
                ..Self::default()
            }
        }

        fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }
    }

    impl SessionTransport for ScriptedTransport {
        async fn login(&self, _email: &str, password: &str) -> SessionClientResult<SessionGrant> {
            if !self.login_delay.is_zero() {
                tokio::time::sleep(self.login_delay).await;
            }
            if password == "correct-pw" {
                Ok(grant("login-token"))
            } else {
                Err(rejected())
            }
        }

        async fn refresh(&self) -> SessionClientResult<SessionGrant> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if !self.refresh_delay.is_zero() {
                tokio::time::sleep(self.refresh_delay).await;
            }
            let next = self.refreshes.lock().pop_front();
            next.unwrap_or_else(|| Err(rejected()))
        }

        async fn logout(&self) -> SessionClientResult<()> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            if self.logout_fails {
                Err(SessionClientError::Timeout)
            } else {
                Ok(())
            }
        }

        async fn whoami(&self) -> SessionClientResult<SessionGrant> {
            let scripted = self.whoami.lock().take();
            scripted.unwrap_or_else(|| Err(rejected()))
        }
    }

    fn manager(transport: ScriptedTransport) -> SessionManager<ScriptedTransport> {
        SessionManager::new(
            transport,
            SessionClientConfig::default().with_renew_margin(MARGIN),
        )
    }

    #[test]
    fn test_renewal_delay() {
        assert_eq!(
            renewal_delay(200_000, 100_000, Duration::from_secs(60)),
            Duration::from_secs(40)
        );
        assert_eq!(
            renewal_delay(120_000, 100_000, Duration::from_secs(60)),
            Duration::ZERO
        );
        assert_eq!(renewal_delay(0, 100_000, Duration::ZERO), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_holds_session_and_schedules_renewal() {
        let session = manager(ScriptedTransport::default());

        let account = session.login("user@x.com", "correct-pw").await.unwrap();

        assert_eq!(account.email, "user@x.com");
        assert!(session.is_authenticated());
        assert_eq!(session.access_token().as_deref(), Some("login-token"));
        assert!(session.has_pending_renewal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_login_leaves_manager_signed_out() {
        let session = manager(ScriptedTransport::default());

        let err = session.login("user@x.com", "wrong-pw").await.unwrap_err();

        assert!(err.is_auth_rejection());
        assert!(!session.is_authenticated());
        assert!(!session.has_pending_renewal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_renews_before_expiry() {
        let session = manager(ScriptedTransport::with_refreshes(vec![Ok(grant("renewed"))]));
        session.login("user@x.com", "correct-pw").await.unwrap();

        tokio::time::sleep(Duration::from_secs(50)).await;
        assert_eq!(session.transport().refresh_calls(), 0);

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(session.transport().refresh_calls(), 1);
        assert_eq!(session.access_token().as_deref(), Some("renewed"));
        assert!(session.has_pending_renewal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_renewal_signs_out() {
        let session = manager(ScriptedTransport::with_refreshes(vec![Err(rejected())]));
        session.login("user@x.com", "correct-pw").await.unwrap();

        tokio::time::sleep(Duration::from_secs(65)).await;

        assert_eq!(session.transport().refresh_calls(), 1);
        assert!(!session.is_authenticated());
        assert!(session.current_account().is_none());
        assert!(!session.has_pending_renewal());

        let request = reqwest::Client::new().get("http://localhost/api/content/ping");
        assert!(matches!(
            session.authorize(request),
            Err(SessionClientError::NotAuthenticated)
        ));

        // No silent retry afterwards
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(session.transport().refresh_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_replaces_pending_timer() {
        let session = manager(ScriptedTransport::with_refreshes(vec![
            Ok(grant("manual")),
            Ok(grant("timer")),
        ]));
        session.login("user@x.com", "correct-pw").await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        session.refresh_now().await.unwrap();
        assert_eq!(session.access_token().as_deref(), Some("manual"));

        // The login timer would have fired at 60s
        tokio::time::sleep(Duration::from_secs(40)).await;
        assert_eq!(session.transport().refresh_calls(), 1);

        // The replacement fires about 60s after the manual refresh
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(session.transport().refresh_calls(), 2);
        assert_eq!(session.access_token().as_deref(), Some("timer"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_state_even_when_server_fails() {
        let transport = ScriptedTransport {
            logout_fails: true,
            ..ScriptedTransport::default()
        };
        let session = manager(transport);
        session.login("user@x.com", "correct-pw").await.unwrap();

        session.logout().await;

        assert!(!session.is_authenticated());
        assert!(!session.has_pending_renewal());
        assert_eq!(session.transport().logout_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(session.transport().refresh_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_twice_is_harmless() {
        let session = manager(ScriptedTransport::default());
        session.login("user@x.com", "correct-pw").await.unwrap();

        session.logout().await;
        session.logout().await;

        assert!(!session.is_authenticated());
        assert_eq!(session.transport().logout_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_during_renewal_discards_late_token() {
        let transport = ScriptedTransport {
            refreshes: Mutex::new(VecDeque::from([Ok(grant("late"))])),
            refresh_delay: Duration::from_secs(5),
            ..ScriptedTransport::default()
        };
        let session = manager(transport);
        session.login("user@x.com", "correct-pw").await.unwrap();

        // Renewal starts at ~60s and answers at ~65s
        tokio::time::sleep(Duration::from_secs(62)).await;
        assert_eq!(session.transport().refresh_calls(), 1);
        session.logout().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!session.is_authenticated());
        assert!(session.access_token().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_during_login_discards_late_grant() {
        let transport = ScriptedTransport {
            login_delay: Duration::from_secs(5),
            ..ScriptedTransport::default()
        };
        let session = manager(transport);

        let pending = {
            let session = session.clone();
            tokio::spawn(async move { session.login("user@x.com", "correct-pw").await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        session.logout().await;

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(SessionClientError::NotAuthenticated)));
        assert!(!session.is_authenticated());
        assert!(!session.has_pending_renewal());
        // One for the explicit logout, one revoking the late grant
        assert_eq!(session.transport().logout_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore() {
        let transport = ScriptedTransport::default();
        *transport.whoami.lock() = Some(Ok(grant("restored")));
        let session = manager(transport);

        assert!(session.restore().await);
        assert_eq!(session.access_token().as_deref(), Some("restored"));
        assert!(session.has_pending_renewal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_restore_is_silent() {
        let session = manager(ScriptedTransport::default());

        assert!(!session.restore().await);
        assert!(!session.is_authenticated());
        assert!(session.access_token_expires_at_ms().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_authorize_attaches_bearer() {
        let session = manager(ScriptedTransport::default());
        session.login("user@x.com", "correct-pw").await.unwrap();

        let request = session
            .authorize(reqwest::Client::new().get("http://localhost/api/content/ping"))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer login-token"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_are_independent() {
        let first = manager(ScriptedTransport::default());
        let second = manager(ScriptedTransport::default());
        first.login("user@x.com", "correct-pw").await.unwrap();

        assert!(first.is_authenticated());
        assert!(!second.is_authenticated());

        first.logout().await;
        second.login("user@x.com", "correct-pw").await.unwrap();
        assert!(second.is_authenticated());
    }
}
