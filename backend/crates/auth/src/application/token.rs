//! Token Codec
//!
//! Signed, self-contained bearer tokens:
//!
//! ```text
//! base64url(JSON claims) "." base64url(HMAC-SHA256(secret, first segment))
//! ```
//!
//! Claims carry the subject, the role at issuance, the token kind and an
//! expiry in Unix milliseconds. A token is expired once `now >= exp`;
//! there is no leeway. Refresh tokens also carry a random `jti` so two
//! sessions issued in the same millisecond are still distinct strings.

use std::time::Duration;

use chrono::Utc;
use platform::crypto::{from_base64url, hmac_sha256, random_bytes, to_base64url, verify_hmac_sha256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_object::{account_id::AccountId, role::Role};

const JTI_BYTES: usize = 16;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer credential for protected requests
    Access,
    /// Long-lived credential that can only mint access tokens
    Refresh,
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: AccountId,
    pub role: Role,
    pub kind: TokenKind,
    /// Expiry, Unix milliseconds
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not two base64url segments, bad JSON, or the wrong kind
    #[error("Malformed token")]
    Malformed,
    #[error("Token signature is invalid")]
    SignatureInvalid,
    #[error("Token has expired")]
    Expired,
}

/// Claims could not be serialized while issuing
#[derive(Debug, Error)]
#[error("Token claims could not be encoded: {0}")]
pub struct TokenEncodeError(#[from] serde_json::Error);

/// Freshly signed token and its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Unix milliseconds
    pub expires_at_ms: i64,
}

/// Issues and verifies signed tokens
#[derive(Clone)]
pub struct TokenCodec {
    secret: [u8; 32],
}

impl TokenCodec {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Issue a token valid for `ttl` from now
    pub fn issue(
        &self,
        sub: AccountId,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenEncodeError> {
        self.issue_at(sub, role, kind, ttl, Utc::now().timestamp_millis())
    }

    pub fn issue_at(
        &self,
        sub: AccountId,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
        now_ms: i64,
    ) -> Result<IssuedToken, TokenEncodeError> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            sub,
            role,
            kind,
            exp: now_ms.saturating_add(ttl_ms),
            jti: (kind == TokenKind::Refresh).then(|| to_base64url(&random_bytes(JTI_BYTES))),
        };

        let json = serde_json::to_vec(&claims)?;
        let payload = to_base64url(&json);
        let signature = to_base64url(&hmac_sha256(&self.secret, payload.as_bytes()));

        Ok(IssuedToken {
            token: format!("{payload}.{signature}"),
            expires_at_ms: claims.exp,
        })
    }

    /// Verify signature, kind and expiry against the current time
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, kind, Utc::now().timestamp_millis())
    }

    pub fn verify_at(
        &self,
        token: &str,
        kind: TokenKind,
        now_ms: i64,
    ) -> Result<TokenClaims, TokenError> {
        let claims = self.verify_signature(token, kind)?;
        if now_ms >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Verify signature and kind, ignoring expiry
    ///
    /// For sign-out, where an expired refresh token should still be removable.
    pub fn verify_signature(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        if payload.is_empty() || signature.contains('.') {
            return Err(TokenError::Malformed);
        }

        let signature = from_base64url(signature).map_err(|_| TokenError::Malformed)?;
        if !verify_hmac_sha256(&self.secret, payload.as_bytes(), &signature) {
            return Err(TokenError::SignatureInvalid);
        }

        let json = from_base64url(payload).map_err(|_| TokenError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if claims.kind != kind {
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new([42u8; 32])
    }

    #[test]
    fn test_issue_and_verify_access() {
        let sub = AccountId::new();
        let issued = codec().issue_at(sub, Role::Admin, TokenKind::Access, Duration::from_secs(60), NOW).unwrap();
        assert_eq!(issued.expires_at_ms, NOW + 60_000);

        let claims = codec().verify_at(&issued.token, TokenKind::Access, NOW + 1).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.jti, None);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let issued = codec().issue_at(
            AccountId::new(),
            Role::User,
            TokenKind::Refresh,
            Duration::from_secs(60),
            NOW,
        ).unwrap();

        assert!(codec().verify_at(&issued.token, TokenKind::Refresh, NOW + 59_000).is_ok());
        assert!(codec().verify_at(&issued.token, TokenKind::Refresh, NOW + 59_999).is_ok());
        assert_eq!(
            codec().verify_at(&issued.token, TokenKind::Refresh, NOW + 60_000),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret_is_signature_invalid() {
        let issued = codec().issue(AccountId::new(), Role::User, TokenKind::Access, Duration::from_secs(60)).unwrap();
        let other = TokenCodec::new([7u8; 32]);
        assert_eq!(
            other.verify(&issued.token, TokenKind::Access),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_tampered_payload_is_signature_invalid() {
        let issued = codec().issue(AccountId::new(), Role::User, TokenKind::Access, Duration::from_secs(60)).unwrap();
        let (_, signature) = issued.token.split_once('.').unwrap();

        let forged_claims = TokenClaims {
            sub: AccountId::new(),
            role: Role::SuperAdmin,
            kind: TokenKind::Access,
            exp: i64::MAX,
            jti: None,
        };
        let forged_payload = to_base64url(&serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{forged_payload}.{signature}");

        assert_eq!(
            codec().verify(&forged, TokenKind::Access),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        for bad in ["", "abc", "a.b.c", ".sig", "!!!.???", "abc.!!!"] {
            assert_eq!(
                codec().verify(bad, TokenKind::Access),
                Err(TokenError::Malformed),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_signed_garbage_payload_is_malformed() {
        let payload = to_base64url(b"not json");
        let signature = to_base64url(&hmac_sha256(&[42u8; 32], payload.as_bytes()));
        assert_eq!(
            codec().verify(&format!("{payload}.{signature}"), TokenKind::Access),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let refresh = codec().issue(AccountId::new(), Role::User, TokenKind::Refresh, Duration::from_secs(60)).unwrap();
        assert_eq!(
            codec().verify(&refresh.token, TokenKind::Access),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let sub = AccountId::new();
        let a = codec().issue_at(sub, Role::User, TokenKind::Refresh, Duration::from_secs(60), NOW).unwrap();
        let b = codec().issue_at(sub, Role::User, TokenKind::Refresh, Duration::from_secs(60), NOW).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_verify_signature_ignores_expiry() {
        let issued = codec().issue_at(
            AccountId::new(),
            Role::User,
            TokenKind::Refresh,
            Duration::from_secs(1),
            0,
        ).unwrap();
        assert_eq!(
            codec().verify(&issued.token, TokenKind::Refresh),
            Err(TokenError::Expired)
        );
        assert!(codec().verify_signature(&issued.token, TokenKind::Refresh).is_ok());
    }
}
