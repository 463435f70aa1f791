// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Certificate login, token refresh and current-user lookup.
//!
//! ```text
//! Unauthenticated -> CertificatePresented -> IdentityResolved -> TokenIssued
//! ```
//!
//! Handlers extract credentials from the request and hand them to
//! [`AuthFlow`]; nothing in here knows about HTTP.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{
    certificate::{CertificateValidity, ClientCertificate},
    claims::{Claims, TokenKind},
    identity::IdentityResolver,
    revocation::RevocationLedger,
    token::{TokenCodec, TokenPair},
    AuthError,
};
use crate::models::{AuthResponse, CertificateStatusResponse, User};

pub struct AuthFlow {
    codec: TokenCodec,
    identities: Arc<dyn IdentityResolver>,
    ledger: Option<RevocationLedger>,
}

impl AuthFlow {
    /// Stateless flow: logout and refresh leave earlier tokens valid until
    /// they expire.
    pub fn new(codec: TokenCodec, identities: Arc<dyn IdentityResolver>) -> Self {
        Self {
            codec,
            identities,
            ledger: None,
        }
    }

    /// Track revoked tokens: logout revokes the presented access token and
    /// refresh revokes the spent refresh token.
    pub fn with_revocation(mut self) -> Self {
        self.ledger = Some(RevocationLedger::new());
        self
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn revocation_enabled(&self) -> bool {
        self.ledger.is_some()
    }

    /// Exchange a presented client certificate for a user record and a
    /// fresh token pair.
    pub async fn login(&self, cert: &ClientCertificate) -> Result<AuthResponse, AuthError> {
        let user = self
            .identities
            .resolve_by_subject_dn(cert.subject())
            .await
            .map_err(AuthError::from)
            .inspect_err(|e| {
                warn!(error_code = e.error_code(), subject = cert.subject(), "certificate login rejected")
            })?;

        let pair = self.codec.issue_pair(&user)?;
        info!(user_id = %user.id, role = %user.role, "certificate login succeeded");

        Ok(AuthResponse {
            user,
            token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }

    /// Resolve the user behind an access token.
    pub async fn current_user(&self, access_token: &str) -> Result<User, AuthError> {
        let rejected =
            |e: &AuthError| warn!(error_code = e.error_code(), "current user lookup rejected");

        let claims = self
            .verify(access_token, TokenKind::Access)
            .await
            .inspect_err(rejected)?;
        self.identities
            .resolve_by_id(&claims.user_id)
            .await
            .map_err(AuthError::from)
            .inspect_err(rejected)
    }

    /// Trade a refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .verify(refresh_token, TokenKind::Refresh)
            .await
            .inspect_err(|e| warn!(error_code = e.error_code(), "token refresh rejected"))?;

        // Spend the token before issuing, so only one concurrent refresh wins.
        if let Some(ledger) = &self.ledger {
            if !ledger.revoke(claims.jti, claims.exp).await {
                warn!(user_id = %claims.user_id, "refresh token already spent");
                return Err(AuthError::TokenRevoked);
            }
        }

        let user = self.identities.resolve_by_id(&claims.user_id).await?;
        let pair = self.codec.issue_pair(&user)?;
        info!(user_id = %user.id, "token pair refreshed");

        Ok(pair)
    }

    /// Acknowledge a logout. With revocation enabled, a valid access token
    /// presented alongside is revoked; returns whether that happened.
    pub async fn logout(&self, access_token: Option<&str>) -> bool {
        let (Some(ledger), Some(token)) = (&self.ledger, access_token) else {
            return false;
        };

        match self.verify(token, TokenKind::Access).await {
            Ok(claims) => {
                let revoked = ledger.revoke(claims.jti, claims.exp).await;
                info!(user_id = %claims.user_id, "access token revoked on logout");
                revoked
            }
            Err(_) => false,
        }
    }

    /// Describe a presented client certificate as of `now`.
    pub fn certificate_status(
        &self,
        cert: &ClientCertificate,
        now: DateTime<Utc>,
    ) -> CertificateStatusResponse {
        let validity = cert.validity_at(now);
        CertificateStatusResponse {
            status: validity.as_str().to_string(),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            not_before: cert.not_before(),
            not_after: cert.not_after(),
            fingerprint: cert.fingerprint(),
            valid: validity == CertificateValidity::Valid,
        }
    }

    async fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.codec.validate(token)?;

        if claims.kind != kind {
            return Err(AuthError::WrongTokenKind);
        }
        if let Some(ledger) = &self.ledger {
            if ledger.is_revoked(&claims.jti).await {
                return Err(AuthError::TokenRevoked);
            }
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{IdentityError, IdentityQuery, MockDirectory};
    use async_trait::async_trait;
    use chrono::Duration;
    use tracing::instrument::WithSubscriber;

    struct EmptyDirectory;

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl IdentityResolver for EmptyDirectory {
        async fn resolve(&self, _query: IdentityQuery<'_>) -> Result<User, IdentityError> {
            Err(IdentityError::NotFound)
        }
    }

    fn flow() -> AuthFlow {
        AuthFlow::new(
            TokenCodec::new(b"flow-secret", Duration::hours(24)),
            Arc::new(MockDirectory::new()),
        )
    }

    fn jane() -> ClientCertificate {
        let now = Utc::now();
        ClientCertificate::new(
            "CN=Jane Doe,O=Org,C=US",
            "CN=Org Root CA,O=Org,C=US",
            now - Duration::days(30),
            now + Duration::days(335),
            b"jane".to_vec(),
        )
    }

    #[tokio::test]
    async fn login_returns_user_for_presented_subject() {
        let flow = flow();
        let response = flow.login(&jane()).await.unwrap();

        assert_eq!(response.user.subject_name, "CN=Jane Doe,O=Org,C=US");

        let access = flow.codec().validate(&response.token).unwrap();
        let refresh = flow.codec().validate(&response.refresh_token).unwrap();
        assert_eq!(access.subject_dn, "CN=Jane Doe,O=Org,C=US");
        assert!(access.same_subject(&refresh));
        assert!(refresh.exp > access.exp);
    }

    #[tokio::test]
    async fn login_fails_when_directory_has_no_match() {
        let flow = AuthFlow::new(
            TokenCodec::new(b"flow-secret", Duration::hours(24)),
            Arc::new(EmptyDirectory),
        );
        assert_eq!(flow.login(&jane()).await.unwrap_err(), AuthError::UserNotFound);
    }

    #[tokio::test]
    async fn current_user_resolves_by_token_user_id() {
        let flow = flow();
        let login = flow.login(&jane()).await.unwrap();

        let user = flow.current_user(&login.token).await.unwrap();
        assert_eq!(user.id, login.user.id);
    }

    #[tokio::test]
    async fn current_user_rejects_refresh_tokens_and_garbage() {
        let flow = flow();
        let login = flow.login(&jane()).await.unwrap();

        assert_eq!(
            flow.current_user(&login.refresh_token).await.unwrap_err(),
            AuthError::WrongTokenKind
        );
        assert_eq!(
            flow.current_user("abc.def.ghi").await.unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[tokio::test]
    async fn current_user_rejections_are_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let result = flow()
            .current_user("abc.def.ghi")
            .with_subscriber(subscriber)
            .await;

        assert_eq!(result.unwrap_err(), AuthError::MalformedToken);
        let output = logs.contents();
        assert!(output.contains("current user lookup rejected"), "{output}");
        assert!(output.contains("malformed_token"), "{output}");
    }

    #[tokio::test]
    async fn refresh_issues_a_new_pair() {
        let flow = flow();
        let login = flow.login(&jane()).await.unwrap();

        let pair = flow.refresh(&login.refresh_token).await.unwrap();
        let access = flow.codec().validate(&pair.access_token).unwrap();
        assert_eq!(access.user_id, login.user.id);
        assert_eq!(access.kind, TokenKind::Access);

        // Stateless: the old refresh token still works.
        assert!(flow.refresh(&login.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn refresh_with_week_old_token_is_expired() {
        let flow = flow();
        let user = MockDirectory::new().resolve_by_id("1").await.unwrap();
        let stale = flow
            .codec()
            .issue_pair_at(&user, Utc::now() - Duration::days(8))
            .unwrap();

        assert_eq!(
            flow.refresh(&stale.refresh_token).await.unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[tokio::test]
    async fn refresh_rejects_access_tokens() {
        let flow = flow();
        let login = flow.login(&jane()).await.unwrap();
        assert_eq!(
            flow.refresh(&login.token).await.unwrap_err(),
            AuthError::WrongTokenKind
        );
    }

    #[tokio::test]
    async fn stateless_logout_revokes_nothing() {
        let flow = flow();
        let login = flow.login(&jane()).await.unwrap();

        assert!(!flow.logout(Some(&login.token)).await);
        assert!(flow.current_user(&login.token).await.is_ok());
    }

    #[tokio::test]
    async fn revocation_rotates_refresh_tokens_and_honours_logout() {
        let flow = flow().with_revocation();
        let login = flow.login(&jane()).await.unwrap();

        let pair = flow.refresh(&login.refresh_token).await.unwrap();
        assert_eq!(
            flow.refresh(&login.refresh_token).await.unwrap_err(),
            AuthError::TokenRevoked
        );

        assert!(flow.logout(Some(&pair.access_token)).await);
        assert_eq!(
            flow.current_user(&pair.access_token).await.unwrap_err(),
            AuthError::TokenRevoked
        );
        assert!(!flow.logout(None).await);
    }

    #[tokio::test]
    async fn concurrent_refreshes_spend_the_token_once() {
        let flow = flow().with_revocation();
        let login = flow.login(&jane()).await.unwrap();

        let (first, second) = tokio::join!(
            flow.refresh(&login.refresh_token),
            flow.refresh(&login.refresh_token),
        );
        let outcomes = [first, second];

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| r.as_ref().err() == Some(&AuthError::TokenRevoked)));
    }

    #[test]
    fn certificate_status_reports_window() {
        let flow = flow();
        let cert = jane();

        let status = flow.certificate_status(&cert, Utc::now());
        assert!(status.valid);
        assert_eq!(status.status, "valid");
        assert_eq!(status.subject, "CN=Jane Doe,O=Org,C=US");
        assert_eq!(status.issuer, "CN=Org Root CA,O=Org,C=US");
        assert_eq!(status.fingerprint, cert.fingerprint());

        let later = flow.certificate_status(&cert, cert.not_after() + Duration::days(1));
        assert!(!later.valid);
        assert_eq!(later.status, "expired");
    }
}
