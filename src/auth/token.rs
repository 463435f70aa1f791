// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token issuing and verification.
//!
//! Every login or refresh yields a [`TokenPair`]: an access token valid for
//! the configured duration and a refresh token valid seven times longer, both
//! carrying the same subject claims and the same issued-at time.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::{Claims, TokenKind};
use crate::models::User;

/// Refresh tokens live this many times longer than access tokens.
pub const REFRESH_TTL_MULTIPLIER: i32 = 7;

/// Failures while issuing or verifying a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("token duration must be at least one second and within the representable date range")]
    InvalidDuration,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Access token plus its longer-lived refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies tokens with a shared symmetric secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], access_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is rejected as soon as `exp` has passed.
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Access lifetime times [`REFRESH_TTL_MULTIPLIER`], or
    /// `InvalidDuration` when that overflows.
    pub fn refresh_ttl(&self) -> Result<Duration, TokenError> {
        self.access_ttl
            .checked_mul(REFRESH_TTL_MULTIPLIER)
            .ok_or(TokenError::InvalidDuration)
    }

    /// Sign a token for `user` valid from now until now + `duration`.
    pub fn issue(&self, user: &User, kind: TokenKind, duration: Duration) -> Result<String, TokenError> {
        self.issue_at(user, kind, duration, Utc::now())
    }

    /// Sign a token as if issued at `now`.
    pub fn issue_at(
        &self,
        user: &User,
        kind: TokenKind,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if duration < Duration::seconds(1) {
            return Err(TokenError::InvalidDuration);
        }

        // Claims have whole-second resolution; sub-second parts are dropped.
        let iat = now.timestamp();
        let exp = iat
            .checked_add(duration.num_seconds())
            .filter(|exp| DateTime::from_timestamp(*exp, 0).is_some())
            .ok_or(TokenError::InvalidDuration)?;
        let claims = Claims::for_user(user, kind, iat, exp);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a fresh access/refresh pair for `user`.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(user, Utc::now())
    }

    /// Issue a pair as if issued at `now`.
    pub fn issue_pair_at(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_at(user, TokenKind::Access, self.access_ttl, now)?,
            refresh_token: self.issue_at(user, TokenKind::Refresh, self.refresh_ttl()?, now)?,
        })
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn sample_user() -> User {
        User {
            id: "7".to_string(),
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            rank: "Maj".to_string(),
            org_code: "XYZ789".to_string(),
            subject_name: "CN=Jane Doe,O=Org,C=US".to_string(),
            role: Role::User,
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Duration::hours(24))
    }

    #[test]
    fn validate_returns_issued_claims() {
        let codec = codec();
        let user = sample_user();
        for minutes in [1, 15, 60 * 24] {
            let d = Duration::minutes(minutes);
            let token = codec.issue(&user, TokenKind::Access, d).unwrap();
            let claims = codec.validate(&token).unwrap();

            assert_eq!(claims.user_id, user.id);
            assert_eq!(claims.email, user.email);
            assert_eq!(claims.subject_dn, user.subject_name);
            assert_eq!(claims.role, user.role);
            assert_eq!(claims.kind, TokenKind::Access);
            assert_eq!(claims.exp - claims.iat, d.num_seconds());
        }
    }

    #[test]
    fn refresh_token_lives_seven_times_longer() {
        let codec = TokenCodec::new(b"test-secret", Duration::minutes(30));
        let pair = codec.issue_pair(&sample_user()).unwrap();

        let access = codec.validate(&pair.access_token).unwrap();
        let refresh = codec.validate(&pair.refresh_token).unwrap();

        assert_eq!(access.exp - access.iat, 30 * 60);
        assert_eq!(refresh.exp - refresh.iat, 7 * 30 * 60);
        assert_eq!(access.iat, refresh.iat);
        assert!(refresh.exp > access.exp);
        assert!(access.same_subject(&refresh));
        assert_eq!(refresh.kind, TokenKind::Refresh);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let issued = Utc::now() - Duration::hours(2);
        let token = codec
            .issue_at(&sample_user(), TokenKind::Access, Duration::hours(1), issued)
            .unwrap();

        assert_eq!(codec.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn refresh_token_from_eight_days_ago_is_expired() {
        let codec = codec();
        let pair = codec
            .issue_pair_at(&sample_user(), Utc::now() - Duration::days(8))
            .unwrap();

        assert_eq!(codec.validate(&pair.refresh_token), Err(TokenError::Expired));
    }

    #[test]
    fn token_from_another_secret_has_invalid_signature() {
        let other = TokenCodec::new(b"some-other-secret", Duration::hours(24));
        let token = other
            .issue(&sample_user(), TokenKind::Access, Duration::hours(1))
            .unwrap();

        assert_eq!(codec().validate(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.validate("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(codec.validate(""), Err(TokenError::Malformed));
    }

    #[test]
    fn sub_second_durations_are_refused() {
        let codec = codec();
        let user = sample_user();
        assert_eq!(
            codec.issue(&user, TokenKind::Access, Duration::zero()),
            Err(TokenError::InvalidDuration)
        );
        assert_eq!(
            codec.issue(&user, TokenKind::Access, Duration::milliseconds(-5)),
            Err(TokenError::InvalidDuration)
        );
    }

    #[test]
    fn out_of_range_lifetimes_are_refused() {
        let user = sample_user();

        let huge = TokenCodec::new(b"test-secret", Duration::seconds(2_000_000_000_000));
        assert_eq!(huge.issue_pair(&user), Err(TokenError::InvalidDuration));

        let overflowing = TokenCodec::new(b"test-secret", Duration::MAX);
        assert_eq!(overflowing.refresh_ttl(), Err(TokenError::InvalidDuration));
        assert_eq!(overflowing.issue_pair(&user), Err(TokenError::InvalidDuration));
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        let codec = codec();
        // Just before a second boundary, so rounding up would show.
        let now = DateTime::from_timestamp(Utc::now().timestamp(), 999_000_000).unwrap();
        let token = codec
            .issue_at(
                &sample_user(),
                TokenKind::Access,
                Duration::milliseconds(3_600_500),
                now,
            )
            .unwrap();

        let claims = codec.validate(&token).unwrap();
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
    }
}
