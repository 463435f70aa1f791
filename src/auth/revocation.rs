// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory token revocation ledger.
//!
//! Entries are keyed by the token's `jti` and remember its `exp`, so an entry
//! is dropped once the token could no longer validate anyway. The ledger is
//! process-local: a restart forgets every revocation.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct RevocationLedger {
    revoked: RwLock<HashMap<Uuid, i64>>,
}

impl RevocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke the token `jti` that expires at `exp`. Returns `false` if it
    /// was already revoked.
    pub async fn revoke(&self, jti: Uuid, exp: i64) -> bool {
        let mut revoked = self.revoked.write().await;
        prune(&mut revoked, Utc::now().timestamp());
        revoked.insert(jti, exp).is_none()
    }

    pub async fn is_revoked(&self, jti: &Uuid) -> bool {
        self.revoked.read().await.contains_key(jti)
    }

    pub async fn revoked_count(&self) -> usize {
        self.revoked.read().await.len()
    }
}

fn prune(revoked: &mut HashMap<Uuid, i64>, now: i64) {
    revoked.retain(|_, exp| *exp >= now);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoked_tokens_are_remembered() {
        let ledger = RevocationLedger::new();
        let jti = Uuid::new_v4();
        let exp = Utc::now().timestamp() + 3600;

        assert!(!ledger.is_revoked(&jti).await);
        assert!(ledger.revoke(jti, exp).await);
        assert!(ledger.is_revoked(&jti).await);
        assert!(!ledger.revoke(jti, exp).await);
    }

    #[tokio::test]
    async fn expired_entries_are_pruned_on_revoke() {
        let ledger = RevocationLedger::new();
        let now = Utc::now().timestamp();
        let stale = Uuid::new_v4();

        ledger.revoke(stale, now - 10).await;
        ledger.revoke(Uuid::new_v4(), now + 3600).await;

        assert!(!ledger.is_revoked(&stale).await);
        assert_eq!(ledger.revoked_count().await, 1);
    }
}
