use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::entitlement::{
    EntitlementGrant, EntitlementRevocation, PaymentProvider, UserEntitlement,
};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::EntitlementStore;

/// In-memory implementation of the EntitlementStore port.
///
/// `fail_writes` makes every grant/revoke return a database error, which
/// lets tests exercise the 500 path.
#[derive(Default)]
pub struct InMemoryEntitlementStore {
    users: RwLock<HashMap<UserId, UserEntitlement>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryEntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record, e.g. a user whose customer id is already known.
    pub async fn insert(&self, record: UserEntitlement) {
        self.users.write().await.insert(record.user_id.clone(), record);
    }

    /// Number of grant/revoke calls that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated write failure",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EntitlementStore for InMemoryEntitlementStore {
    async fn grant(&self, user_id: &UserId, grant: &EntitlementGrant) -> Result<(), DomainError> {
        self.check_writable()?;
        let now = Timestamp::now();
        let mut users = self.users.write().await;
        users
            .entry(user_id.clone())
            .or_insert_with(|| UserEntitlement::free(user_id.clone(), now))
            .apply_grant(grant, now);
        Ok(())
    }

    async fn revoke(
        &self,
        user_id: &UserId,
        revocation: &EntitlementRevocation,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        let now = Timestamp::now();
        let mut users = self.users.write().await;
        users
            .entry(user_id.clone())
            .or_insert_with(|| UserEntitlement::free(user_id.clone(), now))
            .apply_revocation(revocation, now);
        Ok(())
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<UserEntitlement>, DomainError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_user_by_customer_id(
        &self,
        provider: PaymentProvider,
        customer_id: &str,
    ) -> Result<Option<UserId>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| {
                u.provider == Some(provider)
                    && u.provider_customer_id.as_deref() == Some(customer_id)
            })
            .map(|u| u.user_id.clone()))
    }
}
