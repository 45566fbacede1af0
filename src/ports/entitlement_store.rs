//! Entitlement store port.
//!
//! Reads and writes the premium fields of a user record. Writes use merge
//! semantics: granting or revoking for an unknown user creates the record.

use async_trait::async_trait;

use crate::domain::entitlement::{
    EntitlementGrant, EntitlementRevocation, PaymentProvider, UserEntitlement,
};
use crate::domain::foundation::{DomainError, UserId};

/// Port for the user-record entitlement fields.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Switch premium on. Replaying the same grant leaves the flag unchanged.
    async fn grant(&self, user_id: &UserId, grant: &EntitlementGrant) -> Result<(), DomainError>;

    /// Switch premium off. Activation time and customer id are preserved.
    async fn revoke(
        &self,
        user_id: &UserId,
        revocation: &EntitlementRevocation,
    ) -> Result<(), DomainError>;

    /// Load the entitlement fields. Returns `None` for unknown users.
    async fn find(&self, user_id: &UserId) -> Result<Option<UserEntitlement>, DomainError>;

    /// Resolve a user from a provider customer id stored by an earlier grant.
    async fn find_user_by_customer_id(
        &self,
        provider: PaymentProvider,
        customer_id: &str,
    ) -> Result<Option<UserId>, DomainError>;
}
