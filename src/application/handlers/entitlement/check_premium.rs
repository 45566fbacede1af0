//! CheckPremiumHandler - Query handler for the premium flag.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::EntitlementStore;

/// Query to check if a user has premium access.
#[derive(Debug, Clone)]
pub struct CheckPremiumQuery {
    pub user_id: UserId,
}

/// Result of a premium check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckPremiumResult {
    pub user_id: UserId,
    pub is_premium: bool,
}

/// Handler for checking premium access. Unknown users read as not premium.
pub struct CheckPremiumHandler {
    store: Arc<dyn EntitlementStore>,
}

impl CheckPremiumHandler {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: CheckPremiumQuery) -> Result<CheckPremiumResult, DomainError> {
        let is_premium = self
            .store
            .find(&query.user_id)
            .await?
            .map_or(false, |record| record.is_premium);

        Ok(CheckPremiumResult {
            user_id: query.user_id,
            is_premium,
        })
    }
}
