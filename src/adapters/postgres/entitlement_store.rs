//! PostgreSQL implementation of EntitlementStore.
//!
//! Grants and revocations are single `INSERT ... ON CONFLICT DO UPDATE`
//! statements, so a write for an unknown user creates the row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entitlement::{
    EntitlementGrant, EntitlementRevocation, PaymentProvider, UserEntitlement,
};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::EntitlementStore;

pub struct PostgresEntitlementStore {
    pool: PgPool,
}

impl PostgresEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of the entitlement columns.
#[derive(Debug, sqlx::FromRow)]
struct EntitlementRow {
    id: String,
    is_premium: bool,
    subscription_status: Option<String>,
    payment_provider: Option<String>,
    provider_customer_id: Option<String>,
    premium_activated_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EntitlementRow> for UserEntitlement {
    type Error = DomainError;

    fn try_from(row: EntitlementRow) -> Result<Self, Self::Error> {
        let provider = row
            .payment_provider
            .as_deref()
            .map(str::parse::<PaymentProvider>)
            .transpose()
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid provider: {}", e))
            })?;

        Ok(UserEntitlement {
            user_id: UserId::new(row.id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user id: {}", e))
            })?,
            is_premium: row.is_premium,
            subscription_status: row.subscription_status,
            provider,
            provider_customer_id: row.provider_customer_id,
            premium_activated_at: row.premium_activated_at.map(Timestamp::from_datetime),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl EntitlementStore for PostgresEntitlementStore {
    async fn grant(&self, user_id: &UserId, grant: &EntitlementGrant) -> Result<(), DomainError> {
        let now = Timestamp::now();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, is_premium, subscription_status, payment_provider,
                provider_customer_id, premium_activated_at, updated_at
            ) VALUES ($1, TRUE, $2, $3, $4, $5, $5)
            ON CONFLICT (id) DO UPDATE SET
                is_premium = TRUE,
                subscription_status = EXCLUDED.subscription_status,
                payment_provider = EXCLUDED.payment_provider,
                provider_customer_id = COALESCE(EXCLUDED.provider_customer_id, users.provider_customer_id),
                premium_activated_at = EXCLUDED.premium_activated_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(&grant.status)
        .bind(grant.provider.as_str())
        .bind(&grant.customer_id)
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to grant premium: {}", e)))?;

        Ok(())
    }

    async fn revoke(
        &self,
        user_id: &UserId,
        revocation: &EntitlementRevocation,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, is_premium, subscription_status, payment_provider, updated_at)
            VALUES ($1, FALSE, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                is_premium = FALSE,
                subscription_status = EXCLUDED.subscription_status,
                payment_provider = EXCLUDED.payment_provider,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(&revocation.status)
        .bind(revocation.provider.as_str())
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to revoke premium: {}", e)))?;

        Ok(())
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<UserEntitlement>, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(
            r#"
            SELECT id, is_premium, subscription_status, payment_provider,
                   provider_customer_id, premium_activated_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find user: {}", e)))?;

        row.map(UserEntitlement::try_from).transpose()
    }

    async fn find_user_by_customer_id(
        &self,
        provider: PaymentProvider,
        customer_id: &str,
    ) -> Result<Option<UserId>, DomainError> {
        let id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE payment_provider = $1 AND provider_customer_id = $2
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(provider.as_str())
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to look up customer: {}", e)))?;

        id.map(UserId::new).transpose().map_err(DomainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(provider: Option<&str>) -> EntitlementRow {
        EntitlementRow {
            id: "u1".to_string(),
            is_premium: true,
            subscription_status: Some("active".to_string()),
            payment_provider: provider.map(String::from),
            provider_customer_id: Some("cus_1".to_string()),
            premium_activated_at: Some(Utc::now()),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_entitlement() {
        let entitlement = UserEntitlement::try_from(row(Some("stripe"))).unwrap();
        assert_eq!(entitlement.user_id.as_str(), "u1");
        assert_eq!(entitlement.provider, Some(PaymentProvider::Stripe));
        assert!(entitlement.premium_activated_at.is_some());
    }

    #[test]
    fn unknown_provider_in_row_is_a_database_error() {
        let err = UserEntitlement::try_from(row(Some("paymongo"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn row_without_provider_is_allowed() {
        let entitlement = UserEntitlement::try_from(row(None)).unwrap();
        assert!(entitlement.provider.is_none());
    }
}
