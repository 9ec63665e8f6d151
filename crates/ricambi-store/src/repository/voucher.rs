//! # Credit Voucher Repository
//!
//! Collection operations for store-credit vouchers. Redemption and
//! cancellation mutate under the collection write lock, so concurrent
//! redemptions of the same voucher serialize instead of double-spending
//! the balance.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::Collection;
use ricambi_core::{CreditVoucher, Money, VoucherDenied};

/// Repository for credit voucher collection operations.
#[derive(Debug, Clone, Default)]
pub struct VoucherRepository {
    vouchers: Collection<CreditVoucher>,
}

impl VoucherRepository {
    pub fn new() -> Self {
        VoucherRepository {
            vouchers: Collection::new(),
        }
    }

    /// Inserts a new voucher. Codes are unique.
    pub async fn insert(&self, voucher: CreditVoucher) -> StoreResult<()> {
        voucher.validate()?;
        let mut vouchers = self.vouchers.write().await;
        if vouchers.values().any(|v| v.code == voucher.code) {
            return Err(StoreError::duplicate("code", &voucher.code));
        }
        debug!(code = %voucher.code, amount = %voucher.original_amount, "inserting voucher");
        vouchers.insert(voucher.id, voucher);
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<CreditVoucher> {
        self.vouchers
            .get(id)
            .await
            .ok_or_else(|| StoreError::not_found("CreditVoucher", id))
    }

    pub async fn get_by_code(&self, code: &str) -> StoreResult<CreditVoucher> {
        let code = code.trim().to_uppercase();
        self.vouchers
            .find(|v| v.code == code)
            .await
            .ok_or_else(|| StoreError::not_found("CreditVoucher", code))
    }

    /// Replaces an existing voucher.
    pub async fn update(&self, voucher: CreditVoucher) -> StoreResult<()> {
        voucher.validate()?;
        let mut vouchers = self.vouchers.write().await;
        if !vouchers.contains_key(&voucher.id) {
            return Err(StoreError::not_found("CreditVoucher", voucher.id));
        }
        debug!(code = %voucher.code, "updating voucher");
        vouchers.insert(voucher.id, voucher);
        Ok(())
    }

    /// All vouchers held by a customer, whatever their state.
    pub async fn list_for_customer(&self, customer_id: Uuid) -> Vec<CreditVoucher> {
        self.vouchers.filter(|v| v.customer_id == customer_id).await
    }

    /// Vouchers a customer could redeem right now.
    pub async fn list_redeemable(
        &self,
        customer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Vec<CreditVoucher> {
        self.vouchers
            .filter(|v| v.customer_id == customer_id && v.is_valid(now))
            .await
    }

    /// Redeems part of a voucher's balance against a sale document, under
    /// the collection write lock.
    ///
    /// The outer result is a repository failure; the inner one is the
    /// business outcome. A voucher found past its expiry is persisted as
    /// expired.
    pub async fn redeem(
        &self,
        id: Uuid,
        amount: Money,
        document_id: &str,
        used_by: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Result<CreditVoucher, VoucherDenied>> {
        let mut vouchers = self.vouchers.write().await;
        let voucher = vouchers
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("CreditVoucher", id))?;

        match voucher.redeem(amount, document_id, used_by, None, now) {
            Ok(()) => {
                debug!(
                    code = %voucher.code,
                    amount = %amount,
                    remaining = %voucher.remaining_amount,
                    "voucher redeemed"
                );
                Ok(Ok(voucher.clone()))
            }
            Err(denial) => {
                debug!(code = %voucher.code, %denial, "voucher redemption denied");
                Ok(Err(denial))
            }
        }
    }

    /// Cancels a voucher, voiding its remaining balance.
    pub async fn cancel(
        &self,
        id: Uuid,
        reason: &str,
    ) -> StoreResult<Result<CreditVoucher, VoucherDenied>> {
        let mut vouchers = self.vouchers.write().await;
        let voucher = vouchers
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("CreditVoucher", id))?;

        match voucher.cancel(reason) {
            Ok(()) => {
                debug!(code = %voucher.code, reason, "voucher cancelled");
                Ok(Ok(voucher.clone()))
            }
            Err(denial) => Ok(Err(denial)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ricambi_core::VoucherStatus;

    fn voucher_for(customer_id: Uuid, code: &str, cents: i64) -> CreditVoucher {
        CreditVoucher::new(
            code,
            customer_id,
            Money::from_cents(cents),
            "Reso fattura 2026/114",
            Some(365),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let repo = VoucherRepository::new();
        let customer_id = Uuid::new_v4();
        let voucher = voucher_for(customer_id, "VC-0001", 10_000);
        let id = voucher.id;
        repo.insert(voucher).await.unwrap();

        assert_eq!(repo.get_by_id(id).await.unwrap().code, "VC-0001");
        assert_eq!(repo.get_by_code("vc-0001").await.unwrap().id, id);

        let dup = voucher_for(customer_id, "VC-0001", 5_000);
        assert!(matches!(
            repo.insert(dup).await,
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn test_redeem_persists_balance_and_history() {
        let repo = VoucherRepository::new();
        let customer_id = Uuid::new_v4();
        let voucher = voucher_for(customer_id, "VC-0001", 10_000);
        let id = voucher.id;
        repo.insert(voucher).await.unwrap();

        let now = Utc::now();
        let updated = repo
            .redeem(id, Money::from_cents(4_000), "DOC-001", "mrossi", now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.remaining_amount.cents(), 6_000);
        assert_eq!(updated.status, VoucherStatus::PartiallyUsed);

        // The mutation is visible on the stored copy too.
        let stored = repo.get_by_id(id).await.unwrap();
        assert_eq!(stored.remaining_amount.cents(), 6_000);
        assert_eq!(stored.usage_history.len(), 1);
    }

    #[tokio::test]
    async fn test_redeem_denial_reported_not_errored() {
        let repo = VoucherRepository::new();
        let customer_id = Uuid::new_v4();
        let voucher = voucher_for(customer_id, "VC-0001", 5_000);
        let id = voucher.id;
        repo.insert(voucher).await.unwrap();

        let denial = repo
            .redeem(id, Money::from_cents(9_000), "DOC-001", "mrossi", Utc::now())
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(
            denial,
            VoucherDenied::InsufficientBalance {
                available: Money::from_cents(5_000)
            }
        );

        // Unknown voucher is a repository error, not a denial.
        assert!(repo
            .redeem(Uuid::new_v4(), Money::from_cents(100), "DOC-002", "mrossi", Utc::now())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_cancel_and_redeemable_list() {
        let repo = VoucherRepository::new();
        let customer_id = Uuid::new_v4();
        let keep = voucher_for(customer_id, "VC-0001", 5_000);
        let void = voucher_for(customer_id, "VC-0002", 3_000);
        let void_id = void.id;
        repo.insert(keep).await.unwrap();
        repo.insert(void).await.unwrap();

        let now = Utc::now();
        assert_eq!(repo.list_redeemable(customer_id, now).await.len(), 2);

        let cancelled = repo
            .cancel(void_id, "Emesso per errore")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.status, VoucherStatus::Cancelled);

        let redeemable = repo.list_redeemable(customer_id, now).await;
        assert_eq!(redeemable.len(), 1);
        assert_eq!(redeemable[0].code, "VC-0001");
        assert_eq!(repo.list_for_customer(customer_id).await.len(), 2);
    }
}
