use crate::core::ledger::ContributionLedger;
use crate::core::price;
use crate::domain::model::{
    Address, FundingReceipt, LedgerSnapshot, PriceSnapshot, Quote, UsdWei, Wei,
    WithdrawalReceipt, DEFAULT_MINIMUM_USD,
};
use crate::domain::ports::{PriceOracle, ValueTransfer};
use crate::utils::error::{FundMeError, Result};
use chrono::Utc;
use tokio::sync::Mutex;

/// Crowdfunding account: accepts contributions worth at least `minimum_usd`
/// and pays the whole balance out to `owner` on withdrawal.
///
/// Every ledger mutation happens under one lock. `withdraw` keeps that lock
/// across the payout, so no contribution can land between reading the total
/// and clearing it.
pub struct FundingService<O: PriceOracle, T: ValueTransfer> {
    owner: Address,
    minimum_usd: UsdWei,
    oracle: O,
    transfer: T,
    ledger: Mutex<ContributionLedger>,
}

impl<O: PriceOracle, T: ValueTransfer> FundingService<O, T> {
    pub fn new(owner: Address, oracle: O, transfer: T) -> Self {
        Self::with_minimum_usd(owner, oracle, transfer, DEFAULT_MINIMUM_USD)
    }

    pub fn with_minimum_usd(owner: Address, oracle: O, transfer: T, minimum_usd: UsdWei) -> Self {
        tracing::debug!(
            "FundingService created for owner {} (minimum {} USD-wei)",
            owner,
            minimum_usd
        );
        Self {
            owner,
            minimum_usd,
            oracle,
            transfer,
            ledger: Mutex::new(ContributionLedger::new()),
        }
    }

    /// Reads the oracle, then funds at that rate.
    pub async fn fund(&self, caller: &Address, amount: Wei) -> Result<FundingReceipt> {
        ensure_positive(amount)?;
        let snapshot = self.oracle.read().await?;
        self.fund_with_snapshot(caller, amount, &snapshot).await
    }

    /// Funds at a rate the caller already read. All checks run before the
    /// ledger is touched.
    pub async fn fund_with_snapshot(
        &self,
        caller: &Address,
        amount: Wei,
        snapshot: &PriceSnapshot,
    ) -> Result<FundingReceipt> {
        ensure_positive(amount)?;

        let usd_value = price::conversion_rate(amount, snapshot)?;
        if usd_value < self.minimum_usd {
            tracing::warn!(
                "Rejected contribution of {} wei from {}: worth {} USD-wei, minimum {}",
                amount,
                caller,
                usd_value,
                self.minimum_usd
            );
            return Err(FundMeError::InsufficientContribution {
                usd_value,
                minimum_usd: self.minimum_usd,
            });
        }

        let contributor_total = {
            let mut ledger = self.ledger.lock().await;
            ledger.record(caller, amount)?
        };

        tracing::info!(
            "💰 {} funded {} wei (total from contributor: {})",
            caller,
            amount,
            contributor_total
        );

        Ok(FundingReceipt {
            contributor: caller.clone(),
            amount,
            usd_value,
            contributor_total,
            funded_at: Utc::now(),
        })
    }

    /// Pays the full balance to the owner and clears the ledger.
    ///
    /// The ledger is cleared only after the payout succeeds; a failed payout
    /// returns `TransferFailed` and leaves every balance in place.
    pub async fn withdraw(&self, caller: &Address) -> Result<WithdrawalReceipt> {
        if caller != &self.owner {
            tracing::warn!("Rejected withdrawal attempt by non-owner {}", caller);
            return Err(FundMeError::Unauthorized {
                caller: caller.to_string(),
            });
        }

        let mut ledger = self.ledger.lock().await;
        let amount = ledger.total_balance();
        let contributions_cleared = ledger.contribution_count();

        if amount > 0 {
            self.transfer
                .transfer(&self.owner, amount)
                .await
                .map_err(|e| match e {
                    FundMeError::TransferFailed { .. } => e,
                    other => FundMeError::TransferFailed {
                        to: self.owner.to_string(),
                        amount,
                        reason: other.to_string(),
                    },
                })
                .inspect_err(|e| tracing::error!("❌ Withdrawal failed: {}", e))?;
        }

        ledger.clear();
        drop(ledger);

        tracing::info!(
            "✅ Owner {} withdrew {} wei from {} contributions",
            self.owner,
            amount,
            contributions_cleared
        );

        Ok(WithdrawalReceipt {
            owner: self.owner.clone(),
            amount,
            contributions_cleared,
            withdrawn_at: Utc::now(),
        })
    }

    /// The price feed's format version, unchanged.
    pub async fn version(&self) -> Result<u64> {
        Ok(self.oracle.read().await?.version)
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn minimum_usd(&self) -> UsdWei {
        self.minimum_usd
    }

    /// Prices `amount` at the current rate without funding anything.
    pub async fn quote(&self, amount: Wei) -> Result<Quote> {
        let snapshot = self.oracle.read().await?;
        let usd_value = price::conversion_rate(amount, &snapshot)?;
        Ok(Quote {
            amount,
            unit_price_usd: price::price_in_usd(&snapshot)?,
            usd_value,
            minimum_usd: self.minimum_usd,
            accepted: usd_value >= self.minimum_usd,
        })
    }

    pub async fn amount_funded(&self, contributor: &Address) -> Wei {
        self.ledger.lock().await.balance_of(contributor)
    }

    pub async fn funder(&self, index: usize) -> Option<Address> {
        self.ledger.lock().await.contributor_at(index).cloned()
    }

    pub async fn funders(&self) -> Vec<Address> {
        self.ledger.lock().await.contributors().to_vec()
    }

    pub async fn total_balance(&self) -> Wei {
        self.ledger.lock().await.total_balance()
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.lock().await.snapshot()
    }
}

fn ensure_positive(amount: Wei) -> Result<()> {
    if amount == 0 {
        return Err(FundMeError::InvalidAmount {
            message: "contribution must be greater than zero".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryTransfer, MockPriceOracle};
    use crate::domain::model::WEI_PER_UNIT;
    use std::sync::Arc;

    const SEND_VALUE: Wei = WEI_PER_UNIT / 10;

    fn owner() -> Address {
        Address::from("0x0000000000000000000000000000000000000001")
    }

    fn funder(i: usize) -> Address {
        Address::new(format!("0x{:040x}", 0x100 + i))
    }

    fn service() -> (
        FundingService<Arc<MockPriceOracle>, Arc<InMemoryTransfer>>,
        Arc<MockPriceOracle>,
        Arc<InMemoryTransfer>,
    ) {
        let oracle = Arc::new(MockPriceOracle::default());
        let transfer = Arc::new(InMemoryTransfer::new());
        let service = FundingService::new(owner(), oracle.clone(), transfer.clone());
        (service, oracle, transfer)
    }

    #[tokio::test]
    async fn test_owner_and_minimum_are_fixed_at_construction() {
        let (service, _, _) = service();
        assert_eq!(service.owner(), &owner());
        assert_eq!(service.minimum_usd(), 5 * WEI_PER_UNIT);
    }

    #[tokio::test]
    async fn test_minimum_boundary_is_inclusive() {
        let (service, _, _) = service();

        // 0.001 unit at $2000 = $2
        let err = service.fund(&funder(0), WEI_PER_UNIT / 1_000).await.unwrap_err();
        assert!(matches!(err, FundMeError::InsufficientContribution { .. }));
        assert_eq!(service.total_balance().await, 0);

        // 0.0025 unit at $2000 = $5 exactly
        let receipt = service.fund(&funder(0), 2_500_000_000_000_000).await.unwrap();
        assert_eq!(receipt.usd_value, 5 * WEI_PER_UNIT);
        assert_eq!(service.total_balance().await, 2_500_000_000_000_000);
    }

    #[tokio::test]
    async fn test_zero_amount_is_invalid() {
        let (service, _, _) = service();
        let err = service.fund(&funder(0), 0).await.unwrap_err();
        assert!(matches!(err, FundMeError::InvalidAmount { .. }));
    }

    #[tokio::test]
    async fn test_fund_updates_data_structures() {
        let (service, _, _) = service();
        let alice = funder(1);

        let receipt = service.fund(&alice, SEND_VALUE).await.unwrap();

        assert_eq!(receipt.contributor_total, SEND_VALUE);
        assert_eq!(service.amount_funded(&alice).await, SEND_VALUE);
        assert_eq!(service.funder(0).await, Some(alice));
        assert_eq!(service.funder(1).await, None);
    }

    #[tokio::test]
    async fn test_repeat_funding_appends_duplicate_entries() {
        let (service, _, _) = service();
        let alice = funder(1);

        service.fund(&alice, SEND_VALUE).await.unwrap();
        service.fund(&alice, SEND_VALUE).await.unwrap();

        assert_eq!(service.funders().await, vec![alice.clone(), alice.clone()]);
        assert_eq!(service.amount_funded(&alice).await, 2 * SEND_VALUE);
    }

    #[tokio::test]
    async fn test_fund_uses_the_given_snapshot() {
        let (service, _, _) = service();
        let cheap = PriceSnapshot {
            rate: 100_000_000,
            decimals: 8,
            version: 4,
        };

        // 0.1 unit at $1 is below $5
        let err = service
            .fund_with_snapshot(&funder(0), SEND_VALUE, &cheap)
            .await
            .unwrap_err();
        assert!(matches!(err, FundMeError::InsufficientContribution { .. }));
    }

    #[tokio::test]
    async fn test_price_drop_rejects_previously_valid_amount() {
        let (service, oracle, _) = service();
        service.fund(&funder(0), SEND_VALUE).await.unwrap();

        oracle.update_answer(1_000_000_000).unwrap();
        let err = service.fund(&funder(1), SEND_VALUE).await.unwrap_err();

        assert!(matches!(err, FundMeError::InsufficientContribution { .. }));
        assert_eq!(service.total_balance().await, SEND_VALUE);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_withdraw() {
        let (service, _, transfer) = service();
        service.fund(&funder(0), SEND_VALUE).await.unwrap();

        let err = service.withdraw(&funder(0)).await.unwrap_err();

        assert!(matches!(err, FundMeError::Unauthorized { .. }));
        assert_eq!(service.total_balance().await, SEND_VALUE);
        assert_eq!(transfer.received(&funder(0)).await, 0);
    }

    #[tokio::test]
    async fn test_withdraw_from_single_funder() {
        let (service, _, transfer) = service();
        service.fund(&funder(0), SEND_VALUE).await.unwrap();

        let receipt = service.withdraw(&owner()).await.unwrap();

        assert_eq!(receipt.amount, SEND_VALUE);
        assert_eq!(receipt.contributions_cleared, 1);
        assert_eq!(service.total_balance().await, 0);
        assert_eq!(service.amount_funded(&funder(0)).await, 0);
        assert!(service.funders().await.is_empty());
        assert_eq!(transfer.received(&owner()).await, SEND_VALUE);
    }

    #[tokio::test]
    async fn test_withdraw_from_multiple_funders() {
        let (service, _, transfer) = service();
        for i in 1..10 {
            service.fund(&funder(i), SEND_VALUE).await.unwrap();
        }
        let before = service.total_balance().await;

        let receipt = service.withdraw(&owner()).await.unwrap();

        assert_eq!(receipt.amount, before);
        assert_eq!(service.total_balance().await, 0);
        assert_eq!(transfer.received(&owner()).await, 9 * SEND_VALUE);
        for i in 1..10 {
            assert_eq!(service.amount_funded(&funder(i)).await, 0);
        }
    }

    #[tokio::test]
    async fn test_failed_transfer_leaves_ledger_intact() {
        let (service, _, transfer) = service();
        service.fund(&funder(0), SEND_VALUE).await.unwrap();
        service.fund(&funder(1), SEND_VALUE).await.unwrap();
        let before = service.snapshot().await;

        transfer.set_failing(true);
        let err = service.withdraw(&owner()).await.unwrap_err();

        assert!(matches!(err, FundMeError::TransferFailed { .. }));
        assert_eq!(service.snapshot().await, before);

        transfer.set_failing(false);
        let receipt = service.withdraw(&owner()).await.unwrap();
        assert_eq!(receipt.amount, 2 * SEND_VALUE);
    }

    #[tokio::test]
    async fn test_withdraw_of_empty_ledger_pays_nothing() {
        let (service, _, transfer) = service();
        let receipt = service.withdraw(&owner()).await.unwrap();
        assert_eq!(receipt.amount, 0);
        assert_eq!(transfer.received(&owner()).await, 0);
    }

    #[tokio::test]
    async fn test_quote_reports_unit_price_and_boundary() {
        let (service, _, _) = service();

        let at_minimum = service.quote(2_500_000_000_000_000).await.unwrap();
        assert_eq!(at_minimum.unit_price_usd, 2_000 * WEI_PER_UNIT);
        assert_eq!(at_minimum.usd_value, 5 * WEI_PER_UNIT);
        assert!(at_minimum.accepted);

        let below = service.quote(WEI_PER_UNIT / 1_000).await.unwrap();
        assert!(!below.accepted);
        assert_eq!(service.total_balance().await, 0);
    }

    #[tokio::test]
    async fn test_eighteen_decimal_feed_accepts_whole_units() {
        let oracle = MockPriceOracle::new(18, 2_000 * WEI_PER_UNIT as i128);
        let service = FundingService::new(owner(), oracle, InMemoryTransfer::new());

        let receipt = service.fund(&funder(0), 3 * WEI_PER_UNIT).await.unwrap();
        assert_eq!(receipt.usd_value, 6_000 * WEI_PER_UNIT);
        assert_eq!(service.total_balance().await, 3 * WEI_PER_UNIT);
    }

    #[tokio::test]
    async fn test_version_is_passed_through() {
        let oracle = MockPriceOracle::default().with_version(42);
        let service = FundingService::new(owner(), oracle, InMemoryTransfer::new());
        assert_eq!(service.version().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_concurrent_funding_loses_no_updates() {
        let (service, _, _) = service();
        let service = Arc::new(service);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.fund(&funder(i % 4), SEND_VALUE).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(service.total_balance().await, 32 * SEND_VALUE);
        assert_eq!(service.funders().await.len(), 32);
        assert_eq!(service.amount_funded(&funder(0)).await, 8 * SEND_VALUE);
    }
}
