use crate::domain::model::{Address, PriceSnapshot, Wei};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only source of the native/USD exchange rate.
///
/// A single call is one attempt; retry or caching belongs to the implementation.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn read(&self) -> Result<PriceSnapshot>;
}

/// Moves value out of the service. `Ok(())` means the payout is final.
#[async_trait]
pub trait ValueTransfer: Send + Sync {
    async fn transfer(&self, to: &Address, amount: Wei) -> Result<()>;
}

#[async_trait]
impl<T: PriceOracle + ?Sized> PriceOracle for Arc<T> {
    async fn read(&self) -> Result<PriceSnapshot> {
        (**self).read().await
    }
}

#[async_trait]
impl<T: ValueTransfer + ?Sized> ValueTransfer for Arc<T> {
    async fn transfer(&self, to: &Address, amount: Wei) -> Result<()> {
        (**self).transfer(to, amount).await
    }
}
