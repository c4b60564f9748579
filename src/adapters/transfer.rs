use crate::domain::model::{Address, Wei};
use crate::domain::ports::ValueTransfer;
use crate::utils::error::{FundMeError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Credits payouts to an in-process account map.
#[derive(Debug, Default)]
pub struct InMemoryTransfer {
    accounts: Mutex<HashMap<Address, Wei>>,
    failing: AtomicBool,
}

impl InMemoryTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every transfer is rejected and nothing is credited.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn received(&self, address: &Address) -> Wei {
        let accounts = self.accounts.lock().await;
        accounts.get(address).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ValueTransfer for InMemoryTransfer {
    async fn transfer(&self, to: &Address, amount: Wei) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(FundMeError::TransferFailed {
                to: to.to_string(),
                amount,
                reason: "recipient rejected the transfer".to_string(),
            });
        }

        let mut accounts = self.accounts.lock().await;
        let balance = accounts.entry(to.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| FundMeError::TransferFailed {
                to: to.to_string(),
                amount,
                reason: "recipient balance overflow".to_string(),
            })?;

        tracing::debug!("Credited {} wei to {}", amount, to);
        Ok(())
    }
}
