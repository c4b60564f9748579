use crate::domain::model::{Address, ContributorBalance, LedgerSnapshot, Wei};
use crate::utils::error::{FundMeError, Result};
use std::collections::{HashMap, HashSet};

/// Per-contributor balances plus the order in which contributions arrived.
///
/// `contributors` gets one entry per recorded contribution, so an address that
/// funds twice appears twice. Only `clear` removes entries, and it removes all
/// of them.
#[derive(Debug, Default, Clone)]
pub struct ContributionLedger {
    balances: HashMap<Address, Wei>,
    contributors: Vec<Address>,
    total: Wei,
}

impl ContributionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to `contributor`'s balance and appends them to the order.
    ///
    /// Fails without touching state if `amount` is zero or a sum would overflow.
    pub fn record(&mut self, contributor: &Address, amount: Wei) -> Result<Wei> {
        if amount == 0 {
            return Err(FundMeError::InvalidAmount {
                message: "contribution must be greater than zero".to_string(),
            });
        }

        let current = self.balance_of(contributor);
        let overflow = || FundMeError::ArithmeticOverflow {
            operation: format!("recording {} wei for {}", amount, contributor),
        };
        let updated = current.checked_add(amount).ok_or_else(overflow)?;
        let total = self.total.checked_add(amount).ok_or_else(overflow)?;

        self.balances.insert(contributor.clone(), updated);
        self.contributors.push(contributor.clone());
        self.total = total;

        Ok(updated)
    }

    pub fn total_balance(&self) -> Wei {
        self.total
    }

    pub fn balance_of(&self, contributor: &Address) -> Wei {
        self.balances.get(contributor).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.balances.clear();
        self.contributors.clear();
        self.total = 0;
    }

    pub fn contributors(&self) -> &[Address] {
        &self.contributors
    }

    pub fn contributor_at(&self, index: usize) -> Option<&Address> {
        self.contributors.get(index)
    }

    /// Number of recorded contributions, duplicates included.
    pub fn contribution_count(&self) -> usize {
        self.contributors.len()
    }

    pub fn distinct_contributors(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut seen = HashSet::new();
        let balances = self
            .contributors
            .iter()
            .filter(|addr| seen.insert(*addr))
            .map(|addr| ContributorBalance {
                contributor: addr.clone(),
                amount: self.balance_of(addr),
            })
            .collect();

        LedgerSnapshot {
            total_balance: self.total,
            contribution_count: self.contributors.len(),
            balances,
        }
    }
}
