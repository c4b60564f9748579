pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ConfiguredOracle, HttpPriceOracle, InMemoryTransfer, MockPriceOracle};
pub use config::toml_config::TomlConfig;
pub use crate::core::{funding::FundingService, ledger::ContributionLedger};
pub use domain::model::{Address, PriceSnapshot, UsdWei, Wei};
pub use domain::ports::{PriceOracle, ValueTransfer};
pub use utils::error::{FundMeError, Result};
