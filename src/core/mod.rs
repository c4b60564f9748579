pub mod funding;
pub mod ledger;
pub mod price;

pub use crate::domain::model::{Address, PriceSnapshot, UsdWei, Wei};
pub use crate::domain::ports::{PriceOracle, ValueTransfer};
pub use crate::utils::error::Result;
