// Adapters layer: concrete implementations of the domain ports (price feeds, value transfer).

pub mod oracle;
pub mod transfer;

pub use oracle::{ConfiguredOracle, HttpPriceOracle, MockPriceOracle};
pub use transfer::InMemoryTransfer;
