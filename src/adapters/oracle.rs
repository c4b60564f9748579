use crate::domain::model::PriceSnapshot;
use crate::domain::ports::PriceOracle;
use crate::utils::error::{FundMeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::RwLock;
use std::time::Duration;

pub const MOCK_DECIMALS: u8 = 8;
pub const MOCK_INITIAL_ANSWER: i128 = 200_000_000_000;
pub const MOCK_VERSION: u64 = 4;

/// Price feed with a fixed, manually updatable answer. Used on local
/// networks and in tests.
#[derive(Debug)]
pub struct MockPriceOracle {
    answer: RwLock<i128>,
    decimals: u8,
    version: u64,
}

impl MockPriceOracle {
    pub fn new(decimals: u8, initial_answer: i128) -> Self {
        Self {
            answer: RwLock::new(initial_answer),
            decimals,
            version: MOCK_VERSION,
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn update_answer(&self, answer: i128) -> Result<()> {
        let mut current = self.answer.write().map_err(|_| FundMeError::Oracle {
            message: "mock answer lock poisoned".to_string(),
        })?;
        tracing::debug!("Mock price feed answer {} -> {}", *current, answer);
        *current = answer;
        Ok(())
    }
}

impl Default for MockPriceOracle {
    fn default() -> Self {
        Self::new(MOCK_DECIMALS, MOCK_INITIAL_ANSWER)
    }
}

#[async_trait]
impl PriceOracle for MockPriceOracle {
    async fn read(&self) -> Result<PriceSnapshot> {
        let rate = *self.answer.read().map_err(|_| FundMeError::Oracle {
            message: "mock answer lock poisoned".to_string(),
        })?;

        Ok(PriceSnapshot {
            rate,
            decimals: self.decimals,
            version: self.version,
        })
    }
}

/// Reads a JSON snapshot (`{"rate": .., "decimals": .., "version": ..}`) over HTTP.
///
/// One request per read, no retries.
#[derive(Debug, Clone)]
pub struct HttpPriceOracle {
    client: Client,
    endpoint: String,
}

impl HttpPriceOracle {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn read(&self) -> Result<PriceSnapshot> {
        tracing::debug!("Reading price feed from: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        tracing::debug!("Price feed response status: {}", status);
        if !status.is_success() {
            return Err(FundMeError::Oracle {
                message: format!("price feed returned HTTP {}", status),
            });
        }

        let snapshot: PriceSnapshot = response.json().await?;
        Ok(snapshot)
    }
}

/// Oracle chosen from configuration at startup.
#[derive(Debug)]
pub enum ConfiguredOracle {
    Mock(MockPriceOracle),
    Http(HttpPriceOracle),
}

#[async_trait]
impl PriceOracle for ConfiguredOracle {
    async fn read(&self) -> Result<PriceSnapshot> {
        match self {
            ConfiguredOracle::Mock(oracle) => oracle.read().await,
            ConfiguredOracle::Http(oracle) => oracle.read().await,
        }
    }
}
