use crate::adapters::oracle::{
    ConfiguredOracle, HttpPriceOracle, MockPriceOracle, MOCK_DECIMALS, MOCK_INITIAL_ANSWER,
    MOCK_VERSION,
};
use crate::config::toml_config::TomlConfig;
use crate::core::funding::FundingService;
use crate::domain::ports::ValueTransfer;
use crate::utils::error::{FundMeError, Result};
use crate::utils::validation::Validate;
use std::time::Duration;

/// Networks that get a mock price feed when none is configured.
pub const LOCAL_NETWORKS: &[&str] = &["local", "localhost", "anvil", "hardhat"];

pub const DEFAULT_FEED_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSettings {
    Mock {
        decimals: u8,
        initial_answer: i128,
        version: u64,
    },
    Http {
        endpoint: String,
        timeout: Duration,
    },
}

pub fn is_local_network(name: &str) -> bool {
    LOCAL_NETWORKS
        .iter()
        .any(|local| local.eq_ignore_ascii_case(name.trim()))
}

/// Picks the price feed for the configured network.
pub fn resolve_feed(config: &TomlConfig) -> Result<FeedSettings> {
    let network = config.network_name();

    let Some(feed) = &config.price_feed else {
        if is_local_network(network) {
            return Ok(FeedSettings::Mock {
                decimals: MOCK_DECIMALS,
                initial_answer: MOCK_INITIAL_ANSWER,
                version: MOCK_VERSION,
            });
        }
        return Err(FundMeError::MissingConfigError {
            field: format!("price_feed (required for network '{}')", network),
        });
    };

    match feed.r#type.as_str() {
        "mock" => Ok(FeedSettings::Mock {
            decimals: feed.decimals.unwrap_or(MOCK_DECIMALS),
            initial_answer: feed
                .initial_answer
                .map(i128::from)
                .unwrap_or(MOCK_INITIAL_ANSWER),
            version: feed.version.unwrap_or(MOCK_VERSION),
        }),
        "http" => {
            let endpoint = feed
                .endpoint
                .clone()
                .ok_or_else(|| FundMeError::MissingConfigError {
                    field: "price_feed.endpoint".to_string(),
                })?;
            Ok(FeedSettings::Http {
                endpoint,
                timeout: Duration::from_secs(
                    feed.timeout_seconds.unwrap_or(DEFAULT_FEED_TIMEOUT_SECONDS),
                ),
            })
        }
        other => Err(FundMeError::InvalidConfigValueError {
            field: "price_feed.type".to_string(),
            value: other.to_string(),
            reason: "Supported types: mock, http".to_string(),
        }),
    }
}

pub fn build_oracle(settings: &FeedSettings) -> Result<ConfiguredOracle> {
    match settings {
        FeedSettings::Mock {
            decimals,
            initial_answer,
            version,
        } => Ok(ConfiguredOracle::Mock(
            MockPriceOracle::new(*decimals, *initial_answer).with_version(*version),
        )),
        FeedSettings::Http { endpoint, timeout } => Ok(ConfiguredOracle::Http(
            HttpPriceOracle::new(endpoint.clone(), *timeout)?,
        )),
    }
}

/// Validates the configuration and wires up a service for its network.
pub fn deploy<T: ValueTransfer>(
    config: &TomlConfig,
    transfer: T,
) -> Result<FundingService<ConfiguredOracle, T>> {
    config.validate()?;

    let settings = resolve_feed(config)?;
    match &settings {
        FeedSettings::Mock { initial_answer, .. } => tracing::info!(
            "🧪 Network '{}': using mock price feed (answer {})",
            config.network_name(),
            initial_answer
        ),
        FeedSettings::Http { endpoint, .. } => tracing::info!(
            "📡 Network '{}': using price feed at {}",
            config.network_name(),
            endpoint
        ),
    }

    let oracle = build_oracle(&settings)?;
    Ok(FundingService::with_minimum_usd(
        config.owner(),
        oracle,
        transfer,
        config.minimum_usd()?,
    ))
}
