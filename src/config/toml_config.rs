use crate::core::price::MAX_FEED_DECIMALS;
use crate::domain::model::{parse_units, Address, UsdWei, DEFAULT_MINIMUM_USD};
use crate::utils::error::{FundMeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub network: NetworkConfig,
    pub price_feed: Option<PriceFeedConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub owner: String,
    /// Decimal USD amount, e.g. "5" or "5.00"
    pub minimum_usd: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    pub r#type: String,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub decimals: Option<u8>,
    pub initial_answer: Option<i64>,
    pub version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FundMeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FundMeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OWNER_ADDRESS})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FundMeError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_env_resolved("service.owner", &self.service.owner)?;
        validation::validate_address("service.owner", &self.service.owner)?;
        validation::validate_non_empty_string("network.name", &self.network.name)?;

        let minimum = self.minimum_usd()?;
        if minimum == 0 {
            return Err(FundMeError::InvalidConfigValueError {
                field: "service.minimum_usd".to_string(),
                value: "0".to_string(),
                reason: "Minimum contribution must be greater than zero".to_string(),
            });
        }

        if let Some(feed) = &self.price_feed {
            match feed.r#type.as_str() {
                "mock" => {
                    if let Some(decimals) = feed.decimals {
                        validation::validate_range(
                            "price_feed.decimals",
                            decimals,
                            0,
                            MAX_FEED_DECIMALS,
                        )?;
                    }
                    if let Some(answer) = feed.initial_answer {
                        if answer <= 0 {
                            return Err(FundMeError::InvalidConfigValueError {
                                field: "price_feed.initial_answer".to_string(),
                                value: answer.to_string(),
                                reason: "Initial answer must be positive".to_string(),
                            });
                        }
                    }
                }
                "http" => {
                    let endpoint =
                        validation::validate_required_field("price_feed.endpoint", &feed.endpoint)?;
                    validation::validate_env_resolved("price_feed.endpoint", endpoint)?;
                    validation::validate_url("price_feed.endpoint", endpoint)?;
                    if let Some(timeout) = feed.timeout_seconds {
                        validation::validate_range("price_feed.timeout_seconds", timeout, 1, 300)?;
                    }
                }
                other => {
                    return Err(FundMeError::InvalidConfigValueError {
                        field: "price_feed.type".to_string(),
                        value: other.to_string(),
                        reason: "Supported types: mock, http".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn owner(&self) -> Address {
        Address::new(self.service.owner.trim())
    }

    /// 最低捐款 (USD, 18 位小數)
    pub fn minimum_usd(&self) -> Result<UsdWei> {
        match &self.service.minimum_usd {
            None => Ok(DEFAULT_MINIMUM_USD),
            Some(raw) => parse_units(raw).ok_or_else(|| FundMeError::InvalidConfigValueError {
                field: "service.minimum_usd".to_string(),
                value: raw.clone(),
                reason: "Expected a non-negative decimal number with at most 18 decimals"
                    .to_string(),
            }),
        }
    }

    pub fn network_name(&self) -> &str {
        &self.network.name
    }

    pub fn verbose_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
