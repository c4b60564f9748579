use crate::core::funding::FundingService;
use crate::domain::model::{format_units, parse_units, Address, LedgerSnapshot};
use crate::domain::ports::{PriceOracle, ValueTransfer};
use crate::utils::error::{FundMeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// `amount` is in whole native units ("0.1")
    Fund { caller: String, amount: String },
    Withdraw { caller: String },
    Version,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Fund { .. } => "fund",
            Step::Withdraw { .. } => "withdraw",
            Step::Version => "version",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: usize,
    pub action: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub steps: Vec<StepOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    pub final_ledger: LedgerSnapshot,
}

impl ReplayScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Runs each step in order. A failing step is reported and the replay goes on.
pub async fn run_script<O: PriceOracle, T: ValueTransfer>(
    service: &FundingService<O, T>,
    script: &ReplayScript,
) -> Result<ReplayReport> {
    let mut steps = Vec::with_capacity(script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        tracing::debug!("Replaying step {} ({})", index, step.name());

        let outcome = match run_step(service, step).await {
            Ok(value) => StepOutcome {
                step: index,
                action: step.name().to_string(),
                success: true,
                result: Some(value),
                error: None,
            },
            Err(e) => {
                tracing::warn!("Step {} ({}) failed: {}", index, step.name(), e);
                StepOutcome {
                    step: index,
                    action: step.name().to_string(),
                    success: false,
                    result: None,
                    error: Some(e.user_friendly_message()),
                }
            }
        };
        steps.push(outcome);
    }

    let succeeded = steps.iter().filter(|s| s.success).count();
    let failed = steps.len() - succeeded;
    tracing::info!("Replay finished: {} succeeded, {} failed", succeeded, failed);

    Ok(ReplayReport {
        steps,
        succeeded,
        failed,
        final_ledger: service.snapshot().await,
    })
}

async fn run_step<O: PriceOracle, T: ValueTransfer>(
    service: &FundingService<O, T>,
    step: &Step,
) -> Result<serde_json::Value> {
    match step {
        Step::Fund { caller, amount } => {
            let wei = parse_units(amount).ok_or_else(|| FundMeError::InvalidAmount {
                message: format!("'{}' is not a valid amount", amount),
            })?;
            let receipt = service.fund(&Address::new(caller.as_str()), wei).await?;
            Ok(serde_json::json!({
                "contributor": receipt.contributor,
                "amount": format_units(receipt.amount),
                "usd_value": format_units(receipt.usd_value),
                "contributor_total": format_units(receipt.contributor_total),
            }))
        }
        Step::Withdraw { caller } => {
            let receipt = service.withdraw(&Address::new(caller.as_str())).await?;
            Ok(serde_json::json!({
                "owner": receipt.owner,
                "amount": format_units(receipt.amount),
                "contributions_cleared": receipt.contributions_cleared,
            }))
        }
        Step::Version => Ok(serde_json::json!({ "version": service.version().await? })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryTransfer, MockPriceOracle};

    #[tokio::test]
    async fn test_replay_reports_each_step() {
        let service = FundingService::new(
            Address::from("0xowner"),
            MockPriceOracle::default(),
            InMemoryTransfer::new(),
        );
        let script = ReplayScript::from_json_str(
            r#"{
                "steps": [
                    {"action": "fund", "caller": "0xa", "amount": "0.1"},
                    {"action": "fund", "caller": "0xb", "amount": "0.001"},
                    {"action": "fund", "caller": "0xc", "amount": "abc"},
                    {"action": "withdraw", "caller": "0xa"},
                    {"action": "version"}
                ]
            }"#,
        )
        .unwrap();

        let report = run_script(&service, &script).await.unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 3);
        assert!(report.steps[0].success);
        assert_eq!(
            report.steps[1].error.as_deref(),
            Some("You need to spend more ETH!")
        );
        assert_eq!(report.steps[3].error.as_deref(), Some("Only the owner can withdraw"));
        assert_eq!(report.steps[4].result, Some(serde_json::json!({"version": 4})));
        assert_eq!(report.final_ledger.total_balance, 100_000_000_000_000_000);
    }

    #[test]
    fn test_unknown_action_is_a_parse_error() {
        let err = ReplayScript::from_json_str(r#"{"steps": [{"action": "refund"}]}"#).unwrap_err();
        assert!(matches!(err, FundMeError::SerializationError(_)));
    }
}
