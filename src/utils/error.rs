use thiserror::Error;

#[derive(Error, Debug)]
pub enum FundMeError {
    #[error("Contribution too small: {usd_value} USD-wei is below the minimum of {minimum_usd}")]
    InsufficientContribution { usd_value: u128, minimum_usd: u128 },

    #[error("Caller {caller} is not the owner")]
    Unauthorized { caller: String },

    #[error("Transfer of {amount} wei to {to} failed: {reason}")]
    TransferFailed {
        to: String,
        amount: u128,
        reason: String,
    },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Price oracle error: {message}")]
    Oracle { message: String },

    #[error("Arithmetic overflow while {operation}")]
    ArithmeticOverflow { operation: String },

    #[error("Price feed request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Policy,
    Authorization,
    Settlement,
    Oracle,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FundMeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FundMeError::InsufficientContribution { .. } | FundMeError::InvalidAmount { .. } => {
                ErrorCategory::Policy
            }
            FundMeError::Unauthorized { .. } => ErrorCategory::Authorization,
            FundMeError::TransferFailed { .. } | FundMeError::ArithmeticOverflow { .. } => {
                ErrorCategory::Settlement
            }
            FundMeError::Oracle { .. } | FundMeError::HttpError(_) => ErrorCategory::Oracle,
            FundMeError::ConfigValidationError { .. }
            | FundMeError::InvalidConfigValueError { .. }
            | FundMeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FundMeError::IoError(_) | FundMeError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Policy => ErrorSeverity::Low,
            ErrorCategory::Oracle => ErrorSeverity::Medium,
            ErrorCategory::Authorization | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Settlement | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FundMeError::InsufficientContribution { .. } => {
                "Send a larger amount so its USD value reaches the minimum"
            }
            FundMeError::InvalidAmount { .. } => "Use a contribution amount greater than zero",
            FundMeError::Unauthorized { .. } => "Only the owner address may withdraw funds",
            FundMeError::TransferFailed { .. } => {
                "Funds are still recorded; check the payout destination and retry the withdrawal"
            }
            FundMeError::ArithmeticOverflow { .. } => "Use a smaller amount",
            FundMeError::Oracle { .. } | FundMeError::HttpError(_) => {
                "Check that the price feed is reachable and reports a positive rate"
            }
            FundMeError::ConfigValidationError { .. }
            | FundMeError::InvalidConfigValueError { .. }
            | FundMeError::MissingConfigError { .. } => {
                "Fix the configuration file and run again"
            }
            FundMeError::IoError(_) => "Check file paths and permissions",
            FundMeError::SerializationError(_) => "Check that the input is valid JSON",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FundMeError::InsufficientContribution { .. } => {
                "You need to spend more ETH!".to_string()
            }
            FundMeError::Unauthorized { .. } => "Only the owner can withdraw".to_string(),
            FundMeError::TransferFailed { .. } => "Withdrawal could not be paid out".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FundMeError>;
