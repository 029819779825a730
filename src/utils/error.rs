use thiserror::Error;

/// Documentation pointer appended to configuration errors.
pub const HELP_MSG: &str = " -> see: https://github.com/koajs/joi-router/#validating-output";

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("invalid status code: {status}{help}", help = HELP_MSG)]
    InvalidStatusExpression { status: String },

    #[error("invalid status code: {code} must be between 100-599")]
    InvalidStatusCode { code: String },

    #[error(
        "output validation key: {status} must have either a body or headers validator specified"
    )]
    MissingSpec { status: String },

    #[error("output validation keys {first} and {second} overlap{help}", help = HELP_MSG)]
    OverlappingRules { first: String, second: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validator returned an unusable result: {message}")]
    MalformedResult { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ContractError {
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            ContractError::MalformedResult { .. } | ContractError::IoError(_)
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ContractError::InvalidStatusExpression { .. }
            | ContractError::InvalidStatusCode { .. } => {
                "Use comma separated codes (404), ranges (200-299) or the wildcard (*)"
            }
            ContractError::MissingSpec { .. } => {
                "Declare a `body` or `headers` schema for every [[output]] entry"
            }
            ContractError::OverlappingRules { .. } => {
                "Split the status ranges so that every status code matches at most one rule"
            }
            ContractError::ConfigError { .. }
            | ContractError::InvalidConfigValueError { .. } => {
                "Check the contract file against the documented format"
            }
            ContractError::MalformedResult { .. } => {
                "The schema validator broke its contract; this is a bug in the validator"
            }
            ContractError::IoError(_) => "Make sure the file exists and is readable",
            ContractError::SerializationError(_) => "Make sure the file contains valid JSON",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ContractError::OverlappingRules { first, second } => {
                format!("Rules '{}' and '{}' both match some status codes", first, second)
            }
            ContractError::IoError(e) => format!("Could not read file: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ContractError>;
