pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::RuleStringValidator;
pub use config::ContractConfig;
pub use crate::core::{range::StatusRange, rule::ValidationRule, rule_set::OutputValidator};
pub use domain::model::{BodySpec, FieldSchema, HttpResponse, OutputSpec, ValidationFailure};
pub use domain::ports::{ResponseContext, SchemaValidator};
pub use utils::error::{ContractError, Result};
