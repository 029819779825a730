pub mod range;
pub mod rule;
pub mod rule_set;

pub use crate::domain::model::{BodySpec, FieldSchema, OutputSpec, ValidationFailure};
pub use crate::domain::ports::{ResponseContext, SchemaValidator};
pub use crate::utils::error::Result;
