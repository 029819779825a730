// Adapters layer: concrete implementations of the domain ports.

pub mod rule_string;

pub use rule_string::RuleStringValidator;
