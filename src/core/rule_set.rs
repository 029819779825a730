use crate::config::toml_config::ContractConfig;
use crate::core::rule::{overlaps, ValidationRule};
use crate::domain::model::ValidationFailure;
use crate::domain::ports::{ResponseContext, SchemaValidator};
use crate::utils::error::{ContractError, Result};
use std::sync::Arc;

/// A conflict-free set of output rules bound to a schema validator.
#[derive(Clone)]
pub struct OutputValidator {
    rules: Vec<ValidationRule>,
    validator: Arc<dyn SchemaValidator>,
}

impl OutputValidator {
    /// Rejects the rule set if any two rules can match the same status.
    pub fn new(rules: Vec<ValidationRule>, validator: Arc<dyn SchemaValidator>) -> Result<Self> {
        ensure_disjoint(&rules)?;
        tracing::debug!("Output validator ready with {} rules", rules.len());
        Ok(Self { rules, validator })
    }

    pub fn from_config(
        config: &ContractConfig,
        validator: Arc<dyn SchemaValidator>,
    ) -> Result<Self> {
        Self::new(config.build_rules()?, validator)
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    pub fn matching<'a, C: ResponseContext + ?Sized>(
        &'a self,
        ctx: &'a C,
    ) -> impl Iterator<Item = &'a ValidationRule> + 'a {
        self.rules.iter().filter(move |rule| rule.matches(ctx))
    }

    /// Runs every rule matching the response's status, stopping at the first failure.
    ///
    /// A response no rule matches passes unchanged.
    pub async fn validate<C: ResponseContext + ?Sized>(
        &self,
        ctx: &mut C,
    ) -> Result<Option<ValidationFailure>> {
        let status = ctx.status();
        let matched: Vec<&ValidationRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches_status(status))
            .collect();

        if matched.is_empty() {
            tracing::debug!("No output rule for status {}", status);
            return Ok(None);
        }

        for rule in matched {
            if let Some(failure) = rule.validate_output(&mut *ctx, self.validator.as_ref()).await? {
                tracing::warn!(
                    "Response with status {} failed output rule {}: {}",
                    status,
                    rule,
                    failure
                );
                return Ok(Some(failure));
            }
        }

        Ok(None)
    }
}

impl std::fmt::Debug for OutputValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputValidator")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

/// Pairwise overlap check, run once when the rule set is built.
pub fn ensure_disjoint(rules: &[ValidationRule]) -> Result<()> {
    for (i, first) in rules.iter().enumerate() {
        for second in &rules[i + 1..] {
            if overlaps(first, second) {
                return Err(ContractError::OverlappingRules {
                    first: first.status().to_string(),
                    second: second.status().to_string(),
                });
            }
        }
    }
    Ok(())
}
