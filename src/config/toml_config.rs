use crate::core::rule::ValidationRule;
use crate::core::rule_set::ensure_disjoint;
use crate::domain::model::{BodySpec, FieldSchema, OutputSpec};
use crate::utils::error::{ContractError, Result};
use crate::utils::validation::{validate_non_empty_list, validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    pub name: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputRuleConfig>,
}

/// One `[[output]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRuleConfig {
    pub status: String,
    pub headers: Option<FieldSchema>,
    pub body: Option<BodySpec>,
}

impl OutputRuleConfig {
    pub fn spec(&self) -> OutputSpec {
        OutputSpec {
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    pub fn to_rule(&self) -> Result<ValidationRule> {
        ValidationRule::new(self.status.clone(), self.spec())
    }
}

impl ContractConfig {
    /// Loads a contract from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ContractError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses a contract from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ContractError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures<'_>| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Builds every rule in declaration order.
    pub fn build_rules(&self) -> Result<Vec<ValidationRule>> {
        self.output.iter().map(OutputRuleConfig::to_rule).collect()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed contract")
    }
}

impl Validate for ContractConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_list("output", &self.output)?;
        for (i, entry) in self.output.iter().enumerate() {
            validate_non_empty_string(&format!("output[{}].status", i), &entry.status)?;
        }

        let rules = self.build_rules()?;
        ensure_disjoint(&rules)
    }
}
