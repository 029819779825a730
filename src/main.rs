use clap::Parser;
use output_validation::utils::{logger, validation::Validate};
use output_validation::{
    CliConfig, ContractConfig, HttpResponse, OutputValidator, RuleStringValidator,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // Logging
    logger::init_cli_logger(config.verbose);

    tracing::info!("📁 Loading output contract from: {}", config.config);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // Load and check the contract
    let contract = match ContractConfig::from_file(&config.config) {
        Ok(contract) => contract,
        Err(e) => {
            eprintln!("❌ Failed to load contract '{}': {}", config.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if let Err(e) = contract.validate() {
        tracing::error!("❌ Contract validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let validator = if config.bail {
        RuleStringValidator::bail()
    } else {
        RuleStringValidator::new()
    };
    let output_validator = OutputValidator::from_config(&contract, Arc::new(validator))?;

    tracing::info!(
        "✅ Contract '{}' is valid ({} rules)",
        contract.display_name(),
        output_validator.rules().len()
    );
    for rule in output_validator.rules() {
        let ranges: Vec<String> = rule.ranges().iter().map(ToString::to_string).collect();
        tracing::debug!("  {} -> [{}]", rule, ranges.join(", "));
    }

    let Some(response_path) = config.response.as_deref() else {
        println!("✅ Contract '{}' is valid", contract.display_name());
        return Ok(());
    };

    // Validate the response
    let raw = std::fs::read_to_string(response_path)?;
    let mut response = HttpResponse::from_json_str(&raw)?;

    match output_validator.validate(&mut response).await? {
        None => {
            tracing::info!("✅ Response with status {} satisfies the contract", response.status);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Some(failure) => {
            tracing::error!("❌ Response with status {} violates the contract", response.status);
            eprintln!("❌ {}", failure);
            std::process::exit(2);
        }
    }

    Ok(())
}
