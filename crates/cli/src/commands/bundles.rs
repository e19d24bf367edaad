use crate::commands::{
    run_against_database, to_data, CommandResult, EXIT_INVALID_INPUT, EXIT_OPERATION,
};
use shopsignal_engine::{EngineServices, Repositories};

pub fn run(min_frequency: Option<u32>) -> CommandResult {
    if min_frequency == Some(0) {
        return CommandResult::failure(
            "bundles",
            "invalid_input",
            "min frequency must be at least 1".to_owned(),
            EXIT_INVALID_INPUT,
        );
    }

    run_against_database("bundles", |config, pool| async move {
        let services = EngineServices::build(&config, Repositories::sql(&pool))
            .map_err(|error| ("config_validation", error.to_string(), EXIT_OPERATION))?;

        let threshold = min_frequency.unwrap_or(services.bundles.default_min_frequency());
        let bundles = services
            .bundles
            .suggestions(Some(threshold))
            .await
            .map_err(|error| ("bundle_analysis", error.to_string(), EXIT_OPERATION))?;

        let keys: Vec<String> = bundles.iter().map(|pair| pair.key().canonical()).collect();
        let message = if keys.is_empty() {
            format!("no product pairs bought together at least {threshold} times")
        } else {
            format!("{} bundles (min frequency {threshold}): {}", keys.len(), keys.join(", "))
        };
        Ok(CommandResult::success_with_data("bundles", message, Some(to_data(&bundles)?)))
    })
}
