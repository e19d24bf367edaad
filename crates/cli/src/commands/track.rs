use crate::commands::{
    run_against_database, to_data, CommandResult, EXIT_INVALID_INPUT, EXIT_OPERATION,
};
use shopsignal_core::domain::event::EventType;
use shopsignal_core::domain::product::ProductId;
use shopsignal_engine::{EngineServices, Repositories};

/// Records one interaction and reports the product's updated score.
pub fn run(product: String, event_type: String, user: Option<String>) -> CommandResult {
    let parsed = ProductId::parse(product)
        .and_then(|product_id| Ok((product_id, event_type.parse::<EventType>()?)));
    let (product_id, event_type) = match parsed {
        Ok(parsed) => parsed,
        Err(error) => {
            return CommandResult::failure(
                "track",
                "invalid_input",
                error.to_string(),
                EXIT_INVALID_INPUT,
            );
        }
    };

    run_against_database("track", |config, pool| async move {
        let services = EngineServices::build(&config, Repositories::sql(&pool))
            .map_err(|error| ("config_validation", error.to_string(), EXIT_OPERATION))?;

        let score = services
            .tracker
            .record(product_id, event_type, user, None)
            .await
            .map_err(|error| ("tracking", error.to_string(), EXIT_OPERATION))?;

        Ok(CommandResult::success_with_data(
            "track",
            format!(
                "recorded {event_type} for product {}: raw {} normalized {}",
                score.product_id, score.raw_score, score.normalized_score
            ),
            Some(to_data(&score)?),
        ))
    })
}
