use crate::commands::{
    run_against_database, to_data, CommandResult, StepFailure, EXIT_INVALID_INPUT, EXIT_OPERATION,
};
use shopsignal_core::domain::product::ProductId;
use shopsignal_core::scoring::EngagementTier;
use shopsignal_engine::{EngineServices, Repositories};

/// Lists scores ranked by normalized score, or one product when `product` is set.
pub fn run(product: Option<String>, limit: Option<usize>) -> CommandResult {
    run_against_database("scores", |config, pool| async move {
        let services = EngineServices::build(&config, Repositories::sql(&pool))
            .map_err(|error| ("config_validation", error.to_string(), EXIT_OPERATION))?;

        if let Some(raw_id) = product {
            let product_id = ProductId::parse(raw_id)
                .map_err(|error| ("invalid_input", error.to_string(), EXIT_INVALID_INPUT))?;
            let score = services.tracker.product_score(&product_id).await.map_err(query_failed)?;
            return Ok(match score {
                Some(score) => CommandResult::success_with_data(
                    "scores",
                    format!(
                        "product {} scored {} ({:?})",
                        product_id,
                        score.normalized_score,
                        EngagementTier::from_score(score.normalized_score)
                    ),
                    Some(to_data(&score)?),
                ),
                None => CommandResult::success(
                    "scores",
                    format!("product {product_id} has no recorded engagement"),
                ),
            });
        }

        let mut ranked = services.tracker.ranked_scores().await.map_err(query_failed)?;
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        Ok(CommandResult::success_with_data(
            "scores",
            format!("{} scored products", ranked.len()),
            Some(to_data(&ranked)?),
        ))
    })
}

fn query_failed(error: impl ToString) -> StepFailure {
    ("score_query", error.to_string(), EXIT_OPERATION)
}
