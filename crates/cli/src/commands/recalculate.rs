use crate::commands::{run_against_database, CommandResult, EXIT_OPERATION};
use shopsignal_engine::{EngineServices, Repositories};

/// Rewrites every normalized score with the configured threshold.
pub fn run() -> CommandResult {
    run_against_database("recalculate", |config, pool| async move {
        let services = EngineServices::build(&config, Repositories::sql(&pool))
            .map_err(|error| ("config_validation", error.to_string(), EXIT_OPERATION))?;

        let rewritten = services
            .tracker
            .try_recalculate_all()
            .await
            .map_err(|error| ("recalculation", error.to_string(), EXIT_OPERATION))?;

        Ok(CommandResult::success(
            "recalculate",
            format!(
                "recalculated {rewritten} scores with threshold {}",
                config.scoring.max_score_threshold
            ),
        ))
    })
}
