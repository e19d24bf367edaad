use crate::commands::{run_against_database, to_data, CommandResult, EXIT_OPERATION};
use shopsignal_db::{DemoDataset, SeedResult};

pub fn run() -> CommandResult {
    run_against_database("seed", |_config, pool| async move {
        let seeded = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_OPERATION))?;

        Ok(CommandResult::success_with_data("seed", seed_message(&seeded), Some(to_data(&seeded)?)))
    })
}

fn seed_message(result: &SeedResult) -> String {
    if result.products_seeded == 0 && result.sales_seeded == 0 {
        return format!("demo dataset already present ({} rows left untouched)", result.skipped);
    }
    format!(
        "demo dataset loaded: {} products, {} sales ({} rows already present)",
        result.products_seeded, result.sales_seeded, result.skipped
    )
}
