use crate::commands::{run_against_database, to_data, CommandResult, EXIT_OPERATION};
use shopsignal_engine::{EngineServices, Repositories};

pub fn run(product_name: Option<String>) -> CommandResult {
    run_against_database("sales", |config, pool| async move {
        let services = EngineServices::build(&config, Repositories::sql(&pool))
            .map_err(|error| ("config_validation", error.to_string(), EXIT_OPERATION))?;

        let report = services
            .sales_reports
            .report(product_name.as_deref())
            .await
            .map_err(|error| ("sales_query", error.to_string(), EXIT_OPERATION))?;

        let scope = product_name.as_deref().unwrap_or("all products");
        let message = format!(
            "{} orders, {} units, revenue {} for {scope}",
            report.summary.total_orders, report.summary.total_quantity, report.summary.total_revenue
        );
        Ok(CommandResult::success_with_data("sales", message, Some(to_data(&report)?)))
    })
}
