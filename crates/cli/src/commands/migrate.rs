use crate::commands::{run_against_database, CommandResult};
use shopsignal_db::migrations;

pub fn run() -> CommandResult {
    run_against_database("migrate", |_config, pool| async move {
        let applied = migrations::applied_count(&pool).await.unwrap_or_default();
        Ok(CommandResult::success(
            "migrate",
            format!("applied pending migrations ({applied} of {} applied)", migrations::known_count()),
        ))
    })
}
