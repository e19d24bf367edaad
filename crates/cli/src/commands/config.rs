use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use shopsignal_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// Renders the effective configuration with the source of every value.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_keys) in effective_values(&config) {
        let source =
            field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key_path, &value, source));
    }

    lines.join("\n")
}

type Entry = (&'static str, String, &'static [&'static str]);

fn entry(key_path: &'static str, value: String, env_keys: &'static [&'static str]) -> Entry {
    (key_path, value, env_keys)
}

fn effective_values(config: &AppConfig) -> Vec<Entry> {
    let points = &config.scoring.points;
    vec![
        entry("database.url", config.database.url.clone(), &["SHOPSIGNAL_DATABASE_URL"]),
        entry(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["SHOPSIGNAL_DATABASE_MAX_CONNECTIONS"],
        ),
        entry(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["SHOPSIGNAL_DATABASE_TIMEOUT_SECS"],
        ),
        entry(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["SHOPSIGNAL_SERVER_BIND_ADDRESS"],
        ),
        entry("server.port", config.server.port.to_string(), &["SHOPSIGNAL_SERVER_PORT"]),
        entry(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["SHOPSIGNAL_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        entry(
            "scoring.max_score_threshold",
            config.scoring.max_score_threshold.to_string(),
            &["SHOPSIGNAL_SCORING_MAX_SCORE_THRESHOLD"],
        ),
        entry(
            "scoring.abandon_timeout_secs",
            config.scoring.abandon_timeout_secs.to_string(),
            &["SHOPSIGNAL_SCORING_ABANDON_TIMEOUT_SECS"],
        ),
        entry("scoring.hover_short_secs", config.scoring.hover_short_secs.to_string(), &[]),
        entry("scoring.hover_long_secs", config.scoring.hover_long_secs.to_string(), &[]),
        entry("scoring.points.hover_2s", points.hover_2s.to_string(), &[]),
        entry("scoring.points.hover_5s", points.hover_5s.to_string(), &[]),
        entry("scoring.points.product_click", points.product_click.to_string(), &[]),
        entry("scoring.points.add_to_cart", points.add_to_cart.to_string(), &[]),
        entry("scoring.points.cart_abandon", points.cart_abandon.to_string(), &[]),
        entry(
            "bundles.min_frequency",
            config.bundles.min_frequency.to_string(),
            &["SHOPSIGNAL_BUNDLES_MIN_FREQUENCY"],
        ),
        entry(
            "bundles.discount_percentage",
            config.bundles.discount_percentage.to_string(),
            &["SHOPSIGNAL_BUNDLES_DISCOUNT_PERCENTAGE"],
        ),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["SHOPSIGNAL_LOGGING_LEVEL", "SHOPSIGNAL_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["SHOPSIGNAL_LOGGING_FORMAT", "SHOPSIGNAL_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("shopsignal.toml"), PathBuf::from("config/shopsignal.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, field_source};

    #[test]
    fn nested_points_resolve_to_the_file() {
        let doc: toml::Value =
            "[scoring.points]\nadd_to_cart = 20\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "scoring.points.add_to_cart"));
        assert!(!contains_path(&doc, "scoring.points.hover_2s"));
        assert_eq!(
            field_source("scoring.points.add_to_cart", &[], Some(&doc), None),
            "file (config file)"
        );
        assert_eq!(field_source("scoring.points.hover_2s", &[], Some(&doc), None), "default");
    }
}
