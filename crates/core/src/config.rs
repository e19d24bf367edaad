use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bundles::{BundleAnalyzer, DEFAULT_DISCOUNT_PERCENTAGE, DEFAULT_MIN_FREQUENCY};
use crate::scoring::{
    PointTable, ScoreNormalizer, DEFAULT_ABANDON_TIMEOUT_SECS, DEFAULT_HOVER_LONG_SECS,
    DEFAULT_HOVER_SHORT_SECS, DEFAULT_MAX_SCORE_THRESHOLD,
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub scoring: ScoringConfig,
    pub bundles: BundlesConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ScoringConfig {
    pub max_score_threshold: f64,
    pub abandon_timeout_secs: u64,
    pub hover_short_secs: u64,
    pub hover_long_secs: u64,
    pub points: PointTable,
}

#[derive(Clone, Debug)]
pub struct BundlesConfig {
    pub min_frequency: u32,
    pub discount_percentage: Decimal,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub server_port: Option<u16>,
    pub max_score_threshold: Option<f64>,
    pub abandon_timeout_secs: Option<u64>,
    pub min_frequency: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://shopsignal.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            scoring: ScoringConfig {
                max_score_threshold: DEFAULT_MAX_SCORE_THRESHOLD,
                abandon_timeout_secs: DEFAULT_ABANDON_TIMEOUT_SECS,
                hover_short_secs: DEFAULT_HOVER_SHORT_SECS,
                hover_long_secs: DEFAULT_HOVER_LONG_SECS,
                points: PointTable::default(),
            },
            bundles: BundlesConfig {
                min_frequency: DEFAULT_MIN_FREQUENCY,
                discount_percentage: DEFAULT_DISCOUNT_PERCENTAGE,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl ScoringConfig {
    pub fn normalizer(&self) -> Result<ScoreNormalizer, ConfigError> {
        ScoreNormalizer::new(self.max_score_threshold)
            .map_err(|error| ConfigError::Validation(format!("scoring.{error}")))
    }
}

impl BundlesConfig {
    pub fn analyzer(&self) -> Result<BundleAnalyzer, ConfigError> {
        BundleAnalyzer::with_discount_percentage(self.discount_percentage)
            .map_err(|error| ConfigError::Validation(format!("bundles.{error}")))
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("shopsignal.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(scoring) = patch.scoring {
            if let Some(max_score_threshold) = scoring.max_score_threshold {
                self.scoring.max_score_threshold = max_score_threshold;
            }
            if let Some(abandon_timeout_secs) = scoring.abandon_timeout_secs {
                self.scoring.abandon_timeout_secs = abandon_timeout_secs;
            }
            if let Some(hover_short_secs) = scoring.hover_short_secs {
                self.scoring.hover_short_secs = hover_short_secs;
            }
            if let Some(hover_long_secs) = scoring.hover_long_secs {
                self.scoring.hover_long_secs = hover_long_secs;
            }
            if let Some(points) = scoring.points {
                let table = &mut self.scoring.points;
                if let Some(value) = points.hover_2s {
                    table.hover_2s = value;
                }
                if let Some(value) = points.hover_5s {
                    table.hover_5s = value;
                }
                if let Some(value) = points.product_click {
                    table.product_click = value;
                }
                if let Some(value) = points.add_to_cart {
                    table.add_to_cart = value;
                }
                if let Some(value) = points.cart_abandon {
                    table.cart_abandon = value;
                }
            }
        }

        if let Some(bundles) = patch.bundles {
            if let Some(min_frequency) = bundles.min_frequency {
                self.bundles.min_frequency = min_frequency;
            }
            if let Some(discount_percentage) = bundles.discount_percentage {
                self.bundles.discount_percentage = discount_percentage;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SHOPSIGNAL_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SHOPSIGNAL_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("SHOPSIGNAL_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SHOPSIGNAL_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("SHOPSIGNAL_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SHOPSIGNAL_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SHOPSIGNAL_SERVER_PORT") {
            self.server.port = parse_env("SHOPSIGNAL_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SHOPSIGNAL_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_env("SHOPSIGNAL_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("SHOPSIGNAL_SCORING_MAX_SCORE_THRESHOLD") {
            self.scoring.max_score_threshold =
                parse_env("SHOPSIGNAL_SCORING_MAX_SCORE_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("SHOPSIGNAL_SCORING_ABANDON_TIMEOUT_SECS") {
            self.scoring.abandon_timeout_secs =
                parse_env("SHOPSIGNAL_SCORING_ABANDON_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SHOPSIGNAL_BUNDLES_MIN_FREQUENCY") {
            self.bundles.min_frequency = parse_env("SHOPSIGNAL_BUNDLES_MIN_FREQUENCY", &value)?;
        }
        if let Some(value) = read_env("SHOPSIGNAL_BUNDLES_DISCOUNT_PERCENTAGE") {
            self.bundles.discount_percentage =
                parse_env("SHOPSIGNAL_BUNDLES_DISCOUNT_PERCENTAGE", &value)?;
        }

        let log_level =
            read_env("SHOPSIGNAL_LOGGING_LEVEL").or_else(|| read_env("SHOPSIGNAL_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHOPSIGNAL_LOGGING_FORMAT").or_else(|| read_env("SHOPSIGNAL_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(max_score_threshold) = overrides.max_score_threshold {
            self.scoring.max_score_threshold = max_score_threshold;
        }
        if let Some(abandon_timeout_secs) = overrides.abandon_timeout_secs {
            self.scoring.abandon_timeout_secs = abandon_timeout_secs;
        }
        if let Some(min_frequency) = overrides.min_frequency {
            self.bundles.min_frequency = min_frequency;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_scoring(&self.scoring)?;
        validate_bundles(&self.bundles)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("shopsignal.toml"), PathBuf::from("config/shopsignal.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_scoring(scoring: &ScoringConfig) -> Result<(), ConfigError> {
    scoring.normalizer()?;

    if scoring.abandon_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "scoring.abandon_timeout_secs must be greater than zero".to_string(),
        ));
    }

    if scoring.hover_short_secs == 0 || scoring.hover_short_secs >= scoring.hover_long_secs {
        return Err(ConfigError::Validation(
            "scoring.hover_short_secs must be greater than zero and less than scoring.hover_long_secs"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_bundles(bundles: &BundlesConfig) -> Result<(), ConfigError> {
    if bundles.min_frequency == 0 {
        return Err(ConfigError::Validation(
            "bundles.min_frequency must be at least 1".to_string(),
        ));
    }

    bundles.analyzer()?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    scoring: Option<ScoringPatch>,
    bundles: Option<BundlesPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringPatch {
    max_score_threshold: Option<f64>,
    abandon_timeout_secs: Option<u64>,
    hover_short_secs: Option<u64>,
    hover_long_secs: Option<u64>,
    points: Option<PointsPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PointsPatch {
    hover_2s: Option<i64>,
    hover_5s: Option<i64>,
    product_click: Option<i64>,
    add_to_cart: Option<i64>,
    cart_abandon: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct BundlesPatch {
    min_frequency: Option<u32>,
    discount_percentage: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_and_match_storefront_constants() -> Result<(), String> {
        let config = AppConfig::default();
        config.validate().map_err(|err| err.to_string())?;

        ensure(config.scoring.max_score_threshold == 100.0, "default threshold should be 100")?;
        ensure(config.scoring.abandon_timeout_secs == 30, "default abandon timeout is 30s")?;
        ensure(config.scoring.points.hover_2s == 2, "hover_2s accumulator value is 2")?;
        ensure(config.bundles.min_frequency == 2, "default min frequency is 2")?;
        ensure(
            config.bundles.discount_percentage == Decimal::from(10),
            "default bundle discount is 10%",
        )?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "default format is compact")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SHOPSIGNAL_DB", "sqlite://interpolated.db");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shopsignal.toml");
            fs::write(
                &path,
                r#"
[database]
url = "${TEST_SHOPSIGNAL_DB}"

[scoring.points]
hover_2s = 3
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://interpolated.db",
                "database url should be interpolated from environment",
            )?;
            ensure(config.scoring.points.hover_2s == 3, "point override should apply")?;
            ensure(config.scoring.points.hover_5s == 5, "untouched points keep defaults")?;
            Ok(())
        })();

        clear_vars(&["TEST_SHOPSIGNAL_DB"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHOPSIGNAL_LOG_LEVEL", "warn");
        env::set_var("SHOPSIGNAL_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["SHOPSIGNAL_LOG_LEVEL", "SHOPSIGNAL_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHOPSIGNAL_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("SHOPSIGNAL_SCORING_MAX_SCORE_THRESHOLD", "250");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("shopsignal.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[scoring]
max_score_threshold = 50.0
abandon_timeout_secs = 45

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.scoring.max_score_threshold == 250.0,
                "env threshold should win over file",
            )?;
            ensure(config.scoring.abandon_timeout_secs == 45, "file timeout should win over default")?;
            Ok(())
        })();

        clear_vars(&["SHOPSIGNAL_DATABASE_URL", "SHOPSIGNAL_SCORING_MAX_SCORE_THRESHOLD"]);
        result
    }

    #[test]
    fn invalid_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SHOPSIGNAL_BUNDLES_MIN_FREQUENCY", "often");

        let result = (|| -> Result<(), String> {
            match AppConfig::load(LoadOptions::default()) {
                Err(ConfigError::InvalidEnvOverride { key, .. }) => ensure(
                    key == "SHOPSIGNAL_BUNDLES_MIN_FREQUENCY",
                    "error should name the offending variable",
                ),
                Err(other) => Err(format!("unexpected error: {other}")),
                Ok(_) => Err("expected invalid override failure".to_string()),
            }
        })();

        clear_vars(&["SHOPSIGNAL_BUNDLES_MIN_FREQUENCY"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                max_score_threshold: Some(0.0),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };

        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("scoring.")
        );
        ensure(has_message, "validation failure should mention the scoring section")
    }

    #[test]
    fn hover_windows_must_be_ordered() -> Result<(), String> {
        let mut config = AppConfig::default();
        config.scoring.hover_short_secs = 5;
        config.scoring.hover_long_secs = 5;

        ensure(config.validate().is_err(), "equal hover windows should be rejected")
    }

    #[test]
    fn missing_required_file_is_an_error() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let result = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "absent required file should fail",
        )
    }
}
