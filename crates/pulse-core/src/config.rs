use std::fmt::Display;
use std::str::FromStr;

use uuid::Uuid;

use crate::app_config::{AppConfig, DbConfig, Environment};
use crate::ConfigError;

const DEFAULT_SEARCH_BASE_URL: &str = "https://api.tavily.com";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_LINKEDIN_BASE_URL: &str = "https://api.linkedin.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the database settings from the process environment. Does not
/// load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if `DATABASE_URL` is missing or a pool setting is invalid.
pub fn load_db_config_from_env() -> Result<DbConfig, ConfigError> {
    build_db_config(&|key: &str| std::env::var(key))
}

fn require<F>(lookup: &F, var: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    optional(lookup, var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
}

/// Unset and blank both count as absent.
fn optional<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    lookup(var).ok().filter(|v| !v.trim().is_empty())
}

fn or_default<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    optional(lookup, var).unwrap_or_else(|| default.to_string())
}

fn invalid(var: &str, reason: String) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    }
}

fn parse_or<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: Display,
{
    or_default(lookup, var, default)
        .parse::<T>()
        .map_err(|e| invalid(var, e.to_string()))
}

fn parse_bool<F>(lookup: &F, var: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match optional(lookup, var) {
        None => Ok(default),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        },
    }
}

fn build_db_config<F>(lookup: &F) -> Result<DbConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    Ok(DbConfig {
        database_url: require(lookup, "DATABASE_URL")?,
        log_level: or_default(lookup, "PULSE_LOG_LEVEL", "info"),
        db_max_connections: parse_or(lookup, "PULSE_DB_MAX_CONNECTIONS", "10")?,
        db_min_connections: parse_or(lookup, "PULSE_DB_MIN_CONNECTIONS", "1")?,
        db_acquire_timeout_secs: parse_or(lookup, "PULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let lookup = &lookup;
    let DbConfig {
        database_url,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    } = build_db_config(lookup)?;

    let openai_api_key = require(lookup, "OPENAI_API_KEY")?;
    let storage_url = require(lookup, "PULSE_STORAGE_URL")?;
    let storage_service_key = require(lookup, "PULSE_STORAGE_SERVICE_KEY")?;

    let env = parse_environment(&or_default(lookup, "PULSE_ENV", "development"));
    let bind_addr = parse_or(lookup, "PULSE_BIND_ADDR", "0.0.0.0:3000")?;

    let demo_user_id = optional(lookup, "PULSE_DEMO_USER_ID")
        .map(|raw| {
            Uuid::parse_str(raw.trim()).map_err(|e| invalid("PULSE_DEMO_USER_ID", e.to_string()))
        })
        .transpose()?;

    let tavily_api_key = optional(lookup, "TAVILY_API_KEY");
    let search_base_url = or_default(lookup, "PULSE_SEARCH_BASE_URL", DEFAULT_SEARCH_BASE_URL);

    let openai_base_url = or_default(lookup, "PULSE_OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
    let openai_model = or_default(lookup, "PULSE_OPENAI_MODEL", "gpt-4o-2024-08-06");
    let openai_image_model = or_default(lookup, "PULSE_OPENAI_IMAGE_MODEL", "dall-e-3");

    let storage_bucket = or_default(lookup, "PULSE_STORAGE_BUCKET", "post_images");

    let linkedin_base_url =
        or_default(lookup, "PULSE_LINKEDIN_BASE_URL", DEFAULT_LINKEDIN_BASE_URL);
    let linkedin_dry_run = parse_bool(lookup, "PULSE_LINKEDIN_DRY_RUN", false)?;

    let http_timeout_secs = parse_or(lookup, "PULSE_HTTP_TIMEOUT_SECS", "30")?;
    let reconcile_cron = or_default(lookup, "PULSE_RECONCILE_CRON", "0 * * * * *");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        demo_user_id,
        tavily_api_key,
        search_base_url,
        openai_api_key,
        openai_base_url,
        openai_model,
        openai_image_model,
        storage_url,
        storage_service_key,
        storage_bucket,
        linkedin_base_url,
        linkedin_dry_run,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        reconcile_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
