use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use spore_domain::constants::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Custom error type for config loading.
#[spore_derive::spore_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader: a settings file overlaid with environment variables.
///
/// 1. **Base file**: `path` when given (must exist), otherwise `server.{toml,json,yaml}`
///    in the working directory if present. Without a file every section keeps its defaults.
/// 2. **Environment overrides**: variables prefixed with `SPORE__`, nested with double
///    underscores (`SPORE__SERVER__PORT=9000` maps to `server.port`).
///    `SPORE__CORS__ALLOWED_ORIGINS` takes a comma separated list.
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing or the merged
/// sources do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use spore_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let file = match &path {
        Some(p) => File::from(p.as_ref()).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let source = path
        .as_ref()
        .map_or_else(|| format!("{DEFAULT_CONFIG_FILE} (optional)"), |p| p.as_ref().display().to_string());

    let builder = Config::builder().add_source(file).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .convert_case(config::Case::Snake)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("cors.allowed_origins"),
    );

    info!(source = %source, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
