//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const SERVER_PORT_ENV: &str = "SERVER_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{name}=`{value}` is not a valid port")]
    InvalidPort { name: &'static str, value: String },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load from an optional TOML file, apply process environment overrides,
/// then validate.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with_env(path, |name| std::env::var(name).ok())
}

/// [`load`] with an injectable environment lookup.
pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides<F>(config: &mut AppConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
        config.store.database_url = url;
    }

    if let Some(raw) = env(SERVER_PORT_ENV).filter(|v| !v.is_empty()) {
        let port: u16 = raw.parse().map_err(|_| ConfigError::InvalidPort {
            name: SERVER_PORT_ENV,
            value: raw.clone(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(config.listener.bind_address.as_str());
        config.listener.bind_address = format!("{host}:{port}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_database_url_fail() {
        let err = load_with_env(None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e == &[ValidationError::MissingDatabaseUrl]));
    }

    #[test]
    fn test_env_overrides_apply() {
        let config = load_with_env(
            None,
            env(&[(DATABASE_URL_ENV, "memory://"), (SERVER_PORT_ENV, "8088")]),
        )
        .unwrap();
        assert_eq!(config.store.database_url, "memory://");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8088");
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let err = load_with_env(
            None,
            env(&[(DATABASE_URL_ENV, "memory://"), (SERVER_PORT_ENV, "http")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:4000"

            [store]
            database_url = "json:///does/not/matter.json"
            "#
        )
        .unwrap();

        let config = load_with_env(Some(file.path()), env(&[(DATABASE_URL_ENV, "memory://")])).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.store.database_url, "memory://");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_with_env(Some(Path::new("/nonexistent/quillpress.toml")), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
