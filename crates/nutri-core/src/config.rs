//! Runtime configuration and tracing setup.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Application-level constants
pub const APP_NAME: &str = "NutriApp";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the database path.
pub const DB_PATH_VAR: &str = "NUTRI_DB_PATH";
/// Environment variable holding the tracing filter directive.
pub const LOG_FILTER_VAR: &str = "NUTRI_LOG";

/// Database file used when `NUTRI_DB_PATH` is unset.
pub const DEFAULT_DB_FILE: &str = "nutri.db";

/// Filter used when neither `NUTRI_LOG` nor `RUST_LOG` is set.
pub fn default_log_filter() -> &'static str {
    "nutri_core=info,warn"
}

/// Settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub database_path: PathBuf,
    pub log_filter: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_FILE),
            log_filter: None,
        }
    }
}

impl CoreConfig {
    /// Read `NUTRI_DB_PATH` and `NUTRI_LOG` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_path: read(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
            log_filter: read(LOG_FILTER_VAR),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Precedence: explicit `filter`, then `RUST_LOG`, then
/// [`default_log_filter`]. Returns `false` if a subscriber was already set.
pub fn init_tracing(filter: Option<&str>) -> bool {
    let env_filter = match filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} core v{}", APP_NAME, APP_VERSION);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CoreConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.database_path, PathBuf::from("nutri.db"));
    }

    #[test]
    fn reads_both_variables() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("NUTRI_DB_PATH", "/var/lib/nutri/clinic.db"),
            ("NUTRI_LOG", "nutri_core=debug"),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/var/lib/nutri/clinic.db"));
        assert_eq!(config.log_filter.as_deref(), Some("nutri_core=debug"));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = CoreConfig::from_lookup(lookup(&[("NUTRI_DB_PATH", "  "), ("NUTRI_LOG", "")]));
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing(Some("off"));
        assert!(!init_tracing(None));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
