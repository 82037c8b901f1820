use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ViewError};
use crate::retention::RetentionPolicy;

const DEFAULT_DB_PATH: &str = "data/me.db";
const DEFAULT_VIEW_TIMEOUT_SECS: u64 = 2 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub db_path: PathBuf,
    /// Lifetime of a dialog that does not set its own timeout.
    pub view_timeout: Duration,
    pub retention: RetentionPolicy,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            view_timeout: Duration::from_secs(DEFAULT_VIEW_TIMEOUT_SECS),
            retention: RetentionPolicy::default(),
        }
    }
}

impl BotConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Each field `name` is looked up as `ME_NAME`, `me_name`, `NAME`, `name`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let find = |field: &str| -> Option<String> {
            let prefixed = format!("me_{}", field);
            [prefixed.as_str(), field]
                .iter()
                .flat_map(|name| [name.to_uppercase(), name.to_lowercase()])
                .find_map(|name| lookup(&name))
        };
        let number = |field: &str, default: u64| -> Result<u64> {
            match find(field) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ViewError::Configuration(format!(
                        "{} must be a whole number, got {:?}",
                        field, raw
                    ))
                }),
                None => Ok(default),
            }
        };

        let defaults = RetentionPolicy::default();
        Ok(Self {
            db_path: find("db_path").map(PathBuf::from).unwrap_or_else(|| DEFAULT_DB_PATH.into()),
            view_timeout: Duration::from_secs(number(
                "view_timeout_secs",
                DEFAULT_VIEW_TIMEOUT_SECS,
            )?),
            retention: RetentionPolicy {
                max_per_user: number("max_messages_per_user", defaults.max_per_user as u64)?
                    as usize,
                max_per_server: number("max_messages_per_server", defaults.max_per_server as u64)?
                    as usize,
                max_per_channel: number(
                    "max_messages_per_channel",
                    defaults.max_per_channel as u64,
                )? as usize,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = BotConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.retention.max_per_user, 10);
        assert_eq!(config.view_timeout, Duration::from_secs(120));
    }

    #[test]
    fn prefixed_name_wins_over_bare_name() {
        let config = BotConfig::from_lookup(lookup(&[
            ("ME_MAX_MESSAGES_PER_CHANNEL", "1"),
            ("max_messages_per_channel", "50"),
            ("db_path", "/tmp/me.db"),
            ("me_view_timeout_secs", "30"),
        ]))
        .unwrap();
        assert_eq!(config.retention.max_per_channel, 1);
        assert_eq!(config.db_path, PathBuf::from("/tmp/me.db"));
        assert_eq!(config.view_timeout, Duration::from_secs(30));
    }

    #[test]
    fn malformed_number_is_a_configuration_error() {
        let err =
            BotConfig::from_lookup(lookup(&[("ME_MAX_MESSAGES_PER_USER", "ten")])).unwrap_err();
        assert!(matches!(err, ViewError::Configuration(_)));
    }
}
