use std::env;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

use crate::currency::Currency;
use crate::domain::order::{ContactRequirement, FulfillmentMode, OrderPolicy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub currency: Currency,
    pub order_policy: OrderPolicy,
    pub seed_menu: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage: StorageBackend = parse_or(&lookup, "STORAGE", StorageBackend::Postgres)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let fulfillment_modes = match lookup("FULFILLMENT_MODES") {
            Some(raw) => parse_modes(&raw)?,
            None => FulfillmentMode::ALL.to_vec(),
        };

        Ok(Self {
            storage,
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            currency: parse_or(&lookup, "CURRENCY", Currency::Usd)?,
            order_policy: OrderPolicy {
                contact: parse_or(&lookup, "CONTACT_REQUIREMENT", ContactRequirement::Email)?,
                fulfillment_modes,
            },
            seed_menu: parse_or(&lookup, "SEED_MENU", true)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_modes(raw: &str) -> Result<Vec<FulfillmentMode>, ConfigError> {
    let mut modes = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let mode = part
            .parse::<FulfillmentMode>()
            .map_err(|reason| ConfigError::Invalid {
                key: "FULFILLMENT_MODES",
                value: raw.to_string(),
                reason,
            })?;
        if !modes.contains(&mode) {
            modes.push(mode);
        }
    }
    if modes.is_empty() {
        return Err(ConfigError::Invalid {
            key: "FULFILLMENT_MODES",
            value: raw.to_string(),
            reason: "at least one mode is required".to_string(),
        });
    }
    Ok(modes)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn postgres_requires_database_url() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn defaults_apply_for_memory_storage() {
        let config = load(&[("STORAGE", "memory")]).expect("config");

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.currency, Currency::Usd);
        assert_eq!(config.order_policy, OrderPolicy::default());
        assert!(config.seed_menu);
    }

    #[test]
    fn deployment_variant_is_read_from_env() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("PORT", "9000"),
            ("CURRENCY", "idr"),
            ("CONTACT_REQUIREMENT", "phone"),
            ("FULFILLMENT_MODES", "table, table"),
            ("SEED_MENU", "false"),
        ])
        .expect("config");

        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.port, 9000);
        assert_eq!(config.currency, Currency::Idr);
        assert_eq!(config.order_policy.contact, ContactRequirement::Phone);
        assert_eq!(config.order_policy.fulfillment_modes, vec![FulfillmentMode::Table]);
        assert!(!config.seed_menu);
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = load(&[("STORAGE", "memory"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = load(&[("STORAGE", "memory"), ("FULFILLMENT_MODES", " , ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FULFILLMENT_MODES", .. }));
    }
}
