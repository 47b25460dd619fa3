use std::{collections::HashMap, env, fmt::Display, fs, net::IpAddr, path::Path, str::FromStr};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::product::Collection;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read exclusions from {path}: {reason}")]
    Exclusions { path: String, reason: String },
}

pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: u32,
    pub exclusions: ExclusionList,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let exclusions = match env::var("EXCLUSIONS_PATH") {
            Ok(path) => ExclusionList::load(&path)?,
            Err(_) => {
                info!("EXCLUSIONS_PATH not set, serving every document");
                ExclusionList::default()
            }
        };

        Ok(Self {
            database_url,
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "5000")?,
            max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
            exclusions,
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

/// Known-bad documents for one collection, left out of catalog listings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Exclusion {
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Exclusions keyed by collection name, e.g.
///
/// ```json
/// { "meatdepartments": { "titles": ["Chicken Drumstick"], "urls": [] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionList(HashMap<Collection, Exclusion>);

impl ExclusionList {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let err = |reason: String| ConfigError::Exclusions {
            path: path.display().to_string(),
            reason,
        };

        let raw = fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
        let list = Self::parse(&raw).map_err(|e| err(e.to_string()))?;
        info!(path = %path.display(), collections = list.0.len(), "loaded exclusion list");
        Ok(list)
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let by_name: HashMap<String, Exclusion> = serde_json::from_str(raw)?;
        let mut list = HashMap::new();
        for (name, exclusion) in by_name {
            match Collection::from_name(&name) {
                Some(collection) => {
                    list.insert(collection, exclusion);
                }
                None => warn!("Ignoring exclusions for unknown collection {name}"),
            }
        }
        Ok(Self(list))
    }

    pub fn for_collection(&self, collection: Collection) -> Option<&Exclusion> {
        self.0.get(&collection)
    }
}
