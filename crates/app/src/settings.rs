//! Application settings, read from `settings.toml` in the working
//! directory.

use config::{Config, ConfigError, File};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

/// Database backend. `"memory"` selects an in-memory store, anything
/// else is treated as a path to an sqlite file.
#[derive(Debug)]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl<'de> Deserialize<'de> for Database {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "memory" => Database::Memory,
            path => Database::Sqlite(path.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
