//! Database credentials from a dotenv file

use crate::error::{IngestError, Result};
use sqlx::postgres::PgConnectOptions;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;

#[derive(Clone, PartialEq, Eq)]
pub struct DbCredentials {
    pub name: String,
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
}

// Keeps the password out of logs.
impl std::fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbCredentials")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl DbCredentials {
    /// Read `DB_NAME`, `DB_USER`, `DB_PASS`, `DB_HOST` and `DB_PORT` from
    /// `path`, falling back to the process environment for keys the file
    /// does not set. The process environment is not modified.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let entries = dotenvy::from_path_iter(path).map_err(|source| IngestError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;

        let mut vars = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|source| IngestError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
            vars.insert(key, value);
        }

        Self::from_lookup(|key| {
            vars.get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let name = non_empty("DB_NAME").ok_or(IngestError::MissingEnv("DB_NAME"))?;
        let user = non_empty("DB_USER").ok_or(IngestError::MissingEnv("DB_USER"))?;
        let password = non_empty("DB_PASS");
        let host = non_empty("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty("DB_PORT") {
            Some(raw) => raw.parse().map_err(|_| IngestError::InvalidEnv {
                key: "DB_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            name,
            user,
            password,
            host,
            port,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}
