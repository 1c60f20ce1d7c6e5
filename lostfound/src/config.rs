use config::{Config, Environment, File};
use serde::Deserialize;
use std::{collections::HashMap, env, fmt, path::Path};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LoggingFormat,
    pub filter: String,
    pub file: Option<LoggingFileConfig>,
    pub buffer_limit: usize,
    pub lossy: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingFileConfig {
    pub format: LoggingFormat,
    pub directory: String,
    pub filename: String,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFormat {
    Json,
    Pretty,
    Full,
    Compact,
}

/// Connection settings for the user store.
///
/// There is deliberately no built-in url or credential: `url` has to come
/// from a config file, `LOSTFOUND_DATABASE__URL`, or the legacy `DB_URL`.
#[derive(Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl AppConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let run_mode = env::var("APP_ENV").unwrap_or_else(|_| "".into());
        let overrides = legacy_database_overrides(|key| env::var(key).ok());
        Self::load_with_options(path, Some(run_mode), Some(overrides))
    }

    pub fn load_with_options<P: AsRef<Path>>(
        path: P,
        run_mode: Option<String>,
        overrides: Option<HashMap<String, String>>,
    ) -> crate::Result<Self> {
        let dir = path.as_ref().to_string_lossy();
        let run_mode = run_mode.unwrap_or_default();
        let mut builder = Config::builder()
            .add_source(File::with_name(&format!("{}/default", dir)))
            // 실행 환경별 설정 (optional)
            .add_source(
                File::with_name(&format!("{}/{}", dir, run_mode))
                    .required(false),
            )
            // local 설정은 git 에 올리지 않는다
            .add_source(
                File::with_name(&format!("{}/local", dir)).required(false),
            )
            .add_source(
                Environment::with_prefix("LOSTFOUND")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Some(overrides) = overrides {
            for (key, value) in overrides {
                builder = builder
                    .set_override(key, value)
                    .map_err(|e| crate::Error::Config(anyhow::anyhow!(e)))?;
            }
        }

        let s = builder
            .build()
            .map_err(|e| crate::Error::Config(anyhow::anyhow!(e)))?;

        s.try_deserialize()
            .map_err(|e| crate::Error::Config(anyhow::anyhow!(e)))
    }
}

/// Maps the `DB_URL` / `DB_USER` / `DB_PASS` variables older deployments
/// export onto config keys. Blank url and user are ignored; an empty password
/// is kept since it is a valid credential.
pub fn legacy_database_overrides<F>(lookup: F) -> HashMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = HashMap::new();
    if let Some(url) = lookup("DB_URL").filter(|v| !v.trim().is_empty()) {
        overrides.insert("database.url".to_string(), url);
    }
    if let Some(user) = lookup("DB_USER").filter(|v| !v.trim().is_empty()) {
        overrides.insert("database.username".to_string(), user);
    }
    if let Some(pass) = lookup("DB_PASS") {
        overrides.insert("database.password".to_string(), pass);
    }
    overrides
}
