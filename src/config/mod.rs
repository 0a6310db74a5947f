use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub slug: SlugConfig,
    pub view_counter: ViewCounterConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
    pub store_backend: StoreBackend,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

// Настройки базы данных, url обязателен только для postgres
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hours: i64,
}

// Куда складываются загруженные файлы и откуда они раздаются
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub base_path: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlugConfig {
    /// Фиксированный seed делает суффиксы воспроизводимыми
    pub seed: Option<u64>,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewCounterConfig {
    pub queue_capacity: usize,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("unknown log format '{}'", other)),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown store backend '{}'", other)),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Собирает конфигурацию из произвольного источника переменных.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        fn parse<T>(key: &str, raw: String) -> anyhow::Result<T>
        where
            T: FromStr,
            T::Err: std::fmt::Display,
        {
            raw.parse::<T>()
                .map_err(|e| anyhow!("{} has invalid value '{}': {}", key, raw, e))
        }

        let store_backend: StoreBackend =
            parse("STORE_BACKEND", var_or("STORE_BACKEND", "postgres"))?;
        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND=postgres");
        }

        let slug_seed = match lookup("SLUG_SEED") {
            Some(raw) => Some(parse("SLUG_SEED", raw)?),
            None => None,
        };

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse("PORT", var_or("PORT", "8080"))?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "invitation_service=debug,tower_http=debug"),
                log_format: parse("LOG_FORMAT", var_or("LOG_FORMAT", "pretty"))?,
                store_backend,
                cors_allowed_origins: var_or("CORS_ALLOWED_ORIGINS", "")
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
            database: DatabaseConfig {
                url: database_url,
                pool_size: parse("DB_POOL_SIZE", var_or("DB_POOL_SIZE", "10"))?,
            },
            jwt: JwtConfig {
                secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
                expires_in_hours: parse("JWT_EXPIRES_IN_HOURS", var_or("JWT_EXPIRES_IN_HOURS", "24"))?,
            },
            storage: StorageConfig {
                base_path: var_or("STORAGE_BASE_PATH", "./uploads"),
                base_url: var_or("STORAGE_BASE_URL", "/uploads"),
            },
            slug: SlugConfig {
                seed: slug_seed,
                max_attempts: parse("SLUG_MAX_ATTEMPTS", var_or("SLUG_MAX_ATTEMPTS", "10"))?,
            },
            view_counter: ViewCounterConfig {
                queue_capacity: parse("VIEW_COUNTER_QUEUE", var_or("VIEW_COUNTER_QUEUE", "1024"))?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_for_memory_backend() {
        let config =
            Config::from_lookup(lookup(&[("STORE_BACKEND", "memory"), ("JWT_SECRET", "s3cret")]))
                .unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.app.store_backend, StoreBackend::Memory);
        assert_eq!(config.app.log_format, LogFormat::Pretty);
        assert!(config.database.url.is_none());
        assert_eq!(config.slug.max_attempts, 10);
        assert_eq!(config.slug.seed, None);
        assert_eq!(config.view_counter.queue_capacity, 1024);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn malformed_numbers_are_reported_with_key() {
        let err = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn origins_and_seed_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("SLUG_SEED", "42"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
        ]))
        .unwrap();
        assert_eq!(config.slug.seed, Some(42));
        assert_eq!(
            config.app.cors_allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }
}
