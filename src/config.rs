use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub webhook_secret: String,
    pub notification_webhook_url: Option<String>,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 50)?,
            jwt_secret: get_env("JWT_SECRET")?,
            webhook_secret: get_env("WEBHOOK_SECRET")?,
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            log_format: parse_log_format(env::var("LOG_FORMAT").ok().as_deref())?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat> {
    match raw.map(str::trim) {
        None | Some("") | Some("pretty") => Ok(LogFormat::Pretty),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(Error::Config(format!("Invalid value for LOG_FORMAT: {}", other))),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
