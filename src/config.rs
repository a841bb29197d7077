use std::env;

pub const API_KEY_VAR: &str = "STRIPE_SECRET_KEY";
pub const API_BASE_VAR: &str = "STRIPE_API_BASE";
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set (export it or add it to .env)")]
    MissingApiKey(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Config {
    /// Read the API settings from the environment, after loading `.env` if present
    pub fn load() -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_vars(env::var(API_KEY_VAR).ok(), env::var(API_BASE_VAR).ok())?;
        log::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    fn from_vars(api_key: Option<String>, api_base: Option<String>) -> Result<Config, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;
        let api_base = api_base
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Ok(Config { api_key, api_base })
    }
}
