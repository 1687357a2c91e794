//! Environment configuration.
//!
//! Values come from the process environment, with a `.env` file loaded
//! first when present. CLI flags override whatever is read here.
//!
//! | Variable               | Default                                  |
//! |------------------------|------------------------------------------|
//! | `PROPSTAR_BASE_URL`    | `https://www.realestate.com.kh/buy/`     |
//! | `PROPSTAR_SITE_ORIGIN` | `https://www.realestate.com.kh`          |
//! | `PROPSTAR_USER_AGENT`  | desktop Chrome user agent                |
//! | `PROPSTAR_MAX_PAGES`   | unset (crawl until the site runs out)    |
//! | `PROPSTAR_PORT`        | `3000`                                   |

use std::env;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://www.realestate.com.kh/buy/";
pub const DEFAULT_SITE_ORIGIN: &str = "https://www.realestate.com.kh";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.141 Safari/537.36";
pub const DEFAULT_PORT: u16 = 3000;

/// Crawler settings
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlConfig {
    /// First listing page; later pages append `?page=n`
    pub base_url: String,
    /// Origin that relative detail links are resolved against
    pub site_origin: String,
    pub user_agent: String,
    /// Stop after this many pages
    pub max_pages: Option<u32>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_pages: None,
        }
    }
}

impl CrawlConfig {
    /// Load from environment (and `.env` if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("PROPSTAR_BASE_URL") {
            config.base_url = v;
        }
        if let Some(v) = lookup("PROPSTAR_SITE_ORIGIN") {
            config.site_origin = v;
        }
        if let Some(v) = lookup("PROPSTAR_USER_AGENT") {
            config.user_agent = v;
        }
        if let Some(v) = lookup("PROPSTAR_MAX_PAGES") {
            let pages = v.trim().parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                var: "PROPSTAR_MAX_PAGES".to_string(),
                message: e.to_string(),
            })?;
            config.max_pages = Some(pages);
        }

        Ok(config)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PROPSTAR_PORT") {
            Some(v) => v.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                var: "PROPSTAR_PORT".to_string(),
                message: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        Ok(Self { port })
    }
}
