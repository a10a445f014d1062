//! Process configuration, read once at startup from the environment

use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No Gemini API key configured. Set GEMINI_API_KEY (or VITE_GEMINI_API_KEY).")]
    MissingApiKey,
    #[error("Invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    /// Service root, e.g. `https://generativelanguage.googleapis.com`
    pub base_url: String,
    pub bind: IpAddr,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("GEMINI_API_KEY")
            .or_else(|| var("VITE_GEMINI_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let port = match var("GEMINI_CHAT_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "GEMINI_CHAT_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let bind = match var("GEMINI_CHAT_BIND") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "GEMINI_CHAT_BIND",
                value,
            })?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        Ok(Self {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind,
            port,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
