use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DB_PATH: &str = "warelay.db";
const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v20.0";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub whatsapp: WhatsAppConfig,
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Graph API base, no trailing slash.
    pub api_base: String,
    pub phone_number_id: String,
    pub access_token: String,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `WHATSAPP_PHONE_NUMBER_ID` and `WHATSAPP_TOKEN` are required;
    /// everything else has a default.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {raw}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH));

        let api_base =
            std::env::var("WHATSAPP_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Ok(Self {
            port,
            database_path,
            whatsapp: WhatsAppConfig {
                api_base: normalize_base(&api_base),
                phone_number_id: required("WHATSAPP_PHONE_NUMBER_ID")?,
                access_token: required("WHATSAPP_TOKEN")?,
            },
        })
    }
}

fn required(name: &str) -> Result<String> {
    let value = std::env::var(name)
        .with_context(|| format!("Missing required environment variable: {name}"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Environment variable {name} is set but empty");
    }
    Ok(value)
}

fn normalize_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}
