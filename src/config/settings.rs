//! Application settings and configuration
//!
//! This module provides configuration management for the application,
//! loading settings from environment variables with sensible defaults.
//!
//! `GROQ_API_KEY` is intentionally absent here: the AI client reads it
//! lazily so a key exported after startup is still picked up.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Default Groq model used when a request does not name one
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Default Groq OpenAI-compatible API base
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!("Invalid environment: {}. Expected: development, staging, or production", s),
        }
    }
}

/// Upstream Groq API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroqSettings {
    pub base_url: String,
    pub default_model: String,
    pub timeout_seconds: u64,
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Session verification configuration
///
/// Sessions are issued by the identity service; this process only checks
/// the signed cookie it leaves behind.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    pub require_login: bool,
    #[serde(skip_serializing)]
    pub session_secret: Option<String>,
    pub session_cookie_name: String,
    pub login_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            require_login: true,
            session_secret: None,
            session_cookie_name: "sessionid".to_string(),
            login_url: "/registration/sign_in/".to_string(),
        }
    }
}

/// Same-origin protection for state-changing API requests
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CsrfSettings {
    pub enabled: bool,
    pub trusted_origins: Vec<String>,
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            trusted_origins: Vec::new(),
        }
    }
}

/// Front-end bundle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrontendSettings {
    /// Base URL prefixed to every asset path (empty for same-origin)
    pub asset_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Build manifest produced by the front-end bundler
    pub manifest_path: PathBuf,
    /// Manifest key of the main entry point
    pub manifest_entry: String,
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            asset_url: String::new(),
            static_dir: PathBuf::from("static"),
            manifest_path: PathBuf::from("static/manifest.json"),
            manifest_entry: "src/main.ts".to_string(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    /// Debug mode: assets come from the front-end dev server, no manifest
    pub debug: bool,

    pub frontend: FrontendSettings,
    pub groq: GroqSettings,
    pub auth: AuthSettings,
    pub csrf: CsrfSettings,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignored in production typically)
        dotenvy::dotenv().ok();

        let defaults = FrontendSettings::default();

        let settings = Self {
            // App settings
            app_name: env_or_default("APP_NAME", "partwise-forge"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            // Server settings
            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "8000")
                .parse()
                .context("Invalid PORT value")?,

            debug: env_flag("DEBUG", false),

            frontend: FrontendSettings {
                asset_url: env_or_default("ASSET_URL", ""),
                static_dir: env::var("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.static_dir),
                manifest_path: env::var("MANIFEST_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.manifest_path),
                manifest_entry: env_or_default("MANIFEST_ENTRY", &defaults.manifest_entry),
            },

            groq: GroqSettings {
                base_url: env_or_default("GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL),
                default_model: env_or_default("DEFAULT_MODEL", DEFAULT_MODEL),
                timeout_seconds: env_or_default("GROQ_TIMEOUT_SECONDS", "60")
                    .parse()
                    .context("Invalid GROQ_TIMEOUT_SECONDS value")?,
            },

            auth: AuthSettings {
                require_login: env_flag("REQUIRE_LOGIN", true),
                session_secret: env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty()),
                session_cookie_name: env_or_default("SESSION_COOKIE_NAME", "sessionid"),
                login_url: env_or_default("LOGIN_URL", "/registration/sign_in/"),
            },

            csrf: CsrfSettings {
                enabled: env_flag("CSRF_PROTECTION", true),
                trusted_origins: parse_list(&env_or_default("CSRF_TRUSTED_ORIGINS", "")),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.groq.timeout_seconds == 0 {
            anyhow::bail!("GROQ_TIMEOUT_SECONDS must be > 0");
        }

        if self.groq.default_model.trim().is_empty() {
            anyhow::bail!("DEFAULT_MODEL cannot be empty");
        }

        if self.auth.require_login && self.auth.session_secret.is_none() {
            anyhow::bail!("SESSION_SECRET must be set when REQUIRE_LOGIN is enabled");
        }

        if self.is_production() {
            if self.debug {
                tracing::warn!("Running in production with DEBUG enabled!");
            }
            if !self.auth.require_login {
                tracing::warn!("Running in production without session authentication!");
            }
            if !self.csrf.enabled {
                tracing::warn!("Running in production with CSRF protection disabled!");
            }
        }

        Ok(())
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "partwise-forge".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            frontend: FrontendSettings::default(),
            groq: GroqSettings::default(),
            auth: AuthSettings::default(),
            csrf: CsrfSettings::default(),
        }
    }
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Boolean flag accepting the spellings people actually put in .env files
fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated list, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}
