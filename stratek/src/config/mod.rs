//! Configuration management for the Stratek service
//!
//! Configuration is loaded once at startup from multiple sources with clear
//! precedence (highest first):
//!
//! 1. `STRATEK_` prefixed environment variables (`__` for nesting)
//! 2. Flat legacy environment names
//!    (`SENDGRID_API_KEY`, `MAIL_USERNAME`, `EMAIL_USER`, `PORT`, ...)
//! 3. `./stratek.toml`, or the file passed on the command line
//! 4. Hardcoded defaults (fallback)
//!
//! Environment variable format: `STRATEK_SECTION__FIELD_NAME`
//! - Example: `STRATEK_RATE_LIMIT__MAX_REQUESTS=20`
//! - Example: `STRATEK_EMAIL__GMAIL__USERNAME=me@gmail.com`
//!
//! # Example Configuration
//!
//! ```toml
//! # stratek.toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [rate_limit]
//! max_requests = 10
//! window_secs = 60
//!
//! [pdf]
//! timeout_secs = 30
//!
//! [email]
//! from = "web@stratek.dev"
//! to = "hola@stratek.dev"
//!
//! [email.sendgrid]
//! api_key = "SG.xxxxx"
//!
//! [email.gmail]
//! username = "me@gmail.com"
//! password = "app-password"
//! ```
//!
//! A provider table missing any of its credentials is treated as absent: the
//! provider is skipped at startup and never contacted.

use figment::{
    providers::{Env, Format, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::StratekError;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "./stratek.toml";

/// Display name used in the `From` header of outgoing notifications
pub const DEFAULT_SENDER_NAME: &str = "Stratek Portfolio";

const DEFAULT_SENDGRID_API_BASE: &str = "https://api.sendgrid.com/v3";
const DEFAULT_MAILGUN_HOST: &str = "smtp.mailgun.org";
const DEFAULT_GMAIL_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;

/// Flat legacy environment names and the nested keys
/// they populate.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("SENDGRID_API_KEY", "email.sendgrid.api_key"),
    ("SENDGRID_FROM_EMAIL", "email.sendgrid.from"),
    ("SENDGRID_TO_EMAIL", "email.sendgrid.to"),
    ("MAIL_SERVER", "email.mailgun.host"),
    ("MAIL_PORT", "email.mailgun.port"),
    ("MAIL_USERNAME", "email.mailgun.username"),
    ("MAIL_PASSWORD", "email.mailgun.password"),
    ("MAIL_FROM", "email.mailgun.from"),
    ("ADMIN_EMAIL", "email.mailgun.to"),
    ("EMAIL_USER", "email.gmail.username"),
    ("EMAIL_PASS", "email.gmail.password"),
    ("EMAIL_FROM", "email.from"),
    ("EMAIL_TO", "email.to"),
];

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum accepted request body size in bytes
    pub body_limit_bytes: usize,

    /// Upper bound for a whole request, PDF rendering included
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit_bytes: 10 * 1024 * 1024,
            request_timeout_secs: 90,
        }
    }
}

/// Per-IP rate limiting settings for the form endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Enable rate limiting
    pub enabled: bool,

    /// Requests allowed per IP inside one window
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,

    /// How often idle IP entries are swept from memory
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 10,
            window_secs: 60,
            cleanup_interval_secs: 300,
        }
    }
}

/// PDF rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSettings {
    /// Render PDF summaries at all
    pub enabled: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_path: Option<PathBuf>,

    /// Upper bound for a single render, in seconds
    pub timeout_secs: u64,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            chrome_path: None,
            timeout_secs: 30,
        }
    }
}

/// Transport security for SMTP providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS (port 587)
    #[default]
    Starttls,
    /// TLS from the first byte (port 465)
    Implicit,
    /// No encryption; only for local relays such as Mailpit
    None,
}

/// Raw `SendGrid` table as it appears in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendGridSettings {
    /// API key (`SENDGRID_API_KEY`)
    #[serde(deserialize_with = "lenient_string")]
    pub api_key: Option<String>,

    /// Sender address; falls back to `email.from`
    #[serde(deserialize_with = "lenient_string")]
    pub from: Option<String>,

    /// Recipient; falls back to `email.to`
    #[serde(deserialize_with = "lenient_string")]
    pub to: Option<String>,

    /// API base URL, overridable for testing
    #[serde(deserialize_with = "lenient_string")]
    pub api_base: Option<String>,
}

/// Raw SMTP relay table (Mailgun and Gmail share the shape)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// Relay hostname; provider default when unset
    #[serde(deserialize_with = "lenient_string")]
    pub host: Option<String>,

    /// Relay port (default 587)
    pub port: Option<u16>,

    /// SMTP username
    #[serde(deserialize_with = "lenient_string")]
    pub username: Option<String>,

    /// SMTP password
    #[serde(deserialize_with = "lenient_string")]
    pub password: Option<String>,

    /// Sender address; falls back to `email.from`
    #[serde(deserialize_with = "lenient_string")]
    pub from: Option<String>,

    /// Recipient; falls back to `email.to`
    #[serde(deserialize_with = "lenient_string")]
    pub to: Option<String>,

    /// Transport security
    pub tls: TlsMode,
}

/// Email delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// Default sender address for every provider
    #[serde(deserialize_with = "lenient_string")]
    pub from: Option<String>,

    /// Default recipient (the site owner) for every provider
    #[serde(deserialize_with = "lenient_string")]
    pub to: Option<String>,

    /// Display name attached to the sender
    pub sender_name: String,

    /// Upper bound for a single provider attempt, in seconds
    pub provider_timeout_secs: u64,

    /// `SendGrid` HTTP API
    pub sendgrid: Option<SendGridSettings>,

    /// Mailgun SMTP relay
    pub mailgun: Option<SmtpSettings>,

    /// Gmail SMTP
    pub gmail: Option<SmtpSettings>,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            sendgrid: None,
            mailgun: None,
            gmail: None,
        }
    }
}

/// Complete `SendGrid` credential set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendGridCredentials {
    /// API key
    pub api_key: String,
    /// API base URL
    pub api_base: String,
    /// Sender address
    pub from: String,
    /// Sender display name
    pub from_name: String,
    /// Recipient address
    pub to: String,
}

/// Complete SMTP credential set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    /// Relay hostname
    pub host: String,
    /// Relay port
    pub port: u16,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: String,
    /// Sender address (may include a display name)
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Transport security
    pub tls: TlsMode,
}

fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

impl EmailSettings {
    /// Per-attempt provider timeout
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    fn sender(&self, address: &str) -> String {
        if address.contains('<') {
            address.to_string()
        } else {
            format!("{} <{address}>", self.sender_name)
        }
    }

    /// `SendGrid` credentials, if the set is complete
    #[must_use]
    pub fn sendgrid_credentials(&self) -> Option<SendGridCredentials> {
        let raw = self.sendgrid.as_ref()?;
        Some(SendGridCredentials {
            api_key: present(raw.api_key.as_ref())?,
            api_base: present(raw.api_base.as_ref())
                .unwrap_or_else(|| DEFAULT_SENDGRID_API_BASE.to_string()),
            from: present(raw.from.as_ref()).or_else(|| present(self.from.as_ref()))?,
            from_name: self.sender_name.clone(),
            to: present(raw.to.as_ref()).or_else(|| present(self.to.as_ref()))?,
        })
    }

    /// Mailgun SMTP credentials, if the set is complete
    #[must_use]
    pub fn mailgun_credentials(&self) -> Option<SmtpCredentials> {
        let raw = self.mailgun.as_ref()?;
        let from = present(raw.from.as_ref()).or_else(|| present(self.from.as_ref()))?;
        Some(SmtpCredentials {
            host: present(raw.host.as_ref()).unwrap_or_else(|| DEFAULT_MAILGUN_HOST.to_string()),
            port: raw.port.unwrap_or(DEFAULT_SMTP_PORT),
            username: present(raw.username.as_ref())?,
            password: present(raw.password.as_ref())?,
            from: self.sender(&from),
            to: present(raw.to.as_ref()).or_else(|| present(self.to.as_ref()))?,
            tls: raw.tls,
        })
    }

    /// Gmail SMTP credentials, if the set is complete
    ///
    /// The sender defaults to the Gmail account itself.
    #[must_use]
    pub fn gmail_credentials(&self) -> Option<SmtpCredentials> {
        let raw = self.gmail.as_ref()?;
        let username = present(raw.username.as_ref())?;
        let from = present(raw.from.as_ref())
            .or_else(|| present(self.from.as_ref()))
            .unwrap_or_else(|| username.clone());
        Some(SmtpCredentials {
            host: present(raw.host.as_ref()).unwrap_or_else(|| DEFAULT_GMAIL_HOST.to_string()),
            port: raw.port.unwrap_or(DEFAULT_SMTP_PORT),
            password: present(raw.password.as_ref())?,
            from: self.sender(&from),
            to: present(raw.to.as_ref()).or_else(|| present(self.to.as_ref()))?,
            username,
            tls: raw.tls,
        })
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StratekConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Rate limiting settings
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// PDF rendering settings
    #[serde(default)]
    pub pdf: PdfSettings,

    /// Email delivery settings
    #[serde(default)]
    pub email: EmailSettings,
}

impl StratekConfig {
    /// Load configuration from `./stratek.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns [`StratekError::Config`] if:
    /// - Default configuration cannot be serialized to TOML
    /// - The configuration file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    pub fn load() -> Result<Self, StratekError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file plus the environment
    ///
    /// A missing file is not an error; the environment alone can configure
    /// the whole service.
    ///
    /// # Errors
    ///
    /// Same as [`StratekConfig::load`].
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, StratekError> {
        let mut config: Self = Self::figment(path.as_ref())?
            .extract()
            .map_err(|e| StratekError::config(e.to_string()))?;
        config.apply_legacy_tls(std::env::var("MAIL_SSL_TLS").ok().as_deref());

        if config.server.request_timeout_secs <= config.pipeline_budget_secs() {
            tracing::warn!(
                request_timeout_secs = config.server.request_timeout_secs,
                pipeline_budget_secs = config.pipeline_budget_secs(),
                "Request timeout can fire before every email provider is tried"
            );
        }
        Ok(config)
    }

    /// Worst-case seconds one submission spends rendering and delivering
    ///
    /// PDF timeout plus one provider timeout for each of the three providers.
    #[must_use]
    pub const fn pipeline_budget_secs(&self) -> u64 {
        self.pdf
            .timeout_secs
            .saturating_add(self.email.provider_timeout_secs.saturating_mul(3))
    }

    fn figment(path: &Path) -> Result<Figment, StratekError> {
        let defaults =
            toml::to_string(&Self::default()).map_err(|e| StratekError::config(e.to_string()))?;

        Ok(Figment::new()
            // Start with defaults
            .merge(Toml::string(&defaults))
            // Configuration file (skipped when missing)
            .merge(Toml::file(path))
            // Flat legacy names
            .merge(Env::raw().filter_map(legacy_key))
            // Prefixed variables override everything
            .merge(Env::prefixed("STRATEK_").split("__").lowercase(true)))
    }

    /// `MAIL_SSL_TLS=True` selects implicit TLS for the Mailgun relay
    fn apply_legacy_tls(&mut self, flag: Option<&str>) {
        if let (Some(flag), Some(mailgun)) = (flag, self.email.mailgun.as_mut()) {
            if flag.trim().eq_ignore_ascii_case("true") {
                mailgun.tls = TlsMode::Implicit;
            }
        }
    }
}

fn legacy_key(key: &UncasedStr) -> Option<Uncased<'_>> {
    LEGACY_ENV_KEYS
        .iter()
        .find(|(name, _)| key == *name)
        .map(|(_, nested)| Uncased::from(*nested))
}

/// Accept numbers and booleans where a string is expected.
///
/// Environment values are type-inferred, so an all-digit password or API key
/// would otherwise fail to deserialize.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
        Flag(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(s) => s,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Flag(b) => b.to_string(),
    }))
}
