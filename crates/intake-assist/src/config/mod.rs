use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub openai: OpenAiConfig,
    pub persistence: NocoDbConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        let timeout_secs = env::var("OUTBOUND_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_OUTBOUND_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;
        let timeout = Duration::from_secs(timeout_secs);

        let openai = OpenAiConfig {
            api_key: non_empty_var("OPENAI_API_KEY"),
            base_url: non_empty_var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: non_empty_var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            moderation_model: non_empty_var("OPENAI_MODERATION_MODEL"),
            timeout,
        };

        let table_name =
            non_empty_var("NOCODB_TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        let auth_method = match non_empty_var("NOCODB_AUTH_METHOD") {
            Some(raw) => NocoDbAuthMethod::parse(&raw).ok_or(ConfigError::InvalidAuthMethod(raw))?,
            None => NocoDbAuthMethod::XcToken,
        };
        let record_lookup = match non_empty_var("NOCODB_RECORD_LOOKUP") {
            Some(raw) => RecordLookup::parse(&raw).ok_or(ConfigError::InvalidRecordLookup(raw))?,
            None => RecordLookup::default_for_table(&table_name),
        };

        let persistence = NocoDbConfig {
            api_url: non_empty_var("NOCODB_API_URL"),
            api_key: non_empty_var("NOCODB_API_KEY"),
            table_name,
            auth_method,
            record_lookup,
            timeout,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            openai,
            persistence,
        })
    }
}

pub const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TABLE_NAME: &str = "sessions";

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Chat completion and moderation endpoint settings.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub moderation_model: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("moderation_model", &self.moderation_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Session summary persistence settings.
#[derive(Clone)]
pub struct NocoDbConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub table_name: String,
    pub auth_method: NocoDbAuthMethod,
    pub record_lookup: RecordLookup,
    pub timeout: Duration,
}

impl fmt::Debug for NocoDbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NocoDbConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("table_name", &self.table_name)
            .field("auth_method", &self.auth_method)
            .field("record_lookup", &self.record_lookup)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NocoDbAuthMethod {
    XcToken,
    Bearer,
}

impl NocoDbAuthMethod {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xc-token" | "xc_token" => Some(Self::XcToken),
            "bearer" => Some(Self::Bearer),
            _ => None,
        }
    }
}

/// How an existing row is addressed when updating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLookup {
    /// `PATCH /{table}/{session_id}`
    Path,
    /// `PATCH /{table}?where=(session_id,eq,{session_id})`
    Where,
}

impl RecordLookup {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "path" => Some(Self::Path),
            "where" | "query" => Some(Self::Where),
            _ => None,
        }
    }

    pub fn default_for_table(table_name: &str) -> Self {
        if table_name == "summaries" {
            Self::Where
        } else {
            Self::Path
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidTimeout,
    InvalidAuthMethod(String),
    InvalidRecordLookup(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT '{value}' must be 'compact' or 'json'")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "OUTBOUND_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidAuthMethod(value) => {
                write!(f, "NOCODB_AUTH_METHOD '{value}' must be 'xc-token' or 'bearer'")
            }
            ConfigError::InvalidRecordLookup(value) => {
                write!(f, "NOCODB_RECORD_LOOKUP '{value}' must be 'path' or 'where'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
