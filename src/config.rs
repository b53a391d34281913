//! # Configuration Management
//!
//! Centralized configuration for the TFTP wire codec.
//!
//! The wire format itself is fixed (512-byte blocks, 516-byte datagrams);
//! configuration only tunes how strictly peers are judged, how the block
//! counter behaves at the end of its range, and how the library logs.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`

use crate::error::{Result, TftpError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Maximum supported datagram size
pub const DATAGRAM_SIZE: usize = 516;

/// Header length shared by Data and Acknowledgment packets (opcode + block)
pub const HEADER_SIZE: usize = 4;

/// Payload bytes carried by a full Data packet
pub const BLOCK_SIZE: usize = DATAGRAM_SIZE - HEADER_SIZE;

/// The only transfer mode this codec accepts
pub const OCTET_MODE: &str = "octet";

/// Top-level configuration containing all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TftpConfig {
    /// Decoder strictness
    #[serde(default)]
    pub codec: CodecConfig,

    /// Sender/receiver session behaviour
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TftpConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| TftpError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| TftpError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| TftpError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("TFTP_WIRE_STRICT_TEXT") {
            config.codec.strict_text = parse_env_bool("TFTP_WIRE_STRICT_TEXT", &value)?;
        }

        if let Ok(value) = std::env::var("TFTP_WIRE_REJECT_REQUEST_OPTIONS") {
            config.codec.reject_request_options =
                parse_env_bool("TFTP_WIRE_REJECT_REQUEST_OPTIONS", &value)?;
        }

        if let Ok(value) = std::env::var("TFTP_WIRE_ALLOW_BLOCK_ROLLOVER") {
            config.transfer.allow_block_rollover =
                parse_env_bool("TFTP_WIRE_ALLOW_BLOCK_ROLLOVER", &value)?;
        }

        if let Ok(value) = std::env::var("TFTP_WIRE_LOG_LEVEL") {
            config.logging.log_level = value.parse::<Level>().map_err(|_| {
                TftpError::ConfigError(format!("Invalid TFTP_WIRE_LOG_LEVEL: {value}"))
            })?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TftpError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| TftpError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.transfer.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TftpError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

fn parse_env_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TftpError::ConfigError(format!(
            "Invalid boolean for {name}: {value}"
        ))),
    }
}

/// Decoder strictness settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Reject error packets whose message is not valid UTF-8 instead of
    /// keeping its raw bytes
    #[serde(default)]
    pub strict_text: bool,

    /// Reject read requests carrying bytes (e.g. RFC 2347 options) after the
    /// mode terminator instead of ignoring them
    #[serde(default)]
    pub reject_request_options: bool,
}

/// Session settings for `DataSender` and `DataReceiver`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Wrap the block counter to 0 after 65535 instead of failing the transfer
    pub allow_block_rollover: bool,

    /// Upper bound on blocks per transfer; 0 means unbounded
    pub max_blocks: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            allow_block_rollover: true,
            max_blocks: 0,
        }
    }
}

impl TransferConfig {
    /// Validate transfer configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.allow_block_rollover && self.max_blocks > u32::from(u16::MAX) {
            errors.push(format!(
                "max_blocks {} is unreachable without block rollover (maximum: {})",
                self.max_blocks,
                u16::MAX
            ));
        }

        errors
    }
}

/// Longest accepted `app_name`, in bytes
pub const MAX_APP_NAME_LEN: usize = 64;

/// Settings consumed by `utils::logging::init_logging`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Tag attached to every event of this process
    pub app_name: String,

    /// Fallback filter level when `RUST_LOG` is unset
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Install a subscriber writing to stderr; off leaves the caller's own
    /// subscriber in charge
    pub log_to_console: bool,

    /// Emit newline-delimited JSON instead of human readable lines
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            log_level: Level::INFO,
            log_to_console: true,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        match self.app_name.len() {
            0 => vec!["Application name cannot be empty".to_string()],
            len if len > MAX_APP_NAME_LEN => vec![format!(
                "Application name too long: {len} bytes (maximum: {MAX_APP_NAME_LEN})"
            )],
            _ => Vec::new(),
        }
    }
}

/// `tracing::Level` as a lowercase TOML string
mod log_level_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&level.to_string().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Level>()
            .map_err(|_| de::Error::custom(format!("Invalid log level: {raw}")))
    }
}
