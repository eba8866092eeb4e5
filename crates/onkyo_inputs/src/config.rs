//! Configuration file parsing and structures.
//!
//! onkyo-inputs reads a single TOML file describing the receivers it can talk
//! to, how patiently to wait for them, and how to log.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

use crate::eiscp::DEFAULT_PORT;
use crate::inputs::InputId;
use crate::query::QueryOptions;

/// Top-level configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub query: QueryConfig,

    /// Receivers by name
    #[serde(default)]
    pub receivers: BTreeMap<String, ReceiverConfig>,

    /// Replacement default labels, keyed by input id
    #[serde(default)]
    pub labels: BTreeMap<InputId, String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,

    /// Per-target levels, e.g. `"onkyo_inputs::query" = "debug"`
    #[serde(default)]
    pub overrides: HashMap<String, LogLevel>,
}

fn default_request_timeout_ms() -> u64 {
    300
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

/// How long to wait on the receiver
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Wait for each IRN reply, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Pause after connecting before the first request, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// TCP connect timeout, in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl QueryConfig {
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// One receiver on the network
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReceiverConfig {
    /// Hostname or IP address
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Only query these inputs instead of the whole label table
    #[serde(default)]
    pub inputs: Option<Vec<InputId>>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "query.request_timeout_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.query.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "query.connect_timeout_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        for (name, receiver) in &self.receivers {
            if receiver.host.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("receivers.{}.host", name),
                    message: "must not be empty".to_string(),
                });
            }
            if matches!(&receiver.inputs, Some(inputs) if inputs.is_empty()) {
                return Err(ConfigError::Invalid {
                    field: format!("receivers.{}.inputs", name),
                    message: "must list at least one input, or be omitted".to_string(),
                });
            }
        }

        for (id, label) in &self.labels {
            if label.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("labels.{}", id),
                    message: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Pick a receiver by name, or the only one configured when `name` is `None`
    pub fn receiver(&self, name: Option<&str>) -> Result<&ReceiverConfig, ConfigError> {
        match name {
            Some(name) => self
                .receivers
                .get(name)
                .ok_or_else(|| ConfigError::UnknownReceiver(name.to_string())),
            None => {
                let mut receivers = self.receivers.values();
                match (receivers.next(), receivers.next()) {
                    (Some(receiver), None) => Ok(receiver),
                    (None, _) => Err(ConfigError::NoReceiver),
                    (Some(_), Some(_)) => Err(ConfigError::AmbiguousReceiver(
                        self.receivers.keys().cloned().collect::<Vec<_>>().join(", "),
                    )),
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("No receiver named {0:?} in config")]
    UnknownReceiver(String),

    #[error("No receiver configured")]
    NoReceiver,

    #[error("Several receivers configured ({0}), pick one")]
    AmbiguousReceiver(String),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [receivers.living_room]
            host = "192.168.1.100"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.query.request_timeout_ms, 300);
        assert_eq!(config.query.options(), QueryOptions::default());

        let receiver = config.receiver(None).unwrap();
        assert_eq!(receiver.host, "192.168.1.100");
        assert_eq!(receiver.port, 60128);
        assert!(receiver.inputs.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [logging]
            level = "warn"

            [logging.overrides]
            "onkyo_inputs::query" = "debug"

            [query]
            request_timeout_ms = 500
            settle_delay_ms = 0
            connect_timeout_ms = 2000

            [receivers.den]
            host = "den-receiver.local"
            port = 60129
            inputs = ["00", "01", "2B"]

            [receivers.kitchen]
            host = "10.0.0.7"

            [labels]
            23 = "CBL/SAT"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(
            config.logging.overrides.get("onkyo_inputs::query"),
            Some(&LogLevel::Debug)
        );
        assert_eq!(config.query.options().request_timeout, Duration::from_millis(500));
        assert!(config.query.options().settle_delay.is_zero());
        assert_eq!(config.query.connect_timeout(), Duration::from_secs(2));

        let den = config.receiver(Some("den")).unwrap();
        assert_eq!(den.port, 60129);
        assert_eq!(den.inputs.as_ref().unwrap().len(), 3);

        let cbl = InputId::new("23").unwrap();
        assert_eq!(config.labels.get(&cbl).map(String::as_str), Some("CBL/SAT"));
    }

    #[test]
    fn test_rejects_bad_input_id() {
        let toml = r#"
            [receivers.den]
            host = "den-receiver.local"
            inputs = ["00", "video1"]
        "#;

        let err = toml::from_str::<Config>(toml).unwrap_err();
        assert!(err.to_string().contains("invalid input id"));
    }

    #[test]
    fn test_validate_errors() {
        let config: Config = toml::from_str(
            r#"
            [query]
            request_timeout_ms = 0
        "#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("query.request_timeout_ms"));

        let config: Config = toml::from_str(
            r#"
            [receivers.den]
            host = "  "
        "#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("receivers.den.host"));

        let config: Config = toml::from_str(
            r#"
            [receivers.den]
            host = "den.local"
            inputs = []
        "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_receiver_selection() {
        let config = Config::default();
        assert!(matches!(config.receiver(None), Err(ConfigError::NoReceiver)));

        let config: Config = toml::from_str(
            r#"
            [receivers.a]
            host = "a.local"

            [receivers.b]
            host = "b.local"
        "#,
        )
        .unwrap();
        let err = config.receiver(None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Several receivers configured (a, b), pick one"
        );
        assert_eq!(config.receiver(Some("b")).unwrap().host, "b.local");
        assert!(matches!(
            config.receiver(Some("c")),
            Err(ConfigError::UnknownReceiver(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("onkyo.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[logging]
level = "debug"

[receivers.den]
host = "den.local"
"#
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.receivers.len(), 1);

        let missing = Config::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_, _)));
    }
}
