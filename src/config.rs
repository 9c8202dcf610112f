use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default OpenRouter-compatible API root.
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Default completion model requested from the provider.
pub const DEFAULT_COMPLETION_MODEL: &str = "mistralai/mistral-7b-instruct:free";
/// Default referer advertised to the provider (`HTTP-Referer` header).
pub const DEFAULT_SITE_URL: &str = "http://localhost:5175";
/// Default application title advertised to the provider (`X-Title` header).
pub const DEFAULT_SITE_NAME: &str = "DocuChat AI";
/// Default per-request timeout for provider calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the DocuChat server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Credential for the completion provider. Optional: a missing key is
    /// logged at startup and requests fail at call time instead of at boot.
    pub openrouter_api_key: Option<String>,
    /// Base URL of the OpenRouter-compatible API.
    pub openrouter_base_url: String,
    /// Model identifier requested for every completion.
    pub completion_model: String,
    /// Value sent as the `HTTP-Referer` header on provider calls.
    pub site_url: String,
    /// Value sent as the `X-Title` header on provider calls.
    pub site_name: String,
    /// Per-request timeout applied to provider calls, in seconds.
    pub request_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            openrouter_api_key: load_env_optional("OPENROUTER_API_KEY"),
            openrouter_base_url: load_env_optional("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            completion_model: load_env_optional("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            site_url: load_env_optional("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            site_name: load_env_optional("SITE_NAME")
                .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
            request_timeout_secs: load_env_optional("REQUEST_TIMEOUT_SECS")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    CONFIG.set(config).expect("Failed to set config");
}

/// Report the effective configuration, warning when the provider key is absent.
///
/// Kept separate from [`init_config`], which runs before the tracing subscriber
/// exists; events emitted there land on the no-op dispatcher and are dropped.
pub fn log_startup(config: &Config) {
    if config.openrouter_api_key.is_none() {
        tracing::warn!(
            "OPENROUTER_API_KEY is not set; completion requests will fail until it is provided"
        );
    }
    tracing::debug!(
        base_url = %config.openrouter_base_url,
        model = %config.completion_model,
        server_port = ?config.server_port,
        timeout_secs = config.request_timeout_secs,
        has_api_key = config.openrouter_api_key.is_some(),
        "Loaded configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl CaptureWriter {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("capture lock").clone()).expect("utf8 output")
        }
    }

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn test_config(openrouter_api_key: Option<String>) -> Config {
        Config {
            openrouter_api_key,
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            server_port: None,
        }
    }

    fn captured_startup_log(config: &Config) -> String {
        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || log_startup(config));
        writer.contents()
    }

    #[test]
    fn missing_api_key_warns_on_the_active_subscriber() {
        let output = captured_startup_log(&test_config(None));
        assert!(output.contains("OPENROUTER_API_KEY is not set"));
        assert!(output.contains("Loaded configuration"));
    }

    #[test]
    fn present_api_key_logs_without_warning() {
        let output = captured_startup_log(&test_config(Some("sk-test".into())));
        assert!(!output.contains("OPENROUTER_API_KEY is not set"));
        assert!(output.contains("has_api_key=true"));
    }
}
