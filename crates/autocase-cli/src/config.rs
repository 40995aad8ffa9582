use tracing_subscriber::EnvFilter;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "AUTOCASE_API_URL";
pub const LOG_LEVEL_ENV: &str = "AUTOCASE_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Runtime configuration gathered from flags and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the analysis API, without the endpoint path.
    pub api_url: String,
    /// Default tracing filter; `RUST_LOG` takes precedence when set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Initialise structured logging on stderr so stdout carries only the report.
    pub fn init_logging(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(&self.log_level)),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}
