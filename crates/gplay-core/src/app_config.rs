#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the Play Store client and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Origin every request is issued against. Overridden in tests to point
    /// at a mock server.
    pub base_url: String,
    /// Default `hl` parameter when a caller does not pass one.
    pub default_lang: String,
    /// Default `gl` parameter when a caller does not pass one.
    pub default_country: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Minimum gap between two requests sharing a throttle handle.
    pub throttle_interval_ms: u64,
    /// Extra attempts the HTTP client makes on transient errors. The
    /// extraction core never retries on its own.
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}
