//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    matching::MatchingSettings,
    observability::LoggingConfig,
    payments::PaymentsConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod matching;
pub(crate) mod observability;
pub(crate) mod payments;
pub(crate) mod server;

/// Shortlist JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "shortlist-json", about = "Shortlist JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Payment provider and webhook settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,

    /// Matching and follow-up tunables.
    #[command(flatten)]
    pub matching: MatchingSettings,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const REQUIRED: [&str; 9] = [
        "shortlist-json",
        "--database-url",
        "postgres://localhost/shortlist",
        "--payment-provider-url",
        "https://payments.test",
        "--payment-provider-api-key",
        "secret",
        "--webhook-token",
        "hook",
    ];

    #[test]
    fn defaults_match_the_documented_values() -> TestResult {
        let config = ServerConfig::try_parse_from(REQUIRED)?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.payments.provider_name, "stripe");
        assert_eq!(config.matching.max_results, 15);
        assert_eq!(config.matching.lookback_days, 30);
        assert!((config.matching.similarity_threshold - 70.0).abs() < f64::EPSILON);
        assert!(config.matching.freshness_boost.abs() < f64::EPSILON);

        Ok(())
    }

    #[test]
    fn webhook_token_is_required() {
        let args = REQUIRED.iter().take(7);

        assert!(ServerConfig::try_parse_from(args).is_err());
    }
}
