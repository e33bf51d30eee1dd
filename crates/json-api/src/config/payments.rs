//! Payments Config

use clap::Args;

/// Payment provider and webhook settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Provider payments are placed with unless the caller picks one
    #[arg(long = "payment-provider", env = "PAYMENT_PROVIDER", default_value = "stripe")]
    pub provider_name: String,

    /// Base URL of the provider gateway
    #[arg(long = "payment-provider-url", env = "PAYMENT_PROVIDER_URL")]
    pub provider_url: String,

    /// API key sent to the provider gateway
    #[arg(
        long = "payment-provider-api-key",
        env = "PAYMENT_PROVIDER_API_KEY",
        hide_env_values = true
    )]
    pub provider_api_key: String,

    /// Shared token provider webhooks must present
    #[arg(long, env = "PAYMENT_WEBHOOK_TOKEN", hide_env_values = true)]
    pub webhook_token: String,
}
