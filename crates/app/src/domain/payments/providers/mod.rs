//! Payment Providers

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::domain::payments::errors::ProviderError;

mod http;

pub use http::{HttpPaymentProvider, HttpProviderConfig};

/// Parameters for placing a hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationRequest {
    /// Amount in minor units.
    pub amount: u64,
    pub currency: String,

    /// Provider-side customer identifier (the company).
    pub customer: String,
    pub description: String,

    /// Replaying the same key must not create a second hold.
    pub idempotency_key: String,
}

/// A hold accepted by the provider, awaiting customer confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Authorization {
    pub provider_reference: String,

    /// Opaque value handed to the client to complete confirmation.
    pub client_handle: Option<String>,
}

/// A payment processor able to hold, capture and release funds.
#[automock]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Places a hold.
    async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<Authorization, ProviderError>;

    /// Captures the whole hold.
    async fn capture_full(&self, reference: &str, amount: u64) -> Result<(), ProviderError>;

    /// Captures `amount` of the `authorized` hold and releases the remainder.
    async fn capture_partial(
        &self,
        reference: &str,
        authorized: u64,
        amount: u64,
    ) -> Result<(), ProviderError>;

    /// Cancels the hold.
    async fn release(&self, reference: &str) -> Result<(), ProviderError>;

    /// Whether the customer has confirmed the hold and it is still valid.
    async fn is_authorization_valid(&self, reference: &str) -> Result<bool, ProviderError>;
}

/// Providers addressable by name.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: FxHashMap<String, Arc<dyn PaymentProvider>>,
    default: String,
}

impl ProviderRegistry {
    /// An empty registry that resolves unnamed payments to `default`.
    #[must_use]
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            providers: FxHashMap::default(),
            default: default.into(),
        }
    }

    /// Adds or replaces a provider.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, provider: Arc<dyn PaymentProvider>) -> Self {
        self.register(name, provider);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn PaymentProvider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PaymentProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();

        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_registered_names_only() {
        let registry = ProviderRegistry::new("card").with("card", Arc::new(MockPaymentProvider::new()));

        assert!(registry.get("card").is_some());
        assert!(registry.get("invoice").is_none());
        assert_eq!(registry.default_name(), "card");
    }

    #[test]
    fn debug_lists_provider_names() {
        let registry = ProviderRegistry::new("card")
            .with("invoice", Arc::new(MockPaymentProvider::new()))
            .with("card", Arc::new(MockPaymentProvider::new()));

        let rendered = format!("{registry:?}");

        assert!(rendered.contains(r#"["card", "invoice"]"#), "{rendered}");
    }
}
