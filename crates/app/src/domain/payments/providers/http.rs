//! JSON-over-HTTP payment provider client.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::domain::payments::{
    errors::ProviderError,
    providers::{Authorization, AuthorizationRequest, PaymentProvider},
};

/// Connection settings for an HTTP payment provider.
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// Base URL, e.g. `"https://payments.internal"`.
    pub base_url: String,

    /// Bearer token sent with every call.
    pub api_key: String,
}

/// Talks to a provider gateway exposing `/authorizations` endpoints.
#[derive(Debug, Clone)]
pub struct HttpPaymentProvider {
    config: HttpProviderConfig,
    http: Client,
}

impl HttpPaymentProvider {
    #[must_use]
    pub fn new(config: HttpProviderConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
        idempotency_key: Option<&str>,
    ) -> Result<Response, ProviderError> {
        let mut request = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .json(&body);

        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await?;

        ensure_success(path, response).await
    }
}

/// Declines come back as 402/422 with a message; anything else unexpected is reported verbatim.
async fn ensure_success(path: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();

    if matches!(
        status,
        StatusCode::PAYMENT_REQUIRED | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        let message = serde_json::from_str::<DeclineBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);

        return Err(ProviderError::Declined(message));
    }

    Err(ProviderError::UnexpectedResponse(format!(
        "{path} failed with status {status}: {text}"
    )))
}

#[async_trait]
impl PaymentProvider for HttpPaymentProvider {
    async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<Authorization, ProviderError> {
        let body = json!({
            "amount": request.amount,
            "currency": request.currency,
            "customer": request.customer,
            "description": request.description,
            "capture_method": "manual",
        });

        let response = self
            .post("/authorizations", body, Some(&request.idempotency_key))
            .await?;

        Ok(response.json().await?)
    }

    async fn capture_full(&self, reference: &str, amount: u64) -> Result<(), ProviderError> {
        self.post(
            &format!("/authorizations/{reference}/capture"),
            json!({ "amount": amount }),
            None,
        )
        .await?;

        Ok(())
    }

    async fn capture_partial(
        &self,
        reference: &str,
        authorized: u64,
        amount: u64,
    ) -> Result<(), ProviderError> {
        self.post(
            &format!("/authorizations/{reference}/capture"),
            json!({ "amount": amount, "authorized_amount": authorized }),
            None,
        )
        .await?;

        Ok(())
    }

    async fn release(&self, reference: &str) -> Result<(), ProviderError> {
        self.post(
            &format!("/authorizations/{reference}/cancel"),
            json!({}),
            None,
        )
        .await?;

        Ok(())
    }

    async fn is_authorization_valid(&self, reference: &str) -> Result<bool, ProviderError> {
        let path = format!("/authorizations/{reference}");

        let response = self
            .http
            .get(self.url(&path))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let parsed: AuthorizationStatusBody = ensure_success(&path, response).await?.json().await?;

        Ok(parsed.status == "requires_capture")
    }
}

#[derive(Debug, Deserialize)]
struct DeclineBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AuthorizationStatusBody {
    status: String,
}
