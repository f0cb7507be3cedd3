//! Third-party bank account lookup.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::config::BankApiConfig;
use crate::error::ExternalServiceError;

const SERVICE: &str = "bank lookup";

/// Resolves a bank account number to the upstream account details.
#[async_trait]
pub trait BankVerifier: Send + Sync {
    async fn verify(&self, account_number: &str, bank_code: &str) -> Result<JsonValue, ExternalServiceError>;
}

/// Calls `GET {base_url}/bank/resolve?account_number=..&bank_code=..` with a
/// bearer secret and passes the JSON body through.
#[derive(Debug, Clone)]
pub struct HttpBankVerifier {
    client: reqwest::Client,
    base_url: Option<String>,
    secret: Option<String>,
}

impl HttpBankVerifier {
    pub fn new(config: &BankApiConfig) -> Result<Self, ExternalServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| unavailable(format!("failed to build HTTP client: {e}"), false))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            secret: config.secret.clone(),
        })
    }
}

#[async_trait]
impl BankVerifier for HttpBankVerifier {
    async fn verify(&self, account_number: &str, bank_code: &str) -> Result<JsonValue, ExternalServiceError> {
        let Some(base_url) = &self.base_url else {
            return Err(unavailable("bank lookup is not configured", false));
        };

        let mut request = self
            .client
            .get(format!("{base_url}/bank/resolve"))
            .query(&[("account_number", account_number), ("bank_code", bank_code)]);
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(error = %e, "bank lookup timed out");
                ExternalServiceError {
                    service: SERVICE,
                    message: "upstream timed out".to_string(),
                    retryable: true,
                    timeout: true,
                }
            } else {
                tracing::warn!(error = %e, "bank lookup request failed");
                unavailable(e.to_string(), true)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "bank lookup returned an error status");
            return Err(unavailable(
                format!("upstream responded with {status}"),
                status.is_server_error() || status.as_u16() == 429,
            ));
        }

        response
            .json::<JsonValue>()
            .await
            .map_err(|e| unavailable(format!("invalid upstream response: {e}"), true))
    }
}

fn unavailable(message: impl Into<String>, retryable: bool) -> ExternalServiceError {
    ExternalServiceError {
        service: SERVICE,
        message: message.into(),
        retryable,
        timeout: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unconfigured_lookup_fails_without_io() {
        let verifier = HttpBankVerifier::new(&BankApiConfig {
            base_url: None,
            secret: None,
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        let err = verifier.verify("0123456789", "058").await.unwrap_err();
        assert!(!err.retryable);
        assert!(!err.timeout);
    }
}
