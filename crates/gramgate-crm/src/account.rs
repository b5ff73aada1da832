// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the CRM account API.
//!
//! Used only during account linking and the activity callback: verifies
//! the tenant's API key grants the integration-module scopes, and
//! registers (or re-registers) the integration module itself.

use gramgate_core::GramgateError;
use tracing::debug;

use crate::types::{CredentialsResponse, IntegrationEditResponse, IntegrationModule};

const API_KEY_HEADER: &str = "x-api-key";

/// API scopes the bridge requires from a tenant's key.
pub const REQUIRED_CREDENTIALS: &[&str] = &[
    "/api/integration-modules/{code}",
    "/api/integration-modules/{code}/edit",
];

/// Client for one tenant's CRM account API.
#[derive(Debug, Clone)]
pub struct AccountClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AccountClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch the scopes granted to this API key.
    pub async fn get_credentials(&self) -> Result<CredentialsResponse, GramgateError> {
        let response = self
            .http
            .get(format!("{}/api/credentials", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| GramgateError::Crm {
                message: format!("credentials request failed: {e}"),
                status: None,
            })?;

        let status = response.status();
        debug!(status = status.as_u16(), "crm credentials call");
        response
            .json::<CredentialsResponse>()
            .await
            .map_err(|e| GramgateError::Crm {
                message: format!("credentials response unparsable: {e}"),
                status: Some(status.as_u16()),
            })
    }

    /// Create or update the integration module registration.
    ///
    /// Returns the raw response together with the HTTP status; the caller
    /// distinguishes payment-required from other client errors.
    pub async fn edit_integration_module(
        &self,
        module: &IntegrationModule,
    ) -> Result<(IntegrationEditResponse, u16), GramgateError> {
        let response = self
            .http
            .post(format!(
                "{}/api/integration-modules/{}/edit",
                self.base_url, module.code
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(module)
            .send()
            .await
            .map_err(|e| GramgateError::Crm {
                message: format!("integration edit request failed: {e}"),
                status: None,
            })?;

        let status = response.status().as_u16();
        debug!(status, code = %module.code, "crm integration edit call");
        let body = response
            .json::<IntegrationEditResponse>()
            .await
            .map_err(|e| GramgateError::Crm {
                message: format!("integration edit response unparsable: {e}"),
                status: Some(status),
            })?;
        Ok((body, status))
    }
}

/// Which required scopes are missing from `granted`.
pub fn missing_credentials(granted: &[String]) -> Vec<&'static str> {
    REQUIRED_CREDENTIALS
        .iter()
        .filter(|required| !granted.iter().any(|g| g == *required))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn missing_credentials_reports_absent_scopes() {
        let granted = vec!["/api/integration-modules/{code}".to_string()];
        let missing = missing_credentials(&granted);
        assert_eq!(missing, vec!["/api/integration-modules/{code}/edit"]);

        let all: Vec<String> = REQUIRED_CREDENTIALS.iter().map(|s| s.to_string()).collect();
        assert!(missing_credentials(&all).is_empty());
    }

    #[tokio::test]
    async fn get_credentials_sends_api_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/credentials"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "credentials": ["/api/integration-modules/{code}"]
            })))
            .mount(&server)
            .await;

        let client = AccountClient::new(reqwest::Client::new(), &server.uri(), "secret");
        let creds = client.get_credentials().await.unwrap();
        assert!(creds.success);
        assert_eq!(creds.credentials.len(), 1);
    }

    #[tokio::test]
    async fn edit_integration_module_returns_gateway_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/integration-modules/telegram/edit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "info": {
                    "mg_transport": {
                        "endpoint_url": "https://mg.example.com",
                        "token": "mg-token"
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = AccountClient::new(reqwest::Client::new(), &server.uri(), "secret");
        let module = IntegrationModule {
            code: "telegram".into(),
            integration_code: "telegram".into(),
            active: true,
            name: "Telegram".into(),
            client_id: "client-1".into(),
            logo: "https://bridge.example.com/static/telegram_logo.svg".into(),
            base_url: "https://bridge.example.com".into(),
            account_url: "https://bridge.example.com/settings/client-1".into(),
            actions: [("activity".to_string(), "/actions/activity".to_string())]
                .into_iter()
                .collect(),
            integrations: crate::types::Integrations {
                mg_transport: crate::types::MgTransport {
                    webhook_url: "https://bridge.example.com/webhook/".into(),
                },
            },
        };

        let (resp, status) = client.edit_integration_module(&module).await.unwrap();
        assert_eq!(status, 200);
        assert!(resp.success);
        assert_eq!(
            resp.info.mg_transport.unwrap().endpoint_url,
            "https://mg.example.com"
        );
    }
}
