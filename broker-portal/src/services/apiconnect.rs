//! HTTP client for the vendor's APIConnect REST endpoints.

use crate::config::{Credentials, VendorSettings};
use crate::models::{AccountQuery, QueryResult, RequestToken};
use crate::services::gateway::{BrokerApi, BrokerConnector, GatewayError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use service_core::observability::TracedClientExt;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Connector that opens a new HTTP client per request.
pub struct ApiConnectConnector {
    settings: VendorSettings,
}

impl ApiConnectConnector {
    pub fn new(settings: VendorSettings) -> Self {
        Self { settings }
    }
}

impl BrokerConnector for ApiConnectConnector {
    fn connect(
        &self,
        credentials: &Credentials,
        token: &RequestToken,
    ) -> Result<Box<dyn BrokerApi>, GatewayError> {
        let mut builder = Client::builder();
        if let Some(secs) = self.settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Box::new(ApiConnectClient {
            client: builder.build()?,
            api_url: self.settings.api_url.trim_end_matches('/').to_string(),
            credentials: credentials.clone(),
            token: token.clone(),
        }))
    }
}

pub struct ApiConnectClient {
    client: Client,
    api_url: String,
    credentials: Credentials,
    token: RequestToken,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    api_key: &'a str,
    request_id: &'a str,
    checksum: String,
}

impl ApiConnectClient {
    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.api_url, resource)
    }

    async fn read(response: reqwest::Response) -> Result<QueryResult, GatewayError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(QueryResult::from_body(&body))
    }
}

#[async_trait]
impl BrokerApi for ApiConnectClient {
    async fn init(&self) -> Result<QueryResult, GatewayError> {
        let request = SessionRequest {
            api_key: &self.credentials.api_key,
            request_id: self.token.as_str(),
            checksum: session_checksum(&self.credentials, &self.token),
        };

        let response = self
            .client
            .traced_post(&self.url("session"))
            .json(&request)
            .send()
            .await?;

        Self::read(response).await
    }

    async fn fetch(&self, query: AccountQuery) -> Result<QueryResult, GatewayError> {
        let response = self
            .client
            .traced_get(&self.url(query.resource()))
            .header("api-key", &self.credentials.api_key)
            .bearer_auth(self.token.as_str())
            .send()
            .await?;

        Self::read(response).await
    }
}

/// `hex(sha256(api_key || request_id || api_secret))`, proving possession
/// of the secret without sending it.
pub fn session_checksum(credentials: &Credentials, token: &RequestToken) -> String {
    let mut hasher = Sha256::new();
    hasher.update(credentials.api_key.as_bytes());
    hasher.update(token.as_str().as_bytes());
    hasher.update(credentials.api_secret.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}
