//! Account gateway over the vendor trading API.
//!
//! A fresh vendor client is built for every request from the process
//! credentials and the visitor's request token. Nothing is pooled or
//! cached between requests, so an expired token only ever affects the
//! request that carried it.

use crate::config::Credentials;
use crate::models::{AccountQuery, QueryResult, RequestToken};
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("broker rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("broker unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unreadable broker response: {0}")]
    Decode(String),
}

/// One vendor client instance, bound to a single request token.
#[async_trait]
pub trait BrokerApi: Send + Sync {
    /// Exchange the request token for a vendor session and return the
    /// login metadata.
    async fn init(&self) -> Result<QueryResult, GatewayError>;

    async fn fetch(&self, query: AccountQuery) -> Result<QueryResult, GatewayError>;
}

/// Builds vendor clients.
pub trait BrokerConnector: Send + Sync {
    fn connect(
        &self,
        credentials: &Credentials,
        token: &RequestToken,
    ) -> Result<Box<dyn BrokerApi>, GatewayError>;
}

#[derive(Clone)]
pub struct AccountGateway {
    credentials: Arc<Credentials>,
    connector: Arc<dyn BrokerConnector>,
}

impl AccountGateway {
    pub fn new(credentials: Credentials, connector: Arc<dyn BrokerConnector>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            connector,
        }
    }

    /// Construct a vendor client for `token` and run the session exchange.
    pub async fn open(&self, token: &RequestToken) -> Result<AccountSession, GatewayError> {
        let client = self
            .connector
            .connect(&self.credentials, token)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to construct broker client");
                e
            })?;

        let metadata = client.init().await;
        record_outcome("init", metadata.is_ok());

        let metadata = metadata.map_err(|e| {
            tracing::warn!(error = %e, "Broker session exchange failed");
            e
        })?;

        Ok(AccountSession { client, metadata })
    }
}

/// An initialised vendor client for the lifetime of one HTTP request.
pub struct AccountSession {
    client: Box<dyn BrokerApi>,
    metadata: QueryResult,
}

impl AccountSession {
    /// Login metadata returned by the session exchange.
    pub fn metadata(&self) -> &QueryResult {
        &self.metadata
    }

    pub async fn summary(&self) -> Result<QueryResult, GatewayError> {
        self.fetch(AccountQuery::Summary).await
    }

    pub async fn trade_history(&self) -> Result<QueryResult, GatewayError> {
        self.fetch(AccountQuery::TradeHistory).await
    }

    pub async fn order_book(&self) -> Result<QueryResult, GatewayError> {
        self.fetch(AccountQuery::OrderBook).await
    }

    pub async fn trade_book(&self) -> Result<QueryResult, GatewayError> {
        self.fetch(AccountQuery::TradeBook).await
    }

    pub async fn position_book(&self) -> Result<QueryResult, GatewayError> {
        self.fetch(AccountQuery::PositionBook).await
    }

    pub async fn holding_book(&self) -> Result<QueryResult, GatewayError> {
        self.fetch(AccountQuery::HoldingBook).await
    }

    pub async fn limits(&self) -> Result<QueryResult, GatewayError> {
        self.fetch(AccountQuery::Limits).await
    }

    pub async fn funds(&self) -> Result<QueryResult, GatewayError> {
        self.fetch(AccountQuery::Funds).await
    }

    async fn fetch(&self, query: AccountQuery) -> Result<QueryResult, GatewayError> {
        let result = self.client.fetch(query).await;
        record_outcome(query.label(), result.is_ok());

        result.map_err(|e| {
            tracing::error!(operation = %query, error = %e, "Broker query failed");
            e
        })
    }
}

fn record_outcome(operation: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("broker_requests_total", "operation" => operation, "outcome" => outcome).increment(1);
}
