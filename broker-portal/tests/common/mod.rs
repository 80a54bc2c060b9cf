//! Test helpers: an in-process portal wired to a scripted broker.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use broker_portal::config::{
    Credentials, PortalSettings, ServerSettings, TelemetrySettings, VendorSettings,
};
use broker_portal::models::{AccountQuery, QueryResult, RequestToken};
use broker_portal::services::{BrokerApi, BrokerConnector, GatewayError};
use broker_portal::startup::build_router;
use broker_portal::AppState;
use http::{header, HeaderMap, StatusCode};
use secrecy::Secret;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_BASE_URL: &str = "https://portal.test";
pub const TEST_LOGIN_URL: &str = "https://broker.test/api-connect/login";

/// Recorded vendor call: (operation label, token).
pub type Call = (String, String);

/// Scripted vendor: records every call and fails the operations it is told to.
#[derive(Clone, Default)]
pub struct FakeBroker {
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Arc<Mutex<HashSet<AccountQuery>>>,
    rejected_tokens: Arc<Mutex<HashSet<String>>>,
}

impl FakeBroker {
    pub fn fail(&self, query: AccountQuery) {
        self.failing.lock().unwrap().insert(query);
    }

    pub fn recover(&self, query: AccountQuery) {
        self.failing.lock().unwrap().remove(&query);
    }

    pub fn reject_token(&self, token: &str) {
        self.rejected_tokens.lock().unwrap().insert(token.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Calls for `label` made with `token`.
    pub fn count(&self, label: &str, token: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(l, t)| l == label && t == token)
            .count()
    }

    fn record(&self, label: &str, token: &RequestToken) {
        self.calls
            .lock()
            .unwrap()
            .push((label.to_string(), token.as_str().to_string()));
    }
}

/// Payload fragment the fake returns for `query` and `token`.
pub fn fragment(query: AccountQuery, token: &str) -> String {
    format!("{}-for-{}", query.label(), token)
}

struct FakeClient {
    broker: FakeBroker,
    token: RequestToken,
}

#[async_trait]
impl BrokerApi for FakeClient {
    async fn init(&self) -> Result<QueryResult, GatewayError> {
        self.broker.record("init", &self.token);

        if self
            .broker
            .rejected_tokens
            .lock()
            .unwrap()
            .contains(self.token.as_str())
        {
            return Err(GatewayError::Rejected {
                status: 401,
                message: "invalid request id".to_string(),
            });
        }

        Ok(QueryResult(json!({ "client": "TEST01" })))
    }

    async fn fetch(&self, query: AccountQuery) -> Result<QueryResult, GatewayError> {
        self.broker.record(query.label(), &self.token);

        if self.broker.failing.lock().unwrap().contains(&query) {
            return Err(GatewayError::Rejected {
                status: 502,
                message: format!("{} unavailable", query.label()),
            });
        }

        Ok(QueryResult(json!({
            "fragment": fragment(query, self.token.as_str())
        })))
    }
}

impl BrokerConnector for FakeBroker {
    fn connect(
        &self,
        credentials: &Credentials,
        token: &RequestToken,
    ) -> Result<Box<dyn BrokerApi>, GatewayError> {
        assert_eq!(credentials.api_key, TEST_API_KEY);

        Ok(Box::new(FakeClient {
            broker: self.clone(),
            token: token.clone(),
        }))
    }
}

pub fn test_settings() -> PortalSettings {
    PortalSettings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            base_url: TEST_BASE_URL.to_string(),
            session_secret: Secret::new("test-session-secret-that-is-long-enough".to_string()),
            secure_cookies: false,
            session_idle_hours: None,
        },
        vendor: VendorSettings {
            api_key: TEST_API_KEY.to_string(),
            api_secret: Secret::new("test-api-secret".to_string()),
            login_url: TEST_LOGIN_URL.to_string(),
            api_url: "https://broker.test/api".to_string(),
            verify_login: true,
            request_timeout_secs: None,
        },
        telemetry: TelemetrySettings::default(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn assert_redirect_to(&self, target: &str) {
        assert!(
            self.status.is_redirection(),
            "expected redirect, got {}: {}",
            self.status,
            self.body
        );
        assert_eq!(self.location(), Some(target));
    }
}

/// The portal router plus a one-browser cookie jar.
pub struct TestApp {
    pub router: Router,
    pub broker: FakeBroker,
    cookie: Mutex<Option<String>>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::spawn_with(test_settings())
    }

    pub fn spawn_with(settings: PortalSettings) -> Self {
        let broker = FakeBroker::default();
        let state = AppState::new(&settings, Arc::new(broker.clone()));

        TestApp {
            router: build_router(state, &settings.server),
            broker,
            cookie: Mutex::new(None),
        }
    }

    /// Send a GET carrying the current session cookie and keep any new one.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = self.cookie.lock().unwrap().clone() {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            *self.cookie.lock().unwrap() = Some(pair);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn login(&self, token: &str) -> TestResponse {
        self.get(&format!("/login?request_id={}", token)).await
    }

    pub fn has_cookie(&self) -> bool {
        self.cookie.lock().unwrap().is_some()
    }
}
