use crate::error::PortalError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tower_sessions::Session;

/// Key the typed record is stored under in the session store.
pub const SESSION_RECORD_KEY: &str = "portal.session";

/// Vendor-issued request token, treated as an opaque capability.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(String);

impl RequestToken {
    /// Returns `None` for an empty value. Anything else is kept verbatim.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestToken([REDACTED])")
    }
}

/// Everything the portal keeps per visitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub request_token: Option<RequestToken>,
}

/// Typed access to the visitor's session.
///
/// The cookie-keyed store behind it is a `tower_sessions::SessionStore`
/// (load/save/delete by session id); handlers only see the typed record.
pub struct PortalSession(Session);

impl PortalSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    pub async fn record(&self) -> Result<SessionRecord, PortalError> {
        Ok(self
            .0
            .get::<SessionRecord>(SESSION_RECORD_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn token(&self) -> Result<Option<RequestToken>, PortalError> {
        Ok(self.record().await?.request_token)
    }

    pub async fn store_token(&self, token: RequestToken) -> Result<(), PortalError> {
        let record = SessionRecord {
            request_token: Some(token),
        };
        self.0.insert(SESSION_RECORD_KEY, record).await?;
        Ok(())
    }

    /// Drop the token. Succeeds whether or not one was stored.
    pub async fn clear_token(&self) -> Result<(), PortalError> {
        self.0.remove::<SessionRecord>(SESSION_RECORD_KEY).await?;
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PortalSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        Ok(PortalSession(session))
    }
}

/// Session guard: yields the visitor's token or redirects to `/login`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub RequestToken);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = PortalSession::from_request_parts(parts, state).await?;

        match session.token().await {
            Ok(Some(token)) => Ok(Authenticated(token)),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read session");
                Err(e.into_response())
            }
        }
    }
}
