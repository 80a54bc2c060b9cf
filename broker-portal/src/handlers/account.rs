use crate::error::PortalError;
use crate::handlers::render;
use crate::models::{AccountQuery, Authenticated, QueryResult, RequestToken};
use crate::services::{AccountSession, GatewayError};
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::Html};

#[derive(Template)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub title: &'static str,
    pub payload: String,
}

pub(crate) async fn open(
    state: &AppState,
    token: &RequestToken,
) -> Result<AccountSession, PortalError> {
    state
        .gateway
        .open(token)
        .await
        .map_err(PortalError::Upstream)
}

fn show(
    query: AccountQuery,
    result: Result<QueryResult, GatewayError>,
) -> Result<Html<String>, PortalError> {
    let result = result.map_err(PortalError::Upstream)?;

    render(&AccountTemplate {
        title: query.title(),
        payload: result.to_display(),
    })
}

pub async fn orders(
    State(state): State<AppState>,
    Authenticated(token): Authenticated,
) -> Result<Html<String>, PortalError> {
    let account = open(&state, &token).await?;
    show(AccountQuery::OrderBook, account.order_book().await)
}

pub async fn trades(
    State(state): State<AppState>,
    Authenticated(token): Authenticated,
) -> Result<Html<String>, PortalError> {
    let account = open(&state, &token).await?;
    show(AccountQuery::TradeBook, account.trade_book().await)
}

pub async fn positions(
    State(state): State<AppState>,
    Authenticated(token): Authenticated,
) -> Result<Html<String>, PortalError> {
    let account = open(&state, &token).await?;
    show(AccountQuery::PositionBook, account.position_book().await)
}

pub async fn holdings(
    State(state): State<AppState>,
    Authenticated(token): Authenticated,
) -> Result<Html<String>, PortalError> {
    let account = open(&state, &token).await?;
    show(AccountQuery::HoldingBook, account.holding_book().await)
}

pub async fn limits(
    State(state): State<AppState>,
    Authenticated(token): Authenticated,
) -> Result<Html<String>, PortalError> {
    let account = open(&state, &token).await?;
    show(AccountQuery::Limits, account.limits().await)
}

pub async fn funds(
    State(state): State<AppState>,
    Authenticated(token): Authenticated,
) -> Result<Html<String>, PortalError> {
    let account = open(&state, &token).await?;
    show(AccountQuery::Funds, account.funds().await)
}
