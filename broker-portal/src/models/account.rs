use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only account queries the vendor API answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountQuery {
    Summary,
    TradeHistory,
    OrderBook,
    TradeBook,
    PositionBook,
    HoldingBook,
    Limits,
    Funds,
}

impl AccountQuery {
    pub const ALL: [AccountQuery; 8] = [
        AccountQuery::Summary,
        AccountQuery::TradeHistory,
        AccountQuery::OrderBook,
        AccountQuery::TradeBook,
        AccountQuery::PositionBook,
        AccountQuery::HoldingBook,
        AccountQuery::Limits,
        AccountQuery::Funds,
    ];

    /// Stable identifier used in logs and metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            AccountQuery::Summary => "summary",
            AccountQuery::TradeHistory => "trade_history",
            AccountQuery::OrderBook => "order_book",
            AccountQuery::TradeBook => "trade_book",
            AccountQuery::PositionBook => "position_book",
            AccountQuery::HoldingBook => "holding_book",
            AccountQuery::Limits => "limits",
            AccountQuery::Funds => "funds",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AccountQuery::Summary => "Account Summary",
            AccountQuery::TradeHistory => "Trades",
            AccountQuery::OrderBook => "Order Book",
            AccountQuery::TradeBook => "Trade Book",
            AccountQuery::PositionBook => "Positions",
            AccountQuery::HoldingBook => "Holdings",
            AccountQuery::Limits => "Limits",
            AccountQuery::Funds => "Funds",
        }
    }

    /// Vendor REST resource, relative to the API root.
    pub fn resource(&self) -> &'static str {
        match self {
            AccountQuery::Summary => "account/summary",
            AccountQuery::TradeHistory => "trades/history",
            AccountQuery::OrderBook => "orders",
            AccountQuery::TradeBook => "trades",
            AccountQuery::PositionBook => "positions",
            AccountQuery::HoldingBook => "holdings",
            AccountQuery::Limits => "limits",
            AccountQuery::Funds => "funds",
        }
    }
}

impl fmt::Display for AccountQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vendor payload passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResult(pub serde_json::Value);

impl QueryResult {
    /// Parse a vendor body, keeping non-JSON bodies as a string.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => Self(value),
            Err(_) => Self(serde_json::Value::String(body.to_string())),
        }
    }

    /// Text shown inside `<pre>`; strings are shown without JSON quoting.
    pub fn to_display(&self) -> String {
        match &self.0 {
            serde_json::Value::String(text) => text.clone(),
            value => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        }
    }
}
