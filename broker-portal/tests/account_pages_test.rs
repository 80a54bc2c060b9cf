mod common;

use broker_portal::models::AccountQuery;
use common::{fragment, TestApp};
use http::StatusCode;

const PAGES: [(&str, AccountQuery); 6] = [
    ("/orders", AccountQuery::OrderBook),
    ("/trades", AccountQuery::TradeBook),
    ("/positions", AccountQuery::PositionBook),
    ("/holdings", AccountQuery::HoldingBook),
    ("/limits", AccountQuery::Limits),
    ("/funds", AccountQuery::Funds),
];

#[tokio::test]
async fn protected_paths_redirect_to_login_without_token() {
    let app = TestApp::spawn();

    for path in ["/"].into_iter().chain(PAGES.iter().map(|(p, _)| *p)) {
        let response = app.get(path).await;
        response.assert_redirect_to("/login");
    }

    assert!(app.broker.calls().is_empty());
}

#[tokio::test]
async fn each_page_runs_exactly_its_query() {
    let app = TestApp::spawn();
    app.login("tok").await;

    for (path, query) in PAGES {
        app.broker.clear_calls();

        let response = app.get(path).await;

        assert_eq!(response.status, StatusCode::OK, "{}", path);
        assert!(response.body.contains(&fragment(query, "tok")), "{}", path);
        assert!(response.body.contains(query.title()), "{}", path);

        let queries: Vec<String> = app
            .broker
            .calls()
            .into_iter()
            .map(|(label, _)| label)
            .filter(|label| label != "init")
            .collect();
        assert_eq!(queries, vec![query.label().to_string()], "{}", path);
    }
}

#[tokio::test]
async fn dashboard_renders_summary_and_trades() {
    let app = TestApp::spawn();

    app.login("abc123").await.assert_redirect_to("/");
    app.broker.clear_calls();

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.broker.count("summary", "abc123"), 1);
    assert_eq!(app.broker.count("trade_history", "abc123"), 1);
    assert!(response
        .body
        .contains(&fragment(AccountQuery::Summary, "abc123")));
    assert!(response
        .body
        .contains(&fragment(AccountQuery::TradeHistory, "abc123")));
}

#[tokio::test]
async fn a_new_vendor_client_is_opened_per_request() {
    let app = TestApp::spawn();
    app.login("abc123").await;
    app.broker.clear_calls();

    app.get("/funds").await;
    app.get("/funds").await;

    assert_eq!(app.broker.count("init", "abc123"), 2);
    assert_eq!(app.broker.count("funds", "abc123"), 2);
}

#[tokio::test]
async fn upstream_failure_returns_500_and_keeps_token() {
    let app = TestApp::spawn();
    app.login("abc123").await;
    app.broker.fail(AccountQuery::PositionBook);

    let response = app.get("/positions").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body.contains("position_book unavailable"));

    // Guard still sees the token: the same page is retried, not redirected.
    let retry = app.get("/positions").await;
    assert_eq!(retry.status, StatusCode::INTERNAL_SERVER_ERROR);

    app.broker.recover(AccountQuery::PositionBook);
    app.broker.clear_calls();
    let recovered = app.get("/positions").await;
    assert_eq!(recovered.status, StatusCode::OK);
    assert_eq!(app.broker.count("position_book", "abc123"), 1);
}

#[tokio::test]
async fn dashboard_fails_when_either_query_fails() {
    let app = TestApp::spawn();
    app.login("abc123").await;
    app.broker.fail(AccountQuery::TradeHistory);

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body.contains("trade_history unavailable"));
    assert!(!response
        .body
        .contains(&fragment(AccountQuery::Summary, "abc123")));
}
