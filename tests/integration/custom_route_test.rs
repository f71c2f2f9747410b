//! Custom and domain-scoped routes.

use std::collections::BTreeMap;

use http::StatusCode;

use plughost_core::config::plugin::RouteRule;

use crate::helpers::TestApp;

async fn app_with_storefront() -> TestApp {
    TestApp::with_config(|c| {
        let mut rule = BTreeMap::new();
        rule.insert("home".to_string(), "shop/order/summary".to_string());
        rule.insert("special".to_string(), "shop/cart/show".to_string());
        c.plugins.route.insert(
            "storefront".to_string(),
            RouteRule::Domain {
                domain: "shop.example.com".to_string(),
                rule,
            },
        );
        c.plugins
            .route
            .insert("broken".to_string(), RouteRule::Target("shop/order".to_string()));
    })
    .await
}

#[tokio::test]
async fn test_custom_route_matches_explicit_route() {
    let app = TestApp::new().await;

    let custom = app.request("GET", "/special").await;
    let explicit = app.request("GET", "/plugins/shop/order/list").await;

    assert_eq!(custom.status, StatusCode::OK);
    assert_eq!(custom.body, explicit.body);
}

#[tokio::test]
async fn test_domain_rules_win_for_their_host() {
    let app = app_with_storefront().await;

    let scoped = app
        .request_with_host("GET", "/special", "Shop.Example.com:8080")
        .await;
    assert_eq!(scoped.status, StatusCode::OK);
    assert_eq!(scoped.body["gateway"], "stripe");

    let global = app.request_with_host("GET", "/special", "other.example.com").await;
    assert_eq!(global.status, StatusCode::OK);
    assert_eq!(global.body["currency"], "EUR");
}

#[tokio::test]
async fn test_domain_rules_are_invisible_to_other_hosts() {
    let app = app_with_storefront().await;

    let response = app.request_with_host("GET", "/home", "other.example.com").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_rule_is_skipped() {
    let app = app_with_storefront().await;

    let response = app.request("GET", "/broken").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.plugins.routes().len(), 3);
}
