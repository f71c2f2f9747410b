//! The `plugins/{plugin}/{controller}/{action}` route.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_list_action_uses_plugin_config() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/shop/order/list").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["page_size"], 2);
    assert_eq!(response.body["total"], 3);
    assert_eq!(response.body["currency"], "EUR");
    assert_eq!(response.body["orders"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_tokens_are_case_folded() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/Shop/ORDER/List?page=2").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["page"], 2);
    assert_eq!(response.body["orders"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_url_convert_off_keeps_case() {
    let app = TestApp::with_config(|c| c.plugins.url_convert = false).await;

    let response = app.request("GET", "/plugins/Shop/order/list").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "plugin Shop not found");
}

#[tokio::test]
async fn test_unknown_plugin_is_not_found() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/nope/order/list").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
    assert_eq!(response.message(), "plugin nope not found");
}

#[tokio::test]
async fn test_disabled_plugin_is_server_error() {
    let app = TestApp::new().await;

    for path in ["/plugins/blog/post/index", "/plugins/blog/anything/else"] {
        let response = app.request("GET", path).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body["error"], "DISABLED");
        assert_eq!(response.message(), "plugin blog is disabled");
    }
}

#[tokio::test]
async fn test_blank_token_is_bad_request() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/shop/%20/list").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "BAD_REQUEST");
    assert_eq!(response.message(), "plugin can not be empty");
}

#[tokio::test]
async fn test_unknown_controller() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/shop/invoice/list").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "plugin controller Invoice not found");
}

#[tokio::test]
async fn test_fallback_action_receives_requested_name() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/shop/order/2").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], 2);
    assert_eq!(response.body["customer"], "grace");
}

#[tokio::test]
async fn test_missing_action_without_fallback_names_class_and_method() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/shop/cart/checkout").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.message(),
        "plugin action shop::controller::Cart::checkout() not found"
    );
}

#[tokio::test]
async fn test_view_renders_from_plugin_view_root() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/shop/order/summary").await;

    assert_eq!(response.status, StatusCode::OK);
    let content_type = response.headers.get(http::header::CONTENT_TYPE);
    assert!(content_type.and_then(|v| v.to_str().ok()).is_some_and(|v| v.starts_with("text/html")));
    assert!(response.text.contains("3 orders, 1 unpaid, 77.40 EUR"));
}

#[tokio::test]
async fn test_service_bindings_reach_controllers() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/shop/cart/show").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["gateway"], "stripe");
    assert_eq!(response.body["items"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unmatched_path_is_not_found() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/plugins/shop/order").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
