//! Plugin middleware and the `plugin_middleware` hook.

use std::sync::{Arc, Mutex};

use http::StatusCode;
use serde_json::json;

use plughost_cache::CacheManager;
use plughost_plugin::PluginManager;
use plughost_plugin::prelude::*;

use crate::helpers::{TestApp, write};

#[tokio::test]
async fn test_readonly_middleware_blocks_writes() {
    let app = TestApp::new().await;

    let response = app.request("POST", "/plugins/shop/order/list").await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "the shop is read-only");
}

#[tokio::test]
async fn test_readonly_middleware_sees_custom_route_target() {
    let app = TestApp::new().await;

    let response = app.request("DELETE", "/special").await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_without_middleware_file_writes_pass() {
    let app = TestApp::new().await;
    std::fs::remove_file(app.root.path().join("middleware.toml")).unwrap();
    app.plugins.reload().await.unwrap();

    let response = app.request("POST", "/plugins/shop/order/list").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(app.plugins.middleware_stack().await.is_empty());
}

#[tokio::test]
async fn test_reload_with_malformed_middleware_file_keeps_current_stack() {
    let app = TestApp::new().await;
    let before = app.plugins.generation();
    write(&app.plugin_dir("gate").join("plugin.toml"), "name = \"Gate\"\n");
    write(&app.root.path().join("middleware.toml"), "middleware = [\"shop.audit\"");

    let report = app.plugins.reload().await.unwrap();

    assert!(report.generation > before);
    assert_eq!(report.plugins, 3);
    assert_eq!(report.middleware, vec!["shop.audit", "shop.readonly"]);
    let response = app.request("POST", "/plugins/shop/order/list").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_boot_with_malformed_middleware_file_runs_without_middleware() {
    let app = TestApp::new().await;
    write(&app.root.path().join("middleware.toml"), "middleware = 42");

    let fresh = PluginManager::new(
        app.plugins.config().clone(),
        CacheManager::in_memory(),
        vec![plugin_shop::export()],
    )
    .unwrap();
    let report = fresh.boot().await.unwrap();

    assert!(report.middleware.is_empty());
    assert_eq!(report.plugins, 2);
}

#[tokio::test]
async fn test_plugin_middleware_listener_can_halt() {
    let app = TestApp::new().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    let gate = ClosureHandler::new("host", 0, move |payload: &HookPayload| {
        let path = payload.pointer_str("/request/path").unwrap_or_default().to_string();
        log.lock().unwrap().push(path.clone());
        let result = if path.ends_with("/summary") {
            HookResult::halt("host", "summaries are closed")
        } else {
            HookResult::continue_execution("host")
        };
        async move { result }
    });
    app.plugins.listen("plugin_middleware", gate.into_handler()).await;

    let blocked = app.request("GET", "/plugins/shop/order/summary").await;
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);
    assert_eq!(
        blocked.message(),
        "Operation blocked by plugin 'host': summaries are closed"
    );

    let allowed = app.request("GET", "/plugins/shop/order/list").await;
    assert_eq!(allowed.status, StatusCode::OK);

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["/plugins/shop/order/summary", "/plugins/shop/order/list"]
    );
}

#[tokio::test]
async fn test_action_begin_listener_sees_target() {
    let app = TestApp::new().await;
    let seen = Arc::new(Mutex::new(None));
    let slot = seen.clone();

    let spy = ClosureHandler::new("host", 0, move |payload: &HookPayload| {
        *slot.lock().unwrap() = Some(json!({
            "class": payload.get_string("class"),
            "method": payload.get_string("method"),
        }));
        async { HookResult::continue_execution("host") }
    });
    app.plugins.listen("plugin_action_begin", spy.into_handler()).await;

    let response = app.request("GET", "/plugins/shop/order/7").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert_eq!(
        seen.lock().unwrap().clone(),
        Some(json!({ "class": "shop::controller::Order", "method": "_empty" }))
    );
}

#[tokio::test]
async fn test_unknown_middleware_name_is_skipped() {
    let app = TestApp::new().await;
    write(
        &app.root.path().join("middleware.toml"),
        "middleware = [\"shop.audit\", \"ghost\"]\n",
    );
    let report = app.plugins.reload().await.unwrap();

    assert_eq!(report.middleware, vec!["shop.audit"]);
}
