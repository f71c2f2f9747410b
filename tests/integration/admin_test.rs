//! Admin endpoints under `/api`.

use http::StatusCode;

use crate::helpers::{TestApp, write};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["cache"], true);
}

#[tokio::test]
async fn test_list_plugins() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/plugins").await;

    assert_eq!(response.status, StatusCode::OK);
    let plugins = response.body["data"].as_array().cloned().unwrap_or_default();
    let ids: Vec<&str> = plugins.iter().filter_map(|p| p["id"].as_str()).collect();
    assert_eq!(ids, vec!["blog", "shop"]);

    assert_eq!(plugins[0]["enabled"], false);
    assert_eq!(plugins[0]["registered"], false);
    assert_eq!(plugins[1]["name"], "Shop");
    assert_eq!(plugins[1]["registered"], true);
    assert_eq!(plugins[1]["controllers"], serde_json::json!(["Cart", "Order"]));
}

#[tokio::test]
async fn test_hook_table_lists_declared_hooks() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/plugins/hooks").await;

    assert_eq!(response.status, StatusCode::OK);
    let hooks: Vec<&str> = response.body["data"]["hooks"]
        .as_array()
        .map(|h| h.iter().filter_map(|e| e["hook"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(hooks, vec!["orderPaid", "plugin_begin", "pluginsInit"]);
    assert_eq!(
        response.body["data"]["hooks"][0]["handlers"][0]["plugin_id"],
        "shop"
    );
}

#[tokio::test]
async fn test_services_are_typed() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/plugins/services").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["mailer"], "smtp");
    assert_eq!(data["audit"], true);
    assert_eq!(data["payment"]["sandbox"], true);
    assert_eq!(data["payment"]["retries"], 3);
}

#[tokio::test]
async fn test_reload_picks_up_new_plugins() {
    let app = TestApp::new().await;
    let before = app.plugins.generation();

    write(
        &app.plugin_dir("zine").join("plugin.toml"),
        "name = \"Zine\"\nhooks = [\"plugin_begin\"]\n",
    );
    write(&app.plugin_dir("zine").join("service.ini"), "mailer = sendmail\n");

    let response = app.request("POST", "/api/plugins/reload").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["plugins"], 3);
    assert!(response.body["data"]["generation"].as_u64().unwrap_or_default() > before);

    let services = app.request("GET", "/api/plugins/services").await;
    assert_eq!(services.body["data"]["mailer"], "sendmail");
}

#[tokio::test]
async fn test_admin_routes_can_be_disabled() {
    let app = TestApp::with_config(|c| c.plugins.admin_routes = false).await;

    let response = app.request("GET", "/api/plugins").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let health = app.request("GET", "/api/health").await;
    assert_eq!(health.status, StatusCode::OK);
}

#[tokio::test]
async fn test_routes_listing() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/plugins/routes").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"][0]["path"], "special");
}
