//! Shared test helpers for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use plughost_api::{AppState, build_app};
use plughost_cache::CacheManager;
use plughost_core::config::AppConfig;
use plughost_core::config::plugin::RouteRule;
use plughost_plugin::PluginManager;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Booted plugin system behind the router
    pub plugins: Arc<PluginManager>,
    /// Private copy of the `plugins/` fixture tree
    pub root: TempDir,
}

impl TestApp {
    /// Boots the `plugins/` fixture with the shop module and a disabled
    /// `blog` plugin.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("plugins");
        copy_dir(&fixture, root.path()).expect("Failed to copy plugin fixtures");
        write(
            &root.path().join("blog/plugin.toml"),
            "name = \"Blog\"\nstatus = false\n",
        );

        let mut config = AppConfig::default();
        config.plugins.directory = root.path().display().to_string();
        config.plugins.route.insert(
            "special".to_string(),
            RouteRule::Target("shop/Order/list".to_string()),
        );
        configure(&mut config);

        let cache = CacheManager::in_memory();
        let plugins = PluginManager::new(
            config.plugins.clone(),
            cache.clone(),
            vec![plugin_shop::export()],
        )
        .expect("Failed to register plugin modules");
        plugins.boot().await.expect("Failed to boot plugins");
        let plugins = Arc::new(plugins);

        let router = build_app(AppState::new(config, cache, plugins.clone()));
        Self {
            router,
            plugins,
            root,
        }
    }

    /// Sends a request and parses the body as JSON when possible.
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        self.send(Request::builder().method(method).uri(path)).await
    }

    /// Sends a request with an explicit `Host` header.
    pub async fn request_with_host(&self, method: &str, path: &str, host: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(path)
                .header(http::header::HOST, host),
        )
        .await
    }

    async fn send(&self, builder: http::request::Builder) -> TestResponse {
        let req = builder
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    pub fn plugin_dir(&self, id: &str) -> PathBuf {
        self.root.path().join(id)
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
    /// Raw body
    pub text: String,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
    }
    std::fs::write(path, contents).expect("Failed to write fixture");
}

fn copy_dir(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
