//! `call`: dispatches one action without starting the server.
//!
//! Goes through the same dispatcher as HTTP requests, so hooks fire and
//! errors carry the same messages. A missing controller or action falls
//! back to `plugins.default_controller` / `plugins.default_action`.

use std::collections::BTreeMap;

use clap::Args;

use plughost_core::error::AppError;
use plughost_plugin::{ActionOutput, PluginManager, RequestContext};

use crate::output;

/// Arguments for the call command
#[derive(Debug, Args)]
pub struct CallArgs {
    /// Plugin id
    pub plugin: String,
    /// Controller name
    pub controller: Option<String>,
    /// Action name
    pub action: Option<String>,

    /// Query parameter as `key=value`, repeatable
    #[arg(short, long = "query", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,

    /// HTTP method recorded on the request
    #[arg(short, long, default_value = "GET")]
    pub method: String,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

pub async fn execute(args: &CallArgs, manager: &PluginManager) -> Result<(), AppError> {
    let path = format!(
        "/plugins/{}/{}/{}",
        args.plugin,
        args.controller.as_deref().unwrap_or_default(),
        args.action.as_deref().unwrap_or_default()
    );
    let query: BTreeMap<String, String> = args.query.iter().cloned().collect();
    let request = RequestContext::new(args.method.to_uppercase(), path).with_query(query);

    manager.before_request(&request).await?;
    let result = manager
        .dispatch_explicit(
            request.clone(),
            &args.plugin,
            args.controller.as_deref(),
            args.action.as_deref(),
        )
        .await;
    let status = if result.is_ok() { 200 } else { 500 };
    manager.after_request(&request, status).await;

    match result? {
        ActionOutput::Json(value) => output::print_json(&value),
        ActionOutput::Html(body) | ActionOutput::Text(body) => println!("{body}"),
        ActionOutput::Redirect(location) => output::print_kv("Redirect", &location),
        ActionOutput::Empty => {}
    }
    Ok(())
}
