//! Builds the plugin system's [`RequestContext`] from an HTTP request.

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::header;
use axum::http::request::Parts;

use plughost_plugin::RequestContext;

/// Extracts method, path, host and query string into a [`RequestContext`].
///
/// Never rejects: an unparsable query string yields an empty query map.
#[derive(Debug, Clone)]
pub struct PluginRequest(pub RequestContext);

impl<S> FromRequestParts<S> for PluginRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_context(parts)))
    }
}

/// Reads the request line and `Host` header.
pub fn request_context(parts: &Parts) -> RequestContext {
    let query = Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(q)| q)
        .unwrap_or_default();

    let mut request =
        RequestContext::new(parts.method.as_str(), parts.uri.path()).with_query(query);

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.host());
    if let Some(host) = host {
        request = request.with_host(host);
    }
    request
}
