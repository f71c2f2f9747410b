//! Renders controller return values as HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use plughost_plugin::ActionOutput;

/// HTTP rendering of an [`ActionOutput`]. The payload is passed through
/// unmodified.
#[derive(Debug)]
pub struct ActionResponse(pub ActionOutput);

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        match self.0 {
            ActionOutput::Json(value) => Json(value).into_response(),
            ActionOutput::Html(body) => Html(body).into_response(),
            ActionOutput::Text(body) => body.into_response(),
            ActionOutput::Redirect(location) => Redirect::to(&location).into_response(),
            ActionOutput::Empty => StatusCode::NO_CONTENT.into_response(),
        }
    }
}
