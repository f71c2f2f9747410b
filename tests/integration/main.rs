//! Integration tests driving the full Axum application.

mod helpers;

mod admin_test;
mod custom_route_test;
mod middleware_test;
mod plugin_route_test;
