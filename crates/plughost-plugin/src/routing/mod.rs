//! Plugin request routing: token parsing, the custom route table, and the
//! dispatcher that turns `plugin/controller/action` into an action call.

pub mod custom;
pub mod dispatcher;
pub mod params;

pub use custom::{CustomRoute, CustomRouteTable, RouteMatch};
pub use dispatcher::{PluginDispatcher, ResolvedRoute, RouteTarget};
pub use params::RouteParams;
