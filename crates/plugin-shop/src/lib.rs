//! Order-management sample plugin for PlugHost.
//!
//! Installs as `<plugins root>/shop/` and registers:
//! - `Order` controller: `list`, `detail`, `summary`, plus an empty action
//!   that treats the action name as an order id
//! - `Cart` controller: `show`
//! - middleware `shop.audit` and `shop.readonly`

pub mod controller;
pub mod hooks;
pub mod middleware;
pub mod plugin;
pub mod store;

use plughost_plugin::PluginExport;

pub use plugin::ShopPlugin;
pub use store::{Order, OrderBook};

/// Plugin id; the plugin directory must carry the same name.
pub const PLUGIN_ID: &str = "shop";

/// Registration bundle for the host, backed by a seeded order book.
pub fn export() -> PluginExport {
    export_with(OrderBook::seeded())
}

/// Registration bundle backed by the given order book.
pub fn export_with(orders: OrderBook) -> PluginExport {
    let for_orders = orders.clone();
    let for_cart = orders;
    PluginExport::new(PLUGIN_ID, ShopPlugin::new)
        .controller("order", move || controller::OrderController::new(for_orders.clone()))
        .controller("cart", move || controller::CartController::new(for_cart.clone()))
        .middleware(middleware::AuditMiddleware)
        .middleware(middleware::ReadOnlyMiddleware)
}
