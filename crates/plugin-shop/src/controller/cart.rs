//! `Cart` controller.

use async_trait::async_trait;
use serde_json::json;

use plughost_plugin::prelude::*;

use crate::store::OrderBook;

pub struct CartController {
    orders: OrderBook,
}

impl CartController {
    pub fn new(orders: OrderBook) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Controller for CartController {
    fn actions(&self) -> &[&str] {
        &["show"]
    }

    /// Unpaid orders plus the payment gateway bound in `service.ini`.
    async fn call(&self, _action: &str, ctx: &ActionContext) -> AppResult<ActionOutput> {
        let gateway = ctx
            .services()
            .resolve("payment")
            .await
            .and_then(|p| p.get("gateway").cloned())
            .unwrap_or(serde_json::Value::Null);

        Ok(ActionOutput::Json(json!({
            "items": self.orders.unpaid().await,
            "gateway": gateway,
        })))
    }
}
