//! `Order` controller.

use async_trait::async_trait;
use serde_json::json;

use plughost_plugin::prelude::*;

use crate::store::OrderBook;

pub struct OrderController {
    orders: OrderBook,
}

impl OrderController {
    pub fn new(orders: OrderBook) -> Self {
        Self { orders }
    }

    async fn list(&self, ctx: &ActionContext) -> AppResult<ActionOutput> {
        let config = ctx.plugin_config();
        let page_size = config["page_size"].as_u64().unwrap_or(20) as usize;
        let page = match ctx.request.query_param("page") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| AppError::validation(format!("invalid page '{raw}'")))?,
            None => 1,
        };

        let orders = self.orders.page(page, page_size).await;
        Ok(ActionOutput::Json(json!({
            "page": page,
            "page_size": page_size,
            "total": self.orders.len().await,
            "currency": config["currency"],
            "orders": orders,
        })))
    }

    async fn detail(&self, ctx: &ActionContext) -> AppResult<ActionOutput> {
        let raw = ctx
            .request
            .query_param("id")
            .ok_or_else(|| AppError::validation("missing order id"))?;
        let id = raw
            .parse::<u64>()
            .map_err(|_| AppError::validation(format!("invalid order id '{raw}'")))?;
        self.show(id).await
    }

    async fn show(&self, id: u64) -> AppResult<ActionOutput> {
        let order = self
            .orders
            .get(id)
            .await
            .ok_or_else(|| AppError::not_found(format!("order {id} not found")))?;
        ActionOutput::json(order)
    }

    async fn summary(&self, ctx: &ActionContext) -> AppResult<ActionOutput> {
        let config = ctx.plugin_config();
        let vars = json!({
            "count": self.orders.len().await,
            "unpaid": self.orders.unpaid().await.len(),
            "total": format!("{:.2}", self.orders.total_cents().await as f64 / 100.0),
            "currency": config["currency"],
        });
        let empty = serde_json::Map::new();
        let html = ctx
            .view
            .render("order/summary", vars.as_object().unwrap_or(&empty))
            .await?;
        Ok(ActionOutput::Html(html))
    }
}

#[async_trait]
impl Controller for OrderController {
    fn actions(&self) -> &[&str] {
        &["list", "detail", "summary"]
    }

    fn has_empty_action(&self) -> bool {
        true
    }

    async fn call(&self, action: &str, ctx: &ActionContext) -> AppResult<ActionOutput> {
        match action {
            "list" => self.list(ctx).await,
            "detail" => self.detail(ctx).await,
            "summary" => self.summary(ctx).await,
            other => Err(AppError::internal(format!("undeclared action {other}"))),
        }
    }

    /// `/plugins/shop/order/{id}` shows that order.
    async fn empty_action(&self, action: &str, _ctx: &ActionContext) -> AppResult<ActionOutput> {
        match action.parse::<u64>() {
            Ok(id) => self.show(id).await,
            Err(_) => Err(AppError::not_found(format!(
                "plugin action shop::controller::Order::{action}() not found"
            ))),
        }
    }
}
