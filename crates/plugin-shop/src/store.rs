//! In-memory order book shared by the shop controllers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub customer: String,
    /// Total in minor currency units.
    pub total_cents: i64,
    pub paid: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl OrderBook {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(RwLock::new(orders)),
        }
    }

    /// A small demo data set.
    pub fn seeded() -> Self {
        Self::new(vec![
            Order { id: 1, customer: "ada".into(), total_cents: 1990, paid: true },
            Order { id: 2, customer: "grace".into(), total_cents: 4500, paid: false },
            Order { id: 3, customer: "linus".into(), total_cents: 1250, paid: true },
        ])
    }

    /// One page of orders, 1-based.
    pub async fn page(&self, page: usize, page_size: usize) -> Vec<Order> {
        let size = page_size.max(1);
        let skip = page.saturating_sub(1).saturating_mul(size);
        self.orders.read().await.iter().skip(skip).take(size).cloned().collect()
    }

    pub async fn get(&self, id: u64) -> Option<Order> {
        self.orders.read().await.iter().find(|o| o.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    /// Sum of all order totals.
    pub async fn total_cents(&self) -> i64 {
        self.orders.read().await.iter().map(|o| o.total_cents).sum()
    }

    pub async fn unpaid(&self) -> Vec<Order> {
        self.orders.read().await.iter().filter(|o| !o.paid).cloned().collect()
    }
}
