//! Plugin controllers.
//!
//! A controller is a named group of actions belonging to one plugin. Plugin
//! modules register a factory per controller; the dispatcher builds a fresh
//! controller for every request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use plughost_core::{AppError, AppResult};

use crate::api::context::ActionContext;

/// Value returned by an action. Passed through to the HTTP layer unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum ActionOutput {
    Json(serde_json::Value),
    Html(String),
    Text(String),
    /// Redirect to the given location.
    Redirect(String),
    Empty,
}

impl ActionOutput {
    pub fn json(value: impl Serialize) -> AppResult<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

/// A plugin controller.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Action names this controller implements, in their declared spelling.
    fn actions(&self) -> &[&str];

    /// Whether [`Controller::empty_action`] handles unknown actions.
    fn has_empty_action(&self) -> bool {
        false
    }

    /// Runs a declared action. `action` is always one of [`Controller::actions`].
    async fn call(&self, action: &str, ctx: &ActionContext) -> AppResult<ActionOutput>;

    /// Fallback receiving the requested action name when no declared action
    /// matches.
    async fn empty_action(&self, action: &str, ctx: &ActionContext) -> AppResult<ActionOutput> {
        let _ = ctx;
        Err(AppError::not_found(format!("no fallback action for '{action}'")))
    }

    /// Finds the declared spelling of `action`, ignoring ASCII case.
    fn find_action(&self, action: &str) -> Option<&str> {
        self.actions()
            .iter()
            .copied()
            .find(|declared| declared.eq_ignore_ascii_case(action))
    }
}

/// Converts a routing token to the studly-case controller name:
/// `order` → `Order`, `order_item` → `OrderItem`, `user-profile` → `UserProfile`.
pub fn studly(name: &str) -> String {
    name.split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Orders;

    #[async_trait]
    impl Controller for Orders {
        fn actions(&self) -> &[&str] {
            &["list", "showDetail"]
        }

        async fn call(&self, action: &str, _ctx: &ActionContext) -> AppResult<ActionOutput> {
            Ok(ActionOutput::Text(action.to_string()))
        }
    }

    #[test]
    fn test_studly() {
        assert_eq!(studly("order"), "Order");
        assert_eq!(studly("order_item"), "OrderItem");
        assert_eq!(studly("user-profile"), "UserProfile");
        assert_eq!(studly("Order"), "Order");
        assert_eq!(studly(""), "");
    }

    #[test]
    fn test_find_action_ignores_case() {
        let c = Orders;
        assert_eq!(c.find_action("showdetail"), Some("showDetail"));
        assert_eq!(c.find_action("LIST"), Some("list"));
        assert_eq!(c.find_action("missing"), None);
        assert!(!c.has_empty_action());
    }

    #[test]
    fn test_action_output_serializes_tagged() {
        let out = ActionOutput::Text("ok".into());
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            serde_json::json!({ "type": "text", "body": "ok" })
        );
    }
}
