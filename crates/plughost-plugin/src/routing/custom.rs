//! Custom route table.
//!
//! Maps request paths to explicit `plugin/controller/action` triples.
//! Domain-scoped rules only match requests for their host and are
//! checked before global ones.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use plughost_core::config::plugin::RouteRule;

use super::params::RouteParams;
use crate::api::context::normalize_host;

/// One entry of the table, for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomRoute {
    /// Path key without surrounding slashes.
    pub path: String,
    /// Host the rule is bound to, if any.
    pub domain: Option<String>,
    pub target: RouteParams,
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub params: RouteParams,
    /// Whether a domain-scoped rule matched.
    pub in_domain: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CustomRouteTable {
    global: HashMap<String, RouteParams>,
    /// Host → path → target.
    domains: HashMap<String, HashMap<String, RouteParams>>,
}

impl CustomRouteTable {
    /// Builds the table from `[plugins.route]`. Blank entries are skipped
    /// silently, malformed ones with a warning.
    pub fn from_config(routes: &BTreeMap<String, RouteRule>) -> Self {
        let mut table = Self::default();

        for (key, rule) in routes {
            match rule {
                RouteRule::Target(target) => {
                    if let Some((path, params)) = parse_entry(key, target) {
                        table.global.insert(path, params);
                    }
                }
                RouteRule::Domain { domain, rule } => {
                    let Some(host) = normalize_host(domain) else {
                        warn!(route = %key, "Domain route group has no domain, skipping");
                        continue;
                    };
                    let scoped = table.domains.entry(host).or_default();
                    for (path_key, target) in rule {
                        if let Some((path, params)) = parse_entry(path_key, target) {
                            scoped.insert(path, params);
                        }
                    }
                }
            }
        }

        table
    }

    /// Looks up a request path, trying the request host's rules first.
    pub fn resolve(&self, host: Option<&str>, path: &str) -> Option<RouteMatch> {
        let path = normalize_path(path);

        let scoped = host
            .and_then(normalize_host)
            .and_then(|h| self.domains.get(&h))
            .and_then(|rules| rules.get(&path));
        if let Some(params) = scoped {
            return Some(RouteMatch {
                params: params.clone(),
                in_domain: true,
            });
        }

        self.global.get(&path).map(|params| RouteMatch {
            params: params.clone(),
            in_domain: false,
        })
    }

    /// Every route, domain-scoped first, each group sorted by path.
    pub fn routes(&self) -> Vec<CustomRoute> {
        let mut scoped: Vec<CustomRoute> = self
            .domains
            .iter()
            .flat_map(|(domain, rules)| {
                rules.iter().map(move |(path, target)| CustomRoute {
                    path: path.clone(),
                    domain: Some(domain.clone()),
                    target: target.clone(),
                })
            })
            .collect();
        scoped.sort_by(|a, b| (&a.domain, &a.path).cmp(&(&b.domain, &b.path)));

        let mut global: Vec<CustomRoute> = self
            .global
            .iter()
            .map(|(path, target)| CustomRoute {
                path: path.clone(),
                domain: None,
                target: target.clone(),
            })
            .collect();
        global.sort_by(|a, b| a.path.cmp(&b.path));

        scoped.extend(global);
        scoped
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.domains.values().map(HashMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_entry(key: &str, target: &str) -> Option<(String, RouteParams)> {
    let path = normalize_path(key);
    if path.is_empty() || target.trim().is_empty() {
        return None;
    }
    match RouteParams::parse_target(target) {
        Some(params) => Some((path, params)),
        None => {
            warn!(route = %key, target = %target, "Malformed route target, expected plugin/controller/action");
            None
        }
    }
}

fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CustomRouteTable {
        let mut routes = BTreeMap::new();
        routes.insert("special".to_string(), RouteRule::Target("shop/Order/list".into()));
        routes.insert("orders".to_string(), RouteRule::Target("shop/Order/all".into()));
        routes.insert("blank".to_string(), RouteRule::Target("  ".into()));
        routes.insert("broken".to_string(), RouteRule::Target("shop/Order".into()));
        routes.insert(
            "store".to_string(),
            RouteRule::Domain {
                domain: "Shop.Example.com".into(),
                rule: BTreeMap::from([("orders".to_string(), "shop/Order/mine".to_string())]),
            },
        );
        CustomRouteTable::from_config(&routes)
    }

    #[test]
    fn test_global_route_resolves() {
        let found = table().resolve(None, "/special").unwrap();
        assert_eq!(found.params, RouteParams::new("shop", "Order", "list"));
        assert!(!found.in_domain);
    }

    #[test]
    fn test_domain_route_wins_for_its_host() {
        let table = table();
        let scoped = table.resolve(Some("shop.example.com:8080"), "orders").unwrap();
        assert_eq!(scoped.params.action, "mine");
        assert!(scoped.in_domain);

        let other = table.resolve(Some("www.example.com"), "orders").unwrap();
        assert_eq!(other.params.action, "all");
        assert!(!other.in_domain);
    }

    #[test]
    fn test_blank_and_malformed_skipped() {
        let table = table();
        assert!(table.resolve(None, "blank").is_none());
        assert!(table.resolve(None, "broken").is_none());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_routes_listing_order() {
        let paths: Vec<(Option<String>, String)> = table()
            .routes()
            .into_iter()
            .map(|r| (r.domain, r.path))
            .collect();
        assert_eq!(
            paths,
            vec![
                (Some("shop.example.com".to_string()), "orders".to_string()),
                (None, "orders".to_string()),
                (None, "special".to_string()),
            ]
        );
    }
}
