//! The route table and address-to-params extraction.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, RouteError};
use crate::params::{Params, parse_query};
use crate::route::{Route, RouteDef};

/// An ordered, immutable collection of routes.
///
/// Order matters when extracting params: the first matching route wins, so
/// specific patterns must come before general ones.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    /// Compiles a table from route definitions, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate route name or an invalid pattern.
    pub fn new(defs: impl IntoIterator<Item = RouteDef>) -> Result<Self> {
        let mut routes = Vec::new();
        let mut by_name = HashMap::new();

        for def in defs {
            if by_name.contains_key(&def.name) {
                return Err(RouteError::DuplicateRoute(def.name));
            }
            let route = Route::compile(def)?;
            by_name.insert(route.name().to_string(), routes.len());
            routes.push(route);
        }

        debug!(routes = routes.len(), "Route table compiled");
        Ok(Self { routes, by_name })
    }

    /// Parses a JSON array of route definitions.
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<RouteDef> = serde_json::from_str(json)?;
        Self::new(defs)
    }

    /// Looks up a route by name.
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    /// Returns the routes in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Extracts the params encoded in an address.
    ///
    /// The first route whose pattern matches rewrites the address with its
    /// `vars` template. An address no route matches is parsed as-is. Every `?`
    /// is then treated as a `&` separator, so a leading `?` is not a query
    /// marker.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_routes::{RouteDef, RouteTable};
    ///
    /// let table = RouteTable::new([RouteDef::new(
    ///     "article",
    ///     "/articles/{id}",
    ///     r"^/articles/(\d+)$",
    ///     "id=$1",
    /// )])
    /// .unwrap();
    /// let params = table.extract_params("/articles/42");
    /// assert_eq!(params.get("id"), Some("42"));
    /// ```
    pub fn extract_params(&self, address: &str) -> Params {
        let rewritten = match self.routes.iter().find(|r| r.is_match(address)) {
            Some(route) => {
                debug!(route = route.name(), address, "Route matched");
                route.rewrite(address)
            }
            None => {
                debug!(address, "No route matched");
                address.to_string()
            }
        };

        parse_query(&rewritten.replace('?', "&"))
    }
}
