//! Building addresses from route names.

use tracing::{debug, warn};

use crate::params::Params;
use crate::table::RouteTable;

impl RouteTable {
    /// Builds the address of a named route.
    ///
    /// Extend rules are tried in order; the first one whose required variables
    /// are all in `attrs` delegates to its target route. Otherwise every
    /// `{key}` in the route's URL template is replaced by the value of `key`.
    /// Placeholders without a value are left in place and values are not
    /// escaped.
    ///
    /// An unknown route name yields an empty string.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_routes::{Params, RouteDef, RouteTable};
    ///
    /// let table = RouteTable::new([RouteDef::new(
    ///     "article",
    ///     "/articles/{id}",
    ///     r"^/articles/(\d+)$",
    ///     "id=$1",
    /// )])
    /// .unwrap();
    /// let attrs: Params = [("id", "42")].into_iter().collect();
    /// assert_eq!(table.build_address("article", &attrs), "/articles/42");
    /// assert_eq!(table.build_address("nope", &attrs), "");
    /// ```
    pub fn build_address(&self, route: &str, attrs: &Params) -> String {
        let mut visited = Vec::new();
        self.resolve_address(route, attrs, &mut visited)
    }

    fn resolve_address<'a>(
        &'a self,
        name: &'a str,
        attrs: &Params,
        visited: &mut Vec<&'a str>,
    ) -> String {
        let Some(route) = self.get(name) else {
            debug!(route = name, "Unknown route");
            return String::new();
        };

        if visited.contains(&name) {
            warn!(route = name, chain = ?visited, "Extend cycle");
            return String::new();
        }
        visited.push(name);

        let delegate = route
            .extend_rules()
            .iter()
            .find(|rule| rule.requires.iter().all(|var| attrs.contains(var)));
        if let Some(rule) = delegate {
            return self.resolve_address(&rule.route, attrs, visited);
        }

        attrs
            .iter()
            .fold(route.url().to_string(), |address, (key, value)| {
                address.replace(&format!("{{{key}}}"), value)
            })
    }
}
