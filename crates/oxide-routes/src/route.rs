//! Route definitions.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

/// Matches PHP-style `$1` group references in a replacement template.
static GROUP_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("Invalid group reference regex"));

/// A conditional delegation to another route.
///
/// When every variable in `requires` is supplied, addresses for the owning
/// route are built from `route` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendRule {
    /// Variable names that must all be present.
    pub requires: Vec<String>,
    /// Name of the route to build from.
    pub route: String,
}

impl ExtendRule {
    /// Creates a new extend rule.
    pub fn new<I, S>(requires: I, route: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            requires: requires.into_iter().map(Into::into).collect(),
            route: route.into(),
        }
    }
}

/// A route as it appears in configuration.
///
/// ```json
/// {
///     "name": "article",
///     "url": "/articles/{id}",
///     "regexp": "^/articles/(\\d+)$",
///     "vars": "controller=Article&action=view&id=$1"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDef {
    /// Unique route name.
    pub name: String,
    /// URL template with `{var}` placeholders.
    pub url: String,
    /// Pattern recognizing addresses of this route.
    pub regexp: String,
    /// Replacement template rewriting a matched address into a query string.
    pub vars: String,
    /// Ordered delegations to other routes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extend: Vec<ExtendRule>,
}

impl RouteDef {
    /// Creates a route definition without extend rules.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        regexp: impl Into<String>,
        vars: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            regexp: regexp.into(),
            vars: vars.into(),
            extend: Vec::new(),
        }
    }

    /// Adds an extend rule.
    #[must_use]
    pub fn extend(mut self, rule: ExtendRule) -> Self {
        self.extend.push(rule);
        self
    }
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    def: RouteDef,
    regex: Regex,
    /// `vars` with group references in `${N}` form.
    replacement: String,
}

impl Route {
    /// Compiles a route definition.
    pub fn compile(def: RouteDef) -> Result<Self> {
        let regex = Regex::new(&def.regexp).map_err(|source| RouteError::InvalidPattern {
            route: def.name.clone(),
            source,
        })?;
        let replacement = GROUP_REF.replace_all(&def.vars, "$${${1}}").into_owned();

        Ok(Self {
            def,
            regex,
            replacement,
        })
    }

    /// Returns the route name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns the URL template.
    pub fn url(&self) -> &str {
        &self.def.url
    }

    /// Returns the extend rules in declaration order.
    pub fn extend_rules(&self) -> &[ExtendRule] {
        &self.def.extend
    }

    /// Returns true if the pattern matches anywhere in the address.
    pub fn is_match(&self, address: &str) -> bool {
        self.regex.is_match(address)
    }

    /// Rewrites every match in the address with the `vars` template.
    pub fn rewrite(&self, address: &str) -> String {
        self.regex
            .replace_all(address, self.replacement.as_str())
            .into_owned()
    }
}
