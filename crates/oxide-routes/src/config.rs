//! Route configuration files.
//!
//! ```json
//! {
//!     "url_root": "/blog",
//!     "routes": [
//!         {
//!             "name": "article",
//!             "url": "/articles/{id}",
//!             "regexp": "^/articles/(\\d+)",
//!             "vars": "controller=Article&action=view&id=$1",
//!             "extend": [{"requires": ["slug"], "route": "article_slug"}]
//!         }
//!     ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::redirect::Redirector;
use crate::route::RouteDef;
use crate::table::RouteTable;

/// Root URL and route table of an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Prefix stripped from request URIs and prepended to redirect locations.
    #[serde(default)]
    pub url_root: String,
    /// Route definitions, most specific first.
    pub routes: Vec<RouteDef>,
}

impl RoutesConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            routes = config.routes.len(),
            "Loaded route configuration"
        );
        Ok(config)
    }

    /// Compiles the route table.
    pub fn table(&self) -> Result<RouteTable> {
        RouteTable::new(self.routes.iter().cloned())
    }

    /// Compiles the route table and returns a redirector over it.
    pub fn redirector(&self) -> Result<Redirector> {
        Ok(Redirector::new(Arc::new(self.table()?), self.url_root.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::RouteError;

    const CONFIG: &str = r#"{
        "url_root": "/blog",
        "routes": [
            {"name": "home", "url": "/", "regexp": "^/$", "vars": "controller=Home&action=index"}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let config = RoutesConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.url_root, "/blog");
        assert_eq!(config.table().unwrap().len(), 1);
    }

    #[test]
    fn test_url_root_defaults_to_empty() {
        let config = RoutesConfig::from_json(r#"{"routes": []}"#).unwrap();
        assert_eq!(config.url_root, "");
        assert!(config.table().unwrap().is_empty());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = RoutesConfig::load(file.path()).unwrap();
        let redirector = config.redirector().unwrap();
        assert_eq!(redirector.location("home", &Default::default()), "/blog/");
    }

    #[test]
    fn test_load_missing_file() {
        let err = RoutesConfig::load("/nonexistent/routes.json").unwrap_err();
        assert!(matches!(err, RouteError::Io(_)));
    }
}
