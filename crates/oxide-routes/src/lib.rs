//! # oxide-routes
//!
//! Named route tables and controller dispatch for small web applications.
//!
//! This crate provides:
//! - Route tables mapping route names to URL templates and back
//! - Conditional route delegation (`extend`) based on supplied params
//! - Request dispatch to registered controllers with not-found and error
//!   fallbacks
//! - Redirects to named routes
//!
//! ## Route Tables
//!
//! Each route has a URL template used to build addresses and a pattern plus
//! replacement template used to recognize them:
//!
//! ```
//! use oxide_routes::{Params, RouteDef, RouteTable};
//!
//! let table = RouteTable::new([RouteDef::new(
//!     "article",
//!     "/articles/{id}",
//!     r"^/articles/(\d+)$",
//!     "controller=Article&action=view&id=$1",
//! )])
//! .unwrap();
//!
//! let attrs: Params = [("id", "42")].into_iter().collect();
//! assert_eq!(table.build_address("article", &attrs), "/articles/42");
//!
//! let params = table.extract_params("/articles/42");
//! assert_eq!(params.get("controller"), Some("Article"));
//! assert_eq!(params.get("id"), Some("42"));
//! ```
//!
//! ## Extend Rules
//!
//! A route can hand address building over to another route when certain
//! params are present. The first satisfied rule wins:
//!
//! ```
//! use oxide_routes::{ExtendRule, Params, RouteDef, RouteTable};
//!
//! let table = RouteTable::new([
//!     RouteDef::new("article", "/articles/{id}", r"^/articles/(\d+)$", "id=$1")
//!         .extend(ExtendRule::new(["slug"], "article_slug")),
//!     RouteDef::new(
//!         "article_slug",
//!         "/articles/{id}-{slug}",
//!         r"^/articles/(\d+)-(.+)$",
//!         "id=$1&slug=$2",
//!     ),
//! ])
//! .unwrap();
//!
//! let attrs: Params = [("id", "42"), ("slug", "hello")].into_iter().collect();
//! assert_eq!(table.build_address("article", &attrs), "/articles/42-hello");
//! ```
//!
//! ## Dispatch
//!
//! ```ignore
//! use std::sync::Arc;
//! use oxide_routes::{ControllerRegistry, Dispatcher, RoutesConfig};
//!
//! let config = RoutesConfig::load("routes.json")?;
//! let dispatcher = Dispatcher::new(Arc::new(config.table()?), SiteLayout::default)
//!     .url_root(&config.url_root)
//!     .controllers(
//!         ControllerRegistry::new()
//!             .register("Page", PageController::default)
//!             .register("Article", ArticleController::default),
//!     );
//!
//! let response = dispatcher.dispatch("/blog/articles/42")?;
//! ```

mod address;
mod config;
mod controller;
mod dispatch;
mod error;
mod params;
mod redirect;
mod response;
mod route;
mod table;

pub use config::RoutesConfig;
pub use controller::{
    ActionResult, Controller, ControllerFactory, ControllerRegistry, Layout, LayoutFactory,
    RedirectSignal, Signal,
};
pub use dispatch::{
    DEFAULT_MODE, DispatchContext, Dispatcher, ERROR_ACTION, FALLBACK_CONTROLLER,
    NOT_FOUND_ACTION,
};
pub use error::{DispatchError, Failure, Result, RouteError};
pub use params::{Params, parse_query, url_decode};
pub use redirect::{DEFAULT_REDIRECT_STATUS, Redirector, redirect_status_line};
pub use response::Response;
pub use route::{ExtendRule, Route, RouteDef};
pub use table::RouteTable;
