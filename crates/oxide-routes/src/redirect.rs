//! HTTP redirects to named routes.

use std::sync::Arc;

use tracing::debug;

use crate::controller::Signal;
use crate::params::Params;
use crate::response::Response;
use crate::table::RouteTable;

/// Status used when a redirect is requested with a status outside the
/// redirect table.
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// Returns the HTTP/1.1 status line for a redirect status.
///
/// Only 300–305 and 307 have one; any other status yields `None`.
pub fn redirect_status_line(status: u16) -> Option<&'static str> {
    match status {
        300 => Some("HTTP/1.1 300 Multiple Choices"),
        301 => Some("HTTP/1.1 301 Moved Permanently"),
        302 => Some("HTTP/1.1 302 Found"),
        303 => Some("HTTP/1.1 303 See Other"),
        304 => Some("HTTP/1.1 304 Not Modified"),
        305 => Some("HTTP/1.1 305 Use Proxy"),
        307 => Some("HTTP/1.1 307 Temporary Redirect"),
        _ => None,
    }
}

/// Builds redirects to named routes.
#[derive(Debug, Clone)]
pub struct Redirector {
    routes: Arc<RouteTable>,
    url_root: String,
}

impl Redirector {
    /// Creates a redirector resolving routes against `routes`, with
    /// addresses prefixed by `url_root`.
    pub fn new(routes: Arc<RouteTable>, url_root: impl Into<String>) -> Self {
        Self {
            routes,
            url_root: url_root.into(),
        }
    }

    /// Returns the `Location` value for a route: the root URL followed by the
    /// route's address.
    pub fn location(&self, route: &str, attrs: &Params) -> String {
        format!("{}{}", self.url_root, self.routes.build_address(route, attrs))
    }

    /// Builds the redirect response.
    ///
    /// The status is kept if it has a redirect status line, otherwise
    /// [`DEFAULT_REDIRECT_STATUS`] applies.
    pub fn response(&self, route: &str, attrs: &Params, status: u16) -> Response {
        let status = if redirect_status_line(status).is_some() {
            status
        } else {
            DEFAULT_REDIRECT_STATUS
        };
        let location = self.location(route, attrs);
        debug!(route, status, location = %location, "Redirecting");

        Response::new(status).header("Location", location)
    }

    /// Ends the current request with a redirect.
    ///
    /// Return the signal from a hook or action; nothing else runs for the
    /// request, including the render step.
    ///
    /// ```ignore
    /// fn call(&mut self, action: &str, params: &Params) -> ActionResult {
    ///     if !self.logged_in {
    ///         return Err(self.redirector.redirect("login", &Params::new(), 303));
    ///     }
    ///     // ...
    /// }
    /// ```
    pub fn redirect(&self, route: &str, attrs: &Params, status: u16) -> Signal {
        Signal::Halt(self.response(route, attrs, status))
    }
}
