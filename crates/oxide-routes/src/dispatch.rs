//! Per-request dispatch.
//!
//! A request goes through these steps:
//!
//! ```text
//! request URI
//!   → params (via the route table)
//!   → mode resolution (defaults to "index")
//!   → layout before-action hook (may switch the mode)
//!   → controller resolution (falls back to Page/error404)
//!   → controller before-action hook + action
//!       ↳ on redirect signal: one retry with the signal's target,
//!         resolved the same way
//!       ↳ on failure: Page/error with the failure
//!   → layout mode
//!   → layout render
//! ```
//!
//! A redirect signal raised during the retry is not retried again; it ends
//! the dispatch with [`DispatchError::NestedRedirect`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::controller::{
    ActionResult, Controller, ControllerRegistry, Layout, LayoutFactory, Signal,
};
use crate::error::{DispatchError, Failure};
use crate::params::{Params, url_decode};
use crate::redirect::Redirector;
use crate::response::Response;
use crate::table::RouteTable;

/// Controller serving not-found and error pages.
pub const FALLBACK_CONTROLLER: &str = "Page";
/// Action serving unresolvable controllers.
pub const NOT_FOUND_ACTION: &str = "error404";
/// Action receiving failures.
pub const ERROR_ACTION: &str = "error";
/// Layout mode used when the request names none or an unknown one.
pub const DEFAULT_MODE: &str = "index";

/// What a request resolved to. Updated as fallbacks kick in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    /// Layout mode.
    pub mode: String,
    /// Controller name.
    pub controller: String,
    /// Action name.
    pub action: String,
    /// Request params.
    pub params: Params,
}

impl DispatchContext {
    fn fall_back(&mut self, action: &str) {
        self.controller = FALLBACK_CONTROLLER.to_string();
        self.action = action.to_string();
    }
}

/// Resolves requests to controllers and runs them.
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    url_root: String,
    layout: LayoutFactory,
    controllers: ControllerRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher over a route table with a layout factory.
    pub fn new<F, L>(routes: Arc<RouteTable>, layout: F) -> Self
    where
        F: Fn() -> L + Send + Sync + 'static,
        L: Layout + 'static,
    {
        Self {
            routes,
            url_root: String::new(),
            layout: Arc::new(move || Box::new(layout()) as Box<dyn Layout>),
            controllers: ControllerRegistry::new(),
        }
    }

    /// Sets the root prefix stripped from request URIs.
    #[must_use]
    pub fn url_root(mut self, url_root: impl Into<String>) -> Self {
        self.url_root = url_root.into();
        self
    }

    /// Sets the controller registry.
    #[must_use]
    pub fn controllers(mut self, controllers: ControllerRegistry) -> Self {
        self.controllers = controllers;
        self
    }

    /// Returns the route table.
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Returns a redirector sharing this dispatcher's table and root.
    pub fn redirector(&self) -> Redirector {
        Redirector::new(Arc::clone(&self.routes), self.url_root.clone())
    }

    /// Decodes a request URI, strips the root prefix and extracts its params.
    pub fn request_params(&self, request_uri: &str) -> Params {
        let decoded = url_decode(request_uri);
        let path = decoded
            .strip_prefix(self.url_root.as_str())
            .unwrap_or(&decoded);
        self.routes.extract_params(path)
    }

    /// Serves a request URI.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when the request cannot be served even by
    /// the fallback controller.
    pub fn dispatch(&self, request_uri: &str) -> Result<Response, DispatchError> {
        debug!(uri = request_uri, "Dispatching");
        let params = self.request_params(request_uri);
        self.dispatch_params(params)
    }

    /// Serves already-extracted params.
    pub fn dispatch_params(&self, mut params: Params) -> Result<Response, DispatchError> {
        let mut layout = (self.layout)();

        let mode = match params.get("mode") {
            Some(mode) if layout.has_mode(mode) => mode.to_string(),
            _ => DEFAULT_MODE.to_string(),
        };
        params.insert("mode", mode.as_str());

        if let Some(response) = layout_step(layout.before_action(&mode, &mut params))? {
            return Ok(response);
        }

        // The hook may have switched modes; no default applies from here on.
        let mut ctx = DispatchContext {
            mode: params.get("mode").unwrap_or_default().to_string(),
            controller: params.get("controller").unwrap_or_default().to_string(),
            action: params.get("action").unwrap_or_default().to_string(),
            params,
        };
        self.resolve_controller(&mut ctx)?;

        let outcome = match self.run_action(&mut ctx, &mut *layout) {
            Err(Signal::Redirect(signal)) => {
                debug!(
                    controller = %signal.controller,
                    action = %signal.action,
                    "Redirect signal, retrying once"
                );
                ctx.controller = signal.controller;
                ctx.action = signal.action;
                ctx.params = signal.params;
                self.resolve_controller(&mut ctx)?;
                match self.run_action(&mut ctx, &mut *layout) {
                    Err(Signal::Redirect(nested)) => {
                        return Err(DispatchError::NestedRedirect(nested));
                    }
                    retried => retried,
                }
            }
            first => first,
        };

        match outcome {
            Ok(()) => {}
            Err(Signal::Halt(response)) => return Ok(response),
            Err(Signal::Failure(failure)) => {
                if let Some(response) = self.serve_error(&mut ctx, &mut *layout, failure)? {
                    return Ok(response);
                }
            }
            Err(Signal::Redirect(signal)) => return Err(DispatchError::NestedRedirect(signal)),
        }

        if !layout.has_mode(&ctx.mode) {
            return Err(DispatchError::ModeNotFound(ctx.mode));
        }
        if let Some(response) = layout_step(layout.call_mode(&ctx.mode))? {
            return Ok(response);
        }

        debug!(
            controller = %ctx.controller,
            action = %ctx.action,
            mode = %ctx.mode,
            "Rendering"
        );
        match layout.render() {
            Ok(response) | Err(Signal::Halt(response)) => Ok(response),
            Err(Signal::Failure(failure)) => Err(DispatchError::Layout(failure)),
            Err(Signal::Redirect(signal)) => Err(DispatchError::UnexpectedRedirect(signal)),
        }
    }

    /// Sends an empty or unregistered controller to the not-found page.
    fn resolve_controller(&self, ctx: &mut DispatchContext) -> Result<(), DispatchError> {
        if !ctx.controller.is_empty() && self.controllers.contains(&ctx.controller) {
            return Ok(());
        }

        warn!(controller = %ctx.controller, "Controller not found, serving not-found page");
        ctx.fall_back(NOT_FOUND_ACTION);
        if self.controllers.contains(FALLBACK_CONTROLLER) {
            Ok(())
        } else {
            Err(DispatchError::FallbackNotFound(
                FALLBACK_CONTROLLER.to_string(),
            ))
        }
    }

    /// Instantiates the context's controller, runs its hook and action and
    /// hands it to the layout.
    fn run_action(&self, ctx: &mut DispatchContext, layout: &mut dyn Layout) -> ActionResult {
        let mut controller: Box<dyn Controller> = self
            .controllers
            .create(&ctx.controller)
            .ok_or_else(|| Failure::ControllerNotFound(ctx.controller.clone()))?;

        if !controller.has_action(&ctx.action) {
            layout.attach(controller, ctx);
            return Err(Failure::ActionNotFound {
                controller: ctx.controller.clone(),
                action: ctx.action.clone(),
            }
            .into());
        }

        debug!(controller = %ctx.controller, action = %ctx.action, "Running action");
        let result = controller
            .before_action(&ctx.action, &mut ctx.params)
            .and_then(|()| controller.call(&ctx.action, &ctx.params));
        layout.attach(controller, ctx);
        result
    }

    /// Hands a failure to the error action. Returns a response if the error
    /// action halted the request.
    fn serve_error(
        &self,
        ctx: &mut DispatchContext,
        layout: &mut dyn Layout,
        failure: Failure,
    ) -> Result<Option<Response>, DispatchError> {
        warn!(
            controller = %ctx.controller,
            action = %ctx.action,
            error = %failure,
            "Action failed, serving error page"
        );
        ctx.fall_back(ERROR_ACTION);

        let Some(mut controller) = self.controllers.create(FALLBACK_CONTROLLER) else {
            return Err(DispatchError::Unhandled(failure));
        };
        if !controller.has_action(ERROR_ACTION) {
            return Err(DispatchError::Unhandled(failure));
        }

        let result = controller.error(&failure);
        layout.attach(controller, ctx);
        match result {
            Ok(()) => Ok(None),
            Err(Signal::Halt(response)) => Ok(Some(response)),
            Err(Signal::Failure(failure)) => Err(DispatchError::Unhandled(failure)),
            Err(Signal::Redirect(signal)) => Err(DispatchError::UnexpectedRedirect(signal)),
        }
    }
}

/// Maps the outcome of a layout hook: a halt ends the request with its
/// response, anything else but success is fatal.
fn layout_step(result: ActionResult) -> Result<Option<Response>, DispatchError> {
    match result {
        Ok(()) => Ok(None),
        Err(Signal::Halt(response)) => Ok(Some(response)),
        Err(Signal::Failure(failure)) => Err(DispatchError::Layout(failure)),
        Err(Signal::Redirect(signal)) => Err(DispatchError::UnexpectedRedirect(signal)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteDef;

    struct Page;

    impl Controller for Page {
        fn has_action(&self, action: &str) -> bool {
            matches!(action, "error404" | "error")
        }

        fn call(&mut self, _action: &str, _params: &Params) -> ActionResult {
            Ok(())
        }

        fn error(&mut self, _failure: &Failure) -> ActionResult {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Plain {
        served: Option<String>,
    }

    impl Layout for Plain {
        fn has_mode(&self, mode: &str) -> bool {
            mode == "index"
        }

        fn attach(&mut self, _controller: Box<dyn Controller>, ctx: &DispatchContext) {
            self.served = Some(format!("{}/{}", ctx.controller, ctx.action));
        }

        fn call_mode(&mut self, _mode: &str) -> ActionResult {
            Ok(())
        }

        fn render(&mut self) -> ActionResult<Response> {
            Ok(Response::text(self.served.clone().unwrap_or_default()))
        }
    }

    fn dispatcher() -> Dispatcher {
        let routes = RouteTable::new([RouteDef::new(
            "home",
            "/",
            "^/$",
            "controller=Home&action=index",
        )])
        .unwrap();
        Dispatcher::new(Arc::new(routes), Plain::default)
            .url_root("/app")
            .controllers(ControllerRegistry::new().register("Page", || Page))
    }

    #[test]
    fn test_request_params_strip_root_and_decode() {
        let params = dispatcher().request_params("/app%2F");
        assert_eq!(params.get("controller"), Some("Home"));

        let params = dispatcher().request_params("/app/search?q=caf%C3%A9");
        assert_eq!(params.get("q"), Some("café"));
    }

    #[test]
    fn test_unknown_controller_renders_not_found() {
        let res = dispatcher().dispatch("/app/").unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Page/error404".to_string()));
    }

    #[test]
    fn test_missing_fallback_is_fatal() {
        let routes = Arc::new(RouteTable::default());
        let dispatcher = Dispatcher::new(routes, Plain::default);
        let err = dispatcher.dispatch("/").unwrap_err();
        assert!(matches!(err, DispatchError::FallbackNotFound(name) if name == "Page"));
    }
}
