//! Controller capabilities and the controller registry.
//!
//! Controllers are looked up by name in a [`ControllerRegistry`] filled at
//! startup. A controller reports which actions it supports through
//! [`Controller::has_action`] and runs them through [`Controller::call`].
//!
//! Actions return an [`ActionResult`]. Besides success, an action can ask the
//! dispatcher to serve another controller instead ([`Signal::Redirect`]), end
//! the request with a ready response ([`Signal::Halt`]) or fail
//! ([`Signal::Failure`]).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::DispatchContext;
use crate::error::Failure;
use crate::params::Params;
use crate::response::Response;

/// A request to re-dispatch to another controller and action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectSignal {
    /// Target controller name.
    pub controller: String,
    /// Target action name.
    pub action: String,
    /// Params handed to the target action.
    pub params: Params,
}

impl RedirectSignal {
    /// Creates a new redirect signal.
    pub fn new(controller: impl Into<String>, action: impl Into<String>, params: Params) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            params,
        }
    }
}

/// Interrupts the normal flow of a dispatch.
#[derive(Debug)]
pub enum Signal {
    /// Serve another controller and action instead.
    Redirect(RedirectSignal),
    /// Stop processing and send this response as-is.
    Halt(Response),
    /// Something went wrong.
    Failure(Failure),
}

impl Signal {
    /// Shorthand for a redirect signal.
    pub fn redirect(
        controller: impl Into<String>,
        action: impl Into<String>,
        params: Params,
    ) -> Self {
        Self::Redirect(RedirectSignal::new(controller, action, params))
    }
}

impl From<Failure> for Signal {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}

impl From<RedirectSignal> for Signal {
    fn from(signal: RedirectSignal) -> Self {
        Self::Redirect(signal)
    }
}

/// Result of a controller hook or action.
pub type ActionResult<T = ()> = std::result::Result<T, Signal>;

/// A request-scoped controller.
///
/// # Example
///
/// ```ignore
/// struct ArticleController;
///
/// impl Controller for ArticleController {
///     fn has_action(&self, action: &str) -> bool {
///         matches!(action, "view" | "list")
///     }
///
///     fn call(&mut self, action: &str, params: &Params) -> ActionResult {
///         match action {
///             "view" => self.view(params.require("id").map_err(Failure::msg)?),
///             _ => self.list(),
///         }
///     }
/// }
/// ```
pub trait Controller: Send {
    /// Returns true if the controller implements this action.
    fn has_action(&self, action: &str) -> bool;

    /// Called before the action runs. May rewrite params.
    fn before_action(&mut self, _action: &str, _params: &mut Params) -> ActionResult {
        Ok(())
    }

    /// Runs an action. Only called for actions reported by `has_action`.
    fn call(&mut self, action: &str, params: &Params) -> ActionResult;

    /// Handles a failure raised while serving the request.
    ///
    /// Only called on the error controller, and only when it reports an
    /// `error` action.
    fn error(&mut self, failure: &Failure) -> ActionResult {
        Err(Signal::Failure(Failure::msg(format!(
            "unhandled failure: {failure}"
        ))))
    }
}

/// The application-wide controller wrapping each request's controller.
pub trait Layout: Send {
    /// Returns true if the layout implements this mode.
    fn has_mode(&self, mode: &str) -> bool;

    /// Called with the resolved mode before any controller is resolved. May
    /// rewrite params, including the controller and action to serve.
    fn before_action(&mut self, _mode: &str, _params: &mut Params) -> ActionResult {
        Ok(())
    }

    /// Receives the controller that served the request, along with the
    /// controller and action names it was resolved as.
    fn attach(&mut self, controller: Box<dyn Controller>, ctx: &DispatchContext);

    /// Runs a mode. Only called for modes reported by `has_mode`.
    fn call_mode(&mut self, mode: &str) -> ActionResult;

    /// Renders the response.
    fn render(&mut self) -> ActionResult<Response>;
}

/// Creates a fresh controller for each request.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Creates a fresh layout for each request.
pub type LayoutFactory = Arc<dyn Fn() -> Box<dyn Layout> + Send + Sync>;

/// Maps controller names to factories.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller factory under a name.
    #[must_use]
    pub fn register<F, C>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        self.factories.insert(
            name.into(),
            Arc::new(move || Box::new(factory()) as Box<dyn Controller>),
        );
        self
    }

    /// Returns true if a controller is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Creates a new instance of the named controller.
    pub fn create(&self, name: &str) -> Option<Box<dyn Controller>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Returns the registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;

    impl Controller for Ping {
        fn has_action(&self, action: &str) -> bool {
            action == "ping"
        }

        fn call(&mut self, _action: &str, _params: &Params) -> ActionResult {
            Ok(())
        }
    }

    #[test]
    fn test_registry() {
        let registry = ControllerRegistry::new().register("Ping", || Ping);
        assert!(registry.contains("Ping"));
        assert!(!registry.contains("Pong"));

        let controller = registry.create("Ping").unwrap();
        assert!(controller.has_action("ping"));
        assert!(!controller.has_action("pong"));
        assert!(registry.create("Pong").is_none());
    }

    #[test]
    fn test_default_error_capability_fails() {
        let mut controller = Ping;
        let result = controller.error(&Failure::msg("boom"));
        assert!(matches!(result, Err(Signal::Failure(_))));
    }

    #[test]
    fn test_failure_converts_to_signal() {
        fn action() -> ActionResult {
            Err(Failure::msg("nope"))?
        }
        assert!(matches!(action(), Err(Signal::Failure(_))));
    }
}
