//! Error types for route tables and dispatch.

use thiserror::Error;

use crate::controller::RedirectSignal;

/// Errors raised while loading a route table.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A route's `regexp` failed to compile.
    #[error("invalid pattern for route `{route}`: {source}")]
    InvalidPattern {
        route: String,
        #[source]
        source: regex::Error,
    },

    /// Two routes share the same name.
    #[error("duplicate route name: {0}")]
    DuplicateRoute(String),

    /// The route file is not valid JSON for the table format.
    #[error("invalid route table: {0}")]
    Json(#[from] serde_json::Error),

    /// The route file could not be read.
    #[error("failed to read route table: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for route table operations.
pub type Result<T> = std::result::Result<T, RouteError>;

/// A recoverable failure raised while resolving or running a controller.
///
/// Failures reaching the dispatcher are handed to the `Page` controller's
/// `error` action.
#[derive(Debug, Error)]
pub enum Failure {
    /// No controller is registered under this name.
    #[error("\"{0}\" controller not found")]
    ControllerNotFound(String),

    /// The controller exists but has no such action.
    #[error("\"{action}\" action in \"{controller}\" controller not found")]
    ActionNotFound { controller: String, action: String },

    /// Any other error raised by application code.
    #[error("{0}")]
    Generic(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Failure {
    /// Wraps an arbitrary error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Generic(Box::new(err))
    }

    /// Creates a failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Generic(message.into().into())
    }
}

/// Fatal dispatch outcomes. These escape the dispatcher and are the hosting
/// layer's to report, typically as a generic server error.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The fallback controller needed to serve a 404 is not registered.
    #[error("\"{0}\" controller not found")]
    FallbackNotFound(String),

    /// A redirect signal was raised while already serving a redirect.
    #[error("redirect to {}/{} raised during redirect retry", .0.controller, .0.action)]
    NestedRedirect(RedirectSignal),

    /// A redirect signal was raised outside of action dispatch, where nothing
    /// can serve it.
    #[error("redirect to {}/{} raised outside of action dispatch", .0.controller, .0.action)]
    UnexpectedRedirect(RedirectSignal),

    /// A failure the error fallback could not handle.
    #[error(transparent)]
    Unhandled(Failure),

    /// The layout controller has no capability for the resolved mode.
    #[error("\"{0}\" mode not found in layout controller")]
    ModeNotFound(String),

    /// The layout controller failed outside of action dispatch.
    #[error("layout controller failed: {0}")]
    Layout(#[source] Failure),
}
