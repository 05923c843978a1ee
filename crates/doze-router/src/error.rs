//! Router error types.
//!
//! Errors are split by the phase that produces them:
//!
//! - [`PatternError`] - a route template could not be compiled
//! - [`RouteError`] - a route could not be registered
//! - [`MatchError`] - an incoming path/method could not be resolved
//! - [`BuildError`] - a path could not be built from a named route

use http::Method;
use thiserror::Error;

/// A route template could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The template was empty.
    #[error("route template is empty")]
    Empty,

    /// A `{}` or `{:tag}` segment has no parameter name.
    #[error("parameter without a name in template {template}")]
    EmptyParamName {
        /// The offending template.
        template: String,
    },

    /// A wildcard segment appeared before the end of the template.
    #[error("wildcard must be the last segment in template {template}")]
    WildcardNotLast {
        /// The offending template.
        template: String,
    },

    /// The same parameter name was bound twice in one template.
    #[error("parameter {name} appears more than once in template {template}")]
    DuplicateParam {
        /// The offending template.
        template: String,
        /// The repeated parameter name.
        name: String,
    },
}

/// A route could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The route template is malformed.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The route already has a handler for this method.
    #[error("route {path} already handles {method}")]
    DuplicateMethod {
        /// The route template.
        path: String,
        /// The repeated method.
        method: Method,
    },

    /// Another route already uses this name.
    #[error("route name {0} is already registered")]
    DuplicateName(String),

    /// The route is already named differently.
    #[error("route {path} is already named {existing}, cannot rename to {name}")]
    Renamed {
        /// The route template.
        path: String,
        /// The name the route already has.
        existing: String,
        /// The name that was given.
        name: String,
    },

    /// Two different templates resolve to the same trie leaf.
    ///
    /// `/users/{id}` and `/users/{uid}` are indistinguishable to the matcher.
    #[error("route {path} conflicts with existing route {existing}")]
    Conflict {
        /// The template being registered.
        path: String,
        /// The template that already owns the leaf.
        existing: String,
    },

    /// A router with this name already exists in the registry.
    #[error("router {0} already exists")]
    DuplicateRouter(String),
}

/// An incoming request could not be resolved to a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// No registered template matches the path.
    #[error("no route matches {path}")]
    NotFound {
        /// The requested path.
        path: String,
    },

    /// A template matches the path, but not for this method.
    #[error("method {method} is not allowed for {path}")]
    MethodNotAllowed {
        /// The requested path.
        path: String,
        /// The requested method.
        method: Method,
        /// Methods the matched route does handle, in registration order.
        allowed: Vec<Method>,
    },
}

/// A path could not be built from a named route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No route is registered under this name.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// The number of supplied parameters differs from the template's.
    #[error("wrong number of parameters: {given} given, {required} required")]
    ParamCount {
        /// Number of distinct parameters supplied.
        given: usize,
        /// Number of named parameters in the template.
        required: usize,
    },

    /// A supplied parameter does not appear in the template.
    #[error("parameter not valid: {0}")]
    UnknownParam(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_messages() {
        let err = BuildError::ParamCount {
            given: 3,
            required: 2,
        };
        assert_eq!(err.to_string(), "wrong number of parameters: 3 given, 2 required");
        assert_eq!(
            BuildError::UnknownParam("not".to_string()).to_string(),
            "parameter not valid: not"
        );
    }

    #[test]
    fn test_route_error_from_pattern_error() {
        let err: RouteError = PatternError::Empty.into();
        assert_eq!(err, RouteError::Pattern(PatternError::Empty));
        assert_eq!(err.to_string(), "route template is empty");
    }

    #[test]
    fn test_method_not_allowed_message() {
        let err = MatchError::MethodNotAllowed {
            path: "/users".to_string(),
            method: Method::DELETE,
            allowed: vec![Method::GET],
        };
        assert_eq!(err.to_string(), "method DELETE is not allowed for /users");
    }
}
