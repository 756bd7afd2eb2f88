//! Error taxonomy for registration, matching and path building.
//!
//! Every error is raised synchronously at the offending call. "No route
//! matched" is not an error: dispatch reports it as `Ok(None)`.

use crate::route::RouteHandle;

/// Crate-wide result alias.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

/// Top-level router error: conflicts, lookups that found nothing, and
/// validation failures.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// A route handle (or, in strict mode, a route name) was registered twice.
    #[error("route {0} is already registered")]
    Conflict(RouteHandle),

    /// The handle is not present in the route store.
    #[error("unknown route {0}")]
    UnknownRoute(RouteHandle),

    /// No registered route carries the requested name.
    #[error("no route found with name: {0}")]
    RouteNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl RouterError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RouterError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RouterError::UnknownRoute(_) | RouterError::RouteNotFound(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RouterError::Validation(_))
    }

    /// Returns the inner validation error, if any.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            RouterError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Malformed input: bad tag names, bad patterns, bad field announcements or
/// bad reverse-build variables.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid route tag name: {0:?}")]
    InvalidTagName(String),

    #[error("unknown tag: {0}")]
    UnknownTagReference(String),

    #[error("impossible to use placeholder {name:?} more than once in {pattern:?}")]
    DuplicatePlaceholder { name: String, pattern: String },

    #[error("pattern {pattern:?} does not compile to a valid regex")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown filter: {0}")]
    UnknownFilterName(String),

    #[error("field {field:?} binds undeclared route property {property:?}")]
    UndeclaredProperty { field: String, property: String },

    #[error(
        "invalid or incomplete variables for route {route:?} \
         (extraneous: {extraneous:?}, missing: {missing:?})"
    )]
    ExtraneousOrMissingVariable {
        route: String,
        extraneous: Vec<String>,
        missing: Vec<String>,
    },

    #[error("route {route:?} references tag {tag:?} outside a placeholder and cannot be built")]
    NotReversible { route: String, tag: String },
}
