use std::fmt;

/// Route registration error
///
/// Returned by [`Router::handle`](super::Router::handle), the per-method
/// helpers and the group methods when a route cannot be added. A failed
/// registration leaves the tree exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The route path does not start with `/`
    MissingLeadingSlash {
        /// The offending route path
        path: String,
    },
    /// A `:` or `*` marker without a name (e.g. `/users/:`)
    UnnamedVariable {
        /// The offending route path
        path: String,
    },
    /// Two variable markers inside the same path segment (e.g. `/:a:b`)
    MultipleVariables {
        /// The offending route path
        path: String,
    },
    /// A catch-all that is not the final segment of its route
    CatchAllNotLast {
        /// The offending route path
        path: String,
    },
    /// A catch-all that is not directly preceded by `/`
    CatchAllWithoutSlash {
        /// The offending route path
        path: String,
    },
    /// A catch-all whose leading `/` is already owned by an existing route
    ///
    /// Registering `/src/*filepath` after `/src/` would make the catch-all
    /// swallow the existing route.
    CatchAllConflict {
        /// The offending route path
        path: String,
    },
    /// A variable segment collides with existing children in the same slot
    ///
    /// Either a different variable name (`/users/:id` vs `/users/:name`), or a
    /// variable and a literal competing for the same position.
    VariableConflict {
        /// The offending route path
        path: String,
    },
    /// A handler is already registered for this exact path
    Duplicate {
        /// The offending route path
        path: String,
    },
    /// The route would continue below a mounted sub-router
    ExtendsGroup {
        /// The offending route path
        path: String,
    },
    /// A sub-router cannot be mounted where routes already continue
    GroupConflict {
        /// The offending group prefix
        path: String,
    },
    /// Group prefixes must be literal and must not be `/` alone
    InvalidGroupPrefix {
        /// The offending group prefix
        path: String,
    },
    /// The static file responder must be bound to a route ending in `/*filepath`
    InvalidFileRoute {
        /// The offending route path
        path: String,
    },
}

impl RouteError {
    /// The route path the error was raised for
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            RouteError::MissingLeadingSlash { path }
            | RouteError::UnnamedVariable { path }
            | RouteError::MultipleVariables { path }
            | RouteError::CatchAllNotLast { path }
            | RouteError::CatchAllWithoutSlash { path }
            | RouteError::CatchAllConflict { path }
            | RouteError::VariableConflict { path }
            | RouteError::Duplicate { path }
            | RouteError::ExtendsGroup { path }
            | RouteError::GroupConflict { path }
            | RouteError::InvalidGroupPrefix { path }
            | RouteError::InvalidFileRoute { path } => path,
        }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::MissingLeadingSlash { path } => {
                write!(f, "route path must begin with '/' in path '{path}'")
            }
            RouteError::UnnamedVariable { path } => {
                write!(f, "variables must be named with a non-empty name in path '{path}'")
            }
            RouteError::MultipleVariables { path } => {
                write!(f, "only one variable allowed per path segment in path '{path}'")
            }
            RouteError::CatchAllNotLast { path } => {
                write!(f, "catch-all routes are only allowed at the end of the path in path '{path}'")
            }
            RouteError::CatchAllWithoutSlash { path } => {
                write!(f, "no / before catch-all in path '{path}'")
            }
            RouteError::CatchAllConflict { path } => {
                write!(
                    f,
                    "catch-all conflicts with existing handler for the path segment root in path '{path}'"
                )
            }
            RouteError::VariableConflict { path } => {
                write!(f, "variable route conflicts with existing children in path '{path}'")
            }
            RouteError::Duplicate { path } => {
                write!(f, "a handler is already registered for path '{path}'")
            }
            RouteError::ExtendsGroup { path } => {
                write!(f, "cannot register routes below a mounted group in path '{path}'")
            }
            RouteError::GroupConflict { path } => {
                write!(f, "cannot mount a group where routes already exist in path '{path}'")
            }
            RouteError::InvalidGroupPrefix { path } => {
                write!(
                    f,
                    "group prefix must be a literal path other than '/' in prefix '{path}'"
                )
            }
            RouteError::InvalidFileRoute { path } => {
                write!(f, "path must end with /*filepath in path '{path}'")
            }
        }
    }
}

impl std::error::Error for RouteError {}
