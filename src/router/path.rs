//! Route pattern grammar.
//!
//! ```text
//! path    := "/" segment*
//! segment := literal | ":" name | "*" name
//! ```
//!
//! `name` is one or more characters up to the next `/`. A segment carries at
//! most one variable marker and a `*` segment may only appear last. Patterns
//! are validated in full before the tree is touched, so the insertion code
//! only ever sees well-formed fragments.

use super::error::RouteError;

/// Kind of variable marker found in a route fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker {
    /// `:name`, matches one path segment
    Param,
    /// `*name`, matches the remainder of the path
    CatchAll,
}

/// Position of the first variable in a route fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Variable {
    pub marker: Marker,
    /// Byte index of the `:` or `*`
    pub start: usize,
    /// Byte index one past the name (next `/` or end of fragment)
    pub end: usize,
}

impl Variable {
    /// The variable's name without its marker
    pub fn name<'p>(&self, fragment: &'p str) -> &'p str {
        &fragment[self.start + 1..self.end]
    }
}

/// Locate the first `:` or `*` marker in `fragment`.
pub(crate) fn find_variable(fragment: &str) -> Option<Variable> {
    let start = fragment.find([':', '*'])?;
    let end = fragment[start + 1..]
        .find('/')
        .map_or(fragment.len(), |i| start + 1 + i);
    let marker = if fragment.as_bytes()[start] == b':' {
        Marker::Param
    } else {
        Marker::CatchAll
    };
    Some(Variable { marker, start, end })
}

/// Number of variable segments in a (validated) route fragment.
pub(crate) fn variable_count(fragment: &str) -> usize {
    fragment.bytes().filter(|b| *b == b':' || *b == b'*').count()
}

/// Validate a route pattern and return its case-folded form.
///
/// Folding uses full Unicode lower-casing, the same folding lookups apply to
/// request paths.
///
/// # Errors
///
/// Any grammar violation, reported against the pattern as written.
pub(crate) fn parse_route(path: &str) -> Result<String, RouteError> {
    if !path.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash {
            path: path.to_string(),
        });
    }

    let folded = path.to_lowercase();
    let mut rest = folded.as_str();
    while let Some(var) = find_variable(rest) {
        let name = var.name(rest);
        if name.is_empty() {
            return Err(RouteError::UnnamedVariable {
                path: path.to_string(),
            });
        }
        if name.contains([':', '*']) {
            return Err(RouteError::MultipleVariables {
                path: path.to_string(),
            });
        }
        if var.marker == Marker::CatchAll {
            if var.end != rest.len() {
                return Err(RouteError::CatchAllNotLast {
                    path: path.to_string(),
                });
            }
            if var.start == 0 || rest.as_bytes()[var.start - 1] != b'/' {
                return Err(RouteError::CatchAllWithoutSlash {
                    path: path.to_string(),
                });
            }
        }
        rest = &rest[var.end..];
    }

    Ok(folded)
}

/// Validate and normalise a group prefix.
///
/// The trailing `/` is trimmed so the delegated remainder always starts with
/// `/`, which is what the sub-router's own routes begin with.
pub(crate) fn parse_group_prefix(prefix: &str) -> Result<String, RouteError> {
    let folded = parse_route(prefix)?;
    let trimmed = folded.trim_end_matches('/');
    if trimmed.is_empty() || find_variable(trimmed).is_some() {
        return Err(RouteError::InvalidGroupPrefix {
            path: prefix.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Length of the longest common prefix of `a` and `b`, on a char boundary.
pub(crate) fn common_prefix(a: &str, b: &str) -> usize {
    let mut i = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    while !a.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_folds_case() {
        assert_eq!(parse_route("/Users/:ID").unwrap(), "/users/:id");
    }

    #[test]
    fn test_parse_route_requires_leading_slash() {
        assert_eq!(
            parse_route("users"),
            Err(RouteError::MissingLeadingSlash {
                path: "users".to_string()
            })
        );
    }

    #[test]
    fn test_parse_route_rejects_unnamed_markers() {
        assert!(matches!(
            parse_route("/users/:"),
            Err(RouteError::UnnamedVariable { .. })
        ));
        assert!(matches!(
            parse_route("/files/*"),
            Err(RouteError::UnnamedVariable { .. })
        ));
        assert!(matches!(
            parse_route("/users/:/posts"),
            Err(RouteError::UnnamedVariable { .. })
        ));
    }

    #[test]
    fn test_parse_route_one_variable_per_segment() {
        assert!(matches!(
            parse_route("/:a:b"),
            Err(RouteError::MultipleVariables { .. })
        ));
        assert!(matches!(
            parse_route("/:a*b"),
            Err(RouteError::MultipleVariables { .. })
        ));
        assert!(parse_route("/:a/:b").is_ok());
    }

    #[test]
    fn test_parse_route_catch_all_rules() {
        assert!(parse_route("/src/*filepath").is_ok());
        assert!(matches!(
            parse_route("/src/*filepath/more"),
            Err(RouteError::CatchAllNotLast { .. })
        ));
        assert!(matches!(
            parse_route("/src*filepath"),
            Err(RouteError::CatchAllWithoutSlash { .. })
        ));
    }

    #[test]
    fn test_find_variable_positions() {
        let var = find_variable("/users/:id/posts").unwrap();
        assert_eq!(var.marker, Marker::Param);
        assert_eq!((var.start, var.end), (7, 10));
        assert_eq!(var.name("/users/:id/posts"), "id");
        assert!(find_variable("/static/only").is_none());
    }

    #[test]
    fn test_group_prefix_trims_trailing_slash() {
        assert_eq!(parse_group_prefix("/api/").unwrap(), "/api");
        assert!(matches!(
            parse_group_prefix("/"),
            Err(RouteError::InvalidGroupPrefix { .. })
        ));
        assert!(matches!(
            parse_group_prefix("/users/:id"),
            Err(RouteError::InvalidGroupPrefix { .. })
        ));
    }

    #[test]
    fn test_common_prefix_respects_char_boundaries() {
        assert_eq!(common_prefix("/search", "/support"), 2);
        assert_eq!(common_prefix("/caf\u{e9}", "/caf\u{e8}"), 4);
        assert_eq!(common_prefix("/a", ""), 0);
    }
}
