use crate::router::ParamVec;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Split a request target into its decoded path and query parameters
///
/// The path is percent-decoded; an undecodable path (invalid UTF-8 after
/// decoding) is kept as received. Case is left alone, matching is
/// case-insensitive in the router itself. An empty path becomes `/`.
///
/// # Example
///
/// ```
/// use treeroute::server::normalize_target;
///
/// let (path, query) = normalize_target("/files/my%20doc.txt?v=2");
/// assert_eq!(path, "/files/my doc.txt");
/// assert_eq!(query[0].1, "2");
/// ```
#[must_use]
pub fn normalize_target(target: &str) -> (String, ParamVec) {
    let (raw_path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };

    let path = match urlencoding::decode(raw_path) {
        Ok(Cow::Borrowed(p)) => p.to_string(),
        Ok(Cow::Owned(p)) => p,
        Err(err) => {
            debug!(target = %target, error = %err, "Request path is not valid UTF-8 once decoded");
            raw_path.to_string()
        }
    };
    let path = if path.is_empty() { "/".to_string() } else { path };

    (path, parse_query_params(query))
}

/// Parse a query string (without the leading `?`) into parameters
///
/// Names and values are `application/x-www-form-urlencoded` decoded, so `+`
/// becomes a space. Order and duplicates are preserved.
#[must_use]
pub fn parse_query_params(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_splits_query() {
        let (path, query) = normalize_target("/users/42?limit=10&sort=name");
        assert_eq!(path, "/users/42");
        assert_eq!(query.len(), 2);
        assert_eq!(query[0].0.as_ref(), "limit");
        assert_eq!(query[1].1, "name");
    }

    #[test]
    fn test_normalize_keeps_case() {
        let (path, _) = normalize_target("/Users/AbC");
        assert_eq!(path, "/Users/AbC");
    }

    #[test]
    fn test_normalize_empty_path() {
        let (path, query) = normalize_target("?x=1");
        assert_eq!(path, "/");
        assert_eq!(query[0].1, "1");
    }

    #[test]
    fn test_normalize_invalid_escape_kept() {
        let (path, _) = normalize_target("/bad/%FF");
        assert_eq!(path, "/bad/%FF");
    }

    #[test]
    fn test_query_plus_and_duplicates() {
        let query = parse_query_params("q=hello+world&tag=a&tag=b");
        assert_eq!(query[0].1, "hello world");
        assert_eq!(query.len(), 3);
        assert!(parse_query_params("").is_empty());
    }
}
