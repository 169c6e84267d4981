/// Request path normalization
///
/// All functions are **pure**: same input, same output, no side effects.
use std::borrow::Cow;

pub mod hierarchy;
pub use hierarchy::PathHierarchy;

/// Validates if a request path is already in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//`, `\`, `?` or `#`
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use waymark_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/users/123"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("users")); // Missing leading /
/// assert!(!is_valid_path("/users/")); // Trailing /
/// assert!(!is_valid_path("/users?page=2")); // Query string
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains(['\\', '?', '#']) {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalizes a request path before matching
///
/// Returns `Cow::Borrowed` when the input is already canonical.
///
/// - Query strings and fragments are dropped: `/a?b=1#c` → `/a`
/// - Trailing slashes: `/path/` → `/path`
/// - Repeated slashes: `/path//to` → `/path/to`
/// - Backslashes: `\path\to` → `/path/to`
///
/// # Examples
///
/// ```
/// use waymark_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/about"), Cow::Borrowed("/about")));
/// assert_eq!(normalize_path("/about/"), "/about");
/// assert_eq!(normalize_path("\\users\\123"), "/users/123");
/// assert_eq!(normalize_path("/search?q=rust"), "/search");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let without_query = path.split(['?', '#']).next().unwrap_or_default();

    let normalized = without_query
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Joins path components with `/`, the separator route specs use on every
/// platform
pub fn join_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
