/// Lazy iterator over a directory path and its ancestors
///
/// For `users/[id]/posts`, yields: `users/[id]/posts` → `users/[id]` → `users` → `""`
///
/// The empty string is the folder root. Only borrowed slices are returned,
/// and iteration stops as soon as the caller does (`find`, `take_while`, ...).
///
/// # Examples
///
/// ```
/// use waymark_router::path::PathHierarchy;
///
/// let dirs: Vec<&str> = PathHierarchy::new("a/b/c").collect();
/// assert_eq!(dirs, vec!["a/b/c", "a/b", "a", ""]);
/// ```
#[derive(Debug, Clone)]
pub struct PathHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> PathHierarchy<'a> {
    /// Starts at `dir`; surrounding slashes are ignored
    pub fn new(dir: &'a str) -> Self {
        Self {
            current: Some(dir.trim_matches('/')),
        }
    }
}

impl<'a> Iterator for PathHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = match current.rfind('/') {
            _ if current.is_empty() => None,
            Some(slash_pos) => Some(&current[..slash_pos]),
            None => Some(""),
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_nested() {
        let dirs: Vec<&str> = PathHierarchy::new("users/[id]/posts").collect();
        assert_eq!(dirs, vec!["users/[id]/posts", "users/[id]", "users", ""]);
    }

    #[test]
    fn test_hierarchy_root() {
        let dirs: Vec<&str> = PathHierarchy::new("").collect();
        assert_eq!(dirs, vec![""]);
    }

    #[test]
    fn test_hierarchy_ignores_outer_slashes() {
        let dirs: Vec<&str> = PathHierarchy::new("/a/").collect();
        assert_eq!(dirs, vec!["a", ""]);
    }

    #[test]
    fn test_hierarchy_short_circuit() {
        let mut iter = PathHierarchy::new("a/b/c/d");
        assert_eq!(iter.find(|&p| p == "a/b"), Some("a/b"));
        assert_eq!(iter.next(), Some("a"));
    }
}
