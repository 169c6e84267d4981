/// Match-priority ordering for routes
///
/// Routes are registered with first-match routers, so more specific paths
/// must come first. Segments are compared left to right by [`SegmentKind`]
/// (`Static < Mixed < Param < Optional < Rest`); when one path is a prefix of
/// the other the shorter one wins, and the rendered pattern breaks any
/// remaining tie so the order is total and deterministic.
use std::cmp::Ordering;

use crate::entry::RouteEntry;
use crate::token::PathToken;

/// Compares two token streams by match priority (pure function)
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use waymark_router::{specificity_cmp, tokenize};
///
/// let profile = tokenize("priority/profile").unwrap();
/// let by_id = tokenize("priority/:id").unwrap();
///
/// assert_eq!(specificity_cmp(&profile.tokens, &by_id.tokens), Ordering::Less);
/// ```
pub fn specificity_cmp(a: &[PathToken], b: &[PathToken]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(left, right)| left.kind.cmp(&right.kind))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
        .then_with(|| {
            a.iter()
                .map(|t| t.path.as_str())
                .cmp(b.iter().map(|t| t.path.as_str()))
        })
}

/// Sorts entries so that more specific routes come first.
///
/// Stable and total: equal-priority entries fall back to their name.
pub fn sort_by_specificity(entries: &mut [RouteEntry]) {
    entries.sort_by(|a, b| {
        specificity_cmp(&a.path_tokens, &b.path_tokens).then_with(|| a.name.cmp(&b.name))
    });
}
