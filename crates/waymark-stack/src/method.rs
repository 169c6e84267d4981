use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StackError;

/// HTTP methods a route can be registered for.
///
/// The declaration order is the canonical order used in every method list
/// this crate produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Head,
    Options,
    Get,
    Put,
    Patch,
    Post,
    Delete,
}

impl HttpMethod {
    /// Every supported method, in canonical order
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Post,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| StackError::UnknownMethod(s.to_string()))
    }
}

/// Sorts and dedupes a method list into canonical order
pub(crate) fn canonical(methods: impl IntoIterator<Item = HttpMethod>) -> Vec<HttpMethod> {
    let mut methods: Vec<HttpMethod> = methods.into_iter().collect();
    methods.sort();
    methods.dedup();
    methods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("DELETE".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert_eq!(
            "TRACE".parse::<HttpMethod>().unwrap_err(),
            StackError::UnknownMethod("TRACE".to_string())
        );
    }

    #[test]
    fn test_canonical_order() {
        let methods = canonical([HttpMethod::Post, HttpMethod::Get, HttpMethod::Head, HttpMethod::Get]);
        assert_eq!(methods, vec![HttpMethod::Head, HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn test_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&HttpMethod::Patch).unwrap(),
            "\"PATCH\""
        );
    }
}
