/// Runtime matching of concrete paths against route tokens
///
/// Tokens compile into one anchored regular expression. Params are lazy, so a
/// param glued to a following literal (`:name-v:version`) stops at that
/// literal; splats capture the rest of the path. Captured values are
/// percent-decoded.
use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use crate::error::{Result, RouterError};
use crate::token::{Part, PathToken};

/// Raw (untyped) params extracted from a matched path
pub type RawParams = BTreeMap<String, String>;

/// A compiled matcher for one route
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    regex: Regex,
    /// Param name for every capture group, in group order
    captures: Vec<(String, bool)>,
}

impl RouteMatcher {
    /// Compiles tokens into a case-sensitive matcher
    pub fn new(tokens: &[PathToken]) -> Result<Self> {
        Self::with_case_insensitive(tokens, false)
    }

    /// Compiles tokens, optionally ignoring ASCII case in literal segments
    pub fn with_case_insensitive(tokens: &[PathToken], case_insensitive: bool) -> Result<Self> {
        let mut body = String::new();
        let mut captures = Vec::new();

        for token in tokens {
            if token.optional {
                body.push_str("(?:/");
                push_parts(&token.parts, &mut body, &mut captures);
                body.push_str(")?");
            } else {
                body.push('/');
                push_parts(&token.parts, &mut body, &mut captures);
            }
        }

        // With every segment absent, the route is the root path
        let source = if tokens.is_empty() {
            "^/$".to_string()
        } else if tokens.iter().all(|token| token.optional) {
            format!("^(?:{}|/)$", body)
        } else {
            format!("^{}$", body)
        };

        let regex = RegexBuilder::new(&source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source_err| RouterError::Pattern {
                path: tokens.iter().map(|t| t.path.as_str()).collect(),
                source: source_err,
            })?;

        Ok(Self { regex, captures })
    }

    /// Checks whether a normalized path matches
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Matches a normalized path and extracts its params.
    ///
    /// Params inside absent optional groups are left out of the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use waymark_router::{tokenize, RouteMatcher};
    ///
    /// let tokens = tokenize("api/:name-v:version").unwrap();
    /// let matcher = RouteMatcher::new(&tokens.tokens).unwrap();
    ///
    /// let params = matcher.captures("/api/lib-v2").unwrap();
    /// assert_eq!(params["name"], "lib");
    /// assert_eq!(params["version"], "2");
    /// ```
    pub fn captures(&self, path: &str) -> Option<RawParams> {
        let caps = self.regex.captures(path)?;

        let params = self
            .captures
            .iter()
            .enumerate()
            .filter_map(|(idx, (name, is_rest))| {
                caps.get(idx + 1)
                    .map(|value| (name.clone(), decode(value.as_str(), *is_rest)))
            })
            .collect();

        Some(params)
    }

    /// The generated regular expression, for diagnostics
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

fn push_parts(parts: &[Part], source: &mut String, captures: &mut Vec<(String, bool)>) {
    for part in parts {
        match part {
            Part::Text(text) => source.push_str(&regex::escape(text)),
            Part::Param(name) => {
                source.push_str("([^/]+?)");
                captures.push((name.clone(), false));
            }
            Part::Rest(name) => {
                source.push_str("(.+)");
                captures.push((name.clone(), true));
            }
            Part::Group(inner) => {
                source.push_str("(?:");
                push_parts(inner, source, captures);
                source.push_str(")?");
            }
        }
    }
}

/// Percent-decodes a captured value; splats are decoded per segment so an
/// encoded `%2F` never turns into a separator.
fn decode(value: &str, is_rest: bool) -> String {
    let decode_one = |raw: &str| {
        urlencoding::decode(raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    };

    if is_rest {
        value
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| decode_one(segment).replace('/', "%2F"))
            .collect::<Vec<_>>()
            .join("/")
    } else {
        decode_one(value)
    }
}
