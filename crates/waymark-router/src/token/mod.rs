/// Path tokenizer
///
/// Turns a route path spec into one [`PathToken`] per path segment plus a
/// canonical matcher pattern. Every bracket dialect is normalised here, so the
/// matcher, the resolver and downstream code generators all consume the same
/// token stream.
///
/// ```
/// use waymark_router::tokenize;
///
/// let tokens = tokenize("users/[id]/posts/[[page]]").unwrap();
/// assert_eq!(tokens.pattern, "/users/:id/posts{/:page}");
/// assert_eq!(tokens.params().len(), 2);
/// ```
use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Result, RouterError};

mod lexer;

pub(crate) use lexer::is_ident_char;

/// One parsed piece of a path segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Part {
    /// Literal text, matched verbatim
    Text(String),
    /// Named parameter matching a non-empty run of characters up to the next
    /// literal or separator
    Param(String),
    /// Splat parameter capturing the remaining path, separators included
    Rest(String),
    /// Optional group; absent as a whole when any of its content is absent
    Group(Vec<Part>),
}

/// A parameter declared by a route path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathParam {
    pub name: String,
    pub is_optional: bool,
    pub is_rest: bool,
}

/// Classification of a segment, ordered from most to least specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    /// Literal only: `users`, `data.json`
    Static,
    /// Literal glued to one or more params: `book-:id`, `:name-v:version`
    Mixed,
    /// A single required param: `:id`, `[id]`
    Param,
    /// The whole segment is an optional group: `{:id}`, `[[id]]`
    Optional,
    /// Contains a splat: `{...path}`, `*path`
    Rest,
}

/// One segment of a parsed route path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathToken {
    /// Segment as written in the source (`[id]`, `:name-v:version`)
    pub orig: String,
    /// Canonical pattern fragment, separator included (`/:id`, `{/:page}`)
    pub path: String,
    pub kind: SegmentKind,
    /// Whether the separator and the whole segment may be absent
    pub optional: bool,
    /// Params declared by this segment, in order of appearance
    pub params: Vec<PathParam>,
    /// Parsed content of the segment (without the optional wrapper)
    pub parts: Vec<Part>,
}

impl PathToken {
    /// The first param of this segment, if it declares any
    pub fn param(&self) -> Option<&PathParam> {
        self.params.first()
    }

    /// Whether this segment is plain literal text
    pub fn is_static(&self) -> bool {
        self.kind == SegmentKind::Static
    }
}

/// Output of [`tokenize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathTokens {
    pub tokens: Vec<PathToken>,
    /// Concatenation of every token's `path`; `/` for the root
    pub pattern: String,
}

impl PathTokens {
    /// All params of the path, in declaration order
    pub fn params(&self) -> Vec<PathParam> {
        self.tokens
            .iter()
            .flat_map(|token| token.params.iter().cloned())
            .collect()
    }
}

/// Parses a route path spec into tokens and a canonical matcher pattern.
///
/// # Errors
///
/// Unbalanced `{}`/`[]`, empty or invalid param names, malformed splat groups
/// and param names declared twice are reported with the raw path.
///
/// # Examples
///
/// ```
/// use waymark_router::{tokenize, SegmentKind};
///
/// let tokens = tokenize("api/:name-v:version").unwrap();
/// assert_eq!(tokens.pattern, "/api/:name-v:version");
/// assert_eq!(tokens.tokens[1].kind, SegmentKind::Mixed);
///
/// assert!(tokenize("api/{:broken").is_err());
/// ```
pub fn tokenize(spec: &str) -> Result<PathTokens> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for raw in lexer::split_segments(spec)? {
        let token = build_token(raw, spec)?;
        for param in &token.params {
            if !seen.insert(param.name.clone()) {
                return Err(RouterError::DuplicateParam {
                    path: spec.to_string(),
                    name: param.name.clone(),
                });
            }
        }
        tokens.push(token);
    }

    let pattern = render_pattern(&tokens);
    Ok(PathTokens { tokens, pattern })
}

/// Concatenates token fragments into a matcher pattern
pub fn render_pattern(tokens: &[PathToken]) -> String {
    let pattern: String = tokens.iter().map(|token| token.path.as_str()).collect();
    if pattern.is_empty() {
        "/".to_string()
    } else {
        pattern
    }
}

fn build_token(raw: &str, spec: &str) -> Result<PathToken> {
    let mut parts = lexer::parse_segment(raw, spec)?;

    // A segment that is a single group is optional as a whole, separator
    // included; a leading "/" inside such a group is the separator itself.
    let optional = matches!(parts.as_slice(), [Part::Group(_)]);
    if optional {
        if let Some(Part::Group(inner)) = parts.pop() {
            parts = strip_leading_separator(inner);
        }
    }

    let mut params = Vec::new();
    collect_params(&parts, optional, &mut params);

    let kind = classify(&parts, optional);
    let body = render_parts(&parts);
    let path = if optional {
        format!("{{/{}}}", body)
    } else {
        format!("/{}", body)
    };

    Ok(PathToken {
        orig: raw.to_string(),
        path,
        kind,
        optional,
        params,
        parts,
    })
}

fn strip_leading_separator(mut parts: Vec<Part>) -> Vec<Part> {
    if let Some(Part::Text(text)) = parts.first_mut() {
        if let Some(stripped) = text.strip_prefix('/') {
            if stripped.is_empty() {
                parts.remove(0);
            } else {
                *text = stripped.to_string();
            }
        }
    }
    parts
}

fn collect_params(parts: &[Part], optional: bool, out: &mut Vec<PathParam>) {
    for part in parts {
        match part {
            Part::Text(_) => {}
            Part::Param(name) => out.push(PathParam {
                name: name.clone(),
                is_optional: optional,
                is_rest: false,
            }),
            Part::Rest(name) => out.push(PathParam {
                name: name.clone(),
                is_optional: optional,
                is_rest: true,
            }),
            Part::Group(inner) => collect_params(inner, true, out),
        }
    }
}

fn contains_rest(parts: &[Part]) -> bool {
    parts.iter().any(|part| match part {
        Part::Rest(_) => true,
        Part::Group(inner) => contains_rest(inner),
        _ => false,
    })
}

fn classify(parts: &[Part], optional: bool) -> SegmentKind {
    if contains_rest(parts) {
        SegmentKind::Rest
    } else if optional {
        SegmentKind::Optional
    } else if parts.iter().all(|part| matches!(part, Part::Text(_))) {
        SegmentKind::Static
    } else if matches!(parts, [Part::Param(_)]) {
        SegmentKind::Param
    } else {
        SegmentKind::Mixed
    }
}

/// Renders parts back into canonical syntax (`:name`, `*name`, `{...}`)
pub(crate) fn render_parts(parts: &[Part]) -> String {
    render_into(parts, false)
}

fn render_into(parts: &[Part], in_group: bool) -> String {
    let mut out = String::new();
    let mut after_name = false;

    for (pos, part) in parts.iter().enumerate() {
        match part {
            Part::Text(text) => {
                for (idx, ch) in text.chars().enumerate() {
                    let glued = idx == 0 && after_name && is_ident_char(ch);
                    // A group may open with the separator it spans
                    let separator = in_group && pos == 0 && idx == 0 && ch == '/';
                    let special = matches!(ch, '\\' | ':' | '*' | '{' | '}' | '[' | ']' | '?' | '/');
                    if glued || (special && !separator) {
                        out.push('\\');
                    }
                    out.push(ch);
                }
                after_name = false;
            }
            Part::Param(name) => {
                out.push(':');
                out.push_str(name);
                after_name = true;
            }
            Part::Rest(name) => {
                out.push('*');
                out.push_str(name);
                after_name = true;
            }
            Part::Group(inner) => {
                out.push('{');
                out.push_str(&render_into(inner, true));
                out.push('}');
                after_name = false;
            }
        }
    }

    out
}
