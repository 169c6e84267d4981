/// Lexer for route path specs
///
/// A small state machine that reads one path segment at a time and folds
/// every supported dialect (`:id`, `{:id}`, `{...rest}`, `:rest*`, `*rest`,
/// `:id?`, `[id]`, `[[id]]`, `[...rest]`, `[[...rest]]`) into the single
/// [`Part`] representation. Optional groups nest through an explicit stack,
/// so no recursion is involved.
use std::iter::Peekable;
use std::str::CharIndices;

use super::Part;
use crate::error::{Result, RouterError};

/// Splits a path spec into raw segments on top-level `/` separators.
///
/// Separators inside `{}` or `[]` do not split, which keeps `users{/:id}`
/// together. Empty segments (leading, trailing or doubled slashes) are dropped.
pub(crate) fn split_segments(spec: &str) -> Result<Vec<&str>> {
    let mut segments = Vec::new();
    let mut braces = 0usize;
    let mut brackets = 0usize;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in spec.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match ch {
            '\\' => escaped = true,
            '{' => braces += 1,
            '}' => {
                braces = braces
                    .checked_sub(1)
                    .ok_or_else(|| unbalanced(spec, '}'))?;
            }
            '[' => brackets += 1,
            ']' => {
                brackets = brackets
                    .checked_sub(1)
                    .ok_or_else(|| unbalanced(spec, ']'))?;
            }
            '/' if braces == 0 && brackets == 0 => {
                if idx > start {
                    segments.push(&spec[start..idx]);
                }
                start = idx + 1;
            }
            _ => {}
        }
    }

    if braces > 0 {
        return Err(unbalanced(spec, '{'));
    }
    if brackets > 0 {
        return Err(unbalanced(spec, '['));
    }

    if start < spec.len() {
        segments.push(&spec[start..]);
    }

    Ok(segments)
}

/// Parses a single raw segment into parts.
///
/// `spec` is the full path and only used for error reporting.
pub(crate) fn parse_segment(segment: &str, spec: &str) -> Result<Vec<Part>> {
    SegmentLexer::new(segment, spec).run()
}

/// Checks whether a character may appear in a parameter name
pub(crate) fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn unbalanced(spec: &str, delimiter: char) -> RouterError {
    RouterError::Unbalanced {
        path: spec.to_string(),
        delimiter,
    }
}

struct SegmentLexer<'a> {
    spec: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Open groups; the bottom frame is the segment itself
    stack: Vec<Vec<Part>>,
    text: String,
}

impl<'a> SegmentLexer<'a> {
    fn new(segment: &'a str, spec: &'a str) -> Self {
        Self {
            spec,
            chars: segment.char_indices().peekable(),
            stack: vec![Vec::new()],
            text: String::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Part>> {
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '\\' => match self.chars.next() {
                    Some((_, escaped)) => self.text.push(escaped),
                    None => self.text.push('\\'),
                },
                '{' => self.open_group()?,
                '}' => self.close_group()?,
                '[' => self.bracket_param()?,
                ']' => return Err(unbalanced(self.spec, ']')),
                ':' => self.colon_param()?,
                '*' => {
                    self.flush_text();
                    let name = self.read_ident()?;
                    self.push(Part::Rest(name));
                }
                _ => self.text.push(ch),
            }
        }

        self.flush_text();

        match self.stack.len() {
            1 => Ok(self.stack.pop().unwrap_or_default()),
            _ => Err(unbalanced(self.spec, '{')),
        }
    }

    fn push(&mut self, part: Part) {
        if let Some(frame) = self.stack.last_mut() {
            frame.push(part);
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.push(Part::Text(text));
        }
    }

    /// `{` starts either a splat group (`{...name}`) or a nested optional group
    fn open_group(&mut self) -> Result<()> {
        self.flush_text();

        if self.eat_ellipsis() {
            let name = self.read_ident()?;
            match self.chars.next() {
                Some((_, '}')) => {
                    self.push(Part::Group(vec![Part::Rest(name)]));
                    Ok(())
                }
                _ => Err(RouterError::MalformedSplat {
                    path: self.spec.to_string(),
                }),
            }
        } else {
            self.stack.push(Vec::new());
            Ok(())
        }
    }

    fn close_group(&mut self) -> Result<()> {
        self.flush_text();

        if self.stack.len() < 2 {
            return Err(unbalanced(self.spec, '}'));
        }

        let inner = self.stack.pop().unwrap_or_default();
        if !inner.is_empty() {
            self.push(Part::Group(inner));
        }
        Ok(())
    }

    /// `:name`, `:name?` (optional) or `:name*` (splat)
    fn colon_param(&mut self) -> Result<()> {
        self.flush_text();
        let name = self.read_ident()?;

        let part = match self.chars.peek() {
            Some((_, '*')) => {
                self.chars.next();
                Part::Group(vec![Part::Rest(name)])
            }
            Some((_, '?')) => {
                self.chars.next();
                Part::Group(vec![Part::Param(name)])
            }
            _ => Part::Param(name),
        };

        self.push(part);
        Ok(())
    }

    /// `[id]`, `[id?]`, `[[id]]`, `[...rest]` and `[[...rest]]`
    fn bracket_param(&mut self) -> Result<()> {
        self.flush_text();

        let double = matches!(self.chars.peek(), Some((_, '[')));
        if double {
            self.chars.next();
        }

        let mut inner = String::new();
        loop {
            match self.chars.next() {
                Some((_, ']')) => break,
                Some((_, ch)) => inner.push(ch),
                None => return Err(unbalanced(self.spec, '[')),
            }
        }
        if double && !matches!(self.chars.next(), Some((_, ']'))) {
            return Err(unbalanced(self.spec, '['));
        }

        let (inner, question) = match inner.strip_suffix('?') {
            Some(stripped) => (stripped.to_string(), true),
            None => (inner, false),
        };

        let part = match inner.strip_prefix("...") {
            Some(name) => Part::Group(vec![Part::Rest(self.check_ident(name)?)]),
            None if double || question => Part::Group(vec![Part::Param(self.check_ident(&inner)?)]),
            None => Part::Param(self.check_ident(&inner)?),
        };

        self.push(part);
        Ok(())
    }

    fn eat_ellipsis(&mut self) -> bool {
        let mut lookahead = self.chars.clone();
        let is_ellipsis = (0..3).all(|_| matches!(lookahead.next(), Some((_, '.'))));
        if is_ellipsis {
            self.chars = lookahead;
        }
        is_ellipsis
    }

    fn read_ident(&mut self) -> Result<String> {
        let mut name = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if !is_ident_char(ch) {
                break;
            }
            name.push(ch);
            self.chars.next();
        }

        if name.is_empty() {
            return Err(RouterError::EmptyParamName {
                path: self.spec.to_string(),
            });
        }
        Ok(name)
    }

    fn check_ident(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(RouterError::EmptyParamName {
                path: self.spec.to_string(),
            });
        }
        if !name.chars().all(is_ident_char) {
            return Err(RouterError::InvalidParamName {
                path: self.spec.to_string(),
                name: name.to_string(),
            });
        }
        Ok(name.to_string())
    }
}
