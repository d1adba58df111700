// Path expressions
//
// A path is the chain of steps from a root value to one of its leaves,
// rendered as an access expression such as `[0]['a'].weights`.

use std::fmt;
use std::str::FromStr;

use crate::internal::error::{Error, Result};
use crate::value::{Key, Step};

/// A chain of steps from the root of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Creates a path from its steps, root first.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Returns the steps, root first.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns true for the path of the root itself.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Appends a step.
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    /// Parses `[index]`, `['text']`, `[-3]`, `[true]` and `.attribute` segments.
    fn from_str(s: &str) -> Result<Self> {
        let mut steps = Vec::new();
        let mut rest = s;

        while let Some(c) = rest.chars().next() {
            match c {
                '[' => {
                    let (step, tail) = parse_bracket(&rest[1..], s)?;
                    steps.push(step);
                    rest = tail;
                }
                '.' => {
                    let body = &rest[1..];
                    let end = body.find(|c: char| c == '.' || c == '[').unwrap_or(body.len());
                    let name = &body[..end];
                    if name.is_empty() {
                        return Err(Error::PathError(format!("Empty attribute name in path {:?}", s)));
                    }
                    steps.push(Step::Attr(name.to_string()));
                    rest = &body[end..];
                }
                other => {
                    return Err(Error::PathError(format!(
                        "Unexpected character {:?} in path {:?}",
                        other, s
                    )))
                }
            }
        }
        Ok(Path { steps })
    }
}

/// Parses the inside of a bracket segment; `body` starts just after `[`.
fn parse_bracket<'a>(body: &'a str, whole: &str) -> Result<(Step, &'a str)> {
    if let Some(quoted) = body.strip_prefix('\'') {
        return parse_quoted_key(quoted, whole);
    }

    let end = body
        .find(']')
        .ok_or_else(|| Error::PathError(format!("Unterminated index in path {:?}", whole)))?;
    let inner = &body[..end];
    let step = match inner {
        "true" => Step::Key(Key::Bool(true)),
        "false" => Step::Key(Key::Bool(false)),
        _ => match inner.parse::<usize>() {
            Ok(i) => Step::Index(i),
            Err(_) => match inner.parse::<i64>() {
                Ok(i) => Step::Key(Key::Int(i)),
                Err(_) => {
                    return Err(Error::PathError(format!(
                        "Invalid index {:?} in path {:?}",
                        inner, whole
                    )))
                }
            },
        },
    };
    Ok((step, &body[end + 1..]))
}

/// Parses a quoted text key; `quoted` starts just after the opening quote.
/// A backslash escapes the next character.
fn parse_quoted_key<'a>(quoted: &'a str, whole: &str) -> Result<(Step, &'a str)> {
    let mut key = String::new();
    let mut chars = quoted.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => key.push(escaped),
                None => break,
            },
            '\'' => {
                return match quoted[i + 1..].strip_prefix(']') {
                    Some(tail) => Ok((Step::Key(Key::Str(key)), tail)),
                    None => Err(Error::PathError(format!(
                        "Expected ']' after quoted key in path {:?}",
                        whole
                    ))),
                };
            }
            other => key.push(other),
        }
    }
    Err(Error::PathError(format!("Unterminated key in path {:?}", whole)))
}
