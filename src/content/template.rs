//! Event templates and tribute rendering.
//!
//! A template's text fields are format strings with positional tribute
//! placeholders: `{}` takes the next tribute, `{N}` takes tribute `N`
//! (zero-based, in draw order). `{{` and `}}` produce literal braces.

use std::fmt::{self, Write};

use serde::Serialize;

use super::ContentError;

/// One piece of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Tribute(usize),
}

/// Splits a format string into literals and tribute slots.
fn parse_format(text: &str) -> Result<Vec<Segment>, ContentError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut next_auto = 0usize;
    let mut chars = text.chars().peekable();

    let bad = |reason: &str| ContentError::Placeholder {
        text: text.to_string(),
        reason: reason.to_string(),
    };

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '{' => {
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => inner.push(ch),
                        None => return Err(bad("unclosed '{'")),
                    }
                }
                let index = if inner.is_empty() {
                    next_auto += 1;
                    next_auto - 1
                } else {
                    inner
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| bad("placeholder must be empty or a tribute index"))?
                };
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Tribute(index));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(bad("single '}' outside a placeholder")),
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Writes parsed segments with `tributes` substituted. Slots past the end
/// of `tributes` are written back verbatim.
fn fill<T: fmt::Display>(segments: &[Segment], tributes: &[T]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(s) => out.push_str(s),
            Segment::Tribute(i) => match tributes.get(*i) {
                Some(t) => {
                    let _ = write!(out, "{}", t);
                }
                None => {
                    let _ = write!(out, "{{{}}}", i);
                }
            },
        }
    }
    out
}

/// Substitutes `tributes` into a format string.
///
/// Slots that point past the end of `tributes` are written back verbatim.
pub fn render<T: fmt::Display>(text: &str, tributes: &[T]) -> Result<String, ContentError> {
    Ok(fill(&parse_format(text)?, tributes))
}

/// A narrative event waiting to be filled with tributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTemplate {
    required_tributes: usize,
    lethal: bool,
    text_fields: Vec<String>,
    #[serde(skip)]
    parsed: Vec<Vec<Segment>>,
}

impl EventTemplate {
    /// Builds a template, checking that every placeholder refers to one of
    /// the `required_tributes` tributes.
    pub fn new(
        required_tributes: usize,
        lethal: bool,
        text_fields: Vec<String>,
    ) -> Result<Self, ContentError> {
        let mut parsed = Vec::with_capacity(text_fields.len());
        for text in &text_fields {
            let segments = parse_format(text)?;
            for segment in &segments {
                if let Segment::Tribute(index) = *segment {
                    if index >= required_tributes {
                        return Err(ContentError::TributeOutOfRange {
                            text: text.clone(),
                            index,
                            tributes: required_tributes,
                        });
                    }
                }
            }
            parsed.push(segments);
        }
        Ok(EventTemplate {
            required_tributes,
            lethal,
            text_fields,
            parsed,
        })
    }

    pub fn required_tributes(&self) -> usize {
        self.required_tributes
    }

    pub fn is_lethal(&self) -> bool {
        self.lethal
    }

    pub fn text_fields(&self) -> &[String] {
        &self.text_fields
    }

    /// Renders every text field with `tributes` in draw order.
    pub fn render<T: fmt::Display>(&self, tributes: &[T]) -> Vec<String> {
        self.parsed.iter().map(|segments| fill(segments, tributes)).collect()
    }
}
