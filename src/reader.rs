//! Recursive descent reader over an immutable [`Cursor`].
//!
//! Every parse step takes a cursor by value and returns the value it read
//! together with the cursor just past it. Nothing is mutated in place and no
//! step ever backs up, so each sub-parse hands its end position to the caller,
//! which threads it onward.
//!
//! Grammar:
//! - `#t` / `#f` booleans
//! - `( form* )` sequences
//! - any other maximal run of characters that are neither whitespace nor
//!   parentheses: a base-10 `i64` if it parses as one, otherwise a symbol
//!   (so `1-2` and `99999999999999999999` are symbols)
//!
//! Only the first form of the input is read; whatever follows is left for the
//! caller.

use tracing::debug;

use crate::ast::{NumberType, Sequence, Value};
use crate::{MAX_READ_DEPTH, ReadError, ReadErrorKind};

/// Reader options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConfig {
    /// Treat `;` as the start of a comment running to end of line
    pub handle_comments: bool,
    /// Maximum list nesting depth
    pub max_depth: usize,
}

impl Default for ReadConfig {
    fn default() -> Self {
        ReadConfig {
            handle_comments: false,
            max_depth: MAX_READ_DEPTH,
        }
    }
}

/// An immutable read position: the source text and a byte offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Cursor { text, offset: 0 }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of this position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Unconsumed input from this position on
    pub fn remaining(&self) -> &'a str {
        &self.text[self.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.text.len()
    }

    pub fn current(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// The position one character further on. At end of input the same
    /// position is returned.
    #[must_use]
    pub fn advance(self) -> Self {
        match self.current() {
            Some(c) => Cursor {
                offset: self.offset + c.len_utf8(),
                ..self
            },
            None => self,
        }
    }

    #[must_use]
    pub fn skip_while(self, pred: impl Fn(char) -> bool) -> Self {
        let skipped: usize = self
            .remaining()
            .chars()
            .take_while(|&c| pred(c))
            .map(char::len_utf8)
            .sum();
        Cursor {
            offset: self.offset + skipped,
            ..self
        }
    }

    #[must_use]
    pub fn skip_whitespace(self) -> Self {
        self.skip_while(char::is_whitespace)
    }

    /// Text between this position and a later position over the same input.
    pub fn slice_to(&self, end: Cursor<'a>) -> &'a str {
        debug_assert!(std::ptr::eq(self.text, end.text));
        &self.text[self.offset..end.offset]
    }
}

/// Read the first form of `input` with the default configuration.
pub fn read(input: &str) -> Result<Value, ReadError> {
    read_with_config(input, &ReadConfig::default())
}

/// Read the first form of `input`. Trailing input is ignored.
pub fn read_with_config(input: &str, config: &ReadConfig) -> Result<Value, ReadError> {
    match read_form(Cursor::new(input), config) {
        Ok((value, _)) => Ok(value),
        Err(e) => {
            debug!(kind = ?e.kind, offset = e.offset, "read failed");
            Err(e)
        }
    }
}

/// Read one form starting at `cursor`, returning it with the position just
/// past it.
pub fn read_form<'a>(
    cursor: Cursor<'a>,
    config: &ReadConfig,
) -> Result<(Value, Cursor<'a>), ReadError> {
    read_value(cursor, config, 0)
}

fn read_value<'a>(
    cursor: Cursor<'a>,
    config: &ReadConfig,
    depth: usize,
) -> Result<(Value, Cursor<'a>), ReadError> {
    let cursor = skip_atmosphere(cursor, config);

    match cursor.current() {
        None => Err(end_of_input(cursor)),
        Some('#') => read_boolean(cursor.advance()),
        Some('(') => read_sequence(cursor.advance(), config, depth + 1),
        Some(')') => Err(error_at(
            ReadErrorKind::UnmatchedCloseParen,
            "unexpected `)`",
            cursor,
            Some(')'),
        )),
        Some(_) => Ok(read_atom(cursor, config)),
    }
}

/// `cursor` is just past the `#`.
fn read_boolean(cursor: Cursor<'_>) -> Result<(Value, Cursor<'_>), ReadError> {
    match cursor.current() {
        Some('t') => Ok((Value::Boolean(true), cursor.advance())),
        Some('f') => Ok((Value::Boolean(false), cursor.advance())),
        found => Err(error_at(
            ReadErrorKind::InvalidBooleanLiteral,
            "expected `t` or `f` after `#`",
            cursor,
            found,
        )),
    }
}

/// `cursor` is just past the `(`.
fn read_sequence<'a>(
    cursor: Cursor<'a>,
    config: &ReadConfig,
    depth: usize,
) -> Result<(Value, Cursor<'a>), ReadError> {
    if depth > config.max_depth {
        return Err(error_at(
            ReadErrorKind::TooDeeplyNested,
            format!("expression too deeply nested (max depth: {})", config.max_depth),
            cursor,
            None,
        ));
    }

    // Elements are read front to back and linked into pairs once the closing
    // paren is found, so long lists cost no stack.
    let mut items = Vec::new();
    let mut position = cursor;
    loop {
        let next = skip_atmosphere(position, config);
        match next.current() {
            None => return Err(end_of_input(next)),
            Some(')') => {
                let seq: Sequence = items.into_iter().collect();
                return Ok((Value::Sequence(seq), next.advance()));
            }
            Some(_) => {
                let (item, after) = read_value(next, config, depth)?;
                items.push(item);
                position = after;
            }
        }
    }
}

fn read_atom<'a>(start: Cursor<'a>, config: &ReadConfig) -> (Value, Cursor<'a>) {
    let end = start.skip_while(|c| {
        !c.is_whitespace() && c != '(' && c != ')' && !(config.handle_comments && c == ';')
    });
    let token = start.slice_to(end);

    let value = match token.parse::<NumberType>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Symbol(token.to_owned()),
    };
    (value, end)
}

/// Skip whitespace and, when enabled, `;` comments.
fn skip_atmosphere<'a>(cursor: Cursor<'a>, config: &ReadConfig) -> Cursor<'a> {
    let mut cursor = cursor.skip_whitespace();
    while config.handle_comments && cursor.current() == Some(';') {
        cursor = cursor.skip_while(|c| c != '\n').skip_whitespace();
    }
    cursor
}

fn end_of_input(cursor: Cursor<'_>) -> ReadError {
    error_at(
        ReadErrorKind::UnexpectedEndOfInput,
        "unexpected end of input",
        cursor,
        None,
    )
}

fn error_at(
    kind: ReadErrorKind,
    message: impl Into<String>,
    cursor: Cursor<'_>,
    found: Option<char>,
) -> ReadError {
    ReadError::new(kind, message, cursor.offset())
        .with_context(cursor.text())
        .with_found(found)
}
