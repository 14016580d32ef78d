//! seqlisp - a minimal S-expression reader and evaluator
//!
//! This crate reads textual S-expressions into a [`Value`] tree and evaluates
//! that tree against an [`Environment`]. The same recursive data model serves
//! as both the parsed program and the runtime data: a list read from text is
//! a [`Sequence`], and `(quote ...)` hands that very structure back as a value.
//!
//! ```scheme
//! 42                  ; numbers evaluate to themselves
//! #t #f               ; so do booleans
//! (+ 1 2 3)           ; application of a builtin => 6
//! (if 0 1 2)          ; only #f is false => 1
//! (quote (1 2 3))     ; unevaluated data => (1 2 3)
//! ((if #f + *) 3 4)   ; the operator position is an ordinary expression => 12
//! ```
//!
//! ## Error tiers
//!
//! Reading can fail in ways a caller is expected to handle (for instance by
//! asking the user for more input), reported as [`ReadError`]. Evaluation
//! failures are misuse of the language: unbound symbols, applying a
//! non-function, wrong operand counts and so on. They abort the whole
//! evaluation and come back as [`Error`].
//!
//! ## Modules
//!
//! - `ast`: the value and sequence model, printing and structural equality
//! - `reader`: immutable-cursor recursive descent reader
//! - `evaluator`: environments and the tree-walking evaluator
//! - `builtinops`: the native numeric builtins
//!
//! ## Logging
//!
//! The crate logs through `tracing` and never installs a subscriber.
//! `RUST_LOG=seqlisp=trace` with a subscriber installed shows every evaluated
//! form.

/// Maximum list nesting accepted by the reader by default.
/// Deeper input fails with [`ReadErrorKind::TooDeeplyNested`] instead of
/// overflowing the stack.
pub const MAX_READ_DEPTH: usize = 256;

/// Maximum evaluator recursion depth.
/// Above the default read depth, and low enough to fail with
/// [`Error::DepthExceeded`] on a 2 MiB thread stack in a debug build. Trees
/// that are hand-built, or read with a raised [`ReadConfig::max_depth`],
/// can still reach it.
///
/// [`ReadConfig::max_depth`]: crate::reader::ReadConfig::max_depth
pub const MAX_EVAL_DEPTH: usize = 300;

/// Categorizes the different kinds of read failures.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReadErrorKind {
    /// Input ended before a complete form was read (including unclosed lists)
    UnexpectedEndOfInput,
    /// `#` not followed by `t` or `f`
    InvalidBooleanLiteral,
    /// `)` where a form was expected
    UnmatchedCloseParen,
    /// List nesting exceeded the configured maximum depth
    TooDeeplyNested,
}

/// A structured error describing why the reader rejected its input.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
#[error("{message} (at offset {offset})")]
pub struct ReadError {
    pub kind: ReadErrorKind,
    pub message: String,
    /// Byte offset into the input where the problem was detected
    pub offset: usize,
    /// Snippet of the input around `offset` (max 100 chars)
    pub context: Option<String>,
    /// The offending character, if there was one
    pub found: Option<String>,
}

impl ReadError {
    pub fn new(kind: ReadErrorKind, message: impl Into<String>, offset: usize) -> Self {
        ReadError {
            kind,
            message: message.into(),
            offset,
            context: None,
            found: None,
        }
    }

    /// Attach a context snippet taken from `input` around this error's offset.
    pub fn with_context(mut self, input: &str) -> Self {
        const MAX_CONTEXT: usize = 100;
        const LEADING: usize = 20;

        let mut start = self.offset.saturating_sub(LEADING).min(input.len());
        while !input.is_char_boundary(start) {
            start -= 1;
        }

        let snippet: String = input[start..].chars().take(MAX_CONTEXT).collect();

        let mut context = String::new();
        if start > 0 {
            context.push_str("[...]");
        }
        context.push_str(&snippet);
        if start + snippet.len() < input.len() {
            context.push_str("[...]");
        }

        self.context = Some(context.replace('\n', "\\n").replace('\r', ""));
        self
    }

    pub fn with_found(mut self, found: Option<char>) -> Self {
        self.found = found.map(String::from);
        self
    }

    /// Multi-line rendering including the found character and context.
    pub fn report(&self) -> String {
        let mut out = format!("ReadError: {self}");
        if let Some(found) = &self.found {
            out.push_str(&format!("\nFound: {found}"));
        }
        if let Some(context) = &self.context {
            out.push_str(&format!("\nContext: {context}"));
        }
        out
    }
}

/// Evaluation failures. Any of these aborts the whole `eval` call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),
    #[error("cannot apply non-function: {0}")]
    NotAFunction(String),
    #[error("wrong number of operands to {form}: expected {expected}, got {got}")]
    WrongArity {
        form: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    /// `first`/`rest` of an empty sequence. Evaluating `()` as a form is
    /// reported as `first` on its empty operator position.
    #[error("{operation} called on empty sequence")]
    EmptyAccess { operation: &'static str },
    #[error("functions cannot be compared")]
    IncomparableFunctions,
    #[error("evaluation depth limit exceeded (max: {max})")]
    DepthExceeded { max: usize },
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod reader;

pub use ast::{Function, Sequence, Value};
pub use evaluator::{
    Environment, GlobalEnv, create_env_with_builtins, create_global_env, eval, eval_str,
};
pub use reader::{Cursor, ReadConfig, read, read_form, read_with_config};
