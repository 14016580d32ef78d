//! This module defines the value model shared by the reader and the evaluator.
//! [`Value`] is the universal datum: numbers, booleans, symbols, sequences and
//! functions. [`Sequence`] is the immutable singly-linked list that serves as
//! both program structure and runtime list data, so `(quote (1 2))` returns
//! exactly what the reader built.
//!
//! Printing is provided through [`std::fmt::Display`] and produces text the
//! reader accepts again (functions excepted, they have no literal syntax).
//! Structural equality is [`Value::equal`] rather than `PartialEq`, because
//! comparing two functions is a misuse that must be reported, not answered.
//!
//! Ergonomic helpers [`val`], [`sym`], [`nil`] and [`list`] build trees in code
//! and tests.

use crate::Error;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

/// Type alias for number values in the interpreter
pub type NumberType = i64;

/// Canonical erased signature of a native function.
///
/// Builtins receive ownership of their evaluated arguments, in order.
pub type OperationFn = dyn Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync;

/// An opaque callable value. Only native functions exist in this interpreter.
#[derive(Clone)]
pub struct Function {
    name: String,
    // Arc so that looking a builtin up in an environment is a cheap clone.
    op: Arc<OperationFn>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, op: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Function {
            name: name.into(),
            op: Arc::new(op),
        }
    }

    /// Name used for printing and diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value, Error> {
        (self.op)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

/// Core datum type of the interpreter
#[derive(Clone, Debug)]
pub enum Value {
    /// Fixed-width signed integers
    Number(NumberType),
    /// `#t` / `#f`; `#f` is the only false value
    Boolean(bool),
    /// Identifiers, compared by name
    Symbol(String),
    /// Lists, both as program forms and as data
    Sequence(Sequence),
    /// Native functions
    Function(Function),
}

/// Immutable singly-linked list terminated by [`Sequence::Empty`].
///
/// Cloning, dropping, printing and comparing walk the tail iteratively, so
/// only nesting depth (not length) costs stack.
pub enum Sequence {
    Empty,
    Pair(Box<Value>, Box<Sequence>),
}

impl Sequence {
    pub fn cons(head: Value, tail: Sequence) -> Self {
        Sequence::Pair(Box::new(head), Box::new(tail))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Sequence::Empty)
    }

    /// Head of a pair. Callers are expected to check [`Sequence::is_empty`].
    pub fn first(&self) -> Result<&Value, Error> {
        match self {
            Sequence::Empty => Err(Error::EmptyAccess { operation: "first" }),
            Sequence::Pair(head, _) => Ok(&**head),
        }
    }

    /// Tail of a pair. Callers are expected to check [`Sequence::is_empty`].
    pub fn rest(&self) -> Result<&Sequence, Error> {
        match self {
            Sequence::Empty => Err(Error::EmptyAccess { operation: "rest" }),
            Sequence::Pair(_, tail) => Ok(&**tail),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter { current: self }
    }

    /// Structural equality: both empty, or pairwise equal heads and equal tails.
    ///
    /// Heads are compared front to back and the walk stops at the first
    /// difference, so a function pair behind a mismatch is never reached.
    pub fn equal(&self, other: &Sequence) -> Result<bool, Error> {
        let (mut left, mut right) = (self, other);
        loop {
            match (left, right) {
                (Sequence::Empty, Sequence::Empty) => return Ok(true),
                (Sequence::Pair(a, a_tail), Sequence::Pair(b, b_tail)) => {
                    if !a.equal(b)? {
                        return Ok(false);
                    }
                    left = &**a_tail;
                    right = &**b_tail;
                }
                _ => return Ok(false),
            }
        }
    }
}

impl Clone for Sequence {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl Drop for Sequence {
    fn drop(&mut self) {
        // Unlink the tail chain one pair at a time instead of recursing.
        let mut rest = match self {
            Sequence::Empty => return,
            Sequence::Pair(_, tail) => std::mem::replace(&mut **tail, Sequence::Empty),
        };
        while let Sequence::Pair(_, tail) = &mut rest {
            let next = std::mem::replace(&mut **tail, Sequence::Empty);
            rest = next;
        }
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Empty => write!(f, "Empty"),
            Sequence::Pair(..) => f.debug_list().entries(self.iter()).finish(),
        }
    }
}

impl FromIterator<Value> for Sequence {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let items: Vec<Value> = iter.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(Sequence::Empty, |tail, head| Sequence::cons(head, tail))
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over the heads of a [`Sequence`].
#[derive(Clone)]
pub struct Iter<'a> {
    current: &'a Sequence,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        match self.current {
            Sequence::Empty => None,
            Sequence::Pair(head, tail) => {
                self.current = &**tail;
                Some(&**head)
            }
        }
    }
}

impl FusedIterator for Iter<'_> {}

impl Value {
    /// Structural equality over every variant.
    ///
    /// Different variants are never equal. Two functions cannot be compared
    /// at all and yield [`Error::IncomparableFunctions`].
    pub fn equal(&self, other: &Value) -> Result<bool, Error> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(a == b),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
            (Value::Symbol(a), Value::Symbol(b)) => Ok(a == b),
            (Value::Sequence(a), Value::Sequence(b)) => a.equal(b),
            (Value::Function(_), Value::Function(_)) => Err(Error::IncomparableFunctions),
            _ => Ok(false),
        }
    }

    /// Everything except `#f` is true, including `0` and `()`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    /// Check if a value represents nil (empty sequence)
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Sequence(Sequence::Empty))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Sequence(seq) => write!(f, "{seq}"),
            Value::Function(func) => write!(f, "#<function:{}>", func.name()),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, elem) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{elem}")?;
        }
        write!(f, ")")
    }
}

// From trait implementations for Value - enables .into() conversion
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(seq)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Number(NumberType::from(n))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::Sequence(arr.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&Value> for NumberType {
    type Error = Error;

    fn try_from(value: &Value) -> Result<NumberType, Error> {
        match value {
            Value::Number(n) => Ok(*n),
            other => Err(Error::TypeMismatch {
                expected: "number",
                found: other.to_string(),
            }),
        }
    }
}

/// Helper for creating symbols, handy in mixed lists
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper for creating values from anything convertible
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// The empty sequence as a value
pub fn nil() -> Value {
    Value::Sequence(Sequence::Empty)
}

/// Build a sequence value from already-converted elements
pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
    Value::Sequence(items.into_iter().collect())
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plus() -> Value {
        val(Function::new("+", |_| Ok(Value::Number(0))))
    }

    #[test]
    fn test_helper_functions_data_driven() {
        let test_cases = vec![
            (val(42), "42"),
            (val(-17), "-17"),
            (val(NumberType::MAX), "9223372036854775807"),
            (val(NumberType::MIN), "-9223372036854775808"),
            (val(255u8), "255"),
            (val(true), "#t"),
            (val(false), "#f"),
            (sym("foo-bar?"), "foo-bar?"),
            (sym(String::from("1-2")), "1-2"),
            (nil(), "()"),
            (val([1, 2, 3]), "(1 2 3)"),
            (val(vec![sym("+"), val(1), nil()]), "(+ 1 ())"),
            (list([val([1]), val([val([2])])]), "((1) ((2)))"),
            (plus(), "#<function:+>"),
        ];

        for (i, (value, printed)) in test_cases.iter().enumerate() {
            assert_eq!(value.to_string(), *printed, "case #{}", i + 1);
        }
    }

    #[test]
    fn test_structural_equality() {
        let equal_cases = vec![
            (val(1), val(1), true),
            (val(1), val(2), false),
            (val(true), val(true), true),
            (val(true), val(false), false),
            (sym("a"), sym("a"), true),
            (sym("a"), sym("b"), false),
            (nil(), nil(), true),
            (val([1, 2, 3]), val([1, 2, 3]), true),
            (val([1, 2, 3]), val([1, 2]), false),
            (val([1, 2]), val([1, 2, 3]), false),
            (val(vec![val(1), nil()]), val(vec![val(1), nil()]), true),
            // Cross-variant comparisons are never equal
            (val(0), val(false), false),
            (nil(), val(false), false),
            (sym("1"), val(1), false),
            (plus(), val(1), false),
            (val(1), plus(), false),
            // Mismatch found before the functions are reached
            (val(vec![val(1), plus()]), val(vec![val(2), plus()]), false),
        ];

        for (i, (a, b, expected)) in equal_cases.iter().enumerate() {
            assert_eq!(a.equal(b).unwrap(), *expected, "case #{}: {a} vs {b}", i + 1);
        }
    }

    #[test]
    fn test_functions_are_incomparable() {
        assert_eq!(plus().equal(&plus()), Err(Error::IncomparableFunctions));
        assert_eq!(
            val(vec![val(1), plus()]).equal(&val(vec![val(1), plus()])),
            Err(Error::IncomparableFunctions)
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(val(true).is_truthy());
        assert!(!val(false).is_truthy());
        assert!(val(0).is_truthy());
        assert!(nil().is_truthy());
        assert!(sym("false").is_truthy());
        assert!(plus().is_truthy());
    }

    #[test]
    fn test_empty_sequence_access() {
        let empty = Sequence::Empty;
        assert!(empty.is_empty());
        assert_eq!(
            empty.first().unwrap_err(),
            Error::EmptyAccess { operation: "first" }
        );
        assert_eq!(
            empty.rest().unwrap_err(),
            Error::EmptyAccess { operation: "rest" }
        );

        let seq = Sequence::cons(val(1), Sequence::cons(val(2), Sequence::Empty));
        assert_eq!(seq.first().unwrap().to_string(), "1");
        assert_eq!(seq.rest().unwrap().to_string(), "(2)");
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_number_conversion() {
        assert_eq!(NumberType::try_from(&val(7)).unwrap(), 7);
        assert_eq!(
            NumberType::try_from(&sym("x")),
            Err(Error::TypeMismatch {
                expected: "number",
                found: "x".to_owned(),
            })
        );
    }

    #[test]
    fn test_long_sequences_do_not_recurse_on_length() {
        let long: Sequence = (0..200_000).map(Value::Number).collect();
        let copy = long.clone();
        assert!(long.equal(&copy).unwrap());
        assert_eq!(copy.len(), 200_000);
        assert!(long.to_string().ends_with("199999)"));
        drop(long);
        drop(copy);
    }
}
