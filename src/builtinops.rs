//! Built-in native functions.
//!
//! Builtins are ordinary [`Value::Function`]s bound in the global environment,
//! so they can be passed around and selected at runtime like any other value:
//!
//! ```scheme
//! (+ 1 2 3)           ; => 6
//! (*)                 ; => 1
//! ((if #t + *) 3 4)   ; => 7
//! ```
//!
//! ## Adding New Operations
//!
//! 1. **Implement the function** with the signature `fn(Vec<Value>) -> Result<Value, Error>`
//! 2. **Add it to `BUILTIN_OPS`** under the name it is bound to
//! 3. **Add tests** covering the empty-argument case and type errors

use crate::Error;
use crate::ast::{Function, NumberType, Value};

/// Signature shared by every builtin implementation
pub type BuiltinFn = fn(Vec<Value>) -> Result<Value, Error>;

/// Definition of a built-in operation
#[derive(Debug, Clone, Copy)]
pub struct BuiltinOp {
    /// The name the operation is bound to in the global environment
    pub id: &'static str,
    pub func: BuiltinFn,
}

impl BuiltinOp {
    /// Wrap this operation as a callable value
    pub fn to_function(&self) -> Function {
        Function::new(self.id, self.func)
    }
}

/// View every argument as a number, failing on the first one that isn't.
fn numbers(args: &[Value]) -> impl Iterator<Item = Result<NumberType, Error>> + '_ {
    args.iter().map(NumberType::try_from)
}

// Both folds wrap on overflow rather than failing.

fn builtin_add(args: Vec<Value>) -> Result<Value, Error> {
    let sum = numbers(&args).try_fold(0, |sum: NumberType, n| n.map(|n| sum.wrapping_add(n)))?;
    Ok(Value::Number(sum))
}

fn builtin_mul(args: Vec<Value>) -> Result<Value, Error> {
    let product =
        numbers(&args).try_fold(1, |product: NumberType, n| n.map(|n| product.wrapping_mul(n)))?;
    Ok(Value::Number(product))
}

/// Global registry of all built-in operations.
static BUILTIN_OPS: &[BuiltinOp] = &[
    BuiltinOp {
        id: "+",
        func: builtin_add,
    },
    BuiltinOp {
        id: "*",
        func: builtin_mul,
    },
];

pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS
}

pub fn find_builtin_op(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_OPS.iter().find(|op| op.id == id)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{nil, sym, val};
    use pretty_assertions::assert_eq;

    fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value, Error> {
        find_builtin_op(name)
            .unwrap_or_else(|| panic!("builtin {name} not registered"))
            .to_function()
            .call(args)
    }

    fn mismatch(found: &str) -> Error {
        Error::TypeMismatch {
            expected: "number",
            found: found.to_owned(),
        }
    }

    #[test]
    fn test_builtin_ops_registry() {
        let ids: Vec<&str> = get_builtin_ops().iter().map(|op| op.id).collect();
        assert_eq!(ids, vec!["+", "*"]);

        assert_eq!(find_builtin_op("+").unwrap().id, "+");
        assert_eq!(find_builtin_op("*").unwrap().to_function().name(), "*");
        assert!(find_builtin_op("-").is_none());
    }

    #[test]
    fn test_builtin_function_implementations() {
        let test_cases: Vec<(&str, Vec<Value>, Result<NumberType, Error>)> = vec![
            ("+", vec![], Ok(0)),
            ("+", vec![val(42)], Ok(42)),
            ("+", vec![val(1), val(2), val(3)], Ok(6)),
            ("+", vec![val(-5), val(10)], Ok(5)),
            ("+", vec![val(i64::MAX), val(1)], Ok(i64::MIN)),
            ("*", vec![], Ok(1)),
            ("*", vec![val(7)], Ok(7)),
            ("*", vec![val(3), val(4)], Ok(12)),
            ("*", vec![val(0), val(100)], Ok(0)),
            ("*", vec![val(-2), val(3)], Ok(-6)),
            ("*", vec![val(i64::MAX), val(2)], Ok(-2)),
            ("+", vec![val(1), val(true)], Err(mismatch("#t"))),
            ("+", vec![sym("x"), val(1)], Err(mismatch("x"))),
            ("*", vec![val(2), nil()], Err(mismatch("()"))),
            ("*", vec![val([1, 2])], Err(mismatch("(1 2)"))),
            // The first offending argument is reported
            ("+", vec![sym("a"), sym("b")], Err(mismatch("a"))),
        ];

        for (i, (name, args, expected)) in test_cases.into_iter().enumerate() {
            let actual = call_builtin(name, args).map(|v| match v {
                Value::Number(n) => n,
                other => panic!("case #{}: non-number result {other}", i + 1),
            });
            assert_eq!(actual, expected, "case #{}", i + 1);
        }
    }

    #[test]
    fn test_builtin_type_error_names_function_values() {
        let plus = val(find_builtin_op("+").unwrap().to_function());
        assert_eq!(
            call_builtin("*", vec![val(1), plus]).unwrap_err(),
            mismatch("#<function:+>")
        );
    }
}
