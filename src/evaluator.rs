use crate::ast::{Function, Sequence, Value};
use crate::builtinops::{find_builtin_op, get_builtin_ops};
use crate::reader::read;
use crate::{Error, MAX_EVAL_DEPTH};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Name-to-value binding resolution.
///
/// The evaluator only ever looks names up; it never defines or assigns, so an
/// environment handed to [`eval`] is read-only for the whole evaluation.
/// A scope chain would implement this by falling through to a borrowed
/// parent on a miss.
pub trait Environment {
    /// `None` means the name is not bound here.
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// Flat global binding table, populated before evaluation starts.
#[derive(Debug, Clone, Default)]
pub struct GlobalEnv {
    bindings: HashMap<String, Value>,
}

impl GlobalEnv {
    pub fn new() -> Self {
        GlobalEnv {
            bindings: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Builder-style [`GlobalEnv::define`]
    #[must_use]
    pub fn with_binding(mut self, name: impl Into<String>, value: Value) -> Self {
        self.define(name, value);
        self
    }

    /// Register a native function under `name`.
    ///
    /// # Example
    /// ```
    /// use seqlisp::{Error, Value, create_global_env, eval_str};
    ///
    /// fn count(args: Vec<Value>) -> Result<Value, Error> {
    ///     Ok(Value::Number(args.len() as i64))
    /// }
    ///
    /// let mut env = create_global_env();
    /// env.register_builtin_function("count", count);
    /// let result = eval_str(&env, "(count 1 #t x)");
    /// assert_eq!(result.map(|v| v.to_string()), Ok("3".to_owned()));
    /// ```
    pub fn register_builtin_function<F>(&mut self, name: &str, func: F)
    where
        F: Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.define(name, Value::Function(Function::new(name, func)));
    }

    /// All bindings as (name, value) pairs sorted by name
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut result: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Environment for GlobalEnv {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for GlobalEnv {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        GlobalEnv {
            bindings: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// Create a global environment holding the builtins named in `names`.
/// Unknown names are skipped.
pub fn create_env_with_builtins(names: &[&str]) -> GlobalEnv {
    let env: GlobalEnv = names
        .iter()
        .filter_map(|name| find_builtin_op(name))
        .map(|op| (op.id, Value::Function(op.to_function())))
        .collect();
    debug!(bindings = env.len(), "created restricted environment");
    env
}

/// Create a global environment holding every builtin function
pub fn create_global_env() -> GlobalEnv {
    let env: GlobalEnv = get_builtin_ops()
        .iter()
        .map(|op| (op.id, Value::Function(op.to_function())))
        .collect();
    debug!(bindings = env.len(), "created global environment");
    env
}

/// Evaluate `form` under `env`.
pub fn eval<E: Environment + ?Sized>(env: &E, form: &Value) -> Result<Value, Error> {
    eval_with_depth_tracking(env, form, 0)
}

/// Read the first form of `input` and evaluate it.
pub fn eval_str<E: Environment + ?Sized>(env: &E, input: &str) -> Result<Value, Error> {
    let form = read(input)?;
    eval(env, &form)
}

fn eval_with_depth_tracking<E: Environment + ?Sized>(
    env: &E,
    form: &Value,
    depth: usize,
) -> Result<Value, Error> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(Error::DepthExceeded {
            max: MAX_EVAL_DEPTH,
        });
    }
    trace!(depth, %form, "eval");

    match form {
        // Self-evaluating forms
        Value::Number(_) | Value::Boolean(_) | Value::Function(_) => Ok(form.clone()),

        Value::Symbol(name) => env
            .lookup(name)
            .ok_or_else(|| Error::UnboundSymbol(name.clone())),

        // An empty form has no operator to take the first of.
        Value::Sequence(Sequence::Empty) => Err(Error::EmptyAccess { operation: "first" }),

        Value::Sequence(Sequence::Pair(head, operands)) => eval_list(env, head, operands, depth),
    }
}

/// Special forms are recognized only when the head is literally the symbol;
/// a compound head such as `(if #t + *)` is an ordinary operator expression.
fn eval_list<E: Environment + ?Sized>(
    env: &E,
    head: &Value,
    operands: &Sequence,
    depth: usize,
) -> Result<Value, Error> {
    if let Value::Symbol(name) = head {
        match name.as_str() {
            "if" => return eval_if(env, operands, depth),
            "quote" => return eval_quote(operands),
            _ => {}
        }
    }
    eval_application(env, head, operands, depth)
}

/// Destructure exactly `N` operands of a special form.
fn expect_operands<'a, const N: usize>(
    form: &'static str,
    operands: &'a Sequence,
) -> Result<[&'a Value; N], Error> {
    let items: Vec<&Value> = operands.iter().collect();
    let got = items.len();
    items.try_into().map_err(|_| Error::WrongArity {
        form,
        expected: N,
        got,
    })
}

/// Evaluate if special form. Only the chosen branch is evaluated.
fn eval_if<E: Environment + ?Sized>(
    env: &E,
    operands: &Sequence,
    depth: usize,
) -> Result<Value, Error> {
    let [condition, consequent, alternative] = expect_operands::<3>("if", operands)?;
    if eval_with_depth_tracking(env, condition, depth + 1)?.is_truthy() {
        eval_with_depth_tracking(env, consequent, depth + 1)
    } else {
        eval_with_depth_tracking(env, alternative, depth + 1)
    }
}

/// Evaluate quote special form
fn eval_quote(operands: &Sequence) -> Result<Value, Error> {
    let [quoted] = expect_operands::<1>("quote", operands)?;
    Ok(quoted.clone())
}

/// Evaluate the operator, then the operands left to right, then apply.
fn eval_application<E: Environment + ?Sized>(
    env: &E,
    operator: &Value,
    operands: &Sequence,
    depth: usize,
) -> Result<Value, Error> {
    let func = match eval_with_depth_tracking(env, operator, depth + 1)? {
        Value::Function(func) => func,
        other => return Err(Error::NotAFunction(other.to_string())),
    };

    let args = operands
        .iter()
        .map(|arg| eval_with_depth_tracking(env, arg, depth + 1))
        .collect::<Result<Vec<_>, _>>()?;

    trace!(function = func.name(), argc = args.len(), "apply");
    func.call(args)
}
