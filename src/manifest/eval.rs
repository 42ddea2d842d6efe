//! Form reduction.
//!
//! A symbol evaluates to its binding. A list evaluates its head to a
//! callable, evaluates the remaining items left to right and applies the
//! callable to them. The special forms below see their arguments
//! unevaluated and cannot be shadowed by bindings.
//!
//! | form | shape |
//! |------|-------|
//! | `var`  | `(var name value)` |
//! | `set`  | `(set name value)` |
//! | `fn`   | `(fn (params...) body...)` |
//! | `func` | `(func name (params...) body...)` |
//! | `if`   | `(if cond then [else])` |
//! | `do`   | `(do body...)` |
//! | `and`  | `(and expr...)` |
//! | `or`   | `(or expr...)` |

use super::Env;
use super::scope::Scope;
use super::value::{Callable, Lambda, Value};
use crate::ast::Expr;
use crate::error::ManifestError;
use std::rc::Rc;

/// Deepest chain of nested form evaluations, including lambda calls.
pub(super) const MAX_DEPTH: usize = 200;

pub(super) fn eval(env: &mut Env, expr: &Expr, scope: &Scope) -> Result<Value, ManifestError> {
    match expr {
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Nil => Ok(Value::Nil),
        Expr::Symbol(name) => scope
            .get(name)
            .ok_or_else(|| ManifestError::UnboundSymbol(name.clone())),
        Expr::List(items) => {
            if env.depth >= MAX_DEPTH {
                return Err(ManifestError::TooDeep { limit: MAX_DEPTH });
            }
            env.depth += 1;
            let result = eval_form(env, items, scope);
            env.depth -= 1;
            result
        }
    }
}

/// Evaluate forms in order, returning the last value (`nil` if none).
pub(super) fn eval_body(
    env: &mut Env,
    body: &[Expr],
    scope: &Scope,
) -> Result<Value, ManifestError> {
    let mut last = Value::Nil;
    for expr in body {
        last = eval(env, expr, scope)?;
    }
    Ok(last)
}

pub(super) fn apply(
    env: &mut Env,
    callable: &Callable,
    args: Vec<Value>,
) -> Result<Value, ManifestError> {
    match callable {
        Callable::Builtin(builtin) => (builtin.func)(env, args),
        Callable::Lambda(lambda) => {
            if args.len() != lambda.params.len() {
                return Err(ManifestError::ArityMismatch {
                    form: callable.name().to_string(),
                    expected: lambda.params.len(),
                    actual: args.len(),
                });
            }
            let frame = lambda.scope.child();
            for (param, arg) in lambda.params.iter().zip(args) {
                frame.create(param, arg);
            }
            eval_body(env, &lambda.body, &frame)
        }
    }
}

fn eval_form(env: &mut Env, items: &[Expr], scope: &Scope) -> Result<Value, ManifestError> {
    let Some((head, args)) = items.split_first() else {
        return Ok(Value::Nil);
    };

    if let Some(special) = head.as_symbol().and_then(Special::from_name) {
        return special.eval(env, args, scope);
    }

    let callee = eval(env, head, scope)?;
    let Value::Callable(callable) = callee else {
        return Err(ManifestError::NotCallable(head.to_string()));
    };

    let values = args
        .iter()
        .map(|arg| eval(env, arg, scope))
        .collect::<Result<Vec<_>, _>>()?;
    apply(env, &callable, values)
}

#[derive(Debug, Clone, Copy)]
enum Special {
    Var,
    Set,
    Fn,
    Func,
    If,
    Do,
    And,
    Or,
}

impl Special {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "var" => Self::Var,
            "set" => Self::Set,
            "fn" => Self::Fn,
            "func" => Self::Func,
            "if" => Self::If,
            "do" => Self::Do,
            "and" => Self::And,
            "or" => Self::Or,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Set => "set",
            Self::Fn => "fn",
            Self::Func => "func",
            Self::If => "if",
            Self::Do => "do",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    fn invalid(self, reason: impl Into<String>) -> ManifestError {
        ManifestError::InvalidForm {
            form: self.name().to_string(),
            reason: reason.into(),
        }
    }

    fn eval(self, env: &mut Env, args: &[Expr], scope: &Scope) -> Result<Value, ManifestError> {
        match self {
            Self::Var | Self::Set => {
                let [target, value] = args else {
                    return Err(self.invalid("expected a name and a value"));
                };
                let name = target
                    .as_symbol()
                    .ok_or_else(|| self.invalid(format!("'{}' is not a name", target)))?;
                let value = eval(env, value, scope)?;
                if matches!(self, Self::Var) {
                    scope.create(name, value);
                } else {
                    scope.set(name, value)?;
                }
                Ok(Value::Nil)
            }
            Self::Fn => {
                let (params, body) = args
                    .split_first()
                    .ok_or_else(|| self.invalid("expected a parameter list"))?;
                let lambda = self.lambda(None, params, body, scope)?;
                Ok(Value::Callable(lambda))
            }
            Self::Func => {
                let [name, params, body @ ..] = args else {
                    return Err(self.invalid("expected a name and a parameter list"));
                };
                let name = name
                    .as_symbol()
                    .ok_or_else(|| self.invalid(format!("'{}' is not a name", name)))?;
                let lambda = self.lambda(Some(name), params, body, scope)?;
                scope.create(name, Value::Callable(lambda.clone()));
                Ok(Value::Callable(lambda))
            }
            Self::If => {
                let (cond, then, otherwise) = match args {
                    [cond, then] => (cond, then, None),
                    [cond, then, otherwise] => (cond, then, Some(otherwise)),
                    _ => return Err(self.invalid("expected a condition and one or two branches")),
                };
                if eval(env, cond, scope)?.is_truthy() {
                    eval(env, then, scope)
                } else {
                    match otherwise {
                        Some(expr) => eval(env, expr, scope),
                        None => Ok(Value::Nil),
                    }
                }
            }
            Self::Do => eval_body(env, args, scope),
            Self::And => {
                let mut last = Value::Bool(true);
                for expr in args {
                    last = eval(env, expr, scope)?;
                    if !last.is_truthy() {
                        break;
                    }
                }
                Ok(last)
            }
            Self::Or => {
                let mut last = Value::Bool(false);
                for expr in args {
                    last = eval(env, expr, scope)?;
                    if last.is_truthy() {
                        break;
                    }
                }
                Ok(last)
            }
        }
    }

    fn lambda(
        self,
        name: Option<&str>,
        params: &Expr,
        body: &[Expr],
        scope: &Scope,
    ) -> Result<Callable, ManifestError> {
        let params = params
            .as_list()
            .ok_or_else(|| self.invalid(format!("parameter list expected, got '{}'", params)))?
            .iter()
            .map(|p| {
                p.as_symbol()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(format!("'{}' is not a parameter name", p)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Callable::Lambda(Rc::new(Lambda {
            name: name.map(str::to_string),
            params,
            body: body.to_vec(),
            scope: scope.clone(),
        })))
    }
}
