#![allow(dead_code, unused_imports, unused_macros)]

pub use jolt::ast::build::*;
pub use jolt::ast::{BinaryOp, LambdaBody, Stmt};
pub use jolt::evaluator::{BindingError, CoercionError, ResolutionError};
pub use jolt::scope::Modifiers;
pub use jolt::values::{Object, Primitive};
pub use jolt::{EvalError, Interpreter, InterpreterOptions, Type, Value};

pub fn interpreter() -> Interpreter {
    Interpreter::new(InterpreterOptions::default(), |_| {})
}

pub fn run(statements: Vec<Stmt>) -> Result<Value, EvalError> {
    interpreter().eval(&program(statements))
}

pub fn times(left: jolt::ast::Expr, right: jolt::ast::Expr) -> jolt::ast::Expr {
    binary(BinaryOp::Mul, left, right)
}

/// `for (i = 0; i < n; i++) body` with `i` declared implicitly.
pub fn count_loop(n: i32, body: Stmt) -> Stmt {
    for_(
        vec![expr(set("i", int(0)))],
        Some(binary(BinaryOp::Lt, ident("i"), int(n))),
        vec![post_inc(ident("i"))],
        body,
    )
}

/// Runs a script and compares its value, or matches its error.
///
/// ```ignore
/// test_case!(
///     name,
///     program: [expr(int(1))],
///     value: Value::int(1),
/// );
/// test_case!(
///     name,
///     program: [decl(Type::int(), "x", Some(null()))],
///     error: EvalError::Coercion(CoercionError::NullToPrimitive { .. }),
/// );
/// ```
macro_rules! test_case {
    ($name:ident, program: [$($stmt:expr),* $(,)?], value: $expected:expr $(,)?) => {
        #[test]
        fn $name() {
            let result = run(vec![$($stmt),*]);
            match result {
                Ok(value) => assert_eq!(value, $expected),
                Err(err) => panic!("script failed: {err}"),
            }
        }
    };
    ($name:ident, program: [$($stmt:expr),* $(,)?], error: $pattern:pat $(if $guard:expr)? $(,)?) => {
        #[test]
        fn $name() {
            let result = run(vec![$($stmt),*]);
            match result {
                Err(err) => assert!(matches!(err, $pattern $(if $guard)?), "unexpected error: {err:?}"),
                Ok(value) => panic!("expected an error, got {value}"),
            }
        }
    };
}
