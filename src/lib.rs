//! Jolt - an embeddable interpreter core for Java-flavoured scripts
//!
//! # Overview
//!
//! Jolt evaluates loosely typed scripts against a host's classes. It covers
//! the runtime half of a scripting language: value coercion, overload
//! resolution, scopes and closures, lambdas and method references, and a
//! security gate the host can use to veto reflective operations.
//!
//! Parsing is left to the host. Scripts arrive as syntax trees, built by a
//! parser or assembled by hand with [`ast::build`].
//!
//! # Quick Start
//!
//! ```
//! use jolt::{Interpreter, InterpreterOptions, Value};
//! use jolt::ast::{BinaryOp, build::*};
//! use jolt::types::Type;
//!
//! let interpreter = Interpreter::new(InterpreterOptions::default(), |env| {
//!     env.register("limit", Value::int(3));
//! });
//!
//! // int total = 0; for (int i = 0; i < limit; i++) total += i; total
//! let script = program(vec![
//!     decl(Type::int(), "total", Some(int(0))),
//!     for_(
//!         vec![decl(Type::int(), "i", Some(int(0)))],
//!         Some(binary(BinaryOp::Lt, ident("i"), ident("limit"))),
//!         vec![post_inc(ident("i"))],
//!         expr(assign_op(BinaryOp::Add, ident("total"), ident("i"))),
//!     ),
//!     expr(ident("total")),
//! ]);
//! assert_eq!(interpreter.eval(&script).unwrap(), Value::int(3));
//! ```
//!
//! # Host classes
//!
//! Classes registered through the [`EnvironmentBuilder`] are visible to
//! scripts by simple name. Their methods take part in overload resolution
//! like any built-in class:
//!
//! ```
//! use jolt::{Interpreter, InterpreterOptions, Value};
//! use jolt::ast::build::*;
//! use jolt::types::{ClassBuilder, Type};
//!
//! let interpreter = Interpreter::new(InterpreterOptions::default(), |env| {
//!     env.class(
//!         ClassBuilder::class("Greeter")
//!             .static_method("greet", &[Type::string()], Type::string(), |_, args| {
//!                 Ok(Value::string(&format!("hello {}", args[0])))
//!             })
//!             .build(),
//!     );
//! });
//!
//! let script = program(vec![expr(method(ident("Greeter"), "greet", vec![string("jolt")]))]);
//! assert_eq!(interpreter.eval(&script).unwrap(), Value::string("hello jolt"));
//! ```

mod error_renderer;

pub use error_renderer::{render_error, render_error_to, render_error_to_string, render_error_to_string_no_color};

// Re-export public API from jolt_core
pub use jolt_core::api::{EnvironmentBuilder, ExecutionOptions, Interpreter, InterpreterOptions, Session};

// Re-export commonly used modules and types
pub use jolt_core::evaluator::{EvalError, InterruptHandle};
pub use jolt_core::security::{SecurityError, SecurityPolicy};
pub use jolt_core::types::{self, ClassBuilder, Type};
pub use jolt_core::values::{self, NativeFunction, Value};
pub use jolt_core::{ast, casting, evaluator, resolver, scope, security};
