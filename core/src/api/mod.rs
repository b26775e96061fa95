//! Public API for embedding the Jolt interpreter.
//!
//! A host builds an [`Interpreter`], registering its classes, functions and
//! constants through an [`EnvironmentBuilder`], then evaluates syntax trees
//! produced by a parser (or assembled with [`crate::ast::build`]).
//!
//! # Example
//!
//! ```
//! use jolt_core::api::{Interpreter, InterpreterOptions};
//! use jolt_core::ast::build::*;
//! use jolt_core::types::Type;
//! use jolt_core::values::{NativeFunction, Value};
//!
//! let interpreter = Interpreter::new(InterpreterOptions::default(), |env| {
//!     env.function(NativeFunction::new("square", &[Type::int()], Type::int(), |args| {
//!         let n = args[0].as_int().unwrap_or(0);
//!         Ok(Value::int(n * n))
//!     }));
//! });
//!
//! let script = program(vec![
//!     decl(Type::int(), "x", Some(call("square", vec![int(7)]))),
//!     expr(ident("x")),
//! ]);
//! assert_eq!(interpreter.eval(&script).unwrap().as_int(), Some(49));
//! ```

pub mod environment;
pub mod interpreter;
pub mod options;

pub use environment::EnvironmentBuilder;
pub use interpreter::{Interpreter, Session};
pub use options::{ExecutionOptions, InterpreterOptions};
