//! Core of the Jolt scripting interpreter: values and coercion, overload
//! resolution, scopes and closures, lambdas and the security gate.

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, string::String, string::ToString, vec, vec::Vec};

pub mod api;
pub mod ast;
pub mod casting;
pub mod evaluator;
pub mod resolver;
pub mod scope;
pub mod scope_stack;
pub mod security;
pub mod types;
pub mod values;

pub use api::{EnvironmentBuilder, ExecutionOptions, Interpreter, InterpreterOptions, Session};
pub use evaluator::EvalError;
