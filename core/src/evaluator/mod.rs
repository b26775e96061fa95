//! Tree-walking evaluator.
//!
//! The evaluator walks the syntax tree produced by an external parser,
//! binding names through the active [`NameSpace`](crate::scope::NameSpace),
//! converting values through [`casting`](crate::casting) at every
//! assignment, argument and return, and dispatching calls through
//! [`resolver`](crate::resolver).
//!
//! ## Design Principles
//!
//! - **Never panic**: malformed trees and hostile scripts produce errors.
//! - **Stack-safe**: call depth is bounded by `ExecutionOptions::max_depth`.
//! - **Interruptible**: the host can abort a running evaluation through an
//!   [`InterruptHandle`].
//!
//! ## Example
//!
//! ```ignore
//! use jolt_core::ast::build::*;
//! use jolt_core::evaluator::{Evaluator, Runtime};
//! use jolt_core::scope::NameSpace;
//! use jolt_core::scope_stack::CallStack;
//!
//! let runtime = Arc::new(Runtime::default());
//! let mut stack = CallStack::new(NameSpace::new_root("global"));
//! let value = Evaluator::new(runtime, &mut stack).evaluate(&expr(int(1)))?;
//! ```

mod error;
mod eval;
mod operators;
mod runtime;


pub use error::{
    BindingError, CoercionError, EvalError, InternalError, ResolutionError, ResourceExceeded,
};
pub use eval::{Evaluator, Flow};
pub use runtime::{InterruptHandle, Runtime};
