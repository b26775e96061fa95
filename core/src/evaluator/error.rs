//! Runtime evaluation errors.
//!
//! # Error Categories
//!
//! - **Coercion**, **Resolution**, **Binding** and **Security** errors are
//!   user-triggerable failures. They carry the offending names, types and
//!   signatures in their messages and always propagate to the host.
//!
//! - **Thrown** values are script-level exceptions. They are the only errors
//!   a script `try/catch` can intercept.
//!
//! - **Internal** errors are broken invariants inside the interpreter. They
//!   are never caught or converted into one of the kinds above.
//!
//! - **Interrupted** and **ResourceExceeded** abort the current evaluation.

use alloc::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::String;
use crate::security::SecurityError;
use crate::values::Value;

/// Any failure produced while evaluating a script.
#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error(transparent)]
    #[diagnostic(code(jolt::coercion))]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    #[diagnostic(code(jolt::resolution))]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    #[diagnostic(code(jolt::binding))]
    Binding(#[from] BindingError),

    #[error(transparent)]
    #[diagnostic(code(jolt::security))]
    Security(#[from] SecurityError),

    #[error(transparent)]
    #[diagnostic(
        code(jolt::internal),
        help("this is an interpreter defect, please report it")
    )]
    Internal(#[from] InternalError),

    /// A script exception that escaped every `catch`.
    #[error("Uncaught exception: {0}")]
    #[diagnostic(code(jolt::thrown))]
    Thrown(Value),

    /// An exception raised by host code, materialized into a `Thrown` value
    /// of the named class when it crosses back into the evaluator.
    #[error("{class}: {message}")]
    #[diagnostic(code(jolt::thrown))]
    HostException { class: Arc<str>, message: String },

    #[error("Evaluation interrupted")]
    #[diagnostic(code(jolt::interrupted))]
    Interrupted,

    #[error(transparent)]
    #[diagnostic(code(jolt::resource))]
    ResourceExceeded(#[from] ResourceExceeded),
}

impl EvalError {
    /// Raise an exception of a registered class from host code.
    pub fn raise(class: &str, message: impl Into<String>) -> Self {
        EvalError::HostException {
            class: Arc::from(class),
            message: message.into(),
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, EvalError::Internal(_))
    }

    /// Whether a script `catch` clause may intercept this error.
    pub fn is_catchable(&self) -> bool {
        matches!(self, EvalError::Thrown(_) | EvalError::HostException { .. })
    }

    pub fn thrown_value(&self) -> Option<&Value> {
        match self {
            EvalError::Thrown(value) => Some(value),
            _ => None,
        }
    }
}

/// A cast or assignment that is not type-compatible.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("Cannot cast void value to {target}")]
    VoidCast { target: String },

    #[error("Cannot assign void value to {target}")]
    VoidAssign { target: String },

    #[error("Cannot cast {from} to {target}")]
    IncompatibleCast { from: String, target: String },

    #[error("Cannot assign {from} to {target}")]
    IncompatibleAssign { from: String, target: String },

    #[error("Cannot cast string \"{value}\" to {target}")]
    NumberFormat { value: String, target: String },

    #[error("Cannot cast array element {index} of type {from} to {target}")]
    ArrayElement {
        index: usize,
        from: String,
        target: String,
    },

    #[error("Cannot convert null to {target}")]
    NullToPrimitive { target: String },

    #[error("Operator '{op}' cannot be applied to {operand}")]
    BadOperand { op: String, operand: String },

    #[error("Undefined value used as operand of '{op}'")]
    VoidOperand { op: String },

    #[error("Condition must be boolean, found {found}")]
    NotBoolean { found: String },
}

/// No usable target for a name, call or member access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    #[error("No applicable signature for {name}({args})")]
    NoMatch { name: String, args: String },

    #[error("Ambiguous call to {name}({args}), candidates: {candidates}")]
    Ambiguous {
        name: String,
        args: String,
        candidates: String,
    },

    #[error("Cannot reach instance member {signature} from static context")]
    StaticContext { signature: String },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Undefined method: {name}")]
    UndefinedMethod { name: String },

    #[error("Unknown class: {name}")]
    UnknownClass { name: String },

    #[error("No such field {name} in {class}")]
    NoSuchField { class: String, name: String },

    #[error("Attempt to access {name} on undefined value")]
    VoidTarget { name: String },

    #[error("Cannot instantiate abstract type {class}")]
    AbstractInstantiation { class: String },

    #[error("Cannot index into {found}")]
    NotIndexable { found: String },
}

/// A binding that cannot be made or changed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("Cannot re-assign final variable {name}")]
    FinalReassignment { name: String },

    #[error("Cannot re-assign variable {name} captured by a lambda")]
    CapturedReassignment { name: String },

    #[error("Wrong number of arguments to {callee}: expected {expected}, found {found}")]
    WrongArgumentCount {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("Cannot convert {from} to {to}: {reason}")]
    CannotConvert {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Method reference {name} must be the last operation in its expression")]
    MethodRefNotTerminal { name: String },

    #[error("Cannot re-declare final variable {name}")]
    FinalRedeclaration { name: String },

    #[error("{name} is not callable")]
    NotCallable { name: String },

    #[error("Invalid assignment target")]
    InvalidTarget,
}

/// An interpreter invariant was violated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InternalError {
    #[error("Attempt to read the payload of a void value")]
    VoidPayload,

    #[error("Call stack is empty")]
    EmptyCallStack,

    #[error("The scope captured by {lambda} no longer exists")]
    ScopeDropped { lambda: String },

    #[error("Builtin class {name} is not registered")]
    MissingBuiltin { name: String },

    #[error("Invalid syntax tree: {reason}")]
    InvalidAst { reason: String },

    #[error("Native method {method} received an unexpected {found}")]
    BadNativeArgument { method: String, found: String },
}

/// Resource limit exceeded. Never catchable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceExceeded {
    #[error("Evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },
}
