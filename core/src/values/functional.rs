//! A lambda bound to a functional interface.

use alloc::sync::Arc;
use core::fmt;

use super::{Lambda, Value};
use crate::casting::coerce_assign;
use crate::evaluator::{BindingError, EvalError};
use crate::types::{ClassDef, HostMethod, Type};
use crate::{ToString, Vec};

/// Result of converting a [`Lambda`] to a functional interface type.
///
/// Calls go through the interface's single abstract method: arguments are
/// coerced to its parameter types and the lambda's result to its return type.
#[derive(Clone)]
pub struct FunctionalObject {
    interface: Arc<ClassDef>,
    method: HostMethod,
    lambda: Arc<Lambda>,
    identity: Arc<()>,
}

impl FunctionalObject {
    pub(crate) fn new(interface: Arc<ClassDef>, method: HostMethod, lambda: Arc<Lambda>) -> Self {
        Self {
            interface,
            method,
            lambda,
            identity: Arc::new(()),
        }
    }

    /// Whether `other` is a copy of this object.
    pub fn same(&self, other: &FunctionalObject) -> bool {
        Arc::ptr_eq(&self.identity, &other.identity)
    }

    /// A copy whose lambda does not keep its captured scope alive.
    pub fn held_weakly(&self) -> Self {
        Self {
            lambda: Arc::new(self.lambda.held_weakly()),
            ..self.clone()
        }
    }

    /// A copy whose lambda keeps its captured scope alive, or `None` if the
    /// scope is gone.
    pub fn held_strongly(&self) -> Option<Self> {
        Some(Self {
            lambda: Arc::new(self.lambda.held_strongly()?),
            ..self.clone()
        })
    }

    pub fn interface(&self) -> &Arc<ClassDef> {
        &self.interface
    }

    pub fn method(&self) -> &HostMethod {
        &self.method
    }

    pub fn method_name(&self) -> &str {
        self.method.name()
    }

    pub fn lambda(&self) -> &Arc<Lambda> {
        &self.lambda
    }

    /// Call the interface method from host code.
    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, EvalError> {
        for arg in &args {
            arg.payload()?;
        }
        self.invoke_with(args, |lambda, args| lambda.invoke(args))
    }

    /// Call the interface method, running the lambda through `call`. The
    /// evaluator uses this to keep nested calls on its own stack.
    pub fn invoke_with<F>(&self, args: Vec<Value>, call: F) -> Result<Value, EvalError>
    where
        F: FnOnce(&Lambda, Vec<Value>) -> Result<Value, EvalError>,
    {
        let params = &self.method.signature.params;
        if args.len() != params.len() {
            return Err(BindingError::WrongArgumentCount {
                callee: self.method.signature.to_string(),
                expected: params.len(),
                found: args.len(),
            }
            .into());
        }

        let registry = &self.lambda.runtime().registry;
        let args = args
            .into_iter()
            .zip(params)
            .map(|(arg, param)| match param {
                Some(ty) => coerce_assign(registry, arg, ty),
                None => Ok(arg),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let result = call(&self.lambda, args)?;
        match (&self.method.return_type, result) {
            (Type::Void, _) => Ok(Value::Void),
            (ty, Value::Void) if ty.is_reference() => Ok(Value::Null),
            (ty, value) => coerce_assign(registry, value, ty),
        }
    }
}

impl fmt::Display for FunctionalObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as {}", self.lambda, self.interface.name())
    }
}

impl fmt::Debug for FunctionalObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionalObject({})", self)
    }
}
