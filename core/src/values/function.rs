//! Host functions callable by name from scripts.

use alloc::sync::Arc;
use core::fmt;

use super::Value;
use crate::evaluator::EvalError;
use crate::resolver::Signature;
use crate::types::Type;

/// Body of a native function. Arguments arrive already coerced to the
/// declared parameter types.
pub type NativeBody = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// A host function registered into a scope, e.g. through
/// [`EnvironmentBuilder::function`](crate::api::EnvironmentBuilder::function).
///
/// Native functions overload by name with script methods declared in the
/// same scope and go through the same resolution.
pub struct NativeFunction {
    signature: Signature,
    return_type: Type,
    func: NativeBody,
}

impl NativeFunction {
    pub fn new<F>(name: &str, params: &[Type], return_type: Type, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self {
            signature: Signature::typed(name, params).with_static(true),
            return_type,
            func: Arc::new(func),
        }
    }

    /// Mark the last parameter as varargs. It must be an array type.
    pub fn varargs(mut self) -> Self {
        self.signature.varargs = true;
        self
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native {} -> {}", self.signature, self.return_type)
    }
}
