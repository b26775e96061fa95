use alloc::sync::Arc;

use super::Modifiers;
use crate::evaluator::BindingError;
use crate::types::Type;
use crate::values::Value;

/// A named binding: declared type (if any), current value and modifiers.
///
/// A final variable accepts exactly one assignment. Declaring it with an
/// initializer counts as that assignment.
#[derive(Debug, Clone)]
pub struct Variable {
    name: Arc<str>,
    ty: Option<Type>,
    value: Value,
    modifiers: Modifiers,
    initialized: bool,
}

impl Variable {
    pub fn new(name: &str, ty: Option<Type>, value: Value, modifiers: Modifiers) -> Self {
        Self {
            name: Arc::from(name),
            ty,
            value,
            modifiers,
            initialized: true,
        }
    }

    /// A loosely typed variable, as created by assigning to an unbound name.
    pub fn untyped(name: &str, value: Value) -> Self {
        Self::new(name, None, value, Modifiers::empty())
    }

    /// A declared but not yet assigned variable. It holds its type's default.
    pub fn uninitialized(name: &str, ty: Option<Type>, modifiers: Modifiers) -> Self {
        let value = ty.as_ref().map(Type::default_value).unwrap_or(Value::Null);
        Self {
            name: Arc::from(name),
            ty,
            value,
            modifiers,
            initialized: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.is_final()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn check_writable(&self) -> Result<(), BindingError> {
        if self.is_final() && self.initialized {
            return Err(BindingError::FinalReassignment {
                name: self.name.to_string(),
            });
        }
        Ok(())
    }

    /// The same binding holding `value`, bypassing the final check.
    pub(crate) fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Store an already coerced value.
    pub fn assign(&mut self, value: Value) -> Result<(), BindingError> {
        self.check_writable()?;
        tracing::trace!(name = %self.name, "assign variable");
        self.value = value;
        self.initialized = true;
        Ok(())
    }
}
