//! Reference payloads carried by `Value::Object`.

use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::{FunctionalObject, Lambda, Primitive, Value};
use crate::evaluator::{BindingError, EvalError};
use crate::scope::{ScopeRef, Variable};
use crate::types::{ClassDef, Type};
use crate::Vec;

/// Heap objects. Every variant is cheap to clone and safe to share across
/// threads.
#[derive(Clone)]
pub enum Object {
    Str(Arc<str>),
    /// A wrapper (`Integer`, `Double`, ...) around a primitive.
    Boxed(Primitive),
    Array(Arc<Array>),
    /// A lambda or method reference not yet bound to an interface.
    Lambda(Arc<Lambda>),
    /// A lambda converted to a functional interface.
    Functional(Arc<FunctionalObject>),
    Instance(Arc<Instance>),
    /// A class used as a value, e.g. the target of a static call.
    Class(Arc<ClassDef>),
    /// A scripted object: a scope viewed as an object (`this`, `super`).
    This(ScopeRef),
}

impl Object {
    pub fn runtime_type(&self) -> Option<Type> {
        match self {
            Object::Str(_) => Some(Type::string()),
            Object::Boxed(p) => Some(Type::class(p.kind().box_class())),
            Object::Array(array) => Some(Type::array_of(array.element_type().clone())),
            Object::Lambda(_) => None,
            Object::Functional(f) => Some(Type::Class(f.interface().name_arc())),
            Object::Instance(instance) => Some(Type::Class(instance.class().name_arc())),
            Object::Class(_) => Some(Type::class("Class")),
            Object::This(_) => Some(Type::object()),
        }
    }

    /// Identity comparison; strings compare by content.
    pub fn same(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Boxed(a), Object::Boxed(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => Arc::ptr_eq(a, b),
            (Object::Lambda(a), Object::Lambda(b)) => a.same(b),
            (Object::Functional(a), Object::Functional(b)) => a.same(b),
            (Object::Instance(a), Object::Instance(b)) => Arc::ptr_eq(a, b),
            (Object::Class(a), Object::Class(b)) => Arc::ptr_eq(a, b),
            (Object::This(a), Object::This(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Str(s) => write!(f, "{}", s),
            Object::Boxed(p) => write!(f, "{}", p),
            Object::Array(array) => {
                write!(f, "[")?;
                for (i, element) in array.to_vec().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Object::Lambda(lambda) => write!(f, "{}", lambda),
            Object::Functional(functional) => write!(f, "{}", functional),
            Object::Instance(instance) => write!(f, "{}", instance),
            Object::Class(class) => write!(f, "class {}", class.name()),
            Object::This(scope) => write!(f, "'this' reference to scope {}", scope.name()),
        }
    }
}

/// A fixed-length array. Elements are coerced to the element type on store.
pub struct Array {
    element_type: Type,
    elements: RwLock<Vec<Value>>,
}

impl Array {
    pub fn new(element_type: Type, elements: Vec<Value>) -> Self {
        Self {
            element_type,
            elements: RwLock::new(elements),
        }
    }

    /// An array of `len` default values of `element_type`.
    pub fn with_len(element_type: Type, len: usize) -> Self {
        let elements = (0..len).map(|_| element_type.default_value()).collect();
        Self::new(element_type, elements)
    }

    pub fn element_type(&self) -> &Type {
        &self.element_type
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.read().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.elements.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Read-modify-write of one element under a single lock.
    pub fn update<F>(&self, index: usize, f: F) -> Option<Result<Value, EvalError>>
    where
        F: FnOnce(&Value) -> Result<Value, EvalError>,
    {
        let mut elements = self.elements.write();
        let slot = elements.get_mut(index)?;
        Some(f(slot).map(|value| {
            *slot = value.clone();
            value
        }))
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.elements.read().clone()
    }
}

/// An instance of a host-registered class.
pub struct Instance {
    class: Arc<ClassDef>,
    fields: RwLock<HashMap<Arc<str>, Variable>>,
    native: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
}

impl Instance {
    pub fn new(class: Arc<ClassDef>, fields: Vec<Variable>) -> Self {
        let fields = fields
            .into_iter()
            .map(|var| (Arc::from(var.name()), var))
            .collect();
        Self {
            class,
            fields: RwLock::new(fields),
            native: RwLock::new(None),
        }
    }

    pub fn class(&self) -> &Arc<ClassDef> {
        &self.class
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).map(|var| var.value().clone())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.read().contains_key(name)
    }

    /// A snapshot of the binding behind a field.
    pub fn field_variable(&self, name: &str) -> Option<Variable> {
        self.fields.read().get(name).cloned()
    }

    /// Assign a field, computing the stored value under the field lock.
    ///
    /// Returns `None` when the instance has no such field.
    pub fn update_field<F>(&self, name: &str, f: F) -> Option<Result<Value, EvalError>>
    where
        F: FnOnce(&Variable) -> Result<Value, EvalError>,
    {
        let mut fields = self.fields.write();
        let var = fields.get_mut(name)?;
        let result = var
            .check_writable()
            .map_err(EvalError::from)
            .and_then(|()| f(var))
            .and_then(|value| {
                var.assign(value.clone())
                    .map(|()| value)
                    .map_err(EvalError::from)
            });
        Some(result)
    }

    /// Store a field value as-is, used by native constructors.
    pub fn set_field(&self, name: &str, value: Value) -> Result<(), BindingError> {
        let mut fields = self.fields.write();
        match fields.get_mut(name) {
            Some(var) => var.assign(value),
            None => {
                fields.insert(Arc::from(name), Variable::untyped(name, value));
                Ok(())
            }
        }
    }

    /// Attach host state to this instance.
    pub fn set_native(&self, state: Arc<dyn Any + Send + Sync>) {
        *self.native.write() = Some(state);
    }

    pub fn native<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let state = self.native.read().clone()?;
        state.downcast::<T>().ok()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field("message") {
            Some(Value::Object(Object::Str(message))) => {
                write!(f, "{}: {}", self.class.name(), message)
            }
            Some(Value::Null) => write!(f, "{}", self.class.name()),
            _ => write!(f, "{}@{:x}", self.class.name(), self as *const Self as usize),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self)
    }
}
