//! Environment builder for registering host classes and globals.

use alloc::sync::Arc;

use crate::scope::{MethodEntry, NameSpace, ScopeRef, Variable};
use crate::types::{ClassDef, ClassRegistry};
use crate::values::{NativeFunction, Value};
use crate::Vec;

/// Builder for the global environment of an [`Interpreter`](super::Interpreter).
///
/// Classes land in the interpreter's registry; constants and functions are
/// bound in its global scope, visible to every session.
///
/// # Example
///
/// ```
/// use jolt_core::api::{Interpreter, InterpreterOptions};
/// use jolt_core::types::{ClassBuilder, Type};
/// use jolt_core::values::{NativeFunction, Value};
///
/// let interpreter = Interpreter::new(InterpreterOptions::default(), |env| {
///     env.register("answer", Value::int(42));
///     env.function(NativeFunction::new("twice", &[Type::int()], Type::int(), |args| {
///         Ok(Value::int(args[0].as_int().unwrap_or(0) * 2))
///     }));
///     env.class(ClassBuilder::class("Point").field("x", Type::int()).build());
/// });
/// assert_eq!(interpreter.get("answer").and_then(|v| v.as_int()), Some(42));
/// ```
pub struct EnvironmentBuilder<'a> {
    registry: &'a ClassRegistry,
    globals: Vec<Variable>,
    functions: Vec<NativeFunction>,
}

impl<'a> EnvironmentBuilder<'a> {
    pub(crate) fn new(registry: &'a ClassRegistry) -> Self {
        Self {
            registry,
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Register a global value, bound untyped in the global scope.
    pub fn register(&mut self, name: &str, value: Value) {
        self.globals.push(Variable::untyped(name, value));
    }

    /// Register a native function callable by name from scripts. Functions
    /// sharing a name form an overload set.
    pub fn function(&mut self, function: NativeFunction) {
        self.functions.push(function);
    }

    /// Register a host class. A class with the same simple name replaces
    /// the existing one.
    pub fn class(&mut self, class: ClassDef) -> Arc<ClassDef> {
        self.registry.register(class)
    }

    /// Bind everything registered into a fresh global scope.
    pub(crate) fn build(self, name: &str) -> ScopeRef {
        let global = NameSpace::new_root(name);
        for var in self.globals {
            // A fresh scope has no final bindings to collide with.
            let _ = global.declare_local(var);
        }
        for function in self.functions {
            global.declare_method(MethodEntry::Native(Arc::new(function)));
        }
        global
    }
}
