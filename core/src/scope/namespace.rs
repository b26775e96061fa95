//! Lexical scopes.
//!
//! A [`NameSpace`] holds variable and method bindings and a link to its
//! parent. Scopes form a tree whose edges only point upward: children keep
//! their parents alive through an [`Arc`] and parents never see their
//! children. A lambda stored in a scope it captures is kept there in its
//! weakly held form (see [`Lambda::held_weakly`](crate::values::Lambda::held_weakly)),
//! so a scope never owns itself through its own variables.
//!
//! Tables live behind a single `parking_lot::RwLock` per scope. Every
//! read-modify-write of a binding runs under one write lock
//! ([`NameSpace::update_variable`]); the lock is never held while the
//! evaluator descends into sub-expressions.

use alloc::sync::Arc;
use core::fmt;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::Variable;
use crate::ast::MethodDecl;
use crate::evaluator::{BindingError, EvalError};
use crate::resolver::Signature;
use crate::types::{ClassDef, Type};
use crate::values::{Instance, NativeFunction, Object, Value};
use crate::{String, ToString, Vec};

pub type ScopeRef = Arc<NameSpace>;

#[derive(Clone)]
pub enum ScopeKind {
    Global,
    /// Body of a script method invocation.
    Method,
    Block,
    /// Init clause of a `for` statement. Its bindings are read-only from
    /// lambdas created inside the loop.
    ForInit,
    /// Parameters of one lambda invocation.
    Lambda,
    /// Static members of a class, as materialized by a class generator.
    ClassStatic(Arc<ClassDef>),
    /// Instance members of an object of a class.
    ClassInstance(Arc<Instance>),
}

impl ScopeKind {
    fn label(&self) -> &'static str {
        match self {
            ScopeKind::Global => "global",
            ScopeKind::Method => "method",
            ScopeKind::Block => "block",
            ScopeKind::ForInit => "for-init",
            ScopeKind::Lambda => "lambda",
            ScopeKind::ClassStatic(_) => "class-static",
            ScopeKind::ClassInstance(_) => "class-instance",
        }
    }
}

/// A method bound in a scope: declared by a script or registered by the host.
#[derive(Clone)]
pub enum MethodEntry {
    Script(Arc<MethodDecl>),
    Native(Arc<NativeFunction>),
}

impl MethodEntry {
    pub fn name(&self) -> &str {
        match self {
            MethodEntry::Script(decl) => &decl.name,
            MethodEntry::Native(native) => &native.signature().name,
        }
    }

    pub fn signature(&self) -> Signature {
        match self {
            MethodEntry::Script(decl) => {
                let params = decl.params.iter().map(|p| p.binding_type()).collect();
                let varargs = decl.params.last().is_some_and(|p| p.varargs);
                Signature::new(&decl.name, params)
                    .with_varargs(varargs)
                    .with_static(decl.modifiers.is_static())
                    .with_visibility(decl.modifiers.visibility())
            }
            MethodEntry::Native(native) => native.signature().clone(),
        }
    }

    /// Declared return type. `None` for loosely typed script methods.
    pub fn return_type(&self) -> Option<Type> {
        match self {
            MethodEntry::Script(decl) => decl.return_type.clone(),
            MethodEntry::Native(native) => Some(native.return_type().clone()),
        }
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodEntry::Script(_) => write!(f, "script {}", self.signature()),
            MethodEntry::Native(native) => write!(f, "{:?}", native),
        }
    }
}

#[derive(Default)]
struct Tables {
    variables: HashMap<Arc<str>, Variable>,
    methods: HashMap<Arc<str>, Vec<MethodEntry>>,
}

/// Where an existing binding lives.
enum Slot {
    Local(ScopeRef),
    InstanceField(Arc<Instance>),
    StaticField(Arc<ClassDef>),
}

pub struct NameSpace {
    name: Arc<str>,
    kind: ScopeKind,
    parent: Option<ScopeRef>,
    tables: RwLock<Tables>,
}

impl NameSpace {
    fn build(name: &str, kind: ScopeKind, parent: Option<ScopeRef>) -> ScopeRef {
        tracing::debug!(
            scope = name,
            kind = kind.label(),
            parent = parent.as_ref().map(|p| &*p.name),
            "new scope"
        );
        Arc::new(Self {
            name: Arc::from(name),
            kind,
            parent,
            tables: RwLock::new(Tables::default()),
        })
    }

    pub fn new_root(name: &str) -> ScopeRef {
        Self::build(name, ScopeKind::Global, None)
    }

    pub fn new_child(parent: &ScopeRef, name: &str) -> ScopeRef {
        Self::build(name, ScopeKind::Block, Some(parent.clone()))
    }

    pub fn with_kind(parent: &ScopeRef, name: &str, kind: ScopeKind) -> ScopeRef {
        Self::build(name, kind, Some(parent.clone()))
    }

    /// Scope over a class's static fields.
    pub fn new_class_static(parent: &ScopeRef, class: Arc<ClassDef>) -> ScopeRef {
        let name = class.name_arc();
        Self::build(&name, ScopeKind::ClassStatic(class), Some(parent.clone()))
    }

    /// Scope over one instance's fields, nested in its class's static scope.
    pub fn new_class_instance(class_scope: &ScopeRef, instance: Arc<Instance>) -> ScopeRef {
        let name = alloc::format!("{} instance", instance.class().name());
        Self::build(&name, ScopeKind::ClassInstance(instance), Some(class_scope.clone()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ScopeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<&ScopeRef> {
        self.parent.as_ref()
    }

    fn chain<'a>(self: &'a ScopeRef) -> impl Iterator<Item = &'a ScopeRef> + 'a {
        core::iter::successors(Some(self), |scope| scope.parent.as_ref())
    }

    /// The binding for `name`, innermost first. `None` if unbound anywhere;
    /// the caller decides what that means.
    pub fn lookup(self: &ScopeRef, name: &str) -> Option<Variable> {
        for scope in self.chain() {
            if let Some(var) = scope.tables.read().variables.get(name) {
                let value = loaded(var.value());
                return Some(var.clone().with_value(value));
            }
            match &scope.kind {
                ScopeKind::ClassInstance(instance) => {
                    if let Some(value) = instance.field(name) {
                        return Some(Variable::untyped(name, value));
                    }
                    if let Some(value) = instance.class().static_field(name) {
                        return Some(Variable::untyped(name, value));
                    }
                }
                ScopeKind::ClassStatic(class) => {
                    if let Some(value) = class.static_field(name) {
                        return Some(Variable::untyped(name, value));
                    }
                }
                _ => {}
            }
        }
        None
    }

    pub fn lookup_variable(self: &ScopeRef, name: &str) -> Option<Value> {
        self.lookup(name).map(|var| var.value().clone())
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.tables.read().variables.contains_key(name)
    }

    /// Bind `var` in this scope, shadowing any outer binding of the name.
    ///
    /// Re-declaring a name bound in this same scope replaces it, unless the
    /// existing binding is an initialized `final`.
    pub fn declare_local(&self, var: Variable) -> Result<(), BindingError> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.variables.get(var.name()) {
            if existing.is_final() && existing.is_initialized() {
                return Err(BindingError::FinalRedeclaration {
                    name: var.name().to_string(),
                });
            }
        }
        tracing::trace!(scope = %self.name, name = var.name(), "declare");
        let value = self.stored(var.value().clone());
        tables.variables.insert(Arc::from(var.name()), var.with_value(value));
        Ok(())
    }

    /// Set `name` in this scope only, creating an untyped binding if needed.
    /// The value is stored as given.
    pub fn set_local_variable(&self, name: &str, value: Value) -> Result<(), BindingError> {
        let value = self.stored(value);
        let mut tables = self.tables.write();
        match tables.variables.get_mut(name) {
            Some(var) => var.assign(value),
            None => {
                tables
                    .variables
                    .insert(Arc::from(name), Variable::untyped(name, value));
                Ok(())
            }
        }
    }

    /// Where `name` is bound, and whether that binding is a loop control
    /// variable seen from inside a lambda.
    fn locate(self: &ScopeRef, name: &str) -> Option<(Slot, bool)> {
        let mut crossed_lambda = false;
        for scope in self.chain() {
            if scope.tables.read().variables.contains_key(name) {
                let captured = crossed_lambda && matches!(scope.kind, ScopeKind::ForInit);
                return Some((Slot::Local(scope.clone()), captured));
            }
            match &scope.kind {
                ScopeKind::ClassInstance(instance) => {
                    if instance.has_field(name) {
                        return Some((Slot::InstanceField(instance.clone()), false));
                    }
                    if instance.class().has_static_field(name) {
                        return Some((Slot::StaticField(instance.class().clone()), false));
                    }
                }
                ScopeKind::ClassStatic(class) if class.has_static_field(name) => {
                    return Some((Slot::StaticField(class.clone()), false));
                }
                ScopeKind::Lambda => crossed_lambda = true,
                _ => {}
            }
        }
        None
    }

    /// Assign an existing binding of `name`, wherever it lives in the chain.
    ///
    /// `compute` receives the current binding and returns the value to
    /// store; it runs under the owning table's write lock, so it must not
    /// evaluate script code or look up scopes. Returns `Ok(None)` if `name`
    /// is unbound.
    ///
    /// Lambdas share captured bindings with their defining scope, except
    /// that the control variables of an enclosing `for` statement are
    /// read-only from inside them.
    pub fn update_variable<F>(self: &ScopeRef, name: &str, compute: F) -> Result<Option<Value>, EvalError>
    where
        F: FnOnce(&Variable) -> Result<Value, EvalError>,
    {
        let Some((slot, captured_loop_variable)) = self.locate(name) else {
            return Ok(None);
        };
        if captured_loop_variable {
            return Err(BindingError::CapturedReassignment {
                name: name.to_string(),
            }
            .into());
        }

        match slot {
            Slot::Local(scope) => {
                let mut tables = scope.tables.write();
                let Some(var) = tables.variables.get_mut(name) else {
                    return Ok(None);
                };
                var.check_writable()?;
                let value = compute(var)?;
                var.assign(scope.stored(value.clone()))?;
                Ok(Some(value))
            }
            Slot::InstanceField(instance) => instance.update_field(name, compute).transpose(),
            Slot::StaticField(class) => class.update_static_field(name, compute).transpose(),
        }
    }

    /// `value` in the form this scope keeps it: a lambda capturing this
    /// scope holds it weakly.
    fn stored(&self, value: Value) -> Value {
        match value {
            Value::Object(Object::Lambda(lambda)) if lambda.captures(self) => {
                Value::Object(Object::Lambda(Arc::new(lambda.held_weakly())))
            }
            Value::Object(Object::Functional(functional)) if functional.lambda().captures(self) => {
                Value::Object(Object::Functional(Arc::new(functional.held_weakly())))
            }
            other => other,
        }
    }

    /// Remove `name` from the nearest scope that binds it.
    pub fn unset(self: &ScopeRef, name: &str) -> bool {
        self.chain()
            .any(|scope| scope.tables.write().variables.remove(name).is_some())
    }

    /// Bind a method, replacing one with identical parameter types.
    pub fn declare_method(&self, entry: MethodEntry) {
        let params = entry.signature().params;
        let mut tables = self.tables.write();
        let overloads = tables.methods.entry(Arc::from(entry.name())).or_default();
        overloads.retain(|existing| existing.signature().params != params);
        tracing::trace!(scope = %self.name, method = entry.name(), "declare method");
        overloads.push(entry);
    }

    /// The overloads of `name` in the nearest scope declaring any, together
    /// with that scope.
    pub fn find_methods(self: &ScopeRef, name: &str) -> Option<(ScopeRef, Vec<MethodEntry>)> {
        self.chain().find_map(|scope| {
            let tables = scope.tables.read();
            tables
                .methods
                .get(name)
                .filter(|overloads| !overloads.is_empty())
                .map(|overloads| (scope.clone(), overloads.clone()))
        })
    }

    /// The scope `this` refers to: the nearest one that is not a block or
    /// lambda invocation.
    pub fn this_scope(self: &ScopeRef) -> ScopeRef {
        self.chain()
            .find(|scope| !matches!(scope.kind, ScopeKind::Block | ScopeKind::ForInit | ScopeKind::Lambda))
            .unwrap_or(self)
            .clone()
    }

    /// The class whose members this scope sits inside, if any.
    pub fn enclosing_class(self: &ScopeRef) -> Option<Arc<ClassDef>> {
        self.chain().find_map(|scope| match &scope.kind {
            ScopeKind::ClassStatic(class) => Some(class.clone()),
            ScopeKind::ClassInstance(instance) => Some(instance.class().clone()),
            _ => None,
        })
    }

    /// The instance whose members this scope sits inside, if any.
    pub fn enclosing_instance(self: &ScopeRef) -> Option<Arc<Instance>> {
        self.chain().find_map(|scope| match &scope.kind {
            ScopeKind::ClassInstance(instance) => Some(instance.clone()),
            _ => None,
        })
    }

    pub fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .read()
            .variables
            .keys()
            .map(|k| k.to_string())
            .collect();
        names.sort();
        names
    }

    /// Every variable declared directly in this scope.
    pub fn variables(&self) -> Vec<Variable> {
        self.tables
            .read()
            .variables
            .values()
            .map(|var| var.clone().with_value(loaded(var.value())))
            .collect()
    }
}

/// A stored value as handed out to readers: lambdas hold their captured
/// scope strongly again.
fn loaded(value: &Value) -> Value {
    let restored = match value {
        Value::Object(Object::Lambda(lambda)) if lambda.is_held_weakly() => lambda
            .held_strongly()
            .map(|lambda| Value::Object(Object::Lambda(Arc::new(lambda)))),
        Value::Object(Object::Functional(functional)) if functional.lambda().is_held_weakly() => functional
            .held_strongly()
            .map(|functional| Value::Object(Object::Functional(Arc::new(functional)))),
        _ => None,
    };
    restored.unwrap_or_else(|| value.clone())
}

impl fmt::Debug for NameSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameSpace")
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("variables", &self.variable_names())
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .finish()
    }
}
