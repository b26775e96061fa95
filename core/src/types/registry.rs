//! Host class registry.
//!
//! Scripts cannot introspect arbitrary host types, so every class they can
//! name, construct or call into is registered here up front with an explicit
//! table of constructors, methods and fields backed by native closures.

use alloc::sync::Arc;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;

use super::{Type, builtins, normalize_class_name};
use crate::evaluator::{EvalError, ResolutionError};
use crate::resolver::Signature;
use crate::scope::{Modifiers, Variable, Visibility};
use crate::values::Value;
use crate::{String, ToString, Vec};

/// Native body of a host method or constructor.
///
/// The first argument is the receiver: the instance for instance methods and
/// constructors, `null` for static methods. Arguments arrive already coerced
/// to the declared parameter types. A constructor returns `void` to keep the
/// fresh instance or any other value to replace it.
pub type NativeFn = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Abstract,
    Interface,
}

/// A registered method or constructor. `body` is `None` for abstract methods.
#[derive(Clone)]
pub struct HostMethod {
    pub signature: Signature,
    pub return_type: Type,
    pub body: Option<NativeFn>,
}

impl HostMethod {
    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }
}

impl fmt::Debug for HostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.signature, self.return_type)?;
        if self.is_abstract() {
            write!(f, " (abstract)")?;
        }
        Ok(())
    }
}

/// An instance field declaration.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: Arc<str>,
    pub ty: Type,
    pub modifiers: Modifiers,
}

impl FieldDef {
    pub fn to_variable(&self) -> Variable {
        Variable::uninitialized(&self.name, Some(self.ty.clone()), self.modifiers)
    }
}

pub struct ClassDef {
    name: Arc<str>,
    kind: ClassKind,
    superclass: Option<Arc<str>>,
    interfaces: Vec<Arc<str>>,
    constructors: Vec<HostMethod>,
    methods: Vec<HostMethod>,
    fields: Vec<FieldDef>,
    static_fields: RwLock<HashMap<Arc<str>, Variable>>,
}

impl ClassDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_arc(&self) -> Arc<str> {
        self.name.clone()
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_instantiable(&self) -> bool {
        self.kind == ClassKind::Class
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(|name| &**name)
    }

    pub fn constructors(&self) -> &[HostMethod] {
        &self.constructors
    }

    pub fn declared_methods(&self) -> &[HostMethod] {
        &self.methods
    }

    pub fn declared_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn has_static_field(&self, name: &str) -> bool {
        self.static_fields.read().contains_key(name)
    }

    pub fn static_field(&self, name: &str) -> Option<Value> {
        self.static_fields.read().get(name).map(|var| var.value().clone())
    }

    pub fn static_variable(&self, name: &str) -> Option<Variable> {
        self.static_fields.read().get(name).cloned()
    }

    /// Assign a static field under its table lock. `None` if there is no such
    /// field.
    pub fn update_static_field<F>(&self, name: &str, f: F) -> Option<Result<Value, EvalError>>
    where
        F: FnOnce(&Variable) -> Result<Value, EvalError>,
    {
        let mut fields = self.static_fields.write();
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
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("superclass", &self.superclass)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
enum Member {
    Constructor,
    Method,
}

/// Fluent builder for [`ClassDef`].
///
/// ```ignore
/// let point = ClassBuilder::class("Point")
///     .field("x", Type::int())
///     .constructor(&[Type::int()], |this, args| { ... })
///     .method("getX", &[], Type::int(), |this, _| { ... })
///     .build();
/// ```
pub struct ClassBuilder {
    name: Arc<str>,
    kind: ClassKind,
    superclass: Option<Arc<str>>,
    interfaces: Vec<Arc<str>>,
    constructors: Vec<HostMethod>,
    methods: Vec<HostMethod>,
    fields: Vec<FieldDef>,
    static_fields: HashMap<Arc<str>, Variable>,
    last: Option<Member>,
}

impl ClassBuilder {
    fn new(name: &str, kind: ClassKind) -> Self {
        Self {
            name: Arc::from(normalize_class_name(name)),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            static_fields: HashMap::new(),
            last: None,
        }
    }

    pub fn class(name: &str) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn abstract_class(name: &str) -> Self {
        Self::new(name, ClassKind::Abstract)
    }

    pub fn interface(name: &str) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(Arc::from(normalize_class_name(superclass)));
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(Arc::from(normalize_class_name(interface)));
        self
    }

    fn signature(&self, name: &str, params: &[Type]) -> Signature {
        Signature::typed(name, params).with_declaring_type(&self.name)
    }

    pub fn constructor<F>(mut self, params: &[Type], body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        let signature = self.signature(&self.name, params);
        self.constructors.push(HostMethod {
            signature,
            return_type: Type::Void,
            body: Some(Arc::new(body)),
        });
        self.last = Some(Member::Constructor);
        self
    }

    pub fn method<F>(mut self, name: &str, params: &[Type], return_type: Type, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        let signature = self.signature(name, params);
        self.methods.push(HostMethod {
            signature,
            return_type,
            body: Some(Arc::new(body)),
        });
        self.last = Some(Member::Method);
        self
    }

    pub fn static_method<F>(mut self, name: &str, params: &[Type], return_type: Type, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        let signature = self.signature(name, params).with_static(true);
        self.methods.push(HostMethod {
            signature,
            return_type,
            body: Some(Arc::new(body)),
        });
        self.last = Some(Member::Method);
        self
    }

    pub fn abstract_method(mut self, name: &str, params: &[Type], return_type: Type) -> Self {
        let signature = self.signature(name, params);
        self.methods.push(HostMethod {
            signature,
            return_type,
            body: None,
        });
        self.last = Some(Member::Method);
        self
    }

    fn last_member(&mut self) -> Option<&mut HostMethod> {
        match self.last? {
            Member::Constructor => self.constructors.last_mut(),
            Member::Method => self.methods.last_mut(),
        }
    }

    /// Mark the last added method or constructor as varargs. Its last
    /// parameter must be an array type.
    pub fn varargs(mut self) -> Self {
        if let Some(member) = self.last_member() {
            member.signature.varargs = true;
        }
        self
    }

    /// Mark the last added method or constructor as private.
    pub fn private(mut self) -> Self {
        if let Some(member) = self.last_member() {
            member.signature.visibility = Visibility::Private;
        }
        self
    }

    pub fn field(mut self, name: &str, ty: Type) -> Self {
        self.fields.push(FieldDef {
            name: Arc::from(name),
            ty,
            modifiers: Modifiers::PUBLIC,
        });
        self
    }

    pub fn final_field(mut self, name: &str, ty: Type) -> Self {
        self.fields.push(FieldDef {
            name: Arc::from(name),
            ty,
            modifiers: Modifiers::PUBLIC | Modifiers::FINAL,
        });
        self
    }

    pub fn static_field(mut self, name: &str, ty: Type, value: Value, modifiers: Modifiers) -> Self {
        let var = Variable::new(name, Some(ty), value, modifiers | Modifiers::STATIC);
        self.static_fields.insert(Arc::from(name), var);
        self
    }

    pub fn build(self) -> ClassDef {
        ClassDef {
            name: self.name,
            kind: self.kind,
            superclass: self.superclass,
            interfaces: self.interfaces,
            constructors: self.constructors,
            methods: self.methods,
            fields: self.fields,
            static_fields: RwLock::new(self.static_fields),
        }
    }
}

/// The table of classes scripts may use. Shared by every evaluation of an
/// interpreter; registration is internally synchronized.
pub struct ClassRegistry {
    classes: RwLock<HashMap<Arc<str>, Arc<ClassDef>>>,
}

impl ClassRegistry {
    /// A registry holding the builtin classes.
    pub fn new() -> Self {
        let registry = Self::empty();
        builtins::install(&registry);
        registry
    }

    pub fn empty() -> Self {
        Self {
            classes: RwLock::new(HashMap::new()),
        }
    }

    /// Register a class, replacing any class with the same name.
    pub fn register(&self, class: ClassDef) -> Arc<ClassDef> {
        let class = Arc::new(class);
        tracing::debug!(class = %class.name, "registering class");
        self.classes.write().insert(class.name.clone(), class.clone());
        class
    }

    pub fn get(&self, name: &str) -> Option<Arc<ClassDef>> {
        self.classes.read().get(normalize_class_name(name)).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(normalize_class_name(name))
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<ClassDef>, ResolutionError> {
        self.get(name).ok_or_else(|| ResolutionError::UnknownClass {
            name: name.to_string(),
        })
    }

    /// The class itself followed by every supertype, subclass-first, each
    /// listed once. `Object` comes last.
    pub fn ancestors(&self, class: &Arc<ClassDef>) -> Vec<Arc<ClassDef>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_ancestors(class.clone(), &mut seen, &mut out);
        if let Some(object) = self.get("Object") {
            if seen.insert(object.name.clone()) {
                out.push(object);
            }
        }
        out
    }

    fn collect_ancestors(
        &self,
        class: Arc<ClassDef>,
        seen: &mut HashSet<Arc<str>>,
        out: &mut Vec<Arc<ClassDef>>,
    ) {
        if &*class.name == "Object" || !seen.insert(class.name.clone()) {
            return;
        }
        out.push(class.clone());
        if let Some(parent) = class.superclass.as_deref().and_then(|name| self.get(name)) {
            self.collect_ancestors(parent, seen, out);
        }
        for interface in &class.interfaces {
            if let Some(parent) = self.get(interface) {
                self.collect_ancestors(parent, seen, out);
            }
        }
    }

    /// Whether `sub` names `sup` or one of its subtypes.
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        let sub = normalize_class_name(sub);
        let sup = normalize_class_name(sup);
        if sub == sup || sup == "Object" {
            return true;
        }
        match self.get(sub) {
            Some(class) => self.ancestors(&class).iter().any(|c| &*c.name == sup),
            None => false,
        }
    }

    /// Reference widening between two reference types. Arrays of references
    /// are covariant; arrays are also `Object`, `Cloneable` and `Serializable`.
    pub fn is_reference_assignable(&self, from: &Type, to: &Type) -> bool {
        match (from, to) {
            (_, Type::Class(name)) if &**name == "Object" => from.is_reference(),
            (Type::Class(a), Type::Class(b)) => self.is_subclass(a, b),
            (Type::Array(_), Type::Class(b)) => matches!(&**b, "Cloneable" | "Serializable"),
            (Type::Array(a), Type::Array(b)) => match (&**a, &**b) {
                (Type::Primitive(x), Type::Primitive(y)) => x == y,
                (x, y) if x.is_reference() && y.is_reference() => self.is_reference_assignable(x, y),
                _ => false,
            },
            _ => false,
        }
    }

    /// Methods named `name` visible on `class`, subclass declarations hiding
    /// the superclass methods they override.
    pub fn find_methods(&self, class: &Arc<ClassDef>, name: &str) -> Vec<HostMethod> {
        let mut found: Vec<HostMethod> = Vec::new();
        for ancestor in self.ancestors(class) {
            for method in ancestor.methods.iter().filter(|m| m.name() == name) {
                let overridden = found
                    .iter()
                    .any(|m| m.signature.params == method.signature.params);
                if !overridden {
                    found.push(method.clone());
                }
            }
        }
        found
    }

    /// The single abstract method of a functional interface.
    pub fn functional_method(&self, interface: &Arc<ClassDef>) -> Option<HostMethod> {
        if !interface.is_interface() {
            return None;
        }
        let mut seen: Vec<(Arc<str>, Vec<Option<Type>>)> = Vec::new();
        let mut abstract_methods = Vec::new();
        for ancestor in self.ancestors(interface) {
            if &*ancestor.name == "Object" {
                continue;
            }
            for method in &ancestor.methods {
                if method.signature.is_static || is_object_method(method) {
                    continue;
                }
                let key = (method.signature.name.clone(), method.signature.params.clone());
                if seen.contains(&key) {
                    continue;
                }
                seen.push(key);
                if method.is_abstract() {
                    abstract_methods.push(method.clone());
                }
            }
        }
        match abstract_methods.len() {
            1 => abstract_methods.pop(),
            _ => None,
        }
    }

    pub fn functional_method_of(&self, ty: &Type) -> Option<HostMethod> {
        let class = self.get(ty.class_name()?)?;
        self.functional_method(&class)
    }

    pub fn is_functional(&self, ty: &Type) -> bool {
        self.functional_method_of(ty).is_some()
    }

    /// Instance fields of `class`, superclass fields first.
    pub fn instance_fields(&self, class: &Arc<ClassDef>) -> Vec<FieldDef> {
        let mut chain = Vec::new();
        let mut current = Some(class.clone());
        while let Some(c) = current {
            current = c.superclass.as_deref().and_then(|name| self.get(name));
            chain.push(c);
        }
        chain
            .iter()
            .rev()
            .flat_map(|c| c.fields.iter().cloned())
            .collect()
    }

    /// The class in `class`'s hierarchy that declares static field `name`.
    pub fn find_static_field_owner(&self, class: &Arc<ClassDef>, name: &str) -> Option<Arc<ClassDef>> {
        self.ancestors(class)
            .into_iter()
            .find(|c| c.has_static_field(name))
    }

    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.read().keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.class_names())
            .finish()
    }
}

fn is_object_method(method: &HostMethod) -> bool {
    let params = &method.signature.params;
    match method.name() {
        "equals" => params.len() == 1,
        "hashCode" | "toString" => params.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
