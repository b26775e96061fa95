//! Lambdas and method references as runtime values.
//!
//! A [`Lambda`] is created whenever a lambda or method-reference expression is
//! evaluated. It stays untyped until it meets a functional interface (an
//! assignment, argument binding or cast), at which point [`Lambda::convert_to`]
//! checks its shape against the interface's single abstract method and wraps
//! it in a [`FunctionalObject`].
//!
//! Expression lambdas close over the scope they were created in by
//! reference. Method references instead capture their receiver by value,
//! once, when the reference expression is evaluated.
//!
//! A lambda stored in a variable of a scope it captures would keep that
//! scope alive forever. The scope therefore stores a copy that holds the
//! captured scope weakly ([`Lambda::held_weakly`]) and hands out strong
//! copies again on every read. Copies share one identity, so `==` still
//! sees a single object.

use alloc::sync::{Arc, Weak};
use core::fmt;

use super::{FunctionalObject, Object, Value};
use crate::ast::LambdaExpr;
use crate::casting::{Conversion, is_type_assignable};
use crate::evaluator::{BindingError, EvalError, Evaluator, InterruptHandle, InternalError, Runtime};
use crate::scope::{NameSpace, ScopeRef};
use crate::scope_stack::CallStack;
use crate::types::{ClassDef, ClassRegistry, HostMethod, Type};
use crate::{String, ToString, Vec, format};

/// What a method reference is bound to.
#[derive(Clone)]
pub enum MethodRefReceiver {
    /// `expr::name`: the value of `expr` when the reference was evaluated.
    Bound(Value),
    /// `Type::name` or `Type::new`.
    Type(Type),
    /// `obj::name` where `obj` is a scripted object: the methods of the
    /// captured scope itself.
    Scope,
}

#[derive(Clone)]
pub enum LambdaKind {
    Expression(Arc<LambdaExpr>),
    MethodRef {
        receiver: MethodRefReceiver,
        name: Arc<str>,
    },
}

#[derive(Clone)]
enum Capture {
    Strong(ScopeRef),
    Weak(Weak<NameSpace>),
}

#[derive(Clone)]
pub struct Lambda {
    kind: LambdaKind,
    /// The scope active at creation. Expression lambdas run in a child of it.
    capture: Capture,
    runtime: Arc<Runtime>,
    /// Shared by every copy of this lambda.
    identity: Arc<()>,
}

/// The callable shape of one method-reference target.
struct Shape {
    params: Vec<Option<Type>>,
    varargs: bool,
    return_type: Option<Type>,
}

impl Lambda {
    pub fn expression(decl: Arc<LambdaExpr>, scope: ScopeRef, runtime: Arc<Runtime>) -> Self {
        Self {
            kind: LambdaKind::Expression(decl),
            capture: Capture::Strong(scope),
            runtime,
            identity: Arc::new(()),
        }
    }

    pub fn method_ref(receiver: MethodRefReceiver, name: &str, scope: ScopeRef, runtime: Arc<Runtime>) -> Self {
        Self {
            kind: LambdaKind::MethodRef {
                receiver,
                name: Arc::from(name),
            },
            capture: Capture::Strong(scope),
            runtime,
            identity: Arc::new(()),
        }
    }

    pub fn kind(&self) -> &LambdaKind {
        &self.kind
    }

    /// The captured scope.
    pub fn scope(&self) -> Result<ScopeRef, EvalError> {
        match &self.capture {
            Capture::Strong(scope) => Ok(scope.clone()),
            Capture::Weak(scope) => scope.upgrade().ok_or_else(|| {
                InternalError::ScopeDropped {
                    lambda: self.to_string(),
                }
                .into()
            }),
        }
    }

    /// Whether `other` is a copy of this lambda.
    pub fn same(&self, other: &Lambda) -> bool {
        Arc::ptr_eq(&self.identity, &other.identity)
    }

    /// Whether `scope` is the captured scope or one of its ancestors.
    pub fn captures(&self, scope: &NameSpace) -> bool {
        let Ok(captured) = self.scope() else {
            return false;
        };
        core::iter::successors(Some(&captured), |s| s.parent()).any(|s| core::ptr::eq(&**s, scope))
    }

    pub fn is_held_weakly(&self) -> bool {
        matches!(self.capture, Capture::Weak(_))
    }

    /// A copy that does not keep the captured scope alive.
    pub fn held_weakly(&self) -> Self {
        let capture = match &self.capture {
            Capture::Strong(scope) => Capture::Weak(Arc::downgrade(scope)),
            weak => weak.clone(),
        };
        Self {
            capture,
            ..self.clone()
        }
    }

    /// A copy that keeps the captured scope alive, or `None` if it is gone.
    pub fn held_strongly(&self) -> Option<Self> {
        let scope = self.scope().ok()?;
        Some(Self {
            capture: Capture::Strong(scope),
            ..self.clone()
        })
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Declared parameter count; `None` for method references, whose arity
    /// depends on the target interface.
    pub fn arity(&self) -> Option<usize> {
        match &self.kind {
            LambdaKind::Expression(decl) => Some(decl.params.len()),
            LambdaKind::MethodRef { .. } => None,
        }
    }

    /// Call the lambda from host code with positional arguments.
    ///
    /// The call runs on a stack of its own under a fresh interrupt handle.
    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, EvalError> {
        for arg in &args {
            arg.payload()?;
        }
        let mut stack = CallStack::new(self.scope()?);
        Evaluator::new(self.runtime.clone(), &mut stack)
            .with_interrupt(InterruptHandle::new())
            .call_lambda(self, args)
    }

    /// Whether [`convert_to`](Self::convert_to) would succeed.
    pub fn is_assignable(&self, registry: &ClassRegistry, interface: &Arc<ClassDef>) -> bool {
        self.check_shape(registry, interface).is_ok()
    }

    /// Bind this lambda to a functional interface.
    pub fn convert_to(
        self: &Arc<Self>,
        registry: &ClassRegistry,
        interface: &Arc<ClassDef>,
    ) -> Result<FunctionalObject, BindingError> {
        let method = self.check_shape(registry, interface)?;
        tracing::debug!(lambda = %self, interface = %interface.name(), "converted lambda");
        Ok(FunctionalObject::new(interface.clone(), method, self.clone()))
    }

    fn check_shape(&self, registry: &ClassRegistry, interface: &Arc<ClassDef>) -> Result<HostMethod, BindingError> {
        let cannot = |reason: String| BindingError::CannotConvert {
            from: self.to_string(),
            to: interface.name().to_string(),
            reason,
        };
        let method = registry
            .functional_method(interface)
            .ok_or_else(|| cannot("not a functional interface".into()))?;
        let expected = method.signature.arity();

        match &self.kind {
            LambdaKind::Expression(decl) => {
                if decl.params.len() != expected {
                    return Err(cannot(format!(
                        "{} expects {} parameters, lambda declares {}",
                        method.signature,
                        expected,
                        decl.params.len()
                    )));
                }
            }
            LambdaKind::MethodRef { receiver, name } => {
                if !self.accepts_callable_receiver() {
                    let shapes = self.member_shapes(registry, receiver, name);
                    if !shapes.iter().any(|shape| shape_fits(registry, shape, &method)) {
                        return Err(cannot(format!(
                            "no member {} compatible with {}",
                            name, method.signature
                        )));
                    }
                }
            }
        }
        Ok(method)
    }

    /// References to a callable value (`fn::apply`) accept any shape; the
    /// check happens when the target is invoked.
    fn accepts_callable_receiver(&self) -> bool {
        matches!(
            &self.kind,
            LambdaKind::MethodRef {
                receiver: MethodRefReceiver::Bound(Value::Object(Object::Lambda(_) | Object::Functional(_))),
                ..
            }
        )
    }

    fn member_shapes(&self, registry: &ClassRegistry, receiver: &MethodRefReceiver, name: &str) -> Vec<Shape> {
        match receiver {
            MethodRefReceiver::Scope => match self.scope() {
                Ok(scope) => scope_shapes(&scope, name),
                Err(_) => Vec::new(),
            },
            MethodRefReceiver::Bound(Value::Object(Object::This(scope))) => scope_shapes(scope, name),
            MethodRefReceiver::Bound(value) => bound_shapes(registry, value, name),
            MethodRefReceiver::Type(ty) => type_shapes(registry, ty, name),
        }
    }
}

fn scope_shapes(scope: &ScopeRef, name: &str) -> Vec<Shape> {
    scope
        .find_methods(name)
        .map(|(_, entries)| {
            entries
                .iter()
                .map(|entry| {
                    let signature = entry.signature();
                    Shape {
                        params: signature.params,
                        varargs: signature.varargs,
                        return_type: entry.return_type(),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn bound_shapes(registry: &ClassRegistry, value: &Value, name: &str) -> Vec<Shape> {
    let class = value
        .runtime_type()
        .and_then(|ty| ty.class_name().and_then(|n| registry.get(n)).or_else(|| registry.get("Object")));
    match class {
        Some(class) => registry
            .find_methods(&class, name)
            .into_iter()
            .filter(|m| !m.signature.is_static)
            .map(|m| host_shape(&m, None))
            .collect(),
        None => Vec::new(),
    }
}

fn type_shapes(registry: &ClassRegistry, ty: &Type, name: &str) -> Vec<Shape> {
    if let (Type::Array(_), "new") = (ty, name) {
        return Vec::from([Shape {
            params: Vec::from([Some(Type::int())]),
            varargs: false,
            return_type: None,
        }]);
    }
    let Some(class) = ty.class_name().and_then(|n| registry.get(n)) else {
        return Vec::new();
    };
    if name == "new" {
        if class.constructors().is_empty() {
            return Vec::from([Shape {
                params: Vec::new(),
                varargs: false,
                return_type: None,
            }]);
        }
        return class
            .constructors()
            .iter()
            .map(|c| host_shape(c, None))
            .collect();
    }
    registry
        .find_methods(&class, name)
        .iter()
        .map(|m| {
            if m.signature.is_static {
                host_shape(m, None)
            } else {
                host_shape(m, Some(ty.clone()))
            }
        })
        .collect()
}

/// Shape of a host method; an unbound instance method takes its receiver as
/// an extra first parameter.
fn host_shape(method: &HostMethod, receiver: Option<Type>) -> Shape {
    let mut params = Vec::new();
    if let Some(receiver) = receiver {
        params.push(Some(receiver));
    }
    params.extend(method.signature.params.iter().cloned());
    Shape {
        params,
        varargs: method.signature.varargs,
        return_type: Some(method.return_type.clone()),
    }
}

fn shape_fits(registry: &ClassRegistry, shape: &Shape, method: &HostMethod) -> bool {
    let wanted = &method.signature.params;
    let arity_ok = shape.params.len() == wanted.len()
        || (shape.varargs && wanted.len() + 1 >= shape.params.len());
    if !arity_ok {
        return false;
    }

    let params_ok = wanted.iter().enumerate().all(|(i, iface_param)| {
        let member_param = if shape.varargs && i + 1 >= shape.params.len() {
            match shape.params.last() {
                Some(Some(Type::Array(element))) if wanted.len() != shape.params.len() => {
                    Some((**element).clone())
                }
                Some(other) => other.clone(),
                None => None,
            }
        } else {
            shape.params.get(i).cloned().flatten()
        };
        match (iface_param, member_param) {
            (Some(a), Some(b)) => {
                // Interface parameters are erased, so a downcast may still
                // succeed at run time.
                is_type_assignable(registry, a, &b, Conversion::Boxing)
                    || is_type_assignable(registry, &b, a, Conversion::Boxing)
            }
            _ => true,
        }
    });

    let returns_ok = method.return_type == Type::Void || shape.return_type != Some(Type::Void);
    params_ok && returns_ok
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LambdaKind::Expression(decl) => {
                let params: Vec<&str> = decl.params.iter().map(|p| &*p.name).collect();
                write!(f, "lambda({})", params.join(", "))
            }
            LambdaKind::MethodRef { receiver, name } => match receiver {
                MethodRefReceiver::Bound(value) => write!(f, "{}::{}", value.type_name(), name),
                MethodRefReceiver::Type(ty) => write!(f, "{}::{}", ty, name),
                MethodRefReceiver::Scope => write!(f, "this::{}", name),
            },
        }
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda({})", self)
    }
}
