//! The Jolt interpreter.

use alloc::sync::Arc;

use super::{EnvironmentBuilder, InterpreterOptions};
use crate::ast::Block;
use crate::casting::coerce_assign;
use crate::evaluator::{EvalError, Evaluator, InterruptHandle, ResolutionError, Runtime};
use crate::scope::{Modifiers, NameSpace, ScopeRef, Variable};
use crate::scope_stack::CallStack;
use crate::security::{SecurityGuard, SecurityPolicy};
use crate::types::{ClassRegistry, Type};
use crate::values::Value;
use crate::ToString;

/// An interpreter: a class registry, a global scope and the options and
/// security policy every evaluation runs under.
///
/// The interpreter is `Send + Sync`. Evaluations on different threads may
/// share the global scope, or each use their own [`Session`].
///
/// # Example
///
/// ```
/// use jolt_core::api::{Interpreter, InterpreterOptions};
/// use jolt_core::ast::{BinaryOp, build::*};
///
/// let interpreter = Interpreter::new(InterpreterOptions::default(), |env| {
///     env.register("base", jolt_core::values::Value::int(40));
/// });
///
/// let script = program(vec![expr(binary(BinaryOp::Add, ident("base"), int(2)))]);
/// let result = interpreter.eval(&script).unwrap();
/// assert_eq!(result.as_int(), Some(42));
/// ```
pub struct Interpreter {
    runtime: Arc<Runtime>,
    global: ScopeRef,
    interrupt: InterruptHandle,
}

impl Interpreter {
    /// Create an interpreter with a custom environment.
    ///
    /// The initialization closure registers host classes, native functions
    /// and global constants.
    pub fn new(options: InterpreterOptions, init: impl FnOnce(&mut EnvironmentBuilder<'_>)) -> Self {
        let registry = Arc::new(ClassRegistry::new());
        let mut env = EnvironmentBuilder::new(&registry);
        init(&mut env);
        let global = env.build("global");

        tracing::debug!(
            classes = registry.class_names().len(),
            max_depth = options.execution.max_depth,
            strict = options.execution.strict_java,
            "interpreter created"
        );
        let runtime = Runtime::new(registry, SecurityGuard::allow_all(), options.execution);
        Self {
            runtime: Arc::new(runtime),
            global,
            interrupt: InterruptHandle::new(),
        }
    }

    /// Install a security policy consulted before every reflective
    /// operation.
    pub fn with_security_policy(self, policy: Arc<dyn SecurityPolicy>) -> Self {
        let runtime = Runtime {
            registry: self.runtime.registry.clone(),
            security: SecurityGuard::new(Some(policy)),
            options: self.runtime.options.clone(),
        };
        Self {
            runtime: Arc::new(runtime),
            global: self.global,
            interrupt: self.interrupt,
        }
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.runtime.registry
    }

    pub fn global(&self) -> &ScopeRef {
        &self.global
    }

    /// A handle another thread can use to abort evaluations started with
    /// [`eval`](Self::eval) or [`eval_in`](Self::eval_in). Sessions have
    /// handles of their own.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Run a script in the global scope.
    ///
    /// Top-level declarations persist for later evaluations. An uncaught
    /// script exception is returned as [`EvalError::Thrown`].
    pub fn eval(&self, script: &Block) -> Result<Value, EvalError> {
        self.eval_in(&self.global, script)
    }

    /// Run a script with `scope` as its innermost scope.
    pub fn eval_in(&self, scope: &ScopeRef, script: &Block) -> Result<Value, EvalError> {
        run(&self.runtime, scope, script, &self.interrupt)
    }

    /// Run a script in the global scope under a caller-owned interrupt
    /// handle.
    pub fn eval_with(&self, script: &Block, interrupt: &InterruptHandle) -> Result<Value, EvalError> {
        run(&self.runtime, &self.global, script, interrupt)
    }

    /// A private scope on top of the global one, so concurrent scripts can
    /// share globals without seeing each other's top-level locals.
    pub fn session(&self, name: &str) -> Session {
        Session {
            runtime: self.runtime.clone(),
            scope: NameSpace::new_child(&self.global, name),
            interrupt: InterruptHandle::new(),
        }
    }

    /// Bind a global. An existing typed global converts `value` to its type.
    pub fn set(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let value = match self.global.lookup(name) {
            Some(var) if self.global.has_local(name) => match var.ty() {
                Some(ty) => coerce_assign(&self.runtime.registry, value, ty)?,
                None => value,
            },
            _ => value,
        };
        self.global.set_local_variable(name, value)?;
        Ok(())
    }

    /// Declare a typed global, converting `value` to `ty`.
    pub fn set_typed(&self, name: &str, ty: Type, value: Value) -> Result<(), EvalError> {
        let value = coerce_assign(&self.runtime.registry, value, &ty)?;
        self.global
            .declare_local(Variable::new(name, Some(ty), value, Modifiers::empty()))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.global.lookup_variable(name)
    }

    pub fn unset(&self, name: &str) -> bool {
        self.global.unset(name)
    }

    /// Ask the security policy whether a generated class may extend
    /// `superclass` and implement `interfaces`.
    pub fn check_class_declaration(&self, superclass: Option<&str>, interfaces: &[&str]) -> Result<(), EvalError> {
        let registry = &self.runtime.registry;
        let security = &self.runtime.security;
        if let Some(name) = superclass {
            let superclass = registry.lookup(name)?;
            security.check_extends(&*superclass)?;
        }
        for name in interfaces {
            let interface = registry.lookup(name)?;
            if !interface.is_interface() {
                return Err(ResolutionError::UnknownClass {
                    name: name.to_string(),
                }
                .into());
            }
            security.check_implements(&*interface)?;
        }
        Ok(())
    }
}

/// A scope of its own over an interpreter's globals.
///
/// Top-level declarations of scripts run in a session stay in the session;
/// assignments to existing globals still reach the global scope.
pub struct Session {
    runtime: Arc<Runtime>,
    scope: ScopeRef,
    interrupt: InterruptHandle,
}

impl Session {
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    /// Aborts evaluations of this session only.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn eval(&self, script: &Block) -> Result<Value, EvalError> {
        run(&self.runtime, &self.scope, script, &self.interrupt)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.scope.lookup_variable(name)
    }
}

/// An interrupt is consumed by the evaluation it aborts.
fn run(runtime: &Arc<Runtime>, scope: &ScopeRef, script: &Block, interrupt: &InterruptHandle) -> Result<Value, EvalError> {
    let mut stack = CallStack::new(scope.clone());
    let mut evaluator = Evaluator::new(runtime.clone(), &mut stack).with_interrupt(interrupt.clone());
    evaluator.eval_block(script).map_err(|err| match evaluator.materialize(err) {
        Ok(exception) => EvalError::Thrown(exception),
        Err(EvalError::Interrupted) => {
            interrupt.reset();
            EvalError::Interrupted
        }
        Err(other) => other,
    })
}

static_assertions::assert_impl_all!(Interpreter: Send, Sync);
static_assertions::assert_impl_all!(Session: Send, Sync);
