//! Statement execution, expression evaluation and call dispatch.

use alloc::sync::Arc;

use super::operators;
use super::{
    BindingError, CoercionError, EvalError, InternalError, InterruptHandle, ResolutionError,
    ResourceExceeded, Runtime,
};
use crate::ast::{
    BinaryOp, Block, CatchClause, Expr, LambdaBody, LambdaExpr, MethodDecl, MethodRefTarget, Stmt,
    UnaryOp,
};
use crate::casting::{coerce_assign, coerce_cast, truthiness};
use crate::resolver::{self, ArgType, Phase, ResolveContext, Selection, Signature};
use crate::scope::{MethodEntry, Modifiers, NameSpace, ScopeKind, ScopeRef, Variable};
use crate::scope_stack::CallStack;
use crate::types::{ClassDef, ClassRegistry, FieldDef, HostMethod, Type};
use crate::values::{Array, Instance, Lambda, LambdaKind, MethodRefReceiver, Object, Primitive, Value};
use crate::{String, ToString, Vec, format};

/// How a statement completed.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal(Value),
    Return(Value),
    Break,
    Continue,
}

/// Which security check guards a host method call.
#[derive(Clone, Copy)]
enum Dispatch {
    Static,
    Instance,
    Super,
}

/// Walks statements and expressions over one [`CallStack`].
///
/// An evaluator is cheap to create. Lambdas invoked from host code build a
/// fresh one over their captured scope, so nested evaluations never share a
/// stack.
pub struct Evaluator<'a> {
    runtime: Arc<Runtime>,
    stack: &'a mut CallStack,
    interrupt: InterruptHandle,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(runtime: Arc<Runtime>, stack: &'a mut CallStack) -> Self {
        Self {
            runtime,
            stack,
            interrupt: InterruptHandle::new(),
            depth: 0,
        }
    }

    /// Poll `interrupt` instead of a private handle nobody else holds.
    pub fn with_interrupt(mut self, interrupt: InterruptHandle) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    fn registry(&self) -> Arc<ClassRegistry> {
        self.runtime.registry.clone()
    }

    fn scope(&self) -> Result<ScopeRef, EvalError> {
        Ok(self.stack.top()?.clone())
    }

    fn check_interrupt(&self) -> Result<(), EvalError> {
        if self.interrupt.is_interrupted() {
            tracing::debug!("evaluation interrupted");
            return Err(EvalError::Interrupted);
        }
        Ok(())
    }

    /// Run `f` with `scope` pushed, popping it whatever the outcome.
    fn in_scope<T>(
        &mut self,
        scope: ScopeRef,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.stack.push(scope);
        let result = f(self);
        self.stack.pop()?;
        result
    }

    /// Enter a method or lambda body.
    fn nested_call<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.check_interrupt()?;
        let max_depth = self.runtime.options.max_depth;
        if self.depth >= max_depth {
            tracing::debug!(depth = self.depth, "call depth exceeded");
            return Err(ResourceExceeded::StackOverflow {
                depth: self.depth + 1,
                max_depth,
            }
            .into());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ============================================================================
    // Statements
    // ============================================================================

    /// Execute one statement in the innermost scope and return its value.
    pub fn evaluate(&mut self, stmt: &Stmt) -> Result<Value, EvalError> {
        Ok(flow_value(self.eval_stmt(stmt)?))
    }

    /// Execute a script's statements directly in the innermost scope, so
    /// its top-level declarations outlive the call.
    pub fn eval_block(&mut self, block: &Block) -> Result<Value, EvalError> {
        Ok(flow_value(self.exec_statements(&block.statements)?))
    }

    /// Method declarations are hoisted so a statement may call a method
    /// declared after it.
    fn exec_statements(&mut self, statements: &[Stmt]) -> Result<Flow, EvalError> {
        let scope = self.scope()?;
        for stmt in statements {
            if let Stmt::MethodDecl(decl) = stmt {
                scope.declare_method(MethodEntry::Script(decl.clone()));
            }
        }

        let mut last = Value::Void;
        for stmt in statements {
            if matches!(stmt, Stmt::MethodDecl(_)) {
                continue;
            }
            match self.eval_stmt(stmt)? {
                Flow::Normal(value) => last = value,
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn exec_block(&mut self, block: &Block) -> Result<Flow, EvalError> {
        let scope = NameSpace::new_child(&self.scope()?, "block");
        self.in_scope(scope, |ev| ev.exec_statements(&block.statements))
    }

    /// One loop iteration in its own scope. A block body binds directly
    /// into that scope instead of nesting another one.
    fn exec_iteration(&mut self, scope: ScopeRef, body: &Stmt) -> Result<Flow, EvalError> {
        self.in_scope(scope, |ev| match body {
            Stmt::Block(block) => ev.exec_statements(&block.statements),
            other => ev.eval_stmt(other),
        })
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Flow, EvalError> {
        match stmt {
            Stmt::Expr(expr) => Ok(Flow::Normal(self.eval_expr(expr)?)),
            Stmt::VarDecl {
                modifiers,
                ty,
                declarators,
            } => {
                for declarator in declarators {
                    self.declare(*modifiers, ty.as_ref(), &declarator.name, declarator.init.as_ref())?;
                }
                Ok(Flow::Normal(Value::Void))
            }
            Stmt::Block(block) => self.exec_block(block),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if self.condition(cond)? {
                    self.eval_stmt(then)
                } else if let Some(otherwise) = otherwise {
                    self.eval_stmt(otherwise)
                } else {
                    Ok(Flow::Normal(Value::Void))
                }
            }
            Stmt::While { cond, body } => self.exec_while(cond, body),
            Stmt::DoWhile { body, cond } => self.exec_do_while(body, cond),
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => self.exec_for(init, cond.as_ref(), update, body),
            Stmt::ForEach {
                modifiers,
                ty,
                name,
                iterable,
                body,
            } => self.exec_for_each(*modifiers, ty.as_ref(), name, iterable, body),
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Void,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
            Stmt::Throw(expr) => {
                let value = self.eval_expr(expr)?;
                Err(self.throwable(value)?)
            }
            Stmt::Try {
                body,
                catches,
                finally,
            } => self.exec_try(body, catches, finally.as_ref()),
            Stmt::MethodDecl(decl) => {
                self.scope()?.declare_method(MethodEntry::Script(decl.clone()));
                Ok(Flow::Normal(Value::Void))
            }
            Stmt::Empty => Ok(Flow::Normal(Value::Void)),
        }
    }

    fn declare(
        &mut self,
        modifiers: Modifiers,
        ty: Option<&Type>,
        name: &str,
        init: Option<&Expr>,
    ) -> Result<(), EvalError> {
        let var = match init {
            None => Variable::uninitialized(name, ty.cloned(), modifiers),
            Some(init) => {
                let value = self.eval_expr(init)?;
                let value = match ty {
                    Some(ty) => coerce_assign(&self.runtime.registry, value, ty)?,
                    None if value.is_void() => {
                        return Err(CoercionError::VoidAssign {
                            target: name.to_string(),
                        }
                        .into());
                    }
                    None => value,
                };
                Variable::new(name, ty.cloned(), value, modifiers)
            }
        };
        self.scope()?.declare_local(var)?;
        Ok(())
    }

    /// Evaluate a branch or loop condition. Loose mode uses script
    /// truthiness; strict mode demands a boolean.
    fn condition(&mut self, expr: &Expr) -> Result<bool, EvalError> {
        let value = self.eval_expr(expr)?;
        if self.runtime.options.strict_java {
            return value.unboxed().and_then(|p| p.as_bool()).ok_or_else(|| {
                CoercionError::NotBoolean {
                    found: value.type_name(),
                }
                .into()
            });
        }
        Ok(truthiness(&value))
    }

    fn exec_while(&mut self, cond: &Expr, body: &Stmt) -> Result<Flow, EvalError> {
        loop {
            self.check_interrupt()?;
            if !self.condition(cond)? {
                break;
            }
            match self.eval_stmt(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(_) | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal(Value::Void))
    }

    fn exec_do_while(&mut self, body: &Stmt, cond: &Expr) -> Result<Flow, EvalError> {
        loop {
            self.check_interrupt()?;
            match self.eval_stmt(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(_) | Flow::Continue => {}
            }
            if !self.condition(cond)? {
                break;
            }
        }
        Ok(Flow::Normal(Value::Void))
    }

    /// The init clause binds into a scope spanning the whole loop; every
    /// iteration body gets a fresh child of it, so a lambda created in one
    /// iteration does not see locals of the next.
    fn exec_for(
        &mut self,
        init: &[Stmt],
        cond: Option<&Expr>,
        update: &[Expr],
        body: &Stmt,
    ) -> Result<Flow, EvalError> {
        let loop_scope = NameSpace::with_kind(&self.scope()?, "for", ScopeKind::ForInit);
        self.in_scope(loop_scope.clone(), |ev| {
            for stmt in init {
                ev.eval_stmt(stmt)?;
            }
            loop {
                ev.check_interrupt()?;
                if let Some(cond) = cond {
                    if !ev.condition(cond)? {
                        break;
                    }
                }
                let iteration = NameSpace::new_child(&loop_scope, "for-body");
                match ev.exec_iteration(iteration, body)? {
                    Flow::Break => break,
                    Flow::Return(value) => return Ok(Flow::Return(value)),
                    Flow::Normal(_) | Flow::Continue => {}
                }
                for expr in update {
                    ev.eval_expr(expr)?;
                }
            }
            Ok(Flow::Normal(Value::Void))
        })
    }

    fn exec_for_each(
        &mut self,
        modifiers: Modifiers,
        ty: Option<&Type>,
        name: &str,
        iterable: &Expr,
        body: &Stmt,
    ) -> Result<Flow, EvalError> {
        let source = self.eval_expr(iterable)?;
        let items = match &source {
            Value::Object(Object::Array(array)) => array.to_vec(),
            Value::Object(Object::Str(text)) => text
                .encode_utf16()
                .map(|unit| Value::Primitive(Primitive::Char(unit)))
                .collect(),
            Value::Null => return Err(null_pointer("Cannot iterate over null")),
            other => {
                return Err(CoercionError::BadOperand {
                    op: "for-each".into(),
                    operand: other.type_name(),
                }
                .into());
            }
        };

        let outer = self.scope()?;
        let registry = self.registry();
        for item in items {
            self.check_interrupt()?;
            let value = match ty {
                Some(ty) => coerce_assign(&registry, item, ty)?,
                None => item,
            };
            let iteration = NameSpace::new_child(&outer, "for-each");
            iteration.declare_local(Variable::new(name, ty.cloned(), value, modifiers))?;
            match self.exec_iteration(iteration, body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(_) | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal(Value::Void))
    }

    fn throwable(&self, value: Value) -> Result<EvalError, EvalError> {
        match &value {
            Value::Null => Ok(null_pointer("Cannot throw null")),
            Value::Object(Object::Instance(instance))
                if self
                    .runtime
                    .registry
                    .is_subclass(instance.class().name(), "Throwable") =>
            {
                Ok(EvalError::Thrown(value))
            }
            other => Err(CoercionError::IncompatibleCast {
                from: other.type_name(),
                target: "Throwable".into(),
            }
            .into()),
        }
    }

    /// An abrupt completion of `finally` replaces the outcome of the body
    /// and catch clauses.
    fn exec_try(
        &mut self,
        body: &Block,
        catches: &[CatchClause],
        finally: Option<&Block>,
    ) -> Result<Flow, EvalError> {
        let outcome = match self.exec_block(body) {
            Err(err) if err.is_catchable() && !catches.is_empty() => self
                .materialize(err)
                .and_then(|exception| self.handle_exception(catches, exception)),
            other => other,
        };

        if let Some(finally) = finally {
            match self.exec_block(finally)? {
                Flow::Normal(_) => {}
                abrupt => return Ok(abrupt),
            }
        }
        outcome
    }

    fn handle_exception(&mut self, catches: &[CatchClause], exception: Value) -> Result<Flow, EvalError> {
        let registry = self.registry();
        let class = match &exception {
            Value::Object(Object::Instance(instance)) => Some(instance.class().name_arc()),
            _ => None,
        };
        let clause = catches.iter().find(|clause| {
            clause.types.is_empty()
                || clause.types.iter().any(|ty| match (ty.class_name(), &class) {
                    (Some(wanted), Some(class)) => registry.is_subclass(class, wanted),
                    _ => false,
                })
        });
        let Some(clause) = clause else {
            return Err(EvalError::Thrown(exception));
        };

        tracing::trace!(name = %clause.name, "caught exception");
        let (ty, modifiers) = match clause.types.as_slice() {
            [single] => (Some(single.clone()), clause.modifiers),
            [] => (None, clause.modifiers),
            _ => (None, clause.modifiers | Modifiers::FINAL),
        };
        let scope = NameSpace::new_child(&self.scope()?, "catch");
        scope.declare_local(Variable::new(&clause.name, ty, exception, modifiers))?;
        self.in_scope(scope, |ev| ev.exec_statements(&clause.body.statements))
    }

    /// Turn a caught error into the script-visible exception object.
    ///
    /// Exceptions raised by host code become instances of the named class
    /// (or `RuntimeException` if it is not registered). Errors no script
    /// can catch are handed back unchanged.
    pub fn materialize(&self, err: EvalError) -> Result<Value, EvalError> {
        match err {
            EvalError::Thrown(value) => Ok(value),
            EvalError::HostException { class, message } => self.new_exception(&class, &message),
            other => Err(other),
        }
    }

    fn new_exception(&self, class: &str, message: &str) -> Result<Value, EvalError> {
        let registry = &self.runtime.registry;
        let class = registry
            .get(class)
            .or_else(|| registry.get("RuntimeException"))
            .ok_or_else(|| InternalError::MissingBuiltin {
                name: class.to_string(),
            })?;
        let instance = self.instantiate(&class);
        instance.set_field("message", Value::string(message))?;
        Ok(Value::Object(Object::Instance(instance)))
    }

    fn instantiate(&self, class: &Arc<ClassDef>) -> Arc<Instance> {
        let fields = self
            .runtime
            .registry
            .instance_fields(class)
            .iter()
            .map(FieldDef::to_variable)
            .collect();
        Arc::new(Instance::new(class.clone(), fields))
    }

    // ============================================================================
    // Expressions
    // ============================================================================

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => self.resolve_name(name),
            Expr::This => self.this_value(),
            Expr::Super => self.super_value(),
            Expr::Assign { op, target, value } => self.assign(*op, target, value),
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => Ok(Value::boolean(self.condition(left)? && self.condition(right)?)),
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => Ok(Value::boolean(self.condition(left)? || self.condition(right)?)),
            Expr::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                operators::binary(*op, &left, &right)
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                    self.increment(*op, operand)
                }
                _ => {
                    let value = self.eval_expr(operand)?;
                    operators::unary(*op, &value)
                }
            },
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                if self.condition(cond)? {
                    self.eval_expr(then)
                } else {
                    self.eval_expr(otherwise)
                }
            }
            Expr::Cast { ty, expr } => {
                let value = self.eval_expr(expr)?;
                coerce_cast(&self.runtime.registry, value, ty)
            }
            Expr::InstanceOf { expr, ty } => {
                let value = self.eval_expr(expr)?;
                Ok(Value::boolean(self.instance_of(&value, ty)))
            }
            Expr::Call { target, name, args } => self.eval_call(target.as_deref(), name, args),
            Expr::Invoke { callee, args } => {
                let label = match &**callee {
                    Expr::Ident(name) => name.to_string(),
                    _ => String::from("expression"),
                };
                let callee = self.eval_terminal(callee)?;
                let args = self.eval_args(args)?;
                self.call_value(callee, args, &label)
            }
            Expr::Field { target, name } => {
                let receiver = self.eval_terminal(target)?;
                self.get_field(&receiver, name)
            }
            Expr::Index { target, index } => {
                let target = self.eval_terminal(target)?;
                let index = self.eval_expr(index)?;
                let (array, i) = self.array_slot(&target, &index)?;
                array.get(i).ok_or_else(|| out_of_bounds(i, array.len()))
            }
            Expr::New { ty, args } => {
                let args = self.eval_args(args)?;
                self.construct(ty, args)
            }
            Expr::NewArray {
                element,
                dimensions,
                extra_dimensions,
            } => self.new_array(element, dimensions, *extra_dimensions),
            Expr::ArrayLiteral { element, elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for expr in elements {
                    let value = self.eval_expr(expr)?;
                    values.push(coerce_assign(&self.runtime.registry, value, element)?);
                }
                Ok(Value::array(element.clone(), values))
            }
            Expr::Lambda(decl) => {
                let lambda = Lambda::expression(decl.clone(), self.scope()?, self.runtime.clone());
                Ok(Value::Object(Object::Lambda(Arc::new(lambda))))
            }
            Expr::MethodRef { target, name } => self.method_ref(target, name),
        }
    }

    /// Evaluate an expression that is about to be dereferenced. A method
    /// reference must be the last operation of its expression.
    fn eval_terminal(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        if let Expr::MethodRef { name, .. } = expr {
            return Err(BindingError::MethodRefNotTerminal {
                name: name.to_string(),
            }
            .into());
        }
        self.eval_expr(expr)
    }

    /// Variables shadow classes; an unbound name is `Void`.
    fn resolve_name(&self, name: &str) -> Result<Value, EvalError> {
        if let Some(value) = self.scope()?.lookup_variable(name) {
            return Ok(value);
        }
        Ok(self
            .runtime
            .registry
            .get(name)
            .map(|class| Value::Object(Object::Class(class)))
            .unwrap_or(Value::Void))
    }

    fn this_value(&self) -> Result<Value, EvalError> {
        let this = self.scope()?.this_scope();
        Ok(match this.kind() {
            ScopeKind::ClassInstance(instance) => Value::Object(Object::Instance(instance.clone())),
            _ => Value::Object(Object::This(this)),
        })
    }

    fn super_value(&self) -> Result<Value, EvalError> {
        let this = self.scope()?.this_scope();
        let parent = this.parent().cloned().unwrap_or(this);
        Ok(Value::Object(Object::This(parent.this_scope())))
    }

    fn instance_of(&self, value: &Value, ty: &Type) -> bool {
        let registry = &self.runtime.registry;
        match value {
            Value::Null | Value::Void => false,
            Value::Object(Object::Lambda(lambda)) => {
                *ty == Type::object()
                    || ty
                        .class_name()
                        .and_then(|name| registry.get(name))
                        .is_some_and(|iface| lambda.is_assignable(registry, &iface))
            }
            _ => value.runtime_type().is_some_and(|runtime| {
                let runtime = runtime.boxed().unwrap_or(runtime);
                runtime == *ty || registry.is_reference_assignable(&runtime, ty)
            }),
        }
    }

    fn method_ref(&mut self, target: &MethodRefTarget, name: &str) -> Result<Value, EvalError> {
        let receiver = match target {
            MethodRefTarget::Type(ty) => MethodRefReceiver::Type(ty.clone()),
            MethodRefTarget::Expr(expr) => match self.eval_terminal(expr)? {
                Value::Object(Object::Class(class)) => MethodRefReceiver::Type(Type::Class(class.name_arc())),
                Value::Void => {
                    return Err(ResolutionError::VoidTarget {
                        name: name.to_string(),
                    }
                    .into());
                }
                Value::Null => return Err(null_pointer(format!("Cannot reference \"{}\" on null", name))),
                // A scripted object is its scope; capture that scope.
                Value::Object(Object::This(scope)) => {
                    let lambda = Lambda::method_ref(MethodRefReceiver::Scope, name, scope, self.runtime.clone());
                    return Ok(Value::Object(Object::Lambda(Arc::new(lambda))));
                }
                value => MethodRefReceiver::Bound(value),
            },
        };
        let lambda = Lambda::method_ref(receiver, name, self.scope()?, self.runtime.clone());
        Ok(Value::Object(Object::Lambda(Arc::new(lambda))))
    }

    fn get_field(&self, receiver: &Value, name: &str) -> Result<Value, EvalError> {
        let registry = &self.runtime.registry;
        let security = &self.runtime.security;
        match receiver {
            Value::Null => Err(null_pointer(format!(
                "Cannot read field \"{}\" because value is null",
                name
            ))),
            Value::Void => Err(ResolutionError::VoidTarget {
                name: name.to_string(),
            }
            .into()),
            Value::Object(Object::Array(array)) if name == "length" => Ok(Value::int(array.len() as i32)),
            Value::Object(Object::Class(class)) => {
                let owner = registry
                    .find_static_field_owner(class, name)
                    .ok_or_else(|| no_such_field(class.name(), name))?;
                security.check_get_static_field(&owner, name)?;
                owner.static_field(name).ok_or_else(|| no_such_field(class.name(), name))
            }
            Value::Object(Object::This(scope)) => scope
                .lookup_variable(name)
                .ok_or_else(|| no_such_field(scope.name(), name)),
            Value::Object(Object::Instance(instance)) => {
                security.check_get_field(receiver, name)?;
                instance
                    .field(name)
                    .or_else(|| {
                        registry
                            .find_static_field_owner(instance.class(), name)
                            .and_then(|owner| owner.static_field(name))
                    })
                    .ok_or_else(|| no_such_field(instance.class().name(), name))
            }
            other => {
                let class = self.host_class(other)?;
                let owner = registry
                    .find_static_field_owner(&class, name)
                    .ok_or_else(|| no_such_field(class.name(), name))?;
                security.check_get_static_field(&owner, name)?;
                owner.static_field(name).ok_or_else(|| no_such_field(class.name(), name))
            }
        }
    }

    /// The array and checked index an indexing expression refers to.
    fn array_slot(&self, target: &Value, index: &Value) -> Result<(Arc<Array>, usize), EvalError> {
        let array = match target {
            Value::Object(Object::Array(array)) => array.clone(),
            Value::Null => return Err(null_pointer("Cannot load from array because it is null")),
            Value::Void => {
                return Err(ResolutionError::VoidTarget { name: "[]".into() }.into());
            }
            other => {
                return Err(ResolutionError::NotIndexable {
                    found: other.type_name(),
                }
                .into());
            }
        };
        let i = index.as_int().ok_or_else(|| CoercionError::IncompatibleAssign {
            from: index.type_name(),
            target: "int".into(),
        })?;
        if i < 0 || i as usize >= array.len() {
            return Err(EvalError::raise(
                "ArrayIndexOutOfBoundsException",
                format!("Index {} out of bounds for length {}", i, array.len()),
            ));
        }
        Ok((array, i as usize))
    }

    fn new_array(&mut self, element: &Type, dimensions: &[Expr], extra: usize) -> Result<Value, EvalError> {
        if dimensions.is_empty() {
            return Err(InternalError::InvalidAst {
                reason: "array creation without dimensions".into(),
            }
            .into());
        }
        let mut lengths = Vec::with_capacity(dimensions.len());
        for dim in dimensions {
            let value = self.eval_expr(dim)?;
            let len = value.as_int().ok_or_else(|| CoercionError::IncompatibleAssign {
                from: value.type_name(),
                target: "int".into(),
            })?;
            if len < 0 {
                return Err(EvalError::raise("NegativeArraySizeException", len.to_string()));
            }
            lengths.push(len as usize);
        }
        Ok(build_array(element, &lengths, extra))
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.eval_expr(arg)?;
            if value.is_void() {
                return Err(match arg {
                    Expr::Ident(name) => ResolutionError::UndefinedVariable {
                        name: name.to_string(),
                    }
                    .into(),
                    _ => CoercionError::VoidAssign {
                        target: "argument".into(),
                    }
                    .into(),
                });
            }
            values.push(value);
        }
        Ok(values)
    }

    // ============================================================================
    // Assignment
    // ============================================================================

    fn assign(&mut self, op: Option<BinaryOp>, target: &Expr, value: &Expr) -> Result<Value, EvalError> {
        match target {
            Expr::Ident(name) => {
                let rhs = self.eval_expr(value)?;
                self.assign_name(name, op, rhs)
            }
            Expr::Field { target, name } => {
                let receiver = self.eval_terminal(target)?;
                let rhs = self.eval_expr(value)?;
                let rhs = self.convert_for(op, self.member_variable(&receiver, name), rhs)?;
                let registry = self.registry();
                let stored =
                    self.update_member(&receiver, name, |current, ty| store(&registry, op, current, ty, rhs.clone()))?;
                match (stored, &receiver) {
                    (Some(value), _) => Ok(value),
                    (None, Value::Object(Object::This(scope))) if op.is_none() => {
                        scope.set_local_variable(name, rhs.clone())?;
                        Ok(rhs)
                    }
                    (None, _) => Err(no_such_field(&receiver.type_name(), name)),
                }
            }
            Expr::Index { target, index } => {
                let target = self.eval_terminal(target)?;
                let index = self.eval_expr(index)?;
                let rhs = self.eval_expr(value)?;
                let (array, i) = self.array_slot(&target, &index)?;
                let element = array.element_type().clone();
                let rhs = match op {
                    None => coerce_assign(&self.runtime.registry, rhs, &element)?,
                    Some(_) => rhs,
                };
                let registry = self.registry();
                array
                    .update(i, |current| store(&registry, op, current, Some(&element), rhs))
                    .unwrap_or_else(|| Err(out_of_bounds(i, array.len())))
            }
            _ => Err(BindingError::InvalidTarget.into()),
        }
    }

    /// Assign a name, declaring it untyped in the innermost scope if it is
    /// unbound and loose mode allows that.
    fn assign_name(&mut self, name: &str, op: Option<BinaryOp>, rhs: Value) -> Result<Value, EvalError> {
        let scope = self.scope()?;
        let registry = self.registry();
        let rhs = self.convert_for(op, scope.lookup(name), rhs)?;

        let stored = scope.update_variable(name, |var| store(&registry, op, var.value(), var.ty(), rhs.clone()))?;
        if let Some(value) = stored {
            return Ok(value);
        }
        if op.is_some() || self.runtime.options.strict_java {
            return Err(ResolutionError::UndefinedVariable {
                name: name.to_string(),
            }
            .into());
        }
        if rhs.is_void() {
            return Err(CoercionError::VoidAssign {
                target: name.to_string(),
            }
            .into());
        }
        tracing::trace!(name, "implicit declaration");
        scope.declare_local(Variable::untyped(name, rhs.clone()))?;
        Ok(rhs)
    }

    /// Converting a lambda may consult scopes, so a plain assignment
    /// converts to the slot's type before any table lock is taken. The
    /// conversion under the lock then leaves the value unchanged.
    fn convert_for(&self, op: Option<BinaryOp>, slot: Option<Variable>, rhs: Value) -> Result<Value, EvalError> {
        match (op, slot) {
            (None, Some(var)) if !(var.is_final() && var.is_initialized()) => match var.ty() {
                Some(ty) => coerce_assign(&self.runtime.registry, rhs, ty),
                None => Ok(rhs),
            },
            _ => Ok(rhs),
        }
    }

    /// A snapshot of the binding `receiver.name` refers to, if it exists.
    fn member_variable(&self, receiver: &Value, name: &str) -> Option<Variable> {
        let registry = &self.runtime.registry;
        match receiver {
            Value::Object(Object::Instance(instance)) => instance.field_variable(name).or_else(|| {
                registry
                    .find_static_field_owner(instance.class(), name)?
                    .static_variable(name)
            }),
            Value::Object(Object::Class(class)) => registry.find_static_field_owner(class, name)?.static_variable(name),
            Value::Object(Object::This(scope)) => scope.lookup(name),
            _ => None,
        }
    }

    /// Read-modify-write of a member of `receiver` under its owner's lock.
    /// `Ok(None)` means a scripted object has no such binding yet.
    fn update_member<F>(&self, receiver: &Value, name: &str, compute: F) -> Result<Option<Value>, EvalError>
    where
        F: FnOnce(&Value, Option<&Type>) -> Result<Value, EvalError>,
    {
        let registry = &self.runtime.registry;
        match receiver {
            Value::Null => Err(null_pointer(format!(
                "Cannot assign field \"{}\" because value is null",
                name
            ))),
            Value::Void => Err(ResolutionError::VoidTarget {
                name: name.to_string(),
            }
            .into()),
            Value::Object(Object::Instance(instance)) if instance.has_field(name) => instance
                .update_field(name, |var| compute(var.value(), var.ty()))
                .transpose(),
            Value::Object(Object::Instance(instance)) => update_static(registry, instance.class(), name, compute),
            Value::Object(Object::Class(class)) => update_static(registry, class, name, compute),
            Value::Object(Object::This(scope)) => scope.update_variable(name, |var| compute(var.value(), var.ty())),
            Value::Object(Object::Array(_)) if name == "length" => Err(BindingError::FinalReassignment {
                name: name.to_string(),
            }
            .into()),
            other => Err(no_such_field(&other.type_name(), name)),
        }
    }

    fn increment(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, EvalError> {
        let registry = self.registry();
        let mut previous = Value::Void;
        let mut bump = |current: &Value, ty: Option<&Type>| -> Result<Value, EvalError> {
            previous = current.clone();
            let next = operators::step(op, current)?;
            match ty {
                Some(ty) => coerce_cast(&registry, next, ty),
                None => Ok(next),
            }
        };

        let next = match operand {
            Expr::Ident(name) => self
                .scope()?
                .update_variable(name, |var| bump(var.value(), var.ty()))?
                .ok_or_else(|| ResolutionError::UndefinedVariable {
                    name: name.to_string(),
                })?,
            Expr::Field { target, name } => {
                let receiver = self.eval_terminal(target)?;
                self.update_member(&receiver, name, |current, ty| bump(current, ty))?
                    .ok_or_else(|| no_such_field(&receiver.type_name(), name))?
            }
            Expr::Index { target, index } => {
                let target = self.eval_terminal(target)?;
                let index = self.eval_expr(index)?;
                let (array, i) = self.array_slot(&target, &index)?;
                let element = array.element_type().clone();
                array
                    .update(i, |current| bump(current, Some(&element)))
                    .unwrap_or_else(|| Err(out_of_bounds(i, array.len())))?
            }
            _ => return Err(BindingError::InvalidTarget.into()),
        };

        Ok(match op {
            UnaryOp::PostInc | UnaryOp::PostDec => previous,
            _ => next,
        })
    }

    // ============================================================================
    // Calls
    // ============================================================================

    fn eval_call(&mut self, target: Option<&Expr>, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        match target {
            None => {
                let args = self.eval_args(args)?;
                self.call_unqualified(name, args)
            }
            Some(Expr::Super) => {
                let args = self.eval_args(args)?;
                self.call_super(name, args)
            }
            Some(target) => {
                let receiver = self.eval_terminal(target)?;
                if receiver.is_void() {
                    return Err(match target {
                        Expr::Ident(var) => ResolutionError::UndefinedVariable {
                            name: var.to_string(),
                        },
                        _ => ResolutionError::VoidTarget {
                            name: name.to_string(),
                        },
                    }
                    .into());
                }
                let args = self.eval_args(args)?;
                self.invoke_method(receiver, name, args)
            }
        }
    }

    /// `name(args)`: script methods in scope, then a callable variable, then
    /// members of the enclosing class.
    fn call_unqualified(&mut self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        let scope = self.scope()?;
        if let Some((owner, entries)) = scope.find_methods(name) {
            return self.invoke_entries(owner, &entries, args);
        }
        if let Some(callee @ Value::Object(Object::Lambda(_) | Object::Functional(_))) = scope.lookup_variable(name) {
            return self.call_value(callee, args, name);
        }
        if let Some(instance) = scope.enclosing_instance() {
            return self.invoke_method(Value::Object(Object::Instance(instance)), name, args);
        }
        if let Some(class) = scope.enclosing_class() {
            return self.invoke_static(&class, name, args);
        }
        Err(ResolutionError::UndefinedMethod {
            name: name.to_string(),
        }
        .into())
    }

    fn call_super(&mut self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        let scope = self.scope()?;
        let Some(instance) = scope.enclosing_instance() else {
            let receiver = self.super_value()?;
            return self.invoke_method(receiver, name, args);
        };

        let registry = self.registry();
        let superclass = instance
            .class()
            .superclass()
            .and_then(|parent| registry.get(parent))
            .or_else(|| registry.get("Object"))
            .ok_or_else(|| InternalError::MissingBuiltin { name: "Object".into() })?;
        let methods = registry.find_methods(&superclass, name);
        let receiver = Value::Object(Object::Instance(instance));
        self.invoke_host(&receiver, &superclass, name, &methods, args, Dispatch::Super)
    }

    /// Call a callable value: a lambda or a functional-interface object.
    fn call_value(&mut self, callee: Value, args: Vec<Value>, label: &str) -> Result<Value, EvalError> {
        match callee {
            Value::Object(Object::Lambda(lambda)) => self.call_lambda(&lambda, args),
            Value::Object(Object::Functional(functional)) => {
                functional.invoke_with(args, |lambda, args| self.call_lambda(lambda, args))
            }
            Value::Null => Err(null_pointer(format!("Cannot invoke \"{}\" because it is null", label))),
            _ => Err(BindingError::NotCallable {
                name: label.to_string(),
            }
            .into()),
        }
    }

    /// Invoke a lambda or method reference with already evaluated arguments.
    pub fn call_lambda(&mut self, lambda: &Lambda, args: Vec<Value>) -> Result<Value, EvalError> {
        self.nested_call(|ev| match lambda.kind() {
            LambdaKind::Expression(decl) => ev.call_expression_lambda(lambda, decl, args),
            LambdaKind::MethodRef { receiver, name } => ev.call_method_ref(lambda, receiver, name, args),
        })
    }

    fn call_expression_lambda(&mut self, lambda: &Lambda, decl: &LambdaExpr, args: Vec<Value>) -> Result<Value, EvalError> {
        if args.len() != decl.params.len() {
            return Err(BindingError::WrongArgumentCount {
                callee: lambda.to_string(),
                expected: decl.params.len(),
                found: args.len(),
            }
            .into());
        }

        let scope = NameSpace::with_kind(&lambda.scope()?, "lambda", ScopeKind::Lambda);
        for (param, value) in decl.params.iter().zip(args) {
            let ty = param.binding_type();
            let value = match &ty {
                Some(ty) => coerce_assign(&self.runtime.registry, value, ty)?,
                None => value,
            };
            scope.declare_local(Variable::new(&param.name, ty, value, param.modifiers))?;
        }

        self.in_scope(scope, |ev| match &decl.body {
            LambdaBody::Expr(expr) => ev.eval_expr(expr),
            LambdaBody::Block(block) => Ok(match ev.exec_statements(&block.statements)? {
                Flow::Return(value) => value,
                _ => Value::Void,
            }),
        })
    }

    fn call_method_ref(
        &mut self,
        lambda: &Lambda,
        receiver: &MethodRefReceiver,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        match receiver {
            MethodRefReceiver::Scope => {
                let scope = lambda.scope()?;
                self.invoke_on_scope(scope, name, args)
            }
            MethodRefReceiver::Bound(callee @ Value::Object(Object::Lambda(_) | Object::Functional(_))) => {
                self.call_value(callee.clone(), args, name)
            }
            MethodRefReceiver::Bound(value) => self.invoke_method(value.clone(), name, args),
            MethodRefReceiver::Type(Type::Array(element)) if name == "new" => match args.as_slice() {
                [len] => {
                    let len = len.as_int().ok_or_else(|| CoercionError::IncompatibleAssign {
                        from: len.type_name(),
                        target: "int".into(),
                    })?;
                    if len < 0 {
                        return Err(EvalError::raise("NegativeArraySizeException", len.to_string()));
                    }
                    let array = Array::with_len((**element).clone(), len as usize);
                    Ok(Value::Object(Object::Array(Arc::new(array))))
                }
                _ => Err(BindingError::WrongArgumentCount {
                    callee: format!("{}[]::new", element),
                    expected: 1,
                    found: args.len(),
                }
                .into()),
            },
            MethodRefReceiver::Type(ty) if name == "new" => self.construct(ty, args),
            MethodRefReceiver::Type(ty) => {
                let class_name = ty.class_name().ok_or_else(|| ResolutionError::UnknownClass {
                    name: ty.to_string(),
                })?;
                let class = self.runtime.registry.lookup(class_name)?;
                let methods = self.runtime.registry.find_methods(&class, name);
                let statics: Vec<HostMethod> = methods.iter().filter(|m| m.signature.is_static).cloned().collect();
                let signatures: Vec<Signature> = statics.iter().map(|m| m.signature.clone()).collect();
                if !statics.is_empty() && self.select(&signatures, &args, true).is_ok() {
                    return self.invoke_host(&Value::Null, &class, name, &statics, args, Dispatch::Static);
                }

                // Unbound instance method: the first argument is the receiver.
                let mut args = args;
                if args.is_empty() {
                    return Err(ResolutionError::NoMatch {
                        name: format!("{}::{}", class.name(), name),
                        args: String::new(),
                    }
                    .into());
                }
                let receiver = args.remove(0);
                self.invoke_method(receiver, name, args)
            }
        }
    }

    /// Call `name` on `receiver` with already evaluated arguments.
    pub fn invoke_method(&mut self, receiver: Value, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        match receiver {
            Value::Null => Err(null_pointer(format!(
                "Cannot invoke \"{}()\" because value is null",
                name
            ))),
            Value::Void => Err(ResolutionError::VoidTarget {
                name: name.to_string(),
            }
            .into()),
            Value::Object(Object::Class(class)) => self.invoke_static(&class, name, args),
            Value::Object(Object::This(scope)) => self.invoke_on_scope(scope, name, args),
            Value::Object(Object::Lambda(lambda)) => self.call_lambda(&lambda, args),
            Value::Object(Object::Functional(functional)) if functional.method_name() == name => {
                functional.invoke_with(args, |lambda, args| self.call_lambda(lambda, args))
            }
            Value::Primitive(primitive) => self.invoke_virtual(Value::boxed(primitive), name, args),
            other => self.invoke_virtual(other, name, args),
        }
    }

    fn invoke_on_scope(&mut self, scope: ScopeRef, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        if let Some((owner, entries)) = scope.find_methods(name) {
            return self.invoke_entries(owner, &entries, args);
        }
        if let Some(callee @ Value::Object(Object::Lambda(_) | Object::Functional(_))) = scope.lookup_variable(name) {
            return self.call_value(callee, args, name);
        }
        self.invoke_virtual(Value::Object(Object::This(scope)), name, args)
    }

    fn invoke_static(&mut self, class: &Arc<ClassDef>, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        let methods = self.runtime.registry.find_methods(class, name);
        self.invoke_host(&Value::Null, class, name, &methods, args, Dispatch::Static)
    }

    fn invoke_virtual(&mut self, receiver: Value, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        let class = self.host_class(&receiver)?;
        let methods = self.runtime.registry.find_methods(&class, name);
        self.invoke_host(&receiver, &class, name, &methods, args, Dispatch::Instance)
    }

    /// The registered class whose methods a value responds to.
    fn host_class(&self, value: &Value) -> Result<Arc<ClassDef>, EvalError> {
        let registry = &self.runtime.registry;
        value
            .runtime_type()
            .map(|ty| ty.boxed().unwrap_or(ty))
            .and_then(|ty| ty.class_name().and_then(|name| registry.get(name)))
            .or_else(|| registry.get("Object"))
            .ok_or_else(|| EvalError::from(InternalError::MissingBuiltin { name: "Object".into() }))
    }

    /// Resolve among host methods, pass the security gate, then call.
    fn invoke_host(
        &mut self,
        receiver: &Value,
        class: &Arc<ClassDef>,
        name: &str,
        methods: &[HostMethod],
        args: Vec<Value>,
        dispatch: Dispatch,
    ) -> Result<Value, EvalError> {
        if methods.is_empty() {
            return Err(ResolutionError::UndefinedMethod {
                name: format!("{}.{}", class.name(), name),
            }
            .into());
        }
        let signatures: Vec<Signature> = methods.iter().map(|m| m.signature.clone()).collect();
        let selection = self.select(&signatures, &args, matches!(dispatch, Dispatch::Static))?;
        let method = &methods[selection.index];

        let security = &self.runtime.security;
        match dispatch {
            Dispatch::Static => security.check_invoke_static_method(class, &method.signature, &args)?,
            Dispatch::Instance => security.check_invoke_method(receiver, &method.signature, &args)?,
            Dispatch::Super => security.check_invoke_super_method(class, receiver, &method.signature, &args)?,
        }

        let Some(body) = &method.body else {
            return Err(ResolutionError::UndefinedMethod {
                name: method.signature.to_string(),
            }
            .into());
        };
        let args = self.bind_args(&method.signature, args, selection)?;
        self.check_interrupt()?;
        let result = body(receiver, &args)?;
        self.coerce_return(result, Some(&method.return_type))
    }

    /// Resolve among script and native methods found in a scope.
    fn invoke_entries(&mut self, owner: ScopeRef, entries: &[MethodEntry], args: Vec<Value>) -> Result<Value, EvalError> {
        let signatures: Vec<Signature> = entries.iter().map(MethodEntry::signature).collect();
        let selection = self.select(&signatures, &args, false)?;
        let signature = &signatures[selection.index];
        let args = self.bind_args(signature, args, selection)?;

        match &entries[selection.index] {
            MethodEntry::Script(decl) => self.invoke_script(owner, decl, args),
            MethodEntry::Native(native) => {
                self.check_interrupt()?;
                let result = native.call(&args)?;
                self.coerce_return(result, Some(native.return_type()))
            }
        }
    }

    fn invoke_script(&mut self, owner: ScopeRef, decl: &Arc<MethodDecl>, args: Vec<Value>) -> Result<Value, EvalError> {
        self.nested_call(|ev| {
            let scope = NameSpace::with_kind(&owner, &decl.name, ScopeKind::Method);
            for (param, value) in decl.params.iter().zip(args) {
                scope.declare_local(Variable::new(&param.name, param.binding_type(), value, param.modifiers))?;
            }
            let flow = ev.in_scope(scope, |ev| ev.exec_statements(&decl.body.statements))?;
            let value = match flow {
                Flow::Return(value) => value,
                _ => Value::Void,
            };
            ev.coerce_return(value, decl.return_type.as_ref())
        })
    }

    fn select(&self, signatures: &[Signature], args: &[Value], static_only: bool) -> Result<Selection, EvalError> {
        let ctx = ResolveContext {
            static_only,
            caller_class: self
                .stack
                .top()
                .ok()
                .and_then(|scope| scope.enclosing_class())
                .map(|class| class.name_arc()),
            strict: self.runtime.options.strict_java,
        };
        Ok(resolver::resolve(
            &self.runtime.registry,
            signatures,
            &ArgType::of_all(args),
            &ctx,
        )?)
    }

    /// Convert arguments to the chosen signature's parameter types, packing
    /// trailing arguments into the varargs array when the selection says so.
    fn bind_args(&self, signature: &Signature, args: Vec<Value>, selection: Selection) -> Result<Vec<Value>, EvalError> {
        let registry = &self.runtime.registry;
        let loose = selection.phase == Phase::Loose;
        let bind = |value: Value, param: Option<&Type>| -> Result<Value, EvalError> {
            match param {
                None => Ok(value),
                Some(Type::Primitive(kind)) if loose && value.is_null() => Ok(Value::Primitive(kind.default_value())),
                Some(ty) => coerce_assign(registry, value, ty),
            }
        };

        if !selection.packs_varargs {
            return args
                .into_iter()
                .zip(&signature.params)
                .map(|(value, param)| bind(value, param.as_ref()))
                .collect();
        }

        let element = match signature.params.last() {
            Some(Some(Type::Array(element))) => (**element).clone(),
            _ => Type::object(),
        };
        let fixed = signature.params.len().saturating_sub(1);
        let mut args = args;
        let split = fixed.min(args.len());
        let rest = args.split_off(split);
        let mut bound = args
            .into_iter()
            .zip(&signature.params)
            .map(|(value, param)| bind(value, param.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let packed = rest
            .into_iter()
            .map(|value| bind(value, Some(&element)))
            .collect::<Result<Vec<_>, _>>()?;
        bound.push(Value::array(element, packed));
        Ok(bound)
    }

    fn coerce_return(&self, value: Value, return_type: Option<&Type>) -> Result<Value, EvalError> {
        match return_type {
            None => Ok(value),
            Some(Type::Void) => Ok(Value::Void),
            Some(ty) => coerce_assign(&self.runtime.registry, value, ty),
        }
    }

    /// `new T(args)`. The security gate runs before any side effect.
    fn construct(&mut self, ty: &Type, args: Vec<Value>) -> Result<Value, EvalError> {
        let name = ty.class_name().ok_or_else(|| ResolutionError::UnknownClass {
            name: ty.to_string(),
        })?;
        let class = self.runtime.registry.lookup(name)?;
        if !class.is_instantiable() {
            return Err(ResolutionError::AbstractInstantiation {
                class: class.name().to_string(),
            }
            .into());
        }

        let constructors = class.constructors();
        if constructors.is_empty() {
            if !args.is_empty() {
                return Err(ResolutionError::NoMatch {
                    name: class.name().to_string(),
                    args: resolver::describe_args(&ArgType::of_all(&args)),
                }
                .into());
            }
            let signature = Signature::new(class.name(), Vec::new()).with_declaring_type(class.name());
            self.runtime.security.check_construct(&class, &signature, &args)?;
            return Ok(Value::Object(Object::Instance(self.instantiate(&class))));
        }

        let signatures: Vec<Signature> = constructors.iter().map(|c| c.signature.clone()).collect();
        let selection = self.select(&signatures, &args, false)?;
        let constructor = &constructors[selection.index];
        self.runtime
            .security
            .check_construct(&class, &constructor.signature, &args)?;

        let args = self.bind_args(&constructor.signature, args, selection)?;
        let receiver = Value::Object(Object::Instance(self.instantiate(&class)));
        let result = match &constructor.body {
            Some(body) => body(&receiver, &args)?,
            None => Value::Void,
        };
        tracing::trace!(class = class.name(), "constructed instance");
        Ok(if result.is_void() { receiver } else { result })
    }
}

fn flow_value(flow: Flow) -> Value {
    match flow {
        Flow::Normal(value) | Flow::Return(value) => value,
        Flow::Break | Flow::Continue => Value::Void,
    }
}

/// The value an assignment stores, given the slot's current value and
/// declared type. Compound assignment casts back to the slot type.
fn store(
    registry: &ClassRegistry,
    op: Option<BinaryOp>,
    current: &Value,
    ty: Option<&Type>,
    rhs: Value,
) -> Result<Value, EvalError> {
    match (op, ty) {
        (Some(op), Some(ty)) => coerce_cast(registry, operators::binary(op, current, &rhs)?, ty),
        (Some(op), None) => operators::binary(op, current, &rhs),
        (None, Some(ty)) => coerce_assign(registry, rhs, ty),
        (None, None) if rhs.is_void() => Err(CoercionError::VoidAssign {
            target: "variable".into(),
        }
        .into()),
        (None, None) => Ok(rhs),
    }
}

fn update_static<F>(registry: &ClassRegistry, class: &Arc<ClassDef>, name: &str, compute: F) -> Result<Option<Value>, EvalError>
where
    F: FnOnce(&Value, Option<&Type>) -> Result<Value, EvalError>,
{
    let owner = registry
        .find_static_field_owner(class, name)
        .ok_or_else(|| no_such_field(class.name(), name))?;
    owner
        .update_static_field(name, |var| compute(var.value(), var.ty()))
        .transpose()
}

fn build_array(element: &Type, lengths: &[usize], extra: usize) -> Value {
    match lengths {
        [] => Value::Null,
        [len, rest @ ..] => {
            let component = (0..rest.len() + extra).fold(element.clone(), |ty, _| Type::array_of(ty));
            if rest.is_empty() {
                Value::Object(Object::Array(Arc::new(Array::with_len(component, *len))))
            } else {
                let rows = (0..*len).map(|_| build_array(element, rest, extra)).collect();
                Value::array(component, rows)
            }
        }
    }
}

fn null_pointer(message: impl Into<String>) -> EvalError {
    EvalError::raise("NullPointerException", message)
}

fn out_of_bounds(index: usize, len: usize) -> EvalError {
    EvalError::raise(
        "ArrayIndexOutOfBoundsException",
        format!("Index {} out of bounds for length {}", index, len),
    )
}

fn no_such_field(class: &str, name: &str) -> EvalError {
    ResolutionError::NoSuchField {
        class: class.to_string(),
        name: name.to_string(),
    }
    .into()
}
