use alloc::sync::Arc;

use super::{MethodEntry, Modifiers, NameSpace, ScopeKind, Variable};
use crate::evaluator::{BindingError, EvalError};
use crate::types::{ClassBuilder, Type};
use crate::values::{Instance, NativeFunction, Value};
use pretty_assertions::assert_eq;

fn int_var(name: &str, value: i32) -> Variable {
    Variable::new(name, Some(Type::int()), Value::int(value), Modifiers::empty())
}

#[test]
fn test_lookup_walks_to_parent() {
    let global = NameSpace::new_root("global");
    global.declare_local(int_var("x", 1)).unwrap();
    let block = NameSpace::new_child(&global, "block");

    assert_eq!(block.lookup_variable("x"), Some(Value::int(1)));
    assert!(!block.has_local("x"));
    assert_eq!(block.lookup("missing").map(|v| v.name().to_string()), None);
}

#[test]
fn test_child_declaration_shadows_parent() {
    let global = NameSpace::new_root("global");
    global.declare_local(int_var("x", 1)).unwrap();
    let block = NameSpace::new_child(&global, "block");
    block.declare_local(int_var("x", 2)).unwrap();

    assert_eq!(block.lookup_variable("x"), Some(Value::int(2)));
    assert_eq!(global.lookup_variable("x"), Some(Value::int(1)));
}

#[test]
fn test_update_variable_writes_owning_scope() {
    let global = NameSpace::new_root("global");
    global.declare_local(int_var("count", 0)).unwrap();
    let inner = NameSpace::new_child(&NameSpace::new_child(&global, "a"), "b");

    let stored = inner
        .update_variable("count", |var| Ok(Value::int(var.value().as_int().unwrap_or(0) + 5)))
        .unwrap();
    assert_eq!(stored, Some(Value::int(5)));
    assert_eq!(global.lookup_variable("count"), Some(Value::int(5)));
    assert!(!inner.has_local("count"));
}

#[test]
fn test_update_unbound_name_returns_none() {
    let global = NameSpace::new_root("global");
    let result = global.update_variable("nope", |_| Ok(Value::int(1))).unwrap();
    assert_eq!(result, None);
}

#[test]
fn test_final_accepts_one_assignment() {
    let global = NameSpace::new_root("global");
    global
        .declare_local(Variable::uninitialized("f", Some(Type::int()), Modifiers::FINAL))
        .unwrap();
    assert_eq!(global.lookup_variable("f"), Some(Value::int(0)));

    global.update_variable("f", |_| Ok(Value::int(3))).unwrap();
    let err = global.update_variable("f", |_| Ok(Value::int(4))).unwrap_err();
    assert!(matches!(err, EvalError::Binding(BindingError::FinalReassignment { .. })), "{err:?}");
    assert_eq!(global.lookup_variable("f"), Some(Value::int(3)));
}

#[test]
fn test_initialized_final_cannot_be_redeclared() {
    let global = NameSpace::new_root("global");
    global
        .declare_local(Variable::new("k", None, Value::int(1), Modifiers::FINAL))
        .unwrap();
    assert_eq!(
        global.declare_local(int_var("k", 2)),
        Err(BindingError::FinalRedeclaration { name: "k".into() })
    );
    // A plain variable may be re-declared in the same scope.
    global.declare_local(int_var("p", 1)).unwrap();
    global.declare_local(int_var("p", 2)).unwrap();
    assert_eq!(global.lookup_variable("p"), Some(Value::int(2)));
}

#[test]
fn test_lambda_writes_reach_captured_scope() {
    let global = NameSpace::new_root("global");
    global.declare_local(int_var("outer", 1)).unwrap();
    let invocation = NameSpace::with_kind(&global, "lambda", ScopeKind::Lambda);
    invocation.declare_local(int_var("param", 7)).unwrap();

    invocation.update_variable("outer", |_| Ok(Value::int(2))).unwrap();
    assert_eq!(global.lookup_variable("outer"), Some(Value::int(2)));
    invocation.update_variable("param", |_| Ok(Value::int(8))).unwrap();
    assert_eq!(invocation.lookup_variable("param"), Some(Value::int(8)));
}

#[test]
fn test_for_init_bindings_are_read_only_to_lambdas() {
    let global = NameSpace::new_root("global");
    let init = NameSpace::with_kind(&global, "for", ScopeKind::ForInit);
    init.declare_local(int_var("i", 0)).unwrap();
    global
        .declare_local(Variable::new("limit", Some(Type::int()), Value::int(3), Modifiers::FINAL))
        .unwrap();

    // The loop itself still advances its own index.
    let iteration = NameSpace::new_child(&init, "iteration");
    iteration.update_variable("i", |_| Ok(Value::int(1))).unwrap();
    assert_eq!(init.lookup_variable("i"), Some(Value::int(1)));

    let invocation = NameSpace::with_kind(&iteration, "lambda", ScopeKind::Lambda);
    assert_eq!(invocation.lookup_variable("i"), Some(Value::int(1)));
    let err = invocation.update_variable("i", |_| Ok(Value::int(2))).unwrap_err();
    assert!(
        matches!(err, EvalError::Binding(BindingError::CapturedReassignment { ref name }) if name == "i"),
        "{err:?}"
    );
    let err = invocation.update_variable("limit", |_| Ok(Value::int(4))).unwrap_err();
    assert!(
        matches!(err, EvalError::Binding(BindingError::FinalReassignment { ref name }) if name == "limit"),
        "{err:?}"
    );
    assert_eq!(init.lookup_variable("i"), Some(Value::int(1)));
}

#[test]
fn test_instance_scope_resolves_fields() {
    let class = Arc::new(ClassBuilder::class("Counter").field("n", Type::int()).build());
    let instance = Arc::new(Instance::new(
        class.clone(),
        vec![Variable::new("n", Some(Type::int()), Value::int(0), Modifiers::empty())],
    ));
    let global = NameSpace::new_root("global");
    let statics = NameSpace::new_class_static(&global, class.clone());
    let members = NameSpace::new_class_instance(&statics, instance.clone());
    let body = NameSpace::with_kind(&members, "method", ScopeKind::Method);

    assert_eq!(body.lookup_variable("n"), Some(Value::int(0)));
    body.update_variable("n", |_| Ok(Value::int(9))).unwrap();
    assert_eq!(instance.field("n"), Some(Value::int(9)));
    assert_eq!(body.enclosing_class().map(|c| c.name().to_string()), Some("Counter".into()));
    assert!(body.enclosing_instance().is_some_and(|i| Arc::ptr_eq(&i, &instance)));
}

#[test]
fn test_methods_resolve_in_nearest_declaring_scope() {
    let global = NameSpace::new_root("global");
    let native = |name: &str, params: &[Type]| {
        MethodEntry::Native(Arc::new(NativeFunction::new(name, params, Type::int(), |_| {
            Ok(Value::int(0))
        })))
    };
    global.declare_method(native("f", &[Type::int()]));
    global.declare_method(native("f", &[Type::string()]));
    // Same parameter types replace the earlier overload.
    global.declare_method(native("f", &[Type::int()]));

    let block = NameSpace::new_child(&global, "block");
    let (owner, overloads) = block.find_methods("f").unwrap();
    assert!(Arc::ptr_eq(&owner, &global));
    assert_eq!(overloads.len(), 2);
    assert!(block.find_methods("g").is_none());
}

#[test]
fn test_this_scope_skips_blocks_and_lambdas() {
    let global = NameSpace::new_root("global");
    let method = NameSpace::with_kind(&global, "m", ScopeKind::Method);
    let block = NameSpace::new_child(&method, "block");
    let lambda = NameSpace::with_kind(&block, "lambda", ScopeKind::Lambda);

    assert!(Arc::ptr_eq(&lambda.this_scope(), &method));
    assert!(Arc::ptr_eq(&global.this_scope(), &global));
}

#[test]
fn test_unset_removes_nearest_binding() {
    let global = NameSpace::new_root("global");
    global.declare_local(int_var("x", 1)).unwrap();
    let block = NameSpace::new_child(&global, "block");
    block.set_local_variable("x", Value::int(2)).unwrap();

    assert!(block.unset("x"));
    assert_eq!(block.lookup_variable("x"), Some(Value::int(1)));
    assert!(block.unset("x"));
    assert!(!block.unset("x"));
    assert_eq!(global.variable_names(), Vec::<alloc::string::String>::new());
}
