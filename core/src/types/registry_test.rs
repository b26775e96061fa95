use super::{ClassBuilder, ClassKind, ClassRegistry};
use crate::evaluator::{BindingError, EvalError, ResolutionError};
use crate::scope::Modifiers;
use crate::types::Type;
use crate::values::Value;
use pretty_assertions::assert_eq;

fn names(classes: &[alloc::sync::Arc<super::ClassDef>]) -> Vec<&str> {
    classes.iter().map(|c| c.name()).collect()
}

#[test]
fn test_builtins_are_registered() {
    let registry = ClassRegistry::new();
    for name in ["Object", "String", "Integer", "Math", "Runnable", "RuntimeException"] {
        assert!(registry.contains(name), "missing {name}");
    }
    assert!(ClassRegistry::empty().class_names().is_empty());
}

#[test]
fn test_implicit_package_is_stripped() {
    let registry = ClassRegistry::new();
    assert!(registry.get("java.lang.Integer").is_some());
    assert!(registry.get("java.util.function.Supplier").is_some());
    assert_eq!(
        registry.lookup("Widget").unwrap_err(),
        ResolutionError::UnknownClass { name: "Widget".into() }
    );
}

#[test]
fn test_ancestors_subclass_first_object_last() {
    let registry = ClassRegistry::new();
    let npe = registry.get("NullPointerException").unwrap();
    assert_eq!(
        names(&registry.ancestors(&npe)),
        vec![
            "NullPointerException",
            "RuntimeException",
            "Exception",
            "Throwable",
            "Serializable",
            "Object"
        ]
    );
}

#[test]
fn test_subclass_relation() {
    let registry = ClassRegistry::new();
    assert!(registry.is_subclass("Integer", "Number"));
    assert!(registry.is_subclass("Integer", "Comparable"));
    assert!(registry.is_subclass("UnaryOperator", "Function"));
    assert!(registry.is_subclass("Anything", "Object"));
    assert!(!registry.is_subclass("Number", "Integer"));
    assert!(!registry.is_subclass("Character", "Number"));
}

#[test]
fn test_array_assignability_is_covariant_for_references() {
    let registry = ClassRegistry::new();
    let strings = Type::array_of(Type::string());
    let objects = Type::array_of(Type::object());
    assert!(registry.is_reference_assignable(&strings, &objects));
    assert!(!registry.is_reference_assignable(&objects, &strings));
    assert!(registry.is_reference_assignable(&Type::array_of(Type::int()), &Type::object()));
    assert!(!registry.is_reference_assignable(&Type::array_of(Type::int()), &Type::array_of(Type::long())));
    assert!(registry.is_reference_assignable(&strings, &Type::class("Cloneable")));
}

#[test]
fn test_find_methods_hides_overridden() {
    let registry = ClassRegistry::new();
    registry.register(
        ClassBuilder::class("Animal")
            .method("speak", &[], Type::string(), |_, _| Ok(Value::string("...")))
            .method("speak", &[Type::int()], Type::string(), |_, _| Ok(Value::string("......")))
            .build(),
    );
    let dog = registry.register(
        ClassBuilder::class("Dog")
            .extends("Animal")
            .method("speak", &[], Type::string(), |_, _| Ok(Value::string("woof")))
            .build(),
    );

    let found = registry.find_methods(&dog, "speak");
    assert_eq!(found.len(), 2);
    let nullary = found.iter().find(|m| m.signature.params.is_empty()).unwrap();
    assert_eq!(nullary.signature.declaring_type.as_deref(), Some("Dog"));
    let body = nullary.body.as_ref().unwrap();
    assert_eq!(body(&Value::Null, &[]).unwrap(), Value::string("woof"));
}

#[test]
fn test_functional_methods() {
    let registry = ClassRegistry::new();
    let method_name = |name: &str| {
        registry
            .functional_method_of(&Type::class(name))
            .map(|m| m.name().to_string())
    };
    assert_eq!(method_name("Runnable"), Some("run".into()));
    assert_eq!(method_name("UnaryOperator"), Some("apply".into()));
    assert_eq!(method_name("Comparable"), Some("compareTo".into()));
    // Two abstract methods.
    assert_eq!(method_name("CharSequence"), None);
    // Not an interface.
    assert_eq!(method_name("String"), None);

    registry.register(
        ClassBuilder::interface("Named")
            .abstract_method("name", &[], Type::string())
            .abstract_method("toString", &[], Type::string())
            .build(),
    );
    assert!(registry.is_functional(&Type::class("Named")));
}

#[test]
fn test_instance_fields_superclass_first() {
    let registry = ClassRegistry::new();
    registry.register(ClassBuilder::class("Base").field("id", Type::int()).build());
    let derived = registry.register(
        ClassBuilder::class("Derived")
            .extends("Base")
            .final_field("label", Type::string())
            .build(),
    );

    let fields = registry.instance_fields(&derived);
    let names: Vec<&str> = fields.iter().map(|f| &*f.name).collect();
    assert_eq!(names, vec!["id", "label"]);
    assert!(fields[1].modifiers.is_final());
    assert_eq!(fields[0].to_variable().value(), &Value::int(0));
}

#[test]
fn test_static_fields() {
    let registry = ClassRegistry::new();
    registry.register(
        ClassBuilder::class("Config")
            .static_field("LIMIT", Type::int(), Value::int(10), Modifiers::FINAL)
            .static_field("count", Type::int(), Value::int(0), Modifiers::empty())
            .build(),
    );
    let child = registry.register(ClassBuilder::class("Child").extends("Config").build());
    let owner = registry.find_static_field_owner(&child, "count").unwrap();
    assert_eq!(owner.name(), "Config");

    let updated = owner.update_static_field("count", |_| Ok(Value::int(3))).unwrap();
    assert_eq!(updated.unwrap(), Value::int(3));
    assert_eq!(owner.static_field("count"), Some(Value::int(3)));

    let err = owner
        .update_static_field("LIMIT", |_| Ok(Value::int(11)))
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, EvalError::Binding(BindingError::FinalReassignment { .. })), "{err:?}");
    assert!(owner.update_static_field("missing", |_| Ok(Value::Null)).is_none());
}

#[test]
fn test_class_kinds() {
    let registry = ClassRegistry::new();
    let number = registry.get("Number").unwrap();
    assert_eq!(number.kind(), ClassKind::Abstract);
    assert!(!number.is_instantiable());
    assert!(registry.get("Runnable").unwrap().is_interface());
    assert!(registry.get("Object").unwrap().is_instantiable());
}
