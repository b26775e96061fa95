#[macro_use]
mod cases;

use cases::*;
use jolt::{ClassBuilder, NativeFunction};
use pretty_assertions::assert_eq;

fn host() -> Interpreter {
    Interpreter::new(InterpreterOptions::default(), |env| {
        env.register("greeting", Value::string("hi"));
        env.function(NativeFunction::new("twice", &[Type::int()], Type::int(), |args| {
            Ok(Value::int(args[0].as_int().unwrap_or(0) * 2))
        }));
        env.function(NativeFunction::new("twice", &[Type::string()], Type::string(), |args| {
            let s = args[0].as_str().unwrap_or_default();
            Ok(Value::string(&format!("{s}{s}")))
        }));
        env.class(
            ClassBuilder::class("Gate")
                .static_method("open", &[Type::boolean()], Type::string(), |_, args| {
                    if args[0].as_bool() == Some(true) {
                        Ok(Value::string("open"))
                    } else {
                        Err(EvalError::raise("IllegalStateException", "gate is locked"))
                    }
                })
                .build(),
        );
    })
}

#[test]
fn test_environment_registrations_are_visible() {
    let interpreter = host();
    let script = program(vec![expr(binary(
        BinaryOp::Add,
        call("twice", vec![ident("greeting")]),
        call("twice", vec![int(4)]),
    ))]);
    assert_eq!(interpreter.eval(&script).unwrap(), Value::string("hihi8"));
}

#[test]
fn test_set_get_and_unset() {
    let interpreter = interpreter();
    interpreter.set("x", Value::int(3)).unwrap();
    assert_eq!(interpreter.get("x"), Some(Value::int(3)));

    // Untyped globals take any value.
    interpreter.set("x", Value::string("three")).unwrap();
    assert_eq!(interpreter.get("x"), Some(Value::string("three")));

    assert!(interpreter.unset("x"));
    assert_eq!(interpreter.get("x"), None);
    assert!(!interpreter.unset("x"));
}

#[test]
fn test_typed_globals_coerce_on_the_way_in() {
    let interpreter = interpreter();
    interpreter.set_typed("total", Type::long(), Value::int(5)).unwrap();
    assert_eq!(interpreter.get("total"), Some(Value::long(5)));

    interpreter.set("total", Value::byte(2)).unwrap();
    assert_eq!(interpreter.get("total"), Some(Value::long(2)));

    let err = interpreter.set("total", Value::string("many")).unwrap_err();
    assert!(matches!(err, EvalError::Coercion(CoercionError::IncompatibleAssign { .. })), "{err:?}");
    assert!(interpreter.set_typed("n", Type::int(), Value::Null).is_err());
}

#[test]
fn test_globals_persist_between_evaluations() {
    let interpreter = interpreter();
    interpreter
        .eval(&program(vec![decl(Type::int(), "hits", Some(int(1)))]))
        .unwrap();
    interpreter
        .eval(&program(vec![expr(post_inc(ident("hits")))]))
        .unwrap();
    assert_eq!(interpreter.get("hits"), Some(Value::int(2)));
}

#[test]
fn test_host_exception_is_catchable_by_class() {
    let interpreter = host();
    let script = program(vec![
        decl(Type::string(), "state", None),
        try_(
            vec![expr(set("state", method(ident("Gate"), "open", vec![boolean(false)])))],
            vec![catch(
                Modifiers::empty(),
                vec![Type::class("RuntimeException")],
                "e",
                vec![expr(set("state", method(ident("e"), "getMessage", vec![])))],
            )],
            None,
        ),
        expr(ident("state")),
    ]);
    assert_eq!(interpreter.eval(&script).unwrap(), Value::string("gate is locked"));
}

#[test]
fn test_uncaught_host_exception_surfaces_as_thrown() {
    let interpreter = host();
    let err = interpreter
        .eval(&program(vec![expr(method(ident("Gate"), "open", vec![boolean(false)]))]))
        .unwrap_err();
    assert!(err.is_catchable());
    let thrown = err.thrown_value().map(|v| v.to_string());
    assert_eq!(thrown.as_deref(), Some("IllegalStateException: gate is locked"));
}

test_case!(
    strict_mode_off_by_default,
    program: [
        expr(set("implicit", int(1))),
        if_(ident("implicit"), expr(string("truthy")), None),
    ],
    value: Value::string("truthy"),
);

#[test]
fn test_strict_mode_rejects_script_conveniences() {
    let options = InterpreterOptions {
        execution: jolt::ExecutionOptions {
            strict_java: true,
            ..jolt::ExecutionOptions::default()
        },
    };
    let interpreter = Interpreter::new(options, |_| {});

    let err = interpreter.eval(&program(vec![expr(set("implicit", int(1)))])).unwrap_err();
    assert!(matches!(err, EvalError::Resolution(ResolutionError::UndefinedVariable { .. })), "{err:?}");

    let err = interpreter
        .eval(&program(vec![if_(int(1), expr(int(1)), None)]))
        .unwrap_err();
    assert!(matches!(err, EvalError::Coercion(CoercionError::NotBoolean { .. })), "{err:?}");
}

#[test]
fn test_eval_with_uses_the_given_handle() {
    let interpreter = interpreter();
    let pending = jolt::InterruptHandle::new();
    pending.interrupt();
    let spin = program(vec![while_(boolean(true), block(vec![]))]);

    let err = interpreter.eval_with(&spin, &pending).unwrap_err();
    assert!(matches!(err, EvalError::Interrupted), "{err:?}");
    assert!(!pending.is_interrupted());
    assert!(!interpreter.interrupt_handle().is_interrupted());
    assert_eq!(interpreter.eval(&program(vec![expr(int(1))])).unwrap(), Value::int(1));
}
