#[macro_use]
mod cases;

use cases::*;
use jolt::ClassBuilder;
use pretty_assertions::assert_eq;

fn script_foo(param: &str) -> Stmt {
    method_decl(
        "foo",
        vec![typed_param(Type::class(param), "x")],
        Some(Type::string()),
        vec![ret(string(param))],
    )
}

fn boxed_nine() -> jolt::ast::Expr {
    cast(Type::class("Integer"), int(9))
}

test_case!(
    integer_beats_number_declared_first,
    program: [
        script_foo("Number"),
        script_foo("Integer"),
        expr(call("foo", vec![boxed_nine()])),
    ],
    value: Value::string("Integer"),
);

test_case!(
    integer_beats_number_declared_last,
    program: [
        script_foo("Integer"),
        script_foo("Number"),
        expr(call("foo", vec![boxed_nine()])),
    ],
    value: Value::string("Integer"),
);

test_case!(
    double_falls_back_to_number,
    program: [
        script_foo("Integer"),
        script_foo("Number"),
        expr(call("foo", vec![cast(Type::class("Double"), double(1.5))])),
    ],
    value: Value::string("Number"),
);

test_case!(
    unrelated_overloads_are_ambiguous_for_null,
    program: [
        script_foo("Integer"),
        script_foo("String"),
        expr(call("foo", vec![null()])),
    ],
    error: EvalError::Resolution(ResolutionError::Ambiguous { .. }),
);

test_case!(
    no_applicable_overload,
    program: [
        script_foo("Integer"),
        expr(call("foo", vec![string("nine")])),
    ],
    error: EvalError::Resolution(ResolutionError::NoMatch { .. }),
);

fn host_with(order: [&'static str; 2]) -> Interpreter {
    Interpreter::new(InterpreterOptions::default(), |env| {
        let mut class = ClassBuilder::class("Printer");
        for param in order {
            class = class.static_method("foo", &[Type::class(param)], Type::string(), move |_, _| {
                Ok(Value::string(param))
            });
        }
        env.class(class.build());
    })
}

#[test]
fn test_host_overloads_ignore_declaration_order() {
    let script = program(vec![expr(method(ident("Printer"), "foo", vec![boxed_nine()]))]);
    for order in [["Integer", "Number"], ["Number", "Integer"]] {
        let result = host_with(order).eval(&script).unwrap();
        assert_eq!(result, Value::string("Integer"), "declared as {order:?}");
    }
}

#[test]
fn test_primitive_argument_prefers_widening_over_boxing() {
    let interpreter = Interpreter::new(InterpreterOptions::default(), |env| {
        env.class(
            ClassBuilder::class("Sink")
                .static_method("take", &[Type::long()], Type::string(), |_, _| Ok(Value::string("long")))
                .static_method("take", &[Type::class("Integer")], Type::string(), |_, _| {
                    Ok(Value::string("Integer"))
                })
                .build(),
        );
    });
    let script = program(vec![expr(method(ident("Sink"), "take", vec![int(1)]))]);
    assert_eq!(interpreter.eval(&script).unwrap(), Value::string("long"));
}
