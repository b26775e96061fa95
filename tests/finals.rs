#[macro_use]
mod cases;

use cases::*;
use jolt::ClassBuilder;
use pretty_assertions::assert_eq;

test_case!(
    final_local,
    program: [
        final_decl(Some(Type::int()), "x", Some(int(1))),
        expr(set("x", int(2))),
    ],
    error: EvalError::Binding(BindingError::FinalReassignment { ref name }) if name == "x",
);

test_case!(
    blank_final_local_takes_one_assignment,
    program: [
        final_decl(Some(Type::int()), "x", None),
        expr(set("x", int(2))),
        expr(assign_op(BinaryOp::Add, ident("x"), int(1))),
    ],
    error: EvalError::Binding(BindingError::FinalReassignment { ref name }) if name == "x",
);

test_case!(
    final_loop_variable,
    program: [
        for_each(
            Modifiers::FINAL,
            Some(Type::int()),
            "v",
            array_literal(Type::int(), vec![int(1), int(2)]),
            expr(post_inc(ident("v"))),
        ),
    ],
    error: EvalError::Binding(BindingError::FinalReassignment { ref name }) if name == "v",
);

test_case!(
    final_catch_variable,
    program: [
        try_(
            vec![throw(new("RuntimeException", vec![string("boom")]))],
            vec![catch(
                Modifiers::FINAL,
                vec![Type::class("RuntimeException")],
                "e",
                vec![expr(set("e", null()))],
            )],
            None,
        ),
    ],
    error: EvalError::Binding(BindingError::FinalReassignment { ref name }) if name == "e",
);

test_case!(
    final_lambda_parameter,
    program: [
        expr(set(
            "f",
            lambda_with(vec![final_param(None, "p")], LambdaBody::Expr(assign(ident("p"), int(1)))),
        )),
        expr(invoke(ident("f"), vec![int(0)])),
    ],
    error: EvalError::Binding(BindingError::FinalReassignment { ref name }) if name == "p",
);

test_case!(
    final_method_parameter,
    program: [
        method_decl(
            "m",
            vec![final_param(Some(Type::int()), "a")],
            None,
            vec![expr(set("a", int(2)))],
        ),
        expr(call("m", vec![int(1)])),
    ],
    error: EvalError::Binding(BindingError::FinalReassignment { ref name }) if name == "a",
);

fn with_account() -> Interpreter {
    Interpreter::new(InterpreterOptions::default(), |env| {
        env.class(
            ClassBuilder::class("Account")
                .final_field("id", Type::int())
                .static_field("BANK", Type::string(), Value::string("jolt"), Modifiers::FINAL)
                .constructor(&[Type::int()], |this, args| {
                    if let Value::Object(Object::Instance(account)) = this {
                        account.set_field("id", args[0].clone())?;
                    }
                    Ok(Value::Void)
                })
                .build(),
        );
    })
}

#[test]
fn test_final_fields() {
    let interpreter = with_account();
    interpreter
        .eval(&program(vec![decl(
            Type::class("Account"),
            "a",
            Some(new("Account", vec![int(7)])),
        )]))
        .unwrap();
    assert_eq!(
        interpreter.eval(&program(vec![expr(field(ident("a"), "id"))])).unwrap(),
        Value::int(7)
    );

    let attempts = [
        (field(ident("a"), "id"), int(0), "id"),
        (field(ident("Account"), "BANK"), string("other"), "BANK"),
    ];
    for (target, value, name) in attempts {
        let err = interpreter
            .eval(&program(vec![expr(assign(target, value))]))
            .unwrap_err();
        assert!(
            matches!(&err, EvalError::Binding(BindingError::FinalReassignment { name: found }) if found == name),
            "{err:?}"
        );
    }
}
