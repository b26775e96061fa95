#[macro_use]
mod cases;

use cases::*;
use pretty_assertions::assert_eq;

fn call_slot(k: i32) -> Stmt {
    expr(invoke(index(ident("lambdas"), int(k)), vec![]))
}

fn call_all() -> Vec<Stmt> {
    (0..4).map(call_slot).collect()
}

// for (i = 0; i < 4; i++) { num = i * 3; lambdas[i] = () -> num; }
fn per_iteration_capture() -> Vec<Stmt> {
    vec![
        expr(set("lambdas", new_array(Type::object(), vec![int(4)]))),
        count_loop(
            4,
            block(vec![
                expr(set("num", times(ident("i"), int(3)))),
                expr(assign(index(ident("lambdas"), ident("i")), lambda(&[], ident("num")))),
            ]),
        ),
    ]
}

#[test]
fn test_each_iteration_captures_its_own_binding() {
    let interpreter = interpreter();
    interpreter.eval(&program(per_iteration_capture())).unwrap();

    let results: Vec<Value> = call_all()
        .into_iter()
        .map(|call| interpreter.eval(&program(vec![call])).unwrap())
        .collect();
    assert_eq!(
        results,
        vec![Value::int(0), Value::int(3), Value::int(6), Value::int(9)]
    );
}

#[test]
fn test_shared_loop_index_is_read_after_the_loop() {
    // for (i = 0; i < 4; i++) { lambdas[i] = () -> i * 3; }
    let interpreter = interpreter();
    interpreter
        .eval(&program(vec![
            expr(set("lambdas", new_array(Type::object(), vec![int(4)]))),
            count_loop(
                4,
                expr(assign(
                    index(ident("lambdas"), ident("i")),
                    lambda(&[], times(ident("i"), int(3))),
                )),
            ),
        ]))
        .unwrap();

    for call in call_all() {
        assert_eq!(interpreter.eval(&program(vec![call])).unwrap(), Value::int(12));
    }
}

test_case!(
    captured_loop_index_cannot_be_mutated,
    program: [
        // for (i = 0; i < 4; i++) lambdas[i] = () -> i++ * 3;
        expr(set("lambdas", new_array(Type::object(), vec![int(4)]))),
        count_loop(
            4,
            expr(assign(
                index(ident("lambdas"), ident("i")),
                lambda(&[], times(post_inc(ident("i")), int(3))),
            )),
        ),
        call_slot(2),
    ],
    error: EvalError::Binding(BindingError::CapturedReassignment { ref name }) if name == "i",
);

test_case!(
    lambda_locals_are_writable,
    program: [
        decl(Type::int(), "base", Some(int(10))),
        expr(set(
            "f",
            lambda_block(&["n"], vec![
                decl(Type::int(), "acc", Some(ident("base"))),
                expr(assign_op(BinaryOp::Add, ident("acc"), ident("n"))),
                expr(assign_op(BinaryOp::Add, ident("n"), int(1))),
                ret(binary(BinaryOp::Add, ident("acc"), ident("n"))),
            ]),
        )),
        expr(invoke(ident("f"), vec![int(5)])),
    ],
    value: Value::int(21),
);

test_case!(
    bound_method_reference_keeps_its_receiver,
    program: [
        // x = "abc"; f = x::length; x = "zz"; f()
        expr(set("x", string("abc"))),
        expr(set("f", method_ref(ident("x"), "length"))),
        expr(set("x", string("zz"))),
        expr(invoke(ident("f"), vec![])),
    ],
    value: Value::int(3),
);

test_case!(
    converted_method_reference_keeps_its_receiver,
    program: [
        decl(Type::string(), "x", Some(string("abcd"))),
        decl(Type::class("Supplier"), "s", Some(method_ref(ident("x"), "length"))),
        expr(set("x", string(""))),
        expr(method(ident("s"), "get", vec![])),
    ],
    value: Value::boxed(Primitive::Int(4)),
);

test_case!(
    lambda_assignment_updates_the_defining_scope,
    program: [
        // total = 0; add = (x) -> { total = total + x; }; add(5); add(2); total
        expr(set("total", int(0))),
        expr(set(
            "add",
            lambda_block(&["x"], vec![
                expr(set("total", binary(BinaryOp::Add, ident("total"), ident("x")))),
            ]),
        )),
        expr(invoke(ident("add"), vec![int(5)])),
        expr(invoke(ident("add"), vec![int(2)])),
        expr(ident("total")),
    ],
    value: Value::int(7),
);

test_case!(
    captured_final_cannot_be_reassigned,
    program: [
        final_decl(Some(Type::int()), "limit", Some(int(3))),
        expr(set("bump", lambda(&[], assign_op(BinaryOp::Add, ident("limit"), int(1))))),
        expr(invoke(ident("bump"), vec![])),
    ],
    error: EvalError::Binding(BindingError::FinalReassignment { ref name }) if name == "limit",
);
