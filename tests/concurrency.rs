#[macro_use]
mod cases;

use std::thread;
use std::time::Duration;

use cases::*;
use jolt::evaluator::ResourceExceeded;
use jolt::ExecutionOptions;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

const WORKERS: i32 = 8;
const ROUNDS: i32 = 250;

static SHARED: Lazy<Interpreter> = Lazy::new(|| {
    Interpreter::new(InterpreterOptions::default(), |env| {
        env.register("label", Value::string("shared"));
    })
});

// for (k = 0; k < ROUNDS; k++) counter++;
fn bump_counter() -> Stmt {
    for_(
        vec![expr(set("k", int(0)))],
        Some(binary(BinaryOp::Lt, ident("k"), int(ROUNDS))),
        vec![post_inc(ident("k"))],
        expr(post_inc(ident("counter"))),
    )
}

#[test]
fn test_sessions_share_globals_without_lost_updates() {
    SHARED.set_typed("counter", Type::int(), Value::int(0)).unwrap();
    let seen = Mutex::new(Vec::new());

    thread::scope(|s| {
        for n in 0..WORKERS {
            let seen = &seen;
            s.spawn(move || {
                let session = SHARED.session(&format!("worker-{n}"));
                session
                    .eval(&program(vec![expr(set("mine", int(n))), bump_counter()]))
                    .unwrap();
                seen.lock().push(session.get("mine"));
            });
        }
    });

    assert_eq!(SHARED.get("counter"), Some(Value::int(WORKERS * ROUNDS)));
    // Session locals never reach the shared scope.
    assert_eq!(SHARED.get("mine"), None);
    let mut seen: Vec<i32> = seen.into_inner().into_iter().flatten().filter_map(|v| v.as_int()).collect();
    seen.sort();
    assert_eq!(seen, (0..WORKERS).collect::<Vec<_>>());
}

#[test]
fn test_lambda_invoked_from_many_threads() {
    let interpreter = interpreter();
    interpreter
        .eval(&program(vec![
            decl(Type::int(), "base", Some(int(100))),
            decl(
                Type::class("IntUnaryOperator"),
                "offset",
                Some(lambda(&["n"], binary(BinaryOp::Add, ident("n"), ident("base")))),
            ),
        ]))
        .unwrap();

    thread::scope(|s| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|n| {
                let interpreter = &interpreter;
                s.spawn(move || {
                    let session = interpreter.session("caller");
                    session.eval(&program(vec![expr(method(ident("offset"), "applyAsInt", vec![int(n)]))]))
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            let result = handle.join().unwrap().unwrap();
            assert_eq!(result, Value::int(100 + n as i32));
        }
    });
}

#[test]
fn test_interrupt_aborts_running_script() {
    let interpreter = interpreter();
    let handle = interpreter.interrupt_handle();
    let spin = program(vec![while_(boolean(true), block(vec![]))]);

    let result = thread::scope(|s| {
        let worker = s.spawn(|| interpreter.eval(&spin));
        thread::sleep(Duration::from_millis(20));
        handle.interrupt();
        worker.join().unwrap()
    });
    assert!(matches!(result, Err(EvalError::Interrupted)), "{result:?}");

    // The abort consumed the interrupt.
    assert!(!handle.is_interrupted());
    assert_eq!(interpreter.eval(&program(vec![expr(int(1))])).unwrap(), Value::int(1));
}

#[test]
fn test_interrupt_only_reaches_its_own_session() {
    let interpreter = interpreter();
    let spinning = interpreter.session("spinning");
    let counting = interpreter.session("counting");
    let spin = program(vec![while_(boolean(true), block(vec![]))]);
    // n = 0; for (k = 0; k < 200000; k++) n++; n
    let count = program(vec![
        expr(set("n", int(0))),
        for_(
            vec![expr(set("k", int(0)))],
            Some(binary(BinaryOp::Lt, ident("k"), int(200_000))),
            vec![post_inc(ident("k"))],
            expr(post_inc(ident("n"))),
        ),
        expr(ident("n")),
    ]);

    let (aborted, finished) = thread::scope(|s| {
        let aborted = s.spawn(|| spinning.eval(&spin));
        let finished = s.spawn(|| counting.eval(&count));
        thread::sleep(Duration::from_millis(20));
        spinning.interrupt_handle().interrupt();
        (aborted.join().unwrap(), finished.join().unwrap())
    });
    assert!(matches!(aborted, Err(EvalError::Interrupted)), "{aborted:?}");
    assert_eq!(finished.unwrap(), Value::int(200_000));

    assert_eq!(spinning.eval(&program(vec![expr(int(2))])).unwrap(), Value::int(2));
}

#[test]
fn test_runaway_recursion_is_bounded() {
    let options = InterpreterOptions {
        execution: ExecutionOptions {
            max_depth: 16,
            ..ExecutionOptions::default()
        },
    };
    let interpreter = Interpreter::new(options, |_| {});
    let script = program(vec![
        method_decl(
            "down",
            vec![param("n")],
            None,
            vec![ret(call("down", vec![binary(BinaryOp::Add, ident("n"), int(1))]))],
        ),
        expr(call("down", vec![int(0)])),
    ]);

    let err = interpreter.eval(&script).unwrap_err();
    assert!(
        matches!(
            err,
            EvalError::ResourceExceeded(ResourceExceeded::StackOverflow { max_depth: 16, .. })
        ),
        "{err:?}"
    );
    assert!(!err.is_catchable());
}
