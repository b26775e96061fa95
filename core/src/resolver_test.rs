use crate::evaluator::ResolutionError;
use crate::resolver::{ArgType, Phase, ResolveContext, Selection, Signature, describe_args, resolve};
use crate::scope::Visibility;
use crate::types::{ClassRegistry, Type};
use crate::values::{Primitive, Value};
use pretty_assertions::assert_eq;

fn sig(params: &[Type]) -> Signature {
    Signature::typed("foo", params)
}

fn value(ty: Type) -> ArgType {
    ArgType::Value(ty)
}

fn pick(candidates: &[Signature], args: &[ArgType]) -> Result<Selection, ResolutionError> {
    resolve(&ClassRegistry::new(), candidates, args, &ResolveContext::default())
}

#[test]
fn test_subclass_parameter_is_more_specific() {
    let candidates = [sig(&[Type::class("Number")]), sig(&[Type::class("Integer")])];
    let selection = pick(&candidates, &[value(Type::class("Integer"))]).unwrap();
    assert_eq!(selection.index, 1);
    assert_eq!(selection.phase, Phase::Strict);
}

#[test]
fn test_widening_wins_over_boxing() {
    let candidates = [sig(&[Type::class("Integer")]), sig(&[Type::long()])];
    let selection = pick(&candidates, &[value(Type::int())]).unwrap();
    assert_eq!(selection.index, 1);
    assert_eq!(selection.phase, Phase::Strict);
}

#[test]
fn test_boxing_phase_when_no_strict_match() {
    let candidates = [sig(&[Type::class("Integer")]), sig(&[Type::string()])];
    let selection = pick(&candidates, &[value(Type::int())]).unwrap();
    assert_eq!((selection.index, selection.phase), (0, Phase::Boxing));
}

#[test]
fn test_null_picks_most_specific_reference() {
    let candidates = [sig(&[Type::object()]), sig(&[Type::string()])];
    assert_eq!(pick(&candidates, &[ArgType::Null]).unwrap().index, 1);
}

#[test]
fn test_unrelated_candidates_are_ambiguous() {
    crate::test_utils::init_test_logging();
    let candidates = [sig(&[Type::string()]), sig(&[Type::class("Integer")])];
    let err = pick(&candidates, &[ArgType::Null]).unwrap_err();
    match err {
        ResolutionError::Ambiguous { name, args, candidates } => {
            assert_eq!(name, "foo");
            assert_eq!(args, "null");
            assert_eq!(candidates, "foo(String), foo(Integer)");
        }
        other => panic!("expected Ambiguous, got {other:?}"),
    }
}

#[test]
fn test_varargs_absorbs_trailing_arguments() {
    let candidates = [Signature::typed("sum", &[Type::string(), Type::array_of(Type::int())]).with_varargs(true)];
    let args = [value(Type::string()), value(Type::int()), value(Type::short())];
    let selection = pick(&candidates, &args).unwrap();
    assert_eq!(selection.phase, Phase::Varargs);
    assert!(selection.packs_varargs);

    // An empty tail still matches.
    assert!(pick(&candidates, &[value(Type::string())]).unwrap().packs_varargs);
    // Passing the array itself needs no packing.
    let direct = pick(&candidates, &[value(Type::string()), value(Type::array_of(Type::int()))]).unwrap();
    assert_eq!((direct.phase, direct.packs_varargs), (Phase::Strict, false));
}

#[test]
fn test_varargs_without_parameters_is_fixed_arity() {
    let empty = Signature::typed("noop", &[]).with_varargs(true);
    assert!(!empty.varargs);

    let candidates = [empty];
    assert_eq!(pick(&candidates, &[]).unwrap().phase, Phase::Strict);
    assert!(matches!(
        pick(&candidates, &[value(Type::int())]),
        Err(ResolutionError::NoMatch { .. })
    ));
}

#[test]
fn test_fixed_arity_preferred_over_varargs() {
    let candidates = [
        Signature::typed("f", &[Type::array_of(Type::int())]).with_varargs(true),
        Signature::typed("f", &[Type::int()]),
    ];
    assert_eq!(pick(&candidates, &[value(Type::int())]).unwrap().index, 1);
}

#[test]
fn test_loose_phase_binds_null_to_primitive() {
    let candidates = [sig(&[Type::int()])];
    let selection = pick(&candidates, &[ArgType::Null]).unwrap();
    assert_eq!(selection.phase, Phase::Loose);

    let strict = ResolveContext {
        strict: true,
        ..ResolveContext::default()
    };
    let err = resolve(&ClassRegistry::new(), &candidates, &[ArgType::Null], &strict).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::NoMatch {
            name: "foo".into(),
            args: "null".into()
        }
    );
}

#[test]
fn test_untyped_parameters_accept_anything() {
    let candidates = [Signature::new("g", vec![None, Some(Type::int())])];
    let args = [value(Type::string()), value(Type::byte())];
    assert_eq!(pick(&candidates, &args).unwrap().phase, Phase::Strict);
}

#[test]
fn test_typed_parameter_is_more_specific_than_untyped() {
    let candidates = [Signature::new("g", vec![None]), Signature::typed("g", &[Type::string()])];
    assert_eq!(pick(&candidates, &[value(Type::string())]).unwrap().index, 1);
}

#[test]
fn test_lambda_arguments_match_by_arity() {
    let candidates = [
        Signature::typed("run", &[Type::class("Runnable")]),
        Signature::typed("run", &[Type::class("Function")]),
    ];
    assert_eq!(pick(&candidates, &[ArgType::Lambda(0)]).unwrap().index, 0);
    assert_eq!(pick(&candidates, &[ArgType::Lambda(1)]).unwrap().index, 1);
    assert!(matches!(
        pick(&candidates, &[ArgType::Lambda(2)]),
        Err(ResolutionError::NoMatch { .. })
    ));
}

#[test]
fn test_static_context_rejects_instance_method() {
    let candidates = [Signature::typed("size", &[]).with_declaring_type("Box")];
    let ctx = ResolveContext {
        static_only: true,
        ..ResolveContext::default()
    };
    let err = resolve(&ClassRegistry::new(), &candidates, &[], &ctx).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::StaticContext {
            signature: "Box.size()".into()
        }
    );
}

#[test]
fn test_private_members_need_declaring_caller() {
    let candidates = [Signature::typed("secret", &[])
        .with_declaring_type("Vault")
        .with_visibility(Visibility::Private)];
    assert!(matches!(pick(&candidates, &[]), Err(ResolutionError::NoMatch { .. })));

    let inside = ResolveContext {
        caller_class: Some("Vault".into()),
        ..ResolveContext::default()
    };
    assert!(resolve(&ClassRegistry::new(), &candidates, &[], &inside).is_ok());
}

#[test]
fn test_arg_types_of_values() {
    let args = ArgType::of_all(&[Value::Null, Value::boxed(Primitive::Int(1)), Value::string("s")]);
    assert_eq!(
        args,
        vec![ArgType::Null, value(Type::class("Integer")), value(Type::string())]
    );
    assert_eq!(describe_args(&args), "null, Integer, String");
}

#[test]
fn test_signature_display() {
    let varargs = Signature::typed("format", &[Type::string(), Type::array_of(Type::object())])
        .with_declaring_type("String")
        .with_varargs(true);
    assert_eq!(varargs.to_string(), "String.format(String, Object...)");

    let constructor = Signature::typed("Point", &[Type::int(), Type::int()]).with_declaring_type("Point");
    assert_eq!(constructor.to_string(), "Point(int, int)");
    assert_eq!(Signature::new("f", vec![None]).to_string(), "f(<untyped>)");
}
