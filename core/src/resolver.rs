//! Overload resolution.
//!
//! Candidates are filtered in phases, the same way the host language does it:
//!
//! 1. **Strict**: subtyping and primitive widening only.
//! 2. **Boxing**: phase 1 plus boxing and unboxing conversions.
//! 3. **Varargs**: phase 2, letting a trailing varargs parameter absorb the
//!    remaining arguments.
//! 4. **Loose**: `null` may bind to a primitive parameter as its default
//!    value. Disabled in strict mode.
//!
//! The first phase with an applicable candidate decides. Within it the most
//! specific candidate wins; if no candidate is more specific than all the
//! others the call is ambiguous.

use alloc::sync::Arc;
use core::fmt;

use crate::casting::{Conversion, is_type_assignable};
use crate::evaluator::ResolutionError;
use crate::scope::Visibility;
use crate::types::{ClassRegistry, Type};
use crate::values::{Object, Value};
use crate::{String, ToString, Vec, format};

/// A callable's shape as seen by overload resolution. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: Arc<str>,
    /// `None` marks an untyped script parameter, which accepts anything.
    pub params: Vec<Option<Type>>,
    pub varargs: bool,
    pub declaring_type: Option<Arc<str>>,
    pub is_static: bool,
    pub visibility: Visibility,
}

impl Signature {
    pub fn new(name: &str, params: Vec<Option<Type>>) -> Self {
        Self {
            name: Arc::from(name),
            params,
            varargs: false,
            declaring_type: None,
            is_static: false,
            visibility: Visibility::Public,
        }
    }

    /// A signature with every parameter typed.
    pub fn typed(name: &str, params: &[Type]) -> Self {
        Self::new(name, params.iter().cloned().map(Some).collect())
    }

    pub fn with_declaring_type(mut self, class: &str) -> Self {
        self.declaring_type = Some(Arc::from(class));
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Mark the last parameter as varargs. A signature without parameters
    /// has nothing to spread and stays fixed-arity.
    pub fn with_varargs(mut self, varargs: bool) -> Self {
        self.varargs = varargs && !self.params.is_empty();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    fn is_constructor(&self) -> bool {
        self.declaring_type.as_deref() == Some(&*self.name)
    }

    /// The parameter type an argument at `index` binds to, once varargs are
    /// expanded to `count` arguments.
    fn param_for(&self, index: usize, count: usize, expand_varargs: bool) -> Option<Option<Type>> {
        let fixed = if expand_varargs {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        };
        if index < fixed {
            return Some(self.params[index].clone());
        }
        if expand_varargs && index < count {
            return match self.params.last()? {
                Some(Type::Array(element)) => Some(Some((**element).clone())),
                Some(other) => Some(Some(other.clone())),
                None => Some(None),
            };
        }
        None
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaring_type {
            Some(_) if self.is_constructor() => write!(f, "{}(", self.name)?,
            Some(owner) => write!(f, "{}.{}(", owner, self.name)?,
            None => write!(f, "{}(", self.name)?,
        }
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let last = i + 1 == self.params.len();
            match (param, self.varargs && last) {
                (Some(Type::Array(element)), true) => write!(f, "{}...", element)?,
                (Some(ty), _) => write!(f, "{}", ty)?,
                (None, _) => write!(f, "<untyped>")?,
            }
        }
        write!(f, ")")
    }
}

/// What overload resolution knows about one argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgType {
    Null,
    Value(Type),
    /// An unconverted lambda of the given arity.
    Lambda(usize),
    /// An unconverted method reference; its arity is only known per target.
    MethodRef,
}

impl ArgType {
    pub fn of(value: &Value) -> ArgType {
        match value {
            Value::Object(Object::Lambda(lambda)) => match lambda.arity() {
                Some(arity) => ArgType::Lambda(arity),
                None => ArgType::MethodRef,
            },
            other => match other.runtime_type() {
                Some(ty) => ArgType::Value(ty),
                None => ArgType::Null,
            },
        }
    }

    pub fn of_all(values: &[Value]) -> Vec<ArgType> {
        values.iter().map(ArgType::of).collect()
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Null => write!(f, "null"),
            ArgType::Value(ty) => write!(f, "{}", ty),
            ArgType::Lambda(arity) => write!(f, "lambda/{}", arity),
            ArgType::MethodRef => write!(f, "method reference"),
        }
    }
}

/// Calling context for a resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// Calling through a class rather than an instance.
    pub static_only: bool,
    /// The class the caller is declared in, for private member access.
    pub caller_class: Option<Arc<str>>,
    /// Strict host-language mode; disables the loose phase.
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Strict,
    Boxing,
    Varargs,
    Loose,
}

/// The chosen candidate and how its arguments must be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub phase: Phase,
    /// Trailing arguments are packed into the varargs array.
    pub packs_varargs: bool,
}

/// Pick the most specific applicable candidate for `args`.
pub fn resolve(
    registry: &ClassRegistry,
    candidates: &[Signature],
    args: &[ArgType],
    ctx: &ResolveContext,
) -> Result<Selection, ResolutionError> {
    let visible: Vec<usize> = (0..candidates.len())
        .filter(|&i| is_visible(&candidates[i], ctx))
        .collect();

    let mut phases = vec![Phase::Strict, Phase::Boxing, Phase::Varargs];
    if !ctx.strict {
        phases.push(Phase::Loose);
    }

    for phase in phases {
        let applicable: Vec<usize> = visible
            .iter()
            .copied()
            .filter(|&i| is_applicable(registry, &candidates[i], args, phase))
            .collect();
        if applicable.is_empty() {
            continue;
        }

        let index = most_specific(registry, candidates, &applicable, args.len(), phase)
            .ok_or_else(|| ResolutionError::Ambiguous {
                name: candidate_name(candidates),
                args: describe_args(args),
                candidates: applicable
                    .iter()
                    .map(|&i| candidates[i].to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        let chosen = &candidates[index];
        if ctx.static_only && !chosen.is_static && chosen.declaring_type.is_some() {
            return Err(ResolutionError::StaticContext {
                signature: chosen.to_string(),
            });
        }

        tracing::debug!(signature = %chosen, ?phase, "resolved overload");
        return Ok(Selection {
            index,
            phase,
            packs_varargs: expands_varargs(chosen, phase),
        });
    }

    Err(ResolutionError::NoMatch {
        name: candidate_name(candidates),
        args: describe_args(args),
    })
}

fn candidate_name(candidates: &[Signature]) -> String {
    candidates
        .first()
        .map(|sig| match &sig.declaring_type {
            Some(owner) if !sig.is_constructor() => format!("{}.{}", owner, sig.name),
            _ => sig.name.to_string(),
        })
        .unwrap_or_default()
}

pub fn describe_args(args: &[ArgType]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_visible(sig: &Signature, ctx: &ResolveContext) -> bool {
    match sig.visibility {
        Visibility::Private => sig.declaring_type.is_none() || sig.declaring_type == ctx.caller_class,
        _ => true,
    }
}

fn expands_varargs(sig: &Signature, phase: Phase) -> bool {
    sig.varargs && matches!(phase, Phase::Varargs | Phase::Loose)
}

fn is_applicable(registry: &ClassRegistry, sig: &Signature, args: &[ArgType], phase: Phase) -> bool {
    let expand = phase == Phase::Varargs || expands_varargs(sig, phase);
    if expand {
        if !sig.varargs || args.len() + 1 < sig.params.len() {
            return false;
        }
    } else if args.len() != sig.params.len() {
        return false;
    }

    args.iter().enumerate().all(|(i, arg)| {
        match sig.param_for(i, args.len(), expand) {
            Some(param) => arg_matches(registry, arg, param.as_ref(), phase),
            None => false,
        }
    })
}

fn arg_matches(registry: &ClassRegistry, arg: &ArgType, param: Option<&Type>, phase: Phase) -> bool {
    let Some(param) = param else {
        return true;
    };
    match arg {
        ArgType::Null => param.is_reference() || (phase == Phase::Loose && param.is_primitive()),
        ArgType::Lambda(arity) => registry
            .functional_method_of(param)
            .is_some_and(|method| method.signature.arity() == *arity),
        ArgType::MethodRef => registry.functional_method_of(param).is_some(),
        ArgType::Value(ty) => {
            let conversion = match phase {
                Phase::Strict => Conversion::Strict,
                _ => Conversion::Boxing,
            };
            is_type_assignable(registry, ty, param, conversion)
        }
    }
}

/// Index of the candidate at least as specific as every other applicable
/// one, or `None` if the set is ambiguous.
fn most_specific(
    registry: &ClassRegistry,
    candidates: &[Signature],
    applicable: &[usize],
    count: usize,
    phase: Phase,
) -> Option<usize> {
    if applicable.len() == 1 {
        return applicable.first().copied();
    }
    let expand = matches!(phase, Phase::Varargs | Phase::Loose);
    let maximal: Vec<usize> = applicable
        .iter()
        .copied()
        .filter(|&a| {
            applicable.iter().all(|&b| {
                a == b || at_least_as_specific(registry, &candidates[a], &candidates[b], count, expand)
            })
        })
        .collect();
    match maximal.as_slice() {
        [single] => Some(*single),
        // Identical shapes, e.g. an override seen through two supertypes.
        [first, rest @ ..] if rest.iter().all(|&i| candidates[i].params == candidates[*first].params) => {
            Some(*first)
        }
        _ => None,
    }
}

fn at_least_as_specific(
    registry: &ClassRegistry,
    a: &Signature,
    b: &Signature,
    count: usize,
    expand: bool,
) -> bool {
    let count = if expand {
        count.max(a.params.len()).max(b.params.len())
    } else {
        count
    };
    (0..count).all(|i| {
        let pa = a.param_for(i, count, expand && a.varargs);
        let pb = b.param_for(i, count, expand && b.varargs);
        match (pa.flatten(), pb.flatten()) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(ta), Some(tb)) => is_type_assignable(registry, &ta, &tb, Conversion::Strict),
        }
    })
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;
