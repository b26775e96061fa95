//! Bindings: variables, modifiers and the scopes that hold them.

mod modifiers;
mod namespace;
mod variable;

pub use modifiers::{Modifiers, Visibility};
pub use namespace::{MethodEntry, NameSpace, ScopeKind, ScopeRef};
pub use variable::Variable;

static_assertions::assert_impl_all!(NameSpace: Send, Sync);

#[cfg(test)]
#[path = "namespace_test.rs"]
mod namespace_test;
