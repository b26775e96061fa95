mod builtins;
pub mod registry;
mod ty;

pub use registry::{ClassBuilder, ClassDef, ClassKind, ClassRegistry, FieldDef, HostMethod, NativeFn};
pub use ty::{Type, normalize_class_name};
