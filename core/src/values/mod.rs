pub mod function;
pub mod functional;
pub mod lambda;
pub mod object;
pub mod primitive;
mod value;

pub use function::{NativeBody, NativeFunction};
pub use functional::FunctionalObject;
pub use lambda::{Lambda, LambdaKind, MethodRefReceiver};
pub use object::{Array, Instance, Object};
pub use primitive::{Primitive, PrimitiveKind};
pub use value::Value;

static_assertions::assert_impl_all!(Value: Send, Sync, Clone);
static_assertions::assert_impl_all!(Lambda: Send, Sync);

#[cfg(test)]
mod primitive_test;
