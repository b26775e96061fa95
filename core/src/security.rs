//! Consult-before-act security gate.
//!
//! The host may install a [`SecurityPolicy`]; the evaluator asks it before
//! every reflective construction, method invocation, field read and class
//! declaration. Without a policy everything is allowed.

use alloc::sync::Arc;
use core::fmt;

use thiserror::Error;

use crate::resolver::Signature;
use crate::types::ClassDef;
use crate::values::Value;
use crate::{String, format};

/// Host-supplied veto over reflective operations. Every predicate allows by
/// default, so a policy only overrides what it restricts.
#[allow(unused_variables)]
pub trait SecurityPolicy: Send + Sync {
    fn can_construct(&self, class: &ClassDef, constructor: &Signature, args: &[Value]) -> bool {
        true
    }

    fn can_invoke_static_method(&self, class: &ClassDef, method: &Signature, args: &[Value]) -> bool {
        true
    }

    fn can_invoke_method(&self, receiver: &Value, method: &Signature, args: &[Value]) -> bool {
        true
    }

    fn can_invoke_super_method(
        &self,
        superclass: &ClassDef,
        receiver: &Value,
        method: &Signature,
        args: &[Value],
    ) -> bool {
        true
    }

    fn can_get_field(&self, receiver: &Value, field: &str) -> bool {
        true
    }

    fn can_get_static_field(&self, class: &ClassDef, field: &str) -> bool {
        true
    }

    fn can_extends(&self, superclass: &ClassDef) -> bool {
        true
    }

    fn can_implements(&self, interface: &ClassDef) -> bool {
        true
    }
}

/// The operation a policy denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Construct,
    InvokeStaticMethod,
    InvokeMethod,
    InvokeSuperMethod,
    GetField,
    GetStaticField,
    Extends,
    Implements,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::Construct => "construction",
            Operation::InvokeStaticMethod => "static method invocation",
            Operation::InvokeMethod => "method invocation",
            Operation::InvokeSuperMethod => "super method invocation",
            Operation::GetField => "field access",
            Operation::GetStaticField => "static field access",
            Operation::Extends => "extending",
            Operation::Implements => "implementing",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Security policy denied {operation}: {signature}")]
pub struct SecurityError {
    pub operation: Operation,
    pub signature: String,
}

/// The evaluator's view of the installed policy.
#[derive(Clone, Default)]
pub struct SecurityGuard {
    policy: Option<Arc<dyn SecurityPolicy>>,
}

impl SecurityGuard {
    pub fn new(policy: Option<Arc<dyn SecurityPolicy>>) -> Self {
        Self { policy }
    }

    pub fn allow_all() -> Self {
        Self { policy: None }
    }

    pub fn is_restricted(&self) -> bool {
        self.policy.is_some()
    }

    fn check(
        &self,
        operation: Operation,
        allowed: impl FnOnce(&dyn SecurityPolicy) -> bool,
        signature: impl FnOnce() -> String,
    ) -> Result<(), SecurityError> {
        let Some(policy) = &self.policy else {
            return Ok(());
        };
        if allowed(policy.as_ref()) {
            return Ok(());
        }
        let signature = signature();
        tracing::warn!(%operation, %signature, "security policy denied operation");
        Err(SecurityError {
            operation,
            signature,
        })
    }

    pub fn check_construct(
        &self,
        class: &ClassDef,
        constructor: &Signature,
        args: &[Value],
    ) -> Result<(), SecurityError> {
        self.check(
            Operation::Construct,
            |p| p.can_construct(class, constructor, args),
            || format!("new {}", constructor),
        )
    }

    pub fn check_invoke_static_method(
        &self,
        class: &ClassDef,
        method: &Signature,
        args: &[Value],
    ) -> Result<(), SecurityError> {
        self.check(
            Operation::InvokeStaticMethod,
            |p| p.can_invoke_static_method(class, method, args),
            || format!("static {}", method),
        )
    }

    pub fn check_invoke_method(
        &self,
        receiver: &Value,
        method: &Signature,
        args: &[Value],
    ) -> Result<(), SecurityError> {
        self.check(
            Operation::InvokeMethod,
            |p| p.can_invoke_method(receiver, method, args),
            || format!("{}", method),
        )
    }

    pub fn check_invoke_super_method(
        &self,
        superclass: &ClassDef,
        receiver: &Value,
        method: &Signature,
        args: &[Value],
    ) -> Result<(), SecurityError> {
        self.check(
            Operation::InvokeSuperMethod,
            |p| p.can_invoke_super_method(superclass, receiver, method, args),
            || format!("super.{}", method),
        )
    }

    pub fn check_get_field(&self, receiver: &Value, field: &str) -> Result<(), SecurityError> {
        self.check(
            Operation::GetField,
            |p| p.can_get_field(receiver, field),
            || format!("{}.{}", receiver.type_name(), field),
        )
    }

    pub fn check_get_static_field(&self, class: &ClassDef, field: &str) -> Result<(), SecurityError> {
        self.check(
            Operation::GetStaticField,
            |p| p.can_get_static_field(class, field),
            || format!("{}.{}", class.name(), field),
        )
    }

    pub fn check_extends(&self, superclass: &ClassDef) -> Result<(), SecurityError> {
        self.check(
            Operation::Extends,
            |p| p.can_extends(superclass),
            || format!("extends {}", superclass.name()),
        )
    }

    pub fn check_implements(&self, interface: &ClassDef) -> Result<(), SecurityError> {
        self.check(
            Operation::Implements,
            |p| p.can_implements(interface),
            || format!("implements {}", interface.name()),
        )
    }
}

impl fmt::Debug for SecurityGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityGuard")
            .field("restricted", &self.is_restricted())
            .finish()
    }
}
