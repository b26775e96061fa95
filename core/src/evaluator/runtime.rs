//! State shared by every evaluation of one interpreter.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::api::ExecutionOptions;
use crate::security::SecurityGuard;
use crate::types::ClassRegistry;

/// Cooperative cancellation flag. The evaluator polls it on every loop
/// iteration and call and aborts with [`EvalError::Interrupted`](super::EvalError::Interrupted).
///
/// Each handle cancels only the evaluations run under it; clones share one
/// flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear a pending interrupt.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Registry, security gate and limits, shared by reference between an
/// interpreter, its sessions and every lambda they create.
#[derive(Debug)]
pub struct Runtime {
    pub registry: Arc<ClassRegistry>,
    pub security: SecurityGuard,
    pub options: ExecutionOptions,
}

impl Runtime {
    pub fn new(registry: Arc<ClassRegistry>, security: SecurityGuard, options: ExecutionOptions) -> Self {
        Self {
            registry,
            security,
            options,
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(
            Arc::new(ClassRegistry::new()),
            SecurityGuard::allow_all(),
            ExecutionOptions::default(),
        )
    }
}
