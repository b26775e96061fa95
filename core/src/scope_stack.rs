//! The call-frame stack of one evaluation.
//!
//! Each frame is the scope statements currently bind into. Entering a block,
//! loop iteration or call pushes a frame and leaving it pops the frame, so the
//! innermost scope is always on top. A stack belongs to exactly one
//! evaluation; concurrent evaluations over a shared root scope each build
//! their own.

use smallvec::SmallVec;

use crate::evaluator::InternalError;
use crate::scope::ScopeRef;

pub struct CallStack {
    frames: SmallVec<[ScopeRef; 8]>,
}

impl CallStack {
    pub fn new(scope: ScopeRef) -> Self {
        let mut frames = SmallVec::new();
        frames.push(scope);
        Self { frames }
    }

    pub fn push(&mut self, scope: ScopeRef) {
        self.frames.push(scope);
    }

    pub fn pop(&mut self) -> Result<ScopeRef, InternalError> {
        self.frames.pop().ok_or(InternalError::EmptyCallStack)
    }

    /// The innermost scope.
    pub fn top(&self) -> Result<&ScopeRef, InternalError> {
        self.frames.last().ok_or(InternalError::EmptyCallStack)
    }

    /// Replace the innermost scope, returning the previous one.
    pub fn swap(&mut self, scope: ScopeRef) -> Result<ScopeRef, InternalError> {
        let top = self.frames.last_mut().ok_or(InternalError::EmptyCallStack)?;
        Ok(core::mem::replace(top, scope))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The frame `from_top` levels below the innermost one.
    pub fn get(&self, from_top: usize) -> Option<&ScopeRef> {
        self.frames.iter().rev().nth(from_top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::NameSpace;

    #[test]
    fn test_push_pop_order() {
        let root = NameSpace::new_root("global");
        let mut stack = CallStack::new(root.clone());
        let child = NameSpace::new_child(&root, "block");
        stack.push(child.clone());

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top().unwrap().name(), "block");
        assert_eq!(stack.get(1).unwrap().name(), "global");

        let popped = stack.pop().unwrap();
        assert!(std::sync::Arc::ptr_eq(&popped, &child));
        assert_eq!(stack.top().unwrap().name(), "global");
    }

    #[test]
    fn test_pop_empty_stack_is_internal_error() {
        let mut stack = CallStack::new(NameSpace::new_root("global"));
        stack.pop().unwrap();
        assert_eq!(stack.pop().unwrap_err(), InternalError::EmptyCallStack);
        assert!(stack.top().is_err());
    }

    #[test]
    fn test_swap_replaces_top() {
        let root = NameSpace::new_root("global");
        let mut stack = CallStack::new(root.clone());
        let other = NameSpace::new_child(&root, "other");
        let previous = stack.swap(other).unwrap();
        assert_eq!(previous.name(), "global");
        assert_eq!(stack.top().unwrap().name(), "other");
        assert_eq!(stack.depth(), 1);
    }
}
