//! Tracking of the currently executing module.
//!
//! [`ExecutionContextStack`] is owned by one [`Interface`](crate::Interface)
//! and therefore by one runtime; independent runtimes in the same process
//! never observe each other's context.

use std::cell::RefCell;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::module::Module;

/// Stack of modules currently executing, innermost last.
///
/// A frame is pushed around every module-owned invocation: `init`, a
/// scheduled call, and each trigger callback. Nested triggers nest frames.
#[derive(Debug, Default)]
pub struct ExecutionContextStack {
    frames: SmallVec<[Arc<Module>; 4]>,
}

impl ExecutionContextStack {
    /// An empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `module`.
    pub fn push(&mut self, module: Arc<Module>) {
        self.frames.push(module);
    }

    /// Leave the innermost module.
    pub fn pop(&mut self) -> Option<Arc<Module>> {
        self.frames.pop()
    }

    /// The innermost module, if any is executing.
    pub fn current(&self) -> Option<&Arc<Module>> {
        self.frames.last()
    }

    /// Number of nested frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether no module is executing.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Pops its frame on drop, so a panicking callback cannot leave a stale
/// module on the stack.
pub(crate) struct ContextGuard<'a> {
    stack: &'a RefCell<ExecutionContextStack>,
}

impl<'a> ContextGuard<'a> {
    pub(crate) fn enter(stack: &'a RefCell<ExecutionContextStack>, module: Arc<Module>) -> Self {
        stack.borrow_mut().push(module);
        Self { stack }
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}
