//! Scope tracking for identifier resolution during rewriting.

use std::ops::{Deref, DerefMut};

/// Names bound by one lexical construct, in declaration order.
pub type ScopeFrame = Vec<String>;

/// A point-in-time copy of a [`ScopeStack`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSnapshot {
    /// Names declared while no frame was open
    pub base_names: Vec<String>,
    /// Open frames, outermost first
    pub frames: Vec<ScopeFrame>,
}

/// Tracks the names visible at the current point of a rewrite.
///
/// The base frame holds names that stay visible for the whole unit; pushed
/// frames hold names introduced by nested constructs such as arrow function
/// parameters.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    base: Vec<String>,
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    /// Creates a stack whose base frame holds `base_names`.
    pub fn new<I, S>(base_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: base_names.into_iter().map(Into::into).collect(),
            frames: Vec::new(),
        }
    }

    /// Opens a new frame.
    pub fn push_scope(&mut self) {
        self.frames.push(ScopeFrame::new());
    }

    /// Closes the innermost frame. Does nothing when no frame is open.
    pub fn pop_scope(&mut self) {
        self.frames.pop();
    }

    /// Opens a frame that is closed again when the returned guard drops.
    pub fn enter(&mut self) -> ScopeGuard<'_> {
        self.push_scope();
        ScopeGuard { stack: self }
    }

    /// Declares `name` in the innermost frame, or in the base frame when no
    /// frame is open.
    pub fn declare(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self.frames.last_mut() {
            Some(frame) => frame.push(name),
            None => self.base.push(name),
        }
    }

    /// Returns true when `name` is visible.
    pub fn contains(&self, name: &str) -> bool {
        self.frames.iter().rev().flatten().any(|n| n == name) || self.base.iter().any(|n| n == name)
    }

    /// Number of open frames, not counting the base frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Copies the current state.
    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            base_names: self.base.clone(),
            frames: self.frames.clone(),
        }
    }

    /// Every visible name: frame names outermost first, then base names.
    pub fn flatten(&self) -> Vec<String> {
        self.frames
            .iter()
            .flatten()
            .chain(self.base.iter())
            .cloned()
            .collect()
    }
}

/// An open frame on a [`ScopeStack`]; popping happens on drop.
#[derive(Debug)]
pub struct ScopeGuard<'s> {
    stack: &'s mut ScopeStack,
}

impl Deref for ScopeGuard<'_> {
    type Target = ScopeStack;

    fn deref(&self) -> &ScopeStack {
        self.stack
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut ScopeStack {
        self.stack
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_names_visible() {
        let stack = ScopeStack::new(["user", "title"]);
        assert!(stack.contains("user"));
        assert!(stack.contains("title"));
        assert!(!stack.contains("age"));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_declare_without_frame_goes_to_base() {
        let mut stack = ScopeStack::default();
        stack.declare("item");
        stack.push_scope();
        stack.pop_scope();
        assert!(stack.contains("item"));
        assert_eq!(stack.snapshot().base_names, vec!["item".to_string()]);
    }

    #[test]
    fn test_frames_are_released() {
        let mut stack = ScopeStack::default();
        stack.push_scope();
        stack.declare("a");
        stack.push_scope();
        stack.declare("b");
        assert!(stack.contains("a") && stack.contains("b"));

        stack.pop_scope();
        assert!(stack.contains("a"));
        assert!(!stack.contains("b"));

        stack.pop_scope();
        assert!(!stack.contains("a"));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_pop_without_frame_is_noop() {
        let mut stack = ScopeStack::new(["x"]);
        stack.pop_scope();
        assert!(stack.contains("x"));
    }

    #[test]
    fn test_guard_pops_on_drop() {
        let mut stack = ScopeStack::default();
        {
            let mut scope = stack.enter();
            scope.declare("row");
            assert!(scope.contains("row"));
            assert_eq!(scope.depth(), 1);
        }
        assert!(!stack.contains("row"));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_guard_pops_on_early_return() {
        fn failing(stack: &mut ScopeStack) -> Result<(), ()> {
            let mut scope = stack.enter();
            scope.declare("tmp");
            Err(())
        }

        let mut stack = ScopeStack::default();
        assert!(failing(&mut stack).is_err());
        assert_eq!(stack.depth(), 0);
        assert!(!stack.contains("tmp"));
    }

    #[test]
    fn test_flatten_and_snapshot() {
        let mut stack = ScopeStack::new(["base"]);
        stack.push_scope();
        stack.declare("outer");
        stack.push_scope();
        stack.declare("inner");

        assert_eq!(stack.flatten(), vec!["outer", "inner", "base"]);
        let snapshot = stack.snapshot();
        assert_eq!(snapshot.frames.len(), 2);
        assert_eq!(snapshot.frames[1], vec!["inner".to_string()]);
    }
}
