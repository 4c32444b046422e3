//! The display: a stack of nested lexical levels resolving names to
//! storage.
//!
//! Level 0 is the global activation. Calling a function installs its
//! invocation at the function's *declaration* level (lexical, not
//! dynamic, nesting), saving whatever occupied that level before — so a
//! recursive call swaps a fresh activation into the same level, and a
//! callee sees its own parameters and locals plus the enclosing levels,
//! never the caller's locals. A [`Reference`] resolved once stays valid
//! for the whole run because it addresses through the live frame at its
//! level rather than any particular activation.

use crate::error::{ErrorKind, EvalResult};
use crate::function::{FunctionDefinition, FunctionInvocation};
use glint_types::ast::Reference;
use glint_types::Value;
use std::rc::Rc;

/// Maximum lexical function nesting the display supports.
pub const MAX_NESTING: usize = 64;

/// What `activate` displaced; handed back verbatim to `restore`.
#[derive(Debug)]
pub struct SavedContext {
    level: usize,
    previous: Option<FunctionInvocation>,
    previous_level: usize,
}

/// Nested-scope symbol table.
#[derive(Debug)]
pub struct Display {
    /// Active frames, indexed by lexical level.
    frames: Vec<Option<FunctionInvocation>>,
    current_level: usize,
}

impl Display {
    /// Create a display holding only the global activation.
    pub fn new() -> Self {
        let global =
            FunctionInvocation::new(Rc::new(FunctionDefinition::top_level()), Vec::new());
        Self {
            frames: vec![Some(global)],
            current_level: 0,
        }
    }

    /// Current nesting depth. New definitions are stamped `level() + 1`.
    pub fn level(&self) -> usize {
        self.current_level
    }

    fn frame(&self, level: usize) -> Option<&FunctionInvocation> {
        self.frames.get(level).and_then(|f| f.as_ref())
    }

    fn frame_mut(&mut self, level: usize) -> Option<&mut FunctionInvocation> {
        self.frames.get_mut(level).and_then(|f| f.as_mut())
    }

    // ── Variables ─────────────────────────────────────────────────────────

    /// Search innermost-to-outermost for a declared name.
    pub fn find_reference(&self, name: &str) -> Option<Reference> {
        for level in (0..=self.current_level).rev() {
            if let Some(frame) = self.frame(level) {
                if let Some(slot) = frame.definition().slot_of(name) {
                    return Some(Reference::new(level as u32, slot as u32));
                }
            }
        }
        None
    }

    /// Declare a name in the current level. Fails only on a duplicate
    /// at this exact level; shadowing outer levels is fine.
    pub fn define_variable(&mut self, name: &str) -> EvalResult<Reference> {
        let frame = self
            .frame(self.current_level)
            .ok_or_else(|| ErrorKind::Internal("no active frame".into()))?;
        let slot = frame.definition().define_slot(name)?;
        Ok(Reference::new(self.current_level as u32, slot as u32))
    }

    /// Read the current value behind a reference.
    pub fn value(&self, reference: Reference, name: &str) -> EvalResult<Value> {
        let frame = self
            .frame(reference.level as usize)
            .ok_or_else(|| ErrorKind::Internal("reference to an inactive level".into()))?;
        frame
            .get(reference.slot as usize)
            .ok_or_else(|| ErrorKind::UnsetVariable(name.to_string()).into())
    }

    /// Store a value into the cell behind a reference.
    pub fn set_value(&mut self, reference: Reference, value: Value) -> EvalResult<()> {
        let frame = self
            .frame_mut(reference.level as usize)
            .ok_or_else(|| ErrorKind::Internal("reference to an inactive level".into()))?;
        frame.set(reference.slot as usize, value);
        Ok(())
    }

    // ── Functions ─────────────────────────────────────────────────────────

    /// Register a definition at the current level.
    pub fn add_function(&mut self, def: Rc<FunctionDefinition>) -> EvalResult<()> {
        let frame = self
            .frame(self.current_level)
            .ok_or_else(|| ErrorKind::Internal("no active frame".into()))?;
        frame.definition().add_fn(def);
        Ok(())
    }

    /// Search innermost-to-outermost for a function definition.
    pub fn find_function(&self, name: &str) -> Option<Rc<FunctionDefinition>> {
        for level in (0..=self.current_level).rev() {
            if let Some(frame) = self.frame(level) {
                if let Some(def) = frame.definition().find_fn(name) {
                    return Some(def);
                }
            }
        }
        None
    }

    /// Look only at the current level, for redefinition checks.
    pub fn find_function_in_current_level(&self, name: &str) -> Option<Rc<FunctionDefinition>> {
        self.frame(self.current_level)
            .and_then(|frame| frame.definition().find_fn(name))
    }

    // ── Activation ────────────────────────────────────────────────────────

    /// Install an invocation at its definition's level and make that the
    /// current level. Returns the displaced context for `restore`.
    pub fn activate(&mut self, invocation: FunctionInvocation) -> EvalResult<SavedContext> {
        let level = invocation.definition().level();
        if level >= MAX_NESTING {
            return Err(ErrorKind::NestingTooDeep(MAX_NESTING).into());
        }
        if self.frames.len() <= level {
            self.frames.resize_with(level + 1, || None);
        }
        let previous = self.frames[level].replace(invocation);
        let previous_level = self.current_level;
        self.current_level = level;
        Ok(SavedContext {
            level,
            previous,
            previous_level,
        })
    }

    /// Undo an `activate`, reinstating the displaced frame and level.
    pub fn restore(&mut self, saved: SavedContext) {
        self.frames[saved.level] = saved.previous;
        self.current_level = saved.previous_level;
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}
