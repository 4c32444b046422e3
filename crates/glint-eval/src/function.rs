//! Function definitions and invocation records.
//!
//! A [`FunctionDefinition`] is created once per syntactic definition and
//! lives for the rest of the run. It owns the slot table shared by every
//! activation of the function: parameters occupy the first slots, and
//! locals are appended the first time an assignment defines them. A
//! [`FunctionInvocation`] is one call's activation record — the bound
//! argument values plus lazily grown local slots.

use crate::error::{ErrorKind, EvalResult};
use glint_types::ast::{Block, Expr, Ident};
use glint_types::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Static description of a declared function.
#[derive(Debug)]
pub struct FunctionDefinition {
    name: String,
    /// Lexical level this function's activations occupy in the display.
    level: usize,
    param_count: usize,
    /// Name → slot number, for parameters and locals alike.
    slots: RefCell<HashMap<String, usize>>,
    body: Rc<Block>,
    return_expr: Option<Rc<Expr>>,
    /// Functions declared inside this function's body.
    fns: RefCell<HashMap<String, Rc<FunctionDefinition>>>,
}

impl FunctionDefinition {
    pub fn new(
        name: &str,
        level: usize,
        params: &[Ident],
        body: Rc<Block>,
        return_expr: Option<Rc<Expr>>,
    ) -> EvalResult<Self> {
        let mut slots = HashMap::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            if slots.insert(param.name.clone(), index).is_some() {
                return Err(ErrorKind::VariableRedefined(param.name.clone()).into());
            }
        }
        Ok(Self {
            name: name.to_string(),
            level,
            param_count: params.len(),
            slots: RefCell::new(slots),
            body,
            return_expr,
            fns: RefCell::new(HashMap::new()),
        })
    }

    /// The synthetic definition backing the global activation.
    pub fn top_level() -> Self {
        Self {
            name: String::new(),
            level: 0,
            param_count: 0,
            slots: RefCell::new(HashMap::new()),
            body: Rc::new(Block::empty()),
            return_expr: None,
            fns: RefCell::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn body(&self) -> Rc<Block> {
        Rc::clone(&self.body)
    }

    pub fn return_expr(&self) -> Option<Rc<Expr>> {
        self.return_expr.clone()
    }

    pub fn has_return(&self) -> bool {
        self.return_expr.is_some()
    }

    /// Slot number of a parameter or local, if declared.
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots.borrow().get(name).copied()
    }

    /// Declare a new local slot. Fails if the name is already declared
    /// in this definition (shadowing happens across levels, not within).
    pub fn define_slot(&self, name: &str) -> EvalResult<usize> {
        let mut slots = self.slots.borrow_mut();
        if slots.contains_key(name) {
            return Err(ErrorKind::VariableRedefined(name.to_string()).into());
        }
        let slot = slots.len();
        slots.insert(name.to_string(), slot);
        Ok(slot)
    }

    /// Look up a function declared directly inside this one.
    pub fn find_fn(&self, name: &str) -> Option<Rc<FunctionDefinition>> {
        self.fns.borrow().get(name).cloned()
    }

    /// Register a nested function definition.
    pub fn add_fn(&self, def: Rc<FunctionDefinition>) {
        self.fns.borrow_mut().insert(def.name.clone(), def);
    }
}

/// One call's activation record.
#[derive(Debug)]
pub struct FunctionInvocation {
    def: Rc<FunctionDefinition>,
    /// Slot-indexed storage. Parameters are bound at construction;
    /// locals stay `None` until their first assignment.
    values: Vec<Option<Value>>,
}

impl FunctionInvocation {
    /// Bind arguments. The caller has already checked arity.
    pub fn new(def: Rc<FunctionDefinition>, args: Vec<Value>) -> Self {
        Self {
            def,
            values: args.into_iter().map(Some).collect(),
        }
    }

    pub fn definition(&self) -> &Rc<FunctionDefinition> {
        &self.def
    }

    /// Current value of a slot, `None` when not yet assigned.
    pub fn get(&self, slot: usize) -> Option<Value> {
        self.values.get(slot).cloned().flatten()
    }

    /// Store a value, growing the record if the slot is new.
    pub fn set(&mut self, slot: usize, value: Value) {
        if slot >= self.values.len() {
            self.values.resize(slot + 1, None);
        }
        self.values[slot] = Some(value);
    }
}
