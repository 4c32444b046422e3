//! The tree-walking evaluator.
//!
//! Walks the AST directly, resolving names through the display and
//! memoising each name-bearing node's binding in its cache slot on
//! first evaluation. Domain clamping happens here, at the statement and
//! operator sites that feed the light hardware model: stored integer
//! channel values live in `[1, 255]`.

use crate::display::Display;
use crate::error::{ErrorKind, EvalError, EvalResult};
use crate::function::{FunctionDefinition, FunctionInvocation};
use crate::sink::{ConsoleSink, PersistSink};
use crate::store::{LightStore, FRAME_LINE};
use glint_types::ast::{
    AssignOp, BinOp, Block, Expr, ExprKind, FnDefStmt, FnId, FnSlot, Ident, Program, RefSlot,
    Reference, Stmt, UnaryOp,
};
use glint_types::Value;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

/// Lower bound of the stored channel range.
pub const CHANNEL_MIN: i64 = 1;
/// Upper bound of the stored channel range.
pub const CHANNEL_MAX: i64 = 255;

/// Runtime resource limits.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Concurrent declared arrays.
    pub max_arrays: usize,
    /// Lights per declared array.
    pub max_lights: usize,
    /// Dynamic call depth, guarding runaway recursion.
    pub max_call_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_arrays: 10,
            max_lights: 1000,
            max_call_depth: 256,
        }
    }
}

/// The interpreter: display, LED store, function registry and sinks.
pub struct Interpreter<C, P> {
    display: Display,
    store: LightStore,
    /// Registry backing [`FnId`] call-site caches.
    functions: Vec<Rc<FunctionDefinition>>,
    console: C,
    files: P,
    limits: Limits,
    call_depth: usize,
}

impl<C: ConsoleSink, P: PersistSink> Interpreter<C, P> {
    pub fn new(console: C, files: P) -> Self {
        Self::with_limits(console, files, Limits::default())
    }

    pub fn with_limits(console: C, files: P, limits: Limits) -> Self {
        Self {
            display: Display::new(),
            store: LightStore::new(limits.max_arrays, limits.max_lights),
            functions: Vec::new(),
            console,
            files,
            limits,
            call_depth: 0,
        }
    }

    /// Run a program to completion or to the first fatal error.
    pub fn run(&mut self, program: &Program) -> EvalResult<()> {
        for stmt in &program.stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// The declared LED arrays.
    pub fn store(&self) -> &LightStore {
        &self.store
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn files(&self) -> &P {
        &self.files
    }

    /// Current value of a global variable, for hosts inspecting a run.
    pub fn global(&self, name: &str) -> Option<Value> {
        let reference = self.display.find_reference(name)?;
        self.display.value(reference, name).ok()
    }

    // ── Statements ────────────────────────────────────────────────────────

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        self.exec(stmt).map_err(|e| e.at(stmt.span()))
    }

    fn exec(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Assign(s) => {
                let rhs = self.eval_expr(&s.value)?;
                // Plain assignment declares on first use; the compound
                // forms read the current value, so the name must exist.
                let reference =
                    self.resolve_reference(&s.target, &s.cache, s.op == AssignOp::Set)?;
                let stored = match s.op {
                    AssignOp::Set => rhs,
                    AssignOp::Add => self.display.value(reference, &s.target.name)?.add(&rhs)?,
                    AssignOp::Sub => self
                        .display
                        .value(reference, &s.target.name)?
                        .subtract(&rhs)?,
                    AssignOp::Mul => self
                        .display
                        .value(reference, &s.target.name)?
                        .multiply(&rhs)?,
                    AssignOp::Div => self
                        .display
                        .value(reference, &s.target.name)?
                        .divide(&rhs)?,
                };
                self.display.set_value(reference, clamp_channel(stored))
            }
            Stmt::Flip(s) => {
                let reference = self.resolve_reference(&s.target, &s.cache, false)?;
                let current = self
                    .display
                    .value(reference, &s.target.name)?
                    .as_integer()?;
                let flipped = (CHANNEL_MAX - current).clamp(CHANNEL_MIN, CHANNEL_MAX);
                self.display.set_value(reference, Value::Integer(flipped))
            }
            // Like plain assignment, clear and fill define on first use:
            // they store a constant, so no prior value is needed.
            Stmt::Clear(s) => {
                let reference = self.resolve_reference(&s.target, &s.cache, true)?;
                self.display
                    .set_value(reference, Value::Integer(CHANNEL_MIN))
            }
            Stmt::Fill(s) => {
                let reference = self.resolve_reference(&s.target, &s.cache, true)?;
                self.display
                    .set_value(reference, Value::Integer(CHANNEL_MAX))
            }
            Stmt::If(s) => {
                let cond = self.eval_expr(&s.cond)?.as_boolean()?;
                if cond {
                    self.exec_block(&s.then_block)
                } else if let Some(else_block) = &s.else_block {
                    self.exec_block(else_block)
                } else {
                    Ok(())
                }
            }
            Stmt::For(s) => {
                self.exec_stmt(&s.init)?;
                while self.eval_expr(&s.cond)?.as_boolean()? {
                    self.exec_block(&s.body)?;
                    self.exec_stmt(&s.step)?;
                }
                Ok(())
            }
            Stmt::FnDef(s) => self.exec_fn_def(s),
            Stmt::Call(s) => {
                // Statement position: a returned value is discarded.
                self.call_function(&s.name, &s.cache, &s.args, false)?;
                Ok(())
            }
            Stmt::Delay(s) => {
                let seconds = self.eval_expr(&s.seconds)?.as_integer()?.max(0);
                thread::sleep(Duration::from_secs(seconds as u64));
                Ok(())
            }
            Stmt::Leds(s) => {
                let size = self.eval_expr(&s.size)?.as_integer()?;
                let name = self.array_name(&s.name)?;
                self.store.declare(size, &name)
            }
            Stmt::Update(s) => {
                let red = self.eval_expr(&s.red)?.as_integer()?;
                let green = self.eval_expr(&s.green)?.as_integer()?;
                let blue = self.eval_expr(&s.blue)?.as_integer()?;
                let index = self.eval_expr(&s.index)?.as_integer()?;
                let name = self.array_name(&s.array)?;
                match self.store.update(&name, index, red, green, blue) {
                    // An unknown array is reported and skipped.
                    Err(e) if matches!(e.kind, ErrorKind::ArrayNotFound(_)) => {
                        self.console.line("led array not found");
                        Ok(())
                    }
                    other => other,
                }
            }
            Stmt::Write(s) => {
                let name = self.array_name(&s.array)?;
                if let Some(array) = self.store.get(&name) {
                    self.console.line("");
                    self.console.line(FRAME_LINE);
                    // The frame line repeats after every row.
                    for row in array.record_rows() {
                        self.console.line(&row);
                        self.console.line(FRAME_LINE);
                    }
                }
                Ok(())
            }
            Stmt::Info(s) => {
                let name = self.array_name(&s.array)?;
                if let Some(array) = self.store.get(&name) {
                    self.console.line("");
                    self.console.line(FRAME_LINE);
                    for row in array.colour_rows() {
                        self.console.line(&row);
                        self.console.line(FRAME_LINE);
                    }
                    self.console.line("");
                }
                Ok(())
            }
            Stmt::Save(s) => {
                let name = self.array_name(&s.array)?;
                if let Some(array) = self.store.get(&name) {
                    let mut contents = array.file_rows().join("\n");
                    contents.push('\n');
                    // Persistence failures are reported, not fatal.
                    if let Err(e) = self.files.persist(&name, &contents) {
                        let report = EvalError::new(ErrorKind::Io(e.to_string()));
                        self.console.line(&report.to_string());
                    }
                }
                Ok(())
            }
        }
    }

    fn exec_block(&mut self, block: &Block) -> EvalResult<()> {
        for stmt in &block.stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_fn_def(&mut self, s: &FnDefStmt) -> EvalResult<()> {
        // Already registered: the definition outlives every activation
        // of the enclosing function, so re-executing the node is a no-op.
        if s.cache.get().is_some() {
            return Ok(());
        }
        if self.display.find_function_in_current_level(&s.name.name).is_some() {
            return Err(ErrorKind::FunctionRedefined(s.name.name.clone()).into());
        }
        let def = Rc::new(FunctionDefinition::new(
            &s.name.name,
            self.display.level() + 1,
            &s.params,
            Rc::clone(&s.body),
            s.return_expr.clone(),
        )?);
        let id = FnId(self.functions.len() as u32);
        self.functions.push(Rc::clone(&def));
        self.display.add_function(def)?;
        s.cache.fill(id);
        Ok(())
    }

    // ── Expressions ───────────────────────────────────────────────────────

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.eval(expr).map_err(|e| e.at(expr.span))
    }

    fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            // Literals above the channel ceiling are pinned to it; the
            // lower bound is only enforced when a value is stored.
            ExprKind::IntegerLit(n) => Ok(Value::Integer((*n).min(CHANNEL_MAX))),
            ExprKind::RationalLit(r) => Ok(Value::Rational(*r)),
            ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Boolean(*b)),
            ExprKind::Deref { name, cache } => {
                let reference = self.resolve_reference(name, cache, false)?;
                self.display.value(reference, &name.name)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                match op {
                    UnaryOp::Plus => {
                        // Identity, but still numeric-only.
                        value.as_double()?;
                        Ok(value)
                    }
                    UnaryOp::Minus => Ok(value.negate()?),
                    UnaryOp::Not => Ok(value.not()?),
                }
            }
            ExprKind::Binary { op, left, right } => {
                let lhs = self.eval_expr(left)?;
                let rhs = self.eval_expr(right)?;
                let result = match op {
                    BinOp::Or => lhs.or(&rhs)?,
                    BinOp::And => lhs.and(&rhs)?,
                    BinOp::Eq => lhs.eq(&rhs)?,
                    BinOp::Neq => lhs.neq(&rhs)?,
                    BinOp::Gte => lhs.gte(&rhs)?,
                    BinOp::Lte => lhs.lte(&rhs)?,
                    BinOp::Gt => lhs.gt(&rhs)?,
                    BinOp::Lt => lhs.lt(&rhs)?,
                    BinOp::Add => clamp_channel(lhs.add(&rhs)?),
                    BinOp::Sub => clamp_channel(lhs.subtract(&rhs)?),
                    BinOp::Mul => clamp_channel(lhs.multiply(&rhs)?),
                    BinOp::Div => clamp_channel(lhs.divide(&rhs)?),
                };
                Ok(result)
            }
            ExprKind::Invoke { name, args, cache } => {
                match self.call_function(name, cache, args, true)? {
                    Some(value) => Ok(value),
                    None => Err(ErrorKind::Internal(format!(
                        "void call to {} reached expression context",
                        name.name
                    ))
                    .into()),
                }
            }
        }
    }

    // ── Name resolution ───────────────────────────────────────────────────

    /// Resolve a variable occurrence through its cache slot, searching
    /// the display on first evaluation.
    fn resolve_reference(
        &mut self,
        name: &Ident,
        cache: &RefSlot,
        define: bool,
    ) -> EvalResult<Reference> {
        if let Some(reference) = cache.get() {
            return Ok(reference);
        }
        let reference = match self.display.find_reference(&name.name) {
            Some(reference) => reference,
            None if define => self.display.define_variable(&name.name)?,
            None => {
                return Err(EvalError::new(ErrorKind::UndefinedVariable(name.name.clone()))
                    .at(name.span))
            }
        };
        cache.fill(reference);
        Ok(reference)
    }

    /// Resolve a call occurrence to its definition, filling the cache on
    /// first evaluation.
    fn resolve_function(
        &mut self,
        name: &Ident,
        cache: &FnSlot,
    ) -> EvalResult<Rc<FunctionDefinition>> {
        if let Some(FnId(id)) = cache.get() {
            if let Some(def) = self.functions.get(id as usize) {
                return Ok(Rc::clone(def));
            }
        }
        let def = self
            .display
            .find_function(&name.name)
            .ok_or_else(|| ErrorKind::UndefinedFunction(name.name.clone()))?;
        if let Some(id) = self.functions.iter().position(|f| Rc::ptr_eq(f, &def)) {
            cache.fill(FnId(id as u32));
        }
        Ok(def)
    }

    /// The shared call path for statement and expression position.
    /// Returns the return value, if the callee produces one.
    fn call_function(
        &mut self,
        name: &Ident,
        cache: &FnSlot,
        args: &[Expr],
        want_value: bool,
    ) -> EvalResult<Option<Value>> {
        let def = self.resolve_function(name, cache)?;
        if want_value && !def.has_return() {
            return Err(ErrorKind::Type(format!(
                "function {} does not return a value",
                name.name
            ))
            .into());
        }
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        if values.len() != def.param_count() {
            return Err(ErrorKind::ArityMismatch {
                name: name.name.clone(),
                expected: def.param_count(),
                got: values.len(),
            }
            .into());
        }
        if self.call_depth >= self.limits.max_call_depth {
            return Err(ErrorKind::CallDepthExceeded(self.limits.max_call_depth).into());
        }

        let saved = self
            .display
            .activate(FunctionInvocation::new(Rc::clone(&def), values))?;
        self.call_depth += 1;
        let result = self.run_body(&def);
        self.call_depth -= 1;
        self.display.restore(saved);
        result
    }

    fn run_body(&mut self, def: &FunctionDefinition) -> EvalResult<Option<Value>> {
        let body = def.body();
        self.exec_block(&body)?;
        match def.return_expr() {
            Some(expr) => Ok(Some(self.eval_expr(&expr)?)),
            None => Ok(None),
        }
    }

    // ── Domain helpers ────────────────────────────────────────────────────

    fn array_name(&mut self, expr: &Expr) -> EvalResult<String> {
        match self.eval_expr(expr)? {
            Value::String(name) => Ok(name),
            other => Err(EvalError::new(ErrorKind::Type(format!(
                "led array names are strings, got {}",
                other.type_name()
            )))
            .at(expr.span)),
        }
    }
}

/// Pin an integer into the stored channel range. Non-integers pass
/// through untouched.
fn clamp_channel(value: Value) -> Value {
    match value {
        Value::Integer(n) => Value::Integer(n.clamp(CHANNEL_MIN, CHANNEL_MAX)),
        other => other,
    }
}
