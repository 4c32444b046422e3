//! AST node types for the Glint language.
//!
//! The tree is produced once by the front end and never rebuilt, so each
//! syntactic occurrence of a name maps to exactly one node instance.
//! Name-bearing nodes carry a lazily-populated resolution cache slot
//! ([`RefSlot`] / [`FnSlot`]): the evaluator resolves the name on first
//! evaluation and memoises the *binding* there. Only the binding is
//! cached — the current value is always re-read through the display.
//!
//! Every node carries a [`Span`] for error reporting. Large recursive
//! types are boxed to keep enum sizes reasonable.

use crate::Span;
use std::cell::Cell;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Binding handles & cache slots
// ══════════════════════════════════════════════════════════════════════════════

/// Handle to a variable storage cell: a lexical level plus a slot number
/// within that level's activation record. The cell behind a reference is
/// resolved through the live display, so a cached reference observes the
/// current value of the current activation at its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub level: u32,
    pub slot: u32,
}

impl Reference {
    pub fn new(level: u32, slot: u32) -> Self {
        Self { level, slot }
    }
}

/// Handle into the evaluator's function registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FnId(pub u32);

/// Per-node memo slot for a resolved variable [`Reference`].
///
/// Populated at most once per node instance; the AST itself never reads
/// it. Cloning a node yields an empty slot, since a clone is a new
/// syntactic occurrence.
#[derive(Debug, Default)]
pub struct RefSlot(Cell<Option<Reference>>);

impl RefSlot {
    pub fn get(&self) -> Option<Reference> {
        self.0.get()
    }

    pub fn fill(&self, reference: Reference) {
        self.0.set(Some(reference));
    }
}

impl Clone for RefSlot {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for RefSlot {
    // Cache state is not part of the syntax tree.
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Per-node memo slot for a resolved [`FnId`].
#[derive(Debug, Default)]
pub struct FnSlot(Cell<Option<FnId>>);

impl FnSlot {
    pub fn get(&self) -> Option<FnId> {
        self.0.get()
    }

    pub fn fill(&self, id: FnId) {
        self.0.set(Some(id));
    }
}

impl Clone for FnSlot {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for FnSlot {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Glint program: statements executed in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self {
            stmts,
            span: Span::default(),
        }
    }
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `{ statements... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self {
            stmts,
            span: Span::default(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `x = expr`, `x += expr`, `x -= expr`, `x *= expr`, `x /= expr`
    Assign(AssignStmt),
    /// Store `clamp(255 - x)` back into `x`.
    Flip(TargetStmt),
    /// Store 1 into the target.
    Clear(TargetStmt),
    /// Store 255 into the target.
    Fill(TargetStmt),
    /// `if cond { ... } [else { ... }]`
    If(IfStmt),
    /// C-style three-clause loop.
    For(ForStmt),
    /// Function definition.
    FnDef(FnDefStmt),
    /// Statement-position function call (return value, if any, discarded).
    Call(CallStmt),
    /// Block the interpreter for the given number of seconds.
    Delay(DelayStmt),
    /// Declare a named light array.
    Leds(LedsStmt),
    /// Set one light's RGB channels (and derived colour name).
    Update(UpdateStmt),
    /// Dump an array's raw `R-G-B` records to the console sink.
    Write(DumpStmt),
    /// Dump an array's colour names to the console sink.
    Info(DumpStmt),
    /// Persist an array's raw records to the file sink.
    Save(DumpStmt),
}

impl Stmt {
    /// The span of the statement, for error context.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign(s) => s.span,
            Stmt::Flip(s) | Stmt::Clear(s) | Stmt::Fill(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::FnDef(s) => s.span,
            Stmt::Call(s) => s.span,
            Stmt::Delay(s) => s.span,
            Stmt::Leds(s) => s.span,
            Stmt::Update(s) => s.span,
            Stmt::Write(s) | Stmt::Info(s) | Stmt::Save(s) => s.span,
        }
    }

    /// `target = value`
    pub fn assign(target: &str, value: Expr) -> Stmt {
        Stmt::Assign(AssignStmt::new(target, AssignOp::Set, value))
    }

    /// `target <op>= value`
    pub fn compound(target: &str, op: AssignOp, value: Expr) -> Stmt {
        Stmt::Assign(AssignStmt::new(target, op, value))
    }

    pub fn flip(target: &str) -> Stmt {
        Stmt::Flip(TargetStmt::new(target))
    }

    pub fn clear(target: &str) -> Stmt {
        Stmt::Clear(TargetStmt::new(target))
    }

    pub fn fill(target: &str) -> Stmt {
        Stmt::Fill(TargetStmt::new(target))
    }
}

/// The assignment operator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
}

/// `target <op>= value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Ident,
    pub op: AssignOp,
    pub value: Expr,
    pub cache: RefSlot,
    pub span: Span,
}

impl AssignStmt {
    pub fn new(target: &str, op: AssignOp, value: Expr) -> Self {
        Self {
            target: Ident::new(target, Span::default()),
            op,
            value,
            cache: RefSlot::default(),
            span: Span::default(),
        }
    }
}

/// A statement that only names its target (flip / clear / fill).
#[derive(Debug, Clone, PartialEq)]
pub struct TargetStmt {
    pub target: Ident,
    pub cache: RefSlot,
    pub span: Span,
}

impl TargetStmt {
    pub fn new(target: &str) -> Self {
        Self {
            target: Ident::new(target, Span::default()),
            cache: RefSlot::default(),
            span: Span::default(),
        }
    }
}

/// `if cond { ... } [else { ... }]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub span: Span,
}

impl IfStmt {
    pub fn new(cond: Expr, then_block: Block, else_block: Option<Block>) -> Self {
        Self {
            cond,
            then_block,
            else_block,
            span: Span::default(),
        }
    }
}

/// `for (init; cond; step) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Box<Stmt>,
    pub cond: Expr,
    pub step: Box<Stmt>,
    pub body: Block,
    pub span: Span,
}

impl ForStmt {
    pub fn new(init: Stmt, cond: Expr, step: Stmt, body: Block) -> Self {
        Self {
            init: Box::new(init),
            cond,
            step: Box::new(step),
            body,
            span: Span::default(),
        }
    }
}

/// Function definition: name, parameters, body, optional return expression.
///
/// The body and return expression are reference-counted so the runtime
/// function definition can share them without cloning the subtrees.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDefStmt {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Rc<Block>,
    pub return_expr: Option<Rc<Expr>>,
    pub cache: FnSlot,
    pub span: Span,
}

impl FnDefStmt {
    pub fn new(name: &str, params: &[&str], body: Block, return_expr: Option<Expr>) -> Self {
        Self {
            name: Ident::new(name, Span::default()),
            params: params
                .iter()
                .map(|p| Ident::new(*p, Span::default()))
                .collect(),
            body: Rc::new(body),
            return_expr: return_expr.map(Rc::new),
            cache: FnSlot::default(),
            span: Span::default(),
        }
    }
}

/// Statement-position call: `name(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStmt {
    pub name: Ident,
    pub args: Vec<Expr>,
    pub cache: FnSlot,
    pub span: Span,
}

impl CallStmt {
    pub fn new(name: &str, args: Vec<Expr>) -> Self {
        Self {
            name: Ident::new(name, Span::default()),
            args,
            cache: FnSlot::default(),
            span: Span::default(),
        }
    }
}

/// `delay seconds`
#[derive(Debug, Clone, PartialEq)]
pub struct DelayStmt {
    pub seconds: Expr,
    pub span: Span,
}

impl DelayStmt {
    pub fn new(seconds: Expr) -> Self {
        Self {
            seconds,
            span: Span::default(),
        }
    }
}

/// `leds size name` — declare a light array.
#[derive(Debug, Clone, PartialEq)]
pub struct LedsStmt {
    pub size: Expr,
    pub name: Expr,
    pub span: Span,
}

impl LedsStmt {
    pub fn new(size: Expr, name: Expr) -> Self {
        Self {
            size,
            name,
            span: Span::default(),
        }
    }
}

/// `update r g b index name` — set one light of a named array.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub red: Expr,
    pub green: Expr,
    pub blue: Expr,
    pub index: Expr,
    pub array: Expr,
    pub span: Span,
}

impl UpdateStmt {
    pub fn new(red: Expr, green: Expr, blue: Expr, index: Expr, array: Expr) -> Self {
        Self {
            red,
            green,
            blue,
            index,
            array,
            span: Span::default(),
        }
    }
}

/// A dump/persist statement naming an array (`write`, `info`, `save`).
#[derive(Debug, Clone, PartialEq)]
pub struct DumpStmt {
    pub array: Expr,
    pub span: Span,
}

impl DumpStmt {
    pub fn new(array: Expr) -> Self {
        Self {
            array,
            span: Span::default(),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node. Uses `Box` for recursive variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// The expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntegerLit(i64),
    RationalLit(f64),
    StringLit(String),
    BoolLit(bool),
    /// Variable or parameter dereference.
    Deref { name: Ident, cache: RefSlot },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Expression-position call — the callee must have a return value.
    Invoke {
        name: Ident,
        args: Vec<Expr>,
        cache: FnSlot,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Neq,
    Gte,
    Lte,
    Gt,
    Lt,
    Add,
    Sub,
    Mul,
    Div,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn integer(value: i64) -> Expr {
        Expr::new(ExprKind::IntegerLit(value), Span::default())
    }

    pub fn rational(value: f64) -> Expr {
        Expr::new(ExprKind::RationalLit(value), Span::default())
    }

    pub fn string(value: impl Into<String>) -> Expr {
        Expr::new(ExprKind::StringLit(value.into()), Span::default())
    }

    pub fn boolean(value: bool) -> Expr {
        Expr::new(ExprKind::BoolLit(value), Span::default())
    }

    /// A variable dereference with an empty cache slot.
    pub fn var(name: &str) -> Expr {
        Expr::new(
            ExprKind::Deref {
                name: Ident::new(name, Span::default()),
                cache: RefSlot::default(),
            },
            Span::default(),
        )
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            Span::default(),
        )
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            Span::default(),
        )
    }

    /// An expression-position call with an empty cache slot.
    pub fn invoke(name: &str, args: Vec<Expr>) -> Expr {
        Expr::new(
            ExprKind::Invoke {
                name: Ident::new(name, Span::default()),
                args,
                cache: FnSlot::default(),
            },
            Span::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_slot_fills_once_and_reads_back() {
        let slot = RefSlot::default();
        assert_eq!(slot.get(), None);
        slot.fill(Reference::new(0, 3));
        assert_eq!(slot.get(), Some(Reference::new(0, 3)));
    }

    #[test]
    fn cloned_nodes_get_fresh_cache_slots() {
        let original = Expr::var("x");
        if let ExprKind::Deref { cache, .. } = &original.kind {
            cache.fill(Reference::new(1, 0));
        }
        let copy = original.clone();
        if let ExprKind::Deref { cache, .. } = &copy.kind {
            assert_eq!(cache.get(), None, "a clone is a new syntactic occurrence");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn cache_state_does_not_affect_equality() {
        let a = Expr::var("x");
        let b = Expr::var("x");
        if let ExprKind::Deref { cache, .. } = &a.kind {
            cache.fill(Reference::new(0, 0));
        }
        assert_eq!(a, b);
    }

    #[test]
    fn stmt_span_reaches_payload() {
        let mut s = AssignStmt::new("x", AssignOp::Set, Expr::integer(1));
        s.span = Span::point(4, 2);
        assert_eq!(Stmt::Assign(s).span(), Span::point(4, 2));
    }
}
