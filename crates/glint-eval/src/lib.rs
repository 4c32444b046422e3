//! Glint runtime: a tree-walking evaluator for the Glint LED scripting
//! language.
//!
//! The evaluator walks the AST from `glint-types` directly. Variable and
//! function occurrences memoise their resolved binding in per-node cache
//! slots, values flow through the display's activation frames, and the
//! LED statements drive a bounded in-memory light store whose dumps go
//! to pluggable console and file sinks.
//!
//! ```
//! use glint_eval::{Interpreter, MemoryConsole, MemoryStore};
//! use glint_types::ast::{Expr, Program, Stmt};
//!
//! let program = Program::new(vec![
//!     Stmt::assign("brightness", Expr::integer(200)),
//!     Stmt::flip("brightness"),
//! ]);
//! let mut interp = Interpreter::new(MemoryConsole::default(), MemoryStore::default());
//! interp.run(&program).unwrap();
//! assert_eq!(interp.global("brightness"), Some(glint_types::Value::Integer(55)));
//! ```

mod display;
mod error;
mod evaluator;
mod function;
mod sink;
mod store;

pub use display::{Display, MAX_NESTING};
pub use error::{Diagnostic, ErrorKind, EvalError, EvalResult};
pub use evaluator::{Interpreter, Limits, CHANNEL_MAX, CHANNEL_MIN};
pub use function::{FunctionDefinition, FunctionInvocation};
pub use sink::{
    ConsoleSink, DirStore, MemoryConsole, MemoryStore, PersistSink, StdoutConsole, SAVE_EXTENSION,
};
pub use store::{Colour, LedArray, Light, LightStore, FRAME_LINE};
