//! Runtime error taxonomy for the Glint evaluator.
//!
//! All runtime failures carry an [`ErrorKind`] plus, where known, the
//! span of the offending node. `Io` and `ArrayNotFound`-on-update are
//! the only non-fatal kinds; the evaluator reports them on the console
//! sink and continues. Everything else aborts the run.

use glint_types::{Span, ValueError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kinds of runtime failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ErrorKind {
    /// Dereferencing a name with no binding in any enclosing level.
    #[error("variable or parameter {0} is undefined")]
    UndefinedVariable(String),

    /// A declared slot read before its first assignment in this activation.
    #[error("variable {0} is used before assignment")]
    UnsetVariable(String),

    /// Calling a function with no definition in any enclosing level.
    #[error("function {0} is undefined")]
    UndefinedFunction(String),

    /// Defining a function whose name already exists at the current level.
    #[error("function {0} already exists")]
    FunctionRedefined(String),

    /// Declaring a variable or parameter twice at the same level.
    #[error("variable {0} is already declared at this level")]
    VariableRedefined(String),

    /// Invocation argument count does not match the parameter count.
    #[error("function {name} expects {expected} arguments, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Operator applied to incompatible tags, non-Boolean test, or a
    /// void call used in expression context.
    #[error("type error: {0}")]
    Type(String),

    /// Division by zero.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// Array-name lookup miss. Non-fatal during `update`.
    #[error("led array {0} not found")]
    ArrayNotFound(String),

    /// Light index outside the array's declared size.
    #[error("light {index} is out of range for array {array} of size {size}")]
    IndexOutOfRange {
        array: String,
        index: i64,
        size: usize,
    },

    /// Declaring more concurrent arrays than the configured limit.
    #[error("led array limit reached ({0} arrays)")]
    ArrayCapacity(usize),

    /// Declaring an array larger than the per-array light limit.
    #[error("array {name} exceeds the light capacity ({max})")]
    LightCapacity { name: String, max: usize },

    /// Declaring an array whose name is already in use.
    #[error("led array {0} is already declared")]
    DuplicateArray(String),

    /// Lexical function nesting beyond the display's capacity.
    #[error("function nesting exceeds the maximum depth ({0})")]
    NestingTooDeep(usize),

    /// Runaway recursion guard.
    #[error("call depth limit exceeded ({0})")]
    CallDepthExceeded(usize),

    /// Persistence sink failure. Non-fatal: reported, run continues.
    #[error("io error: {0}")]
    Io(String),

    /// An internal consistency check failed.
    #[error("internal evaluator error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Stable machine-readable code for host consumption.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UndefinedVariable(_) | ErrorKind::UnsetVariable(_) => "name",
            ErrorKind::UndefinedFunction(_) => "name",
            ErrorKind::FunctionRedefined(_) | ErrorKind::VariableRedefined(_) => "redefinition",
            ErrorKind::ArityMismatch { .. } => "arity",
            ErrorKind::Type(_) => "type",
            ErrorKind::Arithmetic(_) => "arithmetic",
            ErrorKind::ArrayNotFound(_) => "domain-not-found",
            ErrorKind::IndexOutOfRange { .. } => "index",
            ErrorKind::ArrayCapacity(_)
            | ErrorKind::LightCapacity { .. }
            | ErrorKind::NestingTooDeep(_)
            | ErrorKind::CallDepthExceeded(_) => "resource-exhausted",
            ErrorKind::DuplicateArray(_) => "naming-conflict",
            ErrorKind::Io(_) => "io",
            ErrorKind::Internal(_) => "internal",
        }
    }
}

/// A runtime error with the offending node's source context.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub span: Option<Span>,
}

impl EvalError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, span: None }
    }

    /// Attach a span if none is set yet. The innermost frame wins.
    pub fn at(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    /// Convert into the serializable host-facing report.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            code: self.kind.code().to_string(),
            message: self.kind.to_string(),
            line: self.span.map(|s| s.start_line),
            column: self.span.map(|s| s.start_col),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} at {span}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<ErrorKind> for EvalError {
    fn from(kind: ErrorKind) -> Self {
        EvalError::new(kind)
    }
}

impl From<ValueError> for EvalError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::TypeMismatch(msg) => EvalError::new(ErrorKind::Type(msg)),
            ValueError::DivisionByZero => {
                EvalError::new(ErrorKind::Arithmetic("division by zero".into()))
            }
        }
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// The structured report handed to embedding hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable error-kind code (`"name"`, `"type"`, `"arity"`, ...).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// 1-based source line, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-based source column, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_span_wins() {
        let err = EvalError::new(ErrorKind::Type("test".into()))
            .at(Span::point(3, 1))
            .at(Span::point(10, 1));
        assert_eq!(err.span, Some(Span::point(3, 1)));
    }

    #[test]
    fn display_includes_span() {
        let err = EvalError::new(ErrorKind::UndefinedVariable("x".into())).at(Span::point(2, 7));
        assert_eq!(
            err.to_string(),
            "variable or parameter x is undefined at 2:7"
        );
    }

    #[test]
    fn value_errors_map_onto_eval_kinds() {
        let type_err: EvalError = ValueError::TypeMismatch("bad".into()).into();
        assert!(matches!(type_err.kind, ErrorKind::Type(_)));
        let div_err: EvalError = ValueError::DivisionByZero.into();
        assert!(matches!(div_err.kind, ErrorKind::Arithmetic(_)));
    }

    #[test]
    fn diagnostic_json_round_trip() {
        let err = EvalError::new(ErrorKind::ArityMismatch {
            name: "pulse".into(),
            expected: 2,
            got: 3,
        })
        .at(Span::point(5, 3));
        let json = serde_json::to_string(&err.to_diagnostic()).unwrap();
        assert!(json.contains("\"code\":\"arity\""));
        assert!(json.contains("\"line\":5"));

        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, "arity");
        assert_eq!(back.message, "function pulse expects 2 arguments, got 3");
    }

    #[test]
    fn diagnostic_omits_unknown_location() {
        let err = EvalError::new(ErrorKind::Io("disk full".into()));
        let json = serde_json::to_string(&err.to_diagnostic()).unwrap();
        assert!(!json.contains("line"));
    }
}
