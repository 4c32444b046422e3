//! The tagged value model.
//!
//! A [`Value`] is immutable once constructed: every operator returns a
//! freshly built value. Operators are defined only for compatible tag
//! combinations; mixed Integer/Rational arithmetic promotes to Rational.
//! The domain saturating clamp does NOT live here — it is applied by the
//! evaluator at the domain-semantic call sites.

use std::fmt;
use thiserror::Error;

/// Errors raised by value-model operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    /// An operator was applied to incompatible value tags.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Integer or rational division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

/// Result alias for value-model operations.
pub type ValueResult = Result<Value, ValueError>;

/// A runtime value: one of the four built-in kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Rational(f64),
    Boolean(bool),
    String(String),
}

impl Value {
    /// The tag name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Rational(_) => "rational",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The integer content. Fails for non-Integer tags.
    pub fn as_integer(&self) -> Result<i64, ValueError> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(ValueError::TypeMismatch(format!(
                "expected integer, got {}",
                other.type_name()
            ))),
        }
    }

    /// The numeric content widened to a double. Integers promote.
    pub fn as_double(&self) -> Result<f64, ValueError> {
        match self {
            Value::Integer(n) => Ok(*n as f64),
            Value::Rational(r) => Ok(*r),
            other => Err(ValueError::TypeMismatch(format!(
                "expected a numeric value, got {}",
                other.type_name()
            ))),
        }
    }

    /// The boolean content. Fails for non-Boolean tags.
    pub fn as_boolean(&self) -> Result<bool, ValueError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(ValueError::TypeMismatch(format!(
                "expected boolean, got {}",
                other.type_name()
            ))),
        }
    }

    /// The display form of any value. Used for array-name lookups and
    /// the `R-G-B` light records.
    pub fn as_string(&self) -> String {
        self.to_string()
    }

    // ── Arithmetic ────────────────────────────────────────────────────────

    pub fn add(&self, other: &Value) -> ValueResult {
        self.arith(other, "+", |a, b| a.saturating_add(b), |a, b| a + b)
    }

    pub fn subtract(&self, other: &Value) -> ValueResult {
        self.arith(other, "-", |a, b| a.saturating_sub(b), |a, b| a - b)
    }

    pub fn multiply(&self, other: &Value) -> ValueResult {
        self.arith(other, "*", |a, b| a.saturating_mul(b), |a, b| a * b)
    }

    pub fn divide(&self, other: &Value) -> ValueResult {
        match (self, other) {
            (Value::Integer(_), Value::Integer(0)) => Err(ValueError::DivisionByZero),
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_div(*b))),
            _ => {
                let (a, b) = self.numeric_pair(other, "/")?;
                if b == 0.0 {
                    Err(ValueError::DivisionByZero)
                } else {
                    Ok(Value::Rational(a / b))
                }
            }
        }
    }

    pub fn negate(&self) -> ValueResult {
        match self {
            Value::Integer(n) => Ok(Value::Integer(n.saturating_neg())),
            Value::Rational(r) => Ok(Value::Rational(-r)),
            other => Err(ValueError::TypeMismatch(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        }
    }

    // ── Logical ───────────────────────────────────────────────────────────

    pub fn not(&self) -> ValueResult {
        Ok(Value::Boolean(!self.as_boolean()?))
    }

    pub fn and(&self, other: &Value) -> ValueResult {
        Ok(Value::Boolean(self.as_boolean()? && other.as_boolean()?))
    }

    pub fn or(&self, other: &Value) -> ValueResult {
        Ok(Value::Boolean(self.as_boolean()? || other.as_boolean()?))
    }

    // ── Comparison ────────────────────────────────────────────────────────

    /// Equality. Numerics compare across tags; String and Boolean only
    /// against the same tag.
    pub fn eq(&self, other: &Value) -> ValueResult {
        Ok(Value::Boolean(self.raw_eq(other)?))
    }

    pub fn neq(&self, other: &Value) -> ValueResult {
        Ok(Value::Boolean(!self.raw_eq(other)?))
    }

    pub fn lt(&self, other: &Value) -> ValueResult {
        let (a, b) = self.numeric_pair(other, "<")?;
        Ok(Value::Boolean(a < b))
    }

    pub fn lte(&self, other: &Value) -> ValueResult {
        let (a, b) = self.numeric_pair(other, "<=")?;
        Ok(Value::Boolean(a <= b))
    }

    pub fn gt(&self, other: &Value) -> ValueResult {
        let (a, b) = self.numeric_pair(other, ">")?;
        Ok(Value::Boolean(a > b))
    }

    pub fn gte(&self, other: &Value) -> ValueResult {
        let (a, b) = self.numeric_pair(other, ">=")?;
        Ok(Value::Boolean(a >= b))
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn raw_eq(&self, other: &Value) -> Result<bool, ValueError> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a == b),
            (Value::String(a), Value::String(b)) => Ok(a == b),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
            (Value::Integer(_) | Value::Rational(_), Value::Integer(_) | Value::Rational(_)) => {
                // Mixed numeric equality promotes to rational.
                Ok(self.as_double()? == other.as_double()?)
            }
            _ => Err(ValueError::TypeMismatch(format!(
                "cannot compare {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    fn arith(
        &self,
        other: &Value,
        symbol: &str,
        int_op: fn(i64, i64) -> i64,
        rat_op: fn(f64, f64) -> f64,
    ) -> ValueResult {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(int_op(*a, *b))),
            _ => {
                let (a, b) = self.numeric_pair(other, symbol)?;
                Ok(Value::Rational(rat_op(a, b)))
            }
        }
    }

    fn numeric_pair(&self, other: &Value, symbol: &str) -> Result<(f64, f64), ValueError> {
        match (self.as_double(), other.as_double()) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            _ => Err(ValueError::TypeMismatch(format!(
                "cannot apply '{symbol}' to {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Rational(r) => write!(f, "{r}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}
