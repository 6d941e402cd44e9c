//! Core types for the calculator service

use serde::{Serialize, Serializer};
use std::fmt;
use utoipa::ToSchema;

/// Largest magnitude below which every integral `f64` is exactly representable.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// An arithmetic operation exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Sqrt,
    Modulo,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
        Operation::Sqrt,
        Operation::Modulo,
    ];

    /// Route path for this operation
    pub fn path(self) -> &'static str {
        match self {
            Operation::Add => "/add",
            Operation::Subtract => "/subtract",
            Operation::Multiply => "/multiply",
            Operation::Divide => "/divide",
            Operation::Power => "/power",
            Operation::Sqrt => "/sqrt",
            Operation::Modulo => "/modulo",
        }
    }

    /// Noun used in request log lines ("New addition operation requested")
    pub fn noun(self) -> &'static str {
        match self {
            Operation::Add => "addition",
            Operation::Subtract => "subtraction",
            Operation::Multiply => "multiplication",
            Operation::Divide => "division",
            Operation::Power => "exponentiation",
            Operation::Sqrt => "square root",
            Operation::Modulo => "modulo",
        }
    }

    /// Prefix used in error log lines ("Division error: ...")
    pub fn label(self) -> &'static str {
        match self {
            Operation::Add => "Addition",
            Operation::Subtract => "Subtraction",
            Operation::Multiply => "Multiplication",
            Operation::Divide => "Division",
            Operation::Power => "Power",
            Operation::Sqrt => "Sqrt",
            Operation::Modulo => "Modulo",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
            Operation::Power => "^",
            Operation::Sqrt => "√",
            Operation::Modulo => "%",
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operation::Sqrt)
    }

    /// Number of operands the operation takes
    pub fn arity(self) -> usize {
        if self.is_unary() {
            1
        } else {
            2
        }
    }

    /// Human-readable rendering of the requested expression, e.g. `2 + 3` or `√9`
    pub fn describe(self, operands: &Operands) -> String {
        match operands {
            Operands::Unary { num } => format!("{}{}", self.symbol(), show(num)),
            Operands::Binary { num1, num2 } => {
                format!("{} {} {}", show(num1), self.symbol(), show(num2))
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path()[1..])
    }
}

/// Raw operands exactly as received, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
    Unary { num: Option<String> },
    Binary { num1: Option<String>, num2: Option<String> },
}

impl Operands {
    pub fn unary(num: impl Into<String>) -> Self {
        Operands::Unary { num: Some(num.into()) }
    }

    pub fn binary(num1: impl Into<String>, num2: impl Into<String>) -> Self {
        Operands::Binary {
            num1: Some(num1.into()),
            num2: Some(num2.into()),
        }
    }

    /// Build operands for `op` from positional values (CLI input).
    ///
    /// Values short of the arity stay missing. `None` if there are more
    /// values than `op` takes.
    pub fn for_operation(op: Operation, values: Vec<String>) -> Option<Self> {
        if values.len() > op.arity() {
            return None;
        }

        let mut values = values.into_iter();
        let operands = if op.is_unary() {
            Operands::Unary { num: values.next() }
        } else {
            Operands::Binary {
                num1: values.next(),
                num2: values.next(),
            }
        };
        Some(operands)
    }
}

/// Renders as `num1=a, num2=b` / `num=a` for error logs
impl fmt::Display for Operands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operands::Unary { num } => write!(f, "num={}", show(num)),
            Operands::Binary { num1, num2 } => {
                write!(f, "num1={}, num2={}", show(num1), show(num2))
            }
        }
    }
}

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<missing>")
}

/// Successful calculation body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CalcResponse {
    /// Computed value; integral results are encoded as JSON integers
    #[serde(serialize_with = "serialize_number")]
    pub result: f64,
}

/// Error body for 4xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Encode a result the way a JSON number reads naturally: `5` rather than
/// `5.0`, `null` for values JSON cannot carry.
pub fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !value.is_finite() {
        serializer.serialize_none()
    } else if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
