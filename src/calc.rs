//! Input validation and the arithmetic core
//!
//! Everything here is pure: no logging, no HTTP. Handlers and the CLI share
//! [`evaluate`] so both surfaces reject and compute identically.

use thiserror::Error;

use crate::types::{Operands, Operation};

/// Whether a rejection came from unparseable input or undefined math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Domain,
}

/// A rejected calculation. `Display` is the client-facing message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    #[error("Invalid input: num1 and num2 must be numbers.")]
    InvalidOperands,

    #[error("Invalid input: num must be a number.")]
    InvalidOperand,

    #[error("Division by zero is not allowed.")]
    DivisionByZero,

    #[error("Modulo by zero is not allowed.")]
    ModuloByZero,

    #[error("Square root of negative number is not allowed.")]
    NegativeSquareRoot,
}

impl CalcError {
    pub fn kind(self) -> ErrorKind {
        match self {
            CalcError::InvalidOperands | CalcError::InvalidOperand => ErrorKind::Validation,
            CalcError::DivisionByZero | CalcError::ModuloByZero | CalcError::NegativeSquareRoot => {
                ErrorKind::Domain
            }
        }
    }

    /// Short phrase for error log lines
    pub fn reason(self) -> &'static str {
        match self {
            CalcError::InvalidOperands | CalcError::InvalidOperand => "Invalid input",
            CalcError::DivisionByZero => "Division by zero",
            CalcError::ModuloByZero => "Modulo by zero",
            CalcError::NegativeSquareRoot => "Square root of negative number not allowed",
        }
    }
}

/// Parse the longest numeric prefix of a raw value, after leading whitespace.
///
/// `12abc` reads as 12 and `0x10` as 0. Only the exact spelling `Infinity`
/// (optionally signed) denotes an infinite value. `None` when no prefix is
/// numeric or the value is missing.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim_start();
    match numeric_prefix_len(s) {
        0 => None,
        end => s[..end].parse::<f64>().ok(),
    }
}

// sign? (Infinity | digits [. digits] | . digits) [(e|E) sign? digits]
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        return end + "Infinity".len();
    }

    let int_digits = digits(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    end
}

/// Validate a pair of raw operands
pub fn validate_numbers(num1: Option<&str>, num2: Option<&str>) -> Result<(f64, f64), CalcError> {
    match (parse_number(num1), parse_number(num2)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(CalcError::InvalidOperands),
    }
}

/// Validate a single raw operand
pub fn validate_number(num: Option<&str>) -> Result<f64, CalcError> {
    parse_number(num).ok_or(CalcError::InvalidOperand)
}

/// Validate `operands` and apply `op` to them.
pub fn evaluate(op: Operation, operands: &Operands) -> Result<f64, CalcError> {
    if op.is_unary() {
        let num = match operands {
            Operands::Unary { num } => validate_number(num.as_deref())?,
            Operands::Binary { num1, .. } => validate_number(num1.as_deref())?,
        };
        return unary(op, num);
    }

    let (a, b) = match operands {
        Operands::Binary { num1, num2 } => validate_numbers(num1.as_deref(), num2.as_deref())?,
        Operands::Unary { .. } => return Err(CalcError::InvalidOperands),
    };
    binary(op, a, b)
}

fn unary(op: Operation, num: f64) -> Result<f64, CalcError> {
    match op {
        Operation::Sqrt if num < 0.0 => Err(CalcError::NegativeSquareRoot),
        Operation::Sqrt => Ok(num.sqrt()),
        _ => Err(CalcError::InvalidOperands),
    }
}

fn binary(op: Operation, a: f64, b: f64) -> Result<f64, CalcError> {
    match op {
        Operation::Add => Ok(a + b),
        Operation::Subtract => Ok(a - b),
        Operation::Multiply => Ok(a * b),
        Operation::Divide if b == 0.0 => Err(CalcError::DivisionByZero),
        Operation::Divide => Ok(a / b),
        Operation::Power => Ok(a.powf(b)),
        // `%` on f64 is the truncated remainder: the sign follows the dividend
        Operation::Modulo if b == 0.0 => Err(CalcError::ModuloByZero),
        Operation::Modulo => Ok(a % b),
        Operation::Sqrt => Err(CalcError::InvalidOperand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: Operation, a: &str, b: &str) -> Result<f64, CalcError> {
        evaluate(op, &Operands::binary(a, b))
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("3")), Some(3.0));
        assert_eq!(parse_number(Some(" -2.5 ")), Some(-2.5));
        assert_eq!(parse_number(Some("1e3")), Some(1000.0));
        assert_eq!(parse_number(Some("+.5")), Some(0.5));
        assert_eq!(parse_number(Some("7.")), Some(7.0));
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("foo")), None);
        assert_eq!(parse_number(Some(".")), None);
        assert_eq!(parse_number(Some("-")), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_parse_number_reads_numeric_prefix() {
        assert_eq!(parse_number(Some("12abc")), Some(12.0));
        assert_eq!(parse_number(Some("9px")), Some(9.0));
        assert_eq!(parse_number(Some("  3")), Some(3.0));
        assert_eq!(parse_number(Some("0x10")), Some(0.0));
        assert_eq!(parse_number(Some("1.5.2")), Some(1.5));
        // Incomplete exponents are not part of the prefix
        assert_eq!(parse_number(Some("2e")), Some(2.0));
        assert_eq!(parse_number(Some("2e+x")), Some(2.0));
        assert_eq!(parse_number(Some("2E-2kg")), Some(0.02));
    }

    #[test]
    fn test_parse_number_infinity_spelling() {
        assert_eq!(parse_number(Some("Infinity")), Some(f64::INFINITY));
        assert_eq!(parse_number(Some("-Infinityx")), Some(f64::NEG_INFINITY));
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(Some("+inf")), None);
        assert_eq!(parse_number(Some("infinity")), None);
        assert_eq!(parse_number(Some("INFINITY")), None);
    }

    #[test]
    fn test_validate_numbers() {
        assert_eq!(validate_numbers(Some("1"), Some("2")), Ok((1.0, 2.0)));
        assert_eq!(validate_numbers(Some("foo"), Some("2")), Err(CalcError::InvalidOperands));
        assert_eq!(validate_numbers(Some("1"), None), Err(CalcError::InvalidOperands));
        assert_eq!(validate_number(Some("x")), Err(CalcError::InvalidOperand));
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval(Operation::Add, "2", "3"), Ok(5.0));
        assert_eq!(eval(Operation::Subtract, "2", "3"), Ok(-1.0));
        assert_eq!(eval(Operation::Multiply, "2.5", "4"), Ok(10.0));
        assert_eq!(eval(Operation::Divide, "10", "2"), Ok(5.0));
        assert_eq!(eval(Operation::Power, "2", "3"), Ok(8.0));
        assert_eq!(eval(Operation::Modulo, "10", "3"), Ok(1.0));
    }

    #[test]
    fn test_modulo_sign_follows_dividend() {
        assert_eq!(eval(Operation::Modulo, "-7", "3"), Ok(-1.0));
        assert_eq!(eval(Operation::Modulo, "7", "-3"), Ok(1.0));
        assert_eq!(eval(Operation::Modulo, "5.5", "2"), Ok(1.5));
    }

    #[test]
    fn test_zero_divisors_rejected() {
        assert_eq!(eval(Operation::Divide, "10", "0"), Err(CalcError::DivisionByZero));
        assert_eq!(eval(Operation::Divide, "10", "-0"), Err(CalcError::DivisionByZero));
        assert_eq!(eval(Operation::Modulo, "10", "0"), Err(CalcError::ModuloByZero));
        // A zero dividend is fine
        assert_eq!(eval(Operation::Divide, "0", "4"), Ok(0.0));
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(evaluate(Operation::Sqrt, &Operands::unary("9")), Ok(3.0));
        assert_eq!(evaluate(Operation::Sqrt, &Operands::unary("0")), Ok(0.0));
        assert_eq!(
            evaluate(Operation::Sqrt, &Operands::unary("-4")),
            Err(CalcError::NegativeSquareRoot)
        );
        assert_eq!(
            evaluate(Operation::Sqrt, &Operands::Unary { num: None }),
            Err(CalcError::InvalidOperand)
        );
    }

    #[test]
    fn test_validation_precedes_domain_checks() {
        assert_eq!(eval(Operation::Divide, "abc", "0"), Err(CalcError::InvalidOperands));
        assert_eq!(
            evaluate(Operation::Add, &Operands::unary("1")),
            Err(CalcError::InvalidOperands)
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CalcError::InvalidOperands.kind(), ErrorKind::Validation);
        assert_eq!(CalcError::NegativeSquareRoot.kind(), ErrorKind::Domain);
        assert_eq!(CalcError::ModuloByZero.reason(), "Modulo by zero");
    }
}
