//! # Values
//!
//! Runtime values, the operators defined on them, and the conversions between them. Untyped
//! constants are exact, backed by [`BigInt`] and [`BigRational`], until they are coerced to a
//! concrete type. Numeric literals are parsed into them here too.

use crate::{
  bridge::NativeFunction,
  bytecode::Closure,
  error::Fault,
  types::Type,
};
use chicklet_syntax::ast::expression::{BinaryOperator, UnaryOperator};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::{cmp::Ordering, fmt, rc::Rc};

/// A value in the interpreter.
///
/// The variant of a value never changes once it has been created, and always matches the
/// [`Type`] it was checked against when compiling. Untyped constants are kept at unbounded
/// precision until they are coerced into a concrete type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  /// A 64-bit signed integer
  Int(i64),
  /// A 64-bit float
  Float(f64),
  /// An immutable string
  String(Rc<str>),
  /// A boolean
  Bool(bool),
  /// An untyped integer constant
  IdealInt(BigInt),
  /// An untyped float constant, stored exactly
  IdealFloat(BigRational),
  /// A function, or `nil`
  Function(Option<FunctionValue>),
}

impl Value {
  /// Applies a binary operator to two values of the same type.
  ///
  /// # Errors
  /// Integer division by zero, or operands which the operator is not defined for.
  pub fn binary(&self, operator: BinaryOperator, other: &Self) -> Result<Self, Fault> {
    use BinaryOperator as Op;

    match (self, other) {
      (Self::Int(a), Self::Int(b)) => match operator {
        Op::Add => Ok(Self::Int(a.wrapping_add(*b))),
        Op::Subtract => Ok(Self::Int(a.wrapping_sub(*b))),
        Op::Multiply => Ok(Self::Int(a.wrapping_mul(*b))),
        Op::Divide if *b == 0 => Err(Fault::DivisionByZero),
        Op::Divide => Ok(Self::Int(a.wrapping_div(*b))),
        Op::Remainder if *b == 0 => Err(Fault::DivisionByZero),
        Op::Remainder => Ok(Self::Int(a.wrapping_rem(*b))),
        operator => compare(operator, a.cmp(b)),
      },
      (Self::Float(a), Self::Float(b)) => match operator {
        Op::Add => Ok(Self::Float(a + b)),
        Op::Subtract => Ok(Self::Float(a - b)),
        Op::Multiply => Ok(Self::Float(a * b)),
        Op::Divide => Ok(Self::Float(a / b)),
        Op::Remainder => Err(Fault::TypeAssertion { expected: "integer" }),
        Op::Equal => Ok(Self::Bool(a == b)),
        Op::NotEqual => Ok(Self::Bool(a != b)),
        operator => match a.partial_cmp(b) {
          Some(ordering) => compare(operator, ordering),
          None => Ok(Self::Bool(false)),
        },
      },
      (Self::String(a), Self::String(b)) => match operator {
        Op::Add => Ok(Self::String(Rc::from(format!("{a}{b}")))),
        operator => compare(operator, a.cmp(b)),
      },
      (Self::Bool(a), Self::Bool(b)) => match operator {
        Op::And => Ok(Self::Bool(*a && *b)),
        Op::Or => Ok(Self::Bool(*a || *b)),
        Op::Equal => Ok(Self::Bool(a == b)),
        Op::NotEqual => Ok(Self::Bool(a != b)),
        _ => Err(Fault::TypeAssertion { expected: "number" }),
      },
      (Self::IdealInt(a), Self::IdealInt(b)) => match operator {
        Op::Add => Ok(Self::IdealInt(a + b)),
        Op::Subtract => Ok(Self::IdealInt(a - b)),
        Op::Multiply => Ok(Self::IdealInt(a * b)),
        Op::Divide | Op::Remainder if b.is_zero() => Err(Fault::DivisionByZero),
        Op::Divide => Ok(Self::IdealInt(a / b)),
        Op::Remainder => Ok(Self::IdealInt(a % b)),
        operator => compare(operator, a.cmp(b)),
      },
      (Self::IdealInt(_) | Self::IdealFloat(_), Self::IdealInt(_) | Self::IdealFloat(_)) => {
        let (a, b) = (self.as_rational(), other.as_rational());
        match (a, b) {
          (Some(a), Some(b)) => rational_binary(operator, &a, &b),
          _ => Err(Fault::TypeAssertion { expected: "number" }),
        }
      }
      (Self::Function(a), Self::Function(b)) => match operator {
        Op::Equal => Ok(Self::Bool(a == b)),
        Op::NotEqual => Ok(Self::Bool(a != b)),
        _ => Err(Fault::TypeAssertion { expected: "number" }),
      },
      _ => Err(Fault::TypeAssertion {
        expected: self.kind(),
      }),
    }
  }

  /// Applies a unary operator to the value.
  ///
  /// # Errors
  /// If the operator is not defined for the value.
  pub fn unary(&self, operator: UnaryOperator) -> Result<Self, Fault> {
    match (operator, self) {
      (UnaryOperator::Plus, Self::Int(_) | Self::Float(_) | Self::IdealInt(_) | Self::IdealFloat(_)) => {
        Ok(self.clone())
      }
      (UnaryOperator::Minus, Self::Int(a)) => Ok(Self::Int(a.wrapping_neg())),
      (UnaryOperator::Minus, Self::Float(a)) => Ok(Self::Float(-a)),
      (UnaryOperator::Minus, Self::IdealInt(a)) => Ok(Self::IdealInt(-a)),
      (UnaryOperator::Minus, Self::IdealFloat(a)) => Ok(Self::IdealFloat(-a)),
      (UnaryOperator::Not, Self::Bool(a)) => Ok(Self::Bool(!a)),
      (UnaryOperator::Not, _) => Err(Fault::TypeAssertion { expected: "bool" }),
      _ => Err(Fault::TypeAssertion { expected: "number" }),
    }
  }

  /// Turns an untyped constant into a value of a concrete numeric type.
  ///
  /// Values which are not untyped constants are returned unchanged.
  ///
  /// # Errors
  /// If the constant can't be represented by the type.
  pub fn coerce(&self, target: &Type) -> Result<Self, CoerceError> {
    match (self, target.underlying()) {
      (Self::IdealInt(value), Type::Int) => value.to_i64().map(Self::Int).ok_or(CoerceError::Overflow),
      (Self::IdealInt(value), Type::Float) => finite(value.to_f64()),
      (Self::IdealInt(value), Type::IdealFloat) => {
        Ok(Self::IdealFloat(BigRational::from_integer(value.clone())))
      }
      (Self::IdealFloat(value), Type::Int) if value.is_integer() => value
        .to_integer()
        .to_i64()
        .map(Self::Int)
        .ok_or(CoerceError::Overflow),
      (Self::IdealFloat(_), Type::Int) => Err(CoerceError::Truncated),
      (Self::IdealFloat(value), Type::Float) => finite(value.to_f64()),
      _ => Ok(self.clone()),
    }
  }

  /// Converts a value into another type, as in `float64(x)`.
  ///
  /// # Errors
  /// If a float is too large to fit in an integer.
  pub fn convert(&self, target: &Type) -> Result<Self, Fault> {
    match (self, target.underlying()) {
      (Self::Float(value), Type::Int) => {
        let truncated = value.trunc();
        if truncated >= -(2.0_f64.powi(63)) && truncated < 2.0_f64.powi(63) {
          #[allow(clippy::cast_possible_truncation, reason = "range checked above")]
          let truncated = truncated as i64;
          Ok(Self::Int(truncated))
        } else {
          Err(Fault::ConversionOutOfRange {
            value: self.to_string(),
            ty: target.clone(),
          })
        }
      }
      #[allow(clippy::cast_precision_loss, reason = "matches integer to float conversion")]
      (Self::Int(value), Type::Float) => Ok(Self::Float(*value as f64)),
      (Self::IdealInt(_) | Self::IdealFloat(_), _) => {
        self
          .coerce(target)
          .map_err(|_| Fault::ConversionOutOfRange {
            value: self.to_string(),
            ty: target.clone(),
          })
      }
      _ => Ok(self.clone()),
    }
  }

  /// Is the value an integer equal to zero?
  #[must_use]
  pub fn is_zero_integer(&self) -> bool {
    match self {
      Self::Int(value) => *value == 0,
      Self::IdealInt(value) => value.is_zero(),
      _ => false,
    }
  }

  /// A short name for the kind of value, used in error messages
  #[must_use]
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Int(_) => "int",
      Self::Float(_) => "float64",
      Self::String(_) => "string",
      Self::Bool(_) => "bool",
      Self::IdealInt(_) => "untyped int",
      Self::IdealFloat(_) => "untyped float",
      Self::Function(None) => "nil",
      Self::Function(Some(_)) => "func",
    }
  }

  fn as_rational(&self) -> Option<BigRational> {
    match self {
      Self::IdealInt(value) => Some(BigRational::from_integer(value.clone())),
      Self::IdealFloat(value) => Some(value.clone()),
      _ => None,
    }
  }
}

fn compare(operator: BinaryOperator, ordering: Ordering) -> Result<Value, Fault> {
  let result = match operator {
    BinaryOperator::Equal => ordering.is_eq(),
    BinaryOperator::NotEqual => ordering.is_ne(),
    BinaryOperator::Greater => ordering.is_gt(),
    BinaryOperator::GreaterEqual => ordering.is_ge(),
    BinaryOperator::Less => ordering.is_lt(),
    BinaryOperator::LessEqual => ordering.is_le(),
    _ => return Err(Fault::TypeAssertion { expected: "bool" }),
  };

  Ok(Value::Bool(result))
}

fn rational_binary(
  operator: BinaryOperator,
  a: &BigRational,
  b: &BigRational,
) -> Result<Value, Fault> {
  match operator {
    BinaryOperator::Add => Ok(Value::IdealFloat(a + b)),
    BinaryOperator::Subtract => Ok(Value::IdealFloat(a - b)),
    BinaryOperator::Multiply => Ok(Value::IdealFloat(a * b)),
    BinaryOperator::Divide if b.is_zero() => Err(Fault::DivisionByZero),
    BinaryOperator::Divide => Ok(Value::IdealFloat(a / b)),
    BinaryOperator::Remainder => Err(Fault::TypeAssertion { expected: "integer" }),
    operator => compare(operator, a.cmp(b)),
  }
}

fn finite(value: Option<f64>) -> Result<Value, CoerceError> {
  match value {
    Some(value) if value.is_finite() => Ok(Value::Float(value)),
    _ => Err(CoerceError::Overflow),
  }
}

/// Why an untyped constant couldn't be coerced
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoerceError {
  /// The value is too large for the type
  Overflow,
  /// The value has a fractional part, but the type is an integer
  Truncated,
}

/// Parses the text of an integer literal, either decimal or hexadecimal
#[must_use]
pub fn parse_integer(text: &str) -> Option<BigInt> {
  match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
    Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16),
    None => BigInt::parse_bytes(text.as_bytes(), 10),
  }
}

/// Parses the text of a float literal into an exact rational
#[must_use]
pub fn parse_float(text: &str) -> Option<BigRational> {
  let (mantissa, exponent) = match text.find(['e', 'E']) {
    Some(index) => (&text[..index], text[index + 1..].parse::<i32>().ok()?),
    None => (text, 0),
  };
  let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

  let digits = format!("{whole}{fraction}");
  let digits = if digits.is_empty() {
    BigInt::zero()
  } else {
    BigInt::parse_bytes(digits.as_bytes(), 10)?
  };

  let scale = exponent.checked_sub(i32::try_from(fraction.len()).ok()?)?;
  if scale.unsigned_abs() > MAX_EXPONENT {
    return None;
  }
  let power = BigInt::from(10).pow(scale.unsigned_abs());

  if scale >= 0 {
    Some(BigRational::from_integer(digits * power))
  } else {
    Some(BigRational::new(digits, power))
  }
}

/// Literals with larger exponents are rejected rather than materialised
const MAX_EXPONENT: u32 = 100_000;

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(value) => write!(f, "{value}"),
      Self::Float(value) => write!(f, "{value}"),
      Self::String(value) => write!(f, "{value}"),
      Self::Bool(value) => write!(f, "{value}"),
      Self::IdealInt(value) => write!(f, "{value}"),
      Self::IdealFloat(value) if value.is_integer() => write!(f, "{}", value.to_integer()),
      Self::IdealFloat(value) => match value.to_f64() {
        Some(float) => write!(f, "{float}"),
        None => write!(f, "{value}"),
      },
      Self::Function(None) => write!(f, "nil"),
      Self::Function(Some(function)) => write!(f, "{function}"),
    }
  }
}

/// A callable function value
#[derive(Clone)]
pub enum FunctionValue {
  /// A function provided by the host
  Native(Rc<NativeFunction>),
  /// A function compiled from source, with the frame it was created in
  Interpreted(Rc<Closure>),
}
impl PartialEq for FunctionValue {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Native(a), Self::Native(b)) => Rc::ptr_eq(a, b),
      (Self::Interpreted(a), Self::Interpreted(b)) => Rc::ptr_eq(a, b),
      _ => false,
    }
  }
}
impl fmt::Debug for FunctionValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{self}")
  }
}
impl fmt::Display for FunctionValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Native(native) => write!(f, "<native {}>", native.ty),
      Self::Interpreted(closure) if closure.prototype.name.is_empty() => {
        write!(f, "<function>")
      }
      Self::Interpreted(closure) => write!(f, "<function {}>", closure.prototype.name),
    }
  }
}
