//! # Types
//!
//! Descriptors for the shape of runtime values, checked at compile time.

use crate::value::Value;
use smartstring::alias::String as SmartString;
use std::{fmt, rc::Rc};

/// The type of a value
#[derive(Clone, Debug)]
pub enum Type {
  /// A 64-bit signed integer, `int`
  Int,
  /// A 64-bit float, `float64`
  Float,
  /// A string, `string`
  String,
  /// A boolean, `bool`
  Bool,
  /// An untyped integer constant, with unbounded precision
  IdealInt,
  /// An untyped float constant, stored exactly as a rational
  IdealFloat,
  /// The type of the untyped `nil` literal
  Nil,
  /// An ordered list of types, for multiple return values or no value at all
  Multi(Rc<[Type]>),
  /// A function with inputs and outputs
  Function(Rc<FunctionType>),
  /// A distinct type declared with `type Name Underlying`
  Named(Rc<NamedType>),
}
impl Type {
  /// A multi-type with no types in it, the type of an expression without a value
  #[must_use]
  pub fn none() -> Self {
    Self::Multi(Rc::from([]))
  }

  /// A function type from its inputs and outputs
  #[must_use]
  pub fn function(inputs: Vec<Type>, outputs: Vec<Type>) -> Self {
    Self::Function(Rc::new(FunctionType { inputs, outputs }))
  }

  /// The type of a call returning these outputs
  #[must_use]
  pub fn from_outputs(outputs: &[Type]) -> Self {
    match outputs {
      [single] => single.clone(),
      outputs => Self::Multi(Rc::from(outputs)),
    }
  }

  /// The default value of the type, such as `0`, `""` or `false`.
  ///
  /// Untyped constants and multi-types have no zero value.
  #[must_use]
  pub fn zero(&self) -> Option<Value> {
    match self {
      Self::Int => Some(Value::Int(0)),
      Self::Float => Some(Value::Float(0.0)),
      Self::String => Some(Value::String(Rc::from(""))),
      Self::Bool => Some(Value::Bool(false)),
      Self::Function(_) => Some(Value::Function(None)),
      Self::Named(named) => named.underlying.zero(),
      Self::IdealInt | Self::IdealFloat | Self::Nil | Self::Multi(_) => None,
    }
  }

  /// The zero values for every type in a multi-type, or the single zero value
  ///
  /// An empty multi-type gives no values.
  #[must_use]
  pub fn zero_values(&self) -> Option<Vec<Value>> {
    match self {
      Self::Multi(types) => types.iter().map(Type::zero).collect(),
      type_ => type_.zero().map(|value| vec![value]),
    }
  }

  /// The type with the names stripped away
  #[must_use]
  pub fn underlying(&self) -> &Type {
    match self {
      Self::Named(named) => named.underlying.underlying(),
      type_ => type_,
    }
  }

  /// The types in a multi-type, or just the type itself
  #[must_use]
  pub fn as_slice(&self) -> &[Type] {
    match self {
      Self::Multi(types) => types,
      type_ => std::slice::from_ref(type_),
    }
  }

  /// The type that an untyped constant takes when nothing else decides it
  #[must_use]
  pub fn default_type(&self) -> Type {
    match self {
      Self::IdealInt => Self::Int,
      Self::IdealFloat => Self::Float,
      type_ => type_.clone(),
    }
  }

  /// Is the type an untyped numeric constant?
  #[must_use]
  pub fn is_ideal(&self) -> bool {
    matches!(self, Self::IdealInt | Self::IdealFloat)
  }

  /// Can arithmetic be performed on the type?
  #[must_use]
  pub fn is_numeric(&self) -> bool {
    matches!(
      self.underlying(),
      Self::Int | Self::Float | Self::IdealInt | Self::IdealFloat
    )
  }

  /// Is the type a whole number?
  #[must_use]
  pub fn is_integer(&self) -> bool {
    matches!(self.underlying(), Self::Int | Self::IdealInt)
  }

  /// Is it a string type?
  #[must_use]
  pub fn is_string(&self) -> bool {
    matches!(self.underlying(), Self::String)
  }

  /// Is it a boolean type?
  #[must_use]
  pub fn is_bool(&self) -> bool {
    matches!(self.underlying(), Self::Bool)
  }

  /// Can values of the type be ordered with `<`?
  #[must_use]
  pub fn is_ordered(&self) -> bool {
    self.is_numeric() || self.is_string()
  }

  /// Is it a function type?
  #[must_use]
  pub fn as_function(&self) -> Option<&Rc<FunctionType>> {
    match self.underlying() {
      Self::Function(function) => Some(function),
      _ => None,
    }
  }

  /// Is it one of the predeclared types, without a name of its own?
  #[must_use]
  pub fn is_basic(&self) -> bool {
    matches!(self, Self::Int | Self::Float | Self::String | Self::Bool)
  }

  /// Can a value of this type be stored where the `target` type is expected?
  ///
  /// Untyped constants must additionally be representable in the target, which is
  /// checked when the constant is coerced.
  #[must_use]
  pub fn assignable_to(&self, target: &Type) -> bool {
    match (self, target.underlying()) {
      _ if self == target => true,
      (Self::IdealInt | Self::IdealFloat, Self::Int | Self::Float) => true,
      (Self::IdealInt, Self::IdealFloat) => true,
      (Self::Nil, Self::Function(_)) => true,
      _ => false,
    }
  }
}
impl PartialEq for Type {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Int, Self::Int)
      | (Self::Float, Self::Float)
      | (Self::String, Self::String)
      | (Self::Bool, Self::Bool)
      | (Self::IdealInt, Self::IdealInt)
      | (Self::IdealFloat, Self::IdealFloat)
      | (Self::Nil, Self::Nil) => true,
      (Self::Multi(a), Self::Multi(b)) => a == b,
      (Self::Function(a), Self::Function(b)) => a == b,
      (Self::Named(a), Self::Named(b)) => Rc::ptr_eq(a, b),
      _ => false,
    }
  }
}
impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int => write!(f, "int"),
      Self::Float => write!(f, "float64"),
      Self::String => write!(f, "string"),
      Self::Bool => write!(f, "bool"),
      Self::IdealInt => write!(f, "untyped int"),
      Self::IdealFloat => write!(f, "untyped float"),
      Self::Nil => write!(f, "untyped nil"),
      Self::Multi(types) => {
        write!(f, "(")?;
        write_list(f, types)?;
        write!(f, ")")
      }
      Self::Function(function) => write!(f, "{function}"),
      Self::Named(named) => write!(f, "{}", named.name),
    }
  }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
  for (index, type_) in types.iter().enumerate() {
    if index > 0 {
      write!(f, ", ")?;
    }
    write!(f, "{type_}")?;
  }
  Ok(())
}

/// The signature of a function
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionType {
  /// The types of the parameters
  pub inputs: Vec<Type>,
  /// The types of the results
  pub outputs: Vec<Type>,
}
impl FunctionType {
  /// The type of calling the function
  #[must_use]
  pub fn result(&self) -> Type {
    Type::from_outputs(&self.outputs)
  }
}
impl fmt::Display for FunctionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "func(")?;
    write_list(f, &self.inputs)?;
    write!(f, ")")?;

    match self.outputs.as_slice() {
      [] => Ok(()),
      [output] => write!(f, " {output}"),
      outputs => {
        write!(f, " (")?;
        write_list(f, outputs)?;
        write!(f, ")")
      }
    }
  }
}

/// A type declared with a name, distinct from all other types
#[derive(Debug)]
pub struct NamedType {
  /// The name it was declared with
  pub name: SmartString,
  /// The type it was declared as, never itself a named type
  pub underlying: Type,
}
