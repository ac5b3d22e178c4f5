//! # Bridge
//!
//! Converts values and functions between the host and the interpreter.
//!
//! Host functions can be given an explicit signature with [`HostFunction::native`], or have
//! their signature derived from a Rust closure with [`HostFunction::wrap`]:
//!
//! ```
//! use chicklet_interpreter::{HostFunction, HostValue, World};
//!
//! let mut world = World::new();
//! world.define("double", HostFunction::wrap(|x: i64| x * 2)).unwrap();
//!
//! let result = world.eval("double(21)").unwrap();
//! assert_eq!(result, vec![HostValue::Int(42)]);
//! ```

use crate::{
  bytecode::Closure,
  error::{CallError, ConvertError, Error, Fault, RuntimeError},
  thread::Thread,
  types::{FunctionType, Type},
  value::{FunctionValue, Value},
};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::{fmt, rc::Rc};

/// A value which can be passed between the host and the interpreter
#[derive(Clone, Debug, PartialEq)]
pub enum HostValue {
  /// The absence of a value, and the `nil` function
  Nil,
  /// An `int`
  Int(i64),
  /// A `float64`
  Float(f64),
  /// A `string`
  String(String),
  /// A `bool`
  Bool(bool),
  /// An untyped integer constant
  BigInt(BigInt),
  /// An untyped float constant
  Rational(BigRational),
  /// A function
  Function(HostFunction),
}
impl HostValue {
  /// The type the value has when defined in a world, `nil` has no type
  #[must_use]
  pub fn ty(&self) -> Option<Type> {
    match self {
      Self::Nil => None,
      Self::Int(_) => Some(Type::Int),
      Self::Float(_) => Some(Type::Float),
      Self::String(_) => Some(Type::String),
      Self::Bool(_) => Some(Type::Bool),
      Self::BigInt(_) => Some(Type::IdealInt),
      Self::Rational(_) => Some(Type::IdealFloat),
      Self::Function(function) => Some(Type::Function(function.ty())),
    }
  }

  /// A short name for the kind of value
  #[must_use]
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Nil => "nil",
      Self::Int(_) => "int",
      Self::Float(_) => "float",
      Self::String(_) => "string",
      Self::Bool(_) => "bool",
      Self::BigInt(_) => "big integer",
      Self::Rational(_) => "rational",
      Self::Function(_) => "function",
    }
  }

  /// Converts the value into a value of the interpreter, checking it against the type expected.
  ///
  /// # Errors
  /// If the value doesn't match the type.
  pub fn to_runtime(&self, expected: &Type) -> Result<Value, ConvertError> {
    let mismatch = || ConvertError::Mismatch {
      expected: expected.clone(),
      found: self.kind(),
    };

    match (self, expected.underlying()) {
      (Self::Int(value), Type::Int) => Ok(Value::Int(*value)),
      (Self::Float(value), Type::Float) => Ok(Value::Float(*value)),
      (Self::String(value), Type::String) => Ok(Value::String(Rc::from(value.as_str()))),
      (Self::Bool(value), Type::Bool) => Ok(Value::Bool(*value)),
      (Self::BigInt(value), Type::IdealInt) => Ok(Value::IdealInt(value.clone())),
      (Self::Rational(value), Type::IdealFloat) => Ok(Value::IdealFloat(value.clone())),
      (Self::BigInt(value), Type::Int | Type::Float) => Value::IdealInt(value.clone())
        .coerce(expected)
        .map_err(|_| self.unconvertible()),
      (Self::Rational(value), Type::Int | Type::Float) => Value::IdealFloat(value.clone())
        .coerce(expected)
        .map_err(|_| self.unconvertible()),
      (Self::Nil, Type::Function(_)) => Ok(Value::Function(None)),
      (Self::Function(function), Type::Function(ty)) if function.ty() == *ty => {
        Ok(Value::Function(Some(function.to_runtime())))
      }
      _ => Err(mismatch()),
    }
  }

  /// Converts a value from the interpreter into a host value
  #[must_use]
  pub fn from_runtime(value: &Value) -> Self {
    match value {
      Value::Int(value) => Self::Int(*value),
      Value::Float(value) => Self::Float(*value),
      Value::String(value) => Self::String(value.to_string()),
      Value::Bool(value) => Self::Bool(*value),
      Value::IdealInt(value) => Self::BigInt(value.clone()),
      Value::IdealFloat(value) => Self::Rational(value.clone()),
      Value::Function(None) => Self::Nil,
      Value::Function(Some(FunctionValue::Native(native))) => {
        Self::Function(HostFunction::Native(Rc::clone(native)))
      }
      Value::Function(Some(FunctionValue::Interpreted(closure))) => {
        Self::Function(HostFunction::Interpreted(Rc::clone(closure)))
      }
    }
  }

  fn unconvertible(&self) -> ConvertError {
    ConvertError::Unconvertible {
      value: self.to_string(),
      kind: self.kind(),
    }
  }
}
impl fmt::Display for HostValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Nil => write!(f, "nil"),
      Self::Int(value) => write!(f, "{value}"),
      Self::Float(value) => write!(f, "{value}"),
      Self::String(value) => write!(f, "{value}"),
      Self::Bool(value) => write!(f, "{value}"),
      Self::BigInt(value) => write!(f, "{value}"),
      Self::Rational(value) => write!(f, "{value}"),
      Self::Function(function) => write!(f, "<function {}>", function.ty()),
    }
  }
}

macro_rules! impl_from_for_host_value {
  ($($variant:ident: $type:ty),*) => {
    $(
      impl From<$type> for HostValue {
        fn from(value: $type) -> Self {
          Self::$variant(value)
        }
      }
    )*
  };
}
impl_from_for_host_value!(
  Int: i64,
  Float: f64,
  String: String,
  Bool: bool,
  BigInt: BigInt,
  Rational: BigRational,
  Function: HostFunction
);
impl From<i32> for HostValue {
  fn from(value: i32) -> Self {
    Self::Int(i64::from(value))
  }
}
impl From<&str> for HostValue {
  fn from(value: &str) -> Self {
    Self::String(value.to_owned())
  }
}

type NativeCallback = dyn Fn(&[HostValue]) -> Result<Vec<HostValue>, ConvertError>;

/// A function provided by the host, with the signature it is called with
pub struct NativeFunction {
  /// The signature of the function
  pub ty: Rc<FunctionType>,
  function: Box<NativeCallback>,
}
impl NativeFunction {
  /// Calls the function with values from the interpreter.
  ///
  /// # Errors
  /// If the arguments or results can't be converted.
  pub fn call(&self, arguments: &[Value]) -> Result<Vec<Value>, Fault> {
    tracing::trace!(signature = %self.ty, "calling native function");

    let arguments = arguments.iter().map(HostValue::from_runtime).collect::<Vec<_>>();
    let results = (self.function)(&arguments)?;

    if results.len() != self.ty.outputs.len() {
      return Err(Fault::Convert(ConvertError::ResultCount {
        expected: self.ty.outputs.len(),
        received: results.len(),
      }));
    }

    let results = (results.iter())
      .zip(&self.ty.outputs)
      .map(|(result, ty)| result.to_runtime(ty))
      .collect::<Result<Vec<_>, ConvertError>>()?;
    Ok(results)
  }
}
impl fmt::Debug for NativeFunction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NativeFunction")
      .field("ty", &self.ty)
      .finish_non_exhaustive()
  }
}

/// A function which can be called by both the host and the interpreter
#[derive(Clone, Debug)]
pub enum HostFunction {
  /// A function provided by the host
  Native(Rc<NativeFunction>),
  /// A function compiled from source
  Interpreted(Rc<Closure>),
}
impl HostFunction {
  /// A host function with an explicit signature.
  ///
  /// The function is only called with the number of arguments in the signature, and the
  /// arguments and results are checked against the types of the signature.
  pub fn native(
    ty: FunctionType,
    function: impl Fn(&[HostValue]) -> Result<Vec<HostValue>, ConvertError> + 'static,
  ) -> Self {
    Self::Native(Rc::new(NativeFunction {
      ty: Rc::new(ty),
      function: Box::new(function),
    }))
  }

  /// A host function from a Rust closure, with the signature derived from its types
  pub fn wrap<Args>(function: impl IntoHostFunction<Args>) -> Self {
    function.into_host_function()
  }

  /// The signature of the function
  #[must_use]
  pub fn ty(&self) -> Rc<FunctionType> {
    match self {
      Self::Native(native) => Rc::clone(&native.ty),
      Self::Interpreted(closure) => Rc::clone(&closure.prototype.ty),
    }
  }

  /// Calls the function from the host.
  ///
  /// # Errors
  /// If the number of arguments is wrong, the values can't be converted, or a runtime
  /// fault happens.
  pub fn call(&self, arguments: &[HostValue]) -> Result<Vec<HostValue>, Error> {
    let ty = self.ty();
    if arguments.len() != ty.inputs.len() {
      return Err(Error::Call(CallError {
        expected: ty.inputs.len(),
        received: arguments.len(),
      }));
    }

    let arguments = (arguments.iter())
      .zip(&ty.inputs)
      .map(|(argument, ty)| argument.to_runtime(ty))
      .collect::<Result<Vec<_>, _>>()?;

    let results = match self {
      Self::Native(native) => native.call(&arguments).map_err(native_error)?,
      Self::Interpreted(closure) => {
        Thread::new(Rc::clone(&closure.prototype.runtime)).call(closure, arguments)?
      }
    };

    Ok(results.iter().map(HostValue::from_runtime).collect())
  }

  fn to_runtime(&self) -> FunctionValue {
    match self {
      Self::Native(native) => FunctionValue::Native(Rc::clone(native)),
      Self::Interpreted(closure) => FunctionValue::Interpreted(Rc::clone(closure)),
    }
  }
}
impl PartialEq for HostFunction {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Native(a), Self::Native(b)) => Rc::ptr_eq(a, b),
      (Self::Interpreted(a), Self::Interpreted(b)) => Rc::ptr_eq(a, b),
      _ => false,
    }
  }
}

fn native_error(fault: Fault) -> Error {
  match fault {
    Fault::Convert(error) => Error::Convert(error),
    Fault::Call(error) => Error::Call(error),
    fault => Error::Runtime(RuntimeError {
      fault,
      traceback: Vec::new(),
    }),
  }
}

/// A Rust type with a counterpart in the interpreter
pub trait HostType: Sized {
  /// The type in the interpreter
  fn ty() -> Type;

  /// Gets the Rust value from a host value.
  ///
  /// # Errors
  /// If the host value is a different kind.
  fn from_host(value: &HostValue) -> Result<Self, ConvertError>;

  /// Turns the Rust value into a host value
  fn into_host(self) -> HostValue;
}

macro_rules! impl_host_type {
  ($($type:ty: $variant:ident => $ty:expr),*) => {
    $(
      impl HostType for $type {
        fn ty() -> Type {
          $ty
        }

        #[allow(clippy::clone_on_copy)]
        fn from_host(value: &HostValue) -> Result<Self, ConvertError> {
          match value {
            HostValue::$variant(value) => Ok(value.clone()),
            value => Err(ConvertError::Mismatch {
              expected: $ty,
              found: value.kind(),
            }),
          }
        }

        fn into_host(self) -> HostValue {
          HostValue::$variant(self)
        }
      }
    )*
  };
}
impl_host_type!(
  i64: Int => Type::Int,
  f64: Float => Type::Float,
  String: String => Type::String,
  bool: Bool => Type::Bool
);

/// The results of a Rust function, converted to host values
pub trait HostResults {
  /// The types of the results in the interpreter
  fn types() -> Vec<Type>;

  /// Turns the results into host values
  fn into_host(self) -> Vec<HostValue>;
}
impl HostResults for () {
  fn types() -> Vec<Type> {
    Vec::new()
  }

  fn into_host(self) -> Vec<HostValue> {
    Vec::new()
  }
}

macro_rules! impl_host_results {
  ($($type:ty),*) => {
    $(
      impl HostResults for $type {
        fn types() -> Vec<Type> {
          vec![<$type as HostType>::ty()]
        }

        fn into_host(self) -> Vec<HostValue> {
          vec![HostType::into_host(self)]
        }
      }
    )*
  };
}
impl_host_results!(i64, f64, String, bool);

macro_rules! impl_host_results_tuple {
  ($($type:ident: $name:ident),*) => {
    impl<$($type: HostType),*> HostResults for ($($type,)*) {
      fn types() -> Vec<Type> {
        vec![$($type::ty()),*]
      }

      fn into_host(self) -> Vec<HostValue> {
        let ($($name,)*) = self;
        vec![$(HostType::into_host($name)),*]
      }
    }
  };
}
impl_host_results_tuple!(A: a, B: b);
impl_host_results_tuple!(A: a, B: b, C: c);

/// A Rust closure which can be turned into a [`HostFunction`]
pub trait IntoHostFunction<Args> {
  /// Wraps the closure, deriving its signature from its types
  fn into_host_function(self) -> HostFunction;
}

macro_rules! impl_into_host_function {
  ($($type:ident: $name:ident),*) => {
    impl<F, R, $($type),*> IntoHostFunction<($($type,)*)> for F
    where
      F: Fn($($type),*) -> R + 'static,
      R: HostResults,
      $($type: HostType,)*
    {
      fn into_host_function(self) -> HostFunction {
        let ty = FunctionType {
          inputs: vec![$($type::ty()),*],
          outputs: R::types(),
        };
        let expected = ty.inputs.len();

        HostFunction::native(ty, move |arguments| {
          let [$($name),*] = arguments else {
            return Err(ConvertError::ArgumentCount {
              expected,
              received: arguments.len(),
            });
          };

          Ok(self($($type::from_host($name)?),*).into_host())
        })
      }
    }
  };
}
impl_into_host_function!();
impl_into_host_function!(A: a);
impl_into_host_function!(A: a, B: b);
impl_into_host_function!(A: a, B: b, C: c);
impl_into_host_function!(A: a, B: b, C: c, D: d);
