//! # Errors
//!
//! Compile errors are collected and reported together, while runtime faults stop execution
//! and are caught at the boundary of the run or call which started it.

use crate::types::Type;
use chicklet_syntax::{LineIndex, ParseError, Span};
use smartstring::alias::String as SmartString;
use std::fmt::{self, Write as _};
use thiserror::Error;

/// An error found whilst compiling source code
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CompileError {
  /// An identifier is defined twice in the same scope
  #[error("`{name}` redeclared in this block")]
  Redeclared {
    /// The identifier
    name: SmartString,
    /// The second definition
    span: Span,
    /// The first definition, if it was in source code
    previous: Option<Span>,
  },
  /// An identifier which isn't defined
  #[error("undefined: `{name}`")]
  Undefined {
    /// The identifier
    name: SmartString,
    /// The location of the identifier
    span: Span,
  },
  /// A value is used where a different type is expected
  #[error("cannot use value of type `{found}` as `{expected}`")]
  TypeMismatch {
    /// The type which was expected
    expected: Type,
    /// The type of the value
    found: Type,
    /// The location of the value
    span: Span,
  },
  /// An operator used on a type it isn't defined for
  #[error("operator `{operator}` is not defined on `{ty}`")]
  InvalidOperation {
    /// The operator
    operator: SmartString,
    /// The type of the operand
    ty: Type,
    /// The location of the operation
    span: Span,
  },
  /// The two sides of a binary operator have different types
  #[error("mismatched types `{left}` and `{right}`")]
  MismatchedTypes {
    /// The type of the left operand
    left: Type,
    /// The type of the right operand
    right: Type,
    /// The location of the operation
    span: Span,
  },
  /// A call with the wrong number of arguments
  #[error("wrong number of arguments, wanted {expected} but got {received}")]
  ArgumentCount {
    /// The number of parameters
    expected: usize,
    /// The number of arguments given
    received: usize,
    /// The location of the call
    span: Span,
  },
  /// An assignment with different numbers of targets and values
  #[error("assignment mismatch: {targets} variables but {values} values")]
  AssignmentCount {
    /// The number of targets
    targets: usize,
    /// The number of values
    values: usize,
    /// The location of the assignment
    span: Span,
  },
  /// A return statement with the wrong number of values
  #[error("wrong number of return values, wanted {expected} but got {received}")]
  ReturnCount {
    /// The number of results of the function
    expected: usize,
    /// The number of values returned
    received: usize,
    /// The location of the return
    span: Span,
  },
  /// Calling something which isn't a function
  #[error("cannot call non-function of type `{ty}`")]
  NotAFunction {
    /// The type of the value called
    ty: Type,
    /// The location of the callee
    span: Span,
  },
  /// A type was expected, but something else was found
  #[error("`{name}` is not a type")]
  NotAType {
    /// The identifier
    name: SmartString,
    /// The location of the identifier
    span: Span,
  },
  /// A value was expected, but something else was found
  #[error("{kind} is not an expression")]
  NotAnExpression {
    /// What was found instead
    kind: &'static str,
    /// The location of the expression
    span: Span,
  },
  /// A value was expected, but the expression has none
  #[error("expression has no value")]
  NoValue {
    /// The location of the expression
    span: Span,
  },
  /// A single value was expected, but the expression has many
  #[error("multiple values used where a single value is expected")]
  MultipleValues {
    /// The location of the expression
    span: Span,
  },
  /// A constant is too large for its type
  #[error("constant {value} overflows `{ty}`")]
  ConstantOverflow {
    /// The constant
    value: String,
    /// The type it was being stored as
    ty: Type,
    /// The location of the constant
    span: Span,
  },
  /// A constant with a fractional part was used as an integer
  #[error("constant {value} truncated to `{ty}`")]
  ConstantTruncated {
    /// The constant
    value: String,
    /// The type it was being stored as
    ty: Type,
    /// The location of the constant
    span: Span,
  },
  /// Dividing by a constant zero
  #[error("division by zero")]
  ConstantDivisionByZero {
    /// The location of the division
    span: Span,
  },
  /// A constant declared with a value which isn't constant
  #[error("value of `{name}` is not constant")]
  NotConstant {
    /// The name of the constant
    name: SmartString,
    /// The location of the value
    span: Span,
  },
  /// A function with results which can reach the end of its body
  #[error("missing return")]
  MissingReturn {
    /// The location of the function body
    span: Span,
  },
  /// A `break` or `continue` outside of a loop
  #[error("`{keyword}` is not in a loop")]
  BranchOutsideLoop {
    /// The keyword
    keyword: &'static str,
    /// The location of the statement
    span: Span,
  },
  /// Assigning to something which isn't a variable
  #[error("cannot assign to this expression")]
  InvalidAssignment {
    /// The location of the target
    span: Span,
  },
  /// A short variable declaration where every variable already exists
  #[error("no new variables on left side of `:=`")]
  NoNewVariables {
    /// The location of the declaration
    span: Span,
  },
  /// Selecting something a package doesn't declare
  #[error("package `{package}` has no member `{member}`")]
  UnknownMember {
    /// The name of the package
    package: SmartString,
    /// The name of the member
    member: SmartString,
    /// The location of the selector
    span: Span,
  },
  /// A conversion between types which can't be converted
  #[error("cannot convert `{from}` to `{to}`")]
  InvalidConversion {
    /// The type of the value
    from: Type,
    /// The type being converted to
    to: Type,
    /// The location of the conversion
    span: Span,
  },
  /// `nil` used where its type can't be known
  #[error("use of untyped nil")]
  UntypedNil {
    /// The location of the `nil`
    span: Span,
  },
  /// A package `init` function with a signature
  #[error("func init must have no arguments and no return values")]
  InvalidInit {
    /// The location of the function
    span: Span,
  },
  /// A package which imports itself, directly or through other packages
  #[error("import cycle not allowed, `{path}` is already being imported")]
  ImportCycle {
    /// The import path
    path: String,
    /// The location of the import
    span: Span,
  },
  /// An import path with no files
  #[error("package `{path}` not found")]
  PackageNotFound {
    /// The import path
    path: String,
    /// The location of the import
    span: Span,
  },
  /// A package which couldn't be loaded
  #[error("unable to import `{path}`: {reason}")]
  ImportFailed {
    /// The import path
    path: String,
    /// What went wrong
    reason: String,
    /// The location of the import
    span: Span,
  },
  /// A statement in a package file which isn't a declaration
  #[error("non-declaration statement outside function body")]
  NonDeclarationStatement {
    /// The location of the statement
    span: Span,
  },
}
impl CompileError {
  /// The title of the error message
  #[must_use]
  pub fn title(&self) -> &'static str {
    match self {
      Self::Redeclared { .. } => "Redeclared Identifier",
      Self::Undefined { .. } => "Undefined Identifier",
      Self::TypeMismatch { .. } => "Type Mismatch",
      Self::InvalidOperation { .. } => "Invalid Operation",
      Self::MismatchedTypes { .. } => "Mismatched Types",
      Self::ArgumentCount { .. } => "Wrong Number of Arguments",
      Self::AssignmentCount { .. } => "Assignment Mismatch",
      Self::ReturnCount { .. } => "Wrong Number of Return Values",
      Self::NotAFunction { .. } => "Not a Function",
      Self::NotAType { .. } => "Not a Type",
      Self::NotAnExpression { .. } => "Not an Expression",
      Self::NoValue { .. } => "No Value",
      Self::MultipleValues { .. } => "Multiple Values",
      Self::ConstantOverflow { .. } => "Constant Overflow",
      Self::ConstantTruncated { .. } => "Constant Truncated",
      Self::ConstantDivisionByZero { .. } => "Division by Zero",
      Self::NotConstant { .. } => "Not Constant",
      Self::MissingReturn { .. } => "Missing Return",
      Self::BranchOutsideLoop { .. } => "Branch Outside Loop",
      Self::InvalidAssignment { .. } => "Invalid Assignment",
      Self::NoNewVariables { .. } => "No New Variables",
      Self::UnknownMember { .. } => "Unknown Member",
      Self::InvalidConversion { .. } => "Invalid Conversion",
      Self::UntypedNil { .. } => "Untyped Nil",
      Self::InvalidInit { .. } => "Invalid Init Function",
      Self::ImportCycle { .. } => "Import Cycle",
      Self::PackageNotFound { .. } => "Package Not Found",
      Self::ImportFailed { .. } => "Import Failed",
      Self::NonDeclarationStatement { .. } => "Non-Declaration Statement",
    }
  }

  /// The body of the error message describing what has gone wrong
  #[must_use]
  pub fn message(&self) -> String {
    self.to_string()
  }

  /// The location of the error
  pub fn span(&self) -> Span {
    match self {
      Self::Redeclared { span, .. }
      | Self::Undefined { span, .. }
      | Self::TypeMismatch { span, .. }
      | Self::InvalidOperation { span, .. }
      | Self::MismatchedTypes { span, .. }
      | Self::ArgumentCount { span, .. }
      | Self::AssignmentCount { span, .. }
      | Self::ReturnCount { span, .. }
      | Self::NotAFunction { span, .. }
      | Self::NotAType { span, .. }
      | Self::NotAnExpression { span, .. }
      | Self::NoValue { span }
      | Self::MultipleValues { span }
      | Self::ConstantOverflow { span, .. }
      | Self::ConstantTruncated { span, .. }
      | Self::ConstantDivisionByZero { span }
      | Self::NotConstant { span, .. }
      | Self::MissingReturn { span }
      | Self::BranchOutsideLoop { span, .. }
      | Self::InvalidAssignment { span }
      | Self::NoNewVariables { span }
      | Self::UnknownMember { span, .. }
      | Self::InvalidConversion { span, .. }
      | Self::UntypedNil { span }
      | Self::InvalidInit { span }
      | Self::ImportCycle { span, .. }
      | Self::PackageNotFound { span, .. }
      | Self::ImportFailed { span, .. }
      | Self::NonDeclarationStatement { span } => *span,
    }
  }
}

/// A host value or function has no counterpart in the interpreter
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConvertError {
  /// The value can't be represented
  #[error("unable to convert {value} of type {kind}")]
  Unconvertible {
    /// The value
    value: String,
    /// The kind of value
    kind: &'static str,
  },
  /// The value doesn't match the type expected
  #[error("expected a value of type `{expected}` but got {found}")]
  Mismatch {
    /// The type expected
    expected: Type,
    /// The kind of value found
    found: &'static str,
  },
  /// A host function gave the wrong number of results
  #[error("expected {expected} results but got {received}")]
  ResultCount {
    /// The number of results in the signature
    expected: usize,
    /// The number of results returned
    received: usize,
  },
  /// A host function was given the wrong number of arguments
  #[error("expected {expected} arguments but got {received}")]
  ArgumentCount {
    /// The number of parameters in the signature
    expected: usize,
    /// The number of arguments given
    received: usize,
  },
}

/// A function was called with the wrong number of arguments
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("wrong number of arguments, wanted {expected} but got {received}")]
pub struct CallError {
  /// The number of parameters
  pub expected: usize,
  /// The number of arguments given
  pub received: usize,
}

/// A fault which stops execution
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Fault {
  /// Integer division or remainder by zero
  #[error("integer divide by zero")]
  DivisionByZero,
  /// Calling a function value which is `nil`
  #[error("call of nil function")]
  NilFunctionCall,
  /// Too many nested calls
  #[error("stack overflow, more than {0} nested calls")]
  StackOverflow(usize),
  /// The `panic` builtin was called
  #[error("panic: {0}")]
  Panic(String),
  /// A conversion to a type which can't hold the value
  #[error("{value} is out of range for `{ty}`")]
  ConversionOutOfRange {
    /// The value
    value: String,
    /// The type converted to
    ty: Type,
  },
  /// A host function gave or received a value it couldn't convert
  #[error(transparent)]
  Convert(#[from] ConvertError),
  /// A function was called with the wrong number of arguments
  #[error(transparent)]
  Call(#[from] CallError),
  /// A value had a different type than the instruction expected
  #[error("type assertion failed, expected {expected}")]
  TypeAssertion {
    /// The kind of value expected
    expected: &'static str,
  },
  /// A variable was read before anything was stored in it
  #[error("variable used before it was initialised")]
  Uninitialised,
  /// A function was called after the world it was compiled in was dropped
  #[error("the world the function belongs to has been dropped")]
  WorldDropped,
  /// Writing to the output failed
  #[error("unable to write output: {0}")]
  Output(String),
}
impl Fault {
  /// The title of the error message
  #[must_use]
  pub fn title(&self) -> &'static str {
    match self {
      Self::DivisionByZero => "Division by Zero",
      Self::NilFunctionCall => "Nil Function Call",
      Self::StackOverflow(_) => "Stack Overflow",
      Self::Panic(_) => "Panic",
      Self::ConversionOutOfRange { .. } => "Conversion Out of Range",
      Self::Convert(_) => "Conversion Error",
      Self::Call(_) => "Call Error",
      Self::TypeAssertion { .. } => "Type Assertion",
      Self::Uninitialised => "Uninitialised Variable",
      Self::WorldDropped => "World Dropped",
      Self::Output(_) => "Output Error",
    }
  }
}

/// A runtime fault, with the calls which were active when it happened
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{fault}")]
pub struct RuntimeError {
  /// What went wrong
  pub fault: Fault,
  /// The active calls, innermost first
  pub traceback: Vec<TraceLocation>,
}
impl RuntimeError {
  /// The title of the error message
  #[must_use]
  pub fn title(&self) -> &'static str {
    self.fault.title()
  }

  /// The body of the error message describing what has gone wrong
  #[must_use]
  pub fn message(&self) -> String {
    self.fault.to_string()
  }

  /// The location where the fault happened
  pub fn span(&self) -> Span {
    self
      .traceback
      .first()
      .map(|location| location.span)
      .unwrap_or_default()
  }

  /// The traceback of the error
  #[must_use]
  pub fn traceback(&self, line_index: &LineIndex) -> Option<String> {
    if self.traceback.is_empty() {
      return None;
    }

    let mut string = String::new();
    for location in &self.traceback {
      let line = line_index.line(location.span);
      let _ = if location.name.is_empty() {
        writeln!(string, "at line {line}")
      } else {
        writeln!(string, "in function '{}' at line {line}", location.name)
      };
    }

    Some(string)
  }
}

/// A call which was active when a fault happened
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceLocation {
  /// The name of the function
  pub name: SmartString,
  /// The location of the instruction which was executing
  pub span: Span,
}

/// Any error from compiling or running code
#[derive(Debug, Error)]
pub enum Error {
  /// The source couldn't be parsed
  #[error("{}", describe(.0))]
  Parse(Vec<ParseError>),
  /// The source couldn't be compiled
  #[error("{}", describe(.0))]
  Compile(Vec<CompileError>),
  /// A value couldn't be converted between the host and the interpreter
  #[error(transparent)]
  Convert(#[from] ConvertError),
  /// A function was called with the wrong number of arguments
  #[error(transparent)]
  Call(#[from] CallError),
  /// A fault happened whilst running
  #[error(transparent)]
  Runtime(RuntimeError),
}
impl From<RuntimeError> for Error {
  fn from(error: RuntimeError) -> Self {
    match error.fault {
      Fault::Convert(error) => Self::Convert(error),
      Fault::Call(error) => Self::Call(error),
      _ => Self::Runtime(error),
    }
  }
}

fn describe<T: fmt::Display>(errors: &[T]) -> String {
  let mut string = String::new();
  for (index, error) in errors.iter().enumerate() {
    if index > 0 {
      string.push('\n');
    }
    let _ = write!(string, "{error}");
  }
  string
}
