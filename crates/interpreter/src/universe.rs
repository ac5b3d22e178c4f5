//! The identifiers which are predeclared in every world

use crate::{
  scope::{Definition, Scope},
  types::Type,
  value::Value,
};
use std::{fmt, rc::Rc};

/// A function built into the language
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
  /// `len(string) int`, the length of a string in bytes
  Len,
  /// `println(values...)`, writes the values to the output separated by spaces
  Println,
  /// `panic(value)`, stops execution with a message
  Panic,
}
impl fmt::Display for Builtin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Len => write!(f, "len"),
      Self::Println => write!(f, "println"),
      Self::Panic => write!(f, "panic"),
    }
  }
}

/// The outermost scope, which every world and package scope is nested in
pub fn scope() -> Rc<Scope> {
  let scope = Scope::global(None);

  let definitions = [
    ("int", Definition::Type(Type::Int)),
    ("float64", Definition::Type(Type::Float)),
    ("string", Definition::Type(Type::String)),
    ("bool", Definition::Type(Type::Bool)),
    ("true", constant(Type::Bool, Value::Bool(true))),
    ("false", constant(Type::Bool, Value::Bool(false))),
    ("nil", constant(Type::Nil, Value::Function(None))),
    ("len", Definition::Builtin(Builtin::Len)),
    ("println", Definition::Builtin(Builtin::Println)),
    ("panic", Definition::Builtin(Builtin::Panic)),
  ];

  for (name, definition) in definitions {
    // the universe starts empty, so names can't clash
    let _ = scope.insert(name, definition, None);
  }

  scope
}

fn constant(ty: Type, value: Value) -> Definition {
  Definition::Constant { ty, value }
}
