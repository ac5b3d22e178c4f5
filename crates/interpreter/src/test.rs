use crate::{
  error::Fault,
  scope::{Definition, Frame, FrameLayout, Scope, Slot},
  types::{FunctionType, NamedType, Type},
  value::{CoerceError, Value, parse_float, parse_integer},
};
use chicklet_syntax::{Span, ast::expression::BinaryOperator};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::rc::Rc;

fn rational(numerator: i64, denominator: i64) -> BigRational {
  BigRational::new(BigInt::from(numerator), BigInt::from(denominator))
}

mod values {
  use super::*;

  #[test]
  fn integer_arithmetic_wraps() {
    let max = Value::Int(i64::MAX);
    let one = Value::Int(1);

    assert_eq!(max.binary(BinaryOperator::Add, &one), Ok(Value::Int(i64::MIN)));
    assert_eq!(
      Value::Int(i64::MIN).binary(BinaryOperator::Divide, &Value::Int(-1)),
      Ok(Value::Int(i64::MIN))
    );
    assert_eq!(
      Value::Int(7).binary(BinaryOperator::Remainder, &Value::Int(3)),
      Ok(Value::Int(1))
    );
  }

  #[test]
  fn integer_division_by_zero() {
    let zero = Value::Int(0);
    assert_eq!(
      Value::Int(5).binary(BinaryOperator::Divide, &zero),
      Err(Fault::DivisionByZero)
    );
    assert_eq!(
      Value::Int(5).binary(BinaryOperator::Remainder, &zero),
      Err(Fault::DivisionByZero)
    );

    let ideal_zero = Value::IdealInt(BigInt::from(0));
    assert_eq!(
      Value::IdealInt(BigInt::from(5)).binary(BinaryOperator::Divide, &ideal_zero),
      Err(Fault::DivisionByZero)
    );
  }

  #[test]
  fn ideal_arithmetic_is_exact() {
    let a = Value::IdealFloat(rational(1, 10));
    let b = Value::IdealFloat(rational(2, 10));
    assert_eq!(
      a.binary(BinaryOperator::Add, &b),
      Ok(Value::IdealFloat(rational(3, 10)))
    );

    let big = Value::IdealInt(BigInt::from(1) << 100);
    let result = big.binary(BinaryOperator::Multiply, &Value::IdealInt(BigInt::from(2)));
    assert_eq!(result, Ok(Value::IdealInt(BigInt::from(1) << 101)));

    let mixed = Value::IdealInt(BigInt::from(1)).binary(BinaryOperator::Divide, &b);
    assert_eq!(mixed, Ok(Value::IdealFloat(rational(5, 1))));
  }

  #[test]
  fn comparisons() {
    let a = Value::String(Rc::from("apple"));
    let b = Value::String(Rc::from("banana"));
    assert_eq!(a.binary(BinaryOperator::Less, &b), Ok(Value::Bool(true)));
    assert_eq!(a.binary(BinaryOperator::Equal, &b), Ok(Value::Bool(false)));

    let nan = Value::Float(f64::NAN);
    assert_eq!(nan.binary(BinaryOperator::Equal, &nan), Ok(Value::Bool(false)));
    assert_eq!(nan.binary(BinaryOperator::Less, &nan), Ok(Value::Bool(false)));
  }

  #[test]
  fn string_concatenation() {
    let a = Value::String(Rc::from("hello "));
    let b = Value::String(Rc::from("world"));
    assert_eq!(
      a.binary(BinaryOperator::Add, &b),
      Ok(Value::String(Rc::from("hello world")))
    );
  }

  #[test]
  fn coerce_ideal_constants() {
    let int = Value::IdealInt(BigInt::from(42));
    assert_eq!(int.coerce(&Type::Int), Ok(Value::Int(42)));
    assert_eq!(int.coerce(&Type::Float), Ok(Value::Float(42.0)));

    let huge = Value::IdealInt(BigInt::from(1) << 64);
    assert_eq!(huge.coerce(&Type::Int), Err(CoerceError::Overflow));

    let half = Value::IdealFloat(rational(1, 2));
    assert_eq!(half.coerce(&Type::Int), Err(CoerceError::Truncated));
    assert_eq!(half.coerce(&Type::Float), Ok(Value::Float(0.5)));

    let whole = Value::IdealFloat(rational(6, 2));
    assert_eq!(whole.coerce(&Type::Int), Ok(Value::Int(3)));
  }

  #[test]
  fn coerce_to_named_type() {
    let celsius = Type::Named(Rc::new(NamedType {
      name: "Celsius".into(),
      underlying: Type::Float,
    }));

    let value = Value::IdealInt(BigInt::from(100));
    assert_eq!(value.coerce(&celsius), Ok(Value::Float(100.0)));
  }

  #[test]
  fn convert_between_numbers() {
    assert_eq!(Value::Float(3.9).convert(&Type::Int), Ok(Value::Int(3)));
    assert_eq!(Value::Float(-3.9).convert(&Type::Int), Ok(Value::Int(-3)));
    assert_eq!(Value::Int(2).convert(&Type::Float), Ok(Value::Float(2.0)));

    assert!(matches!(
      Value::Float(1e300).convert(&Type::Int),
      Err(Fault::ConversionOutOfRange { .. })
    ));
  }

  #[test]
  fn display() {
    assert_eq!(Value::IdealFloat(rational(41, 10)).to_string(), "4.1");
    assert_eq!(Value::IdealFloat(rational(4, 2)).to_string(), "2");
    assert_eq!(Value::Function(None).to_string(), "nil");
    assert_eq!(Value::Bool(true).to_string(), "true");
  }
}

mod literals {
  use super::*;

  #[test]
  fn integers() {
    assert_eq!(parse_integer("1234"), Some(BigInt::from(1234)));
    assert_eq!(parse_integer("0xff"), Some(BigInt::from(255)));
    assert_eq!(parse_integer("0XFF"), Some(BigInt::from(255)));
    assert_eq!(
      parse_integer("100000000000000000000"),
      Some(BigInt::from(10).pow(20))
    );
    assert_eq!(parse_integer("0xg"), None);
  }

  #[test]
  fn floats() {
    assert_eq!(parse_float("4.1"), Some(rational(41, 10)));
    assert_eq!(parse_float("1.0"), Some(rational(1, 1)));
    assert_eq!(parse_float(".5"), Some(rational(1, 2)));
    assert_eq!(parse_float("2."), Some(rational(2, 1)));
    assert_eq!(parse_float("1e3"), Some(rational(1000, 1)));
    assert_eq!(parse_float("25e-2"), Some(rational(1, 4)));
    assert_eq!(parse_float("1.5E+1"), Some(rational(15, 1)));
  }

  #[test]
  fn float_exponent_limit() {
    assert!(parse_float("1e5000").is_some());
    assert!(parse_float("1e-5000").is_some());
    assert_eq!(parse_float("1e100001"), None);
  }
}

mod scopes {
  use super::*;

  #[test]
  fn redeclaration_references_first_definition() {
    let scope = Scope::global(None);
    let first = Span { start: 0, end: 1 };
    let second = Span { start: 10, end: 11 };

    scope.define("x", Type::Int, false, Some(first)).unwrap();
    let error = scope.define("x", Type::Int, false, Some(second)).unwrap_err();

    assert_eq!(error.name.as_str(), "x");
    assert_eq!(error.previous, Some(first));
  }

  #[test]
  fn child_scope_can_shadow() {
    let parent = Scope::global(None);
    parent.define("x", Type::Int, false, None).unwrap();

    let child = parent.child();
    child.define("x", Type::String, false, None).unwrap();

    let Some(Definition::Variable { ty, .. }) = child.lookup("x") else {
      panic!("expected a variable");
    };
    assert_eq!(ty, Type::String);

    let Some(Definition::Variable { ty, .. }) = parent.lookup("x") else {
      panic!("expected a variable");
    };
    assert_eq!(ty, Type::Int);
  }

  #[test]
  fn lookup_through_parents() {
    let parent = Scope::global(None);
    parent
      .define_const("answer", Type::IdealInt, Value::IdealInt(BigInt::from(42)), None)
      .unwrap();

    let child = parent.child();
    assert!(matches!(child.lookup("answer"), Some(Definition::Constant { .. })));
    assert!(child.lookup_local("answer").is_none());
    assert!(child.lookup("question").is_none());
  }

  #[test]
  fn undefine_removes_definition() {
    let scope = Scope::global(None);
    scope.define("x", Type::Int, false, None).unwrap();
    scope.undefine("x");

    assert!(scope.lookup("x").is_none());
    assert!(scope.define("x", Type::Bool, false, None).is_ok());
  }

  #[test]
  fn global_variables_start_as_zero() {
    let scope = Scope::global(None);
    let slot = scope.define("s", Type::String, false, None).unwrap();

    let Slot::Global { frame, index } = slot else {
      panic!("expected a global slot");
    };
    let frame = frame.upgrade().unwrap();
    assert_eq!(frame.load(index), Ok(Value::String(Rc::from(""))));
  }

  #[test]
  fn local_variables_allocate_slots() {
    let global = Scope::global(None);
    let layout = Rc::new(FrameLayout::new(0));
    let local = Scope::local(global, Rc::clone(&layout));

    let a = local.define("a", Type::Int, false, None).unwrap();
    let b = local.child().define("b", Type::Int, false, None).unwrap();

    assert!(matches!(a, Slot::Local { level: 0, index: 0 }));
    assert!(matches!(b, Slot::Local { level: 0, index: 1 }));
    assert_eq!(layout.size(), 2);
    assert_eq!(local.level(), Some(0));
  }
}

mod frames {
  use super::*;

  #[test]
  fn uninitialised_slot() {
    let frame = Frame::new(2, None);
    assert_eq!(frame.load(1), Err(Fault::Uninitialised));

    frame.store(1, Value::Int(5));
    assert_eq!(frame.load(1), Ok(Value::Int(5)));
  }

  #[test]
  fn ancestors_follow_lexical_chain() {
    let outer = Rc::new(Frame::new(1, None));
    outer.store(0, Value::Bool(true));
    let inner = Rc::new(Frame::new(0, Some(Rc::clone(&outer))));

    let found = inner.ancestor(1).unwrap();
    assert_eq!(found.load(0), Ok(Value::Bool(true)));
    assert!(inner.ancestor(2).is_none());
  }

  #[test]
  fn slice_of_results() {
    let frame = Frame::new(4, None);
    frame.store(2, Value::Int(1));
    frame.store(3, Value::Int(2));

    assert_eq!(frame.slice(2, 2), vec![Value::Int(1), Value::Int(2)]);
  }
}

mod types {
  use super::*;

  #[test]
  fn display() {
    let function = Type::function(vec![Type::Int, Type::String], vec![Type::Bool]);
    assert_eq!(function.to_string(), "func(int, string) bool");

    let multi = Type::function(vec![], vec![Type::Int, Type::Float]);
    assert_eq!(multi.to_string(), "func() (int, float64)");

    assert_eq!(Type::none().to_string(), "()");
  }

  #[test]
  fn named_types_are_distinct() {
    let named = |name: &str| {
      Type::Named(Rc::new(NamedType {
        name: name.into(),
        underlying: Type::Int,
      }))
    };
    let a = named("A");
    let b = named("A");

    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert!(!Type::Int.assignable_to(&a));
    assert_eq!(a.underlying(), &Type::Int);
  }

  #[test]
  fn assignability() {
    assert!(Type::IdealInt.assignable_to(&Type::Float));
    assert!(Type::IdealFloat.assignable_to(&Type::Int));
    assert!(!Type::Int.assignable_to(&Type::Float));
    assert!(!Type::IdealInt.assignable_to(&Type::String));

    let function = Type::Function(Rc::new(FunctionType::default()));
    assert!(Type::Nil.assignable_to(&function));
    assert!(!Type::Nil.assignable_to(&Type::Int));
  }

  #[test]
  fn zero_values() {
    assert_eq!(Type::Int.zero(), Some(Value::Int(0)));
    assert_eq!(Type::Bool.zero(), Some(Value::Bool(false)));
    assert_eq!(
      Type::function(vec![], vec![]).zero(),
      Some(Value::Function(None))
    );
  }

  #[test]
  fn default_types() {
    assert_eq!(Type::IdealInt.default_type(), Type::Int);
    assert_eq!(Type::IdealFloat.default_type(), Type::Float);
    assert_eq!(Type::String.default_type(), Type::String);
  }
}
