//! # Bridge Tests
//!
//! Passing values and functions between the host and code running in a world.

use chicklet_interpreter::{
  CallError, CompileError, ConvertError, Error, Fault, FunctionType, HostFunction, HostValue,
  Type, World,
};
use indoc::indoc;
use num_bigint::BigInt;
use num_rational::BigRational;
use std::{cell::Cell, rc::Rc};

fn function(world: &mut World, source: &str) -> HostFunction {
  match world.eval(source).unwrap().as_slice() {
    [HostValue::Function(function)] => function.clone(),
    values => panic!("Expected a function, got {values:?}"),
  }
}

#[test]
fn call_interpreted_function() {
  let mut world = World::new();
  let multiply = function(&mut world, "func(i, j int) int { return i * j }");

  let results = multiply.call(&[HostValue::from(2), HostValue::from(5)]).unwrap();
  assert_eq!(results, vec![HostValue::Int(10)]);

  let results = multiply.call(&[HostValue::from(-3), HostValue::from(7)]).unwrap();
  assert_eq!(results, vec![HostValue::Int(-21)]);
}

#[test]
fn call_function_without_results() {
  let mut world = World::new();
  let nothing = function(&mut world, "func() {}");
  assert_eq!(nothing.call(&[]).unwrap(), vec![]);
}

#[test]
fn call_function_with_many_results() {
  let mut world = World::new();
  let swap = function(&mut world, "func(a string, b int) (int, string) { return b, a }");

  let results = swap.call(&["x".into(), 4.into()]).unwrap();
  assert_eq!(results, vec![HostValue::Int(4), HostValue::from("x")]);
}

#[test]
fn call_with_wrong_arguments() {
  let mut world = World::new();
  let multiply = function(&mut world, "func(i, j int) int { return i * j }");

  let error = multiply.call(&[HostValue::from(2)]).unwrap_err();
  assert!(matches!(error, Error::Call(CallError { expected: 2, received: 1 })));

  let error = multiply.call(&[HostValue::from(2), HostValue::from("5")]).unwrap_err();
  assert!(matches!(error, Error::Convert(ConvertError::Mismatch { expected: Type::Int, .. })));
}

#[test]
fn closures_keep_their_state() {
  let mut world = World::new();
  let counter = function(
    &mut world,
    indoc! {"
      func() func() int {
        count := 0
        return func() int {
          count++
          return count
        }
      }()
    "},
  );

  counter.call(&[]).unwrap();
  counter.call(&[]).unwrap();
  assert_eq!(counter.call(&[]).unwrap(), vec![HostValue::Int(3)]);
}

#[test]
fn faults_in_called_functions() {
  let mut world = World::new();
  let divide = function(&mut world, "func(a, b int) int { return a / b }");

  let error = divide.call(&[1.into(), 0.into()]).unwrap_err();
  let Error::Runtime(error) = error else {
    panic!("Expected a runtime error, got {error:?}");
  };
  assert_eq!(error.fault, Fault::DivisionByZero);
}

#[test]
fn function_outliving_its_world() {
  let mut world = World::new();
  world.eval("var total = 1").unwrap();
  let read = function(&mut world, "func() int { return total }");
  assert_eq!(read.call(&[]).unwrap(), vec![HostValue::Int(1)]);

  drop(world);

  let Error::Runtime(error) = read.call(&[]).unwrap_err() else {
    panic!("Expected a runtime error");
  };
  assert_eq!(error.fault, Fault::WorldDropped);
  assert_eq!(error.to_string(), "the world the function belongs to has been dropped");
}

#[test]
fn define_values() {
  let mut world = World::new();
  world.define("count", 12).unwrap();
  world.define("ratio", 0.5).unwrap();
  world.define("name", "chicklet").unwrap();
  world.define("enabled", true).unwrap();

  assert_eq!(world.eval("count * 2").unwrap(), vec![HostValue::Int(24)]);
  assert_eq!(world.eval("ratio * 3").unwrap(), vec![HostValue::Float(1.5)]);
  assert_eq!(world.eval("len(name)").unwrap(), vec![HostValue::Int(8)]);
  assert_eq!(world.eval("!enabled").unwrap(), vec![HostValue::Bool(false)]);

  // defined values are variables
  world.eval("count = 5").unwrap();
  assert_eq!(world.eval("count").unwrap(), vec![HostValue::Int(5)]);
}

#[test]
fn define_ideal_constants() {
  let mut world = World::new();
  world.define("Big", BigInt::from(10).pow(20)).unwrap();
  world.define("Half", BigRational::new(1.into(), 2.into())).unwrap();

  // constants adapt to the type they are used as
  assert_eq!(world.eval("float64(Half) * 4").unwrap(), vec![HostValue::Float(2.0)]);
  assert_eq!(
    world.eval("Big / 1000000000000000000").unwrap(),
    vec![HostValue::BigInt(BigInt::from(100))]
  );

  let errors = match world.compile("Half = 1.0") {
    Err(Error::Compile(errors)) => errors,
    result => panic!("Expected a compile error, got {result:?}"),
  };
  assert!(matches!(errors.as_slice(), [CompileError::InvalidAssignment { .. }]));
}

#[test]
fn define_nil() {
  let mut world = World::new();
  let error = world.define("nothing", HostValue::Nil).unwrap_err();
  assert!(matches!(error, Error::Convert(ConvertError::Unconvertible { kind: "nil", .. })));
}

#[test]
fn redefine() {
  let mut world = World::new();
  world.define("x", 1).unwrap();

  let error = world.define("x", 2).unwrap_err();
  let Error::Compile(errors) = error else {
    panic!("Expected a compile error, got {error:?}");
  };
  assert!(matches!(errors.as_slice(), [CompileError::Redeclared { name, .. }] if name.as_str() == "x"));

  world.eval("y := 1").unwrap();
  assert!(world.define("y", 2).is_err());
}

#[test]
fn wrapped_host_functions() {
  let mut world = World::new();
  world.define("add", HostFunction::wrap(|a: i64, b: i64| a + b)).unwrap();
  world
    .define("describe", HostFunction::wrap(|x: f64| (x.floor(), x > 0.0)))
    .unwrap();
  world
    .define("shout", HostFunction::wrap(|text: String| text.to_uppercase()))
    .unwrap();

  assert_eq!(world.eval("add(2, 3)").unwrap(), vec![HostValue::Int(5)]);
  assert_eq!(
    world.eval("describe(2.5)").unwrap(),
    vec![HostValue::Float(2.0), HostValue::Bool(true)]
  );
  assert_eq!(world.eval("shout(\"hi\")").unwrap(), vec![HostValue::from("HI")]);
}

#[test]
fn host_function_types_are_checked() {
  let mut world = World::new();
  world.define("add", HostFunction::wrap(|a: i64, b: i64| a + b)).unwrap();

  let errors = match world.compile("add(1.5, 2)") {
    Err(Error::Compile(errors)) => errors,
    result => panic!("Expected a compile error, got {result:?}"),
  };
  assert!(matches!(errors.as_slice(), [CompileError::ConstantTruncated { .. }]));

  let errors = match world.compile("x := add(1, 2) + \"a\"") {
    Err(Error::Compile(errors)) => errors,
    result => panic!("Expected a compile error, got {result:?}"),
  };
  assert!(matches!(errors.as_slice(), [CompileError::MismatchedTypes { .. }]));
}

#[test]
fn host_functions_called_from_host() {
  let calls = Rc::new(Cell::new(0_i64));
  let counter = Rc::clone(&calls);
  let function = HostFunction::wrap(move || {
    counter.set(counter.get() + 1);
    counter.get()
  });

  assert_eq!(function.call(&[]).unwrap(), vec![HostValue::Int(1)]);
  assert_eq!(function.call(&[]).unwrap(), vec![HostValue::Int(2)]);
  assert_eq!(calls.get(), 2);

  let error = function.call(&[HostValue::from(1)]).unwrap_err();
  assert!(matches!(error, Error::Call(CallError { expected: 0, received: 1 })));
}

#[test]
fn native_function_with_wrong_results() {
  let mut world = World::new();

  let wrong_type = FunctionType {
    inputs: vec![Type::Int],
    outputs: vec![Type::Int],
  };
  world
    .define(
      "wrong",
      HostFunction::native(wrong_type, |_| Ok(vec![HostValue::from("not a number")])),
    )
    .unwrap();

  let error = world.eval("wrong(1)").unwrap_err();
  assert!(matches!(error, Error::Convert(ConvertError::Mismatch { expected: Type::Int, .. })));

  let too_many = FunctionType {
    inputs: Vec::new(),
    outputs: vec![Type::Int],
  };
  world
    .define(
      "many",
      HostFunction::native(too_many, |_| Ok(vec![HostValue::Int(1), HostValue::Int(2)])),
    )
    .unwrap();

  let error = world.eval("many()").unwrap_err();
  assert!(matches!(
    error,
    Error::Convert(ConvertError::ResultCount { expected: 1, received: 2 })
  ));
}

#[test]
fn native_function_with_mismatched_signature() {
  let mut world = World::new();

  // the declared signature takes a string, but the closure expects an int
  let ty = FunctionType {
    inputs: vec![Type::String],
    outputs: Vec::new(),
  };
  world
    .define(
      "confused",
      HostFunction::native(ty, |arguments| {
        let [argument] = arguments else {
          return Err(ConvertError::ArgumentCount {
            expected: 1,
            received: arguments.len(),
          });
        };
        <i64 as chicklet_interpreter::HostType>::from_host(argument)?;
        Ok(Vec::new())
      }),
    )
    .unwrap();

  let error = world.eval("confused(\"text\")").unwrap_err();
  assert!(matches!(error, Error::Convert(ConvertError::Mismatch { expected: Type::Int, .. })));
}

#[test]
fn functions_round_trip() {
  let mut world = World::new();
  let double = function(&mut world, "func(x int) int { return x * 2 }");

  world.define("double", double).unwrap();
  assert_eq!(world.eval("double(double(3))").unwrap(), vec![HostValue::Int(12)]);

  world.eval("var f func()").unwrap();
  assert_eq!(world.eval("f").unwrap(), vec![HostValue::Nil]);
}

#[test]
fn host_and_interpreted_functions_call_each_other() {
  let mut world = World::new();
  world
    .define(
      "native",
      HostFunction::wrap(|i: i64, s: String| i + i64::try_from(s.len()).unwrap()),
    )
    .unwrap();
  world
    .eval("func callNative(s string, i int) int { return native(i, s) }")
    .unwrap();

  let function = function(
    &mut world,
    "func(s string, i int) (int, string) { return callNative(s, i), s }",
  );
  let results = function.call(&["hello world".into(), 17.into()]).unwrap();
  assert_eq!(results, vec![HostValue::Int(28), HostValue::from("hello world")]);
}
