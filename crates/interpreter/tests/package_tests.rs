//! # Package Tests
//!
//! Importing packages into a world, and the order their declarations and `init` functions run.

use chicklet_interpreter::{
  CodeKind, CompileError, Error, HostFunction, HostValue, MemoryResolver, World,
};
use indoc::indoc;
use std::{cell::RefCell, rc::Rc};

fn files(sources: &[&str]) -> Vec<String> {
  sources.iter().map(|source| (*source).to_owned()).collect()
}

fn world(resolver: MemoryResolver) -> World {
  World::new().with_resolver(resolver)
}

fn compile_errors(world: &mut World, source: &str) -> Vec<CompileError> {
  match world.compile(source) {
    Ok(_) => panic!("Expected an error"),
    Err(Error::Compile(errors)) => errors,
    Err(error) => panic!("Expected a compile error, got {error}"),
  }
}

fn maths() -> Vec<String> {
  files(&[indoc! {"
    package maths

    const Pi = 3.14159

    var Calls int

    func Double(x int) int {
      Calls++
      return x * 2
    }
  "}])
}

#[test]
fn import_package() {
  let mut world = world(MemoryResolver::new().with_package("maths", maths()));
  world.eval("import \"maths\"").unwrap();

  assert_eq!(world.eval("maths.Double(21)").unwrap(), vec![HostValue::Int(42)]);
  assert_eq!(world.eval("maths.Calls").unwrap(), vec![HostValue::Int(1)]);

  let pi = world.eval("maths.Pi * 2 > 6").unwrap();
  assert_eq!(pi, vec![HostValue::Bool(true)]);
}

#[test]
fn import_followed_by_statements() {
  let mut world = world(MemoryResolver::new().with_package("maths", maths()));
  world
    .eval(indoc! {r#"
      import "maths"

      result := maths.Double(4)
    "#})
    .unwrap();

  assert_eq!(world.eval("result").unwrap(), vec![HostValue::Int(8)]);
}

#[test]
fn grouped_imports() {
  let resolver = MemoryResolver::new()
    .with_package("maths", maths())
    .with_package("text", files(&["package text\n\nconst Greeting = \"hi\""]));
  let mut world = world(resolver);

  world.eval("import (\n  \"maths\"\n  \"text\"\n)").unwrap();
  assert_eq!(world.eval("text.Greeting").unwrap(), vec![HostValue::from("hi")]);
}

#[test]
fn package_name_defaults_to_last_path_segment() {
  let resolver = MemoryResolver::new().with_package("lib/strings", files(&["const Empty = \"\""]));
  let mut world = world(resolver);

  world.eval("import \"lib/strings\"").unwrap();
  assert_eq!(world.eval("len(strings.Empty)").unwrap(), vec![HostValue::Int(0)]);
}

#[test]
fn packages_with_many_files() {
  let resolver = MemoryResolver::new().with_package(
    "shapes",
    files(&[
      indoc! {"
        package shapes

        var scale = 2

        func Area(w, h int) int {
          return scale * multiply(w, h)
        }
      "},
      indoc! {"
        package shapes

        func multiply(a, b int) int {
          return a * b
        }
      "},
    ]),
  );
  let mut world = world(resolver);

  world.eval("import \"shapes\"").unwrap();
  assert_eq!(world.eval("shapes.Area(2, 3)").unwrap(), vec![HostValue::Int(12)]);
}

#[test]
fn package_types() {
  let resolver = MemoryResolver::new().with_package(
    "temperature",
    files(&[indoc! {"
      package temperature

      type Celsius float64

      func Boiling() Celsius {
        return 100
      }
    "}]),
  );
  let mut world = world(resolver);

  world
    .eval(indoc! {"
      import \"temperature\"

      var t temperature.Celsius = temperature.Boiling()
      f := float64(t)
    "})
    .unwrap();
  assert_eq!(world.eval("f").unwrap(), vec![HostValue::Float(100.0)]);
}

#[test]
fn packages_are_loaded_once() {
  let resolver = MemoryResolver::new()
    .with_package("maths", maths())
    .with_package(
      "geometry",
      files(&["package geometry\n\nimport \"maths\"\n\nvar Circle = maths.Pi * 2"]),
    );
  let mut world = world(resolver);

  world.eval("import \"maths\"").unwrap();
  world.eval("maths.Double(1)").unwrap();
  world.eval("import \"geometry\"").unwrap();

  // the state of the package is shared, not reset by a second import
  assert_eq!(world.eval("maths.Calls").unwrap(), vec![HostValue::Int(1)]);
}

#[test]
fn importing_twice_is_allowed() {
  let mut world = world(MemoryResolver::new().with_package("maths", maths()));
  world.eval("import \"maths\"").unwrap();
  world.eval("import \"maths\"").unwrap();
}

#[test]
fn unknown_member() {
  let mut world = world(MemoryResolver::new().with_package("maths", maths()));
  world.eval("import \"maths\"").unwrap();

  let errors = compile_errors(&mut world, "maths.Triple(2)");
  assert!(matches!(errors.as_slice(), [CompileError::UnknownMember { .. }]));

  let errors = compile_errors(&mut world, "maths");
  assert!(matches!(
    errors.as_slice(),
    [CompileError::NotAnExpression { kind: "package", .. }]
  ));
}

#[test]
fn package_not_found() {
  let mut world = World::new();
  let errors = compile_errors(&mut world, "import \"nowhere\"");
  assert!(matches!(errors.as_slice(), [CompileError::PackageNotFound { path, .. }] if path == "nowhere"));
}

#[test]
fn import_cycle() {
  let resolver = MemoryResolver::new()
    .with_package("a", files(&["package a\n\nimport \"b\"\n\nconst A = 1"]))
    .with_package("b", files(&["package b\n\nimport \"a\"\n\nconst B = 2"]));
  let mut world = world(resolver);

  let errors = compile_errors(&mut world, "import \"a\"");
  assert!(matches!(errors.as_slice(), [CompileError::ImportCycle { path, .. }] if path == "a"));

  // neither package was loaded
  let errors = compile_errors(&mut world, "a.A");
  assert!(matches!(errors.as_slice(), [CompileError::Undefined { .. }]));
  let errors = compile_errors(&mut world, "import \"b\"");
  assert!(matches!(errors.as_slice(), [CompileError::ImportCycle { path, .. }] if path == "b"));
}

#[test]
fn self_import() {
  let resolver =
    MemoryResolver::new().with_package("me", files(&["package me\n\nimport \"me\""]));
  let mut world = world(resolver);

  let errors = compile_errors(&mut world, "import \"me\"");
  assert!(matches!(errors.as_slice(), [CompileError::ImportCycle { .. }]));
}

#[test]
fn init_functions_run_in_dependency_order() {
  let log = Rc::new(RefCell::new(Vec::new()));

  let resolver = MemoryResolver::new()
    .with_package(
      "base",
      files(&[indoc! {r#"
        package base

        var Ready bool

        func init() {
          Ready = true
          record("base")
        }
      "#}]),
    )
    .with_package(
      "app",
      files(&[indoc! {r#"
        package app

        import "base"

        func init() {
          record("app 1")
        }

        func init() {
          record("app 2")
        }
      "#}]),
    );
  let mut world = world(resolver);

  let recorder = Rc::clone(&log);
  let record = HostFunction::wrap(move |name: String| recorder.borrow_mut().push(name));
  world.define("record", record).unwrap();

  world.eval("import \"app\"").unwrap();
  assert_eq!(*log.borrow(), ["base", "app 1", "app 2"]);

  // inits only ever run once
  world.eval("import \"base\"").unwrap();
  assert_eq!(log.borrow().len(), 3);
  assert_eq!(world.eval("base.Ready").unwrap(), vec![HostValue::Bool(true)]);
}

#[test]
fn init_with_signature() {
  let resolver = MemoryResolver::new()
    .with_package("bad", files(&["package bad\n\nfunc init() int {\n  return 1\n}"]));
  let mut world = world(resolver);

  let errors = compile_errors(&mut world, "import \"bad\"");
  assert!(matches!(errors.as_slice(), [CompileError::InvalidInit { .. }]));
}

#[test]
fn statements_outside_functions() {
  let resolver = MemoryResolver::new().with_package("bad", files(&["package bad\n\nx := 1"]));
  let mut world = world(resolver);

  let errors = compile_errors(&mut world, "import \"bad\"");
  assert!(matches!(errors.as_slice(), [CompileError::NonDeclarationStatement { .. }]));
}

#[test]
fn package_which_fails() {
  let resolver = MemoryResolver::new()
    .with_package("broken", files(&["package broken\n\nvar x = "]))
    .with_package(
      "boom",
      files(&["package boom\n\nvar zero = 0\nvar X = 1 / zero"]),
    );
  let mut world = world(resolver);

  let errors = compile_errors(&mut world, "import \"broken\"");
  assert!(matches!(errors.as_slice(), [CompileError::ImportFailed { .. }]));

  let errors = compile_errors(&mut world, "import \"boom\"");
  let [CompileError::ImportFailed { reason, .. }] = errors.as_slice() else {
    panic!("unexpected errors: {errors:?}");
  };
  assert_eq!(reason, "integer divide by zero");
}

#[test]
fn host_definitions_are_visible_to_packages() {
  let resolver = MemoryResolver::new().with_package(
    "greeter",
    files(&["package greeter\n\nfunc Greet() string {\n  return prefix + \"world\"\n}"]),
  );
  let mut world = world(resolver);
  world.define("prefix", "hello ").unwrap();

  world.eval("import \"greeter\"").unwrap();
  assert_eq!(world.eval("greeter.Greet()").unwrap(), vec![HostValue::from("hello world")]);
}

#[test]
fn main_package() {
  let mut world = world(MemoryResolver::new().with_package("maths", maths()));

  let main = files(&[indoc! {r#"
    package main

    import "maths"

    var Answer = maths.Double(21)

    func main() string {
      return "done"
    }
  "#}]);
  let code = world.compile_package(main.clone(), "main").unwrap();
  assert_eq!(code.kind(), &CodeKind::Package);
  assert_eq!(world.run(&code).unwrap(), vec![]);

  assert_eq!(world.eval("Answer").unwrap(), vec![HostValue::Int(42)]);
  assert_eq!(world.eval("main()").unwrap(), vec![HostValue::from("done")]);

  // compiling it again does nothing
  let again = world.compile_package(main, "main").unwrap();
  assert_eq!(again.kind(), &CodeKind::Package);
  assert_eq!(world.run(&again).unwrap(), vec![]);
}

#[test]
fn main_package_errors() {
  let mut world = World::new();
  let result = world.compile_package(files(&["package main\n\nvar x int = \"\""]), "main");
  assert!(matches!(result, Err(Error::Compile(_))));

  let result = world.compile_package(files(&["package main\n\nvar x = "]), "main");
  assert!(matches!(result, Err(Error::Parse(_))));

  let faulty = files(&["package main\n\nvar zero = 0\nvar x = 1 / zero"]);
  let result = world.compile_package(faulty.clone(), "main");
  assert!(matches!(result, Err(Error::Runtime(_))));

  // a package which faulted isn't loaded, so it is compiled again
  let result = world.compile_package(faulty, "main");
  assert!(matches!(result, Err(Error::Runtime(_))));
}

#[test]
fn compiled_package_can_be_imported() {
  let mut world = World::new();
  let lib = files(&[indoc! {"
    package lib

    var X = 5

    func F() int {
      return X * 2
    }
  "}]);
  world.compile_package(lib, "lib").unwrap();

  world.eval("import \"lib\"").unwrap();
  assert_eq!(world.eval("lib.X").unwrap(), vec![HostValue::Int(5)]);
  assert_eq!(world.eval("lib.F()").unwrap(), vec![HostValue::Int(10)]);
}

#[test]
fn init_of_failed_package_never_runs() {
  let log = Rc::new(RefCell::new(Vec::<String>::new()));

  let resolver = MemoryResolver::new().with_package(
    "boom",
    files(&[indoc! {r#"
      package boom

      var zero = 0
      var X = 1 / zero

      func init() {
        record("boom init")
      }
    "#}]),
  );
  let mut world = world(resolver);

  let recorder = Rc::clone(&log);
  let record = HostFunction::wrap(move |name: String| recorder.borrow_mut().push(name));
  world.define("record", record).unwrap();

  for _ in 0..2 {
    let errors = compile_errors(&mut world, "import \"boom\"");
    assert!(matches!(errors.as_slice(), [CompileError::ImportFailed { .. }]));
  }

  assert_eq!(world.eval("1").unwrap(), vec![HostValue::Int(1)]);
  assert!(log.borrow().is_empty());
}

#[test]
fn every_init_runs_when_one_fails() {
  let log = Rc::new(RefCell::new(Vec::<String>::new()));

  let resolver = MemoryResolver::new()
    .with_package(
      "a",
      files(&["package a\n\nfunc init() {\n  panic(\"a fails\")\n}"]),
    )
    .with_package(
      "b",
      files(&["package b\n\nfunc init() {\n  record(\"b\")\n}"]),
    )
    .with_package("c", files(&["package c\n\nimport (\n  \"a\"\n  \"b\"\n)"]));
  let mut world = world(resolver);

  let recorder = Rc::clone(&log);
  let record = HostFunction::wrap(move |name: String| recorder.borrow_mut().push(name));
  world.define("record", record).unwrap();

  let Err(Error::Runtime(error)) = world.compile("import \"c\"") else {
    panic!("Expected the init of `a` to fail");
  };
  assert_eq!(error.to_string(), "panic: a fails");
  assert_eq!(*log.borrow(), ["b"]);

  // each init runs once, and the packages stay loaded
  world.eval("1").unwrap();
  world.eval("import \"c\"").unwrap();
  assert_eq!(*log.borrow(), ["b"]);
}
