//! # World
//!
//! The entry point for a host. A world owns a root scope, the packages which have been loaded
//! into it, and the runtime state its code shares. Worlds never share any state with each
//! other.

use crate::{
  bridge::HostValue,
  bytecode::Chunk,
  compiler::{Compiler, entry},
  config::Config,
  error::{CompileError, ConvertError, Error},
  package::{LoadError, Loader, PackageResolver},
  scope::{RedefinitionError, Scope, Slot},
  thread::{Code, CodeKind, Runtime},
  universe,
  value::Value,
};
use chicklet_syntax::{Span, parse};
use std::{io, rc::Rc};

/// A compile and execution context
#[derive(Debug)]
pub struct World {
  loader: Loader,
  scope: Rc<Scope>,
}
impl World {
  /// A world with the default configuration, printing to stdout
  #[must_use]
  pub fn new() -> Self {
    Self::with_config(Config::default())
  }

  /// A world with the configuration given
  #[must_use]
  pub fn with_config(config: Config) -> Self {
    let root = Scope::global(Some(universe::scope()));
    let runtime = Rc::new(Runtime::new(config));

    Self {
      loader: Loader::new(Rc::clone(&root), runtime),
      scope: root,
    }
  }

  /// Sets where the source of imported packages is found
  #[must_use]
  pub fn with_resolver(mut self, resolver: impl PackageResolver + 'static) -> Self {
    self.loader.resolver = Box::new(resolver);
    self
  }

  /// Sets where `println` writes to
  #[must_use]
  pub fn with_output(self, output: impl io::Write + 'static) -> Self {
    *self.loader.runtime.output.borrow_mut() = Box::new(output);
    self
  }

  /// The configuration of the world
  #[must_use]
  pub fn config(&self) -> Config {
    self.loader.runtime.config
  }

  /// Compiles source code in the world's scope.
  ///
  /// The source can be a single expression, a list of statements, or a list of declarations
  /// which may start with imports. Any `init` functions of imported packages are run before
  /// the code is returned.
  ///
  /// # Errors
  /// If the source can't be parsed or compiled, or an `init` function fails. When an `init`
  /// function fails the rest still run, and the imported packages stay loaded.
  #[tracing::instrument(level = "debug", skip_all)]
  pub fn compile(&mut self, source: &str) -> Result<Code, Error> {
    let ast = parse(source.to_owned());
    if !ast.is_valid() {
      return Err(Error::Parse(ast.errors));
    }
    if ast.starts_with_import() {
      tracing::debug!("loading imports before compiling snippet");
    }

    let compiler = Compiler::new(&self.loader, Rc::clone(&self.scope));
    let code = compiler.compile_snippet(&ast).map_err(Error::Compile)?;

    self.run_init_queue()?;
    Ok(code)
  }

  /// Compiles the files of a package, and runs its declarations.
  ///
  /// The packages it imports are loaded first, and its `init` functions are queued to run at
  /// the start of the next [`World::compile`]. The code returned does nothing, as does the
  /// code for a package which has already been loaded. Compiling the package `main` makes its
  /// scope the one later source is compiled in.
  ///
  /// # Errors
  /// If the files can't be parsed or compiled, or running the declarations faults. A package
  /// which fails is not loaded, so it can be compiled again.
  #[tracing::instrument(level = "debug", skip(self, files))]
  pub fn compile_package(&mut self, files: Vec<String>, path: &str) -> Result<Code, Error> {
    let package = match self.loader.loaded(path) {
      Some(package) => {
        tracing::debug!(path, "package already loaded");
        package
      }
      None => self.loader.load(path, &files).map_err(|error| match error {
        LoadError::Parse(errors) => Error::Parse(errors),
        LoadError::Compile(errors) => Error::Compile(errors),
        LoadError::Runtime(error) => Error::from(error),
      })?,
    };

    if path == "main" {
      self.scope = Rc::clone(&package.scope);
    }

    let entry = entry(&self.loader.runtime, Chunk::default(), 0);
    Ok(Code::new(CodeKind::Package, entry))
  }

  /// Defines a global variable, or a constant for untyped numbers, from a host value.
  ///
  /// # Errors
  /// If the name is already defined, or the value is `nil` which has no type.
  pub fn define(&mut self, name: &str, value: impl Into<HostValue>) -> Result<(), Error> {
    let value = value.into();
    tracing::debug!(name, kind = value.kind(), "define");

    let Some(ty) = value.ty() else {
      return Err(Error::Convert(ConvertError::Unconvertible {
        value: value.to_string(),
        kind: value.kind(),
      }));
    };
    let runtime_value = value.to_runtime(&ty)?;

    if matches!(runtime_value, Value::IdealInt(_) | Value::IdealFloat(_)) {
      return (self.scope)
        .define_const(name, ty, runtime_value, None)
        .map_err(redeclared);
    }

    let slot = self.scope.define(name, ty, false, None).map_err(redeclared)?;
    if let (Slot::Global { index, .. }, Some(frame)) = (slot, self.scope.frame()) {
      frame.store(index, runtime_value);
    }

    Ok(())
  }

  /// Runs compiled code, converting its results into host values.
  ///
  /// # Errors
  /// If a runtime fault happens.
  pub fn run(&self, code: &Code) -> Result<Vec<HostValue>, Error> {
    let values = code.run()?;
    Ok(values.iter().map(HostValue::from_runtime).collect())
  }

  /// Compiles and runs source code.
  ///
  /// # Errors
  /// If the source can't be compiled, or a runtime fault happens.
  pub fn eval(&mut self, source: &str) -> Result<Vec<HostValue>, Error> {
    let code = self.compile(source)?;
    self.run(&code)
  }

  /// Runs every queued `init` function once, even if an earlier one faults.
  /// The first fault is reported.
  fn run_init_queue(&self) -> Result<(), Error> {
    let mut first_error = None;
    for init in self.loader.take_init_queue() {
      if let Err(error) = init.run() {
        tracing::debug!(%error, "init function failed");
        first_error.get_or_insert(error);
      }
    }

    match first_error {
      Some(error) => Err(error.into()),
      None => Ok(()),
    }
  }
}
impl Default for World {
  fn default() -> Self {
    Self::new()
  }
}

fn redeclared(error: RedefinitionError) -> Error {
  Error::Compile(vec![CompileError::Redeclared {
    name: error.name,
    span: Span::default(),
    previous: error.previous,
  }])
}
