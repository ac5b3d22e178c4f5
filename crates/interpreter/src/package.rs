//! # Packages
//!
//! Packages are found by a [`PackageResolver`], compiled once per world, and cached by their
//! import path. A package which is still being compiled when it is imported again is part of
//! an import cycle.

use crate::{
  compiler::Compiler,
  error::{CompileError, RuntimeError},
  scope::Scope,
  thread::{Code, Runtime},
};
use chicklet_syntax::{AST, ParseError, Span, parse};
use rustc_hash::FxHashMap;
use smartstring::alias::String as SmartString;
use std::{cell::RefCell, fmt, mem, rc::Rc};

/// Finds the source files of packages
pub trait PackageResolver {
  /// The source of each file in the package with the import path, or `None` if it doesn't exist
  fn resolve(&self, path: &str) -> Option<Vec<String>>;
}

/// Resolves packages from source held in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
  packages: FxHashMap<String, Vec<String>>,
}
impl MemoryResolver {
  /// A resolver with no packages
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a package with the files given
  pub fn add(&mut self, path: impl Into<String>, files: Vec<String>) {
    self.packages.insert(path.into(), files);
  }

  /// Adds a package with the files given
  #[must_use]
  pub fn with_package(mut self, path: impl Into<String>, files: Vec<String>) -> Self {
    self.add(path, files);
    self
  }
}
impl PackageResolver for MemoryResolver {
  fn resolve(&self, path: &str) -> Option<Vec<String>> {
    self.packages.get(path).cloned()
  }
}

/// A compiled package
#[derive(Debug)]
pub struct Package {
  /// The name from the `package` clause
  pub name: SmartString,
  /// The path it was imported with
  pub path: String,
  /// The declarations of the package
  pub scope: Rc<Scope>,
}

#[derive(Debug)]
enum Status {
  Visiting,
  Done(Rc<Package>),
}

/// Why a package couldn't be loaded
#[derive(Debug)]
pub(crate) enum LoadError {
  Parse(Vec<ParseError>),
  Compile(Vec<CompileError>),
  Runtime(RuntimeError),
}

/// Compiles packages for a world, remembering which have already been loaded
pub(crate) struct Loader {
  pub(crate) root: Rc<Scope>,
  pub(crate) runtime: Rc<Runtime>,
  pub(crate) resolver: Box<dyn PackageResolver>,
  packages: RefCell<FxHashMap<String, Status>>,
  init_queue: RefCell<Vec<Code>>,
}
impl Loader {
  pub(crate) fn new(root: Rc<Scope>, runtime: Rc<Runtime>) -> Self {
    Self {
      root,
      runtime,
      resolver: Box::new(MemoryResolver::new()),
      packages: RefCell::default(),
      init_queue: RefCell::default(),
    }
  }

  /// Has the package with the import path already been loaded?
  pub(crate) fn loaded(&self, path: &str) -> Option<Rc<Package>> {
    match self.packages.borrow().get(path) {
      Some(Status::Done(package)) => Some(Rc::clone(package)),
      Some(Status::Visiting) | None => None,
    }
  }

  /// Imports a package, compiling and running its declarations if it hasn't been loaded yet
  pub(crate) fn import(&self, path: &str, span: Span) -> Result<Rc<Package>, Vec<CompileError>> {
    match self.packages.borrow().get(path) {
      Some(Status::Done(package)) => {
        tracing::debug!(path, "package already loaded");
        return Ok(Rc::clone(package));
      }
      Some(Status::Visiting) => {
        return Err(vec![CompileError::ImportCycle {
          path: path.to_owned(),
          span,
        }]);
      }
      None => {}
    }

    let Some(files) = self.resolver.resolve(path) else {
      return Err(vec![CompileError::PackageNotFound {
        path: path.to_owned(),
        span,
      }]);
    };

    self.load(path, &files).map_err(|error| {
      let reason = match error {
        LoadError::Compile(errors) => return errors,
        LoadError::Parse(errors) => errors.first().map(ParseError::message).unwrap_or_default(),
        LoadError::Runtime(error) => error.to_string(),
      };
      vec![CompileError::ImportFailed {
        path: path.to_owned(),
        reason,
        span,
      }]
    })
  }

  /// Compiles a package from the source of its files, then runs its declarations.
  ///
  /// Imports of the package are loaded first. The package is only marked as loaded, and its
  /// `init` functions queued, once its declarations have run without a fault.
  #[tracing::instrument(level = "debug", skip(self, files), fields(files = files.len()))]
  pub(crate) fn load(&self, path: &str, files: &[String]) -> Result<Rc<Package>, LoadError> {
    let asts = files
      .iter()
      .map(|file| parse(file.clone()))
      .collect::<Vec<AST>>();

    let parse_errors = (asts.iter())
      .flat_map(|ast| ast.errors.iter().cloned())
      .collect::<Vec<_>>();
    if !parse_errors.is_empty() {
      return Err(LoadError::Parse(parse_errors));
    }

    let name = (asts.iter())
      .find_map(AST::package_name)
      .or_else(|| path.rsplit('/').next())
      .unwrap_or(path);
    let package = Rc::new(Package {
      name: name.into(),
      path: path.to_owned(),
      scope: Scope::global(Some(Rc::clone(&self.root))),
    });

    (self.packages.borrow_mut()).insert(path.to_owned(), Status::Visiting);

    let compiler = Compiler::new(self, Rc::clone(&package.scope));
    let result = compiler
      .compile_package(&asts)
      .map_err(LoadError::Compile)
      .and_then(|(code, inits)| {
        code.run().map_err(LoadError::Runtime)?;
        Ok(inits)
      });

    match result {
      Ok(inits) => {
        (self.packages.borrow_mut()).insert(path.to_owned(), Status::Done(Rc::clone(&package)));
        self.init_queue.borrow_mut().extend(inits);
        Ok(package)
      }
      Err(error) => {
        tracing::debug!(path, "package failed to load");
        self.packages.borrow_mut().remove(path);
        Err(error)
      }
    }
  }

  /// Takes the `init` functions which are waiting to run, in the order they were loaded
  pub(crate) fn take_init_queue(&self) -> Vec<Code> {
    let queue = mem::take(&mut *self.init_queue.borrow_mut());
    if !queue.is_empty() {
      tracing::debug!(count = queue.len(), "draining init queue");
    }
    queue
  }
}
impl fmt::Debug for Loader {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Loader")
      .field("packages", &self.packages.borrow().keys().collect::<Vec<_>>())
      .finish_non_exhaustive()
  }
}
