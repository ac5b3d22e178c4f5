//! # Compiler
//!
//! Checks the types of an AST and lowers it to bytecode in a single pass.
//!
//! Errors are collected statement by statement, so one mistake doesn't hide the rest. If any
//! are found, the global definitions the unit made are removed again so the world is left as
//! it was before.
//!
//! Declarations at the top level can be used before the point they are declared. Types and
//! function signatures are declared in a first pass, and the closures for function bodies are
//! created in a prelude which runs before any other statement.

mod expression;
mod statement;

use crate::{
  bytecode::{Chunk, Instruction, Jump, Prototype},
  error::CompileError,
  package::Loader,
  scope::{Definition, FrameLayout, RedefinitionError, Scope, Slot},
  thread::{Code, CodeKind, Runtime},
  types::{FunctionType, Type},
  value::Value,
};
use chicklet_syntax::{
  AST, Span,
  ast::{
    Statement,
    statement::{FunctionDeclaration, Import},
    types::{Parameter, Signature},
  },
};
use expression::{Expr, ExprCode};
use smartstring::alias::String as SmartString;
use std::{mem, rc::Rc};

/// Compiles units of source code into a scope
pub(crate) struct Compiler<'l> {
  loader: &'l Loader,
  scope: Rc<Scope>,
  layout: Rc<FrameLayout>,

  chunk: Chunk,
  prelude: Chunk,

  function: Option<FunctionContext>,
  loops: Vec<LoopContext>,
  literals: usize,

  defined: Vec<(Rc<Scope>, SmartString)>,
  inits: Vec<Rc<Prototype>>,
  package: bool,
  errors: Vec<CompileError>,
}

#[derive(Debug)]
struct FunctionContext {
  name: SmartString,
  outputs: Vec<Type>,
  first_output: usize,
  named_results: bool,
}

#[derive(Debug, Default)]
struct LoopContext {
  breaks: Vec<Jump>,
  continues: Vec<Jump>,
}

/// A function declared at the top level, whose body is still to be compiled
enum Declared {
  Function { ty: Rc<FunctionType>, slot: Slot },
  Init,
}

impl<'l> Compiler<'l> {
  pub(crate) fn new(loader: &'l Loader, scope: Rc<Scope>) -> Self {
    Self {
      loader,
      scope,
      layout: Rc::new(FrameLayout::new(0)),

      chunk: Chunk::default(),
      prelude: Chunk::default(),

      function: None,
      loops: Vec::new(),
      literals: 0,

      defined: Vec::new(),
      inits: Vec::new(),
      package: false,
      errors: Vec::new(),
    }
  }

  /// Compiles a snippet of source code typed into the world
  pub(crate) fn compile_snippet(mut self, ast: &AST) -> Result<Code, Vec<CompileError>> {
    if let [Statement::Expression(statement)] = ast.root_statements.as_slice() {
      return match self.multi_value(statement.expression(ast), ast) {
        Ok(expr) => self.finish_expression(expr),
        Err(error) => {
          self.errors.push(error);
          Err(self.rollback())
        }
      };
    }

    let kind = if ast.root_statements.iter().all(Statement::is_declaration) {
      CodeKind::Declarations
    } else {
      CodeKind::Statements
    };

    self.declarations(&[ast]);
    self.finish(kind)
  }

  /// Compiles all the files of a package, giving the code for its declarations and a unit
  /// for each of its `init` functions
  pub(crate) fn compile_package(
    mut self,
    asts: &[AST],
  ) -> Result<(Code, Vec<Code>), Vec<CompileError>> {
    self.package = true;

    let asts = asts.iter().collect::<Vec<_>>();
    self.declarations(&asts);

    let inits = mem::take(&mut self.inits);
    let runtime = Rc::clone(&self.loader.runtime);
    let code = self.finish(CodeKind::Declarations)?;

    let inits = (inits.into_iter())
      .map(|init| {
        let span = init.span;
        let mut chunk = Chunk::single(Instruction::Closure(init), span);
        chunk.push(Instruction::Call { arguments: 0 }, span);
        Code::new(CodeKind::Statements, entry(&runtime, chunk, 0))
      })
      .collect();

    Ok((code, inits))
  }

  fn finish_expression(mut self, expr: Expr) -> Result<Code, Vec<CompileError>> {
    match expr.code {
      ExprCode::Constant(value) if self.errors.is_empty() => {
        let entry = entry(&self.loader.runtime, Chunk::default(), 0);
        Ok(Code::new(CodeKind::Constant(expr.ty, value), entry))
      }
      ExprCode::Constant(_) => Err(self.rollback()),
      ExprCode::Chunk(chunk) => {
        self.chunk.append(chunk);

        let kind = if expr.ty == Type::none() {
          CodeKind::Statements
        } else {
          CodeKind::Expression(expr.ty)
        };
        self.finish(kind)
      }
    }
  }

  fn finish(mut self, kind: CodeKind) -> Result<Code, Vec<CompileError>> {
    if !self.errors.is_empty() {
      return Err(self.rollback());
    }

    let mut chunk = mem::take(&mut self.prelude);
    chunk.append(mem::take(&mut self.chunk));

    let entry = entry(&self.loader.runtime, chunk, self.layout.size());
    Ok(Code::new(kind, entry))
  }

  /// Removes the global definitions made by the unit, returning its errors in source order
  fn rollback(&mut self) -> Vec<CompileError> {
    for (scope, name) in self.defined.drain(..).rev() {
      scope.undefine(&name);
    }

    let mut errors = mem::take(&mut self.errors);
    errors.sort_by_key(CompileError::span);
    errors
  }

  /// Compiles the top level statements of each file
  fn declarations(&mut self, asts: &[&AST]) {
    let statements = || {
      (asts.iter()).flat_map(|ast| (ast.root_statements.iter()).map(move |statement| (statement, *ast)))
    };

    for (statement, ast) in statements() {
      if let Statement::Import(import) = statement {
        self.import(import, ast);
      }
    }
    for (statement, ast) in statements() {
      if let Statement::Type(declaration) = statement {
        let result = declaration.compile(self, ast);
        self.report(result);
      }
    }

    let mut declared = Vec::new();
    for (statement, ast) in statements() {
      if let Statement::Function(function) = statement {
        match self.declare_function(function, ast) {
          Ok(function) => declared.push(Some(function)),
          Err(error) => {
            self.errors.push(error);
            declared.push(None);
          }
        }
      }
    }

    let mut declared = declared.into_iter();
    for (statement, ast) in statements() {
      match statement {
        Statement::Import(_) | Statement::Package(_) | Statement::Type(_) => {}
        Statement::Function(function) => {
          if let Some(Some(declared)) = declared.next() {
            let result = self.function_declaration(function, declared, ast);
            self.report(result);
          }
        }
        statement if self.package && !statement.is_declaration() => {
          self.errors.push(CompileError::NonDeclarationStatement {
            span: statement.span(ast),
          });
        }
        statement => {
          let result = statement.compile(self, ast);
          self.report(result);
        }
      }
    }
  }

  fn import(&mut self, import: &Import, ast: &AST) {
    for (path, span) in import.paths(ast) {
      let package = match self.loader.import(path, span) {
        Ok(package) => package,
        Err(errors) => {
          self.errors.extend(errors);
          continue;
        }
      };

      // importing the same package again is allowed
      if let Some(Definition::Package(existing)) = self.scope.lookup_local(&package.name)
        && Rc::ptr_eq(&existing, &package)
      {
        continue;
      }

      let name = package.name.clone();
      let result = self.insert(&name, Definition::Package(package), span);
      self.report(result);
    }
  }

  fn declare_function(
    &mut self,
    function: &FunctionDeclaration,
    ast: &AST,
  ) -> Result<Declared, CompileError> {
    let name = function.name(ast);
    let ty = Rc::new(self.signature(&function.signature, ast)?);

    if self.package && name == "init" {
      if !ty.inputs.is_empty() || !ty.outputs.is_empty() {
        return Err(CompileError::InvalidInit {
          span: function.name_span(ast),
        });
      }
      return Ok(Declared::Init);
    }

    let slot = self.define(name, Type::Function(Rc::clone(&ty)), true, function.name_span(ast))?;
    Ok(Declared::Function { ty, slot })
  }

  fn function_declaration(
    &mut self,
    function: &FunctionDeclaration,
    declared: Declared,
    ast: &AST,
  ) -> Result<(), CompileError> {
    let span = function.span(ast);

    match declared {
      Declared::Function { ty, slot } => {
        let prototype = self.function(function.name(ast), ty, &function.signature, &function.body, span, ast)?;
        let store = self.store(&slot);
        self.prelude.push(Instruction::Closure(prototype), span);
        self.prelude.push(store, span);
      }
      Declared::Init => {
        let ty = Rc::new(FunctionType::default());
        let prototype = self.function("init", ty, &function.signature, &function.body, span, ast)?;
        self.inits.push(prototype);
      }
    }

    Ok(())
  }

  /// Resolves the types of a signature
  fn signature(&mut self, signature: &Signature, ast: &AST) -> Result<FunctionType, CompileError> {
    let mut types = |parameters: &[Parameter]| {
      (parameters.iter())
        .map(|parameter| parameter.type_(ast).compile(self, ast))
        .collect::<Result<Vec<_>, _>>()
    };

    let inputs = types(signature.parameters())?;
    let outputs = types(signature.results())?;
    Ok(FunctionType { inputs, outputs })
  }

  fn report(&mut self, result: Result<(), CompileError>) {
    if let Err(error) = result {
      self.errors.push(error);
    }
  }

  /// Runs the closure in a new block scope
  fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
    let scope = Scope::local(Rc::clone(&self.scope), Rc::clone(&self.layout));
    let enclosing = mem::replace(&mut self.scope, scope);
    let result = f(self);
    self.scope = enclosing;
    result
  }

  fn define(
    &mut self,
    name: &str,
    ty: Type,
    readonly: bool,
    span: Span,
  ) -> Result<Slot, CompileError> {
    let slot = (self.scope)
      .define(name, ty, readonly, Some(span))
      .map_err(|error| redeclared(error, span))?;
    self.journal(name);
    Ok(slot)
  }

  fn define_const(
    &mut self,
    name: &str,
    ty: Type,
    value: Value,
    span: Span,
  ) -> Result<(), CompileError> {
    (self.scope)
      .define_const(name, ty, value, Some(span))
      .map_err(|error| redeclared(error, span))?;
    self.journal(name);
    Ok(())
  }

  fn insert(&mut self, name: &str, definition: Definition, span: Span) -> Result<(), CompileError> {
    (self.scope)
      .insert(name, definition, Some(span))
      .map_err(|error| redeclared(error, span))?;
    self.journal(name);
    Ok(())
  }

  fn journal(&mut self, name: &str) {
    if self.scope.is_global() {
      self.defined.push((Rc::clone(&self.scope), name.into()));
    }
  }

  fn load(&self, slot: &Slot) -> Instruction {
    match slot {
      Slot::Global { frame, index } => Instruction::LoadGlobal {
        frame: frame.clone(),
        slot: *index,
      },
      Slot::Local { level, index } => Instruction::Load {
        depth: self.layout.level() - level,
        slot: *index,
      },
    }
  }

  fn store(&self, slot: &Slot) -> Instruction {
    match slot {
      Slot::Global { frame, index } => Instruction::StoreGlobal {
        frame: frame.clone(),
        slot: *index,
      },
      Slot::Local { level, index } => Instruction::Store {
        depth: self.layout.level() - level,
        slot: *index,
      },
    }
  }
}

fn redeclared(error: RedefinitionError, span: Span) -> CompileError {
  CompileError::Redeclared {
    name: error.name,
    span,
    previous: error.previous,
  }
}

/// The prototype for the top level of a unit
pub(crate) fn entry(runtime: &Rc<Runtime>, chunk: Chunk, frame_size: usize) -> Rc<Prototype> {
  Rc::new(Prototype {
    name: SmartString::new(),
    ty: Rc::new(FunctionType::default()),
    level: 0,
    frame_size,
    zero_outputs: Vec::new(),
    chunk,
    span: Span::default(),
    runtime: Rc::clone(runtime),
  })
}

/// Converts part of the AST into something the compiler understands
trait Compile {
  type Output;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Self::Output, CompileError>;
}
