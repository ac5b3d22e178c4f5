use super::{
  Compile, Compiler, LoopContext,
  expression::{Count, Expr, ExprCode},
};
use crate::{
  bytecode::{Chunk, Instruction},
  error::CompileError,
  scope::{Definition, Slot},
  types::{NamedType, Type},
  value::Value,
};
use chicklet_syntax::{
  AST, Span,
  ast::{
    Expression, Statement,
    expression::{BinaryOperator, Call, Variable},
    statement::{
      Assignment, AssignmentOperator, Block, Branch, ExpressionStmt, For, If, IncrementDecrement,
      Return, TypeDeclaration, ValueDeclaration,
    },
  },
};
use num_bigint::BigInt;
use std::rc::Rc;

/// Where an assigned value is stored
enum Target {
  Discard,
  Variable { ty: Type, slot: Slot },
}

impl Compiler<'_> {
  /// Compiles each statement of a block in a new scope
  pub(super) fn block(&mut self, block: &Block, ast: &AST) {
    self.scoped(|compiler| {
      for statement in block.statements(ast) {
        let result = statement.compile(compiler, ast);
        compiler.report(result);
      }
    });
  }

  fn target(&mut self, expression: &Expression, ast: &AST) -> Result<Target, CompileError> {
    let span = expression.span(ast);
    let invalid = CompileError::InvalidAssignment { span };

    let definition = match expression {
      Expression::Variable(variable) if variable.name(ast) == "_" => return Ok(Target::Discard),
      Expression::Variable(variable) => {
        let name = variable.name(ast);
        self.scope.lookup(name).ok_or_else(|| CompileError::Undefined {
          name: name.into(),
          span,
        })?
      }
      Expression::Selector(selector) => {
        let Some(Definition::Package(package)) = as_variable(selector.expression(ast))
          .and_then(|variable| self.scope.lookup(variable.name(ast)))
        else {
          return Err(invalid);
        };

        let member = selector.member(ast);
        package.scope.lookup_local(member).ok_or_else(|| CompileError::UnknownMember {
          package: package.name.clone(),
          member: member.into(),
          span,
        })?
      }
      Expression::Group(group) => return self.target(group.expression(ast), ast),
      _ => return Err(invalid),
    };

    match definition {
      Definition::Variable {
        ty,
        slot,
        readonly: false,
      } => Ok(Target::Variable { ty, slot }),
      _ => Err(invalid),
    }
  }

  fn store_targets(&mut self, targets: &[Target], span: Span) {
    for target in targets.iter().rev() {
      let instruction = match target {
        Target::Discard => Instruction::Pop,
        Target::Variable { slot, .. } => self.store(slot),
      };
      self.chunk.push(instruction, span);
    }
  }

  fn assign(&mut self, assignment: &Assignment, ast: &AST) -> Result<(), CompileError> {
    let span = assignment.span(ast);

    let targets = (assignment.targets(ast))
      .map(|target| self.target(target, ast))
      .collect::<Result<Vec<_>, _>>()?;
    let types = (targets.iter())
      .map(|target| match target {
        Target::Discard => None,
        Target::Variable { ty, .. } => Some(ty.clone()),
      })
      .collect::<Vec<_>>();

    let values = assignment.values(ast).collect::<Vec<_>>();
    let (chunk, _) = self.assigned_values(&values, &types, span, Count::Assignment, ast)?;

    self.chunk.append(chunk);
    self.store_targets(&targets, span);
    Ok(())
  }

  /// A short variable declaration, `a, b := 1, 2`
  fn define_variables(&mut self, assignment: &Assignment, ast: &AST) -> Result<(), CompileError> {
    let span = assignment.span(ast);

    let mut names = Vec::with_capacity(assignment.targets(ast).len());
    let mut types = Vec::with_capacity(names.capacity());
    for target in assignment.targets(ast) {
      let Some(variable) = as_variable(target) else {
        return Err(CompileError::InvalidAssignment {
          span: target.span(ast),
        });
      };

      let name = variable.name(ast);
      let existing = match self.scope.lookup_local(name) {
        Some(Definition::Variable {
          ty,
          slot,
          readonly: false,
        }) if name != "_" => Some((ty, slot)),
        _ => None,
      };

      types.push(existing.as_ref().map(|(ty, _)| ty.clone()));
      names.push((name, variable.span(ast), existing));
    }

    let values = assignment.values(ast).collect::<Vec<_>>();
    let (chunk, types) = self.assigned_values(&values, &types, span, Count::Assignment, ast)?;

    let mut new_variables = 0;
    let mut targets = Vec::with_capacity(names.len());
    for ((name, name_span, existing), ty) in names.into_iter().zip(types) {
      let target = match existing {
        _ if name == "_" => Target::Discard,
        Some((ty, slot)) => Target::Variable { ty, slot },
        None => {
          new_variables += 1;
          let slot = self.define(name, ty.clone(), false, name_span)?;
          Target::Variable { ty, slot }
        }
      };
      targets.push(target);
    }

    if new_variables == 0 {
      return Err(CompileError::NoNewVariables {
        span: assignment.operator_span(ast),
      });
    }

    self.chunk.append(chunk);
    self.store_targets(&targets, span);
    Ok(())
  }

  /// Applies an operator to a variable, for `x += 1` and `x++`
  fn update(
    &mut self,
    target: &Expression,
    operator: BinaryOperator,
    value: &Expression,
    span: Span,
    ast: &AST,
  ) -> Result<(), CompileError> {
    let right = self.value(value, ast)?;
    self.update_with(target, operator, right, span, ast)
  }

  fn update_with(
    &mut self,
    target: &Expression,
    operator: BinaryOperator,
    right: Expr,
    span: Span,
    ast: &AST,
  ) -> Result<(), CompileError> {
    let Target::Variable { ty, slot } = self.target(target, ast)? else {
      return Err(CompileError::InvalidAssignment {
        span: target.span(ast),
      });
    };

    let left = Expr::chunk(ty.clone(), Chunk::single(self.load(&slot), span), span);
    let result = self.binary(operator, left, right, span)?;
    let result = self.coerce(result, &ty)?;

    self.chunk.append(result.into_chunk());
    let store = self.store(&slot);
    self.chunk.push(store, span);
    Ok(())
  }
}

/// Does the block always end by leaving the function?
pub(super) fn block_terminates(block: &Block, ast: &AST) -> bool {
  block
    .statements(ast)
    .last()
    .is_some_and(|statement| terminates(statement, ast))
}

fn terminates(statement: &Statement, ast: &AST) -> bool {
  match statement {
    Statement::Return(_) => true,
    Statement::Block(block) => block_terminates(block, ast),
    Statement::If(if_) => {
      block_terminates(&if_.then, ast)
        && if_.otherwise(ast).is_some_and(|otherwise| terminates(otherwise, ast))
    }
    Statement::For(for_) => for_.condition(ast).is_none() && !has_break(&for_.body, ast),
    Statement::Expression(statement) => matches!(
      statement.expression(ast),
      Expression::Call(call) if is_panic(call, ast)
    ),
    _ => false,
  }
}

/// Is there a `break` for this loop, ignoring any in nested loops?
fn has_break(block: &Block, ast: &AST) -> bool {
  block.statements(ast).any(|statement| breaks(statement, ast))
}

fn breaks(statement: &Statement, ast: &AST) -> bool {
  match statement {
    Statement::Break(_) => true,
    Statement::Block(block) => has_break(block, ast),
    Statement::If(if_) => {
      has_break(&if_.then, ast) || if_.otherwise(ast).is_some_and(|otherwise| breaks(otherwise, ast))
    }
    _ => false,
  }
}

fn as_variable(expression: &Expression) -> Option<&Variable> {
  match expression {
    Expression::Variable(variable) => Some(variable),
    _ => None,
  }
}

fn is_panic(call: &Call, ast: &AST) -> bool {
  matches!(call.callee(ast), Expression::Variable(variable) if variable.name(ast) == "panic")
}

impl Compile for Statement {
  type Output = ();

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<(), CompileError> {
    match self {
      Self::Assignment(assignment) => assignment.compile(compiler, ast),
      Self::Block(block) => {
        compiler.block(block, ast);
        Ok(())
      }
      Self::Break(branch) => compile_branch(compiler, branch, true, ast),
      Self::Const(declaration) => compile_const(compiler, declaration, ast),
      Self::Continue(branch) => compile_branch(compiler, branch, false, ast),
      Self::Expression(statement) => statement.compile(compiler, ast),
      Self::For(for_) => for_.compile(compiler, ast),
      Self::If(if_) => if_.compile(compiler, ast),
      Self::IncrementDecrement(statement) => statement.compile(compiler, ast),
      Self::Return(return_) => return_.compile(compiler, ast),
      Self::Type(declaration) => declaration.compile(compiler, ast),
      Self::Var(declaration) => compile_var(compiler, declaration, ast),
      // only allowed at the top level, where they are compiled separately
      Self::Function(_) | Self::Import(_) | Self::Package(_) => Ok(()),
    }
  }
}

impl Compile for Assignment {
  type Output = ();

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<(), CompileError> {
    match self.operator(ast) {
      AssignmentOperator::Define => compiler.define_variables(self, ast),
      AssignmentOperator::Assign => compiler.assign(self, ast),
      AssignmentOperator::Compound(operator) => {
        let span = self.span(ast);
        let (targets, values) = (self.targets(ast), self.values(ast));
        if targets.len() != 1 || values.len() != 1 {
          return Err(CompileError::AssignmentCount {
            targets: targets.len(),
            values: values.len(),
            span,
          });
        }

        let target = self.targets(ast).next();
        let value = self.values(ast).next();
        match (target, value) {
          (Some(target), Some(value)) => compiler.update(target, operator, value, span, ast),
          _ => Ok(()),
        }
      }
    }
  }
}

fn compile_branch(
  compiler: &mut Compiler<'_>,
  branch: &Branch,
  is_break: bool,
  ast: &AST,
) -> Result<(), CompileError> {
  let span = branch.span(ast);
  if compiler.loops.is_empty() {
    return Err(CompileError::BranchOutsideLoop {
      keyword: if is_break { "break" } else { "continue" },
      span,
    });
  }

  let jump = compiler.chunk.add_jump(Instruction::Jump, span);
  if let Some(context) = compiler.loops.last_mut() {
    if is_break {
      context.breaks.push(jump);
    } else {
      context.continues.push(jump);
    }
  }

  Ok(())
}

fn compile_const(
  compiler: &mut Compiler<'_>,
  declaration: &ValueDeclaration,
  ast: &AST,
) -> Result<(), CompileError> {
  let span = declaration.span(ast);
  let declared = (declaration.type_(ast))
    .map(|ty| ty.compile(compiler, ast))
    .transpose()?;

  let names = declaration.names(ast).collect::<Vec<_>>();
  let values = declaration.values(ast).collect::<Vec<_>>();
  if names.len() != values.len() {
    return Err(CompileError::AssignmentCount {
      targets: names.len(),
      values: values.len(),
      span,
    });
  }

  for ((name, name_span), value) in names.into_iter().zip(values) {
    let expr = compiler.value(value, ast)?;
    let expr = match &declared {
      Some(ty) => compiler.coerce(expr, ty)?,
      None => expr,
    };

    let constant = match expr.as_constant() {
      Some(constant) if expr.ty != Type::Nil => constant.clone(),
      _ => {
        return Err(CompileError::NotConstant {
          name: name.into(),
          span: expr.span,
        });
      }
    };

    if name != "_" {
      compiler.define_const(name, expr.ty, constant, name_span)?;
    }
  }

  Ok(())
}

fn compile_var(
  compiler: &mut Compiler<'_>,
  declaration: &ValueDeclaration,
  ast: &AST,
) -> Result<(), CompileError> {
  let span = declaration.span(ast);
  let declared = (declaration.type_(ast))
    .map(|ty| ty.compile(compiler, ast))
    .transpose()?;

  let names = declaration.names(ast).collect::<Vec<_>>();
  let values = declaration.values(ast).collect::<Vec<_>>();

  let types = if values.is_empty() {
    let Some(ty) = declared else {
      return Err(CompileError::NoValue { span });
    };
    let Some(zero) = ty.zero() else {
      return Err(CompileError::NoValue { span });
    };

    for _ in &names {
      compiler.chunk.push(Instruction::Constant(zero.clone()), span);
    }
    vec![ty; names.len()]
  } else {
    let targets = vec![declared; names.len()];
    let (chunk, types) =
      compiler.assigned_values(&values, &targets, span, Count::Assignment, ast)?;
    compiler.chunk.append(chunk);
    types
  };

  let mut targets = Vec::with_capacity(names.len());
  for ((name, name_span), ty) in names.into_iter().zip(types) {
    if name == "_" {
      targets.push(Target::Discard);
    } else {
      let slot = compiler.define(name, ty.clone(), false, name_span)?;
      targets.push(Target::Variable { ty, slot });
    }
  }

  compiler.store_targets(&targets, span);
  Ok(())
}

impl Compile for ExpressionStmt {
  type Output = ();

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<(), CompileError> {
    let expr = compiler.multi_value(self.expression(ast), ast)?;
    let span = expr.span;
    let results = expr.ty.as_slice().len();

    if let ExprCode::Chunk(chunk) = expr.code {
      compiler.chunk.append(chunk);
      for _ in 0..results {
        compiler.chunk.push(Instruction::Pop, span);
      }
    }

    Ok(())
  }
}

impl Compile for For {
  type Output = ();

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<(), CompileError> {
    let span = self.span(ast);

    compiler.scoped(|compiler| {
      if let Some(initialiser) = self.initialiser(ast) {
        initialiser.compile(compiler, ast)?;
      }

      let start = compiler.chunk.len();
      let exit = match self.condition(ast) {
        Some(condition) => {
          let condition = compiler.value(condition, ast)?;
          check_condition(&condition)?;
          compiler.chunk.append(condition.into_chunk());
          Some(compiler.chunk.add_jump(Instruction::JumpIfFalse, span))
        }
        None => None,
      };

      compiler.loops.push(LoopContext::default());
      compiler.block(&self.body, ast);
      let context = compiler.loops.pop().unwrap_or_default();

      for jump in context.continues {
        compiler.chunk.patch_jump(jump);
      }
      if let Some(post) = self.post(ast) {
        let result = post.compile(compiler, ast);
        compiler.report(result);
      }
      compiler.chunk.add_loop(start, span);

      if let Some(exit) = exit {
        compiler.chunk.patch_jump(exit);
      }
      for jump in context.breaks {
        compiler.chunk.patch_jump(jump);
      }

      Ok(())
    })
  }
}

fn check_condition(condition: &Expr) -> Result<(), CompileError> {
  if condition.ty.is_bool() {
    Ok(())
  } else {
    Err(CompileError::TypeMismatch {
      expected: Type::Bool,
      found: condition.ty.clone(),
      span: condition.span,
    })
  }
}

impl Compile for If {
  type Output = ();

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<(), CompileError> {
    let span = self.span(ast);

    compiler.scoped(|compiler| {
      if let Some(initialiser) = self.initialiser(ast) {
        initialiser.compile(compiler, ast)?;
      }

      let condition = compiler.value(self.condition(ast), ast)?;
      check_condition(&condition)?;
      compiler.chunk.append(condition.into_chunk());

      let otherwise_jump = compiler.chunk.add_jump(Instruction::JumpIfFalse, span);
      compiler.block(&self.then, ast);

      match self.otherwise(ast) {
        Some(otherwise) => {
          let end_jump = compiler.chunk.add_jump(Instruction::Jump, span);
          compiler.chunk.patch_jump(otherwise_jump);
          let result = otherwise.compile(compiler, ast);
          compiler.report(result);
          compiler.chunk.patch_jump(end_jump);
        }
        None => compiler.chunk.patch_jump(otherwise_jump),
      }

      Ok(())
    })
  }
}

impl Compile for IncrementDecrement {
  type Output = ();

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<(), CompileError> {
    let span = self.span(ast);
    let operator = if self.is_increment(ast) {
      BinaryOperator::Add
    } else {
      BinaryOperator::Subtract
    };

    let one = Expr::constant(Type::IdealInt, Value::IdealInt(BigInt::from(1)), span);
    compiler.update_with(self.target(ast), operator, one, span, ast)
  }
}

impl Compile for Return {
  type Output = ();

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<(), CompileError> {
    let span = self.span(ast);
    let Some(function) = &compiler.function else {
      // the parser rejects a return outside of a function
      return Ok(());
    };
    let outputs = function.outputs.clone();
    let first_output = function.first_output;
    let named_results = function.named_results;

    let values = self.values(ast).collect::<Vec<_>>();
    if values.is_empty() {
      if !outputs.is_empty() && !named_results {
        return Err(CompileError::ReturnCount {
          expected: outputs.len(),
          received: 0,
          span,
        });
      }
      compiler.chunk.push(Instruction::Return, span);
      return Ok(());
    }

    let targets = outputs.into_iter().map(Some).collect::<Vec<_>>();
    let (chunk, _) = compiler.assigned_values(&values, &targets, span, Count::Return, ast)?;
    compiler.chunk.append(chunk);

    for index in (0..targets.len()).rev() {
      let store = Instruction::Store {
        depth: 0,
        slot: first_output + index,
      };
      compiler.chunk.push(store, span);
    }
    compiler.chunk.push(Instruction::Return, span);

    Ok(())
  }
}

impl Compile for TypeDeclaration {
  type Output = ();

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<(), CompileError> {
    let underlying = self.type_(ast).compile(compiler, ast)?;
    let ty = Type::Named(Rc::new(NamedType {
      name: self.name(ast).into(),
      underlying: underlying.underlying().clone(),
    }));

    compiler.insert(self.name(ast), Definition::Type(ty), self.name_span(ast))
  }
}
