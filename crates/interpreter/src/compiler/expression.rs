use super::{Compile, Compiler, FunctionContext};
use crate::{
  bytecode::{Chunk, Instruction, Prototype},
  error::CompileError,
  package::Package,
  scope::{Definition, FrameLayout, Scope},
  types::{FunctionType, Type},
  universe::Builtin,
  value::{CoerceError, Value, parse_float, parse_integer},
};
use chicklet_syntax::{
  AST, Span,
  ast::{
    Expression,
    expression::{
      Binary, BinaryOperator, Call, Function, Group, Literal, LiteralKind, Selector,
      StringLiteral, Unary, UnaryOperator, Variable,
    },
    statement::Block,
    types::{self, Signature},
  },
};
use std::{mem, rc::Rc};

/// A typed expression, either folded to a constant or as instructions which push its values
#[derive(Debug)]
pub(crate) struct Expr {
  pub(crate) ty: Type,
  pub(crate) code: ExprCode,
  pub(crate) span: Span,
}

#[derive(Debug)]
pub(crate) enum ExprCode {
  Constant(Value),
  Chunk(Chunk),
}

impl Expr {
  pub(crate) fn constant(ty: Type, value: Value, span: Span) -> Self {
    Self {
      ty,
      code: ExprCode::Constant(value),
      span,
    }
  }

  pub(crate) fn chunk(ty: Type, chunk: Chunk, span: Span) -> Self {
    Self {
      ty,
      code: ExprCode::Chunk(chunk),
      span,
    }
  }

  pub(crate) fn as_constant(&self) -> Option<&Value> {
    match &self.code {
      ExprCode::Constant(value) => Some(value),
      ExprCode::Chunk(_) => None,
    }
  }

  fn retype(self, ty: Type) -> Self {
    Self { ty, ..self }
  }

  pub(crate) fn into_chunk(self) -> Chunk {
    match self.code {
      ExprCode::Constant(value) => Chunk::single(Instruction::Constant(value), self.span),
      ExprCode::Chunk(chunk) => chunk,
    }
  }
}

/// What an expression refers to, which is not always a value
#[derive(Debug)]
pub(crate) enum Operand {
  Value(Expr),
  Type(Type, Span),
  Package(Rc<Package>, Span),
  Builtin(Builtin, Span),
}
impl Operand {
  fn span(&self) -> Span {
    match self {
      Self::Value(expr) => expr.span,
      Self::Type(_, span) | Self::Package(_, span) | Self::Builtin(_, span) => *span,
    }
  }

  /// The operand as a value, which may have any number of results
  fn into_expr(self) -> Result<Expr, CompileError> {
    let kind = match self {
      Self::Value(expr) => return Ok(expr),
      Self::Type(..) => "type",
      Self::Package(..) => "package",
      Self::Builtin(..) => "builtin function",
    };

    Err(CompileError::NotAnExpression {
      kind,
      span: self.span(),
    })
  }
}

/// Where the values of a list of expressions are going, for error messages
#[derive(Clone, Copy, Debug)]
pub(crate) enum Count {
  Arguments,
  Assignment,
  Return,
}
impl Count {
  fn error(self, expected: usize, received: usize, span: Span) -> CompileError {
    match self {
      Self::Arguments => CompileError::ArgumentCount {
        expected,
        received,
        span,
      },
      Self::Assignment => CompileError::AssignmentCount {
        targets: expected,
        values: received,
        span,
      },
      Self::Return => CompileError::ReturnCount {
        expected,
        received,
        span,
      },
    }
  }
}

impl Compiler<'_> {
  /// Compiles an expression which can have any number of values, such as a call
  pub(crate) fn multi_value(
    &mut self,
    expression: &Expression,
    ast: &AST,
  ) -> Result<Expr, CompileError> {
    expression.compile(self, ast)?.into_expr()
  }

  /// Compiles an expression which must have exactly one value
  pub(crate) fn value(&mut self, expression: &Expression, ast: &AST) -> Result<Expr, CompileError> {
    let expr = self.multi_value(expression, ast)?;

    match expr.ty.as_slice().len() {
      1 => Ok(expr),
      0 => Err(CompileError::NoValue { span: expr.span }),
      _ => Err(CompileError::MultipleValues { span: expr.span }),
    }
  }

  /// Makes the value usable where the target type is expected
  pub(crate) fn coerce(&self, expr: Expr, target: &Type) -> Result<Expr, CompileError> {
    if &expr.ty == target {
      return Ok(expr);
    }

    let mismatch = |expr: &Expr| CompileError::TypeMismatch {
      expected: target.clone(),
      found: expr.ty.clone(),
      span: expr.span,
    };

    match (&expr.ty, expr.as_constant()) {
      (Type::IdealInt | Type::IdealFloat, Some(value)) if target.is_numeric() => {
        let value = value
          .coerce(target)
          .map_err(|error| constant_error(error, value, target, expr.span))?;
        Ok(Expr::constant(target.clone(), value, expr.span))
      }
      (Type::Nil, _) if target.as_function().is_some() => Ok(expr.retype(target.clone())),
      // boolean and string constants are untyped until they are used
      (Type::Bool | Type::String, Some(_)) if &expr.ty == target.underlying() => {
        Ok(expr.retype(target.clone()))
      }
      _ if identical_underlying(&expr.ty, target) => {
        Ok(expr.retype(target.clone()))
      }
      _ => Err(mismatch(&expr)),
    }
  }

  /// Gives an untyped constant its default type, when nothing else decides its type
  pub(crate) fn default(&self, expr: Expr) -> Result<Expr, CompileError> {
    match &expr.ty {
      Type::IdealInt | Type::IdealFloat => {
        let ty = expr.ty.default_type();
        self.coerce(expr, &ty)
      }
      Type::Nil => Err(CompileError::UntypedNil { span: expr.span }),
      _ => Ok(expr),
    }
  }

  /// Compiles a list of expressions for a list of targets, where a target type of `None`
  /// means the default type is used.
  ///
  /// A single call with multiple results can provide all the values.
  pub(crate) fn assigned_values(
    &mut self,
    values: &[&Expression],
    targets: &[Option<Type>],
    span: Span,
    count: Count,
    ast: &AST,
  ) -> Result<(Chunk, Vec<Type>), CompileError> {
    if let [value] = values
      && targets.len() != 1
    {
      let expr = self.multi_value(value, ast)?;
      let types = expr.ty.as_slice().to_vec();
      if types.len() != targets.len() {
        return Err(count.error(targets.len(), types.len(), span));
      }

      let mut result = Vec::with_capacity(types.len());
      for (ty, target) in types.into_iter().zip(targets) {
        match target {
          Some(target) if !ty.assignable_to(target) && !identical_underlying(&ty, target) => {
            return Err(CompileError::TypeMismatch {
              expected: target.clone(),
              found: ty,
              span: expr.span,
            });
          }
          Some(target) => result.push(target.clone()),
          None => result.push(ty),
        }
      }

      return Ok((expr.into_chunk(), result));
    }

    if values.len() != targets.len() {
      return Err(count.error(targets.len(), values.len(), span));
    }

    let mut chunk = Chunk::default();
    let mut types = Vec::with_capacity(values.len());
    for (value, target) in values.iter().zip(targets) {
      let expr = self.value(value, ast)?;
      let expr = match target {
        Some(target) => self.coerce(expr, target)?,
        None => self.default(expr)?,
      };

      types.push(expr.ty.clone());
      chunk.append(expr.into_chunk());
    }

    Ok((chunk, types))
  }

  /// Compiles a binary operation on two values which have already been compiled
  pub(crate) fn binary(
    &self,
    operator: BinaryOperator,
    left: Expr,
    right: Expr,
    span: Span,
  ) -> Result<Expr, CompileError> {
    if matches!(operator, BinaryOperator::And | BinaryOperator::Or) {
      return self.logical(operator, left, right, span);
    }

    let comparing_nil = left.ty == Type::Nil || right.ty == Type::Nil;
    let (left, right) = self.unify(left, right, span)?;
    let ty = left.ty.clone();

    let valid = match operator {
      BinaryOperator::Add => ty.is_numeric() || ty.is_string(),
      BinaryOperator::Subtract | BinaryOperator::Multiply | BinaryOperator::Divide => {
        ty.is_numeric()
      }
      BinaryOperator::Remainder => ty.is_integer(),
      BinaryOperator::Equal | BinaryOperator::NotEqual => {
        ty.as_function().is_none() || comparing_nil
      }
      BinaryOperator::Greater
      | BinaryOperator::GreaterEqual
      | BinaryOperator::Less
      | BinaryOperator::LessEqual => ty.is_ordered(),
      BinaryOperator::And | BinaryOperator::Or => ty.is_bool(),
    };
    if !valid || ty == Type::Nil {
      return Err(CompileError::InvalidOperation {
        operator: operator.to_string().into(),
        ty,
        span,
      });
    }

    if matches!(operator, BinaryOperator::Divide | BinaryOperator::Remainder)
      && right.as_constant().is_some_and(Value::is_zero_integer)
    {
      return Err(CompileError::ConstantDivisionByZero { span });
    }

    let result_ty = if operator.is_comparison() {
      Type::Bool
    } else {
      ty
    };

    if let (Some(a), Some(b)) = (left.as_constant(), right.as_constant()) {
      let value = a.binary(operator, b).map_err(|_| match operator {
        BinaryOperator::Divide | BinaryOperator::Remainder => {
          CompileError::ConstantDivisionByZero { span }
        }
        _ => CompileError::InvalidOperation {
          operator: operator.to_string().into(),
          ty: result_ty.clone(),
          span,
        },
      })?;
      return self.fold(result_ty, value, span);
    }

    let mut chunk = left.into_chunk();
    chunk.append(right.into_chunk());
    chunk.push(Instruction::Binary(operator), span);
    Ok(Expr::chunk(result_ty, chunk, span))
  }

  /// A folded constant, checked to still fit in its type
  fn fold(&self, ty: Type, value: Value, span: Span) -> Result<Expr, CompileError> {
    if let Value::Float(float) = value
      && !float.is_finite()
    {
      return Err(CompileError::ConstantOverflow {
        value: value.to_string(),
        ty,
        span,
      });
    }

    Ok(Expr::constant(ty, value, span))
  }

  fn logical(
    &self,
    operator: BinaryOperator,
    left: Expr,
    right: Expr,
    span: Span,
  ) -> Result<Expr, CompileError> {
    for expr in [&left, &right] {
      if !expr.ty.is_bool() {
        return Err(CompileError::InvalidOperation {
          operator: operator.to_string().into(),
          ty: expr.ty.clone(),
          span,
        });
      }
    }
    if left.ty != right.ty {
      return Err(CompileError::MismatchedTypes {
        left: left.ty,
        right: right.ty,
        span,
      });
    }

    let ty = left.ty.clone();
    if let (Some(a), Some(b)) = (left.as_constant(), right.as_constant())
      && let Ok(value) = a.binary(operator, b)
    {
      return Ok(Expr::constant(ty, value, span));
    }

    let jump: fn(usize) -> Instruction = match operator {
      BinaryOperator::And => Instruction::JumpIfFalseOrPop,
      _ => Instruction::JumpIfTrueOrPop,
    };

    let mut chunk = left.into_chunk();
    let short_circuit = chunk.add_jump(jump, span);
    chunk.append(right.into_chunk());
    chunk.patch_jump(short_circuit);

    Ok(Expr::chunk(ty, chunk, span))
  }

  /// Brings both sides of a binary operator to the same type
  fn unify(&self, left: Expr, right: Expr, span: Span) -> Result<(Expr, Expr), CompileError> {
    match (left.ty.is_ideal(), right.ty.is_ideal()) {
      _ if left.ty == right.ty => Ok((left, right)),
      (true, true) => {
        let left = self.coerce(left, &Type::IdealFloat)?;
        let right = self.coerce(right, &Type::IdealFloat)?;
        Ok((left, right))
      }
      (true, false) => {
        let ty = right.ty.clone();
        let left = self.coerce(left, &ty).map_err(|error| match error {
          CompileError::TypeMismatch { found, .. } => CompileError::MismatchedTypes {
            left: found,
            right: ty,
            span,
          },
          error => error,
        })?;
        Ok((left, right))
      }
      (false, true) => {
        let ty = left.ty.clone();
        let right = self.coerce(right, &ty).map_err(|error| match error {
          CompileError::TypeMismatch { found, .. } => CompileError::MismatchedTypes {
            left: ty,
            right: found,
            span,
          },
          error => error,
        })?;
        Ok((left, right))
      }
      (false, false) if left.ty == Type::Nil && right.ty.as_function().is_some() => {
        let ty = right.ty.clone();
        Ok((left.retype(ty), right))
      }
      (false, false) if right.ty == Type::Nil && left.ty.as_function().is_some() => {
        let ty = left.ty.clone();
        Ok((left, right.retype(ty)))
      }
      (false, false) => Err(CompileError::MismatchedTypes {
        left: left.ty,
        right: right.ty,
        span,
      }),
    }
  }

  fn definition(&self, definition: Definition, span: Span) -> Operand {
    match definition {
      Definition::Variable { ty, slot, .. } => {
        Operand::Value(Expr::chunk(ty, Chunk::single(self.load(&slot), span), span))
      }
      Definition::Constant { ty, value } => Operand::Value(Expr::constant(ty, value, span)),
      Definition::Type(ty) => Operand::Type(ty, span),
      Definition::Package(package) => Operand::Package(package, span),
      Definition::Builtin(builtin) => Operand::Builtin(builtin, span),
    }
  }

  /// Compiles the body of a function into a prototype
  pub(crate) fn function(
    &mut self,
    name: &str,
    ty: Rc<FunctionType>,
    signature: &Signature,
    body: &Block,
    span: Span,
    ast: &AST,
  ) -> Result<Rc<Prototype>, CompileError> {
    let level = self.scope.level().map_or(0, |level| level + 1);
    let layout = Rc::new(FrameLayout::new(level));
    let scope = Scope::local(Rc::clone(&self.scope), Rc::clone(&layout));

    let parameters = signature.parameters().iter().zip(&ty.inputs);
    let results = signature.results().iter().zip(&ty.outputs);
    for (parameter, ty) in parameters.chain(results) {
      match (parameter.name(ast), parameter.name_span(ast)) {
        (Some(name), Some(name_span)) if name != "_" => {
          (scope.define(name, ty.clone(), false, Some(name_span)))
            .map_err(|error| super::redeclared(error, name_span))?;
        }
        _ => {
          layout.allocate();
        }
      }
    }

    let context = FunctionContext {
      name: name.into(),
      outputs: ty.outputs.clone(),
      first_output: ty.inputs.len(),
      named_results: signature.results().iter().any(|result| result.name(ast).is_some()),
    };

    let enclosing_scope = mem::replace(&mut self.scope, scope);
    let enclosing_layout = mem::replace(&mut self.layout, layout);
    let enclosing_chunk = mem::take(&mut self.chunk);
    let enclosing_function = self.function.replace(context);
    let enclosing_loops = mem::take(&mut self.loops);

    for statement in body.statements(ast) {
      let result = statement.compile(self, ast);
      self.report(result);
    }
    if !ty.outputs.is_empty() && !super::statement::block_terminates(body, ast) {
      self.errors.push(CompileError::MissingReturn { span: body.span() });
    }
    self.chunk.push(Instruction::Return, body.span());

    let chunk = mem::replace(&mut self.chunk, enclosing_chunk);
    let frame_size = self.layout.size();
    self.scope = enclosing_scope;
    self.layout = enclosing_layout;
    self.function = enclosing_function;
    self.loops = enclosing_loops;

    let zero_outputs = ty.outputs.iter().filter_map(Type::zero).collect();

    Ok(Rc::new(Prototype {
      name: name.into(),
      ty,
      level,
      frame_size,
      zero_outputs,
      chunk,
      span,
      runtime: Rc::clone(&self.loader.runtime),
    }))
  }

  fn conversion(&mut self, ty: Type, call: &Call, ast: &AST) -> Result<Operand, CompileError> {
    let span = call.span(ast);
    let [argument] = call.arguments(ast).collect::<Vec<_>>()[..] else {
      return Err(CompileError::ArgumentCount {
        expected: 1,
        received: call.arguments(ast).len(),
        span,
      });
    };

    let expr = self.value(argument, ast)?;
    let invalid = |expr: &Expr| CompileError::InvalidConversion {
      from: expr.ty.clone(),
      to: ty.clone(),
      span,
    };

    let from = expr.ty.underlying();
    let to = ty.underlying();
    let convertible = from == to
      || (from.is_numeric() && to.is_numeric())
      || (from == &Type::Nil && to.as_function().is_some());
    if !convertible {
      return Err(invalid(&expr));
    }

    if let Some(value) = expr.as_constant() {
      let value = match value {
        Value::IdealInt(_) | Value::IdealFloat(_) => value
          .coerce(&ty)
          .map_err(|error| constant_error(error, value, &ty, span))?,
        _ => value.convert(&ty).map_err(|_| CompileError::ConstantOverflow {
          value: value.to_string(),
          ty: ty.clone(),
          span,
        })?,
      };
      return Ok(Operand::Value(Expr::constant(ty, value, span)));
    }

    if from == to {
      return Ok(Operand::Value(expr.retype(ty)));
    }

    let mut chunk = expr.into_chunk();
    chunk.push(Instruction::Convert(ty.clone()), span);
    Ok(Operand::Value(Expr::chunk(ty, chunk, span)))
  }

  fn builtin(&mut self, builtin: Builtin, call: &Call, ast: &AST) -> Result<Operand, CompileError> {
    let span = call.span(ast);
    let arguments = call.arguments(ast).collect::<Vec<_>>();

    let expect_one = || match arguments.len() {
      1 => Ok(()),
      received => Err(CompileError::ArgumentCount {
        expected: 1,
        received,
        span,
      }),
    };

    match builtin {
      Builtin::Len => {
        expect_one()?;
        let expr = self.value(arguments[0], ast)?;
        if !expr.ty.is_string() {
          return Err(CompileError::TypeMismatch {
            expected: Type::String,
            found: expr.ty,
            span: expr.span,
          });
        }

        if let Some(Value::String(string)) = expr.as_constant() {
          let length = i64::try_from(string.len()).unwrap_or(i64::MAX);
          return Ok(Operand::Value(Expr::constant(Type::Int, Value::Int(length), span)));
        }

        let mut chunk = expr.into_chunk();
        chunk.push(Instruction::Builtin(Builtin::Len, 1), span);
        Ok(Operand::Value(Expr::chunk(Type::Int, chunk, span)))
      }
      Builtin::Println | Builtin::Panic => {
        if builtin == Builtin::Panic {
          expect_one()?;
        }

        let mut chunk = Chunk::default();
        for argument in &arguments {
          let expr = self.value(argument, ast)?;
          chunk.append(self.default(expr)?.into_chunk());
        }
        chunk.push(Instruction::Builtin(builtin, arguments.len()), span);

        Ok(Operand::Value(Expr::chunk(Type::none(), chunk, span)))
      }
    }
  }

  fn literal_name(&mut self) -> String {
    self.literals += 1;
    match &self.function {
      Some(function) if !function.name.is_empty() => {
        format!("{}.func{}", function.name, self.literals)
      }
      _ => format!("func{}", self.literals),
    }
  }
}

/// Types which are the same once names are removed, where one of them has no name
fn identical_underlying(a: &Type, b: &Type) -> bool {
  let unnamed = |ty: &Type| matches!(ty, Type::Function(_));
  (unnamed(a) || unnamed(b)) && a.underlying() == b.underlying()
}

fn constant_error(error: CoerceError, value: &Value, ty: &Type, span: Span) -> CompileError {
  match error {
    CoerceError::Overflow => CompileError::ConstantOverflow {
      value: value.to_string(),
      ty: ty.clone(),
      span,
    },
    CoerceError::Truncated => CompileError::ConstantTruncated {
      value: value.to_string(),
      ty: ty.clone(),
      span,
    },
  }
}

impl Compile for Expression {
  type Output = Operand;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    match self {
      Self::Binary(binary) => binary.compile(compiler, ast),
      Self::Call(call) => call.compile(compiler, ast),
      Self::Function(function) => function.compile(compiler, ast),
      Self::Group(group) => group.compile(compiler, ast),
      Self::Literal(literal) => literal.compile(compiler, ast),
      Self::Selector(selector) => selector.compile(compiler, ast),
      Self::String(string) => string.compile(compiler, ast),
      Self::Unary(unary) => unary.compile(compiler, ast),
      Self::Variable(variable) => variable.compile(compiler, ast),
    }
  }
}

impl Compile for Binary {
  type Output = Operand;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    let left = compiler.value(self.left(ast), ast)?;
    let right = compiler.value(self.right(ast), ast)?;

    (compiler)
      .binary(self.operator(ast), left, right, self.span(ast))
      .map(Operand::Value)
  }
}

impl Compile for Call {
  type Output = Operand;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    let span = self.span(ast);

    let callee = match self.callee(ast).compile(compiler, ast)? {
      Operand::Type(ty, _) => return compiler.conversion(ty, self, ast),
      Operand::Builtin(builtin, _) => return compiler.builtin(builtin, self, ast),
      operand => operand.into_expr()?,
    };

    let Some(function) = callee.ty.as_function().cloned() else {
      return Err(CompileError::NotAFunction {
        ty: callee.ty,
        span: callee.span,
      });
    };

    let arguments = self.arguments(ast).collect::<Vec<_>>();
    let targets = function.inputs.iter().cloned().map(Some).collect::<Vec<_>>();
    let (arguments, _) =
      compiler.assigned_values(&arguments, &targets, span, Count::Arguments, ast)?;

    let mut chunk = callee.into_chunk();
    chunk.append(arguments);
    chunk.push(
      Instruction::Call {
        arguments: function.inputs.len(),
      },
      span,
    );

    Ok(Operand::Value(Expr::chunk(function.result(), chunk, span)))
  }
}

impl Compile for Function {
  type Output = Operand;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    let span = self.span(ast);
    let ty = Rc::new(compiler.signature(&self.signature, ast)?);

    let name = compiler.literal_name();
    let prototype = compiler.function(&name, Rc::clone(&ty), &self.signature, &self.body, span, ast)?;

    let chunk = Chunk::single(Instruction::Closure(prototype), span);
    Ok(Operand::Value(Expr::chunk(Type::Function(ty), chunk, span)))
  }
}

impl Compile for Group {
  type Output = Operand;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    match self.expression(ast).compile(compiler, ast)? {
      Operand::Value(expr) => Ok(Operand::Value(Expr {
        span: self.span(ast),
        ..expr
      })),
      operand => Ok(operand),
    }
  }
}

impl Compile for Literal {
  type Output = Operand;

  fn compile(&self, _: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    let span = self.span(ast);
    let text = self.text(ast);

    let constant = match self.kind(ast) {
      LiteralKind::Integer => parse_integer(&text).map(|value| (Type::IdealInt, Value::IdealInt(value))),
      LiteralKind::Float => parse_float(&text).map(|value| (Type::IdealFloat, Value::IdealFloat(value))),
    };

    match constant {
      Some((ty, value)) => Ok(Operand::Value(Expr::constant(ty, value, span))),
      None => Err(CompileError::ConstantOverflow {
        value: text,
        ty: Type::IdealFloat,
        span,
      }),
    }
  }
}

impl Compile for Selector {
  type Output = Operand;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    let span = self.span(ast);
    let member = self.member(ast);

    match self.expression(ast).compile(compiler, ast)? {
      Operand::Package(package, _) => match package.scope.lookup_local(member) {
        Some(definition) => Ok(compiler.definition(definition, span)),
        None => Err(CompileError::UnknownMember {
          package: package.name.clone(),
          member: member.into(),
          span,
        }),
      },
      Operand::Value(expr) => Err(CompileError::InvalidOperation {
        operator: ".".into(),
        ty: expr.ty,
        span,
      }),
      operand => operand.into_expr().map(Operand::Value),
    }
  }
}

impl Compile for StringLiteral {
  type Output = Operand;

  fn compile(&self, _: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    let value = Value::String(Rc::from(self.value()));
    Ok(Operand::Value(Expr::constant(Type::String, value, self.span(ast))))
  }
}

impl Compile for Unary {
  type Output = Operand;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    let span = self.span(ast);
    let operator = self.operator(ast);
    let expr = compiler.value(self.expression(ast), ast)?;

    let valid = match operator {
      UnaryOperator::Not => expr.ty.is_bool(),
      UnaryOperator::Minus | UnaryOperator::Plus => expr.ty.is_numeric(),
    };
    if !valid {
      return Err(CompileError::InvalidOperation {
        operator: operator.to_string().into(),
        ty: expr.ty,
        span,
      });
    }

    if let Some(value) = expr.as_constant()
      && let Ok(value) = value.unary(operator)
    {
      return compiler.fold(expr.ty, value, span).map(Operand::Value);
    }

    let ty = expr.ty.clone();
    let mut chunk = expr.into_chunk();
    chunk.push(Instruction::Unary(operator), span);
    Ok(Operand::Value(Expr::chunk(ty, chunk, span)))
  }
}

impl Compile for Variable {
  type Output = Operand;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Operand, CompileError> {
    let name = self.name(ast);
    let span = self.span(ast);

    match compiler.scope.lookup(name) {
      Some(definition) if name != "_" => Ok(compiler.definition(definition, span)),
      _ => Err(CompileError::Undefined {
        name: name.into(),
        span,
      }),
    }
  }
}

impl Compile for types::Type {
  type Output = Type;

  fn compile(&self, compiler: &mut Compiler<'_>, ast: &AST) -> Result<Type, CompileError> {
    match self {
      Self::Named(named) => {
        let name = named.name(ast);
        match compiler.scope.lookup(name) {
          Some(Definition::Type(ty)) => Ok(ty),
          Some(_) => Err(CompileError::NotAType {
            name: name.into(),
            span: named.span(ast),
          }),
          None => Err(CompileError::Undefined {
            name: name.into(),
            span: named.span(ast),
          }),
        }
      }
      Self::Qualified(qualified) => {
        let span = qualified.span(ast);
        let package_name = qualified.package(ast);
        let name = qualified.name(ast);

        let Some(Definition::Package(package)) = compiler.scope.lookup(package_name) else {
          return Err(CompileError::Undefined {
            name: package_name.into(),
            span,
          });
        };

        match package.scope.lookup_local(name) {
          Some(Definition::Type(ty)) => Ok(ty),
          Some(_) => Err(CompileError::NotAType {
            name: name.into(),
            span,
          }),
          None => Err(CompileError::UnknownMember {
            package: package.name.clone(),
            member: name.into(),
            span,
          }),
        }
      }
      Self::Function(function) => {
        let ty = compiler.signature(&function.signature, ast)?;
        Ok(Type::Function(Rc::new(ty)))
      }
      Self::Group(group) => group.type_(ast).compile(compiler, ast),
    }
  }
}
