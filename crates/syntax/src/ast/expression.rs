//! # Expressions

use crate::{
  ast::statement::Block,
  ast::types::Signature,
  ast::{AST, ExpressionIdx, TokenIdx},
  span::Span,
  tokeniser::TokenKind,
};
use std::fmt;
use thin_vec::ThinVec;

/// An expression, which can be evaluated to a value
#[must_use]
#[derive(Debug)]
pub enum Expression {
  /// A binary expression, e.g. `1 + 2`, `a && b`
  Binary(Binary),
  /// A function call or conversion, e.g. `foo(1, 2)`, `float64(x)`
  Call(Call),
  /// A function literal, e.g. `func(x int) int { return x + 1 }`
  Function(Function),
  /// An expression in parentheses, e.g. `(1 + 2)`
  Group(Group),
  /// A numeric literal, e.g. `1`, `0xff`, `2.5e3`
  Literal(Literal),
  /// Accessing a member of a package, e.g. `maths.Sqrt`
  Selector(Selector),
  /// A string literal, e.g. `"hello\n"`, `` `raw` ``
  String(StringLiteral),
  /// A unary expression, e.g. `!true`, `-1`
  Unary(Unary),
  /// A variable, e.g. `x`
  Variable(Variable),
}
impl Expression {
  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    match self {
      Self::Binary(binary) => binary.span(ast),
      Self::Call(call) => call.span(ast),
      Self::Function(function) => function.span(ast),
      Self::Group(group) => group.span(ast),
      Self::Literal(literal) => literal.span(ast),
      Self::Selector(selector) => selector.span(ast),
      Self::String(string) => string.span(ast),
      Self::Unary(unary) => unary.span(ast),
      Self::Variable(variable) => variable.span(ast),
    }
  }
}

/// A binary expression, e.g. `1 + 2`, `a && b`
#[derive(Debug)]
pub struct Binary {
  pub(crate) left: ExpressionIdx,
  pub(crate) operator: TokenIdx,
  pub(crate) right: ExpressionIdx,
}
impl Binary {
  /// The left hand side of the operation
  pub fn left<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.left]
  }
  /// The right hand side of the operation
  pub fn right<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.right]
  }

  /// The operator of the operation
  pub fn operator(&self, ast: &AST) -> BinaryOperator {
    match ast[self.operator].kind {
      TokenKind::Plus => BinaryOperator::Add,
      TokenKind::Minus => BinaryOperator::Subtract,
      TokenKind::Star => BinaryOperator::Multiply,
      TokenKind::Slash => BinaryOperator::Divide,
      TokenKind::Percent => BinaryOperator::Remainder,
      TokenKind::BangEqual => BinaryOperator::NotEqual,
      TokenKind::EqualEqual => BinaryOperator::Equal,
      TokenKind::Greater => BinaryOperator::Greater,
      TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
      TokenKind::Less => BinaryOperator::Less,
      TokenKind::LessEqual => BinaryOperator::LessEqual,
      TokenKind::And => BinaryOperator::And,
      _ => BinaryOperator::Or,
    }
  }

  /// The location of the operator
  pub fn operator_span(&self, ast: &AST) -> Span {
    Span::from(ast[self.operator])
  }

  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    self.left(ast).span(ast).merge(self.right(ast).span(ast))
  }
}

/// The operator of a [`Binary`] expression
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
  /// Addition (`+`)
  Add,
  /// Subtraction (`-`)
  Subtract,
  /// Multiplication (`*`)
  Multiply,
  /// Division (`/`)
  Divide,
  /// Remainder (`%`)
  Remainder,
  /// Equality (`==`)
  Equal,
  /// Inequality (`!=`)
  NotEqual,
  /// Greater Than (`>`)
  Greater,
  /// Greater Than or Equal (`>=`)
  GreaterEqual,
  /// Less Than (`<`)
  Less,
  /// Less Than or Equal (`<=`)
  LessEqual,
  /// Logical And (`&&`)
  And,
  /// Logical Or (`||`)
  Or,
}
impl BinaryOperator {
  /// Does the operator compare its operands, producing a boolean?
  #[must_use]
  pub fn is_comparison(self) -> bool {
    matches!(
      self,
      Self::Equal | Self::NotEqual | Self::Greater | Self::GreaterEqual | Self::Less | Self::LessEqual
    )
  }
}
impl fmt::Display for BinaryOperator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Add => write!(f, "+"),
      Self::Subtract => write!(f, "-"),
      Self::Multiply => write!(f, "*"),
      Self::Divide => write!(f, "/"),
      Self::Remainder => write!(f, "%"),
      Self::Equal => write!(f, "=="),
      Self::NotEqual => write!(f, "!="),
      Self::Greater => write!(f, ">"),
      Self::GreaterEqual => write!(f, ">="),
      Self::Less => write!(f, "<"),
      Self::LessEqual => write!(f, "<="),
      Self::And => write!(f, "&&"),
      Self::Or => write!(f, "||"),
    }
  }
}

/// A function call, e.g. `foo(1, 2)`
#[derive(Debug)]
pub struct Call {
  pub(crate) callee: ExpressionIdx,
  pub(crate) arguments: ThinVec<ExpressionIdx>,
  pub(crate) closing: Option<TokenIdx>,
}
impl Call {
  /// The expression being called
  pub fn callee<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.callee]
  }

  /// The arguments passed to the function
  pub fn arguments<'a>(&self, ast: &'a AST) -> impl ExactSizeIterator<Item = &'a Expression> {
    self.arguments.iter().map(|argument| &ast[*argument])
  }

  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    let callee = self.callee(ast).span(ast);

    match self.closing {
      Some(closing) => callee.merge(ast[closing].into()),
      None => self
        .arguments(ast)
        .fold(callee, |span, argument| span.merge(argument.span(ast))),
    }
  }
}

/// A function literal, e.g. `func(x int) int { return x + 1 }`
#[derive(Debug)]
pub struct Function {
  pub(crate) keyword: TokenIdx,
  /// The parameters and results of the function
  pub signature: Signature,
  /// The body of the function
  pub body: Block,
}
impl Function {
  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.keyword]).merge(self.body.span())
  }
}

/// An expression in parentheses, e.g. `(1 + 2)`
#[derive(Debug)]
pub struct Group {
  pub(crate) opening: TokenIdx,
  pub(crate) expression: ExpressionIdx,
  pub(crate) closing: Option<TokenIdx>,
}
impl Group {
  /// The expression inside the parentheses
  pub fn expression<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.expression]
  }

  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    let opening = Span::from(ast[self.opening]);

    match self.closing {
      Some(closing) => opening.merge(ast[closing].into()),
      None => opening.merge(self.expression(ast).span(ast)),
    }
  }
}

/// A numeric literal, e.g. `1`, `0xff`, `2.5e3`
#[derive(Debug)]
pub struct Literal {
  pub(crate) token: TokenIdx,
}
impl Literal {
  /// The kind of number the literal is
  pub fn kind(&self, ast: &AST) -> LiteralKind {
    match ast[self.token].kind {
      TokenKind::Float => LiteralKind::Float,
      _ => LiteralKind::Integer,
    }
  }

  /// The source text of the literal, with any `_` separators removed
  #[must_use]
  pub fn text(&self, ast: &AST) -> String {
    ast
      .get_token_text(self.token)
      .chars()
      .filter(|c| *c != '_')
      .collect()
  }

  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.token])
  }
}

/// The kind of a numeric [`Literal`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LiteralKind {
  /// A whole number, e.g. `42`, `0x2a`
  Integer,
  /// A number with a fractional part or exponent, e.g. `4.2`, `1e9`
  Float,
}

/// Accessing a member of a package, e.g. `maths.Sqrt`
#[derive(Debug)]
pub struct Selector {
  pub(crate) expression: ExpressionIdx,
  pub(crate) member: TokenIdx,
}
impl Selector {
  /// The expression the member is selected from
  pub fn expression<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.expression]
  }

  /// The name of the member
  #[must_use]
  pub fn member<'a>(&self, ast: &'a AST) -> &'a str {
    ast.get_token_text(self.member)
  }

  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    self.expression(ast).span(ast).merge(ast[self.member].into())
  }
}

/// A string literal, e.g. `"hello\n"`, `` `raw` ``
#[derive(Debug)]
pub struct StringLiteral {
  pub(crate) token: TokenIdx,
  pub(crate) value: String,
}
impl StringLiteral {
  /// The value of the string, with escape sequences resolved
  #[must_use]
  pub fn value(&self) -> &str {
    &self.value
  }

  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.token])
  }
}

/// A unary expression, e.g. `!true`, `-1`
#[derive(Debug)]
pub struct Unary {
  pub(crate) operator: TokenIdx,
  pub(crate) expression: ExpressionIdx,
}
impl Unary {
  /// The expression the operator is applied to
  pub fn expression<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.expression]
  }

  /// The operator of the operation
  pub fn operator(&self, ast: &AST) -> UnaryOperator {
    match ast[self.operator].kind {
      TokenKind::Bang => UnaryOperator::Not,
      TokenKind::Plus => UnaryOperator::Plus,
      _ => UnaryOperator::Minus,
    }
  }

  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.operator]).merge(self.expression(ast).span(ast))
  }
}

/// The operator of a [`Unary`] expression
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
  /// Logical not (`!`)
  Not,
  /// Negation (`-`)
  Minus,
  /// Identity (`+`)
  Plus,
}
impl fmt::Display for UnaryOperator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Not => write!(f, "!"),
      Self::Minus => write!(f, "-"),
      Self::Plus => write!(f, "+"),
    }
  }
}

/// A variable, e.g. `x`
#[derive(Debug, Clone, Copy)]
pub struct Variable {
  pub(crate) token: TokenIdx,
}
impl Variable {
  /// The name of the variable
  #[must_use]
  pub fn name<'a>(&self, ast: &'a AST) -> &'a str {
    ast.get_token_text(self.token)
  }

  /// The location of the expression
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.token])
  }
}

macro_rules! impl_from_for_expression {
  ($($variant:ident: $type:ty),*) => {
    $(
      impl From<$type> for Expression {
        fn from(value: $type) -> Self {
          Self::$variant(value)
        }
      }
    )*
  };
}
impl_from_for_expression!(
  Binary: Binary,
  Call: Call,
  Function: Function,
  Group: Group,
  Literal: Literal,
  Selector: Selector,
  String: StringLiteral,
  Unary: Unary,
  Variable: Variable
);
