//! # Statements

use crate::{
  ast::{
    AST, ExpressionIdx, StatementIdx, TokenIdx, TypeIdx,
    expression::{BinaryOperator, Expression},
    types::{Signature, Type},
  },
  span::Span,
  tokeniser::TokenKind,
};
use thin_vec::ThinVec;

/// A statement or declaration in the source code.
/// They don't produce a value, and are delimited by `;` or newlines.
#[must_use]
#[derive(Debug)]
pub enum Statement {
  /// An assignment or short variable declaration, e.g. `a, b := 1, 2`, `x += 3`
  Assignment(Assignment),
  /// A block of statements with its own scope, e.g. `{ .. }`
  Block(Block),
  /// Exit the innermost loop, `break`
  Break(Branch),
  /// A constant declaration, e.g. `const limit = 100`
  Const(ValueDeclaration),
  /// Skip to the next iteration of the innermost loop, `continue`
  Continue(Branch),
  /// An expression evaluated for its effects, e.g. `println(x)`
  Expression(ExpressionStmt),
  /// A loop, e.g. `for i := 0; i < 10; i++ { .. }`
  For(For),
  /// A named function declaration, e.g. `func add(a, b int) int { .. }`
  Function(FunctionDeclaration),
  /// A conditional, e.g. `if x > 0 { .. } else { .. }`
  If(If),
  /// An import declaration, e.g. `import ("maths"; "strings")`
  Import(Import),
  /// An increment or decrement, e.g. `i++`
  IncrementDecrement(IncrementDecrement),
  /// The package clause at the start of a file, e.g. `package geometry`
  Package(PackageClause),
  /// A return statement, e.g. `return a, b`
  Return(Return),
  /// A type declaration, e.g. `type Celsius float64`
  Type(TypeDeclaration),
  /// A variable declaration, e.g. `var x, y int = 1, 2`
  Var(ValueDeclaration),
}
impl Statement {
  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    match self {
      Self::Assignment(assignment) => assignment.span(ast),
      Self::Block(block) => block.span(),
      Self::Break(branch) | Self::Continue(branch) => branch.span(ast),
      Self::Const(declaration) | Self::Var(declaration) => declaration.span(ast),
      Self::Expression(expression) => expression.span(ast),
      Self::For(for_) => for_.span(ast),
      Self::Function(function) => function.span(ast),
      Self::If(if_) => if_.span(ast),
      Self::Import(import) => import.span(ast),
      Self::IncrementDecrement(statement) => statement.span(ast),
      Self::Package(package) => package.span(ast),
      Self::Return(return_) => return_.span(ast),
      Self::Type(declaration) => declaration.span(ast),
    }
  }

  /// Is the statement a declaration, allowed outside of a function body?
  #[must_use]
  pub fn is_declaration(&self) -> bool {
    matches!(
      self,
      Self::Const(_)
        | Self::Function(_)
        | Self::Import(_)
        | Self::Package(_)
        | Self::Type(_)
        | Self::Var(_)
    )
  }
}

/// An assignment or short variable declaration, e.g. `a, b := 1, 2`, `x += 3`
#[derive(Debug)]
pub struct Assignment {
  pub(crate) targets: ThinVec<ExpressionIdx>,
  pub(crate) operator: TokenIdx,
  pub(crate) values: ThinVec<ExpressionIdx>,
}
impl Assignment {
  /// The expressions being assigned to
  pub fn targets<'a>(&self, ast: &'a AST) -> impl ExactSizeIterator<Item = &'a Expression> {
    self.targets.iter().map(|target| &ast[*target])
  }

  /// The values being assigned
  pub fn values<'a>(&self, ast: &'a AST) -> impl ExactSizeIterator<Item = &'a Expression> {
    self.values.iter().map(|value| &ast[*value])
  }

  /// The kind of assignment
  pub fn operator(&self, ast: &AST) -> AssignmentOperator {
    match ast[self.operator].kind {
      TokenKind::ColonEqual => AssignmentOperator::Define,
      TokenKind::PlusEqual => AssignmentOperator::Compound(BinaryOperator::Add),
      TokenKind::MinusEqual => AssignmentOperator::Compound(BinaryOperator::Subtract),
      TokenKind::StarEqual => AssignmentOperator::Compound(BinaryOperator::Multiply),
      TokenKind::SlashEqual => AssignmentOperator::Compound(BinaryOperator::Divide),
      TokenKind::PercentEqual => AssignmentOperator::Compound(BinaryOperator::Remainder),
      _ => AssignmentOperator::Assign,
    }
  }

  /// The location of the assignment operator
  pub fn operator_span(&self, ast: &AST) -> Span {
    Span::from(ast[self.operator])
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    let operator = Span::from(ast[self.operator]);

    self
      .targets(ast)
      .chain(self.values(ast))
      .fold(operator, |span, expression| span.merge(expression.span(ast)))
  }
}

/// The kind of an [`Assignment`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignmentOperator {
  /// Short variable declaration (`:=`)
  Define,
  /// Plain assignment (`=`)
  Assign,
  /// Assignment combined with an operator (`+=`, `-=`, ..)
  Compound(BinaryOperator),
}

/// A block of statements with its own scope, e.g. `{ .. }`
#[derive(Debug, Default)]
pub struct Block {
  pub(crate) statements: ThinVec<StatementIdx>,
  pub(crate) span: Span,
}
impl Block {
  /// The statements in the block
  pub fn statements<'a>(&self, ast: &'a AST) -> impl ExactSizeIterator<Item = &'a Statement> {
    self.statements.iter().map(|statement| &ast[*statement])
  }

  /// The location of the block, from the opening to the closing brace
  pub fn span(&self) -> Span {
    self.span
  }
}

/// A `break` or `continue` statement
#[derive(Debug)]
pub struct Branch {
  pub(crate) token: TokenIdx,
}
impl Branch {
  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.token])
  }
}

/// A `var` or `const` declaration, e.g. `var x, y int = 1, 2`
#[derive(Debug)]
pub struct ValueDeclaration {
  pub(crate) keyword: TokenIdx,
  pub(crate) names: ThinVec<TokenIdx>,
  pub(crate) type_: Option<TypeIdx>,
  pub(crate) values: ThinVec<ExpressionIdx>,
}
impl ValueDeclaration {
  /// The names being declared, with their locations
  pub fn names<'a>(&self, ast: &'a AST) -> impl ExactSizeIterator<Item = (&'a str, Span)> {
    self
      .names
      .iter()
      .map(|name| (ast.get_token_text(*name), Span::from(ast[*name])))
  }

  /// The declared type, if given
  pub fn type_<'a>(&self, ast: &'a AST) -> Option<&'a Type> {
    self.type_.map(|type_| &ast[type_])
  }

  /// The initial values
  pub fn values<'a>(&self, ast: &'a AST) -> impl ExactSizeIterator<Item = &'a Expression> {
    self.values.iter().map(|value| &ast[*value])
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    let mut span = Span::from(ast[self.keyword]);
    if let Some(name) = self.names.last() {
      span = span.merge(ast[*name].into());
    }
    if let Some(type_) = self.type_(ast) {
      span = span.merge(type_.span(ast));
    }

    self
      .values(ast)
      .fold(span, |span, value| span.merge(value.span(ast)))
  }
}

/// An expression evaluated for its effects, e.g. `println(x)`
#[derive(Debug)]
pub struct ExpressionStmt {
  pub(crate) expression: ExpressionIdx,
}
impl ExpressionStmt {
  /// The expression
  pub fn expression<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.expression]
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    self.expression(ast).span(ast)
  }
}

/// A loop, e.g. `for i := 0; i < 10; i++ { .. }`
#[derive(Debug)]
pub struct For {
  pub(crate) keyword: TokenIdx,
  pub(crate) initialiser: Option<StatementIdx>,
  pub(crate) condition: Option<ExpressionIdx>,
  pub(crate) post: Option<StatementIdx>,
  /// The body of the loop
  pub body: Block,
}
impl For {
  /// The statement run once before the loop starts
  pub fn initialiser<'a>(&self, ast: &'a AST) -> Option<&'a Statement> {
    self.initialiser.map(|statement| &ast[statement])
  }

  /// The condition checked before each iteration, looping forever if missing
  pub fn condition<'a>(&self, ast: &'a AST) -> Option<&'a Expression> {
    self.condition.map(|condition| &ast[condition])
  }

  /// The statement run after each iteration
  pub fn post<'a>(&self, ast: &'a AST) -> Option<&'a Statement> {
    self.post.map(|statement| &ast[statement])
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.keyword]).merge(self.body.span())
  }
}

/// A named function declaration, e.g. `func add(a, b int) int { .. }`
#[derive(Debug)]
pub struct FunctionDeclaration {
  pub(crate) keyword: TokenIdx,
  pub(crate) name: TokenIdx,
  /// The parameters and results of the function
  pub signature: Signature,
  /// The body of the function
  pub body: Block,
}
impl FunctionDeclaration {
  /// The name of the function
  #[must_use]
  pub fn name<'a>(&self, ast: &'a AST) -> &'a str {
    ast.get_token_text(self.name)
  }

  /// The location of the name of the function
  pub fn name_span(&self, ast: &AST) -> Span {
    Span::from(ast[self.name])
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.keyword]).merge(self.body.span())
  }
}

/// A conditional, e.g. `if x > 0 { .. } else { .. }`
#[derive(Debug)]
pub struct If {
  pub(crate) keyword: TokenIdx,
  pub(crate) initialiser: Option<StatementIdx>,
  pub(crate) condition: ExpressionIdx,
  /// The block run when the condition is true
  pub then: Block,
  pub(crate) otherwise: Option<StatementIdx>,
}
impl If {
  /// The statement run before the condition is checked
  pub fn initialiser<'a>(&self, ast: &'a AST) -> Option<&'a Statement> {
    self.initialiser.map(|statement| &ast[statement])
  }

  /// The condition
  pub fn condition<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.condition]
  }

  /// The `else` branch, either a [`Block`] or another [`If`]
  pub fn otherwise<'a>(&self, ast: &'a AST) -> Option<&'a Statement> {
    self.otherwise.map(|statement| &ast[statement])
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    let span = Span::from(ast[self.keyword]).merge(self.then.span());

    match self.otherwise(ast) {
      Some(otherwise) => span.merge(otherwise.span(ast)),
      None => span,
    }
  }
}

/// An import declaration, e.g. `import ("maths"; "strings")`
#[derive(Debug)]
pub struct Import {
  pub(crate) keyword: TokenIdx,
  pub(crate) paths: ThinVec<ImportPath>,
  pub(crate) closing: Option<TokenIdx>,
}
impl Import {
  /// The import paths, with their locations
  pub fn paths<'a>(&'a self, ast: &'a AST) -> impl ExactSizeIterator<Item = (&'a str, Span)> {
    self
      .paths
      .iter()
      .map(|path| (path.path.as_str(), Span::from(ast[path.token])))
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    let keyword = Span::from(ast[self.keyword]);

    match (self.closing, self.paths.last()) {
      (Some(closing), _) => keyword.merge(ast[closing].into()),
      (None, Some(path)) => keyword.merge(ast[path.token].into()),
      (None, None) => keyword,
    }
  }
}

/// A single path in an [`Import`]
#[derive(Debug)]
pub(crate) struct ImportPath {
  pub(crate) token: TokenIdx,
  pub(crate) path: String,
}

/// An increment or decrement, e.g. `i++`
#[derive(Debug)]
pub struct IncrementDecrement {
  pub(crate) target: ExpressionIdx,
  pub(crate) operator: TokenIdx,
}
impl IncrementDecrement {
  /// The expression being changed
  pub fn target<'a>(&self, ast: &'a AST) -> &'a Expression {
    &ast[self.target]
  }

  /// Is it an increment (`++`) rather than a decrement (`--`)?
  #[must_use]
  pub fn is_increment(&self, ast: &AST) -> bool {
    ast[self.operator].kind == TokenKind::PlusPlus
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    self.target(ast).span(ast).merge(ast[self.operator].into())
  }
}

/// The package clause at the start of a file, e.g. `package geometry`
#[derive(Debug)]
pub struct PackageClause {
  pub(crate) keyword: TokenIdx,
  pub(crate) name: TokenIdx,
}
impl PackageClause {
  /// The name of the package
  #[must_use]
  pub fn name<'a>(&self, ast: &'a AST) -> &'a str {
    ast.get_token_text(self.name)
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.keyword]).merge(ast[self.name].into())
  }
}

/// A return statement, e.g. `return a, b`
#[derive(Debug)]
pub struct Return {
  pub(crate) keyword: TokenIdx,
  pub(crate) values: ThinVec<ExpressionIdx>,
}
impl Return {
  /// The values being returned
  pub fn values<'a>(&self, ast: &'a AST) -> impl ExactSizeIterator<Item = &'a Expression> {
    self.values.iter().map(|value| &ast[*value])
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    let keyword = Span::from(ast[self.keyword]);

    self
      .values(ast)
      .fold(keyword, |span, value| span.merge(value.span(ast)))
  }
}

/// A type declaration, e.g. `type Celsius float64`
#[derive(Debug)]
pub struct TypeDeclaration {
  pub(crate) keyword: TokenIdx,
  pub(crate) name: TokenIdx,
  pub(crate) type_: TypeIdx,
}
impl TypeDeclaration {
  /// The name of the new type
  #[must_use]
  pub fn name<'a>(&self, ast: &'a AST) -> &'a str {
    ast.get_token_text(self.name)
  }

  /// The location of the name
  pub fn name_span(&self, ast: &AST) -> Span {
    Span::from(ast[self.name])
  }

  /// The underlying type
  pub fn type_<'a>(&self, ast: &'a AST) -> &'a Type {
    &ast[self.type_]
  }

  /// The location of the statement
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.keyword]).merge(self.type_(ast).span(ast))
  }
}
