//! # AST
//!
//! The definition of the  Abstract Syntax Tree (AST)

use crate::{
  parser::ParseError,
  tokeniser::{Token, TokenKind, Tokeniser},
};
use std::{num::NonZero, ops};

pub mod expression;
mod prettyprint;
pub mod statement;
pub mod types;

pub use expression::Expression;
pub use statement::Statement;
pub use types::Type;

/// Abstract Syntax Tree representing the source
#[must_use]
#[derive(Debug)]
pub struct AST {
  /// The source code which the AST is for
  pub source: String,
  /// The tokens of the source, without comments
  pub tokens: Vec<Token>,

  /// The top level statements and declarations of the source
  pub root_statements: Vec<Statement>,
  /// Statements which appear within blocks
  pub statements: Vec<Statement>,
  /// The expressions in the source
  pub expressions: Vec<Expression>,
  /// The types in the source
  pub types: Vec<Type>,

  /// Errors found during parsing
  pub errors: Vec<ParseError>,
}
impl AST {
  pub(crate) fn new(source: String) -> Self {
    let tokens = Tokeniser::from(source.as_str())
      .filter(|token| token.kind != TokenKind::Comment)
      .collect();

    Self {
      source,
      tokens,

      root_statements: Vec::new(),
      statements: Vec::new(),
      expressions: Vec::new(),
      types: Vec::new(),

      errors: Vec::new(),
    }
  }

  /// Is the parsed AST valid, with no errors found during parsing?
  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }

  /// Does the source start with an `import` declaration?
  #[must_use]
  pub fn starts_with_import(&self) -> bool {
    matches!(self.root_statements.first(), Some(Statement::Import(_)))
  }

  /// The name given in the `package` clause, if the source has one
  #[must_use]
  pub fn package_name(&self) -> Option<&str> {
    self.root_statements.iter().find_map(|statement| match statement {
      Statement::Package(package) => Some(package.name(self)),
      _ => None,
    })
  }

  pub(crate) fn add_expression(&mut self, expression: impl Into<Expression>) -> ExpressionIdx {
    self.expressions.push(expression.into());
    ExpressionIdx::from(self.expressions.len())
  }

  pub(crate) fn add_statement(&mut self, statement: Statement) -> StatementIdx {
    self.statements.push(statement);
    StatementIdx::from(self.statements.len())
  }

  pub(crate) fn add_type(&mut self, type_: impl Into<Type>) -> TypeIdx {
    self.types.push(type_.into());
    TypeIdx::from(self.types.len())
  }

  pub(crate) fn get_token_text(&self, token: TokenIdx) -> &str {
    crate::Span::from(self[token]).source_text(&self.source)
  }
}

impl ops::Index<ExpressionIdx> for AST {
  type Output = Expression;

  fn index(&self, index: ExpressionIdx) -> &Self::Output {
    &self.expressions[index.position()]
  }
}
impl ops::Index<TypeIdx> for AST {
  type Output = Type;

  fn index(&self, index: TypeIdx) -> &Self::Output {
    &self.types[index.position()]
  }
}
impl ops::Index<StatementIdx> for AST {
  type Output = Statement;

  fn index(&self, index: StatementIdx) -> &Self::Output {
    &self.statements[index.position()]
  }
}
impl ops::Index<TokenIdx> for AST {
  type Output = Token;

  fn index(&self, index: TokenIdx) -> &Self::Output {
    let position = index.position();
    if position < self.tokens.len() {
      &self.tokens[position]
    } else {
      &END_OF_FILE
    }
  }
}

static END_OF_FILE: Token = Token {
  kind: TokenKind::EndOfFile,
  start: 0,
  length: 0,
};

macro_rules! index_type {
  ($name:ident) => {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub(crate) struct $name(NonZero<u32>);
    impl $name {
      fn position(self) -> usize {
        self.0.get() as usize - 1
      }
    }
    impl From<usize> for $name {
      /// Create an index from the length of the collection after pushing the item
      fn from(length: usize) -> Self {
        let index = u32::try_from(length).unwrap_or(u32::MAX);
        Self(NonZero::new(index).unwrap_or(NonZero::<u32>::MIN))
      }
    }
  };
}

index_type!(ExpressionIdx);
index_type!(StatementIdx);
index_type!(TypeIdx);
index_type!(TokenIdx);
