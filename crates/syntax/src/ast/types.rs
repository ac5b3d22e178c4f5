//! # Types

use crate::{
  ast::{AST, TokenIdx, TypeIdx},
  span::Span,
};
use thin_vec::ThinVec;

/// A type annotation, e.g. on a variable or in a function signature
#[must_use]
#[derive(Debug)]
pub enum Type {
  /// A type referred to by name, e.g. `int`, `string`, `Celsius`
  Named(TypeNamed),
  /// A type from another package, e.g. `geometry.Metres`
  Qualified(TypeQualified),
  /// A function type, e.g. `func(int, int) (int, bool)`
  Function(TypeFunction),
  /// An type in parentheses, e.g. `(int)`
  Group(TypeGroup),
}
impl Type {
  /// The location of the type
  pub fn span(&self, ast: &AST) -> Span {
    match self {
      Self::Named(named) => named.span(ast),
      Self::Qualified(qualified) => qualified.span(ast),
      Self::Function(function) => function.span(ast),
      Self::Group(group) => group.span(ast),
    }
  }
}

/// A type referred to by name, e.g. `int`, `string`, `Celsius`
#[derive(Debug)]
pub struct TypeNamed {
  pub(crate) token: TokenIdx,
}
impl TypeNamed {
  /// The name of the type
  #[must_use]
  pub fn name<'a>(&self, ast: &'a AST) -> &'a str {
    ast.get_token_text(self.token)
  }

  /// The location of the type
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.token])
  }
}

/// A type from another package, e.g. `geometry.Metres`
#[derive(Debug)]
pub struct TypeQualified {
  pub(crate) package: TokenIdx,
  pub(crate) name: TokenIdx,
}
impl TypeQualified {
  /// The name of the package
  #[must_use]
  pub fn package<'a>(&self, ast: &'a AST) -> &'a str {
    ast.get_token_text(self.package)
  }

  /// The name of the type within the package
  #[must_use]
  pub fn name<'a>(&self, ast: &'a AST) -> &'a str {
    ast.get_token_text(self.name)
  }

  /// The location of the type
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.package]).merge(ast[self.name].into())
  }
}

/// A function type, e.g. `func(int, int) (int, bool)`
#[derive(Debug)]
pub struct TypeFunction {
  pub(crate) keyword: TokenIdx,
  /// The parameters and results of the function type
  pub signature: Signature,
}
impl TypeFunction {
  /// The location of the type
  pub fn span(&self, ast: &AST) -> Span {
    Span::from(ast[self.keyword]).merge(self.signature.span())
  }
}

/// An type in parentheses, e.g. `(int)`
#[derive(Debug)]
pub struct TypeGroup {
  pub(crate) opening: TokenIdx,
  pub(crate) type_: TypeIdx,
  pub(crate) closing: Option<TokenIdx>,
}
impl TypeGroup {
  /// The type inside the parentheses
  pub fn type_<'a>(&self, ast: &'a AST) -> &'a Type {
    &ast[self.type_]
  }

  /// The location of the type
  pub fn span(&self, ast: &AST) -> Span {
    let opening = Span::from(ast[self.opening]);

    match self.closing {
      Some(closing) => opening.merge(ast[closing].into()),
      None => opening.merge(self.type_(ast).span(ast)),
    }
  }
}

/// The parameters and results of a function, e.g. `(a, b int) (int, error)`
#[derive(Debug, Default)]
pub struct Signature {
  pub(crate) parameters: ThinVec<Parameter>,
  pub(crate) results: ThinVec<Parameter>,
  pub(crate) span: Span,
}
impl Signature {
  /// The parameters of the function
  #[must_use]
  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  /// The results of the function
  #[must_use]
  pub fn results(&self) -> &[Parameter] {
    &self.results
  }

  /// The location of the signature
  pub fn span(&self) -> Span {
    self.span
  }
}

/// A single parameter or result, with an optional name, e.g. `x int` or `string`
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
  pub(crate) name: Option<TokenIdx>,
  pub(crate) type_: TypeIdx,
}
impl Parameter {
  /// The name of the parameter, if it has one
  #[must_use]
  pub fn name<'a>(&self, ast: &'a AST) -> Option<&'a str> {
    self.name.map(|name| ast.get_token_text(name))
  }

  /// The location of the name of the parameter
  pub fn name_span(&self, ast: &AST) -> Option<Span> {
    self.name.map(|name| Span::from(ast[name]))
  }

  /// The type of the parameter
  pub fn type_<'a>(&self, ast: &'a AST) -> &'a Type {
    &ast[self.type_]
  }
}

macro_rules! impl_from_for_type {
  ($($variant:ident: $type:ty),*) => {
    $(
      impl From<$type> for Type {
        fn from(value: $type) -> Self {
          Self::$variant(value)
        }
      }
    )*
  };
}
impl_from_for_type!(
  Named: TypeNamed,
  Qualified: TypeQualified,
  Function: TypeFunction,
  Group: TypeGroup
);
