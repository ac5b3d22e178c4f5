//! # Chicklet Syntax
//! Tokenises and parses Chicklet source into an Abstract Syntax Tree.
//!
//! Expressions are parsed by precedence climbing, with statements and declarations parsed
//! by recursive descent. Nodes are stored in flat vectors on the [`AST`] and refer to each
//! other by index, so the AST is passed alongside a node to read its children.
//!
//! Newlines end a statement when the token before them could, following Go's rule for
//! inserting semicolons.
//!
//! Parsing carries on after an error by skipping to the start of the next statement, so a
//! file with several mistakes reports all of them.

pub mod ast;
mod parser;
mod span;
mod tokeniser;

#[cfg(test)]
mod test;

/// Parses a source code string into an AST.
///
/// # Examples
/// ```
/// use chicklet_syntax::parse;
/// let ast = parse("x := 5 + 3".to_owned());
///
/// assert!(ast.is_valid());
/// ```
pub fn parse(source: String) -> AST {
  let mut ast = AST::new(source);
  parser::Parser::new(&mut ast).parse();
  ast
}

/// Get the tokens from a source code string
pub fn tokenise(source: &str) -> impl Iterator<Item = tokeniser::Token> + '_ {
  tokeniser::Tokeniser::from(source)
}

pub use ast::AST;
pub use parser::ParseError;
pub use span::{LineIndex, Span};
pub use tokeniser::{Token, TokenKind};
