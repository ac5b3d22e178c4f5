use crate::{
  ast::{
    AST, ExpressionIdx, StatementIdx, TokenIdx, TypeIdx, expression::*, statement::*, types::*,
  },
  span::Span,
  tokeniser::{Token, TokenKind},
};
use std::{error, fmt};
use thin_vec::{ThinVec, thin_vec};

pub struct Parser<'ast> {
  /// The AST being built up by the parser
  ast: &'ast mut AST,

  /// The current token
  position: usize,
  /// How many functions are we currently in
  function_depth: usize,
}
impl<'ast> Parser<'ast> {
  pub fn new(ast: &'ast mut AST) -> Self {
    Self {
      ast,
      position: 0,
      function_depth: 0,
    }
  }

  pub fn parse(mut self) {
    loop {
      self.skip_terminators();
      if self.is_finished() {
        break;
      }

      match self.parse_statement(true) {
        Ok(statement) => {
          self.ast.root_statements.push(statement);
          self.expect_terminator();
        }
        Err(error) => {
          self.recover(error);

          // an unmatched `}` can't end a block at the top level
          if self.current_kind() == TokenKind::RightCurly {
            self.position += 1;
          }
        }
      }
    }
  }

  fn add_error(&mut self, error: ParseError) {
    self.ast.errors.push(error);
  }

  /// Record the error and skip to the start of the next statement
  fn recover(&mut self, error: ParseError) {
    self.add_error(error);

    while !matches!(
      self.current_kind(),
      TokenKind::EndOfFile | TokenKind::EndOfLine | TokenKind::Semicolon | TokenKind::RightCurly
    ) {
      self.position += 1;
    }
  }

  fn is_finished(&self) -> bool {
    self.current_kind() == TokenKind::EndOfFile
  }

  fn current_token(&self) -> Token {
    match self.ast.tokens.get(self.position) {
      Some(token) => *token,
      None => Token {
        kind: TokenKind::EndOfFile,
        start: u32::try_from(self.ast.source.len()).unwrap_or(u32::MAX),
        length: 0,
      },
    }
  }

  fn current_kind(&self) -> TokenKind {
    self.current_token().kind
  }

  fn peek_kind(&self) -> TokenKind {
    self
      .ast
      .tokens
      .get(self.position + 1)
      .map_or(TokenKind::EndOfFile, |token| token.kind)
  }

  fn advance(&mut self) -> (TokenKind, TokenIdx) {
    let kind = self.current_kind();
    self.position += 1;
    (kind, TokenIdx::from(self.position))
  }

  fn previous_token_id(&self) -> TokenIdx {
    TokenIdx::from(self.position)
  }

  fn expect(&mut self, kind: TokenKind) -> Result<TokenIdx, ParseError> {
    if self.current_kind() == kind {
      Ok(self.advance().1)
    } else {
      Err(ParseError::Expected {
        expected: kind,
        received: self.current_token(),
      })
    }
  }

  fn matches(&mut self, kind: TokenKind) -> bool {
    if self.current_kind() == kind {
      self.position += 1;
      true
    } else {
      false
    }
  }

  fn skip_terminators(&mut self) {
    while matches!(
      self.current_kind(),
      TokenKind::EndOfLine | TokenKind::Semicolon
    ) {
      self.position += 1;
    }
  }

  /// A statement must be followed by `;`, a new line, or the end of the enclosing block
  fn expect_terminator(&mut self) {
    match self.current_kind() {
      TokenKind::EndOfLine | TokenKind::Semicolon => self.position += 1,
      TokenKind::RightCurly | TokenKind::RightParen | TokenKind::EndOfFile => {}
      _ => self.recover(ParseError::Expected {
        expected: TokenKind::EndOfLine,
        received: self.current_token(),
      }),
    }
  }

  fn parse_expression(&mut self) -> Result<ExpressionIdx, ParseError> {
    self.parse_expression_with_precedence(ParsePrecedence::LOWEST)
  }

  fn parse_expression_list(&mut self) -> Result<ThinVec<ExpressionIdx>, ParseError> {
    let mut expressions = thin_vec![self.parse_expression()?];
    while self.matches(TokenKind::Comma) {
      expressions.push(self.parse_expression()?);
    }

    Ok(expressions)
  }

  fn parse_expression_with_precedence(
    &mut self,
    precedence: ParsePrecedence,
  ) -> Result<ExpressionIdx, ParseError> {
    let (kind, token) = self.advance();
    let mut previous = self.prefix_expression(kind, token)?;

    while precedence <= ParsePrecedence::from(self.current_kind()) {
      let (kind, token) = self.advance();
      previous = self.infix_expression(previous, kind, token)?;
    }

    Ok(previous)
  }

  /// Parse a prefix expression
  ///
  /// An expression which starts/ makes up the first part of the expression
  fn prefix_expression(
    &mut self,
    token_kind: TokenKind,
    token: TokenIdx,
  ) -> Result<ExpressionIdx, ParseError> {
    match token_kind {
      TokenKind::Integer | TokenKind::Float => Ok(self.ast.add_expression(Literal { token })),
      TokenKind::String => self.string(token),
      TokenKind::RawString => Ok(self.raw_string(token)),
      TokenKind::Identifier => Ok(self.ast.add_expression(Variable { token })),

      TokenKind::LeftParen => self.group(token),
      TokenKind::Minus | TokenKind::Plus | TokenKind::Bang => self.unary(token),
      TokenKind::Func => self.function(token),

      TokenKind::Unknown => Err(ParseError::UnknownCharacter(self.ast[token])),
      TokenKind::UnterminatedString => Err(ParseError::UnterminatedString(self.ast[token])),
      TokenKind::UnterminatedComment => Err(ParseError::UnterminatedComment(self.ast[token])),
      TokenKind::EndOfFile => Err(ParseError::ExpectedExpression(self.current_token())),
      _ => Err(ParseError::ExpectedExpression(self.ast[token])),
    }
  }

  /// Parse an infix expression
  ///
  /// An expression which relies on a previous expression to be complete.
  /// Passes the previously parsed expression to make up the start of the expression.
  /// It takes the relevant token as the operator, and the sub-function to parse the rest
  fn infix_expression(
    &mut self,
    lhs: ExpressionIdx,
    kind: TokenKind,
    operator: TokenIdx,
  ) -> Result<ExpressionIdx, ParseError> {
    match kind {
      TokenKind::LeftParen => self.call(lhs),
      TokenKind::Dot => self.selector(lhs),
      _ => self.binary(lhs, kind, operator),
    }
  }
}
// Expressions
impl Parser<'_> {
  fn binary(
    &mut self,
    left: ExpressionIdx,
    kind: TokenKind,
    operator: TokenIdx,
  ) -> Result<ExpressionIdx, ParseError> {
    let right = self.parse_expression_with_precedence(ParsePrecedence::from(kind).next())?;

    Ok(self.ast.add_expression(Binary {
      left,
      operator,
      right,
    }))
  }

  fn call(&mut self, callee: ExpressionIdx) -> Result<ExpressionIdx, ParseError> {
    let mut arguments = ThinVec::new();

    while !matches!(
      self.current_kind(),
      TokenKind::RightParen | TokenKind::EndOfFile
    ) {
      arguments.push(self.parse_expression()?);

      if !self.matches(TokenKind::Comma) {
        break;
      }
    }
    let closing = self.expect(TokenKind::RightParen)?;

    Ok(self.ast.add_expression(Call {
      callee,
      arguments,
      closing: Some(closing),
    }))
  }

  fn selector(&mut self, expression: ExpressionIdx) -> Result<ExpressionIdx, ParseError> {
    let member = self.expect(TokenKind::Identifier)?;

    Ok(self.ast.add_expression(Selector { expression, member }))
  }

  fn function(&mut self, keyword: TokenIdx) -> Result<ExpressionIdx, ParseError> {
    let signature = self.signature()?;

    self.function_depth += 1;
    let body = self.block();
    self.function_depth -= 1;

    Ok(self.ast.add_expression(Function {
      keyword,
      signature,
      body: body?,
    }))
  }

  fn group(&mut self, opening: TokenIdx) -> Result<ExpressionIdx, ParseError> {
    let expression = self.parse_expression()?;
    let closing = self.expect(TokenKind::RightParen)?;

    Ok(self.ast.add_expression(Group {
      opening,
      expression,
      closing: Some(closing),
    }))
  }

  fn string(&mut self, token: TokenIdx) -> Result<ExpressionIdx, ParseError> {
    let text = self.ast.get_token_text(token);
    let value = unescape(&text[1..text.len() - 1])
      .ok_or_else(|| ParseError::InvalidEscape(self.ast[token]))?;

    Ok(self.ast.add_expression(StringLiteral { token, value }))
  }

  fn raw_string(&mut self, token: TokenIdx) -> ExpressionIdx {
    let text = self.ast.get_token_text(token);
    let value = text[1..text.len() - 1].replace('\r', "");

    self.ast.add_expression(StringLiteral { token, value })
  }

  fn unary(&mut self, operator: TokenIdx) -> Result<ExpressionIdx, ParseError> {
    let expression = self.parse_expression_with_precedence(ParsePrecedence::Unary)?;

    Ok(self.ast.add_expression(Unary {
      operator,
      expression,
    }))
  }
}
// Statements
impl Parser<'_> {
  fn parse_statement(&mut self, is_root: bool) -> Result<Statement, ParseError> {
    let token = self.current_token();

    match self.current_kind() {
      TokenKind::Package | TokenKind::Import if !is_root => {
        Err(ParseError::DeclarationNotAllowed(token))
      }
      TokenKind::Package => self.package_clause(),
      TokenKind::Import => self.import(),
      TokenKind::Func if self.peek_kind() == TokenKind::Identifier => {
        if is_root {
          self.function_declaration()
        } else {
          Err(ParseError::DeclarationNotAllowed(token))
        }
      }
      TokenKind::Var => Ok(Statement::Var(self.value_declaration()?)),
      TokenKind::Const => Ok(Statement::Const(self.value_declaration()?)),
      TokenKind::Type => self.type_declaration(),

      TokenKind::Return => self.return_(),
      TokenKind::If => self.if_(),
      TokenKind::For => self.for_(),
      TokenKind::Break => Ok(Statement::Break(Branch {
        token: self.advance().1,
      })),
      TokenKind::Continue => Ok(Statement::Continue(Branch {
        token: self.advance().1,
      })),
      TokenKind::LeftCurly => Ok(Statement::Block(self.block()?)),

      _ => self.simple_statement(),
    }
  }

  /// An expression, assignment, short variable declaration, or increment
  fn simple_statement(&mut self) -> Result<Statement, ParseError> {
    let targets = self.parse_expression_list()?;

    match self.current_kind() {
      TokenKind::Equal
      | TokenKind::ColonEqual
      | TokenKind::PlusEqual
      | TokenKind::MinusEqual
      | TokenKind::StarEqual
      | TokenKind::SlashEqual
      | TokenKind::PercentEqual => {
        let (_, operator) = self.advance();
        let values = self.parse_expression_list()?;

        Ok(Statement::Assignment(Assignment {
          targets,
          operator,
          values,
        }))
      }
      TokenKind::PlusPlus | TokenKind::MinusMinus if targets.len() == 1 => {
        let (_, operator) = self.advance();

        Ok(Statement::IncrementDecrement(IncrementDecrement {
          target: targets[0],
          operator,
        }))
      }
      _ if targets.len() == 1 => Ok(Statement::Expression(ExpressionStmt {
        expression: targets[0],
      })),
      _ => Err(ParseError::ExpectedAssignment(self.current_token())),
    }
  }

  fn add_statement(&mut self, statement: Statement) -> StatementIdx {
    self.ast.add_statement(statement)
  }

  fn block(&mut self) -> Result<Block, ParseError> {
    let opening = self.expect(TokenKind::LeftCurly)?;
    let mut statements = ThinVec::new();

    loop {
      self.skip_terminators();
      if matches!(
        self.current_kind(),
        TokenKind::RightCurly | TokenKind::EndOfFile
      ) {
        break;
      }

      match self.parse_statement(false) {
        Ok(statement) => {
          statements.push(self.add_statement(statement));
          self.expect_terminator();
        }
        Err(error) => self.recover(error),
      }
    }
    let closing = self.expect(TokenKind::RightCurly)?;

    Ok(Block {
      statements,
      span: Span::from(self.ast[opening]).merge(self.ast[closing].into()),
    })
  }

  fn function_declaration(&mut self) -> Result<Statement, ParseError> {
    let (_, keyword) = self.advance();
    let name = self.expect(TokenKind::Identifier)?;
    let signature = self.signature()?;

    self.function_depth += 1;
    let body = self.block();
    self.function_depth -= 1;

    Ok(Statement::Function(FunctionDeclaration {
      keyword,
      name,
      signature,
      body: body?,
    }))
  }

  fn for_(&mut self) -> Result<Statement, ParseError> {
    let (_, keyword) = self.advance();

    let mut initialiser = None;
    let mut condition = None;
    let mut post = None;

    if self.current_kind() != TokenKind::LeftCurly {
      let first = match self.current_kind() {
        TokenKind::Semicolon => None,
        _ => Some(self.simple_statement()?),
      };

      if self.current_kind() == TokenKind::LeftCurly {
        condition = first.map(|statement| self.expect_condition(statement)).transpose()?;
      } else {
        self.expect(TokenKind::Semicolon)?;
        initialiser = first.map(|statement| self.add_statement(statement));

        if self.current_kind() != TokenKind::Semicolon {
          condition = Some(self.parse_expression()?);
        }
        self.expect(TokenKind::Semicolon)?;

        if self.current_kind() != TokenKind::LeftCurly {
          let statement = self.simple_statement()?;
          post = Some(self.add_statement(statement));
        }
      }
    }

    Ok(Statement::For(For {
      keyword,
      initialiser,
      condition,
      post,
      body: self.block()?,
    }))
  }

  fn if_(&mut self) -> Result<Statement, ParseError> {
    let (_, keyword) = self.advance();

    let first = self.simple_statement()?;
    let (initialiser, condition) = if self.matches(TokenKind::Semicolon) {
      let initialiser = self.add_statement(first);
      (Some(initialiser), self.parse_expression()?)
    } else {
      (None, self.expect_condition(first)?)
    };

    let then = self.block()?;
    let otherwise = if self.matches(TokenKind::Else) {
      let statement = match self.current_kind() {
        TokenKind::If => self.if_()?,
        _ => Statement::Block(self.block()?),
      };
      Some(self.add_statement(statement))
    } else {
      None
    };

    Ok(Statement::If(If {
      keyword,
      initialiser,
      condition,
      then,
      otherwise,
    }))
  }

  fn expect_condition(&mut self, statement: Statement) -> Result<ExpressionIdx, ParseError> {
    match statement {
      Statement::Expression(ExpressionStmt { expression }) => Ok(expression),
      _ => Err(ParseError::ExpectedExpression(self.current_token())),
    }
  }

  fn import(&mut self) -> Result<Statement, ParseError> {
    let (_, keyword) = self.advance();
    let mut paths = ThinVec::new();
    let mut closing = None;

    if self.matches(TokenKind::LeftParen) {
      loop {
        self.skip_terminators();
        if matches!(
          self.current_kind(),
          TokenKind::RightParen | TokenKind::EndOfFile
        ) {
          break;
        }
        paths.push(self.import_path()?);
      }
      closing = Some(self.expect(TokenKind::RightParen)?);
    } else {
      paths.push(self.import_path()?);
    }

    Ok(Statement::Import(Import {
      keyword,
      paths,
      closing,
    }))
  }

  fn import_path(&mut self) -> Result<ImportPath, ParseError> {
    let (kind, token) = self.advance();

    match kind {
      TokenKind::String => {
        let text = self.ast.get_token_text(token);
        let path = unescape(&text[1..text.len() - 1])
          .ok_or_else(|| ParseError::InvalidEscape(self.ast[token]))?;

        Ok(ImportPath { token, path })
      }
      TokenKind::RawString => {
        let text = self.ast.get_token_text(token);
        let path = text[1..text.len() - 1].to_owned();

        Ok(ImportPath { token, path })
      }
      _ => Err(ParseError::Expected {
        expected: TokenKind::String,
        received: self.ast[token],
      }),
    }
  }

  fn package_clause(&mut self) -> Result<Statement, ParseError> {
    let (_, keyword) = self.advance();
    let name = self.expect(TokenKind::Identifier)?;

    Ok(Statement::Package(PackageClause { keyword, name }))
  }

  fn return_(&mut self) -> Result<Statement, ParseError> {
    let (_, keyword) = self.advance();

    if self.function_depth == 0 {
      return Err(ParseError::ReturnOutsideFunction(self.ast[keyword]));
    }

    let values = match self.current_kind() {
      TokenKind::EndOfLine
      | TokenKind::Semicolon
      | TokenKind::RightCurly
      | TokenKind::EndOfFile => ThinVec::new(),
      _ => self.parse_expression_list()?,
    };

    Ok(Statement::Return(Return { keyword, values }))
  }

  fn type_declaration(&mut self) -> Result<Statement, ParseError> {
    let (_, keyword) = self.advance();
    let name = self.expect(TokenKind::Identifier)?;
    let type_ = self.parse_type()?;

    Ok(Statement::Type(TypeDeclaration {
      keyword,
      name,
      type_,
    }))
  }

  /// A `var` or `const` declaration
  fn value_declaration(&mut self) -> Result<ValueDeclaration, ParseError> {
    let (_, keyword) = self.advance();

    let mut names = thin_vec![self.expect(TokenKind::Identifier)?];
    while self.matches(TokenKind::Comma) {
      names.push(self.expect(TokenKind::Identifier)?);
    }

    let type_ = match self.current_kind() {
      TokenKind::Equal
      | TokenKind::EndOfLine
      | TokenKind::Semicolon
      | TokenKind::RightCurly
      | TokenKind::EndOfFile => None,
      _ => Some(self.parse_type()?),
    };

    let values = if self.matches(TokenKind::Equal) {
      self.parse_expression_list()?
    } else if type_.is_none() {
      return Err(ParseError::ExpectedType(self.current_token()));
    } else {
      ThinVec::new()
    };

    Ok(ValueDeclaration {
      keyword,
      names,
      type_,
      values,
    })
  }
}
// Types
impl Parser<'_> {
  fn parse_type(&mut self) -> Result<TypeIdx, ParseError> {
    let (kind, token) = self.advance();

    match kind {
      TokenKind::Identifier if self.matches(TokenKind::Dot) => {
        let name = self.expect(TokenKind::Identifier)?;
        Ok(self.ast.add_type(TypeQualified {
          package: token,
          name,
        }))
      }
      TokenKind::Identifier => Ok(self.ast.add_type(TypeNamed { token })),
      TokenKind::Func => {
        let signature = self.signature()?;
        Ok(self.ast.add_type(TypeFunction {
          keyword: token,
          signature,
        }))
      }
      TokenKind::LeftParen => {
        let type_ = self.parse_type()?;
        let closing = self.expect(TokenKind::RightParen)?;
        Ok(self.ast.add_type(TypeGroup {
          opening: token,
          type_,
          closing: Some(closing),
        }))
      }
      _ => Err(ParseError::ExpectedType(self.ast[token])),
    }
  }

  fn signature(&mut self) -> Result<Signature, ParseError> {
    let opening = self.expect(TokenKind::LeftParen)?;
    let parameters = self.parameter_list()?;

    let results = match self.current_kind() {
      TokenKind::LeftParen => {
        self.advance();
        self.parameter_list()?
      }
      TokenKind::Identifier | TokenKind::Func => thin_vec![Parameter {
        name: None,
        type_: self.parse_type()?,
      }],
      _ => ThinVec::new(),
    };

    let end = self.ast[self.previous_token_id()];
    Ok(Signature {
      parameters,
      results,
      span: Span::from(self.ast[opening]).merge(end.into()),
    })
  }

  /// Parse parameters up to and including the closing `)`
  ///
  /// Either every parameter is named (`a, b int, c string`), or none are (`int, string`).
  fn parameter_list(&mut self) -> Result<ThinVec<Parameter>, ParseError> {
    let mut entries: Vec<(Option<TokenIdx>, Option<TypeIdx>)> = Vec::new();

    while !matches!(
      self.current_kind(),
      TokenKind::RightParen | TokenKind::EndOfFile
    ) {
      let entry = if self.current_kind() == TokenKind::Identifier
        && self.peek_kind() != TokenKind::Dot
      {
        let (_, name) = self.advance();
        match self.current_kind() {
          TokenKind::Comma | TokenKind::RightParen => (Some(name), None),
          _ => (Some(name), Some(self.parse_type()?)),
        }
      } else {
        (None, Some(self.parse_type()?))
      };
      entries.push(entry);

      if !self.matches(TokenKind::Comma) {
        break;
      }
    }
    let closing = self.expect(TokenKind::RightParen)?;

    let is_named = entries
      .iter()
      .any(|entry| matches!(entry, (Some(_), Some(_))));

    if !is_named {
      let parameters = entries
        .into_iter()
        .map(|entry| match entry {
          (_, Some(type_)) => Parameter { name: None, type_ },
          (token, None) => Parameter {
            name: None,
            type_: self.ast.add_type(TypeNamed {
              token: token.unwrap_or(closing),
            }),
          },
        })
        .collect();
      return Ok(parameters);
    }

    let mut parameters = ThinVec::with_capacity(entries.len());
    let mut current_type = None;
    for (name, type_) in entries.into_iter().rev() {
      match (name, type_) {
        (Some(name), Some(type_)) => {
          current_type = Some(type_);
          parameters.push(Parameter {
            name: Some(name),
            type_,
          });
        }
        (Some(name), None) => {
          let type_ =
            current_type.ok_or_else(|| ParseError::MissingParameterType(self.ast[name]))?;
          parameters.push(Parameter {
            name: Some(name),
            type_,
          });
        }
        (None, _) => {
          return Err(ParseError::MixedParameters(self.ast[closing]));
        }
      }
    }
    parameters.reverse();

    Ok(parameters)
  }
}

/// Resolve the escape sequences in the contents of a string literal
///
/// Returns `None` if there is an unknown or malformed escape sequence.
fn unescape(text: &str) -> Option<String> {
  let mut result = String::with_capacity(text.len());
  let mut characters = text.chars();

  while let Some(character) = characters.next() {
    if character != '\\' {
      result.push(character);
      continue;
    }

    let escaped = match characters.next()? {
      'n' => '\n',
      't' => '\t',
      'r' => '\r',
      '0' => '\0',
      '\\' => '\\',
      '"' => '"',
      '\'' => '\'',
      'x' => {
        let digits: String = characters.by_ref().take(2).collect();
        if digits.len() != 2 {
          return None;
        }
        char::from(u8::from_str_radix(&digits, 16).ok()?)
      }
      'u' => {
        let digits: String = characters.by_ref().take(4).collect();
        if digits.len() != 4 {
          return None;
        }
        char::from_u32(u32::from_str_radix(&digits, 16).ok()?)?
      }
      _ => return None,
    };
    result.push(escaped);
  }

  Some(result)
}

/// The precendence of the different operators
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Eq)]
enum ParsePrecedence {
  None = 1,
  Or,         // ||
  And,        // &&
  Comparison, // == != < > <= >=
  Term,       // + -
  Factor,     // * / %
  Unary,      // ! - +
  Call,       // () .
  Primary,    // literal, variable
}
impl ParsePrecedence {
  const LOWEST: Self = Self::Or;

  fn next(self) -> Self {
    match self {
      Self::None => Self::Or,
      Self::Or => Self::And,
      Self::And => Self::Comparison,
      Self::Comparison => Self::Term,
      Self::Term => Self::Factor,
      Self::Factor => Self::Unary,
      Self::Unary => Self::Call,
      Self::Call | Self::Primary => Self::Primary,
    }
  }
}
impl From<TokenKind> for ParsePrecedence {
  fn from(kind: TokenKind) -> Self {
    match kind {
      TokenKind::LeftParen | TokenKind::Dot => Self::Call,
      TokenKind::Plus | TokenKind::Minus => Self::Term,
      TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Self::Factor,
      TokenKind::BangEqual
      | TokenKind::EqualEqual
      | TokenKind::Greater
      | TokenKind::GreaterEqual
      | TokenKind::Less
      | TokenKind::LessEqual => Self::Comparison,
      TokenKind::Or => Self::Or,
      TokenKind::And => Self::And,
      _ => Self::None,
    }
  }
}

/// An error which arose during parsing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
  /// Expected a token of a certain kind
  Expected {
    /// Expected Token Kind to be
    expected: TokenKind,
    /// Received this Token instead
    received: Token,
  },
  /// Expected Expression
  ExpectedExpression(Token),
  /// Expected Type
  ExpectedType(Token),
  /// Expected an assignment after a list of expressions
  ExpectedAssignment(Token),
  /// Unknown Character
  UnknownCharacter(Token),
  /// Unterminated String Literal
  UnterminatedString(Token),
  /// Unterminated Block Comment
  UnterminatedComment(Token),
  /// Invalid Escape Sequence
  InvalidEscape(Token),
  /// Named and unnamed parameters in the same list
  MixedParameters(Token),
  /// A named parameter without a type
  MissingParameterType(Token),
  /// Return Outside of Function
  ReturnOutsideFunction(Token),
  /// Declaration only allowed at the top level
  DeclarationNotAllowed(Token),
}
impl ParseError {
  /// The title of the error message
  #[must_use]
  pub fn title(&self) -> String {
    match self {
      Self::Expected { expected, .. } => format!("Expected {expected}"),
      Self::ExpectedExpression(_) => "Expected Expression".into(),
      Self::ExpectedType(_) => "Expected Type".into(),
      Self::ExpectedAssignment(_) => "Expected Assignment".into(),
      Self::UnknownCharacter(_) => "Unknown Character".into(),
      Self::UnterminatedString(_) => "Unterminated String".into(),
      Self::UnterminatedComment(_) => "Unterminated Comment".into(),
      Self::InvalidEscape(_) => "Invalid Escape Sequence".into(),
      Self::MixedParameters(_) => "Mixed Parameters".into(),
      Self::MissingParameterType(_) => "Missing Parameter Type".into(),
      Self::ReturnOutsideFunction(_) => "Return Outside of Function".into(),
      Self::DeclarationNotAllowed(_) => "Declaration Not Allowed".into(),
    }
  }

  /// The body of the error message describing what has gone wrong
  #[must_use]
  pub fn message(&self) -> String {
    match self {
      Self::Expected { expected, received } => {
        format!("expected {expected} but got {}", received.kind)
      }
      Self::ExpectedExpression(t) => format!("expected expression but got {}", t.kind),
      Self::ExpectedType(t) => format!("expected type but got {}", t.kind),
      Self::ExpectedAssignment(t) => {
        format!("expected `=` or `:=` after a list of expressions but got {}", t.kind)
      }
      Self::UnknownCharacter(_) => "got unknown character".into(),
      Self::UnterminatedString(_) => "missing closing quote for string".into(),
      Self::UnterminatedComment(_) => "missing closing `*/` for comment".into(),
      Self::InvalidEscape(_) => "string contains an unknown escape sequence".into(),
      Self::MixedParameters(_) => "either all parameters are named, or none are".into(),
      Self::MissingParameterType(_) => "the last parameter in a list must have a type".into(),
      Self::ReturnOutsideFunction(_) => "can only return a value from a function".into(),
      Self::DeclarationNotAllowed(t) => {
        format!("`{}` declarations are only allowed at the top level", t.kind)
      }
    }
  }

  /// The title and message of the error in a combined string
  #[must_use]
  pub fn full_message(&self) -> String {
    let mut message = self.title();
    message.push('\n');
    message.push_str(&self.message());
    message
  }

  /// The location of the error
  pub fn span(&self) -> Span {
    match self {
      Self::Expected { received, .. } => received.into(),
      Self::ExpectedExpression(token)
      | Self::ExpectedType(token)
      | Self::ExpectedAssignment(token)
      | Self::UnknownCharacter(token)
      | Self::UnterminatedString(token)
      | Self::UnterminatedComment(token)
      | Self::InvalidEscape(token)
      | Self::MixedParameters(token)
      | Self::MissingParameterType(token)
      | Self::ReturnOutsideFunction(token)
      | Self::DeclarationNotAllowed(token) => token.into(),
    }
  }
}
impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message())
  }
}
impl error::Error for ParseError {}
