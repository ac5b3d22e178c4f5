use crate::span::Span;
use std::{fmt, iter};

/// Convert a string of source code into an [Iterator] of [Token]s
///
/// Newlines are only emitted as [`TokenKind::EndOfLine`] when the previous token
/// could end a statement, so the parser can treat them exactly like `;`.
pub struct Tokeniser<'source> {
  /// The source code to tokenise
  source: &'source [u8],
  /// The current position in the source code
  position: usize,
  /// Would a newline at this point end the statement?
  insert_terminator: bool,
}
impl<'source> From<&'source str> for Tokeniser<'source> {
  /// Create a new [Tokeniser] from a source code string
  ///
  /// # Panics
  /// Panics if the length of the source code is greater than `u32::MAX`
  fn from(value: &'source str) -> Self {
    assert!(value.len() < u32::MAX as usize);

    Self {
      source: value.as_ref(),
      position: 0,
      insert_terminator: false,
    }
  }
}
impl Tokeniser<'_> {
  /// Has the end of the source code been reached?
  fn is_end(&self, position: usize) -> bool {
    position >= self.source.len()
  }

  /// Get the next token from the source code
  fn get_next_token(&mut self) -> (TokenKind, usize) {
    if self.is_end(self.position) {
      return (TokenKind::EndOfFile, 0);
    }

    let character = &self.source[self.position];
    let next_character = self.source.get(self.position + 1);

    match character {
      // Whitespace + Comments
      b' ' | b'\r' | b'\t' => {
        self.position += 1;
        self.get_next_token()
      }
      b'\n' if self.insert_terminator => (TokenKind::EndOfLine, 1),
      b'\n' => {
        self.position += 1;
        self.get_next_token()
      }
      b'/' if matches!(next_character, Some(b'/')) => self.line_comment(),
      b'/' if matches!(next_character, Some(b'*')) => self.block_comment(),

      // Values
      b'"' => self.string(),
      b'`' => self.raw_string(),
      b'0'..=b'9' => self.number(),
      b'.' if matches!(next_character, Some(b'0'..=b'9')) => self.number(),
      b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.identifier(),

      // Brackets + Separators
      b'(' => (TokenKind::LeftParen, 1),
      b')' => (TokenKind::RightParen, 1),
      b'{' => (TokenKind::LeftCurly, 1),
      b'}' => (TokenKind::RightCurly, 1),
      b',' => (TokenKind::Comma, 1),
      b';' => (TokenKind::Semicolon, 1),
      b'.' => (TokenKind::Dot, 1),

      // Logical Operators
      b'&' if matches!(next_character, Some(b'&')) => (TokenKind::And, 2),
      b'|' if matches!(next_character, Some(b'|')) => (TokenKind::Or, 2),

      // Assignment
      b':' if matches!(next_character, Some(b'=')) => (TokenKind::ColonEqual, 2),
      b'+' if matches!(next_character, Some(b'=')) => (TokenKind::PlusEqual, 2),
      b'-' if matches!(next_character, Some(b'=')) => (TokenKind::MinusEqual, 2),
      b'*' if matches!(next_character, Some(b'=')) => (TokenKind::StarEqual, 2),
      b'/' if matches!(next_character, Some(b'=')) => (TokenKind::SlashEqual, 2),
      b'%' if matches!(next_character, Some(b'=')) => (TokenKind::PercentEqual, 2),
      b'+' if matches!(next_character, Some(b'+')) => (TokenKind::PlusPlus, 2),
      b'-' if matches!(next_character, Some(b'-')) => (TokenKind::MinusMinus, 2),

      // Operators
      b'+' => (TokenKind::Plus, 1),
      b'-' => (TokenKind::Minus, 1),
      b'/' => (TokenKind::Slash, 1),
      b'*' => (TokenKind::Star, 1),
      b'%' => (TokenKind::Percent, 1),

      // Equalities
      b'!' if matches!(next_character, Some(b'=')) => (TokenKind::BangEqual, 2),
      b'=' if matches!(next_character, Some(b'=')) => (TokenKind::EqualEqual, 2),
      b'<' if matches!(next_character, Some(b'=')) => (TokenKind::LessEqual, 2),
      b'>' if matches!(next_character, Some(b'=')) => (TokenKind::GreaterEqual, 2),
      b'!' => (TokenKind::Bang, 1),
      b'=' => (TokenKind::Equal, 1),
      b'<' => (TokenKind::Less, 1),
      b'>' => (TokenKind::Greater, 1),

      // Unknown character
      x if (x & 0b1111_0000) == 0b1111_0000 => (TokenKind::Unknown, 4),
      x if (x & 0b1110_0000) == 0b1110_0000 => (TokenKind::Unknown, 3),
      x if (x & 0b1100_0000) == 0b1100_0000 => (TokenKind::Unknown, 2),
      _ => (TokenKind::Unknown, 1),
    }
  }

  /// Skip to the end of a line comment (a newline)
  fn line_comment(&self) -> (TokenKind, usize) {
    let length = self.source[self.position..]
      .iter()
      .take_while(|c| **c != b'\n')
      .count();

    (TokenKind::Comment, length)
  }

  /// Skip to the closing `*/` of a block comment
  ///
  /// A block comment which spans lines acts as a newline.
  fn block_comment(&self) -> (TokenKind, usize) {
    let mut position = self.position + 2;

    loop {
      if self.is_end(position + 1) {
        break (TokenKind::UnterminatedComment, self.source.len() - self.position);
      }
      if self.source[position] == b'*' && self.source[position + 1] == b'/' {
        let length = position + 2 - self.position;
        let has_newline = self.source[self.position..position].contains(&b'\n');

        if has_newline && self.insert_terminator {
          break (TokenKind::EndOfLine, length);
        }
        break (TokenKind::Comment, length);
      }

      position += 1;
    }
  }

  /// Go to the end of a string token, the closing quote
  fn string(&self) -> (TokenKind, usize) {
    let mut position = self.position + 1;

    loop {
      if self.is_end(position) || self.source[position] == b'\n' {
        break (TokenKind::UnterminatedString, position - self.position);
      }

      match self.source[position] {
        b'"' => break (TokenKind::String, position - self.position + 1),
        b'\\' if !self.is_end(position + 1) && self.source[position + 1] != b'\n' => position += 2,
        _ => position += 1,
      }
    }
  }

  /// Go to the end of a raw string, which can span multiple lines
  fn raw_string(&self) -> (TokenKind, usize) {
    match self.source[self.position + 1..]
      .iter()
      .position(|c| *c == b'`')
    {
      Some(length) => (TokenKind::RawString, length + 2),
      None => (TokenKind::UnterminatedString, self.source.len() - self.position),
    }
  }

  fn digits(&self, position: usize, hex: bool) -> usize {
    self.source[position..]
      .iter()
      .take_while(|c| c.is_ascii_digit() || **c == b'_' || (hex && c.is_ascii_hexdigit()))
      .count()
  }

  /// Get a number token, an integer (decimal or hex) or a float with optional exponent
  fn number(&self) -> (TokenKind, usize) {
    let source = self.source;
    let mut position = self.position;

    if source[position] == b'0' && matches!(source.get(position + 1), Some(b'x' | b'X')) {
      position += 2;
      position += self.digits(position, true);
      return (TokenKind::Integer, position - self.position);
    }

    let mut kind = TokenKind::Integer;
    position += self.digits(position, false);

    if source.get(position) == Some(&b'.') {
      kind = TokenKind::Float;
      position += 1;
      position += self.digits(position, false);
    }

    if matches!(source.get(position), Some(b'e' | b'E')) {
      let sign = usize::from(matches!(source.get(position + 1), Some(b'+' | b'-')));
      let exponent = self.digits(position + 1 + sign, false);

      if exponent > 0 {
        kind = TokenKind::Float;
        position += 1 + sign + exponent;
      }
    }

    (kind, position - self.position)
  }

  /// Get an identifier token, a sequence of [a-zA-Z0-9_]
  fn identifier(&self) -> (TokenKind, usize) {
    let length = self.source[self.position..]
      .iter()
      .take_while(|c| c.is_ascii_alphanumeric() || **c == b'_')
      .count();

    (self.identifier_type(length), length)
  }

  /// Determines the type of the identifier, is it a keyword or a standard identifier
  fn identifier_type(&self, length: usize) -> TokenKind {
    match self.source[self.position] {
      b'b' if self.is_keyword(length, "break") => TokenKind::Break,
      b'c' if self.is_keyword(length, "const") => TokenKind::Const,
      b'c' if self.is_keyword(length, "continue") => TokenKind::Continue,
      b'e' if self.is_keyword(length, "else") => TokenKind::Else,
      b'f' if self.is_keyword(length, "for") => TokenKind::For,
      b'f' if self.is_keyword(length, "func") => TokenKind::Func,
      b'i' if self.is_keyword(length, "if") => TokenKind::If,
      b'i' if self.is_keyword(length, "import") => TokenKind::Import,
      b'p' if self.is_keyword(length, "package") => TokenKind::Package,
      b'r' if self.is_keyword(length, "return") => TokenKind::Return,
      b't' if self.is_keyword(length, "type") => TokenKind::Type,
      b'v' if self.is_keyword(length, "var") => TokenKind::Var,
      _ => TokenKind::Identifier,
    }
  }

  /// Checks if the source of the current token is equal to a keyword
  fn is_keyword(&self, length: usize, keyword: &'static str) -> bool {
    let end = self.position + length;
    &self.source[self.position..end] == keyword.as_bytes()
  }
}
impl Iterator for Tokeniser<'_> {
  type Item = Token;

  fn next(&mut self) -> Option<Self::Item> {
    let (kind, len) = self.get_next_token();
    if kind == TokenKind::EndOfFile {
      return None;
    }

    let start = self.position;
    self.position += len;

    match kind {
      TokenKind::Comment => {}
      TokenKind::EndOfLine => self.insert_terminator = false,
      kind => self.insert_terminator = kind.ends_statement(),
    }

    Some(Token {
      kind,
      start: u32::try_from(start).unwrap_or(u32::MAX),
      length: u32::try_from(self.position - start).unwrap_or(u32::MAX),
    })
  }
}
impl iter::FusedIterator for Tokeniser<'_> {}

/// A Token of source code, a lexeme of the language
///
/// With the type of token, start position and length of the token in the source code
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Token {
  /// The type of the token
  pub kind: TokenKind,
  /// Byte offset of the start of the token
  pub start: u32,
  /// Length of the token in bytes
  pub length: u32,
}
impl From<Token> for Span {
  fn from(token: Token) -> Self {
    Self {
      start: token.start,
      end: token.start + token.length,
    }
  }
}
impl From<&Token> for Span {
  fn from(token: &Token) -> Self {
    Self::from(*token)
  }
}

/// The type of a token
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub enum TokenKind {
  // Brackets
  /// `(`
  LeftParen,
  /// `)`
  RightParen,
  /// `{`
  LeftCurly,
  /// `}`
  RightCurly,

  // Separators
  /// `,`
  Comma,
  /// `;`
  Semicolon,
  /// `.`
  Dot,

  // Operators
  /// `-`
  Minus,
  /// `+`
  Plus,
  /// `/`
  Slash,
  /// `*`
  Star,
  /// `%`
  Percent,
  /// `!`
  Bang,
  /// `&&`
  And,
  /// `||`
  Or,
  /// `++`
  PlusPlus,
  /// `--`
  MinusMinus,

  // Assignment
  /// `=`
  Equal,
  /// `:=`
  ColonEqual,
  /// `+=`
  PlusEqual,
  /// `-=`
  MinusEqual,
  /// `*=`
  StarEqual,
  /// `/=`
  SlashEqual,
  /// `%=`
  PercentEqual,

  // Comparators
  /// `!=`
  BangEqual,
  /// `==`
  EqualEqual,
  /// `>`
  Greater,
  /// `>=`
  GreaterEqual,
  /// `<`
  Less,
  /// `<=`
  LessEqual,

  // Values
  /// A identifier for a variable, a sequence of [a-zA-Z0-9_]
  Identifier,
  /// An integer, decimal or hexadecimal, with optional separators
  Integer,
  /// A floating point number, with a decimal point or exponent
  Float,
  /// A string between `"` with escape sequences
  String,
  /// A string between `` ` ``, with no escape sequences
  RawString,

  // Keywords
  /// `break`
  Break,
  /// `const`
  Const,
  /// `continue`
  Continue,
  /// `else`
  Else,
  /// `for`
  For,
  /// `func`
  Func,
  /// `if`
  If,
  /// `import`
  Import,
  /// `package`
  Package,
  /// `return`
  Return,
  /// `type`
  Type,
  /// `var`
  Var,

  // Whitespace + Comments
  /// A comment, either `//` to the end of the line or between `/*` and `*/`
  Comment,
  /// The end of a line which terminates a statement
  EndOfLine,
  /// A token to indicate the end of the file
  EndOfFile,

  // Error
  /// An unknown character, not known to fit in a [`TokenKind`]
  #[default]
  Unknown,
  /// A string where the end of the line or file has been reached, thus unterminated
  UnterminatedString,
  /// A block comment without a closing `*/`
  UnterminatedComment,
}
impl TokenKind {
  /// Does a newline after this token end the statement?
  #[must_use]
  pub fn ends_statement(self) -> bool {
    matches!(
      self,
      Self::Identifier
        | Self::Integer
        | Self::Float
        | Self::String
        | Self::RawString
        | Self::Break
        | Self::Continue
        | Self::Return
        | Self::PlusPlus
        | Self::MinusMinus
        | Self::RightParen
        | Self::RightCurly
    )
  }

  /// Is the token a keyword?
  #[must_use]
  pub fn is_keyword(self) -> bool {
    matches!(
      self,
      Self::Break
        | Self::Const
        | Self::Continue
        | Self::Else
        | Self::For
        | Self::Func
        | Self::If
        | Self::Import
        | Self::Package
        | Self::Return
        | Self::Type
        | Self::Var
    )
  }
}
impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      // Brackets
      Self::LeftParen => write!(f, "("),
      Self::RightParen => write!(f, ")"),
      Self::LeftCurly => write!(f, "{{"),
      Self::RightCurly => write!(f, "}}"),

      // Separators
      Self::Comma => write!(f, ","),
      Self::Semicolon => write!(f, ";"),
      Self::Dot => write!(f, "."),

      // Operators
      Self::Minus => write!(f, "-"),
      Self::Plus => write!(f, "+"),
      Self::Slash => write!(f, "/"),
      Self::Star => write!(f, "*"),
      Self::Percent => write!(f, "%"),
      Self::Bang => write!(f, "!"),
      Self::And => write!(f, "&&"),
      Self::Or => write!(f, "||"),
      Self::PlusPlus => write!(f, "++"),
      Self::MinusMinus => write!(f, "--"),

      // Assignment
      Self::Equal => write!(f, "="),
      Self::ColonEqual => write!(f, ":="),
      Self::PlusEqual => write!(f, "+="),
      Self::MinusEqual => write!(f, "-="),
      Self::StarEqual => write!(f, "*="),
      Self::SlashEqual => write!(f, "/="),
      Self::PercentEqual => write!(f, "%="),

      // Equalities
      Self::BangEqual => write!(f, "!="),
      Self::EqualEqual => write!(f, "=="),
      Self::Greater => write!(f, ">"),
      Self::GreaterEqual => write!(f, ">="),
      Self::Less => write!(f, "<"),
      Self::LessEqual => write!(f, "<="),

      // With Values
      Self::Identifier => write!(f, "Identifier"),
      Self::Integer => write!(f, "Integer"),
      Self::Float => write!(f, "Float"),
      Self::String | Self::RawString => write!(f, "String"),

      // Keywords
      Self::Break => write!(f, "break"),
      Self::Const => write!(f, "const"),
      Self::Continue => write!(f, "continue"),
      Self::Else => write!(f, "else"),
      Self::For => write!(f, "for"),
      Self::Func => write!(f, "func"),
      Self::If => write!(f, "if"),
      Self::Import => write!(f, "import"),
      Self::Package => write!(f, "package"),
      Self::Return => write!(f, "return"),
      Self::Type => write!(f, "type"),
      Self::Var => write!(f, "var"),

      // Whitespace + Comments
      Self::Comment => write!(f, "Comment"),
      Self::EndOfLine => write!(f, "New Line"),
      Self::EndOfFile => write!(f, "End of File"),

      // Errors
      Self::Unknown => write!(f, "Unknown Character"),
      Self::UnterminatedString => write!(f, "Unterminated String"),
      Self::UnterminatedComment => write!(f, "Unterminated Comment"),
    }
  }
}
