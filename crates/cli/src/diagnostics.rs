use chicklet_interpreter::{CompileError, RuntimeError};
use chicklet_syntax::{LineIndex, ParseError, Span};
use owo_colors::{OwoColorize, Style};
use std::fmt;

#[derive(Debug)]
pub enum Severity {
  Error,
  Warning,
}
pub struct Message {
  pub title: String,
  pub body: String,
  pub severity: Severity,
}
impl Message {
  pub fn error(message: String) -> Self {
    Self {
      title: message,
      body: String::new(),
      severity: Severity::Error,
    }
  }
  pub fn warning(message: String) -> Self {
    Self {
      title: message,
      body: String::new(),
      severity: Severity::Warning,
    }
  }
}
impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.severity {
      Severity::Error => write!(f, "{}", "✕ Error".bold().red()),
      Severity::Warning => write!(f, "{}", "⚠ Warning".bold().yellow()),
    }?;
    writeln!(f, "{} {}", ":".bold(), &self.title.bold())?;

    if !self.body.is_empty() {
      writeln!(f, "{}", &self.body)?;
    }

    Ok(())
  }
}

/// An error which can be shown to the user, pointing to where it happened
pub trait Diagnostic {
  fn title(&self) -> String;
  fn message(&self) -> String;
  fn span(&self) -> Span;
}
impl Diagnostic for ParseError {
  fn title(&self) -> String {
    ParseError::title(self)
  }
  fn message(&self) -> String {
    ParseError::message(self)
  }
  fn span(&self) -> Span {
    ParseError::span(self)
  }
}
impl Diagnostic for CompileError {
  fn title(&self) -> String {
    CompileError::title(self).to_owned()
  }
  fn message(&self) -> String {
    CompileError::message(self)
  }
  fn span(&self) -> Span {
    CompileError::span(self)
  }
}
impl Diagnostic for RuntimeError {
  fn title(&self) -> String {
    RuntimeError::title(self).to_owned()
  }
  fn message(&self) -> String {
    RuntimeError::message(self)
  }
  fn span(&self) -> Span {
    RuntimeError::span(self)
  }
}
impl<T: Diagnostic> From<&T> for Message {
  fn from(error: &T) -> Self {
    Self {
      title: error.title(),
      body: error.message(),
      severity: Severity::Error,
    }
  }
}

pub struct CodeFrame<'a> {
  title: &'a str,
  source: &'a str,
  span: Span,

  lines: LineIndex,
}
impl<'a> CodeFrame<'a> {
  pub fn new(title: &'a str, source: &'a str, span: Span) -> Self {
    Self {
      title: if title == "-" { "STDIN" } else { title },
      source,
      span,
      lines: LineIndex::from_source(source),
    }
  }
}
impl fmt::Display for CodeFrame<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let start_line = self.lines.line(self.span).max(1);
    let end_line = self.lines.final_line(self.span).max(start_line);

    writeln!(
      f,
      "    {}{}{}{}{}",
      "╭─[".dimmed(),
      self.title,
      ":".dimmed(),
      start_line,
      "]".dimmed()
    )?;

    for line in start_line..=end_line {
      let line_text = (self.lines.line_span(line).source_text(self.source))
        .trim_end_matches(['\n', '\r']);
      write!(f, "{line:>3} {}", "│".dimmed())?;
      if !line_text.is_empty() {
        write!(f, " ")?;
      }
      highlight_source(f, line_text)?;
      writeln!(f)?;
    }

    write!(f, "{}", "────╯".dimmed())
  }
}

pub fn highlight_source(output: &mut dyn fmt::Write, source: &str) -> fmt::Result {
  use chicklet_syntax::{TokenKind, tokenise};

  let mut last = 0;
  for token in tokenise(source) {
    // if there is a gap between tokens, add spaces for the gap
    if token.start > last {
      for _ in 0..(token.start - last) {
        write!(output, " ")?;
      }
    }

    let style = match token.kind {
      TokenKind::Integer | TokenKind::Float => Style::new().blue(),
      TokenKind::String | TokenKind::RawString | TokenKind::UnterminatedString => {
        Style::new().green()
      }
      TokenKind::Var | TokenKind::Const | TokenKind::Type | TokenKind::Func => {
        Style::new().magenta()
      }
      kind if kind.is_keyword() => Style::new().cyan(),
      TokenKind::Comment | TokenKind::UnterminatedComment => Style::new().dimmed(),
      _ => Style::new(),
    };
    let token_text = Span::from(token).source_text(source);
    write!(output, "{}", token_text.style(style))?;

    last = token.start + token.length;
  }

  Ok(())
}
