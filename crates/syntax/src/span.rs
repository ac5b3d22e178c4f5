//! Positions in source code, and turning them into line numbers.

use std::fmt;

/// A range of bytes in the source code
#[must_use]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
  /// Offset of the first byte
  pub start: u32,
  /// Offset after the last byte
  pub end: u32,
}
impl Span {
  /// A span between two byte offsets
  #[inline]
  pub const fn new(start: u32, end: u32) -> Self {
    Self { start, end }
  }

  /// The smallest span covering both spans.
  ///
  /// The default span is treated as unknown, so merging with it gives the other span.
  pub fn merge(self, other: Self) -> Self {
    match (self == Self::default(), other == Self::default()) {
      (true, _) => other,
      (_, true) => self,
      _ => Self::new(self.start.min(other.start), self.end.max(other.end)),
    }
  }

  /// The text the span covers, or an empty string if it is outside of the source
  #[must_use]
  pub fn source_text(self, source: &str) -> &str {
    source
      .get(self.start as usize..self.end as usize)
      .unwrap_or_default()
  }
}
impl fmt::Display for Span {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}", self.start, self.end)
  }
}

type LineNumber = usize;

/// The offsets lines start at, to find which line a [`Span`] is on.
///
/// Lines are numbered from 1.
#[must_use]
#[derive(Debug)]
pub struct LineIndex {
  line_starts: Vec<u32>,
  length: u32,
}
impl LineIndex {
  /// Finds the start of each line in the source
  pub fn from_source(source: &str) -> Self {
    let offset = |index: usize| u32::try_from(index).unwrap_or(u32::MAX);

    let line_starts = std::iter::once(0)
      .chain(
        (source.bytes().enumerate())
          .filter(|(_, byte)| *byte == b'\n')
          .map(|(index, _)| offset(index + 1)),
      )
      .collect();

    Self {
      line_starts,
      length: offset(source.len()),
    }
  }

  fn line_of(&self, offset: u32) -> LineNumber {
    self.line_starts.partition_point(|start| *start <= offset)
  }

  /// The line the span starts on
  #[must_use]
  pub fn line(&self, span: Span) -> LineNumber {
    self.line_of(span.start)
  }

  /// The line the span ends on
  #[must_use]
  pub fn final_line(&self, span: Span) -> LineNumber {
    self.line_of(span.end)
  }

  /// The span of a whole line, including its newline
  pub fn line_span(&self, line: LineNumber) -> Span {
    let start = (line.checked_sub(1))
      .and_then(|index| self.line_starts.get(index))
      .copied()
      .unwrap_or(self.length);
    let end = self.line_starts.get(line).copied().unwrap_or(self.length);

    Span::new(start, end)
  }
}
