use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

use crate::range::Range;

/// A point in a document. Both coordinates are zero based and `character`
/// counts UTF-16 code units, so positions never depend on the line ending
/// style of the document.
#[derive(
  Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
  pub line:      usize,
  pub character: usize,
}

impl Position {
  pub const fn new(line: usize, character: usize) -> Self {
    Self { line, character }
  }

  pub const fn zero() -> Self {
    Self::new(0, 0)
  }

  pub const fn with_line(self, line: usize) -> Self {
    Self::new(line, self.character)
  }

  pub const fn with_character(self, character: usize) -> Self {
    Self::new(self.line, character)
  }

  /// Moves the position by the given deltas, saturating at zero.
  pub fn translate(self, line_delta: isize, character_delta: isize) -> Self {
    Self::new(
      self.line.saturating_add_signed(line_delta),
      self.character.saturating_add_signed(character_delta),
    )
  }

  pub const fn to_empty_range(self) -> Range {
    Range::empty(self)
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.line, self.character)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_ordering() {
    assert!(Position::new(0, 5) < Position::new(1, 0));
    assert!(Position::new(2, 1) < Position::new(2, 3));
    assert_eq!(Position::new(3, 3).max(Position::new(3, 2)), Position::new(3, 3));
  }

  #[test]
  fn test_translate_saturates() {
    assert_eq!(Position::new(1, 2).translate(-3, 4), Position::new(0, 6));
    assert_eq!(Position::new(1, 2).translate(1, -5), Position::new(2, 0));
  }
}
