//! Ranges and selections over document positions.
//!
//! A [`Range`] is always normalized (`start <= end`); direction lives in a
//! [`Selection`], which keeps the `anchor` where the selection began and
//! the `active` end the user moves.
//!
//! ```text
//! anchor=(0,2) active=(0,7): "he[llo w]orld"  (forward)
//! anchor=(0,7) active=(0,2): "he]llo w[orld"  (reversed)
//! ```

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

use crate::position::Position;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRange")]
pub struct Range {
  pub start: Position,
  pub end:   Position,
}

#[derive(Deserialize)]
struct RawRange {
  start: Position,
  end:   Position,
}

impl From<RawRange> for Range {
  fn from(raw: RawRange) -> Self {
    Range::new(raw.start, raw.end)
  }
}

impl Range {
  /// Creates a range between two positions given in any order.
  pub fn new(a: Position, b: Position) -> Self {
    if a <= b {
      Self { start: a, end: b }
    } else {
      Self { start: b, end: a }
    }
  }

  pub fn from_coords(
    start_line: usize,
    start_character: usize,
    end_line: usize,
    end_character: usize,
  ) -> Self {
    Self::new(
      Position::new(start_line, start_character),
      Position::new(end_line, end_character),
    )
  }

  pub const fn empty(position: Position) -> Self {
    Self {
      start: position,
      end:   position,
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  #[inline]
  pub fn is_single_line(&self) -> bool {
    self.start.line == self.end.line
  }

  /// Whether `position` lies within the range, bounds included.
  #[inline]
  pub fn contains(&self, position: Position) -> bool {
    self.start <= position && position <= self.end
  }

  /// Whether `position` lies strictly between the bounds.
  #[inline]
  pub fn strictly_contains(&self, position: Position) -> bool {
    self.start < position && position < self.end
  }

  #[inline]
  pub fn contains_range(&self, other: &Range) -> bool {
    self.start <= other.start && other.end <= self.end
  }

  /// The overlap of the two ranges. Touching ranges intersect in an empty
  /// range.
  pub fn intersection(&self, other: &Range) -> Option<Range> {
    let start = self.start.max(other.start);
    let end = self.end.min(other.end);
    (start <= end).then_some(Range { start, end })
  }

  /// The smallest range covering both ranges.
  pub fn union(&self, other: &Range) -> Range {
    Range {
      start: self.start.min(other.start),
      end:   self.end.max(other.end),
    }
  }

  pub fn with_start(self, start: Position) -> Range {
    Range::new(start, self.end)
  }

  pub fn with_end(self, end: Position) -> Range {
    Range::new(self.start, end)
  }

  pub fn to_selection(self, is_reversed: bool) -> Selection {
    if is_reversed {
      Selection::new(self.end, self.start)
    } else {
      Selection::new(self.start, self.end)
    }
  }
}

impl fmt::Display for Range {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}", self.start, self.end)
  }
}

/// A directed range as held by an editor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
  pub anchor: Position,
  pub active: Position,
}

impl Selection {
  pub const fn new(anchor: Position, active: Position) -> Self {
    Self { anchor, active }
  }

  pub const fn point(position: Position) -> Self {
    Self::new(position, position)
  }

  #[inline]
  pub fn is_reversed(&self) -> bool {
    self.anchor > self.active
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.active
  }

  pub fn start(&self) -> Position {
    self.anchor.min(self.active)
  }

  pub fn end(&self) -> Position {
    self.anchor.max(self.active)
  }

  pub fn range(&self) -> Range {
    Range::new(self.anchor, self.active)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_new_orders_bounds() {
    let range = Range::from_coords(2, 4, 1, 0);
    assert_eq!(range.start, Position::new(1, 0));
    assert_eq!(range.end, Position::new(2, 4));
  }

  #[test]
  fn test_intersection_and_union() {
    let a = Range::from_coords(0, 0, 0, 5);
    let b = Range::from_coords(0, 3, 0, 8);
    let c = Range::from_coords(0, 6, 0, 7);

    assert_eq!(a.intersection(&b), Some(Range::from_coords(0, 3, 0, 5)));
    assert_eq!(a.intersection(&c), None);
    assert_eq!(
      a.intersection(&Range::from_coords(0, 5, 0, 9)),
      Some(Range::from_coords(0, 5, 0, 5))
    );
    assert_eq!(a.union(&c), Range::from_coords(0, 0, 0, 7));
  }

  #[test]
  fn test_containment() {
    let range = Range::from_coords(1, 2, 1, 6);
    assert!(range.contains(Position::new(1, 2)));
    assert!(range.contains(Position::new(1, 6)));
    assert!(!range.strictly_contains(Position::new(1, 6)));
    assert!(range.contains_range(&Range::from_coords(1, 3, 1, 4)));
    assert!(!range.contains_range(&Range::from_coords(1, 1, 1, 4)));
  }

  #[test]
  fn test_selection_direction() {
    let selection = Range::from_coords(0, 1, 0, 4).to_selection(true);
    assert!(selection.is_reversed());
    assert_eq!(selection.anchor, Position::new(0, 4));
    assert_eq!(selection.range(), Range::from_coords(0, 1, 0, 4));
  }

  #[test]
  fn test_deserialize_normalizes() {
    let range: Range = serde_json::from_str(
      r#"{"start":{"line":3,"character":1},"end":{"line":0,"character":2}}"#,
    )
    .unwrap();
    assert_eq!(range, Range::from_coords(0, 2, 3, 1));
  }
}
