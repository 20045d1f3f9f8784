//! Edit batches.
//!
//! An [`Edit`] replaces a document range with new text. Batches are
//! validated and normalized with [`normalize_edits`] before anything is
//! applied: removals that overlap are merged, while an overlap involving
//! inserted text is rejected so that the document stays untouched.

use crate::{
  Tendril,
  error::EditError,
  position::Position,
  range::Range,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
  pub range:      Range,
  pub text:       Tendril,
  /// Replacements keep empty tracked ranges at the insertion point *after*
  /// the new text rather than before it.
  pub is_replace: bool,
}

impl Edit {
  pub fn new(range: Range, text: impl Into<Tendril>) -> Self {
    Self {
      range,
      text: text.into(),
      is_replace: false,
    }
  }

  pub fn insert(position: Position, text: impl Into<Tendril>) -> Self {
    Self::new(Range::empty(position), text)
  }

  pub fn delete(range: Range) -> Self {
    Self::new(range, "")
  }

  pub fn replace(range: Range, text: impl Into<Tendril>) -> Self {
    Self {
      is_replace: true,
      ..Self::new(range, text)
    }
  }
}

/// A change as applied to a document, reported in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
  /// The replaced range, in coordinates of the document before the batch.
  pub range:        Range,
  pub range_offset: usize,
  pub range_length: usize,
  pub text:         Tendril,
  pub is_replace:   bool,
}

fn overlaps(a: &Range, b: &Range) -> bool {
  a.start < b.end && b.start < a.end
}

/// Sorts `edits` by start position, last first, merging overlapping
/// removals. Edits sharing a start position keep their relative order once
/// applied back to front, so text inserted at the same point reads in
/// submission order.
pub fn normalize_edits(edits: &[Edit]) -> Result<Vec<Edit>, EditError> {
  let mut sorted: Vec<(usize, &Edit)> = edits.iter().enumerate().collect();
  sorted.sort_by(|(ia, a), (ib, b)| {
    b.range
      .start
      .cmp(&a.range.start)
      .then(b.range.end.cmp(&a.range.end))
      .then(ib.cmp(ia))
  });

  let mut normalized: Vec<Edit> = Vec::with_capacity(sorted.len());
  for (_, edit) in sorted {
    let mut current = edit.clone();
    while let Some(last) = normalized.last() {
      if !overlaps(&current.range, &last.range) {
        break;
      }
      if !current.text.is_empty() || !last.text.is_empty() {
        return Err(EditError::OverlappingRanges {
          first:  current.range,
          second: last.range,
        });
      }
      current.range = current.range.union(&last.range);
      normalized.pop();
    }
    normalized.push(current);
  }

  Ok(normalized)
}

#[cfg(test)]
mod test {
  use super::*;

  fn r(a: usize, b: usize) -> Range {
    Range::from_coords(0, a, 0, b)
  }

  #[test]
  fn test_sorted_descending() {
    let edits = [Edit::delete(r(0, 1)), Edit::insert(Position::new(0, 5), "x")];
    let normalized = normalize_edits(&edits).unwrap();
    assert_eq!(normalized[0].range, r(5, 5));
    assert_eq!(normalized[1].range, r(0, 1));
  }

  #[test]
  fn test_overlapping_removals_merge() {
    let edits = [
      Edit::delete(r(0, 10)),
      Edit::delete(r(2, 3)),
      Edit::delete(r(5, 6)),
      Edit::delete(r(12, 14)),
    ];
    let normalized = normalize_edits(&edits).unwrap();
    assert_eq!(normalized.len(), 2);
    assert_eq!(normalized[0].range, r(12, 14));
    assert_eq!(normalized[1].range, r(0, 10));
  }

  #[test]
  fn test_touching_edits_do_not_overlap() {
    let edits = [Edit::new(r(0, 3), "a"), Edit::new(r(3, 5), "b")];
    assert_eq!(normalize_edits(&edits).unwrap().len(), 2);
  }

  #[test]
  fn test_overlapping_insertion_fails() {
    let edits = [Edit::delete(r(0, 4)), Edit::new(r(2, 6), "x")];
    assert!(matches!(
      normalize_edits(&edits),
      Err(EditError::OverlappingRanges { .. })
    ));

    let inside = [Edit::delete(r(0, 4)), Edit::insert(Position::new(0, 2), "y")];
    assert!(normalize_edits(&inside).is_err());
  }

  #[test]
  fn test_same_point_insertions_keep_order() {
    let edits = [
      Edit::insert(Position::new(0, 2), "a"),
      Edit::insert(Position::new(0, 2), "b"),
    ];
    let normalized = normalize_edits(&edits).unwrap();
    assert_eq!(normalized[0].text, "b");
    assert_eq!(normalized[1].text, "a");
  }
}
