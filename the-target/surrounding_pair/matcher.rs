//! Balance counting over delimiter occurrences.
//!
//! Offsets here are plain UTF-16 offsets into whatever text was scanned;
//! the caller maps them back into the document.

use std::collections::HashMap;

use crate::{
  direction::Direction,
  scope_type::SurroundingPairName,
  surrounding_pair::{
    delimiters::DelimiterSide,
    scanner::DelimiterOccurrence,
  },
};

/// A matched left and right delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrencePair {
  pub left:  DelimiterOccurrence,
  pub right: DelimiterOccurrence,
}

/// Walks occurrences from a starting index and yields the ones left
/// unmatched on the way. The set of acceptable names may change between
/// calls; a name's balance resets after each yield.
pub(crate) struct UnmatchedDelimiters<'a> {
  occurrences: &'a [DelimiterOccurrence],
  next:        Option<usize>,
  direction:   Direction,
  balances:    HashMap<SurroundingPairName, isize>,
}

impl<'a> UnmatchedDelimiters<'a> {
  /// `start` may be one past either end, in which case nothing is yielded.
  pub(crate) fn new(
    occurrences: &'a [DelimiterOccurrence],
    start: Option<usize>,
    direction: Direction,
  ) -> Self {
    Self {
      occurrences,
      next: start.filter(|&index| index < occurrences.len()),
      direction,
      balances: HashMap::new(),
    }
  }

  fn increment(&self, side: DelimiterSide) -> isize {
    match (self.direction, side) {
      (Direction::Forward, DelimiterSide::Left) | (Direction::Backward, DelimiterSide::Right) => 1,
      _ => -1,
    }
  }

  fn advance(&mut self) -> Option<DelimiterOccurrence> {
    let index = self.next?;
    self.next = match self.direction {
      Direction::Forward => Some(index + 1).filter(|&next| next < self.occurrences.len()),
      Direction::Backward => index.checked_sub(1),
    };
    self.occurrences.get(index).copied()
  }

  pub(crate) fn next_with(
    &mut self,
    acceptable: &[SurroundingPairName],
  ) -> Option<DelimiterOccurrence> {
    while let Some(occurrence) = self.advance() {
      if !acceptable.contains(&occurrence.name) {
        continue;
      }
      let increment = self.increment(occurrence.side);
      let balance = self.balances.entry(occurrence.name).or_insert(0);
      *balance += increment;
      if *balance == -1 {
        *balance = 0;
        return Some(occurrence);
      }
    }
    None
  }
}

/// The first unmatched delimiter of one of `acceptable` from `start`.
pub(crate) fn find_unmatched_delimiter(
  occurrences: &[DelimiterOccurrence],
  start: Option<usize>,
  acceptable: &[SurroundingPairName],
  direction: Direction,
) -> Option<DelimiterOccurrence> {
  UnmatchedDelimiters::new(occurrences, start, direction).next_with(acceptable)
}

/// Scans right for an unmatched closing delimiter, then left for the
/// opener of the same name, widening until the opener lies at or before
/// the selection.
pub(crate) fn find_delimiter_pair_containing_selection(
  occurrences: &[DelimiterOccurrence],
  initial_index: usize,
  acceptable: &[SurroundingPairName],
  selection: (usize, usize),
  require_strong_containment: bool,
) -> Option<OccurrencePair> {
  let mut rights = UnmatchedDelimiters::new(occurrences, Some(initial_index), Direction::Forward);
  let mut lefts = UnmatchedDelimiters::new(
    occurrences,
    initial_index.checked_sub(1),
    Direction::Backward,
  );

  loop {
    let right = rights.next_with(acceptable)?;
    let left = lefts.next_with(&[right.name])?;

    if left.start > selection.0 {
      continue;
    }
    if require_strong_containment && !(left.end <= selection.0 && right.start >= selection.1) {
      continue;
    }
    return Some(OccurrencePair { left, right });
  }
}

/// The pair around `selection`. A delimiter the selection sits on is
/// matched first unless strong containment is required.
pub(crate) fn find_surrounding_pair_core(
  occurrences: &[DelimiterOccurrence],
  acceptable: &[SurroundingPairName],
  selection: (usize, usize),
  require_strong_containment: bool,
) -> Option<OccurrencePair> {
  if !require_strong_containment {
    let touching = occurrences.iter().enumerate().filter(|(_, occurrence)| {
      acceptable.contains(&occurrence.name)
        && occurrence.start <= selection.0
        && occurrence.end >= selection.1
    });
    for (index, occurrence) in touching {
      let found = match occurrence.side {
        DelimiterSide::Left => find_unmatched_delimiter(
          occurrences,
          Some(index + 1),
          &[occurrence.name],
          Direction::Forward,
        )
        .map(|right| OccurrencePair {
          left: *occurrence,
          right,
        }),
        DelimiterSide::Right | DelimiterSide::Unknown => find_unmatched_delimiter(
          occurrences,
          index.checked_sub(1),
          &[occurrence.name],
          Direction::Backward,
        )
        .map(|left| OccurrencePair {
          left,
          right: *occurrence,
        }),
      };
      if found.is_some() {
        return found;
      }
    }
  }

  let initial_index = occurrences.partition_point(|occurrence| occurrence.start < selection.0);
  find_delimiter_pair_containing_selection(
    occurrences,
    initial_index,
    acceptable,
    selection,
    require_strong_containment,
  )
}
