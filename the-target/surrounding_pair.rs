//! Surrounding pair matching.
//!
//! Delimiters are found by scanning text (there is no parse tree). Finding
//! the pair around a selection runs a two-way balance scan over a window
//! that grows around the selection:
//!
//! ```text
//!   f(a, [b|], c)      scan right for an unmatched closer: `]`
//!        ^             scan left for an unmatched `[`: found, done
//! ```
//!
//! If the left scan meets nothing usable the right scan moves on to the
//! next unmatched closer. String literals and line comments found on each
//! line are barriers: the search first runs inside the fragment holding
//! the selection, and delimiters inside other fragments are ignored.

pub mod containment;
pub mod delimiters;
pub mod fragments;
mod matcher;
mod pairs;
pub mod scanner;

use crate::{
  config::{
    EngineConfig,
    SurroundingPairConfig,
  },
  document::TextDocument,
  error::Result,
  range::Range,
  scope_type::{
    SurroundingPairDirection,
    SurroundingPairName,
  },
  surrounding_pair::{
    delimiters::individual_delimiters,
    fragments::TextFragments,
    matcher::{
      OccurrencePair,
      find_surrounding_pair_core,
    },
    scanner::DelimiterScanner,
  },
  target::Target,
};

/// A pair found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairMatch {
  pub name:  SurroundingPairName,
  pub left:  Range,
  pub right: Range,
}

impl PairMatch {
  /// Both delimiters and everything between them.
  pub fn content_range(&self) -> Range {
    Range::new(self.left.start, self.right.end)
  }

  pub fn interior_range(&self) -> Range {
    Range::new(self.left.end, self.right.start)
  }

  pub fn to_target(&self, is_reversed: bool) -> Target {
    Target::surrounding_pair(
      self.content_range(),
      self.interior_range(),
      [self.left, self.right],
      is_reversed,
    )
  }
}

/// Finds pairs of one (possibly compound) delimiter name in documents of
/// one language.
#[derive(Debug, Clone)]
pub struct SurroundingPairFinder {
  acceptable:    Vec<SurroundingPairName>,
  scanner:       DelimiterScanner,
  quotes:        DelimiterScanner,
  line_comments: Vec<String>,
  limits:        SurroundingPairConfig,
}

impl SurroundingPairFinder {
  pub fn new(
    config: &EngineConfig,
    language_id: &str,
    delimiter: SurroundingPairName,
  ) -> Result<Self> {
    let quotes = individual_delimiters(SurroundingPairName::String, language_id)
      .into_iter()
      .filter(|delimiter| delimiter.single_line)
      .collect();
    Ok(Self {
      acceptable:    delimiter.expand(),
      scanner:       DelimiterScanner::new(individual_delimiters(delimiter, language_id))?,
      quotes:        DelimiterScanner::new(quotes)?,
      line_comments: config.line_comments(language_id),
      limits:        config.surrounding_pair,
    })
  }

  /// The nearest pair around `selection`, searching the string or comment
  /// holding the selection first.
  pub fn find(
    &self,
    document: &dyn TextDocument,
    selection: Range,
    force_direction: Option<SurroundingPairDirection>,
    require_strong_containment: bool,
  ) -> Option<PairMatch> {
    let search = Search {
      finder: self,
      document,
      fragments: TextFragments::new(document, &self.quotes, &self.line_comments),
      selection,
      selected: (document.offset_at(selection.start), document.offset_at(selection.end)),
      force_direction,
      require_strong_containment,
    };

    search
      .fragments
      .containing(selection)
      .and_then(|fragment| search.find_in(document.validate_range(fragment)))
      .or_else(|| search.find_in(document.range()))
  }

  /// Every pair in the document, in order of their left delimiters.
  pub fn pairs(&self, document: &dyn TextDocument) -> Vec<PairMatch> {
    pairs::document_pairs(document, &self.scanner)
  }
}

/// One containing-pair search.
struct Search<'a> {
  finder:                     &'a SurroundingPairFinder,
  document:                   &'a dyn TextDocument,
  fragments:                  TextFragments,
  selection:                  Range,
  /// The selection as document offsets.
  selected:                   (usize, usize),
  force_direction:            Option<SurroundingPairDirection>,
  require_strong_containment: bool,
}

impl Search<'_> {
  fn find_in(&self, allowable: Range) -> Option<PairMatch> {
    let limits = &self.finder.limits;
    let full = (
      self.document.offset_at(allowable.start),
      self.document.offset_at(allowable.end),
    );
    let factor = limits.expansion_factor.max(2);

    let mut scan_length = limits.initial_scan_length.max(2);
    while scan_length < limits.max_scan_length {
      let half = scan_length / 2;
      let window = (
        full.0.max(self.selected.1.saturating_sub(half)),
        full.1.min(self.selected.1 + half),
      );
      let window_range = Range::new(
        self.document.position_at(window.0),
        self.document.position_at(window.1),
      );

      if window_range.contains_range(&self.selection) {
        let found = self.find_in_window(window, full);
        if found.is_some() {
          tracing::trace!(selection = ?self.selection, ?found, "found surrounding pair");
          return found;
        }
      }

      if window_range.contains_range(&allowable) {
        return None;
      }
      scan_length *= factor;
    }

    tracing::debug!(
      selection = ?self.selection,
      max_scan_length = limits.max_scan_length,
      "surrounding pair scan hit the window limit"
    );
    None
  }

  fn to_range(&self, base: usize, start: usize, end: usize) -> Range {
    Range::new(
      self.document.position_at(base + start),
      self.document.position_at(base + end),
    )
  }

  fn find_in_window(&self, window: (usize, usize), full: (usize, usize)) -> Option<PairMatch> {
    let text = self.document.text_in(self.to_range(window.0, 0, window.1 - window.0));
    let occurrences: Vec<_> = self
      .finder
      .scanner
      .scan(&text, self.force_direction)
      .into_iter()
      .filter(|occurrence| {
        let range = self.to_range(window.0, occurrence.start, occurrence.end);
        !self.fragments.is_shadowed(range, self.selection)
      })
      .collect();

    let OccurrencePair { left, right } = find_surrounding_pair_core(
      &occurrences,
      &self.finder.acceptable,
      (self.selected.0 - window.0, self.selected.1 - window.0),
      self.require_strong_containment,
    )?;

    // A delimiter at a cut edge of the window may be half of a longer one.
    let cut_start = window.0 != full.0 && left.start == 0;
    let cut_end = window.1 != full.1 && right.end == window.1 - window.0;
    if cut_start || cut_end {
      return None;
    }

    Some(PairMatch {
      name:  left.name,
      left:  self.to_range(window.0, left.start, left.end),
      right: self.to_range(window.0, right.start, right.end),
    })
  }
}
