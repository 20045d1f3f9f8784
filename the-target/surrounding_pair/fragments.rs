//! String literals and line comments found line by line. A delimiter inside
//! one of these only pairs with delimiters inside the same fragment.

use the_core::text::{
  slice_utf16,
  utf16_len,
};

use crate::{
  document::TextDocument,
  range::Range,
  surrounding_pair::{
    containment::NestedRangeIndex,
    delimiters::DelimiterSide,
    scanner::{
      DelimiterOccurrence,
      DelimiterScanner,
    },
  },
};

#[derive(Debug, Clone, Default)]
pub struct TextFragments {
  index: NestedRangeIndex,
}

impl TextFragments {
  /// `quotes` should only know single-line quote delimiters.
  pub fn new(document: &dyn TextDocument, quotes: &DelimiterScanner, line_comments: &[String]) -> Self {
    let mut ranges = Vec::new();
    for line_number in 0..document.line_count() {
      let text = document.line_at(line_number).text;
      ranges.extend(
        line_fragments(&text, quotes, line_comments)
          .into_iter()
          .map(|fragment| match fragment {
            Fragment::String(start, end) => Range::from_coords(line_number, start, line_number, end),
            // Comments run through their line break, so a delimiter ending
            // the line is still inside.
            Fragment::Comment(start) => Range::from_coords(line_number, start, line_number + 1, 0),
          }),
      );
    }
    Self {
      index: NestedRangeIndex::new(ranges),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.index.is_empty()
  }

  /// The innermost fragment holding all of `range`.
  pub fn containing(&self, range: Range) -> Option<Range> {
    self.index.smallest_containing_range(range)
  }

  /// Whether `range` is hidden inside a fragment that `selection` is not in.
  pub fn is_shadowed(&self, range: Range, selection: Range) -> bool {
    self.index.is_shadowed(range, selection)
  }
}

fn comment_start(text: &str, from: usize, to: usize, line_comments: &[String]) -> Option<usize> {
  let window = slice_utf16(text, from, to);
  line_comments
    .iter()
    .filter(|prefix| !prefix.is_empty())
    .filter_map(|prefix| window.find(prefix.as_str()))
    .min()
    .map(|byte| from + utf16_len(&window[..byte]))
}

/// Bounds within one line, as UTF-16 offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fragment {
  String(usize, usize),
  Comment(usize),
}

fn line_fragments(text: &str, quotes: &DelimiterScanner, line_comments: &[String]) -> Vec<Fragment> {
  let len = utf16_len(text);
  let mut fragments = Vec::new();
  let mut open: Option<DelimiterOccurrence> = None;
  let mut searched_to = 0;

  for quote in quotes.scan(text, None) {
    match open {
      None => {
        if let Some(comment) = comment_start(text, searched_to, quote.start, line_comments) {
          fragments.push(Fragment::Comment(comment));
          return fragments;
        }
        if quote.side == DelimiterSide::Left {
          open = Some(quote);
        }
        searched_to = quote.end;
      },
      Some(opener) if opener.name == quote.name && quote.side == DelimiterSide::Right => {
        fragments.push(Fragment::String(opener.start, quote.end));
        open = None;
        searched_to = quote.end;
      },
      Some(_) => {},
    }
  }

  if open.is_none() {
    if let Some(comment) = comment_start(text, searched_to, len, line_comments) {
      fragments.push(Fragment::Comment(comment));
    }
  }
  fragments
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    document::InMemoryTextDocument,
    scope_type::SurroundingPairName,
    surrounding_pair::delimiters::individual_delimiters,
  };

  fn quotes() -> DelimiterScanner {
    let delimiters = individual_delimiters(SurroundingPairName::String, "rust")
      .into_iter()
      .filter(|delimiter| delimiter.single_line)
      .collect();
    DelimiterScanner::new(delimiters).unwrap()
  }

  #[test]
  fn test_strings_and_comments() {
    let comments = vec!["//".to_string()];
    assert_eq!(
      line_fragments(r#"f("a // b") // c's"#, &quotes(), &comments),
      vec![Fragment::String(2, 10), Fragment::Comment(12)]
    );
    assert_eq!(line_fragments("x = 'unterminated", &quotes(), &comments), Vec::new());
  }

  #[test]
  fn test_shadowing_across_document() {
    let document = InMemoryTextDocument::new("untitled:fragments", "rust", "(a \")\" b)\n// )");
    let fragments = TextFragments::new(&document, &quotes(), &["//".to_string()]);
    let inner_paren = Range::from_coords(0, 4, 0, 5);
    let cursor = Range::from_coords(0, 1, 0, 1);
    assert!(fragments.is_shadowed(inner_paren, cursor));
    assert!(!fragments.is_shadowed(inner_paren, Range::from_coords(0, 4, 0, 4)));
    assert!(fragments.is_shadowed(Range::from_coords(1, 3, 1, 4), cursor));
    assert_eq!(
      fragments.containing(Range::from_coords(0, 4, 0, 4)),
      Some(Range::from_coords(0, 3, 0, 6))
    );
  }
}
