//! Finds delimiter occurrences in a piece of text.

use std::collections::HashMap;

use regex::Regex;
use the_core::text::Utf16Cursor;

use crate::{
  error::{
    Result,
    TargetError,
  },
  scope_type::{
    SurroundingPairDirection,
    SurroundingPairName,
  },
  surrounding_pair::delimiters::{
    DelimiterSide,
    IndividualDelimiter,
  },
};

/// A delimiter found in the text. Offsets are UTF-16 code units relative
/// to the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterOccurrence {
  pub start:       usize,
  pub end:         usize,
  pub name:        SurroundingPairName,
  /// Never [`DelimiterSide::Unknown`] once scanned.
  pub side:        DelimiterSide,
  pub single_line: bool,
}

#[derive(Debug, Clone)]
pub struct DelimiterScanner {
  regex:      Option<Regex>,
  delimiters: HashMap<String, IndividualDelimiter>,
}

impl DelimiterScanner {
  pub fn new(delimiters: Vec<IndividualDelimiter>) -> Result<Self> {
    let mut texts: Vec<&str> = delimiters
      .iter()
      .map(|delimiter| delimiter.text.as_str())
      .filter(|text| !text.is_empty())
      .collect();
    // Longest first, so `\"` wins over `"` and `'''` over `'`.
    texts.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    texts.dedup();

    let regex = if texts.is_empty() {
      None
    } else {
      let pattern = texts
        .iter()
        .map(|text| regex::escape(text))
        .collect::<Vec<_>>()
        .join("|");
      Some(Regex::new(&pattern).map_err(|err| TargetError::invalid_regex(&pattern, &err))?)
    };

    let delimiters = delimiters
      .into_iter()
      .map(|delimiter| (delimiter.text.clone(), delimiter))
      .collect();
    Ok(Self { regex, delimiters })
  }

  /// All occurrences in `text`, in order. Occurrences preceded by a
  /// backslash are skipped. Sides of ambiguous delimiters alternate within
  /// a line, starting with left, unless `force_direction` fixes them.
  pub fn scan(
    &self,
    text: &str,
    force_direction: Option<SurroundingPairDirection>,
  ) -> Vec<DelimiterOccurrence> {
    let Some(regex) = &self.regex else {
      return Vec::new();
    };

    let mut found: Vec<(usize, usize, &IndividualDelimiter)> = Vec::new();
    let mut at = 0;
    while let Some(m) = regex.find_at(text, at) {
      let escaped = m.start() > 0 && text.as_bytes()[m.start() - 1] == b'\\';
      if escaped {
        at = m.start()
          + text[m.start()..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        continue;
      }
      if let Some(delimiter) = self.delimiters.get(m.as_str()) {
        found.push((m.start(), m.end(), delimiter));
      }
      at = m.end();
    }

    let mut cursor = Utf16Cursor::new(text);
    let mut previous: HashMap<SurroundingPairName, (usize, DelimiterSide)> = HashMap::new();
    found
      .into_iter()
      .map(|(start, end, delimiter)| {
        let side = match (delimiter.side, force_direction) {
          (DelimiterSide::Unknown, Some(SurroundingPairDirection::Left)) => DelimiterSide::Left,
          (DelimiterSide::Unknown, Some(SurroundingPairDirection::Right)) => DelimiterSide::Right,
          (DelimiterSide::Unknown, None) => match previous.get(&delimiter.name) {
            Some(&(previous_end, previous_side)) if !text[previous_end..start].contains('\n') => {
              previous_side.opposite()
            },
            _ => DelimiterSide::Left,
          },
          (side, _) => side,
        };
        previous.insert(delimiter.name, (end, side));

        DelimiterOccurrence {
          start: cursor.to_utf16(start),
          end: cursor.to_utf16(end),
          name: delimiter.name,
          side,
          single_line: delimiter.single_line,
        }
      })
      .collect()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::surrounding_pair::delimiters::individual_delimiters;

  fn scanner(name: SurroundingPairName, language_id: &str) -> DelimiterScanner {
    DelimiterScanner::new(individual_delimiters(name, language_id)).unwrap()
  }

  fn summary(occurrences: &[DelimiterOccurrence]) -> Vec<(usize, DelimiterSide)> {
    occurrences
      .iter()
      .map(|occurrence| (occurrence.start, occurrence.side))
      .collect()
  }

  #[test]
  fn test_quote_sides_alternate_per_line() {
    let occurrences = scanner(SurroundingPairName::DoubleQuotes, "plaintext").scan("\"a\" \"b\n\"c", None);
    assert_eq!(
      summary(&occurrences),
      vec![
        (0, DelimiterSide::Left),
        (2, DelimiterSide::Right),
        (4, DelimiterSide::Left),
        (7, DelimiterSide::Left),
      ]
    );
  }

  #[test]
  fn test_escaped_delimiters_are_skipped() {
    let occurrences = scanner(SurroundingPairName::Any, "plaintext").scan(r#"(a \( b) \"x\""#, None);
    let texts: Vec<_> = occurrences
      .iter()
      .map(|occurrence| (occurrence.start, occurrence.end, occurrence.name))
      .collect();
    assert_eq!(
      texts,
      vec![
        (0, 1, SurroundingPairName::Parentheses),
        (3, 5, SurroundingPairName::EscapedParentheses),
        (7, 8, SurroundingPairName::Parentheses),
        (9, 11, SurroundingPairName::EscapedDoubleQuotes),
        (12, 14, SurroundingPairName::EscapedDoubleQuotes),
      ]
    );
  }

  #[test]
  fn test_forced_direction_and_utf16_offsets() {
    let occurrences = scanner(SurroundingPairName::SingleQuotes, "plaintext")
      .scan("😀'a' 'b'", Some(SurroundingPairDirection::Right));
    assert_eq!(
      summary(&occurrences),
      vec![
        (2, DelimiterSide::Right),
        (4, DelimiterSide::Right),
        (6, DelimiterSide::Right),
        (8, DelimiterSide::Right),
      ]
    );
  }
}
