//! Delimiter texts for each simple pair name, with per-language overrides.

use crate::scope_type::SurroundingPairName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelimiterSide {
  Left,
  Right,
  /// Same text opens and closes, like quotes.
  Unknown,
}

impl DelimiterSide {
  pub const fn opposite(self) -> Self {
    match self {
      Self::Left => Self::Right,
      Self::Right => Self::Left,
      Self::Unknown => Self::Unknown,
    }
  }
}

/// One delimiter text and what it delimits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndividualDelimiter {
  pub text:        String,
  pub name:        SurroundingPairName,
  pub side:        DelimiterSide,
  /// Pairs that never span a line break.
  pub single_line: bool,
}

struct PairSpec {
  left:        &'static [&'static str],
  right:       &'static [&'static str],
  single_line: bool,
  prefixes:    &'static [&'static str],
}

impl PairSpec {
  const fn new(left: &'static [&'static str], right: &'static [&'static str]) -> Self {
    Self {
      left,
      right,
      single_line: false,
      prefixes: &[],
    }
  }

  const fn single_line(mut self) -> Self {
    self.single_line = true;
    self
  }

  const fn with_prefixes(mut self, prefixes: &'static [&'static str]) -> Self {
    self.prefixes = prefixes;
    self
  }
}

const PYTHON_PREFIXES: &[&str] = &[
  "r", "u", "R", "U", "f", "F", "fr", "Fr", "fR", "FR", "rf", "rF", "Rf", "RF", "b", "B", "br",
  "Br", "bR", "BR", "rb", "rB", "Rb", "RB",
];

fn pair_spec(name: SurroundingPairName, language_id: &str) -> Option<PairSpec> {
  use SurroundingPairName::*;

  let overridden = match (language_id, name) {
    ("nix", SingleQuotes) => Some(PairSpec::new(&["''"], &["''"])),
    ("lua", DoubleQuotes) => Some(PairSpec::new(&["\"", "[["], &["\"", "]]"])),
    ("python", SingleQuotes) => Some(
      PairSpec::new(&["'"], &["'"])
        .single_line()
        .with_prefixes(PYTHON_PREFIXES),
    ),
    ("python", DoubleQuotes) => Some(
      PairSpec::new(&["\""], &["\""])
        .single_line()
        .with_prefixes(PYTHON_PREFIXES),
    ),
    ("python", TripleSingleQuotes) => {
      Some(PairSpec::new(&["'''"], &["'''"]).with_prefixes(PYTHON_PREFIXES))
    },
    ("python", TripleDoubleQuotes) => {
      Some(PairSpec::new(&["\"\"\""], &["\"\"\""]).with_prefixes(PYTHON_PREFIXES))
    },
    ("ruby", TripleDoubleQuotes) => Some(PairSpec::new(&["%Q("], &[")"])),
    _ => None,
  };
  if overridden.is_some() {
    return overridden;
  }

  let spec = match name {
    AngleBrackets => PairSpec::new(&["</", "<"], &[">", "/>"]),
    BacktickQuotes => PairSpec::new(&["`"], &["`"]),
    CurlyBrackets => PairSpec::new(&["{", "${"], &["}"]),
    TripleDoubleQuotes | TripleSingleQuotes => PairSpec::new(&[], &[]),
    DoubleQuotes => PairSpec::new(&["\""], &["\""]).single_line(),
    EscapedDoubleQuotes => PairSpec::new(&["\\\""], &["\\\""]).single_line(),
    EscapedParentheses => PairSpec::new(&["\\("], &["\\)"]),
    EscapedSquareBrackets => PairSpec::new(&["\\["], &["\\]"]),
    EscapedSingleQuotes => PairSpec::new(&["\\'"], &["\\'"]).single_line(),
    Parentheses => PairSpec::new(&["(", "$("], &[")"]),
    SingleQuotes => PairSpec::new(&["'"], &["'"]).single_line(),
    SquareBrackets => PairSpec::new(&["["], &["]"]),
    String | Any | CollectionBoundary => return None,
  };
  Some(spec)
}

/// Every delimiter text for `name`, which may be a compound name. Texts
/// listed on both sides get [`DelimiterSide::Unknown`]. When two names
/// share a text the first name keeps it.
pub fn individual_delimiters(
  name: SurroundingPairName,
  language_id: &str,
) -> Vec<IndividualDelimiter> {
  let mut delimiters: Vec<IndividualDelimiter> = Vec::new();

  for simple in name.expand() {
    let Some(spec) = pair_spec(simple, language_id) else {
      continue;
    };

    let mut lefts: Vec<String> = spec.left.iter().map(|s| s.to_string()).collect();
    for prefix in spec.prefixes {
      lefts.extend(spec.left.iter().map(|left| format!("{prefix}{left}")));
    }
    let rights: Vec<String> = spec.right.iter().map(|s| s.to_string()).collect();

    let texts = lefts.iter().chain(rights.iter());
    for text in texts {
      if delimiters.iter().any(|delimiter| delimiter.text == *text) {
        continue;
      }
      let side = match (lefts.contains(text), rights.contains(text)) {
        (true, true) => DelimiterSide::Unknown,
        (true, false) => DelimiterSide::Left,
        _ => DelimiterSide::Right,
      };
      delimiters.push(IndividualDelimiter {
        text: text.clone(),
        name: simple,
        side,
        single_line: spec.single_line,
      });
    }
  }

  delimiters
}

#[cfg(test)]
mod test {
  use super::*;

  fn find<'a>(delimiters: &'a [IndividualDelimiter], text: &str) -> Option<&'a IndividualDelimiter> {
    delimiters.iter().find(|delimiter| delimiter.text == text)
  }

  #[test]
  fn test_sides() {
    let any = individual_delimiters(SurroundingPairName::Any, "plaintext");
    assert_eq!(find(&any, "$(").unwrap().side, DelimiterSide::Left);
    assert_eq!(find(&any, "/>").unwrap().side, DelimiterSide::Right);
    assert_eq!(find(&any, "\"").unwrap().side, DelimiterSide::Unknown);
    assert!(find(&any, "\"").unwrap().single_line);
    assert!(find(&any, "\"\"\"").is_none());
  }

  #[test]
  fn test_language_overrides() {
    let python = individual_delimiters(SurroundingPairName::String, "python");
    let raw = find(&python, "r'").unwrap();
    assert_eq!(raw.side, DelimiterSide::Left);
    assert_eq!(raw.name, SurroundingPairName::SingleQuotes);
    assert_eq!(
      find(&python, "\"\"\"").unwrap().name,
      SurroundingPairName::TripleDoubleQuotes
    );

    let lua = individual_delimiters(SurroundingPairName::DoubleQuotes, "lua");
    assert_eq!(find(&lua, "[[").unwrap().side, DelimiterSide::Left);
    assert_eq!(find(&lua, "\"").unwrap().side, DelimiterSide::Unknown);

    let ruby = individual_delimiters(SurroundingPairName::Any, "ruby");
    assert_eq!(find(&ruby, "%Q(").unwrap().name, SurroundingPairName::TripleDoubleQuotes);
    assert_eq!(find(&ruby, ")").unwrap().name, SurroundingPairName::Parentheses);
  }
}
