use unicode_general_category::{
  GeneralCategory,
  get_general_category,
};

use crate::line_ending::LineEnding;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum CharCategory {
  Whitespace,
  Eol,
  Word,
  Punctuation,
  Unknown,
}

pub fn categorize_char(ch: char) -> CharCategory {
  match ch {
    c if char_is_line_ending(c) => CharCategory::Eol,
    c if char_is_whitespace(c) => CharCategory::Whitespace,
    c if char_is_word(c) => CharCategory::Word,
    c if char_is_punctuation(c) => CharCategory::Punctuation,
    _ => CharCategory::Unknown,
  }
}

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

/// Whitespace as understood by the tokenizer and the removal rules: the
/// same set a `\s` regex class matches, line breaks included.
#[inline]
pub fn char_is_whitespace(ch: char) -> bool {
  ch.is_whitespace() || ch == '\u{FEFF}'
}

#[inline]
pub fn char_is_punctuation(ch: char) -> bool {
  matches!(
    get_general_category(ch),
    GeneralCategory::OtherPunctuation
      | GeneralCategory::OpenPunctuation
      | GeneralCategory::ClosePunctuation
      | GeneralCategory::InitialPunctuation
      | GeneralCategory::FinalPunctuation
      | GeneralCategory::ConnectorPunctuation
      | GeneralCategory::DashPunctuation
      | GeneralCategory::MathSymbol
      | GeneralCategory::CurrencySymbol
      | GeneralCategory::ModifierSymbol
      | GeneralCategory::OtherSymbol
  )
}

/// Letters of any script (`\p{L}`).
#[inline]
pub fn char_is_letter(ch: char) -> bool {
  matches!(
    get_general_category(ch),
    GeneralCategory::UppercaseLetter
      | GeneralCategory::LowercaseLetter
      | GeneralCategory::TitlecaseLetter
      | GeneralCategory::ModifierLetter
      | GeneralCategory::OtherLetter
  )
}

/// Combining marks (`\p{M}`).
#[inline]
pub fn char_is_mark(ch: char) -> bool {
  matches!(
    get_general_category(ch),
    GeneralCategory::NonspacingMark | GeneralCategory::SpacingMark | GeneralCategory::EnclosingMark
  )
}

#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_' || char_is_mark(ch)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_categorize() {
    assert_eq!(categorize_char('\n'), CharCategory::Eol);
    assert_eq!(categorize_char(' '), CharCategory::Whitespace);
    assert_eq!(categorize_char('é'), CharCategory::Word);
    assert_eq!(categorize_char('_'), CharCategory::Word);
    assert_eq!(categorize_char('('), CharCategory::Punctuation);
    assert_eq!(categorize_char('+'), CharCategory::Punctuation);
  }

  #[test]
  fn test_letters() {
    assert!(char_is_letter('a'));
    assert!(char_is_letter('Ж'));
    assert!(!char_is_letter('1'));
    assert!(!char_is_letter('.'));
    assert!(char_is_mark('\u{0301}'));
  }
}
