//! Splits text into tokens.
//!
//! At every non-whitespace position the first matcher that succeeds wins:
//!
//! 1. fixed multi-character operators (`!==`, `=>`, `/*`, ...), longest
//!    first;
//! 2. decimal numbers (`2.5`), unless glued to another digit or period, so
//!    `1.22.4` stays five tokens;
//! 3. identifiers: letters, marks, digits and the language's word
//!    separators (`_` by default, `-` too for css-like languages);
//! 4. runs of a repeatable symbol (`---`, `//`);
//! 5. any other single character.

use std::sync::OnceLock;

use regex::Regex;
use the_core::{
  chars::char_is_whitespace,
  text::Utf16Cursor,
};

use crate::{
  config::EngineConfig,
  error::{
    Result,
    TargetError,
  },
};

const FIXED_TOKENS: &[&str] = &[
  "<!--", "!==", "-->", "\"\"\"", "```", "!=", "+=", "-=", "*=", "/=", "%=", "<=", ">=", "=>",
  "->", "::", "/*", "*/", "${", "#{", "??",
];

const REPEATABLE_SYMBOLS: &[char] = &[
  '-', '+', '*', '/', '=', '<', '>', '#', '.', '|', '&', '~', '%', '^',
];

static FLOAT_REGEX: OnceLock<Regex> = OnceLock::new();

fn float_regex() -> &'static Regex {
  FLOAT_REGEX.get_or_init(|| Regex::new(r"^\d+\.\d+").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Identifier,
  Number,
  Symbol,
}

/// A token with UTF-16 bounds relative to the tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
  pub text:  &'a str,
  pub start: usize,
  pub end:   usize,
  pub kind:  TokenKind,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
  identifier: Regex,
}

impl Tokenizer {
  pub fn new(word_separators: &[String]) -> Result<Self> {
    let mut alternatives = vec![r"[\p{L}\p{M}\p{N}]".to_string()];
    alternatives.extend(word_separators.iter().map(|sep| regex::escape(sep)));
    let pattern = format!("^(?:{})+", alternatives.join("|"));
    let identifier = Regex::new(&pattern).map_err(|err| TargetError::invalid_regex(&pattern, &err))?;
    Ok(Self { identifier })
  }

  pub fn for_language(config: &EngineConfig, language_id: &str) -> Result<Self> {
    Self::new(&config.word_separators(language_id))
  }

  /// Whether `text` is made only of identifier characters.
  pub fn is_identifier(&self, text: &str) -> bool {
    !text.is_empty()
      && self
        .identifier
        .find(text)
        .is_some_and(|m| m.end() == text.len())
  }

  pub fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    let mut cursor = Utf16Cursor::new(text);
    let mut byte = 0;

    while let Some(ch) = text[byte..].chars().next() {
      if char_is_whitespace(ch) {
        byte += ch.len_utf8();
        continue;
      }
      let (len, kind) = self.match_at(text, byte, ch);
      tokens.push(Token {
        text: &text[byte..byte + len],
        start: cursor.to_utf16(byte),
        end: cursor.to_utf16(byte + len),
        kind,
      });
      byte += len;
    }

    tokens
  }

  fn match_at(&self, text: &str, byte: usize, ch: char) -> (usize, TokenKind) {
    let rest = &text[byte..];

    if let Some(fixed) = FIXED_TOKENS.iter().find(|fixed| rest.starts_with(**fixed)) {
      return (fixed.len(), TokenKind::Symbol);
    }

    if let Some(m) = float_regex().find(rest) {
      let glued = |c: char| c.is_ascii_digit() || c == '.';
      let before_ok = !text[..byte].chars().next_back().is_some_and(glued);
      let after_ok = !rest[m.end()..].chars().next().is_some_and(glued);
      if before_ok && after_ok {
        return (m.end(), TokenKind::Number);
      }
    }

    if let Some(m) = self.identifier.find(rest) {
      let kind = if m.as_str().chars().all(|c| c.is_ascii_digit()) {
        TokenKind::Number
      } else {
        TokenKind::Identifier
      };
      return (m.end(), kind);
    }

    if REPEATABLE_SYMBOLS.contains(&ch) {
      let len = rest.chars().take_while(|&c| c == ch).count() * ch.len_utf8();
      return (len, TokenKind::Symbol);
    }

    (ch.len_utf8(), TokenKind::Symbol)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn texts(tokenizer: &Tokenizer, input: &str) -> Vec<String> {
    tokenizer
      .tokenize(input)
      .into_iter()
      .map(|token| token.text.to_string())
      .collect()
  }

  fn default_tokenizer() -> Tokenizer {
    Tokenizer::new(&["_".to_string()]).unwrap()
  }

  #[test]
  fn test_global_cases() {
    let tokenizer = default_tokenizer();
    let cases: &[(&str, &[&str])] = &[
      ("0.0 0 1 120 2.5 0.1", &["0.0", "0", "1", "120", "2.5", "0.1"]),
      ("1.22.4", &["1", ".", "22", ".", "4"]),
      ("my variable", &["my", "variable"]),
      ("myVariable", &["myVariable"]),
      ("my__variable", &["my__variable"]),
      ("my-variable", &["my", "-", "variable"]),
      ("my::variable", &["my", "::", "variable"]),
      ("_a", &["_a"]),
      ("\"my variable\"", &["\"", "my", "variable", "\""]),
      ("---|||///+++", &["---", "|||", "///", "+++"]),
      ("!!(()){{}}", &["!", "!", "(", "(", ")", ")", "{", "{", "}", "}"]),
      ("!=>=!====", &["!=", ">=", "!==", "=="]),
      ("\"\"\"hello\"\"\"", &["\"\"\"", "hello", "\"\"\""]),
      ("\"\"\"\"\"\"", &["\"\"\"", "\"\"\""]),
      ("``````", &["```", "```"]),
      ("\"\"", &["\"", "\""]),
      ("// Hello world", &["//", "Hello", "world"]),
      ("/* Hello world */", &["/*", "Hello", "world", "*/"]),
      ("<!-- Hello world -->", &["<!--", "Hello", "world", "-->"]),
      ("#111111", &["#", "111111"]),
      ("#aa11aa", &["#", "aa11aa"]),
      ("aåäöb", &["aåäöb"]),
      ("n\u{0303}", &["n\u{0303}"]),
      ("tests\\recorded\\name", &["tests", "\\", "recorded", "\\", "name"]),
    ];

    for (input, expected) in cases {
      assert_eq!(texts(&tokenizer, input), *expected, "input: {input:?}");
    }
  }

  #[test]
  fn test_kebab_separators() {
    let tokenizer = Tokenizer::for_language(&EngineConfig::default(), "css").unwrap();
    assert_eq!(texts(&tokenizer, "-webkit-font-smoothing"), vec!["-webkit-font-smoothing"]);
    assert_eq!(
      texts(&tokenizer, "(min-width: 400px)"),
      vec!["(", "min-width", ":", "400px", ")"]
    );

    let shell = Tokenizer::for_language(&EngineConfig::default(), "shellscript").unwrap();
    assert_eq!(
      texts(&shell, "patch --force $MY_SNAKE_VAR"),
      vec!["patch", "--force", "$", "MY_SNAKE_VAR"]
    );
  }

  #[test]
  fn test_offsets_are_utf16() {
    let tokens = default_tokenizer().tokenize("😀 ab");
    assert_eq!(tokens[0].start, 0);
    assert_eq!(tokens[0].end, 2);
    assert_eq!(tokens[1].start, 3);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
  }
}
