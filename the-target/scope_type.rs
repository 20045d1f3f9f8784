//! Scope type descriptors.
//!
//! Scope types arrive as JSON objects tagged by `type`. Parameterized kinds
//! (surrounding pairs, regexes, alternations, glyphs) have their own
//! variants; every other name is a [`SimpleScopeType`], and names the
//! engine has no handler for are kept verbatim so the failure can name
//! them.

use std::borrow::Cow;

use serde::{
  Deserialize,
  Serialize,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScopeType {
  SurroundingPair {
    delimiter:                  SurroundingPairName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    force_direction:            Option<SurroundingPairDirection>,
    #[serde(default)]
    require_strong_containment: bool,
  },
  SurroundingPairInterior {
    delimiter:           SurroundingPairName,
    #[serde(default)]
    require_single_line: bool,
  },
  CustomRegex {
    regex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flags: Option<String>,
  },
  OneOf {
    scope_types: Vec<ScopeType>,
  },
  Glyph {
    character: String,
  },
  #[serde(untagged)]
  Simple(SimpleScopeType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleScopeType {
  #[serde(rename = "type")]
  pub kind: SimpleScopeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimpleScopeKind {
  Character,
  Word,
  Token,
  Identifier,
  Line,
  Sentence,
  Paragraph,
  Document,
  NonWhitespaceSequence,
  /// Non-whitespace sequence cut at the edges of surrounding pairs.
  BoundedNonWhitespaceSequence,
  /// Paragraph cut at the edges of surrounding pairs.
  BoundedParagraph,
  /// Comma separated item of a collection or argument list.
  CollectionItem,
  Url,
  /// Interior of the nearest surrounding pair of any kind.
  Interior,
  /// Textual string, matched through quote delimiters.
  String,
  /// Occurrences of the text of a reference target.
  Instance,
  #[serde(untagged)]
  Other(std::string::String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurroundingPairName {
  AngleBrackets,
  BacktickQuotes,
  CurlyBrackets,
  DoubleQuotes,
  EscapedDoubleQuotes,
  EscapedParentheses,
  EscapedSingleQuotes,
  EscapedSquareBrackets,
  Parentheses,
  SingleQuotes,
  SquareBrackets,
  TripleDoubleQuotes,
  TripleSingleQuotes,
  String,
  Any,
  CollectionBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurroundingPairDirection {
  Left,
  Right,
}

impl SurroundingPairName {
  pub const SIMPLE: [SurroundingPairName; 13] = [
    Self::AngleBrackets,
    Self::BacktickQuotes,
    Self::CurlyBrackets,
    Self::DoubleQuotes,
    Self::EscapedDoubleQuotes,
    Self::EscapedParentheses,
    Self::EscapedSingleQuotes,
    Self::EscapedSquareBrackets,
    Self::Parentheses,
    Self::SingleQuotes,
    Self::SquareBrackets,
    Self::TripleDoubleQuotes,
    Self::TripleSingleQuotes,
  ];

  /// The simple pair names this name stands for.
  pub fn expand(self) -> Vec<SurroundingPairName> {
    match self {
      Self::Any => Self::SIMPLE.to_vec(),
      Self::String => vec![
        Self::TripleDoubleQuotes,
        Self::TripleSingleQuotes,
        Self::DoubleQuotes,
        Self::SingleQuotes,
        Self::BacktickQuotes,
      ],
      Self::CollectionBoundary => vec![
        Self::Parentheses,
        Self::SquareBrackets,
        Self::CurlyBrackets,
        Self::AngleBrackets,
      ],
      simple => vec![simple],
    }
  }

  pub const fn as_str(self) -> &'static str {
    match self {
      Self::AngleBrackets => "angleBrackets",
      Self::BacktickQuotes => "backtickQuotes",
      Self::CurlyBrackets => "curlyBrackets",
      Self::DoubleQuotes => "doubleQuotes",
      Self::EscapedDoubleQuotes => "escapedDoubleQuotes",
      Self::EscapedParentheses => "escapedParentheses",
      Self::EscapedSingleQuotes => "escapedSingleQuotes",
      Self::EscapedSquareBrackets => "escapedSquareBrackets",
      Self::Parentheses => "parentheses",
      Self::SingleQuotes => "singleQuotes",
      Self::SquareBrackets => "squareBrackets",
      Self::TripleDoubleQuotes => "tripleDoubleQuotes",
      Self::TripleSingleQuotes => "tripleSingleQuotes",
      Self::String => "string",
      Self::Any => "any",
      Self::CollectionBoundary => "collectionBoundary",
    }
  }
}

impl SimpleScopeKind {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Character => "character",
      Self::Word => "word",
      Self::Token => "token",
      Self::Identifier => "identifier",
      Self::Line => "line",
      Self::Sentence => "sentence",
      Self::Paragraph => "paragraph",
      Self::Document => "document",
      Self::NonWhitespaceSequence => "nonWhitespaceSequence",
      Self::BoundedNonWhitespaceSequence => "boundedNonWhitespaceSequence",
      Self::BoundedParagraph => "boundedParagraph",
      Self::CollectionItem => "collectionItem",
      Self::Url => "url",
      Self::Interior => "interior",
      Self::String => "string",
      Self::Instance => "instance",
      Self::Other(name) => name,
    }
  }
}

impl ScopeType {
  pub const fn simple(kind: SimpleScopeKind) -> Self {
    Self::Simple(SimpleScopeType { kind })
  }

  pub const fn token() -> Self {
    Self::simple(SimpleScopeKind::Token)
  }

  pub const fn line() -> Self {
    Self::simple(SimpleScopeKind::Line)
  }

  pub const fn surrounding_pair(delimiter: SurroundingPairName) -> Self {
    Self::SurroundingPair {
      delimiter,
      force_direction: None,
      require_strong_containment: false,
    }
  }

  pub fn kind(&self) -> Option<&SimpleScopeKind> {
    match self {
      Self::Simple(simple) => Some(&simple.kind),
      _ => None,
    }
  }

  /// Name used in error messages and as the scope name of targets.
  pub fn name(&self) -> Cow<'_, str> {
    match self {
      Self::SurroundingPair { delimiter, .. } | Self::SurroundingPairInterior { delimiter, .. } => {
        Cow::Borrowed(delimiter.as_str())
      },
      Self::CustomRegex { .. } => Cow::Borrowed("customRegex"),
      Self::OneOf { scope_types } => Cow::Owned(format!(
        "oneOf({})",
        scope_types
          .iter()
          .map(|scope_type| scope_type.name().into_owned())
          .collect::<Vec<_>>()
          .join(", ")
      )),
      Self::Glyph { character } => Cow::Owned(format!("glyph({character})")),
      Self::Simple(simple) => Cow::Borrowed(simple.kind.as_str()),
    }
  }
}
