use thiserror::Error;

use crate::range::Range;

pub type Result<T> = std::result::Result<T, TargetError>;

/// Failures while validating a batch of edits. The document is never
/// touched when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditError {
  #[error("edit ranges {first} and {second} overlap and one of them inserts text")]
  OverlappingRanges { first: Range, second: Range },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TargetError {
  #[error("couldn't find containing {scope_type}")]
  NoContainingScope { scope_type: String },
  #[error("{scope_type} index {index} is out of range")]
  OutOfRange { scope_type: String, index: isize },
  #[error("couldn't find a matching {delimiter} pair")]
  PairNotFound { delimiter: String },
  #[error("requested {requested} {scope_type}s but {found} are already selected")]
  TooFewScopes {
    requested:  usize,
    found:      usize,
    scope_type: String,
  },
  #[error("scope type {0} is not supported")]
  UnsupportedScopeType(String),
  #[error("modifier {0} is not supported here")]
  UnsupportedModifier(String),
  #[error("mark {0} is not supported")]
  UnsupportedMark(String),
  #[error("no {0} mark has been stored")]
  MissingStoredTarget(&'static str),
  #[error("no hat for {color} {character:?}")]
  UnknownDecoratedSymbol { color: String, character: String },
  #[error("invalid regex {pattern:?}: {message}")]
  InvalidRegex { pattern: String, message: String },
  #[error("{0}")]
  Precondition(String),
  #[error(transparent)]
  Edit(#[from] EditError),
}

impl TargetError {
  pub fn no_containing(scope_type: impl Into<String>) -> Self {
    Self::NoContainingScope {
      scope_type: scope_type.into(),
    }
  }

  pub fn out_of_range(scope_type: impl Into<String>, index: isize) -> Self {
    Self::OutOfRange {
      scope_type: scope_type.into(),
      index,
    }
  }

  pub(crate) fn invalid_regex(pattern: &str, err: &regex::Error) -> Self {
    Self::InvalidRegex {
      pattern: pattern.to_string(),
      message: err.to_string(),
    }
  }
}
