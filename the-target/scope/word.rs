//! Words are the parts of a token: `fooBar_baz` holds `foo`, `Bar` and
//! `baz`. Consecutive capitals form one word except for a capital that
//! starts a lowercase run (`HTMLParser` is `HTML` and `Parser`), and digit
//! runs are words of their own.

use crate::{
  direction::Direction,
  document::TextDocument,
  error::Result,
  position::Position,
  range::Range,
  scope::{
    ScopeCandidates,
    ScopeHandler,
    ScopeHandlerFactory,
    ScopeHints,
    TargetScope,
    nested_candidates,
    token::TokenScopeHandler,
  },
  scope_type::ScopeType,
  target::{
    ScopeTarget,
    Target,
  },
};

pub struct WordScopeHandler {
  scope_type: ScopeType,
  tokens:     TokenScopeHandler,
}

impl WordScopeHandler {
  pub fn new(factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    Ok(Self {
      scope_type,
      tokens: TokenScopeHandler::new(factory, ScopeType::token())?,
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
  Upper,
  Lower,
  Digit,
  Other,
}

fn classify(ch: char) -> Class {
  if ch.is_uppercase() {
    Class::Upper
  } else if ch.is_numeric() {
    Class::Digit
  } else if ch.is_alphabetic() {
    Class::Lower
  } else {
    Class::Other
  }
}

/// Word bounds in `text` as UTF-16 offsets.
pub(crate) fn split_words(text: &str) -> Vec<(usize, usize)> {
  let chars: Vec<(usize, Class)> = text
    .chars()
    .scan(0, |offset, ch| {
      let start = *offset;
      *offset += ch.len_utf16();
      Some((start, classify(ch)))
    })
    .collect();
  let end_of = |index: usize| chars.get(index).map_or(text.encode_utf16().count(), |c| c.0);
  let class_at = |index: usize| chars.get(index).map(|c| c.1);

  let mut words = Vec::new();
  let mut i = 0;
  while i < chars.len() {
    let class = chars[i].1;
    let mut j = i + 1;
    match class {
      Class::Upper => {
        if class_at(j) == Some(Class::Lower) {
          while class_at(j) == Some(Class::Lower) {
            j += 1;
          }
        } else {
          while class_at(j) == Some(Class::Upper) {
            j += 1;
          }
          if class_at(j) == Some(Class::Lower) && j - i > 1 {
            j -= 1;
          }
        }
      },
      Class::Lower | Class::Digit => {
        while class_at(j) == Some(class) {
          j += 1;
        }
      },
      Class::Other => {
        i = j;
        continue;
      },
    }
    words.push((chars[i].0, end_of(j)));
    i = j;
  }
  words
}

fn words_in_token(document: &dyn TextDocument, token_scope: &TargetScope) -> Vec<TargetScope> {
  let token = token_scope.domain;
  let line = token.start.line;
  let text = document.text_in(token);
  let words = split_words(&text);
  let at = |offset: usize| Position::new(line, token.start.character + offset);

  words
    .iter()
    .enumerate()
    .map(|(index, &(start, end))| {
      let content = Range::new(at(start), at(end));
      let (leading, trailing) = if words.len() > 1 {
        let leading = index
          .checked_sub(1)
          .map(|previous| Range::new(at(words[previous].1), at(start)));
        let trailing = words
          .get(index + 1)
          .map(|&(next_start, _)| Range::new(at(end), at(next_start)));
        (leading, trailing)
      } else {
        (None, None)
      };
      let separator = leading
        .or(trailing)
        .map(|range| document.text_in(range))
        .unwrap_or_default();
      TargetScope::single(
        content,
        Target::scope(
          ScopeTarget::new("word")
            .with_insertion_delimiter(&separator)
            .with_delimiter_ranges(leading, trailing),
          content,
          false,
        ),
      )
    })
    .collect()
}

impl ScopeHandler for WordScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn is_hierarchical(&self) -> bool {
    false
  }

  fn iteration_scope_handler(
    &self,
    factory: &ScopeHandlerFactory<'_>,
  ) -> Result<Box<dyn ScopeHandler>> {
    factory.create(&ScopeType::token())
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    nested_candidates(
      &self.tokens,
      document,
      position,
      direction,
      hints,
      move |token_scope| words_in_token(document, token_scope),
    )
  }
}
