use the_core::text::graphemes_utf16;

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
    line::LineScopeHandler,
    nested_candidates,
  },
  scope_type::ScopeType,
  target::Target,
};

/// One scope per grapheme cluster, line breaks excluded.
pub struct CharacterScopeHandler {
  scope_type: ScopeType,
  lines:      LineScopeHandler,
}

impl CharacterScopeHandler {
  pub fn new(_factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    Ok(Self {
      scope_type,
      lines: LineScopeHandler::new(ScopeType::line()),
    })
  }
}

fn characters_in_line(document: &dyn TextDocument, line_scope: &TargetScope) -> Vec<TargetScope> {
  let line = line_scope.domain.start.line;
  let text = document.line_at(line).text;
  graphemes_utf16(&text)
    .map(|(start, end, _)| {
      let range = Range::from_coords(line, start, line, end);
      TargetScope::single(range, Target::plain(range, false))
    })
    .collect()
}

impl ScopeHandler for CharacterScopeHandler {
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
      &self.lines,
      document,
      position,
      direction,
      hints,
      move |line_scope| characters_in_line(document, line_scope),
    )
  }

  /// Prefer a letter or digit over punctuation next to it.
  fn is_preferred_over(
    &self,
    document: &dyn TextDocument,
    a: &TargetScope,
    b: &TargetScope,
  ) -> Option<bool> {
    let is_word = |scope: &TargetScope| {
      document
        .text_in(scope.domain)
        .chars()
        .next()
        .is_some_and(char::is_alphanumeric)
    };
    match (is_word(a), is_word(b)) {
      (true, false) => Some(true),
      (false, true) => Some(false),
      _ => None,
    }
  }
}
