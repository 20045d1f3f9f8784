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
  },
  scope_type::{
    ScopeType,
    SimpleScopeKind,
  },
  target::Target,
};

/// Line scopes span the whole line; the target is the line without its
/// indentation and trailing whitespace.
pub struct LineScopeHandler {
  scope_type: ScopeType,
}

impl LineScopeHandler {
  pub fn new(scope_type: ScopeType) -> Self {
    Self { scope_type }
  }
}

pub(crate) fn line_scope(document: &dyn TextDocument, line: usize) -> TargetScope {
  let line = document.line_at(line);
  TargetScope::single(line.range, Target::line(line.trimmed_range(), false))
}

/// Line target covering every line `range` touches.
pub(crate) fn line_target_for(document: &dyn TextDocument, range: Range, is_reversed: bool) -> Target {
  let start = document.line_at(range.start.line);
  let end = document.line_at(range.end.line);
  let content = Range::new(start.trimmed_range().start, end.trimmed_range().end);
  Target::line(content, is_reversed)
}

impl ScopeHandler for LineScopeHandler {
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
    factory.create(&ScopeType::simple(SimpleScopeKind::Paragraph))
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    _hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    let line = position.line.min(document.line_count().saturating_sub(1));
    match direction {
      Direction::Forward => Box::new(
        (line..document.line_count()).map(move |line| line_scope(document, line)),
      ),
      Direction::Backward => Box::new((0..=line).rev().map(move |line| line_scope(document, line))),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::EngineConfig,
    document::InMemoryTextDocument,
    scope::{
      ScopeRequirements,
      generate_scopes,
    },
  };

  #[test]
  fn test_line_content_is_trimmed() {
    let document = InMemoryTextDocument::new("untitled:line", "plaintext", "a\n   indented  \nb");
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory.create(&ScopeType::line()).unwrap();
    let scope = generate_scopes(
      handler.as_ref(),
      &document,
      Position::new(1, 0),
      Direction::Forward,
      ScopeRequirements::default(),
    )
    .next()
    .unwrap();

    assert_eq!(scope.domain, Range::from_coords(1, 0, 1, 13));
    assert_eq!(
      scope.targets(false)[0].content_range(),
      Range::from_coords(1, 3, 1, 11)
    );
  }
}
