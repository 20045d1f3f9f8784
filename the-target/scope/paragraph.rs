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

/// Paragraphs are maximal runs of non-blank lines.
pub struct ParagraphScopeHandler {
  scope_type: ScopeType,
}

impl ParagraphScopeHandler {
  pub fn new(scope_type: ScopeType) -> Self {
    Self { scope_type }
  }
}

fn is_blank(document: &dyn TextDocument, line: usize) -> bool {
  document.line_at(line).is_empty_or_whitespace
}

fn paragraph_scope(document: &dyn TextDocument, first: usize, last: usize) -> TargetScope {
  let first = document.line_at(first);
  let last = document.line_at(last);
  let domain = Range::new(first.range.start, last.range.end);
  let content = Range::new(first.trimmed_range().start, last.trimmed_range().end);
  TargetScope::single(domain, Target::paragraph(content, false))
}

/// Walks paragraphs line by line. A paragraph is only yielded once the
/// blank line or document edge that closes it is reached.
struct Paragraphs<'a> {
  document:  &'a dyn TextDocument,
  direction: Direction,
  /// Next line to look at, `None` once past the document edge.
  line:      Option<usize>,
}

impl Iterator for Paragraphs<'_> {
  type Item = TargetScope;

  fn next(&mut self) -> Option<Self::Item> {
    let line_count = self.document.line_count();
    let step = |line: usize| match self.direction {
      Direction::Forward => (line + 1 < line_count).then_some(line + 1),
      Direction::Backward => line.checked_sub(1),
    };

    let mut line = self.line?;
    while is_blank(self.document, line) {
      line = match step(line) {
        Some(next) => next,
        None => {
          self.line = None;
          return None;
        },
      };
    }

    let run_start = line;
    let mut run_end = line;
    self.line = None;
    while let Some(next) = step(run_end) {
      if is_blank(self.document, next) {
        self.line = Some(next);
        break;
      }
      run_end = next;
    }

    let (first, last) = match self.direction {
      Direction::Forward => (run_start, run_end),
      Direction::Backward => (run_end, run_start),
    };
    Some(paragraph_scope(self.document, first, last))
  }
}

impl ScopeHandler for ParagraphScopeHandler {
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
    factory.create(&ScopeType::simple(SimpleScopeKind::Document))
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    _hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    let mut line = position.line.min(document.line_count().saturating_sub(1));
    // Start from the edge of the paragraph containing the position.
    if !is_blank(document, line) {
      match direction {
        Direction::Forward => {
          while line > 0 && !is_blank(document, line - 1) {
            line -= 1;
          }
        },
        Direction::Backward => {
          while line + 1 < document.line_count() && !is_blank(document, line + 1) {
            line += 1;
          }
        },
      }
    }

    Box::new(Paragraphs {
      document,
      direction,
      line: Some(line),
    })
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

  fn paragraphs(text: &str, position: Position, direction: Direction) -> Vec<Range> {
    let document = InMemoryTextDocument::new("untitled:paragraph", "plaintext", text);
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory
      .create(&ScopeType::simple(SimpleScopeKind::Paragraph))
      .unwrap();
    generate_scopes(
      handler.as_ref(),
      &document,
      position,
      direction,
      ScopeRequirements::default(),
    )
    .map(|scope| scope.targets(false)[0].content_range())
    .collect()
  }

  #[test]
  fn test_forward_paragraphs() {
    let text = "one\ntwo\n\n  three  \n\n\nfour";
    assert_eq!(
      paragraphs(text, Position::new(1, 1), Direction::Forward),
      vec![
        Range::from_coords(0, 0, 1, 3),
        Range::from_coords(3, 2, 3, 7),
        Range::from_coords(6, 0, 6, 4),
      ]
    );
  }

  #[test]
  fn test_backward_paragraphs() {
    let text = "one\ntwo\n\nthree\n\nfour";
    assert_eq!(
      paragraphs(text, Position::new(4, 0), Direction::Backward),
      vec![Range::from_coords(3, 0, 3, 5), Range::from_coords(0, 0, 1, 3)]
    );
  }
}
