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
    paragraph::ParagraphScopeHandler,
  },
  scope_type::{
    ScopeType,
    SimpleScopeKind,
  },
  sentence::SentenceSegmenter,
  target::{
    ScopeTarget,
    Target,
  },
};

/// Sentences, segmented within each paragraph.
pub struct SentenceScopeHandler {
  scope_type: ScopeType,
  segmenter:  SentenceSegmenter,
  paragraphs: ParagraphScopeHandler,
}

impl SentenceScopeHandler {
  pub fn new(factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    Ok(Self {
      scope_type,
      segmenter: SentenceSegmenter::new(&factory.config().sentence.abbreviations),
      paragraphs: ParagraphScopeHandler::new(ScopeType::simple(SimpleScopeKind::Paragraph)),
    })
  }

  fn sentences_in(&self, document: &dyn TextDocument, paragraph: &TargetScope) -> Vec<TargetScope> {
    let text = document.text_in(paragraph.domain);
    let base = document.offset_at(paragraph.domain.start);
    self
      .segmenter
      .segment(&text)
      .into_iter()
      .map(|(start, end)| {
        let range = Range::new(
          document.position_at(base + start),
          document.position_at(base + end),
        );
        TargetScope::single(
          range,
          Target::scope(ScopeTarget::token_like("sentence"), range, false),
        )
      })
      .collect()
  }
}

impl ScopeHandler for SentenceScopeHandler {
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
    hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    nested_candidates(
      &self.paragraphs,
      document,
      position,
      direction,
      hints,
      move |paragraph| self.sentences_in(document, paragraph),
    )
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
  fn test_sentences_across_paragraphs() {
    let document = InMemoryTextDocument::new(
      "untitled:sentence",
      "plaintext",
      "Foo. Bar? Baz! bongo\n\nNext one.",
    );
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory
      .create(&ScopeType::simple(SimpleScopeKind::Sentence))
      .unwrap();
    let texts: Vec<_> = generate_scopes(
      handler.as_ref(),
      &document,
      Position::zero(),
      Direction::Forward,
      ScopeRequirements::default(),
    )
    .map(|scope| document.text_in(scope.domain))
    .collect();
    assert_eq!(texts, vec!["Foo.", "Bar?", "Baz!", "bongo", "Next one."]);
  }
}
