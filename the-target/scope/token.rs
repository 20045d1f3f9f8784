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
  scope_type::{
    ScopeType,
    SimpleScopeKind,
  },
  target::{
    ScopeTarget,
    Target,
  },
  tokenizer::{
    TokenKind,
    Tokenizer,
  },
};

/// Tokens, or only identifier tokens, found line by line.
pub struct TokenScopeHandler {
  scope_type:       ScopeType,
  tokenizer:        Tokenizer,
  identifiers_only: bool,
  lines:            LineScopeHandler,
}

impl TokenScopeHandler {
  pub fn new(factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    let identifiers_only = scope_type.kind() == Some(&SimpleScopeKind::Identifier);
    Ok(Self {
      scope_type,
      tokenizer: Tokenizer::for_language(factory.config(), factory.language_id())?,
      identifiers_only,
      lines: LineScopeHandler::new(ScopeType::line()),
    })
  }

  fn name(&self) -> &'static str {
    if self.identifiers_only {
      "identifier"
    } else {
      "token"
    }
  }

  fn scopes_in_line(&self, document: &dyn TextDocument, line_scope: &TargetScope) -> Vec<TargetScope> {
    let line = line_scope.domain.start.line;
    let text = document.line_at(line).text;
    self
      .tokenizer
      .tokenize(&text)
      .into_iter()
      .filter(|token| !self.identifiers_only || token.kind == TokenKind::Identifier)
      .map(|token| {
        let range = Range::from_coords(line, token.start, line, token.end);
        TargetScope::single(
          range,
          Target::scope(ScopeTarget::token_like(self.name()), range, false),
        )
      })
      .collect()
  }
}

impl ScopeHandler for TokenScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn is_hierarchical(&self) -> bool {
    false
  }

  fn iteration_scope_handler(
    &self,
    _factory: &ScopeHandlerFactory<'_>,
  ) -> Result<Box<dyn ScopeHandler>> {
    Ok(Box::new(LineScopeHandler::new(ScopeType::line())))
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
      move |line_scope| self.scopes_in_line(document, line_scope),
    )
  }

  /// Identifiers win over the punctuation next to them.
  fn is_preferred_over(
    &self,
    document: &dyn TextDocument,
    a: &TargetScope,
    b: &TargetScope,
  ) -> Option<bool> {
    let a_is_identifier = self.tokenizer.is_identifier(&document.text_in(a.domain));
    let b_is_identifier = self.tokenizer.is_identifier(&document.text_in(b.domain));
    match (a_is_identifier, b_is_identifier) {
      (true, false) => Some(true),
      (false, true) => Some(false),
      _ => None,
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
  fn test_identifiers_skip_symbols() {
    let document = InMemoryTextDocument::new("untitled:token", "plaintext", "foo(bar, 42)");
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory
      .create(&ScopeType::simple(SimpleScopeKind::Identifier))
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
    assert_eq!(texts, vec!["foo", "bar"]);
  }

  #[test]
  fn test_tokens_prefer_identifiers() {
    let document = InMemoryTextDocument::new("untitled:token", "plaintext", "foo.");
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory.create(&ScopeType::token()).unwrap();
    let foo = TargetScope::new(Range::from_coords(0, 0, 0, 3), []);
    let dot = TargetScope::new(Range::from_coords(0, 3, 0, 4), []);
    assert_eq!(handler.is_preferred_over(&document, &foo, &dot), Some(true));
    assert_eq!(handler.is_preferred_over(&document, &dot, &foo), Some(false));
  }
}
