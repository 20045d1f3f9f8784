use std::iter;

use crate::{
  direction::Direction,
  document::TextDocument,
  error::Result,
  position::Position,
  scope::{
    ScopeCandidates,
    ScopeHandler,
    ScopeHandlerFactory,
    ScopeHints,
    TargetScope,
  },
  scope_type::ScopeType,
  target::Target,
};

pub struct DocumentScopeHandler {
  scope_type: ScopeType,
}

impl DocumentScopeHandler {
  pub fn new(scope_type: ScopeType) -> Self {
    Self { scope_type }
  }
}

impl ScopeHandler for DocumentScopeHandler {
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
    Ok(Box::new(Self::new(self.scope_type.clone())))
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    _position: Position,
    _direction: Direction,
    _hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    let range = document.range();
    Box::new(iter::once(TargetScope::single(
      range,
      Target::document(range, false),
    )))
  }
}
