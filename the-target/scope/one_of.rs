use std::{
  cmp::Ordering,
  iter::Peekable,
};

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
    ScopeStream,
    TargetScope,
    compare_target_scopes,
    generate_scopes,
  },
  scope_type::ScopeType,
};

/// Scopes of any of several scope types, merged into one ordered stream.
pub struct OneOfScopeHandler {
  scope_type: ScopeType,
  handlers:   Vec<Box<dyn ScopeHandler>>,
}

impl OneOfScopeHandler {
  pub fn new(scope_type: ScopeType, handlers: Vec<Box<dyn ScopeHandler>>) -> Self {
    Self {
      scope_type,
      handlers,
    }
  }
}

struct MergedScopes<'a> {
  streams:   Vec<Peekable<ScopeStream<'a>>>,
  direction: Direction,
  position:  Position,
}

impl Iterator for MergedScopes<'_> {
  type Item = TargetScope;

  fn next(&mut self) -> Option<Self::Item> {
    let (direction, position) = (self.direction, self.position);
    let mut best: Option<(usize, &TargetScope)> = None;
    for (index, stream) in self.streams.iter_mut().enumerate() {
      let Some(head) = stream.peek() else {
        continue;
      };
      let better = best.is_none_or(|(_, current)| {
        compare_target_scopes(direction, position, head, current) == Ordering::Less
      });
      if better {
        best = Some((index, head));
      }
    }
    let index = best?.0;
    let current = self.streams[index].next()?;

    // Drop every head that is not strictly after the scope just yielded.
    for stream in &mut self.streams {
      while stream.next_if(|head| {
        compare_target_scopes(direction, position, &current, head) != Ordering::Less
      }).is_some()
      {}
    }
    Some(current)
  }
}

impl ScopeHandler for OneOfScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn is_hierarchical(&self) -> bool {
    true
  }

  fn iteration_scope_handler(
    &self,
    factory: &ScopeHandlerFactory<'_>,
  ) -> Result<Box<dyn ScopeHandler>> {
    let handlers = self
      .handlers
      .iter()
      .map(|handler| handler.iteration_scope_handler(factory))
      .collect::<Result<Vec<_>>>()?;
    Ok(Box::new(Self::new(self.scope_type.clone(), handlers)))
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    let requirements = hints.to_requirements();
    let streams = self
      .handlers
      .iter()
      .map(|handler| {
        generate_scopes(handler.as_ref(), document, position, direction, requirements).peekable()
      })
      .collect();
    Box::new(MergedScopes {
      streams,
      direction,
      position,
    })
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::EngineConfig,
    document::InMemoryTextDocument,
    range::Range,
    scope::ScopeRequirements,
    scope_type::{
      SimpleScopeKind,
      SurroundingPairName,
    },
  };

  #[test]
  fn test_merges_in_document_order() {
    let document = InMemoryTextDocument::new("untitled:one-of", "plaintext", "a (b) https://x.io");
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory
      .create(&ScopeType::OneOf {
        scope_types: vec![
          ScopeType::simple(SimpleScopeKind::Url),
          ScopeType::surrounding_pair(SurroundingPairName::Parentheses),
        ],
      })
      .unwrap();
    let domains: Vec<_> = generate_scopes(
      handler.as_ref(),
      &document,
      Position::zero(),
      Direction::Forward,
      ScopeRequirements::default(),
    )
    .map(|scope| scope.domain)
    .collect();
    assert_eq!(
      domains,
      vec![Range::from_coords(0, 2, 0, 5), Range::from_coords(0, 6, 0, 18)]
    );
  }
}
