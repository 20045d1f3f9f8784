//! Queries the modifier stages run against a scope handler.

use crate::{
  direction::Direction,
  document::TextDocument,
  error::{
    Result,
    TargetError,
  },
  position::Position,
  range::Range,
  scope::{
    Containment,
    ScopeHandler,
    ScopeRequirements,
    TargetScope,
    generate_scopes,
  },
  target::Target,
};

fn touching(
  handler: &dyn ScopeHandler,
  document: &dyn TextDocument,
  position: Position,
  direction: Direction,
) -> Option<TargetScope> {
  generate_scopes(handler, document, position, direction, ScopeRequirements {
    containment: Some(Containment::Required),
    allow_adjacent_scopes: true,
    skip_ancestor_scopes: true,
    ..Default::default()
  })
  .find(|scope| {
    scope.domain.is_empty()
      || match direction {
        Direction::Forward => scope.domain.end > position,
        Direction::Backward => scope.domain.start < position,
      }
  })
}

/// The scope a position belongs to when it may sit between two scopes.
///
/// ```text
///   foo|.bar    `foo` ends here, `.` starts here
/// ```
///
/// A scope strictly containing the position wins, then the smaller of two
/// nested scopes, then whatever the handler prefers; the scope starting at
/// the position wins otherwise.
pub fn preferred_scope_touching_position(
  handler: &dyn ScopeHandler,
  document: &dyn TextDocument,
  position: Position,
  force_direction: Option<Direction>,
) -> Option<TargetScope> {
  if let Some(direction) = force_direction {
    return touching(handler, document, position, direction);
  }

  let forward = touching(handler, document, position, Direction::Forward);
  let backward = touching(handler, document, position, Direction::Backward);
  let (forward, backward) = match (forward, backward) {
    (Some(forward), Some(backward)) => (forward, backward),
    (forward, backward) => return forward.or(backward),
  };
  if forward.domain == backward.domain {
    return Some(forward);
  }

  let forward_strict = forward.domain.strictly_contains(position);
  let backward_strict = backward.domain.strictly_contains(position);
  if forward_strict != backward_strict {
    return Some(if forward_strict { forward } else { backward });
  }
  if forward.domain.contains_range(&backward.domain) {
    return Some(backward);
  }
  if backward.domain.contains_range(&forward.domain) {
    return Some(forward);
  }

  if handler.is_preferred_over(document, &backward, &forward) == Some(true) {
    Some(backward)
  } else {
    Some(forward)
  }
}

/// The first scope containing `position` walking in `direction`.
pub fn containing_scope(
  handler: &dyn ScopeHandler,
  document: &dyn TextDocument,
  position: Position,
  direction: Direction,
) -> Option<TargetScope> {
  generate_scopes(handler, document, position, direction, ScopeRequirements {
    containment: Some(Containment::Required),
    allow_adjacent_scopes: true,
    skip_ancestor_scopes: true,
    ..Default::default()
  })
  .next()
}

/// The `ancestor_index`th scope containing `position`, innermost first.
fn expand_from_position(
  handler: &dyn ScopeHandler,
  document: &dyn TextDocument,
  position: Position,
  direction: Direction,
  ancestor_index: usize,
  allow_adjacent_scopes: bool,
) -> Option<TargetScope> {
  generate_scopes(handler, document, position, direction, ScopeRequirements {
    containment: Some(Containment::Required),
    allow_adjacent_scopes,
    ..Default::default()
  })
  .nth(ancestor_index)
}

/// Targets of the scope containing `target`. A target spanning several
/// scopes yields one range target from the scope holding its start to the
/// one holding its end.
pub fn containing_scope_target(
  handler: &dyn ScopeHandler,
  document: &dyn TextDocument,
  target: &Target,
  ancestor_index: usize,
) -> Result<Option<Vec<Target>>> {
  let is_reversed = target.is_reversed();
  let Range { start, end } = target.content_range();

  if start == end {
    let Some(mut scope) = preferred_scope_touching_position(handler, document, start, None) else {
      return Ok(None);
    };
    if ancestor_index > 0 {
      match expand_from_position(
        handler,
        document,
        scope.domain.end,
        Direction::Backward,
        ancestor_index,
        true,
      ) {
        Some(ancestor) => scope = ancestor,
        None => return Ok(None),
      }
    }
    return Ok(Some(scope.targets(is_reversed)));
  }

  let Some(start_scope) =
    expand_from_position(handler, document, start, Direction::Forward, ancestor_index, false)
  else {
    return Ok(None);
  };
  if start_scope.domain.contains(end) {
    return Ok(Some(start_scope.targets(is_reversed)));
  }

  let Some(end_scope) =
    expand_from_position(handler, document, end, Direction::Backward, ancestor_index, false)
  else {
    return Ok(None);
  };
  construct_scope_range_target(document, is_reversed, &start_scope, &end_scope).map(Some)
}

/// Every scope overlapping `range`, without ancestors of scopes already
/// found.
pub fn scopes_overlapping_range(
  handler: &dyn ScopeHandler,
  document: &dyn TextDocument,
  range: Range,
) -> Vec<TargetScope> {
  generate_scopes(handler, document, range.start, Direction::Forward, ScopeRequirements {
    distal_position: Some(range.end),
    skip_ancestor_scopes: true,
    allow_adjacent_scopes: handler.include_adjacent_in_every(),
    ..Default::default()
  })
  .collect()
}

/// The `offset`th scope from `position`, counting from one.
pub fn scope_relative_to_position(
  handler: &dyn ScopeHandler,
  document: &dyn TextDocument,
  position: Position,
  offset: usize,
  direction: Direction,
) -> Result<TargetScope> {
  offset
    .checked_sub(1)
    .and_then(|skip| {
      generate_scopes(handler, document, position, direction, ScopeRequirements {
        skip_ancestor_scopes: true,
        ..Default::default()
      })
      .nth(skip)
    })
    .ok_or_else(|| {
      TargetError::out_of_range(handler.scope_type().name(), offset as isize)
    })
}

/// One target running from the first scope to the second, in document
/// order whichever comes first.
pub fn construct_scope_range_target(
  document: &dyn TextDocument,
  is_reversed: bool,
  first: &TargetScope,
  second: &TargetScope,
) -> Result<Vec<Target>> {
  if first == second {
    return Ok(first.targets(is_reversed));
  }
  let (mut first_targets, mut second_targets) =
    (first.targets(is_reversed), second.targets(is_reversed));
  let (Some(a), Some(b)) = (first_targets.pop(), second_targets.pop()) else {
    return Err(TargetError::Precondition(
      "scope range needs one target at each end".to_string(),
    ));
  };
  if !first_targets.is_empty() || !second_targets.is_empty() {
    return Err(TargetError::Precondition(
      "scope range needs one target at each end".to_string(),
    ));
  }

  let (start, end) = if b.content_range().start >= a.content_range().start {
    (a, b)
  } else {
    (b, a)
  };
  Ok(vec![start.create_continuous_range_target(
    &end,
    is_reversed,
    true,
    true,
    document,
  )])
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::EngineConfig,
    document::InMemoryTextDocument,
    scope::ScopeHandlerFactory,
    scope_type::{
      ScopeType,
      SurroundingPairName,
    },
  };

  fn with_handler<R>(
    scope_type: ScopeType,
    text: &str,
    f: impl FnOnce(&dyn ScopeHandler, &InMemoryTextDocument) -> R,
  ) -> R {
    let document = InMemoryTextDocument::new("untitled:query", "plaintext", text);
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory.create(&scope_type).unwrap();
    f(handler.as_ref(), &document)
  }

  #[test]
  fn test_preferred_scope_prefers_identifier() {
    with_handler(ScopeType::token(), "aa.bb", |handler, document| {
      let scope =
        preferred_scope_touching_position(handler, document, Position::new(0, 2), None).unwrap();
      assert_eq!(scope.domain, Range::from_coords(0, 0, 0, 2));
    });
    with_handler(ScopeType::token(), "aa bb", |handler, document| {
      let scope =
        preferred_scope_touching_position(handler, document, Position::new(0, 3), None).unwrap();
      assert_eq!(scope.domain, Range::from_coords(0, 3, 0, 5));
    });
  }

  #[test]
  fn test_containing_token_at_document_start() {
    with_handler(ScopeType::token(), "Hello, world!", |handler, document| {
      let target = Target::untyped(Range::empty(Position::zero()), false, false);
      let targets = containing_scope_target(handler, document, &target, 0)
        .unwrap()
        .unwrap();
      assert_eq!(targets.len(), 1);
      assert_eq!(targets[0].content_range(), Range::from_coords(0, 0, 0, 5));
    });
  }

  #[test]
  fn test_range_spanning_scopes_becomes_range_target() {
    with_handler(ScopeType::token(), "one two three", |handler, document| {
      let target = Target::untyped(Range::from_coords(0, 1, 0, 5), true, true);
      let targets = containing_scope_target(handler, document, &target, 0)
        .unwrap()
        .unwrap();
      assert_eq!(targets.len(), 1);
      assert_eq!(targets[0].content_range(), Range::from_coords(0, 0, 0, 7));
      assert!(targets[0].is_reversed());
    });
  }

  #[test]
  fn test_ancestor_pairs() {
    let pair = ScopeType::surrounding_pair(SurroundingPairName::Any);
    with_handler(pair, "a (b [c] d) e", |handler, document| {
      let target = Target::untyped(Range::empty(Position::new(0, 6)), false, false);
      let outer = containing_scope_target(handler, document, &target, 1)
        .unwrap()
        .unwrap();
      assert_eq!(outer[0].content_range(), Range::from_coords(0, 2, 0, 11));
    });
  }

  #[test]
  fn test_overlapping_and_relative_scopes() {
    with_handler(ScopeType::token(), "a b c d", |handler, document| {
      let overlapping = scopes_overlapping_range(handler, document, Range::from_coords(0, 1, 0, 5));
      let domains: Vec<_> = overlapping.iter().map(|scope| scope.domain).collect();
      assert_eq!(
        domains,
        vec![Range::from_coords(0, 2, 0, 3), Range::from_coords(0, 4, 0, 5)]
      );

      let second =
        scope_relative_to_position(handler, document, Position::new(0, 1), 2, Direction::Forward)
          .unwrap();
      assert_eq!(second.domain, Range::from_coords(0, 4, 0, 5));
      assert!(
        scope_relative_to_position(handler, document, Position::new(0, 1), 9, Direction::Forward)
          .is_err()
      );
    });
  }
}
