//! `next token`, `previous two lines`, `token backward` and friends.
//!
//! Offset zero counts the scope at the target as the first one. Any other
//! offset skips the target's own scope, and scopes hidden inside an
//! interior the target is not in:
//!
//! ```text
//!   |(a (b) c) (d)     next pair: `(d)`, not `(b)`
//! ```

use crate::{
  direction::Direction,
  document::TextDocument,
  error::{
    Result,
    TargetError,
  },
  modifiers::{
    ModifierStage,
    StageContext,
  },
  position::Position,
  range::Range,
  scope::{
    Containment,
    ScopeHandler,
    ScopeRequirements,
    TargetScope,
    generate_scopes,
    query::{
      construct_scope_range_target,
      preferred_scope_touching_position,
      scopes_overlapping_range,
    },
  },
  scope_type::{
    ScopeType,
    SimpleScopeKind,
  },
  target::Target,
};

pub struct RelativeScopeStage<'m> {
  pub scope_type: &'m ScopeType,
  pub offset:     usize,
  pub length:     usize,
  pub direction:  Direction,
  pub is_every:   bool,
}

impl ModifierStage for RelativeScopeStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    if self.length == 0 {
      return Err(self.out_of_range());
    }
    let handler = cx.handler(self.scope_type)?;
    let handler = handler.as_ref();
    let scopes = if self.offset == 0 {
      self.inclusive_scopes(handler, cx.document, target)?
    } else {
      self.exclusive_scopes(cx, handler, target)?
    };

    let (Some(first), Some(last)) = (scopes.first(), scopes.last()) else {
      return Err(self.out_of_range());
    };
    if scopes.len() < self.length {
      return Err(self.out_of_range());
    }

    if self.is_every {
      return Ok(
        scopes
          .iter()
          .flat_map(|scope| scope.targets(target.is_reversed()))
          .collect(),
      );
    }
    construct_scope_range_target(cx.document, target.is_reversed(), first, last)
  }
}

impl RelativeScopeStage<'_> {
  fn out_of_range(&self) -> TargetError {
    TargetError::out_of_range(
      self.scope_type.name(),
      (self.offset + self.length) as isize - 1,
    )
  }

  /// The scopes the target already covers, then as many more as needed.
  fn inclusive_scopes(
    &self,
    handler: &dyn ScopeHandler,
    document: &dyn TextDocument,
    target: &Target,
  ) -> Result<Vec<TargetScope>> {
    let content = target.content_range();
    let direction = self.direction;

    let mut scopes = if content.is_empty() {
      let position = content.start;
      let initial = preferred_scope_touching_position(handler, document, position, Some(direction))
        .or_else(|| {
          preferred_scope_touching_position(handler, document, position, Some(direction.opposite()))
        })
        .ok_or_else(|| TargetError::no_containing(self.scope_type.name()))?;
      vec![initial]
    } else {
      let mut covered = scopes_overlapping_range(handler, document, content);
      if covered.is_empty() {
        return Err(TargetError::no_containing(self.scope_type.name()));
      }
      if covered.len() > self.length {
        return Err(TargetError::TooFewScopes {
          requested:  self.length,
          found:      covered.len(),
          scope_type: self.scope_type.name().into_owned(),
        });
      }
      if direction == Direction::Backward {
        covered.reverse();
      }
      covered
    };

    let Some(last) = scopes.last() else {
      return Ok(scopes);
    };
    let remaining = self.length - scopes.len();
    if remaining > 0 {
      let from = match direction {
        Direction::Forward => last.domain.end,
        Direction::Backward => last.domain.start,
      };
      scopes.extend(
        generate_scopes(handler, document, from, direction, ScopeRequirements {
          skip_ancestor_scopes: true,
          ..Default::default()
        })
        .take(remaining),
      );
    }
    Ok(scopes)
  }

  fn exclusive_scopes(
    &self,
    cx: &StageContext<'_>,
    handler: &dyn ScopeHandler,
    target: &Target,
  ) -> Result<Vec<TargetScope>> {
    let content = target.content_range();
    let initial = match self.direction {
      Direction::Forward => content.end,
      Direction::Backward => content.start,
    };
    // From an empty target, skip any scope touching it; otherwise only
    // skip scopes surrounding the starting point.
    let containment = if content.is_empty() {
      Containment::Disallowed
    } else {
      Containment::DisallowedIfStrict
    };
    let excluded = excluded_interior_ranges(cx, handler, initial, self.direction)?;

    Ok(
      generate_scopes(handler, cx.document, initial, self.direction, ScopeRequirements {
        containment: Some(containment),
        skip_ancestor_scopes: true,
        ..Default::default()
      })
      .filter(|scope| !excluded.iter().any(|range| range.contains_range(&scope.domain)))
      .skip(self.offset - 1)
      .take(self.length)
      .collect(),
    )
  }
}

/// Interiors inside the scope around `position` whose contents should not
/// count as neighbours. Interiors holding `position` itself are kept.
fn excluded_interior_ranges(
  cx: &StageContext<'_>,
  handler: &dyn ScopeHandler,
  position: Position,
  direction: Direction,
) -> Result<Vec<Range>> {
  let containing = generate_scopes(handler, cx.document, position, direction, ScopeRequirements {
    containment: Some(Containment::Required),
    allow_adjacent_scopes: true,
    skip_ancestor_scopes: true,
    ..Default::default()
  })
  .next()
  .and_then(|scope| scope.targets(false).into_iter().next());
  let Some(containing) = containing else {
    return Ok(Vec::new());
  };

  let not_holding = |targets: Vec<Target>| -> Vec<Range> {
    targets
      .iter()
      .map(Target::content_range)
      .filter(|range| !range.contains(position))
      .collect()
  };

  if let Some(interior) = containing.interior() {
    return Ok(not_holding(interior));
  }

  let interior_handler = cx.handler(&ScopeType::simple(SimpleScopeKind::Interior))?;
  let content = containing.content_range();
  let (from, distal) = match direction {
    Direction::Forward => (content.start, content.end),
    Direction::Backward => (content.end, content.start),
  };
  let interiors: Vec<Target> =
    generate_scopes(interior_handler.as_ref(), cx.document, from, direction, ScopeRequirements {
      distal_position: Some(distal),
      skip_ancestor_scopes: true,
      ..Default::default()
    })
    .flat_map(|scope| scope.targets(false))
    .collect();

  if interiors.is_empty() {
    return Ok(vec![content]);
  }
  Ok(not_holding(interiors))
}
