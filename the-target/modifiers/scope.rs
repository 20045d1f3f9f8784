use crate::{
  direction::Direction,
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
    ScopeHandler,
    TargetScope,
    generate_scopes,
    query::{
      containing_scope_target,
      scopes_overlapping_range,
    },
  },
  scope_type::{
    ScopeType,
    SimpleScopeKind,
    SurroundingPairDirection,
    SurroundingPairName,
  },
  surrounding_pair::SurroundingPairFinder,
  target::Target,
};

pub struct ContainingScopeStage<'m> {
  pub scope_type:     &'m ScopeType,
  pub ancestor_index: usize,
}

impl ModifierStage for ContainingScopeStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let pair = match self.scope_type {
      ScopeType::SurroundingPair {
        delimiter,
        force_direction,
        require_strong_containment,
      } => Some((*delimiter, *force_direction, *require_strong_containment)),
      ScopeType::Simple(simple) if simple.kind == SimpleScopeKind::String => {
        Some((SurroundingPairName::String, None, false))
      },
      _ => None,
    };
    if let Some((delimiter, force_direction, strong)) = pair {
      let finder = SurroundingPairFinder::new(cx.handlers.config(), cx.handlers.language_id(), delimiter)?;
      return containing_pair(cx, &finder, target, delimiter, force_direction, strong, self.ancestor_index);
    }

    let handler = cx.handler(self.scope_type)?;
    containing_scope_target(handler.as_ref(), cx.document, target, self.ancestor_index)?
      .ok_or_else(|| TargetError::no_containing(self.scope_type.name()))
  }
}

/// Each further ancestor must strictly surround the pair found before it.
fn containing_pair(
  cx: &StageContext<'_>,
  finder: &SurroundingPairFinder,
  target: &Target,
  delimiter: SurroundingPairName,
  force_direction: Option<SurroundingPairDirection>,
  require_strong_containment: bool,
  ancestor_index: usize,
) -> Result<Vec<Target>> {
  let mut selection = target.content_range();
  let mut strong = require_strong_containment;
  let mut found = None;
  for _ in 0..=ancestor_index {
    let pair = finder
      .find(cx.document, selection, force_direction, strong)
      .ok_or_else(|| TargetError::PairNotFound {
        delimiter: delimiter.as_str().to_string(),
      })?;
    selection = pair.content_range();
    strong = true;
    found = Some(pair);
  }
  Ok(found
    .map(|pair| pair.to_target(target.is_reversed()))
    .into_iter()
    .collect())
}

/// The containing scope, or failing that the nearest scope on either side.
pub struct PreferredScopeStage<'m> {
  pub scope_type: &'m ScopeType,
}

impl ModifierStage for PreferredScopeStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let containing = ContainingScopeStage {
      scope_type:     self.scope_type,
      ancestor_index: 0,
    };
    match containing.run(cx, target) {
      Err(TargetError::NoContainingScope { .. } | TargetError::PairNotFound { .. }) => {},
      result => return result,
    }

    let handler = cx.handler(self.scope_type)?;
    closest_scope(handler.as_ref(), cx, target.content_range())
      .map(|scope| scope.targets(target.is_reversed()))
      .ok_or_else(|| TargetError::no_containing(self.scope_type.name()))
  }
}

fn closest_scope(
  handler: &dyn ScopeHandler,
  cx: &StageContext<'_>,
  range: Range,
) -> Option<TargetScope> {
  let first = |position, direction| {
    generate_scopes(handler, cx.document, position, direction, Default::default()).next()
  };
  let previous = first(range.start, Direction::Backward);
  let next = first(range.end, Direction::Forward);

  match (previous, next) {
    (None, next) => next,
    (previous, None) => previous,
    (Some(previous), Some(next)) => {
      let before = distance(previous.domain.end, range.start);
      let after = distance(range.end, next.domain.start);
      if before < after { Some(previous) } else { Some(next) }
    },
  }
}

/// Lines first, then characters.
fn distance(from: Position, to: Position) -> (usize, usize) {
  let lines = to.line.saturating_sub(from.line);
  if lines == 0 {
    (0, to.character.saturating_sub(from.character))
  } else {
    (lines, 0)
  }
}

pub struct EveryScopeStage<'m> {
  pub scope_type: &'m ScopeType,
}

impl ModifierStage for EveryScopeStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    every_scope_targets(cx, self.scope_type, target)
  }
}

/// Every scope inside `target` if it is an explicit range spanning more
/// than one scope, otherwise every scope in its iteration scope.
pub fn every_scope_targets(
  cx: &StageContext<'_>,
  scope_type: &ScopeType,
  target: &Target,
) -> Result<Vec<Target>> {
  let handler = cx.handler(scope_type)?;
  let handler = handler.as_ref();
  let content = target.content_range();

  let mut scopes = None;
  if target.has_explicit_range() {
    let overlapping = scopes_overlapping_range(handler, cx.document, content);
    let only_one_containing =
      overlapping.len() == 1 && overlapping[0].domain.contains_range(&content);
    if !only_one_containing {
      scopes = Some(overlapping);
    }
  }

  let scopes = match scopes {
    Some(scopes) => scopes,
    None => iteration_ranges(cx, handler, target)?
      .into_iter()
      .flat_map(|range| scopes_overlapping_range(handler, cx.document, range))
      .collect(),
  };

  if scopes.is_empty() {
    return Err(TargetError::no_containing(scope_type.name()));
  }
  Ok(
    scopes
      .iter()
      .flat_map(|scope| scope.targets(target.is_reversed()))
      .collect(),
  )
}

fn iteration_ranges(
  cx: &StageContext<'_>,
  handler: &dyn ScopeHandler,
  target: &Target,
) -> Result<Vec<Range>> {
  let iteration = handler.iteration_scope_handler(&cx.handlers)?;
  containing_scope_target(iteration.as_ref(), cx.document, target, 0)?
    .map(|targets| targets.iter().map(Target::content_range).collect())
    .ok_or_else(|| {
      TargetError::no_containing(format!("iteration scope for {}", handler.scope_type().name()))
    })
}

pub struct OrdinalScopeStage<'m> {
  pub scope_type: &'m ScopeType,
  pub start:      isize,
  pub length:     usize,
  pub is_every:   bool,
}

impl ModifierStage for OrdinalScopeStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let targets = every_scope_targets(cx, self.scope_type, target)?;
    let count = targets.len() as isize;
    let start = if self.start < 0 { self.start + count } else { self.start };
    let end = start + self.length as isize - 1;
    if self.length == 0 || start < 0 || end >= count {
      return Err(TargetError::out_of_range(self.scope_type.name(), self.start));
    }

    let (start, end) = (start as usize, end as usize);
    if self.is_every {
      return Ok(targets[start..=end].to_vec());
    }
    if start == end {
      return Ok(vec![targets[start].clone()]);
    }
    Ok(vec![targets[start].create_continuous_range_target(
      &targets[end],
      target.is_reversed(),
      true,
      true,
      cx.document,
    )])
  }
}

#[cfg(test)]
mod test {
  use crate::{
    error::TargetError,
    modifier::Modifier,
    modifiers::test::{
      cursor,
      resolve,
      resolve_targets,
    },
    range::Range,
    scope_type::{
      ScopeType,
      SimpleScopeKind,
      SurroundingPairName,
    },
  };

  fn pair(name: SurroundingPairName) -> ScopeType {
    ScopeType::surrounding_pair(name)
  }

  #[test]
  fn test_containing_token() {
    assert_eq!(
      resolve("Hello, world!", cursor(0, 0), &[Modifier::containing(ScopeType::token())]).unwrap(),
      vec![Range::from_coords(0, 0, 0, 5)]
    );
  }

  #[test]
  fn test_containing_pair_and_ancestor() {
    let text = "f(a, [b], c)";
    assert_eq!(
      resolve(text, cursor(0, 6), &[Modifier::containing(pair(SurroundingPairName::Any))])
        .unwrap(),
      vec![Range::from_coords(0, 5, 0, 8)]
    );
    assert_eq!(
      resolve(text, cursor(0, 6), &[Modifier::ContainingScope {
        scope_type:     pair(SurroundingPairName::Any),
        ancestor_index: 1,
      }])
      .unwrap(),
      vec![Range::from_coords(0, 1, 0, 12)]
    );
    assert_eq!(
      resolve(text, cursor(0, 6), &[Modifier::ContainingScope {
        scope_type:     pair(SurroundingPairName::Any),
        ancestor_index: 2,
      }]),
      Err(TargetError::PairNotFound {
        delimiter: "any".into(),
      })
    );
  }

  #[test]
  fn test_containing_string_uses_quotes() {
    assert_eq!(
      resolve(
        "say \"hi there\" now",
        cursor(0, 8),
        &[Modifier::containing(ScopeType::simple(SimpleScopeKind::String))]
      )
      .unwrap(),
      vec![Range::from_coords(0, 4, 0, 14)]
    );
  }

  #[test]
  fn test_no_containing_scope() {
    assert_eq!(
      resolve("\n\nfoo", cursor(0, 0), &[Modifier::containing(ScopeType::simple(
        SimpleScopeKind::Paragraph
      ))]),
      Err(TargetError::no_containing("paragraph"))
    );
  }

  #[test]
  fn test_preferred_scope_falls_back_to_nearest() {
    assert_eq!(
      resolve("foo   (bar)", cursor(0, 4), &[Modifier::PreferredScope {
        scope_type: pair(SurroundingPairName::Parentheses),
      }])
      .unwrap(),
      vec![Range::from_coords(0, 6, 0, 11)]
    );
  }

  #[test]
  fn test_every_uses_iteration_scope_or_explicit_range() {
    assert_eq!(
      resolve("a b\nc d", cursor(1, 0), &[Modifier::every(ScopeType::token())]).unwrap(),
      vec![Range::from_coords(1, 0, 1, 1), Range::from_coords(1, 2, 1, 3)]
    );
    assert_eq!(
      resolve("a b c d", Range::from_coords(0, 2, 0, 5), &[Modifier::every(
        ScopeType::token()
      )])
      .unwrap(),
      vec![Range::from_coords(0, 2, 0, 3), Range::from_coords(0, 4, 0, 5)]
    );
    // A range inside a single scope iterates the whole line.
    assert_eq!(
      resolve("abc d", Range::from_coords(0, 1, 0, 2), &[Modifier::every(
        ScopeType::token()
      )])
      .unwrap()
      .len(),
      2
    );
  }

  #[test]
  fn test_ordinal_scopes() {
    let ordinal = |start, length, is_every| Modifier::OrdinalScope {
      scope_type: ScopeType::token(),
      start,
      length,
      is_every,
    };
    let text = "a b c d";
    assert_eq!(
      resolve(text, cursor(0, 0), &[ordinal(1, 2, false)]).unwrap(),
      vec![Range::from_coords(0, 2, 0, 5)]
    );
    assert_eq!(
      resolve(text, cursor(0, 0), &[ordinal(-1, 1, false)]).unwrap(),
      vec![Range::from_coords(0, 6, 0, 7)]
    );
    assert_eq!(
      resolve(text, cursor(0, 0), &[ordinal(0, 2, true)]).unwrap().len(),
      2
    );
    assert_eq!(
      resolve(text, cursor(0, 0), &[ordinal(3, 2, false)]),
      Err(TargetError::out_of_range("token", 3))
    );
  }

  #[test]
  fn test_every_targets_keep_direction() {
    let targets = resolve_targets("a b", Range::from_coords(0, 0, 0, 3), &[Modifier::every(
      ScopeType::token(),
    )])
    .unwrap();
    assert!(targets.iter().all(|target| !target.is_reversed()));
  }
}
