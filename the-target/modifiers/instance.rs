//! `every instance`, `second instance`, `next instance`: other occurrences
//! of the target's text.

use the_core::text::Utf16Cursor;

use crate::{
  direction::Direction,
  error::{
    Result,
    TargetError,
  },
  modifier::Modifier,
  modifiers::{
    ContainingTokenIfUntypedEmptyStage,
    ModifierStage,
    StageContext,
  },
  range::Range,
  scope::query::containing_scope_target,
  target::Target,
};

pub struct InstanceStage<'m> {
  pub modifier: &'m Modifier,
}

impl ModifierStage for InstanceStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let target = ContainingTokenIfUntypedEmptyStage
      .run(cx, target)?
      .into_iter()
      .next()
      .unwrap_or_else(|| target.clone());

    match *self.modifier {
      Modifier::EveryScope { .. } => {
        let mut found = Vec::new();
        for range in search_ranges(cx) {
          found.extend(instances(cx, &target, range, Direction::Forward)?);
        }
        Ok(found)
      },
      Modifier::OrdinalScope { start, length, .. } => {
        let (direction, skip) = if start >= 0 {
          (Direction::Forward, start)
        } else {
          (Direction::Backward, -(length as isize + start))
        };
        let skip = usize::try_from(skip).map_err(|_| TargetError::out_of_range("instance", start))?;
        let mut found = Vec::new();
        for range in search_ranges(cx) {
          found.extend(take_from_offset(
            instances(cx, &target, range, direction)?,
            skip,
            length,
            start,
          )?);
        }
        Ok(found)
      },
      Modifier::RelativeScope {
        offset,
        length,
        direction,
        ..
      } => {
        let references = cx
          .instance_reference
          .map_or_else(|| vec![target.clone()], <[Target]>::to_vec);
        let document_range = cx.document.range();
        let mut found = Vec::new();
        for reference in references {
          let content = reference.content_range();
          let range = match direction {
            Direction::Forward => Range::new(
              if offset == 0 { content.start } else { content.end },
              document_range.end,
            ),
            Direction::Backward => Range::new(
              document_range.start,
              if offset == 0 { content.end } else { content.start },
            ),
          };
          found.extend(take_from_offset(
            instances(cx, &target, range, direction)?,
            offset.saturating_sub(1),
            length,
            (offset + length) as isize - 1,
          )?);
        }
        Ok(found)
      },
      ref other => Err(TargetError::UnsupportedModifier(format!(
        "{} instance",
        other.type_name()
      ))),
    }
  }
}

fn search_ranges(cx: &StageContext<'_>) -> Vec<Range> {
  cx.instance_reference.map_or_else(
    || vec![cx.document.range()],
    |references| references.iter().map(Target::content_range).collect(),
  )
}

fn take_from_offset(
  instances: Vec<Target>,
  skip: usize,
  count: usize,
  index: isize,
) -> Result<Vec<Target>> {
  let taken: Vec<_> = instances.into_iter().skip(skip).take(count).collect();
  if taken.len() < count {
    return Err(TargetError::out_of_range("instance", index));
  }
  Ok(taken)
}

/// Occurrences of the target's text inside `range`, nearest first. Lines,
/// tokens and words only match whole lines, tokens and words.
fn instances(
  cx: &StageContext<'_>,
  target: &Target,
  range: Range,
  direction: Direction,
) -> Result<Vec<Target>> {
  let needle = target.content_text(cx.document);
  if needle.is_empty() {
    return Err(TargetError::no_containing("instance"));
  }

  let haystack = cx.document.text_in(range);
  let base = cx.document.offset_at(range.start);
  let mut cursor = Utf16Cursor::new(&haystack);
  let mut matches: Vec<Range> = haystack
    .match_indices(needle.as_str())
    .map(|(start, text)| {
      let start_utf16 = cursor.to_utf16(start);
      let end_utf16 = cursor.to_utf16(start + text.len());
      Range::new(
        cx.document.position_at(base + start_utf16),
        cx.document.position_at(base + end_utf16),
      )
    })
    .collect();
  if direction == Direction::Backward {
    matches.reverse();
  }

  let Some(filter) = target.instance_filter() else {
    return Ok(
      matches
        .into_iter()
        .map(|range| Target::plain(range, false))
        .collect(),
    );
  };

  let handler = cx.handler(&filter)?;
  let mut found = Vec::new();
  for range in matches {
    let candidate = Target::plain(range, false);
    let containing = match containing_scope_target(handler.as_ref(), cx.document, &candidate, 0) {
      Ok(Some(targets)) => targets,
      Ok(None) | Err(_) => continue,
    };
    if let [only] = containing.as_slice() {
      if only.content_range() == range {
        found.push(only.clone());
      }
    }
  }
  Ok(found)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    modifiers::test::{
      cursor,
      resolve,
    },
    scope_type::{
      ScopeType,
      SimpleScopeKind,
    },
  };

  fn instance() -> ScopeType {
    ScopeType::simple(SimpleScopeKind::Instance)
  }

  #[test]
  fn test_every_instance_matches_whole_tokens() {
    let text = "air bat air airy air";
    assert_eq!(
      resolve(text, cursor(0, 1), &[Modifier::every(instance())]).unwrap(),
      vec![
        Range::from_coords(0, 0, 0, 3),
        Range::from_coords(0, 8, 0, 11),
        Range::from_coords(0, 17, 0, 20),
      ]
    );
  }

  #[test]
  fn test_next_and_last_instance() {
    let text = "air bat air bat air";
    assert_eq!(
      resolve(text, Range::from_coords(0, 4, 0, 7), &[Modifier::RelativeScope {
        scope_type: instance(),
        offset:     1,
        length:     1,
        direction:  Direction::Forward,
        is_every:   false,
      }])
      .unwrap(),
      vec![Range::from_coords(0, 12, 0, 15)]
    );
    assert_eq!(
      resolve(text, cursor(0, 0), &[Modifier::OrdinalScope {
        scope_type: instance(),
        start:      -1,
        length:     1,
        is_every:   false,
      }])
      .unwrap(),
      vec![Range::from_coords(0, 16, 0, 19)]
    );
    assert_eq!(
      resolve(text, cursor(0, 0), &[Modifier::OrdinalScope {
        scope_type: instance(),
        start:      3,
        length:     1,
        is_every:   false,
      }]),
      Err(TargetError::out_of_range("instance", 3))
    );
  }
}
