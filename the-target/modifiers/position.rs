use crate::{
  error::{
    Result,
    TargetError,
  },
  modifier::Modifier,
  modifiers::{
    ContainingTokenIfUntypedEmptyStage,
    ModifierStage,
    StageContext,
    apply_modifiers,
  },
  range::Range,
  scope_type::ScopeType,
  target::{
    Target,
    TargetKind,
  },
};

fn position_target(target: &Target, at_start: bool) -> Target {
  let content = target.content_range();
  let position = if at_start { content.start } else { content.end };
  Target::new(
    TargetKind::Plain {
      insertion_delimiter: target.insertion_delimiter().into(),
    },
    Range::empty(position),
    target.is_reversed(),
  )
}

pub struct StartOfStage;

impl ModifierStage for StartOfStage {
  fn run(&self, _cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    Ok(vec![position_target(target, true)])
  }
}

pub struct EndOfStage;

impl ModifierStage for EndOfStage {
  fn run(&self, _cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    Ok(vec![position_target(target, false)])
  }
}

pub struct LeadingStage;

impl ModifierStage for LeadingStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let mut found = Vec::new();
    for target in ContainingTokenIfUntypedEmptyStage.run(cx, target)? {
      let leading = target
        .leading_delimiter(cx.document)
        .ok_or_else(|| TargetError::no_containing("leading delimiter"))?;
      found.push(leading);
    }
    Ok(found)
  }
}

pub struct TrailingStage;

impl ModifierStage for TrailingStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let mut found = Vec::new();
    for target in ContainingTokenIfUntypedEmptyStage.run(cx, target)? {
      let trailing = target
        .trailing_delimiter(cx.document)
        .ok_or_else(|| TargetError::no_containing("trailing delimiter"))?;
      found.push(trailing);
    }
    Ok(found)
  }
}

/// One target per visible range of the editor.
pub struct VisibleStage;

impl ModifierStage for VisibleStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    Ok(
      cx.visible_ranges
        .iter()
        .map(|range| Target::plain(*range, target.is_reversed()))
        .collect(),
    )
  }
}

pub struct RawSelectionStage;

impl ModifierStage for RawSelectionStage {
  fn run(&self, _cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    Ok(vec![Target::raw_selection(
      target.content_range(),
      target.is_reversed(),
    )])
  }
}

/// `head` / `tail`: from the start (or end) of an enclosing target, by
/// default the line, through the target.
pub struct HeadTailStage<'m> {
  pub modifiers: Option<&'m [Modifier]>,
  pub is_head:   bool,
}

impl ModifierStage for HeadTailStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let default_modifiers;
    let modifiers = match self.modifiers {
      Some(modifiers) if !modifiers.is_empty() => modifiers,
      _ => {
        default_modifiers = [Modifier::ModifyIfUntyped {
          modifier: Box::new(Modifier::containing(ScopeType::line())),
        }];
        &default_modifiers[..]
      },
    };

    let content = target.content_range();
    Ok(
      apply_modifiers(cx, modifiers, vec![target.clone()])?
        .iter()
        .map(|modified| {
          let outer = modified.content_range();
          if self.is_head {
            Target::untyped(Range::new(outer.start, content.end), true, true)
          } else {
            Target::untyped(Range::new(content.start, outer.end), false, true)
          }
        })
        .collect(),
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::modifiers::test::{
    cursor,
    resolve,
    resolve_targets,
  };

  #[test]
  fn test_start_and_end_of() {
    let range = Range::from_coords(0, 2, 0, 5);
    assert_eq!(resolve("abcdefg", range, &[Modifier::StartOf]).unwrap(), vec![
      cursor(0, 2)
    ]);
    assert_eq!(resolve("abcdefg", range, &[Modifier::EndOf]).unwrap(), vec![
      cursor(0, 5)
    ]);
  }

  #[test]
  fn test_leading_and_trailing() {
    let text = "aa   bb cc";
    assert_eq!(resolve(text, cursor(0, 6), &[Modifier::Leading]).unwrap(), vec![
      Range::from_coords(0, 2, 0, 5)
    ]);
    assert_eq!(resolve(text, cursor(0, 6), &[Modifier::Trailing]).unwrap(), vec![
      Range::from_coords(0, 7, 0, 8)
    ]);
    assert_eq!(
      resolve(text, cursor(0, 9), &[Modifier::Trailing]),
      Err(TargetError::no_containing("trailing delimiter"))
    );
  }

  #[test]
  fn test_head_and_tail_default_to_line() {
    let text = "  one two three";
    let head = resolve_targets(text, cursor(0, 8), &[Modifier::ExtendThroughStartOf {
      modifiers: None,
    }])
    .unwrap();
    assert_eq!(head[0].content_range(), Range::from_coords(0, 2, 0, 8));
    assert!(head[0].is_reversed());

    let tail = resolve(text, cursor(0, 8), &[Modifier::ExtendThroughEndOf {
      modifiers: None,
    }])
    .unwrap();
    assert_eq!(tail, vec![Range::from_coords(0, 8, 0, 15)]);
  }

  #[test]
  fn test_raw_selection_and_visible() {
    let raw = resolve_targets("abc", cursor(0, 1), &[Modifier::ToRawSelection]).unwrap();
    assert!(raw[0].is_raw());
    assert_eq!(
      resolve("ab\ncd", cursor(0, 1), &[Modifier::Visible]).unwrap(),
      vec![Range::from_coords(0, 0, 1, 2)]
    );
  }
}
