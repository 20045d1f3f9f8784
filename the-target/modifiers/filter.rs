use crate::{
  error::Result,
  modifiers::{
    ModifierStage,
    StageContext,
    scope::ContainingScopeStage,
  },
  scope_type::{
    ScopeType,
    SurroundingPairName,
  },
  target::Target,
};

pub struct KeepContentFilterStage;

impl ModifierStage for KeepContentFilterStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let keep = !target.content_text(cx.document).trim().is_empty();
    Ok(keep.then(|| target.clone()).into_iter().collect())
  }
}

pub struct KeepEmptyFilterStage;

impl ModifierStage for KeepEmptyFilterStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let keep = target.content_text(cx.document).trim().is_empty();
    Ok(keep.then(|| target.clone()).into_iter().collect())
  }
}

/// The nearest pair of any kind around `target`.
fn containing_any_pair(
  cx: &StageContext<'_>,
  target: &Target,
  require_strong_containment: bool,
) -> Result<Vec<Target>> {
  let scope_type = ScopeType::SurroundingPair {
    delimiter: SurroundingPairName::Any,
    force_direction: None,
    require_strong_containment,
  };
  ContainingScopeStage {
    scope_type:     &scope_type,
    ancestor_index: 0,
  }
  .run(cx, target)
}

/// The target's own interior, or that of the pair around it.
pub struct InteriorOnlyStage;

impl ModifierStage for InteriorOnlyStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    if let Some(interior) = target.interior() {
      return Ok(interior);
    }
    Ok(
      containing_any_pair(cx, target, true)?
        .iter()
        .filter_map(Target::interior)
        .flatten()
        .collect(),
    )
  }
}

/// The target's delimiters without what they enclose.
pub struct ExcludeInteriorStage;

impl ModifierStage for ExcludeInteriorStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    if let Some(boundary) = target.boundary() {
      return Ok(boundary);
    }
    Ok(
      containing_any_pair(cx, target, false)?
        .iter()
        .filter_map(Target::boundary)
        .flatten()
        .collect(),
    )
  }
}

#[cfg(test)]
mod test {
  use crate::{
    modifier::Modifier,
    modifiers::test::{
      cursor,
      resolve,
    },
    range::Range,
    scope_type::ScopeType,
  };

  #[test]
  fn test_interior_and_boundary() {
    let text = "f(ab, [cd])";
    assert_eq!(resolve(text, cursor(0, 3), &[Modifier::InteriorOnly]).unwrap(), vec![
      Range::from_coords(0, 2, 0, 10)
    ]);
    assert_eq!(
      resolve(text, cursor(0, 8), &[Modifier::ExcludeInterior]).unwrap(),
      vec![Range::from_coords(0, 6, 0, 7), Range::from_coords(0, 9, 0, 10)]
    );
  }

  #[test]
  fn test_keep_filters() {
    let every_line = Modifier::every(ScopeType::line());
    let text = "one\n  \nthree";
    let whole = Range::from_coords(0, 0, 2, 5);
    assert_eq!(
      resolve(text, whole, &[every_line.clone(), Modifier::KeepContentFilter])
        .unwrap()
        .len(),
      2
    );
    assert_eq!(
      resolve(text, whole, &[every_line, Modifier::KeepEmptyFilter]).unwrap(),
      vec![Range::from_coords(1, 2, 1, 2)]
    );
  }
}
