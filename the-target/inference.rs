//! Fills in what a command left implicit.
//!
//! A primitive without its own modifiers reuses the modifiers of the
//! closest earlier target, so "air and bat" style lists share a scope. A
//! primitive carrying `inferPreviousMark` and no mark reuses the previous
//! mark. Continuous ranges whose anchor holds an `everyScope` modifier
//! become *every* ranges over that scope type.

use crate::{
  descriptor::{
    FullRangeType,
    PartialPrimitiveTargetDescriptor,
    PartialRangeTargetDescriptor,
    PartialTargetDescriptor,
    PrimitiveTargetDescriptor,
    RangeAnchor,
    RangeTargetDescriptor,
    RangeType,
    TargetDescriptor,
  },
  error::{
    Result,
    TargetError,
  },
  mark::Mark,
  modifier::Modifier,
  scope_type::ScopeType,
};

pub fn infer_full_targets(targets: &[PartialTargetDescriptor]) -> Result<Vec<TargetDescriptor>> {
  targets
    .iter()
    .enumerate()
    .map(|(index, target)| infer_target(target, &targets[..index]))
    .collect()
}

fn infer_target(
  target: &PartialTargetDescriptor,
  previous: &[PartialTargetDescriptor],
) -> Result<TargetDescriptor> {
  match target {
    PartialTargetDescriptor::List(list) => {
      let mut history = previous.to_vec();
      let mut elements = Vec::with_capacity(list.elements.len());
      for element in &list.elements {
        elements.push(infer_non_list_target(element, &history)?);
        history.push(element.clone());
      }
      Ok(TargetDescriptor::List(elements))
    },
    PartialTargetDescriptor::Implicit => Ok(TargetDescriptor::Implicit),
    other => infer_non_list_target(other, previous),
  }
}

fn infer_non_list_target(
  target: &PartialTargetDescriptor,
  previous: &[PartialTargetDescriptor],
) -> Result<TargetDescriptor> {
  match target {
    PartialTargetDescriptor::Primitive(primitive) => {
      Ok(TargetDescriptor::Primitive(infer_primitive(primitive, previous)))
    },
    PartialTargetDescriptor::Range(range) => infer_range(range, previous),
    PartialTargetDescriptor::Implicit => Ok(TargetDescriptor::Implicit),
    PartialTargetDescriptor::List(_) => {
      Err(TargetError::Precondition(
        "lists cannot be nested inside lists".to_string(),
      ))
    },
  }
}

fn infer_range(
  target: &PartialRangeTargetDescriptor,
  previous: &[PartialTargetDescriptor],
) -> Result<TargetDescriptor> {
  let (anchor, anchor_partial) = match target.anchor.as_ref() {
    PartialTargetDescriptor::Implicit => (RangeAnchor::Implicit, None),
    PartialTargetDescriptor::Primitive(primitive) => {
      (RangeAnchor::Primitive(infer_primitive(primitive, previous)), Some(primitive))
    },
    _ => {
      return Err(TargetError::Precondition(
        "range anchors must be primitive or implicit".to_string(),
      ));
    },
  };

  let mut history = previous.to_vec();
  history.push(target.anchor.as_ref().clone());
  let active = infer_primitive(&target.active, &history);

  let range_type = target.range_type.unwrap_or_default();
  let is_anchor_mark_implicit = anchor_partial.is_none_or(|anchor| anchor.mark.is_none());

  if let (RangeType::Continuous, RangeAnchor::Primitive(primitive)) = (range_type, &anchor) {
    if let Some(every) = every_range(primitive, &active, is_anchor_mark_implicit) {
      return Ok(TargetDescriptor::Range(RangeTargetDescriptor {
        exclude_anchor: target.exclude_anchor,
        exclude_active: target.exclude_active,
        ..every
      }));
    }
  }

  Ok(TargetDescriptor::Range(RangeTargetDescriptor {
    anchor,
    active,
    exclude_anchor: target.exclude_anchor,
    exclude_active: target.exclude_active,
    range_type: match range_type {
      RangeType::Continuous => FullRangeType::Continuous,
      RangeType::Vertical => FullRangeType::Vertical,
    },
  }))
}

/// Splits the anchor's modifiers around its first `everyScope`: the ones
/// before it resolve the anchor, the ones after it run on every scope
/// found in the range. The active end drops its own `everyScope` and
/// everything after it.
fn every_range(
  anchor: &PrimitiveTargetDescriptor,
  active: &PrimitiveTargetDescriptor,
  is_anchor_mark_implicit: bool,
) -> Option<RangeTargetDescriptor> {
  let index = first_every_scope(&anchor.modifiers)?;
  let Modifier::EveryScope { scope_type } = &anchor.modifiers[index] else {
    return None;
  };
  let before = anchor.modifiers[..index].to_vec();
  let after = anchor.modifiers[index + 1..].to_vec();

  let range_anchor = if before.is_empty() && is_anchor_mark_implicit {
    RangeAnchor::Implicit
  } else {
    RangeAnchor::Primitive(PrimitiveTargetDescriptor {
      mark:        anchor.mark.clone(),
      modifiers:   before,
      is_implicit: false,
    })
  };

  let active_modifiers = match first_every_scope(&active.modifiers) {
    Some(index) => active.modifiers[..index].to_vec(),
    None => active.modifiers.clone(),
  };

  Some(RangeTargetDescriptor {
    anchor:         range_anchor,
    active:         PrimitiveTargetDescriptor {
      modifiers: active_modifiers,
      ..active.clone()
    },
    exclude_anchor: false,
    exclude_active: false,
    range_type:     FullRangeType::Every {
      scope_type: scope_type.clone(),
      modifiers:  after,
    },
  })
}

fn first_every_scope(modifiers: &[Modifier]) -> Option<usize> {
  modifiers
    .iter()
    .position(|modifier| matches!(modifier, Modifier::EveryScope { .. }))
}

fn infer_primitive(
  target: &PartialPrimitiveTargetDescriptor,
  previous: &[PartialTargetDescriptor],
) -> PrimitiveTargetDescriptor {
  let infer_mark = target
    .modifiers
    .as_ref()
    .is_some_and(|modifiers| modifiers.contains(&Modifier::InferPreviousMark));

  let mark = target
    .mark
    .clone()
    .or_else(|| {
      infer_mark
        .then(|| previous_attribute(previous, &|t| t.mark.clone()))
        .flatten()
    })
    .unwrap_or(Mark::Cursor);

  let modifiers = preserved_modifiers(target)
    .or_else(|| previous_attribute(previous, &preserved_modifiers))
    .unwrap_or_default();

  PrimitiveTargetDescriptor {
    mark,
    modifiers,
    is_implicit: target.is_implicit,
  }
}

fn preserved_modifiers(target: &PartialPrimitiveTargetDescriptor) -> Option<Vec<Modifier>> {
  let preserved: Vec<Modifier> = target
    .modifiers
    .iter()
    .flatten()
    .filter(|modifier| **modifier != Modifier::InferPreviousMark)
    .cloned()
    .collect();

  if !preserved.is_empty() {
    return Some(preserved);
  }
  if is_line_number_mark(target.mark.as_ref()) {
    return Some(vec![Modifier::containing(ScopeType::line())]);
  }
  None
}

fn is_line_number_mark(mark: Option<&Mark>) -> bool {
  match mark {
    Some(Mark::LineNumber { .. }) => true,
    Some(Mark::Range { anchor, active, .. }) => {
      matches!(anchor.as_ref(), Mark::LineNumber { .. })
        && matches!(active.as_ref(), Mark::LineNumber { .. })
    },
    _ => false,
  }
}

/// Searches earlier targets, most recent first. Ranges contribute their
/// anchor and lists their elements.
fn previous_attribute<T>(
  previous: &[PartialTargetDescriptor],
  attribute: &dyn Fn(&PartialPrimitiveTargetDescriptor) -> Option<T>,
) -> Option<T> {
  previous.iter().rev().find_map(|target| match target {
    PartialTargetDescriptor::Primitive(primitive) => attribute(primitive),
    PartialTargetDescriptor::Range(range) => {
      previous_attribute(std::slice::from_ref(range.anchor.as_ref()), attribute)
    },
    PartialTargetDescriptor::List(list) => previous_attribute(&list.elements, attribute),
    PartialTargetDescriptor::Implicit => None,
  })
}
