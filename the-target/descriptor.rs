//! Target descriptors.
//!
//! Callers send *partial* descriptors: marks and modifiers may be left out
//! and are filled in from earlier targets of the same command by
//! [`crate::inference::infer_full_targets`], which yields the full
//! [`TargetDescriptor`]s the pipeline resolves.

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  mark::Mark,
  modifier::Modifier,
  scope_type::ScopeType,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PartialTargetDescriptor {
  Primitive(PartialPrimitiveTargetDescriptor),
  Range(PartialRangeTargetDescriptor),
  List(PartialListTargetDescriptor),
  Implicit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPrimitiveTargetDescriptor {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mark:        Option<Mark>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub modifiers:   Option<Vec<Modifier>>,
  #[serde(default)]
  pub is_implicit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRangeTargetDescriptor {
  /// A primitive or implicit descriptor.
  pub anchor:         Box<PartialTargetDescriptor>,
  pub active:         PartialPrimitiveTargetDescriptor,
  #[serde(default)]
  pub exclude_anchor: bool,
  #[serde(default)]
  pub exclude_active: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub range_type:     Option<RangeType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialListTargetDescriptor {
  pub elements: Vec<PartialTargetDescriptor>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeType {
  #[default]
  Continuous,
  /// One target per line, keeping the anchor's columns.
  Vertical,
}

impl PartialPrimitiveTargetDescriptor {
  pub fn new(mark: Option<Mark>, modifiers: Vec<Modifier>) -> Self {
    Self {
      mark,
      modifiers: Some(modifiers),
      is_implicit: false,
    }
  }
}

/// A descriptor with every inferable field resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDescriptor {
  Primitive(PrimitiveTargetDescriptor),
  Range(RangeTargetDescriptor),
  List(Vec<TargetDescriptor>),
  Implicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveTargetDescriptor {
  pub mark:        Mark,
  pub modifiers:   Vec<Modifier>,
  pub is_implicit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeAnchor {
  Primitive(PrimitiveTargetDescriptor),
  Implicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FullRangeType {
  Continuous,
  Vertical,
  /// Every scope of `scope_type` between anchor and active, followed by
  /// `modifiers` on each result.
  Every {
    scope_type: ScopeType,
    modifiers:  Vec<Modifier>,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTargetDescriptor {
  pub anchor:         RangeAnchor,
  pub active:         PrimitiveTargetDescriptor,
  pub exclude_anchor: bool,
  pub exclude_active: bool,
  pub range_type:     FullRangeType,
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::scope_type::ScopeType;

  #[test]
  fn test_deserialize_grammar() {
    let descriptor: PartialTargetDescriptor = serde_json::from_str(
      r#"{
        "type": "list",
        "elements": [
          {"type": "primitive", "mark": {"type": "cursor"}, "modifiers": [{"type": "containingScope", "scopeType": {"type": "token"}}]},
          {"type": "range", "anchor": {"type": "primitive", "mark": {"type": "that"}},
           "active": {"type": "primitive", "mark": {"type": "source"}},
           "excludeAnchor": false, "excludeActive": true, "rangeType": "vertical"}
        ]
      }"#,
    )
    .unwrap();

    let PartialTargetDescriptor::List(list) = descriptor else {
      panic!("expected list");
    };
    assert_eq!(
      list.elements[0],
      PartialTargetDescriptor::Primitive(PartialPrimitiveTargetDescriptor::new(
        Some(Mark::Cursor),
        vec![Modifier::containing(ScopeType::token())],
      ))
    );
    let PartialTargetDescriptor::Range(range) = &list.elements[1] else {
      panic!("expected range");
    };
    assert!(range.exclude_active);
    assert_eq!(range.range_type, Some(RangeType::Vertical));
  }
}
