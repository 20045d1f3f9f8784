use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  direction::Direction,
  scope_type::ScopeType,
};

/// One step of a target's modifier chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Modifier {
  StartOf,
  EndOf,
  InteriorOnly,
  ExcludeInterior,
  Visible,
  ContainingScope {
    scope_type:     ScopeType,
    #[serde(default)]
    ancestor_index: usize,
  },
  PreferredScope {
    scope_type: ScopeType,
  },
  EveryScope {
    scope_type: ScopeType,
  },
  OrdinalScope {
    scope_type: ScopeType,
    /// Index of the first scope; negative values count from the end.
    start:      isize,
    length:     usize,
    #[serde(default)]
    is_every:   bool,
  },
  RelativeScope {
    scope_type: ScopeType,
    offset:     usize,
    length:     usize,
    direction:  Direction,
    #[serde(default)]
    is_every:   bool,
  },
  KeepContentFilter,
  KeepEmptyFilter,
  InferPreviousMark,
  Leading,
  Trailing,
  ExtendThroughStartOf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modifiers: Option<Vec<Modifier>>,
  },
  ExtendThroughEndOf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modifiers: Option<Vec<Modifier>>,
  },
  ToRawSelection,
  Cascading {
    modifiers: Vec<Modifier>,
  },
  ModifyIfUntyped {
    modifier: Box<Modifier>,
  },
  Range {
    anchor:         Box<Modifier>,
    active:         Box<Modifier>,
    #[serde(default)]
    exclude_anchor: bool,
    #[serde(default)]
    exclude_active: bool,
  },
}

impl Modifier {
  pub fn containing(scope_type: ScopeType) -> Self {
    Self::ContainingScope {
      scope_type,
      ancestor_index: 0,
    }
  }

  pub fn every(scope_type: ScopeType) -> Self {
    Self::EveryScope { scope_type }
  }

  pub const fn type_name(&self) -> &'static str {
    match self {
      Self::StartOf => "startOf",
      Self::EndOf => "endOf",
      Self::InteriorOnly => "interiorOnly",
      Self::ExcludeInterior => "excludeInterior",
      Self::Visible => "visible",
      Self::ContainingScope { .. } => "containingScope",
      Self::PreferredScope { .. } => "preferredScope",
      Self::EveryScope { .. } => "everyScope",
      Self::OrdinalScope { .. } => "ordinalScope",
      Self::RelativeScope { .. } => "relativeScope",
      Self::KeepContentFilter => "keepContentFilter",
      Self::KeepEmptyFilter => "keepEmptyFilter",
      Self::InferPreviousMark => "inferPreviousMark",
      Self::Leading => "leading",
      Self::Trailing => "trailing",
      Self::ExtendThroughStartOf { .. } => "extendThroughStartOf",
      Self::ExtendThroughEndOf { .. } => "extendThroughEndOf",
      Self::ToRawSelection => "toRawSelection",
      Self::Cascading { .. } => "cascading",
      Self::ModifyIfUntyped { .. } => "modifyIfUntyped",
      Self::Range { .. } => "range",
    }
  }
}
