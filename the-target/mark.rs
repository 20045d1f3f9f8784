use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  descriptor::PartialTargetDescriptor,
  range::Range,
};

/// The seed of a primitive target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mark {
  Cursor,
  That,
  Source,
  Keyboard,
  Nothing,
  DecoratedSymbol {
    symbol_color: String,
    character:    String,
  },
  LineNumber {
    line_number_type: LineNumberType,
    line_number:      isize,
  },
  Range {
    anchor:         Box<Mark>,
    active:         Box<Mark>,
    #[serde(default)]
    exclude_anchor: bool,
    #[serde(default)]
    exclude_active: bool,
  },
  Explicit {
    editor_id: String,
    range:     Range,
  },
  Target {
    target: Box<PartialTargetDescriptor>,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineNumberType {
  Absolute,
  /// Offset from the line of the primary selection.
  Relative,
  /// The line closest to the primary selection whose number ends in the
  /// given two digits.
  Modulo100,
}

impl Mark {
  pub const fn type_name(&self) -> &'static str {
    match self {
      Self::Cursor => "cursor",
      Self::That => "that",
      Self::Source => "source",
      Self::Keyboard => "keyboard",
      Self::Nothing => "nothing",
      Self::DecoratedSymbol { .. } => "decoratedSymbol",
      Self::LineNumber { .. } => "lineNumber",
      Self::Range { .. } => "range",
      Self::Explicit { .. } => "explicit",
      Self::Target { .. } => "target",
    }
  }
}
