use serde::{
  Deserialize,
  Serialize,
};

/// Direction in which scopes are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
  /// Towards the end of the document.
  Forward,
  /// Towards the start of the document.
  Backward,
}

impl Direction {
  pub const fn opposite(self) -> Self {
    match self {
      Self::Forward => Self::Backward,
      Self::Backward => Self::Forward,
    }
  }
}
