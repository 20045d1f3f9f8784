use crate::{
  document::{
    InMemoryTextDocument,
    TextDocument,
  },
  edit::{
    ContentChange,
    Edit,
  },
  error::EditError,
  range::{
    Range,
    Selection,
  },
};

/// An editor showing one document. Targets are always resolved against a
/// single editor.
pub trait TextEditor {
  fn id(&self) -> &str;

  fn document(&self) -> &dyn TextDocument;

  /// Never empty; the first selection is the primary one.
  fn selections(&self) -> &[Selection];

  fn set_selections(&mut self, selections: Vec<Selection>);

  fn visible_ranges(&self) -> &[Range];

  fn edit(&mut self, edits: &[Edit]) -> Result<Vec<ContentChange>, EditError>;

  fn primary_selection(&self) -> Selection {
    self.selections().first().copied().unwrap_or_default()
  }
}

#[derive(Debug, Clone)]
pub struct InMemoryTextEditor {
  id:             String,
  document:       InMemoryTextDocument,
  selections:     Vec<Selection>,
  visible_ranges: Option<Vec<Range>>,
  full_range:     Vec<Range>,
}

impl InMemoryTextEditor {
  pub fn new(id: impl Into<String>, document: InMemoryTextDocument) -> Self {
    let full_range = vec![document.range()];
    Self {
      id: id.into(),
      document,
      selections: vec![Selection::default()],
      visible_ranges: None,
      full_range,
    }
  }

  pub fn with_selections(mut self, selections: Vec<Selection>) -> Self {
    self.set_selections(selections);
    self
  }

  /// Restricts the visible ranges; by default the whole document is
  /// visible.
  pub fn with_visible_ranges(mut self, ranges: Vec<Range>) -> Self {
    self.visible_ranges = Some(ranges);
    self
  }

  pub fn document_mut(&mut self) -> &mut InMemoryTextDocument {
    &mut self.document
  }
}

impl TextEditor for InMemoryTextEditor {
  fn id(&self) -> &str {
    &self.id
  }

  fn document(&self) -> &dyn TextDocument {
    &self.document
  }

  fn selections(&self) -> &[Selection] {
    &self.selections
  }

  fn set_selections(&mut self, selections: Vec<Selection>) {
    if selections.is_empty() {
      self.selections = vec![Selection::default()];
    } else {
      self.selections = selections;
    }
  }

  fn visible_ranges(&self) -> &[Range] {
    self.visible_ranges.as_deref().unwrap_or(&self.full_range)
  }

  fn edit(&mut self, edits: &[Edit]) -> Result<Vec<ContentChange>, EditError> {
    let changes = self.document.edit(edits)?;
    self.full_range = vec![self.document.range()];
    Ok(changes)
  }
}
