//! State that outlives a single command.
//!
//! An [`EngineContext`] is created once and handed by reference to every
//! resolution and action. It owns the configuration, the stored marks
//! (`that`, `source`, ...), the hat map used by decorated-symbol marks and
//! the range updater that keeps stored ranges valid.

use std::collections::HashMap;

use crate::{
  config::EngineConfig,
  editor::TextEditor,
  error::{
    Result,
    TargetError,
  },
  range::Range,
  range_updater::RangeUpdater,
  target::Target,
  tokenizer::Tokenizer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredTargetKey {
  That,
  Source,
  Keyboard,
  /// Restricts `every instance` and friends to the stored ranges.
  InstanceReference,
}

impl StoredTargetKey {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::That => "that",
      Self::Source => "source",
      Self::Keyboard => "keyboard",
      Self::InstanceReference => "instanceReference",
    }
  }
}

#[derive(Debug, Clone)]
struct StoredEntry {
  editor_id: String,
  targets:   Vec<Target>,
}

/// Last-writer-wins target storage.
#[derive(Debug, Clone, Default)]
pub struct StoredTargets {
  entries: HashMap<StoredTargetKey, StoredEntry>,
}

impl StoredTargets {
  pub fn set(&mut self, key: StoredTargetKey, editor_id: &str, targets: Vec<Target>) {
    self.entries.insert(key, StoredEntry {
      editor_id: editor_id.to_string(),
      targets,
    });
  }

  pub fn clear(&mut self, key: StoredTargetKey) {
    self.entries.remove(&key);
  }

  /// Targets stored under `key`, which must belong to `editor_id`.
  pub fn get(&self, key: StoredTargetKey, editor_id: &str) -> Result<&[Target]> {
    let entry = self
      .entries
      .get(&key)
      .ok_or(TargetError::MissingStoredTarget(key.as_str()))?;
    if entry.editor_id != editor_id {
      return Err(TargetError::Precondition(format!(
        "the {} mark belongs to editor {}",
        key.as_str(),
        entry.editor_id
      )));
    }
    Ok(&entry.targets)
  }

  /// Like [`StoredTargets::get`], but absent or foreign entries are `None`.
  pub fn find(&self, key: StoredTargetKey, editor_id: &str) -> Option<&[Target]> {
    self
      .entries
      .get(&key)
      .filter(|entry| entry.editor_id == editor_id)
      .map(|entry| entry.targets.as_slice())
  }
}

/// The token a hat sits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hat {
  pub editor_id: String,
  pub range:     Range,
}

pub const HAT_COLORS: &[&str] = &["default", "blue", "green", "red", "pink", "yellow"];

/// Hats keyed by `(color, character)`.
#[derive(Debug, Clone, Default)]
pub struct HatMap {
  hats: HashMap<(String, String), Hat>,
}

impl HatMap {
  pub fn insert(&mut self, color: &str, character: &str, hat: Hat) {
    self
      .hats
      .insert((color.to_string(), character.to_string()), hat);
  }

  pub fn get(&self, color: &str, character: &str) -> Option<&Hat> {
    self.hats.get(&(color.to_string(), character.to_string()))
  }

  pub fn len(&self) -> usize {
    self.hats.len()
  }

  pub fn is_empty(&self) -> bool {
    self.hats.is_empty()
  }

  /// Replaces the hats of `editor` with one per visible token, where
  /// possible. A token takes the first free color for the first of its
  /// characters that still has one; tokens earlier in the document choose
  /// first.
  pub fn allocate(&mut self, editor: &dyn TextEditor, tokenizer: &Tokenizer) {
    let editor_id = editor.id();
    self.hats.retain(|_, hat| hat.editor_id != editor_id);

    let document = editor.document();
    let mut lines: Vec<usize> = editor
      .visible_ranges()
      .iter()
      .flat_map(|range| range.start.line..=range.end.line)
      .collect();
    lines.sort_unstable();
    lines.dedup();

    for line in lines {
      let text = document.line_at(line).text;
      for token in tokenizer.tokenize(&text) {
        let range = Range::from_coords(line, token.start, line, token.end);
        let free = token.text.chars().find_map(|ch| {
          let character: String = ch.to_lowercase().collect();
          HAT_COLORS
            .iter()
            .find(|color| self.get(color, &character).is_none())
            .map(|color| (*color, character))
        });
        let Some((color, character)) = free else {
          tracing::trace!(token = token.text, "no free hat");
          continue;
        };
        self.insert(color, &character, Hat {
          editor_id: editor_id.to_string(),
          range,
        });
      }
    }
    tracing::debug!(editor = editor_id, hats = self.hats.len(), "allocated hats");
  }
}

#[derive(Debug, Default)]
pub struct EngineContext {
  config:        EngineConfig,
  stored:        StoredTargets,
  hats:          HatMap,
  range_updater: RangeUpdater,
}

impl EngineContext {
  pub fn new(config: EngineConfig) -> Self {
    Self {
      config,
      ..Self::default()
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn stored_targets(&self) -> &StoredTargets {
    &self.stored
  }

  pub fn stored_targets_mut(&mut self) -> &mut StoredTargets {
    &mut self.stored
  }

  pub fn hats(&self) -> &HatMap {
    &self.hats
  }

  pub fn hats_mut(&mut self) -> &mut HatMap {
    &mut self.hats
  }

  pub fn range_updater(&self) -> &RangeUpdater {
    &self.range_updater
  }

  pub fn range_updater_mut(&mut self) -> &mut RangeUpdater {
    &mut self.range_updater
  }

  /// Allocates hats for `editor` with its language's tokenizer.
  pub fn allocate_hats(&mut self, editor: &dyn TextEditor) -> Result<()> {
    let tokenizer = Tokenizer::for_language(&self.config, editor.document().language_id())?;
    self.hats.allocate(editor, &tokenizer);
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    document::InMemoryTextDocument,
    editor::InMemoryTextEditor,
  };

  #[test]
  fn test_stored_targets_belong_to_an_editor() {
    let mut stored = StoredTargets::default();
    assert_eq!(
      stored.get(StoredTargetKey::That, "a"),
      Err(TargetError::MissingStoredTarget("that"))
    );

    let target = Target::plain(Range::from_coords(0, 0, 0, 1), false);
    stored.set(StoredTargetKey::That, "a", vec![target.clone()]);
    assert_eq!(stored.get(StoredTargetKey::That, "a").unwrap(), &[target]);
    assert!(matches!(
      stored.get(StoredTargetKey::That, "b"),
      Err(TargetError::Precondition(_))
    ));
    assert!(stored.find(StoredTargetKey::That, "b").is_none());

    stored.clear(StoredTargetKey::That);
    assert!(stored.find(StoredTargetKey::That, "a").is_none());
  }

  #[test]
  fn test_hat_allocation() {
    let document = InMemoryTextDocument::new("untitled:hats", "plaintext", "air art\nbat");
    let editor = InMemoryTextEditor::new("main", document);
    let mut context = EngineContext::default();
    context.allocate_hats(&editor).unwrap();

    let hats = context.hats();
    assert_eq!(hats.len(), 3);
    assert_eq!(hats.get("default", "a").unwrap().range, Range::from_coords(0, 0, 0, 3));
    assert_eq!(hats.get("blue", "a").unwrap().range, Range::from_coords(0, 4, 0, 7));
    assert_eq!(hats.get("default", "b").unwrap().range, Range::from_coords(1, 0, 1, 3));
  }

  #[test]
  fn test_reallocation_replaces_editor_hats() {
    let mut hats = HatMap::default();
    hats.insert("red", "z", Hat {
      editor_id: "main".into(),
      range:     Range::from_coords(5, 0, 5, 1),
    });
    hats.insert("red", "q", Hat {
      editor_id: "other".into(),
      range:     Range::from_coords(0, 0, 0, 1),
    });
    let editor = InMemoryTextEditor::new(
      "main",
      InMemoryTextDocument::new("untitled:hats", "plaintext", "x"),
    );
    hats.allocate(&editor, &Tokenizer::new(&["_".to_string()]).unwrap());
    assert!(hats.get("red", "z").is_none());
    assert!(hats.get("red", "q").is_some());
    assert!(hats.get("default", "x").is_some());
  }
}
