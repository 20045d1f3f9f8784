//! Actions that edit the document.
//!
//! Every action computes all of its edits before touching the document, so
//! a conflicting batch leaves the document as it was. Afterwards the range
//! updater moves the selections and the stored marks of the editor across
//! the edit, and the action's result becomes the new `that` mark.

use crate::{
  context::{
    EngineContext,
    StoredTargetKey,
  },
  edit::Edit,
  editor::TextEditor,
  error::{
    Result,
    TargetError,
  },
  range_updater::ExpansionBehavior,
  target::Target,
};

const STORED_KEYS: [StoredTargetKey; 4] = [
  StoredTargetKey::That,
  StoredTargetKey::Source,
  StoredTargetKey::Keyboard,
  StoredTargetKey::InstanceReference,
];

/// Removes the removal range of every target. The `that` mark ends up
/// where the targets were.
pub fn remove(
  context: &mut EngineContext,
  editor: &mut dyn TextEditor,
  targets: &[Target],
) -> Result<Vec<Target>> {
  let document = editor.document();
  let (edits, removed): (Vec<_>, Vec<_>) = targets
    .iter()
    .map(|target| {
      let range = target.removal_range(document);
      (Edit::delete(range), Target::plain(range, target.is_reversed()))
    })
    .unzip();
  tracing::debug!(targets = targets.len(), "remove");

  let that = perform_edits(context, editor, &edits, removed, &ExpansionBehavior::closed())?;
  context
    .stored_targets_mut()
    .set(StoredTargetKey::That, editor.id(), that.clone());
  Ok(that)
}

/// Replaces the content of every target. `texts` holds one text per
/// target, or a single text used for all of them. The `that` mark covers
/// the new text.
pub fn replace(
  context: &mut EngineContext,
  editor: &mut dyn TextEditor,
  targets: &[Target],
  texts: &[String],
) -> Result<Vec<Target>> {
  let text_for = |index: usize| match texts {
    [only] => Some(only),
    texts => texts.get(index),
  };
  if texts.is_empty() || (texts.len() > 1 && texts.len() != targets.len()) {
    return Err(TargetError::Precondition(format!(
      "{} texts given for {} targets",
      texts.len(),
      targets.len()
    )));
  }

  let mut edits = Vec::with_capacity(targets.len());
  let mut replaced = Vec::with_capacity(targets.len());
  for (index, target) in targets.iter().enumerate() {
    let range = target.content_range();
    let text = text_for(index).map_or("", String::as_str);
    edits.push(Edit::new(range, text));
    replaced.push(Target::plain(range, target.is_reversed()));
  }
  tracing::debug!(targets = targets.len(), "replace");

  let replace_edits = context
    .range_updater_mut()
    .register_replace_edits(editor.document(), edits.clone());
  let result = perform_edits(context, editor, &edits, replaced, &ExpansionBehavior::open());
  context
    .range_updater_mut()
    .deregister_replace_edits(replace_edits);

  let that = result?;
  context
    .stored_targets_mut()
    .set(StoredTargetKey::That, editor.id(), that.clone());
  Ok(that)
}

/// Applies `edits`, keeping `tracked`, the selections and the stored marks
/// of `editor` up to date. Returns `tracked` as moved by the edit.
fn perform_edits(
  context: &mut EngineContext,
  editor: &mut dyn TextEditor,
  edits: &[Edit],
  tracked: Vec<Target>,
  expansion: &ExpansionBehavior,
) -> Result<Vec<Target>> {
  let editor_id = editor.id().to_string();
  let selections = editor.selections().to_vec();

  let stored: Vec<_> = STORED_KEYS
    .iter()
    .filter_map(|key| {
      let targets = context.stored_targets().find(*key, &editor_id)?;
      Some((*key, targets.to_vec()))
    })
    .collect();

  let updater = context.range_updater_mut();
  let document = editor.document();
  let tracked_id = updater.track_targets(document, tracked, expansion);
  let selections_id = updater.track_selections(document, &selections);
  let stored_ids: Vec<_> = stored
    .into_iter()
    .map(|(key, targets)| {
      (
        key,
        updater.track_targets(document, targets, &ExpansionBehavior::closed()),
      )
    })
    .collect();

  let changes = match editor.edit(edits) {
    Ok(changes) => changes,
    Err(err) => {
      updater.deregister_range_infos(tracked_id);
      updater.deregister_range_infos(selections_id);
      for (_, id) in stored_ids {
        updater.deregister_range_infos(id);
      }
      return Err(err.into());
    },
  };
  updater.on_document_change(editor.document(), &changes);

  let moved = updater.targets(tracked_id).unwrap_or_default();
  let moved_selections = updater.selections(selections_id, &selections);
  let moved_stored: Vec<_> = stored_ids
    .into_iter()
    .filter_map(|(key, id)| {
      let targets = updater.targets(id);
      updater.deregister_range_infos(id);
      Some((key, targets?))
    })
    .collect();
  updater.deregister_range_infos(tracked_id);
  updater.deregister_range_infos(selections_id);

  if let Some(selections) = moved_selections {
    editor.set_selections(selections);
  }
  for (key, targets) in moved_stored {
    context
      .stored_targets_mut()
      .set(key, &editor_id, targets);
  }
  Ok(moved)
}
