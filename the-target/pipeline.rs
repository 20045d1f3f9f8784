//! Turns target descriptors into targets.
//!
//! A primitive descriptor runs its mark stage, then its modifiers in list
//! order, then a final stage expanding empty untyped targets to the token
//! around them:
//!
//! ```text
//!   mark -> modifier 1 -> ... -> modifier n -> containing token if empty
//! ```
//!
//! Range descriptors resolve both ends that way and join them pairwise;
//! lists concatenate their elements. The targets of each top-level
//! descriptor are deduplicated.

use crate::{
  context::{
    EngineContext,
    StoredTargetKey,
  },
  descriptor::{
    FullRangeType,
    PartialTargetDescriptor,
    PrimitiveTargetDescriptor,
    RangeAnchor,
    RangeTargetDescriptor,
    TargetDescriptor,
  },
  direction::Direction,
  editor::TextEditor,
  error::{
    Result,
    TargetError,
  },
  inference::infer_full_targets,
  marks::{
    ImplicitStage,
    MarkStage,
    create_mark_stage,
  },
  modifier::Modifier,
  modifiers::{
    ContainingTokenIfUntypedEmptyStage,
    ModifierStage,
    StageContext,
    create_stage,
    every_scope_targets,
    run_stages,
  },
  range::Range,
  scope::ScopeHandlerFactory,
  scope_type::ScopeType,
  target::{
    Target,
    TargetKind,
    continuous_target,
    is_reversed_range,
  },
};

pub struct TargetPipeline<'a> {
  context: &'a EngineContext,
  editor:  &'a dyn TextEditor,
}

impl<'a> TargetPipeline<'a> {
  pub fn new(context: &'a EngineContext, editor: &'a dyn TextEditor) -> Self {
    Self { context, editor }
  }

  pub fn context(&self) -> &'a EngineContext {
    self.context
  }

  pub fn editor(&self) -> &'a dyn TextEditor {
    self.editor
  }

  pub fn stage_context(&self) -> StageContext<'a> {
    let document = self.editor.document();
    StageContext {
      document,
      visible_ranges: self.editor.visible_ranges(),
      handlers: ScopeHandlerFactory::new(self.context.config(), document.language_id()),
      instance_reference: self
        .context
        .stored_targets()
        .find(StoredTargetKey::InstanceReference, self.editor.id()),
    }
  }

  /// Infers and resolves `descriptors`, one target list per descriptor.
  pub fn resolve(&self, descriptors: &[PartialTargetDescriptor]) -> Result<Vec<Vec<Target>>> {
    let full = infer_full_targets(descriptors)?;
    self.process_targets(&full)
  }

  pub fn process_targets(&self, targets: &[TargetDescriptor]) -> Result<Vec<Vec<Target>>> {
    targets
      .iter()
      .map(|target| self.process_target(target).map(unique_targets))
      .collect()
  }

  pub fn process_target(&self, target: &TargetDescriptor) -> Result<Vec<Target>> {
    match target {
      TargetDescriptor::List(elements) => {
        let mut targets = Vec::new();
        for element in elements {
          targets.extend(self.process_target(element)?);
        }
        Ok(targets)
      },
      TargetDescriptor::Range(range) => self.process_range_target(range),
      TargetDescriptor::Primitive(primitive) => self.process_primitive_target(primitive),
      TargetDescriptor::Implicit => self.run_modifiers(&[], ImplicitStage.run(self)?),
    }
  }

  fn process_range_target(&self, descriptor: &RangeTargetDescriptor) -> Result<Vec<Target>> {
    let anchors = match &descriptor.anchor {
      RangeAnchor::Primitive(primitive) => self.process_primitive_target(primitive)?,
      RangeAnchor::Implicit => self.run_modifiers(&[], ImplicitStage.run(self)?)?,
    };
    let actives = self.process_primitive_target(&descriptor.active)?;
    if anchors.len() != actives.len() {
      return Err(TargetError::Precondition(format!(
        "range has {} anchor targets but {} active targets",
        anchors.len(),
        actives.len()
      )));
    }

    let document = self.editor.document();
    let mut targets = Vec::new();
    for (anchor, active) in anchors.iter().zip(&actives) {
      match &descriptor.range_type {
        FullRangeType::Continuous => targets.push(continuous_target(
          document,
          anchor,
          active,
          descriptor.exclude_anchor,
          descriptor.exclude_active,
        )),
        FullRangeType::Vertical => targets.extend(vertical_targets(
          anchor,
          active,
          descriptor.exclude_anchor,
          descriptor.exclude_active,
        )),
        FullRangeType::Every {
          scope_type,
          modifiers,
        } => targets.extend(self.process_every_range_target(
          anchor,
          active,
          descriptor,
          scope_type,
          modifiers,
        )?),
      }
    }
    Ok(targets)
  }

  /// `every token air past bat`. Excluded ends step to the neighbouring
  /// scope instead of cutting at the end's content, so the excluded
  /// scope's whole domain stays out of the range.
  fn process_every_range_target(
    &self,
    anchor: &Target,
    active: &Target,
    descriptor: &RangeTargetDescriptor,
    scope_type: &ScopeType,
    modifiers: &[Modifier],
  ) -> Result<Vec<Target>> {
    let cx = self.stage_context();
    let is_reversed = is_reversed_range(anchor, active);
    let neighbour = |target: &Target, direction: Direction| -> Result<Target> {
      let relative = Modifier::RelativeScope {
        scope_type: scope_type.clone(),
        offset: 1,
        length: 1,
        direction,
        is_every: false,
      };
      create_stage(&relative)
        .run(&cx, target)?
        .into_iter()
        .next()
        .ok_or_else(|| TargetError::no_containing(scope_type.name()))
    };
    let (towards_active, towards_anchor) = if is_reversed {
      (Direction::Backward, Direction::Forward)
    } else {
      (Direction::Forward, Direction::Backward)
    };

    let anchor = if descriptor.exclude_anchor {
      neighbour(anchor, towards_active)?
    } else {
      anchor.clone()
    };
    let active = if descriptor.exclude_active {
      neighbour(active, towards_anchor)?
    } else {
      active.clone()
    };

    let range = continuous_target(cx.document, &anchor, &active, false, false);
    let every = every_scope_targets(&cx, scope_type, &range)?;
    self.run_modifiers(modifiers, every)
  }

  fn process_primitive_target(&self, descriptor: &PrimitiveTargetDescriptor) -> Result<Vec<Target>> {
    let marked = if descriptor.is_implicit {
      ImplicitStage.run(self)?
    } else {
      create_mark_stage(&descriptor.mark).run(self)?
    };
    let targets = self.run_modifiers(&descriptor.modifiers, marked)?;
    tracing::trace!(
      mark = descriptor.mark.type_name(),
      modifiers = descriptor.modifiers.len(),
      targets = targets.len(),
      "resolved primitive target"
    );
    Ok(targets)
  }

  /// Runs `modifiers` and then expands empty untyped results to tokens.
  fn run_modifiers(&self, modifiers: &[Modifier], targets: Vec<Target>) -> Result<Vec<Target>> {
    let cx = self.stage_context();
    let mut stages: Vec<Box<dyn ModifierStage + '_>> = modifiers.iter().map(create_stage).collect();
    stages.push(Box::new(ContainingTokenIfUntypedEmptyStage));
    run_stages(&cx, &stages, targets)
  }
}

/// One target per line from the anchor's line to the active's, each at the
/// anchor's columns.
fn vertical_targets(
  anchor: &Target,
  active: &Target,
  exclude_anchor: bool,
  exclude_active: bool,
) -> Vec<Target> {
  let is_reversed = is_reversed_range(anchor, active);
  let (anchor_range, active_range) = (anchor.content_range(), active.content_range());
  let (anchor_line, active_line) = if is_reversed {
    (anchor_range.start.line, active_range.start.line)
  } else {
    (anchor_range.end.line, active_range.end.line)
  };

  let step = |line: usize, forward: bool| {
    if forward {
      line + 1
    } else {
      line.saturating_sub(1)
    }
  };
  let first = if exclude_anchor { step(anchor_line, !is_reversed) } else { anchor_line };
  let last = if exclude_active { step(active_line, is_reversed) } else { active_line };

  let lines: Vec<usize> = if is_reversed {
    (last..=first).rev().collect()
  } else {
    (first..=last).collect()
  };
  lines
    .into_iter()
    .map(|line| {
      let range = Range::from_coords(
        line,
        anchor_range.start.character,
        line,
        anchor_range.end.character,
      );
      match anchor.kind() {
        TargetKind::Plain { .. } if anchor_range.is_empty() => anchor.with_content_range(range),
        _ => Target::plain(range, anchor.is_reversed()),
      }
    })
    .collect()
}

fn unique_targets(targets: Vec<Target>) -> Vec<Target> {
  let mut unique: Vec<Target> = Vec::with_capacity(targets.len());
  for target in targets {
    if !unique.contains(&target) {
      unique.push(target);
    }
  }
  unique
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    document::InMemoryTextDocument,
    editor::InMemoryTextEditor,
    position::Position,
    range::Selection,
  };

  fn editor(text: &str, selections: Vec<Selection>) -> InMemoryTextEditor {
    InMemoryTextEditor::new(
      "main",
      InMemoryTextDocument::new("untitled:pipeline", "plaintext", text),
    )
    .with_selections(selections)
  }

  fn resolve(editor: &InMemoryTextEditor, json: &str) -> Result<Vec<Range>> {
    let context = EngineContext::default();
    let descriptor: PartialTargetDescriptor = serde_json::from_str(json).unwrap();
    let targets = TargetPipeline::new(&context, editor).resolve(&[descriptor])?;
    Ok(targets[0].iter().map(Target::content_range).collect())
  }

  fn point(line: usize, character: usize) -> Selection {
    Selection::point(Position::new(line, character))
  }

  #[test]
  fn test_empty_cursor_expands_to_token() {
    let editor = editor("Hello, world!", vec![point(0, 0)]);
    assert_eq!(resolve(&editor, r#"{"type": "primitive"}"#).unwrap(), vec![
      Range::from_coords(0, 0, 0, 5)
    ]);
  }

  #[test]
  fn test_list_targets_are_deduplicated() {
    let editor = editor("aa bb", vec![point(0, 1), point(0, 2)]);
    let json = r#"{
      "type": "primitive",
      "modifiers": [{"type": "containingScope", "scopeType": {"type": "token"}}]
    }"#;
    assert_eq!(resolve(&editor, json).unwrap(), vec![Range::from_coords(0, 0, 0, 2)]);
  }

  #[test]
  fn test_continuous_range() {
    let editor = editor("aa bb cc dd", vec![point(0, 0)]);
    let json = r#"{
      "type": "range",
      "anchor": {"type": "primitive", "mark": {"type": "explicit", "editorId": "main",
        "range": {"start": {"line": 0, "character": 3}, "end": {"line": 0, "character": 5}}}},
      "active": {"type": "primitive", "mark": {"type": "explicit", "editorId": "main",
        "range": {"start": {"line": 0, "character": 9}, "end": {"line": 0, "character": 11}}}},
      "excludeAnchor": false,
      "excludeActive": true
    }"#;
    assert_eq!(resolve(&editor, json).unwrap(), vec![Range::from_coords(0, 3, 0, 9)]);
  }

  #[test]
  fn test_every_range_excludes_whole_scopes() {
    let editor = editor("aa bb cc dd", vec![point(0, 0)]);
    let explicit = |start: usize| {
      format!(
        r#"{{"type": "explicit", "editorId": "main", "range": {{"start": {{"line": 0, "character": {start}}}, "end": {{"line": 0, "character": {start}}}}}}}"#
      )
    };
    let json = format!(
      r#"{{
        "type": "range",
        "anchor": {{"type": "primitive", "mark": {}, "modifiers": [{{"type": "everyScope", "scopeType": {{"type": "token"}}}}]}},
        "active": {{"type": "primitive", "mark": {}}},
        "excludeAnchor": true,
        "excludeActive": false
      }}"#,
      explicit(1),
      explicit(10)
    );
    assert_eq!(resolve(&editor, &json).unwrap(), vec![
      Range::from_coords(0, 3, 0, 5),
      Range::from_coords(0, 6, 0, 8),
      Range::from_coords(0, 9, 0, 11),
    ]);
  }

  #[test]
  fn test_vertical_range() {
    let anchor = Target::plain(Range::from_coords(1, 2, 1, 4), false);
    let active = Target::plain(Range::from_coords(3, 0, 3, 1), false);
    let ranges: Vec<_> = vertical_targets(&anchor, &active, false, true)
      .iter()
      .map(Target::content_range)
      .collect();
    assert_eq!(ranges, vec![
      Range::from_coords(1, 2, 1, 4),
      Range::from_coords(2, 2, 2, 4)
    ]);

    let reversed: Vec<_> = vertical_targets(&active, &anchor, true, false)
      .iter()
      .map(|target| target.content_range().start.line)
      .collect();
    assert_eq!(reversed, vec![2, 1]);
  }

  #[test]
  fn test_that_mark_requires_storage() {
    let editor = editor("abc", vec![point(0, 0)]);
    assert_eq!(
      resolve(&editor, r#"{"type": "primitive", "mark": {"type": "that"}}"#),
      Err(TargetError::MissingStoredTarget("that"))
    );
  }

  #[test]
  fn test_target_mark_resolves_nested_descriptor() {
    let editor = editor("one two", vec![point(0, 5)]);
    let json = r#"{
      "type": "primitive",
      "mark": {"type": "target", "target": {"type": "primitive"}},
      "modifiers": [{"type": "endOf"}]
    }"#;
    assert_eq!(resolve(&editor, json).unwrap(), vec![Range::from_coords(0, 7, 0, 7)]);
  }

  #[test]
  fn test_stage_context_sees_instance_reference() {
    let mut context = EngineContext::default();
    let editor = editor("air bat air", vec![point(0, 0)]);
    let reference = Target::plain(Range::from_coords(0, 4, 0, 11), false);
    context
      .stored_targets_mut()
      .set(StoredTargetKey::InstanceReference, "main", vec![reference]);
    let pipeline = TargetPipeline::new(&context, &editor);
    assert_eq!(pipeline.stage_context().instance_reference.map(<[Target]>::len), Some(1));
  }
}
