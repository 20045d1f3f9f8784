//! Mark stages: where a primitive target starts.

use std::slice;

use crate::{
  context::StoredTargetKey,
  descriptor::PartialTargetDescriptor,
  error::{
    Result,
    TargetError,
  },
  mark::{
    LineNumberType,
    Mark,
  },
  pipeline::TargetPipeline,
  range::Range,
  target::{
    Target,
    continuous_target,
  },
};

pub trait MarkStage {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>>;
}

pub fn create_mark_stage(mark: &Mark) -> Box<dyn MarkStage + '_> {
  match mark {
    Mark::Cursor => Box::new(CursorStage),
    Mark::That => Box::new(StoredTargetStage(StoredTargetKey::That)),
    Mark::Source => Box::new(StoredTargetStage(StoredTargetKey::Source)),
    Mark::Keyboard => Box::new(StoredTargetStage(StoredTargetKey::Keyboard)),
    Mark::Nothing => Box::new(NothingStage),
    Mark::DecoratedSymbol {
      symbol_color,
      character,
    } => Box::new(DecoratedSymbolStage {
      color: symbol_color,
      character,
    }),
    Mark::LineNumber {
      line_number_type,
      line_number,
    } => Box::new(LineNumberStage {
      kind:   *line_number_type,
      number: *line_number,
    }),
    Mark::Range {
      anchor,
      active,
      exclude_anchor,
      exclude_active,
    } => Box::new(RangeMarkStage {
      anchor,
      active,
      exclude_anchor: *exclude_anchor,
      exclude_active: *exclude_active,
    }),
    Mark::Explicit { editor_id, range } => Box::new(ExplicitMarkStage {
      editor_id,
      range: *range,
    }),
    Mark::Target { target } => Box::new(TargetMarkStage { target }),
  }
}

/// One target per selection.
pub struct CursorStage;

impl MarkStage for CursorStage {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    Ok(
      pipeline
        .editor()
        .selections()
        .iter()
        .map(|selection| {
          Target::untyped(selection.range(), selection.is_reversed(), !selection.is_empty())
        })
        .collect(),
    )
  }
}

/// Implicit targets at each selection.
pub struct ImplicitStage;

impl MarkStage for ImplicitStage {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    Ok(
      pipeline
        .editor()
        .selections()
        .iter()
        .map(|selection| Target::implicit(selection.range(), selection.is_reversed()))
        .collect(),
    )
  }
}

pub struct StoredTargetStage(pub StoredTargetKey);

impl MarkStage for StoredTargetStage {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    let stored = pipeline
      .context()
      .stored_targets()
      .get(self.0, pipeline.editor().id())?;
    Ok(stored.to_vec())
  }
}

pub struct NothingStage;

impl MarkStage for NothingStage {
  fn run(&self, _pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    Ok(Vec::new())
  }
}

/// The token under a hat.
pub struct DecoratedSymbolStage<'m> {
  pub color:     &'m str,
  pub character: &'m str,
}

impl MarkStage for DecoratedSymbolStage<'_> {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    let hat = pipeline
      .context()
      .hats()
      .get(self.color, self.character)
      .ok_or_else(|| TargetError::UnknownDecoratedSymbol {
        color:     self.color.to_string(),
        character: self.character.to_string(),
      })?;
    if hat.editor_id != pipeline.editor().id() {
      return Err(TargetError::Precondition(format!(
        "hat {} {:?} is in editor {}",
        self.color, self.character, hat.editor_id
      )));
    }
    Ok(vec![Target::untyped(hat.range, false, false)])
  }
}

pub struct LineNumberStage {
  pub kind:   LineNumberType,
  pub number: isize,
}

impl LineNumberStage {
  fn line(&self, pipeline: &TargetPipeline<'_>) -> Option<usize> {
    let editor = pipeline.editor();
    let line_count = editor.document().line_count();
    let primary = editor.primary_selection().active.line;
    let line = match self.kind {
      LineNumberType::Absolute => self.number,
      LineNumberType::Relative => primary as isize + self.number,
      LineNumberType::Modulo100 => {
        let base = (primary / 100 * 100) as isize + self.number.rem_euclid(100);
        [base - 100, base, base + 100]
          .into_iter()
          .filter(|line| (0..line_count as isize).contains(line))
          .min_by_key(|line| line.abs_diff(primary as isize))?
      },
    };
    usize::try_from(line).ok().filter(|line| *line < line_count)
  }
}

impl MarkStage for LineNumberStage {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    let line = self
      .line(pipeline)
      .ok_or_else(|| TargetError::out_of_range("line", self.number))?;
    let range = pipeline.editor().document().line_at(line).range;
    Ok(vec![Target::line(range, false)])
  }
}

/// A continuous range between what two marks yield, pairwise.
pub struct RangeMarkStage<'m> {
  pub anchor:         &'m Mark,
  pub active:         &'m Mark,
  pub exclude_anchor: bool,
  pub exclude_active: bool,
}

impl MarkStage for RangeMarkStage<'_> {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    let anchors = create_mark_stage(self.anchor).run(pipeline)?;
    let actives = create_mark_stage(self.active).run(pipeline)?;
    if anchors.len() != actives.len() {
      return Err(TargetError::Precondition(format!(
        "range mark has {} anchor targets but {} active targets",
        anchors.len(),
        actives.len()
      )));
    }
    let document = pipeline.editor().document();
    Ok(
      anchors
        .iter()
        .zip(&actives)
        .map(|(anchor, active)| {
          continuous_target(
            document,
            anchor,
            active,
            self.exclude_anchor,
            self.exclude_active,
          )
        })
        .collect(),
    )
  }
}

pub struct ExplicitMarkStage<'m> {
  pub editor_id: &'m str,
  pub range:     Range,
}

impl MarkStage for ExplicitMarkStage<'_> {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    let editor = pipeline.editor();
    if self.editor_id != editor.id() {
      return Err(TargetError::UnsupportedMark(format!(
        "explicit range in editor {}",
        self.editor_id
      )));
    }
    let range = editor.document().validate_range(self.range);
    Ok(vec![Target::untyped(range, false, true)])
  }
}

/// Whatever a nested descriptor resolves to.
pub struct TargetMarkStage<'m> {
  pub target: &'m PartialTargetDescriptor,
}

impl MarkStage for TargetMarkStage<'_> {
  fn run(&self, pipeline: &TargetPipeline<'_>) -> Result<Vec<Target>> {
    Ok(
      pipeline
        .resolve(slice::from_ref(self.target))?
        .into_iter()
        .flatten()
        .collect(),
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    context::{
      EngineContext,
      Hat,
    },
    document::InMemoryTextDocument,
    editor::InMemoryTextEditor,
    position::Position,
    range::Selection,
  };

  fn editor(text: &str, selections: Vec<Selection>) -> InMemoryTextEditor {
    InMemoryTextEditor::new(
      "main",
      InMemoryTextDocument::new("untitled:marks", "plaintext", text),
    )
    .with_selections(selections)
  }

  fn run(context: &EngineContext, editor: &InMemoryTextEditor, mark: &Mark) -> Result<Vec<Target>> {
    create_mark_stage(mark).run(&TargetPipeline::new(context, editor))
  }

  fn line_number(kind: LineNumberType, number: isize) -> Mark {
    Mark::LineNumber {
      line_number_type: kind,
      line_number:      number,
    }
  }

  #[test]
  fn test_cursor_targets_follow_selections() {
    let context = EngineContext::default();
    let editor = editor("abc def", vec![
      Selection::point(Position::new(0, 1)),
      Selection::new(Position::new(0, 7), Position::new(0, 4)),
    ]);
    let targets = run(&context, &editor, &Mark::Cursor).unwrap();
    assert_eq!(targets.len(), 2);
    assert!(!targets[0].has_explicit_range());
    assert!(targets[1].is_reversed());
    assert_eq!(targets[1].content_range(), Range::from_coords(0, 4, 0, 7));
  }

  #[test]
  fn test_stored_marks() {
    let mut context = EngineContext::default();
    let editor = editor("abc", vec![Selection::default()]);
    assert_eq!(
      run(&context, &editor, &Mark::Source),
      Err(TargetError::MissingStoredTarget("source"))
    );
    let stored = Target::plain(Range::from_coords(0, 1, 0, 2), false);
    context
      .stored_targets_mut()
      .set(StoredTargetKey::Source, "main", vec![stored.clone()]);
    assert_eq!(run(&context, &editor, &Mark::Source).unwrap(), vec![stored]);
    assert!(run(&context, &editor, &Mark::Nothing).unwrap().is_empty());
  }

  #[test]
  fn test_decorated_symbol() {
    let mut context = EngineContext::default();
    let editor = editor("air bat", vec![Selection::default()]);
    let mark = Mark::DecoratedSymbol {
      symbol_color: "default".into(),
      character:    "b".into(),
    };
    assert!(matches!(
      run(&context, &editor, &mark),
      Err(TargetError::UnknownDecoratedSymbol { .. })
    ));
    context.hats_mut().insert("default", "b", Hat {
      editor_id: "main".into(),
      range:     Range::from_coords(0, 4, 0, 7),
    });
    assert_eq!(run(&context, &editor, &mark).unwrap()[0].content_range(), Range::from_coords(
      0, 4, 0, 7
    ));
  }

  #[test]
  fn test_line_numbers() {
    let context = EngineContext::default();
    let text = (0..250).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let editor = editor(&text, vec![Selection::point(Position::new(130, 0))]);
    let line_of = |mark: Mark| run(&context, &editor, &mark).unwrap()[0].content_range().start.line;

    assert_eq!(line_of(line_number(LineNumberType::Absolute, 7)), 7);
    assert_eq!(line_of(line_number(LineNumberType::Relative, -3)), 127);
    assert_eq!(line_of(line_number(LineNumberType::Modulo100, 10)), 110);
    assert_eq!(line_of(line_number(LineNumberType::Modulo100, 90)), 90);
    assert_eq!(line_of(line_number(LineNumberType::Modulo100, 70)), 170);
    assert_eq!(
      run(&context, &editor, &line_number(LineNumberType::Absolute, 300)),
      Err(TargetError::out_of_range("line", 300))
    );
  }

  #[test]
  fn test_range_and_explicit_marks() {
    let context = EngineContext::default();
    let editor = editor("aa bb cc", vec![Selection::point(Position::new(0, 6))]);
    let explicit = |start, end| Mark::Explicit {
      editor_id: "main".into(),
      range:     Range::from_coords(0, start, 0, end),
    };
    let range = Mark::Range {
      anchor:         Box::new(explicit(0, 2)),
      active:         Box::new(Mark::Cursor),
      exclude_anchor: true,
      exclude_active: false,
    };
    let targets = run(&context, &editor, &range).unwrap();
    assert_eq!(targets[0].content_range(), Range::from_coords(0, 2, 0, 6));

    let foreign = Mark::Explicit {
      editor_id: "other".into(),
      range:     Range::from_coords(0, 0, 0, 1),
    };
    assert!(matches!(
      run(&context, &editor, &foreign),
      Err(TargetError::UnsupportedMark(_))
    ));
  }
}
