use the_target::{
  actions,
  context::EngineContext,
  descriptor::PartialTargetDescriptor,
  document::InMemoryTextDocument,
  edit::Edit,
  editor::{
    InMemoryTextEditor,
    TextEditor,
  },
  pipeline::TargetPipeline,
  position::Position,
  range::{
    Range,
    Selection,
  },
  range_updater::{
    AnchoredRegex,
    ExpansionBehavior,
    ExpansionPolicy,
    FullRangeInfo,
  },
  target::Target,
};

fn editor(text: &str, cursor: Position) -> InMemoryTextEditor {
  InMemoryTextEditor::new(
    "main",
    InMemoryTextDocument::new("untitled:engine", "plaintext", text),
  )
  .with_selections(vec![Selection::point(cursor)])
}

fn descriptor(json: &str) -> PartialTargetDescriptor {
  serde_json::from_str(json).unwrap()
}

fn resolve(context: &EngineContext, editor: &InMemoryTextEditor, json: &str) -> Vec<Target> {
  TargetPipeline::new(context, editor)
    .resolve(&[descriptor(json)])
    .unwrap()
    .into_iter()
    .flatten()
    .collect()
}

#[test]
fn test_cursor_expands_to_token() {
  let context = EngineContext::default();
  let editor = editor("Hello, world!", Position::new(0, 0));
  let targets = resolve(&context, &editor, r#"{"type": "primitive", "mark": {"type": "cursor"}}"#);
  assert_eq!(targets.len(), 1);
  assert_eq!(targets[0].content_range(), Range::from_coords(0, 0, 0, 5));
  assert_eq!(targets[0].content_text(editor.document()), "Hello");
}

#[test]
fn test_remove_resolved_token() {
  let mut context = EngineContext::default();
  let mut editor = editor("Hello, world!", Position::new(0, 2));
  let targets = resolve(&context, &editor, r#"{"type": "primitive", "mark": {"type": "cursor"}}"#);
  actions::remove(&mut context, &mut editor, &targets).unwrap();
  assert_eq!(editor.document().text(), ", world!");
  assert_eq!(editor.selections(), &[Selection::point(Position::new(0, 0))]);
}

#[test]
fn test_every_sentence() {
  let context = EngineContext::default();
  let editor = editor("Foo. Bar? Baz! bongo", Position::new(0, 0));
  let targets = resolve(
    &context,
    &editor,
    r#"{"type": "primitive", "modifiers": [{"type": "everyScope", "scopeType": {"type": "sentence"}}]}"#,
  );
  let texts: Vec<_> = targets
    .iter()
    .map(|target| target.content_text(editor.document()))
    .collect();
  assert_eq!(texts, vec!["Foo.", "Bar?", "Baz!", "bongo"]);
}

#[test]
fn test_surrounding_pair_interior() {
  let context = EngineContext::default();
  let editor = editor("call(a, [b, c])", Position::new(0, 9));
  let targets = resolve(
    &context,
    &editor,
    r#"{"type": "primitive", "modifiers": [
      {"type": "containingScope", "scopeType": {"type": "surroundingPair", "delimiter": "parentheses"}},
      {"type": "interiorOnly"}
    ]}"#,
  );
  assert_eq!(targets[0].content_text(editor.document()), "a, [b, c]");
}

#[test]
fn test_decorated_symbol_after_hat_allocation() {
  let mut context = EngineContext::default();
  let editor = editor("air bat\ncat", Position::new(0, 0));
  context.allocate_hats(&editor).unwrap();
  let targets = resolve(
    &context,
    &editor,
    r#"{"type": "primitive", "mark": {"type": "decoratedSymbol", "symbolColor": "default", "character": "b"}}"#,
  );
  assert_eq!(targets[0].content_text(editor.document()), "bat");
}

#[test]
fn test_tracked_ranges_follow_expansion_policy() {
  let mut context = EngineContext::default();
  let mut editor = editor("foo bar", Position::new(0, 0));
  let word = ExpansionBehavior {
    start: ExpansionPolicy::Closed,
    end:   ExpansionPolicy::Regex(AnchoredRegex::new(r"\w+").unwrap()),
  };
  let infos = vec![
    FullRangeInfo::new(editor.document(), Range::from_coords(0, 0, 0, 3), word),
    FullRangeInfo::new(
      editor.document(),
      Range::from_coords(0, 4, 0, 7),
      ExpansionBehavior::closed(),
    ),
  ];
  let id = context
    .range_updater_mut()
    .register_range_infos(editor.document(), infos);

  let changes = editor
    .edit(&[Edit::insert(Position::new(0, 3), "baz!")])
    .unwrap();
  context
    .range_updater_mut()
    .on_document_change(editor.document(), &changes);

  let infos = context.range_updater().range_infos(id).unwrap();
  assert_eq!(editor.document().text(), "foobaz! bar");
  assert_eq!(infos[0].range, Range::from_coords(0, 0, 0, 6));
  assert_eq!(infos[0].text, "foobaz");
  assert_eq!(infos[1].range, Range::from_coords(0, 8, 0, 11));
}
