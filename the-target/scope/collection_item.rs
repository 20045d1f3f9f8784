use the_core::{
  chars::char_is_whitespace,
  text::utf16_len,
};

use crate::{
  direction::Direction,
  document::TextDocument,
  error::Result,
  position::Position,
  range::Range,
  scope::{
    ScopeCandidates,
    ScopeHandler,
    ScopeHandlerFactory,
    ScopeHints,
    TargetScope,
    sort_scopes,
  },
  scope_type::{
    ScopeType,
    SurroundingPairName,
  },
  surrounding_pair::SurroundingPairFinder,
  target::{
    ScopeTarget,
    Target,
  },
};

const SEPARATOR: char = ',';

/// Narrows `range` to the text it holds, dropping surrounding whitespace.
/// A blank range collapses to its start.
pub(crate) fn shrink_to_content(document: &dyn TextDocument, range: Range) -> Range {
  let text = document.text_in(range);
  let trimmed_start = text.trim_start_matches(char_is_whitespace);
  if trimmed_start.is_empty() {
    return Range::new(range.start, range.start);
  }
  let leading = utf16_len(&text[..text.len() - trimmed_start.len()]);
  let trimmed = trimmed_start.trim_end_matches(char_is_whitespace);
  let trailing = utf16_len(&trimmed_start[trimmed.len()..]);
  let start = document.offset_at(range.start) + leading;
  let end = document.offset_at(range.end) - trailing;
  Range::new(document.position_at(start), document.position_at(end))
}

/// Where a run of items lives: inside a collection's delimiters, or on a
/// line with separators outside of any collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
  Interior(Range),
  Line(usize),
}

struct Collection {
  region:     Region,
  range:      Range,
  separators: Vec<Range>,
}

/// Comma separated items, found textually. Items split at separators that
/// belong to the innermost collection holding them; separators inside
/// strings do not count.
pub struct CollectionItemScopeHandler {
  scope_type: ScopeType,
  /// Yield the collections themselves instead of their items.
  iteration:  bool,
  boundaries: SurroundingPairFinder,
  strings:    SurroundingPairFinder,
}

impl CollectionItemScopeHandler {
  pub fn new(factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    Ok(Self {
      scope_type,
      iteration: false,
      boundaries: SurroundingPairFinder::new(
        factory.config(),
        factory.language_id(),
        SurroundingPairName::CollectionBoundary,
      )?,
      strings: SurroundingPairFinder::new(
        factory.config(),
        factory.language_id(),
        SurroundingPairName::String,
      )?,
    })
  }

  fn collections(&self, document: &dyn TextDocument) -> Vec<Collection> {
    let interiors: Vec<Range> = self
      .boundaries
      .pairs(document)
      .iter()
      .map(|pair| pair.interior_range())
      .collect();
    let strings: Vec<Range> = self
      .strings
      .pairs(document)
      .iter()
      .map(|pair| pair.interior_range())
      .collect();

    let mut collections: Vec<Collection> = interiors
      .iter()
      .map(|interior| Collection {
        region:     Region::Interior(*interior),
        range:      *interior,
        separators: Vec::new(),
      })
      .collect();

    for line in 0..document.line_count() {
      let text = document.line_at(line).text;
      let mut character = 0;
      for ch in text.chars() {
        let start = character;
        character += ch.len_utf16();
        if ch != SEPARATOR {
          continue;
        }
        let separator = Range::from_coords(line, start, line, character);
        if strings.iter().any(|string| string.contains_range(&separator)) {
          continue;
        }
        let innermost = interiors
          .iter()
          .filter(|interior| interior.contains_range(&separator))
          .min_by_key(|interior| {
            document.offset_at(interior.end) - document.offset_at(interior.start)
          });
        let region = match innermost {
          Some(interior) => Region::Interior(*interior),
          None => Region::Line(line),
        };
        match collections.iter_mut().find(|collection| collection.region == region) {
          Some(collection) => collection.separators.push(separator),
          None => collections.push(Collection {
            region,
            range: document.line_at(line).range,
            separators: vec![separator],
          }),
        }
      }
    }
    collections
  }

  fn items(&self, document: &dyn TextDocument, collection: &Collection) -> Vec<TargetScope> {
    if collection.separators.is_empty() {
      let content = shrink_to_content(document, collection.range);
      if content.is_empty() {
        return Vec::new();
      }
      return vec![item_scope(content, None, None)];
    }

    let mut edges = Vec::with_capacity(collection.separators.len() + 1);
    let mut start = collection.range.start;
    for separator in &collection.separators {
      edges.push(Range::new(start, separator.start));
      start = separator.end;
    }
    let last = Range::new(start, collection.range.end);
    let mut contents: Vec<Range> = edges
      .into_iter()
      .map(|range| shrink_to_content(document, range))
      .collect();
    let last = shrink_to_content(document, last);
    if !last.is_empty() {
      contents.push(last);
    }

    contents
      .iter()
      .enumerate()
      .map(|(index, content)| {
        let leading = index
          .checked_sub(1)
          .map(|previous| Range::new(contents[previous].end, content.start));
        let trailing = contents
          .get(index + 1)
          .map(|next| Range::new(content.end, next.start));
        item_scope(*content, leading, trailing)
      })
      .collect()
  }

  fn region_scope(&self, document: &dyn TextDocument, collection: &Collection) -> TargetScope {
    match collection.region {
      Region::Interior(interior) => {
        TargetScope::single(interior, Target::interior_of(interior, false))
      },
      Region::Line(line) => {
        let line = document.line_at(line);
        TargetScope::single(line.range, Target::line(line.trimmed_range(), false))
      },
    }
  }
}

fn item_scope(content: Range, leading: Option<Range>, trailing: Option<Range>) -> TargetScope {
  let target = ScopeTarget::new("collectionItem")
    .with_insertion_delimiter(", ")
    .with_delimiter_ranges(leading, trailing);
  TargetScope::single(content, Target::scope(target, content, false))
}

impl ScopeHandler for CollectionItemScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn is_hierarchical(&self) -> bool {
    true
  }

  fn iteration_scope_handler(
    &self,
    factory: &ScopeHandlerFactory<'_>,
  ) -> Result<Box<dyn ScopeHandler>> {
    Ok(Box::new(Self {
      iteration: true,
      ..Self::new(factory, self.scope_type.clone())?
    }))
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    _hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    let collections = self.collections(document);
    let mut scopes: Vec<TargetScope> = if self.iteration {
      collections
        .iter()
        .map(|collection| self.region_scope(document, collection))
        .collect()
    } else {
      collections
        .iter()
        .flat_map(|collection| self.items(document, collection))
        .collect()
    };
    sort_scopes(&mut scopes, direction, position);
    Box::new(scopes.into_iter())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::EngineConfig,
    document::InMemoryTextDocument,
    scope::{
      Containment,
      ScopeRequirements,
      generate_scopes,
    },
    scope_type::SimpleScopeKind,
  };

  fn doc(text: &str) -> InMemoryTextDocument {
    InMemoryTextDocument::new("untitled:items", "plaintext", text)
  }

  fn items(
    document: &InMemoryTextDocument,
    position: Position,
    requirements: ScopeRequirements,
  ) -> Vec<TargetScope> {
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory
      .create(&ScopeType::simple(SimpleScopeKind::CollectionItem))
      .unwrap();
    generate_scopes(handler.as_ref(), document, position, Direction::Forward, requirements).collect()
  }

  fn domains(scopes: &[TargetScope]) -> Vec<Range> {
    scopes.iter().map(|scope| scope.domain).collect()
  }

  #[test]
  fn test_items_split_at_their_own_separators() {
    let document = doc("foo(a, b, [c, d])");
    let found = items(&document, Position::new(0, 0), ScopeRequirements::default());
    assert_eq!(
      domains(&found),
      vec![
        Range::from_coords(0, 4, 0, 5),
        Range::from_coords(0, 7, 0, 8),
        Range::from_coords(0, 10, 0, 16),
      ]
    );

    let containing = items(&document, Position::new(0, 11), ScopeRequirements {
      containment: Some(Containment::Required),
      ..Default::default()
    });
    assert_eq!(
      domains(&containing),
      vec![Range::from_coords(0, 11, 0, 12), Range::from_coords(0, 10, 0, 16)]
    );
  }

  #[test]
  fn test_separators_in_strings_are_ignored() {
    let document = doc(r#"f("a, b", c)"#);
    let found = items(&document, Position::new(0, 0), ScopeRequirements::default());
    assert_eq!(
      domains(&found),
      vec![Range::from_coords(0, 2, 0, 8), Range::from_coords(0, 10, 0, 11)]
    );
  }

  #[test]
  fn test_items_on_a_bare_line() {
    let document = doc("x\n  a,  b\n");
    let found = items(&document, Position::new(0, 0), ScopeRequirements::default());
    assert_eq!(
      domains(&found),
      vec![Range::from_coords(1, 2, 1, 3), Range::from_coords(1, 6, 1, 7)]
    );
  }

  #[test]
  fn test_item_removal_takes_a_separator() {
    let document = doc("[a, b,]");
    let found = items(&document, Position::new(0, 0), ScopeRequirements::default());
    assert_eq!(found.len(), 2);

    let first = &found[0].targets(false)[0];
    assert_eq!(first.insertion_delimiter(), ", ");
    assert_eq!(first.removal_range(&document), Range::from_coords(0, 1, 0, 4));

    let last = &found[1].targets(false)[0];
    assert_eq!(last.removal_range(&document), Range::from_coords(0, 2, 0, 5));
  }

  #[test]
  fn test_lone_item_fills_its_collection() {
    let document = doc("call( x )");
    let found = items(&document, Position::new(0, 0), ScopeRequirements::default());
    assert_eq!(domains(&found), vec![Range::from_coords(0, 6, 0, 7)]);
    assert!(items(&doc("call()"), Position::new(0, 0), ScopeRequirements::default()).is_empty());
  }

  #[test]
  fn test_iteration_scopes_are_collections() {
    let document = doc("a, b\n[c, d]");
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory
      .create(&ScopeType::simple(SimpleScopeKind::CollectionItem))
      .unwrap();
    let iteration = handler.iteration_scope_handler(&factory).unwrap();
    let found: Vec<_> = generate_scopes(
      iteration.as_ref(),
      &document,
      Position::new(0, 0),
      Direction::Forward,
      ScopeRequirements::default(),
    )
    .collect();
    assert_eq!(
      domains(&found),
      vec![Range::from_coords(0, 0, 0, 4), Range::from_coords(1, 1, 1, 5)]
    );
  }
}
