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
    ScopeRequirements,
    TargetScope,
    collection_item::shrink_to_content,
    generate_scopes,
    sort_scopes,
  },
  scope_type::{
    ScopeType,
    SimpleScopeKind,
    SurroundingPairName,
  },
  surrounding_pair::SurroundingPairFinder,
  target::{
    ScopeTarget,
    Target,
  },
};

/// Which unbounded scope gets cut at pair interiors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
  NonWhitespaceSequence,
  Paragraph,
}

/// Non-whitespace sequences or paragraphs, plus the parts of them that lie
/// inside a surrounding pair. In `(foo bar)` the bounded sequences are `foo`
/// and `bar` rather than `(foo` and `bar)`.
pub struct BoundedScopeHandler {
  scope_type: ScopeType,
  bound:      Bound,
  inner:      Box<dyn ScopeHandler>,
  interiors:  SurroundingPairFinder,
}

impl BoundedScopeHandler {
  pub fn new(factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    let (bound, inner_kind) = match scope_type.kind() {
      Some(SimpleScopeKind::BoundedParagraph) => (Bound::Paragraph, SimpleScopeKind::Paragraph),
      _ => (
        Bound::NonWhitespaceSequence,
        SimpleScopeKind::NonWhitespaceSequence,
      ),
    };
    Ok(Self {
      inner: factory.create(&ScopeType::simple(inner_kind))?,
      interiors: SurroundingPairFinder::new(
        factory.config(),
        factory.language_id(),
        SurroundingPairName::Any,
      )?,
      scope_type,
      bound,
    })
  }

  fn bounded_scope(&self, content: Range) -> TargetScope {
    let target = match self.bound {
      Bound::NonWhitespaceSequence => ScopeTarget::token_like("boundedNonWhitespaceSequence"),
      Bound::Paragraph => ScopeTarget::new("boundedParagraph").with_insertion_delimiter("\n\n"),
    };
    TargetScope::single(content, Target::scope(target, content, false))
  }
}

impl ScopeHandler for BoundedScopeHandler {
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
    let inner_iteration = self.inner.iteration_scope_handler(factory)?;
    factory.create(&ScopeType::OneOf {
      scope_types: vec![
        inner_iteration.scope_type().clone(),
        ScopeType::SurroundingPairInterior {
          delimiter:           SurroundingPairName::Any,
          require_single_line: false,
        },
      ],
    })
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    _hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    let interiors: Vec<Range> = self
      .interiors
      .pairs(document)
      .iter()
      .map(|pair| pair.interior_range())
      .collect();

    let mut scopes = Vec::new();
    let unbounded = generate_scopes(
      self.inner.as_ref(),
      document,
      document.range().start,
      Direction::Forward,
      ScopeRequirements::default(),
    );
    for scope in unbounded {
      let content = scope
        .targets(false)
        .first()
        .map_or(scope.domain, Target::content_range);
      for interior in &interiors {
        let Some(overlap) = content.intersection(interior) else {
          continue;
        };
        let bounded = shrink_to_content(document, overlap);
        if bounded.is_empty()
          || bounded == content
          || scopes.iter().any(|seen: &TargetScope| seen.domain == bounded)
        {
          continue;
        }
        scopes.push(self.bounded_scope(bounded));
      }
      scopes.push(scope);
    }
    sort_scopes(&mut scopes, direction, position);
    Box::new(scopes.into_iter())
  }
}
