use crate::{
  direction::Direction,
  document::TextDocument,
  error::{
    Result,
    TargetError,
  },
  position::Position,
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
  surrounding_pair::{
    PairMatch,
    SurroundingPairFinder,
  },
  target::Target,
};

fn sorted_scopes<'a>(
  pairs: Vec<PairMatch>,
  position: Position,
  direction: Direction,
  to_scope: impl Fn(&PairMatch) -> Option<TargetScope>,
) -> ScopeCandidates<'a> {
  let mut scopes: Vec<_> = pairs.iter().filter_map(to_scope).collect();
  sort_scopes(&mut scopes, direction, position);
  Box::new(scopes.into_iter())
}

/// Delimiter pairs, matched across the whole document.
pub struct SurroundingPairScopeHandler {
  scope_type:                 ScopeType,
  finder:                     SurroundingPairFinder,
  require_strong_containment: bool,
}

impl SurroundingPairScopeHandler {
  pub fn new(factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    let ScopeType::SurroundingPair {
      delimiter,
      require_strong_containment,
      ..
    } = scope_type
    else {
      return Err(TargetError::UnsupportedScopeType(scope_type.name().into_owned()));
    };
    Ok(Self {
      finder: SurroundingPairFinder::new(factory.config(), factory.language_id(), delimiter)?,
      require_strong_containment,
      scope_type,
    })
  }
}

impl ScopeHandler for SurroundingPairScopeHandler {
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
    factory.create(&ScopeType::line())
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    _hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    let strong = self.require_strong_containment;
    sorted_scopes(self.finder.pairs(document), position, direction, |pair| {
      let domain = if strong {
        pair.interior_range()
      } else {
        pair.content_range()
      };
      Some(TargetScope::single(domain, pair.to_target(false)))
    })
  }
}

/// The inside of delimiter pairs. Only positions strictly inside a pair
/// count as being in its interior.
pub struct SurroundingPairInteriorScopeHandler {
  scope_type:          ScopeType,
  finder:              SurroundingPairFinder,
  require_single_line: bool,
}

impl SurroundingPairInteriorScopeHandler {
  pub fn new(factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    let ScopeType::SurroundingPairInterior {
      delimiter,
      require_single_line,
    } = scope_type
    else {
      return Err(TargetError::UnsupportedScopeType(scope_type.name().into_owned()));
    };
    Ok(Self {
      finder: SurroundingPairFinder::new(factory.config(), factory.language_id(), delimiter)?,
      require_single_line,
      scope_type,
    })
  }
}

impl ScopeHandler for SurroundingPairInteriorScopeHandler {
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
    factory.create(&ScopeType::line())
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    _hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    let single_line = self.require_single_line;
    sorted_scopes(self.finder.pairs(document), position, direction, |pair| {
      let interior = pair.interior_range();
      if single_line && !pair.content_range().is_single_line() {
        return None;
      }
      Some(TargetScope::single(interior, Target::interior_of(interior, false)))
    })
  }
}

/// `interior`: the inside of any pair, found wherever the pair itself is.
pub struct InteriorScopeHandler {
  scope_type: ScopeType,
  finder:     SurroundingPairFinder,
}

impl InteriorScopeHandler {
  pub fn new(factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    Ok(Self {
      scope_type,
      finder: SurroundingPairFinder::new(
        factory.config(),
        factory.language_id(),
        SurroundingPairName::Any,
      )?,
    })
  }
}

impl ScopeHandler for InteriorScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn is_hierarchical(&self) -> bool {
    true
  }

  fn iteration_scope_handler(
    &self,
    _factory: &ScopeHandlerFactory<'_>,
  ) -> Result<Box<dyn ScopeHandler>> {
    Err(TargetError::no_containing("iteration scope for interior"))
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    _hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    sorted_scopes(self.finder.pairs(document), position, direction, |pair| {
      let interior = pair.interior_range();
      Some(TargetScope::single(
        pair.content_range(),
        Target::interior_of(interior, false),
      ))
    })
  }
}
