//! Scope handlers.
//!
//! A [`ScopeHandler`] enumerates the scopes of one scope type outward from a
//! position, in document order. Handlers only produce *candidates*; the
//! shared driver in [`generate_scopes`] filters them against a set of
//! [`ScopeRequirements`] (containment of the starting position, a distal
//! bound, ancestor handling) and decides when enumeration can stop.
//!
//! Scope streams are lazy and pull-based: callers take as many scopes as
//! they need and drop the stream.

pub mod bounded;
pub mod character;
pub mod collection_item;
pub mod document;
pub mod line;
pub mod one_of;
pub mod pair;
pub mod paragraph;
pub mod query;
pub mod regex;
pub mod sentence;
pub mod token;
pub mod word;

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::{
  config::EngineConfig,
  direction::Direction,
  document::TextDocument,
  error::{
    Result,
    TargetError,
  },
  position::Position,
  range::Range,
  scope_type::{
    ScopeType,
    SimpleScopeKind,
    SurroundingPairName,
  },
  target::Target,
};

/// A scope found by a handler: the extent it was found in and the targets
/// it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetScope {
  pub domain: Range,
  targets:    SmallVec<[Target; 1]>,
}

impl TargetScope {
  pub fn new(domain: Range, targets: impl IntoIterator<Item = Target>) -> Self {
    Self {
      domain,
      targets: targets.into_iter().collect(),
    }
  }

  pub fn single(domain: Range, target: Target) -> Self {
    Self::new(domain, [target])
  }

  pub fn targets(&self, is_reversed: bool) -> Vec<Target> {
    self
      .targets
      .iter()
      .map(|target| target.with_reversed(is_reversed))
      .collect()
  }

  pub fn target_count(&self) -> usize {
    self.targets.len()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
  /// The scope must contain the starting position.
  Required,
  /// The scope must not contain the starting position, even at its edges.
  Disallowed,
  /// The scope may touch the starting position but not surround it.
  DisallowedIfStrict,
}

/// What a caller asks of a scope stream. Everything defaults to the
/// loosest setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeRequirements {
  pub containment:               Option<Containment>,
  /// Scopes entirely past this position are not yielded. Defaults to the
  /// document edge in the direction of travel.
  pub distal_position:           Option<Position>,
  /// Yield scopes that only touch the position on the near side.
  pub allow_adjacent_scopes:     bool,
  /// Don't yield a scope that contains the previously yielded one.
  pub skip_ancestor_scopes:      bool,
  /// Also yield scopes nested inside the previously yielded one.
  pub include_descendant_scopes: bool,
  pub max_ancestor_index:        Option<usize>,
}

/// [`ScopeRequirements`] with every default resolved. Handlers receive these
/// as hints and may use them to prune their candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeHints {
  pub containment:               Option<Containment>,
  pub distal_position:           Position,
  pub allow_adjacent_scopes:     bool,
  pub skip_ancestor_scopes:      bool,
  pub include_descendant_scopes: bool,
  pub max_ancestor_index:        usize,
}

impl ScopeHints {
  fn resolve(
    requirements: ScopeRequirements,
    document: &dyn TextDocument,
    direction: Direction,
  ) -> Self {
    let edge = match direction {
      Direction::Forward => document.range().end,
      Direction::Backward => document.range().start,
    };
    Self {
      containment:               requirements.containment,
      distal_position:           requirements.distal_position.unwrap_or(edge),
      allow_adjacent_scopes:     requirements.allow_adjacent_scopes,
      skip_ancestor_scopes:      requirements.skip_ancestor_scopes,
      include_descendant_scopes: requirements.include_descendant_scopes,
      max_ancestor_index:        requirements.max_ancestor_index.unwrap_or(usize::MAX),
    }
  }

  /// Back to requirements, for handlers that delegate to another handler.
  pub fn to_requirements(self) -> ScopeRequirements {
    ScopeRequirements {
      containment:               self.containment,
      distal_position:           Some(self.distal_position),
      allow_adjacent_scopes:     self.allow_adjacent_scopes,
      skip_ancestor_scopes:      self.skip_ancestor_scopes,
      include_descendant_scopes: self.include_descendant_scopes,
      max_ancestor_index:        Some(self.max_ancestor_index),
    }
  }
}

pub type ScopeCandidates<'a> = Box<dyn Iterator<Item = TargetScope> + 'a>;

pub trait ScopeHandler {
  /// The scope type this handler was created for. Used in error messages.
  fn scope_type(&self) -> &ScopeType;

  /// Whether scopes of this type can contain each other.
  fn is_hierarchical(&self) -> bool;

  /// Whether "every" should include scopes that only touch the iteration
  /// range.
  fn include_adjacent_in_every(&self) -> bool {
    false
  }

  /// Handler for the scopes "every" and ordinals iterate within.
  fn iteration_scope_handler(
    &self,
    factory: &ScopeHandlerFactory<'_>,
  ) -> Result<Box<dyn ScopeHandler>>;

  /// Candidate scopes from `position` in `direction`, in the order defined
  /// by [`compare_target_scopes`]. Candidates may violate `hints`; the
  /// driver filters them.
  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    hints: &ScopeHints,
  ) -> ScopeCandidates<'a>;

  /// Tie-break between a scope ending at a position and one starting there.
  /// `None` leaves the choice to the caller.
  fn is_preferred_over(
    &self,
    _document: &dyn TextDocument,
    _a: &TargetScope,
    _b: &TargetScope,
  ) -> Option<bool> {
    None
  }
}

/// Scopes from `position` in `direction` that satisfy `requirements`.
pub fn generate_scopes<'a>(
  handler: &'a dyn ScopeHandler,
  document: &'a dyn TextDocument,
  position: Position,
  direction: Direction,
  requirements: ScopeRequirements,
) -> ScopeStream<'a> {
  let hints = ScopeHints::resolve(requirements, document, direction);
  ScopeStream {
    candidates: handler.generate_scope_candidates(document, position, direction, &hints),
    hierarchical: handler.is_hierarchical(),
    position,
    direction,
    hints,
    current_position: position,
    previous: None,
    ancestor_index: 0,
    done: false,
  }
}

pub struct ScopeStream<'a> {
  candidates:       ScopeCandidates<'a>,
  hierarchical:     bool,
  position:         Position,
  direction:        Direction,
  hints:            ScopeHints,
  current_position: Position,
  previous:         Option<Range>,
  ancestor_index:   usize,
  done:             bool,
}

impl Iterator for ScopeStream<'_> {
  type Item = TargetScope;

  fn next(&mut self) -> Option<Self::Item> {
    while !self.done {
      let Some(scope) = self.candidates.next() else {
        self.done = true;
        break;
      };
      let domain = scope.domain;
      let mut yielded = None;

      if self.should_yield(domain) {
        self.ancestor_index = match self.previous {
          Some(previous) if domain.contains_range(&previous) => self.ancestor_index + 1,
          _ => 0,
        };

        if self.ancestor_index <= self.hints.max_ancestor_index {
          self.previous = Some(domain);
          // With descendants wanted, the walk resumes inside the scope
          // rather than past it.
          self.current_position = match (self.direction, self.hints.include_descendant_scopes) {
            (Direction::Forward, false) | (Direction::Backward, true) => domain.end,
            (Direction::Backward, false) | (Direction::Forward, true) => domain.start,
          };
          yielded = Some(scope);
        }
      }

      if self.can_stop_early(domain) {
        self.done = true;
      }
      if yielded.is_some() {
        return yielded;
      }
    }
    None
  }
}

impl ScopeStream<'_> {
  fn should_yield(&self, domain: Range) -> bool {
    if !check_requirements(self.position, self.direction, &self.hints, domain) {
      return false;
    }
    let Some(previous) = self.previous else {
      return true;
    };
    compare_domains(self.direction, self.current_position, previous, domain) == Ordering::Less
      && !(self.hints.skip_ancestor_scopes && domain.contains_range(&previous))
  }

  fn can_stop_early(&self, domain: Range) -> bool {
    let required = self.hints.containment == Some(Containment::Required);
    if self.hierarchical {
      return required && self.ancestor_index > self.hints.max_ancestor_index;
    }

    let past_position = match self.direction {
      Direction::Forward => domain.end > self.position,
      Direction::Backward => domain.start < self.position,
    };
    if required && past_position {
      return true;
    }

    match self.direction {
      Direction::Forward => domain.end >= self.hints.distal_position,
      Direction::Backward => domain.start <= self.hints.distal_position,
    }
  }
}

fn check_requirements(
  position: Position,
  direction: Direction,
  hints: &ScopeHints,
  domain: Range,
) -> bool {
  let contained = match hints.containment {
    Some(Containment::Disallowed) => !domain.contains(position),
    Some(Containment::DisallowedIfStrict) => !domain.strictly_contains(position),
    Some(Containment::Required) => domain.contains(position),
    None => true,
  };
  if !contained {
    return false;
  }

  let adjacent_ok = hints.allow_adjacent_scopes || domain.is_empty();
  let distal = hints.distal_position;
  match direction {
    Direction::Forward => {
      (domain.end > position || (domain.end == position && adjacent_ok))
        && (domain.start < distal || (domain.start == distal && adjacent_ok))
    },
    Direction::Backward => {
      (domain.start < position || (domain.start == position && adjacent_ok))
        && (domain.end > distal || (domain.end == distal && adjacent_ok))
    },
  }
}

/// Order in which scopes are met walking from `position` in `direction`:
/// scopes are ranked by the first of their edges the walk reaches.
pub fn compare_target_scopes(
  direction: Direction,
  position: Position,
  a: &TargetScope,
  b: &TargetScope,
) -> Ordering {
  compare_domains(direction, position, a.domain, b.domain)
}

fn compare_domains(direction: Direction, position: Position, a: Range, b: Range) -> Ordering {
  match direction {
    Direction::Forward => compare_forward(position, a, b),
    Direction::Backward => compare_backward(position, a, b),
  }
}

fn compare_forward(position: Position, a: Range, b: Range) -> Ordering {
  let a_start_visible = a.start >= position;
  let b_start_visible = b.start >= position;

  match (a_start_visible, b_start_visible) {
    (true, true) => a.start.cmp(&b.start).then(a.end.cmp(&b.end)),
    (false, false) => a.end.cmp(&b.end).then(b.start.cmp(&a.start)),
    (false, true) => a.end.cmp(&b.start).then(if b.is_empty() {
      Ordering::Greater
    } else {
      Ordering::Less
    }),
    (true, false) => a.start.cmp(&b.end).then(if a.is_empty() {
      Ordering::Less
    } else {
      Ordering::Greater
    }),
  }
}

fn compare_backward(position: Position, a: Range, b: Range) -> Ordering {
  let a_end_visible = a.end <= position;
  let b_end_visible = b.end <= position;

  match (a_end_visible, b_end_visible) {
    (true, true) => b.end.cmp(&a.end).then(b.start.cmp(&a.start)),
    (false, false) => b.start.cmp(&a.start).then(a.end.cmp(&b.end)),
    (false, true) => b.end.cmp(&a.start).then(if b.is_empty() {
      Ordering::Greater
    } else {
      Ordering::Less
    }),
    (true, false) => b.start.cmp(&a.end).then(if a.is_empty() {
      Ordering::Less
    } else {
      Ordering::Greater
    }),
  }
}

/// Sorts scopes computed up front into candidate order.
pub(crate) fn sort_scopes(scopes: &mut [TargetScope], direction: Direction, position: Position) {
  scopes.sort_by(|a, b| compare_target_scopes(direction, position, a, b));
}

/// Builds handlers for scope types. Handlers own everything they need, so
/// they outlive the factory.
#[derive(Debug, Clone, Copy)]
pub struct ScopeHandlerFactory<'a> {
  config:      &'a EngineConfig,
  language_id: &'a str,
}

impl<'a> ScopeHandlerFactory<'a> {
  pub fn new(config: &'a EngineConfig, language_id: &'a str) -> Self {
    Self {
      config,
      language_id,
    }
  }

  pub fn config(&self) -> &'a EngineConfig {
    self.config
  }

  pub fn language_id(&self) -> &'a str {
    self.language_id
  }

  pub fn create(&self, scope_type: &ScopeType) -> Result<Box<dyn ScopeHandler>> {
    let handler: Box<dyn ScopeHandler> = match scope_type {
      ScopeType::SurroundingPair { .. } => Box::new(pair::SurroundingPairScopeHandler::new(
        self,
        scope_type.clone(),
      )?),
      ScopeType::SurroundingPairInterior { .. } => Box::new(
        pair::SurroundingPairInteriorScopeHandler::new(self, scope_type.clone())?,
      ),
      ScopeType::CustomRegex { .. } | ScopeType::Glyph { .. } => {
        Box::new(regex::RegexScopeHandler::new(self, scope_type.clone())?)
      },
      ScopeType::OneOf { scope_types } => {
        let handlers = scope_types
          .iter()
          .map(|scope_type| self.create(scope_type))
          .collect::<Result<Vec<_>>>()?;
        Box::new(one_of::OneOfScopeHandler::new(scope_type.clone(), handlers))
      },
      ScopeType::Simple(simple) => match &simple.kind {
        SimpleScopeKind::Character => {
          Box::new(character::CharacterScopeHandler::new(self, scope_type.clone())?)
        },
        SimpleScopeKind::Word => Box::new(word::WordScopeHandler::new(self, scope_type.clone())?),
        SimpleScopeKind::Token | SimpleScopeKind::Identifier => {
          Box::new(token::TokenScopeHandler::new(self, scope_type.clone())?)
        },
        SimpleScopeKind::Line => Box::new(line::LineScopeHandler::new(scope_type.clone())),
        SimpleScopeKind::Sentence => {
          Box::new(sentence::SentenceScopeHandler::new(self, scope_type.clone())?)
        },
        SimpleScopeKind::Paragraph => {
          Box::new(paragraph::ParagraphScopeHandler::new(scope_type.clone()))
        },
        SimpleScopeKind::Document => {
          Box::new(document::DocumentScopeHandler::new(scope_type.clone()))
        },
        SimpleScopeKind::NonWhitespaceSequence | SimpleScopeKind::Url => {
          Box::new(regex::RegexScopeHandler::new(self, scope_type.clone())?)
        },
        SimpleScopeKind::BoundedNonWhitespaceSequence | SimpleScopeKind::BoundedParagraph => {
          Box::new(bounded::BoundedScopeHandler::new(self, scope_type.clone())?)
        },
        SimpleScopeKind::CollectionItem => Box::new(
          collection_item::CollectionItemScopeHandler::new(self, scope_type.clone())?,
        ),
        SimpleScopeKind::Interior => {
          Box::new(pair::InteriorScopeHandler::new(self, scope_type.clone())?)
        },
        SimpleScopeKind::String => {
          return self.create(&ScopeType::surrounding_pair(SurroundingPairName::String));
        },
        SimpleScopeKind::Instance | SimpleScopeKind::Other(_) => {
          return Err(TargetError::UnsupportedScopeType(
            scope_type.name().into_owned(),
          ));
        },
      },
    };
    Ok(handler)
  }
}

/// Flattens the scopes a nested handler finds inside each scope of its
/// search handler.
pub(crate) fn nested_candidates<'a, F>(
  search_handler: &'a dyn ScopeHandler,
  document: &'a dyn TextDocument,
  position: Position,
  direction: Direction,
  hints: &ScopeHints,
  scopes_in: F,
) -> ScopeCandidates<'a>
where
  F: Fn(&TargetScope) -> Vec<TargetScope> + 'a,
{
  let requirements = ScopeRequirements {
    containment: hints
      .containment
      .filter(|containment| *containment == Containment::Required),
    ..hints.to_requirements()
  };
  Box::new(
    generate_scopes(search_handler, document, position, direction, requirements).flat_map(
      move |search_scope| {
        let mut scopes = scopes_in(&search_scope);
        if direction == Direction::Backward {
          scopes.reverse();
        }
        scopes
      },
    ),
  )
}
