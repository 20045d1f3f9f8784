//! Ranges of every scope in view, for highlighting.

use serde::Serialize;

use crate::{
  config::EngineConfig,
  direction::Direction,
  document::TextDocument,
  error::Result,
  range::Range,
  scope::{
    ScopeHandler,
    ScopeHandlerFactory,
    ScopeRequirements,
    TargetScope,
    generate_scopes,
  },
  scope_type::ScopeType,
  target::Target,
};

/// The ranges of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRanges {
  pub content_range:      Range,
  pub removal_range:      Range,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub leading_delimiter:  Option<Range>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trailing_delimiter: Option<Range>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub interior:           Option<Vec<Range>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub boundary:           Option<Vec<Range>>,
}

impl TargetRanges {
  pub fn new(document: &dyn TextDocument, target: &Target) -> Self {
    let ranges = |targets: Option<Vec<Target>>| {
      targets.map(|targets| targets.iter().map(Target::content_range).collect())
    };
    Self {
      content_range:      target.content_range(),
      removal_range:      target.removal_range(document),
      leading_delimiter:  target
        .leading_delimiter(document)
        .map(|delimiter| delimiter.content_range()),
      trailing_delimiter: target
        .trailing_delimiter(document)
        .map(|delimiter| delimiter.content_range()),
      interior:           ranges(target.interior()),
      boundary:           ranges(target.boundary()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeRanges {
  pub domain:  Range,
  pub targets: Vec<TargetRanges>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IterationRange {
  pub range:   Range,
  /// The scopes inside `range`, when nested targets were asked for.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub targets: Option<Vec<TargetRanges>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IterationScopeRanges {
  pub domain: Range,
  pub ranges: Vec<IterationRange>,
}

pub struct ScopeRangeProvider<'a> {
  handlers: ScopeHandlerFactory<'a>,
}

impl<'a> ScopeRangeProvider<'a> {
  pub fn new(config: &'a EngineConfig, language_id: &'a str) -> Self {
    Self {
      handlers: ScopeHandlerFactory::new(config, language_id),
    }
  }

  /// Every scope of `scope_type` touching `range`, nested ones included.
  pub fn scope_ranges(
    &self,
    document: &dyn TextDocument,
    range: Range,
    scope_type: &ScopeType,
  ) -> Result<Vec<ScopeRanges>> {
    let handler = self.handlers.create(scope_type)?;
    Ok(
      scopes_in(handler.as_ref(), document, range)
        .iter()
        .map(|scope| ScopeRanges {
          domain:  scope.domain,
          targets: scope
            .targets(false)
            .iter()
            .map(|target| TargetRanges::new(document, target))
            .collect(),
        })
        .collect(),
    )
  }

  /// The scopes `every` would iterate over for `scope_type` in `range`.
  pub fn iteration_scope_ranges(
    &self,
    document: &dyn TextDocument,
    range: Range,
    scope_type: &ScopeType,
    include_nested_targets: bool,
  ) -> Result<Vec<IterationScopeRanges>> {
    let handler = self.handlers.create(scope_type)?;
    let iteration_handler = handler.iteration_scope_handler(&self.handlers)?;

    Ok(
      scopes_in(iteration_handler.as_ref(), document, range)
        .iter()
        .map(|scope| IterationScopeRanges {
          domain: scope.domain,
          ranges: scope
            .targets(false)
            .iter()
            .map(|target| {
              let content = target.content_range();
              IterationRange {
                range:   content,
                targets: include_nested_targets
                  .then(|| nested_targets(handler.as_ref(), document, content)),
              }
            })
            .collect(),
        })
        .collect(),
    )
  }
}

fn scopes_in(handler: &dyn ScopeHandler, document: &dyn TextDocument, range: Range) -> Vec<TargetScope> {
  generate_scopes(handler, document, range.start, Direction::Forward, ScopeRequirements {
    distal_position: Some(range.end),
    include_descendant_scopes: true,
    ..ScopeRequirements::default()
  })
  .collect()
}

fn nested_targets(
  handler: &dyn ScopeHandler,
  document: &dyn TextDocument,
  range: Range,
) -> Vec<TargetRanges> {
  scopes_in(handler, document, range)
    .iter()
    .filter(|scope| range.contains_range(&scope.domain))
    .flat_map(|scope| scope.targets(false))
    .map(|target| TargetRanges::new(document, &target))
    .collect()
}
