//! Modifier stages.
//!
//! Each [`Modifier`] becomes a [`ModifierStage`]: a function from one
//! target to zero or more targets. Stages run in list order; every target
//! a stage produces is fed to the next stage on its own, and the outputs
//! are concatenated:
//!
//! ```text
//!   [cursor] --containing line--> [line] --every token--> [a, b, c]
//! ```
//!
//! A failing stage fails the whole resolution.

mod compose;
mod filter;
mod instance;
mod position;
mod relative;
mod scope;

use crate::{
  document::TextDocument,
  error::{
    Result,
    TargetError,
  },
  modifier::Modifier,
  range::Range,
  scope::{
    ScopeHandler,
    ScopeHandlerFactory,
  },
  scope_type::{
    ScopeType,
    SimpleScopeKind,
  },
  target::Target,
};

pub use self::scope::every_scope_targets;

/// What stages may look at besides their input target.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
  pub document:           &'a dyn TextDocument,
  pub visible_ranges:     &'a [Range],
  pub handlers:           ScopeHandlerFactory<'a>,
  /// Where instance searches look, if a reference was stored.
  pub instance_reference: Option<&'a [Target]>,
}

impl StageContext<'_> {
  pub fn handler(&self, scope_type: &ScopeType) -> Result<Box<dyn ScopeHandler>> {
    self.handlers.create(scope_type)
  }
}

pub trait ModifierStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>>;
}

fn is_instance(scope_type: &ScopeType) -> bool {
  scope_type.kind() == Some(&SimpleScopeKind::Instance)
}

pub fn create_stage(modifier: &Modifier) -> Box<dyn ModifierStage + '_> {
  match modifier {
    Modifier::StartOf => Box::new(position::StartOfStage),
    Modifier::EndOf => Box::new(position::EndOfStage),
    Modifier::Leading => Box::new(position::LeadingStage),
    Modifier::Trailing => Box::new(position::TrailingStage),
    Modifier::Visible => Box::new(position::VisibleStage),
    Modifier::ToRawSelection => Box::new(position::RawSelectionStage),
    Modifier::ExtendThroughStartOf { modifiers } => Box::new(position::HeadTailStage {
      modifiers: modifiers.as_deref(),
      is_head:   true,
    }),
    Modifier::ExtendThroughEndOf { modifiers } => Box::new(position::HeadTailStage {
      modifiers: modifiers.as_deref(),
      is_head:   false,
    }),
    Modifier::InteriorOnly => Box::new(filter::InteriorOnlyStage),
    Modifier::ExcludeInterior => Box::new(filter::ExcludeInteriorStage),
    Modifier::KeepContentFilter => Box::new(filter::KeepContentFilterStage),
    Modifier::KeepEmptyFilter => Box::new(filter::KeepEmptyFilterStage),
    Modifier::ContainingScope {
      scope_type,
      ancestor_index,
    } => Box::new(scope::ContainingScopeStage {
      scope_type,
      ancestor_index: *ancestor_index,
    }),
    Modifier::PreferredScope { scope_type } => Box::new(scope::PreferredScopeStage { scope_type }),
    Modifier::EveryScope { scope_type } if is_instance(scope_type) => {
      Box::new(instance::InstanceStage { modifier })
    },
    Modifier::EveryScope { scope_type } => Box::new(scope::EveryScopeStage { scope_type }),
    Modifier::OrdinalScope { scope_type, .. } if is_instance(scope_type) => {
      Box::new(instance::InstanceStage { modifier })
    },
    Modifier::OrdinalScope {
      scope_type,
      start,
      length,
      is_every,
    } => Box::new(scope::OrdinalScopeStage {
      scope_type,
      start: *start,
      length: *length,
      is_every: *is_every,
    }),
    Modifier::RelativeScope { scope_type, .. } if is_instance(scope_type) => {
      Box::new(instance::InstanceStage { modifier })
    },
    Modifier::RelativeScope {
      scope_type,
      offset,
      length,
      direction,
      is_every,
    } => Box::new(relative::RelativeScopeStage {
      scope_type,
      offset: *offset,
      length: *length,
      direction: *direction,
      is_every: *is_every,
    }),
    Modifier::Cascading { modifiers } => Box::new(compose::CascadingStage { modifiers }),
    Modifier::ModifyIfUntyped { modifier } => Box::new(compose::ModifyIfUntypedStage { modifier }),
    Modifier::Range {
      anchor,
      active,
      exclude_anchor,
      exclude_active,
    } => Box::new(compose::RangeModifierStage {
      anchor,
      active,
      exclude_anchor: *exclude_anchor,
      exclude_active: *exclude_active,
    }),
    // Inference has already copied the previous mark over.
    Modifier::InferPreviousMark => Box::new(compose::IdentityStage),
  }
}

/// Runs `stages` over `targets`, feeding each stage the previous stage's
/// output one target at a time.
pub fn run_stages(
  cx: &StageContext<'_>,
  stages: &[Box<dyn ModifierStage + '_>],
  mut targets: Vec<Target>,
) -> Result<Vec<Target>> {
  for stage in stages {
    let mut next = Vec::with_capacity(targets.len());
    for target in &targets {
      next.extend(stage.run(cx, target)?);
    }
    targets = next;
  }
  Ok(targets)
}

/// Applies `modifiers` in order.
pub fn apply_modifiers(
  cx: &StageContext<'_>,
  modifiers: &[Modifier],
  targets: Vec<Target>,
) -> Result<Vec<Target>> {
  let stages: Vec<_> = modifiers.iter().map(create_stage).collect();
  let targets = run_stages(cx, &stages, targets)?;
  tracing::trace!(
    modifiers = modifiers.len(),
    targets = targets.len(),
    "applied modifiers"
  );
  Ok(targets)
}

/// Expands an empty target taken straight from a mark to the token around
/// it, and leaves everything else alone. Runs after every primitive
/// target's own modifiers.
pub struct ContainingTokenIfUntypedEmptyStage;

impl ModifierStage for ContainingTokenIfUntypedEmptyStage {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    if target.has_explicit_scope_type() || target.is_raw() || !target.content_range().is_empty() {
      return Ok(vec![target.clone()]);
    }
    let token = ScopeType::token();
    let stage = scope::ContainingScopeStage {
      scope_type:     &token,
      ancestor_index: 0,
    };
    match stage.run(cx, target) {
      Err(TargetError::NoContainingScope { .. }) => Ok(vec![target.clone()]),
      result => result,
    }
  }
}
