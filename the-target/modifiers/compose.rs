use crate::{
  error::{
    Result,
    TargetError,
  },
  modifier::Modifier,
  modifiers::{
    ModifierStage,
    StageContext,
    create_stage,
  },
  target::{
    Target,
    continuous_target,
  },
};

/// The first child modifier that succeeds.
pub struct CascadingStage<'m> {
  pub modifiers: &'m [Modifier],
}

impl ModifierStage for CascadingStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let mut last_error = None;
    for modifier in self.modifiers {
      match create_stage(modifier).run(cx, target) {
        Ok(targets) => return Ok(targets),
        Err(err) => {
          tracing::trace!(modifier = modifier.type_name(), %err, "cascading modifier failed");
          last_error = Some(err);
        },
      }
    }
    Err(last_error.unwrap_or_else(|| {
      TargetError::Precondition("cascading modifier has no modifiers".to_string())
    }))
  }
}

/// Applies its modifier only to targets taken straight from a mark.
pub struct ModifyIfUntypedStage<'m> {
  pub modifier: &'m Modifier,
}

impl ModifierStage for ModifyIfUntypedStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    if target.has_explicit_scope_type() {
      return Ok(vec![target.clone()]);
    }
    create_stage(self.modifier).run(cx, target)
  }
}

/// A range between what two modifiers make of the same target.
pub struct RangeModifierStage<'m> {
  pub anchor:         &'m Modifier,
  pub active:         &'m Modifier,
  pub exclude_anchor: bool,
  pub exclude_active: bool,
}

impl ModifierStage for RangeModifierStage<'_> {
  fn run(&self, cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    let anchor = create_stage(self.anchor).run(cx, target)?;
    let active = create_stage(self.active).run(cx, target)?;
    let ([anchor], [active]) = (anchor.as_slice(), active.as_slice()) else {
      return Err(TargetError::Precondition(
        "range modifier needs exactly one anchor and one active target".to_string(),
      ));
    };
    Ok(vec![continuous_target(
      cx.document,
      anchor,
      active,
      self.exclude_anchor,
      self.exclude_active,
    )])
  }
}

pub struct IdentityStage;

impl ModifierStage for IdentityStage {
  fn run(&self, _cx: &StageContext<'_>, target: &Target) -> Result<Vec<Target>> {
    Ok(vec![target.clone()])
  }
}

#[cfg(test)]
mod test {
  use crate::{
    error::TargetError,
    modifier::Modifier,
    modifiers::test::{
      cursor,
      resolve,
    },
    range::Range,
    scope_type::{
      ScopeType,
      SimpleScopeKind,
      SurroundingPairName,
    },
  };

  #[test]
  fn test_cascading_takes_first_success() {
    let cascading = Modifier::Cascading {
      modifiers: vec![
        Modifier::containing(ScopeType::surrounding_pair(SurroundingPairName::Parentheses)),
        Modifier::containing(ScopeType::token()),
      ],
    };
    assert_eq!(resolve("ab cd", cursor(0, 4), &[cascading]).unwrap(), vec![
      Range::from_coords(0, 3, 0, 5)
    ]);
  }

  #[test]
  fn test_cascading_reports_last_error() {
    let cascading = Modifier::Cascading {
      modifiers: vec![
        Modifier::containing(ScopeType::token()),
        Modifier::containing(ScopeType::simple(SimpleScopeKind::Other("namedFunction".into()))),
      ],
    };
    assert_eq!(
      resolve("   ", cursor(0, 1), &[cascading]),
      Err(TargetError::UnsupportedScopeType("namedFunction".into()))
    );
    assert!(matches!(
      resolve("a", cursor(0, 0), &[Modifier::Cascading { modifiers: vec![] }]),
      Err(TargetError::Precondition(_))
    ));
  }

  #[test]
  fn test_modify_if_untyped_skips_typed_targets() {
    let modify_if_untyped = Modifier::ModifyIfUntyped {
      modifier: Box::new(Modifier::containing(ScopeType::line())),
    };
    assert_eq!(
      resolve("ab cd", cursor(0, 1), &[modify_if_untyped.clone()]).unwrap(),
      vec![Range::from_coords(0, 0, 0, 5)]
    );
    assert_eq!(
      resolve("ab cd", cursor(0, 1), &[
        Modifier::containing(ScopeType::token()),
        modify_if_untyped
      ])
      .unwrap(),
      vec![Range::from_coords(0, 0, 0, 2)]
    );
  }

  #[test]
  fn test_range_modifier() {
    let range = Modifier::Range {
      anchor:         Box::new(Modifier::OrdinalScope {
        scope_type: ScopeType::token(),
        start:      0,
        length:     1,
        is_every:   false,
      }),
      active:         Box::new(Modifier::OrdinalScope {
        scope_type: ScopeType::token(),
        start:      2,
        length:     1,
        is_every:   false,
      }),
      exclude_anchor: false,
      exclude_active: true,
    };
    assert_eq!(resolve("aa bb cc dd", cursor(0, 0), &[range]).unwrap(), vec![
      Range::from_coords(0, 0, 0, 6)
    ]);
  }
}
