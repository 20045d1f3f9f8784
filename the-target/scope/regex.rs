//! Scopes defined by a regular expression, matched within each line.

use std::sync::OnceLock;

use regex::Regex;
use the_core::text::Utf16Cursor;

use crate::{
  direction::Direction,
  document::TextDocument,
  error::{
    Result,
    TargetError,
  },
  position::Position,
  range::Range,
  scope::{
    ScopeCandidates,
    ScopeHandler,
    ScopeHandlerFactory,
    ScopeHints,
    TargetScope,
    line::LineScopeHandler,
    nested_candidates,
  },
  scope_type::{
    ScopeType,
    SimpleScopeKind,
  },
  target::{
    ScopeTarget,
    Target,
  },
};

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
  URL_REGEX.get_or_init(|| {
    Regex::new(
      r#"(?:https?://|ftp://|www\.)[^\s<>"'`()\[\]{}]*[^\s<>"'`()\[\]{}.,;:!?]"#,
    )
    .unwrap()
  })
}

pub struct RegexScopeHandler {
  scope_type: ScopeType,
  regex:      Regex,
  lines:      LineScopeHandler,
}

impl RegexScopeHandler {
  pub fn new(_factory: &ScopeHandlerFactory<'_>, scope_type: ScopeType) -> Result<Self> {
    let regex = match &scope_type {
      ScopeType::CustomRegex { regex, flags } => compile(regex, flags.as_deref())?,
      ScopeType::Glyph { character } => compile(&regex::escape(character), None)?,
      ScopeType::Simple(simple) if simple.kind == SimpleScopeKind::NonWhitespaceSequence => {
        compile(r"\S+", None)?
      },
      ScopeType::Simple(simple) if simple.kind == SimpleScopeKind::Url => url_regex().clone(),
      other => return Err(TargetError::UnsupportedScopeType(other.name().into_owned())),
    };
    Ok(Self {
      scope_type,
      regex,
      lines: LineScopeHandler::new(ScopeType::line()),
    })
  }

  fn scopes_in_line(&self, document: &dyn TextDocument, line_scope: &TargetScope) -> Vec<TargetScope> {
    let line = line_scope.domain.start.line;
    let text = document.line_at(line).text;
    let mut cursor = Utf16Cursor::new(&text);
    let name = self.scope_type.name();
    self
      .regex
      .find_iter(&text)
      .filter(|m| !m.is_empty())
      .map(|m| {
        let range = Range::from_coords(
          line,
          cursor.to_utf16(m.start()),
          line,
          cursor.to_utf16(m.end()),
        );
        TargetScope::single(range, Target::scope(ScopeTarget::token_like(&name), range, false))
      })
      .collect()
  }
}

/// Compiles a user pattern. Flags use the single-letter names `i`, `m`,
/// `s` and `x`; others (`g`, `u`, `y`) have no meaning here and are
/// ignored.
fn compile(pattern: &str, flags: Option<&str>) -> Result<Regex> {
  let inline: String = flags
    .unwrap_or_default()
    .chars()
    .filter(|flag| matches!(flag, 'i' | 'm' | 's' | 'x'))
    .collect();
  let full = if inline.is_empty() {
    pattern.to_string()
  } else {
    format!("(?{inline}){pattern}")
  };
  Regex::new(&full).map_err(|err| TargetError::invalid_regex(pattern, &err))
}

impl ScopeHandler for RegexScopeHandler {
  fn scope_type(&self) -> &ScopeType {
    &self.scope_type
  }

  fn is_hierarchical(&self) -> bool {
    false
  }

  fn iteration_scope_handler(
    &self,
    _factory: &ScopeHandlerFactory<'_>,
  ) -> Result<Box<dyn ScopeHandler>> {
    Ok(Box::new(LineScopeHandler::new(ScopeType::line())))
  }

  fn generate_scope_candidates<'a>(
    &'a self,
    document: &'a dyn TextDocument,
    position: Position,
    direction: Direction,
    hints: &ScopeHints,
  ) -> ScopeCandidates<'a> {
    nested_candidates(
      &self.lines,
      document,
      position,
      direction,
      hints,
      move |line_scope| self.scopes_in_line(document, line_scope),
    )
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    config::EngineConfig,
    document::InMemoryTextDocument,
    scope::{
      ScopeRequirements,
      generate_scopes,
    },
  };

  fn texts(scope_type: ScopeType, text: &str) -> Vec<String> {
    let document = InMemoryTextDocument::new("untitled:regex", "plaintext", text);
    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let handler = factory.create(&scope_type).unwrap();
    generate_scopes(
      handler.as_ref(),
      &document,
      Position::zero(),
      Direction::Forward,
      ScopeRequirements::default(),
    )
    .map(|scope| document.text_in(scope.domain))
    .collect()
  }

  #[test]
  fn test_non_whitespace_sequences() {
    assert_eq!(
      texts(
        ScopeType::simple(SimpleScopeKind::NonWhitespaceSequence),
        "a.b(c)  d\n e"
      ),
      vec!["a.b(c)", "d", "e"]
    );
  }

  #[test]
  fn test_urls() {
    assert_eq!(
      texts(
        ScopeType::simple(SimpleScopeKind::Url),
        "see https://example.com/a?b=1. or (www.rust-lang.org)"
      ),
      vec!["https://example.com/a?b=1", "www.rust-lang.org"]
    );
  }

  #[test]
  fn test_custom_regex_flags() {
    let scope_type = ScopeType::CustomRegex {
      regex: "ab+".into(),
      flags: Some("gi".into()),
    };
    assert_eq!(texts(scope_type, "AB xabb"), vec!["AB", "abb"]);

    let config = EngineConfig::default();
    let factory = ScopeHandlerFactory::new(&config, "plaintext");
    let invalid = ScopeType::CustomRegex {
      regex: "(".into(),
      flags: None,
    };
    assert!(matches!(
      factory.create(&invalid).err(),
      Some(TargetError::InvalidRegex { .. })
    ));
  }

  #[test]
  fn test_glyph() {
    assert_eq!(
      texts(
        ScopeType::Glyph {
          character: "$".into(),
        },
        "a$b$"
      ),
      vec!["$", "$"]
    );
  }
}
