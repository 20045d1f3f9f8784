//! Engine configuration.
//!
//! Everything has a built-in default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! [tokenizer]
//! word-separators = ["_"]
//!
//! [surrounding-pair]
//! initial-scan-length = 200
//! max-scan-length     = 50000
//! expansion-factor    = 3
//!
//! [sentence]
//! abbreviations = ["approx"]
//!
//! [languages.css]
//! word-separators = ["_", "-"]
//! line-comment    = []
//! ```

use std::{
  collections::HashMap,
  fs,
  io::Error as IOError,
  path::Path,
};

use serde::Deserialize;
use thiserror::Error;
use toml::de::Error as TomlError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
  #[error("failed to read config: {0}")]
  Io(#[from] IOError),
  #[error("bad config: {0}")]
  BadConfig(TomlError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct EngineConfig {
  pub tokenizer:        TokenizerConfig,
  pub surrounding_pair: SurroundingPairConfig,
  pub sentence:         SentenceConfig,
  pub languages:        HashMap<String, LanguageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TokenizerConfig {
  pub word_separators: Vec<String>,
}

impl Default for TokenizerConfig {
  fn default() -> Self {
    Self {
      word_separators: vec!["_".to_string()],
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SurroundingPairConfig {
  /// Length of the first window scanned around the selection.
  pub initial_scan_length: usize,
  /// Windows stop growing past this length.
  pub max_scan_length:     usize,
  pub expansion_factor:    usize,
}

impl Default for SurroundingPairConfig {
  fn default() -> Self {
    Self {
      initial_scan_length: 200,
      max_scan_length:     50_000,
      expansion_factor:    3,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SentenceConfig {
  /// Extra abbreviations (without the trailing period) that never end a
  /// sentence.
  pub abbreviations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct LanguageConfig {
  pub word_separators: Option<Vec<String>>,
  /// Line comment prefixes. Comments act as barriers for delimiter
  /// matching.
  pub line_comment:    Option<Vec<String>>,
}

impl EngineConfig {
  pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
    toml::from_str(source).map_err(ConfigError::BadConfig)
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let source = fs::read_to_string(path)?;
    Self::from_toml(&source)
  }

  /// Word separators for `language_id`: the language override, then the
  /// built-in language default, then the global setting.
  pub fn word_separators(&self, language_id: &str) -> Vec<String> {
    self
      .languages
      .get(language_id)
      .and_then(|language| language.word_separators.clone())
      .or_else(|| default_word_separators(language_id))
      .unwrap_or_else(|| self.tokenizer.word_separators.clone())
  }

  pub fn line_comments(&self, language_id: &str) -> Vec<String> {
    self
      .languages
      .get(language_id)
      .and_then(|language| language.line_comment.clone())
      .unwrap_or_else(|| {
        default_line_comments(language_id)
          .iter()
          .map(|s| s.to_string())
          .collect()
      })
  }
}

pub(crate) fn default_word_separators(language_id: &str) -> Option<Vec<String>> {
  match language_id {
    "css" | "scss" | "less" | "shellscript" => Some(vec!["_".to_string(), "-".to_string()]),
    _ => None,
  }
}

fn default_line_comments(language_id: &str) -> &'static [&'static str] {
  match language_id {
    "c" | "cpp" | "csharp" | "go" | "java" | "javascript" | "javascriptreact" | "typescript"
    | "typescriptreact" | "kotlin" | "rust" | "scala" | "swift" | "dart" | "php" | "scss" => {
      &["//"]
    },
    "python" | "shellscript" | "ruby" | "toml" | "yaml" | "perl" | "r" | "elixir" | "nix" => {
      &["#"]
    },
    "lua" | "haskell" | "sql" => &["--"],
    "clojure" | "lisp" | "scheme" => &[";"],
    "latex" | "matlab" => &["%"],
    _ => &[],
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_empty_config_is_default() {
    assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
  }

  #[test]
  fn test_overrides() {
    let config = EngineConfig::from_toml(
      r#"
      [surrounding-pair]
      max-scan-length = 1000

      [languages.rust]
      word-separators = ["_", "-"]
      line-comment = ["//", "///"]
      "#,
    )
    .unwrap();

    assert_eq!(config.surrounding_pair.max_scan_length, 1000);
    assert_eq!(config.surrounding_pair.initial_scan_length, 200);
    assert_eq!(config.word_separators("rust"), vec!["_", "-"]);
    assert_eq!(config.line_comments("rust"), vec!["//", "///"]);
    assert_eq!(config.word_separators("css"), vec!["_", "-"]);
    assert_eq!(config.word_separators("plaintext"), vec!["_"]);
    assert_eq!(config.line_comments("python"), vec!["#"]);
  }

  #[test]
  fn test_unknown_fields_rejected() {
    assert!(matches!(
      EngineConfig::from_toml("[tokenizer]\nbogus = 1"),
      Err(ConfigError::BadConfig(_))
    ));
  }
}
