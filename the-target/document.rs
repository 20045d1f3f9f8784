//! The text document model consumed by the engine.
//!
//! [`TextDocument`] is the seam to whatever editor hosts the engine; the
//! engine only ever reads through it. [`InMemoryTextDocument`] is the
//! rope-backed implementation used by the CLI and the tests.
//!
//! # Clamping
//!
//! All conversions clamp instead of failing: lines past the end resolve to
//! the last line, positions before the start map to offset 0, positions
//! after the end to the document length, and characters past the end of a
//! line to the line end.

use std::borrow::Cow;

use ropey::Rope;
use the_core::{
  chars::char_is_whitespace,
  line_ending::strip_line_ending,
  text::utf16_len,
};

use crate::{
  edit::{
    ContentChange,
    Edit,
    normalize_edits,
  },
  error::EditError,
  position::Position,
  range::Range,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
  pub line_number:                          usize,
  /// Line text without its line break.
  pub text:                                 String,
  pub range:                                Range,
  pub range_including_line_break:           Range,
  pub first_non_whitespace_character_index: usize,
  /// Exclusive end of the last non-whitespace character.
  pub last_non_whitespace_character_index:  usize,
  pub is_empty_or_whitespace:               bool,
}

impl TextLine {
  fn new(line_number: usize, text: String, is_last: bool) -> Self {
    let len = utf16_len(&text);
    let first_non_whitespace = text
      .chars()
      .take_while(|&ch| char_is_whitespace(ch))
      .map(char::len_utf16)
      .sum();
    let last_non_whitespace = utf16_len(text.trim_end_matches(char_is_whitespace));
    let range = Range::from_coords(line_number, 0, line_number, len);
    let range_including_line_break = if is_last {
      range
    } else {
      Range::from_coords(line_number, 0, line_number + 1, 0)
    };

    Self {
      line_number,
      text,
      range,
      range_including_line_break,
      first_non_whitespace_character_index: first_non_whitespace,
      last_non_whitespace_character_index: last_non_whitespace,
      is_empty_or_whitespace: first_non_whitespace == len,
    }
  }

  /// The line without leading and trailing whitespace.
  pub fn trimmed_range(&self) -> Range {
    Range::from_coords(
      self.line_number,
      self.first_non_whitespace_character_index,
      self.line_number,
      self
        .last_non_whitespace_character_index
        .max(self.first_non_whitespace_character_index),
    )
  }
}

pub trait TextDocument {
  fn uri(&self) -> &str;

  fn language_id(&self) -> &str;

  fn version(&self) -> u64;

  /// Number of lines. A document always has at least one line, and a
  /// trailing line break starts a final empty line.
  fn line_count(&self) -> usize;

  fn line_at(&self, line: usize) -> TextLine;

  fn offset_at(&self, position: Position) -> usize;

  fn position_at(&self, offset: usize) -> Position;

  fn text(&self) -> String;

  fn text_in(&self, range: Range) -> String;

  /// Document length in UTF-16 code units.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn range(&self) -> Range {
    let last = self.line_at(self.line_count().saturating_sub(1));
    Range::new(Position::zero(), last.range.end)
  }

  /// Clamps `position` into the document.
  fn validate_position(&self, position: Position) -> Position {
    self.position_at(self.offset_at(position))
  }

  fn validate_range(&self, range: Range) -> Range {
    Range::new(
      self.validate_position(range.start),
      self.validate_position(range.end),
    )
  }
}

#[derive(Debug, Clone)]
pub struct InMemoryTextDocument {
  uri:         String,
  language_id: String,
  version:     u64,
  text:        Rope,
}

impl InMemoryTextDocument {
  pub fn new(uri: impl Into<String>, language_id: impl Into<String>, text: &str) -> Self {
    Self {
      uri:         uri.into(),
      language_id: language_id.into(),
      version:     1,
      text:        Rope::from_str(text),
    }
  }

  pub fn rope(&self) -> &Rope {
    &self.text
  }

  fn clamp_line(&self, line: usize) -> usize {
    line.min(self.text.len_lines() - 1)
  }

  fn line_text(&self, line: usize) -> String {
    let raw: Cow<str> = self.text.line(line).into();
    strip_line_ending(&raw).0.to_string()
  }

  fn line_start_offset(&self, line: usize) -> usize {
    self.text.char_to_utf16_cu(self.text.line_to_char(line))
  }

  fn offset_to_char(&self, offset: usize) -> usize {
    self.text.utf16_cu_to_char(offset.min(self.text.len_utf16_cu()))
  }

  /// Rounds an offset inside a surrogate pair down to the start of its
  /// character.
  fn snap_offset(&self, offset: usize) -> usize {
    self.text.char_to_utf16_cu(self.offset_to_char(offset))
  }

  /// Applies a batch of edits. The batch is validated first; on error the
  /// document is unchanged. Changes are returned in application order,
  /// last edit in the document first.
  pub fn edit(&mut self, edits: &[Edit]) -> Result<Vec<ContentChange>, EditError> {
    let normalized = normalize_edits(edits)?;
    let mut changes = Vec::with_capacity(normalized.len());

    for edit in normalized {
      let range = self.validate_range(edit.range);
      let range_offset = self.offset_at(range.start);
      let end_offset = self.offset_at(range.end);
      let start_char = self.offset_to_char(range_offset);
      let end_char = self.offset_to_char(end_offset);

      self.text.remove(start_char..end_char);
      self.text.insert(start_char, &edit.text);

      changes.push(ContentChange {
        range,
        range_offset,
        range_length: end_offset - range_offset,
        text: edit.text,
        is_replace: edit.is_replace,
      });
    }

    if !changes.is_empty() {
      self.version += 1;
    }
    Ok(changes)
  }
}

impl TextDocument for InMemoryTextDocument {
  fn uri(&self) -> &str {
    &self.uri
  }

  fn language_id(&self) -> &str {
    &self.language_id
  }

  fn version(&self) -> u64 {
    self.version
  }

  fn line_count(&self) -> usize {
    self.text.len_lines()
  }

  fn line_at(&self, line: usize) -> TextLine {
    let line = self.clamp_line(line);
    TextLine::new(line, self.line_text(line), line + 1 == self.line_count())
  }

  fn offset_at(&self, position: Position) -> usize {
    if position.line >= self.line_count() {
      return self.len();
    }
    let line_len = utf16_len(&self.line_text(position.line));
    self.snap_offset(self.line_start_offset(position.line) + position.character.min(line_len))
  }

  fn position_at(&self, offset: usize) -> Position {
    let offset = self.snap_offset(offset);
    let line = self.text.char_to_line(self.offset_to_char(offset));
    let line_len = utf16_len(&self.line_text(line));
    let character = (offset - self.line_start_offset(line)).min(line_len);
    Position::new(line, character)
  }

  fn text(&self) -> String {
    self.text.to_string()
  }

  fn text_in(&self, range: Range) -> String {
    let start = self.offset_to_char(self.offset_at(range.start));
    let end = self.offset_to_char(self.offset_at(range.end));
    self.text.slice(start..end.max(start)).to_string()
  }

  fn len(&self) -> usize {
    self.text.len_utf16_cu()
  }
}
