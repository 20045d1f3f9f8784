//! Delimiter and removal ranges shared by the target kinds.
//!
//! Token-like targets treat same-line whitespace as their delimiters and
//! absorb one side of it when removed. Line-like targets own the line
//! break after them, or the one before them on the last line.

use the_core::{
  chars::char_is_whitespace,
  text::{
    slice_utf16,
    utf16_len,
    utf16_to_byte,
  },
};

use crate::{
  config::EngineConfig,
  document::TextDocument,
  position::Position,
  range::Range,
  tokenizer::Tokenizer,
};

const LEADING_DELIMITERS: &[&str] = &["\"", "'", "(", "[", "{", "<"];
const TRAILING_DELIMITERS: &[&str] = &["\"", "'", ")", "]", "}", ">", ",", ";", ":"];

/// Whitespace on the same line directly before `content`.
pub fn token_leading_delimiter_range(document: &dyn TextDocument, content: Range) -> Option<Range> {
  let line = document.line_at(content.start.line);
  let before = slice_utf16(&line.text, 0, content.start.character);
  let kept = before.trim_end_matches(char_is_whitespace);
  let width = utf16_len(before) - utf16_len(kept);
  (width > 0).then(|| {
    Range::new(
      content.start.with_character(content.start.character - width),
      content.start,
    )
  })
}

/// Whitespace on the same line directly after `content`.
pub fn token_trailing_delimiter_range(
  document: &dyn TextDocument,
  content: Range,
) -> Option<Range> {
  let line = document.line_at(content.end.line);
  let after = &line.text[utf16_to_byte(&line.text, content.end.character)..];
  let kept = after.trim_start_matches(char_is_whitespace);
  let width = utf16_len(after) - utf16_len(kept);
  (width > 0).then(|| {
    Range::new(
      content.end,
      content.end.with_character(content.end.character + width),
    )
  })
}

/// From the start of the first line to the end of the last line of `range`.
pub fn expand_to_full_line(document: &dyn TextDocument, range: Range) -> Range {
  Range::new(
    Position::new(range.start.line, 0),
    document.line_at(range.end.line).range.end,
  )
}

/// Removal range of a token-like target. Whitespace on one side is
/// absorbed, trailing first, unless doing so would glue two tokens
/// together. A line left blank is cleared entirely.
pub fn token_removal_range(
  document: &dyn TextDocument,
  content: Range,
  leading: Option<Range>,
  trailing: Option<Range>,
) -> Range {
  let leading = leading.unwrap_or(Range::empty(content.start));
  let trailing = trailing.unwrap_or(Range::empty(content.end));
  let full_line = expand_to_full_line(document, content);

  if leading.union(&trailing) == full_line {
    return full_line;
  }

  if !trailing.is_empty()
    && (!leading.is_empty()
      || content.start == full_line.start
      || LEADING_DELIMITERS.contains(&leading_character(document, content).as_str()))
  {
    return content.union(&trailing);
  }

  if !leading.is_empty()
    && (content.end == full_line.end
      || TRAILING_DELIMITERS.contains(&trailing_character(document, content).as_str()))
  {
    return content.union(&leading);
  }

  if !trailing.is_empty() && !merges_tokens(document, content.union(&trailing)) {
    return content.union(&trailing);
  }
  if !leading.is_empty() && !merges_tokens(document, content.union(&leading)) {
    return content.union(&leading);
  }

  content
}

fn leading_character(document: &dyn TextDocument, content: Range) -> String {
  if content.start.character == 0 {
    return String::new();
  }
  document.text_in(Range::new(content.start.translate(0, -1), content.start))
}

fn trailing_character(document: &dyn TextDocument, content: Range) -> String {
  let line = document.line_at(content.end.line);
  if content.end >= line.range.end {
    return String::new();
  }
  document.text_in(Range::new(content.end, content.end.translate(0, 1)))
}

/// Whether deleting `removal` would leave a token spanning the join.
fn merges_tokens(document: &dyn TextDocument, removal: Range) -> bool {
  if !removal.is_single_line() {
    return false;
  }
  let Ok(tokenizer) = Tokenizer::for_language(&EngineConfig::default(), document.language_id())
  else {
    return true;
  };

  let line = document.line_at(removal.start.line);
  let before = slice_utf16(&line.text, 0, removal.start.character);
  let after = &line.text[utf16_to_byte(&line.text, removal.end.character)..];
  let joined = format!("{before}{after}");
  let join = utf16_len(before);

  tokenizer
    .tokenize(&joined)
    .iter()
    .any(|token| token.start < join && join < token.end)
}

/// Line break before the first line of `content`.
pub fn line_leading_delimiter_range(document: &dyn TextDocument, content: Range) -> Option<Range> {
  (content.start.line > 0).then(|| {
    Range::new(
      document.line_at(content.start.line - 1).range.end,
      Position::new(content.start.line, 0),
    )
  })
}

/// Line break after the last line of `content`.
pub fn line_trailing_delimiter_range(
  document: &dyn TextDocument,
  content: Range,
) -> Option<Range> {
  let line = document.line_at(content.end.line);
  (content.end.line + 1 < document.line_count())
    .then(|| Range::new(line.range.end, Position::new(content.end.line + 1, 0)))
}

/// Full lines of `content` together with one adjacent line break.
pub fn line_removal_range(document: &dyn TextDocument, content: Range) -> Range {
  let full = expand_to_full_line(document, content);
  if let Some(trailing) = line_trailing_delimiter_range(document, full) {
    full.union(&trailing)
  } else if let Some(leading) = line_leading_delimiter_range(document, full) {
    full.union(&leading)
  } else {
    full
  }
}

/// Blank lines between the paragraph and the previous non-blank line, or
/// the start of the document.
pub fn paragraph_leading_delimiter_range(
  document: &dyn TextDocument,
  content: Range,
) -> Option<Range> {
  let start_line = content.start.line;
  let previous = (0..start_line)
    .rev()
    .find(|&line| !document.line_at(line).is_empty_or_whitespace);

  match previous {
    Some(line) if line + 1 == start_line => None,
    Some(line) => Some(Range::new(
      Position::new(line + 1, 0),
      document.line_at(start_line - 1).range.end,
    )),
    None if start_line > 0 => Some(Range::new(
      Position::zero(),
      document.line_at(start_line - 1).range.end,
    )),
    None => None,
  }
}

/// Blank lines between the paragraph and the next non-blank line, or the
/// end of the document.
pub fn paragraph_trailing_delimiter_range(
  document: &dyn TextDocument,
  content: Range,
) -> Option<Range> {
  let end_line = content.end.line;
  let line_count = document.line_count();
  let next = (end_line + 1..line_count).find(|&line| !document.line_at(line).is_empty_or_whitespace);

  match next {
    Some(line) if line == end_line + 1 => None,
    Some(line) => Some(Range::new(
      Position::new(end_line + 1, 0),
      document.line_at(line - 1).range.end,
    )),
    None if end_line + 1 < line_count => Some(Range::new(
      Position::new(end_line + 1, 0),
      document.line_at(line_count - 1).range.end,
    )),
    None => None,
  }
}

/// Whether `content` spans whole lines, ignoring surrounding indentation.
pub fn covers_full_lines(document: &dyn TextDocument, content: Range) -> bool {
  let first = document.line_at(content.start.line);
  let last = document.line_at(content.end.line);
  content.start.character <= first.first_non_whitespace_character_index
    && content.end.character >= last.last_non_whitespace_character_index
}
