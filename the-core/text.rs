//! UTF-16 code unit bookkeeping.
//!
//! Positions exchanged with editors count UTF-16 code units while Rust
//! strings index bytes. These helpers translate between the two. Offsets
//! that land inside a multi-unit character round down to the character
//! start.

use unicode_segmentation::UnicodeSegmentation;

#[inline]
pub fn utf16_len(text: &str) -> usize {
  text.chars().map(char::len_utf16).sum()
}

/// Byte index of UTF-16 offset `offset` in `text`, clamped to the end.
pub fn utf16_to_byte(text: &str, offset: usize) -> usize {
  let mut units = 0;
  for (idx, ch) in text.char_indices() {
    if units >= offset {
      return idx;
    }
    units += ch.len_utf16();
    if units > offset {
      return idx;
    }
  }
  text.len()
}

/// UTF-16 offset of byte index `byte` in `text`, clamped to the end.
pub fn byte_to_utf16(text: &str, byte: usize) -> usize {
  let mut byte = byte.min(text.len());
  while !text.is_char_boundary(byte) {
    byte -= 1;
  }
  utf16_len(&text[..byte])
}

/// Slice of `text` between two UTF-16 offsets.
pub fn slice_utf16(text: &str, start: usize, end: usize) -> &str {
  let start = utf16_to_byte(text, start);
  let end = utf16_to_byte(text, end).max(start);
  &text[start..end]
}

/// Converts a non-decreasing sequence of byte offsets into UTF-16 offsets
/// in a single pass over the text. Useful when walking regex matches.
#[derive(Debug, Clone)]
pub struct Utf16Cursor<'a> {
  text:  &'a str,
  byte:  usize,
  units: usize,
}

impl<'a> Utf16Cursor<'a> {
  pub fn new(text: &'a str) -> Self {
    Self {
      text,
      byte: 0,
      units: 0,
    }
  }

  /// UTF-16 offset of `byte`. Moving backwards restarts from the
  /// beginning of the text.
  pub fn to_utf16(&mut self, byte: usize) -> usize {
    if byte < self.byte {
      self.byte = 0;
      self.units = 0;
    }
    let byte = byte.min(self.text.len());
    self.units += utf16_len(&self.text[self.byte..byte]);
    self.byte = byte;
    self.units
  }
}

/// Grapheme clusters of `text` as `(start, end, grapheme)` with UTF-16
/// bounds.
pub fn graphemes_utf16(text: &str) -> impl Iterator<Item = (usize, usize, &str)> {
  let mut offset = 0;
  text.graphemes(true).map(move |grapheme| {
    let start = offset;
    offset += utf16_len(grapheme);
    (start, offset, grapheme)
  })
}

#[cfg(test)]
mod test {
  use quickcheck::quickcheck;

  use super::*;

  #[test]
  fn test_utf16_conversions() {
    let text = "a😀b";
    assert_eq!(utf16_len(text), 4);
    assert_eq!(utf16_to_byte(text, 1), 1);
    assert_eq!(utf16_to_byte(text, 2), 1);
    assert_eq!(utf16_to_byte(text, 3), 5);
    assert_eq!(utf16_to_byte(text, 10), text.len());
    assert_eq!(byte_to_utf16(text, 5), 3);
    assert_eq!(byte_to_utf16(text, 3), 1);
    assert_eq!(slice_utf16(text, 1, 3), "😀");
  }

  #[test]
  fn test_cursor() {
    let text = "é😀x";
    let mut cursor = Utf16Cursor::new(text);
    assert_eq!(cursor.to_utf16(0), 0);
    assert_eq!(cursor.to_utf16(2), 1);
    assert_eq!(cursor.to_utf16(6), 3);
    assert_eq!(cursor.to_utf16(2), 1);
  }

  #[test]
  fn test_graphemes() {
    let clusters: Vec<_> = graphemes_utf16("e\u{301}x").collect();
    assert_eq!(clusters, vec![(0, 2, "e\u{301}"), (2, 3, "x")]);
  }

  quickcheck! {
    fn utf16_round_trip(text: String) -> bool {
      text
        .char_indices()
        .all(|(idx, _)| utf16_to_byte(&text, byte_to_utf16(&text, idx)) == idx)
    }
  }
}
