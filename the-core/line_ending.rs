//! Line break handling. Documents recognise `\n` and `\r\n`; a lone `\r`
//! is ordinary text.

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,

  /// U+000A -- LineFeed
  LF,
}

impl LineEnding {
  /// Length in UTF-16 code units, which for both endings equals the byte
  /// length.
  #[inline]
  pub const fn len_utf16(&self) -> usize {
    match self {
      Self::Crlf => 2,
      Self::LF => 1,
    }
  }

  #[inline]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Crlf => "\r\n",
      Self::LF => "\n",
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\n' => Some(LineEnding::LF),
      _ => None,
    }
  }
}

/// Splits a line (as produced by a line iterator, break included) into its
/// text and the line ending that terminated it.
pub fn strip_line_ending(line: &str) -> (&str, Option<LineEnding>) {
  if let Some(text) = line.strip_suffix("\r\n") {
    (text, Some(LineEnding::Crlf))
  } else if let Some(text) = line.strip_suffix('\n') {
    (text, Some(LineEnding::LF))
  } else {
    (line, None)
  }
}

/// The first line ending found in `text`, if any.
pub fn get_line_ending(text: &str) -> Option<LineEnding> {
  let idx = text.find('\n')?;
  if idx > 0 && text.as_bytes()[idx - 1] == b'\r' {
    Some(LineEnding::Crlf)
  } else {
    Some(LineEnding::LF)
  }
}

/// Splits `text` into lines the same way documents do: on `\n` with an
/// optional preceding `\r`. A trailing break yields a final empty line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
  text
    .split('\n')
    .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_strip_line_ending() {
    assert_eq!(strip_line_ending("abc\r\n"), ("abc", Some(LineEnding::Crlf)));
    assert_eq!(strip_line_ending("abc\n"), ("abc", Some(LineEnding::LF)));
    assert_eq!(strip_line_ending("abc"), ("abc", None));
    assert_eq!(strip_line_ending("a\rb"), ("a\rb", None));
  }

  #[test]
  fn test_split_lines() {
    let lines: Vec<_> = split_lines("a\r\nb\n\nc\n").collect();
    assert_eq!(lines, vec!["a", "b", "", "c", ""]);
    assert_eq!(get_line_ending("x\r\ny"), Some(LineEnding::Crlf));
    assert_eq!(get_line_ending("xy"), None);
  }
}
