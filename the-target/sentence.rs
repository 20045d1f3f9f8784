//! Sentence boundary detection.
//!
//! Text is first cut into parts at lines holding no letters and at line
//! breaks that follow terminal punctuation. Each part is split into
//! whitespace separated words and a boundary is placed after words ending
//! in `.`, `?` or `!` unless the word looks like an abbreviation, a
//! number or a url. Sentences lose their leading non-letter characters
//! and trailing whitespace.

use std::{
  collections::HashSet,
  sync::OnceLock,
};

use regex::Regex;
use the_core::{
  chars::{
    char_is_letter,
    char_is_whitespace,
  },
  text::Utf16Cursor,
};

const ENGLISH_ABBREVIATIONS: &[&str] = &[
  "al", "adj", "assn", "Ave", "BSc", "MSc", "Cell", "Ch", "Co", "cc", "Corp", "Dem", "Dept", "ed",
  "eg", "Eq", "Eqs", "est", "etc", "Ex", "ext", "Fig", "fig", "Figs", "figs", "i.e", "ie", "Inc",
  "inc", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov", "Dec", "jr",
  "mi", "Miss", "Mrs", "Mr", "Ms", "Mol", "mt", "mts", "no", "Nos", "PhD", "MD", "BA", "MA", "MM",
  "pl", "pop", "pp", "Prof", "Dr", "pt", "Ref", "Refs", "Rep", "repr", "rev", "Sec", "Secs",
  "Sgt", "Col", "Gen", "Sen", "Gov", "Lt", "Maj", "Capt", "St", "Sr", "sr", "Jr", "Rev", "Sun",
  "Mon", "Tu", "Tue", "Tues", "Wed", "Th", "Thu", "Thur", "Thurs", "Fri", "Sat", "trans", "Univ",
  "Viz", "Vol", "vs", "v",
];

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
  URL_REGEX.get_or_init(|| {
    Regex::new(r"[-a-zA-Z0-9@:%._+~#=]{2,256}\.[a-z]{2,6}\b[-a-zA-Z0-9@:%_+.~#?&/=]*").unwrap()
  })
}

#[derive(Debug, Clone, Copy)]
struct Word {
  start: usize,
  end:   usize,
}

#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
  abbreviations: HashSet<String>,
}

impl Default for SentenceSegmenter {
  fn default() -> Self {
    Self::new(&[])
  }
}

impl SentenceSegmenter {
  pub fn new(extra_abbreviations: &[String]) -> Self {
    let abbreviations = ENGLISH_ABBREVIATIONS
      .iter()
      .map(|s| s.to_string())
      .chain(extra_abbreviations.iter().cloned())
      .collect();
    Self { abbreviations }
  }

  /// Sentence bounds in `text` as UTF-16 offsets.
  pub fn segment(&self, text: &str) -> Vec<(usize, usize)> {
    let mut cursor = Utf16Cursor::new(text);
    let mut sentences = Vec::new();

    for (part_start, part_end) in split_parts(text) {
      for (start, end) in self.segment_part(text, part_start, part_end) {
        let Some((start, end)) = trim_sentence(text, start, end) else {
          continue;
        };
        sentences.push((cursor.to_utf16(start), cursor.to_utf16(end)));
      }
    }

    sentences
  }

  /// Byte ranges of the sentences within `text[part_start..part_end]`.
  fn segment_part(&self, text: &str, part_start: usize, part_end: usize) -> Vec<(usize, usize)> {
    let words = split_words(text, part_start, part_end);
    let mut sentences: Vec<Vec<Word>> = Vec::new();
    let mut current: Vec<Word> = Vec::new();

    for (i, word) in words.iter().enumerate() {
      current.push(*word);
      let raw = &text[word.start..word.end];

      if matches!(raw, "." | "!" | "?") || raw.ends_with(['?', '!']) {
        sentences.push(std::mem::take(&mut current));
        continue;
      }

      let stripped = raw.strip_suffix('"').unwrap_or(raw);
      if stripped.ends_with('.') {
        if let Some(next) = words.get(i + 1) {
          let next = &text[next.start..next.end];
          if self.is_abbreviation_before(stripped, next) {
            continue;
          }
        }
        sentences.push(std::mem::take(&mut current));
        continue;
      }

      if let Some(dot) = stripped.find('.') {
        if is_number_around(stripped, dot) || is_dotted_abbreviation(stripped) || url_regex().is_match(stripped) {
          continue;
        }
      }

      if let Some(split) = concatenation_split(stripped) {
        current.pop();
        current.push(Word {
          start: word.start,
          end:   word.start + split,
        });
        sentences.push(std::mem::take(&mut current));
        current.push(Word {
          start: word.start + split,
          end:   word.end,
        });
      }
    }

    if !current.is_empty() {
      sentences.push(current);
    }

    merge_short_prefixes(text, sentences)
      .into_iter()
      .filter_map(|sentence| Some((sentence.first()?.start, sentence.last()?.end)))
      .collect()
  }

  fn is_abbreviation_before(&self, word: &str, next: &str) -> bool {
    let mut chars = word.chars();
    if word.chars().count() == 2 && !chars.next().is_some_and(|c| c.is_ascii_digit()) {
      return true;
    }
    if self.is_common_abbreviation(word) {
      return true;
    }
    if is_sentence_starter(next) {
      if matches!(word, "a.m." | "p.m.") {
        let tail: String = next
          .chars()
          .filter(|c| c.is_alphanumeric() || *c == '_')
          .collect::<String>()
          .to_lowercase();
        if tail.ends_with("day") {
          return true;
        }
      }
      if is_number(next) && (word.chars().count() <= 3 || is_capitalized(word)) {
        return true;
      }
      false
    } else {
      word.ends_with("..") || is_dotted_abbreviation(word)
    }
  }

  fn is_common_abbreviation(&self, word: &str) -> bool {
    let no_symbols: String = word
      .chars()
      .filter(|c| !"-'`~!@#$%^&*()_|+=?;:\",.<>{}[]\\/".contains(*c))
      .collect();
    self.abbreviations.contains(&no_symbols)
  }
}

/// Byte ranges of the parts of `text` that may contain sentences.
fn split_parts(text: &str) -> Vec<(usize, usize)> {
  let mut parts = Vec::new();
  let mut part_start: Option<usize> = None;
  let mut part_end = 0;
  let mut line_start = 0;

  for line in text.split_inclusive('\n') {
    let line_end = line_start + line.len();
    let content = line.trim_end_matches(['\n', '\r']);
    let content_end = line_start + content.len();

    if !content.chars().any(char_is_letter) {
      if let Some(start) = part_start.take() {
        parts.push((start, part_end));
      }
    } else {
      part_start.get_or_insert(line_start);
      part_end = content_end;
      if content.trim_end().ends_with(['.', '!', '?']) {
        if let Some(start) = part_start.take() {
          parts.push((start, part_end));
        }
      }
    }

    line_start = line_end;
  }

  if let Some(start) = part_start {
    parts.push((start, part_end));
  }
  parts
}

fn split_words(text: &str, start: usize, end: usize) -> Vec<Word> {
  let mut words = Vec::new();
  let mut word_start: Option<usize> = None;
  for (idx, ch) in text[start..end].char_indices() {
    let idx = start + idx;
    if char_is_whitespace(ch) {
      if let Some(word_start) = word_start.take() {
        words.push(Word {
          start: word_start,
          end:   idx,
        });
      }
    } else if word_start.is_none() {
      word_start = Some(idx);
    }
  }
  if let Some(word_start) = word_start {
    words.push(Word {
      start: word_start,
      end,
    });
  }
  words
}

/// Joins a lone one or two character word ending in a period (list
/// numbering such as `1.`) to the following sentence.
fn merge_short_prefixes(text: &str, sentences: Vec<Vec<Word>>) -> Vec<Vec<Word>> {
  let mut out: Vec<Vec<Word>> = Vec::with_capacity(sentences.len());
  for sentence in sentences.into_iter().filter(|s| !s.is_empty()) {
    if let Some(last) = out.last_mut() {
      if let ([only], Some(first)) = (last.as_slice(), sentence.first()) {
        let prefix = &text[only.start..only.end];
        let count = prefix.chars().count();
        let next = &text[first.start..first.end];
        if prefix.ends_with('.') && (2..=3).contains(&count) && !next.contains('.') {
          last.extend(sentence);
          continue;
        }
      }
    }
    out.push(sentence);
  }
  out
}

fn trim_sentence(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
  let slice = &text[start..end];
  let leading = slice.find(char_is_letter)?;
  let trimmed = slice[leading..].trim_end_matches(char_is_whitespace);
  Some((start + leading, start + leading + trimmed.len()))
}

fn is_capitalized(word: &str) -> bool {
  let mut chars = word.chars();
  let starts_upper = matches!(
    (chars.next(), chars.next()),
    (Some(a), Some(b)) if a.is_ascii_uppercase() && b.is_ascii_lowercase()
  );
  starts_upper || is_number(word)
}

fn is_sentence_starter(word: &str) -> bool {
  let prefix: String = word.chars().take(2).collect();
  is_capitalized(word) || prefix.contains("``") || prefix.contains(['"', '\''])
}

fn is_number(word: &str) -> bool {
  word.parse::<f64>().is_ok() && !word.chars().any(char_is_letter)
}

fn is_number_around(word: &str, dot: usize) -> bool {
  if dot == 0 {
    return is_number(word);
  }
  let window = word.get(dot - 1..(dot + 2).min(word.len()));
  window.is_some_and(is_number)
}

fn is_dotted_abbreviation(word: &str) -> bool {
  let mut chars = word.chars().filter(|c| !"()[]{}".contains(*c));
  matches!((chars.next(), chars.next()), (Some(_), Some('.')))
}

/// Where to split words like `Barney.The`: just after the first terminal
/// punctuation when a letter follows it.
fn concatenation_split(word: &str) -> Option<usize> {
  let idx = word
    .find('.')
    .or_else(|| word.find('!'))
    .or_else(|| word.find('?'))?;
  word[idx + 1..]
    .chars()
    .next()
    .filter(char::is_ascii_alphabetic)
    .map(|_| idx + 1)
}

#[cfg(test)]
mod test {
  use super::*;

  fn sentences(text: &str) -> Vec<String> {
    SentenceSegmenter::default()
      .segment(text)
      .into_iter()
      .map(|(start, end)| the_core::text::slice_utf16(text, start, end).to_string())
      .collect()
  }

  #[test]
  fn test_basic_punctuation() {
    assert_eq!(sentences("Foo. Bar? Baz! bongo"), vec!["Foo.", "Bar?", "Baz!", "bongo"]);
  }

  #[test]
  fn test_abbreviations() {
    assert_eq!(
      sentences("I met Dr. Smith at 5 p.m. Monday. It went well."),
      vec!["I met Dr. Smith at 5 p.m. Monday.", "It went well."]
    );
    assert_eq!(
      sentences("Use e.g. this one. Done."),
      vec!["Use e.g. this one.", "Done."]
    );
  }

  #[test]
  fn test_numbers_and_urls() {
    assert_eq!(
      sentences("Pi is 3.14 roughly. See example.com for more."),
      vec!["Pi is 3.14 roughly.", "See example.com for more."]
    );
  }

  #[test]
  fn test_concatenated() {
    assert_eq!(sentences("Hello there.The end"), vec!["Hello there.", "The end"]);
  }

  #[test]
  fn test_line_breaks_after_punctuation() {
    assert_eq!(
      sentences("First line.\nsecond line\ncontinues here"),
      vec!["First line.", "second line\ncontinues here"]
    );
  }

  #[test]
  fn test_letterless_lines_split_and_trim() {
    assert_eq!(
      sentences("- hello world\n---\n* another one  "),
      vec!["hello world", "another one"]
    );
  }

  #[test]
  fn test_list_numbering_is_merged() {
    assert_eq!(sentences("1. First item"), vec!["First item"]);
  }

  #[test]
  fn test_custom_abbreviation() {
    let segmenter = SentenceSegmenter::new(&["approx".to_string()]);
    let text = "It is approx. ten. Yes.";
    let found: Vec<_> = segmenter
      .segment(text)
      .into_iter()
      .map(|(s, e)| &text[s..e])
      .collect();
    assert_eq!(found, vec!["It is approx. ten.", "Yes."]);
  }
}
