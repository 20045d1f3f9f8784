//! Keeps ranges valid while the document changes under them.
//!
//! Every tracked range is re-projected over a whole batch of
//! [`ContentChange`]s at once. All changes are expressed in coordinates of
//! the document before the batch, so each change contributes a
//! displacement for both ends of a range independently and the
//! displacements are summed at the end.
//!
//! A change touching a range is resolved by the range's
//! [`ExpansionBehavior`]:
//!
//! ```text
//!   tracked  [foo]   insert "x" at its end
//!   closed   [foo]x
//!   open     [foox]
//!   regex \w [foox]  (only as far as the pattern keeps matching)
//! ```

use std::collections::HashMap;

use regex::Regex;
use slotmap::{
  SecondaryMap,
  SlotMap,
};
use the_core::text::utf16_len;

use crate::{
  document::TextDocument,
  edit::{
    ContentChange,
    Edit,
  },
  error::{
    Result,
    TargetError,
  },
  range::{
    Range,
    Selection,
  },
  target::Target,
};

slotmap::new_key_type! {
  pub struct RangeListId;
  pub struct ReplaceEditListId;
}

/// A pattern anchored at either end of a text.
#[derive(Debug, Clone)]
pub struct AnchoredRegex {
  left:  Regex,
  right: Regex,
}

impl AnchoredRegex {
  pub fn new(pattern: &str) -> Result<Self> {
    let compile = |anchored: String| {
      Regex::new(&anchored).map_err(|err| TargetError::invalid_regex(pattern, &err))
    };
    Ok(Self {
      left:  compile(format!("^(?:{pattern})"))?,
      right: compile(format!("(?:{pattern})$"))?,
    })
  }

  /// Byte length of the non-empty match at the start of `text`.
  fn prefix_len(&self, text: &str) -> Option<usize> {
    self
      .left
      .find(text)
      .map(|m| m.end())
      .filter(|len| *len > 0)
  }

  /// Byte index where the non-empty match ending `text` begins.
  fn suffix_start(&self, text: &str) -> Option<usize> {
    self
      .right
      .find(text)
      .filter(|m| !m.is_empty())
      .map(|m| m.start())
  }
}

#[derive(Debug, Clone, Default)]
pub enum ExpansionPolicy {
  /// Never grows over inserted text.
  #[default]
  Closed,
  /// Always grows over inserted text.
  Open,
  /// Grows over inserted text only as far as the pattern matches.
  Regex(AnchoredRegex),
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionBehavior {
  pub start: ExpansionPolicy,
  pub end:   ExpansionPolicy,
}

impl ExpansionBehavior {
  pub fn closed() -> Self {
    Self::default()
  }

  pub fn open() -> Self {
    Self {
      start: ExpansionPolicy::Open,
      end:   ExpansionPolicy::Open,
    }
  }
}

/// UTF-16 offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeOffsets {
  pub start: usize,
  pub end:   usize,
}

impl RangeOffsets {
  const fn empty(offset: usize) -> Self {
    Self {
      start: offset,
      end:   offset,
    }
  }
}

#[derive(Debug, Clone)]
pub struct FullRangeInfo {
  pub range:     Range,
  pub offsets:   RangeOffsets,
  /// Text of the range, used by regex expansion.
  pub text:      String,
  pub expansion: ExpansionBehavior,
}

impl FullRangeInfo {
  pub fn new(document: &dyn TextDocument, range: Range, expansion: ExpansionBehavior) -> Self {
    let range = document.validate_range(range);
    Self {
      range,
      offsets: RangeOffsets {
        start: document.offset_at(range.start),
        end:   document.offset_at(range.end),
      },
      text: document.text_in(range),
      expansion,
    }
  }
}

struct ChangeInfo<'a> {
  change:       &'a ContentChange,
  displacement: isize,
  original:     RangeOffsets,
  /// Where the inserted text sits once the change is applied.
  inserted:     RangeOffsets,
}

impl<'a> ChangeInfo<'a> {
  fn new(change: &'a ContentChange) -> Self {
    let inserted_len = utf16_len(&change.text);
    let start = change.range_offset;
    Self {
      change,
      displacement: inserted_len as isize - change.range_length as isize,
      original: RangeOffsets {
        start,
        end: start + change.range_length,
      },
      inserted: RangeOffsets {
        start,
        end: start + inserted_len,
      },
    }
  }

  fn shift(&self, offset: usize) -> usize {
    offset.saturating_add_signed(self.displacement)
  }
}

/// Moves `infos` across `changes`. `document` is the document after the
/// changes were applied.
pub fn update_range_infos<'a>(
  document: &dyn TextDocument,
  changes: &[ContentChange],
  infos: impl IntoIterator<Item = &'a mut FullRangeInfo>,
) {
  let changes: Vec<_> = changes.iter().map(ChangeInfo::new).collect();

  for info in infos {
    let original = info.offsets;
    let mut start_delta = 0isize;
    let mut end_delta = 0isize;

    for change in &changes {
      if change.original.start > original.end {
        continue;
      }
      if change.original.end < original.start {
        start_delta += change.displacement;
        end_delta += change.displacement;
        continue;
      }

      let updated = if change.change.range_length > 0 {
        delete_or_replace(change, original)
      } else if original.start == original.end {
        empty_range_insert(change, info)
      } else {
        non_empty_range_insert(change, info)
      };
      start_delta += updated.start as isize - original.start as isize;
      end_delta += updated.end as isize - original.end as isize;
    }

    let start = original.start.saturating_add_signed(start_delta);
    let end = original.end.saturating_add_signed(end_delta).max(start);
    info.offsets = RangeOffsets { start, end };
    info.range = Range::new(document.position_at(start), document.position_at(end));
    info.text = document.text_in(info.range);
  }
}

/// Ends outside the replaced text keep their place; ends inside it are
/// clamped into what replaced it.
fn delete_or_replace(change: &ChangeInfo<'_>, range: RangeOffsets) -> RangeOffsets {
  let project = |offset: usize| {
    if offset <= change.original.start {
      offset
    } else if offset >= change.original.end {
      change.shift(offset)
    } else {
      offset.min(change.inserted.end)
    }
  };
  RangeOffsets {
    start: project(range.start),
    end:   project(range.end),
  }
}

/// An insertion exactly at an empty range. Replacements push the range
/// after the new text, plain insertions leave it before; open and regex
/// policies then let it grow over the inserted text.
fn empty_range_insert(change: &ChangeInfo<'_>, info: &FullRangeInfo) -> RangeOffsets {
  let text = &change.change.text;
  if text.is_empty() {
    return info.offsets;
  }

  let unexpanded = if change.change.is_replace {
    RangeOffsets::empty(change.inserted.end)
  } else {
    RangeOffsets::empty(change.inserted.start)
  };

  match &info.expansion.end {
    ExpansionPolicy::Closed => unexpanded,
    ExpansionPolicy::Open => change.inserted,
    ExpansionPolicy::Regex(regex) => match regex.prefix_len(text) {
      Some(len) => RangeOffsets {
        start: change.inserted.start,
        end:   change.inserted.start + utf16_len(&text[..len]),
      },
      None => unexpanded,
    },
  }
}

/// An insertion inside or at either end of a non-empty range.
fn non_empty_range_insert(change: &ChangeInfo<'_>, info: &FullRangeInfo) -> RangeOffsets {
  let RangeOffsets { start, end } = info.offsets;
  let offset = change.original.start;
  let inserted = change.change.text.as_str();

  if offset > start && offset < end {
    return RangeOffsets {
      start,
      end: change.shift(end),
    };
  }

  if offset == start {
    let end = change.shift(end);
    return match &info.expansion.start {
      ExpansionPolicy::Closed => RangeOffsets {
        start: change.shift(start),
        end,
      },
      ExpansionPolicy::Open => RangeOffsets { start, end },
      ExpansionPolicy::Regex(regex) => {
        let text = format!("{inserted}{}", info.text);
        // Several matches inside the original text: keep the leftmost one.
        let mut limit = text.len();
        let matched = loop {
          match regex.suffix_start(&text[..limit]) {
            Some(index) if index <= inserted.len() => break Some(index),
            Some(index) => limit = index,
            None => break None,
          }
        };
        match matched {
          Some(index) => RangeOffsets {
            start: start + utf16_len(&inserted[..index]),
            end,
          },
          None => RangeOffsets { start, end },
        }
      },
    };
  }

  match &info.expansion.end {
    ExpansionPolicy::Closed => RangeOffsets { start, end },
    ExpansionPolicy::Open => RangeOffsets {
      start,
      end: change.shift(end),
    },
    ExpansionPolicy::Regex(regex) => {
      let original = info.text.as_str();
      let full = format!("{original}{inserted}");
      // Several matches inside the original text: keep the rightmost one.
      let mut matched = regex.prefix_len(&full).unwrap_or(0);
      while matched != 0 && matched < original.len() {
        let rest = format!("{}{inserted}", &original[matched..]);
        matched = regex.prefix_len(&rest).map_or(0, |len| matched + len);
      }
      if matched == 0 {
        RangeOffsets { start, end }
      } else {
        RangeOffsets {
          start,
          end: start + utf16_len(&full[..matched]),
        }
      }
    },
  }
}

#[derive(Debug)]
struct RangeList {
  uri:   String,
  infos: Vec<FullRangeInfo>,
}

#[derive(Debug)]
struct ReplaceEditList {
  uri:   String,
  edits: Vec<Edit>,
}

/// Registries of ranges to keep up to date, per document.
#[derive(Debug, Default)]
pub struct RangeUpdater {
  range_lists:   SlotMap<RangeListId, RangeList>,
  targets:       SecondaryMap<RangeListId, Vec<Target>>,
  replace_edits: SlotMap<ReplaceEditListId, ReplaceEditList>,
}

impl RangeUpdater {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register_range_infos(
    &mut self,
    document: &dyn TextDocument,
    infos: Vec<FullRangeInfo>,
  ) -> RangeListId {
    self.range_lists.insert(RangeList {
      uri: document.uri().to_string(),
      infos,
    })
  }

  pub fn range_infos(&self, id: RangeListId) -> Option<&[FullRangeInfo]> {
    self.range_lists.get(id).map(|list| list.infos.as_slice())
  }

  /// Ranges pushed here after registration are kept up to date too.
  pub fn range_infos_mut(&mut self, id: RangeListId) -> Option<&mut Vec<FullRangeInfo>> {
    self.range_lists.get_mut(id).map(|list| &mut list.infos)
  }

  pub fn deregister_range_infos(&mut self, id: RangeListId) -> Option<Vec<FullRangeInfo>> {
    self.targets.remove(id);
    self.range_lists.remove(id).map(|list| list.infos)
  }

  /// Changes equal to one of `edits` (same range and text) are treated as
  /// replacements. Register before applying the edits.
  pub fn register_replace_edits(
    &mut self,
    document: &dyn TextDocument,
    edits: Vec<Edit>,
  ) -> ReplaceEditListId {
    self.replace_edits.insert(ReplaceEditList {
      uri: document.uri().to_string(),
      edits,
    })
  }

  pub fn deregister_replace_edits(&mut self, id: ReplaceEditListId) {
    self.replace_edits.remove(id);
  }

  /// Tracks the content ranges of `targets`.
  pub fn track_targets(
    &mut self,
    document: &dyn TextDocument,
    targets: Vec<Target>,
    expansion: &ExpansionBehavior,
  ) -> RangeListId {
    let infos = targets
      .iter()
      .map(|target| FullRangeInfo::new(document, target.content_range(), expansion.clone()))
      .collect();
    let id = self.register_range_infos(document, infos);
    self.targets.insert(id, targets);
    id
  }

  /// The tracked targets, moved to their current ranges.
  pub fn targets(&self, id: RangeListId) -> Option<Vec<Target>> {
    let targets = self.targets.get(id)?;
    let infos = self.range_infos(id)?;
    Some(
      targets
        .iter()
        .zip(infos)
        .map(|(target, info)| target.with_content_range(info.range))
        .collect(),
    )
  }

  pub fn track_selections(
    &mut self,
    document: &dyn TextDocument,
    selections: &[Selection],
  ) -> RangeListId {
    let infos = selections
      .iter()
      .map(|selection| FullRangeInfo::new(document, selection.range(), ExpansionBehavior::closed()))
      .collect();
    self.register_range_infos(document, infos)
  }

  /// The tracked ranges, directed like `original`.
  pub fn selections(&self, id: RangeListId, original: &[Selection]) -> Option<Vec<Selection>> {
    let infos = self.range_infos(id)?;
    Some(
      infos
        .iter()
        .zip(original)
        .map(|(info, selection)| info.range.to_selection(selection.is_reversed()))
        .collect(),
    )
  }

  fn is_replace(&self, uri: &str, change: &ContentChange) -> bool {
    self
      .replace_edits
      .values()
      .filter(|list| list.uri == uri)
      .flat_map(|list| &list.edits)
      .any(|edit| edit.range == change.range && edit.text == change.text)
  }

  /// Re-projects every range tracked for `document` over `changes`.
  pub fn on_document_change(&mut self, document: &dyn TextDocument, changes: &[ContentChange]) {
    let uri = document.uri();
    let changes: Vec<ContentChange> = changes
      .iter()
      .map(|change| ContentChange {
        is_replace: change.is_replace || self.is_replace(uri, change),
        ..change.clone()
      })
      .collect();
    tracing::debug!(uri, ?changes, "updating tracked ranges");

    let infos = self
      .range_lists
      .values_mut()
      .filter(|list| list.uri == uri)
      .flat_map(|list| list.infos.iter_mut());
    update_range_infos(document, &changes, infos);
  }

  /// Number of tracked lists per document.
  pub fn tracked_lists(&self) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for list in self.range_lists.values() {
      *counts.entry(list.uri.as_str()).or_insert(0) += 1;
    }
    counts
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    document::InMemoryTextDocument,
    position::Position,
  };

  fn doc(text: &str) -> InMemoryTextDocument {
    InMemoryTextDocument::new("untitled:ranges", "plaintext", text)
  }

  fn r(start: usize, end: usize) -> Range {
    Range::from_coords(0, start, 0, end)
  }

  /// Applies `edits` and returns where a range tracked with `expansion`
  /// ends up.
  fn track(text: &str, range: Range, expansion: ExpansionBehavior, edits: &[Edit]) -> Range {
    let mut document = doc(text);
    let mut updater = RangeUpdater::new();
    let id = updater.register_range_infos(&document, vec![FullRangeInfo::new(
      &document, range, expansion,
    )]);
    let changes = document.edit(edits).unwrap();
    updater.on_document_change(&document, &changes);
    updater.range_infos(id).unwrap()[0].range
  }

  fn end_regex(pattern: &str) -> ExpansionBehavior {
    ExpansionBehavior {
      start: ExpansionPolicy::Closed,
      end:   ExpansionPolicy::Regex(AnchoredRegex::new(pattern).unwrap()),
    }
  }

  fn insert(character: usize, text: &str) -> Edit {
    Edit::insert(Position::new(0, character), text)
  }

  #[test]
  fn test_empty_range_insert_policies() {
    let closed = track("abc", r(1, 1), ExpansionBehavior::closed(), &[insert(1, "X")]);
    assert_eq!(closed, r(1, 1));
    let open = track("abc", r(1, 1), ExpansionBehavior::open(), &[insert(1, "X")]);
    assert_eq!(open, r(1, 2));
    let replace = track("abc", r(1, 1), ExpansionBehavior::closed(), &[Edit::replace(
      r(1, 1),
      "XY",
    )]);
    assert_eq!(replace, r(3, 3));
    let regex = track("abc", r(1, 1), end_regex("[a-z]+"), &[insert(1, "xy z")]);
    assert_eq!(regex, r(1, 3));
  }

  #[test]
  fn test_shifts_without_overlap() {
    assert_eq!(
      track("aa bb cc", r(3, 5), ExpansionBehavior::closed(), &[insert(0, "xyz")]),
      r(6, 8)
    );
    assert_eq!(
      track("aa bb cc", r(3, 5), ExpansionBehavior::closed(), &[Edit::delete(r(6, 8))]),
      r(3, 5)
    );
  }

  #[test]
  fn test_non_empty_range_inserts() {
    let text = "foo bar";
    assert_eq!(
      track(text, r(0, 3), ExpansionBehavior::closed(), &[insert(1, "xx")]),
      r(0, 5)
    );
    assert_eq!(
      track(text, r(0, 3), ExpansionBehavior::closed(), &[insert(3, "xx")]),
      r(0, 3)
    );
    assert_eq!(
      track(text, r(0, 3), ExpansionBehavior::open(), &[insert(3, "xx")]),
      r(0, 5)
    );
    assert_eq!(
      track(text, r(4, 7), ExpansionBehavior::closed(), &[insert(4, "xx")]),
      r(6, 9)
    );
    assert_eq!(
      track(text, r(4, 7), ExpansionBehavior::open(), &[insert(4, "xx")]),
      r(4, 9)
    );
  }

  #[test]
  fn test_regex_expansion_of_non_empty_ranges() {
    let text = "foo bar";
    assert_eq!(track(text, r(0, 3), end_regex(r"\w+"), &[insert(3, "xy")]), r(0, 5));
    assert_eq!(track(text, r(0, 3), end_regex(r"\w+"), &[insert(3, " z")]), r(0, 3));

    let start_regex = ExpansionBehavior {
      start: ExpansionPolicy::Regex(AnchoredRegex::new(r"\w+").unwrap()),
      end:   ExpansionPolicy::Closed,
    };
    assert_eq!(track(text, r(4, 7), start_regex.clone(), &[insert(4, "ab")]), r(4, 9));
    assert_eq!(track(text, r(4, 7), start_regex, &[insert(4, "a-")]), r(6, 9));
  }

  #[test]
  fn test_deletions_clamp_inner_ends() {
    assert_eq!(
      track("hello world", r(6, 11), ExpansionBehavior::closed(), &[Edit::delete(r(3, 8))]),
      r(3, 6)
    );
    assert_eq!(
      track("hello world", r(2, 4), ExpansionBehavior::closed(), &[Edit::delete(r(0, 11))]),
      r(0, 0)
    );
    assert_eq!(
      track("hello world", r(0, 5), ExpansionBehavior::closed(), &[Edit::new(r(0, 5), "hi")]),
      r(0, 2)
    );
  }

  #[test]
  fn test_edit_inside_surrogate_pair_moves_nothing() {
    let moved = track("𐀀x", r(2, 3), ExpansionBehavior::closed(), &[Edit::delete(r(0, 1))]);
    assert_eq!(moved, r(2, 3));
  }

  #[test]
  fn test_batch_displacements_add_up() {
    let edits = [insert(0, "12"), Edit::delete(r(4, 6)), insert(9, "!")];
    assert_eq!(track("aa bb cc dd", r(3, 8), ExpansionBehavior::closed(), &edits), r(5, 8));
  }

  #[test]
  fn test_registered_replace_edits() {
    let mut document = doc("abc");
    let mut updater = RangeUpdater::new();
    let cursor = updater.track_selections(&document, &[Selection::point(Position::new(0, 1))]);
    let edit = Edit::insert(Position::new(0, 1), "XY");
    let replace = updater.register_replace_edits(&document, vec![edit.clone()]);

    let changes = document.edit(&[edit]).unwrap();
    updater.on_document_change(&document, &changes);
    updater.deregister_replace_edits(replace);
    assert_eq!(updater.range_infos(cursor).unwrap()[0].range, r(3, 3));

    let untracked = updater.deregister_range_infos(cursor).unwrap();
    assert_eq!(untracked.len(), 1);
    let changes = document.edit(&[Edit::insert(Position::new(0, 0), "Z")]).unwrap();
    updater.on_document_change(&document, &changes);
    assert!(updater.range_infos(cursor).is_none());
    assert!(updater.tracked_lists().is_empty());
  }

  #[test]
  fn test_tracked_targets_follow_edits() {
    let mut document = doc("one two three");
    let mut updater = RangeUpdater::new();
    let id = updater.track_targets(
      &document,
      vec![Target::plain(r(4, 7), false), Target::plain(r(8, 13), true)],
      &ExpansionBehavior::closed(),
    );
    let changes = document.edit(&[Edit::delete(r(0, 4))]).unwrap();
    updater.on_document_change(&document, &changes);
    let targets = updater.targets(id).unwrap();
    assert_eq!(targets[0].content_range(), r(0, 3));
    assert_eq!(targets[1].content_range(), r(4, 9));
    assert!(targets[1].is_reversed());
  }

  #[test]
  fn test_other_documents_are_untouched() {
    let mut document = doc("abc");
    let other = InMemoryTextDocument::new("untitled:other", "plaintext", "abc");
    let mut updater = RangeUpdater::new();
    let id = updater.register_range_infos(&other, vec![FullRangeInfo::new(
      &other,
      r(1, 2),
      ExpansionBehavior::closed(),
    )]);
    let changes = document.edit(&[insert(0, "xx")]).unwrap();
    updater.on_document_change(&document, &changes);
    assert_eq!(updater.range_infos(id).unwrap()[0].range, r(1, 2));
  }

  quickcheck::quickcheck! {
    fn test_identical_replacements_keep_ranges(
      text: String,
      tracked: Vec<(u8, u8)>,
      cuts: Vec<u8>
    ) -> bool {
      let text = text.replace('\r', "");
      let mut document = doc(&text);
      let len = document.len();
      let at = |offset: u8| document.position_at(offset as usize % (len + 1));

      let mut cuts: Vec<_> = cuts.into_iter().map(|cut| document.offset_at(at(cut))).collect();
      cuts.sort_unstable();
      cuts.dedup();
      let edits: Vec<_> = cuts
        .chunks_exact(2)
        .map(|pair| {
          let range = Range::new(document.position_at(pair[0]), document.position_at(pair[1]));
          Edit::new(range, document.text_in(range))
        })
        .collect();

      let mut infos: Vec<_> = tracked
        .iter()
        .map(|&(a, b)| FullRangeInfo::new(&document, Range::new(at(a), at(b)), ExpansionBehavior::closed()))
        .collect();
      let before: Vec<_> = infos.iter().map(|info| info.offsets).collect();

      let Ok(changes) = document.edit(&edits) else {
        return false;
      };
      update_range_infos(&document, &changes, infos.iter_mut());
      document.text() == text && infos.iter().map(|info| info.offsets).eq(before)
    }
  }
}
