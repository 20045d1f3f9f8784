//! Every delimiter pair in a document, matched with one stack per name.

use std::collections::HashMap;

use crate::{
  document::TextDocument,
  range::Range,
  scope_type::SurroundingPairName,
  surrounding_pair::{
    PairMatch,
    delimiters::DelimiterSide,
    scanner::DelimiterScanner,
  },
};

pub(crate) fn document_pairs(document: &dyn TextDocument, scanner: &DelimiterScanner) -> Vec<PairMatch> {
  let text = document.text();
  let occurrences = scanner.scan(&text, None);

  let mut stacks: HashMap<SurroundingPairName, Vec<(Range, bool)>> = HashMap::new();
  let mut pairs = Vec::new();

  for occurrence in occurrences {
    let range = Range::new(
      document.position_at(occurrence.start),
      document.position_at(occurrence.end),
    );
    let stack = stacks.entry(occurrence.name).or_default();
    match occurrence.side {
      DelimiterSide::Left => stack.push((range, occurrence.single_line)),
      DelimiterSide::Right | DelimiterSide::Unknown => {
        let Some((left, single_line)) = stack.pop() else {
          continue;
        };
        if single_line && left.start.line != range.end.line {
          continue;
        }
        pairs.push(PairMatch {
          name: occurrence.name,
          left,
          right: range,
        });
      },
    }
  }

  pairs.sort_by_key(|pair| (pair.left.start, pair.right.end));
  pairs
}
