//! Index answering "which range most tightly contains this point" over a set
//! of ranges that are nested or disjoint.
//!
//! Ranges are sorted in document order and folded into a forest: each range
//! becomes a child of the nearest range on the parent stack that contains
//! it. Nodes live in one arena and refer to each other by index.
//!
//! ```text
//!   [ a ( b ) ]   " c "
//!   └─ [..] ─┬─ (..)        "..."
//! ```

use crate::{
  position::Position,
  range::Range,
};

#[derive(Debug, Clone)]
struct Node {
  range:    Range,
  parent:   Option<usize>,
  children: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct NestedRangeIndex {
  nodes: Vec<Node>,
  roots: Vec<usize>,
}

impl NestedRangeIndex {
  pub fn new(ranges: impl IntoIterator<Item = Range>) -> Self {
    let mut ranges: Vec<Range> = ranges.into_iter().collect();
    ranges.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut index = Self {
      nodes: Vec::with_capacity(ranges.len()),
      roots: Vec::new(),
    };
    let mut stack: Vec<usize> = Vec::new();

    for range in ranges {
      while let Some(&top) = stack.last() {
        if index.nodes[top].range.contains_range(&range) {
          break;
        }
        stack.pop();
      }

      let id = index.nodes.len();
      let parent = stack.last().copied();
      index.nodes.push(Node {
        range,
        parent,
        children: Vec::new(),
      });
      match parent {
        Some(parent) => index.nodes[parent].children.push(id),
        None => index.roots.push(id),
      }
      stack.push(id);
    }

    index
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// The innermost range containing `point`, bounds included.
  pub fn smallest_containing(&self, point: Position) -> Option<Range> {
    self.smallest_node_containing(point).map(|id| self.nodes[id].range)
  }

  /// The innermost range containing all of `range`.
  pub fn smallest_containing_range(&self, range: Range) -> Option<Range> {
    let mut current = self.smallest_node_containing(range.start);
    while let Some(id) = current {
      let node = &self.nodes[id];
      if node.range.contains_range(&range) {
        return Some(node.range);
      }
      current = node.parent;
    }
    None
  }

  /// Whether `range` lies strictly inside some indexed range that does not
  /// also contain `except`.
  pub fn is_shadowed(&self, range: Range, except: Range) -> bool {
    let mut current = self.smallest_node_containing(range.start);
    while let Some(id) = current {
      let node = &self.nodes[id];
      if node.range.start < range.start
        && range.end < node.range.end
        && !node.range.contains_range(&except)
      {
        return true;
      }
      current = node.parent;
    }
    false
  }

  fn smallest_node_containing(&self, point: Position) -> Option<usize> {
    let mut found = None;
    let mut level = &self.roots;
    loop {
      // Siblings are sorted by start and don't overlap, so only the last one
      // starting at or before the point can contain it.
      let after = level.partition_point(|&id| self.nodes[id].range.start <= point);
      let Some(&candidate) = after.checked_sub(1).and_then(|i| level.get(i)) else {
        return found;
      };
      let node = &self.nodes[candidate];
      if !node.range.contains(point) {
        return found;
      }
      found = Some(candidate);
      level = &node.children;
    }
  }
}
