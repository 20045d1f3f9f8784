//! Resolved targets.
//!
//! A [`Target`] is an immutable value: a content range, a direction and a
//! [`TargetKind`] that decides how the target is removed, what delimits it
//! and how it combines with other targets into ranges. Targets never point
//! back at their editor; every query that needs text takes the document.

use crate::{
  Tendril,
  document::TextDocument,
  position::Position,
  range::{
    Range,
    Selection,
  },
  removal::{
    covers_full_lines,
    line_leading_delimiter_range,
    line_removal_range,
    line_trailing_delimiter_range,
    paragraph_leading_delimiter_range,
    paragraph_trailing_delimiter_range,
    expand_to_full_line,
    token_leading_delimiter_range,
    token_removal_range,
    token_trailing_delimiter_range,
  },
  scope_type::{
    ScopeType,
    SimpleScopeKind,
  },
};

/// A target produced by a scope handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTarget {
  pub scope_name:               Tendril,
  pub insertion_delimiter:      Tendril,
  /// Token-like scopes clean up adjacent whitespace instead of whole lines
  /// when they have no delimiter ranges of their own.
  pub is_token:                 bool,
  pub removal_range:            Option<Range>,
  pub interior_range:           Option<Range>,
  pub leading_delimiter_range:  Option<Range>,
  pub trailing_delimiter_range: Option<Range>,
}

impl ScopeTarget {
  pub fn new(scope_name: &str) -> Self {
    Self {
      scope_name:               scope_name.into(),
      insertion_delimiter:      insertion_delimiter_for(scope_name).into(),
      is_token:                 false,
      removal_range:            None,
      interior_range:           None,
      leading_delimiter_range:  None,
      trailing_delimiter_range: None,
    }
  }

  pub fn token_like(scope_name: &str) -> Self {
    Self {
      is_token: true,
      ..Self::new(scope_name)
    }
  }

  pub fn with_insertion_delimiter(mut self, delimiter: &str) -> Self {
    self.insertion_delimiter = delimiter.into();
    self
  }

  pub fn with_delimiter_ranges(mut self, leading: Option<Range>, trailing: Option<Range>) -> Self {
    self.leading_delimiter_range = leading;
    self.trailing_delimiter_range = trailing;
    self
  }

  pub fn with_removal_range(mut self, range: Option<Range>) -> Self {
    self.removal_range = range;
    self
  }

  pub fn with_interior_range(mut self, range: Option<Range>) -> Self {
    self.interior_range = range;
    self
  }

  fn has_delimiter_range(&self) -> bool {
    self.leading_delimiter_range.is_some() || self.trailing_delimiter_range.is_some()
  }
}

fn insertion_delimiter_for(scope_name: &str) -> &'static str {
  match scope_name {
    "class" | "namedFunction" | "section" | "namedParagraph" => "\n\n",
    "anonymousFunction" | "statement" | "ifStatement" | "comment" | "collectionItem"
    | "branch" => "\n",
    _ => " ",
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
  /// Straight from a mark, with no scope type applied yet.
  Untyped,
  /// Stands in for a target the user did not name.
  Implicit,
  /// Selection that must be used exactly as given.
  RawSelection,
  /// Content with no delimiters; removal removes exactly the content.
  Plain { insertion_delimiter: Tendril },
  Scope(ScopeTarget),
  Line,
  Paragraph,
  Document,
  SurroundingPair {
    interior: Range,
    boundary: [Range; 2],
  },
  Interior,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  kind:               TargetKind,
  content_range:      Range,
  is_reversed:        bool,
  has_explicit_range: bool,
}

impl Target {
  pub fn new(kind: TargetKind, content_range: Range, is_reversed: bool) -> Self {
    Self {
      kind,
      content_range,
      is_reversed,
      has_explicit_range: true,
    }
  }

  pub fn untyped(content_range: Range, is_reversed: bool, has_explicit_range: bool) -> Self {
    Self {
      has_explicit_range,
      ..Self::new(TargetKind::Untyped, content_range, is_reversed)
    }
  }

  pub fn implicit(content_range: Range, is_reversed: bool) -> Self {
    Self {
      has_explicit_range: false,
      ..Self::new(TargetKind::Implicit, content_range, is_reversed)
    }
  }

  pub fn plain(content_range: Range, is_reversed: bool) -> Self {
    Self::new(
      TargetKind::Plain {
        insertion_delimiter: Tendril::new(),
      },
      content_range,
      is_reversed,
    )
  }

  pub fn raw_selection(content_range: Range, is_reversed: bool) -> Self {
    Self::new(TargetKind::RawSelection, content_range, is_reversed)
  }

  pub fn scope(scope: ScopeTarget, content_range: Range, is_reversed: bool) -> Self {
    Self::new(TargetKind::Scope(scope), content_range, is_reversed)
  }

  pub fn line(content_range: Range, is_reversed: bool) -> Self {
    Self::new(TargetKind::Line, content_range, is_reversed)
  }

  pub fn paragraph(content_range: Range, is_reversed: bool) -> Self {
    Self::new(TargetKind::Paragraph, content_range, is_reversed)
  }

  pub fn document(content_range: Range, is_reversed: bool) -> Self {
    Self::new(TargetKind::Document, content_range, is_reversed)
  }

  /// A delimiter pair. `content_range` spans both delimiters.
  pub fn surrounding_pair(
    content_range: Range,
    interior: Range,
    boundary: [Range; 2],
    is_reversed: bool,
  ) -> Self {
    Self::new(
      TargetKind::SurroundingPair { interior, boundary },
      content_range,
      is_reversed,
    )
  }

  pub fn interior_of(content_range: Range, is_reversed: bool) -> Self {
    Self::new(TargetKind::Interior, content_range, is_reversed)
  }

  #[inline]
  pub fn kind(&self) -> &TargetKind {
    &self.kind
  }

  #[inline]
  pub fn content_range(&self) -> Range {
    self.content_range
  }

  #[inline]
  pub fn is_reversed(&self) -> bool {
    self.is_reversed
  }

  #[inline]
  pub fn has_explicit_range(&self) -> bool {
    self.has_explicit_range
  }

  /// False for targets taken directly from a mark.
  pub fn has_explicit_scope_type(&self) -> bool {
    !matches!(
      self.kind,
      TargetKind::Untyped | TargetKind::Implicit | TargetKind::RawSelection
    )
  }

  pub fn is_line(&self) -> bool {
    matches!(
      self.kind,
      TargetKind::Line | TargetKind::Paragraph | TargetKind::Document
    )
  }

  pub fn is_raw(&self) -> bool {
    matches!(self.kind, TargetKind::RawSelection)
  }

  pub fn is_implicit(&self) -> bool {
    matches!(self.kind, TargetKind::Implicit)
  }

  pub fn scope_name(&self) -> Option<&str> {
    match &self.kind {
      TargetKind::Scope(scope) => Some(&scope.scope_name),
      _ => None,
    }
  }

  pub fn insertion_delimiter(&self) -> &str {
    match &self.kind {
      TargetKind::Untyped | TargetKind::SurroundingPair { .. } => " ",
      TargetKind::Implicit | TargetKind::RawSelection | TargetKind::Interior => "",
      TargetKind::Plain {
        insertion_delimiter,
      } => insertion_delimiter,
      TargetKind::Scope(scope) => &scope.insertion_delimiter,
      TargetKind::Line | TargetKind::Document => "\n",
      TargetKind::Paragraph => "\n\n",
    }
  }

  /// Scope type whose containing scope must coincide with an occurrence of
  /// this target's text for the occurrence to count as an instance.
  pub fn instance_filter(&self) -> Option<ScopeType> {
    match &self.kind {
      TargetKind::Line => Some(ScopeType::line()),
      TargetKind::Scope(scope) if scope.scope_name == "word" => {
        Some(ScopeType::simple(SimpleScopeKind::Word))
      },
      TargetKind::Scope(scope) if scope.scope_name == "token" => Some(ScopeType::token()),
      TargetKind::Untyped | TargetKind::Implicit => Some(ScopeType::token()),
      _ => None,
    }
  }

  pub fn content_text(&self, document: &dyn TextDocument) -> String {
    document.text_in(self.content_range)
  }

  pub fn content_selection(&self) -> Selection {
    self.content_range.to_selection(self.is_reversed)
  }

  pub fn with_content_range(&self, content_range: Range) -> Self {
    let kind = match &self.kind {
      TargetKind::Scope(scope) => TargetKind::Scope(ScopeTarget {
        removal_range: None,
        interior_range: None,
        ..scope.clone()
      }),
      kind => kind.clone(),
    };
    Self {
      kind,
      content_range,
      ..*self
    }
  }

  pub fn with_reversed(&self, is_reversed: bool) -> Self {
    Self {
      is_reversed,
      ..self.clone()
    }
  }

  pub fn leading_delimiter(&self, document: &dyn TextDocument) -> Option<Target> {
    let content = self.content_range;
    let range = match &self.kind {
      TargetKind::Untyped | TargetKind::Implicit | TargetKind::SurroundingPair { .. } => {
        token_leading_delimiter_range(document, content)
      },
      TargetKind::Scope(scope) => match scope.leading_delimiter_range {
        Some(range) => Some(range),
        None if !scope.has_delimiter_range() => token_leading_delimiter_range(document, content),
        None => None,
      },
      TargetKind::Line => line_leading_delimiter_range(document, content),
      TargetKind::Paragraph => {
        let full = expand_to_full_line(document, content);
        return paragraph_leading_delimiter_range(document, full)
          .map(|range| Target::line(range, self.is_reversed));
      },
      TargetKind::Plain { .. }
      | TargetKind::RawSelection
      | TargetKind::Document
      | TargetKind::Interior => None,
    };
    range.map(|range| Target::plain(range, self.is_reversed))
  }

  pub fn trailing_delimiter(&self, document: &dyn TextDocument) -> Option<Target> {
    let content = self.content_range;
    let range = match &self.kind {
      TargetKind::Untyped | TargetKind::Implicit | TargetKind::SurroundingPair { .. } => {
        token_trailing_delimiter_range(document, content)
      },
      TargetKind::Scope(scope) => match scope.trailing_delimiter_range {
        Some(range) => Some(range),
        None if !scope.has_delimiter_range() => token_trailing_delimiter_range(document, content),
        None => None,
      },
      TargetKind::Line => line_trailing_delimiter_range(document, content),
      TargetKind::Paragraph => {
        let full = expand_to_full_line(document, content);
        return paragraph_trailing_delimiter_range(document, full)
          .map(|range| Target::line(range, self.is_reversed));
      },
      TargetKind::Plain { .. }
      | TargetKind::RawSelection
      | TargetKind::Document
      | TargetKind::Interior => None,
    };
    range.map(|range| Target::plain(range, self.is_reversed))
  }

  /// What deleting this target removes.
  pub fn removal_range(&self, document: &dyn TextDocument) -> Range {
    let content = self.content_range;
    match &self.kind {
      TargetKind::Untyped | TargetKind::Implicit => {
        if document.text_in(content).trim().is_empty() {
          content
        } else {
          self.token_removal_range(document)
        }
      },
      TargetKind::Plain { .. } | TargetKind::RawSelection | TargetKind::Interior => content,
      TargetKind::Scope(scope) => {
        if let Some(range) = scope.removal_range {
          range
        } else if scope.has_delimiter_range() {
          scope
            .trailing_delimiter_range
            .or(scope.leading_delimiter_range)
            .map_or(content, |delimiter| content.union(&delimiter))
        } else if !scope.is_token && covers_full_lines(document, content) {
          line_removal_range(document, content)
        } else {
          self.token_removal_range(document)
        }
      },
      TargetKind::Line => line_removal_range(document, content),
      TargetKind::Paragraph => {
        let removal_content = self
          .trailing_delimiter(document)
          .or_else(|| self.leading_delimiter(document))
          .map_or(content, |delimiter| content.union(&delimiter.content_range));
        line_removal_range(document, removal_content)
      },
      TargetKind::Document => document.range(),
      TargetKind::SurroundingPair { .. } => self.token_removal_range(document),
    }
  }

  fn token_removal_range(&self, document: &dyn TextDocument) -> Range {
    token_removal_range(
      document,
      self.content_range,
      self
        .leading_delimiter(document)
        .map(|target| target.content_range),
      self
        .trailing_delimiter(document)
        .map(|target| target.content_range),
    )
  }

  pub fn interior(&self) -> Option<Vec<Target>> {
    match &self.kind {
      TargetKind::SurroundingPair { interior, .. } => {
        Some(vec![Target::interior_of(*interior, self.is_reversed)])
      },
      TargetKind::Scope(ScopeTarget {
        interior_range: Some(interior),
        ..
      }) => Some(vec![Target::interior_of(*interior, self.is_reversed)]),
      _ => None,
    }
  }

  pub fn boundary(&self) -> Option<Vec<Target>> {
    match &self.kind {
      TargetKind::SurroundingPair { boundary, .. } => Some(
        boundary
          .iter()
          .map(|range| Target::plain(*range, self.is_reversed))
          .collect(),
      ),
      _ => None,
    }
  }

  /// Target spanning from `self` to `end`, which must not start before
  /// `self`. Exclusive ends drop the content of that side.
  pub fn create_continuous_range_target(
    &self,
    end: &Target,
    is_reversed: bool,
    include_start: bool,
    include_end: bool,
    document: &dyn TextDocument,
  ) -> Target {
    let range = continuous_range(self.content_range, end.content_range, include_start, include_end);
    match (&self.kind, &end.kind) {
      (TargetKind::Untyped, _) => Target::untyped(range, is_reversed, true),
      (TargetKind::Paragraph, TargetKind::Paragraph) if include_start && include_end => {
        Target::paragraph(
          continuous_line_range(document, self, end, true, true),
          is_reversed,
        )
      },
      (TargetKind::Line | TargetKind::Paragraph, _) if end.is_line() => Target::line(
        continuous_line_range(document, self, end, include_start, include_end),
        is_reversed,
      ),
      (TargetKind::Document, TargetKind::Document) => Target::document(range, is_reversed),
      (TargetKind::Scope(start_scope), TargetKind::Scope(end_scope))
        if start_scope.scope_name == end_scope.scope_name =>
      {
        if include_start && include_end {
          let removal_range = (start_scope.removal_range.is_some()
            || end_scope.removal_range.is_some())
          .then(|| {
            start_scope
              .removal_range
              .unwrap_or(self.content_range)
              .union(&end_scope.removal_range.unwrap_or(end.content_range))
          });
          Target::scope(
            ScopeTarget {
              removal_range,
              interior_range: None,
              leading_delimiter_range: start_scope.leading_delimiter_range,
              trailing_delimiter_range: end_scope.trailing_delimiter_range,
              ..start_scope.clone()
            },
            self.content_range.union(&end.content_range),
            is_reversed,
          )
        } else {
          self.with_content_range(range).with_reversed(is_reversed)
        }
      },
      (TargetKind::Plain { .. }, TargetKind::Plain { .. })
      | (TargetKind::RawSelection, TargetKind::RawSelection)
      | (TargetKind::Interior, TargetKind::Interior) => {
        self.with_content_range(range).with_reversed(is_reversed)
      },
      _ => Target::untyped(range, is_reversed, true),
    }
  }
}

/// Whether a range from `anchor` to `active` runs backwards.
pub fn is_reversed_range(anchor: &Target, active: &Target) -> bool {
  let (anchor, active) = (anchor.content_range, active.content_range);
  anchor.start > active.start || (anchor.start == active.start && anchor.end > active.end)
}

/// The range target from `anchor` to `active`, in either order.
pub fn continuous_target(
  document: &dyn TextDocument,
  anchor: &Target,
  active: &Target,
  exclude_anchor: bool,
  exclude_active: bool,
) -> Target {
  let is_reversed = is_reversed_range(anchor, active);
  let (start, end, exclude_start, exclude_end) = if is_reversed {
    (active, anchor, exclude_active, exclude_anchor)
  } else {
    (anchor, active, exclude_anchor, exclude_active)
  };
  start.create_continuous_range_target(end, is_reversed, !exclude_start, !exclude_end, document)
}

fn continuous_range(start: Range, end: Range, include_start: bool, include_end: bool) -> Range {
  Range::new(
    if include_start { start.start } else { start.end },
    if include_end { end.end } else { end.start },
  )
}

fn continuous_line_range(
  document: &dyn TextDocument,
  start: &Target,
  end: &Target,
  include_start: bool,
  include_end: bool,
) -> Range {
  let from = if include_start {
    start.content_range.start
  } else {
    Position::new(start.content_range.end.line + 1, 0)
  };
  let to = if include_end {
    end.content_range.end
  } else {
    document
      .line_at(end.content_range.start.line.saturating_sub(1))
      .range
      .end
  };
  Range::new(from, to)
}
