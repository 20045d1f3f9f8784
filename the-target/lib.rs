use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod actions;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod direction;
pub mod document;
pub mod edit;
pub mod editor;
pub mod error;
pub mod inference;
pub mod mark;
pub mod marks;
pub mod modifier;
pub mod modifiers;
pub mod pipeline;
pub mod position;
pub mod range;
pub mod range_updater;
pub mod removal;
pub mod scope;
pub mod scope_ranges;
pub mod scope_type;
pub mod sentence;
pub mod surrounding_pair;
pub mod target;
pub mod tokenizer;

pub type Tendril = SmartString<LazyCompact>;
