//! Character and text primitives shared by the target engine.
//!
//! Everything here works on plain `&str` values and UTF-16 code unit
//! offsets, which is the unit documents expose positions in.

pub mod chars;
pub mod line_ending;
pub mod text;
