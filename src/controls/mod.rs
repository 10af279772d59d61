//! Interaction models for simulated widgets, independent of any renderer

pub mod scroll;
pub mod selection;
pub mod tree;

pub use scroll::{Scrollbar, Thumb, ThumbDrag};
pub use selection::{RowSelection, TabStrip};
pub use tree::{TreeRow, TreeRows};
