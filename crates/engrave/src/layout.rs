//! Inputs shared by every layout pass.

mod context;
mod text;

pub use context::LayoutContext;
pub use text::{EstimatedTextMeasure, TextMeasure};
