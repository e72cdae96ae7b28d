//! Text width measurement for instrument names.
//!
//! Font metrics are supplied by the host application through
//! [`TextMeasure`]. [`EstimatedTextMeasure`] is the fallback used when no
//! font backend is available, for example in the command line tool.

/// Measures the natural width of a single line of text.
pub trait TextMeasure {
    /// Width of `text` laid out at left alignment, in layout units
    fn width(&self, text: &str) -> f32;
}

/// Estimates text width from a fixed average character width.
///
/// # Examples
///
/// ```
/// # use engrave::layout::{EstimatedTextMeasure, TextMeasure};
/// let measure = EstimatedTextMeasure::new(2.0);
/// assert_eq!(measure.width("Flute"), 10.0);
/// assert_eq!(measure.width(""), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedTextMeasure {
    char_width: f32,
}

impl EstimatedTextMeasure {
    pub const fn new(char_width: f32) -> Self {
        Self { char_width }
    }

    pub fn char_width(&self) -> f32 {
        self.char_width
    }
}

impl Default for EstimatedTextMeasure {
    fn default() -> Self {
        Self::new(1.8)
    }
}

impl TextMeasure for EstimatedTextMeasure {
    fn width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}
