use engrave_core::{score::Score, skyline::LayoutEpoch, spanner::Spanner, style::StyleContext};

use super::text::{EstimatedTextMeasure, TextMeasure};

static ESTIMATED_TEXT: EstimatedTextMeasure = EstimatedTextMeasure::new(1.8);

/// Every external input of a layout pass.
///
/// The context borrows the score, the style and the spanner list for the
/// duration of a pass. Passes never reach outside of it, so two calls with
/// equal contexts on equal systems produce equal layouts.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    score: &'a Score,
    style: &'a StyleContext,
    spanners: &'a [Spanner],
    text: &'a dyn TextMeasure,
    line_mode: bool,
    epoch: LayoutEpoch,
}

impl<'a> LayoutContext<'a> {
    /// Creates a page-view context without spanners
    pub fn new(score: &'a Score, style: &'a StyleContext) -> Self {
        Self {
            score,
            style,
            spanners: &[],
            text: &ESTIMATED_TEXT,
            line_mode: false,
            epoch: LayoutEpoch::default(),
        }
    }

    pub fn with_spanners(mut self, spanners: &'a [Spanner]) -> Self {
        self.spanners = spanners;
        self
    }

    pub fn with_text_measure(mut self, text: &'a dyn TextMeasure) -> Self {
        self.text = text;
        self
    }

    /// Enables continuous (line) view for the given layout epoch
    pub fn with_line_mode(mut self, line_mode: bool, epoch: LayoutEpoch) -> Self {
        self.line_mode = line_mode;
        self.epoch = epoch;
        self
    }

    pub fn score(&self) -> &'a Score {
        self.score
    }

    pub fn style(&self) -> &'a StyleContext {
        self.style
    }

    pub fn spanners(&self) -> &'a [Spanner] {
        self.spanners
    }

    pub fn text(&self) -> &'a dyn TextMeasure {
        self.text
    }

    pub fn line_mode(&self) -> bool {
        self.line_mode
    }

    pub fn epoch(&self) -> LayoutEpoch {
        self.epoch
    }

    pub fn spatium(&self) -> f32 {
        self.style.spatium()
    }
}

impl std::fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("style", &self.style)
            .field("spanners", &self.spanners.len())
            .field("line_mode", &self.line_mode)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}
