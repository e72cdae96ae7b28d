//! Horizontal segments of a system: measures and frames.
//!
//! Measures carry the vertical spacer directives the stacking pass reads.
//! Frames are non-staff boxes; a system that starts with a vertical or text
//! frame is laid out as that frame alone.

use serde::Deserialize;

use crate::geometry::Bounds;

/// Musical time in ticks
pub type Tick = i32;

/// Which staff boundary a spacer pushes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacerPlacement {
    /// Space above the staff the spacer is attached to
    Up,
    /// Space below the staff the spacer is attached to
    Down,
}

/// How a spacer combines with the other distance rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacerKind {
    /// Exact gap; overrides every other rule
    Fixed,
    /// Lower bound on the gap
    #[default]
    Minimum,
}

/// A vertical spacer anchored at a staff of a measure.
///
/// The gap is the free space between the bottom line of the upper staff and
/// the top line of the lower staff, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Spacer {
    staff: usize,
    placement: SpacerPlacement,
    #[serde(default)]
    kind: SpacerKind,
    gap: f32,
}

impl Spacer {
    pub fn new(staff: usize, placement: SpacerPlacement, kind: SpacerKind, gap: f32) -> Self {
        Self {
            staff,
            placement,
            kind,
            gap,
        }
    }

    pub fn staff(&self) -> usize {
        self.staff
    }

    pub fn placement(&self) -> SpacerPlacement {
        self.placement
    }

    pub fn kind(&self) -> SpacerKind {
        self.kind
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn is_fixed(&self) -> bool {
        self.kind == SpacerKind::Fixed
    }
}

/// A measure as seen by the system layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measure {
    tick: Tick,
    ticks: Tick,
    #[serde(default)]
    x: f32,
    width: f32,
    #[serde(default)]
    spacers: Vec<Spacer>,
    #[serde(default)]
    page_break: bool,
    #[serde(skip)]
    bounds: Bounds,
}

impl Measure {
    pub fn new(tick: Tick, ticks: Tick, x: f32, width: f32) -> Self {
        Self {
            tick,
            ticks,
            x,
            width,
            spacers: Vec::new(),
            page_break: false,
            bounds: Bounds::default(),
        }
    }

    pub fn with_spacer(mut self, spacer: Spacer) -> Self {
        self.spacers.push(spacer);
        self
    }

    pub fn with_page_break(mut self, page_break: bool) -> Self {
        self.page_break = page_break;
        self
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn end_tick(&self) -> Tick {
        self.tick + self.ticks
    }

    /// Horizontal position inside the system
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn page_break(&self) -> bool {
        self.page_break
    }

    pub fn spacers(&self) -> &[Spacer] {
        &self.spacers
    }

    /// Spacer below `staff_idx`, if any
    pub fn vspacer_down(&self, staff_idx: usize) -> Option<&Spacer> {
        self.spacers
            .iter()
            .find(|s| s.staff == staff_idx && s.placement == SpacerPlacement::Down)
    }

    /// Spacer above `staff_idx`, if any
    pub fn vspacer_up(&self, staff_idx: usize) -> Option<&Spacer> {
        self.spacers
            .iter()
            .find(|s| s.staff == staff_idx && s.placement == SpacerPlacement::Up)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }
}

/// A horizontal, vertical or text frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Frame {
    #[serde(default)]
    tick: Tick,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    top_gap: f32,
    #[serde(default)]
    bottom_gap: f32,
    #[serde(default)]
    page_break: bool,
    #[serde(skip)]
    bounds: Bounds,
}

impl Frame {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            tick: 0,
            x: 0.0,
            width,
            height,
            top_gap: 0.0,
            bottom_gap: 0.0,
            page_break: false,
            bounds: Bounds::default(),
        }
    }

    pub fn with_gaps(mut self, top_gap: f32, bottom_gap: f32) -> Self {
        self.top_gap = top_gap;
        self.bottom_gap = bottom_gap;
        self
    }

    pub fn with_tick(mut self, tick: Tick) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_page_break(mut self, page_break: bool) -> Self {
        self.page_break = page_break;
        self
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Minimum space above a vertical frame
    pub fn top_gap(&self) -> f32 {
        self.top_gap
    }

    /// Minimum space below a vertical frame
    pub fn bottom_gap(&self) -> f32 {
        self.bottom_gap
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }
}

/// One horizontal segment of a system.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeasureBase {
    Measure(Measure),
    HBox(Frame),
    VBox(Frame),
    TBox(Frame),
}

impl MeasureBase {
    pub fn as_measure(&self) -> Option<&Measure> {
        match self {
            Self::Measure(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the frame of a vertical or text frame
    pub fn as_vertical_frame(&self) -> Option<&Frame> {
        match self {
            Self::VBox(f) | Self::TBox(f) => Some(f),
            _ => None,
        }
    }

    pub fn tick(&self) -> Tick {
        match self {
            Self::Measure(m) => m.tick(),
            Self::HBox(f) | Self::VBox(f) | Self::TBox(f) => f.tick(),
        }
    }

    /// Tick right after the segment; frames take no time
    pub fn end_tick(&self) -> Tick {
        match self {
            Self::Measure(m) => m.end_tick(),
            Self::HBox(f) | Self::VBox(f) | Self::TBox(f) => f.tick(),
        }
    }

    pub fn x(&self) -> f32 {
        match self {
            Self::Measure(m) => m.x(),
            Self::HBox(f) | Self::VBox(f) | Self::TBox(f) => f.x(),
        }
    }

    pub fn width(&self) -> f32 {
        match self {
            Self::Measure(m) => m.width(),
            Self::HBox(f) | Self::VBox(f) | Self::TBox(f) => f.width(),
        }
    }

    pub fn page_break(&self) -> bool {
        match self {
            Self::Measure(m) => m.page_break(),
            Self::HBox(f) | Self::VBox(f) | Self::TBox(f) => f.page_break,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Measure(m) => m.bounds(),
            Self::HBox(f) | Self::VBox(f) | Self::TBox(f) => f.bounds(),
        }
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        match self {
            Self::Measure(m) => m.set_bounds(bounds),
            Self::HBox(f) | Self::VBox(f) | Self::TBox(f) => f.set_bounds(bounds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacer_lookup() {
        let measure = Measure::new(0, 1920, 0.0, 100.0)
            .with_spacer(Spacer::new(1, SpacerPlacement::Down, SpacerKind::Fixed, 5.0))
            .with_spacer(Spacer::new(2, SpacerPlacement::Up, SpacerKind::Minimum, 9.0));

        assert!(measure.vspacer_down(1).is_some_and(Spacer::is_fixed));
        assert!(measure.vspacer_up(1).is_none());
        assert_eq!(measure.vspacer_up(2).map(Spacer::gap), Some(9.0));
        assert!(measure.vspacer_down(2).is_none());
    }

    #[test]
    fn test_measure_ticks() {
        let measure = Measure::new(960, 1920, 50.0, 100.0);
        assert_eq!(measure.end_tick(), 2880);

        let base = MeasureBase::Measure(measure);
        assert_eq!(base.tick(), 960);
        assert_eq!(base.x(), 50.0);
        assert!(base.as_measure().is_some());
        assert!(base.as_vertical_frame().is_none());
    }

    #[test]
    fn test_frames() {
        let vbox = MeasureBase::VBox(Frame::new(400.0, 30.0).with_gaps(2.0, 3.0));
        let hbox = MeasureBase::HBox(Frame::new(10.0, 0.0));

        assert_eq!(vbox.as_vertical_frame().map(Frame::bottom_gap), Some(3.0));
        assert!(hbox.as_vertical_frame().is_none());
        assert!(hbox.as_measure().is_none());
    }
}
