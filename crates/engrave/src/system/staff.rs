use engrave_core::{
    geometry::Bounds,
    skyline::{DistanceCache, Skyline},
};

use super::element::InstrumentName;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SavedLayout {
    y: f32,
    height: f32,
}

/// Geometry of one score staff inside one system.
///
/// The box is in system coordinates. For staves with more than one line its
/// top edge is the top staff line; one-line staves are centered on their
/// line and `y_off` records the distance from the box top to the line.
#[derive(Debug, Clone, PartialEq)]
pub struct SysStaff {
    bbox: Bounds,
    skyline: Skyline,
    show: bool,
    y_off: f32,
    saved: Option<SavedLayout>,
    continuous_dist: DistanceCache,
    instrument_names: Vec<InstrumentName>,
}

impl Default for SysStaff {
    fn default() -> Self {
        Self::new()
    }
}

impl SysStaff {
    pub fn new() -> Self {
        Self {
            bbox: Bounds::default(),
            skyline: Skyline::new(),
            show: true,
            y_off: 0.0,
            saved: None,
            continuous_dist: DistanceCache::default(),
            instrument_names: Vec::new(),
        }
    }

    pub fn bbox(&self) -> Bounds {
        self.bbox
    }

    pub fn set_bbox(&mut self, bbox: Bounds) {
        self.bbox = bbox;
    }

    /// Position of the staff's first line
    pub fn y(&self) -> f32 {
        self.bbox.min_y() + self.y_off
    }

    pub fn y_off(&self) -> f32 {
        self.y_off
    }

    pub(crate) fn set_y_off(&mut self, y_off: f32) {
        self.y_off = y_off;
    }

    /// Visibility of the staff in this system
    pub fn show(&self) -> bool {
        self.show
    }

    pub fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    pub fn skyline(&self) -> &Skyline {
        &self.skyline
    }

    pub fn skyline_mut(&mut self) -> &mut Skyline {
        &mut self.skyline
    }

    /// Continuous-view distance to the next visible staff
    pub fn continuous_dist(&self) -> &DistanceCache {
        &self.continuous_dist
    }

    pub(crate) fn continuous_dist_mut(&mut self) -> &mut DistanceCache {
        &mut self.continuous_dist
    }

    pub fn instrument_names(&self) -> &[InstrumentName] {
        &self.instrument_names
    }

    pub(crate) fn instrument_names_mut(&mut self) -> &mut Vec<InstrumentName> {
        &mut self.instrument_names
    }

    /// Records the current vertical placement for [`SysStaff::restore_layout`]
    pub fn save_layout(&mut self) {
        self.saved = Some(SavedLayout {
            y: self.y(),
            height: self.bbox.height(),
        });
    }

    pub fn has_saved_layout(&self) -> bool {
        self.saved.is_some()
    }

    /// Moves the box back to the saved placement.
    ///
    /// Returns false if no layout was saved.
    pub fn restore_layout(&mut self) -> bool {
        let Some(saved) = self.saved else {
            return false;
        };
        self.bbox = self
            .bbox
            .with_y(saved.y - self.y_off)
            .with_height(saved.height);
        true
    }

    pub fn clear_saved_layout(&mut self) {
        self.saved = None;
    }
}
