//! Skyline silhouettes used for collision-free staff spacing.
//!
//! Every staff in a system carries a [`Skyline`]: a north contour (the
//! topmost ink at each x) and a south contour (the lowest ink at each x).
//! Both are step functions stored as sorted, non-overlapping segments in the
//! staff's own coordinate space, with the top staff line at `y = 0`.
//!
//! The distance between two staves is the smallest vertical offset that
//! keeps the south contour of the upper staff from crossing the north
//! contour of the lower one:
//!
//! ```text
//!        upper staff  ──┐   ┌──────┐
//!                       └───┘      └───   south contour
//!                               ▲
//!                               │ min_distance
//!                               ▼
//!        lower staff  ───┐  ┌──────────   north contour
//!                        └──┘
//! ```
//!
//! In continuous (line) view only part of a skyline is rebuilt on each edit,
//! so a freshly measured distance may be too small. [`DistanceCache`] keeps
//! the largest distance seen during the current [`LayoutEpoch`]; the value
//! never shrinks until the caller advances the epoch on a full layout.

use log::trace;

use crate::geometry::Bounds;

/// One horizontal step of a skyline contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkylineSegment {
    x: f32,
    width: f32,
    y: f32,
}

impl SkylineSegment {
    fn new(x: f32, end: f32, y: f32) -> Self {
        Self {
            x,
            width: end - x,
            y,
        }
    }

    /// Left edge of the segment
    pub fn x(self) -> f32 {
        self.x
    }

    /// Horizontal extent of the segment
    pub fn width(self) -> f32 {
        self.width
    }

    /// Right edge of the segment
    pub fn end(self) -> f32 {
        self.x + self.width
    }

    /// Contour height over this segment
    pub fn y(self) -> f32 {
        self.y
    }
}

/// A single contour of a [`Skyline`].
///
/// A north line keeps the smallest `y` over every x interval, a south line
/// keeps the largest.
#[derive(Debug, Clone, PartialEq)]
pub struct SkylineLine {
    north: bool,
    segments: Vec<SkylineSegment>,
}

impl SkylineLine {
    /// Creates an empty upper contour
    pub fn new_north() -> Self {
        Self {
            north: true,
            segments: Vec::new(),
        }
    }

    /// Creates an empty lower contour
    pub fn new_south() -> Self {
        Self {
            north: false,
            segments: Vec::new(),
        }
    }

    pub fn is_north(&self) -> bool {
        self.north
    }

    /// Returns true if any shape has been merged into this line
    pub fn is_valid(&self) -> bool {
        !self.segments.is_empty()
    }

    pub fn segments(&self) -> &[SkylineSegment] {
        &self.segments
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Returns the outermost contour value: the topmost `y` of a north line
    /// or the lowest `y` of a south line. `None` for an empty line.
    pub fn extreme(&self) -> Option<f32> {
        let values = self.segments.iter().map(|s| s.y);
        if self.north {
            values.reduce(f32::min)
        } else {
            values.reduce(f32::max)
        }
    }

    /// Merges a shape into the contour.
    ///
    /// Shapes without horizontal extent are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use engrave_core::{geometry::Bounds, skyline::SkylineLine};
    /// let mut south = SkylineLine::new_south();
    /// south.add(Bounds::from_rect(0.0, 0.0, 100.0, 4.0));
    /// south.add(Bounds::from_rect(20.0, 2.0, 10.0, 5.0));
    ///
    /// assert_eq!(south.extreme(), Some(7.0));
    /// assert_eq!(south.segments().len(), 3);
    /// ```
    pub fn add(&mut self, bounds: Bounds) {
        if bounds.width() <= 0.0 {
            return;
        }
        let y = if self.north {
            bounds.min_y()
        } else {
            bounds.max_y()
        };
        self.insert(bounds.min_x(), bounds.max_x(), y);
    }

    fn outermost(&self, a: f32, b: f32) -> f32 {
        if self.north { a.min(b) } else { a.max(b) }
    }

    fn insert(&mut self, start: f32, end: f32, y: f32) {
        let mut merged = Vec::with_capacity(self.segments.len() + 3);
        // Next x inside [start, end) that no existing segment covers yet.
        let mut cursor = start;

        for &segment in &self.segments {
            if segment.end() <= start {
                merged.push(segment);
                continue;
            }
            if segment.x >= end {
                if cursor < end {
                    merged.push(SkylineSegment::new(cursor, end, y));
                    cursor = end;
                }
                merged.push(segment);
                continue;
            }

            if segment.x < start {
                merged.push(SkylineSegment::new(segment.x, start, segment.y));
            }
            let overlap_start = segment.x.max(start);
            let overlap_end = segment.end().min(end);
            if overlap_start > cursor {
                merged.push(SkylineSegment::new(cursor, overlap_start, y));
            }
            merged.push(SkylineSegment::new(
                overlap_start,
                overlap_end,
                self.outermost(segment.y, y),
            ));
            cursor = overlap_end;
            if segment.end() > end {
                merged.push(SkylineSegment::new(end, segment.end(), segment.y));
            }
        }
        if cursor < end {
            merged.push(SkylineSegment::new(cursor, end, y));
        }

        // Join neighbours that ended up at the same height.
        let mut compact: Vec<SkylineSegment> = Vec::with_capacity(merged.len());
        for segment in merged.into_iter().filter(|s| s.width > 0.0) {
            match compact.last_mut() {
                Some(last) if last.y == segment.y && last.end() == segment.x => {
                    last.width += segment.width;
                }
                _ => compact.push(segment),
            }
        }
        self.segments = compact;
    }

    /// Minimum vertical offset between this south line and a north line.
    ///
    /// `self` is the south contour of the upper staff and `north` the north
    /// contour of the lower staff, both in their own staff coordinates. The
    /// result is the smallest distance between the two staff origins at which
    /// no horizontally overlapping segments collide. Returns `None` when the
    /// contours never overlap horizontally, meaning the pair is unconstrained.
    pub fn min_distance(&self, north: &SkylineLine) -> Option<f32> {
        debug_assert!(!self.north && north.north);

        let mut distance: Option<f32> = None;
        let (mut i, mut j) = (0, 0);
        while i < self.segments.len() && j < north.segments.len() {
            let lower = self.segments[i];
            let upper = north.segments[j];
            if lower.x < upper.end() && upper.x < lower.end() {
                let d = lower.y - upper.y;
                distance = Some(distance.map_or(d, |current| current.max(d)));
            }
            if lower.end() < upper.end() {
                i += 1;
            } else {
                j += 1;
            }
        }
        distance
    }
}

/// North and south silhouettes of one staff.
#[derive(Debug, Clone, PartialEq)]
pub struct Skyline {
    north: SkylineLine,
    south: SkylineLine,
}

impl Default for Skyline {
    fn default() -> Self {
        Self::new()
    }
}

impl Skyline {
    pub fn new() -> Self {
        Self {
            north: SkylineLine::new_north(),
            south: SkylineLine::new_south(),
        }
    }

    /// Merges a shape into both contours
    pub fn add(&mut self, bounds: Bounds) {
        self.north.add(bounds);
        self.south.add(bounds);
    }

    pub fn clear(&mut self) {
        self.north.clear();
        self.south.clear();
    }

    pub fn north(&self) -> &SkylineLine {
        &self.north
    }

    pub fn south(&self) -> &SkylineLine {
        &self.south
    }

    /// Minimum distance between this skyline (upper staff) and `below`
    /// (lower staff). See [`SkylineLine::min_distance`].
    pub fn min_distance(&self, below: &Skyline) -> Option<f32> {
        self.south.min_distance(&below.north)
    }
}

/// Generation counter for full layouts.
///
/// The caller advances the epoch whenever a full layout is triggered (for
/// example when switching from continuous view back to page view). Cached
/// continuous-view distances from older epochs are discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutEpoch(u64);

impl LayoutEpoch {
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// Starts a new generation
    pub fn advance(&mut self) {
        self.0 += 1;
    }

    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Continuous-view distance cache of one staff pair.
///
/// Within one epoch the stored distance only ever grows.
///
/// # Examples
///
/// ```
/// # use engrave_core::skyline::{DistanceCache, LayoutEpoch};
/// let mut epoch = LayoutEpoch::default();
/// let mut cache = DistanceCache::default();
///
/// assert_eq!(cache.merge(epoch, 12.0), 12.0);
/// assert_eq!(cache.merge(epoch, 9.0), 12.0);
///
/// epoch.advance();
/// assert_eq!(cache.merge(epoch, 9.0), 9.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceCache {
    entry: Option<(LayoutEpoch, f32)>,
}

impl DistanceCache {
    /// Merges a measured distance and returns the distance to use.
    pub fn merge(&mut self, epoch: LayoutEpoch, distance: f32) -> f32 {
        let value = match self.entry {
            Some((cached_epoch, cached)) if cached_epoch == epoch => cached.max(distance),
            _ => {
                trace!(generation = epoch.generation(), distance; "Distance cache reset");
                distance
            }
        };
        self.entry = Some((epoch, value));
        value
    }

    /// Cached distance of the given epoch, if any
    pub fn get(&self, epoch: LayoutEpoch) -> Option<f32> {
        self.entry
            .filter(|(cached_epoch, _)| *cached_epoch == epoch)
            .map(|(_, value)| value)
    }

    pub fn reset(&mut self) {
        self.entry = None;
    }
}
