//! Spanners whose shape depends on the system layout.

use serde::Deserialize;

use crate::{identifier::Id, measure::Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpannerKind {
    Slur,
    Tie,
    Hairpin,
    Ottava,
    Trill,
    Pedal,
    Volta,
    TextLine,
    Glissando,
}

/// A spanner in the score.
///
/// `staff` is the staff of the voice the spanner belongs to. The start and
/// end staves are where its endpoint chords are displayed, which differ
/// from `staff` for cross-staff notation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Spanner {
    id: Id,
    kind: SpannerKind,
    tick: Tick,
    tick2: Tick,
    staff: usize,
    #[serde(default)]
    start_staff: Option<usize>,
    #[serde(default)]
    end_staff: Option<usize>,
    #[serde(default)]
    above: bool,
}

impl Spanner {
    pub fn new(id: impl Into<Id>, kind: SpannerKind, tick: Tick, tick2: Tick, staff: usize) -> Self {
        Self {
            id: id.into(),
            kind,
            tick,
            tick2,
            staff,
            start_staff: None,
            end_staff: None,
            above: false,
        }
    }

    /// Sets the staves the endpoint chords are displayed on
    pub fn with_endpoints(mut self, start_staff: usize, end_staff: usize) -> Self {
        self.start_staff = Some(start_staff);
        self.end_staff = Some(end_staff);
        self
    }

    pub fn with_above(mut self, above: bool) -> Self {
        self.above = above;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> SpannerKind {
        self.kind
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn tick2(&self) -> Tick {
        self.tick2
    }

    /// Staff of the spanner's own voice
    pub fn staff(&self) -> usize {
        self.staff
    }

    /// Displayed staff of the start chord, if the endpoint exists
    pub fn start_staff(&self) -> Option<usize> {
        self.start_staff
    }

    /// Displayed staff of the end chord, if the endpoint exists
    pub fn end_staff(&self) -> Option<usize> {
        self.end_staff
    }

    pub fn above(&self) -> bool {
        self.above
    }

    /// Returns true if both endpoints exist and one of them is displayed on
    /// a staff other than the spanner's own.
    pub fn is_cross_staff(&self) -> bool {
        match (self.start_staff, self.end_staff) {
            (Some(start), Some(end)) => start != self.staff || end != self.staff,
            _ => false,
        }
    }

    /// Returns true if the spanner overlaps the tick range `[start, end)`
    pub fn overlaps(&self, start: Tick, end: Tick) -> bool {
        self.tick < end && self.tick2 >= start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_staff_detection() {
        let plain = Spanner::new("s1", SpannerKind::Slur, 0, 480, 0).with_endpoints(0, 0);
        let crossing = Spanner::new("s2", SpannerKind::Slur, 0, 480, 0).with_endpoints(0, 1);
        let dangling = Spanner::new("s3", SpannerKind::Slur, 0, 480, 0);

        assert!(!plain.is_cross_staff());
        assert!(crossing.is_cross_staff());
        assert!(!dangling.is_cross_staff());
    }

    #[test]
    fn test_overlaps() {
        let slur = Spanner::new("s", SpannerKind::Slur, 1920, 2400, 0);

        assert!(slur.overlaps(0, 1921));
        assert!(!slur.overlaps(0, 1920));
        assert!(slur.overlaps(2400, 3840));
        assert!(!slur.overlaps(2401, 3840));
    }
}
