//! Re-layout of slurs whose endpoints sit on different staves.

use log::{debug, trace};

use engrave_core::{
    geometry::Point,
    measure::{MeasureBase, Tick},
    spanner::{Spanner, SpannerKind},
};

use super::{SpannerSegment, System};
use crate::layout::LayoutContext;

impl System {
    /// Horizontal position of a tick, interpolated inside its measure.
    ///
    /// Ticks before the system map to the start of the first measure, ticks
    /// after it to the end of the last one.
    pub fn tick_to_x(&self, tick: Tick) -> f32 {
        let mut x = None;
        for measure in self.measures.iter().filter_map(MeasureBase::as_measure) {
            if tick < measure.tick() {
                return x.unwrap_or(measure.x());
            }
            if tick < measure.end_tick() {
                let ticks = (measure.end_tick() - measure.tick()) as f32;
                let fraction = (tick - measure.tick()) as f32 / ticks;
                return measure.x() + fraction * measure.width();
            }
            x = Some(measure.x() + measure.width());
        }
        x.unwrap_or(0.0)
    }

    fn tick_range(&self) -> Option<(Tick, Tick)> {
        let first = self.measures.first()?;
        let last = self.measures.last()?;
        Some((first.tick(), last.end_tick()))
    }

    /// Rebuilds the segments of the cross-staff slurs drawn in this system.
    ///
    /// Each endpoint is attached to the top edge of its staff for slurs
    /// placed above, to the bottom edge otherwise. A segment replaces any
    /// earlier segment of the same slur.
    pub fn layout_cross_staff_slurs(&mut self, ctx: &LayoutContext<'_>) {
        let Some((start_tick, end_tick)) = self.tick_range() else {
            return;
        };
        let score = ctx.score();

        for spanner in ctx.spanners() {
            if spanner.kind() != SpannerKind::Slur
                || !spanner.is_cross_staff()
                || !spanner.overlaps(start_tick, end_tick)
            {
                continue;
            }
            let (Some(start_staff), Some(end_staff)) = (spanner.start_staff(), spanner.end_staff()) else {
                continue;
            };
            if !self.is_staff_visible(score, start_staff) || !self.is_staff_visible(score, end_staff) {
                debug!(spanner:% = spanner.id(), start_staff, end_staff; "Cross-staff slur endpoint on hidden staff");
                continue;
            }

            let segment = self.slur_segment(spanner, start_staff, end_staff);
            trace!(spanner:% = spanner.id(), start:? = segment.start(), end:? = segment.end(); "Cross-staff slur laid out");
            self.spanner_segments.retain(|s| s.spanner() != spanner.id());
            self.spanner_segments.push(segment);
        }
    }

    fn slur_segment(&self, spanner: &Spanner, start_staff: usize, end_staff: usize) -> SpannerSegment {
        let edge = |staff_idx: usize| {
            let bbox = self.staves[staff_idx].bbox();
            if spanner.above() { bbox.min_y() } else { bbox.max_y() }
        };
        let start = Point::new(self.tick_to_x(spanner.tick()), edge(start_staff));
        let end = Point::new(self.tick_to_x(spanner.tick2()), edge(end_staff));
        SpannerSegment::new(spanner.id(), spanner.kind(), self.id, start_staff, end_staff).with_endpoints(start, end)
    }
}
