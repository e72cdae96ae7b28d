//! Minimum distances between consecutive systems.

use log::{debug, trace};

use engrave_core::{
    measure::{Measure, MeasureBase, Spacer, SpacerPlacement},
    skyline::SkylineLine,
};

use super::System;
use crate::layout::LayoutContext;

impl System {
    fn staff_measures(&self) -> impl Iterator<Item = &Measure> {
        self.measures.iter().filter_map(MeasureBase::as_measure)
    }

    /// Minimum distance from the bottom of this system to the top of
    /// `below`.
    ///
    /// Vertical frames contribute their gaps. Between two staff systems the
    /// style minimum is raised by the user distance of the first staff
    /// shown in `below`, by spacers and by the skylines of the facing
    /// staves. A fixed spacer below the last staff of this system wins
    /// outright.
    pub fn min_distance(&self, below: &System, ctx: &LayoutContext<'_>) -> f32 {
        match (self.vbox(), below.vbox()) {
            (Some(upper), None) => return upper.bottom_gap().max(below.min_top()),
            (None, Some(lower)) => return lower.top_gap().max(self.min_bottom()),
            (Some(upper), Some(lower)) => return lower.top_gap() + upper.bottom_gap(),
            (None, None) => {}
        }

        let score = ctx.score();
        let style = ctx.style();
        let nstaves = score.nstaves();
        let shown = |i: usize| score.staff(i).is_some_and(|s| s.show());
        let first_staff =
            (0..nstaves).find(|&i| shown(i) && below.staves.get(i).is_some_and(|s| s.show()));
        let last_staff = (0..nstaves)
            .rev()
            .find(|&i| shown(i) && self.staves.get(i).is_some_and(|s| s.show()));

        let mut dist = style.min_system_distance();
        if let Some(staff) = first_staff.and_then(|i| score.staff(i)) {
            dist = dist.max(staff.user_dist() * style.spatium());
        }

        let Some(last_staff) = last_staff else {
            debug!(system:? = self.id; "No visible staff above system boundary");
            return dist;
        };

        for measure in self.staff_measures() {
            if let Some(spacer) = measure.vspacer_down(last_staff) {
                if spacer.is_fixed() {
                    trace!(staff_idx = last_staff, gap = spacer.gap(); "Fixed spacer sets system distance");
                    return spacer.gap();
                }
                dist = dist.max(spacer.gap());
            }
        }

        let Some(first_staff) = first_staff else {
            return dist;
        };
        for measure in below.staff_measures() {
            if let Some(spacer) = measure.vspacer_up(first_staff) {
                dist = dist.max(spacer.gap());
            }
        }

        let upper = &self.staves[last_staff];
        let lower = &below.staves[first_staff];
        if let Some(clearance) = upper.skyline().min_distance(lower.skyline()) {
            dist = dist.max(clearance - upper.bbox().height() + style.min_vertical_distance());
        }
        dist
    }

    /// Space the content above the first visible staff reaches up
    pub fn min_top(&self) -> f32 {
        self.first_visible_sys_staff()
            .and_then(|i| self.staves[i].skyline().north().extreme())
            .map_or(0.0, |top| -top)
    }

    /// Space the content below the last visible staff reaches down, or the
    /// bottom gap of a vertical frame
    pub fn min_bottom(&self) -> f32 {
        if let Some(frame) = self.vbox() {
            return frame.bottom_gap();
        }
        self.last_visible_sys_staff()
            .and_then(|i| {
                let staff = &self.staves[i];
                staff
                    .skyline()
                    .south()
                    .extreme()
                    .map(|bottom| bottom - staff.bbox().height())
            })
            .unwrap_or(0.0)
    }

    /// Gap requested by the spacers above the first (`Up`) or below the
    /// last (`Down`) visible staff.
    ///
    /// A fixed spacer ends the search; otherwise the largest gap is used.
    pub fn spacer_distance(&self, placement: SpacerPlacement) -> f32 {
        let staff_idx = match placement {
            SpacerPlacement::Up => self.first_visible_sys_staff(),
            SpacerPlacement::Down => self.last_visible_sys_staff(),
        };
        let Some(staff_idx) = staff_idx else {
            return 0.0;
        };

        let mut dist = 0.0f32;
        for measure in self.staff_measures() {
            let spacer = match placement {
                SpacerPlacement::Up => measure.vspacer_up(staff_idx),
                SpacerPlacement::Down => measure.vspacer_down(staff_idx),
            };
            if let Some(spacer) = spacer {
                if spacer.is_fixed() {
                    return spacer.gap();
                }
                dist = dist.max(spacer.gap());
            }
        }
        dist
    }

    /// The spacer that rules the space above a staff.
    ///
    /// A fixed spacer below the staff above (`prev_down`) takes precedence;
    /// otherwise the largest up spacer of the system is returned, unless a
    /// fixed one was met first.
    pub fn up_spacer(&self, staff_idx: usize, prev_down: Option<Spacer>) -> Option<Spacer> {
        if let Some(prev) = prev_down.filter(Spacer::is_fixed) {
            return Some(prev);
        }
        let mut found: Option<Spacer> = None;
        for spacer in self.staff_measures().filter_map(|m| m.vspacer_up(staff_idx)) {
            match found {
                Some(current) if current.is_fixed() || current.gap() >= spacer.gap() => {}
                _ => found = Some(*spacer),
            }
        }
        found
    }

    /// The spacer that rules the space below a staff: the first fixed one,
    /// else the largest
    pub fn down_spacer(&self, staff_idx: usize) -> Option<Spacer> {
        let mut found: Option<Spacer> = None;
        for spacer in self.staff_measures().filter_map(|m| m.vspacer_down(staff_idx)) {
            if spacer.is_fixed() {
                return Some(*spacer);
            }
            if found.is_none_or(|current| current.gap() < spacer.gap()) {
                found = Some(*spacer);
            }
        }
        found
    }

    /// Clearance between a south contour above the system and the north
    /// contour of one of its staves.
    ///
    /// Continuous view only measures against the system above, so this is
    /// 0 there; it is 0 as well when the contours do not overlap.
    pub fn top_distance(&self, ctx: &LayoutContext<'_>, staff_idx: usize, south: &SkylineLine) -> f32 {
        if ctx.line_mode() {
            return 0.0;
        }
        self.staves
            .get(staff_idx)
            .and_then(|staff| south.min_distance(staff.skyline().north()))
            .unwrap_or(0.0)
    }

    /// Clearance between the south contour of one of the staves and a
    /// north contour below the system. 0 in continuous view.
    pub fn bottom_distance(&self, ctx: &LayoutContext<'_>, staff_idx: usize, north: &SkylineLine) -> f32 {
        if ctx.line_mode() {
            return 0.0;
        }
        self.staves
            .get(staff_idx)
            .and_then(|staff| staff.skyline().south().min_distance(north))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use engrave_core::{
        geometry::Bounds,
        measure::{Frame, SpacerKind},
        score::{Part, Score, Staff},
        skyline::LayoutEpoch,
        style::StyleContext,
    };
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::arena::SystemId;

    fn score() -> Score {
        Score::new(vec![
            Part::new("violin", vec![Staff::new(5)]),
            Part::new("cello", vec![Staff::new(5).with_user_dist(12.0)]),
        ])
        .unwrap()
    }

    fn style() -> StyleContext {
        StyleContext::default()
            .with_spatium(1.0)
            .with_min_system_distance(8.0)
            .with_min_vertical_distance(0.5)
    }

    fn system(id: usize, measures: Vec<Measure>) -> System {
        let mut system = System::new(SystemId::new(id), 2);
        system.staves[0].set_bbox(Bounds::from_rect(0.0, 0.0, 100.0, 4.0));
        system.staves[1].set_bbox(Bounds::from_rect(0.0, 14.0, 100.0, 4.0));
        for measure in measures {
            system.append_measure(MeasureBase::Measure(measure));
        }
        system
    }

    fn spacer(staff: usize, placement: SpacerPlacement, kind: SpacerKind, gap: f32) -> Spacer {
        Spacer::new(staff, placement, kind, gap)
    }

    #[test]
    fn test_frame_distances() {
        let (score, style) = (score(), style());
        let ctx = LayoutContext::new(&score, &style);
        let mut frame_system = System::new(SystemId::new(0), 0);
        frame_system.append_measure(MeasureBase::VBox(Frame::new(100.0, 30.0).with_gaps(3.0, 7.0)));
        let mut staves = system(1, vec![]);
        staves.staves[0].skyline_mut().add(Bounds::from_rect(0.0, -9.0, 10.0, 9.0));

        assert_approx_eq!(f32, staves.min_top(), 9.0);
        assert_approx_eq!(f32, frame_system.min_distance(&staves, &ctx), 9.0);
        assert_approx_eq!(f32, staves.min_distance(&frame_system, &ctx), 3.0);
        assert_approx_eq!(f32, frame_system.min_distance(&frame_system, &ctx), 10.0);
        assert_approx_eq!(f32, frame_system.min_bottom(), 7.0);
    }

    #[test]
    fn test_user_distance_and_skyline() {
        let (score, style) = (score(), style());
        let ctx = LayoutContext::new(&score, &style);
        let mut upper = system(0, vec![]);
        let mut lower = system(1, vec![]);

        // Both staves are shown in the lower system: its first staff is the
        // violin, which has no user distance.
        assert_approx_eq!(f32, upper.min_distance(&lower, &ctx), 8.0);

        lower.staves[0].set_show(false);
        assert_approx_eq!(f32, upper.min_distance(&lower, &ctx), 12.0);

        // Content hanging 20 below the cello's top line, 6 above the next.
        upper.staves[1]
            .skyline_mut()
            .add(Bounds::from_rect(0.0, 0.0, 50.0, 20.0));
        lower.staves[1]
            .skyline_mut()
            .add(Bounds::from_rect(10.0, -6.0, 10.0, 6.0));
        assert_approx_eq!(f32, upper.min_distance(&lower, &ctx), 26.0 - 4.0 + 0.5);
    }

    #[test]
    fn test_spacers_between_systems() {
        let (score, style) = (score(), style());
        let ctx = LayoutContext::new(&score, &style);
        let minimum_down = Measure::new(0, 1920, 0.0, 100.0)
            .with_spacer(spacer(1, SpacerPlacement::Down, SpacerKind::Minimum, 15.0));
        let up = Measure::new(1920, 1920, 0.0, 100.0)
            .with_spacer(spacer(0, SpacerPlacement::Up, SpacerKind::Minimum, 18.0));

        let upper = system(0, vec![minimum_down.clone()]);
        let lower = system(1, vec![up]);
        assert_approx_eq!(f32, upper.min_distance(&lower, &ctx), 18.0);

        let fixed = Measure::new(960, 960, 0.0, 100.0)
            .with_spacer(spacer(1, SpacerPlacement::Down, SpacerKind::Fixed, 5.0));
        let upper = system(0, vec![minimum_down, fixed]);
        assert_approx_eq!(f32, upper.min_distance(&lower, &ctx), 5.0);
    }

    #[test]
    fn test_min_bottom_and_top_without_content() {
        let upper = system(0, vec![]);
        assert_approx_eq!(f32, upper.min_top(), 0.0);
        assert_approx_eq!(f32, upper.min_bottom(), 0.0);

        let mut upper = upper;
        upper.staves[1]
            .skyline_mut()
            .add(Bounds::from_rect(0.0, 0.0, 50.0, 11.0));
        assert_approx_eq!(f32, upper.min_bottom(), 7.0);
    }

    #[test]
    fn test_spacer_distance() {
        let measures = vec![
            Measure::new(0, 1920, 0.0, 100.0)
                .with_spacer(spacer(0, SpacerPlacement::Up, SpacerKind::Minimum, 4.0))
                .with_spacer(spacer(1, SpacerPlacement::Down, SpacerKind::Minimum, 9.0)),
            Measure::new(1920, 1920, 100.0, 100.0)
                .with_spacer(spacer(0, SpacerPlacement::Up, SpacerKind::Minimum, 6.0))
                .with_spacer(spacer(1, SpacerPlacement::Down, SpacerKind::Fixed, 2.0)),
        ];
        let mut system = system(0, measures);

        assert_approx_eq!(f32, system.spacer_distance(SpacerPlacement::Up), 6.0);
        assert_approx_eq!(f32, system.spacer_distance(SpacerPlacement::Down), 2.0);

        system.staves[1].set_show(false);
        assert_approx_eq!(f32, system.spacer_distance(SpacerPlacement::Down), 0.0);
    }

    #[test]
    fn test_up_and_down_spacer() {
        let measures = vec![
            Measure::new(0, 1920, 0.0, 100.0)
                .with_spacer(spacer(1, SpacerPlacement::Up, SpacerKind::Minimum, 4.0))
                .with_spacer(spacer(0, SpacerPlacement::Down, SpacerKind::Minimum, 3.0)),
            Measure::new(1920, 1920, 100.0, 100.0)
                .with_spacer(spacer(1, SpacerPlacement::Up, SpacerKind::Minimum, 8.0))
                .with_spacer(spacer(0, SpacerPlacement::Down, SpacerKind::Minimum, 7.0)),
        ];
        let system = system(0, measures);

        assert_eq!(system.up_spacer(1, None).map(|s| s.gap()), Some(8.0));
        let fixed = spacer(0, SpacerPlacement::Down, SpacerKind::Fixed, 1.0);
        assert_eq!(system.up_spacer(1, Some(fixed)), Some(fixed));
        assert_eq!(system.down_spacer(0).map(|s| s.gap()), Some(7.0));
        assert_eq!(system.down_spacer(1), None);
    }

    #[test]
    fn test_top_and_bottom_distance() {
        let (score, style) = (score(), style());
        let mut system = system(0, vec![]);
        system.staves[0]
            .skyline_mut()
            .add(Bounds::from_rect(0.0, -3.0, 20.0, 3.0));
        system.staves[1]
            .skyline_mut()
            .add(Bounds::from_rect(0.0, 0.0, 20.0, 9.0));
        let mut above = SkylineLine::new_south();
        above.add(Bounds::from_rect(5.0, 0.0, 5.0, 2.0));
        let mut below = SkylineLine::new_north();
        below.add(Bounds::from_rect(5.0, -1.0, 5.0, 1.0));

        let ctx = LayoutContext::new(&score, &style);
        assert_approx_eq!(f32, system.top_distance(&ctx, 0, &above), 5.0);
        assert_approx_eq!(f32, system.bottom_distance(&ctx, 1, &below), 10.0);

        let line = ctx.with_line_mode(true, LayoutEpoch::default());
        assert_approx_eq!(f32, system.top_distance(&line, 0, &above), 0.0);
        assert_approx_eq!(f32, system.bottom_distance(&line, 1, &below), 0.0);
    }
}
