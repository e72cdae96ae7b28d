//! Vertical stacking of the staves of a system.

use log::{debug, trace};

use engrave_core::{
    geometry::Bounds,
    measure::{MeasureBase, Spacer},
};

use super::System;
use crate::layout::LayoutContext;

impl System {
    /// Vertical pass.
    ///
    /// Stacks the visible staves top to bottom. The distance from one staff
    /// to the next is the larger of the style distance, the minimum spacers
    /// and the skyline clearance; a fixed spacer replaces all of them. The
    /// placement of every staff is saved for [`System::restore_layout2`].
    ///
    /// Brackets, instrument names and cross-staff slurs are laid out
    /// against the final staff boxes afterwards.
    pub fn layout2(&mut self, ctx: &LayoutContext<'_>) {
        let frame_box = self
            .vbox()
            .map(|frame| Bounds::from_rect(0.0, 0.0, frame.width(), frame.height()));
        if let Some(bbox) = frame_box {
            if let Some(segment) = self.measures.first_mut() {
                segment.set_bounds(bbox);
            }
            self.bbox = bbox;
            trace!(system:? = self.id, height = bbox.height(); "Frame system laid out");
            return;
        }
        if self.measures.is_empty() {
            debug!(system:? = self.id; "System without measures skipped by vertical pass");
            return;
        }

        let score = ctx.score();
        let style = ctx.style();
        let spatium = ctx.spatium();
        let staff_distance = style.staff_distance();
        let akkolade_distance = style.akkolade_distance();
        let min_vertical_distance = style.min_vertical_distance();

        let mut visible = Vec::with_capacity(self.staves.len());
        for staff_idx in 0..self.staves.len() {
            if self.is_staff_visible(score, staff_idx) {
                visible.push(staff_idx);
            } else {
                let staff = &mut self.staves[staff_idx];
                staff.set_bbox(Bounds::default());
                staff.set_y_off(0.0);
                staff.save_layout();
            }
        }

        let Some(&last_visible) = visible.last() else {
            debug!(system:? = self.id; "No visible staves, system collapsed");
            self.system_height = Some(0.0);
            self.set_height(0.0);
            self.set_measure_height(0.0, spatium);
            return;
        };

        let x = self.left_margin;
        let width = self.width() - self.left_margin;
        let mut y = 0.0f32;
        for (pos, &staff_idx) in visible.iter().enumerate() {
            let Some(staff) = score.staff(staff_idx) else {
                continue;
            };
            let (y_off, height) = if staff.lines() == 1 {
                (style.single_line_y_offset(), style.single_line_height())
            } else {
                (0.0, staff.height(spatium))
            };
            let sys_staff = &mut self.staves[staff_idx];
            sys_staff.set_y_off(y_off);
            sys_staff.set_bbox(Bounds::from_rect(x, y - y_off, width, height));
            sys_staff.save_layout();

            let Some(&next_idx) = visible.get(pos + 1) else {
                break;
            };
            let Some(next) = score.staff(next_idx) else {
                break;
            };

            let staff_height = staff.height(spatium);
            let mut dist = staff_height
                + if score.same_part(staff_idx, next_idx) {
                    akkolade_distance * staff.mag()
                } else {
                    staff_distance
                }
                + next.user_dist() * spatium;

            match self.fixed_gap(staff_idx, next_idx) {
                Some(spacer) => {
                    trace!(staff_idx, next_idx, gap = spacer.gap(); "Fixed spacer between staves");
                    dist = staff_height + spacer.gap();
                }
                None => {
                    for spacer in self.minimum_gaps(staff_idx, next_idx) {
                        dist = dist.max(staff_height + spacer.gap());
                    }
                    if let Some(clearance) = self.skyline_clearance(ctx, staff_idx, next_idx) {
                        dist = dist.max(clearance + min_vertical_distance);
                    }
                }
            }
            trace!(staff_idx, next_idx, dist; "Staff distance");
            y += dist;
        }

        let system_height = self.staves[last_visible].bbox().max_y();
        self.system_height = Some(system_height);
        self.set_height(system_height);
        self.set_measure_height(system_height, spatium);
        debug!(system:? = self.id, nvisible = visible.len(), system_height; "System stacked");

        self.layout_brackets_vertical(ctx);
        self.layout_instrument_names(ctx);
        self.layout_cross_staff_slurs(ctx);
    }

    /// First fixed spacer below `upper` or above `lower`, in measure order
    fn fixed_gap(&self, upper: usize, lower: usize) -> Option<Spacer> {
        self.measures
            .iter()
            .filter_map(MeasureBase::as_measure)
            .flat_map(|m| [m.vspacer_down(upper), m.vspacer_up(lower)])
            .flatten()
            .find(|s| s.is_fixed())
            .copied()
    }

    fn minimum_gaps(&self, upper: usize, lower: usize) -> impl Iterator<Item = &Spacer> {
        self.measures
            .iter()
            .filter_map(MeasureBase::as_measure)
            .flat_map(move |m| [m.vspacer_down(upper), m.vspacer_up(lower)])
            .flatten()
    }

    /// Skyline distance between two staves. In continuous view the result
    /// is merged into the upper staff's cache and never shrinks within a
    /// layout epoch.
    fn skyline_clearance(&mut self, ctx: &LayoutContext<'_>, upper: usize, lower: usize) -> Option<f32> {
        let measured = self.staves[upper]
            .skyline()
            .min_distance(self.staves[lower].skyline());
        if !ctx.line_mode() {
            return measured;
        }
        let cache = self.staves[upper].continuous_dist_mut();
        match measured {
            Some(distance) => Some(cache.merge(ctx.epoch(), distance)),
            None => cache.get(ctx.epoch()),
        }
    }

    /// Restores the staff placement saved by the last [`System::layout2`].
    ///
    /// Only valid while nothing that affects the vertical layout changed.
    /// Returns false if there is no complete saved layout, in which case a
    /// full vertical pass is needed. Frame systems have nothing to restore.
    pub fn restore_layout2(&mut self, ctx: &LayoutContext<'_>) -> bool {
        if self.vbox().is_some() {
            return true;
        }
        let Some(system_height) = self.system_height else {
            return false;
        };
        if !self.staves.iter().all(|s| s.has_saved_layout()) {
            debug!(system:? = self.id; "Incomplete saved layout");
            return false;
        }
        for staff in &mut self.staves {
            staff.restore_layout();
        }
        self.set_height(system_height);
        self.set_measure_height(system_height, ctx.spatium());
        true
    }

    /// Drops the saved layout; the next [`System::restore_layout2`] fails
    pub fn invalidate_saved_layout(&mut self) {
        for staff in &mut self.staves {
            staff.clear_saved_layout();
        }
        self.system_height = None;
    }

    /// Stretches every measure over the system height.
    ///
    /// Measures extend one space above and below the staves, horizontal
    /// frames cover the staves exactly. Vertical and text frames keep their
    /// own box.
    pub fn set_measure_height(&mut self, height: f32, spatium: f32) {
        for segment in &mut self.measures {
            let bbox = match segment {
                MeasureBase::Measure(measure) => {
                    Bounds::from_rect(0.0, -spatium, measure.width(), height + 2.0 * spatium)
                }
                MeasureBase::HBox(frame) => Bounds::from_rect(0.0, 0.0, frame.width(), height),
                MeasureBase::VBox(_) | MeasureBase::TBox(_) => continue,
            };
            segment.set_bounds(bbox);
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use engrave_core::{
        measure::{Measure, SpacerKind, SpacerPlacement},
        score::{Part, Score, Staff},
        style::StyleContext,
    };
    use proptest::prelude::*;

    use super::*;
    use crate::arena::SystemId;

    #[derive(Debug, Clone)]
    struct StaffInput {
        lines: u32,
        new_part: bool,
        shown: bool,
        shapes: Vec<Bounds>,
        user_dist: f32,
        spacer: Option<Spacer>,
    }

    fn staff_strategy() -> impl Strategy<Value = StaffInput> {
        let shape = (0.0f32..150.0, -15.0f32..10.0, 1.0f32..40.0, 0.5f32..25.0)
            .prop_map(|(x, y, w, h)| Bounds::from_rect(x, y, w, h));
        // Staff index is filled in by `build`.
        let spacer = (
            prop_oneof![Just(SpacerPlacement::Up), Just(SpacerPlacement::Down)],
            prop_oneof![Just(SpacerKind::Minimum), Just(SpacerKind::Fixed)],
            0.5f32..30.0,
        )
            .prop_map(|(placement, kind, gap)| Spacer::new(0, placement, kind, gap));
        (
            prop_oneof![Just(1u32), Just(5u32)],
            any::<bool>(),
            prop::bool::weighted(0.8),
            prop::collection::vec(shape, 0..6),
            prop_oneof![Just(0.0f32), 0.0f32..5.0],
            prop::option::of(spacer),
        )
            .prop_map(|(lines, new_part, shown, shapes, user_dist, spacer)| StaffInput {
                lines,
                new_part,
                shown,
                shapes,
                user_dist,
                spacer,
            })
    }

    fn build(inputs: &[StaffInput]) -> (Score, System) {
        let mut parts: Vec<Vec<Staff>> = Vec::new();
        for (i, input) in inputs.iter().enumerate() {
            let staff = Staff::new(input.lines).with_user_dist(input.user_dist);
            match parts.last_mut() {
                Some(part) if i > 0 && !input.new_part => part.push(staff),
                _ => parts.push(vec![staff]),
            }
        }
        let parts = parts
            .into_iter()
            .enumerate()
            .map(|(i, staves)| Part::new(format!("part{i}").as_str(), staves))
            .collect();
        let score = Score::new(parts).expect("generated score is valid");

        let mut measure = Measure::new(0, 1920, 0.0, 200.0);
        for (i, input) in inputs.iter().enumerate() {
            if let Some(spacer) = input.spacer {
                measure = measure.with_spacer(Spacer::new(i, spacer.placement(), spacer.kind(), spacer.gap()));
            }
        }
        let mut system = System::new(SystemId::new(0), inputs.len());
        system.set_width(200.0);
        system.append_measure(MeasureBase::Measure(measure));
        for (i, input) in inputs.iter().enumerate() {
            let staff = system.staff_mut(i).expect("staff exists");
            staff.set_show(input.shown);
            for shape in &input.shapes {
                staff.skyline_mut().add(*shape);
            }
        }
        (score, system)
    }

    /// Spacers acting between two staves: below the upper, then above the lower
    fn pair_spacers(inputs: &[StaffInput], upper: usize, lower: usize) -> Vec<Spacer> {
        let down = inputs[upper]
            .spacer
            .filter(|s| s.placement() == SpacerPlacement::Down);
        let up = inputs[lower]
            .spacer
            .filter(|s| s.placement() == SpacerPlacement::Up);
        down.into_iter().chain(up).collect()
    }

    /// A fixed spacer sets the distance between two adjacent visible staves
    /// exactly. Otherwise they are at least as far apart as the style
    /// distance, the spacers and the skylines require.
    fn check_realized_distance_meets_requirements(inputs: Vec<StaffInput>) -> Result<(), TestCaseError> {
        let style = StyleContext::default().with_spatium(1.0);
        let (score, mut system) = build(&inputs);
        let ctx = LayoutContext::new(&score, &style);

        system.layout2(&ctx);

        let visible: Vec<usize> = (0..inputs.len()).filter(|&i| inputs[i].shown).collect();
        for pair in visible.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            let realized = system.staff(lower).unwrap().y() - system.staff(upper).unwrap().y();
            let height = score.staff(upper).unwrap().height(1.0);
            let base = if score.same_part(upper, lower) {
                style.akkolade_distance()
            } else {
                style.staff_distance()
            };
            let spacers = pair_spacers(&inputs, upper, lower);
            if let Some(fixed) = spacers.iter().find(|s| s.is_fixed()) {
                prop_assert!((realized - (height + fixed.gap())).abs() < 0.001);
                continue;
            }
            prop_assert!(realized >= height + base + inputs[lower].user_dist - 0.001);
            for spacer in &spacers {
                prop_assert!(realized >= height + spacer.gap() - 0.001);
            }
            let upper_skyline = system.staff(upper).unwrap().skyline();
            if let Some(clearance) = upper_skyline.min_distance(system.staff(lower).unwrap().skyline()) {
                prop_assert!(realized >= clearance + style.min_vertical_distance() - 0.001);
            }
        }
        if let Some(&last) = visible.last() {
            prop_assert!((system.height() - system.staff(last).unwrap().bbox().max_y()).abs() < 0.001);
        }
        Ok(())
    }

    /// Staves are placed strictly top to bottom in index order.
    fn check_staves_are_ordered(inputs: Vec<StaffInput>) -> Result<(), TestCaseError> {
        let style = StyleContext::default().with_spatium(1.0);
        let (score, mut system) = build(&inputs);
        let ctx = LayoutContext::new(&score, &style);

        system.layout2(&ctx);

        let ys: Vec<f32> = (0..inputs.len())
            .filter(|&i| inputs[i].shown)
            .map(|i| system.staff(i).unwrap().y())
            .collect();
        prop_assert!(ys.windows(2).all(|w| w[0] < w[1]));
        Ok(())
    }

    proptest! {
        #[test]
        fn realized_distance_meets_requirements(inputs in prop::collection::vec(staff_strategy(), 1..8)) {
            check_realized_distance_meets_requirements(inputs)?;
        }

        #[test]
        fn staves_are_ordered(inputs in prop::collection::vec(staff_strategy(), 1..8)) {
            check_staves_are_ordered(inputs)?;
        }
    }
}
