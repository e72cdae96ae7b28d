//! A system: one line of simultaneously aligned staves.
//!
//! A [`System`] owns one [`SysStaff`] per score staff (hidden ones
//! included), the brackets drawn at its start, its dividers and the spanner
//! segments drawn inside it. The layout passes are split over the child
//! modules and must run in this order:
//!
//! 1. [`System::set_instrument_names`] and [`System::layout_system`]
//!    (instrument names, brackets and left margin),
//! 2. [`System::layout2`] (vertical stacking, vertical bracket placement,
//!    instrument name placement and cross-staff spanners),
//! 3. [`System::min_distance`] between consecutive systems.
//!
//! [`System::restore_layout2`] may replace step 2 as long as nothing in the
//! system changed since the last full pass.

mod bracket;
mod distance;
mod element;
mod horizontal;
mod names;
mod spanner;
mod staff;
mod vertical;

pub use element::{
    Bracket, BracketKey, DividerSide, ElementKey, HorizontalAlign, InstrumentName, NameKind,
    SpannerSegment, SystemDivider, SystemElement,
};
pub use staff::SysStaff;

use std::ops::RangeInclusive;

use log::debug;

use engrave_core::{
    geometry::{Bounds, Point},
    measure::{Frame, Measure, MeasureBase, Tick},
    score::Score,
    style::StyleContext,
};

use crate::arena::SystemId;

#[derive(Debug, Clone, PartialEq)]
pub struct System {
    id: SystemId,
    staves: Vec<SysStaff>,
    measures: Vec<MeasureBase>,
    brackets: Vec<Bracket>,
    divider_left: Option<SystemDivider>,
    divider_right: Option<SystemDivider>,
    spanner_segments: Vec<SpannerSegment>,
    bbox: Bounds,
    pos: Point,
    page: usize,
    left_margin: f32,
    system_height: Option<f32>,
}

impl System {
    /// Creates an empty system with `nstaves` visible staves
    pub fn new(id: SystemId, nstaves: usize) -> Self {
        Self {
            id,
            staves: (0..nstaves).map(|_| SysStaff::new()).collect(),
            measures: Vec::new(),
            brackets: Vec::new(),
            divider_left: None,
            divider_right: None,
            spanner_segments: Vec::new(),
            bbox: Bounds::default(),
            pos: Point::default(),
            page: 0,
            left_margin: 0.0,
            system_height: None,
        }
    }

    pub fn id(&self) -> SystemId {
        self.id
    }

    pub fn staves(&self) -> &[SysStaff] {
        &self.staves
    }

    pub fn nstaves(&self) -> usize {
        self.staves.len()
    }

    pub fn staff(&self, staff_idx: usize) -> Option<&SysStaff> {
        self.staves.get(staff_idx)
    }

    pub fn staff_mut(&mut self, staff_idx: usize) -> Option<&mut SysStaff> {
        self.staves.get_mut(staff_idx)
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn spanner_segments(&self) -> &[SpannerSegment] {
        &self.spanner_segments
    }

    pub fn divider(&self, side: DividerSide) -> Option<&SystemDivider> {
        match side {
            DividerSide::Left => self.divider_left.as_ref(),
            DividerSide::Right => self.divider_right.as_ref(),
        }
    }

    /// Bounding box in system coordinates
    pub fn bbox(&self) -> Bounds {
        self.bbox
    }

    pub fn width(&self) -> f32 {
        self.bbox.width()
    }

    pub fn set_width(&mut self, width: f32) {
        self.bbox = Bounds::from_rect(0.0, 0.0, width, self.bbox.height());
    }

    pub fn height(&self) -> f32 {
        self.bbox.height()
    }

    fn set_height(&mut self, height: f32) {
        self.bbox = self.bbox.with_height(height);
    }

    /// Space left of the staves taken by instrument names and brackets
    pub fn left_margin(&self) -> f32 {
        self.left_margin
    }

    /// Position of the system on its page
    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
    }

    pub fn y(&self) -> f32 {
        self.pos.y()
    }

    /// Index of the page the system is placed on
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn measures(&self) -> &[MeasureBase] {
        &self.measures
    }

    pub fn append_measure(&mut self, measure: MeasureBase) {
        self.measures.push(measure);
    }

    /// Removes the segment at `index`
    pub fn remove_measure(&mut self, index: usize) -> Option<MeasureBase> {
        (index < self.measures.len()).then(|| self.measures.remove(index))
    }

    pub fn remove_last_measure(&mut self) -> Option<MeasureBase> {
        self.measures.pop()
    }

    /// Drops the measures and spanner segments; dividers are kept for reuse
    pub fn clear(&mut self) {
        self.measures.clear();
        self.spanner_segments.clear();
    }

    /// Total width of the segments, from the system start to the end of the
    /// rightmost segment
    pub fn measures_width(&self) -> f32 {
        self.measures
            .iter()
            .map(|m| m.x() + m.width())
            .fold(0.0, f32::max)
    }

    pub fn first_measure(&self) -> Option<&Measure> {
        self.measures.iter().find_map(MeasureBase::as_measure)
    }

    pub fn last_measure(&self) -> Option<&Measure> {
        self.measures.iter().rev().find_map(MeasureBase::as_measure)
    }

    /// The vertical or text frame of a frame system.
    ///
    /// A system can hold only one such frame, as its first segment.
    pub fn vbox(&self) -> Option<&Frame> {
        self.measures.first().and_then(MeasureBase::as_vertical_frame)
    }

    pub fn page_break(&self) -> bool {
        self.measures.last().is_some_and(MeasureBase::page_break)
    }

    pub fn end_tick(&self) -> Option<Tick> {
        self.measures.last().map(MeasureBase::end_tick)
    }

    /// Inserts or removes staves at the end until there are `nstaves`
    pub fn adjust_staves_number(&mut self, nstaves: usize, spatium: f32) {
        while self.staves.len() < nstaves {
            self.insert_staff(self.staves.len(), spatium);
        }
        self.staves.truncate(nstaves);
    }

    /// Inserts a staff, guessing its position from the staff above
    pub fn insert_staff(&mut self, staff_idx: usize, spatium: f32) {
        let staff_idx = staff_idx.min(self.staves.len());
        let mut staff = SysStaff::new();
        if let Some(above) = staff_idx.checked_sub(1).and_then(|i| self.staves.get(i)) {
            staff.set_bbox(Bounds::default().with_y(above.y() + 6.0 * spatium));
        }
        self.staves.insert(staff_idx, staff);
    }

    pub fn remove_staff(&mut self, staff_idx: usize) -> Option<SysStaff> {
        (staff_idx < self.staves.len()).then(|| self.staves.remove(staff_idx))
    }

    /// Returns true if the staff is shown both in the score and in this system
    pub fn is_staff_visible(&self, score: &Score, staff_idx: usize) -> bool {
        score.staff(staff_idx).is_some_and(|s| s.show())
            && self.staves.get(staff_idx).is_some_and(SysStaff::show)
    }

    /// First visible staff after `staff_idx`, or the first visible staff
    /// of the system for `None`
    pub fn next_visible_staff(&self, score: &Score, staff_idx: Option<usize>) -> Option<usize> {
        let start = staff_idx.map_or(0, |i| i + 1);
        (start..self.staves.len()).find(|&i| self.is_staff_visible(score, i))
    }

    pub fn first_visible_staff(&self, score: &Score) -> Option<usize> {
        self.next_visible_staff(score, None)
    }

    /// First staff shown in this system, ignoring the score-level flag
    pub fn first_visible_sys_staff(&self) -> Option<usize> {
        let found = self.staves.iter().position(SysStaff::show);
        if found.is_none() {
            debug!(system:? = self.id; "No visible staff in system");
        }
        found
    }

    /// Last staff shown in this system, ignoring the score-level flag
    pub fn last_visible_sys_staff(&self) -> Option<usize> {
        let found = self.staves.iter().rposition(SysStaff::show);
        if found.is_none() {
            debug!(system:? = self.id; "No visible staff in system");
        }
        found
    }

    /// Staves of a part that exist in this system
    fn part_staves(&self, score: &Score, part_idx: usize) -> Option<RangeInclusive<usize>> {
        let first = score.first_staff_of_part(part_idx)?;
        let last = score.last_staff_of_part(part_idx)?.min(self.staves.len().checked_sub(1)?);
        (first <= last).then_some(first..=last)
    }

    pub fn first_visible_sys_staff_of_part(&self, score: &Score, part_idx: usize) -> Option<usize> {
        self.part_staves(score, part_idx)?
            .find(|&i| self.staves[i].show())
    }

    pub fn last_visible_sys_staff_of_part(&self, score: &Score, part_idx: usize) -> Option<usize> {
        self.part_staves(score, part_idx)?
            .rev()
            .find(|&i| self.staves[i].show())
    }

    /// Returns the staff at page position `y`.
    ///
    /// Every staff box is extended by the style's hit margin above and
    /// below, so positions just outside a staff still select it.
    pub fn y2staff(&self, y: f32, style: &StyleContext) -> Option<usize> {
        let y = y - self.pos.y();
        let margin = style.staff_hit_margin();
        self.staves.iter().position(|s| {
            let bbox = s.bbox();
            y >= bbox.min_y() - margin && y < bbox.max_y() + margin
        })
    }

    /// Finds the visible staff closest to `y`, in system coordinates.
    ///
    /// The space between two visible staves is split according to
    /// `spacing_factor`; the whole space goes to `preferred_staff` when it
    /// borders it. Positions below the last visible staff select that staff.
    pub fn search_staff(
        &self,
        score: &Score,
        y: f32,
        preferred_staff: Option<usize>,
        spacing_factor: f32,
    ) -> Option<usize> {
        let mut staff_idx = self.first_visible_staff(score)?;
        while let Some(next_idx) = self.next_visible_staff(score, Some(staff_idx)) {
            let bottom = self.staves[staff_idx].bbox().max_y();
            let gap = self.staves[next_idx].bbox().min_y() - bottom;
            let boundary = if preferred_staff == Some(staff_idx) {
                bottom + gap
            } else if preferred_staff == Some(next_idx) {
                bottom
            } else {
                bottom + gap * spacing_factor
            };
            if y <= boundary {
                break;
            }
            staff_idx = next_idx;
        }
        Some(staff_idx)
    }

    /// Page position of a staff's first line.
    ///
    /// An out-of-range index yields the position of the system itself.
    pub fn staff_y_page(&self, staff_idx: usize) -> f32 {
        match self.staves.get(staff_idx) {
            Some(staff) => staff.y() + self.y(),
            None => self.y(),
        }
    }

    /// Canvas position of a staff's first line, given the canvas position of
    /// the system's page
    pub fn staff_canvas_y_page(&self, staff_idx: usize, page_canvas_y: f32) -> Option<f32> {
        self.staves
            .get(staff_idx)
            .map(|staff| staff.y() + self.y() + page_canvas_y)
    }

    /// Attaches an element to the system
    pub fn add(&mut self, element: SystemElement) {
        match element {
            SystemElement::InstrumentName(name) => {
                let staff_idx = name.staff_idx();
                match self.staves.get_mut(staff_idx) {
                    Some(staff) => staff.instrument_names_mut().push(name),
                    None => {
                        debug!(staff_idx, nstaves = self.staves.len(); "Instrument name on missing staff ignored");
                    }
                }
            }
            SystemElement::Bracket(bracket) => self.brackets.push(bracket),
            SystemElement::SpannerSegment(segment) => {
                if self
                    .spanner_segments
                    .iter()
                    .any(|s| s.spanner() == segment.spanner())
                {
                    debug!(spanner:% = segment.spanner(); "Spanner segment already in system");
                } else {
                    self.spanner_segments.push(segment);
                }
            }
            SystemElement::Divider(divider) => match divider.side() {
                DividerSide::Left => self.divider_left = Some(divider),
                DividerSide::Right => self.divider_right = Some(divider),
            },
            SystemElement::Other(id) => {
                debug!(element:% = id; "Element kind not owned by systems");
            }
        }
    }

    /// Detaches the element with the given key and returns it
    pub fn remove(&mut self, key: ElementKey) -> Option<SystemElement> {
        let removed = match key {
            ElementKey::InstrumentName { staff, id } => self.staves.get_mut(staff).and_then(|s| {
                let names = s.instrument_names_mut();
                let index = names.iter().position(|n| n.id() == id)?;
                Some(SystemElement::InstrumentName(names.remove(index)))
            }),
            ElementKey::Bracket(bracket_key) => self
                .brackets
                .iter()
                .position(|b| b.key() == bracket_key)
                .map(|index| SystemElement::Bracket(self.brackets.remove(index))),
            ElementKey::SpannerSegment(spanner) => self
                .spanner_segments
                .iter()
                .position(|s| s.spanner() == spanner)
                .map(|index| SystemElement::SpannerSegment(self.spanner_segments.remove(index))),
            ElementKey::Divider(DividerSide::Left) => self.divider_left.take().map(SystemElement::Divider),
            ElementKey::Divider(DividerSide::Right) => self.divider_right.take().map(SystemElement::Divider),
            ElementKey::Other(_) => None,
        };
        if removed.is_none() {
            debug!(key:?; "Element not found in system");
        }
        removed
    }

    /// Replaces the element with key `old` by `new`
    pub fn change(&mut self, old: ElementKey, new: SystemElement) -> Option<SystemElement> {
        let removed = self.remove(old);
        self.add(new);
        removed
    }
}
