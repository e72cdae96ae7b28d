//! Arena of laid out systems and their placement on pages.
//!
//! Systems are created by the caller's line breaking in score order and
//! addressed by [`SystemId`]. Spanner segments refer to their system by id,
//! so systems never hold references to one another.

use std::fmt;

use log::{debug, info};

use crate::{config::PageConfig, layout::LayoutContext, system::System};

/// Index of a system in its [`SystemArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(usize);

impl SystemId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemArena {
    systems: Vec<System>,
}

impl SystemArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new system with `nstaves` staves and returns its id
    pub fn create(&mut self, nstaves: usize) -> SystemId {
        let id = SystemId::new(self.systems.len());
        self.systems.push(System::new(id, nstaves));
        id
    }

    pub fn get(&self, id: SystemId) -> Option<&System> {
        self.systems.get(id.index())
    }

    pub fn get_mut(&mut self, id: SystemId) -> Option<&mut System> {
        self.systems.get_mut(id.index())
    }

    /// Systems in score order
    pub fn iter(&self) -> impl Iterator<Item = &System> {
        self.systems.iter()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Number of pages used after [`SystemArena::stack`]
    pub fn page_count(&self) -> usize {
        self.systems.last().map_or(0, |s| s.page() + 1)
    }

    /// Places the systems on pages.
    ///
    /// Every system is put below the previous one at their minimum
    /// distance. A system starts a new page when it does not fit in the
    /// page's content area or when the previous system ends with a page
    /// break. A system taller than a page still gets a page of its own.
    ///
    /// Returns the number of pages used.
    pub fn stack(&mut self, ctx: &LayoutContext<'_>, page: &PageConfig) -> usize {
        let bottom = page.height() - page.bottom_margin();
        let mut page_idx = 0;
        let mut y = page.top_margin();

        for index in 0..self.systems.len() {
            if let Some(prev_idx) = index.checked_sub(1) {
                let (done, rest) = self.systems.split_at(index);
                let prev = &done[prev_idx];
                let current = &rest[0];
                let next_y = prev.y() + prev.height() + prev.min_distance(current, ctx);

                if prev.page_break() {
                    debug!(system:% = current.id(); "Page break before system");
                    page_idx += 1;
                    y = page.top_margin();
                } else if next_y + current.height() > bottom {
                    debug!(system:% = current.id(), next_y, bottom; "System moved to next page");
                    page_idx += 1;
                    y = page.top_margin();
                } else {
                    y = next_y;
                }
            }

            let system = &mut self.systems[index];
            system.set_page(page_idx);
            system.set_pos(engrave_core::geometry::Point::new(page.left_margin(), y));
        }

        let pages = self.page_count();
        info!(systems = self.systems.len(), pages; "Systems stacked");
        pages
    }

    /// Canvas position of the top of a page when pages are laid out one
    /// below the other
    pub fn page_canvas_y(&self, page_idx: usize, page: &PageConfig) -> f32 {
        page_idx as f32 * (page.height() + page.page_gap())
    }

    /// Canvas position of a staff's first line
    pub fn staff_canvas_y(&self, id: SystemId, staff_idx: usize, page: &PageConfig) -> Option<f32> {
        let system = self.get(id)?;
        system.staff_canvas_y_page(staff_idx, self.page_canvas_y(system.page(), page))
    }
}

#[cfg(test)]
mod tests {
    use engrave_core::{
        measure::{Measure, MeasureBase},
        score::{Part, Score, Staff},
        style::StyleContext,
    };
    use float_cmp::assert_approx_eq;

    use super::*;

    fn score() -> Score {
        Score::new(vec![Part::new("flute", vec![Staff::new(5)])]).unwrap()
    }

    fn style() -> StyleContext {
        StyleContext::default()
            .with_spatium(1.0)
            .with_min_system_distance(10.0)
    }

    fn page() -> PageConfig {
        PageConfig::default()
            .with_height(100.0)
            .with_margins(5.0, 5.0, 10.0, 10.0)
            .with_page_gap(20.0)
    }

    fn arena(count: usize, ctx: &LayoutContext<'_>) -> SystemArena {
        let mut arena = SystemArena::new();
        for i in 0..count {
            let id = arena.create(1);
            let system = arena.get_mut(id).unwrap();
            system.set_width(150.0);
            let tick = i as i32 * 1920;
            system.append_measure(MeasureBase::Measure(Measure::new(tick, 1920, 0.0, 150.0)));
            system.layout2(ctx);
        }
        arena
    }

    #[test]
    fn test_create_and_lookup() {
        let mut arena = SystemArena::new();
        assert!(arena.is_empty());

        let first = arena.create(2);
        let second = arena.create(2);

        assert_eq!(arena.len(), 2);
        assert_eq!(second.index(), 1);
        assert_eq!(arena.get(first).map(System::id), Some(first));
        assert!(arena.get(SystemId::new(7)).is_none());
        assert_eq!(second.to_string(), "system#1");
    }

    #[test]
    fn test_stack_on_pages() {
        let (score, style) = (score(), style());
        let ctx = LayoutContext::new(&score, &style);
        let mut arena = arena(7, &ctx);

        // Each system is 4 high and 10 apart: 14 per system, 90 usable.
        let pages = arena.stack(&ctx, &page());

        assert_eq!(pages, 2);
        let ys: Vec<f32> = arena.iter().map(System::y).collect();
        assert_approx_eq!(f32, ys[0], 10.0);
        assert_approx_eq!(f32, ys[1], 24.0);
        assert_approx_eq!(f32, ys[5], 80.0);
        assert_eq!(arena.get(SystemId::new(5)).unwrap().page(), 0);
        assert_eq!(arena.get(SystemId::new(6)).unwrap().page(), 1);
        assert_approx_eq!(f32, ys[6], 10.0);
        assert_approx_eq!(f32, arena.get(SystemId::new(6)).unwrap().pos().x(), 5.0);
    }

    #[test]
    fn test_page_break_starts_new_page() {
        let (score, style) = (score(), style());
        let ctx = LayoutContext::new(&score, &style);
        let mut arena = SystemArena::new();
        for i in 0..2 {
            let id = arena.create(1);
            let system = arena.get_mut(id).unwrap();
            let measure = Measure::new(i * 1920, 1920, 0.0, 150.0).with_page_break(i == 0);
            system.append_measure(MeasureBase::Measure(measure));
            system.layout2(&ctx);
        }

        assert_eq!(arena.stack(&ctx, &page()), 2);
        assert_eq!(arena.get(SystemId::new(1)).unwrap().page(), 1);
    }

    #[test]
    fn test_canvas_positions() {
        let (score, style) = (score(), style());
        let ctx = LayoutContext::new(&score, &style);
        let mut arena = arena(7, &ctx);
        let page = page();
        arena.stack(&ctx, &page);

        assert_approx_eq!(f32, arena.page_canvas_y(1, &page), 120.0);
        assert_eq!(arena.staff_canvas_y(SystemId::new(6), 0, &page), Some(130.0));
        assert_eq!(arena.staff_canvas_y(SystemId::new(1), 0, &page), Some(24.0));
        assert_eq!(arena.staff_canvas_y(SystemId::new(9), 0, &page), None);
    }
}
