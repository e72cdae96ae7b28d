//! TOML report of a finished layout.
//!
//! The report lists every system with its page placement, the boxes of
//! its staves, its brackets, instrument names and cross-staff slur
//! segments. Staff positions are given in page and canvas coordinates as
//! well as relative to the system.

use std::io;

use serde::Serialize;

use engrave::{
    EngraveError,
    arena::SystemArena,
    config::PageConfig,
    system::{Bracket, InstrumentName, SpannerSegment, SysStaff, System},
};

#[derive(Debug, Serialize)]
pub struct LayoutReport {
    pages: usize,
    systems: Vec<SystemReport>,
}

#[derive(Debug, Serialize)]
struct SystemReport {
    index: usize,
    page: usize,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    left_margin: f32,
    frame: bool,
    staves: Vec<StaffReport>,
    brackets: Vec<BracketReport>,
    names: Vec<NameReport>,
    slurs: Vec<SegmentReport>,
}

#[derive(Debug, Serialize)]
struct StaffReport {
    index: usize,
    visible: bool,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    page_y: f32,
    canvas_y: f32,
}

#[derive(Debug, Serialize)]
struct BracketReport {
    kind: String,
    column: usize,
    first_staff: usize,
    last_staff: usize,
    shown: bool,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

#[derive(Debug, Serialize)]
struct NameReport {
    text: String,
    staff: usize,
    x: f32,
    y: f32,
}

#[derive(Debug, Serialize)]
struct SegmentReport {
    spanner: String,
    start_staff: usize,
    end_staff: usize,
    start: [f32; 2],
    end: [f32; 2],
}

impl LayoutReport {
    pub fn new(arena: &SystemArena, page: &PageConfig) -> Self {
        let systems = arena
            .iter()
            .map(|system| {
                let page_canvas_y = arena.page_canvas_y(system.page(), page);
                SystemReport::new(system, page_canvas_y)
            })
            .collect();
        Self {
            pages: arena.page_count(),
            systems,
        }
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Serializes the report.
    ///
    /// # Errors
    ///
    /// Returns [`EngraveError::Io`] if the report cannot be represented in
    /// TOML.
    pub fn to_toml(&self) -> Result<String, EngraveError> {
        toml::to_string(self).map_err(|err| EngraveError::Io(io::Error::other(err)))
    }
}

impl SystemReport {
    fn new(system: &System, page_canvas_y: f32) -> Self {
        let staves = system
            .staves()
            .iter()
            .enumerate()
            .map(|(index, staff)| StaffReport::new(system, index, staff, page_canvas_y))
            .collect();
        let names = system
            .staves()
            .iter()
            .flat_map(SysStaff::instrument_names)
            .map(NameReport::from)
            .collect();

        Self {
            index: system.id().index(),
            page: system.page(),
            x: system.pos().x(),
            y: system.y(),
            width: system.width(),
            height: system.height(),
            left_margin: system.left_margin(),
            frame: system.vbox().is_some(),
            staves,
            brackets: system.brackets().iter().map(BracketReport::from).collect(),
            names,
            slurs: system.spanner_segments().iter().map(SegmentReport::from).collect(),
        }
    }
}

impl StaffReport {
    fn new(system: &System, index: usize, staff: &SysStaff, page_canvas_y: f32) -> Self {
        let bbox = staff.bbox();
        Self {
            index,
            visible: staff.show() && !bbox.is_empty(),
            x: bbox.min_x(),
            y: staff.y(),
            width: bbox.width(),
            height: bbox.height(),
            page_y: system.staff_y_page(index),
            canvas_y: system
                .staff_canvas_y_page(index, page_canvas_y)
                .unwrap_or(page_canvas_y),
        }
    }
}

impl From<&Bracket> for BracketReport {
    fn from(bracket: &Bracket) -> Self {
        Self {
            kind: format!("{:?}", bracket.kind()).to_lowercase(),
            column: bracket.column(),
            first_staff: bracket.first_staff(),
            last_staff: bracket.last_staff(),
            shown: bracket.shown(),
            x: bracket.x(),
            y: bracket.y(),
            width: bracket.width(),
            height: bracket.height(),
        }
    }
}

impl From<&InstrumentName> for NameReport {
    fn from(name: &InstrumentName) -> Self {
        Self {
            text: name.text().to_string(),
            staff: name.staff_idx(),
            x: name.pos().x(),
            y: name.pos().y(),
        }
    }
}

impl From<&SpannerSegment> for SegmentReport {
    fn from(segment: &SpannerSegment) -> Self {
        Self {
            spanner: segment.spanner().to_string(),
            start_staff: segment.start_staff(),
            end_staff: segment.end_staff(),
            start: [segment.start().x(), segment.start().y()],
            end: [segment.end().x(), segment.end().y()],
        }
    }
}
