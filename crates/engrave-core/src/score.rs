//! Score input model read by the system layout.
//!
//! Only the attributes the layout algorithm needs are modelled here: the
//! part list, each part's staves (line count, size, user distance,
//! visibility, bracket declarations) and the instrument names a part
//! displays at the start of a system.
//!
//! A [`Score`] is validated on construction, so the layout can rely on every
//! part owning at least one staff and on staves being numbered part by part.

use serde::Deserialize;
use thiserror::Error;

use crate::identifier::Id;

/// Errors detected while building a [`Score`].
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("part `{0}` has no staves")]
    EmptyPart(Id),

    #[error("part `{0}` is declared more than once")]
    DuplicatePart(Id),

    #[error("bracket on staff {staff} of part `{part}` has an empty span")]
    EmptyBracketSpan { part: Id, staff: usize },
}

/// Visual kind of a bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketKind {
    #[default]
    Normal,
    Brace,
    Square,
    Line,
    /// Declared but not drawn; ignored by the layout.
    None,
}

/// A bracket declaration attached to the first staff it spans.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BracketItem {
    #[serde(default)]
    kind: BracketKind,
    span: usize,
    #[serde(default)]
    column: usize,
}

impl BracketItem {
    pub fn new(kind: BracketKind, span: usize, column: usize) -> Self {
        Self { kind, span, column }
    }

    pub fn kind(&self) -> BracketKind {
        self.kind
    }

    /// Number of staves the bracket was authored to span
    pub fn span(&self) -> usize {
        self.span
    }

    /// Nesting column; column 0 is closest to the staves
    pub fn column(&self) -> usize {
        self.column
    }
}

/// One staff of a part.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Staff {
    #[serde(default = "default_lines")]
    lines: u32,
    /// Distance between staff lines, in spatium
    #[serde(default = "default_one")]
    line_distance: f32,
    #[serde(default = "default_one")]
    mag: f32,
    /// Extra distance above this staff, in spatium
    #[serde(default)]
    user_dist: f32,
    #[serde(default = "default_true")]
    show: bool,
    #[serde(default)]
    brackets: Vec<BracketItem>,
}

fn default_lines() -> u32 {
    5
}

fn default_one() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for Staff {
    fn default() -> Self {
        Self {
            lines: default_lines(),
            line_distance: 1.0,
            mag: 1.0,
            user_dist: 0.0,
            show: true,
            brackets: Vec::new(),
        }
    }
}

impl Staff {
    /// Creates a visible staff with the given number of lines
    pub fn new(lines: u32) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn with_user_dist(mut self, user_dist: f32) -> Self {
        self.user_dist = user_dist;
        self
    }

    pub fn with_mag(mut self, mag: f32) -> Self {
        self.mag = mag;
        self
    }

    pub fn with_line_distance(mut self, line_distance: f32) -> Self {
        self.line_distance = line_distance;
        self
    }

    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn with_bracket(mut self, item: BracketItem) -> Self {
        self.brackets.push(item);
        self
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn line_distance(&self) -> f32 {
        self.line_distance
    }

    pub fn mag(&self) -> f32 {
        self.mag
    }

    /// User distance in spatium
    pub fn user_dist(&self) -> f32 {
        self.user_dist
    }

    /// Score-wide visibility of the staff
    pub fn show(&self) -> bool {
        self.show
    }

    pub fn brackets(&self) -> &[BracketItem] {
        &self.brackets
    }

    /// Distance from the top to the bottom staff line.
    ///
    /// Staves with one line (or none) have no height.
    ///
    /// # Examples
    ///
    /// ```
    /// # use engrave_core::score::Staff;
    /// assert_eq!(Staff::new(5).height(2.0), 8.0);
    /// assert_eq!(Staff::new(1).height(2.0), 0.0);
    /// ```
    pub fn height(&self, spatium: f32) -> f32 {
        if self.lines <= 1 {
            return 0.0;
        }
        (self.lines - 1) as f32 * self.line_distance * self.mag * spatium
    }
}

/// Which staff range of a part an instrument name is centered on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePosition {
    /// Centered across the visible staves of the whole part
    #[default]
    WholePart,
    /// Centered at the first staff
    FirstStaff,
    /// Centered between the first and second staff
    FirstToSecond,
    /// Centered at the second staff
    SecondStaff,
    /// Centered between the second and third staff
    SecondToThird,
    /// Centered at the third staff
    ThirdStaff,
}

/// An instrument name declared by a part.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaffName {
    text: String,
    #[serde(default)]
    pos: NamePosition,
}

impl StaffName {
    pub fn new(text: impl Into<String>, pos: NamePosition) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pos(&self) -> NamePosition {
        self.pos
    }
}

/// An instrument part with its staves and names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Part {
    id: Id,
    staves: Vec<Staff>,
    #[serde(default)]
    long_names: Vec<StaffName>,
    #[serde(default)]
    short_names: Vec<StaffName>,
}

impl Part {
    pub fn new(id: impl Into<Id>, staves: Vec<Staff>) -> Self {
        Self {
            id: id.into(),
            staves,
            long_names: Vec::new(),
            short_names: Vec::new(),
        }
    }

    pub fn with_long_name(mut self, name: StaffName) -> Self {
        self.long_names.push(name);
        self
    }

    pub fn with_short_name(mut self, name: StaffName) -> Self {
        self.short_names.push(name);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn staves(&self) -> &[Staff] {
        &self.staves
    }

    pub fn nstaves(&self) -> usize {
        self.staves.len()
    }

    pub fn long_names(&self) -> &[StaffName] {
        &self.long_names
    }

    pub fn short_names(&self) -> &[StaffName] {
        &self.short_names
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StaffRef {
    part: usize,
    local: usize,
}

#[derive(Deserialize)]
struct ScoreDefinition {
    parts: Vec<Part>,
}

/// The part list with a flat, score-wide staff numbering.
///
/// # Examples
///
/// ```
/// # use engrave_core::score::{Part, Score, Staff};
/// let score = Score::new(vec![
///     Part::new("flute", vec![Staff::new(5)]),
///     Part::new("piano", vec![Staff::new(5), Staff::new(5)]),
/// ])
/// .unwrap();
///
/// assert_eq!(score.nstaves(), 3);
/// assert_eq!(score.first_staff_of_part(1), Some(1));
/// assert!(score.same_part(1, 2));
/// assert!(!score.same_part(0, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ScoreDefinition")]
pub struct Score {
    parts: Vec<Part>,
    staff_refs: Vec<StaffRef>,
}

impl TryFrom<ScoreDefinition> for Score {
    type Error = ScoreError;

    fn try_from(definition: ScoreDefinition) -> Result<Self, Self::Error> {
        Self::new(definition.parts)
    }
}

impl Score {
    /// Builds and validates a score from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError`] if a part has no staves, a part id is repeated,
    /// or a bracket declares an empty span.
    pub fn new(parts: Vec<Part>) -> Result<Self, ScoreError> {
        let mut staff_refs = Vec::new();
        for (part_idx, part) in parts.iter().enumerate() {
            if part.staves.is_empty() {
                return Err(ScoreError::EmptyPart(part.id));
            }
            if parts[..part_idx].iter().any(|p| p.id == part.id) {
                return Err(ScoreError::DuplicatePart(part.id));
            }
            for (local, staff) in part.staves.iter().enumerate() {
                if staff.brackets.iter().any(|b| b.span == 0) {
                    return Err(ScoreError::EmptyBracketSpan {
                        part: part.id,
                        staff: local,
                    });
                }
                staff_refs.push(StaffRef {
                    part: part_idx,
                    local,
                });
            }
        }
        Ok(Self { parts, staff_refs })
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn nstaves(&self) -> usize {
        self.staff_refs.len()
    }

    pub fn staff(&self, staff_idx: usize) -> Option<&Staff> {
        let staff_ref = self.staff_refs.get(staff_idx)?;
        self.parts[staff_ref.part].staves.get(staff_ref.local)
    }

    /// Index of the part owning the staff
    pub fn part_index_of_staff(&self, staff_idx: usize) -> Option<usize> {
        self.staff_refs.get(staff_idx).map(|r| r.part)
    }

    pub fn part_of_staff(&self, staff_idx: usize) -> Option<&Part> {
        self.part_index_of_staff(staff_idx).map(|p| &self.parts[p])
    }

    /// Score index of the first staff of a part
    pub fn first_staff_of_part(&self, part_idx: usize) -> Option<usize> {
        self.staff_refs.iter().position(|r| r.part == part_idx)
    }

    /// Score index of the last staff of a part
    pub fn last_staff_of_part(&self, part_idx: usize) -> Option<usize> {
        let first = self.first_staff_of_part(part_idx)?;
        Some(first + self.parts[part_idx].nstaves() - 1)
    }

    /// Returns true if the staff is the first staff of its part
    pub fn is_top_staff(&self, staff_idx: usize) -> bool {
        self.staff_refs
            .get(staff_idx)
            .is_some_and(|r| r.local == 0)
    }

    pub fn same_part(&self, a: usize, b: usize) -> bool {
        match (self.part_index_of_staff(a), self.part_index_of_staff(b)) {
            (Some(pa), Some(pb)) => pa == pb,
            _ => false,
        }
    }

    /// Number of bracket columns declared across all staves
    pub fn bracket_columns(&self) -> usize {
        self.parts
            .iter()
            .flat_map(|p| p.staves.iter())
            .flat_map(|s| s.brackets.iter())
            .map(|b| b.column + 1)
            .max()
            .unwrap_or(0)
    }
}
