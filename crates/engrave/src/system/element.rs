//! Elements owned by a system: instrument names, brackets, spanner
//! segments and dividers.

use engrave_core::{
    geometry::Point,
    identifier::Id,
    measure::Tick,
    score::{BracketItem, BracketKind, NamePosition},
    spanner::SpannerKind,
};

use crate::arena::SystemId;

/// Whether a name is the long form (first system) or the short form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Long,
    Short,
}

impl NameKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Center,
    #[default]
    Right,
}

/// An instrument name label at the start of a system.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentName {
    id: Id,
    text: String,
    kind: NameKind,
    layout_pos: NamePosition,
    align: HorizontalAlign,
    offset: f32,
    staff_idx: usize,
    pos: Point,
    width: f32,
}

impl InstrumentName {
    pub fn new(id: Id, text: impl Into<String>, kind: NameKind, staff_idx: usize) -> Self {
        Self {
            id,
            text: text.into(),
            kind,
            layout_pos: NamePosition::default(),
            align: HorizontalAlign::default(),
            offset: 0.0,
            staff_idx,
            pos: Point::default(),
            width: 0.0,
        }
    }

    /// Builds the id of the `index`-th name of a part, e.g. `piano::long::__0`
    pub fn generated_id(part: Id, kind: NameKind, index: usize) -> Id {
        part.create_nested(Id::new(kind.as_str()))
            .create_nested(Id::from_anonymous(index))
    }

    pub fn with_layout_pos(mut self, layout_pos: NamePosition) -> Self {
        self.layout_pos = layout_pos;
        self
    }

    pub fn with_align(mut self, align: HorizontalAlign) -> Self {
        self.align = align;
        self
    }

    /// Sets the user's vertical offset from the computed center
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> NameKind {
        self.kind
    }

    pub fn layout_pos(&self) -> NamePosition {
        self.layout_pos
    }

    pub fn align(&self) -> HorizontalAlign {
        self.align
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Staff the name is attached to
    pub fn staff_idx(&self) -> usize {
        self.staff_idx
    }

    /// Position relative to the system; `y` is the vertical center
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Natural width measured during the horizontal pass
    pub fn width(&self) -> f32 {
        self.width
    }

    pub(crate) fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
        }
    }

    pub(crate) fn set_kind(&mut self, kind: NameKind) {
        self.kind = kind;
    }

    pub(crate) fn set_layout_pos(&mut self, layout_pos: NamePosition) {
        self.layout_pos = layout_pos;
    }

    pub(crate) fn set_staff_idx(&mut self, staff_idx: usize) {
        self.staff_idx = staff_idx;
    }

    pub(crate) fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub(crate) fn set_x(&mut self, x: f32) {
        self.pos = self.pos.with_x(x);
    }

    pub(crate) fn set_y(&mut self, y: f32) {
        self.pos = self.pos.with_y(y);
    }
}

/// Identity of a bracket inside one system.
///
/// Brackets are matched on this key when the bracket list is rebuilt, so a
/// bracket the user has edited survives a re-layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BracketKey {
    pub anchor_staff: usize,
    pub column: usize,
    pub kind: BracketKind,
    /// Tick of the measure the bracket stands in front of, if not the
    /// start of the system
    pub measure: Option<Tick>,
}

/// A bracket spanning a contiguous range of staves of a system.
#[derive(Debug, Clone, PartialEq)]
pub struct Bracket {
    kind: BracketKind,
    column: usize,
    span: usize,
    anchor_staff: usize,
    first_staff: usize,
    last_staff: usize,
    measure: Option<Tick>,
    generated: bool,
    width: f32,
    pos: Point,
    height: f32,
    shown: bool,
}

impl Bracket {
    /// Creates a user bracket for the declaration on `anchor_staff`
    pub fn new(item: &BracketItem, anchor_staff: usize) -> Self {
        let last_staff = anchor_staff + item.span().saturating_sub(1);
        Self {
            kind: item.kind(),
            column: item.column(),
            span: item.span(),
            anchor_staff,
            first_staff: anchor_staff,
            last_staff,
            measure: None,
            generated: false,
            width: 0.0,
            pos: Point::default(),
            height: 0.0,
            shown: false,
        }
    }

    pub(crate) fn new_generated(item: &BracketItem, anchor_staff: usize, measure: Option<Tick>) -> Self {
        Self {
            measure,
            generated: true,
            ..Self::new(item, anchor_staff)
        }
    }

    pub fn with_measure(mut self, measure: Option<Tick>) -> Self {
        self.measure = measure;
        self
    }

    pub fn key(&self) -> BracketKey {
        BracketKey {
            anchor_staff: self.anchor_staff,
            column: self.column,
            kind: self.kind,
            measure: self.measure,
        }
    }

    pub fn kind(&self) -> BracketKind {
        self.kind
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Number of staves the bracket was authored to span
    pub fn span(&self) -> usize {
        self.span
    }

    pub fn anchor_staff(&self) -> usize {
        self.anchor_staff
    }

    pub fn first_staff(&self) -> usize {
        self.first_staff
    }

    pub fn last_staff(&self) -> usize {
        self.last_staff
    }

    pub fn measure(&self) -> Option<Tick> {
        self.measure
    }

    /// Returns true if the layout created the bracket
    pub fn generated(&self) -> bool {
        self.generated
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn x(&self) -> f32 {
        self.pos.x()
    }

    pub fn y(&self) -> f32 {
        self.pos.y()
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns true if the vertical pass found enough visible staves
    pub fn shown(&self) -> bool {
        self.shown
    }

    /// Returns true if `staff_idx` lies in the bracket's staff range
    pub fn contains_staff(&self, staff_idx: usize) -> bool {
        (self.first_staff..=self.last_staff).contains(&staff_idx)
    }

    pub(crate) fn set_staff_span(&mut self, first_staff: usize, last_staff: usize) {
        self.first_staff = first_staff;
        self.last_staff = last_staff;
    }

    pub(crate) fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub(crate) fn set_x(&mut self, x: f32) {
        self.pos = self.pos.with_x(x);
    }

    pub(crate) fn set_vertical(&mut self, shown: bool, y: f32, height: f32) {
        self.shown = shown;
        self.pos = self.pos.with_y(y);
        self.height = height;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DividerSide {
    Left,
    Right,
}

/// A divider drawn between two systems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemDivider {
    side: DividerSide,
    offset: Point,
}

impl SystemDivider {
    pub fn new(side: DividerSide) -> Self {
        Self {
            side,
            offset: Point::default(),
        }
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn side(&self) -> DividerSide {
        self.side
    }

    pub fn offset(&self) -> Point {
        self.offset
    }
}

/// The part of a spanner drawn inside one system.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannerSegment {
    spanner: Id,
    kind: SpannerKind,
    system: SystemId,
    start_staff: usize,
    end_staff: usize,
    start: Point,
    end: Point,
}

impl SpannerSegment {
    pub fn new(spanner: Id, kind: SpannerKind, system: SystemId, start_staff: usize, end_staff: usize) -> Self {
        Self {
            spanner,
            kind,
            system,
            start_staff,
            end_staff,
            start: Point::default(),
            end: Point::default(),
        }
    }

    pub fn with_endpoints(mut self, start: Point, end: Point) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Id of the spanner this segment belongs to
    pub fn spanner(&self) -> Id {
        self.spanner
    }

    pub fn kind(&self) -> SpannerKind {
        self.kind
    }

    /// System the segment is drawn in
    pub fn system(&self) -> SystemId {
        self.system
    }

    pub fn start_staff(&self) -> usize {
        self.start_staff
    }

    pub fn end_staff(&self) -> usize {
        self.end_staff
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }
}

/// An element that can be attached to a system.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemElement {
    InstrumentName(InstrumentName),
    Bracket(Bracket),
    SpannerSegment(SpannerSegment),
    Divider(SystemDivider),
    /// An element systems do not own; adding it has no effect
    Other(Id),
}

/// Lookup key of a [`SystemElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKey {
    InstrumentName { staff: usize, id: Id },
    Bracket(BracketKey),
    SpannerSegment(Id),
    Divider(DividerSide),
    Other(Id),
}

impl SystemElement {
    pub fn key(&self) -> ElementKey {
        match self {
            Self::InstrumentName(name) => ElementKey::InstrumentName {
                staff: name.staff_idx(),
                id: name.id(),
            },
            Self::Bracket(bracket) => ElementKey::Bracket(bracket.key()),
            Self::SpannerSegment(segment) => ElementKey::SpannerSegment(segment.spanner()),
            Self::Divider(divider) => ElementKey::Divider(divider.side()),
            Self::Other(id) => ElementKey::Other(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name_ids() {
        let piano = Id::new("piano");
        let first = InstrumentName::generated_id(piano, NameKind::Long, 0);

        assert_eq!(first, "piano::long::__0");
        assert_ne!(first, InstrumentName::generated_id(piano, NameKind::Short, 0));
    }

    #[test]
    fn test_bracket_from_item() {
        let item = BracketItem::new(BracketKind::Brace, 3, 1);
        let bracket = Bracket::new(&item, 4);

        assert_eq!(bracket.first_staff(), 4);
        assert_eq!(bracket.last_staff(), 6);
        assert!(bracket.contains_staff(5));
        assert!(!bracket.contains_staff(7));
        assert!(!bracket.generated());

        let generated = Bracket::new_generated(&item, 4, Some(1920));
        assert!(generated.generated());
        assert_eq!(generated.key().measure, Some(1920));
        assert_ne!(generated.key(), bracket.key());
    }

    #[test]
    fn test_element_keys() {
        let name = InstrumentName::new(Id::new("oboe"), "Oboe", NameKind::Long, 2);
        let divider = SystemDivider::new(DividerSide::Right);

        assert_eq!(
            SystemElement::InstrumentName(name).key(),
            ElementKey::InstrumentName {
                staff: 2,
                id: Id::new("oboe")
            }
        );
        assert_eq!(
            SystemElement::Divider(divider).key(),
            ElementKey::Divider(DividerSide::Right)
        );
    }
}
