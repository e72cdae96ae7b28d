//! Bracket creation and placement.
//!
//! Bracket declarations live on the staves of the score. Every layout
//! rebuilds the system's bracket list from them, keeping existing brackets
//! whose [`BracketKey`] matches so user edits survive.

use log::{debug, trace};

use engrave_core::{
    measure::{MeasureBase, Tick},
    score::{BracketItem, BracketKind, Score},
    style::StyleContext,
};

use super::{Bracket, BracketKey, System};
use crate::layout::LayoutContext;

/// Clamps the authored range of a declaration to the system and trims it
/// to visible staves at both ends. Returns `None` if no staff of the range
/// is visible.
fn visible_range(
    item: &BracketItem,
    staff_idx: usize,
    nstaves: usize,
    visible: impl Fn(usize) -> bool,
) -> Option<(usize, usize)> {
    let last = (staff_idx + item.span().saturating_sub(1)).min(nstaves.checked_sub(1)?);
    let first = (staff_idx..=last).find(|&i| visible(i))?;
    let last = (first..=last).rev().find(|&i| visible(i))?;
    Some((first, last))
}

/// A bracket reduced to one visible staff is only drawn when it was
/// authored that way or the style asks for it.
fn is_shown(authored_span: usize, visible_span: usize, always_show: bool) -> bool {
    visible_span > 1 || authored_span == visible_span || (visible_span == 1 && always_show)
}

fn total_width(column_widths: &[f32], bracket_distance: f32) -> f32 {
    column_widths.iter().map(|w| w + bracket_distance).sum()
}

/// Offsets every bracket left of `x` past the brackets of inner columns it
/// overlaps.
fn position_brackets(brackets: &mut [Bracket], x: f32, bracket_distance: f32) {
    let offsets: Vec<f32> = brackets
        .iter()
        .map(|outer| {
            brackets
                .iter()
                .filter(|inner| {
                    outer.column() > inner.column()
                        && (inner.contains_staff(outer.first_staff())
                            || inner.contains_staff(outer.last_staff()))
                })
                .map(|inner| inner.width() + bracket_distance)
                .sum()
        })
        .collect();

    for (bracket, offset) in brackets.iter_mut().zip(offsets) {
        let width = bracket.width();
        bracket.set_x(x - offset - width);
    }
}

/// Declarations of one staff that belong to `column` and are drawn
fn column_items(score: &Score, staff_idx: usize, column: usize) -> impl Iterator<Item = &BracketItem> {
    score
        .staff(staff_idx)
        .map(|s| s.brackets())
        .unwrap_or_default()
        .iter()
        .filter(move |b| b.column() == column && b.kind() != BracketKind::None)
}

impl System {
    /// Number of bracket columns declared on the staves of this system
    pub fn bracket_columns_count(&self, score: &Score) -> usize {
        (0..self.staves.len())
            .filter_map(|i| score.staff(i))
            .flat_map(|s| s.brackets())
            .map(|b| b.column() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Rebuilds the brackets at the start of the system and returns the
    /// total width they take.
    pub fn layout_brackets(&mut self, ctx: &LayoutContext<'_>) -> f32 {
        let score = ctx.score();
        let style = ctx.style();
        let columns = self.bracket_columns_count(score);
        let mut column_widths = vec![0.0f32; columns];
        let mut pool = std::mem::take(&mut self.brackets);

        for staff_idx in 0..self.staves.len() {
            for (column, column_width) in column_widths.iter_mut().enumerate() {
                for item in column_items(score, staff_idx, column) {
                    if let Some(width) = self.create_bracket(score, style, item, staff_idx, &mut pool, None) {
                        *column_width = column_width.max(width);
                    }
                }
            }
        }

        if !pool.is_empty() {
            trace!(dropped = pool.len(); "Dropped brackets without declaration");
        }

        if self.brackets.is_empty() {
            return 0.0;
        }
        total_width(&column_widths, style.bracket_distance())
    }

    /// Width the brackets would take if every staff were visible.
    ///
    /// The system is left untouched.
    pub fn total_bracket_offset(&self, ctx: &LayoutContext<'_>) -> f32 {
        let score = ctx.score();
        let style = ctx.style();
        let nstaves = self.staves.len();
        let mut column_widths = vec![0.0f32; self.bracket_columns_count(score)];
        let mut any = false;

        for staff_idx in 0..nstaves {
            for (column, column_width) in column_widths.iter_mut().enumerate() {
                for item in column_items(score, staff_idx, column) {
                    let Some((first, last)) = visible_range(item, staff_idx, nstaves, |_| true) else {
                        continue;
                    };
                    let always_show = style.always_show_brackets_when_empty_staves_are_hidden();
                    if is_shown(item.span(), last - first + 1, always_show) {
                        any = true;
                        *column_width = column_width.max(style.bracket_width(item.kind()));
                    }
                }
            }
        }

        if any {
            total_width(&column_widths, style.bracket_distance())
        } else {
            0.0
        }
    }

    /// Creates the bracket for a declaration if enough of its staves are
    /// visible, reusing a matching bracket from `pool`. Returns its width.
    fn create_bracket(
        &mut self,
        score: &Score,
        style: &StyleContext,
        item: &BracketItem,
        staff_idx: usize,
        pool: &mut Vec<Bracket>,
        measure: Option<Tick>,
    ) -> Option<f32> {
        let (first, last) = visible_range(item, staff_idx, self.staves.len(), |i| {
            self.is_staff_visible(score, i)
        })?;
        let always_show = style.always_show_brackets_when_empty_staves_are_hidden();
        if !is_shown(item.span(), last - first + 1, always_show) {
            trace!(staff_idx, first, last; "Bracket hidden by empty staves");
            return None;
        }

        let key = BracketKey {
            anchor_staff: staff_idx,
            column: item.column(),
            kind: item.kind(),
            measure,
        };
        let mut bracket = match pool.iter().position(|b| b.key() == key) {
            Some(index) => pool.remove(index),
            None => Bracket::new_generated(item, staff_idx, measure),
        };
        bracket.set_width(style.bracket_width(item.kind()));
        bracket.set_staff_span(first, last);

        let width = bracket.width();
        self.brackets.push(bracket);
        Some(width)
    }

    /// Places every bracket left of `x`, nesting outer columns outwards
    pub fn set_brackets_x_position(&mut self, x: f32, style: &StyleContext) {
        position_brackets(&mut self.brackets, x, style.bracket_distance());
    }

    /// Sets the vertical extent of every bracket from the stacked staves.
    ///
    /// The range is trimmed to visible staves again, since visibility may
    /// have changed after the brackets were created.
    pub fn layout_brackets_vertical(&mut self, ctx: &LayoutContext<'_>) {
        let score = ctx.score();
        let always_show = ctx.style().always_show_brackets_when_empty_staves_are_hidden();
        let last_staff = self.staves.len().saturating_sub(1);

        for index in 0..self.brackets.len() {
            let bracket = &self.brackets[index];
            let first = bracket.first_staff();
            let last = bracket.last_staff().min(last_staff);
            let visible = |i: usize| self.is_staff_visible(score, i);

            let range = (first..=last)
                .find(|&i| visible(i))
                .and_then(|f| (f..=last).rev().find(|&i| visible(i)).map(|l| (f, l)));
            let shown = match range {
                Some((f, l)) => always_show || f < l || (bracket.span() == 1 && f == l),
                None => false,
            };

            let (y, height) = match range {
                Some((f, l)) if shown => {
                    let top = self.staves[f].bbox().min_y();
                    (top, self.staves[l].bbox().max_y() - top)
                }
                _ => (0.0, 0.0),
            };
            self.brackets[index].set_vertical(shown, y, height);
        }
    }

    /// Adds brackets in front of a measure, typically one following a
    /// horizontal frame.
    pub fn add_brackets(&mut self, ctx: &LayoutContext<'_>, measure_index: usize) {
        if self.staves.is_empty() {
            return;
        }
        let Some((tick, x)) = self
            .measures
            .get(measure_index)
            .and_then(MeasureBase::as_measure)
            .map(|m| (m.tick(), m.x()))
        else {
            debug!(measure_index; "No measure to add brackets to");
            return;
        };

        let score = ctx.score();
        let style = ctx.style();
        let columns = self.bracket_columns_count(score);
        let mut pool = std::mem::take(&mut self.brackets);

        for staff_idx in 0..self.staves.len() {
            for column in 0..columns {
                for item in column_items(score, staff_idx, column) {
                    self.create_bracket(score, style, item, staff_idx, &mut pool, Some(tick));
                }
            }
        }

        position_brackets(&mut self.brackets, x, style.bracket_distance());
        self.brackets.append(&mut pool);
    }
}
