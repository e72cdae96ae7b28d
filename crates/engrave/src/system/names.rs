//! Instrument names at the start of a system.

use log::{debug, trace};

use engrave_core::score::NamePosition;

use super::{InstrumentName, NameKind, System};
use crate::layout::LayoutContext;

impl System {
    /// Rebuilds the instrument names from the parts' long or short names.
    ///
    /// Names are attached to the top staff of every part shown in the
    /// score. Existing names are reused by position so user settings such
    /// as alignment and offset survive; surplus names are removed.
    pub fn set_instrument_names(&mut self, ctx: &LayoutContext<'_>, kind: NameKind) {
        let score = ctx.score();
        let style = ctx.style();

        let hide_all = !style.show_instrument_names()
            || (style.hide_instrument_name_if_one_instrument() && score.parts().len() == 1);
        if hide_all {
            trace!(system:? = self.id; "Instrument names disabled");
            for staff in &mut self.staves {
                staff.instrument_names_mut().clear();
            }
            return;
        }

        for (staff_idx, staff) in self.staves.iter_mut().enumerate() {
            let names = staff.instrument_names_mut();
            let shown = score.staff(staff_idx).is_some_and(|s| s.show());
            let Some(part) = score.part_of_staff(staff_idx).filter(|_| shown && score.is_top_staff(staff_idx)) else {
                names.clear();
                continue;
            };

            let declared = match kind {
                NameKind::Long => part.long_names(),
                NameKind::Short => part.short_names(),
            };
            for (index, declared_name) in declared.iter().enumerate() {
                match names.get_mut(index) {
                    Some(name) => {
                        name.set_text(declared_name.text());
                        name.set_kind(kind);
                        name.set_layout_pos(declared_name.pos());
                    }
                    None => {
                        let id = InstrumentName::generated_id(part.id(), kind, index);
                        names.push(
                            InstrumentName::new(id, declared_name.text(), kind, staff_idx)
                                .with_layout_pos(declared_name.pos()),
                        );
                    }
                }
            }
            names.truncate(declared.len());
        }
    }

    /// Centers every instrument name vertically on the staves selected by
    /// its layout position.
    ///
    /// Names of a part whose top staff is hidden move to the part's first
    /// visible staff. Must run after the vertical pass.
    pub fn layout_instrument_names(&mut self, ctx: &LayoutContext<'_>) {
        let score = ctx.score();

        for part_idx in 0..score.parts().len() {
            let (Some(first), Some(last)) = (score.first_staff_of_part(part_idx), score.last_staff_of_part(part_idx))
            else {
                continue;
            };
            if first >= self.staves.len() {
                continue;
            }
            let last = last.min(self.staves.len() - 1);

            let Some(holder) = (first..=last).find(|&i| self.is_staff_visible(score, i)) else {
                trace!(part_idx; "No visible staff for instrument names");
                continue;
            };
            if holder != first {
                let mut moved = std::mem::take(self.staves[first].instrument_names_mut());
                if !moved.is_empty() {
                    debug!(part_idx, from = first, to = holder; "Instrument names moved to first visible staff");
                }
                let names = self.staves[holder].instrument_names_mut();
                moved.append(names);
                *names = moved;
            }

            let visible = |i: usize| self.is_staff_visible(score, i);
            let last_visible = (holder..=last).rev().find(|&i| visible(i)).unwrap_or(holder);
            // The part's n-th staff if shown, else the staff holding the names.
            let nth = |n: usize| Some(first + n).filter(|&i| i <= last && visible(i)).unwrap_or(holder);

            let boxes: Vec<(f32, f32)> = self.staves[holder]
                .instrument_names()
                .iter()
                .map(|name| {
                    let (top, bottom) = match name.layout_pos() {
                        NamePosition::WholePart => (holder, last_visible),
                        NamePosition::FirstStaff => (holder, holder),
                        NamePosition::FirstToSecond => (holder, nth(1)),
                        NamePosition::SecondStaff => (nth(1), nth(1)),
                        NamePosition::SecondToThird => (nth(1), nth(2)),
                        NamePosition::ThirdStaff => (nth(2), nth(2)),
                    };
                    (self.staves[top].bbox().min_y(), self.staves[bottom].bbox().max_y())
                })
                .collect();
            for (name, (y1, y2)) in self.staves[holder].instrument_names_mut().iter_mut().zip(boxes) {
                name.set_staff_idx(holder);
                name.set_y(y1 + (y2 - y1) * 0.5 + name.offset());
            }
        }
    }
}
