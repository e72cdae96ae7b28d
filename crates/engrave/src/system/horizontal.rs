use log::{debug, trace};

use engrave_core::geometry::Bounds;

use super::{HorizontalAlign, System};
use crate::layout::LayoutContext;

impl System {
    /// Widest instrument name plus the name offset.
    ///
    /// Measures every name at left alignment and stores its natural width.
    pub fn system_names_width(&mut self, ctx: &LayoutContext<'_>) -> f32 {
        let offset = ctx.style().instrument_name_offset();
        let mut names_width = 0.0f32;
        for staff in &mut self.staves {
            for name in staff.instrument_names_mut() {
                let width = ctx.text().width(name.text());
                name.set_width(width);
                names_width = names_width.max(width + offset);
            }
        }
        names_width
    }

    /// Horizontal pass.
    ///
    /// Computes the left margin from the instrument names and brackets,
    /// gives every visible staff its provisional box at `x_origin` plus the
    /// margin, and places brackets and instrument names horizontally.
    /// Systems without staves (frame systems) are left alone.
    pub fn layout_system(&mut self, ctx: &LayoutContext<'_>, x_origin: f32, is_first_system: bool) {
        if self.staves.is_empty() {
            return;
        }
        let style = ctx.style();
        let name_offset = style.instrument_name_offset();

        let mut names_width = self.system_names_width(ctx);
        if is_first_system {
            if let Some(indentation) = style.first_system_indentation() {
                names_width = names_width.max(indentation);
            }
        }

        let max_brackets_width = self.total_bracket_offset(ctx);
        let brackets_width = self.layout_brackets(ctx);
        let bracket_width_difference = max_brackets_width - brackets_width;
        self.left_margin = if names_width == 0.0 {
            if style.align_system_to_margin() {
                bracket_width_difference
            } else {
                max_brackets_width
            }
        } else {
            names_width + bracket_width_difference + name_offset
        };
        debug!(
            system:? = self.id,
            names_width,
            brackets_width,
            left_margin = self.left_margin;
            "System margin computed"
        );

        let spatium = ctx.spatium();
        let x = self.left_margin + x_origin;
        for staff_idx in 0..self.staves.len() {
            let score_staff = ctx.score().staff(staff_idx);
            let bbox = match score_staff {
                Some(staff) if staff.show() && self.staves[staff_idx].show() => {
                    if staff.lines() <= 1 {
                        let half = staff.line_distance() * staff.mag() * spatium;
                        Bounds::from_rect(x, -half, 0.0, 2.0 * half)
                    } else {
                        Bounds::from_rect(x, 0.0, 0.0, staff.height(spatium))
                    }
                }
                _ => Bounds::default(),
            };
            self.staves[staff_idx].set_bbox(bbox);
        }

        self.set_brackets_x_position(x, style);

        // Visibility of the staves is not final yet, so every name is placed.
        for staff in &mut self.staves {
            for name in staff.instrument_names_mut() {
                let width = name.width();
                let name_x = match name.align() {
                    HorizontalAlign::Left => -brackets_width,
                    HorizontalAlign::Center => (names_width - width) / 2.0 - brackets_width,
                    HorizontalAlign::Right => names_width - width - brackets_width,
                };
                trace!(name:% = name.id(), name_x; "Instrument name placed");
                name.set_x(name_x);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use engrave_core::{
        identifier::Id,
        score::{BracketItem, BracketKind, Part, Score, Staff},
        style::StyleContext,
    };
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::{
        arena::SystemId,
        layout::EstimatedTextMeasure,
        system::{InstrumentName, NameKind, SystemElement},
    };

    fn style() -> StyleContext {
        StyleContext::default()
            .with_spatium(1.0)
            .with_bracket_widths(1.0, 2.0, 1.0, 0.5)
            .with_bracket_distance(0.5)
            .with_instrument_name_offset(1.0)
    }

    fn piano() -> Score {
        Score::new(vec![Part::new(
            "piano",
            vec![
                Staff::new(5).with_bracket(BracketItem::new(BracketKind::Brace, 2, 0)),
                Staff::new(1),
            ],
        )])
        .unwrap()
    }

    fn name(text: &str, align: HorizontalAlign) -> SystemElement {
        SystemElement::InstrumentName(
            InstrumentName::new(Id::new(text), text, NameKind::Long, 0).with_align(align),
        )
    }

    #[test]
    fn test_left_margin_with_names() {
        let (score, style) = (piano(), style());
        let text = EstimatedTextMeasure::new(2.0);
        let ctx = LayoutContext::new(&score, &style).with_text_measure(&text);
        let mut system = System::new(SystemId::new(0), 2);
        system.add(name("Piano", HorizontalAlign::Right));
        system.add(name("Pno", HorizontalAlign::Center));
        system.add(name("P", HorizontalAlign::Left));

        system.layout_system(&ctx, 0.0, false);

        // Widest name is 10 wide, plus offset 1; brace is 2 + 0.5.
        assert_approx_eq!(f32, system.left_margin(), 12.0);
        let names = system.staff(0).unwrap().instrument_names();
        assert_approx_eq!(f32, names[0].pos().x(), 11.0 - 10.0 - 2.5);
        assert_approx_eq!(f32, names[1].pos().x(), (11.0 - 6.0) / 2.0 - 2.5);
        assert_approx_eq!(f32, names[2].pos().x(), -2.5);
    }

    #[test]
    fn test_staff_boxes() {
        let (score, style) = (piano(), style());
        let ctx = LayoutContext::new(&score, &style);
        let mut system = System::new(SystemId::new(0), 2);

        system.layout_system(&ctx, 5.0, false);

        let upper = system.staff(0).unwrap().bbox();
        assert_approx_eq!(f32, upper.min_x(), system.left_margin() + 5.0);
        assert_approx_eq!(f32, upper.height(), 4.0);
        let single = system.staff(1).unwrap().bbox();
        assert_approx_eq!(f32, single.min_y(), -1.0);
        assert_approx_eq!(f32, single.height(), 2.0);

        let brace = &system.brackets()[0];
        assert_approx_eq!(f32, brace.x(), system.left_margin() + 5.0 - 2.0);
    }

    #[test]
    fn test_margin_without_names() {
        let (score, style) = (piano(), style());
        let ctx = LayoutContext::new(&score, &style);
        let mut system = System::new(SystemId::new(0), 2);
        system.staff_mut(1).unwrap().set_show(false);

        system.layout_system(&ctx, 0.0, false);
        // Brace hidden: the margin keeps room for it so staves stay aligned.
        assert_approx_eq!(f32, system.left_margin(), 2.5);
        assert!(system.staff(1).unwrap().bbox().is_empty());

        let unaligned = style.clone().with_align_system_to_margin(false);
        let ctx = LayoutContext::new(&score, &unaligned);
        system.staff_mut(1).unwrap().set_show(true);
        system.layout_system(&ctx, 0.0, false);
        assert_approx_eq!(f32, system.left_margin(), 2.5);

        let ctx = LayoutContext::new(&score, &style);
        system.layout_system(&ctx, 0.0, false);
        assert_approx_eq!(f32, system.left_margin(), 0.0);
    }

    #[test]
    fn test_first_system_indentation() {
        let score = Score::new(vec![Part::new("flute", vec![Staff::new(5)])]).unwrap();
        let style = style().with_first_system_indentation(Some(8.0));
        let ctx = LayoutContext::new(&score, &style);
        let mut system = System::new(SystemId::new(0), 1);

        system.layout_system(&ctx, 0.0, true);
        assert_approx_eq!(f32, system.left_margin(), 9.0);

        system.layout_system(&ctx, 0.0, false);
        assert_approx_eq!(f32, system.left_margin(), 0.0);
    }
}
