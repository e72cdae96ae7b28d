//! Engraving style values read by the system layout.
//!
//! [`StyleContext`] is passed explicitly into every layout entry point.
//! Distances are stored in spatium (the distance between two staff lines)
//! and the accessors return them in layout units, multiplied by
//! [`StyleContext::spatium`].
//!
//! Every field has a default, so a configuration file only needs to list
//! the values it changes:
//!
//! ```toml
//! spatium = 1.75
//! akkolade_distance = 6.5
//! always_show_brackets_when_empty_staves_are_hidden = true
//! ```

use serde::Deserialize;

use crate::score::BracketKind;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleContext {
    spatium: f32,

    min_vertical_distance: f32,
    staff_distance: f32,
    akkolade_distance: f32,
    min_staff_spread: f32,
    min_system_distance: f32,
    min_system_spread: f32,
    enable_vertical_spread: bool,

    bracket_distance: f32,
    bracket_width: f32,
    brace_width: f32,
    square_bracket_width: f32,
    line_bracket_width: f32,
    always_show_brackets_when_empty_staves_are_hidden: bool,

    instrument_name_offset: f32,
    show_instrument_names: bool,
    hide_instrument_name_if_one_instrument: bool,
    enable_indentation_on_first_system: bool,
    first_system_indentation: f32,
    align_system_to_margin: bool,

    /// Barline extent of a one-line staff, in half spaces
    single_line_barline_from: f32,
    single_line_barline_to: f32,

    /// Extra hit area above and below a staff for `y2staff`
    staff_hit_margin: f32,
}

impl Default for StyleContext {
    fn default() -> Self {
        Self {
            spatium: 1.75,
            min_vertical_distance: 0.5,
            staff_distance: 6.5,
            akkolade_distance: 6.5,
            min_staff_spread: 3.5,
            min_system_distance: 8.5,
            min_system_spread: 8.5,
            enable_vertical_spread: false,
            bracket_distance: 0.1,
            bracket_width: 0.45,
            brace_width: 1.6,
            square_bracket_width: 0.45,
            line_bracket_width: 0.4,
            always_show_brackets_when_empty_staves_are_hidden: false,
            instrument_name_offset: 1.0,
            show_instrument_names: true,
            hide_instrument_name_if_one_instrument: true,
            enable_indentation_on_first_system: false,
            first_system_indentation: 5.0,
            align_system_to_margin: true,
            single_line_barline_from: -4.0,
            single_line_barline_to: 4.0,
            staff_hit_margin: 2.0,
        }
    }
}

impl StyleContext {
    /// Size of one staff space in layout units
    pub fn spatium(&self) -> f32 {
        self.spatium
    }

    /// Clearance kept between skylines of adjacent staves
    pub fn min_vertical_distance(&self) -> f32 {
        self.min_vertical_distance * self.spatium
    }

    /// Distance between staves of different parts
    pub fn staff_distance(&self) -> f32 {
        if self.enable_vertical_spread {
            self.min_staff_spread * self.spatium
        } else {
            self.staff_distance * self.spatium
        }
    }

    /// Distance between staves of the same part
    pub fn akkolade_distance(&self) -> f32 {
        if self.enable_vertical_spread {
            self.min_staff_spread * self.spatium
        } else {
            self.akkolade_distance * self.spatium
        }
    }

    /// Minimum distance between two systems
    pub fn min_system_distance(&self) -> f32 {
        if self.enable_vertical_spread {
            self.min_system_spread * self.spatium
        } else {
            self.min_system_distance * self.spatium
        }
    }

    pub fn enable_vertical_spread(&self) -> bool {
        self.enable_vertical_spread
    }

    /// Horizontal gap between nested bracket columns
    pub fn bracket_distance(&self) -> f32 {
        self.bracket_distance * self.spatium
    }

    /// Drawn width of a bracket of the given kind
    pub fn bracket_width(&self, kind: BracketKind) -> f32 {
        let width = match kind {
            BracketKind::Normal => self.bracket_width,
            BracketKind::Brace => self.brace_width,
            BracketKind::Square => self.square_bracket_width,
            BracketKind::Line => self.line_bracket_width,
            BracketKind::None => 0.0,
        };
        width * self.spatium
    }

    pub fn always_show_brackets_when_empty_staves_are_hidden(&self) -> bool {
        self.always_show_brackets_when_empty_staves_are_hidden
    }

    /// Gap between the instrument names and the brackets
    pub fn instrument_name_offset(&self) -> f32 {
        self.instrument_name_offset * self.spatium
    }

    pub fn show_instrument_names(&self) -> bool {
        self.show_instrument_names
    }

    pub fn hide_instrument_name_if_one_instrument(&self) -> bool {
        self.hide_instrument_name_if_one_instrument
    }

    /// Indentation of the first system, if enabled
    pub fn first_system_indentation(&self) -> Option<f32> {
        self.enable_indentation_on_first_system
            .then_some(self.first_system_indentation * self.spatium)
    }

    pub fn align_system_to_margin(&self) -> bool {
        self.align_system_to_margin
    }

    /// Offset from the staff origin to the top of a one-line staff's box
    pub fn single_line_y_offset(&self) -> f32 {
        self.spatium * self.single_line_barline_to * 0.5
    }

    /// Height of a one-line staff's box
    pub fn single_line_height(&self) -> f32 {
        self.spatium * (self.single_line_barline_to - self.single_line_barline_from) * 0.5
    }

    pub fn staff_hit_margin(&self) -> f32 {
        self.staff_hit_margin * self.spatium
    }

    pub fn with_spatium(mut self, spatium: f32) -> Self {
        self.spatium = spatium;
        self
    }

    pub fn with_min_vertical_distance(mut self, value: f32) -> Self {
        self.min_vertical_distance = value;
        self
    }

    pub fn with_staff_distance(mut self, value: f32) -> Self {
        self.staff_distance = value;
        self
    }

    pub fn with_akkolade_distance(mut self, value: f32) -> Self {
        self.akkolade_distance = value;
        self
    }

    pub fn with_min_staff_spread(mut self, value: f32) -> Self {
        self.min_staff_spread = value;
        self
    }

    pub fn with_min_system_distance(mut self, value: f32) -> Self {
        self.min_system_distance = value;
        self
    }

    pub fn with_min_system_spread(mut self, value: f32) -> Self {
        self.min_system_spread = value;
        self
    }

    pub fn with_vertical_spread(mut self, enabled: bool) -> Self {
        self.enable_vertical_spread = enabled;
        self
    }

    pub fn with_bracket_distance(mut self, value: f32) -> Self {
        self.bracket_distance = value;
        self
    }

    pub fn with_bracket_widths(mut self, normal: f32, brace: f32, square: f32, line: f32) -> Self {
        self.bracket_width = normal;
        self.brace_width = brace;
        self.square_bracket_width = square;
        self.line_bracket_width = line;
        self
    }

    pub fn with_always_show_brackets(mut self, enabled: bool) -> Self {
        self.always_show_brackets_when_empty_staves_are_hidden = enabled;
        self
    }

    pub fn with_instrument_name_offset(mut self, value: f32) -> Self {
        self.instrument_name_offset = value;
        self
    }

    pub fn with_show_instrument_names(mut self, enabled: bool) -> Self {
        self.show_instrument_names = enabled;
        self
    }

    pub fn with_hide_instrument_name_if_one_instrument(mut self, enabled: bool) -> Self {
        self.hide_instrument_name_if_one_instrument = enabled;
        self
    }

    pub fn with_first_system_indentation(mut self, indentation: Option<f32>) -> Self {
        self.enable_indentation_on_first_system = indentation.is_some();
        if let Some(value) = indentation {
            self.first_system_indentation = value;
        }
        self
    }

    pub fn with_align_system_to_margin(mut self, enabled: bool) -> Self {
        self.align_system_to_margin = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_distances_scale_with_spatium() {
        let style = StyleContext::default()
            .with_spatium(2.0)
            .with_akkolade_distance(6.0)
            .with_staff_distance(7.0)
            .with_min_vertical_distance(0.5);

        assert_approx_eq!(f32, style.akkolade_distance(), 12.0);
        assert_approx_eq!(f32, style.staff_distance(), 14.0);
        assert_approx_eq!(f32, style.min_vertical_distance(), 1.0);
    }

    #[test]
    fn test_vertical_spread_variants() {
        let style = StyleContext::default()
            .with_spatium(1.0)
            .with_min_staff_spread(3.0)
            .with_min_system_spread(11.0)
            .with_vertical_spread(true);

        assert_approx_eq!(f32, style.akkolade_distance(), 3.0);
        assert_approx_eq!(f32, style.staff_distance(), 3.0);
        assert_approx_eq!(f32, style.min_system_distance(), 11.0);
    }

    #[test]
    fn test_single_line_staff_box() {
        let style = StyleContext::default().with_spatium(1.5);

        assert_approx_eq!(f32, style.single_line_y_offset(), 3.0);
        assert_approx_eq!(f32, style.single_line_height(), 6.0);
    }

    #[test]
    fn test_first_system_indentation() {
        let style = StyleContext::default().with_spatium(1.0);
        assert_eq!(style.first_system_indentation(), None);

        let indented = style.with_first_system_indentation(Some(4.0));
        assert_eq!(indented.first_system_indentation(), Some(4.0));
    }

    #[test]
    fn test_bracket_widths() {
        let style = StyleContext::default()
            .with_spatium(1.0)
            .with_bracket_widths(1.0, 2.0, 3.0, 4.0);

        assert_eq!(style.bracket_width(BracketKind::Normal), 1.0);
        assert_eq!(style.bracket_width(BracketKind::Brace), 2.0);
        assert_eq!(style.bracket_width(BracketKind::Square), 3.0);
        assert_eq!(style.bracket_width(BracketKind::Line), 4.0);
        assert_eq!(style.bracket_width(BracketKind::None), 0.0);
    }
}
