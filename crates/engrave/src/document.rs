//! The score document read by [`SystemLayouter`](crate::SystemLayouter).
//!
//! A document carries the score, its spanners and the result of line
//! breaking: the measures of every system, the staves hidden in it and the
//! shapes engraved on each staff, which feed the skylines.
//!
//! ```toml
//! [[score.parts]]
//! id = "piano"
//! long_names = [{ text = "Piano" }]
//! staves = [{ brackets = [{ kind = "brace", span = 2 }] }, {}]
//!
//! [[systems]]
//! measures = [{ type = "measure", tick = 0, ticks = 1920, width = 60.0 }]
//! shapes = [{ staff = 0, x = 0.0, y = -3.0, width = 10.0, height = 3.0 }]
//! ```

use serde::Deserialize;

use engrave_core::{
    geometry::Bounds,
    measure::MeasureBase,
    score::Score,
    spanner::Spanner,
};

use crate::error::EngraveError;

/// A rectangle engraved on a staff, in staff coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StaffShape {
    staff: usize,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl StaffShape {
    pub fn new(staff: usize, bounds: Bounds) -> Self {
        Self {
            staff,
            x: bounds.min_x(),
            y: bounds.min_y(),
            width: bounds.width(),
            height: bounds.height(),
        }
    }

    pub fn staff(&self) -> usize {
        self.staff
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(self.x, self.y, self.width, self.height)
    }
}

/// One line of the score as decided by line breaking.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemDefinition {
    #[serde(default)]
    measures: Vec<MeasureBase>,
    #[serde(default)]
    hidden_staves: Vec<usize>,
    #[serde(default)]
    shapes: Vec<StaffShape>,
    /// Overrides the page content width
    #[serde(default)]
    width: Option<f32>,
}

impl SystemDefinition {
    pub fn new(measures: Vec<MeasureBase>) -> Self {
        Self {
            measures,
            ..Self::default()
        }
    }

    pub fn with_hidden_staff(mut self, staff_idx: usize) -> Self {
        self.hidden_staves.push(staff_idx);
        self
    }

    pub fn with_shape(mut self, shape: StaffShape) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn measures(&self) -> &[MeasureBase] {
        &self.measures
    }

    pub fn hidden_staves(&self) -> &[usize] {
        &self.hidden_staves
    }

    pub fn shapes(&self) -> &[StaffShape] {
        &self.shapes
    }

    pub fn width(&self) -> Option<f32> {
        self.width
    }

    /// Returns true for a system made of a vertical or text frame
    pub fn is_frame(&self) -> bool {
        self.measures
            .first()
            .is_some_and(|m| m.as_vertical_frame().is_some())
    }
}

/// The complete input of a layout run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoreDocument {
    score: Score,
    #[serde(default)]
    spanners: Vec<Spanner>,
    #[serde(default)]
    systems: Vec<SystemDefinition>,
}

impl ScoreDocument {
    pub fn new(score: Score) -> Self {
        Self {
            score,
            spanners: Vec::new(),
            systems: Vec::new(),
        }
    }

    pub fn with_spanner(mut self, spanner: Spanner) -> Self {
        self.spanners.push(spanner);
        self
    }

    pub fn with_system(mut self, system: SystemDefinition) -> Self {
        self.systems.push(system);
        self
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn spanners(&self) -> &[Spanner] {
        &self.spanners
    }

    pub fn systems(&self) -> &[SystemDefinition] {
        &self.systems
    }

    /// Checks every staff reference against the score.
    ///
    /// # Errors
    ///
    /// Returns [`EngraveError::Layout`] for a staff index outside the score
    /// or a vertical frame that is not the first segment of its system.
    pub fn validate(&self) -> Result<(), EngraveError> {
        let nstaves = self.score.nstaves();
        let check = |what: &str, staff_idx: usize| {
            if staff_idx < nstaves {
                Ok(())
            } else {
                Err(EngraveError::Layout(format!(
                    "{what} refers to staff {staff_idx}, the score has {nstaves}"
                )))
            }
        };

        for (system_idx, system) in self.systems.iter().enumerate() {
            for &staff_idx in &system.hidden_staves {
                check(&format!("hidden staff of system {system_idx}"), staff_idx)?;
            }
            for shape in &system.shapes {
                check(&format!("shape of system {system_idx}"), shape.staff)?;
            }
            if system
                .measures
                .iter()
                .skip(1)
                .any(|m| m.as_vertical_frame().is_some())
            {
                return Err(EngraveError::Layout(format!(
                    "system {system_idx} has a vertical frame after its first segment"
                )));
            }
        }

        for spanner in &self.spanners {
            let what = format!("spanner `{}`", spanner.id());
            check(&what, spanner.staff())?;
            for staff_idx in [spanner.start_staff(), spanner.end_staff()].into_iter().flatten() {
                check(&what, staff_idx)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use engrave_core::{
        measure::{Frame, Measure},
        score::{Part, Staff},
        spanner::SpannerKind,
    };

    use super::*;

    fn score() -> Score {
        Score::new(vec![Part::new("violin", vec![Staff::new(5), Staff::new(5)])]).unwrap()
    }

    #[test]
    fn test_deserialize_document() {
        let document: ScoreDocument = toml::from_str(
            r#"
            [[score.parts]]
            id = "piano"
            staves = [{ brackets = [{ kind = "brace", span = 2 }] }, { lines = 1 }]

            [[spanners]]
            id = "s1"
            kind = "slur"
            tick = 0
            tick2 = 960
            staff = 0
            end_staff = 1

            [[systems]]
            hidden_staves = [1]
            measures = [
                { type = "h_box", width = 10.0 },
                { type = "measure", tick = 0, ticks = 1920, x = 10.0, width = 60.0 },
            ]
            shapes = [{ staff = 0, x = 0.0, y = -3.0, width = 10.0, height = 3.0 }]

            [[systems]]
            measures = [{ type = "v_box", height = 30.0 }]
            "#,
        )
        .unwrap();

        assert_eq!(document.score().nstaves(), 2);
        assert_eq!(document.spanners().len(), 1);
        assert_eq!(document.spanners()[0].kind(), SpannerKind::Slur);
        let first = &document.systems()[0];
        assert_eq!(first.hidden_staves(), [1]);
        assert_eq!(first.measures().len(), 2);
        assert_eq!(first.shapes()[0].bounds(), Bounds::from_rect(0.0, -3.0, 10.0, 3.0));
        assert!(!first.is_frame());
        assert!(document.systems()[1].is_frame());
        assert!(document.validate().is_ok());
    }

    #[test]
    fn test_invalid_score_is_a_parse_error() {
        let result = toml::from_str::<ScoreDocument>(
            r#"
            [[score.parts]]
            id = "empty"
            staves = []
            "#,
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("has no staves"));
    }

    #[test]
    fn test_validate_staff_references() {
        let document = ScoreDocument::new(score())
            .with_system(SystemDefinition::new(vec![]).with_hidden_staff(2));
        let err = document.validate().unwrap_err();
        assert!(err.to_string().contains("refers to staff 2"));

        let shape = StaffShape::new(5, Bounds::from_rect(0.0, 0.0, 1.0, 1.0));
        let document = ScoreDocument::new(score()).with_system(SystemDefinition::new(vec![]).with_shape(shape));
        assert!(document.validate().is_err());

        let document = ScoreDocument::new(score())
            .with_spanner(Spanner::new("slur", SpannerKind::Slur, 0, 10, 0).with_endpoints(0, 4));
        assert!(document.validate().is_err());
    }

    #[test]
    fn test_validate_frame_position() {
        let measures = vec![
            MeasureBase::Measure(Measure::new(0, 1920, 0.0, 50.0)),
            MeasureBase::VBox(Frame::new(100.0, 20.0)),
        ];
        let document = ScoreDocument::new(score()).with_system(SystemDefinition::new(measures));

        assert!(matches!(document.validate(), Err(EngraveError::Layout(_))));
    }
}
