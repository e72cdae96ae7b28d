//! Engrave - System layout for music notation.
//!
//! Arranges the staves of each line of a score ("system"): brackets and
//! instrument names along the horizontal axis, collision-free stacking of
//! the staves along the vertical axis, and the minimum distance between
//! consecutive systems used to place them on pages.
//!
//! The passes are methods of [`system::System`]; [`SystemLayouter`] runs
//! them in order over a whole [`document::ScoreDocument`].

pub mod arena;
pub mod config;
pub mod document;
pub mod layout;
pub mod system;

mod error;

pub use engrave_core::{geometry, identifier, measure, score, skyline, spanner, style};

pub use error::EngraveError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use engrave_core::{measure::MeasureBase, skyline::LayoutEpoch};

use arena::SystemArena;
use config::AppConfig;
use document::ScoreDocument;
use layout::{LayoutContext, TextMeasure};
use system::NameKind;

/// Runs the system layout over a score document.
///
/// # Examples
///
/// ```rust,no_run
/// use engrave::{SystemLayouter, config::AppConfig};
///
/// let source = r#"
/// [[score.parts]]
/// id = "flute"
/// staves = [{}]
///
/// [[systems]]
/// measures = [{ type = "measure", tick = 0, ticks = 1920, width = 60.0 }]
/// "#;
///
/// let layouter = SystemLayouter::new(AppConfig::default());
///
/// // Parse source to a score document
/// let document = layouter.parse(source)
///     .expect("Failed to parse");
///
/// // Lay out every system and place them on pages
/// let systems = layouter.layout(&document)
///     .expect("Failed to lay out");
///
/// // Or use default config
/// let layouter = SystemLayouter::default();
/// ```
#[derive(Debug, Default)]
pub struct SystemLayouter {
    config: AppConfig,
}

impl SystemLayouter {
    /// Create a new layouter with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a TOML score document and check its staff references.
    ///
    /// # Errors
    ///
    /// Returns [`EngraveError::Parse`] for malformed documents or invalid
    /// scores and [`EngraveError::Layout`] for dangling staff references.
    pub fn parse(&self, source: &str) -> Result<ScoreDocument, EngraveError> {
        info!("Parsing score document");

        let document: ScoreDocument =
            toml::from_str(source).map_err(|err| EngraveError::new_parse_error(err, source))?;
        document.validate()?;

        debug!(
            parts = document.score().parts().len(),
            staves = document.score().nstaves(),
            systems = document.systems().len();
            "Score document parsed successfully"
        );
        trace!(document:?; "Parsed document");

        Ok(document)
    }

    /// Read and parse a score document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`EngraveError::Io`] if the file cannot be read, otherwise
    /// the errors of [`SystemLayouter::parse`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ScoreDocument, EngraveError> {
        let source = fs::read_to_string(path)?;
        self.parse(&source)
    }

    /// Lay out every system of a document using estimated text widths.
    ///
    /// # Errors
    ///
    /// Returns [`EngraveError::Layout`] if the document fails validation.
    pub fn layout(&self, document: &ScoreDocument) -> Result<SystemArena, EngraveError> {
        let text = layout::EstimatedTextMeasure::default();
        self.layout_with_text(document, &text)
    }

    /// Lay out every system of a document and stack them on pages.
    ///
    /// Systems go through the horizontal pass, then the vertical pass.
    /// The first staff system shows long instrument names and the others
    /// short ones.
    ///
    /// # Errors
    ///
    /// Returns [`EngraveError::Layout`] if the document fails validation.
    pub fn layout_with_text(
        &self,
        document: &ScoreDocument,
        text: &dyn TextMeasure,
    ) -> Result<SystemArena, EngraveError> {
        document.validate()?;

        let score = document.score();
        let layout_config = self.config.layout();
        let page = layout_config.page();
        let ctx = LayoutContext::new(score, self.config.style())
            .with_spanners(document.spanners())
            .with_text_measure(text)
            .with_line_mode(layout_config.line_mode(), LayoutEpoch::default());

        info!(systems = document.systems().len(); "Laying out systems");
        let mut arena = SystemArena::new();
        let mut first_staff_system = true;

        for definition in document.systems() {
            let id = arena.create(score.nstaves());
            let system = arena
                .get_mut(id)
                .ok_or_else(|| EngraveError::Layout(format!("{id} missing after creation")))?;

            system.set_width(definition.width().unwrap_or_else(|| page.content_width()));
            for measure in definition.measures() {
                system.append_measure(measure.clone());
            }
            for &staff_idx in definition.hidden_staves() {
                if let Some(staff) = system.staff_mut(staff_idx) {
                    staff.set_show(false);
                }
            }
            for shape in definition.shapes() {
                if let Some(staff) = system.staff_mut(shape.staff()) {
                    staff.skyline_mut().add(shape.bounds());
                }
            }

            if !definition.is_frame() {
                let kind = if first_staff_system {
                    NameKind::Long
                } else {
                    NameKind::Short
                };
                system.set_instrument_names(&ctx, kind);
                system.layout_system(&ctx, 0.0, first_staff_system);

                let measures = definition.measures();
                for (index, pair) in measures.windows(2).enumerate() {
                    if matches!(pair, [MeasureBase::HBox(_), MeasureBase::Measure(_)]) {
                        system.add_brackets(&ctx, index + 1);
                    }
                }
                first_staff_system = false;
            }

            system.layout2(&ctx);
            debug!(system:% = id, height = system.height(), left_margin = system.left_margin(); "System laid out");
        }

        let pages = arena.stack(&ctx, page);
        info!(systems = arena.len(), pages; "Layout complete");
        Ok(arena)
    }
}
