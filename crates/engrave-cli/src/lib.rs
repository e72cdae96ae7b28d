//! CLI logic for the Engrave system layout tool.
//!
//! Reads a score document, lays out its systems and writes the resulting
//! geometry as a TOML report.

pub mod error_adapter;
pub mod report;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use engrave::{EngraveError, SystemLayouter};

use report::LayoutReport;

/// Run the Engrave CLI application
///
/// This function processes the input file through the layout pipeline
/// and writes the layout report to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `EngraveError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Invalid staff references in the document
pub fn run(args: &Args) -> Result<(), EngraveError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing score"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let layouter = SystemLayouter::new(app_config);
    let document = layouter.parse_file(&args.input)?;
    let systems = layouter.layout(&document)?;

    let report = LayoutReport::new(&systems, layouter.config().layout().page());
    fs::write(&args.output, report.to_toml()?)?;

    info!(output_file = args.output, systems = systems.len(); "Layout report written");

    Ok(())
}
