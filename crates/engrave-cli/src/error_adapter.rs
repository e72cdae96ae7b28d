//! miette rendering of [`EngraveError`].
//!
//! TOML errors in score documents and configuration files are drawn against
//! their source text with the offending span labelled; every other error is
//! shown as a code, a message and, where useful, a hint.

use std::fmt;

use miette::{Diagnostic, GraphicalReportHandler, LabeledSpan, SourceSpan};

use engrave::EngraveError;

/// Diagnostic view of an [`EngraveError`].
pub struct ErrorReport<'a>(pub &'a EngraveError);

impl fmt::Debug for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            // miette draws the snippet itself.
            EngraveError::Parse { err, .. } => f.write_str(err.message()),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl std::error::Error for ErrorReport<'_> {}

impl Diagnostic for ErrorReport<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            EngraveError::Io(_) => "engrave::io",
            EngraveError::Parse { .. } => "engrave::parse",
            EngraveError::Layout(_) => "engrave::layout",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self.0 {
            EngraveError::Layout(_) => Some(Box::new(
                "staff indices count from 0 across all parts of the score",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self.0 {
            EngraveError::Parse { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let EngraveError::Parse { err, .. } = self.0 else {
            return None;
        };
        let span = err.span()?;
        let span = SourceSpan::new(span.start.into(), span.len());
        let label = LabeledSpan::new_primary_with_span(Some("here".to_string()), span);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Renders an error for the terminal, falling back to its plain message
/// when the graphical report cannot be written.
pub fn render(err: &EngraveError) -> String {
    let report = ErrorReport(err);
    let mut out = String::new();
    if GraphicalReportHandler::new()
        .render_report(&mut out, &report)
        .is_err()
    {
        return report.to_string();
    }
    out
}
