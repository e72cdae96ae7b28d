//! Configuration types for the Engrave system layout.
//!
//! This module provides configuration structures that control how systems
//! are laid out and placed on pages. All types implement
//! [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - View mode and page geometry.
//! - [`PageConfig`] - Page size, margins and the gap between pages on the canvas.
//!
//! Style values live in [`StyleContext`] and are read from the `[style]`
//! section.
//!
//! # Example
//!
//! ```
//! # use engrave::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [layout.page]
//!     height = 250.0
//!
//!     [style]
//!     spatium = 2.0
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.layout().page().height(), 250.0);
//! assert_eq!(config.layout().page().width(), 210.0);
//! assert_eq!(config.style().spatium(), 2.0);
//! ```

use serde::Deserialize;

use engrave_core::style::StyleContext;

/// Top-level configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Engraving style section.
    #[serde(default)]
    style: StyleContext,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style.
    pub fn new(layout: LayoutConfig, style: StyleContext) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the engraving style.
    pub fn style(&self) -> &StyleContext {
        &self.style
    }
}

/// View mode and page geometry.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Continuous view: staff distances are cached across partial layouts.
    #[serde(default)]
    line_mode: bool,

    /// Page geometry section.
    #[serde(default)]
    page: PageConfig,
}

impl LayoutConfig {
    pub fn new(line_mode: bool, page: PageConfig) -> Self {
        Self { line_mode, page }
    }

    /// Returns true when systems are laid out in continuous view.
    pub fn line_mode(&self) -> bool {
        self.line_mode
    }

    /// Returns the page geometry.
    pub fn page(&self) -> &PageConfig {
        &self.page
    }
}

/// Page size and margins, in layout units.
///
/// Pages are placed one below the other on the canvas, `page_gap` apart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    width: f32,
    height: f32,
    left_margin: f32,
    right_margin: f32,
    top_margin: f32,
    bottom_margin: f32,
    page_gap: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            left_margin: 15.0,
            right_margin: 15.0,
            top_margin: 15.0,
            bottom_margin: 15.0,
            page_gap: 10.0,
        }
    }
}

impl PageConfig {
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn left_margin(&self) -> f32 {
        self.left_margin
    }

    pub fn right_margin(&self) -> f32 {
        self.right_margin
    }

    pub fn top_margin(&self) -> f32 {
        self.top_margin
    }

    pub fn bottom_margin(&self) -> f32 {
        self.bottom_margin
    }

    pub fn page_gap(&self) -> f32 {
        self.page_gap
    }

    /// Width available to a system between the side margins
    pub fn content_width(&self) -> f32 {
        (self.width - self.left_margin - self.right_margin).max(0.0)
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn with_margins(mut self, left: f32, right: f32, top: f32, bottom: f32) -> Self {
        self.left_margin = left;
        self.right_margin = right;
        self.top_margin = top;
        self.bottom_margin = bottom;
        self
    }

    pub fn with_page_gap(mut self, page_gap: f32) -> Self {
        self.page_gap = page_gap;
        self
    }
}
