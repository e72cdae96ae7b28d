//! Engrave Core Types and Definitions
//!
//! This crate provides the foundational types read and produced by the
//! Engrave system layout engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Skyline**: Per-staff silhouettes and the distance cache ([`skyline`] module)
//! - **Score**: Parts, staves, brackets and instrument names ([`score`] module)
//! - **Measure**: Measures, frames and spacers ([`measure`] module)
//! - **Spanner**: Spanners placed against the final staff layout ([`spanner`] module)
//! - **Style**: Engraving style values ([`style::StyleContext`])

pub mod geometry;
pub mod identifier;
pub mod measure;
pub mod score;
pub mod skyline;
pub mod spanner;
pub mod style;
