//! Catplot - Categorical SVG charts
//!
//! This crate provides support for:
//! - Bar (grouped or stacked), line and dot series over a categorical x-axis
//! - Independent primary and secondary y-axes sharing one zero line
//! - Nice tick calculation and compact tick labels
//! - Layout of bars, markers, line segments and value labels
//! - Legends, axis titles, titles and watermarks sized to their content
//! - Rendering to primitives or to a standalone SVG document

mod model;
mod error;
mod config;
mod ticks;
mod range;
mod layout;
mod render;
mod svg;
mod chart;

pub use model::*;
pub use error::*;
pub use config::*;
pub use ticks::*;
pub use range::*;
pub use layout::*;
pub use render::*;
pub use svg::*;
pub use chart::*;
