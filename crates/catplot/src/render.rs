//! Chart rendering
//!
//! This module turns layout geometry into render primitives and tracks the
//! extents of everything emitted, so labels and the legend can be placed
//! outside the plotted area.

use crate::config::Insets;
use crate::layout::*;
use crate::model::Color;
use serde::{Deserialize, Serialize};

/// Estimated glyph width as a fraction of the font size
const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// A render primitive for chart elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChartRenderPrimitive {
    /// A filled rectangle
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
    },
    /// A filled circle
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
        stroke: Option<String>,
        stroke_width: Option<f64>,
    },
    /// A line
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
        stroke_width: f64,
    },
    /// Single-line text, optionally rotated about its anchor point
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        font_family: String,
        fill: String,
        anchor: TextAnchor,
        baseline: TextBaseline,
        /// Rotation in degrees, clockwise
        rotation: Option<f64>,
    },
}

/// Text anchor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Text baseline position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextBaseline {
    /// Alphabetic baseline; no attribute is written
    Auto,
    Middle,
    TextBottom,
    Hanging,
}

impl TextBaseline {
    /// Value of the `dominant-baseline` attribute
    pub fn as_attribute(&self) -> Option<&'static str> {
        match self {
            TextBaseline::Auto => None,
            TextBaseline::Middle => Some("middle"),
            TextBaseline::TextBottom => Some("text-bottom"),
            TextBaseline::Hanging => Some("hanging"),
        }
    }
}

/// Style shared by text primitives
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub fill: Color,
    pub anchor: TextAnchor,
    pub baseline: TextBaseline,
    pub rotation: Option<f64>,
}

impl TextStyle {
    pub fn new(font_size: f64, font_family: impl Into<String>, fill: Color) -> Self {
        Self {
            font_size,
            font_family: font_family.into(),
            fill,
            anchor: TextAnchor::Middle,
            baseline: TextBaseline::Auto,
            rotation: None,
        }
    }

    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }
}

/// Filled rectangle; a negative height is flipped so the rectangle covers
/// the same rows
pub fn rect(x: f64, y: f64, width: f64, height: f64, fill: Color) -> ChartRenderPrimitive {
    let bounds = LayoutRect::new(x, y, width, height).normalized();
    ChartRenderPrimitive::Rect {
        x: bounds.x,
        y: bounds.y,
        width: bounds.width,
        height: bounds.height,
        fill: fill.to_css(),
    }
}

/// Filled circle with an optional outline
pub fn circle(
    cx: f64,
    cy: f64,
    r: f64,
    fill: Color,
    stroke: Option<(Color, f64)>,
) -> ChartRenderPrimitive {
    ChartRenderPrimitive::Circle {
        cx,
        cy,
        r,
        fill: fill.to_css(),
        stroke: stroke.map(|(color, _)| color.to_css()),
        stroke_width: stroke.map(|(_, width)| width),
    }
}

pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, stroke: Color, width: f64) -> ChartRenderPrimitive {
    ChartRenderPrimitive::Line {
        x1,
        y1,
        x2,
        y2,
        stroke: stroke.to_css(),
        stroke_width: width,
    }
}

pub fn text(content: impl Into<String>, x: f64, y: f64, style: &TextStyle) -> ChartRenderPrimitive {
    ChartRenderPrimitive::Text {
        x,
        y,
        text: content.into(),
        font_size: style.font_size,
        font_family: style.font_family.clone(),
        fill: style.fill.to_css(),
        anchor: style.anchor,
        baseline: style.baseline,
        rotation: style.rotation,
    }
}

/// Bounding box of everything emitted so far
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Extents {
    /// Extents covering a rectangle
    pub fn of_rect(rect: LayoutRect) -> Self {
        let rect = rect.normalized();
        Self {
            left: rect.x,
            top: rect.y,
            right: rect.right(),
            bottom: rect.bottom(),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    fn include_point(&mut self, x: f64, y: f64) {
        self.left = self.left.min(x);
        self.right = self.right.max(x);
        self.top = self.top.min(y);
        self.bottom = self.bottom.max(y);
    }

    /// Grow to cover a primitive
    pub fn include(&mut self, primitive: &ChartRenderPrimitive) {
        match primitive {
            ChartRenderPrimitive::Rect {
                x,
                y,
                width,
                height,
                ..
            } => {
                self.include_point(*x, *y);
                self.include_point(x + width, y + height);
            }
            ChartRenderPrimitive::Circle {
                cx,
                cy,
                r,
                stroke_width,
                ..
            } => {
                let reach = r + stroke_width.unwrap_or(0.0) / 2.0;
                self.include_point(cx - reach, cy - reach);
                self.include_point(cx + reach, cy + reach);
            }
            ChartRenderPrimitive::Line { x1, y1, x2, y2, .. } => {
                self.include_point(*x1, *y1);
                self.include_point(*x2, *y2);
            }
            ChartRenderPrimitive::Text {
                x,
                y,
                text,
                font_size,
                anchor,
                baseline,
                rotation,
                ..
            } => {
                for (px, py) in text_corners(*x, *y, text, *font_size, *anchor, *baseline, *rotation) {
                    self.include_point(px, py);
                }
            }
        }
    }
}

/// Estimated width of single-line text
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * CHAR_WIDTH_FACTOR
}

/// Corners of the estimated text box, rotated about the anchor point
fn text_corners(
    x: f64,
    y: f64,
    text: &str,
    font_size: f64,
    anchor: TextAnchor,
    baseline: TextBaseline,
    rotation: Option<f64>,
) -> [(f64, f64); 4] {
    let width = estimate_text_width(text, font_size);
    let (left, right) = match anchor {
        TextAnchor::Start => (0.0, width),
        TextAnchor::Middle => (-width / 2.0, width / 2.0),
        TextAnchor::End => (-width, 0.0),
    };
    let (top, bottom) = match baseline {
        TextBaseline::Auto | TextBaseline::TextBottom => (-font_size, 0.0),
        TextBaseline::Middle => (-font_size / 2.0, font_size / 2.0),
        TextBaseline::Hanging => (0.0, font_size),
    };

    let (sin, cos) = rotation.unwrap_or(0.0).to_radians().sin_cos();
    [(left, top), (right, top), (right, bottom), (left, bottom)].map(|(dx, dy)| {
        (x + dx * cos - dy * sin, y + dx * sin + dy * cos)
    })
}

/// Primitives emitted by one render, with their extents.
///
/// Created fresh for every render call.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub primitives: Vec<ChartRenderPrimitive>,
    pub extents: Extents,
}

impl RenderState {
    /// Start with extents covering the plot area
    pub fn new(plot: LayoutRect) -> Self {
        Self {
            primitives: Vec::new(),
            extents: Extents::of_rect(plot),
        }
    }

    pub fn push(&mut self, primitive: ChartRenderPrimitive) {
        self.extents.include(&primitive);
        self.primitives.push(primitive);
    }

    /// Size the document to the extents plus `insets`
    pub fn finish(self, insets: Insets, background: Option<Color>) -> RenderedChart {
        let extents = self.extents;
        RenderedChart {
            width: extents.width() + insets.left + insets.right,
            height: extents.height() + insets.top + insets.bottom,
            offset: LayoutPoint::new(insets.left - extents.left, insets.top - extents.top),
            extents,
            background,
            primitives: self.primitives,
        }
    }
}

/// Rendered chart output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedChart {
    /// Document width
    pub width: f64,
    /// Document height
    pub height: f64,
    /// Translation applied to the primitives so every extent is visible
    pub offset: LayoutPoint,
    /// Bounding box of the primitives before translation
    pub extents: Extents,
    pub background: Option<Color>,
    /// Render primitives, in drawing order, in plot coordinates
    pub primitives: Vec<ChartRenderPrimitive>,
}

/// Style used when emitting series geometry
#[derive(Debug, Clone)]
pub struct SeriesStyle {
    pub line_width: f64,
    pub label_style: TextStyle,
}

/// Emit the primitives of every series element, in layout order: bars,
/// markers, line segments, then value labels
pub fn emit_series(state: &mut RenderState, layout: &SeriesLayout, style: &SeriesStyle) {
    for bar in &layout.bars {
        state.push(rect(
            bar.bounds.x,
            bar.bounds.y,
            bar.bounds.width,
            bar.bounds.height,
            bar.color,
        ));
    }

    for marker in &layout.markers {
        state.push(circle(
            marker.center.x,
            marker.center.y,
            marker.radius,
            marker.color,
            None,
        ));
    }

    for segment in &layout.lines {
        state.push(line(
            segment.start.x,
            segment.start.y,
            segment.end.x,
            segment.end.y,
            segment.color,
            style.line_width,
        ));
    }

    for label in &layout.data_labels {
        let label_style = if label.below {
            style.label_style.clone().baseline(TextBaseline::Hanging)
        } else {
            style.label_style.clone()
        };
        state.push(text(
            label.text.clone(),
            label.position.x,
            label.position.y,
            &label_style,
        ));
    }
}
