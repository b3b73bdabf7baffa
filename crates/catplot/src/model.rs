//! Chart model types
//!
//! This module defines the data registered with a chart: series, their
//! display kind and axis assignment, colors and the palette they are drawn from.

use crate::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};

/// How a series is drawn
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// One bar per category, grouped or stacked
    #[default]
    Bar,
    /// Segments connecting consecutive categories
    Line,
    /// A dot marker per category
    Dot,
}

/// Which y-axis a series is scaled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSide {
    Primary,
    Secondary,
}

/// A single data series in a chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Numeric values, one per category
    pub values: Vec<f64>,
    /// Legend label (empty when not given)
    pub label: String,
    /// Display kind
    pub kind: SeriesKind,
    /// Print each value next to its data point
    pub print_values: bool,
    /// Scale against the secondary y-axis
    pub secondary: bool,
    /// Color; assigned from the palette on registration when unset
    pub color: Option<Color>,
}

impl Series {
    /// Create a bar series on the primary axis
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            label: String::new(),
            kind: SeriesKind::Bar,
            print_values: false,
            secondary: false,
            color: None,
        }
    }

    /// Set the legend label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the display kind
    pub fn with_kind(mut self, kind: SeriesKind) -> Self {
        self.kind = kind;
        self
    }

    /// Print values next to the data points
    pub fn with_print_values(mut self, print_values: bool) -> Self {
        self.print_values = print_values;
        self
    }

    /// Scale this series against the secondary axis
    pub fn on_secondary_axis(mut self) -> Self {
        self.secondary = true;
        self
    }

    /// Override the palette color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// The axis this series is scaled against
    pub fn axis(&self) -> AxisSide {
        if self.secondary {
            AxisSide::Secondary
        } else {
            AxisSide::Primary
        }
    }

    pub fn is_bar(&self) -> bool {
        self.kind == SeriesKind::Bar
    }
}

/// RGBA color representation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (fully opaque)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new color from RGBA values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from a hex string (e.g., "#FF0000" or "FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Convert to CSS color string
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f64 / 255.0
            )
        }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Ordered list of series colors.
///
/// Series `i` is drawn with `colors[i % colors.len()]`, so palettes shorter
/// than the series list cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create a palette; at least one color is required
    pub fn new(colors: Vec<Color>) -> ChartResult<Self> {
        if colors.is_empty() {
            return Err(ChartError::InvalidData(
                "palette must contain at least one color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Parse a palette from hex strings
    pub fn from_hex<S: AsRef<str>>(colors: &[S]) -> ChartResult<Self> {
        let parsed = colors
            .iter()
            .map(|hex| {
                Color::from_hex(hex.as_ref()).ok_or_else(|| {
                    ChartError::InvalidData(format!("invalid color: {}", hex.as_ref()))
                })
            })
            .collect::<ChartResult<Vec<_>>>()?;
        Self::new(parsed)
    }

    /// Color for the series registered at `index`
    pub fn color_for(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = ChartError;

    fn try_from(colors: Vec<Color>) -> ChartResult<Self> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Color> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                Color::rgb(79, 129, 189),  // Blue
                Color::rgb(192, 80, 77),   // Red
                Color::rgb(155, 187, 89),  // Green
                Color::rgb(128, 100, 162), // Purple
                Color::rgb(75, 172, 198),  // Teal
                Color::rgb(247, 150, 70),  // Orange
                Color::rgb(119, 146, 60),  // Olive
                Color::rgb(166, 166, 166), // Gray
            ],
        }
    }
}
