//! Chart configuration
//!
//! `ChartConfig` is a plain value object fixed at construction. Padding is
//! resolved per side with the precedence specific side > axis pair > global.

use crate::error::ChartResult;
use crate::model::Color;
use serde::{Deserialize, Serialize};

/// Resolved padding around the drawn content
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Configuration for a categorical chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Width of the plot area in pixels
    pub width: f64,
    /// Height of the plot area in pixels
    pub height: f64,
    /// Requested bar width; capped so every bar fits its category band
    pub bar_width: f64,
    /// Padding used for every side not set more specifically
    pub padding: f64,
    /// Padding for the left and right sides
    pub x_padding: Option<f64>,
    /// Padding for the top and bottom sides
    pub y_padding: Option<f64>,
    pub top_padding: Option<f64>,
    pub bottom_padding: Option<f64>,
    pub left_padding: Option<f64>,
    pub right_padding: Option<f64>,
    /// Stack bar series instead of grouping them side by side
    pub stacked: bool,
    /// Target number of y-axis ticks
    pub y_tick_count: usize,
    pub show_legend: bool,
    /// Rotate category labels by -90 degrees
    pub rotate_x_labels: bool,
    pub x_axis_label: Option<String>,
    pub primary_y_axis_label: Option<String>,
    pub secondary_y_axis_label: Option<String>,
    pub title: Option<String>,
    pub title_font_size: f64,
    /// Font size for ticks, category labels, value labels and the legend
    pub font_size: f64,
    /// Font size for axis titles
    pub axis_label_font_size: f64,
    pub font_family: String,
    pub background_color: Option<Color>,
    /// Draw text in white instead of black
    pub dark_mode: bool,
    /// Gap between the plot and surrounding labels, legend entries, title
    pub element_spacing: f64,
    /// Stroke width of line series
    pub line_width: f64,
    /// Radius of dot markers
    pub dot_radius: f64,
    pub watermark: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 200.0,
            bar_width: 30.0,
            padding: 20.0,
            x_padding: None,
            y_padding: None,
            top_padding: None,
            bottom_padding: None,
            left_padding: None,
            right_padding: None,
            stacked: false,
            y_tick_count: 5,
            show_legend: true,
            rotate_x_labels: true,
            x_axis_label: None,
            primary_y_axis_label: None,
            secondary_y_axis_label: None,
            title: None,
            title_font_size: 16.0,
            font_size: 10.0,
            axis_label_font_size: 12.0,
            font_family: "sans-serif".to_string(),
            background_color: None,
            dark_mode: false,
            element_spacing: 10.0,
            line_width: 2.0,
            dot_radius: 5.0,
            watermark: None,
        }
    }
}

impl ChartConfig {
    /// Create a configuration with the given plot size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> ChartResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> ChartResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_bar_width(mut self, bar_width: f64) -> Self {
        self.bar_width = bar_width;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_stacked(mut self, stacked: bool) -> Self {
        self.stacked = stacked;
        self
    }

    pub fn with_y_tick_count(mut self, count: usize) -> Self {
        self.y_tick_count = count;
        self
    }

    pub fn with_legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    pub fn with_rotated_x_labels(mut self, rotate: bool) -> Self {
        self.rotate_x_labels = rotate;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the x, primary y and secondary y axis titles
    pub fn with_axis_labels(
        mut self,
        x: Option<&str>,
        primary_y: Option<&str>,
        secondary_y: Option<&str>,
    ) -> Self {
        self.x_axis_label = x.map(str::to_string);
        self.primary_y_axis_label = primary_y.map(str::to_string);
        self.secondary_y_axis_label = secondary_y.map(str::to_string);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }

    pub fn with_watermark(mut self, watermark: impl Into<String>) -> Self {
        self.watermark = Some(watermark.into());
        self
    }

    /// Resolve the padding of each side
    pub fn insets(&self) -> Insets {
        let vertical = self.y_padding.unwrap_or(self.padding);
        let horizontal = self.x_padding.unwrap_or(self.padding);
        Insets {
            top: self.top_padding.unwrap_or(vertical),
            right: self.right_padding.unwrap_or(horizontal),
            bottom: self.bottom_padding.unwrap_or(vertical),
            left: self.left_padding.unwrap_or(horizontal),
        }
    }

    /// Color of every text element and axis line
    pub fn text_color(&self) -> Color {
        if self.dark_mode {
            Color::WHITE
        } else {
            Color::BLACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_falls_back_to_global() {
        let config = ChartConfig::default().with_padding(7.0);
        let insets = config.insets();
        assert_eq!(insets.top, 7.0);
        assert_eq!(insets.right, 7.0);
        assert_eq!(insets.bottom, 7.0);
        assert_eq!(insets.left, 7.0);
    }

    #[test]
    fn test_padding_precedence() {
        let config = ChartConfig {
            padding: 20.0,
            x_padding: Some(15.0),
            y_padding: Some(5.0),
            top_padding: Some(1.0),
            left_padding: Some(2.0),
            ..Default::default()
        };
        let insets = config.insets();
        assert_eq!(insets.top, 1.0);
        assert_eq!(insets.bottom, 5.0);
        assert_eq!(insets.left, 2.0);
        assert_eq!(insets.right, 15.0);
    }

    #[test]
    fn test_text_color_follows_dark_mode() {
        assert_eq!(ChartConfig::default().text_color(), Color::BLACK);
        assert_eq!(
            ChartConfig::default().with_dark_mode(true).text_color(),
            Color::WHITE
        );
    }

    #[test]
    fn test_from_json_uses_defaults() {
        let config = ChartConfig::from_json(r#"{"width": 640, "stacked": true}"#).unwrap();
        assert_eq!(config.width, 640.0);
        assert!(config.stacked);
        assert_eq!(config.height, 200.0);
        assert_eq!(config.y_tick_count, 5);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ChartConfig::new(400.0, 250.0)
            .with_title("Revenue")
            .with_background(Color::rgb(10, 20, 30));
        let json = config.to_json().unwrap();
        assert_eq!(ChartConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(ChartConfig::from_json("{ width: ").is_err());
    }
}
