//! Chart layout calculations
//!
//! This module converts series values and reconciled axis scales into pixel
//! geometry for bars, dot markers, line segments and value labels. All
//! coordinates are relative to the plot area, whose top-left corner is the
//! origin.

use crate::config::ChartConfig;
use crate::model::*;
use crate::range::{StackAccumulator, StackingPolicy};
use crate::ticks::format_tick_value;
use serde::{Deserialize, Serialize};

/// Gap between a bar end and its value label
const BAR_LABEL_OFFSET: f64 = 5.0;
/// Gap between a dot or line point and its value label
const POINT_LABEL_OFFSET: f64 = 10.0;

/// A rectangle in layout coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutRect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Flip a negative height so the rectangle spans the same rows with
    /// `height >= 0`
    pub fn normalized(self) -> Self {
        if self.height < 0.0 {
            Self {
                y: self.y + self.height,
                height: -self.height,
                ..self
            }
        } else {
            self
        }
    }

    /// Get the right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Get the center X coordinate
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// A point in layout coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Linear mapping from axis values to plot rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    /// Tick values, ascending
    pub ticks: Vec<f64>,
    pub min: f64,
    pub max: f64,
    /// Pixels per value unit
    pub scale: f64,
    /// Plot height in pixels
    pub height: f64,
}

impl AxisScale {
    /// Build a scale spanning the first to the last tick over `height` pixels
    pub fn from_ticks(ticks: Vec<f64>, height: f64) -> Self {
        let min = ticks.first().copied().unwrap_or(0.0);
        let mut max = ticks.last().copied().unwrap_or(1.0);
        if max <= min {
            max = min + 1.0;
        }
        Self {
            ticks,
            min,
            max,
            scale: height / (max - min),
            height,
        }
    }

    /// Distance between neighbouring ticks
    pub fn step(&self) -> f64 {
        match self.ticks.as_slice() {
            [first, second, ..] => second - first,
            _ => self.max - self.min,
        }
    }

    /// Plot row of a value
    pub fn y_for(&self, value: f64) -> f64 {
        self.height - (value - self.min) * self.scale
    }

    /// Plot row of the zero line
    pub fn zero_y(&self) -> f64 {
        self.y_for(0.0)
    }

    /// Fraction of the height below zero
    pub fn zero_fraction(&self) -> f64 {
        (0.0 - self.min) / (self.max - self.min)
    }
}

/// Layout for a bar segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarLayout {
    pub bounds: LayoutRect,
    pub series_index: usize,
    pub category_index: usize,
    pub value: f64,
    pub color: Color,
}

/// Layout for a line segment between two consecutive categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSegmentLayout {
    pub start: LayoutPoint,
    pub end: LayoutPoint,
    pub series_index: usize,
    /// Category of the end point
    pub category_index: usize,
    pub color: Color,
}

/// Layout for a dot marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerLayout {
    pub center: LayoutPoint,
    pub radius: f64,
    pub series_index: usize,
    pub category_index: usize,
    pub value: f64,
    pub color: Color,
}

/// Layout for a printed value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataLabelLayout {
    pub position: LayoutPoint,
    pub text: String,
    /// Hang the text below `position` instead of sitting on it
    pub below: bool,
    pub series_index: usize,
    pub category_index: usize,
}

/// Geometry of every series element of one render
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesLayout {
    /// Effective bar width after capping
    pub bar_width: f64,
    /// Center x of each category
    pub anchors: Vec<f64>,
    pub bars: Vec<BarLayout>,
    pub markers: Vec<MarkerLayout>,
    pub lines: Vec<LineSegmentLayout>,
    pub data_labels: Vec<DataLabelLayout>,
}

/// Layout engine for categorical series
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    /// Plot width
    pub width: f64,
    /// Plot height
    pub height: f64,
    /// Requested bar width
    pub bar_width: f64,
    /// Radius of dot markers
    pub dot_radius: f64,
    pub policy: StackingPolicy,
}

impl LayoutEngine {
    /// Create a layout engine for a chart configuration
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            bar_width: config.bar_width,
            dot_radius: config.dot_radius,
            policy: StackingPolicy::from_stacked(config.stacked),
        }
    }

    /// Effective bar width for a number of bar series and categories
    pub fn effective_bar_width(&self, bar_series_count: usize, category_count: usize) -> f64 {
        let across = self.policy.bars_across(bar_series_count);
        let max_width = self.width / (across * category_count.max(1)) as f64;
        self.bar_width.min(max_width)
    }

    /// Lay out every series.
    ///
    /// Categories are visited in order and, within a category, series in
    /// registration order. Series on the secondary axis use `secondary`,
    /// falling back to `primary` when it is absent. All series must have the
    /// same length.
    pub fn calculate(
        &self,
        series: &[Series],
        palette: &Palette,
        primary: &AxisScale,
        secondary: Option<&AxisScale>,
    ) -> SeriesLayout {
        let category_count = series.first().map_or(0, |s| s.values.len());
        if category_count == 0 {
            return SeriesLayout::default();
        }

        let bar_series_count = series.iter().filter(|s| s.is_bar()).count();
        let bars_across = self.policy.bars_across(bar_series_count);
        let bar_width = self.effective_bar_width(bar_series_count, category_count);
        let band_width = self.width / category_count as f64;
        if bar_width < self.bar_width {
            tracing::debug!(
                "Bar width capped from {} to {} for {} categories",
                self.bar_width,
                bar_width,
                category_count
            );
        }

        let mut layout = SeriesLayout {
            bar_width,
            anchors: (0..category_count)
                .map(|i| i as f64 * band_width + band_width / 2.0)
                .collect(),
            ..Default::default()
        };

        let colors: Vec<Color> = series
            .iter()
            .enumerate()
            .map(|(idx, s)| s.color.unwrap_or_else(|| palette.color_for(idx)))
            .collect();
        let mut stack = StackAccumulator::new(category_count);
        let mut previous: Vec<Option<LayoutPoint>> = vec![None; series.len()];

        for category_index in 0..category_count {
            let anchor = layout.anchors[category_index];
            let mut group_index = 0;

            for (series_index, s) in series.iter().enumerate() {
                let Some(&value) = s.values.get(category_index) else {
                    continue;
                };
                let axis = match s.axis() {
                    AxisSide::Primary => primary,
                    AxisSide::Secondary => secondary.unwrap_or(primary),
                };
                let color = colors[series_index];
                let y = axis.y_for(value);

                let label_position = match s.kind {
                    SeriesKind::Bar => {
                        let left = self.policy.bar_left(anchor, bar_width, group_index, bars_across);
                        group_index += 1;

                        let height = value * axis.scale;
                        let offset = self.policy.offset(&mut stack, category_index, height);
                        let value_end = y - offset;
                        let bounds = LayoutRect::new(left, value_end, bar_width, height).normalized();
                        layout.bars.push(BarLayout {
                            bounds,
                            series_index,
                            category_index,
                            value,
                            color,
                        });

                        if value >= 0.0 {
                            (LayoutPoint::new(bounds.center_x(), value_end - BAR_LABEL_OFFSET), false)
                        } else {
                            (LayoutPoint::new(bounds.center_x(), value_end + BAR_LABEL_OFFSET), true)
                        }
                    }
                    SeriesKind::Dot => {
                        let center = LayoutPoint::new(anchor, y);
                        layout.markers.push(MarkerLayout {
                            center,
                            radius: self.dot_radius,
                            series_index,
                            category_index,
                            value,
                            color,
                        });
                        (LayoutPoint::new(anchor, y - POINT_LABEL_OFFSET), false)
                    }
                    SeriesKind::Line => {
                        let point = LayoutPoint::new(anchor, y);
                        // The first category has no predecessor to connect to
                        if let Some(start) = previous[series_index] {
                            layout.lines.push(LineSegmentLayout {
                                start,
                                end: point,
                                series_index,
                                category_index,
                                color,
                            });
                        }
                        previous[series_index] = Some(point);
                        (LayoutPoint::new(anchor, y - POINT_LABEL_OFFSET), false)
                    }
                };

                if s.print_values {
                    let (position, below) = label_position;
                    layout.data_labels.push(DataLabelLayout {
                        position,
                        text: format_tick_value(value),
                        below,
                        series_index,
                        category_index,
                    });
                }
            }
        }

        tracing::trace!(
            "Laid out {} bars, {} markers, {} line segments",
            layout.bars.len(),
            layout.markers.len(),
            layout.lines.len()
        );
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(stacked: bool) -> LayoutEngine {
        LayoutEngine::new(&ChartConfig::new(300.0, 200.0).with_bar_width(30.0).with_stacked(stacked))
    }

    fn scale(ticks: &[f64]) -> AxisScale {
        AxisScale::from_ticks(ticks.to_vec(), 200.0)
    }

    #[test]
    fn test_layout_rect_normalized() {
        let rect = LayoutRect::new(0.0, 100.0, 10.0, -40.0).normalized();
        assert_eq!(rect, LayoutRect::new(0.0, 60.0, 10.0, 40.0));

        let rect = LayoutRect::new(0.0, 100.0, 10.0, 40.0).normalized();
        assert_eq!(rect.bottom(), 140.0);
    }

    #[test]
    fn test_axis_scale_rows() {
        let axis = scale(&[-10.0, 0.0, 10.0, 20.0, 30.0]);
        assert_eq!(axis.y_for(30.0), 0.0);
        assert_eq!(axis.y_for(-10.0), 200.0);
        assert_eq!(axis.zero_y(), 150.0);
        assert_eq!(axis.zero_fraction(), 0.25);
        assert_eq!(axis.step(), 10.0);
        assert_eq!(scale(&[3.0]).step(), 1.0);
    }

    #[test]
    fn test_axis_scale_degenerate_ticks() {
        let axis = AxisScale::from_ticks(vec![3.0], 100.0);
        assert_eq!(axis.max, 4.0);
        assert_eq!(axis.scale, 100.0);
    }

    #[test]
    fn test_single_bar_series() {
        let series = vec![Series::new(vec![10.0, 20.0, 30.0])];
        let layout = engine(false).calculate(
            &series,
            &Palette::default(),
            &scale(&[0.0, 10.0, 20.0, 30.0]),
            None,
        );

        assert_eq!(layout.bars.len(), 3);
        assert_eq!(layout.anchors, vec![50.0, 150.0, 250.0]);
        let lefts: Vec<f64> = layout.bars.iter().map(|b| b.bounds.x).collect();
        assert_eq!(lefts, vec![35.0, 135.0, 235.0]);
        for bar in &layout.bars {
            assert!((bar.bounds.bottom() - 200.0).abs() < 1e-9);
            assert!((bar.bounds.height - bar.value * 200.0 / 30.0).abs() < 1e-9);
            assert_eq!(bar.bounds.width, 30.0);
        }
        assert!(layout.bars[0].bounds.height < layout.bars[1].bounds.height);
        assert!(layout.bars[1].bounds.height < layout.bars[2].bounds.height);
    }

    #[test]
    fn test_grouped_bars_side_by_side() {
        let series = vec![
            Series::new(vec![10.0, 20.0]),
            Series::new(vec![5.0, 15.0]),
        ];
        let layout = engine(false).calculate(
            &series,
            &Palette::default(),
            &scale(&[0.0, 10.0, 20.0]),
            None,
        );

        assert_eq!(layout.bars.len(), 4);
        // Category 0: both series, adjacent and centered on the anchor at 75
        assert_eq!(layout.bars[0].bounds.x, 45.0);
        assert_eq!(layout.bars[1].bounds.x, 75.0);
        assert_eq!(layout.bars[0].series_index, 0);
        assert_eq!(layout.bars[1].series_index, 1);
        assert_eq!(layout.bars[1].category_index, 0);
    }

    #[test]
    fn test_negative_bar_hangs_below_zero() {
        let series = vec![Series::new(vec![-10.0, 10.0])];
        let axis = scale(&[-10.0, 0.0, 10.0]);
        let layout = engine(false).calculate(&series, &Palette::default(), &axis, None);

        let negative = layout.bars[0].bounds;
        assert_eq!(negative.y, axis.zero_y());
        assert_eq!(negative.height, 100.0);
        let positive = layout.bars[1].bounds;
        assert_eq!(positive.bottom(), axis.zero_y());
    }

    #[test]
    fn test_stacked_segments_do_not_overlap() {
        let series = vec![
            Series::new(vec![5.0, -5.0]),
            Series::new(vec![3.0, -2.0]),
        ];
        let axis = scale(&[-8.0, -4.0, 0.0, 4.0, 8.0]);
        let layout = engine(true).calculate(&series, &Palette::default(), &axis, None);
        let zero = axis.zero_y();

        let first: Vec<LayoutRect> = layout
            .bars
            .iter()
            .filter(|b| b.category_index == 0)
            .map(|b| b.bounds)
            .collect();
        assert_eq!(first.len(), 2);
        assert!((first[0].bottom() - zero).abs() < 1e-9);
        assert!((first[1].bottom() - first[0].y).abs() < 1e-9);
        let positive_total: f64 = first.iter().map(|r| r.height).sum::<f64>() / axis.scale;
        assert!((positive_total - 8.0).abs() < 1e-9);

        let second: Vec<LayoutRect> = layout
            .bars
            .iter()
            .filter(|b| b.category_index == 1)
            .map(|b| b.bounds)
            .collect();
        assert!((second[0].y - zero).abs() < 1e-9);
        assert!((second[1].y - second[0].bottom()).abs() < 1e-9);
        let negative_total: f64 = second.iter().map(|r| r.height).sum::<f64>() / axis.scale;
        assert!((negative_total - 7.0).abs() < 1e-9);

        // Stacked bars share one centered slot
        assert_eq!(first[0].x, first[1].x);
        assert_eq!(first[0].x, 75.0 - 15.0);
    }

    #[test]
    fn test_line_skips_first_category() {
        let series = vec![Series::new(vec![1.0, 2.0, 3.0, 2.0]).with_kind(SeriesKind::Line)];
        let layout = engine(false).calculate(
            &series,
            &Palette::default(),
            &scale(&[0.0, 1.0, 2.0, 3.0]),
            None,
        );

        assert!(layout.bars.is_empty());
        assert_eq!(layout.lines.len(), 3);
        assert_eq!(layout.lines[0].start.x, layout.anchors[0]);
        assert_eq!(layout.lines[0].end.x, layout.anchors[1]);
        assert_eq!(layout.lines[2].category_index, 3);
    }

    #[test]
    fn test_dots_are_centered_on_categories() {
        let series = vec![
            Series::new(vec![1.0, 2.0]),
            Series::new(vec![1.0, 2.0]),
            Series::new(vec![1.5, 0.5]).with_kind(SeriesKind::Dot),
        ];
        let layout = engine(false).calculate(
            &series,
            &Palette::default(),
            &scale(&[0.0, 1.0, 2.0]),
            None,
        );

        assert_eq!(layout.markers.len(), 2);
        assert_eq!(layout.markers[0].center.x, 75.0);
        assert_eq!(layout.markers[1].center.x, 225.0);
        assert_eq!(layout.markers[0].radius, 5.0);
        assert_eq!(layout.markers[0].center.y, 50.0);
    }

    #[test]
    fn test_secondary_series_use_secondary_scale() {
        let series = vec![
            Series::new(vec![10.0, 20.0, 30.0]),
            Series::new(vec![1.0, 2.0, 1.5]).with_kind(SeriesKind::Dot).on_secondary_axis(),
        ];
        let primary = scale(&[0.0, 10.0, 20.0, 30.0]);
        let secondary = scale(&[0.0, 1.0, 2.0, 3.0]);
        let layout = engine(false).calculate(&series, &Palette::default(), &primary, Some(&secondary));

        assert_eq!(layout.markers[1].center.y, secondary.y_for(2.0));
        assert_eq!(layout.bars[1].bounds.y, primary.y_for(20.0));
    }

    #[test]
    fn test_bar_width_capped_by_category_count() {
        let series = vec![Series::new(vec![1.0; 20]), Series::new(vec![2.0; 20])];
        let layout = engine(false).calculate(
            &series,
            &Palette::default(),
            &scale(&[0.0, 1.0, 2.0]),
            None,
        );

        assert_eq!(layout.bar_width, 300.0 / 40.0);
        assert!(layout.bars.iter().all(|b| b.bounds.width <= 7.5));
    }

    #[test]
    fn test_value_labels() {
        let series = vec![
            Series::new(vec![10.0, -10.0]).with_print_values(true),
            Series::new(vec![5.0, 5.0]).with_kind(SeriesKind::Dot).with_print_values(true),
            Series::new(vec![1500.0, 0.0]).with_kind(SeriesKind::Line),
        ];
        let axis = scale(&[-10.0, 0.0, 10.0]);
        let layout = engine(false).calculate(&series, &Palette::default(), &axis, None);

        assert_eq!(layout.data_labels.len(), 4);
        let bar_label = &layout.data_labels[0];
        assert_eq!(bar_label.text, "10");
        assert_eq!(bar_label.position.y, axis.y_for(10.0) - 5.0);
        assert!(!bar_label.below);

        let dot_label = &layout.data_labels[1];
        assert_eq!(dot_label.position.y, axis.y_for(5.0) - 10.0);

        let negative_label = &layout.data_labels[2];
        assert_eq!(negative_label.text, "-10");
        assert!(negative_label.below);
        assert_eq!(negative_label.position.y, axis.y_for(-10.0) + 5.0);
    }

    #[test]
    fn test_colors_follow_palette() {
        let palette = Palette::new(vec![Color::BLACK, Color::WHITE]).unwrap();
        let series = vec![
            Series::new(vec![1.0]),
            Series::new(vec![1.0]),
            Series::new(vec![1.0]),
            Series::new(vec![1.0]).with_color(Color::GRAY),
        ];
        let layout = engine(false).calculate(&series, &palette, &scale(&[0.0, 1.0]), None);
        let colors: Vec<Color> = layout.bars.iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![Color::BLACK, Color::WHITE, Color::BLACK, Color::GRAY]);
    }

    #[test]
    fn test_empty_series_layout() {
        let layout = engine(false).calculate(&[], &Palette::default(), &scale(&[0.0, 1.0]), None);
        assert!(layout.bars.is_empty());
        assert!(layout.anchors.is_empty());
    }
}
