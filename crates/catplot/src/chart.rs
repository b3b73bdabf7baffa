//! Categorical chart facade
//!
//! `CategoricalChart` owns the registered series and categories and runs the
//! render pipeline: range aggregation, tick calculation, dual-axis
//! reconciliation, layout, primitive emission and SVG serialization.

use crate::config::ChartConfig;
use crate::error::{ChartError, ChartResult};
use crate::layout::*;
use crate::model::*;
use crate::range::StackingPolicy;
use crate::render::*;
use crate::svg::SvgWriter;
use crate::ticks::{compute_ticks, format_tick_label, reconcile_ticks, ticks_are_scalable};
use serde::{Deserialize, Serialize};

/// Side length of a legend swatch
const LEGEND_SWATCH: f64 = 10.0;

/// Length of a tick mark
const TICK_MARK: f64 = 3.0;

/// Gap between the axis and tick labels or category labels
const LABEL_GAP: f64 = 5.0;

/// Stroke width of axis lines and tick marks
const AXIS_STROKE: f64 = 1.0;

/// Maximum disagreement between the zero rows of the two axes
const ZERO_ALIGNMENT_TOLERANCE: f64 = 1e-9;

/// A chart with a categorical x-axis and one or two value axes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalChart {
    config: ChartConfig,
    palette: Palette,
    categories: Vec<String>,
    series: Vec<Series>,
}

/// Axis scales resolved for one render
struct Axes {
    primary: AxisScale,
    secondary: Option<AxisScale>,
}

impl CategoricalChart {
    /// Create an empty chart using the default palette
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            palette: Palette::default(),
            categories: Vec::new(),
            series: Vec::new(),
        }
    }

    /// Use `palette` for series registered from now on
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the category labels, one per data index
    pub fn set_categories<S: Into<String>>(&mut self, labels: impl IntoIterator<Item = S>) {
        self.categories = labels.into_iter().map(Into::into).collect();
    }

    /// Register a series. Series without a color take the next palette color.
    pub fn add_series(&mut self, mut series: Series) {
        if series.color.is_none() {
            series.color = Some(self.palette.color_for(self.series.len()));
        }
        tracing::debug!(
            "Added {:?} series '{}' with {} values",
            series.kind,
            series.label,
            series.values.len()
        );
        self.series.push(series);
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn clear_series(&mut self) {
        self.series.clear();
    }

    /// Render the chart to an SVG document
    pub fn render(&self) -> ChartResult<String> {
        let rendered = self.render_primitives()?;
        SvgWriter::new().write(&rendered)
    }

    /// Render the chart to positioned primitives
    pub fn render_primitives(&self) -> ChartResult<RenderedChart> {
        self.validate()?;

        let axes = self.resolve_axes()?;
        let layout = LayoutEngine::new(&self.config).calculate(
            &self.series,
            &self.palette,
            &axes.primary,
            axes.secondary.as_ref(),
        );

        let config = &self.config;
        let mut state = RenderState::new(LayoutRect::new(0.0, 0.0, config.width, config.height));
        emit_series(
            &mut state,
            &layout,
            &SeriesStyle {
                line_width: config.line_width,
                label_style: self.text_style(config.font_size),
            },
        );
        self.emit_axes(&mut state, &axes);
        self.emit_ticks(&mut state, &axes);
        self.emit_category_labels(&mut state, &layout.anchors);
        self.emit_axis_titles(&mut state, axes.secondary.is_some());
        if config.show_legend {
            self.emit_legend(&mut state, axes.secondary.is_some());
        }
        self.emit_title(&mut state);
        self.emit_watermark(&mut state);

        let rendered = state.finish(config.insets(), config.background_color);
        tracing::debug!(
            "Rendered {} primitives into {}x{}",
            rendered.primitives.len(),
            rendered.width,
            rendered.height
        );
        Ok(rendered)
    }

    fn validate(&self) -> ChartResult<()> {
        let Some(first) = self.series.first() else {
            return Err(ChartError::InvalidData("chart has no series".to_string()));
        };
        let count = first.values.len();
        if count == 0 {
            return Err(ChartError::InvalidData("series have no values".to_string()));
        }

        for (index, series) in self.series.iter().enumerate() {
            if series.values.len() != count {
                return Err(ChartError::InvalidData(format!(
                    "series {} has {} values, expected {}",
                    index,
                    series.values.len(),
                    count
                )));
            }
            if series.values.iter().any(|v| !v.is_finite()) {
                return Err(ChartError::InvalidData(format!(
                    "series {} contains a non-finite value",
                    index
                )));
            }
        }

        if !self.categories.is_empty() && self.categories.len() != count {
            return Err(ChartError::InvalidData(format!(
                "{} categories for {} values per series",
                self.categories.len(),
                count
            )));
        }

        if self.config.stacked {
            let bars_on = |axis: AxisSide| {
                self.series
                    .iter()
                    .any(|s| s.is_bar() && s.axis() == axis)
            };
            if bars_on(AxisSide::Primary) && bars_on(AxisSide::Secondary) {
                return Err(ChartError::MixedStackedAxes);
            }
        }

        Ok(())
    }

    fn resolve_axes(&self) -> ChartResult<Axes> {
        let policy = StackingPolicy::from_stacked(self.config.stacked);
        let target = self.config.y_tick_count;

        let range = policy.aggregate(&self.series, AxisSide::Primary);
        let mut primary_ticks = ensure_scalable(compute_ticks(range.min, range.max, true, target))?;
        tracing::debug!("Primary range {:?}, ticks {:?}", range, primary_ticks);

        let mut secondary_ticks = None;
        if self.series.iter().any(|s| s.secondary) {
            let range = policy.aggregate(&self.series, AxisSide::Secondary);
            let ticks = ensure_scalable(compute_ticks(range.min, range.max, true, target))?;
            tracing::debug!("Secondary range {:?}, ticks {:?}", range, ticks);

            let (primary, secondary) = reconcile_ticks(&primary_ticks, &ticks);
            primary_ticks = ensure_scalable(primary)?;
            secondary_ticks = Some(ensure_scalable(secondary)?);
        }

        let height = self.config.height;
        let primary = AxisScale::from_ticks(primary_ticks, height);
        let secondary = secondary_ticks.map(|ticks| AxisScale::from_ticks(ticks, height));

        if let Some(secondary) = &secondary {
            let (primary_zero, secondary_zero) = (primary.zero_y(), secondary.zero_y());
            if (primary_zero - secondary_zero).abs() >= ZERO_ALIGNMENT_TOLERANCE {
                return Err(ChartError::AxisMisaligned {
                    primary: primary_zero,
                    secondary: secondary_zero,
                });
            }
            tracing::debug!("Reconciled axes share zero row {}", primary_zero);
        }

        Ok(Axes { primary, secondary })
    }

    fn text_style(&self, font_size: f64) -> TextStyle {
        TextStyle::new(font_size, self.config.font_family.clone(), self.config.text_color())
    }

    fn emit_axes(&self, state: &mut RenderState, axes: &Axes) {
        let (width, height) = (self.config.width, self.config.height);
        let color = self.config.text_color();

        state.push(line(0.0, 0.0, 0.0, height, color, AXIS_STROKE));
        let zero_y = axes.primary.zero_y();
        state.push(line(0.0, zero_y, width, zero_y, color, AXIS_STROKE));
        if axes.secondary.is_some() {
            state.push(line(width, 0.0, width, height, color, AXIS_STROKE));
        }
    }

    fn emit_ticks(&self, state: &mut RenderState, axes: &Axes) {
        let color = self.config.text_color();
        let width = self.config.width;
        let style = self
            .text_style(self.config.font_size)
            .baseline(TextBaseline::TextBottom);

        let left = style.clone().anchor(TextAnchor::End);
        let step = axes.primary.step();
        for &value in &axes.primary.ticks {
            let y = axes.primary.y_for(value);
            state.push(text(format_tick_label(value, step), -LABEL_GAP, y + 3.0, &left));
            state.push(line(0.0, y, -TICK_MARK, y, color, AXIS_STROKE));
        }

        if let Some(secondary) = &axes.secondary {
            let right = style.anchor(TextAnchor::Start);
            let step = secondary.step();
            for &value in &secondary.ticks {
                let y = secondary.y_for(value);
                state.push(text(format_tick_label(value, step), width + LABEL_GAP, y + 3.0, &right));
                state.push(line(width, y, width + TICK_MARK, y, color, AXIS_STROKE));
            }
        }
    }

    fn emit_category_labels(&self, state: &mut RenderState, anchors: &[f64]) {
        let y = self.config.height + LABEL_GAP;
        let style = self.text_style(self.config.font_size);
        if self.config.rotate_x_labels {
            let style = style
                .anchor(TextAnchor::End)
                .baseline(TextBaseline::Middle)
                .rotated(-90.0);
            for (label, &x) in self.categories.iter().zip(anchors) {
                state.push(text(label.clone(), x, y, &style));
            }
        } else {
            for (label, &x) in self.categories.iter().zip(anchors) {
                state.push(text(label.clone(), x, y + 10.0, &style));
            }
        }
    }

    fn emit_axis_titles(&self, state: &mut RenderState, has_secondary: bool) {
        let config = &self.config;
        let spacing = config.element_spacing;
        let style = self.text_style(config.axis_label_font_size);

        if let Some(label) = &config.x_axis_label {
            let y = config.height.max(state.extents.bottom) + 1.5 * spacing;
            state.push(text(label.clone(), config.width / 2.0, y, &style));
        }

        if let Some(label) = &config.primary_y_axis_label {
            let x = state.extents.left.min(0.0) - spacing;
            state.push(text(
                label.clone(),
                x,
                config.height / 2.0,
                &style.clone().rotated(-90.0),
            ));
        }

        if has_secondary {
            if let Some(label) = &config.secondary_y_axis_label {
                let x = state.extents.right.max(config.width) + spacing;
                state.push(text(
                    label.clone(),
                    x,
                    config.height / 2.0,
                    &style.rotated(-90.0).baseline(TextBaseline::Hanging),
                ));
            }
        }
    }

    /// Legend entries flow downward and wrap into a new column right of
    /// everything drawn so far when they would pass the plot height
    fn emit_legend(&self, state: &mut RenderState, has_secondary: bool) {
        let config = &self.config;
        let spacing = config.element_spacing;
        let style = self
            .text_style(config.font_size)
            .anchor(TextAnchor::Start);
        let column_x = |state: &RenderState| state.extents.right.max(config.width) + spacing / 2.0;

        let mut x = column_x(&*state);
        if has_secondary {
            x += 10.0;
        }
        let mut y = 0.0;

        for (index, series) in self.series.iter().enumerate() {
            let color = series
                .color
                .unwrap_or_else(|| self.palette.color_for(index));
            let middle = y + LEGEND_SWATCH / 2.0;
            match series.kind {
                SeriesKind::Bar => state.push(rect(x, y, LEGEND_SWATCH, LEGEND_SWATCH, color)),
                SeriesKind::Line => state.push(line(
                    x,
                    middle,
                    x + LEGEND_SWATCH,
                    middle,
                    color,
                    config.line_width,
                )),
                SeriesKind::Dot => state.push(circle(
                    x + LEGEND_SWATCH / 2.0,
                    middle,
                    LEGEND_SWATCH / 2.0,
                    color,
                    None,
                )),
            }
            if !series.label.is_empty() {
                state.push(text(
                    series.label.clone(),
                    x + LEGEND_SWATCH + spacing / 2.0,
                    y + LEGEND_SWATCH * 2.0 / 3.0,
                    &style,
                ));
            }

            y += spacing + LEGEND_SWATCH;
            if y + LEGEND_SWATCH > config.height {
                y = 0.0;
                x = column_x(&*state);
            }
        }
    }

    fn emit_title(&self, state: &mut RenderState) {
        let Some(title) = &self.config.title else {
            return;
        };
        let y = state.extents.top - self.config.element_spacing;
        let style = self.text_style(self.config.title_font_size);
        state.push(text(title.clone(), self.config.width / 2.0, y, &style));
    }

    fn emit_watermark(&self, state: &mut RenderState) {
        let Some(watermark) = &self.config.watermark else {
            return;
        };
        let style = self
            .text_style(self.config.font_size)
            .fill(Color::GRAY)
            .anchor(TextAnchor::End)
            .baseline(TextBaseline::Hanging);
        let x = state.extents.right;
        let y = state.extents.bottom + self.config.element_spacing;
        state.push(text(watermark.clone(), x, y, &style));
    }
}

/// Reject tick sequences whose values or width overflow `f64`
fn ensure_scalable(ticks: Vec<f64>) -> ChartResult<Vec<f64>> {
    if ticks_are_scalable(&ticks) {
        Ok(ticks)
    } else {
        Err(ChartError::InvalidData(format!(
            "value range {:?} is too wide to scale",
            ticks
        )))
    }
}
