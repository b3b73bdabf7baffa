//! Value range aggregation
//!
//! Computes the value range each y-axis must display and supplies the
//! stacked/grouped bar placement rules used by the layout engine.

use crate::model::{AxisSide, Series};
use serde::{Deserialize, Serialize};

/// Minimum and maximum value shown on an axis; both `None` when the axis has
/// no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValueRange {
    pub const EMPTY: ValueRange = ValueRange {
        min: None,
        max: None,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Smallest range covering both
    pub fn merge(self, other: ValueRange) -> ValueRange {
        fn pick(a: Option<f64>, b: Option<f64>, f: fn(f64, f64) -> f64) -> Option<f64> {
            match (a, b) {
                (Some(a), Some(b)) => Some(f(a, b)),
                (a, None) => a,
                (None, b) => b,
            }
        }
        ValueRange {
            min: pick(self.min, other.min, f64::min),
            max: pick(self.max, other.max, f64::max),
        }
    }

    fn of_values(values: impl Iterator<Item = f64>) -> ValueRange {
        values.fold(ValueRange::EMPTY, |range, value| {
            range.merge(ValueRange::new(value, value))
        })
    }
}

/// Per category sums of the positive and of the negative values of the bar
/// series on `axis`. Empty when the axis has no bar series.
pub fn stacked_totals(series: &[Series], axis: AxisSide) -> Vec<(f64, f64)> {
    let bars: Vec<&Series> = series
        .iter()
        .filter(|s| s.is_bar() && s.axis() == axis)
        .collect();
    let Some(first) = bars.first() else {
        return Vec::new();
    };

    (0..first.values.len())
        .map(|category| {
            bars.iter()
                .filter_map(|s| s.values.get(category))
                .fold((0.0, 0.0), |(positive, negative), &value| {
                    if value >= 0.0 {
                        (positive + value, negative)
                    } else {
                        (positive, negative + value)
                    }
                })
        })
        .collect()
}

/// Range of stacked bar series on `axis`: the lowest stacked-negative total to
/// the highest stacked-positive total. Line and dot series are not summed.
pub fn stacked_bar_range(series: &[Series], axis: AxisSide) -> ValueRange {
    let totals = stacked_totals(series, axis);
    if totals.is_empty() {
        return ValueRange::EMPTY;
    }
    let min = totals.iter().map(|&(_, negative)| negative).fold(f64::INFINITY, f64::min);
    let max = totals.iter().map(|&(positive, _)| positive).fold(f64::NEG_INFINITY, f64::max);
    ValueRange::new(min, max)
}

/// Raw minimum and maximum over every value of the series on `axis`
pub fn independent_range(series: &[Series], axis: AxisSide) -> ValueRange {
    ValueRange::of_values(
        series
            .iter()
            .filter(|s| s.axis() == axis)
            .flat_map(|s| s.values.iter().copied()),
    )
}

/// Running stacked heights per category, in pixels
#[derive(Debug, Clone, Default)]
pub struct StackAccumulator {
    positive: Vec<f64>,
    negative: Vec<f64>,
}

impl StackAccumulator {
    pub fn new(category_count: usize) -> Self {
        Self {
            positive: vec![0.0; category_count],
            negative: vec![0.0; category_count],
        }
    }

    /// Accumulated (positive, negative) height of a category
    pub fn totals(&self, category: usize) -> (f64, f64) {
        (self.positive[category], self.negative[category])
    }
}

/// How bar series share a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackingPolicy {
    /// Bars are drawn on top of each other
    Stacked,
    /// Bars are drawn side by side
    Grouped,
}

impl StackingPolicy {
    pub fn from_stacked(stacked: bool) -> Self {
        if stacked {
            StackingPolicy::Stacked
        } else {
            StackingPolicy::Grouped
        }
    }

    /// Range the axis must display for the series assigned to it
    pub fn aggregate(&self, series: &[Series], axis: AxisSide) -> ValueRange {
        match self {
            StackingPolicy::Grouped => independent_range(series, axis),
            StackingPolicy::Stacked => {
                let unstacked = ValueRange::of_values(
                    series
                        .iter()
                        .filter(|s| !s.is_bar() && s.axis() == axis)
                        .flat_map(|s| s.values.iter().copied()),
                );
                stacked_bar_range(series, axis).merge(unstacked)
            }
        }
    }

    /// Number of bars drawn side by side in one category
    pub fn bars_across(&self, bar_series_count: usize) -> usize {
        match self {
            StackingPolicy::Stacked => 1,
            StackingPolicy::Grouped => bar_series_count.max(1),
        }
    }

    /// Left edge of a bar centered on `anchor`.
    ///
    /// `group_index` is the number of bar series placed before this one in
    /// the category.
    pub fn bar_left(
        &self,
        anchor: f64,
        bar_width: f64,
        group_index: usize,
        bars_across: usize,
    ) -> f64 {
        match self {
            StackingPolicy::Stacked => anchor - bar_width / 2.0,
            StackingPolicy::Grouped => {
                anchor - bars_across as f64 * bar_width / 2.0 + group_index as f64 * bar_width
            }
        }
    }

    /// Vertical pixel offset for a bar of signed `height` (positive upward)
    /// and advance the running totals. Grouped bars all start at the baseline.
    pub fn offset(&self, stack: &mut StackAccumulator, category: usize, height: f64) -> f64 {
        match self {
            StackingPolicy::Grouped => 0.0,
            StackingPolicy::Stacked => {
                let total = if height >= 0.0 {
                    &mut stack.positive[category]
                } else {
                    &mut stack.negative[category]
                };
                let offset = *total;
                *total += height;
                offset
            }
        }
    }
}
