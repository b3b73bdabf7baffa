//! Axis tick calculation
//!
//! Produces "nice" evenly spaced tick sequences for a value range, aligns the
//! zero row of two independently scaled axes, and formats tick values.

/// Step mantissas in tenths: 1, 1.2, 1.5, 2, 2.5 and 5 times a power of ten.
const STEP_MANTISSAS: [i64; 6] = [10, 12, 15, 20, 25, 50];

/// Candidates whose tick count exceeds this multiple of the target are rejected.
const MAX_COUNT_FACTOR: usize = 2;

/// Largest power of ten that is still a finite `f64`
const MAX_DECIMAL_EXPONENT: i32 = 308;

/// A tick step of `mantissa * 10^exponent`
#[derive(Debug, Clone, Copy)]
struct TickStep {
    mantissa: i64,
    exponent: i32,
}

impl TickStep {
    fn value(&self) -> f64 {
        self.tick(1)
    }

    /// The `k`-th multiple of the step, computed from integers so that
    /// multiples land on the closest representable decimal
    fn tick(&self, k: i64) -> f64 {
        let units = k.saturating_mul(self.mantissa) as f64;
        if self.exponent >= 0 {
            units * 10f64.powi(self.exponent)
        } else if self.exponent > -MAX_DECIMAL_EXPONENT {
            units / 10f64.powi(-self.exponent)
        } else {
            units * 10f64.powi(self.exponent)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    step: TickStep,
    first: i64,
    last: i64,
    distance: usize,
}

impl Candidate {
    fn covered(&self) -> f64 {
        (self.last - self.first) as f64 * self.step.value()
    }

    /// Nearest tick count wins, then the tightest covered range, then the larger step
    fn beats(&self, other: &Candidate) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }
        let (covered, other_covered) = (self.covered(), other.covered());
        if (covered - other_covered).abs() > other_covered * 1e-9 {
            return covered < other_covered;
        }
        self.step.value() > other.step.value()
    }
}

/// Compute a nice, ascending, evenly spaced tick sequence covering
/// `[min_value, max_value]`.
///
/// With no data on the axis the degenerate sequence `[0, 1]` is returned.
/// When `include_zero` is set the covered range is widened to contain zero,
/// and zero is then one of the ticks.
///
/// A range whose width overflows `f64` has no nice steps; its bounds are
/// returned as is and callers must reject them (see [`ticks_are_scalable`]).
pub fn compute_ticks(
    min_value: Option<f64>,
    max_value: Option<f64>,
    include_zero: bool,
    target_count: usize,
) -> Vec<f64> {
    let (mut low, mut high) = match (min_value, max_value) {
        (None, None) => return vec![0.0, 1.0],
        (Some(value), None) | (None, Some(value)) => (value, value),
        (Some(a), Some(b)) => (a.min(b), a.max(b)),
    };

    if include_zero {
        low = low.min(0.0);
        high = high.max(0.0);
    }

    if high <= low {
        if low == 0.0 {
            return vec![0.0, 1.0];
        }
        let half = low.abs() / 2.0;
        low -= half;
        high += half;
    }

    let target = target_count.max(2);
    let span = high - low;
    if !span.is_finite() {
        return vec![low, high];
    }
    let base_exponent = (span / target as f64)
        .log10()
        .floor()
        .clamp(-f64::from(MAX_DECIMAL_EXPONENT + 20), f64::from(MAX_DECIMAL_EXPONENT))
        as i32;

    let mut best: Option<Candidate> = None;
    // Mantissas are in tenths, so exponent `e` here means a step of m * 10^(e - 1)
    for exponent in base_exponent - 1..=base_exponent + 1 {
        for mantissa in STEP_MANTISSAS {
            let step = TickStep {
                mantissa,
                exponent: exponent - 1,
            };
            let size = step.value();
            if !(size > 0.0 && size.is_finite()) {
                continue;
            }
            let first = (low / size + 1e-9).floor() as i64;
            let last = (high / size - 1e-9).ceil() as i64;
            let count = (last - first + 1).max(0) as usize;
            if count < 2 || count > MAX_COUNT_FACTOR * target {
                continue;
            }

            let candidate = Candidate {
                step,
                first,
                last,
                distance: count.abs_diff(target),
            };
            if best.map_or(true, |current| candidate.beats(&current)) {
                best = Some(candidate);
            }
        }
    }

    // For a finite span the step 10^(base + 1) always yields between 2 and
    // target + 2 ticks, so the fallback is only reached when every step at
    // this magnitude overflows or underflows.
    match best {
        Some(candidate) => (candidate.first..=candidate.last)
            .map(|k| candidate.step.tick(k))
            .collect(),
        None => vec![low, high],
    }
}

/// Whether a tick sequence can be mapped onto pixels: every tick and the
/// covered width are finite
pub fn ticks_are_scalable(ticks: &[f64]) -> bool {
    match ticks {
        [first, .., last] => ticks.iter().all(|t| t.is_finite()) && (last - first).is_finite(),
        _ => false,
    }
}

/// Position of a tick sequence relative to zero
#[derive(Debug, Clone, Copy)]
struct TickFrame {
    step: f64,
    below: i64,
    above: i64,
}

impl TickFrame {
    fn of(ticks: &[f64]) -> Option<Self> {
        let (first, last) = match ticks {
            [first, .., last] => (*first, *last),
            _ => return None,
        };
        let step = (last - first) / (ticks.len() - 1) as f64;
        if !(step > 0.0) {
            return None;
        }
        Some(Self {
            step,
            below: (-first / step).round() as i64,
            above: (last / step).round() as i64,
        })
    }
}

/// Extend two tick sequences so that both span the same number of steps
/// below and above zero.
///
/// Each axis keeps its own step, so zero sits at the same fraction of the
/// plot height on both. Sequences with fewer than two ticks are returned
/// unchanged.
pub fn reconcile_ticks(primary: &[f64], secondary: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let (Some(p), Some(s)) = (TickFrame::of(primary), TickFrame::of(secondary)) else {
        return (primary.to_vec(), secondary.to_vec());
    };

    let below = p.below.max(s.below);
    let above = p.above.max(s.above);

    (
        extend_ticks(primary, p, below, above),
        extend_ticks(secondary, s, below, above),
    )
}

fn extend_ticks(ticks: &[f64], frame: TickFrame, below: i64, above: i64) -> Vec<f64> {
    let mut extended = Vec::with_capacity((below + above + 1).max(0) as usize);
    // Ticks already in the sequence keep their exact values
    for k in -below..=above {
        let index = k + frame.below;
        let value = if index >= 0 && (index as usize) < ticks.len() {
            ticks[index as usize]
        } else {
            clean_tick(k as f64 * frame.step, frame.step)
        };
        extended.push(value);
    }
    extended
}

/// Round away floating point noise below the step's precision
fn clean_tick(value: f64, step: f64) -> f64 {
    let decimals = ((-step.log10()).ceil() as i32 + 2).clamp(0, 15);
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Suffixes for abbreviated large numbers, ascending
const SUFFIXES: [(f64, &str); 4] = [(1e3, "k"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

/// Format a data value for display.
///
/// Large magnitudes are abbreviated with a suffix and one decimal
/// (`1500` -> `1.5k`). Smaller ones keep two decimals, or enough to show
/// three significant digits of values below one (`0.00123`).
pub fn format_tick_value(value: f64) -> String {
    format_scaled(value, |scale| {
        if scale > 1.0 {
            1
        } else {
            significant_decimals(value)
        }
    })
}

/// Format a tick of a sequence spaced `step` apart.
///
/// The decimals follow the step, so neighbouring ticks never share a label
/// (`0.001`, `0.002`) and every tick of a step keeps the same precision.
pub fn format_tick_label(value: f64, step: f64) -> String {
    format_scaled(value, |scale| step_decimals(step / scale))
}

/// Pick the suffix for `value` and print the scaled value with the number of
/// decimals `decimals` returns for that suffix's scale (1 without a suffix)
fn format_scaled(value: f64, decimals: impl Fn(f64) -> usize) -> String {
    let magnitude = value.abs();
    let Some(mut index) = SUFFIXES.iter().rposition(|(scale, _)| magnitude >= *scale) else {
        return trim_decimals(value, decimals(1.0));
    };

    let mut places = decimals(SUFFIXES[index].0);
    // 999_999 would round to "1000k"; promote to the next suffix
    if index + 1 < SUFFIXES.len() && round_to(magnitude / SUFFIXES[index].0, places as i32) >= 1000.0 {
        index += 1;
        places = decimals(SUFFIXES[index].0);
    }
    let (scale, suffix) = SUFFIXES[index];
    format!("{}{}", trim_decimals(value / scale, places), suffix)
}

/// Most decimals ever printed
const MAX_DECIMALS: f64 = 15.0;

/// Decimals showing one digit past the step's leading digit
fn step_decimals(step: f64) -> usize {
    if !(step > 0.0 && step.is_finite()) {
        return 2;
    }
    (1.0 - step.log10().floor()).clamp(0.0, MAX_DECIMALS) as usize
}

/// Two decimals, or three significant digits for values below one
fn significant_decimals(value: f64) -> usize {
    if value == 0.0 || !value.is_finite() {
        return 0;
    }
    (2.0 - value.abs().log10().floor()).clamp(2.0, MAX_DECIMALS) as usize
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn trim_decimals(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_uniform(ticks: &[f64]) {
        assert!(ticks.len() >= 2, "too few ticks: {:?}", ticks);
        let step = ticks[1] - ticks[0];
        assert!(step > 0.0);
        for pair in ticks.windows(2) {
            assert!(pair[1] > pair[0], "not increasing: {:?}", ticks);
            assert!(((pair[1] - pair[0]) - step).abs() < step * 1e-9, "uneven: {:?}", ticks);
        }
    }

    fn zero_fraction(ticks: &[f64]) -> f64 {
        let min = ticks[0];
        let max = ticks[ticks.len() - 1];
        (0.0 - min) / (max - min)
    }

    #[test]
    fn test_no_data_is_zero_spanning() {
        assert_eq!(compute_ticks(None, None, true, 5), vec![0.0, 1.0]);
        assert_eq!(compute_ticks(Some(0.0), Some(0.0), true, 5), vec![0.0, 1.0]);
    }

    #[test]
    fn test_simple_positive_range() {
        let ticks = compute_ticks(Some(10.0), Some(30.0), true, 5);
        assert_uniform(&ticks);
        assert_eq!(ticks[0], 0.0);
        assert!(*ticks.last().unwrap() >= 30.0);
        assert!(ticks.len() >= 4 && ticks.len() <= 7, "{:?}", ticks);
    }

    #[test]
    fn test_include_zero_for_positive_data() {
        let ticks = compute_ticks(Some(120.0), Some(180.0), true, 5);
        assert!(ticks.contains(&0.0));
        assert_uniform(&ticks);
    }

    #[test]
    fn test_without_zero_stays_near_data() {
        let ticks = compute_ticks(Some(120.0), Some(180.0), false, 5);
        assert_uniform(&ticks);
        assert!(ticks[0] <= 120.0 && ticks[0] > 0.0);
        assert!(*ticks.last().unwrap() >= 180.0);
    }

    #[test]
    fn test_negative_range() {
        let ticks = compute_ticks(Some(-7.0), Some(8.0), true, 5);
        assert_uniform(&ticks);
        assert!(ticks[0] <= -7.0);
        assert!(*ticks.last().unwrap() >= 8.0);
        assert!(ticks.contains(&0.0));
    }

    #[test]
    fn test_single_value_without_zero() {
        let ticks = compute_ticks(Some(5.0), None, false, 5);
        assert_uniform(&ticks);
        assert!(ticks[0] <= 5.0 && *ticks.last().unwrap() >= 5.0);
    }

    #[test]
    fn test_fractional_steps_are_clean() {
        let ticks = compute_ticks(Some(0.0), Some(2.0), true, 5);
        assert_uniform(&ticks);
        for tick in &ticks {
            let label = format_tick_value(*tick);
            assert!(label.len() <= 4, "noisy label {} for {}", label, tick);
        }
    }

    #[test]
    fn test_reconcile_aligns_zero() {
        let primary = compute_ticks(Some(10.0), Some(30.0), true, 5);
        let secondary = compute_ticks(Some(-1.0), Some(2.0), true, 5);
        let (p, s) = reconcile_ticks(&primary, &secondary);

        assert_uniform(&p);
        assert_uniform(&s);
        assert_eq!(p.len(), s.len());
        assert!((zero_fraction(&p) - zero_fraction(&s)).abs() < 1e-9);
        assert!(p[0] <= primary[0] && *p.last().unwrap() >= *primary.last().unwrap());
    }

    #[test]
    fn test_reconcile_keeps_existing_ticks() {
        let primary = vec![0.0, 10.0, 20.0, 30.0];
        let secondary = vec![-1.0, 0.0, 1.0];
        let (p, s) = reconcile_ticks(&primary, &secondary);

        assert_eq!(p, vec![-10.0, 0.0, 10.0, 20.0, 30.0]);
        assert_eq!(s, vec![-1.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reconcile_identical_frames_is_noop() {
        let ticks = vec![0.0, 5.0, 10.0];
        let other = vec![0.0, 0.5, 1.0];
        assert_eq!(reconcile_ticks(&ticks, &other), (ticks.clone(), other.clone()));
    }

    #[test]
    fn test_reconcile_degenerate_input_unchanged() {
        let (p, s) = reconcile_ticks(&[1.0], &[0.0, 1.0]);
        assert_eq!(p, vec![1.0]);
        assert_eq!(s, vec![0.0, 1.0]);
    }

    #[test]
    fn test_format_tick_value() {
        assert_eq!(format_tick_value(0.0), "0");
        assert_eq!(format_tick_value(-0.0), "0");
        assert_eq!(format_tick_value(12.0), "12");
        assert_eq!(format_tick_value(0.25), "0.25");
        assert_eq!(format_tick_value(3.6000000000000005), "3.6");
        assert_eq!(format_tick_value(1500.0), "1.5k");
        assert_eq!(format_tick_value(-2500.0), "-2.5k");
        assert_eq!(format_tick_value(2_000_000.0), "2M");
        assert_eq!(format_tick_value(999_999.0), "1M");
        assert_eq!(format_tick_value(7.5e9), "7.5B");
        assert_eq!(format_tick_value(3e12), "3T");
    }

    #[test]
    fn test_small_values_keep_significant_digits() {
        assert_eq!(format_tick_value(0.001), "0.001");
        assert_eq!(format_tick_value(-0.00123), "-0.00123");
        assert_eq!(format_tick_value(0.0042), "0.0042");
        assert_eq!(format_tick_value(123.456), "123.46");
    }

    #[test]
    fn test_tick_labels_follow_step() {
        let ticks = compute_ticks(Some(0.001), Some(0.003), true, 5);
        assert_eq!(ticks, vec![0.0, 0.001, 0.002, 0.003]);

        let labels: Vec<String> = ticks.iter().map(|t| format_tick_label(*t, 0.001)).collect();
        assert_eq!(labels, vec!["0", "0.001", "0.002", "0.003"]);

        assert_eq!(format_tick_label(0.036, 0.012), "0.036");
        assert_eq!(format_tick_label(0.024, 0.012), "0.024");
        assert_eq!(format_tick_label(20.0, 10.0), "20");
        assert_eq!(format_tick_label(7.5, 2.5), "7.5");
    }

    #[test]
    fn test_tick_labels_with_suffix_follow_step() {
        assert_eq!(format_tick_label(1250.0, 250.0), "1.25k");
        assert_eq!(format_tick_label(1500.0, 500.0), "1.5k");
        assert_eq!(format_tick_label(500.0, 500.0), "500");
        assert_eq!(format_tick_label(3_000_000.0, 1_000_000.0), "3M");
    }

    #[test]
    fn test_overflowing_span_does_not_panic() {
        let ticks = compute_ticks(Some(-1e308), Some(1e308), true, 5);
        assert_eq!(ticks, vec![-1e308, 1e308]);
        assert!(!ticks_are_scalable(&ticks));

        let ticks = compute_ticks(Some(f64::MAX), Some(f64::MAX), false, 5);
        assert!(ticks.iter().all(|t| !t.is_nan()));
    }

    #[test]
    fn test_tiny_span_does_not_panic() {
        let ticks = compute_ticks(Some(0.0), Some(5e-324), true, 5);
        assert!(ticks.len() >= 2);
        assert_eq!(ticks[0], 0.0);
    }

    #[test]
    fn test_ticks_are_scalable() {
        assert!(ticks_are_scalable(&[0.0, 10.0, 20.0]));
        assert!(!ticks_are_scalable(&[0.0, f64::INFINITY]));
        assert!(!ticks_are_scalable(&[-f64::MAX, f64::MAX]));
        assert!(!ticks_are_scalable(&[1.0]));
    }
}
