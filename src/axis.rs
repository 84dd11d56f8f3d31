//! Data limits, tick placement and the data-to-pixel transform.

use glam::DVec2;

use crate::figure::{Mark, Shape};
use crate::primitives::Rect;

/// Fraction of the data span added on each side of the view.
pub const MARGIN: f64 = 0.05;

const NICE_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

// Magnitudes below this are treated as zero when widening a range.
const TINY_RANGE: f64 = 1e-300;

// Steps outside this band switch tick labels to scientific notation.
const PLAIN_STEPS: std::ops::Range<f64> = 1e-5..1e6;

/// Axis-aligned data bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min: DVec2::ZERO,
            max: DVec2::ONE,
        }
    }
}

impl Limits {
    /// Bounds of every mark, widened where a span is zero. No marks gives the unit square.
    pub fn of(marks: &[Mark]) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);

        let mut include = |lo: DVec2, hi: DVec2| {
            min = min.min(lo);
            max = max.max(hi);
        };

        for mark in marks {
            match &mark.shape {
                Shape::Markers(points) | Shape::Polyline(points) => {
                    points.iter().for_each(|p| include(*p, *p));
                }
                Shape::Polygon { vertices, .. } => {
                    vertices.iter().for_each(|p| include(*p, *p));
                }
                Shape::Circle { center, radius } => {
                    include(*center - *radius, *center + *radius);
                }
            }
        }

        if !min.is_finite() || !max.is_finite() {
            return Self::default();
        }

        let (min_x, max_x) = nonsingular(min.x, max.x);
        let (min_y, max_y) = nonsingular(min.y, max.y);
        Self {
            min: DVec2::new(min_x, min_y),
            max: DVec2::new(max_x, max_y),
        }
    }

    /// Pads each side by `fraction` of the span, staying finite.
    pub fn with_margins(self, fraction: f64) -> Self {
        let pad = self.half_span() * (2.0 * fraction);
        Self {
            min: (self.min - pad).max(DVec2::splat(-f64::MAX)),
            max: (self.max + pad).min(DVec2::splat(f64::MAX)),
        }
    }

    /// Half of `max - min`, which cannot overflow for finite limits.
    pub fn half_span(&self) -> DVec2 {
        self.max * 0.5 - self.min * 0.5
    }
}

fn nonsingular(lo: f64, hi: f64) -> (f64, f64) {
    let largest = lo.abs().max(hi.abs());
    if largest < TINY_RANGE {
        return (-0.05, 0.05);
    }
    if hi * 0.5 - lo * 0.5 > largest * 1e-15 {
        return (lo, hi);
    }
    let delta = largest * 0.05;
    ((lo - delta).max(-f64::MAX), (hi + delta).min(f64::MAX))
}

/// Tick values and the spacing between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticks {
    pub values: Vec<f64>,
    pub step: f64,
}

/// Ticks on a 1, 2, 2.5 or 5 times a power of ten step, inside `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Ticks {
    let single = || Ticks {
        values: vec![min],
        step: 1.0,
    };

    let half_span = max * 0.5 - min * 0.5;
    if !(half_span > 0.0) || !half_span.is_finite() {
        return single();
    }

    let target = target.max(1);
    let half_raw = half_span / target as f64;
    let magnitude = 10f64.powi((half_raw.log10() + 2f64.log10()).floor() as i32);
    let step = NICE_STEPS
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s * 0.5 >= half_raw * (1.0 - 1e-9))
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil();
    if !(step > 0.0) || !step.is_finite() || !first.is_finite() {
        return single();
    }

    let epsilon = step * 1e-9;
    let mut values = Vec::new();
    for k in 0..(target * 4 + 2) {
        let mut value = (first + k as f64) * step;
        if value > max + epsilon {
            break;
        }
        if value.abs() < epsilon {
            value = 0.0;
        }
        values.push(value);
    }

    Ticks { values, step }
}

/// Print a tick with as many decimals as its step needs.
pub fn format_tick(value: f64, step: f64) -> String {
    if value != 0.0 && !PLAIN_STEPS.contains(&step.abs()) {
        return format_scientific(value);
    }

    let mut decimals = 0;
    while decimals < 10 {
        let scaled = step * 10f64.powi(decimals as i32);
        if (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0) {
            break;
        }
        decimals += 1;
    }

    let text = format!("{:.*}", decimals, value);
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

fn format_scientific(value: f64) -> String {
    let text = format!("{:.2e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
            format!("{}e{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// Maps data coordinates into a pixel rectangle, y pointing up.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    limits: Limits,
    origin: DVec2,
    size: DVec2,
}

impl Transform {
    pub fn new(limits: Limits, area: Rect) -> Self {
        Self {
            limits,
            origin: DVec2::new(area.x as f64, area.y as f64),
            size: DVec2::new(area.width as f64, area.height as f64),
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn to_pixel(&self, point: DVec2) -> DVec2 {
        let t = (point * 0.5 - self.limits.min * 0.5) / self.limits.half_span();
        DVec2::new(
            self.origin.x + t.x * self.size.x,
            self.origin.y + (1.0 - t.y) * self.size.y,
        )
    }

    pub fn x_to_pixel(&self, x: f64) -> f64 {
        self.to_pixel(DVec2::new(x, self.limits.min.y)).x
    }

    pub fn y_to_pixel(&self, y: f64) -> f64 {
        self.to_pixel(DVec2::new(self.limits.min.x, y)).y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn mark(shape: Shape) -> Mark {
        Mark {
            shape,
            color: Color::BLACK,
            label: None,
        }
    }

    #[test]
    fn test_empty_limits_are_unit_square() {
        assert_eq!(Limits::of(&[]), Limits::default());
    }

    #[test]
    fn test_limits_include_circle_extent() {
        let marks = [
            mark(Shape::Markers(vec![DVec2::new(0.0, 0.0)])),
            mark(Shape::Circle {
                center: DVec2::new(5.0, 5.0),
                radius: 2.0,
            }),
        ];
        let limits = Limits::of(&marks);
        assert_eq!(limits.min, DVec2::new(0.0, 0.0));
        assert_eq!(limits.max, DVec2::new(7.0, 7.0));
    }

    #[test]
    fn test_single_point_is_widened() {
        let limits = Limits::of(&[mark(Shape::Markers(vec![DVec2::new(2.0, 0.0)]))]);
        assert!((limits.min.x - 1.9).abs() < 1e-12);
        assert!((limits.max.x - 2.1).abs() < 1e-12);
        assert!((limits.min.y + 0.05).abs() < 1e-12);
        assert!((limits.max.y - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_margins() {
        let limits = Limits {
            min: DVec2::new(0.0, -10.0),
            max: DVec2::new(10.0, 10.0),
        }
        .with_margins(MARGIN);
        assert_eq!(limits.min, DVec2::new(-0.5, -11.0));
        assert_eq!(limits.max, DVec2::new(10.5, 11.0));
    }

    #[test]
    fn test_nice_ticks_unit_range() {
        let ticks = nice_ticks(-0.05, 1.05, 6);
        assert!((ticks.step - 0.2).abs() < 1e-12);
        assert_eq!(ticks.values.len(), 6);
        assert_eq!(ticks.values[0], 0.0);
        assert!((ticks.values[5] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_nice_ticks_stay_in_range() {
        for (lo, hi) in [(-3.7, 12.2), (0.001, 0.0042), (-1e6, 5e5), (99.5, 100.5)] {
            let ticks = nice_ticks(lo, hi, 6);
            assert!(!ticks.values.is_empty(), "no ticks for {}..{}", lo, hi);
            for v in &ticks.values {
                assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9, "{} outside {}..{}", v, lo, hi);
            }
            let mantissa = ticks.step / 10f64.powf(ticks.step.log10().floor());
            assert!(
                NICE_STEPS.iter().any(|m| (m - mantissa).abs() < 1e-9),
                "step {} is not nice",
                ticks.step
            );
        }
    }

    #[test]
    fn test_nice_ticks_subnormal_span_terminates() {
        let ticks = nice_ticks(0.0, 1e-310, 6);
        assert!(!ticks.values.is_empty());
        assert!(ticks.values.len() <= 26);
        assert!(ticks.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_nice_ticks_near_float_limits() {
        let ticks = nice_ticks(-1.1e308, 1.1e308, 6);
        assert!((ticks.step / 5e307 - 1.0).abs() < 1e-9);
        assert_eq!(ticks.values.len(), 5);
        assert!(ticks.values.iter().all(|v| v.is_finite()));

        let ticks = nice_ticks(-f64::MAX, f64::MAX, 1);
        assert!(ticks.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_tiny_values_widen_around_zero() {
        let marks = [mark(Shape::Markers(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1e-310, 1.0),
        ]))];
        let limits = Limits::of(&marks);
        assert_eq!(limits.min.x, -0.05);
        assert_eq!(limits.max.x, 0.05);
        assert_eq!(limits.max.y, 1.0);
    }

    #[test]
    fn test_huge_limits_stay_finite() {
        let marks = [mark(Shape::Markers(vec![
            DVec2::new(-1e308, 0.0),
            DVec2::new(1e308, 1.0),
        ]))];
        let limits = Limits::of(&marks).with_margins(MARGIN);
        assert!(limits.min.is_finite() && limits.max.is_finite());
        assert!(limits.min.x < -1e308 && limits.max.x > 1e308);

        let single = Limits::of(&[mark(Shape::Markers(vec![DVec2::new(1.75e308, 0.0)]))])
            .with_margins(MARGIN);
        assert!(single.min.is_finite() && single.max.is_finite());
        assert_eq!(single.max.x, f64::MAX);

        let transform = Transform::new(limits, Rect::new(0, 0, 100, 100));
        let left = transform.to_pixel(DVec2::new(-1e308, 0.0));
        let right = transform.to_pixel(DVec2::new(1e308, 1.0));
        assert!(left.is_finite() && right.is_finite());
        assert!(left.x > 0.0 && left.x < 10.0);
        assert!(right.x > 90.0 && right.x < 100.0);
    }

    #[test]
    fn test_format_tick_scientific() {
        assert_eq!(format_tick(5e307, 5e307), "5e307");
        assert_eq!(format_tick(-2.5e10, 2.5e9), "-2.5e10");
        assert_eq!(format_tick(3e-7, 1e-7), "3e-7");
        assert_eq!(format_tick(0.0, 5e307), "0");
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(2.0, 1.0), "2");
        assert_eq!(format_tick(0.4, 0.2), "0.4");
        assert_eq!(format_tick(1.25, 0.25), "1.25");
        assert_eq!(format_tick(-0.0, 0.5), "0.0");
        assert_eq!(format_tick(-1e-12, 0.1), "0.0");
        assert_eq!(format_tick(-2.5, 2.5), "-2.5");
        assert_eq!(format_tick(2000.0, 500.0), "2000");
    }

    #[test]
    fn test_transform_corners() {
        let limits = Limits {
            min: DVec2::new(0.0, 0.0),
            max: DVec2::new(10.0, 5.0),
        };
        let transform = Transform::new(limits, Rect::new(100, 50, 200, 100));
        assert_eq!(transform.to_pixel(DVec2::new(0.0, 0.0)), DVec2::new(100.0, 150.0));
        assert_eq!(transform.to_pixel(DVec2::new(10.0, 5.0)), DVec2::new(300.0, 50.0));
        assert_eq!(transform.x_to_pixel(5.0), 200.0);
        assert_eq!(transform.y_to_pixel(2.5), 100.0);
    }
}
