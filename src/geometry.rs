// ============================================================================
// GAUGE GEOMETRY
// ============================================================================
//
// The dial is a semicircle: 180 degrees is the left end (range minimum) and
// 0 degrees is the right end (range maximum). Angles use the usual math
// convention (0 = right, 90 = up) but screen y grows downward.

use bon::Builder;
use std::fmt;

use crate::config::MetricRange;
use crate::zone::Category;

/// Angle of the range minimum.
pub const START_ANGLE: f64 = 180.0;

/// Angle of the range maximum.
pub const END_ANGLE: f64 = 0.0;

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// SCALAR MAPPING
// ============================================================================

/// Two-sided clamp that never panics. A `NaN` value clamps to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Normalized position of `value` in `[min, max]`, always within `[0, 1]`.
///
/// Returns 0 when the range has no positive finite span (`min == max`,
/// inverted bounds, infinite bounds) or when `value` is `NaN`.
pub fn to_percentage(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return 0.0;
    }
    if value.is_nan() {
        return 0.0;
    }
    (clamp(value, min, max) - min) / span
}

/// Maps a percentage onto the dial: 0 -> 180 degrees, 1 -> 0 degrees.
pub fn to_angle(percentage: f64) -> f64 {
    let percentage = if percentage.is_nan() {
        0.0
    } else {
        clamp(percentage, 0.0, 1.0)
    };
    START_ANGLE - percentage * START_ANGLE
}

/// Converts a polar position to screen coordinates (y axis pointing down).
pub fn polar_to_cartesian(center_x: f64, center_y: f64, radius: f64, angle_degrees: f64) -> Point {
    let rad = angle_degrees.to_radians();
    Point::new(center_x + radius * rad.cos(), center_y - radius * rad.sin())
}

// ============================================================================
// ARC PATHS
// ============================================================================

/// An elliptical-arc segment between two points on a circle.
///
/// `Display` renders it as an SVG path: `M sx sy A r r 0 large sweep ex ey`,
/// with coordinates rounded to six decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPath {
    pub start: Point,
    pub end: Point,
    pub radius: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

impl ArcPath {
    pub fn new(center_x: f64, center_y: f64, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        let start = polar_to_cartesian(center_x, center_y, radius, start_angle);
        let end = polar_to_cartesian(center_x, center_y, radius, end_angle);
        let span = (start_angle - end_angle).abs();
        Self {
            start,
            end,
            radius,
            large_arc: span > 180.0,
            // Always drawn clockwise on screen, from the higher angle down.
            sweep: true,
        }
    }
}

/// Path coordinates are snapped to this many steps per unit.
const PATH_GRID: f64 = 1e6;

/// Drops trig residue such as `99.99999999999999` or `-1.2e-15`.
fn snap(value: f64) -> f64 {
    let snapped = (value * PATH_GRID).round() / PATH_GRID;
    if snapped.is_finite() {
        without_negative_zero(snapped)
    } else {
        value
    }
}

impl fmt::Display for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} {} A {} {} 0 {} {} {} {}",
            snap(self.start.x),
            snap(self.start.y),
            snap(self.radius),
            snap(self.radius),
            u8::from(self.large_arc),
            u8::from(self.sweep),
            snap(self.end.x),
            snap(self.end.y),
        )
    }
}

/// SVG path descriptor for the arc from `start_angle` to `end_angle`.
pub fn describe_arc(
    center_x: f64,
    center_y: f64,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
) -> String {
    ArcPath::new(center_x, center_y, radius, start_angle, end_angle).to_string()
}

// ============================================================================
// DERIVED OPERATIONS
// ============================================================================

/// Needle tip and the angle it points at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Needle {
    pub tip: Point,
    pub angle: f64,
}

pub fn needle_position(
    value: f64,
    min: f64,
    max: f64,
    center_x: f64,
    center_y: f64,
    length: f64,
) -> Needle {
    let angle = to_angle(to_percentage(value, min, max));
    Needle {
        tip: polar_to_cartesian(center_x, center_y, length, angle),
        angle,
    }
}

/// Dial angles for a zone. The zone start (lower value) maps to the higher
/// angle, so the returned pair is `(larger, smaller)` for a well-formed zone.
pub fn zone_to_arc_angles(zone_start: f64, zone_end: f64, range_min: f64, range_max: f64) -> (f64, f64) {
    (
        to_angle(to_percentage(zone_start, range_min, range_max)),
        to_angle(to_percentage(zone_end, range_min, range_max)),
    )
}

/// Most fractional digits `format_display_value` will print.
pub const MAX_DECIMAL_PLACES: usize = 10;

/// Formats a reading for display.
///
/// Whole numbers and `decimal_places == 0` are printed without a decimal
/// point; anything else gets exactly `decimal_places` fractional digits,
/// capped at [`MAX_DECIMAL_PLACES`]. Both cases round half away from zero.
pub fn format_display_value(value: f64, decimal_places: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 || decimal_places == 0 {
        let rounded = without_negative_zero(value.round());
        return format!("{rounded:.0}");
    }

    let places = decimal_places.min(MAX_DECIMAL_PLACES);
    // Bounded by MAX_DECIMAL_PLACES, so the cast is lossless.
    let scale = 10f64.powi(places as i32);
    let scaled = value * scale;
    let rounded = if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    };
    let rounded = without_negative_zero(rounded);
    format!("{rounded:.places$}")
}

fn without_negative_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

// ============================================================================
// GAUGE LAYOUT
// ============================================================================

/// Screen placement of a gauge dial.
#[derive(Debug, Clone, Builder)]
pub struct GaugeLayout {
    #[builder(default = 120.0)]
    pub center_x: f64,
    #[builder(default = 120.0)]
    pub center_y: f64,
    #[builder(default = 100.0)]
    pub radius: f64,
    #[builder(default = 85.0)]
    pub needle_length: f64,
}

impl Default for GaugeLayout {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One colored band of the dial.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneArc {
    pub category: Category,
    pub start_angle: f64,
    pub end_angle: f64,
    pub path: String,
}

/// Everything a renderer needs to draw one gauge. Recomputed on every paint.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeState {
    /// Raw input, unclamped.
    pub value: f64,
    pub percentage: f64,
    pub angle_degrees: f64,
    pub needle_tip: Point,
    /// Filled arc from the range minimum up to the value.
    pub arc_path: String,
    /// Full background arc.
    pub track_path: String,
    pub zone_arcs: Vec<ZoneArc>,
}

impl GaugeLayout {
    pub fn state(&self, value: f64, range: &MetricRange) -> GaugeState {
        let percentage = to_percentage(value, range.min, range.max);
        let angle_degrees = to_angle(percentage);
        let needle = needle_position(
            value,
            range.min,
            range.max,
            self.center_x,
            self.center_y,
            self.needle_length,
        );

        let zone_arcs = range
            .zones
            .iter()
            .map(|zone| {
                let (start_angle, end_angle) =
                    zone_to_arc_angles(zone.start, zone.end, range.min, range.max);
                ZoneArc {
                    category: zone.category,
                    start_angle,
                    end_angle,
                    path: self.arc(start_angle, end_angle),
                }
            })
            .collect();

        GaugeState {
            value,
            percentage,
            angle_degrees,
            needle_tip: needle.tip,
            arc_path: self.arc(START_ANGLE, angle_degrees),
            track_path: self.arc(START_ANGLE, END_ANGLE),
            zone_arcs,
        }
    }

    fn arc(&self, start_angle: f64, end_angle: f64) -> String {
        describe_arc(self.center_x, self.center_y, self.radius, start_angle, end_angle)
    }
}
