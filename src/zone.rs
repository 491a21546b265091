// ============================================================================
// ZONE CLASSIFICATION
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::MetricRange;
use crate::geometry::clamp;

/// Color representation for zone bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Severity band a reading falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Optimal,
    Caution,
    Concerning,
}

impl Category {
    pub const fn color(self) -> Color {
        match self {
            Category::Optimal => Color::new(0x2e, 0xa0, 0x43),
            Category::Caution => Color::new(0xf0, 0xa2, 0x02),
            Category::Concerning => Color::new(0xd6, 0x28, 0x28),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Category::Optimal => "optimal",
            Category::Caution => "caution",
            Category::Concerning => "concerning",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An inclusive `[start, end]` interval of a metric's range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBoundary {
    pub start: f64,
    pub end: f64,
    pub category: Category,
}

impl ZoneBoundary {
    pub const fn new(start: f64, end: f64, category: Category) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && value <= self.end
    }
}

/// Category of `value` within `range`.
///
/// The value is clamped to the range first. Zones are checked in order and
/// the first inclusive match wins, so a shared boundary belongs to the lower
/// zone. Non-finite values and values no zone covers are `Concerning`.
pub fn classify(value: f64, range: &MetricRange) -> Category {
    if !value.is_finite() {
        tracing::debug!(value, "non-finite reading, falling back to concerning");
        return Category::Concerning;
    }

    let clamped = clamp(value, range.min, range.max);
    match range.zones.iter().find(|zone| zone.contains(clamped)) {
        Some(zone) => zone.category,
        None => {
            tracing::debug!(
                value,
                clamped,
                min = range.min,
                max = range.max,
                "no zone covers reading, falling back to concerning"
            );
            Category::Concerning
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64, zones: Vec<ZoneBoundary>) -> MetricRange {
        MetricRange {
            min,
            max,
            unit: String::new(),
            decimal_places: 0,
            zones,
        }
    }

    fn three_zone() -> MetricRange {
        range(
            0.0,
            200.0,
            vec![
                ZoneBoundary::new(0.0, 15.0, Category::Concerning),
                ZoneBoundary::new(15.0, 30.0, Category::Caution),
                ZoneBoundary::new(30.0, 200.0, Category::Optimal),
            ],
        )
    }

    #[test]
    fn classifies_inside_each_zone() {
        let r = three_zone();
        assert_eq!(classify(10.0, &r), Category::Concerning);
        assert_eq!(classify(20.0, &r), Category::Caution);
        assert_eq!(classify(150.0, &r), Category::Optimal);
    }

    #[test]
    fn shared_boundary_goes_to_first_zone() {
        let r = range(
            0.0,
            100.0,
            vec![
                ZoneBoundary::new(0.0, 50.0, Category::Concerning),
                ZoneBoundary::new(50.0, 70.0, Category::Caution),
                ZoneBoundary::new(70.0, 100.0, Category::Optimal),
            ],
        );
        assert_eq!(classify(50.0, &r), Category::Concerning);
        assert_eq!(classify(70.0, &r), Category::Caution);
    }

    #[test]
    fn out_of_range_uses_clamped_value() {
        let r = three_zone();
        assert_eq!(classify(-40.0, &r), classify(0.0, &r));
        assert_eq!(classify(10_000.0, &r), classify(200.0, &r));
        assert_eq!(classify(10_000.0, &r), Category::Optimal);
    }

    #[test]
    fn non_finite_is_concerning() {
        let r = three_zone();
        assert_eq!(classify(f64::NAN, &r), Category::Concerning);
        assert_eq!(classify(f64::INFINITY, &r), Category::Concerning);
        assert_eq!(classify(f64::NEG_INFINITY, &r), Category::Concerning);
    }

    #[test]
    fn gap_in_zones_falls_back_to_concerning() {
        let r = range(
            0.0,
            100.0,
            vec![
                ZoneBoundary::new(0.0, 40.0, Category::Optimal),
                ZoneBoundary::new(60.0, 100.0, Category::Optimal),
            ],
        );
        assert_eq!(classify(50.0, &r), Category::Concerning);
    }

    #[test]
    fn empty_zone_table_is_concerning() {
        assert_eq!(classify(0.5, &range(0.0, 1.0, vec![])), Category::Concerning);
    }

    #[test]
    fn category_presentation() {
        assert_eq!(Category::Caution.to_string(), "caution");
        assert_eq!(Category::Concerning.color().as_tuple(), (0xd6, 0x28, 0x28));
        assert_ne!(Category::Optimal.color(), Category::Caution.color());
    }
}
