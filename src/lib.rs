//! Semicircular gauge geometry and zone classification for metric readings.
//!
//! A reading is placed on a 180 degree dial (left end = range minimum, right
//! end = range maximum) and colored by the zone of its metric's reference
//! range. Every operation is total: out-of-range, degenerate or non-finite
//! input degrades to a documented fallback instead of failing.

// ============================================================================
// MODULES
// ============================================================================

pub mod config;
pub mod error;
pub mod geometry;
pub mod zone;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use config::{MetricKey, MetricRange, ReferenceTable, REFERENCE_TABLE};
pub use error::{ConfigError, RangeError};
pub use geometry::{
    clamp, describe_arc, format_display_value, needle_position, polar_to_cartesian, to_angle,
    to_percentage, zone_to_arc_angles, ArcPath, GaugeLayout, GaugeState, Needle, Point, ZoneArc,
};
pub use zone::{classify, Category, Color, ZoneBoundary};

/// A gauge state together with the zone the reading falls into.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub metric: MetricKey,
    pub category: Category,
    pub display_value: String,
    pub gauge: GaugeState,
}

impl Reading {
    /// Projects `value` for `metric` using the ranges in `table`.
    ///
    /// Returns `None` only when the table has no entry for `metric`.
    pub fn new(
        metric: MetricKey,
        value: f64,
        table: &ReferenceTable,
        layout: &GaugeLayout,
    ) -> Option<Self> {
        let range = table.get(metric)?;
        Some(Self {
            metric,
            category: classify(value, range),
            display_value: format_display_value(value, range.decimal_places),
            gauge: layout.state(value, range),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_combines_gauge_and_zone() {
        let reading = Reading::new(
            MetricKey::Glucose,
            110.0,
            &REFERENCE_TABLE,
            &GaugeLayout::default(),
        );
        let reading = reading.expect("glucose is in the builtin table");
        assert_eq!(reading.category, Category::Caution);
        assert_eq!(reading.display_value, "110");
        assert!((reading.gauge.percentage - 0.55).abs() < 1e-9);
    }

    #[test]
    fn reading_uses_metric_precision() {
        let reading = Reading::new(
            MetricKey::Hba1c,
            5.94,
            &REFERENCE_TABLE,
            &GaugeLayout::default(),
        );
        let reading = reading.expect("hba1c is in the builtin table");
        assert_eq!(reading.display_value, "5.9");
        assert_eq!(reading.category, Category::Caution);
    }
}
