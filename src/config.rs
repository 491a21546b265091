// ============================================================================
// REFERENCE RANGES
// ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{ConfigError, RangeError};
use crate::geometry::MAX_DECIMAL_PLACES;
use crate::zone::{Category, ZoneBoundary};

/// The metrics a user can enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Glucose,
    Hba1c,
    Ldl,
    Hdl,
    Triglycerides,
    VitaminD,
}

impl MetricKey {
    pub const ALL: [MetricKey; 6] = [
        MetricKey::Glucose,
        MetricKey::Hba1c,
        MetricKey::Ldl,
        MetricKey::Hdl,
        MetricKey::Triglycerides,
        MetricKey::VitaminD,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            MetricKey::Glucose => "glucose",
            MetricKey::Hba1c => "hba1c",
            MetricKey::Ldl => "ldl",
            MetricKey::Hdl => "hdl",
            MetricKey::Triglycerides => "triglycerides",
            MetricKey::VitaminD => "vitamin_d",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MetricKey::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownMetric(s.to_string()))
    }
}

/// Display range and zone table of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
    pub unit: String,
    #[serde(default)]
    pub decimal_places: usize,
    pub zones: Vec<ZoneBoundary>,
}

impl MetricRange {
    /// Checks that the zones partition `[min, max]` in ascending order.
    pub fn validate(&self) -> Result<(), RangeError> {
        let span = self.max - self.min;
        if !self.min.is_finite() || !self.max.is_finite() || !span.is_finite() || span <= 0.0 {
            return Err(RangeError::InvalidBounds {
                min: self.min,
                max: self.max,
            });
        }

        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(RangeError::TooManyDecimalPlaces {
                decimal_places: self.decimal_places,
                max: MAX_DECIMAL_PLACES,
            });
        }

        let (first, last) = match (self.zones.first(), self.zones.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(RangeError::NoZones),
        };

        for (index, zone) in self.zones.iter().enumerate() {
            // Negated so NaN boundaries are rejected too.
            if !(zone.start <= zone.end) {
                return Err(RangeError::InvertedZone {
                    index,
                    start: zone.start,
                    end: zone.end,
                });
            }
        }

        for (index, pair) in self.zones.windows(2).enumerate() {
            if pair[1].start != pair[0].end {
                return Err(RangeError::Discontinuous {
                    index: index + 1,
                    previous_end: pair[0].end,
                    start: pair[1].start,
                });
            }
        }

        if first.start != self.min || last.end != self.max {
            return Err(RangeError::Coverage {
                min: self.min,
                max: self.max,
                first_start: first.start,
                last_end: last.end,
            });
        }

        Ok(())
    }
}

/// Read-only mapping from metric to its reference range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    ranges: BTreeMap<MetricKey, MetricRange>,
}

impl ReferenceTable {
    /// Builds a table and validates every range.
    pub fn new(ranges: BTreeMap<MetricKey, MetricRange>) -> Result<Self, ConfigError> {
        let table = Self { ranges };
        table.validate()?;
        Ok(table)
    }

    pub fn get(&self, key: MetricKey) -> Option<&MetricRange> {
        self.ranges.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, &MetricRange)> + '_ {
        self.ranges.iter().map(|(key, range)| (*key, range))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in MetricKey::ALL {
            let range = self.get(key).ok_or(ConfigError::MissingMetric(key))?;
            range
                .validate()
                .map_err(|source| ConfigError::InvalidRange { metric: key, source })?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let ranges: BTreeMap<MetricKey, MetricRange> = serde_json::from_str(json)?;
        Self::new(ranges)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), metrics = table.ranges.len(), "loaded reference table");
        Ok(table)
    }

    /// The shipped reference ranges.
    pub fn builtin() -> Self {
        use Category::{Caution, Concerning, Optimal};

        let ranges = BTreeMap::from([
            (
                MetricKey::Glucose,
                range(
                    0.0,
                    200.0,
                    "mg/dL",
                    0,
                    &[
                        (0.0, 60.0, Concerning),
                        (60.0, 70.0, Caution),
                        (70.0, 105.0, Optimal),
                        (105.0, 120.0, Caution),
                        (120.0, 200.0, Concerning),
                    ],
                ),
            ),
            (
                MetricKey::Hba1c,
                range(
                    3.0,
                    12.0,
                    "%",
                    1,
                    &[
                        (3.0, 5.7, Optimal),
                        (5.7, 6.5, Caution),
                        (6.5, 12.0, Concerning),
                    ],
                ),
            ),
            (
                MetricKey::Ldl,
                range(
                    0.0,
                    250.0,
                    "mg/dL",
                    0,
                    &[
                        (0.0, 100.0, Optimal),
                        (100.0, 160.0, Caution),
                        (160.0, 250.0, Concerning),
                    ],
                ),
            ),
            (
                MetricKey::Hdl,
                range(
                    0.0,
                    120.0,
                    "mg/dL",
                    0,
                    &[
                        (0.0, 40.0, Concerning),
                        (40.0, 60.0, Caution),
                        (60.0, 120.0, Optimal),
                    ],
                ),
            ),
            (
                MetricKey::Triglycerides,
                range(
                    0.0,
                    500.0,
                    "mg/dL",
                    0,
                    &[
                        (0.0, 150.0, Optimal),
                        (150.0, 200.0, Caution),
                        (200.0, 500.0, Concerning),
                    ],
                ),
            ),
            (
                MetricKey::VitaminD,
                range(
                    0.0,
                    200.0,
                    "ng/mL",
                    0,
                    &[
                        (0.0, 15.0, Concerning),
                        (15.0, 30.0, Caution),
                        (30.0, 100.0, Optimal),
                        (100.0, 150.0, Caution),
                        (150.0, 200.0, Concerning),
                    ],
                ),
            ),
        ]);

        Self { ranges }
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn range(
    min: f64,
    max: f64,
    unit: &str,
    decimal_places: usize,
    zones: &[(f64, f64, Category)],
) -> MetricRange {
    MetricRange {
        min,
        max,
        unit: unit.to_string(),
        decimal_places,
        zones: zones
            .iter()
            .map(|&(start, end, category)| ZoneBoundary::new(start, end, category))
            .collect(),
    }
}

/// Global reference table instance
pub static REFERENCE_TABLE: LazyLock<ReferenceTable> = LazyLock::new(ReferenceTable::builtin);

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_range() -> MetricRange {
        range(
            0.0,
            100.0,
            "u",
            0,
            &[
                (0.0, 50.0, Category::Concerning),
                (50.0, 100.0, Category::Optimal),
            ],
        )
    }

    #[test]
    fn builtin_table_is_well_formed() {
        let table = ReferenceTable::builtin();
        assert_eq!(table.validate().map_err(|e| e.to_string()), Ok(()));
        assert_eq!(table.iter().count(), MetricKey::ALL.len());
    }

    #[test]
    fn static_table_matches_builtin() {
        assert_eq!(*REFERENCE_TABLE, ReferenceTable::builtin());
    }

    #[test]
    fn metric_keys_parse_and_print() {
        for key in MetricKey::ALL {
            assert_eq!(key.to_string().parse::<MetricKey>().ok(), Some(key));
        }
        assert_eq!(" Vitamin_D ".parse::<MetricKey>().ok(), Some(MetricKey::VitaminD));
        assert!(matches!(
            "ferritin".parse::<MetricKey>(),
            Err(ConfigError::UnknownMetric(name)) if name == "ferritin"
        ));
    }

    #[test]
    fn rejects_degenerate_bounds() {
        let mut r = simple_range();
        r.max = r.min;
        assert_eq!(
            r.validate(),
            Err(RangeError::InvalidBounds { min: 0.0, max: 0.0 })
        );
    }

    #[test]
    fn rejects_span_that_overflows() {
        let mut r = simple_range();
        r.min = -1e308;
        r.max = 1e308;
        r.zones = vec![ZoneBoundary::new(-1e308, 1e308, Category::Optimal)];
        assert!(matches!(r.validate(), Err(RangeError::InvalidBounds { .. })));
    }

    #[test]
    fn rejects_excessive_decimal_places() {
        let mut r = simple_range();
        r.decimal_places = MAX_DECIMAL_PLACES;
        assert_eq!(r.validate(), Ok(()));

        r.decimal_places = 70_000;
        assert_eq!(
            r.validate(),
            Err(RangeError::TooManyDecimalPlaces {
                decimal_places: 70_000,
                max: MAX_DECIMAL_PLACES
            })
        );
    }

    #[test]
    fn loader_rejects_excessive_decimal_places() {
        let mut table = ReferenceTable::builtin();
        if let Some(r) = table.ranges.get_mut(&MetricKey::Hba1c) {
            r.decimal_places = 70_000;
        }
        let json = serde_json::to_string(&table).unwrap_or_default();
        assert!(matches!(
            ReferenceTable::from_json_str(&json),
            Err(ConfigError::InvalidRange {
                metric: MetricKey::Hba1c,
                source: RangeError::TooManyDecimalPlaces { .. }
            })
        ));
    }

    #[test]
    fn rejects_empty_zones() {
        let mut r = simple_range();
        r.zones.clear();
        assert_eq!(r.validate(), Err(RangeError::NoZones));
    }

    #[test]
    fn rejects_inverted_zone() {
        let mut r = simple_range();
        r.zones[0] = ZoneBoundary::new(50.0, 0.0, Category::Concerning);
        assert!(matches!(
            r.validate(),
            Err(RangeError::InvertedZone { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_gap_and_overlap() {
        let mut gap = simple_range();
        gap.zones[1].start = 60.0;
        assert_eq!(
            gap.validate(),
            Err(RangeError::Discontinuous {
                index: 1,
                previous_end: 50.0,
                start: 60.0
            })
        );

        let mut overlap = simple_range();
        overlap.zones[1].start = 40.0;
        assert!(matches!(
            overlap.validate(),
            Err(RangeError::Discontinuous { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_partial_coverage() {
        let mut r = simple_range();
        r.zones[1].end = 90.0;
        assert!(matches!(r.validate(), Err(RangeError::Coverage { .. })));
    }

    #[test]
    fn json_round_trip_through_loader() {
        let json = serde_json::to_string(&ReferenceTable::builtin()).unwrap_or_default();
        let loaded = ReferenceTable::from_json_str(&json);
        assert_eq!(loaded.ok(), Some(ReferenceTable::builtin()));
    }

    #[test]
    fn loader_requires_every_metric() {
        let json = r#"{
            "glucose": {
                "min": 0, "max": 200, "unit": "mg/dL",
                "zones": [{ "start": 0, "end": 200, "category": "optimal" }]
            }
        }"#;
        assert!(matches!(
            ReferenceTable::from_json_str(json),
            Err(ConfigError::MissingMetric(MetricKey::Hba1c))
        ));
    }

    #[test]
    fn loader_reports_invalid_range() {
        let mut table = ReferenceTable::builtin();
        if let Some(r) = table.ranges.get_mut(&MetricKey::Ldl) {
            r.zones.pop();
        }
        let json = serde_json::to_string(&table).unwrap_or_default();
        let err = ReferenceTable::from_json_str(&json).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidRange {
                metric: MetricKey::Ldl,
                source: RangeError::Coverage { .. }
            })
        ));
    }

    #[test]
    fn loader_reports_bad_json() {
        assert!(matches!(
            ReferenceTable::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
