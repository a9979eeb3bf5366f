//! Historical observation records for a single station.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One historical observation for a station, in canonical wire units:
/// temperatures in °F, wind components in m/s, pressure in mb, precipitation
/// in mm.
///
/// A sequence of points for one station is ordered by ascending `timestamp`;
/// that ordering is a precondition from the upstream service, not something
/// this crate re-sorts.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherPoint {
    /// ISO-8601 observation time.
    pub timestamp: String,
    /// Air temperature, °F.
    pub temperature: f64,
    /// Dew point, °F.
    pub dewpoint: f64,
    /// Wind vector component, m/s. Orthogonal to `wind_y`.
    pub wind_x: f64,
    /// Wind vector component, m/s. Orthogonal to `wind_x`.
    pub wind_y: f64,
    /// Station pressure in millibars, absent or null when not measured.
    #[serde(default)]
    pub pressure: Option<f64>,
    /// Accumulated precipitation for the interval, mm.
    pub precip: f64,
}

impl WeatherPoint {
    /// The observation time parsed to UTC, `None` when the wire timestamp is
    /// not valid RFC 3339.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Historical weather for one station. Zero points is a valid, representable
/// state, distinct from a decode failure.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoricalWeatherData {
    #[serde(default)]
    pub points: Vec<WeatherPoint>,
}

impl HistoricalWeatherData {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The conventional "current" observation: the last point in the series.
    pub fn latest(&self) -> Option<&WeatherPoint> {
        self.points.last()
    }

    /// Observation at a scrubbed index, for callers stepping back through
    /// the series.
    pub fn at(&self, index: usize) -> Option<&WeatherPoint> {
        self.points.get(index)
    }

    /// Min/max temperature and mean pressure across the series, `None` when
    /// there are no points. Points without a pressure reading do not
    /// contribute to the mean.
    pub fn summary(&self) -> Option<WeatherSummary> {
        let first = self.points.first()?;
        let mut min_temperature = first.temperature;
        let mut max_temperature = first.temperature;
        let mut pressure_sum = 0.0;
        let mut pressure_count = 0usize;
        for point in &self.points {
            min_temperature = min_temperature.min(point.temperature);
            max_temperature = max_temperature.max(point.temperature);
            if let Some(pressure) = point.pressure {
                pressure_sum += pressure;
                pressure_count += 1;
            }
        }
        Some(WeatherSummary {
            min_temperature,
            max_temperature,
            mean_pressure: (pressure_count > 0).then(|| pressure_sum / pressure_count as f64),
        })
    }
}

/// Aggregates over one station's observation series, in wire units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSummary {
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Mean over the points that reported pressure; `None` when none did.
    pub mean_pressure: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(temperature: f64, pressure: Option<f64>) -> WeatherPoint {
        WeatherPoint {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            temperature,
            dewpoint: 30.0,
            wind_x: 3.0,
            wind_y: 4.0,
            pressure,
            precip: 0.0,
        }
    }

    #[test]
    fn pressure_may_be_null_or_absent() {
        let with_null: WeatherPoint = serde_json::from_str(
            r#"{"timestamp":"2024-01-01T00:00:00Z","temperature":32,"dewpoint":30,
                "wind_x":3,"wind_y":4,"pressure":null,"precip":0}"#,
        )
        .unwrap();
        assert_eq!(with_null.pressure, None);

        let absent: WeatherPoint = serde_json::from_str(
            r#"{"timestamp":"2024-01-01T00:00:00Z","temperature":32,"dewpoint":30,
                "wind_x":3,"wind_y":4,"precip":0}"#,
        )
        .unwrap();
        assert_eq!(absent.pressure, None);
    }

    #[test]
    fn empty_object_decodes_to_zero_points() {
        let data: HistoricalWeatherData = serde_json::from_str("{}").unwrap();
        assert!(data.is_empty());
        assert!(data.latest().is_none());
        assert!(data.summary().is_none());
    }

    #[test]
    fn latest_is_last_point() {
        let data = HistoricalWeatherData {
            points: vec![point(32.0, None), point(40.0, None)],
        };
        assert_eq!(data.latest().map(|p| p.temperature), Some(40.0));
        assert_eq!(data.at(0).map(|p| p.temperature), Some(32.0));
        assert!(data.at(2).is_none());
    }

    #[test]
    fn summary_skips_missing_pressure() {
        let data = HistoricalWeatherData {
            points: vec![
                point(32.0, Some(1010.0)),
                point(50.0, None),
                point(20.0, Some(1020.0)),
            ],
        };
        let summary = data.summary().unwrap();
        assert_eq!(summary.min_temperature, 20.0);
        assert_eq!(summary.max_temperature, 50.0);
        assert_eq!(summary.mean_pressure, Some(1015.0));
    }

    #[test]
    fn all_pressure_missing_means_no_mean() {
        let data = HistoricalWeatherData {
            points: vec![point(32.0, None)],
        };
        assert_eq!(data.summary().unwrap().mean_pressure, None);
    }

    #[test]
    fn observed_at_parses_rfc3339() {
        let p = point(32.0, None);
        assert!(p.observed_at().is_some());
        let bad = WeatherPoint {
            timestamp: "yesterday".to_string(),
            ..p
        };
        assert!(bad.observed_at().is_none());
    }
}
