//! Derived display metrics: unit conversions from canonical wire units and
//! physically derived quantities (wind vector, relative humidity, distance).
//!
//! Every function here is stateless, defined for all finite inputs, and
//! never panics. The wire format fixes temperature in °F and wind as
//! orthogonal components; speed/bearing and humidity are always derived on
//! the consumer side.

use crate::types::station::LatLon;
use crate::types::units::{
    ElevationUnit, PrecipitationUnit, PressureUnit, TemperatureUnit, WindSpeedUnit,
};
use haversine::{distance, Location, Units};

const METERS_PER_SECOND_TO_KNOTS: f64 = 1.94384;
const METERS_PER_SECOND_TO_MPH: f64 = 2.237;
const MILLIBARS_TO_INHG: f64 = 0.02953;
const MILLIMETERS_PER_INCH: f64 = 25.4;
const METERS_TO_FEET: f64 = 3.28084;

/// Compass labels indexed by `round(degrees / 45) % 8`.
const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Wind decomposed into scalar speed and meteorological-style bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    /// Speed in m/s (wire unit; convert with [`convert_wind_speed`]).
    pub speed_ms: f64,
    /// Direction in degrees, always in `[0, 360)`.
    pub direction_deg: f64,
}

/// Converts °F to °C.
pub fn to_celsius(temp_f: f64) -> f64 {
    (temp_f - 32.0) * 5.0 / 9.0
}

/// Converts a wire temperature (°F) to the chosen display unit.
///
/// # Examples
///
/// ```
/// use sfc_weather::{convert_temperature, TemperatureUnit};
///
/// assert_eq!(convert_temperature(32.0, TemperatureUnit::Fahrenheit), 32.0);
/// assert_eq!(convert_temperature(32.0, TemperatureUnit::Celsius), 0.0);
/// ```
pub fn convert_temperature(temp_f: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Fahrenheit => temp_f,
        TemperatureUnit::Celsius => to_celsius(temp_f),
    }
}

/// Converts a wire wind speed (m/s) to the chosen display unit.
pub fn convert_wind_speed(speed_ms: f64, unit: WindSpeedUnit) -> f64 {
    match unit {
        WindSpeedUnit::Knots => speed_ms * METERS_PER_SECOND_TO_KNOTS,
        WindSpeedUnit::MilesPerHour => speed_ms * METERS_PER_SECOND_TO_MPH,
    }
}

/// Converts a wire pressure (mb) to the chosen display unit.
pub fn convert_pressure(pressure_mb: f64, unit: PressureUnit) -> f64 {
    match unit {
        PressureUnit::Millibars => pressure_mb,
        PressureUnit::InchesOfMercury => pressure_mb * MILLIBARS_TO_INHG,
    }
}

/// Converts wire precipitation (mm) to the chosen display unit.
pub fn convert_precipitation(precip_mm: f64, unit: PrecipitationUnit) -> f64 {
    match unit {
        PrecipitationUnit::Millimeters => precip_mm,
        PrecipitationUnit::Inches => precip_mm / MILLIMETERS_PER_INCH,
    }
}

/// Formats a wire elevation (meters) for display, with the unit suffix.
/// Feet are rounded to the nearest whole foot.
///
/// # Examples
///
/// ```
/// use sfc_weather::{convert_elevation, ElevationUnit};
///
/// assert_eq!(convert_elevation(3.0, ElevationUnit::Meters), "3m");
/// assert_eq!(convert_elevation(3.0, ElevationUnit::Feet), "10ft");
/// ```
pub fn convert_elevation(meters: f64, unit: ElevationUnit) -> String {
    match unit {
        ElevationUnit::Meters => format!("{meters}m"),
        ElevationUnit::Feet => format!("{}ft", (meters * METERS_TO_FEET).round()),
    }
}

/// Derives wind speed and direction from the orthogonal wire components.
///
/// Speed is the vector magnitude; direction is `atan2(y, x)` mapped into
/// `[0, 360)` degrees. Calm air (`x == y == 0`) is defined: `atan2(0, 0)` is
/// 0, so the direction is 0° ("N").
///
/// # Examples
///
/// ```
/// use sfc_weather::calc_wind;
///
/// let wind = calc_wind(3.0, 4.0);
/// assert_eq!(wind.speed_ms, 5.0);
/// assert!((wind.direction_deg - 53.13).abs() < 0.01);
/// ```
pub fn calc_wind(wind_x: f64, wind_y: f64) -> Wind {
    let speed_ms = wind_x.hypot(wind_y);
    let direction_deg = (wind_y.atan2(wind_x).to_degrees() + 360.0) % 360.0;
    Wind {
        speed_ms,
        direction_deg,
    }
}

/// Maps a bearing in degrees onto an eight-point compass label.
pub fn wind_direction_label(degrees: f64) -> &'static str {
    COMPASS[((degrees / 45.0).round() as usize) % 8]
}

/// Relative humidity (%) from air temperature and dew point, both °F on the
/// wire.
///
/// Uses the Magnus approximation with a = 17.625, b = 243.04 °C. The formula
/// is only valid in Celsius, so both inputs are converted first regardless
/// of the configured display unit. The result is clamped to `[0, 100]`;
/// saturation (dew point equal to temperature) yields exactly 100.
pub fn calc_humidity(temp_f: f64, dewpoint_f: f64) -> f64 {
    const A: f64 = 17.625;
    const B: f64 = 243.04;
    let temp = to_celsius(temp_f);
    let dewpoint = to_celsius(dewpoint_f);
    let rh = 100.0 * ((A * dewpoint) / (B + dewpoint)).exp() / ((A * temp) / (B + temp)).exp();
    rh.clamp(0.0, 100.0)
}

/// Great-circle distance between two coordinates, in kilometers.
pub fn distance_km(a: LatLon, b: LatLon) -> f64 {
    distance(
        Location {
            latitude: a.0,
            longitude: a.1,
        },
        Location {
            latitude: b.0,
            longitude: b.1,
        },
        Units::Kilometers,
    )
}

/// Formats a possibly-missing pressure reading for display. Missing
/// pressure renders as an em dash rather than a number.
pub fn format_pressure(pressure_mb: Option<f64>, unit: PressureUnit) -> String {
    match pressure_mb {
        Some(mb) => format!("{:.0} {unit}", convert_pressure(mb, unit)),
        None => "—".to_string(),
    }
}

/// Position of a value inside a `[min, max]` range as a fraction in
/// `[0, 1]`, for bar-style metric displays. Missing values and degenerate
/// ranges contribute 0 rather than being treated as the minimum.
pub fn normalized_fraction(value: Option<f64>, min: f64, max: f64) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    if !(max > min) {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_point_is_exact() {
        assert_eq!(convert_temperature(32.0, TemperatureUnit::Fahrenheit), 32.0);
        assert_eq!(convert_temperature(32.0, TemperatureUnit::Celsius), 0.0);
    }

    #[test]
    fn wind_speed_conversions() {
        assert_eq!(convert_wind_speed(0.0, WindSpeedUnit::Knots), 0.0);
        assert_eq!(convert_wind_speed(0.0, WindSpeedUnit::MilesPerHour), 0.0);
        assert!((convert_wind_speed(1.0, WindSpeedUnit::Knots) - 1.94384).abs() < 1e-9);
        assert!((convert_wind_speed(1.0, WindSpeedUnit::MilesPerHour) - 2.237).abs() < 1e-9);
    }

    #[test]
    fn pressure_conversions() {
        assert_eq!(convert_pressure(1013.0, PressureUnit::Millibars), 1013.0);
        assert!((convert_pressure(1013.0, PressureUnit::InchesOfMercury) - 29.91389).abs() < 1e-4);
    }

    #[test]
    fn precipitation_conversions() {
        assert_eq!(convert_precipitation(25.4, PrecipitationUnit::Millimeters), 25.4);
        assert_eq!(convert_precipitation(25.4, PrecipitationUnit::Inches), 1.0);
    }

    #[test]
    fn elevation_formatting() {
        assert_eq!(convert_elevation(3.0, ElevationUnit::Meters), "3m");
        assert_eq!(convert_elevation(3.0, ElevationUnit::Feet), "10ft");
        assert_eq!(convert_elevation(0.0, ElevationUnit::Meters), "0m");
        assert_eq!(convert_elevation(-2.5, ElevationUnit::Meters), "-2.5m");
    }

    #[test]
    fn calm_air_has_defined_direction() {
        let wind = calc_wind(0.0, 0.0);
        assert_eq!(wind.speed_ms, 0.0);
        assert_eq!(wind.direction_deg, 0.0);
        assert_eq!(wind_direction_label(wind.direction_deg), "N");
    }

    #[test]
    fn wind_vector_decomposition() {
        let wind = calc_wind(3.0, 4.0);
        assert_eq!(wind.speed_ms, 5.0);
        assert!((wind.direction_deg - 53.13010235).abs() < 1e-6);
        assert_eq!(wind_direction_label(wind.direction_deg), "NE");
    }

    #[test]
    fn direction_stays_in_range() {
        let west = calc_wind(-1.0, 0.0);
        assert_eq!(west.direction_deg, 180.0);
        let south_of_west = calc_wind(-1.0, -0.001);
        assert!(south_of_west.direction_deg > 180.0 && south_of_west.direction_deg < 360.0);
    }

    #[test]
    fn compass_boundaries() {
        assert_eq!(wind_direction_label(0.0), "N");
        assert_eq!(wind_direction_label(360.0), "N");
        assert_eq!(wind_direction_label(44.0), "NE");
        assert_eq!(wind_direction_label(22.5), "NE");
        assert_eq!(wind_direction_label(22.4), "N");
        assert_eq!(wind_direction_label(315.0), "NW");
        assert_eq!(wind_direction_label(337.6), "N");
    }

    #[test]
    fn saturation_is_exactly_100() {
        for temp in [-40.0, 0.0, 32.0, 75.0, 110.0] {
            assert_eq!(calc_humidity(temp, temp), 100.0);
        }
    }

    #[test]
    fn humidity_decreases_with_dew_point_spread() {
        let rh = calc_humidity(68.0, 50.0);
        assert!(rh > 0.0 && rh < 100.0);
        assert!(calc_humidity(68.0, 40.0) < rh);
    }

    #[test]
    fn humidity_is_computed_in_celsius() {
        // 68 °F / 50 °F is 20 °C / 10 °C; Magnus gives ~52.5% there. Feeding
        // Fahrenheit values straight into the formula would give a wildly
        // different number.
        let rh = calc_humidity(68.0, 50.0);
        assert!((rh - 52.5).abs() < 1.0, "got {rh}");
    }

    #[test]
    fn distance_reflexive_and_symmetric() {
        let aalborg = LatLon(57.09639, 9.85056);
        let aarhus = LatLon(56.30833, 10.62556);
        assert_eq!(distance_km(aalborg, aalborg), 0.0);
        assert_eq!(distance_km(aalborg, aarhus), distance_km(aarhus, aalborg));
        // Aalborg to Aarhus is roughly 99 km as the crow flies.
        let km = distance_km(aalborg, aarhus);
        assert!((km - 99.0).abs() < 5.0, "got {km}");
    }

    #[test]
    fn missing_pressure_renders_dash() {
        assert_eq!(format_pressure(None, PressureUnit::Millibars), "—");
        assert_eq!(
            format_pressure(Some(1013.0), PressureUnit::Millibars),
            "1013 mb"
        );
    }

    #[test]
    fn normalization_treats_missing_as_zero() {
        assert_eq!(normalized_fraction(None, 0.0, 10.0), 0.0);
        assert_eq!(normalized_fraction(Some(5.0), 0.0, 10.0), 0.5);
        assert_eq!(normalized_fraction(Some(15.0), 0.0, 10.0), 1.0);
        assert_eq!(normalized_fraction(Some(-5.0), 0.0, 10.0), 0.0);
        // Degenerate range: nothing to position against.
        assert_eq!(normalized_fraction(Some(5.0), 5.0, 5.0), 0.0);
    }
}
