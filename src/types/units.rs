//! Display-unit choices and user-facing ordering options.
//!
//! The serde spellings ("C"/"F", "kts"/"mph", "2d"/"3d", ...) are the values
//! the settings store has always persisted, so saved preferences keep
//! round-tripping across versions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Temperature display unit. The wire format is always Fahrenheit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "F")]
    Fahrenheit,
    #[serde(rename = "C")]
    Celsius,
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Fahrenheit => write!(f, "°F"),
            TemperatureUnit::Celsius => write!(f, "°C"),
        }
    }
}

/// Wind speed display unit. The wire format is meters per second.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindSpeedUnit {
    #[default]
    #[serde(rename = "kts")]
    Knots,
    #[serde(rename = "mph")]
    MilesPerHour,
}

impl fmt::Display for WindSpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindSpeedUnit::Knots => write!(f, "kts"),
            WindSpeedUnit::MilesPerHour => write!(f, "mph"),
        }
    }
}

/// Pressure display unit. The wire format is millibars.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressureUnit {
    #[default]
    #[serde(rename = "mb")]
    Millibars,
    #[serde(rename = "inHg")]
    InchesOfMercury,
}

impl fmt::Display for PressureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PressureUnit::Millibars => write!(f, "mb"),
            PressureUnit::InchesOfMercury => write!(f, "inHg"),
        }
    }
}

/// Precipitation display unit. The wire format is millimeters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecipitationUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
}

impl fmt::Display for PrecipitationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecipitationUnit::Millimeters => write!(f, "mm"),
            PrecipitationUnit::Inches => write!(f, "in"),
        }
    }
}

/// Elevation display unit. The wire format is meters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationUnit {
    #[default]
    Meters,
    Feet,
}

impl fmt::Display for ElevationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevationUnit::Meters => write!(f, "m"),
            ElevationUnit::Feet => write!(f, "ft"),
        }
    }
}

/// Ordering applied to station listings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Name,
    Distance,
    Network,
    Elevation,
    Favorites,
}

/// Map projection mode. Only relevant for display; carried in settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapMode {
    #[default]
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
}
