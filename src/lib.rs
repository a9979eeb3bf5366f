mod decode;
mod error;
mod metrics;
mod settings;
mod sfc_weather;
mod stations;
mod types;
mod utils;
mod weather;

pub use error::SfcWeatherError;
pub use sfc_weather::*;

pub use decode::{decode_historical_weather, decode_station_list, DecodeError};
pub use metrics::*;
pub use settings::{
    DebouncedSaver, JsonSettingsStore, SettingsError, SettingsRepository, WeatherSettings,
};

pub use types::station::{LatLon, Station};
pub use types::units::*;
pub use types::weather::{HistoricalWeatherData, WeatherPoint, WeatherSummary};

pub use stations::directory::{sort_stations, StationDirectory};
pub use stations::error::StationError;
pub use weather::error::WeatherDataError;
pub use weather::fetcher::HistoryFetcher;
