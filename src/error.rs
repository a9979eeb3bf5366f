use crate::stations::error::StationError;
use crate::weather::error::WeatherDataError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SfcWeatherError {
    #[error(transparent)]
    Station(#[from] StationError),

    #[error(transparent)]
    WeatherData(#[from] WeatherDataError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),
}
