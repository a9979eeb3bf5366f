//! The main entry point for talking to the surface-weather service: one
//! client owning the station directory and the historical-weather fetcher.

use crate::error::SfcWeatherError;
use crate::stations::directory::{sort_stations, StationDirectory};
use crate::types::station::{LatLon, Station};
use crate::types::units::SortOrder;
use crate::types::weather::HistoricalWeatherData;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use crate::weather::error::WeatherDataError;
use crate::weather::fetcher::HistoryFetcher;
use bon::bon;
use log::warn;
use reqwest::Client;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Production endpoint serving `/stations` and `/historical_weather`.
pub const DEFAULT_BASE_URL: &str = "https://sfc.windbornesystems.com";

/// Station metadata changes rarely; the disk cache is kept for a day.
const DEFAULT_STATION_CACHE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
/// Observations update often; the in-memory history cache is stale after a
/// minute.
const DEFAULT_HISTORY_MAX_AGE: Duration = Duration::from_secs(60);

/// The client for the surface-weather service.
///
/// Construction fetches the station batch (or loads it from the disk
/// cache); afterwards station queries are synchronous and only
/// [`historical_weather`](Self::historical_weather) touches the network.
///
/// # Examples
///
/// ```no_run
/// # use sfc_weather::{SfcWeather, SfcWeatherError, LatLon};
/// # async fn run() -> Result<(), SfcWeatherError> {
/// let client = SfcWeather::new().await?;
///
/// let nearby = client
///     .find_stations()
///     .location(LatLon(57.09639, 9.85056))
///     .call();
/// for station in &nearby {
///     let history = client.historical_weather(&station.station_id).await?;
///     println!("{}: {} points", station.station_name, history.points.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SfcWeather {
    directory: StationDirectory,
    history: HistoryFetcher,
}

#[bon]
impl SfcWeather {
    /// Creates a client with explicit knobs. All of them default sensibly:
    /// `base_url` to the production endpoint, `cache_folder` to the system
    /// cache directory, the station disk cache to one day, the history
    /// cache to one minute.
    ///
    /// # Errors
    ///
    /// Returns [`SfcWeatherError::CacheDirResolution`] /
    /// [`SfcWeatherError::CacheDirCreation`] when the cache directory cannot
    /// be determined or created, and [`SfcWeatherError::Station`] variants
    /// when the initial station-list fetch fails in transit. A station list
    /// that fails to *decode* is not an error here: the client starts with
    /// an empty directory (logged).
    #[builder]
    pub async fn custom(
        base_url: Option<String>,
        cache_folder: Option<PathBuf>,
        station_cache_max_age: Option<Duration>,
        history_max_age: Option<Duration>,
    ) -> Result<Self, SfcWeatherError> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let cache_folder = match cache_folder {
            Some(folder) => folder,
            None => get_cache_dir().map_err(SfcWeatherError::CacheDirResolution)?,
        };
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| SfcWeatherError::CacheDirCreation(cache_folder.clone(), e))?;

        let http = Client::new();
        let directory = StationDirectory::new(
            &http,
            &base_url,
            &cache_folder,
            station_cache_max_age.unwrap_or(DEFAULT_STATION_CACHE_MAX_AGE),
        )
        .await?;
        let history = HistoryFetcher::new(
            http,
            base_url,
            history_max_age.unwrap_or(DEFAULT_HISTORY_MAX_AGE),
        );
        Ok(Self { directory, history })
    }

    /// Creates a client against the production endpoint with the default
    /// cache directory.
    pub async fn new() -> Result<Self, SfcWeatherError> {
        Self::custom().call().await
    }

    /// Creates a client with a custom cache directory (created when
    /// missing).
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, SfcWeatherError> {
        Self::custom().cache_folder(cache_folder).call().await
    }

    /// The immutable station batch loaded at construction. Empty either
    /// when the service reported no stations or when the list could not be
    /// decoded; the distinction is visible in the logs.
    pub fn stations(&self) -> &[Station] {
        self.directory.stations()
    }

    /// Looks a station up by id.
    pub fn station(&self, station_id: &str) -> Option<&Station> {
        self.directory.get(station_id)
    }

    /// Historical observations for one station, cached per station id with
    /// a staleness window.
    ///
    /// A response that cannot be decoded even after repair degrades to zero
    /// points (logged) so callers can render a "no data" state; transport
    /// and HTTP-status failures propagate as errors.
    pub async fn historical_weather(
        &self,
        station_id: &str,
    ) -> Result<HistoricalWeatherData, SfcWeatherError> {
        match self.history.history(station_id).await {
            Ok(data) => Ok(data),
            Err(WeatherDataError::Decode(e)) => {
                warn!("historical weather for {station_id} failed to decode, showing no data: {e}");
                Ok(HistoricalWeatherData::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Finds stations near a location, closest first.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** Center of the search.
    /// * `.max_distance_km(f64)`: Optional. Search radius. Defaults to `50.0`.
    /// * `.station_limit(usize)`: Optional. Maximum number of stations returned. Defaults to `5`.
    #[builder]
    pub fn find_stations(
        &self,
        location: LatLon,
        max_distance_km: Option<f64>,
        station_limit: Option<usize>,
    ) -> Vec<Station> {
        let max_distance_km = max_distance_km.unwrap_or(50.0);
        let station_limit = station_limit.unwrap_or(5);
        self.directory
            .nearest(location, station_limit, max_distance_km)
            .into_iter()
            .map(|(station, _distance)| station)
            .collect()
    }

    /// Case-insensitive substring search over station names and ids.
    pub fn search_stations(&self, query: &str) -> Vec<Station> {
        self.directory.search(query)
    }

    /// The station batch reordered for listing.
    pub fn sorted_stations(
        &self,
        order: SortOrder,
        reference: Option<LatLon>,
        favorites: &HashSet<String>,
    ) -> Vec<Station> {
        let mut stations = self.directory.stations().to_vec();
        sort_stations(&mut stations, order, reference, favorites);
        stations
    }
}
