//! Per-station historical weather with an in-memory staleness cache.

use crate::decode::decode_historical_weather;
use crate::types::weather::HistoricalWeatherData;
use crate::weather::error::WeatherDataError;
use log::info;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CachedHistory {
    fetched_at: Instant,
    data: HistoricalWeatherData,
}

/// Fetches one station's observation series on demand and keeps it for a
/// staleness window, so repeated selections of the same station within the
/// window do not hit the network.
pub struct HistoryFetcher {
    http: Client,
    base_url: String,
    max_age: Duration,
    cache: Mutex<HashMap<String, CachedHistory>>,
}

impl HistoryFetcher {
    pub fn new(http: Client, base_url: impl Into<String>, max_age: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            max_age,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the historical weather for `station_id`, from cache when the
    /// cached copy is younger than the staleness window.
    ///
    /// Only successful decodes are cached; failures are never stored, so the
    /// caller's query layer owns retry cadence. A concurrent fetch for the
    /// same station may race the insert; the later result simply wins, which
    /// is the right outcome for a freshness cache.
    pub async fn history(
        &self,
        station_id: &str,
    ) -> Result<HistoricalWeatherData, WeatherDataError> {
        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(station_id) {
                if entry.fetched_at.elapsed() < self.max_age {
                    return Ok(entry.data.clone());
                }
            }
            // Stale or missing; release the lock before the network round trip.
        }

        let data = self.fetch(station_id).await?;

        let mut cache = self.cache.lock().await;
        cache.insert(
            station_id.to_string(),
            CachedHistory {
                fetched_at: Instant::now(),
                data: data.clone(),
            },
        );
        Ok(data)
    }

    async fn fetch(&self, station_id: &str) -> Result<HistoricalWeatherData, WeatherDataError> {
        let url = format!(
            "{}/historical_weather?station={}",
            self.base_url, station_id
        );
        info!("Fetching historical weather from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| WeatherDataError::NetworkRequest(url.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                // Non-2xx means no body worth repairing; fail before the
                // decoder ever runs.
                return Err(if let Some(status) = e.status() {
                    WeatherDataError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    WeatherDataError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| WeatherDataError::BodyRead(url, e))?;
        let data = decode_historical_weather(&body)?;
        info!(
            "Decoded {} observation points for station {}",
            data.points.len(),
            station_id
        );
        Ok(data)
    }
}
