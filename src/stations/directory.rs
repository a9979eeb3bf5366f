//! The station directory: fetches the station-list batch, caches it on disk,
//! and answers proximity, search, and ordering queries over it.

use crate::decode::decode_station_list;
use crate::metrics::distance_km;
use crate::stations::error::StationError;
use crate::types::station::{LatLon, Station};
use crate::types::units::SortOrder;
use bincode::config::{Configuration, Fixint, LittleEndian};
use haversine::{distance, Location as HaversineLocation, Units};
use log::{error, info, warn};
use ordered_float::OrderedFloat;
use reqwest::Client;
use rstar::RTree;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

const STATIONS_CACHE_FILE_NAME: &str = "stations.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Immutable batch of stations with a spatial index over their positions.
#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: Vec<Station>,
    rtree: RTree<Station>,
}

impl StationDirectory {
    /// Loads the directory from the disk cache when it is younger than
    /// `cache_max_age`, otherwise fetches `{base_url}/stations` and rewrites
    /// the cache.
    ///
    /// A response that fails to decode even after repair degrades to an
    /// empty directory (logged, not cached): "no stations available" is a
    /// renderable state. Transport and HTTP-status failures propagate.
    pub async fn new(
        http: &Client,
        base_url: &str,
        cache_dir: &Path,
        cache_max_age: Duration,
    ) -> Result<Self, StationError> {
        let cache_file = cache_dir.join(STATIONS_CACHE_FILE_NAME);

        let stations = if cache_is_fresh(&cache_file, cache_max_age).await {
            info!("Loading station list from cache at {:?}", cache_file);
            let path = cache_file.clone();
            tokio::task::spawn_blocking(move || read_cached_stations(&path)).await??
        } else {
            match fetch_station_list(http, base_url).await {
                Ok(stations) => {
                    write_station_cache(stations.clone(), &cache_file).await?;
                    stations
                }
                Err(StationError::Decode(e)) => {
                    error!("station list failed to decode, treating as no stations: {e}");
                    Vec::new()
                }
                Err(e) => return Err(e),
            }
        };

        let rtree = RTree::bulk_load(stations.clone());
        Ok(StationDirectory { stations, rtree })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Looks a station up by its id.
    pub fn get(&self, station_id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.station_id == station_id)
    }

    /// Finds up to `n_results` stations within `max_distance_km` of `point`,
    /// closest first, with exact haversine distances in kilometers.
    ///
    /// The R-tree iteration is capped by a candidate-limit heuristic: the
    /// tree orders by squared degree-space distance, which disagrees with
    /// haversine near the limit, so slightly more candidates than needed are
    /// examined before the final sort.
    pub fn nearest(
        &self,
        point: LatLon,
        n_results: usize,
        max_distance_km: f64,
    ) -> Vec<(Station, f64)> {
        if n_results == 0 {
            return vec![];
        }

        let candidate_limit = (n_results * 2).max(20);

        let mut stations_with_dist: Vec<(Station, f64)> = self
            .rtree
            .nearest_neighbor_iter(&[point.0, point.1])
            .take(candidate_limit)
            .filter_map(|station| {
                let dist_km = distance(
                    HaversineLocation {
                        latitude: point.0,
                        longitude: point.1,
                    },
                    HaversineLocation {
                        latitude: station.latitude,
                        longitude: station.longitude,
                    },
                    Units::Kilometers,
                );
                (dist_km <= max_distance_km).then(|| (station.to_owned(), dist_km))
            })
            .collect();

        stations_with_dist.sort_by_key(|(_, dist_km)| OrderedFloat(*dist_km));
        stations_with_dist.truncate(n_results);
        stations_with_dist
    }

    /// Case-insensitive substring search over station names and ids.
    pub fn search(&self, query: &str) -> Vec<Station> {
        let query = query.to_lowercase();
        self.stations
            .iter()
            .filter(|s| {
                s.station_name.to_lowercase().contains(&query)
                    || s.station_id.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }
}

/// Orders a station slice in place for listing.
///
/// Distance ordering needs a reference point; without one it falls back to
/// name order (the behavior when geolocation is unavailable). Favorites
/// float the favored ids to the top, then order by name.
pub fn sort_stations(
    stations: &mut [Station],
    order: SortOrder,
    reference: Option<LatLon>,
    favorites: &HashSet<String>,
) {
    match order {
        SortOrder::Name => {
            stations.sort_by_key(|s| (s.station_name.to_lowercase(), s.station_id.clone()));
        }
        SortOrder::Distance => match reference {
            Some(point) => {
                stations.sort_by_key(|s| OrderedFloat(distance_km(point, s.lat_lon())));
            }
            None => sort_stations(stations, SortOrder::Name, None, favorites),
        },
        SortOrder::Network => {
            stations.sort_by_key(|s| {
                (
                    s.network_label().to_lowercase(),
                    s.station_name.to_lowercase(),
                )
            });
        }
        SortOrder::Elevation => {
            stations.sort_by_key(|s| Reverse(OrderedFloat(s.elevation)));
        }
        SortOrder::Favorites => {
            stations.sort_by_key(|s| {
                (
                    !favorites.contains(&s.station_id),
                    s.station_name.to_lowercase(),
                )
            });
        }
    }
}

async fn fetch_station_list(http: &Client, base_url: &str) -> Result<Vec<Station>, StationError> {
    let url = format!("{}/stations", base_url.trim_end_matches('/'));
    info!("Fetching station list from {}", url);

    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| StationError::NetworkRequest(url.clone(), e))?;
    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            return Err(if let Some(status) = e.status() {
                StationError::HttpStatus {
                    url,
                    status,
                    source: e,
                }
            } else {
                StationError::NetworkRequest(url, e)
            });
        }
    };

    let body = response
        .text()
        .await
        .map_err(|e| StationError::BodyRead(url, e))?;
    let stations = decode_station_list(&body)?;
    info!("Decoded {} stations", stations.len());
    Ok(stations)
}

/// Whether the cache file exists and is younger than `max_age`. Unreadable
/// metadata or clock skew count as stale.
async fn cache_is_fresh(cache_path: &Path, max_age: Duration) -> bool {
    let Ok(metadata) = tokio::fs::metadata(cache_path).await else {
        return false;
    };
    match metadata.modified().map(|t| t.elapsed()) {
        Ok(Ok(age)) => age < max_age,
        _ => {
            warn!("could not determine age of {:?}, refetching", cache_path);
            false
        }
    }
}

fn read_cached_stations(cache_path: &Path) -> Result<Vec<Station>, StationError> {
    let bytes = std::fs::read(cache_path)
        .map_err(|e| StationError::CacheRead(cache_path.to_path_buf(), e))?;
    let (stations, _) = bincode::serde::decode_from_slice::<Vec<Station>, _>(&bytes, BINCODE_CONFIG)
        .map_err(|e| StationError::CacheDecode(cache_path.to_path_buf(), Box::from(e)))?;
    Ok(stations)
}

async fn write_station_cache(stations: Vec<Station>, cache_path: &Path) -> Result<(), StationError> {
    let encoded = tokio::task::spawn_blocking(move || {
        bincode::serde::encode_to_vec(stations, BINCODE_CONFIG)
            .map_err(|e| StationError::CacheEncode(Box::new(e)))
    })
    .await??;
    tokio::fs::write(&cache_path, &encoded)
        .await
        .map_err(|e| StationError::CacheWrite(cache_path.to_path_buf(), e))?;
    info!(
        "Wrote station cache ({} bytes) to {}",
        encoded.len(),
        cache_path.display()
    );
    Ok(())
}
