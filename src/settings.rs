//! Process-wide display preferences: loaded once at startup, written back
//! with a debounce so bursts of toggle flips produce a single write.

use crate::types::units::{
    ElevationUnit, MapMode, PrecipitationUnit, PressureUnit, SortOrder, TemperatureUnit,
    WindSpeedUnit,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to write settings file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to serialize settings")]
    Serialize(#[source] serde_json::Error),
}

/// User-facing preferences. Defaults match a fresh install: light map in 2D,
/// Fahrenheit, knots, millibars, millimeters, stations listed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub dark_mode: bool,
    pub map_mode: MapMode,
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
    pub pressure_unit: PressureUnit,
    pub precipitation_unit: PrecipitationUnit,
    pub sort_by: SortOrder,
    pub favorite_stations: HashSet<String>,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            map_mode: MapMode::TwoD,
            temperature_unit: TemperatureUnit::Fahrenheit,
            wind_speed_unit: WindSpeedUnit::Knots,
            pressure_unit: PressureUnit::Millibars,
            precipitation_unit: PrecipitationUnit::Millimeters,
            sort_by: SortOrder::Name,
            favorite_stations: HashSet::new(),
        }
    }
}

impl WeatherSettings {
    /// Elevation display follows the metric/imperial choice made for
    /// precipitation; there is no separate preference for it.
    pub fn elevation_unit(&self) -> ElevationUnit {
        match self.precipitation_unit {
            PrecipitationUnit::Millimeters => ElevationUnit::Meters,
            PrecipitationUnit::Inches => ElevationUnit::Feet,
        }
    }

    /// Adds the station to the favorites, or removes it when already
    /// present. Returns whether the station is a favorite afterwards.
    pub fn toggle_favorite(&mut self, station_id: &str) -> bool {
        if self.favorite_stations.remove(station_id) {
            false
        } else {
            self.favorite_stations.insert(station_id.to_string());
            true
        }
    }
}

/// Storage boundary for settings, so the persistence mechanism can be
/// injected (a JSON file here, anything key/value-shaped elsewhere).
pub trait SettingsRepository: Send + Sync {
    /// Loads the persisted settings. Implementations degrade to defaults
    /// rather than failing: missing or corrupt storage is a fresh start,
    /// not an error the UI can act on.
    fn load(&self) -> WeatherSettings;

    fn save(&self, settings: &WeatherSettings) -> Result<(), SettingsError>;
}

/// Settings persisted as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SettingsRepository for JsonSettingsStore {
    fn load(&self) -> WeatherSettings {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file at {:?}, using defaults", self.path);
                return WeatherSettings::default();
            }
            Err(e) => {
                warn!("Failed to read settings from {:?}: {e}", self.path);
                return WeatherSettings::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Settings file {:?} is corrupt, using defaults: {e}",
                    self.path
                );
                WeatherSettings::default()
            }
        }
    }

    fn save(&self, settings: &WeatherSettings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings).map_err(SettingsError::Serialize)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::Write(self.path.clone(), e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| SettingsError::Write(self.path.clone(), e))
    }
}

/// Write-behind for settings changes: callers push every change, the saver
/// persists the latest snapshot once changes have been quiet for the
/// debounce delay. Dropping the saver flushes whatever is pending.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<WeatherSettings>,
}

impl DebouncedSaver {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

    /// Spawns the background task that owns the repository.
    pub fn spawn<R>(repository: R, delay: Duration) -> Self
    where
        R: SettingsRepository + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<WeatherSettings>();
        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                // Coalesce until the channel stays quiet for `delay`.
                let mut closing = false;
                loop {
                    match timeout(delay, rx.recv()).await {
                        Ok(Some(settings)) => latest = settings,
                        Ok(None) => {
                            closing = true;
                            break;
                        }
                        Err(_) => break,
                    }
                }
                if let Err(e) = repository.save(&latest) {
                    warn!("failed to persist settings: {e}");
                }
                if closing {
                    return;
                }
            }
        });
        Self { tx }
    }

    /// Queues a snapshot for persistence. Never blocks; if the background
    /// task is gone the change is dropped with a warning.
    pub fn save(&self, settings: WeatherSettings) {
        if self.tx.send(settings).is_err() {
            warn!("settings saver task is gone; change not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn defaults_match_fresh_install() {
        let settings = WeatherSettings::default();
        assert!(!settings.dark_mode);
        assert_eq!(settings.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(settings.wind_speed_unit, WindSpeedUnit::Knots);
        assert_eq!(settings.sort_by, SortOrder::Name);
        assert!(settings.favorite_stations.is_empty());
    }

    #[test]
    fn elevation_follows_precipitation_choice() {
        let mut settings = WeatherSettings::default();
        assert_eq!(settings.elevation_unit(), ElevationUnit::Meters);
        settings.precipitation_unit = PrecipitationUnit::Inches;
        assert_eq!(settings.elevation_unit(), ElevationUnit::Feet);
    }

    #[test]
    fn toggle_favorite_round_trips() {
        let mut settings = WeatherSettings::default();
        assert!(settings.toggle_favorite("EKYT"));
        assert!(settings.favorite_stations.contains("EKYT"));
        assert!(!settings.toggle_favorite("EKYT"));
        assert!(settings.favorite_stations.is_empty());
    }

    #[test]
    fn wire_spellings_survive_round_trip() {
        let mut settings = WeatherSettings::default();
        settings.temperature_unit = TemperatureUnit::Celsius;
        settings.pressure_unit = PressureUnit::InchesOfMercury;
        settings.map_mode = MapMode::ThreeD;
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"C\""));
        assert!(json.contains("\"inHg\""));
        assert!(json.contains("\"3d\""));
        let back: WeatherSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn store_round_trips_and_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));

        // Missing file: defaults.
        assert_eq!(store.load(), WeatherSettings::default());

        let mut settings = WeatherSettings::default();
        settings.dark_mode = true;
        settings.toggle_favorite("EKYT");
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);

        // Corrupt file: defaults again, not a panic.
        std::fs::write(dir.path().join("settings.json"), "{nope").unwrap();
        assert_eq!(store.load(), WeatherSettings::default());
    }

    #[derive(Clone, Default)]
    struct RecordingRepository {
        saves: Arc<Mutex<Vec<WeatherSettings>>>,
    }

    impl SettingsRepository for RecordingRepository {
        fn load(&self) -> WeatherSettings {
            WeatherSettings::default()
        }

        fn save(&self, settings: &WeatherSettings) -> Result<(), SettingsError> {
            self.saves.lock().unwrap().push(settings.clone());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_changes_coalesces_to_one_write() {
        let repository = RecordingRepository::default();
        let saves = Arc::clone(&repository.saves);
        let saver = DebouncedSaver::spawn(repository, DebouncedSaver::DEFAULT_DELAY);

        let mut settings = WeatherSettings::default();
        for station in ["EKYT", "EKAH", "EGAA"] {
            settings.toggle_favorite(station);
            saver.save(settings.clone());
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        let recorded = saves.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].favorite_stations.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_changes_write_separately() {
        let repository = RecordingRepository::default();
        let saves = Arc::clone(&repository.saves);
        let saver = DebouncedSaver::spawn(repository, DebouncedSaver::DEFAULT_DELAY);

        let mut settings = WeatherSettings::default();
        settings.dark_mode = true;
        saver.save(settings.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;

        settings.dark_mode = false;
        saver.save(settings.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(saves.lock().unwrap().len(), 2);
    }
}
