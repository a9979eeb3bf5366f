//! Data structures representing surface weather stations and their metadata,
//! including the implementations necessary for spatial indexing with the
//! `rstar` crate.

use rstar::{PointDistance, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second
/// (index 1). Both values are decimal degrees.
///
/// # Examples
///
/// ```
/// use sfc_weather::LatLon;
///
/// let aalborg = LatLon(57.09639, 9.85056);
/// assert_eq!(aalborg.0, 57.09639); // Latitude
/// assert_eq!(aalborg.1, 9.85056); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// A single surface weather station as reported by the station-list endpoint.
///
/// Field names match the wire format exactly. The batch is fetched once and
/// treated as immutable; `station_id` is the identity used for lookups and
/// as the key for historical-weather queries.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// Short unique station code (e.g. "EKYT").
    pub station_id: String,
    /// Human-readable station name.
    pub station_name: String,
    /// Originating network/provider code (e.g. "DK__ASOS").
    pub station_network: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Elevation above sea level in meters. May be zero or negative.
    pub elevation: f64,
    /// IANA timezone name, used only for display formatting.
    pub timezone: String,
}

impl Station {
    /// Short display label for the network: the first underscore-delimited
    /// segment of `station_network` ("DK__ASOS" -> "DK").
    pub fn network_label(&self) -> &str {
        self.station_network
            .split('_')
            .next()
            .unwrap_or(&self.station_network)
    }

    /// Whether the coordinates fall inside the valid lat/lon ranges and can
    /// be placed on a map.
    pub fn mappable(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// The station's position as a [`LatLon`].
    pub fn lat_lon(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}

/// Implementation required by `rstar` to treat a `Station` as an object
/// within an R-Tree, enabling nearest-station queries.
impl RTreeObject for Station {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.latitude, self.longitude])
    }
}

impl PointDistance for Station {
    /// Squared Euclidean distance in degree space. An approximation the
    /// R-Tree uses for candidate ordering; exact distances are computed with
    /// haversine afterwards.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.latitude - point[0];
        let dy = self.longitude - point[1];
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(network: &str) -> Station {
        Station {
            station_id: "EKYT".to_string(),
            station_name: "Aalborg".to_string(),
            station_network: network.to_string(),
            latitude: 57.09639,
            longitude: 9.85056,
            elevation: 3.0,
            timezone: "Europe/Copenhagen".to_string(),
        }
    }

    #[test]
    fn network_label_takes_first_segment() {
        assert_eq!(station("DK__ASOS").network_label(), "DK");
        assert_eq!(station("METAR").network_label(), "METAR");
        assert_eq!(station("").network_label(), "");
    }

    #[test]
    fn mappable_bounds() {
        let mut s = station("DK__ASOS");
        assert!(s.mappable());
        s.latitude = 90.0;
        assert!(s.mappable());
        s.latitude = 90.5;
        assert!(!s.mappable());
        s.latitude = 57.0;
        s.longitude = -180.5;
        assert!(!s.mappable());
    }

    #[test]
    fn deserializes_wire_record() {
        let json = r#"{"station_id": "EKYT", "latitude": 57.09639, "longitude": 9.85056,
            "elevation": 3.0, "station_name": "Aalborg", "station_network": "DK__ASOS",
            "timezone": "Europe/Paris"}"#;
        let parsed: Station = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.station_id, "EKYT");
        assert_eq!(parsed.elevation, 3.0);
    }
}
