//! Tolerant decoding of the station-list and historical-weather response
//! bodies.
//!
//! The upstream service occasionally emits malformed JSON: arrays cut off
//! mid-record, a logging banner glued in front of an object, or an object
//! missing its closing brace. The decoders here repair those known patterns
//! before parsing and fail with a [`DecodeError`] once repair options are
//! exhausted. They are pure and synchronous; the fetch layer must already
//! have rejected non-2xx responses before handing a body over.

use crate::types::station::Station;
use crate::types::weather::HistoricalWeatherData;
use log::warn;
use std::borrow::Cow;
use thiserror::Error;

/// JSON parse failure after all repair attempts. Carries the text that was
/// handed to the parser (after any repairs) for diagnostics.
#[derive(Debug, Error)]
#[error("failed to parse response body as JSON")]
pub struct DecodeError {
    #[source]
    pub source: serde_json::Error,
    /// The possibly-repaired text the parser rejected.
    pub body: String,
}

impl DecodeError {
    fn new(source: serde_json::Error, body: &str) -> Self {
        Self {
            source,
            body: body.to_string(),
        }
    }
}

/// Decodes the station-list response: a JSON array of station records.
///
/// A body whose trimmed text ends with `]` is parsed as-is. Otherwise the
/// stream was likely cut mid-record: the text is truncated to just after the
/// last `}` and a `]` is appended, silently dropping the partial trailing
/// record. The repair is best-effort and logged when it fires.
///
/// # Examples
///
/// ```
/// use sfc_weather::decode_station_list;
///
/// let body = r#"[{"station_id":"EKYT","station_name":"Aalborg",
///     "station_network":"DK__ASOS","latitude":57.09639,"longitude":9.85056,
///     "elevation":3.0,"timezone":"Europe/Paris"}]"#;
/// let stations = decode_station_list(body).unwrap();
/// assert_eq!(stations[0].station_id, "EKYT");
/// ```
pub fn decode_station_list(body: &str) -> Result<Vec<Station>, DecodeError> {
    let trimmed = body.trim();
    if trimmed.ends_with(']') {
        return serde_json::from_str(trimmed).map_err(|source| DecodeError::new(source, trimmed));
    }
    match trimmed.rfind('}') {
        Some(pos) if pos > 0 => {
            let mut repaired = trimmed[..=pos].to_string();
            repaired.push(']');
            warn!(
                "station list response did not end with ']'; truncated at byte {} and closed the array",
                pos
            );
            serde_json::from_str(&repaired).map_err(|source| DecodeError::new(source, &repaired))
        }
        _ => serde_json::from_str(trimmed).map_err(|source| DecodeError::new(source, trimmed)),
    }
}

/// Decodes the historical-weather response: a JSON object `{"points": [...]}`.
///
/// Two repairs run before parsing: anything before the first `{` is
/// discarded (stray prefix, e.g. a logging banner), and a body that does not
/// end with `}` is either truncated to just after its last `}` or, as a last
/// resort, closed with a synthetic brace.
///
/// # Examples
///
/// ```
/// use sfc_weather::decode_historical_weather;
///
/// let data = decode_historical_weather(r#"garbage{"points":[]}"#).unwrap();
/// assert!(data.points.is_empty());
/// ```
pub fn decode_historical_weather(body: &str) -> Result<HistoricalWeatherData, DecodeError> {
    let trimmed = body.trim();
    let stripped = match trimmed.find('{') {
        Some(idx) if idx > 0 => {
            warn!(
                "historical weather response had {} bytes of leading garbage; stripped",
                idx
            );
            &trimmed[idx..]
        }
        _ => trimmed,
    };
    let repaired: Cow<'_, str> = if stripped.ends_with('}') {
        Cow::Borrowed(stripped)
    } else {
        match stripped.rfind('}') {
            Some(pos) if pos > 0 => {
                warn!(
                    "historical weather response did not end with '}}'; truncated at byte {}",
                    pos
                );
                Cow::Borrowed(&stripped[..=pos])
            }
            _ => {
                warn!("historical weather response did not end with '}}'; appended a closing brace");
                Cow::Owned(format!("{stripped}}}"))
            }
        }
    };
    serde_json::from_str(&repaired).map_err(|source| DecodeError::new(source, &repaired))
}
