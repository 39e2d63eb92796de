use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::cache::{cache_key, GeocodeCache};
use crate::config::AppConfig;
use crate::errors::GeocodeError;
use crate::position::Coordinate;

pub const GEOCODE_TIMEOUT: Duration = Duration::from_millis(8_000);
pub const GEOCODE_RETRY_DELAY: Duration = Duration::from_millis(1_000);

/// Structured address fields as returned by the provider. All optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AddressFields {
    pub city: Option<String>,
    pub county: Option<String>,
    pub suburb: Option<String>,
    pub city_district: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub road: Option<String>,
    pub house_number: Option<String>,
}

impl AddressFields {
    /// Concatenates the four address parts without separators, each part
    /// resolved by fixed precedence: city over county, then suburb over
    /// city_district over town over village, then road, then house number.
    pub fn compose(&self) -> String {
        let parts = [
            self.city.as_deref().or(self.county.as_deref()),
            self.suburb
                .as_deref()
                .or(self.city_district.as_deref())
                .or(self.town.as_deref())
                .or(self.village.as_deref()),
            self.road.as_deref(),
            self.house_number.as_deref(),
        ];
        let mut out = String::new();
        for part in parts.into_iter().flatten() {
            out.push_str(part);
        }
        out
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<AddressFields>,
}

/// Resolves coordinates to a human-readable address via the configured
/// reverse-geocoding service, consulting the bounded cache first.
pub struct ReverseGeocoder {
    http: Client,
    endpoint: String,
    locale: String,
    cache: Mutex<GeocodeCache>,
}

impl ReverseGeocoder {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_cache(config, GeocodeCache::new())
    }

    pub fn with_cache(config: &AppConfig, cache: GeocodeCache) -> Self {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(GEOCODE_TIMEOUT)
            .build()
            .expect("reverse geocoder http client");
        Self {
            http,
            endpoint: config.geocoder_endpoint.clone(),
            locale: config.geocoder_locale.clone(),
            cache: Mutex::new(cache),
        }
    }

    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<String, GeocodeError> {
        let coordinate = Coordinate {
            latitude: lat,
            longitude: lng,
        };
        if !coordinate.is_valid() {
            return Err(GeocodeError::InvalidCoordinate { lat, lng });
        }

        let key = cache_key(lat, lng);
        if let Some(hit) = self.cache.lock().get(&key).map(str::to_owned) {
            debug!(%key, "geocode cache hit");
            return Ok(hit);
        }

        let response = match self.fetch(lat, lng).await {
            Ok(response) => response,
            Err(err) => {
                warn!(?err, "reverse geocode attempt failed; retrying once");
                sleep(GEOCODE_RETRY_DELAY).await;
                self.fetch(lat, lng).await?
            }
        };

        let address = compose_address(response).ok_or(GeocodeError::UnresolvedAddress)?;
        self.cache.lock().insert(key, address.clone());
        Ok(address)
    }

    async fn fetch(&self, lat: f64, lng: f64) -> Result<ReverseResponse, reqwest::Error> {
        let lat = lat.to_string();
        let lng = lng.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lng.as_str()),
                ("accept-language", self.locale.as_str()),
                ("addressdetails", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;
        response.json().await
    }
}

fn compose_address(response: ReverseResponse) -> Option<String> {
    if let Some(address) = &response.address {
        let composed = address.compose();
        if !composed.is_empty() {
            return Some(composed);
        }
    }
    response.display_name.filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ReverseResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn composes_city_address_ignoring_display_name() {
        let response = parse(
            r#"{
                "display_name": "7, 信義路五段, 信義區, 臺北市, 110, 臺灣",
                "address": {
                    "city": "臺北市",
                    "suburb": "信義區",
                    "road": "信義路五段",
                    "house_number": "7號"
                }
            }"#,
        );
        assert_eq!(
            compose_address(response).unwrap(),
            "臺北市信義區信義路五段7號"
        );
    }

    #[test]
    fn falls_back_to_county_and_town() {
        let response = parse(
            r#"{
                "address": {
                    "county": "宜蘭縣",
                    "town": "頭城鎮",
                    "road": "中正路",
                    "house_number": "100號"
                }
            }"#,
        );
        assert_eq!(compose_address(response).unwrap(), "宜蘭縣頭城鎮中正路100號");
    }

    #[test]
    fn skips_absent_parts_without_separators() {
        let response = parse(r#"{"address": {"village": "某村", "road": "某路"}}"#);
        assert_eq!(compose_address(response).unwrap(), "某村某路");
    }

    #[test]
    fn falls_back_to_display_name_when_fields_are_empty() {
        let response = parse(r#"{"display_name": "臺灣某處", "address": {}}"#);
        assert_eq!(compose_address(response).unwrap(), "臺灣某處");

        let response = parse(r#"{"display_name": "臺灣某處"}"#);
        assert_eq!(compose_address(response).unwrap(), "臺灣某處");
    }

    #[test]
    fn unusable_response_resolves_to_nothing() {
        assert!(compose_address(parse("{}")).is_none());
        assert!(compose_address(parse(r#"{"display_name": ""}"#)).is_none());
        assert!(compose_address(parse(r#"{"address": {}}"#)).is_none());
    }

    #[tokio::test]
    async fn rejects_out_of_range_coordinates_before_any_request() {
        // Port 9 is unroutable; reaching the network would fail differently.
        let config = AppConfig {
            geocoder_endpoint: "http://127.0.0.1:9/reverse".into(),
            ..AppConfig::default()
        };
        let geocoder = ReverseGeocoder::new(&config);

        for (lat, lng) in [
            (91.0, 121.5),
            (-90.5, 121.5),
            (25.0, 180.5),
            (25.0, -181.0),
            (f64::NAN, 121.5),
            (25.0, f64::NEG_INFINITY),
        ] {
            let err = geocoder.reverse_geocode(lat, lng).await.unwrap_err();
            assert!(matches!(err, GeocodeError::InvalidCoordinate { .. }));
        }
    }
}
