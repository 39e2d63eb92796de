mod cache;
mod config;
mod errors;
mod geocode;
mod position;
mod stations;
mod watcher;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use cache::{cache_key, GeocodeCache, GEOCODE_CACHE_CAPACITY};
pub use config::AppConfig;
pub use errors::{EngineError, EngineResult, GeocodeError, GeolocationError};
pub use geocode::{AddressFields, ReverseGeocoder, GEOCODE_RETRY_DELAY, GEOCODE_TIMEOUT};
pub use position::{
    Coordinate, LocationSensor, PositionAcquirer, PositionRequest, HIGH_ACCURACY_TIMEOUT,
    LOW_ACCURACY_TIMEOUT,
};
pub use stations::{
    find_district, find_station_by_address, District, PoliceStation, POLICE_STATIONS,
};
pub use watcher::{
    district_mismatch, DebouncedAddressWatcher, SelectedStation, DISTRICT_SEARCH_DEBOUNCE,
};

/// Ties the components together the way the reporting form consumes them:
/// debounced address edits and the locate flow both feed district
/// auto-selection through the same shared selection state.
pub struct LocationEngine {
    acquirer: PositionAcquirer,
    geocoder: ReverseGeocoder,
    watcher: DebouncedAddressWatcher,
    selected: SelectedStation,
}

impl LocationEngine {
    pub fn new(config: &AppConfig, sensor: Option<Arc<dyn LocationSensor>>) -> Self {
        let selected = SelectedStation::new();
        Self {
            acquirer: PositionAcquirer::new(sensor),
            geocoder: ReverseGeocoder::new(config),
            watcher: DebouncedAddressWatcher::new(selected.clone()),
            selected,
        }
    }

    pub fn watcher(&self) -> &DebouncedAddressWatcher {
        &self.watcher
    }

    pub fn selected_station(&self) -> Option<&'static PoliceStation> {
        self.selected.get()
    }

    /// Manual selection from the district picker. A later address match
    /// overwrites it on purpose.
    pub fn select_station(&self, station: Option<&'static PoliceStation>) {
        self.selected.set(station);
    }

    pub fn district_mismatch(&self, address: &str) -> bool {
        watcher::district_mismatch(address, self.selected.get())
    }

    /// Acquires a device position, resolves it to an address, and applies
    /// the result to district auto-selection. Cancels any pending debounced
    /// evaluation first so a stale match cannot fire over the fresh address.
    /// `Ok(None)` means a locate was already in flight.
    pub async fn locate(&self) -> EngineResult<Option<String>> {
        self.watcher.cancel_pending();

        let Some(position) = self.acquirer.current_position().await? else {
            return Ok(None);
        };
        let address = self
            .geocoder
            .reverse_geocode(position.latitude, position.longitude)
            .await?;
        if let Some(station) = stations::find_station_by_address(&address) {
            self.selected.set(Some(station));
        }
        Ok(Some(address))
    }
}

pub fn init_tracing() {
    static INIT: OnceCell<()> = OnceCell::new();
    let _ = INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,report_locator=debug"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}
