use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::errors::GeolocationError;

pub const LOW_ACCURACY_TIMEOUT: Duration = Duration::from_millis(3_000);
pub const HIGH_ACCURACY_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PositionRequest {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
}

/// Boundary to the device location capability. Implementations map their
/// native error codes through `GeolocationError::from_code`.
#[async_trait]
pub trait LocationSensor: Send + Sync {
    async fn request_position(
        &self,
        request: PositionRequest,
    ) -> Result<Coordinate, GeolocationError>;
}

/// Acquires a fix with a fast low-accuracy attempt first, escalating to a
/// high-accuracy attempt only when the first one fails for a reason other
/// than a permission refusal.
pub struct PositionAcquirer {
    sensor: Option<Arc<dyn LocationSensor>>,
    in_flight: Mutex<bool>,
}

impl PositionAcquirer {
    /// `None` models an environment with no location capability at all.
    pub fn new(sensor: Option<Arc<dyn LocationSensor>>) -> Self {
        Self {
            sensor,
            in_flight: Mutex::new(false),
        }
    }

    /// Resolves to `Ok(None)` when a request is already in flight, so
    /// repeated taps cannot trigger duplicate permission prompts. The guard
    /// is released once the pending request settles either way.
    pub async fn current_position(&self) -> Result<Option<Coordinate>, GeolocationError> {
        let Some(sensor) = self.sensor.clone() else {
            return Err(GeolocationError::UnsupportedEnvironment);
        };

        let claimed = {
            let mut in_flight = self.in_flight.lock();
            if *in_flight {
                false
            } else {
                *in_flight = true;
                true
            }
        };
        if !claimed {
            debug!("position request already in flight; skipping");
            return Ok(None);
        }

        let result = run_phases(sensor.as_ref()).await;

        {
            let mut in_flight = self.in_flight.lock();
            *in_flight = false;
        }

        result.map(Some)
    }
}

async fn run_phases(sensor: &dyn LocationSensor) -> Result<Coordinate, GeolocationError> {
    let low_accuracy = PositionRequest {
        enable_high_accuracy: false,
        timeout: LOW_ACCURACY_TIMEOUT,
    };
    match sensor.request_position(low_accuracy).await {
        Ok(position) => Ok(position),
        // never retry a refusal
        Err(GeolocationError::PermissionDenied) => Err(GeolocationError::PermissionDenied),
        Err(err) => {
            debug!(?err, "low-accuracy fix failed; escalating");
            let high_accuracy = PositionRequest {
                enable_high_accuracy: true,
                timeout: HIGH_ACCURACY_TIMEOUT,
            };
            sensor.request_position(high_accuracy).await
        }
    }
}
