use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures produced by the device location sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported in this environment")]
    UnsupportedEnvironment,
    #[error("location permission was denied")]
    PermissionDenied,
    #[error("position is unavailable")]
    PositionUnavailable,
    #[error("position request timed out")]
    Timeout,
    #[error("position request failed")]
    Unknown,
}

impl GeolocationError {
    /// Sensor error codes follow the W3C geolocation convention:
    /// 1 permission, 2 unavailable, 3 timeout, anything else unknown.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            2 => GeolocationError::PositionUnavailable,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Unknown,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::UnsupportedEnvironment => "您的瀏覽器不支援定位功能。",
            GeolocationError::PermissionDenied => "定位權限被拒絕，請允許存取位置資訊。",
            GeolocationError::PositionUnavailable => "無法取得位置資訊。",
            GeolocationError::Timeout => "定位逾時，請稍後再試。",
            GeolocationError::Unknown => "定位失敗，請稍後再試。",
        }
    }
}

/// Failures produced while turning a coordinate into an address.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("coordinate out of range: ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("reverse geocoding request failed")]
    RequestFailed(#[from] reqwest::Error),
    #[error("no usable address in geocoding response")]
    UnresolvedAddress,
}

impl GeocodeError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeocodeError::InvalidCoordinate { .. } => "座標不正確，請重新定位。",
            GeocodeError::RequestFailed(_) => "反向地理編碼失敗。",
            GeocodeError::UnresolvedAddress => "無法取得地址，請手動輸入。",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

impl EngineError {
    pub fn user_message(&self) -> &'static str {
        match self {
            EngineError::Geolocation(err) => err.user_message(),
            EngineError::Geocode(err) => err.user_message(),
        }
    }
}
