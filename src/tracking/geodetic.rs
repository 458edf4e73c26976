use super::propagator::PropagatedState;
use strum_macros::Display;

/// WGS-84 equatorial radius in km.
pub const WGS84_SEMI_MAJOR_KM: f64 = 6378.137;
/// WGS-84 flattening.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;
const MAX_LATITUDE_ITERATIONS: usize = 20;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConversionError {
    NonFinite,
}

impl std::error::Error for ConversionError {}

/// Earth-fixed geodetic coordinates plus inertial speed of one propagated object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticFix {
    latitude_deg: f64,
    longitude_deg: f64,
    altitude_km: f64,
    speed_km_s: f64,
}

impl GeodeticFix {
    pub fn latitude_deg(&self) -> f64 { self.latitude_deg }
    pub fn longitude_deg(&self) -> f64 { self.longitude_deg }
    pub fn altitude_km(&self) -> f64 { self.altitude_km }
    pub fn speed_km_s(&self) -> f64 { self.speed_km_s }
}

/// Wraps a longitude in degrees into `[-180, 180)`.
pub fn wrap_longitude(deg: f64) -> f64 { (deg + 180.0).rem_euclid(360.0) - 180.0 }

/// Converts an inertial state into geodetic latitude, longitude and altitude above
/// the WGS-84 ellipsoid.
///
/// `earth_rotation_rad` is the Greenwich sidereal angle at the instant of `state`, it turns
/// the inertial right ascension into an Earth-fixed longitude. Latitude is solved
/// iteratively (Vallado, Algorithm 12).
///
/// # Errors
/// [`ConversionError::NonFinite`] if the input or any intermediate result is not finite.
pub fn to_geodetic(
    state: &PropagatedState,
    earth_rotation_rad: f64,
) -> Result<GeodeticFix, ConversionError> {
    if !state.is_finite() || !earth_rotation_rad.is_finite() {
        return Err(ConversionError::NonFinite);
    }
    let [x, y, z] = *state.position();
    let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
    let r_delta = x.hypot(y);

    let mut latitude = z.atan2(r_delta);
    for _ in 0..MAX_LATITUDE_ITERATIONS {
        let sin_lat = latitude.sin();
        let c_earth = WGS84_SEMI_MAJOR_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (z + c_earth * e2 * sin_lat).atan2(r_delta);
        let converged = (next - latitude).abs() < LATITUDE_TOLERANCE_RAD;
        latitude = next;
        if converged {
            break;
        }
    }
    let sin_lat = latitude.sin();
    let c_earth = WGS84_SEMI_MAJOR_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();

    // r_delta / cos(lat) degenerates over the poles
    let altitude_km = if latitude.cos().abs() > 1e-3 {
        r_delta / latitude.cos() - c_earth
    } else {
        z / sin_lat - c_earth * (1.0 - e2)
    };
    let longitude_deg = wrap_longitude((y.atan2(x) - earth_rotation_rad).to_degrees());

    let fix = GeodeticFix {
        latitude_deg: latitude.to_degrees(),
        longitude_deg,
        altitude_km,
        speed_km_s: state.speed(),
    };
    if [fix.latitude_deg, fix.longitude_deg, fix.altitude_km, fix.speed_km_s]
        .iter()
        .all(|v| v.is_finite())
    {
        Ok(fix)
    } else {
        Err(ConversionError::NonFinite)
    }
}
