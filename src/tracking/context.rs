use std::sync::Arc;

/// Source of "now" for position queries.
pub trait Clock: Send + Sync {
    fn now(&self) -> chrono::DateTime<chrono::Utc>;
}

/// Model of the Earth's rotation angle.
pub trait EarthRotation: Send + Sync {
    /// Greenwich sidereal angle at `instant`, in radians.
    fn rotation_angle(&self, instant: chrono::DateTime<chrono::Utc>) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> { chrono::Utc::now() }
}

/// A clock frozen at one instant, used to make queries reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub chrono::DateTime<chrono::Utc>);

impl Clock for FixedClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> { self.0 }
}

/// IAU-82 Greenwich mean sidereal time, the rotation the SGP4 TEME frame is defined against.
#[derive(Debug, Default, Clone, Copy)]
pub struct IauEarthRotation;

impl EarthRotation for IauEarthRotation {
    fn rotation_angle(&self, instant: chrono::DateTime<chrono::Utc>) -> f64 {
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&instant.naive_utc()))
    }
}

/// Everything a position query depends on besides the catalog itself.
#[derive(Clone)]
pub struct TrackingContext {
    clock: Arc<dyn Clock>,
    rotation: Arc<dyn EarthRotation>,
}

impl TrackingContext {
    pub fn new(clock: Arc<dyn Clock>, rotation: Arc<dyn EarthRotation>) -> Self {
        Self { clock, rotation }
    }

    /// Wall clock time with the IAU rotation model.
    pub fn system() -> Self { Self::new(Arc::new(SystemClock), Arc::new(IauEarthRotation)) }

    /// Frozen at `instant` with the IAU rotation model.
    pub fn fixed(instant: chrono::DateTime<chrono::Utc>) -> Self {
        Self::new(Arc::new(FixedClock(instant)), Arc::new(IauEarthRotation))
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> { self.clock.now() }

    pub fn rotation_angle(&self, instant: chrono::DateTime<chrono::Utc>) -> f64 {
        self.rotation.rotation_angle(instant)
    }
}
