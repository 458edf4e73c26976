use super::element_parser::ElementSet;
use strum_macros::Display;

#[derive(Debug, Display, Clone, PartialEq)]
pub enum PropagationError {
    /// The model could not derive its propagation constants from the elements.
    Initialization(String),
    /// The model gave up while advancing the elements, e.g. on a collapsed orbit.
    Model(String),
    NonFinite,
    /// The propagated radius lies below the model's Earth radius.
    Decayed { radius_km: f64 },
}

impl std::error::Error for PropagationError {}

/// Position (km) and velocity (km/s) in the model's Earth-centered inertial (TEME) frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagatedState {
    position: [f64; 3],
    velocity: [f64; 3],
}

impl PropagatedState {
    pub fn new(position: [f64; 3], velocity: [f64; 3]) -> Self { Self { position, velocity } }

    pub fn position(&self) -> &[f64; 3] { &self.position }
    pub fn velocity(&self) -> &[f64; 3] { &self.velocity }

    /// Distance from the Earth's center in km.
    pub fn radius(&self) -> f64 { norm(&self.position) }

    /// Scalar inertial speed in km/s.
    pub fn speed(&self) -> f64 { norm(&self.velocity) }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|c| c.is_finite())
    }
}

fn norm(v: &[f64; 3]) -> f64 { v.iter().map(|c| c * c).sum::<f64>().sqrt() }

/// Minutes from the element epoch to `instant`, negative for instants before the epoch.
#[allow(clippy::cast_precision_loss)]
pub fn minutes_since_epoch(
    epoch: chrono::DateTime<chrono::Utc>,
    instant: chrono::DateTime<chrono::Utc>,
) -> f64 {
    let delta = instant - epoch;
    delta.num_nanoseconds().map_or_else(
        || delta.num_milliseconds() as f64 / 60_000.0,
        |nanos| nanos as f64 / 60_000_000_000.0,
    )
}

/// Advances `elements` to `instant` with the SGP4/SDP4 perturbation model.
///
/// # Errors
/// Fails if the model rejects the elements, produces a non-finite state, or places the
/// object inside the Earth. Such failures are routine for decayed or long-stale entries.
pub fn propagate(
    elements: &ElementSet,
    instant: chrono::DateTime<chrono::Utc>,
) -> Result<PropagatedState, PropagationError> {
    let constants = sgp4::Constants::from_elements(elements.model())
        .map_err(|e| PropagationError::Initialization(format!("{e:?}")))?;
    let minutes = minutes_since_epoch(elements.epoch(), instant);
    let prediction = constants
        .propagate(sgp4::MinutesSinceEpoch(minutes))
        .map_err(|e| PropagationError::Model(format!("{e:?}")))?;

    let state = PropagatedState::new(prediction.position, prediction.velocity);
    if !state.is_finite() {
        return Err(PropagationError::NonFinite);
    }
    let radius_km = state.radius();
    if radius_km < sgp4::WGS84.ae {
        return Err(PropagationError::Decayed { radius_km });
    }
    Ok(state)
}
