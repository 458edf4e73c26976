use super::{
    context::TrackingContext,
    element_parser::{ParseError, parse_elements},
    geodetic::{ConversionError, GeodeticFix, to_geodetic},
    propagator::{PropagationError, propagate},
};
use crate::catalog::{CatalogSnapshot, OrbitalElementRecord};
use crate::{event, log};
use rayon::prelude::*;
use strum_macros::Display;

/// Failure of one stage of the per-record pipeline.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum PipelineError {
    Parse(ParseError),
    Propagation(PropagationError),
    Conversion(ConversionError),
}

impl std::error::Error for PipelineError {}

impl From<ParseError> for PipelineError {
    fn from(value: ParseError) -> Self { PipelineError::Parse(value) }
}

impl From<PropagationError> for PipelineError {
    fn from(value: PropagationError) -> Self { PipelineError::Propagation(value) }
}

impl From<ConversionError> for PipelineError {
    fn from(value: ConversionError) -> Self { PipelineError::Conversion(value) }
}

/// A record that could not be placed, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    catalog_id: u32,
    reason: PipelineError,
}

impl RecordFailure {
    pub fn catalog_id(&self) -> u32 { self.catalog_id }
    pub fn reason(&self) -> &PipelineError { &self.reason }
}

/// Result of running one record through parser, propagator and converter.
pub type RecordOutcome = Result<PositionSample, RecordFailure>;

/// Externally visible position of one object.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct PositionSample {
    #[serde(rename = "id")]
    catalog_id: u32,
    name: String,
    /// Geodetic latitude in degrees.
    #[serde(rename = "lat")]
    latitude: f64,
    /// Longitude in degrees, `[-180, 180)`.
    #[serde(rename = "lon")]
    longitude: f64,
    /// Height above the WGS-84 ellipsoid in km.
    #[serde(rename = "alt")]
    altitude: f64,
    /// Inertial speed in km/s, rounded to two decimals.
    #[serde(rename = "vel")]
    speed: f64,
}

impl PositionSample {
    fn new(record: &OrbitalElementRecord, fix: &GeodeticFix) -> Self {
        Self {
            catalog_id: record.catalog_id(),
            name: record.display_name().to_string(),
            latitude: fix.latitude_deg(),
            longitude: fix.longitude_deg(),
            altitude: fix.altitude_km(),
            speed: (fix.speed_km_s() * 100.0).round() / 100.0,
        }
    }

    pub fn catalog_id(&self) -> u32 { self.catalog_id }
    pub fn name(&self) -> &str { &self.name }
    pub fn latitude(&self) -> f64 { self.latitude }
    pub fn longitude(&self) -> f64 { self.longitude }
    pub fn altitude(&self) -> f64 { self.altitude }
    pub fn speed(&self) -> f64 { self.speed }
}

/// Positions of every successfully propagated object at one instant, in snapshot order.
#[derive(Debug, Clone)]
pub struct PositionBatch {
    instant: chrono::DateTime<chrono::Utc>,
    samples: Vec<PositionSample>,
}

impl PositionBatch {
    pub fn empty(instant: chrono::DateTime<chrono::Utc>) -> Self {
        Self { instant, samples: Vec::new() }
    }

    pub fn instant(&self) -> chrono::DateTime<chrono::Utc> { self.instant }
    pub fn samples(&self) -> &[PositionSample] { &self.samples }
    pub fn into_samples(self) -> Vec<PositionSample> { self.samples }
    pub fn len(&self) -> usize { self.samples.len() }
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }
}

/// Turns a catalog snapshot into a position batch.
///
/// Holds no state besides its [`TrackingContext`]: the result depends only on the snapshot,
/// the instant and the context, so concurrent queries never interfere.
#[derive(Clone)]
pub struct PositionService {
    context: TrackingContext,
}

impl PositionService {
    pub fn new(context: TrackingContext) -> Self { Self { context } }

    pub fn context(&self) -> &TrackingContext { &self.context }

    /// Runs the pipeline for a single record.
    pub fn track_record(
        record: &OrbitalElementRecord,
        instant: chrono::DateTime<chrono::Utc>,
        earth_rotation_rad: f64,
    ) -> RecordOutcome {
        let fix = parse_elements(record.line1(), record.line2())
            .map_err(PipelineError::from)
            .and_then(|elements| propagate(&elements, instant).map_err(PipelineError::from))
            .and_then(|state| to_geodetic(&state, earth_rotation_rad).map_err(PipelineError::from));
        match fix {
            Ok(fix) => Ok(PositionSample::new(record, &fix)),
            Err(reason) => Err(RecordFailure { catalog_id: record.catalog_id(), reason }),
        }
    }

    /// One outcome per record, in snapshot order. Records are processed in parallel.
    pub fn evaluate(
        &self,
        snapshot: &CatalogSnapshot,
        instant: chrono::DateTime<chrono::Utc>,
    ) -> Vec<RecordOutcome> {
        let earth_rotation_rad = self.context.rotation_angle(instant);
        snapshot
            .records()
            .par_iter()
            .map(|record| Self::track_record(record, instant, earth_rotation_rad))
            .collect()
    }

    /// Position batch for `instant`. Failed records are dropped, a missing snapshot yields
    /// an empty batch.
    pub fn batch_at(
        &self,
        snapshot: Option<&CatalogSnapshot>,
        instant: chrono::DateTime<chrono::Utc>,
    ) -> PositionBatch {
        let Some(snapshot) = snapshot else {
            log!("No catalog snapshot stored yet, returning empty batch.");
            return PositionBatch::empty(instant);
        };
        let outcomes = self.evaluate(snapshot, instant);
        let total = outcomes.len();
        let mut samples = Vec::with_capacity(total);
        for outcome in outcomes {
            match outcome {
                Ok(sample) => samples.push(sample),
                Err(failure) => {
                    event!("Skipping object {}: {:?}", failure.catalog_id, failure.reason);
                }
            }
        }
        log!(
            "Propagated {} of {total} catalog objects to {} ({} skipped).",
            samples.len(),
            instant.format("%Y-%m-%dT%H:%M:%SZ"),
            total - samples.len()
        );
        PositionBatch { instant, samples }
    }

    /// Position batch for the context's current time.
    pub fn current_batch(&self, snapshot: Option<&CatalogSnapshot>) -> PositionBatch {
        self.batch_at(snapshot, self.context.now())
    }
}
