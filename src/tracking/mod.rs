mod context;
pub(crate) mod element_parser;
pub(crate) mod geodetic;
mod position_service;
pub(crate) mod propagator;

pub use context::TrackingContext;
pub use position_service::{PositionSample, PositionService};
