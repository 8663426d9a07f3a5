//! Backend availability tracking

pub mod tracker;

pub use tracker::{AvailabilityListener, AvailabilityTicket, AvailabilityTracker};
