//! Core types and service wiring for the binwise disposal classifier.

/// Item catalog and catalog validation errors.
pub mod catalog;
/// Classification of detections and aggregation of results.
pub mod classify;
/// Council catalog, postcode resolution and collection schedules.
pub mod council;
/// Domain models shared by all crates.
pub mod model;
/// Client image payload decoding.
pub mod payload;
/// Traits describing detection backends.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;

pub use catalog::*;
pub use classify::*;
pub use council::*;
pub use model::*;
pub use payload::*;
pub use ports::*;
pub use service::*;
