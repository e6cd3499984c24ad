//! Context enrichment for AgriChat
//!
//! Resolves coordinates to place names via Nominatim, keeps the latest
//! resolution for the advice dispatcher, and supplies climate data
//! (opaque JSON, optionally fetched from NASA POWER).

pub mod climate;
pub mod enrichment;
pub mod geocode;
pub mod types;

pub use climate::{ClimateContext, NasaPowerClient};
pub use enrichment::{LocationEnricher, RefreshOutcome};
pub use geocode::ReverseGeocoder;
pub use types::*;
